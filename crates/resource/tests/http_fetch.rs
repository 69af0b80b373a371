use axum::Router;
use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use dossier_resource::{AssetInliner, HttpAssetSource};
use dossier_traits::{AssetSource, FetchRequest, ResourceError};
use dossier_types::{AssetRef, Attachment, InlineVia};
use std::collections::HashMap;
use std::sync::Arc;

const TOKEN: &str = "secret-token";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really";

async fn protected_file(
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {}", TOKEN).as_str());
    if !authorized || query.get("show_file").map(String::as_str) != Some("true") {
        return (StatusCode::UNAUTHORIZED, Vec::new()).into_response();
    }
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        PNG_BYTES.to_vec(),
    )
        .into_response()
}

async fn public_photo() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES.to_vec())
}

async fn broken() -> impl IntoResponse {
    StatusCode::INTERNAL_SERVER_ERROR
}

/// Serves the attachment endpoints on an ephemeral local port.
async fn spawn_server() -> String {
    let app = Router::new()
        .route("/attachfiles/1", get(protected_file))
        .route("/attachfiles/2", get(broken))
        .route("/public/photo.png", get(public_photo));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let _ = env_logger::builder().is_test(true).try_init();
    let base = spawn_server().await;
    let source = HttpAssetSource::new().unwrap();

    let err = source
        .fetch(&FetchRequest::anonymous(format!("{}/attachfiles/2", base)))
        .await
        .unwrap_err();
    assert!(matches!(err, ResourceError::Status { status: 500, .. }));
}

#[tokio::test]
async fn authenticated_endpoint_sends_bearer_and_repairs_mime() {
    let _ = env_logger::builder().is_test(true).try_init();
    let base = spawn_server().await;
    let source = Arc::new(HttpAssetSource::new().unwrap());
    let inliner = AssetInliner::new(source, Some(base.clone()), Some(TOKEN.to_string()));

    let outcome = inliner
        .inline(&Attachment::new(Some(1), format!("{}/public/photo.png", base)))
        .await;

    assert_eq!(outcome.via, InlineVia::Authenticated);
    let AssetRef::Embedded(asset) = outcome.asset else {
        panic!("expected embedded asset");
    };
    assert_eq!(asset.mime, "image/png");
    assert_eq!(asset.decode().unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn failing_endpoint_ends_inlined_via_raw_url() {
    let _ = env_logger::builder().is_test(true).try_init();
    let base = spawn_server().await;
    let source = Arc::new(HttpAssetSource::new().unwrap());
    let inliner = AssetInliner::new(source, Some(base.clone()), Some(TOKEN.to_string()));

    let outcome = inliner
        .inline(&Attachment::new(Some(2), format!("{}/public/photo.png", base)))
        .await;

    assert_eq!(outcome.via, InlineVia::Anonymous);
    assert!(outcome.is_embedded());
}

#[tokio::test]
async fn unreachable_everything_keeps_the_reference() {
    let _ = env_logger::builder().is_test(true).try_init();
    let base = spawn_server().await;
    let source = Arc::new(HttpAssetSource::new().unwrap());
    let inliner = AssetInliner::new(source, Some(base.clone()), Some(TOKEN.to_string()));
    let url = format!("{}/public/missing.jpg", base);

    let outcome = inliner.inline(&Attachment::new(Some(2), url.clone())).await;

    assert_eq!(outcome.via, InlineVia::RawFallback);
    assert_eq!(outcome.asset, AssetRef::Raw(url));
}
