/// Prefixes `https://` when the base has no scheme and drops trailing slashes.
pub fn normalize_base_url(base: &str) -> String {
    let trimmed = base.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// The per-asset binary endpoint: `{base}/attachfiles/{id}?show_file=true`.
pub fn attachment_endpoint(base: &str, attachment_id: u64) -> String {
    format!(
        "{}/attachfiles/{}?show_file=true",
        normalize_base_url(base),
        attachment_id
    )
}
