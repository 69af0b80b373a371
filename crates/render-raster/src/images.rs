use dossier_types::InlinedAsset;
use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

/// Decodes an embedded asset into a premultiplied pixmap.
pub(crate) fn decode_to_pixmap(asset: &InlinedAsset) -> Option<Pixmap> {
    let bytes = asset.decode()?;
    if asset.mime == "image/svg+xml" || looks_like_svg(&bytes) {
        return render_svg(&bytes);
    }
    let decoded = match format_from_mime(&asset.mime) {
        Some(format) => image::load_from_memory_with_format(&bytes, format)
            .or_else(|_| image::load_from_memory(&bytes))
            .ok()?,
        None => image::load_from_memory(&bytes).ok()?,
    };

    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap = Pixmap::new(width, height)?;
    for (src, dst) in rgba
        .as_raw()
        .chunks_exact(4)
        .zip(pixmap.data_mut().chunks_exact_mut(4))
    {
        let a = src[3];
        dst[0] = premultiply(src[0], a);
        dst[1] = premultiply(src[1], a);
        dst[2] = premultiply(src[2], a);
        dst[3] = a;
    }
    Some(pixmap)
}

/// Renders an SVG document at its intrinsic size.
fn render_svg(bytes: &[u8]) -> Option<Pixmap> {
    let tree = match usvg::Tree::from_data(bytes, &usvg::Options::default()) {
        Ok(tree) => tree,
        Err(e) => {
            log::warn!("unreadable svg attachment: {}", e);
            return None;
        }
    };
    let size = tree.size();
    let mut pixmap = Pixmap::new(
        size.width().ceil().max(1.0) as u32,
        size.height().ceil().max(1.0) as u32,
    )?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());
    Some(pixmap)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

fn format_from_mime(mime: &str) -> Option<image::ImageFormat> {
    match mime {
        "image/png" => Some(image::ImageFormat::Png),
        "image/jpeg" => Some(image::ImageFormat::Jpeg),
        "image/gif" => Some(image::ImageFormat::Gif),
        "image/webp" => Some(image::ImageFormat::WebP),
        _ => None,
    }
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    let prod = channel as u16 * alpha as u16 + 127;
    ((prod + (prod >> 8)) >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_bounds() {
        assert_eq!(premultiply(255, 255), 255);
        assert_eq!(premultiply(255, 0), 0);
        assert_eq!(premultiply(200, 128), 100);
    }

    const RED_SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="6"><rect width="10" height="6" fill="#ff0000"/></svg>"##;

    #[test]
    fn svg_renders_at_its_intrinsic_size() {
        let asset = InlinedAsset::from_data_uri(dossier_types::asset::encode_data_uri(
            RED_SQUARE.as_bytes(),
            "image/svg+xml",
        ));
        let pixmap = decode_to_pixmap(&asset).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (10, 6));
        let px = pixmap.pixel(5, 3).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (255, 0, 0, 255));
    }

    #[test]
    fn svg_behind_a_generic_mime_is_recognised() {
        let asset = InlinedAsset::from_data_uri(dossier_types::asset::encode_data_uri(
            RED_SQUARE.as_bytes(),
            "application/octet-stream",
        ));
        assert!(decode_to_pixmap(&asset).is_some());
        assert!(!looks_like_svg(b"\x89PNG\r\n"));
    }

    #[test]
    fn wrong_mime_still_decodes_by_sniffing() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let asset = InlinedAsset::from_data_uri(dossier_types::asset::encode_data_uri(
            &png,
            "image/jpeg",
        ));
        let pixmap = decode_to_pixmap(&asset).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (3, 2));
    }
}
