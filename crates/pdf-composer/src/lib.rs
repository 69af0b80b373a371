//! Turns a paginated raster into a PDF document.
//!
//! Every slice becomes one page holding a single image XObject, drawn at the
//! top-left corner of the margin box and scaled by the pagination ratio. No
//! text layer is produced.

mod error;

pub use error::ComposerError;

use dossier_layout::Pagination;
use dossier_types::{PageGeometry, RasterSurface, Slice};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use std::io::Write;

const IMAGE_NAME: &str = "Im0";

/// Document-level metadata written to the PDF info dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub creation_date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PdfAssembler {
    geometry: PageGeometry,
    info: DocumentInfo,
    compression: Compression,
}

impl PdfAssembler {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            info: DocumentInfo::default(),
            compression: Compression::default(),
        }
    }

    pub fn with_info(mut self, info: DocumentInfo) -> Self {
        self.info = info;
        self
    }

    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    /// Builds the document in memory and returns its serialized bytes.
    pub fn assemble(
        &self,
        surface: &RasterSurface,
        pagination: &Pagination,
    ) -> Result<Vec<u8>, ComposerError> {
        if pagination.slices.is_empty() {
            return Err(ComposerError::NoPages);
        }

        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();

        let mut page_ids = Vec::with_capacity(pagination.slices.len());
        for slice in &pagination.slices {
            let page_id = self.add_page(&mut document, pages_id, surface, pagination, slice)?;
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_ids.len() as i64,
        };
        document
            .objects
            .insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = document.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        document.trailer.set("Root", catalog_id);

        let mut info = dictionary! { "Producer" => Object::string_literal("dossier") };
        if let Some(title) = &self.info.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        if let Some(date) = &self.info.creation_date {
            info.set("CreationDate", Object::string_literal(date.as_str()));
        }
        let info_id = document.add_object(info);
        document.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        document.save_to(&mut buffer)?;
        log::debug!(
            "assembled {} page(s) into {} bytes",
            page_ids.len(),
            buffer.len()
        );
        Ok(buffer)
    }

    fn add_page(
        &self,
        document: &mut Document,
        pages_id: ObjectId,
        surface: &RasterSurface,
        pagination: &Pagination,
        slice: &Slice,
    ) -> Result<ObjectId, ComposerError> {
        if slice.end_px() > surface.height_px || slice.source_height_px == 0 {
            return Err(ComposerError::SliceOutOfBounds {
                start: slice.source_offset_px,
                end: slice.end_px(),
                height: surface.height_px,
            });
        }

        let rgb = flatten_rows(surface, slice);
        let mut encoder = ZlibEncoder::new(Vec::new(), self.compression);
        encoder.write_all(&rgb)?;
        let compressed = encoder.finish()?;

        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => surface.width_px as i64,
                "Height" => slice.source_height_px as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            compressed,
        );
        let image_id = document.add_object(image);

        let g = &self.geometry;
        let draw_width = pagination.usable_width;
        let draw_height = pagination.slice_height_pt(slice);
        // PDF space grows upwards; anchor the slice to the top margin.
        let y = g.page_height - g.margin_y - draw_height;
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(draw_width),
                        Object::Real(0.0),
                        Object::Real(0.0),
                        Object::Real(draw_height),
                        Object::Real(g.margin_x),
                        Object::Real(y),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = document.add_object(Stream::new(dictionary! {}, content.encode()?));

        let page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(g.page_width),
                Object::Real(g.page_height),
            ],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { IMAGE_NAME => image_id },
            },
        };
        Ok(document.add_object(page))
    }
}

/// Copies the slice's rows as RGB, compositing alpha over white.
fn flatten_rows(surface: &RasterSurface, slice: &Slice) -> Vec<u8> {
    let rows = surface.rows(slice.source_offset_px, slice.source_height_px);
    let mut rgb = Vec::with_capacity(rows.len() / 4 * 3);
    for px in rows.chunks_exact(4) {
        let a = px[3] as u16;
        for &c in &px[..3] {
            rgb.push(((c as u16 * a + 255 * (255 - a) + 127) / 255) as u8);
        }
    }
    rgb
}
