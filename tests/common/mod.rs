#![allow(dead_code)]

use dossier::{ExportContext, Notifier, RecordExporter};
use dossier_render_raster::{FontSet, SkiaRenderer};
use dossier_traits::AssetSource;
use dossier_types::{Attachment, Field, Record, SubRecord};
use lopdf::Document as LopdfDocument;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Wrapper around a delivered PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    pub fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let bytes = std::fs::read(path)?;
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    pub fn title(&self) -> Option<String> {
        let info = self.doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
        let dict = self.doc.get_dictionary(info).ok()?;
        let title = dict.get(b"Title").ok()?.as_str().ok()?;
        Some(String::from_utf8_lossy(title).into_owned())
    }
}

/// Collects notifications for later inspection.
#[derive(Default)]
pub struct RecordingNotifier {
    pub successes: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

pub const BASE_URL: &str = "https://api.test";
pub const TOKEN: &str = "tok";

/// A context writing into `output_dir`, rendering at 1x to keep tests fast.
pub fn test_context(output_dir: &Path) -> ExportContext {
    ExportContext::new()
        .with_base_url(BASE_URL)
        .with_token(TOKEN)
        .with_scales(1.0, 1.0)
        .with_output_dir(output_dir)
        .with_download_dir(output_dir.join("downloads"))
}

pub fn exporter(
    context: ExportContext,
    source: Arc<dyn AssetSource>,
    notifier: Arc<RecordingNotifier>,
) -> RecordExporter {
    let renderer = Arc::new(SkiaRenderer::new(Arc::new(FontSet::empty())));
    RecordExporter::new(context, source, renderer).with_notifier(notifier)
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 255]))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// A training record with `entries` sections and the given attachments on
/// the first one.
pub fn training_record(id: &str, entries: usize, attachments: Vec<Attachment>) -> Record {
    let mut record = Record::new("training", id);
    record.summary = vec![
        Field::new("Name", "Asha Rao"),
        Field::new("Email Id", "asha@example.com"),
        Field::new("Mobile Number", ""),
        Field::new("User Type", "Staff"),
        Field::new("Status", "Pass"),
        Field::new("Training Date", "05/03/2024"),
    ];
    let mut attachments = Some(attachments);
    record.entries = (0..entries)
        .map(|i| {
            let mut entry = SubRecord::new("TRAINING DETAILS");
            entry.fields = vec![
                Field::new("Training Name", format!("Module {}", i + 1)),
                Field::new("Training Type", "internal"),
                Field::new("Training Date", "05/03/2024"),
                Field::new("Created On", "01/03/2024"),
                Field::new("Updated On", ""),
                Field::new("Status", "Pass"),
            ];
            entry.attachments = attachments.take().unwrap_or_default();
            entry
        })
        .collect();
    record
}
