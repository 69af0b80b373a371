use dossier_types::PageGeometry;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Everything an export needs to know about its environment.
///
/// Passed explicitly to [`crate::RecordExporter`]; nothing is read from
/// global state during an export.
#[derive(Debug, Clone)]
pub struct ExportContext {
    /// Backend host, with or without scheme.
    pub base_url: Option<String>,
    /// Bearer credential for the backend.
    pub token: Option<String>,
    pub geometry: PageGeometry,
    /// Scale of the full-fidelity render.
    pub primary_scale: f32,
    /// Scale of the text-only fallback render.
    pub fallback_scale: f32,
    /// Nominal layout width in CSS pixels.
    pub viewport_width: f32,
    /// Where the primary save writes documents.
    pub output_dir: PathBuf,
    /// Where the download fallback copies documents.
    pub download_dir: PathBuf,
    pub font_dir: Option<PathBuf>,
    /// `None` means requests may wait indefinitely.
    pub fetch_timeout: Option<Duration>,
}

impl Default for ExportContext {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            geometry: PageGeometry::a4_portrait(),
            primary_scale: 3.0,
            fallback_scale: 2.0,
            viewport_width: 1000.0,
            output_dir: PathBuf::from("."),
            download_dir: std::env::temp_dir().join("dossier-downloads"),
            font_dir: None,
            fetch_timeout: None,
        }
    }
}

impl ExportContext {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_scales(mut self, primary: f32, fallback: f32) -> Self {
        self.primary_scale = primary;
        self.fallback_scale = fallback;
        self
    }

    pub fn with_viewport_width(mut self, width: f32) -> Self {
        self.viewport_width = width;
        self
    }

    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_download_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.download_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_font_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.font_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }
}
