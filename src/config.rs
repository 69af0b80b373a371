use crate::context::ExportContext;
use dossier_types::PageGeometry;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix; `DOSSIER__PAGE__MARGIN_X=30` sets
/// `page.margin_x`.
pub const ENV_PREFIX: &str = "DOSSIER";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub page: PageConfig,
    pub raster: RasterConfig,
    pub output_dir: PathBuf,
    pub download_dir: PathBuf,
    pub font_dir: Option<PathBuf>,
    /// Unset means no timeout.
    pub fetch_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub width: f32,
    pub height: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    pub primary_scale: f32,
    pub fallback_scale: f32,
    pub viewport_width: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let context = ExportContext::default();
        Self {
            base_url: None,
            token: None,
            page: PageConfig::default(),
            raster: RasterConfig::default(),
            output_dir: context.output_dir,
            download_dir: context.download_dir,
            font_dir: None,
            fetch_timeout_secs: None,
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        let a4 = PageGeometry::a4_portrait();
        Self {
            width: a4.page_width,
            height: a4.page_height,
            margin_x: a4.margin_x,
            margin_y: a4.margin_y,
        }
    }
}

impl Default for RasterConfig {
    fn default() -> Self {
        let context = ExportContext::default();
        Self {
            primary_scale: context.primary_scale,
            fallback_scale: context.fallback_scale,
            viewport_width: context.viewport_width,
        }
    }
}

impl ExportConfig {
    /// Loads configuration from an explicit TOML file, or from an optional
    /// `dossier.toml` in the working directory, with environment variables
    /// layered on top.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name("dossier").required(false)),
        };
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

        let config: ExportConfig = builder.build()?.try_deserialize()?;
        log::debug!("configuration loaded: {:?}", config.redacted());
        Ok(config)
    }

    /// A copy safe to log.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.token.is_some() {
            copy.token = Some("***".to_string());
        }
        copy
    }

    pub fn into_context(self) -> ExportContext {
        ExportContext {
            base_url: self.base_url,
            token: self.token,
            geometry: PageGeometry::new(
                self.page.width,
                self.page.height,
                self.page.margin_x,
                self.page.margin_y,
            ),
            primary_scale: self.raster.primary_scale,
            fallback_scale: self.raster.fallback_scale,
            viewport_width: self.raster.viewport_width,
            output_dir: self.output_dir,
            download_dir: self.download_dir,
            font_dir: self.font_dir,
            fetch_timeout: self.fetch_timeout_secs.map(Duration::from_secs),
        }
    }
}
