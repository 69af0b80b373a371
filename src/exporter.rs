//! End-to-end export of one record to a PDF file.

use crate::context::ExportContext;
use crate::delivery::Deliverer;
use crate::error::ExportError;
use crate::notify::{LogNotifier, Notifier};
use crate::raster::{RasterMode, RasterRequest, Rasterizer};
use crate::render_tree::{GeneratingState, RenderTree};
use crate::source::RecordSource;
use dossier_layout::{LayoutBuilder, LayoutRenderer, paginate};
use dossier_pdf_composer::{DocumentInfo, PdfAssembler};
use dossier_resource::AssetInliner;
use dossier_traits::AssetSource;
use dossier_types::{InlineOutcome, Record};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation, checked between pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What an export produced.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub filename: String,
    pub path: PathBuf,
    /// Name of the sink that stored the document.
    pub sink: &'static str,
    pub page_count: usize,
    pub raster_mode: RasterMode,
    /// One list per sub-record, in attachment order.
    pub inline_outcomes: Vec<Vec<InlineOutcome>>,
}

pub struct RecordExporter {
    context: ExportContext,
    inliner: AssetInliner,
    rasterizer: Rasterizer,
    deliverer: Deliverer,
    notifier: Arc<dyn Notifier>,
    render_tree: RenderTree,
    generating: GeneratingState,
    cancel: Option<CancelToken>,
}

impl RecordExporter {
    /// An exporter with the standard inlining, raster and delivery chains.
    pub fn new(
        context: ExportContext,
        source: Arc<dyn AssetSource>,
        renderer: Arc<dyn LayoutRenderer>,
    ) -> Self {
        let render_tree = RenderTree::new();
        let inliner = AssetInliner::new(source, context.base_url.clone(), context.token.clone());
        let rasterizer = Rasterizer::new(
            &context,
            LayoutBuilder::new(),
            renderer,
            render_tree.clone(),
        );
        let deliverer = Deliverer::standard(&context.output_dir, &context.download_dir);
        Self {
            context,
            inliner,
            rasterizer,
            deliverer,
            notifier: Arc::new(LogNotifier),
            render_tree,
            generating: GeneratingState::new(),
            cancel: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_deliverer(mut self, deliverer: Deliverer) -> Self {
        self.deliverer = deliverer;
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn context(&self) -> &ExportContext {
        &self.context
    }

    pub fn render_tree(&self) -> &RenderTree {
        &self.render_tree
    }

    pub fn generating_state(&self) -> &GeneratingState {
        &self.generating
    }

    /// Exports `record` and reports the outcome through the notifier.
    pub async fn export(&self, record: &Record) -> Result<ExportReport, ExportError> {
        let result = match self.generating.begin() {
            Some(_generating) => self.run(record).await,
            None => Err(ExportError::Busy),
        };
        self.report(result)
    }

    /// Fetches the record from `source`, then exports it. The generating
    /// flag is held from the fetch onwards.
    pub async fn export_by_id(
        &self,
        source: &dyn RecordSource,
        kind: &str,
        id: &str,
    ) -> Result<ExportReport, ExportError> {
        let result = match self.generating.begin() {
            Some(_generating) => match source.fetch_record(kind, id).await {
                Ok(record) => self.run(&record).await,
                Err(e) => Err(e),
            },
            None => Err(ExportError::Busy),
        };
        self.report(result)
    }

    fn report(
        &self,
        result: Result<ExportReport, ExportError>,
    ) -> Result<ExportReport, ExportError> {
        match &result {
            Ok(report) => self.notifier.success(&format!(
                "{} downloaded ({} page(s))",
                report.filename, report.page_count
            )),
            Err(e) => self.notifier.error(&format!("Failed to generate PDF: {}", e)),
        }
        result
    }

    /// Runs the stages. Callers hold the generating guard.
    async fn run(&self, record: &Record) -> Result<ExportReport, ExportError> {
        let filename = record.filename();
        log::info!(
            "exporting {} ({} attachment(s))",
            filename,
            record.attachment_count()
        );

        let inline_outcomes = self.inliner.inline_record(record).await;
        self.checkpoint("layout")?;

        let request = RasterRequest {
            record: record.clone(),
            assets: inline_outcomes
                .iter()
                .map(|entry| entry.iter().map(|o| o.asset.clone()).collect())
                .collect(),
            generated_at: Some(chrono::Local::now().format("%d/%m/%Y, %H:%M:%S").to_string()),
        };
        let rasterized = self.rasterizer.rasterize(&request).await?;
        self.checkpoint("pagination")?;

        let surface = &rasterized.surface;
        let pagination = paginate(surface.width_px, surface.height_px, &self.context.geometry)?;
        log::debug!(
            "{}x{} px surface split into {} page(s)",
            surface.width_px,
            surface.height_px,
            pagination.page_count()
        );

        let bytes = PdfAssembler::new(self.context.geometry)
            .with_info(DocumentInfo {
                title: Some(filename.clone()),
                creation_date: Some(chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string()),
            })
            .assemble(surface, &pagination)?;
        self.checkpoint("delivery")?;

        let receipt = self.deliverer.deliver(&filename, bytes).await?;
        Ok(ExportReport {
            filename,
            path: receipt.delivered.path,
            sink: receipt.sink,
            page_count: pagination.page_count(),
            raster_mode: rasterized.mode,
            inline_outcomes,
        })
    }

    fn checkpoint(&self, stage: &'static str) -> Result<(), ExportError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => {
                log::info!("export cancelled before {}", stage);
                Err(ExportError::Cancelled(stage))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
