use clap::{Parser, Subcommand};
use dossier::{
    ExportConfig, ExportError, FileRecordSource, HttpTrainingSource, RecordExporter, RecordSource,
};
use dossier_render_raster::{FontSet, SkiaRenderer};
use dossier_resource::HttpAssetSource;
use std::path::PathBuf;
use std::sync::Arc;

/// Exports a record and its attachments as a paginated PDF report.
#[derive(Parser)]
#[command(name = "dossier", version)]
struct Cli {
    /// TOML configuration file. Defaults to ./dossier.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a record and save it as `<kind>_<id>.pdf`.
    Export {
        #[arg(long, default_value = "training")]
        kind: String,
        #[arg(long)]
        id: String,
        /// Read the record from a local JSON file instead of the backend.
        #[arg(long)]
        record_file: Option<PathBuf>,
        /// Overrides the configured output directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() -> Result<(), ExportError> {
    env_logger::init();
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<(), ExportError> {
    let mut context = ExportConfig::load(cli.config.as_deref())?.into_context();

    let Command::Export {
        kind,
        id,
        record_file,
        output_dir,
    } = cli.command;
    if let Some(dir) = output_dir {
        context = context.with_output_dir(dir);
    }

    let fonts = FontSet::discover(context.font_dir.as_deref());
    if !fonts.has_fonts() {
        log::warn!("no system font found; text will render as blocks");
    }
    let http = Arc::new(HttpAssetSource::with_timeout(context.fetch_timeout)?);

    let source: Box<dyn RecordSource> = match record_file {
        Some(path) => Box::new(FileRecordSource::new(path)),
        None => {
            let base = context.base_url.clone().unwrap_or_default();
            if base.trim().is_empty() {
                log::warn!("no base_url configured; record fetch will fail");
            }
            Box::new(HttpTrainingSource::new(
                http.clone(),
                &base,
                context.token.clone(),
            ))
        }
    };

    let exporter = RecordExporter::new(
        context,
        http,
        Arc::new(SkiaRenderer::new(Arc::new(fonts))),
    );
    let report = exporter.export_by_id(source.as_ref(), &kind, &id).await?;

    println!(
        "Saved {} ({} page(s), {} render, via {})",
        report.path.display(),
        report.page_count,
        report.raster_mode,
        report.sink
    );
    Ok(())
}
