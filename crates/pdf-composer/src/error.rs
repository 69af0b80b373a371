use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposerError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Slice rows {start}..{end} fall outside a {height} px surface.")]
    SliceOutOfBounds { start: u32, end: u32, height: u32 },

    #[error("Nothing to assemble: the pagination has no slices.")]
    NoPages,
}
