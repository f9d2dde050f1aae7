use thiserror::Error;

/// Failures surfaced by the export pipeline.
///
/// Logo problems never show up here: a missing or undecodable logo file
/// degrades to a report without a logo.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The markup handed to the off-screen surface could not be parsed.
    #[error("markup error: {0}")]
    Markup(String),

    /// The settled content could not be captured.
    #[error("render error: {0}")]
    Render(String),

    /// The page document could not be assembled.
    #[error("compose error: {0}")]
    Compose(String),
}

pub type Result<T> = std::result::Result<T, Error>;
