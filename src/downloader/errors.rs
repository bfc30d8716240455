// Error types for the resolver, orchestrator and session controller

use std::fmt;

/// Synchronous rejections. The session refuses the request up front, leaves
/// its state untouched and starts no background work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// URL field was empty
    EmptyUrl,

    /// URL does not match any supported shape
    InvalidUrl(String),

    /// Destination directory does not exist
    MissingDirectory(String),

    /// The requested mode needs a format selection that was not provided
    /// (or that does not belong to the current resolved lists)
    MissingSelection(&'static str),

    /// Download requested before any resolve completed
    NothingResolved,

    /// A resolve or download is already in flight
    Busy(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "Please enter a YouTube URL"),
            Self::InvalidUrl(url) => write!(f, "Not a valid YouTube URL: {}", url),
            Self::MissingDirectory(path) => write!(f, "Save location does not exist: {}", path),
            Self::MissingSelection(which) => write!(f, "Please select a {} quality", which),
            Self::NothingResolved => write!(f, "Fetch video info before downloading"),
            Self::Busy(op) => write!(f, "Another {} is already running", op),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Terminal errors of a resolve operation, delivered once over the resolve
/// channel. The session returns to Idle on either variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The engine completed but produced no usable result
    NoData,

    /// The engine raised a fault; the message is its diagnostic text
    Extraction(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => write!(f, "Failed to extract video information"),
            Self::Extraction(msg) => write!(f, "Error fetching video info: {}", msg),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Faults raised by the extraction/download engine. The core passes the
/// rendered text through to the caller without reinterpreting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine binary (or interpreter) could not be started
    ToolNotFound(String),

    /// The engine ran and reported failure
    Execution(String),

    /// The engine produced output the wrapper could not parse
    Parse(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ToolNotFound(tool) => write!(f, "Tool not found: {}", tool),
            Self::Execution(msg) => write!(f, "{}", msg),
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}
