// Downloader core: format resolution, download orchestration and the
// session state machine

pub mod errors;
pub mod formats;
pub mod models;
pub mod orchestrator;
pub mod resolver;
pub mod session;
pub mod traits;
pub mod utils;

pub use errors::{EngineError, ResolveError, ValidationError};
pub use formats::FormatKind;
pub use models::{
    DownloadEvent, DownloadMode, DownloadOutcome, DownloadRequest, FetchOptions, PostProcessor,
    PostProcessorKind, ProbeOptions, ProgressEvent, ProgressUpdate, RankedFormat, RawFormat,
    RawInfo, VideoInfo,
};
pub use session::{DownloadKind, Session, SessionPhase};
pub use traits::{MediaEngine, ProgressFn};
