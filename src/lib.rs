// Core library for a YouTube video/audio downloader: resolve a URL's
// renditions, rank them and drive one background download at a time. No
// GUI code lives here; a frontend drives `Session` and subscribes to the
// channels it hands back.

pub mod downloader;
pub mod ytdlp;

pub use downloader::{
    DownloadEvent, DownloadKind, DownloadOutcome, MediaEngine, ProgressEvent, RankedFormat,
    ResolveError, Session, SessionPhase, ValidationError, VideoInfo,
};
pub use ytdlp::YtDlpEngine;
