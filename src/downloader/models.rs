// Data models shared by the resolver, orchestrator and session controller

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One raw encoding variant as reported by the extraction engine.
/// Field meanings follow yt-dlp's format dicts; never mutated by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFormat {
    /// Opaque format identifier (e.g., "137", "140")
    pub format_id: String,
    /// Container/extension (mp4, webm, m4a)
    pub ext: String,
    /// Video codec, "none" when the stream carries no image track
    pub vcodec: Option<String>,
    /// Audio codec, "none" when the stream carries no sound track
    pub acodec: Option<String>,
    /// Video height in pixels
    pub height: Option<u32>,
    /// Frames per second
    pub fps: Option<f64>,
    /// Average audio bitrate in kbps
    pub abr: Option<f64>,
    /// Exact file size in bytes, when known
    pub filesize: Option<u64>,
}

/// Probe result: metadata only, no media bytes transferred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInfo {
    pub title: String,
    /// Duration in seconds, when the extractor knows it
    pub duration: Option<f64>,
    /// Formats in the order the engine reported them
    pub formats: Vec<RawFormat>,
}

/// One selectable rendition, derived from a usable RawFormat. Created per
/// resolve and replaced wholesale when the next resolve begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFormat {
    /// Display label (e.g., "720p (mp4) (~12MB)" or "128kbps (m4a)")
    pub label: String,
    pub format_id: String,
    /// Height for video renditions, bitrate for audio-only ones
    pub sort_key: f64,
}

/// Resolve result: title, duration label and the two ranked lists.
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub title: String,
    /// "<minutes>:<seconds>" or "Unknown"
    pub duration_label: String,
    /// Renditions with both tracks, height descending
    pub video_formats: Vec<RankedFormat>,
    /// Sound-only renditions, bitrate descending
    pub audio_formats: Vec<RankedFormat>,
}

/// Which streams a download produces and how they are combined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadMode {
    /// Fetch the exact pair and remux into one container
    MuxedVideoAudio {
        video_format_id: String,
        audio_format_id: String,
    },
    /// Fetch one audio stream and extract it into a fixed codec
    AudioOnly { audio_format_id: String },
}

/// One download, built by the session from the user's selection and
/// consumed once by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub url: String,
    pub destination: PathBuf,
    pub mode: DownloadMode,
}

/// Progress reported to the session's subscriber while a download runs.
/// Forwarded as received and not retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressEvent {
    /// Bytes are moving; both labels are engine-formatted strings verbatim
    Downloading { percent: String, speed: String },
    /// One stream segment finished, prior to any merge or post-processing
    ItemFinished { file_name: String },
}

/// Terminal result of a download, emitted exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadOutcome {
    Success(String),
    Failure(String),
}

/// Everything a download subscriber receives: zero or more progress
/// events, then exactly one terminal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadEvent {
    Progress(ProgressEvent),
    Finished(DownloadOutcome),
}

/// Configuration for a metadata probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Suppress engine warnings
    pub quiet: bool,
    /// Keep going when individual formats fail to extract
    pub ignore_format_errors: bool,
    /// Do not enumerate or fetch subtitles
    pub no_subtitles: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            quiet: true,
            ignore_format_errors: true,
            no_subtitles: true,
        }
    }
}

impl ProbeOptions {
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_ignore_format_errors(mut self, ignore: bool) -> Self {
        self.ignore_format_errors = ignore;
        self
    }

    pub fn with_no_subtitles(mut self, no_subtitles: bool) -> Self {
        self.no_subtitles = no_subtitles;
        self
    }
}

/// Post-processing step the engine applies after the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcessorKind {
    ExtractAudio,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostProcessor {
    pub kind: PostProcessorKind,
    pub target_codec: String,
    pub target_quality: String,
}

/// Configuration for one fetch-and-write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Engine format-selection expression (e.g., "137+140/best")
    pub format_selection: String,
    /// Output path template; the engine sanitizes the title into a legal
    /// file name
    pub output_template: String,
    /// Remux container applied after separate streams are combined
    pub merge_output_format: Option<String>,
    pub post_processors: Vec<PostProcessor>,
}

/// Payload of the engine's progress callback, fired synchronously from
/// within a fetch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    Downloading { percent: String, speed: String },
    Finished { filename: String },
}
