// Download Orchestrator
//
// Builds the engine's fetch configuration from a download request, relays
// progress into the subscriber channel and returns the terminal outcome.
// The session emits the terminal event after it has settled the phase, so
// a subscriber never observes a finished download in a Downloading state.

use std::path::Path;

use log::{info, warn};
use tokio::sync::mpsc::UnboundedSender;

use super::models::{
    DownloadEvent, DownloadMode, DownloadOutcome, DownloadRequest, FetchOptions, PostProcessor,
    PostProcessorKind, ProgressEvent, ProgressUpdate,
};
use super::traits::MediaEngine;

const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";
const MERGE_CONTAINER: &str = "mp4";
const AUDIO_CODEC: &str = "mp3";
const AUDIO_QUALITY: &str = "192";

/// Build the engine configuration for a request.
///
/// MuxedVideoAudio prefers the exact pair and falls back to the engine's
/// best combined stream if the pair is gone by fetch time; AudioOnly
/// fetches the selected stream verbatim and extracts it to MP3.
pub fn build_fetch_options(request: &DownloadRequest) -> FetchOptions {
    let output_template = output_template(&request.destination);
    match &request.mode {
        DownloadMode::MuxedVideoAudio {
            video_format_id,
            audio_format_id,
        } => FetchOptions {
            format_selection: format!("{}+{}/best", video_format_id, audio_format_id),
            output_template,
            merge_output_format: Some(MERGE_CONTAINER.to_string()),
            post_processors: Vec::new(),
        },
        DownloadMode::AudioOnly { audio_format_id } => FetchOptions {
            format_selection: audio_format_id.clone(),
            output_template,
            merge_output_format: None,
            post_processors: vec![PostProcessor {
                kind: PostProcessorKind::ExtractAudio,
                target_codec: AUDIO_CODEC.to_string(),
                target_quality: AUDIO_QUALITY.to_string(),
            }],
        },
    }
}

fn output_template(destination: &Path) -> String {
    destination
        .join(OUTPUT_TEMPLATE)
        .to_string_lossy()
        .into_owned()
}

/// Run one download to completion. Progress callbacks are forwarded into
/// `events` as they arrive; the returned outcome is produced exactly once
/// and is never both a success and a failure.
pub async fn run(
    engine: &dyn MediaEngine,
    request: &DownloadRequest,
    events: &UnboundedSender<DownloadEvent>,
) -> DownloadOutcome {
    let options = build_fetch_options(request);
    info!(
        "[orchestrator] {} fetching {} with selection {}",
        engine.name(),
        request.url,
        options.format_selection
    );

    let progress_tx = events.clone();
    let relay = move |update: ProgressUpdate| {
        let event = match update {
            ProgressUpdate::Downloading { percent, speed } => {
                ProgressEvent::Downloading { percent, speed }
            }
            ProgressUpdate::Finished { filename } => ProgressEvent::ItemFinished {
                file_name: base_name(&filename),
            },
        };
        // A dropped receiver just means nobody is listening anymore; the
        // transfer itself is not cancellable.
        let _ = progress_tx.send(DownloadEvent::Progress(event));
    };

    match engine.fetch_and_write(&request.url, &options, &relay).await {
        Ok(()) => DownloadOutcome::Success("Download completed successfully!".to_string()),
        Err(e) => {
            warn!("[orchestrator] {} fetch failed: {}", engine.name(), e);
            DownloadOutcome::Failure(format!("Download failed: {}", e))
        }
    }
}

fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
