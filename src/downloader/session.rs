// Session Controller
//
// Serializes the resolve and download operations and owns the resolved
// format state. At most one background task is ever in flight; a second
// request is rejected synchronously, never queued. Completion transitions
// are applied before the signal is delivered, so a caller observing a
// result always sees the settled phase.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use log::info;
use tokio::sync::{mpsc, oneshot};

use super::errors::{ResolveError, ValidationError};
use super::models::{DownloadEvent, DownloadMode, DownloadRequest, VideoInfo};
use super::orchestrator;
use super::resolver;
use super::traits::MediaEngine;
use super::utils;

/// Where the session currently is in its
/// Idle → Resolving → Resolved → Downloading → Resolved cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Resolving,
    Resolved,
    Downloading,
}

/// Which streams a download should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadKind {
    /// Fetch a video and an audio rendition and mux them
    VideoAudio,
    /// Fetch an audio rendition only
    AudioOnly,
}

struct SessionInner {
    phase: SessionPhase,
    info: Option<Arc<VideoInfo>>,
}

/// One user-facing session: a single resolve/download cycle at a time,
/// with the last resolve result retained across downloads.
pub struct Session {
    engine: Arc<dyn MediaEngine>,
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    pub fn new(engine: Arc<dyn MediaEngine>) -> Self {
        Self {
            engine,
            inner: Arc::new(Mutex::new(SessionInner {
                phase: SessionPhase::Idle,
                info: None,
            })),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        lock_state(&self.inner).phase
    }

    /// The most recent resolve result, retained until the next resolve
    /// begins or a resolve fails.
    pub fn video_info(&self) -> Option<Arc<VideoInfo>> {
        lock_state(&self.inner).info.clone()
    }

    /// Start resolving `url` on a background task. Returns the receiver
    /// for the single completion signal, or a synchronous rejection that
    /// leaves the session untouched.
    pub fn resolve(
        &self,
        url: &str,
    ) -> Result<oneshot::Receiver<Result<Arc<VideoInfo>, ResolveError>>, ValidationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if !utils::is_supported_url(url) {
            return Err(ValidationError::InvalidUrl(url.to_string()));
        }

        {
            let mut inner = lock_state(&self.inner);
            match inner.phase {
                SessionPhase::Resolving => return Err(ValidationError::Busy("resolve")),
                SessionPhase::Downloading => return Err(ValidationError::Busy("download")),
                SessionPhase::Idle | SessionPhase::Resolved => {}
            }
            inner.phase = SessionPhase::Resolving;
            // The prior rendition lists are discarded as the new resolve
            // begins.
            inner.info = None;
        }
        info!("[session] resolving {}", url);

        let (tx, rx) = oneshot::channel();
        let engine = Arc::clone(&self.engine);
        let state = Arc::clone(&self.inner);
        let url = url.to_string();
        tokio::spawn(async move {
            let result = resolver::resolve(engine.as_ref(), &url).await;
            let result = {
                let mut inner = lock_state(&state);
                match result {
                    Ok(info) => {
                        let info = Arc::new(info);
                        inner.phase = SessionPhase::Resolved;
                        inner.info = Some(Arc::clone(&info));
                        Ok(info)
                    }
                    Err(e) => {
                        inner.phase = SessionPhase::Idle;
                        inner.info = None;
                        Err(e)
                    }
                }
            };
            let _ = tx.send(result);
        });
        Ok(rx)
    }

    /// Start downloading the selected renditions of `url` into
    /// `destination` on a background task. Returns the receiver for the
    /// progress stream and its single terminal event, or a synchronous
    /// rejection that leaves the session untouched.
    pub fn start_download(
        &self,
        url: &str,
        destination: &Path,
        kind: DownloadKind,
        video_format_id: Option<&str>,
        audio_format_id: Option<&str>,
    ) -> Result<mpsc::UnboundedReceiver<DownloadEvent>, ValidationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if !destination.is_dir() {
            return Err(ValidationError::MissingDirectory(
                destination.display().to_string(),
            ));
        }

        let request = {
            let mut inner = lock_state(&self.inner);
            match inner.phase {
                SessionPhase::Resolving => return Err(ValidationError::Busy("resolve")),
                SessionPhase::Downloading => return Err(ValidationError::Busy("download")),
                SessionPhase::Idle => return Err(ValidationError::NothingResolved),
                SessionPhase::Resolved => {}
            }
            let info = inner.info.as_ref().ok_or(ValidationError::NothingResolved)?;
            let mode = build_mode(info, kind, video_format_id, audio_format_id)?;
            inner.phase = SessionPhase::Downloading;
            DownloadRequest {
                url: url.to_string(),
                destination: destination.to_path_buf(),
                mode,
            }
        };
        info!("[session] downloading {} to {}", url, destination.display());

        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Arc::clone(&self.engine);
        let state = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let outcome = orchestrator::run(engine.as_ref(), &request, &tx).await;
            // Renditions are retained so another download can start
            // without re-resolving.
            lock_state(&state).phase = SessionPhase::Resolved;
            let _ = tx.send(DownloadEvent::Finished(outcome));
        });
        Ok(rx)
    }
}

fn lock_state(state: &Mutex<SessionInner>) -> MutexGuard<'_, SessionInner> {
    // A poisoned lock only means a panicked test task; the state itself is
    // a plain enum + Arc and stays coherent.
    state.lock().unwrap_or_else(|e| e.into_inner())
}

fn build_mode(
    info: &VideoInfo,
    kind: DownloadKind,
    video_format_id: Option<&str>,
    audio_format_id: Option<&str>,
) -> Result<DownloadMode, ValidationError> {
    let audio = pick(audio_format_id, &info.audio_formats, "audio")?;
    match kind {
        DownloadKind::VideoAudio => {
            let video = pick(video_format_id, &info.video_formats, "video")?;
            Ok(DownloadMode::MuxedVideoAudio {
                video_format_id: video,
                audio_format_id: audio,
            })
        }
        DownloadKind::AudioOnly => Ok(DownloadMode::AudioOnly {
            audio_format_id: audio,
        }),
    }
}

// A selection must name a rendition from the current resolved list; a
// stale or foreign id counts as missing.
fn pick(
    selected: Option<&str>,
    available: &[super::models::RankedFormat],
    which: &'static str,
) -> Result<String, ValidationError> {
    let id = selected.ok_or(ValidationError::MissingSelection(which))?;
    if !available.iter().any(|f| f.format_id == id) {
        return Err(ValidationError::MissingSelection(which));
    }
    Ok(id.to_string())
}
