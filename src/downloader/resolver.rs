// Format Resolver
//
// One metadata probe per call; no retry. Classification and ranking live
// in the formats module. The caller decides whether to re-invoke after a
// failure.

use log::{info, warn};

use super::errors::ResolveError;
use super::formats;
use super::models::{ProbeOptions, VideoInfo};
use super::traits::MediaEngine;

/// Probe `url` once and turn the raw format list into ranked rendition
/// lists. The probe runs with a fixed configuration: quiet, per-format
/// extraction errors ignored, subtitles skipped.
pub async fn resolve(engine: &dyn MediaEngine, url: &str) -> Result<VideoInfo, ResolveError> {
    let options = ProbeOptions::default();

    let raw = engine
        .probe(url, &options)
        .await
        .map_err(|e| {
            warn!("[resolver] {} probe failed: {}", engine.name(), e);
            ResolveError::Extraction(e.to_string())
        })?
        .ok_or(ResolveError::NoData)?;

    let (video_formats, audio_formats) = formats::rank(&raw.formats);
    info!(
        "[resolver] {}: {} video / {} audio renditions",
        raw.title,
        video_formats.len(),
        audio_formats.len()
    );

    Ok(VideoInfo {
        title: raw.title,
        duration_label: formats::duration_label(raw.duration),
        video_formats,
        audio_formats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::errors::EngineError;
    use crate::downloader::models::{FetchOptions, ProgressUpdate, RawFormat, RawInfo};
    use crate::downloader::traits::ProgressFn;
    use async_trait::async_trait;

    struct StubEngine {
        probe_result: Result<Option<RawInfo>, EngineError>,
    }

    #[async_trait]
    impl MediaEngine for StubEngine {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn probe(
            &self,
            _url: &str,
            _options: &ProbeOptions,
        ) -> Result<Option<RawInfo>, EngineError> {
            self.probe_result.clone()
        }

        async fn fetch_and_write(
            &self,
            _url: &str,
            _options: &FetchOptions,
            _progress: ProgressFn<'_>,
        ) -> Result<(), EngineError> {
            unimplemented!("resolver tests never fetch")
        }
    }

    fn sample_info() -> RawInfo {
        RawInfo {
            title: "Sample".to_string(),
            duration: Some(125.0),
            formats: vec![
                RawFormat {
                    format_id: "22".to_string(),
                    ext: "mp4".to_string(),
                    vcodec: Some("avc1".to_string()),
                    acodec: Some("aac".to_string()),
                    height: Some(720),
                    fps: Some(30.0),
                    abr: None,
                    filesize: None,
                },
                RawFormat {
                    format_id: "140".to_string(),
                    ext: "mp3".to_string(),
                    vcodec: Some("none".to_string()),
                    acodec: Some("mp3".to_string()),
                    height: None,
                    fps: None,
                    abr: Some(128.0),
                    filesize: None,
                },
            ],
        }
    }

    #[tokio::test]
    async fn resolves_probe_result_into_video_info() {
        let engine = StubEngine {
            probe_result: Ok(Some(sample_info())),
        };

        let info = resolve(&engine, "https://youtu.be/abc").await.unwrap();
        assert_eq!(info.title, "Sample");
        assert_eq!(info.duration_label, "2:05");
        assert_eq!(info.video_formats[0].label, "720p (mp4)");
        assert_eq!(info.audio_formats[0].label, "128kbps (mp3)");
    }

    #[tokio::test]
    async fn empty_probe_is_no_data() {
        let engine = StubEngine {
            probe_result: Ok(None),
        };

        let err = resolve(&engine, "https://youtu.be/abc").await.unwrap_err();
        assert_eq!(err, ResolveError::NoData);
    }

    #[tokio::test]
    async fn engine_fault_passes_diagnostic_through() {
        let engine = StubEngine {
            probe_result: Err(EngineError::Execution("ERROR: Video unavailable".to_string())),
        };

        let err = resolve(&engine, "https://youtu.be/abc").await.unwrap_err();
        assert_eq!(
            err,
            ResolveError::Extraction("ERROR: Video unavailable".to_string())
        );
    }
}
