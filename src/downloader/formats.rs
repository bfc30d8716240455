// Format classification and ranking
//
// Splits the engine's raw format list into a video list (both tracks
// present) and an audio-only list, derives display labels and sorts each
// by quality descending. Ties keep the engine's original order.

use std::cmp::Ordering;

use super::models::{RankedFormat, RawFormat};

/// How a raw format is usable, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Image and sound track both present
    Video,
    /// Sound track only
    AudioOnly,
    /// Image track only, or neither; excluded from both lists
    Unusable,
}

impl FormatKind {
    pub fn classify(format: &RawFormat) -> Self {
        let video = codec_present(&format.vcodec);
        let audio = codec_present(&format.acodec);
        if video && audio {
            Self::Video
        } else if audio {
            Self::AudioOnly
        } else {
            Self::Unusable
        }
    }
}

fn codec_present(codec: &Option<String>) -> bool {
    codec.as_ref().map_or(false, |c| c != "none" && !c.is_empty())
}

/// Classify and rank the raw list into (video, audio) rendition lists.
/// Video entries with no height and audio entries with no bitrate are
/// skipped; zero counts as missing.
pub fn rank(formats: &[RawFormat]) -> (Vec<RankedFormat>, Vec<RankedFormat>) {
    let mut video = Vec::new();
    let mut audio = Vec::new();

    for format in formats {
        match FormatKind::classify(format) {
            FormatKind::Video => {
                let height = match format.height {
                    Some(h) if h > 0 => h,
                    _ => continue,
                };
                video.push(RankedFormat {
                    label: video_label(format, height),
                    format_id: format.format_id.clone(),
                    sort_key: height as f64,
                });
            }
            FormatKind::AudioOnly => {
                let abr = match format.abr {
                    Some(b) if b > 0.0 => b,
                    _ => continue,
                };
                audio.push(RankedFormat {
                    label: audio_label(format, abr),
                    format_id: format.format_id.clone(),
                    sort_key: abr,
                });
            }
            FormatKind::Unusable => {}
        }
    }

    sort_descending(&mut video);
    sort_descending(&mut audio);
    (video, audio)
}

// Stable, so equal keys preserve the engine's order.
fn sort_descending(list: &mut [RankedFormat]) {
    list.sort_by(|a, b| {
        b.sort_key
            .partial_cmp(&a.sort_key)
            .unwrap_or(Ordering::Equal)
    });
}

fn video_label(format: &RawFormat, height: u32) -> String {
    let mut label = format!("{}p", height);
    if let Some(fps) = format.fps {
        if fps > 30.0 {
            label.push_str(&format!("{}", fps.round() as u32));
        }
    }
    label.push_str(&format!(" ({})", format.ext));
    label.push_str(&size_suffix(format.filesize));
    label
}

fn audio_label(format: &RawFormat, abr: f64) -> String {
    format!(
        "{}kbps ({}){}",
        abr.round() as u32,
        format.ext,
        size_suffix(format.filesize)
    )
}

fn size_suffix(filesize: Option<u64>) -> String {
    match filesize {
        Some(bytes) if bytes > 0 => format!(" (~{}MB)", bytes / (1024 * 1024)),
        _ => String::new(),
    }
}

/// "<minutes>:<seconds, zero-padded>" when the duration is known,
/// "Unknown" otherwise.
pub fn duration_label(duration: Option<f64>) -> String {
    let secs = duration.unwrap_or(0.0) as i64;
    if secs <= 0 {
        return "Unknown".to_string();
    }
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_format(id: &str, height: u32, ext: &str) -> RawFormat {
        RawFormat {
            format_id: id.to_string(),
            ext: ext.to_string(),
            vcodec: Some("avc1.4d401f".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            height: Some(height),
            fps: Some(30.0),
            abr: None,
            filesize: None,
        }
    }

    fn audio_format(id: &str, abr: f64, ext: &str) -> RawFormat {
        RawFormat {
            format_id: id.to_string(),
            ext: ext.to_string(),
            vcodec: Some("none".to_string()),
            acodec: Some("mp3".to_string()),
            height: None,
            fps: None,
            abr: Some(abr),
            filesize: None,
        }
    }

    #[test]
    fn classify_both_tracks_as_video() {
        assert_eq!(
            FormatKind::classify(&video_format("22", 720, "mp4")),
            FormatKind::Video
        );
    }

    #[test]
    fn classify_sound_only_as_audio() {
        assert_eq!(
            FormatKind::classify(&audio_format("140", 128.0, "m4a")),
            FormatKind::AudioOnly
        );
    }

    #[test]
    fn classify_image_only_as_unusable() {
        let mut f = video_format("137", 1080, "mp4");
        f.acodec = Some("none".to_string());
        assert_eq!(FormatKind::classify(&f), FormatKind::Unusable);
    }

    #[test]
    fn classify_missing_codecs_as_unusable() {
        let f = RawFormat {
            format_id: "sb0".to_string(),
            ext: "mhtml".to_string(),
            vcodec: None,
            acodec: None,
            height: None,
            fps: None,
            abr: None,
            filesize: None,
        };
        assert_eq!(FormatKind::classify(&f), FormatKind::Unusable);
    }

    #[test]
    fn classify_empty_codec_as_absent() {
        let mut f = audio_format("251", 160.0, "webm");
        f.vcodec = Some(String::new());
        assert_eq!(FormatKind::classify(&f), FormatKind::AudioOnly);
    }

    #[test]
    fn ranks_mixed_probe_result() {
        let formats = vec![
            video_format("22", 720, "mp4"),
            audio_format("140", 128.0, "mp3"),
        ];

        let (video, audio) = rank(&formats);

        assert_eq!(video.len(), 1);
        assert_eq!(video[0].label, "720p (mp4)");
        assert_eq!(video[0].format_id, "22");
        assert_eq!(audio.len(), 1);
        assert_eq!(audio[0].label, "128kbps (mp3)");
        assert_eq!(audio[0].format_id, "140");
    }

    #[test]
    fn video_sorted_by_height_descending() {
        let formats = vec![
            video_format("18", 360, "mp4"),
            video_format("22", 720, "mp4"),
            video_format("37", 1080, "mp4"),
        ];

        let (video, _) = rank(&formats);
        let heights: Vec<f64> = video.iter().map(|f| f.sort_key).collect();
        assert_eq!(heights, vec![1080.0, 720.0, 360.0]);
    }

    #[test]
    fn audio_sorted_by_bitrate_descending() {
        let formats = vec![
            audio_format("139", 48.0, "m4a"),
            audio_format("251", 160.0, "webm"),
            audio_format("140", 128.0, "m4a"),
        ];

        let (_, audio) = rank(&formats);
        let ids: Vec<&str> = audio.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, vec!["251", "140", "139"]);
    }

    #[test]
    fn equal_keys_keep_engine_order() {
        let formats = vec![
            video_format("first", 720, "mp4"),
            video_format("second", 720, "webm"),
            video_format("third", 720, "mp4"),
        ];

        let (video, _) = rank(&formats);
        let ids: Vec<&str> = video.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn zero_and_missing_height_excluded() {
        let mut no_height = video_format("a", 720, "mp4");
        no_height.height = None;
        let mut zero_height = video_format("b", 720, "mp4");
        zero_height.height = Some(0);

        let (video, audio) = rank(&[no_height, zero_height]);
        assert!(video.is_empty());
        assert!(audio.is_empty());
    }

    #[test]
    fn zero_and_missing_bitrate_excluded() {
        let mut no_abr = audio_format("a", 128.0, "m4a");
        no_abr.abr = None;
        let mut zero_abr = audio_format("b", 128.0, "m4a");
        zero_abr.abr = Some(0.0);

        let (_, audio) = rank(&[no_abr, zero_abr]);
        assert!(audio.is_empty());
    }

    #[test]
    fn high_fps_appended_to_video_label() {
        let mut f = video_format("299", 1080, "mp4");
        f.fps = Some(60.0);
        let (video, _) = rank(&[f]);
        assert_eq!(video[0].label, "1080p60 (mp4)");
    }

    #[test]
    fn thirty_fps_gets_no_suffix() {
        let (video, _) = rank(&[video_format("22", 720, "mp4")]);
        assert_eq!(video[0].label, "720p (mp4)");
    }

    #[test]
    fn known_size_floored_to_whole_megabytes() {
        let mut f = video_format("22", 720, "mp4");
        f.filesize = Some(12 * 1024 * 1024 + 900_000);
        let (video, _) = rank(&[f]);
        assert_eq!(video[0].label, "720p (mp4) (~12MB)");

        let mut a = audio_format("140", 128.5, "m4a");
        a.filesize = Some(5 * 1024 * 1024);
        let (_, audio) = rank(&[a]);
        assert_eq!(audio[0].label, "129kbps (m4a) (~5MB)");
    }

    #[test]
    fn ranking_is_deterministic() {
        let formats = vec![
            video_format("22", 720, "mp4"),
            video_format("37", 1080, "mp4"),
            audio_format("140", 128.0, "m4a"),
            audio_format("251", 160.0, "webm"),
        ];

        assert_eq!(rank(&formats), rank(&formats));
    }

    #[test]
    fn duration_labels() {
        assert_eq!(duration_label(Some(125.0)), "2:05");
        assert_eq!(duration_label(Some(3665.0)), "61:05");
        assert_eq!(duration_label(Some(0.0)), "Unknown");
        assert_eq!(duration_label(None), "Unknown");
    }
}
