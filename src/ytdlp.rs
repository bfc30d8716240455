// yt-dlp engine: drives the yt-dlp binary for probing and downloading.
//
// Probing runs `yt-dlp --dump-json` and parses the single-video JSON into
// RawInfo. Downloading spawns `yt-dlp --newline` and turns its stdout
// progress lines into the engine progress callback.

use std::process::Stdio;

use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::downloader::errors::EngineError;
use crate::downloader::models::{
    FetchOptions, PostProcessorKind, ProbeOptions, ProgressUpdate, RawFormat, RawInfo,
};
use crate::downloader::traits::{MediaEngine, ProgressFn};

/// Extraction/download engine backed by the yt-dlp binary.
pub struct YtDlpEngine {
    binary_path: String,
}

impl YtDlpEngine {
    pub fn new() -> Self {
        Self {
            binary_path: find_ytdlp(),
        }
    }

    pub fn with_binary(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    fn probe_args(url: &str, options: &ProbeOptions) -> Vec<String> {
        let mut args = vec!["--dump-json".to_string(), "--no-playlist".to_string()];
        if options.quiet {
            args.push("--no-warnings".to_string());
        }
        if options.ignore_format_errors {
            args.push("--ignore-errors".to_string());
        }
        if options.no_subtitles {
            args.push("--no-write-subs".to_string());
            args.push("--no-write-auto-subs".to_string());
        }
        args.push(url.to_string());
        args
    }

    fn fetch_args(url: &str, options: &FetchOptions) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            options.format_selection.clone(),
            "--newline".to_string(),
            "--no-playlist".to_string(),
            "--no-check-certificates".to_string(),
            "-o".to_string(),
            options.output_template.clone(),
        ];
        if let Some(container) = &options.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(container.clone());
        }
        for pp in &options.post_processors {
            match pp.kind {
                PostProcessorKind::ExtractAudio => {
                    args.push("-x".to_string());
                    args.push("--audio-format".to_string());
                    args.push(pp.target_codec.clone());
                    args.push("--audio-quality".to_string());
                    args.push(pp.target_quality.clone());
                }
            }
        }
        args.push(url.to_string());
        args
    }
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn probe(
        &self,
        url: &str,
        options: &ProbeOptions,
    ) -> Result<Option<RawInfo>, EngineError> {
        let args = Self::probe_args(url, options);
        debug!("[yt-dlp] probe: {} {}", self.binary_path, args.join(" "));

        let output = Command::new(&self.binary_path)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                EngineError::ToolNotFound(format!("failed to start {}: {}", self.binary_path, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Execution(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json_str = stdout.trim();
        if json_str.is_empty() {
            // --ignore-errors can exit 0 with nothing extracted
            return Ok(None);
        }
        parse_raw_info(json_str).map(Some)
    }

    async fn fetch_and_write(
        &self,
        url: &str,
        options: &FetchOptions,
        progress: ProgressFn<'_>,
    ) -> Result<(), EngineError> {
        let args = Self::fetch_args(url, options);
        info!("[yt-dlp] fetch: {} {}", self.binary_path, args.join(" "));

        let mut child = Command::new(&self.binary_path)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                EngineError::ToolNotFound(format!("failed to start {}: {}", self.binary_path, e))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Execution("failed to capture yt-dlp stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::Execution("failed to capture yt-dlp stderr".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = BufReader::new(stderr).read_to_string(&mut buf).await;
            buf
        });

        let mut lines = BufReader::new(stdout).lines();
        let mut current_file: Option<String> = None;
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_progress_line(&line) {
                Some(ParsedLine::Destination(path)) => {
                    debug!("[yt-dlp] {}", line);
                    current_file = Some(path);
                }
                Some(ParsedLine::Progress { percent, speed }) => {
                    progress(ProgressUpdate::Downloading { percent, speed });
                }
                Some(ParsedLine::Completed) => {
                    debug!("[yt-dlp] {}", line);
                    if let Some(filename) = current_file.clone() {
                        progress(ProgressUpdate::Finished { filename });
                    }
                }
                None => {}
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| EngineError::Execution(format!("failed to wait for yt-dlp: {}", e)))?;
        let stderr_output = stderr_task.await.unwrap_or_default();

        if status.success() {
            info!("[yt-dlp] fetch finished: {}", url);
            Ok(())
        } else {
            let diagnostic = stderr_output.trim();
            if diagnostic.is_empty() {
                Err(EngineError::Execution(format!(
                    "yt-dlp exited with {}",
                    status
                )))
            } else {
                Err(EngineError::Execution(diagnostic.to_string()))
            }
        }
    }
}

// Find the yt-dlp executable in common install locations.
// Example: export YTDLP_PATH="/path/to/yt-dlp"
fn find_ytdlp() -> String {
    if let Ok(custom) = std::env::var("YTDLP_PATH") {
        return custom;
    }

    let common_paths = [
        "/opt/homebrew/bin/yt-dlp",
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
    ];
    for path in common_paths {
        if std::path::Path::new(path).exists() {
            return path.to_string();
        }
    }

    if let Ok(output) = std::process::Command::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if !path.is_empty() {
                return path;
            }
        }
    }

    "yt-dlp".to_string()
}

fn parse_raw_info(json_str: &str) -> Result<RawInfo, EngineError> {
    let json: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| EngineError::Parse(format!("invalid probe JSON: {}", e)))?;

    let formats = json["formats"]
        .as_array()
        .map(|list| list.iter().map(parse_format).collect())
        .unwrap_or_default();

    Ok(RawInfo {
        title: json["title"].as_str().unwrap_or("Unknown Title").to_string(),
        duration: json["duration"].as_f64(),
        formats,
    })
}

fn parse_format(f: &serde_json::Value) -> RawFormat {
    RawFormat {
        format_id: f["format_id"].as_str().unwrap_or("").to_string(),
        ext: f["ext"].as_str().unwrap_or("unknown").to_string(),
        vcodec: f["vcodec"].as_str().map(|s| s.to_string()),
        acodec: f["acodec"].as_str().map(|s| s.to_string()),
        height: f["height"].as_u64().map(|h| h as u32),
        fps: f["fps"].as_f64(),
        abr: f["abr"].as_f64(),
        filesize: f["filesize"].as_u64(),
    }
}

#[derive(Debug, PartialEq)]
enum ParsedLine {
    /// "[download]  12.5% of ~ 310.04MiB at 374.36KiB/s ETA 11:59"
    Progress { percent: String, speed: String },
    /// "[download] Destination: /path/to/file"
    Destination(String),
    /// "[download] 100% of 310.04MiB in 00:12" — one stream segment done
    Completed,
}

fn parse_progress_line(line: &str) -> Option<ParsedLine> {
    lazy_static! {
        static ref PROGRESS_RE: Regex = Regex::new(
            r"\[download\]\s+(\d+\.?\d*%)\s+of\s+~?\s*[\d.]+\s*\S+\s+at\s+(\d+\.?\d*\s*\w+/s)"
        )
        .unwrap();
        static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
        static ref DONE_RE: Regex =
            Regex::new(r"\[download\]\s+100%\s+of\s+~?\s*[\d.]+\s*\S+\s+in\s+").unwrap();
    }

    if DONE_RE.is_match(line) {
        return Some(ParsedLine::Completed);
    }
    if let Some(caps) = PROGRESS_RE.captures(line) {
        return Some(ParsedLine::Progress {
            percent: caps.get(1)?.as_str().to_string(),
            speed: caps.get(2)?.as_str().to_string(),
        });
    }
    if let Some(caps) = DEST_RE.captures(line) {
        return Some(ParsedLine::Destination(caps.get(1)?.as_str().to_string()));
    }
    None
}
