// Shared helpers: URL shape checks and the platform download directory

use std::path::PathBuf;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL_SHAPES: [Regex; 4] = [
        Regex::new(r"^(?:https?://)(?:www\.)?youtube\.com/watch\?v=[\w-]+").unwrap(),
        Regex::new(r"^(?:https?://)(?:www\.)?youtu\.be/[\w-]+").unwrap(),
        Regex::new(r"^(?:https?://)(?:www\.)?youtube\.com/embed/[\w-]+").unwrap(),
        Regex::new(r"^(?:https?://)(?:www\.)?youtube\.com/v/[\w-]+").unwrap(),
    ];
}

/// Fixed shape check for supported video URLs.
pub fn is_supported_url(url: &str) -> bool {
    URL_SHAPES.iter().any(|pattern| pattern.is_match(url))
}

/// Conventional destination for downloads on this platform.
pub fn default_save_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}
