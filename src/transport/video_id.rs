//! Platform video-id extraction
//!
//! Recognized URL shapes: the path segment of short-link hosts
//! (`youtu.be/<id>`) and the `v` query parameter of canonical watch URLs.
//! Anything else is unrecognized and resolution fails with `NotFound`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SHORT_LINK: Regex =
        Regex::new(r"^https?://(?:www\.)?youtu\.be/([A-Za-z0-9_-]{6,})").unwrap();
    static ref WATCH_PARAM: Regex = Regex::new(r"[?&]v=([A-Za-z0-9_-]{6,})").unwrap();
}

/// Extract the platform video id from a URL, if the format is recognized
pub fn extract_video_id(url: &str) -> Option<String> {
    if let Some(caps) = SHORT_LINK.captures(url) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    if let Some(caps) = WATCH_PARAM.captures(url) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    None
}
