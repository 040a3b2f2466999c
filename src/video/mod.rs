//! Video source and playback state types, plus URL extraction for the client edge.

use crate::error::RoomError;
use serde::{Deserialize, Serialize};
use url::Url;

/// A playable video. Only known sources with a concrete id can be represented.
///
/// Serialized as `{"source": "youtube" | "gdrive", "id": "<id>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", content = "id")]
pub enum VideoInfo {
    #[serde(rename = "youtube")]
    Youtube(String),
    #[serde(rename = "gdrive")]
    Drive(String),
}

impl VideoInfo {
    pub fn id(&self) -> &str {
        match self {
            VideoInfo::Youtube(id) | VideoInfo::Drive(id) => id,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            VideoInfo::Youtube(_) => YOUTUBE_SOURCE,
            VideoInfo::Drive(_) => DRIVE_SOURCE,
        }
    }
}

const YOUTUBE_SOURCE: &str = "youtube";
const DRIVE_SOURCE: &str = "gdrive";

/// Video description exactly as a client submits it.
///
/// Anything goes here, including `"unknown"` sources and null ids; it only
/// becomes a [`VideoInfo`] through `TryFrom`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawVideoInfo {
    pub source: String,
    #[serde(default)]
    pub id: Option<String>,
}

impl TryFrom<RawVideoInfo> for VideoInfo {
    type Error = RoomError;

    fn try_from(raw: RawVideoInfo) -> Result<Self, Self::Error> {
        let id = match raw.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(RoomError::InvalidVideo("missing video id".to_string())),
        };
        match raw.source.as_str() {
            YOUTUBE_SOURCE => Ok(VideoInfo::Youtube(id)),
            DRIVE_SOURCE => Ok(VideoInfo::Drive(id)),
            other => Err(RoomError::InvalidVideo(format!(
                "unsupported source '{}'",
                other
            ))),
        }
    }
}

impl From<VideoInfo> for RawVideoInfo {
    fn from(info: VideoInfo) -> Self {
        RawVideoInfo {
            source: info.source().to_string(),
            id: Some(info.id().to_string()),
        }
    }
}

/// Authoritative playback state of a room.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoState {
    pub is_playing: bool,
    /// Seconds from the start of the video. A seek target, not a guarantee.
    pub time: f64,
    pub speed: f64,
}

impl Default for VideoState {
    fn default() -> Self {
        VideoState {
            is_playing: false,
            time: 0.0,
            speed: 1.0,
        }
    }
}

impl VideoState {
    /// State every room jumps to when its video changes.
    pub fn fresh() -> Self {
        VideoState {
            is_playing: true,
            time: 0.0,
            speed: 1.0,
        }
    }

    /// Overwrites the fields present in `partial`, leaving the rest untouched.
    pub fn merge(&mut self, partial: &PartialVideoState) {
        if let Some(is_playing) = partial.is_playing {
            self.is_playing = is_playing;
        }
        if let Some(time) = partial.time {
            self.time = time;
        }
        if let Some(speed) = partial.speed {
            self.speed = speed;
        }
    }

    pub fn merged(mut self, partial: &PartialVideoState) -> Self {
        self.merge(partial);
        self
    }
}

/// A playback change submitted by a client. Absent fields keep their value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialVideoState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_playing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl PartialVideoState {
    pub fn is_empty(&self) -> bool {
        self.is_playing.is_none() && self.time.is_none() && self.speed.is_none()
    }

    /// Rejects values that would break the `VideoState` invariants.
    pub fn validate(&self) -> Result<(), RoomError> {
        if let Some(time) = self.time {
            if !time.is_finite() || time < 0.0 {
                return Err(RoomError::InvalidPlaybackState(format!(
                    "time must be a non-negative number, got {}",
                    time
                )));
            }
        }
        if let Some(speed) = self.speed {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(RoomError::InvalidPlaybackState(format!(
                    "speed must be a positive number, got {}",
                    speed
                )));
            }
        }
        Ok(())
    }
}

impl From<VideoState> for PartialVideoState {
    fn from(state: VideoState) -> Self {
        PartialVideoState {
            is_playing: Some(state.is_playing),
            time: Some(state.time),
            speed: Some(state.speed),
        }
    }
}

const YOUTUBE_ID_LEN: usize = 11;

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn youtube_id(candidate: &str) -> Option<String> {
    let id: String = candidate.chars().take(YOUTUBE_ID_LEN).collect();
    if id.chars().count() == YOUTUBE_ID_LEN && id.chars().all(is_id_char) {
        Some(id)
    } else {
        None
    }
}

fn drive_id(candidate: &str) -> Option<String> {
    let id: String = candidate.chars().take_while(|c| is_id_char(*c)).collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Extracts a [`VideoInfo`] from a pasted YouTube or Google Drive link.
///
/// Links without a scheme are accepted. Returns `None` for anything else, so
/// a malformed link never turns into a `change-video` event.
pub fn parse_video_url(input: &str) -> Option<VideoInfo> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let url = Url::parse(input)
        .ok()
        .filter(|url| url.host_str().is_some())
        .or_else(|| Url::parse(&format!("https://{}", input)).ok())?;
    let host = url.host_str()?.trim_start_matches("www.").to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    match host.as_str() {
        "youtu.be" => segments.first().and_then(|id| youtube_id(id)).map(VideoInfo::Youtube),
        "youtube.com" | "m.youtube.com" | "music.youtube.com" | "youtube-nocookie.com" => {
            if let Some((_, v)) = url.query_pairs().find(|(key, _)| key == "v") {
                return youtube_id(&v).map(VideoInfo::Youtube);
            }
            match segments.as_slice() {
                [kind, id, ..] if matches!(*kind, "embed" | "v" | "e" | "shorts" | "live") => {
                    youtube_id(id).map(VideoInfo::Youtube)
                }
                _ => None,
            }
        }
        "drive.google.com" => {
            if let ["file", "d", id, ..] = segments.as_slice() {
                return drive_id(id).map(VideoInfo::Drive);
            }
            if let ["open"] = segments.as_slice() {
                return url
                    .query_pairs()
                    .find(|(key, _)| key == "id")
                    .and_then(|(_, id)| drive_id(&id))
                    .map(VideoInfo::Drive);
            }
            None
        }
        _ => None,
    }
}
