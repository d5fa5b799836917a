// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Turns a raw catalog URL into something the player and the thumbnail
//! loader can use.
//!
//! Resolution never fails: a URL that does not look like a video-host link is
//! simply an external (non-native) source with a placeholder thumbnail.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Generic artwork shown for sources that have no host thumbnail.
pub const PLACEHOLDER_THUMBNAIL: &str =
    "https://placehold.co/1920x1080/1F2937/fff?text=VIDEO+EXTERNO";

const THUMBNAIL_HOST: &str = "https://img.youtube.com/vi";

/// `host/watch?v=`, `host/embed/`, `short-host/<id>`, `host/v/<id>`.
/// Anything after the 11 character token (share tracking `?si=`, extra
/// query parameters) is ignored.
static VIDEO_HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtube\.com|youtu\.be)/(?:v=|embed/|watch\?v=|/v/|v/)?([A-Za-z0-9_-]{11})")
        .expect("video host regex should compile")
});

/// Size tier requested from the thumbnail service, largest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailTier {
    #[default]
    MaxRes,
    High,
    Medium,
    Default,
}

impl ThumbnailTier {
    pub fn file_stem(self) -> &'static str {
        match self {
            ThumbnailTier::MaxRes => "maxresdefault",
            ThumbnailTier::High => "hqdefault",
            ThumbnailTier::Medium => "mqdefault",
            ThumbnailTier::Default => "default",
        }
    }

    pub fn lower(self) -> Option<Self> {
        match self {
            ThumbnailTier::MaxRes => Some(ThumbnailTier::High),
            ThumbnailTier::High => Some(ThumbnailTier::Medium),
            ThumbnailTier::Medium => Some(ThumbnailTier::Default),
            ThumbnailTier::Default => None,
        }
    }

    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "maxres" | "maxresdefault" => Ok(Self::MaxRes),
            "high" | "hq" | "hqdefault" => Ok(Self::High),
            "medium" | "mq" | "mqdefault" => Ok(Self::Medium),
            "default" => Ok(Self::Default),
            _ => anyhow::bail!(
                "Invalid thumbnail tier: {}. Use 'maxres', 'high', 'medium' or 'default'",
                s
            ),
        }
    }
}

/// Thumbnail endpoint for a host video id.
pub fn thumbnail_url(video_id: &str, tier: ThumbnailTier) -> String {
    format!("{}/{}/{}.jpg", THUMBNAIL_HOST, video_id, tier.file_stem())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoReference {
    pub source_url: String,
    /// `None` for every external source.
    pub playable_id: Option<String>,
    pub is_native: bool,
    pub thumbnail_url: String,
}

impl VideoReference {
    /// URL handed to the playback widget. External sources play their raw URL.
    pub fn watch_url(&self) -> String {
        match &self.playable_id {
            Some(id) => format!("https://www.youtube.com/watch?v={}", id),
            None => self.source_url.clone(),
        }
    }

    pub fn embed_url(&self) -> String {
        match &self.playable_id {
            Some(id) => format!(
                "https://www.youtube.com/embed/{}?autoplay=1&rel=0&modestbranding=1",
                id
            ),
            None => self.source_url.clone(),
        }
    }

    pub fn source_label(&self) -> &'static str {
        if self.is_native { "YouTube" } else { "External" }
    }
}

/// Extract the 11 character host token, if any.
pub fn extract_video_id(raw: &str) -> Option<&str> {
    VIDEO_HOST_PATTERN
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn resolve(raw: &str) -> VideoReference {
    resolve_with_tier(raw, ThumbnailTier::default())
}

pub fn resolve_with_tier(raw: &str, tier: ThumbnailTier) -> VideoReference {
    match extract_video_id(raw.trim()) {
        Some(id) => VideoReference {
            source_url: raw.to_string(),
            playable_id: Some(id.to_string()),
            is_native: true,
            thumbnail_url: thumbnail_url(id, tier),
        },
        None => VideoReference {
            source_url: raw.to_string(),
            playable_id: None,
            is_native: false,
            thumbnail_url: PLACEHOLDER_THUMBNAIL.to_string(),
        },
    }
}

/// Same as [`resolve`] for an optional source.
pub fn resolve_opt(raw: Option<&str>) -> VideoReference {
    resolve(raw.unwrap_or_default())
}
