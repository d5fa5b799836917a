// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::video_ref::{PLACEHOLDER_THUMBNAIL, ThumbnailTier, VideoReference, thumbnail_url};

/// Placeholder used for a card whose thumbnail failed to load at every tier.
pub const CARD_PLACEHOLDER: &str = "https://placehold.co/600x337/333/fff?text=VIDEO+EXTERNO";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailSource {
    Remote {
        video_id: String,
        tier: ThumbnailTier,
        /// Set once the reduced-quality retry has been used.
        retried: bool,
    },
    /// Non-native reference: the same placeholder the resolver hands out.
    External,
    /// Every attempt failed.
    Placeholder,
}

impl ThumbnailSource {
    pub fn for_reference(reference: &VideoReference, tier: ThumbnailTier) -> Self {
        match &reference.playable_id {
            Some(id) if reference.is_native => ThumbnailSource::Remote {
                video_id: id.clone(),
                tier,
                retried: false,
            },
            _ => ThumbnailSource::External,
        }
    }

    pub fn url(&self) -> String {
        match self {
            ThumbnailSource::Remote { video_id, tier, .. } => thumbnail_url(video_id, *tier),
            ThumbnailSource::External => PLACEHOLDER_THUMBNAIL.to_string(),
            ThumbnailSource::Placeholder => CARD_PLACEHOLDER.to_string(),
        }
    }

    /// Next source to try after a load failure: one retry at the next lower
    /// tier, then the card placeholder.
    pub fn degrade(&self) -> Self {
        match self {
            ThumbnailSource::Remote {
                video_id,
                tier,
                retried: false,
            } => match tier.lower() {
                Some(lower) => ThumbnailSource::Remote {
                    video_id: video_id.clone(),
                    tier: lower,
                    retried: true,
                },
                None => ThumbnailSource::Placeholder,
            },
            ThumbnailSource::External => ThumbnailSource::External,
            _ => ThumbnailSource::Placeholder,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ThumbnailSource::External | ThumbnailSource::Placeholder)
    }
}

/// Checks thumbnail availability over HTTP, degrading like the card image
/// loader does.
pub struct ThumbnailProbe {
    client: Client,
}

impl ThumbnailProbe {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .user_agent("Mozilla/5.0")
                .build()?,
        })
    }

    async fn is_available(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => {
                let ok = response.status().is_success();
                debug!("Thumbnail {} -> {}", url, response.status());
                ok
            }
            Err(e) => {
                warn!("Thumbnail request failed for {}: {}", url, e);
                false
            }
        }
    }

    pub async fn resolve(&self, reference: &VideoReference, tier: ThumbnailTier) -> ThumbnailSource {
        let mut source = ThumbnailSource::for_reference(reference, tier);

        while !source.is_placeholder() {
            if self.is_available(&source.url()).await {
                return source;
            }
            source = source.degrade();
        }

        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video_ref::resolve;

    #[test]
    fn degrade_chain_retries_once_then_placeholder() {
        let reference = resolve("https://youtu.be/bd7PTHImmaI");
        let first = ThumbnailSource::for_reference(&reference, ThumbnailTier::MaxRes);
        assert!(first.url().ends_with("/maxresdefault.jpg"));

        let second = first.degrade();
        assert!(second.url().ends_with("/hqdefault.jpg"));

        let third = second.degrade();
        assert_eq!(third, ThumbnailSource::Placeholder);
        assert_eq!(third.degrade(), ThumbnailSource::Placeholder);
        assert_eq!(third.url(), CARD_PLACEHOLDER);
    }

    #[test]
    fn lower_tiers_step_down_once() {
        let reference = resolve("https://youtu.be/bd7PTHImmaI");

        let high = ThumbnailSource::for_reference(&reference, ThumbnailTier::High).degrade();
        assert!(high.url().ends_with("/mqdefault.jpg"));
        assert_eq!(high.degrade(), ThumbnailSource::Placeholder);

        let medium = ThumbnailSource::for_reference(&reference, ThumbnailTier::Medium).degrade();
        assert!(medium.url().ends_with("/default.jpg"));
        assert!(!medium.is_placeholder());
        assert_eq!(medium.degrade(), ThumbnailSource::Placeholder);

        // Nothing below the smallest tier
        let smallest = ThumbnailSource::for_reference(&reference, ThumbnailTier::Default);
        assert_eq!(smallest.degrade(), ThumbnailSource::Placeholder);
    }

    #[test]
    fn external_sources_use_the_resolver_placeholder() {
        let reference = resolve("https://mitelefe.com/vivo/");
        let source = ThumbnailSource::for_reference(&reference, ThumbnailTier::MaxRes);
        assert!(source.is_placeholder());
        assert_eq!(source.url(), reference.thumbnail_url);
        assert_eq!(source.degrade(), ThumbnailSource::External);
        assert_ne!(source.url(), CARD_PLACEHOLDER);
    }
}
