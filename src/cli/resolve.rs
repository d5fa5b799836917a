// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::OutputFormat;
use anyhow::Result;

use tvcatalog::video_ref::{self, ThumbnailTier};

pub struct ResolveCommand {
    pub urls: Vec<String>,
    pub format: OutputFormat,
    pub tier: ThumbnailTier,
}

impl ResolveCommand {
    pub fn execute(self) -> Result<()> {
        let references: Vec<_> = self
            .urls
            .iter()
            .map(|url| video_ref::resolve_with_tier(url, self.tier))
            .collect();

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&references)?);
            }
            OutputFormat::Text => {
                for reference in references {
                    println!("{}", reference.source_url);
                    match &reference.playable_id {
                        Some(id) => {
                            println!("  native    : yes ({})", id);
                            println!("  play      : {}", reference.watch_url());
                        }
                        None => println!("  native    : no"),
                    }
                    println!("  thumbnail : {}", reference.thumbnail_url);
                }
            }
        }

        Ok(())
    }
}
