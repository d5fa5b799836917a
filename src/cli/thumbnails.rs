// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::OutputFormat;
use anyhow::Result;
use futures_util::StreamExt;
use futures_util::stream;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use tvcatalog::catalog::Catalog;
use tvcatalog::thumbnail::{ThumbnailProbe, ThumbnailSource};
use tvcatalog::video_ref::{self, ThumbnailTier};

pub struct ThumbnailsCommand {
    pub check: bool,
    pub concurrency: usize,
    pub format: OutputFormat,
    pub tier: ThumbnailTier,
}

struct Row {
    title: String,
    source: ThumbnailSource,
}

impl ThumbnailsCommand {
    pub async fn execute(self, catalog: &Catalog) -> Result<()> {
        let entries: Vec<(String, String)> = std::iter::once((
            catalog.hero.title.clone(),
            catalog.hero.source_url.clone(),
        ))
        .chain(
            catalog
                .categories
                .iter()
                .flat_map(|c| c.entries.iter())
                .map(|e| (e.title.clone(), e.source_url.clone())),
        )
        .collect();

        let rows = if self.check {
            self.probe(entries).await?
        } else {
            entries
                .into_iter()
                .map(|(title, url)| Row {
                    source: ThumbnailSource::for_reference(&video_ref::resolve(&url), self.tier),
                    title,
                })
                .collect()
        };

        match self.format {
            OutputFormat::Json => {
                let out: Vec<_> = rows
                    .iter()
                    .map(|row| {
                        json!({
                            "title": row.title,
                            "thumbnail": row.source.url(),
                            "placeholder": row.source.is_placeholder(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            OutputFormat::Text => {
                for row in &rows {
                    println!("{} | {}", row.source.url(), row.title);
                }
                if self.check {
                    let missing = rows.iter().filter(|r| r.source.is_placeholder()).count();
                    eprintln!("{} of {} use the placeholder", missing, rows.len());
                }
            }
        }

        Ok(())
    }

    async fn probe(&self, entries: Vec<(String, String)>) -> Result<Vec<Row>> {
        let probe = ThumbnailProbe::new()?;

        let pb = ProgressBar::new(entries.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_message("Checking thumbnails...");

        let tier = self.tier;
        let probe = &probe;
        let pb_ref = &pb;
        let mut rows: Vec<(usize, Row)> = stream::iter(entries.into_iter().enumerate())
            .map(|(index, (title, url))| async move {
                let reference = video_ref::resolve(&url);
                let source = probe.resolve(&reference, tier).await;
                pb_ref.inc(1);
                (index, Row { title, source })
            })
            .buffer_unordered(self.concurrency.max(1))
            .collect()
            .await;

        pb.finish_and_clear();
        rows.sort_by_key(|(index, _)| *index);
        Ok(rows.into_iter().map(|(_, row)| row).collect())
    }
}
