// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::OutputFormat;
use anyhow::Result;
use serde_json::{Value, json};

use tvcatalog::catalog::{Catalog, CatalogEntry};
use tvcatalog::video_ref::{self, ThumbnailTier};

/// Prints the catalog the way the home screen lays it out.
pub struct ListCommand {
    pub format: OutputFormat,
    pub carousel_limit: usize,
    pub tier: ThumbnailTier,
}

impl ListCommand {
    pub fn execute(self, catalog: &Catalog) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&self.layout(catalog))?);
            }
            OutputFormat::Text => self.print_text(catalog),
        }
        Ok(())
    }

    fn card(&self, entry: &CatalogEntry) -> Value {
        let reference = video_ref::resolve_with_tier(&entry.source_url, self.tier);
        json!({
            "title": entry.title,
            "url": entry.source_url,
            "native": reference.is_native,
            "video_id": reference.playable_id,
            "thumbnail": reference.thumbnail_url,
        })
    }

    fn layout(&self, catalog: &Catalog) -> Value {
        let rows: Vec<Value> = catalog
            .categories
            .iter()
            .enumerate()
            .map(|(index, category)| {
                let carousel = category.carousel(self.carousel_limit);
                json!({
                    "row": Catalog::row_of(index),
                    "name": category.name,
                    "total": category.entries.len(),
                    "cards": carousel.cards.iter().map(|e| self.card(e)).collect::<Vec<_>>(),
                    "show_more": carousel.has_show_more().then_some(carousel.remaining),
                })
            })
            .collect();

        let hero = video_ref::resolve_with_tier(&catalog.hero.source_url, self.tier);
        json!({
            "hero": {
                "title": catalog.hero.title,
                "description": catalog.hero.description,
                "url": catalog.hero.source_url,
                "native": hero.is_native,
                "thumbnail": hero.thumbnail_url,
            },
            "rows": rows,
        })
    }

    fn print_text(&self, catalog: &Catalog) {
        let hero = video_ref::resolve(&catalog.hero.source_url);
        println!("[0] {} ({})", catalog.hero.title, hero.source_label());

        for (index, category) in catalog.categories.iter().enumerate() {
            let carousel = category.carousel(self.carousel_limit);
            println!(
                "\n[{}] {} - {} videos",
                Catalog::row_of(index),
                category.name,
                category.entries.len()
            );
            if carousel.is_empty() {
                println!("    (empty)");
                continue;
            }
            for (col, entry) in carousel.cards.iter().enumerate() {
                let reference = video_ref::resolve(&entry.source_url);
                println!("  {:3} | {:8} | {}", col, reference.source_label(), entry.title);
            }
            if carousel.has_show_more() {
                println!("  {:3} | show more (+{})", carousel.cards.len(), carousel.remaining);
            }
        }
    }
}
