// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    #[serde(rename = "url")]
    pub source_url: String,
}

impl CatalogEntry {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "url")]
    pub source_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default, rename = "entry")]
    pub entries: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub hero: Hero,
    #[serde(default, rename = "category")]
    pub categories: Vec<Category>,
}

/// What one category row shows: the leading cards and, when the category
/// is longer than the carousel limit, a trailing "show more" card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel<'a> {
    pub cards: &'a [CatalogEntry],
    pub remaining: usize,
}

impl Carousel<'_> {
    pub fn has_show_more(&self) -> bool {
        self.remaining > 0
    }

    /// Number of focusable elements in the row.
    pub fn len(&self) -> usize {
        self.cards.len() + usize::from(self.has_show_more())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Category {
    pub fn carousel(&self, limit: usize) -> Carousel<'_> {
        let shown = if self.entries.len() > limit {
            limit.saturating_sub(1)
        } else {
            self.entries.len()
        };

        Carousel {
            cards: &self.entries[..shown],
            remaining: self.entries.len() - shown,
        }
    }
}

impl Catalog {
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_CATALOG).context("Failed to parse built-in catalog")
    }

    pub fn parse(content: &str) -> Result<Self> {
        let catalog: Catalog =
            toml::from_str(content).with_context(|| "Failed to parse TOML catalog")?;
        Ok(catalog)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog file: {}", path.as_ref().display()))?;
        Self::parse(&content)
    }

    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    pub fn category(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    /// Logical row of a category; the hero is row 0.
    pub fn row_of(category_index: usize) -> usize {
        category_index + 1
    }

    pub fn total_entries(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }
}
