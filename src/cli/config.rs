// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use std::path::Path;

use tvcatalog::Config;

pub enum ConfigCommand {
    /// Write the defaults unless a file already exists
    Init,
    Show,
}

impl ConfigCommand {
    pub fn execute(self, path: &Path, config: &Config) -> Result<()> {
        match self {
            ConfigCommand::Init => {
                if path.exists() {
                    eprintln!("Config already exists at {}", path.display());
                    return Ok(());
                }
                Config::default().save(path)?;
                println!("Wrote default config to {}", path.display());
            }
            ConfigCommand::Show => {
                let content = toml::to_string_pretty(config)
                    .context("Failed to serialize config to TOML")?;
                println!("# {}", path.display());
                print!("{}", content);
            }
        }
        Ok(())
    }
}
