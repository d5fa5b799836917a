// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod app;
pub mod catalog;
pub mod config;
pub mod focus;
pub mod input;
pub mod navigation;
pub mod player;
pub mod thumbnail;
pub mod tui;
pub mod video_ref;
pub mod view;

pub use app::App;
pub use catalog::Catalog;
pub use config::Config;
pub use tui::run_tui;
