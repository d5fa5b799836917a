// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
};

use super::widgets::{
    button, card_block, centered_rect, create_help_widget, focus_style, scroll_start, truncate,
};
use crate::app::{App, LogDisplayMode};
use crate::catalog::CatalogEntry;
use crate::focus::FocusId;
use crate::player::{Playback, PlayerSession, format_time};
use crate::video_ref;
use crate::view::{GridView, ViewKind, ViewState};

const CARD_WIDTH: u16 = 22;
const CARD_HEIGHT: u16 = 4;
const ROW_HEIGHT: u16 = CARD_HEIGHT + 2;
const HERO_HEIGHT: u16 = 6;

/// Screen areas the event loop needs for pointer hit tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawnAreas {
    pub seek_bar: Option<Rect>,
}

pub fn draw(frame: &mut Frame, app: &App) -> DrawnAreas {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_header(frame, app, chunks[0]);
    let areas = draw_content(frame, app, chunks[1]);
    draw_footer(frame, app, chunks[2]);

    if app.show_help {
        draw_help_overlay(frame, size);
    }

    areas
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let header_text = match app.views().current() {
        ViewState::Catalog => "TV Catalog".to_string(),
        ViewState::ExpandedGrid(grid) => format!("TV Catalog - {}", grid.category),
        ViewState::Player(view) => format!("Playing: {}", view.session.title),
    };

    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        );

    frame.render_widget(header, area);
}

fn draw_content(frame: &mut Frame, app: &App, area: Rect) -> DrawnAreas {
    let main_area = match app.log_display_mode {
        LogDisplayMode::Side => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(50), Constraint::Length(40)])
                .split(area);
            draw_logs_panel(frame, app, chunks[1]);
            chunks[0]
        }
        LogDisplayMode::None => area,
    };

    match app.views().current() {
        ViewState::Catalog => {
            draw_catalog(frame, app, main_area);
            DrawnAreas::default()
        }
        ViewState::ExpandedGrid(grid) => {
            draw_grid(frame, app, grid, main_area);
            DrawnAreas::default()
        }
        ViewState::Player(view) => draw_player(frame, app, &view.session, main_area),
    }
}

fn draw_catalog(frame: &mut Frame, app: &App, area: Rect) {
    let focus = app.focus();
    let limit = app.config.ui.carousel_limit;

    let rows: Vec<usize> = app
        .catalog
        .categories
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.entries.is_empty())
        .map(|(i, _)| i)
        .collect();

    let focused_category = match focus {
        Some(FocusId::Card { category, .. }) | Some(FocusId::ShowMore { category }) => {
            Some(category)
        }
        _ => None,
    };

    // The hero scrolls away once focus moves past the first rows
    let visible_rows = usize::from(area.height.saturating_sub(HERO_HEIGHT) / ROW_HEIGHT).max(1);
    let focused_row = focused_category
        .and_then(|c| rows.iter().position(|r| *r == c))
        .unwrap_or(0);
    let first_row = scroll_start(focused_row, visible_rows, rows.len());

    let mut y = area.y;
    if first_row == 0 {
        let hero_area = Rect::new(area.x, y, area.width, HERO_HEIGHT.min(area.height));
        draw_hero(frame, app, hero_area, focus == Some(FocusId::HeroPlay));
        y += hero_area.height;
    }

    for category_index in rows.iter().skip(first_row) {
        if y + ROW_HEIGHT > area.y + area.height {
            break;
        }
        let Some(category) = app.catalog.category(*category_index) else {
            continue;
        };
        let row_area = Rect::new(area.x, y, area.width, ROW_HEIGHT);
        y += ROW_HEIGHT;

        let block = Block::default()
            .borders(Borders::TOP)
            .title(format!(" {} ", category.name))
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(row_area);
        frame.render_widget(block, row_area);

        let carousel = category.carousel(limit);
        let focused_col = match focus {
            Some(FocusId::Card { category, index }) if category == *category_index => Some(index),
            Some(FocusId::ShowMore { category }) if category == *category_index => {
                Some(carousel.cards.len())
            }
            _ => None,
        };

        let per_row = usize::from(inner.width / CARD_WIDTH).max(1);
        let start = scroll_start(focused_col.unwrap_or(0), per_row, carousel.len());

        for (slot, col) in (start..carousel.len()).take(per_row).enumerate() {
            let card_area = Rect::new(
                inner.x + slot as u16 * CARD_WIDTH,
                inner.y,
                CARD_WIDTH.min(inner.width),
                CARD_HEIGHT.min(inner.height),
            );
            let focused = focused_col == Some(col);
            match carousel.cards.get(col) {
                Some(entry) => draw_card(frame, entry, card_area, focused),
                None => draw_show_more(frame, carousel.remaining, card_area, focused),
            }
        }
    }
}

fn draw_hero(frame: &mut Frame, app: &App, area: Rect, focused: bool) {
    let hero = &app.catalog.hero;
    let lines = vec![
        Line::from(Span::styled(
            hero.title.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            hero.description.clone(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(button("▶ Play", focused)),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_style(focused)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_card(frame: &mut Frame, entry: &CatalogEntry, area: Rect, focused: bool) {
    let reference = video_ref::resolve(&entry.source_url);
    let width = usize::from(area.width.saturating_sub(2));
    let lines = vec![
        Line::from(truncate(&entry.title, width)).style(focus_style(focused).fg(if focused {
            Color::Yellow
        } else {
            Color::White
        })),
        Line::from(Span::styled(
            reference.source_label(),
            Style::default().fg(if reference.is_native {
                Color::Red
            } else {
                Color::Magenta
            }),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(card_block(focused)), area);
}

fn draw_show_more(frame: &mut Frame, remaining: usize, area: Rect, focused: bool) {
    let lines = vec![
        Line::from("Show more"),
        Line::from(format!("+{}", remaining)),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(focus_style(focused))
        .block(card_block(focused));
    frame.render_widget(paragraph, area);
}

fn draw_grid(frame: &mut Frame, app: &App, grid: &GridView, area: Rect) {
    let focus = app.focus();
    let columns = app.config.ui.grid_columns.max(1);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let title = Line::from(vec![
        button("✕ Close", focus == Some(FocusId::GridClose)),
        Span::raw("  "),
        Span::styled(
            format!("{} ({} videos)", grid.category, grid.entries.len()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), chunks[0]);

    let body = chunks[1];
    let cell_width = (body.width / columns as u16).max(1);
    let total_rows = grid.entries.len().div_ceil(columns);
    let visible_rows = usize::from(body.height / CARD_HEIGHT).max(1);
    let focused_row = match focus {
        Some(FocusId::GridCard { index }) => index / columns,
        _ => 0,
    };
    let first_row = scroll_start(focused_row, visible_rows, total_rows);

    for (slot, row) in (first_row..total_rows).take(visible_rows).enumerate() {
        for col in 0..columns {
            let index = row * columns + col;
            let Some(entry) = grid.entries.get(index) else {
                break;
            };
            let cell = Rect::new(
                body.x + col as u16 * cell_width,
                body.y + slot as u16 * CARD_HEIGHT,
                cell_width,
                CARD_HEIGHT.min(body.height),
            );
            draw_card(
                frame,
                entry,
                cell,
                focus == Some(FocusId::GridCard { index }),
            );
        }
    }
}

fn draw_player(frame: &mut Frame, app: &App, session: &PlayerSession, area: Rect) -> DrawnAreas {
    let focus = app.focus();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" {} ", session.reference.source_label()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Back
            Constraint::Min(1),    // Title / notice
            Constraint::Length(1), // Progress
            Constraint::Length(1), // Buffered
            Constraint::Length(1), // Buttons
        ])
        .split(inner);

    let back = Line::from(button("← Back", focus == Some(FocusId::PlayerBack)));

    match session.playback() {
        Playback::Controlled { controller, .. } => {
            let runtime = controller.runtime();
            let title = Paragraph::new(vec![
                Line::from(Span::styled(
                    session.title.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    session.reference.watch_url(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(title, chunks[1]);

            if !runtime.controls_visible {
                let hint = Paragraph::new("Press any key to show controls")
                    .style(Style::default().fg(Color::DarkGray))
                    .alignment(Alignment::Center);
                frame.render_widget(hint, chunks[4]);
                return DrawnAreas::default();
            }

            frame.render_widget(Paragraph::new(back), chunks[0]);

            let seek_focused = focus == Some(FocusId::PlayerSeekBar);
            let progress = Gauge::default()
                .gauge_style(if seek_focused {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Red)
                })
                .ratio(runtime.progress_fraction())
                .label(format!(
                    "{} / {}",
                    format_time(runtime.current_time),
                    format_time(runtime.duration)
                ));
            frame.render_widget(progress, chunks[2]);

            let buffered = Gauge::default()
                .gauge_style(Style::default().fg(Color::DarkGray))
                .ratio(runtime.buffered_fraction.clamp(0.0, 1.0))
                .label(format!("buffered {:.0}%", runtime.buffered_fraction * 100.0));
            frame.render_widget(buffered, chunks[3]);

            let buttons = Line::from(vec![
                button(
                    if runtime.is_playing { "⏸ Pause" } else { "▶ Play" },
                    focus == Some(FocusId::PlayerPlayPause),
                ),
                Span::raw("  "),
                button(
                    if runtime.is_muted { "Muted" } else { "Sound on" },
                    focus == Some(FocusId::PlayerMute),
                ),
            ]);
            frame.render_widget(Paragraph::new(buttons), chunks[4]);

            DrawnAreas {
                seek_bar: Some(chunks[2]),
            }
        }
        Playback::Frame(_) => {
            frame.render_widget(Paragraph::new(back), chunks[0]);
            let notice = Paragraph::new(vec![
                Line::from(Span::styled(
                    session.title.clone(),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                )),
                Line::from("Playing in an external window"),
                Line::from(Span::styled(
                    session.reference.source_url.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            frame.render_widget(notice, chunks[1]);
            DrawnAreas::default()
        }
        Playback::Unavailable(reason) => {
            frame.render_widget(Paragraph::new(back), chunks[0]);
            let notice = Paragraph::new(vec![
                Line::from(Span::styled(
                    "Video unavailable",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(reason.clone()),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
            frame.render_widget(notice, chunks[1]);
            DrawnAreas::default()
        }
    }
}

fn draw_logs_panel(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Logs ");

    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    if app.logs.is_empty() {
        return;
    }

    // Most recent logs that fit
    let visible_count = inner_area.height as usize;
    let start = app.logs.len().saturating_sub(visible_count);

    let log_lines: Vec<Line> = app.logs[start..]
        .iter()
        .map(|(time, msg)| {
            Line::from(vec![
                Span::styled(
                    time.format("%H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(msg.clone(), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let logs = Paragraph::new(log_lines).wrap(Wrap { trim: true });
    frame.render_widget(logs, inner_area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let footer_text = match app.view_kind() {
        ViewKind::Catalog => " ←↑↓→: Navigate | Enter: Select | ?: Help | L: Logs | q: Quit ",
        ViewKind::ExpandedGrid => " ←↑↓→: Navigate | Enter: Play | Esc: Close | q: Quit ",
        ViewKind::Player => " ←↑↓→: Controls | Enter: Select | Space: Play/Pause | m: Mute | Esc: Back ",
    };

    let footer = Paragraph::new(footer_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(footer, area);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, help_area);
    frame.render_widget(create_help_widget(), help_area);
}
