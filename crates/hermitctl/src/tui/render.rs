//! Rendering - one view per scan mode, plus header and status bar

use super::state::ScreenModel;
use hermit_common::ScanMode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const DEFAULT_CAPTURE_COLUMNS: u16 = 32;

/// Terminal columns for a capture width like "256px" (8px per cell) or "40"
pub fn capture_columns(width: &str, available: u16) -> u16 {
    let width = width.trim();
    let columns = if let Some(px) = width.strip_suffix("px") {
        px.trim().parse::<u16>().map(|px| px / 8).unwrap_or(DEFAULT_CAPTURE_COLUMNS)
    } else {
        width.parse::<u16>().unwrap_or(DEFAULT_CAPTURE_COLUMNS)
    };
    columns.clamp(10, available.max(10))
}

pub fn draw_ui(f: &mut Frame, model: &ScreenModel) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(f, chunks[0], model);

    match model.view.mode {
        ScanMode::Pending => draw_pending(f, chunks[1], model),
        ScanMode::Active => draw_active(f, chunks[1], model),
        ScanMode::Success | ScanMode::Error => draw_settled(f, chunks[1], model),
    }

    draw_status_bar(f, chunks[2], model);

    if model.show_help {
        draw_help_overlay(f, size);
    }
}

fn draw_header(f: &mut Frame, area: Rect, model: &ScreenModel) {
    let id = model.view.session_id.to_string();
    let short_id = id.get(..8).unwrap_or(&id);
    let header = Line::from(vec![
        Span::raw(" "),
        Span::styled("Hermit", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!(" | session {}", short_id)),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn draw_pending(f: &mut Frame, area: Rect, model: &ScreenModel) {
    let mut lines = Vec::new();

    if let Some(prompt) = &model.prompt {
        lines.push(Line::from(prompt.instructions.clone()));
        lines.push(Line::from(""));
        lines.push(
            Line::from(vec![
                Span::styled(
                    format!("{}> ", prompt.mode),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(prompt.command.clone(), Style::default().fg(Color::Yellow)),
            ])
            .alignment(Alignment::Center),
        );
        lines.push(Line::from(""));
    }

    lines.push(Line::from("When you are ready, scan the QR code produced by Hermit:"));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            format!("[ {} ]", model.view.options.start_label),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw("  Enter"),
    ]));

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(" Command "));
    f.render_widget(body, area);
}

fn draw_active(f: &mut Frame, area: Rect, model: &ScreenModel) {
    let columns = capture_columns(&model.view.options.capture_width, area.width);
    let rows = (columns / 2).clamp(3, area.height.saturating_sub(2).max(3));

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(rows), Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(columns), Constraint::Min(0)])
        .split(vertical[0]);

    let preview = Paragraph::new(vec![
        Line::from(""),
        Line::from("Scanning..."),
        Line::from("Hold the Hermit QR code up to the camera"),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title(" Camera "));
    f.render_widget(preview, horizontal[0]);

    let hint = Line::from(vec![
        Span::styled("[ Cancel ]", Style::default().fg(Color::Black).bg(Color::Magenta)),
        Span::raw("  Esc"),
    ]);
    f.render_widget(Paragraph::new(hint), vertical[1]);
}

fn draw_settled(f: &mut Frame, area: Rect, model: &ScreenModel) {
    let mut lines = Vec::new();

    if model.view.mode == ScanMode::Error {
        lines.push(Line::from(Span::styled(
            format!("scan failed: {}", model.view.last_error),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Response received",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
        if let Some(payload) = &model.payload {
            lines.push(Line::from(""));
            for line in payload.render().lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[ Reset ]", Style::default().fg(Color::Black).bg(Color::Magenta)),
        Span::raw("  r"),
    ]));

    let title = if model.view.mode == ScanMode::Error { " Error " } else { " Result " };
    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(body, area);
}

fn draw_status_bar(f: &mut Frame, area: Rect, model: &ScreenModel) {
    let mode_style = match model.view.mode {
        ScanMode::Pending => Style::default().fg(Color::Cyan),
        ScanMode::Active => Style::default().fg(Color::Yellow),
        ScanMode::Success => Style::default().fg(Color::Green),
        ScanMode::Error => Style::default().fg(Color::Red),
    };

    let mut spans = vec![
        Span::raw(" Mode: "),
        Span::styled(model.view.mode.to_string(), mode_style),
    ];
    if let Some(last) = &model.view.last_transition {
        let at = last.at.with_timezone(&chrono::Local).format("%H:%M:%S");
        spans.push(Span::raw(format!(" | {} at {}", last.trigger, at)));
    }
    spans.push(Span::raw(" | ? help | q quit"));

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(20, 20, 20))),
        area,
    );
}

fn draw_help_overlay(f: &mut Frame, area: Rect) {
    let width = 44u16.min(area.width);
    let height = 9u16.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let help = Paragraph::new(vec![
        Line::from(" Enter   start scanning"),
        Line::from(" Esc     cancel scan / reset"),
        Line::from(" r       reset after a result"),
        Line::from(" ?       toggle this help"),
        Line::from(" q       quit"),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Keys "));

    f.render_widget(Clear, popup);
    f.render_widget(help, popup);
}
