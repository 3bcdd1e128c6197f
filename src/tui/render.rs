use std::borrow::Cow;

use super::state::{AppState, InputMode, Tab, ViewState};
use crate::feeder::logs::FeedSlot;
use chrono::{Datelike, Duration, NaiveDate};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs},
    Frame,
};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub fn draw(f: &mut Frame, state: &AppState, view: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_tabs(f, state, view, chunks[0]);
    match view.tab {
        Tab::Home => draw_home(f, state, view, chunks[1]),
        Tab::Schedule => draw_schedule(f, state, view, chunks[1]),
        Tab::Logs => draw_logs(f, state, view, chunks[1]),
        Tab::Settings => draw_settings(f, state, view, chunks[1]),
    }
    draw_status_line(f, state, view, chunks[2]);
    draw_footer(f, view, chunks[3]);
}

fn connection_span(state: &AppState) -> Span<'static> {
    if state.connection.is_online() {
        Span::styled("Online", Style::default().fg(Color::Green))
    } else {
        Span::styled("Offline", Style::default().fg(Color::Red))
    }
}

fn draw_tabs(f: &mut Frame, state: &AppState, view: &ViewState, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
        .collect();

    let title = Line::from(vec![
        Span::raw(format!(" {} ", state.device_name)),
        connection_span(state),
        Span::raw(" "),
    ]);

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .select(view.tab.index());
    f.render_widget(tabs, area);
}

fn draw_home(f: &mut Frame, state: &AppState, view: &ViewState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .split(area);

    let banner = Paragraph::new(Span::styled(
        "Automatic fish feeder control",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    f.render_widget(banner, chunks[0]);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[1]);

    draw_card(f, cards[0], "Remaining feed", Span::raw(format!("{} g", state.remaining_feed_g)));
    draw_card(f, cards[1], "Last feed", Span::raw(state.last_feed_time.clone()));
    draw_card(f, cards[2], "Connection", connection_span(state));

    draw_feed_button(f, state, view, chunks[2]);
    draw_history(f, state, view, chunks[3]);
}

fn draw_card(f: &mut Frame, area: Rect, title: &str, value: Span<'static>) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL);
    let lines = vec![
        Line::from(""),
        Line::from(value.patch_style(Style::default().add_modifier(Modifier::BOLD))),
    ];
    let para = Paragraph::new(lines).alignment(Alignment::Center).block(block);
    f.render_widget(para, area);
}

fn draw_feed_button(f: &mut Frame, state: &AppState, view: &ViewState, area: Rect) {
    let (label, style) = if state.is_feeding {
        let ch = SPINNER_FRAMES[(view.spinner_frame as usize) % SPINNER_FRAMES.len()];
        (
            format!("{} Feeding...", ch),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (
            "[f] Feed now".to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    };
    let para = Paragraph::new(Span::styled(label, style))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    f.render_widget(para, area);
}

fn draw_history(f: &mut Frame, state: &AppState, view: &ViewState, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize;
    let visible_lines = area.height.saturating_sub(2) as usize;
    let total = state.history.len();
    let offset = view.history_scroll.min(total.saturating_sub(visible_lines));

    let lines: Vec<Line> = if state.history.is_empty() {
        vec![Line::from(Span::styled(
            " No feed requests yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        state
            .history
            .iter()
            .skip(offset)
            .take(visible_lines)
            .map(|entry| {
                let color = if entry.result == "Success" {
                    Color::Green
                } else if entry.result.starts_with("Failed") {
                    Color::Red
                } else if entry.result == "Deferred" {
                    Color::Yellow
                } else {
                    Color::DarkGray
                };
                let prefix = format!(" {}  ", entry.timestamp);
                let msg_max = max_width.saturating_sub(prefix.len());
                let msg = truncate_with_ellipsis(&entry.result, msg_max);
                Line::from(vec![
                    Span::styled(prefix, Style::default().fg(Color::DarkGray)),
                    Span::styled(msg.into_owned(), Style::default().fg(color)),
                ])
            })
            .collect()
    };

    let title = if total > visible_lines {
        format!(" Feed History [{}/{}] ", offset + visible_lines.min(total), total)
    } else {
        " Feed History ".to_string()
    };
    let para = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(para, area);
}

/// Monday through Sunday of the week containing `date`.
pub fn week_of(date: NaiveDate) -> [NaiveDate; 7] {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

fn draw_schedule(f: &mut Frame, state: &AppState, view: &ViewState, area: Rect) {
    let now = chrono::Local::now();
    let today = now.date_naive();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(3),
            Constraint::Length(if view.input_mode == InputMode::ScheduleTime { 3 } else { 0 }),
        ])
        .split(area);

    let mut day_spans: Vec<Span> = vec![Span::raw(" ")];
    for day in week_of(today) {
        let text = format!(" {} {:>2} ", day.format("%a"), day.day());
        let style = if day == today {
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        day_spans.push(Span::styled(text, style));
        day_spans.push(Span::raw(" "));
    }

    let header = vec![
        Line::from(Span::styled(
            today.format("%B %Y").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(day_spans),
        Line::from(Span::styled(
            now.format("%H:%M").to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
    ];
    let header = Paragraph::new(header)
        .alignment(Alignment::Center)
        .block(Block::default().title(" Feeding Schedule ").borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    if state.schedule.is_empty() {
        let para = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No schedule entries. Press [a] to add one.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(para, chunks[1]);
    } else {
        let rows: Vec<Row> = state
            .schedule
            .entries()
            .iter()
            .map(|e| {
                let check = if e.selected { "[x]" } else { "[ ]" };
                let status_style = if e.active {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                let row = Row::new(vec![
                    Cell::from(check),
                    Cell::from(e.time_label()).style(Style::default().add_modifier(Modifier::BOLD)),
                    Cell::from(e.status_label()).style(status_style),
                ]);
                if e.selected {
                    row.style(Style::default().fg(Color::Yellow))
                } else {
                    row
                }
            })
            .collect();

        let selected = state.schedule.selected_count();
        let title = if selected > 0 {
            format!(" Entries ({} selected) ", selected)
        } else {
            " Entries ".to_string()
        };
        let table = Table::new(
            rows,
            [Constraint::Length(4), Constraint::Length(7), Constraint::Min(8)],
        )
        .header(Row::new(vec!["", "Time", "Status"]).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().title(title).borders(Borders::ALL))
        .row_highlight_style(Style::default().bg(Color::DarkGray));
        let mut table_state = TableState::default();
        table_state.select(Some(view.schedule_cursor.min(state.schedule.len() - 1)));
        f.render_stateful_widget(table, chunks[1], &mut table_state);
    }

    if view.input_mode == InputMode::ScheduleTime {
        draw_input(f, view, chunks[2], " New time (HH:MM) ");
    }
}

fn draw_logs(f: &mut Frame, state: &AppState, view: &ViewState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let mut filter_spans = vec![Span::raw(" Filter: ")];
    let all_style = if view.log_filter.is_none() {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    filter_spans.push(Span::styled("All", all_style));
    for slot in FeedSlot::ALL {
        let style = if view.log_filter == Some(slot) {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        filter_spans.push(Span::raw(" \u{00b7} "));
        filter_spans.push(Span::styled(slot.label(), style));
    }
    f.render_widget(Paragraph::new(Line::from(filter_spans)), chunks[0]);

    let visible = state.logs.filtered(view.log_filter);

    let rows: Vec<Row> = visible
        .iter()
        .map(|l| {
            let color = if l.success { Color::Green } else { Color::Red };
            Row::new(vec![
                Cell::from("\u{25cf}").style(Style::default().fg(color)),
                Cell::from(l.time.clone()).style(Style::default().add_modifier(Modifier::BOLD)),
                Cell::from(l.date.clone()),
                Cell::from(l.slot.label()),
                Cell::from(if l.success { "OK" } else { "Missed" }).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let title = match view.log_filter {
        Some(slot) => format!(" Feed Log: {} [{}] ", slot.label(), visible.len()),
        None => format!(" Feed Log [{}] ", visible.len()),
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(14),
            Constraint::Min(6),
        ],
    )
    .header(
        Row::new(vec!["", "Time", "Date", "Slot", "Result"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(table, chunks[1]);
}

fn draw_settings(f: &mut Frame, state: &AppState, view: &ViewState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Length(if view.input_mode == InputMode::BaseUrl { 3 } else { 0 }),
            Constraint::Min(0),
        ])
        .split(area);

    let status = if state.probing {
        Span::styled("Testing connection...", Style::default().fg(Color::Yellow))
    } else {
        connection_span(state)
    };

    let label = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(Span::styled(
            state.device_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![Span::styled("Address:  ", label), Span::raw(state.base_url.clone())]),
        Line::from(vec![Span::styled("Status:   ", label), status]),
        Line::from(vec![Span::styled("Uptime:   ", label), Span::raw(state.uptime())]),
        Line::from(""),
        Line::from(vec![
            Span::styled("fish-feeder ", label),
            Span::raw(format!("v{}", env!("CARGO_PKG_VERSION"))),
            Span::styled("  \u{00b7}  MIT License", label),
        ]),
    ];
    let para = Paragraph::new(lines).block(
        Block::default()
            .title(" Device ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(para, chunks[0]);

    if view.input_mode == InputMode::BaseUrl {
        draw_input(f, view, chunks[1], " Device address ");
    }
}

fn draw_input(f: &mut Frame, view: &ViewState, area: Rect, title: &str) {
    let mut spans = vec![Span::raw(format!(" {}\u{258f}", view.edit_buffer))];
    if let Some(err) = &view.input_error {
        spans.push(Span::styled(format!("  {}", err), Style::default().fg(Color::Red)));
    }
    let para = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(para, area);
}

fn draw_status_line(f: &mut Frame, state: &AppState, view: &ViewState, area: Rect) {
    let Some(notice) = &state.notice else { return };
    let max_width = area.width.saturating_sub(2) as usize;
    let line = Line::from(Span::styled(
        format!(" {}", truncate_with_ellipsis(notice, max_width)),
        Style::default().fg(Color::DarkGray),
    ));
    // Input errors take the spot while editing.
    if view.input_error.is_none() {
        f.render_widget(Paragraph::new(line), area);
    }
}

fn draw_footer(f: &mut Frame, view: &ViewState, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let mut spans = if view.is_editing() {
        vec![
            Span::styled("  [Enter]", key),
            Span::raw(" confirm  "),
            Span::styled("[Esc]", key),
            Span::raw(" cancel  "),
        ]
    } else {
        vec![
            Span::styled("  [q]", key),
            Span::raw("uit  "),
            Span::styled("[1-4/Tab]", key),
            Span::raw(" screens  "),
        ]
    };
    if !view.is_editing() {
        let extra: &[(&str, &str)] = match view.tab {
            Tab::Home => &[("[f]", " feed  "), ("[j/k]", " scroll  ")],
            Tab::Schedule => &[
                ("[a]", "dd now  "),
                ("[n]", "ew at..  "),
                ("[space]", " select  "),
                ("[t]", "oggle  "),
                ("[x]", " delete  "),
            ],
            Tab::Logs => &[("[f]", "ilter  "), ("[Esc]", " clear  ")],
            Tab::Settings => &[("[e]", "dit address  "), ("[s]", " test connection  ")],
        };
        for (k, label) in extra {
            spans.push(Span::styled(*k, key));
            spans.push(Span::raw(*label));
        }
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_count = s.chars().count();
    if char_count <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 3 {
        Cow::Owned(".".repeat(max_width))
    } else {
        let end = s
            .char_indices()
            .nth(max_width - 3)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        Cow::Owned(format!("{}...", &s[..end]))
    }
}
