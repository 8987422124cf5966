// tabdash-cli/src/ui.rs
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use std::time::Duration;
use tabdash_core::settings::{Language, ThemeMode};
use tabdash_widgets::{contrast_color, css_rgb_to_color, focus_color};

use crate::app::App;

const SAVED_BADGE_FOR: Duration = Duration::from_secs(2);

struct Labels {
    widgets: &'static str,
    theme: &'static str,
    language: &'static str,
    quit: &'static str,
    drawer_title: &'static str,
    pinned: &'static str,
    available: &'static str,
    duplicates: &'static str,
    dismiss: &'static str,
    saved: &'static str,
    empty_canvas: &'static str,
}

const EN: Labels = Labels {
    widgets: "widgets",
    theme: "theme",
    language: "language",
    quit: "quit",
    drawer_title: " Widgets ",
    pinned: "pinned",
    available: "available",
    duplicates: "Duplicate widget ids ignored",
    dismiss: "Esc to dismiss",
    saved: "saved",
    empty_canvas: "Press w to add widgets",
};

const ZH: Labels = Labels {
    widgets: "组件",
    theme: "主题",
    language: "语言",
    quit: "退出",
    drawer_title: " 组件 ",
    pinned: "已固定",
    available: "可添加",
    duplicates: "已忽略重复的组件 ID",
    dismiss: "按 Esc 关闭",
    saved: "已保存",
    empty_canvas: "按 w 添加组件",
};

fn labels(language: Language) -> &'static Labels {
    match language {
        Language::En => &EN,
        Language::Zh => &ZH,
    }
}

fn accent(theme: ThemeMode) -> Color {
    match theme {
        ThemeMode::Focus => Color::Magenta,
        ThemeMode::Minimal => Color::Gray,
        ThemeMode::Info => Color::Cyan,
        ThemeMode::Custom => Color::Green,
    }
}

pub fn draw(frame: &mut Frame, app: &mut App) {
    let notice_height = u16::from(app.show_duplicate_notice);
    let [header_area, notice_area, canvas_area, links_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(notice_height),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(frame, app, header_area);
    if app.show_duplicate_notice {
        draw_duplicate_notice(frame, app, notice_area);
    }
    draw_canvas(frame, app, canvas_area);
    draw_quick_links(frame, app, links_area);

    if app.drawer.is_some() {
        draw_drawer(frame, app, canvas_area);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let settings = app.store.settings();
    let text = labels(settings.language);
    let key = Style::default().fg(accent(settings.theme)).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);

    let mut spans = vec![
        Span::styled(" tabdash ", key),
        Span::styled(format!("{}: {}  ", text.theme, settings.theme.as_str()), dim),
    ];

    if app
        .last_saved
        .is_some_and(|at| at.elapsed() < SAVED_BADGE_FOR)
    {
        spans.push(Span::styled(format!("✓ {}  ", text.saved), Style::default().fg(Color::Green)));
    }

    for (hint, label) in [
        ("w", text.widgets),
        ("t", text.theme),
        ("l", text.language),
        ("q", text.quit),
    ] {
        spans.push(Span::styled(format!("[{hint}]"), key));
        spans.push(Span::styled(format!(" {label}  "), dim));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_duplicate_notice(frame: &mut Frame, app: &App, area: Rect) {
    let text = labels(app.store.settings().language);
    let message = format!(
        " ⚠ {}: {}  ({})",
        text.duplicates,
        app.registry.duplicate_ids().join(", "),
        text.dismiss
    );
    frame.render_widget(
        Paragraph::new(message).style(Style::default().fg(Color::Black).bg(Color::Yellow)),
        area,
    );
}

fn draw_canvas(frame: &mut Frame, app: &mut App, area: Rect) {
    app.refresh_placements(area);

    if app.placements.is_empty() {
        let hint = labels(app.store.settings().language).empty_canvas;
        let middle = Rect::new(area.x, area.y + area.height / 2, area.width, area.height.min(1));
        frame.render_widget(
            Paragraph::new(Line::from(hint).centered()).style(Style::default().fg(Color::DarkGray)),
            middle,
        );
        return;
    }

    let buf = frame.buffer_mut();
    for placement in &app.placements {
        let Some(container) = app.containers.get_mut(&placement.instance_id) else {
            continue;
        };
        let focused = app.focused.as_deref() == Some(placement.instance_id.as_str());

        ratatui::widgets::Widget::render(Clear, placement.rect, buf);
        container.render_framed(placement.rect, buf, focused);
    }
}

fn draw_quick_links(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for link in app.store.settings().quick_links() {
        let color = css_rgb_to_color(&link.hover_color).unwrap_or(Color::DarkGray);
        spans.push(Span::styled(
            format!(" {} ", link.name),
            Style::default().bg(color).fg(contrast_color(color)),
        ));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_drawer(frame: &mut Frame, app: &App, area: Rect) {
    let Some(drawer) = app.drawer else {
        return;
    };
    let text = labels(app.store.settings().language);

    let items: Vec<ListItem> = app
        .registry
        .manifests()
        .iter()
        .map(|m| {
            let (status, color) = if app.is_pinned(m.id) {
                (text.pinned, Color::Green)
            } else {
                (text.available, Color::DarkGray)
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::raw(format!("{} {}  ", m.icon, m.name)),
                    Span::styled(status, Style::default().fg(color)),
                ]),
                Line::from(Span::styled(
                    format!("   {}", m.description),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let height = (items.len() as u16 * 2 + 2).max(4);
    let popup = centered(area, 44, height);

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(text.drawer_title)
                .border_style(Style::default().fg(focus_color(true))),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default().with_selected(Some(drawer.selected));

    frame.render_widget(Clear, popup);
    frame.render_stateful_widget(list, popup, &mut state);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
