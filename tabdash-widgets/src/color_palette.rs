// tabdash-widgets/src/color_palette.rs
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    prelude::Widget as RatatuiWidget,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tabdash_plugin_sdk::{
    Event, EventResult, Size, Widget, WidgetFeatures, WidgetManifest, export_widget,
};

use crate::common::{contrast_color, hex_to_color};

pub const COLOR_PALETTE_MANIFEST: WidgetManifest = WidgetManifest {
    id: "color-palette",
    name: "Color Palette",
    description: "HTML standard color reference",
    enabled: false,
    category: "tools",
    icon: "🎨",
    version: "1.0.0",
    features: WidgetFeatures::FLOATING,
};

pub const HTML_COLORS: &[(&str, &str)] = &[
    ("Black", "#000000"),
    ("Silver", "#C0C0C0"),
    ("Gray", "#808080"),
    ("White", "#FFFFFF"),
    ("Maroon", "#800000"),
    ("Red", "#FF0000"),
    ("Purple", "#800080"),
    ("Fuchsia", "#FF00FF"),
    ("Green", "#008000"),
    ("Lime", "#00FF00"),
    ("Olive", "#808000"),
    ("Yellow", "#FFFF00"),
    ("Navy", "#000080"),
    ("Blue", "#0000FF"),
    ("Teal", "#008080"),
    ("Aqua", "#00FFFF"),
    ("Orange", "#FFA500"),
    ("Coral", "#FF7F50"),
    ("Tomato", "#FF6347"),
    ("Gold", "#FFD700"),
    ("Khaki", "#F0E68C"),
    ("Indigo", "#4B0082"),
    ("Violet", "#EE82EE"),
    ("Orchid", "#DA70D6"),
    ("Salmon", "#FA8072"),
    ("Crimson", "#DC143C"),
    ("Chocolate", "#D2691E"),
    ("SteelBlue", "#4682B4"),
    ("SkyBlue", "#87CEEB"),
    ("SeaGreen", "#2E8B57"),
];

#[derive(Default)]
pub struct ColorPalette {
    selected: usize,
    offset: usize,
    visible_rows: usize,
}

impl ColorPalette {
    pub fn selected(&self) -> (&'static str, &'static str) {
        HTML_COLORS[self.selected]
    }

    fn select(&mut self, index: usize) {
        self.selected = index.min(HTML_COLORS.len() - 1);
        self.scroll_into_view();
    }

    fn scroll_into_view(&mut self) {
        let rows = self.visible_rows.max(1);
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + rows {
            self.offset = self.selected + 1 - rows;
        }
    }
}

impl Widget for ColorPalette {
    fn on_event(&mut self, event: Event) -> EventResult {
        let Event::Key(key) = event else {
            return EventResult::Ignored;
        };

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.select(self.selected.saturating_sub(1));
                EventResult::Consumed
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select(self.selected + 1);
                EventResult::Consumed
            }
            KeyCode::Home => {
                self.select(0);
                EventResult::Consumed
            }
            KeyCode::End => {
                self.select(HTML_COLORS.len() - 1);
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) {
        self.visible_rows = area.height as usize;
        self.scroll_into_view();

        let lines: Vec<Line> = HTML_COLORS
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(self.visible_rows)
            .map(|(i, (name, hex))| {
                let swatch = hex_to_color(hex).unwrap_or(Color::Reset);
                let marker = if i == self.selected { "▶ " } else { "  " };
                let name_style = if i == self.selected {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                Line::from(vec![
                    Span::raw(marker),
                    Span::styled(
                        format!(" {hex} "),
                        Style::default().bg(swatch).fg(contrast_color(swatch)),
                    ),
                    Span::styled(format!(" {name}"), name_style),
                ])
            })
            .collect();

        RatatuiWidget::render(Paragraph::new(lines), area, buf);
    }

    fn preferred_size(&self) -> Option<Size> {
        Some(Size::new(28, 10))
    }
}

export_widget!("color-palette", COLOR_PALETTE_MANIFEST, ColorPalette);
