// tabdash-widgets/src/quote.rs
use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    prelude::Widget as RatatuiWidget,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};
use tabdash_plugin_sdk::{
    Event, EventResult, HeaderAction, HeaderActionSink, Size, Widget, WidgetFeatures,
    WidgetManifest, export_widget,
};

pub const QUOTE_MANIFEST: WidgetManifest = WidgetManifest {
    id: "quote",
    name: "Quote",
    description: "Inspirational quotes",
    enabled: false,
    category: "inspiration",
    icon: "💭",
    version: "1.0.0",
    features: WidgetFeatures::FLOATING,
};

pub const REFRESH_ACTION: &str = "refresh";

const QUOTES: &[(&str, &str)] = &[
    ("The only way to do great work is to love what you do.", "Steve Jobs"),
    ("Simplicity is prerequisite for reliability.", "Edsger W. Dijkstra"),
    ("Make it work, make it right, make it fast.", "Kent Beck"),
    ("Talk is cheap. Show me the code.", "Linus Torvalds"),
    ("Premature optimization is the root of all evil.", "Donald Knuth"),
    ("Stay hungry, stay foolish.", "Stewart Brand"),
    ("What we think, we become.", "Buddha"),
    ("Well begun is half done.", "Aristotle"),
];

/// Shows one quote at a time, shuffled by the header's refresh action
pub struct Quote {
    index: usize,
}

impl Default for Quote {
    fn default() -> Self {
        Self {
            index: rand::rng().random_range(0..QUOTES.len()),
        }
    }
}

impl Quote {
    pub fn current(&self) -> (&'static str, &'static str) {
        QUOTES[self.index]
    }

    /// Jump to a random quote different from the current one
    pub fn shuffle(&mut self) {
        if QUOTES.len() < 2 {
            return;
        }
        // Draw from the other n-1 slots and skip over the current index
        let pick = rand::rng().random_range(0..QUOTES.len() - 1);
        self.index = if pick >= self.index { pick + 1 } else { pick };
    }
}

impl Widget for Quote {
    fn register_header_actions(&mut self, sink: &mut dyn HeaderActionSink) {
        sink.register_action(HeaderAction::new(REFRESH_ACTION, "New", 'r'));
    }

    fn on_event(&mut self, event: Event) -> EventResult {
        match event {
            Event::HeaderAction(id) if id == REFRESH_ACTION => {
                self.shuffle();
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let (text, author) = self.current();
        let lines = vec![
            Line::from(Span::styled(
                format!("“{text}”"),
                Style::default().add_modifier(Modifier::ITALIC),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!("- {author}"),
                Style::default().fg(Color::DarkGray),
            ))
            .right_aligned(),
        ];

        RatatuiWidget::render(
            Paragraph::new(lines).wrap(Wrap { trim: true }),
            area,
            buf,
        );
    }

    fn preferred_size(&self) -> Option<Size> {
        Some(Size::new(40, 7))
    }
}

export_widget!("quote", QUOTE_MANIFEST, Quote);
