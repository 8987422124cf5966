// tabdash-core/src/widget.rs
use crate::header::{HeaderActionSink, HeaderActions};
use crate::manifest::WidgetManifest;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};
use std::time::Duration;

/// Core widget trait with lifecycle hooks.
///
/// Implementations take no constructor arguments: the registry builds them
/// through `Default`, so everything a widget needs must be self-contained.
pub trait Widget: Send + Sync {
    /// Called once when widget is placed on the canvas
    fn on_mount(&mut self) {}

    /// Offer header actions to the hosting container. Called right after mount.
    fn register_header_actions(&mut self, _sink: &mut dyn HeaderActionSink) {}

    /// Called every tick with delta time since last update
    fn on_update(&mut self, _delta: Duration) {}

    /// Handle input events routed to the focused widget
    fn on_event(&mut self, _event: Event) -> EventResult {
        EventResult::Ignored
    }

    /// Render the widget body (inside the container frame)
    fn render(&mut self, area: Rect, buf: &mut Buffer);

    /// Widget's preferred outer size in cells (None = canvas default)
    fn preferred_size(&self) -> Option<Size> {
        None
    }

    /// Whether widget needs regular updates (for clocks/polling)
    fn needs_update(&self) -> bool {
        false
    }

    /// Cleanup when widget is removed from the canvas
    fn on_unmount(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    Key(crossterm::event::KeyEvent),
    Mouse(crossterm::event::MouseEvent),
    Resize(u16, u16),
    /// A header action registered by the widget was triggered
    HeaderAction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Consumed, // Stop propagation
    Ignored,  // Continue to next handler
}

/// Binds one placed widget instance to its live implementation and frame
pub struct WidgetContainer {
    widget: Box<dyn Widget>,
    manifest: WidgetManifest,
    instance_id: String,
    actions: HeaderActions,
    last_update: std::time::Instant,
    mounted: bool,
}

impl WidgetContainer {
    pub fn new(instance_id: String, manifest: WidgetManifest, widget: Box<dyn Widget>) -> Self {
        Self {
            widget,
            manifest,
            instance_id,
            actions: HeaderActions::new(),
            last_update: std::time::Instant::now(),
            mounted: false,
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn manifest(&self) -> &WidgetManifest {
        &self.manifest
    }

    pub fn header_actions(&self) -> &HeaderActions {
        &self.actions
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn preferred_size(&self) -> Option<Size> {
        self.widget.preferred_size()
    }

    pub fn mount(&mut self) {
        if !self.mounted {
            self.widget.on_mount();
            self.widget.register_header_actions(&mut self.actions);
            self.mounted = true;
        }
    }

    pub fn update(&mut self) {
        let now = std::time::Instant::now();
        let delta = now.duration_since(self.last_update);

        if self.widget.needs_update() {
            self.widget.on_update(delta);
        }

        self.last_update = now;
    }

    /// Route an event, translating header action keys first
    pub fn handle_event(&mut self, event: Event) -> EventResult {
        if let Event::Key(key) = &event
            && let crossterm::event::KeyCode::Char(c) = key.code
            && let Some(action) = self.actions.for_key(c)
        {
            let id = action.id.clone();
            return self.widget.on_event(Event::HeaderAction(id));
        }

        self.widget.on_event(event)
    }

    /// Draw frame and body. The frame title carries the widget name, its header
    /// actions and a close marker when the manifest allows closing.
    pub fn render_framed(&mut self, area: Rect, buf: &mut Buffer, focused: bool) {
        let border_color = if focused {
            Color::Yellow
        } else {
            Color::DarkGray
        };

        let mut title = format!(" {} ", self.manifest.name);
        if !self.actions.is_empty() {
            title.push_str(&format!("{} ", self.actions.title_suffix()));
        }

        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border_color));
        if self.manifest.features.closeable {
            block = block.title_top(ratatui::text::Line::from(" [x] ").right_aligned());
        }

        let inner = block.inner(area);
        ratatui::widgets::Widget::render(block, area, buf);

        if inner.width > 0 && inner.height > 0 {
            self.widget.render(inner, buf);
        }
    }

    pub fn unmount(&mut self) {
        if self.mounted {
            self.widget.on_unmount();
            self.actions.clear();
            self.mounted = false;
        }
    }
}
