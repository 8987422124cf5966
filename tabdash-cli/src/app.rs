// tabdash-cli/src/app.rs
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::collections::HashMap;
use std::time::Instant;
use tabdash_core::{
    BusEvent, Canvas, Event, Placement, SettingsEvent, SettingsSection, SettingsStorage,
    SettingsStore, Size, WidgetContainer, WidgetRegistry,
};

pub type Store = SettingsStore<Box<dyn SettingsStorage>>;

/// Cursor into the widget drawer list (registry order)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawerState {
    pub selected: usize,
}

pub struct App {
    pub store: Store,
    pub registry: WidgetRegistry,
    pub canvas: Canvas,
    pub containers: HashMap<String, WidgetContainer>,
    /// Placements drawn in the last frame, used for mouse hit testing
    pub placements: Vec<Placement>,
    pub focused: Option<String>,
    pub drawer: Option<DrawerState>,
    pub show_duplicate_notice: bool,
    pub default_size: Size,
    pub last_saved: Option<Instant>,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: Store, registry: WidgetRegistry, canvas: Canvas, default_size: Size) -> Self {
        let show_duplicate_notice = !registry.duplicate_ids().is_empty();
        Self {
            store,
            registry,
            canvas,
            containers: HashMap::new(),
            placements: Vec::new(),
            focused: None,
            drawer: None,
            show_duplicate_notice,
            default_size,
            last_saved: None,
            should_quit: false,
        }
    }

    /// Mount containers for newly shown instances and unmount hidden ones
    pub fn sync_containers(&mut self) {
        let live: Vec<(String, String)> = self
            .store
            .settings()
            .widgets
            .iter()
            .filter(|w| w.enabled && w.position.is_some())
            .map(|w| (w.id.clone(), w.widget_type.clone()))
            .collect();

        self.containers.retain(|id, container| {
            let keep = live.iter().any(|(live_id, _)| live_id == id);
            if !keep {
                container.unmount();
            }
            keep
        });

        for (id, widget_type) in live {
            if self.containers.contains_key(&id) || !self.registry.has_component(&widget_type) {
                continue;
            }
            let Some(manifest) = self.registry.manifest(&widget_type).copied() else {
                continue;
            };
            let Some(widget) = self.registry.create(&widget_type) else {
                continue;
            };

            let mut container = WidgetContainer::new(id.clone(), manifest, widget);
            container.mount();
            tracing::debug!(instance = id.as_str(), widget_type = widget_type.as_str(), "widget mounted");
            self.containers.insert(id, container);
        }

        if let Some(id) = &self.focused
            && !self.containers.contains_key(id)
        {
            self.focused = None;
        }
    }

    /// Lay out the canvas for this frame. The canvas area is also the drag viewport.
    pub fn refresh_placements(&mut self, area: Rect) {
        self.canvas.set_viewport(area.into());

        let containers = &self.containers;
        let default_size = self.default_size;
        self.placements = self
            .canvas
            .placements(self.store.settings(), &self.registry, area, |w| {
                containers
                    .get(&w.id)
                    .and_then(|c| c.preferred_size())
                    .unwrap_or(default_size)
            });
    }

    pub fn handle_bus_event(&mut self, event: &BusEvent) {
        let Some(settings_event) = event.payload.downcast::<SettingsEvent>() else {
            return;
        };

        match *settings_event {
            SettingsEvent::Loaded { .. } | SettingsEvent::Changed(SettingsSection::Widgets) => {
                self.sync_containers()
            }
            SettingsEvent::Saved => self.last_saved = Some(Instant::now()),
            SettingsEvent::Changed(_) => {}
        }
    }

    pub fn tick(&mut self) {
        for container in self.containers.values_mut() {
            container.update();
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.drawer.is_some() {
            self.handle_drawer_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('w') => self.drawer = Some(DrawerState::default()),
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::Char('x') => self.close_focused(),
            KeyCode::Char('t') => {
                let theme = self.store.settings().theme.next();
                self.store.set_theme(theme);
            }
            KeyCode::Char('l') => {
                let language = self.store.settings().language.toggle();
                self.store.set_language(language);
            }
            KeyCode::Esc => {
                if self.canvas.is_dragging() {
                    self.canvas.cancel_drag(&mut self.store);
                } else {
                    self.show_duplicate_notice = false;
                }
            }
            _ => {
                if let Some(id) = &self.focused
                    && let Some(container) = self.containers.get_mut(id)
                {
                    container.handle_event(Event::Key(key));
                }
            }
        }
    }

    fn handle_drawer_key(&mut self, key: KeyEvent) {
        let len = self.registry.len();
        let Some(drawer) = self.drawer.as_mut() else {
            return;
        };

        match key.code {
            KeyCode::Esc | KeyCode::Char('w') => self.drawer = None,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => drawer.selected = drawer.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                drawer.selected = (drawer.selected + 1).min(len.saturating_sub(1));
            }
            KeyCode::Enter => {
                let selected = drawer.selected;
                if let Some(widget_type) = self.registry.manifests().get(selected).map(|m| m.id) {
                    self.toggle_pinned(widget_type);
                }
            }
            _ => {}
        }
    }

    pub fn is_pinned(&self, widget_type: &str) -> bool {
        self.store
            .settings()
            .widgets
            .iter()
            .any(|w| w.widget_type == widget_type && w.enabled)
    }

    /// Drawer action: unpin every shown instance of the type, or pin the first
    /// existing one (creating it when the type has never been added)
    pub fn toggle_pinned(&mut self, widget_type: &str) {
        let instances: Vec<(String, bool)> = self
            .store
            .settings()
            .widgets
            .iter()
            .filter(|w| w.widget_type == widget_type)
            .map(|w| (w.id.clone(), w.enabled))
            .collect();

        if instances.iter().any(|(_, enabled)| *enabled) {
            for (id, _) in instances.iter().filter(|(_, enabled)| *enabled) {
                self.store.toggle_widget(id);
            }
            return;
        }

        let id = match instances.into_iter().next() {
            Some((id, _)) => Some(id),
            None => self.store.add_widget_of_type(widget_type, &self.registry),
        };
        if let Some(id) = id
            && self.store.pin_widget(&id).is_some()
        {
            self.focused = Some(id);
        }
    }

    pub fn cycle_focus(&mut self) {
        if self.placements.is_empty() {
            self.focused = None;
            return;
        }

        let next = match &self.focused {
            Some(id) => self
                .placements
                .iter()
                .position(|p| &p.instance_id == id)
                .map_or(0, |i| (i + 1) % self.placements.len()),
            None => 0,
        };
        self.focused = Some(self.placements[next].instance_id.clone());
    }

    pub fn close_focused(&mut self) {
        let Some(id) = self.focused.clone() else {
            return;
        };
        let closeable = self
            .placements
            .iter()
            .find(|p| p.instance_id == id)
            .is_some_and(|p| p.closeable);

        if closeable {
            self.store.toggle_widget(&id);
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.drawer.is_some() {
            return;
        }
        let pointer = (mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(hit) = Canvas::hit_test(&self.placements, mouse.column, mouse.row).cloned()
                else {
                    self.focused = None;
                    return;
                };
                self.focused = Some(hit.instance_id.clone());

                if hit.closeable && on_close_marker(&hit, pointer) {
                    self.store.toggle_widget(&hit.instance_id);
                } else if hit.draggable {
                    self.canvas
                        .begin_drag(&hit.instance_id, pointer, &self.store, &self.registry);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.canvas.drag_to(pointer, &mut self.store);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.canvas.end_drag(&mut self.store);
            }
            _ => {}
        }
    }
}

/// The " [x] " marker sits right-aligned in the top border, inside the corners
fn on_close_marker(placement: &Placement, (column, row): (u16, u16)) -> bool {
    let rect = placement.rect;
    row == rect.y && column + 6 >= rect.right() && column + 1 < rect.right()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::buffer::Buffer;
    use tabdash_core::registry::{ComponentSource, ManifestSource};
    use tabdash_core::settings::{Position, ThemeMode, WidgetInstance};
    use tabdash_core::{
        DragPersistence, EventBus, MemoryStorage, StoreOptions, UserSettings, Widget,
        WidgetFeatures, WidgetManifest,
    };

    #[derive(Default)]
    struct Blank;

    impl Widget for Blank {
        fn render(&mut self, _area: Rect, _buf: &mut Buffer) {}
    }

    fn create_blank() -> Box<dyn Widget> {
        Box::new(Blank)
    }

    const NOTE: WidgetManifest = WidgetManifest::new("note", "Note").with_features(WidgetFeatures::FLOATING);
    const BADGE: WidgetManifest = WidgetManifest::new("badge", "Badge").with_features(WidgetFeatures::FIXED);

    fn registry() -> WidgetRegistry {
        WidgetRegistry::build(
            [NOTE, BADGE].map(|manifest| ManifestSource {
                module: manifest.id,
                manifest,
            }),
            [
                ComponentSource {
                    module: "note",
                    export: "Note",
                    create: create_blank,
                },
                ComponentSource {
                    module: "badge",
                    export: "Badge",
                    create: create_blank,
                },
            ],
        )
    }

    pub(crate) fn app_with(widgets: Vec<WidgetInstance>) -> App {
        let document = UserSettings {
            widgets,
            ..UserSettings::default()
        };
        let storage: Box<dyn SettingsStorage> = Box::new(MemoryStorage::with_document(document));
        let registry = registry();
        let mut store = SettingsStore::with_options(storage, EventBus::new(), StoreOptions::default());
        store.load_settings(&registry);

        let canvas = Canvas::new(DragPersistence::OnDrop);
        let mut app = App::new(store, registry, canvas, Size::new(20, 6));
        app.sync_containers();
        app.refresh_placements(Rect::new(0, 0, 100, 50));
        app
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub(crate) fn note_at(id: &str, x: f64, y: f64) -> WidgetInstance {
        WidgetInstance::new(id, "note", true).with_position(Position::new(x, y))
    }

    #[test]
    fn test_sync_mounts_only_shown_instances() {
        let app = app_with(vec![
            note_at("note-1", 20.0, 20.0),
            WidgetInstance::new("note-2", "note", false),
            WidgetInstance::new("badge-1", "badge", true),
        ]);

        assert_eq!(app.containers.len(), 1);
        assert!(app.containers["note-1"].is_mounted());
    }

    #[test]
    fn test_drawer_pins_and_unpins() {
        let mut app = app_with(vec![]);
        app.handle_key(press(KeyCode::Char('w')));
        assert!(app.drawer.is_some());

        // Registry order is registration order: note, badge
        app.handle_key(press(KeyCode::Enter));
        assert!(app.is_pinned("note"));
        let note = app.store.settings().widget("note-1").unwrap();
        assert!(note.position.is_some());
        assert_eq!(app.focused.as_deref(), Some("note-1"));

        app.handle_key(press(KeyCode::Enter));
        assert!(!app.is_pinned("note"));

        app.handle_key(press(KeyCode::Esc));
        assert!(app.drawer.is_none());
    }

    #[test]
    fn test_drag_commits_on_release() {
        let mut app = app_with(vec![note_at("note-1", 50.0, 50.0)]);
        let rect = app.placements[0].rect;
        let (col, row) = (rect.x + 2, rect.y + 2);

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), col, row));
        assert!(app.canvas.is_dragging());
        assert_eq!(app.focused.as_deref(), Some("note-1"));

        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), col + 10, row + 5));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), col + 10, row + 5));

        assert!(!app.canvas.is_dragging());
        let stored = app.store.storage().read().unwrap().unwrap();
        assert_eq!(
            stored.widget("note-1").and_then(|w| w.position),
            Some(Position::new(60.0, 60.0))
        );
    }

    #[test]
    fn test_close_marker_click_hides_widget() {
        let mut app = app_with(vec![note_at("note-1", 50.0, 50.0)]);
        let rect = app.placements[0].rect;

        app.handle_mouse(mouse(
            MouseEventKind::Down(MouseButton::Left),
            rect.right() - 4,
            rect.y,
        ));

        assert!(!app.canvas.is_dragging());
        assert!(!app.store.settings().widget("note-1").unwrap().enabled);
    }

    #[test]
    fn test_focus_cycle_and_close_key() {
        let mut app = app_with(vec![note_at("note-1", 20.0, 20.0), note_at("note-2", 80.0, 80.0)]);

        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.focused.as_deref(), Some("note-1"));
        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.focused.as_deref(), Some("note-2"));
        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.focused.as_deref(), Some("note-1"));

        app.handle_key(press(KeyCode::Char('x')));
        assert!(!app.store.settings().widget("note-1").unwrap().enabled);
    }

    #[test]
    fn test_theme_and_language_keys_persist() {
        let mut app = app_with(vec![]);
        app.handle_key(press(KeyCode::Char('t')));
        app.handle_key(press(KeyCode::Char('l')));

        let stored = app.store.storage().read().unwrap().unwrap();
        assert_eq!(stored.theme, ThemeMode::Info);
        assert_eq!(stored.language, tabdash_core::settings::Language::Zh);
    }

    #[test]
    fn test_bus_events_drive_sync() {
        let mut app = app_with(vec![note_at("note-1", 20.0, 20.0)]);
        let (_sub, rx) = app.store.bus().subscribe("settings.*");

        app.store.toggle_widget("note-1");
        while let Ok(event) = rx.try_recv() {
            app.handle_bus_event(&event);
        }

        assert!(app.containers.is_empty());
        assert!(app.last_saved.is_some());
    }
}
