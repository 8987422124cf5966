// tabdash-core/src/store.rs
use crate::canvas::next_available_position;
use crate::event::{
    Event, EventBus, SettingsEvent, SettingsSection, TOPIC_SETTINGS_CHANGED, TOPIC_SETTINGS_LOADED,
    TOPIC_SETTINGS_SAVED,
};
use crate::registry::WidgetRegistry;
use crate::settings::{
    Language, Position, QuickLinkItem, QuickLinkPatch, ThemeMode, UserSettings, WallpaperPatch,
    WidgetInstance, default_quick_links,
};
use crate::storage::SettingsStorage;
use std::collections::HashSet;

pub const DEFAULT_MAX_QUICK_LINKS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub max_quick_links: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_quick_links: DEFAULT_MAX_QUICK_LINKS,
        }
    }
}

/// First-run widget list: one instance per registered widget type
pub fn default_widgets(registry: &WidgetRegistry) -> Vec<WidgetInstance> {
    registry
        .manifests()
        .iter()
        .map(|m| WidgetInstance::new(format!("{}-1", m.id), m.id, m.enabled))
        .collect()
}

/// `<type>-<n>` with the smallest `n` not already used as an instance id
fn free_instance_id(widget_type: &str, taken: &HashSet<String>) -> String {
    let mut n = 1;
    loop {
        let id = format!("{widget_type}-{n}");
        if !taken.contains(&id) {
            return id;
        }
        n += 1;
    }
}

/// Append a default instance for every registered type missing from `persisted`.
///
/// Never removes or edits an existing instance, even when its type is no longer
/// registered. New ids never collide with persisted ones. Running it on its own
/// output changes nothing.
pub fn reconcile_widgets(persisted: Vec<WidgetInstance>, registry: &WidgetRegistry) -> Vec<WidgetInstance> {
    let present: HashSet<String> = persisted.iter().map(|w| w.widget_type.clone()).collect();
    let mut taken: HashSet<String> = persisted.iter().map(|w| w.id.clone()).collect();
    let mut widgets = persisted;

    for manifest in registry.manifests() {
        if present.contains(manifest.id) {
            continue;
        }
        let id = free_instance_id(manifest.id, &taken);
        tracing::info!(widget = manifest.id, id = %id, "adding newly registered widget to settings");
        taken.insert(id.clone());
        widgets.push(WidgetInstance::new(id, manifest.id, manifest.enabled));
    }

    widgets
}

/// Owner of the in-memory settings document.
///
/// Every action applies its change and then writes the whole document through
/// the storage port. A failed write is logged and the in-memory state stays
/// authoritative.
pub struct SettingsStore<S: SettingsStorage> {
    settings: UserSettings,
    is_loading: bool,
    storage: S,
    bus: EventBus,
    options: StoreOptions,
}

impl<S: SettingsStorage> SettingsStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_options(storage, EventBus::new(), StoreOptions::default())
    }

    pub fn with_options(storage: S, bus: EventBus, options: StoreOptions) -> Self {
        Self {
            settings: UserSettings::default(),
            is_loading: true,
            storage,
            bus,
            options,
        }
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    /// Read the stored document and reconcile it with the registry
    pub fn load_settings(&mut self, registry: &WidgetRegistry) {
        self.is_loading = true;

        let stored = match self.storage.read() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read settings, using defaults");
                None
            }
        };

        let from_storage = stored.is_some();
        self.settings = match stored {
            Some(mut settings) => {
                settings.widgets = reconcile_widgets(std::mem::take(&mut settings.widgets), registry);
                if settings.quick_links.is_none() {
                    settings.quick_links = Some(default_quick_links());
                }
                settings
            }
            None => UserSettings {
                widgets: default_widgets(registry),
                quick_links: Some(default_quick_links()),
                ..UserSettings::default()
            },
        };

        self.is_loading = false;
        tracing::info!(
            widgets = self.settings.widgets.len(),
            from_storage,
            "settings loaded"
        );
        self.bus.publish(Event::new(
            TOPIC_SETTINGS_LOADED,
            SettingsEvent::Loaded {
                widgets: self.settings.widgets.len(),
                from_storage,
            },
        ));
    }

    /// Write the whole document. Failures are logged, never returned.
    pub fn save_settings(&self) {
        match self.storage.write(&self.settings) {
            Ok(()) => self
                .bus
                .publish(Event::new(TOPIC_SETTINGS_SAVED, SettingsEvent::Saved)),
            Err(e) => tracing::warn!(error = %e, "failed to save settings"),
        }
    }

    fn commit(&mut self, section: SettingsSection) {
        self.bus.publish(Event::new(
            TOPIC_SETTINGS_CHANGED,
            SettingsEvent::Changed(section),
        ));
        self.save_settings();
    }

    fn widget_mut(&mut self, id: &str) -> Option<&mut WidgetInstance> {
        self.settings.widgets.iter_mut().find(|w| w.id == id)
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.settings.theme = theme;
        self.commit(SettingsSection::Theme);
    }

    pub fn set_widgets(&mut self, widgets: Vec<WidgetInstance>) {
        self.settings.widgets = widgets;
        self.commit(SettingsSection::Widgets);
    }

    pub fn toggle_widget(&mut self, id: &str) {
        if let Some(widget) = self.widget_mut(id) {
            widget.enabled = !widget.enabled;
        }
        self.commit(SettingsSection::Widgets);
    }

    pub fn update_widget_position(&mut self, id: &str, position: Position) {
        if let Some(widget) = self.widget_mut(id) {
            widget.position = Some(position);
        }
        self.commit(SettingsSection::Widgets);
    }

    /// Move a widget in memory only, used for live drag feedback
    pub fn preview_widget_position(&mut self, id: &str, position: Position) {
        if let Some(widget) = self.widget_mut(id) {
            widget.position = Some(position);
        }
    }

    /// Add an instance. Rejected when the instance id is already taken.
    pub fn add_widget(&mut self, widget: WidgetInstance) -> bool {
        if self.settings.widget(&widget.id).is_some() {
            tracing::warn!(id = widget.id.as_str(), "widget instance id already exists");
            return false;
        }
        self.settings.widgets.push(widget);
        self.commit(SettingsSection::Widgets);
        true
    }

    /// Add another instance of a registered type as `<type>-<n>` with the
    /// smallest free `n`. Returns the new instance id.
    pub fn add_widget_of_type(&mut self, widget_type: &str, registry: &WidgetRegistry) -> Option<String> {
        let Some(manifest) = registry.manifest(widget_type) else {
            tracing::warn!(widget_type, "cannot add widget of unregistered type");
            return None;
        };

        let taken: HashSet<String> = self.settings.widgets.iter().map(|w| w.id.clone()).collect();
        let id = free_instance_id(widget_type, &taken);

        let enabled = manifest.enabled;
        self.settings
            .widgets
            .push(WidgetInstance::new(id.clone(), widget_type, enabled));
        self.commit(SettingsSection::Widgets);
        Some(id)
    }

    pub fn remove_widget(&mut self, id: &str) {
        self.settings.widgets.retain(|w| w.id != id);
        self.commit(SettingsSection::Widgets);
    }

    /// Enable a widget, giving it a free canvas slot if it was never placed
    pub fn pin_widget(&mut self, id: &str) -> Option<Position> {
        let slot = next_available_position(&self.settings.widgets);
        let widget = self.widget_mut(id)?;

        let position = *widget.position.get_or_insert(slot);
        widget.enabled = true;
        self.commit(SettingsSection::Widgets);
        Some(position)
    }

    pub fn set_wallpaper_source(&mut self, patch: WallpaperPatch) {
        self.settings.wallpaper.apply(patch);
        self.commit(SettingsSection::Wallpaper);
    }

    pub fn set_language(&mut self, language: Language) {
        self.settings.language = language;
        self.commit(SettingsSection::Language);
    }

    /// Append a quick link. Rejected without any write once the cap is reached.
    pub fn add_quick_link(&mut self, link: QuickLinkItem) -> bool {
        let count = self.settings.quick_links().len();
        if count >= self.options.max_quick_links {
            tracing::warn!(
                count,
                max = self.options.max_quick_links,
                "quick link limit reached, ignoring new link"
            );
            return false;
        }

        self.settings
            .quick_links
            .get_or_insert_with(Vec::new)
            .push(link);
        self.commit(SettingsSection::QuickLinks);
        true
    }

    pub fn remove_quick_link(&mut self, id: &str) {
        if let Some(links) = self.settings.quick_links.as_mut() {
            links.retain(|l| l.id != id);
        }
        self.commit(SettingsSection::QuickLinks);
    }

    pub fn update_quick_link(&mut self, id: &str, patch: QuickLinkPatch) {
        if let Some(link) = self
            .settings
            .quick_links
            .as_mut()
            .and_then(|links| links.iter_mut().find(|l| l.id == id))
        {
            link.apply(patch);
        }
        self.commit(SettingsSection::QuickLinks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::WidgetManifest;
    use crate::registry::ManifestSource;
    use crate::settings::IconType;
    use crate::storage::{JsonFileStorage, MemoryStorage};

    fn registry(manifests: &[WidgetManifest]) -> WidgetRegistry {
        WidgetRegistry::build(
            manifests.iter().map(|m| ManifestSource {
                module: m.id,
                manifest: *m,
            }),
            vec![],
        )
    }

    fn abc() -> WidgetRegistry {
        registry(&[
            WidgetManifest::new("a", "A").enabled_by_default(true),
            WidgetManifest::new("b", "B"),
            WidgetManifest::new("c", "C").enabled_by_default(true),
        ])
    }

    fn link(id: &str) -> QuickLinkItem {
        QuickLinkItem {
            id: id.to_string(),
            name: id.to_string(),
            url: format!("https://{id}.example"),
            icon_type: IconType::Favicon,
            favicon_url: None,
            hover_color: "rgba(0, 0, 0, 0.9)".to_string(),
        }
    }

    #[test]
    fn test_fresh_install_seeds_from_registry() {
        let registry = abc();
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::new(&storage);
        assert!(store.is_loading());

        store.load_settings(&registry);

        assert!(!store.is_loading());
        let widgets = &store.settings().widgets;
        assert_eq!(widgets.len(), 3);
        for (w, m) in widgets.iter().zip(registry.manifests()) {
            assert_eq!(w.id, format!("{}-1", m.id));
            assert_eq!(w.widget_type, m.id);
            assert_eq!(w.enabled, m.enabled);
            assert!(w.position.is_none());
        }
        assert_eq!(store.settings().quick_links(), default_quick_links().as_slice());
    }

    #[test]
    fn test_reconcile_is_monotonic_and_idempotent() {
        let registry = abc();
        let persisted = vec![
            WidgetInstance::new("a-1", "a", true).with_position(Position::new(30.0, 30.0)),
            WidgetInstance::new("b-1", "b", false),
        ];

        let merged = reconcile_widgets(persisted.clone(), &registry);
        assert_eq!(&merged[..2], persisted.as_slice());
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[2], WidgetInstance::new("c-1", "c", true));

        let again = reconcile_widgets(merged.clone(), &registry);
        assert_eq!(again, merged);
    }

    #[test]
    fn test_reconcile_skips_ids_held_by_other_types() {
        let registry = abc();
        let persisted = vec![
            WidgetInstance::new("a-1", "a", true),
            WidgetInstance::new("b-1", "b", false),
            // A renamed or retired type left an instance under c's default id
            WidgetInstance::new("c-1", "legacy", true),
        ];

        let merged = reconcile_widgets(persisted.clone(), &registry);
        assert_eq!(merged.len(), 4);
        assert_eq!(merged[3], WidgetInstance::new("c-2", "c", true));
        assert_eq!(merged[2], persisted[2]);

        let ids: HashSet<&str> = merged.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids.len(), merged.len());
        assert_eq!(reconcile_widgets(merged.clone(), &registry), merged);
    }

    #[test]
    fn test_partial_document_keeps_stored_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"user_settings": {
                "theme": "focus",
                "widgets": [{"id": "a-1", "type": "a", "enabled": true, "position": {"x": 20, "y": 20}}]
            }}"#,
        )
        .unwrap();

        let storage = JsonFileStorage::new(&path);
        let mut store = SettingsStore::new(&storage);
        store.load_settings(&abc());

        let settings = store.settings();
        assert_eq!(settings.theme, ThemeMode::Focus);
        let a = settings.widget("a-1").unwrap();
        assert!(a.enabled);
        assert_eq!(a.position, Some(Position::new(20.0, 20.0)));
        assert_eq!(settings.widgets.len(), 3);
        // Missing sections take their defaults
        assert_eq!(settings.wallpaper, crate::settings::WallpaperSource::default());
        assert_eq!(settings.search_settings, crate::settings::SearchSettings::default());
        assert_eq!(settings.quick_links().len(), default_quick_links().len());
    }

    #[test]
    fn test_load_keeps_user_choices_and_unknown_types() {
        let registry = abc();
        let storage = MemoryStorage::with_document(UserSettings {
            theme: ThemeMode::Focus,
            widgets: vec![
                WidgetInstance::new("a-1", "a", false),
                WidgetInstance::new("clock-1", "clock", true),
            ],
            ..UserSettings::default()
        });
        let mut store = SettingsStore::new(&storage);
        store.load_settings(&registry);

        let ids: Vec<_> = store.settings().widgets.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["a-1", "clock-1", "b-1", "c-1"]);
        assert!(!store.settings().widget("a-1").unwrap().enabled);
        assert_eq!(store.settings().theme, ThemeMode::Focus);
        // Pre-quick-links document gets the defaults
        assert_eq!(store.settings().quick_links().len(), default_quick_links().len());
        // Loading alone writes nothing
        assert_eq!(storage.writes(), 0);
    }

    #[test]
    fn test_load_keeps_existing_quick_links() {
        let storage = MemoryStorage::with_document(UserSettings {
            quick_links: Some(vec![]),
            ..UserSettings::default()
        });
        let mut store = SettingsStore::new(&storage);
        store.load_settings(&abc());
        assert!(store.settings().quick_links().is_empty());
    }

    #[test]
    fn test_load_reload_is_stable() {
        let registry = abc();
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::new(&storage);
        store.load_settings(&registry);
        store.toggle_widget("b-1");
        let saved = storage.document().unwrap();

        let mut reloaded = SettingsStore::new(&storage);
        reloaded.load_settings(&registry);
        assert_eq!(reloaded.settings(), &saved);
    }

    #[test]
    fn test_read_failure_falls_back_to_defaults() {
        let storage = MemoryStorage::with_document(UserSettings {
            theme: ThemeMode::Info,
            ..UserSettings::default()
        });
        storage.set_fail_reads(true);

        let mut store = SettingsStore::new(&storage);
        store.load_settings(&abc());

        assert!(!store.is_loading());
        assert_eq!(store.settings().theme, ThemeMode::Minimal);
        assert_eq!(store.settings().widgets.len(), 3);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::new(&storage);
        store.load_settings(&abc());

        storage.set_fail_writes(true);
        store.set_theme(ThemeMode::Custom);

        assert_eq!(store.settings().theme, ThemeMode::Custom);
        assert!(storage.document().is_none());
    }

    #[test]
    fn test_double_toggle_restores_state() {
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::new(&storage);
        store.load_settings(&abc());
        let before = store.settings().widgets.clone();

        store.toggle_widget("b-1");
        assert!(store.settings().widget("b-1").unwrap().enabled);
        assert_eq!(store.settings().widget("a-1"), before.iter().find(|w| w.id == "a-1"));
        assert_eq!(store.settings().widget("c-1"), before.iter().find(|w| w.id == "c-1"));

        store.toggle_widget("b-1");
        assert_eq!(store.settings().widgets, before);
        assert_eq!(storage.writes(), 2);
    }

    #[test]
    fn test_every_action_persists() {
        let registry = abc();
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::new(&storage);
        store.load_settings(&registry);

        store.set_theme(ThemeMode::Info);
        store.update_widget_position("a-1", Position::new(40.0, 60.0));
        store.set_wallpaper_source(WallpaperPatch {
            keywords: Some(vec!["ocean".into()]),
            ..WallpaperPatch::default()
        });
        store.set_language(Language::Zh);
        store.remove_quick_link("github");
        store.update_quick_link(
            "x",
            QuickLinkPatch {
                name: Some("Twitter".into()),
                ..QuickLinkPatch::default()
            },
        );
        store.remove_widget("c-1");
        assert_eq!(storage.writes(), 7);

        let doc = storage.document().unwrap();
        assert_eq!(doc.theme, ThemeMode::Info);
        assert_eq!(doc.widget("a-1").unwrap().position, Some(Position::new(40.0, 60.0)));
        assert_eq!(doc.wallpaper.keywords, vec!["ocean"]);
        assert_eq!(doc.language, Language::Zh);
        assert!(doc.quick_links().iter().all(|l| l.id != "github"));
        assert_eq!(doc.quick_links()[0].name, "Twitter");
        assert!(doc.widget("c-1").is_none());
    }

    #[test]
    fn test_quick_link_cap() {
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::with_options(
            &storage,
            EventBus::new(),
            StoreOptions { max_quick_links: 9 },
        );
        store.load_settings(&abc());

        assert!(store.add_quick_link(link("docs")));
        assert_eq!(store.settings().quick_links().len(), 9);
        let writes = storage.writes();
        let before = store.settings().quick_links().to_vec();

        assert!(!store.add_quick_link(link("extra")));
        assert_eq!(store.settings().quick_links(), before.as_slice());
        assert_eq!(storage.writes(), writes);
    }

    #[test]
    fn test_add_widget_rejects_duplicate_instance_id() {
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::new(&storage);
        store.load_settings(&abc());

        assert!(!store.add_widget(WidgetInstance::new("a-1", "a", true)));
        assert_eq!(storage.writes(), 0);
        assert!(store.add_widget(WidgetInstance::new("a-2", "a", true)));
        assert_eq!(store.settings().widgets.len(), 4);
    }

    #[test]
    fn test_add_widget_of_type_picks_free_suffix() {
        let registry = abc();
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::new(&storage);
        store.load_settings(&registry);

        assert_eq!(store.add_widget_of_type("a", &registry).as_deref(), Some("a-2"));
        store.remove_widget("a-1");
        assert_eq!(store.add_widget_of_type("a", &registry).as_deref(), Some("a-1"));
        assert!(store.add_widget_of_type("nope", &registry).is_none());
    }

    #[test]
    fn test_pin_assigns_slot_once() {
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::new(&storage);
        store.load_settings(&abc());

        assert_eq!(store.pin_widget("b-1"), Some(Position::new(50.0, 30.0)));
        assert_eq!(store.pin_widget("a-1"), Some(Position::new(30.0, 50.0)));

        // Unpin then pin again: the old slot is reused
        store.toggle_widget("b-1");
        assert!(!store.settings().widget("b-1").unwrap().enabled);
        assert_eq!(store.pin_widget("b-1"), Some(Position::new(50.0, 30.0)));
        assert!(store.settings().widget("b-1").unwrap().enabled);

        assert_eq!(store.pin_widget("missing"), None);
    }

    #[test]
    fn test_actions_publish_changes() {
        let bus = EventBus::new();
        let (_sub, rx) = bus.subscribe(TOPIC_SETTINGS_CHANGED);
        let storage = MemoryStorage::new();
        let mut store = SettingsStore::with_options(&storage, bus, StoreOptions::default());
        store.load_settings(&abc());

        store.set_language(Language::Zh);
        let event = rx.try_recv().unwrap();
        let payload: std::sync::Arc<SettingsEvent> = event.payload.downcast().unwrap();
        assert_eq!(*payload, SettingsEvent::Changed(SettingsSection::Language));
    }
}
