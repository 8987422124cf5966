// tabdash-core/src/registry.rs
use crate::Widget;
use crate::manifest::WidgetManifest;
use std::collections::{HashMap, HashSet};

/// Zero-argument constructor for a widget implementation
pub type WidgetConstructor = fn() -> Box<dyn Widget>;

/// One widget module as contributed by `export_widget!`.
///
/// `module` plays the role of the directory name: it must equal the manifest id
/// for the component to be found.
pub struct WidgetModule {
    pub module: &'static str,
    pub manifest: WidgetManifest,
    /// Type name of the exported component, expected to be the PascalCase id
    pub export: &'static str,
    pub create: WidgetConstructor,
}

impl WidgetModule {
    pub const fn new(
        module: &'static str,
        manifest: WidgetManifest,
        export: &'static str,
        create: WidgetConstructor,
    ) -> Self {
        Self {
            module,
            manifest,
            export,
            create,
        }
    }
}

inventory::collect!(WidgetModule);

/// A manifest found in a widget module
#[derive(Debug, Clone, Copy)]
pub struct ManifestSource {
    pub module: &'static str,
    pub manifest: WidgetManifest,
}

/// A component implementation found in a widget module
#[derive(Clone, Copy)]
pub struct ComponentSource {
    pub module: &'static str,
    pub export: &'static str,
    pub create: WidgetConstructor,
}

/// Read-only map of widget manifests and their component bindings.
///
/// Built once at startup. Duplicate ids and missing components never fail the
/// build; they are recorded so the UI can show a developer warning.
pub struct WidgetRegistry {
    manifests: Vec<WidgetManifest>,
    index: HashMap<&'static str, usize>,
    components: HashMap<&'static str, WidgetConstructor>,
    duplicate_ids: Vec<String>,
    missing_components: Vec<String>,
}

impl WidgetRegistry {
    /// Build from every module submitted through `export_widget!` in the binary.
    ///
    /// Link order is unspecified, so modules are sorted by key first to keep
    /// "first registration wins" deterministic across distinct keys. Two
    /// registrations under one key keep their link order.
    pub fn discover() -> Self {
        let mut modules: Vec<&WidgetModule> = inventory::iter::<WidgetModule>.into_iter().collect();
        modules.sort_by(|a, b| a.module.cmp(b.module));

        let descriptors: Vec<_> = modules
            .iter()
            .map(|m| ManifestSource {
                module: m.module,
                manifest: m.manifest,
            })
            .collect();
        let components: Vec<_> = modules
            .iter()
            .map(|m| ComponentSource {
                module: m.module,
                export: m.export,
                create: m.create,
            })
            .collect();

        let registry = Self::build(descriptors, components);
        tracing::info!(
            widgets = registry.len(),
            duplicates = registry.duplicate_ids.len(),
            "widget discovery finished"
        );
        registry
    }

    /// Register manifests in order, first id wins, then bind components.
    ///
    /// Descriptor and component sources are parallel per module: the n-th
    /// manifest from a module pairs with the n-th component from that module,
    /// so a duplicate registration under the same module key never lends its
    /// constructor to the winner.
    pub fn build(
        descriptors: impl IntoIterator<Item = ManifestSource>,
        components: impl IntoIterator<Item = ComponentSource>,
    ) -> Self {
        let mut manifests = Vec::new();
        let mut origins: Vec<(&'static str, usize)> = Vec::new();
        let mut index = HashMap::new();
        let mut seen: HashSet<&'static str> = HashSet::new();
        let mut duplicate_ids = Vec::new();
        let mut taken_modules: HashSet<&'static str> = HashSet::new();
        let mut module_occurrences: HashMap<&'static str, usize> = HashMap::new();

        for source in descriptors {
            let manifest = source.manifest;
            let occurrence = {
                let count = module_occurrences.entry(source.module).or_insert(0);
                *count += 1;
                *count - 1
            };

            if manifest.id.is_empty() {
                tracing::warn!(module = source.module, "ignoring manifest without an id");
                continue;
            }

            if seen.contains(manifest.id) {
                tracing::warn!(
                    id = manifest.id,
                    module = source.module,
                    "duplicate widget id detected, skipping this widget"
                );
                duplicate_ids.push(manifest.id.to_string());
                continue;
            }

            // A module contributes at most one manifest
            if taken_modules.contains(source.module) {
                tracing::debug!(
                    module = source.module,
                    id = manifest.id,
                    "module already registered a manifest, skipping"
                );
                continue;
            }

            seen.insert(manifest.id);
            taken_modules.insert(source.module);
            index.insert(manifest.id, manifests.len());
            manifests.push(manifest);
            origins.push((source.module, occurrence));
        }

        let components: Vec<ComponentSource> = components.into_iter().collect();
        let mut component_map = HashMap::new();
        let mut missing_components = Vec::new();

        for (manifest, (module, occurrence)) in manifests.iter().zip(&origins) {
            let expected = manifest.component_name();
            let in_module: Vec<&ComponentSource> = components
                .iter()
                .filter(|c| c.module == manifest.id)
                .collect();

            let paired = in_module
                .get(*occurrence)
                .filter(|_| *module == manifest.id);
            let found = match paired {
                Some(component) => Some(*component).filter(|c| c.export == expected),
                None => in_module.iter().copied().find(|c| c.export == expected),
            };

            match found {
                Some(component) => {
                    component_map.insert(manifest.id, component.create);
                }
                None => {
                    if in_module.is_empty() {
                        tracing::warn!(id = manifest.id, "no component module found for widget");
                    } else {
                        tracing::warn!(
                            id = manifest.id,
                            expected = expected.as_str(),
                            "expected component export not found in widget module"
                        );
                    }
                    missing_components.push(manifest.id.to_string());
                }
            }
        }

        Self {
            manifests,
            index,
            components: component_map,
            duplicate_ids,
            missing_components,
        }
    }

    pub fn manifest(&self, id: &str) -> Option<&WidgetManifest> {
        self.index.get(id).map(|&i| &self.manifests[i])
    }

    /// Component constructor for `id`. A miss is logged; callers render nothing.
    pub fn component(&self, id: &str) -> Option<WidgetConstructor> {
        let component = self.components.get(id).copied();
        if component.is_none() {
            tracing::warn!(id, "component for widget not found");
        }
        component
    }

    /// Quiet variant of `component` for per-frame checks
    pub fn has_component(&self, id: &str) -> bool {
        self.components.contains_key(id)
    }

    /// Instantiate the component bound to `id`
    pub fn create(&self, id: &str) -> Option<Box<dyn Widget>> {
        self.component(id).map(|create| create())
    }

    /// All registered manifests in registration order
    pub fn manifests(&self) -> &[WidgetManifest] {
        &self.manifests
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    pub fn duplicate_ids(&self) -> &[String] {
        &self.duplicate_ids
    }

    pub fn missing_components(&self) -> &[String] {
        &self.missing_components
    }

    /// Display name, falling back to the id for unknown widgets
    pub fn widget_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.manifest(id).map(|m| m.name).unwrap_or(id)
    }

    pub fn widget_description(&self, id: &str) -> &str {
        self.manifest(id).map(|m| m.description).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{buffer::Buffer, layout::Rect};

    #[derive(Default)]
    struct Blank;

    impl Widget for Blank {
        fn render(&mut self, _area: Rect, _buf: &mut Buffer) {}
    }

    fn blank() -> Box<dyn Widget> {
        Box::new(Blank)
    }

    fn manifest(module: &'static str, id: &'static str, name: &'static str) -> ManifestSource {
        ManifestSource {
            module,
            manifest: WidgetManifest::new(id, name),
        }
    }

    fn component(module: &'static str, export: &'static str) -> ComponentSource {
        ComponentSource {
            module,
            export,
            create: blank,
        }
    }

    #[test]
    fn test_duplicate_ids_first_wins() {
        let registry = WidgetRegistry::build(
            vec![
                manifest("weather", "weather", "Weather"),
                manifest("weather-copy", "weather", "Weather Copy"),
                manifest("quote", "quote", "Quote"),
                manifest("quote-a", "quote", "Quote A"),
                manifest("quote-b", "quote", "Quote B"),
            ],
            vec![component("weather", "Weather"), component("quote", "Quote")],
        );

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.manifest("weather").map(|m| m.name), Some("Weather"));
        assert_eq!(registry.manifest("quote").map(|m| m.name), Some("Quote"));
        assert_eq!(registry.duplicate_ids(), &["weather", "quote", "quote"]);
    }

    #[derive(Default)]
    struct Compact;

    impl Widget for Compact {
        fn render(&mut self, _area: Rect, _buf: &mut Buffer) {}

        fn preferred_size(&self) -> Option<crate::widget::Size> {
            Some(crate::widget::Size::new(1, 1))
        }
    }

    fn compact() -> Box<dyn Widget> {
        Box::new(Compact)
    }

    #[test]
    fn test_same_module_duplicate_is_reported() {
        // Two crates exporting under the same key, as `export_widget!` produces
        let registry = WidgetRegistry::build(
            vec![
                manifest("quote", "quote", "Quote"),
                manifest("quote", "quote", "Quote Two"),
            ],
            vec![
                component("quote", "Quote"),
                ComponentSource {
                    module: "quote",
                    export: "Quote",
                    create: compact,
                },
            ],
        );

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.duplicate_ids(), &["quote"]);
        assert_eq!(registry.manifest("quote").map(|m| m.name), Some("Quote"));
        // The winner's own constructor is bound, not the loser's
        let widget = registry.create("quote").unwrap();
        assert!(widget.preferred_size().is_none());
    }

    #[test]
    fn test_same_module_duplicate_binds_winner_in_second_slot() {
        let registry = WidgetRegistry::build(
            vec![
                manifest("quote", "", "Broken"),
                manifest("quote", "quote", "Quote"),
            ],
            vec![
                component("quote", "Quote"),
                ComponentSource {
                    module: "quote",
                    export: "Quote",
                    create: compact,
                },
            ],
        );

        assert!(registry.duplicate_ids().is_empty());
        let widget = registry.create("quote").unwrap();
        assert_eq!(widget.preferred_size(), Some(crate::widget::Size::new(1, 1)));
    }

    #[test]
    fn test_component_naming_convention() {
        let registry = WidgetRegistry::build(
            vec![
                manifest("color-converter", "color-converter", "Color Converter"),
                manifest("news", "news", "News"),
                manifest("stock", "stock", "Stock"),
            ],
            vec![
                component("color-converter", "ColorConverter"),
                // Wrong export name in the right module
                component("news", "Headlines"),
            ],
        );

        assert!(registry.component("color-converter").is_some());
        assert!(registry.create("color-converter").is_some());
        assert!(registry.component("news").is_none());
        assert!(registry.component("stock").is_none());
        assert_eq!(registry.missing_components(), &["news", "stock"]);
        // Missing components keep the manifest registered
        assert!(registry.contains("news"));
    }

    #[test]
    fn test_component_must_live_in_matching_module() {
        let registry = WidgetRegistry::build(
            vec![manifest("quote", "quote", "Quote")],
            vec![component("misc", "Quote")],
        );

        assert!(registry.component("quote").is_none());
    }

    #[test]
    fn test_one_manifest_per_module() {
        let registry = WidgetRegistry::build(
            vec![
                manifest("countdown", "countdown", "Countdown"),
                manifest("countdown", "countdown-extra", "Extra"),
            ],
            vec![],
        );

        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("countdown-extra"));
        assert!(registry.duplicate_ids().is_empty());
    }

    #[test]
    fn test_empty_id_is_ignored() {
        let registry = WidgetRegistry::build(
            vec![manifest("broken", "", "Broken"), manifest("quote", "quote", "Quote")],
            vec![],
        );

        assert_eq!(registry.len(), 1);
        assert!(registry.duplicate_ids().is_empty());
    }

    #[test]
    fn test_registration_order_and_names() {
        let registry = WidgetRegistry::build(
            vec![
                manifest("weather", "weather", "Weather"),
                manifest("air-quality", "air-quality", "Air Quality"),
            ],
            vec![],
        );

        let ids: Vec<_> = registry.manifests().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["weather", "air-quality"]);
        assert_eq!(registry.widget_name("air-quality"), "Air Quality");
        assert_eq!(registry.widget_name("gone"), "gone");
        assert_eq!(registry.widget_description("gone"), "");
    }
}
