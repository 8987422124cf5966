// tabdash-core/src/manifest.rs

/// Capability flags the canvas reads to decide which affordances to wire up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetFeatures {
    /// Widget can be repositioned with the pointer
    pub draggable: bool,
    /// Widget frame shows a close marker and accepts the close key
    pub closeable: bool,
    /// Reserved, no widget currently resizes
    pub resizable: bool,
}

impl WidgetFeatures {
    /// Draggable and closeable, fixed size. What every floating widget ships with.
    pub const FLOATING: Self = Self {
        draggable: true,
        closeable: true,
        resizable: false,
    };

    pub const FIXED: Self = Self {
        draggable: false,
        closeable: false,
        resizable: false,
    };
}

/// Static description of a widget type.
///
/// `id` doubles as the persistence key for instances of this type, so it must
/// never change between releases. Manifests are declared as `const` items next
/// to the widget implementation and handed to the registry through
/// `export_widget!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetManifest {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Whether a newly registered widget starts enabled for new and upgrading users
    pub enabled: bool,
    pub category: &'static str,
    pub icon: &'static str,
    pub version: &'static str,
    pub features: WidgetFeatures,
}

impl WidgetManifest {
    /// Manifest with neutral metadata, handy for tests and quick prototypes
    pub const fn new(id: &'static str, name: &'static str) -> Self {
        Self {
            id,
            name,
            description: "",
            enabled: false,
            category: "misc",
            icon: "",
            version: "1.0.0",
            features: WidgetFeatures::FLOATING,
        }
    }

    pub const fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub const fn with_features(mut self, features: WidgetFeatures) -> Self {
        self.features = features;
        self
    }

    /// Expected name of the component type bound to this manifest
    pub fn component_name(&self) -> String {
        kebab_to_pascal_case(self.id)
    }
}

/// Convert a kebab-case widget id into the PascalCase component name
///
/// # Example
/// ```rust
/// use tabdash_core::manifest::kebab_to_pascal_case;
/// assert_eq!(kebab_to_pascal_case("color-converter"), "ColorConverter");
/// assert_eq!(kebab_to_pascal_case("game2048"), "Game2048");
/// ```
pub fn kebab_to_pascal_case(id: &str) -> String {
    id.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}
