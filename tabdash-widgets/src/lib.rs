pub mod color_palette;
pub mod common;
pub mod countdown;
pub mod quote;

pub use color_palette::{COLOR_PALETTE_MANIFEST, ColorPalette};
pub use common::*;
pub use countdown::{COUNTDOWN_MANIFEST, Countdown};
pub use quote::{QUOTE_MANIFEST, Quote};

/// Ids of the widgets this crate registers. Referencing this from the host
/// binary keeps the crate (and its registrations) in the final link.
pub const BUILTIN_WIDGETS: &[&str] = &[
    COUNTDOWN_MANIFEST.id,
    QUOTE_MANIFEST.id,
    COLOR_PALETTE_MANIFEST.id,
];

#[cfg(test)]
mod tests {
    use super::*;
    use tabdash_plugin_sdk::WidgetRegistry;

    #[test]
    fn test_builtins_are_discovered() {
        let registry = WidgetRegistry::discover();

        assert!(registry.duplicate_ids().is_empty());
        assert!(registry.missing_components().is_empty());
        for id in BUILTIN_WIDGETS {
            assert!(registry.contains(id), "{id} not registered");
            assert!(registry.has_component(id), "{id} has no component");
        }
    }

    #[test]
    fn test_discovered_order_is_stable() {
        let ids: Vec<_> = WidgetRegistry::discover()
            .manifests()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["color-palette", "countdown", "quote"]);
    }
}
