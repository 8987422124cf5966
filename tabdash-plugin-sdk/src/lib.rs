//! Everything a widget author needs: the widget trait, manifest types, header
//! actions and the `export_widget!` registration macro.
pub use tabdash_core::{
    Event, EventResult, HeaderAction, HeaderActionSink, Size, Widget, WidgetFeatures,
    WidgetManifest, WidgetModule, WidgetRegistry, inventory,
};

// Re-exported so widget crates render against the same versions as the host
pub use crossterm;
pub use ratatui;

/// Register a widget module with the registry.
///
/// The first argument is the module key and must equal the manifest id. The
/// widget type must implement `Widget + Default` and be named after the id in
/// PascalCase (`"color-palette"` → `ColorPalette`); otherwise the manifest is
/// still listed but nothing renders for it.
///
/// ```ignore
/// pub const QUOTE_MANIFEST: WidgetManifest = WidgetManifest::new("quote", "Quote");
///
/// #[derive(Default)]
/// pub struct Quote;
///
/// export_widget!("quote", QUOTE_MANIFEST, Quote);
/// ```
#[macro_export]
macro_rules! export_widget {
    ($module:literal, $manifest:expr, $widget_type:ident) => {
        const _: () = {
            fn __tabdash_create() -> Box<dyn $crate::Widget> {
                Box::new(<$widget_type as ::core::default::Default>::default())
            }

            $crate::inventory::submit! {
                $crate::WidgetModule::new(
                    $module,
                    $manifest,
                    stringify!($widget_type),
                    __tabdash_create,
                )
            }
        };
    };
}
