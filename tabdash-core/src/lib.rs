pub mod canvas;
pub mod config;
pub mod event;
pub mod header;
pub mod manifest;
pub mod registry;
pub mod settings;
pub mod storage;
pub mod store;
pub mod widget;

pub use canvas::{
    Canvas, DragPersistence, Placement, PointerDelta, Viewport, compute_drag_position,
    next_available_position,
};
pub use config::{ConfigError, ConfigFile};
pub use event::{Event as BusEvent, EventBus, EventPayload, SettingsEvent, SettingsSection};
pub use header::{HeaderAction, HeaderActionSink, HeaderActions};
pub use manifest::{WidgetFeatures, WidgetManifest};
pub use registry::{WidgetConstructor, WidgetModule, WidgetRegistry};
pub use settings::{Position, UserSettings, WidgetInstance};
pub use storage::{JsonFileStorage, MemoryStorage, SettingsStorage, StorageError};
pub use store::{SettingsStore, StoreOptions};
pub use widget::{Event, EventResult, Size, Widget, WidgetContainer};

pub use inventory;
