// tabdash-core/src/canvas.rs
//! Floating canvas: percentage coordinates, drag handling, placement.
//!
//! Widget positions are stored as percentages of the viewport and describe the
//! widget's center, so a layout survives terminal resizes. During a drag the
//! anchor is clamped to [5, 95] on both axes. A widget pushed to the edge can
//! still hang partly outside the viewport; the renderer clips it.
use crate::registry::WidgetRegistry;
use crate::settings::{Position, UserSettings, WidgetInstance};
use crate::storage::SettingsStorage;
use crate::store::SettingsStore;
use crate::widget::Size;
use ratatui::layout::Rect;

pub const POSITION_MIN: f64 = 5.0;
pub const POSITION_MAX: f64 = 95.0;

/// Two anchors closer than this on both axes count as overlapping
pub const COLLISION_DISTANCE: f64 = 15.0;

/// Slots tried in order when pinning a widget without a stored position
pub const CANDIDATE_POSITIONS: [Position; 8] = [
    Position::new(50.0, 30.0),
    Position::new(30.0, 50.0),
    Position::new(70.0, 50.0),
    Position::new(50.0, 70.0),
    Position::new(30.0, 30.0),
    Position::new(70.0, 30.0),
    Position::new(30.0, 70.0),
    Position::new(70.0, 70.0),
];

/// Used when every candidate is taken. Overlapping at the center beats failing.
pub const FALLBACK_POSITION: Position = Position::new(50.0, 50.0);

/// Outer size for widgets that don't state a preference
pub const DEFAULT_WIDGET_SIZE: Size = Size::new(32, 8);

/// Viewport size in the same unit as pointer coordinates (terminal cells)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<Rect> for Viewport {
    fn from(area: Rect) -> Self {
        Self::new(area.width as f64, area.height as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDelta {
    pub dx: f64,
    pub dy: f64,
}

impl PointerDelta {
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Delta between two cell coordinates
    pub fn between(from: (u16, u16), to: (u16, u16)) -> Self {
        Self::new(
            to.0 as f64 - from.0 as f64,
            to.1 as f64 - from.1 as f64,
        )
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return POSITION_MIN;
    }
    value.clamp(POSITION_MIN, POSITION_MAX)
}

fn delta_percent(delta: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        delta / extent * 100.0
    } else {
        0.0
    }
}

/// New anchor position after moving the pointer by `delta` since drag start
///
/// # Example
/// ```rust
/// use tabdash_core::canvas::{compute_drag_position, PointerDelta, Viewport};
/// use tabdash_core::settings::Position;
///
/// let p = compute_drag_position(
///     Position::new(50.0, 50.0),
///     PointerDelta::new(100.0, -1000.0),
///     Viewport::new(200.0, 100.0),
/// );
/// assert_eq!(p, Position::new(95.0, 5.0));
/// ```
pub fn compute_drag_position(initial: Position, delta: PointerDelta, viewport: Viewport) -> Position {
    Position::new(
        clamp_percent(initial.x + delta_percent(delta.dx, viewport.width)),
        clamp_percent(initial.y + delta_percent(delta.dy, viewport.height)),
    )
}

fn collides(a: Position, b: Position) -> bool {
    (a.x - b.x).abs() < COLLISION_DISTANCE && (a.y - b.y).abs() < COLLISION_DISTANCE
}

/// First candidate slot not overlapping an enabled, positioned instance
pub fn next_available_position(instances: &[WidgetInstance]) -> Position {
    let occupied: Vec<Position> = instances
        .iter()
        .filter(|w| w.enabled)
        .filter_map(|w| w.position)
        .collect();

    CANDIDATE_POSITIONS
        .iter()
        .copied()
        .find(|candidate| !occupied.iter().any(|occ| collides(*occ, *candidate)))
        .unwrap_or(FALLBACK_POSITION)
}

/// Rect of a widget of `size` centered on `position`, clipped to `area`
pub fn anchor_rect(position: Position, size: Size, area: Rect) -> Rect {
    let cx = area.x as f64 + position.x / 100.0 * area.width as f64;
    let cy = area.y as f64 + position.y / 100.0 * area.height as f64;

    let left = (cx - size.width as f64 / 2.0).round() as i32;
    let top = (cy - size.height as f64 / 2.0).round() as i32;

    let x0 = left.max(area.x as i32);
    let y0 = top.max(area.y as i32);
    let x1 = (left + size.width as i32).min(area.right() as i32);
    let y1 = (top + size.height as i32).min(area.bottom() as i32);

    if x1 <= x0 || y1 <= y0 {
        return Rect::new(area.x, area.y, 0, 0);
    }

    Rect::new(x0 as u16, y0 as u16, (x1 - x0) as u16, (y1 - y0) as u16)
}

/// Whether position changes are written on every pointer move or only at drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPersistence {
    #[default]
    OnDrop,
    EveryTick,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub instance_id: String,
    pub origin: (u16, u16),
    pub initial: Position,
    pub current: Position,
}

/// Where a widget instance is drawn this frame
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub instance_id: String,
    pub widget_type: String,
    pub rect: Rect,
    pub draggable: bool,
    pub closeable: bool,
}

#[derive(Debug, Default)]
pub struct Canvas {
    viewport: Option<Viewport>,
    drag: Option<DragSession>,
    persistence: DragPersistence,
}

impl Canvas {
    pub fn new(persistence: DragPersistence) -> Self {
        Self {
            viewport: None,
            drag: None,
            persistence,
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Enabled, positioned instances that resolve to a component, in draw order
    pub fn placements(
        &self,
        settings: &UserSettings,
        registry: &WidgetRegistry,
        area: Rect,
        size_of: impl Fn(&WidgetInstance) -> Size,
    ) -> Vec<Placement> {
        settings
            .widgets
            .iter()
            .filter(|w| w.enabled)
            .filter_map(|w| {
                let position = w.position?;
                let manifest = registry.manifest(&w.widget_type)?;
                if !registry.has_component(&w.widget_type) {
                    return None;
                }
                Some(Placement {
                    instance_id: w.id.clone(),
                    widget_type: w.widget_type.clone(),
                    rect: anchor_rect(position, size_of(w), area),
                    draggable: manifest.features.draggable,
                    closeable: manifest.features.closeable,
                })
            })
            .collect()
    }

    /// Topmost placement under the cell, later placements draw above earlier ones
    pub fn hit_test(placements: &[Placement], column: u16, row: u16) -> Option<&Placement> {
        placements.iter().rev().find(|p| {
            column >= p.rect.x
                && column < p.rect.right()
                && row >= p.rect.y
                && row < p.rect.bottom()
        })
    }

    /// Start dragging `instance_id`. Refused when the instance has no position
    /// or the widget type isn't draggable.
    pub fn begin_drag<S: SettingsStorage>(
        &mut self,
        instance_id: &str,
        pointer: (u16, u16),
        store: &SettingsStore<S>,
        registry: &WidgetRegistry,
    ) -> bool {
        let Some(instance) = store.settings().widget(instance_id) else {
            return false;
        };
        let draggable = registry
            .manifest(&instance.widget_type)
            .is_some_and(|m| m.features.draggable);
        let Some(initial) = instance.position else {
            return false;
        };
        if !instance.enabled || !draggable {
            return false;
        }

        self.drag = Some(DragSession {
            instance_id: instance_id.to_string(),
            origin: pointer,
            initial,
            current: initial,
        });
        true
    }

    /// Pointer moved during a drag. The store always sees the live position;
    /// it is persisted here only with `DragPersistence::EveryTick`.
    pub fn drag_to<S: SettingsStorage>(
        &mut self,
        pointer: (u16, u16),
        store: &mut SettingsStore<S>,
    ) -> Option<Position> {
        let viewport = self.viewport?;
        let session = self.drag.as_mut()?;

        let delta = PointerDelta::between(session.origin, pointer);
        let position = compute_drag_position(session.initial, delta, viewport);
        session.current = position;

        match self.persistence {
            DragPersistence::EveryTick => store.update_widget_position(&session.instance_id, position),
            DragPersistence::OnDrop => store.preview_widget_position(&session.instance_id, position),
        }

        Some(position)
    }

    /// Finish the drag and make the final position durable
    pub fn end_drag<S: SettingsStorage>(&mut self, store: &mut SettingsStore<S>) -> Option<Position> {
        let session = self.drag.take()?;

        if self.persistence == DragPersistence::OnDrop {
            store.update_widget_position(&session.instance_id, session.current);
        }

        tracing::debug!(
            instance = session.instance_id.as_str(),
            x = session.current.x,
            y = session.current.y,
            "widget dropped"
        );
        Some(session.current)
    }

    /// Abort the drag and put the widget back where it started
    pub fn cancel_drag<S: SettingsStorage>(&mut self, store: &mut SettingsStore<S>) {
        if let Some(session) = self.drag.take() {
            match self.persistence {
                DragPersistence::EveryTick => {
                    store.update_widget_position(&session.instance_id, session.initial)
                }
                DragPersistence::OnDrop => {
                    store.preview_widget_position(&session.instance_id, session.initial)
                }
            }
        }
    }
}
