// tabdash-core/src/event.rs
//! Dotted-topic pub/sub. The settings store announces loads, changes and saves
//! here; the front end listens with `settings.*` and reacts between frames.
use crossbeam::channel::{Receiver, Sender, unbounded};
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub const TOPIC_SETTINGS_LOADED: &str = "settings.loaded";
pub const TOPIC_SETTINGS_CHANGED: &str = "settings.changed";
pub const TOPIC_SETTINGS_SAVED: &str = "settings.saved";

/// Type-erased, cheaply cloned event body
#[derive(Clone)]
pub struct EventPayload(Arc<dyn Any + Send + Sync>);

impl EventPayload {
    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self(Arc::new(data))
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::downcast(Arc::clone(&self.0)).ok()
    }
}

#[derive(Clone)]
pub struct Event {
    pub topic: String,
    pub payload: EventPayload,
}

impl Event {
    pub fn new<T: Any + Send + Sync>(topic: impl Into<String>, data: T) -> Self {
        Self {
            topic: topic.into(),
            payload: EventPayload::new(data),
        }
    }
}

/// Subscription pattern split into segments. A `*` segment matches exactly one
/// topic segment, except in last position where it matches the whole rest.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TopicPattern(Vec<String>);

impl TopicPattern {
    fn parse(pattern: &str) -> Self {
        Self(pattern.split('.').map(str::to_string).collect())
    }

    fn matches(&self, topic: &str) -> bool {
        let segments: Vec<&str> = topic.split('.').collect();
        let last = self.0.len() - 1;

        for (i, part) in self.0.iter().enumerate() {
            if part == "*" && i == last {
                return segments.len() > i;
            }
            match segments.get(i) {
                Some(segment) if part == "*" || part == segment => {}
                _ => return false,
            }
        }

        segments.len() == self.0.len()
    }
}

struct Subscriber {
    id: usize,
    pattern: TopicPattern,
    tx: Sender<Event>,
}

#[derive(Default)]
struct Shared {
    subscribers: RwLock<Vec<Subscriber>>,
    next_id: AtomicUsize,
}

impl Shared {
    // A panicking subscriber can't leave the list half-edited, so a poisoned
    // lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Subscriber>> {
        self.subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Keeps a subscription alive; dropping it unsubscribes and closes the channel
pub struct Subscription {
    id: usize,
    shared: Arc<Shared>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shared.write().retain(|s| s.id != self.id);
    }
}

#[derive(Clone, Default)]
pub struct EventBus {
    shared: Arc<Shared>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver to every subscriber whose pattern matches the topic
    pub fn publish(&self, event: Event) {
        for subscriber in self.shared.read().iter() {
            if subscriber.pattern.matches(&event.topic) {
                // Receiver gone without dropping its Subscription yet
                let _ = subscriber.tx.send(event.clone());
            }
        }
    }

    pub fn subscribe(&self, pattern: impl AsRef<str>) -> (Subscription, Receiver<Event>) {
        let (tx, rx) = unbounded();
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);

        self.shared.write().push(Subscriber {
            id,
            pattern: TopicPattern::parse(pattern.as_ref()),
            tx,
        });

        let subscription = Subscription {
            id,
            shared: Arc::clone(&self.shared),
        };
        (subscription, rx)
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.read().len()
    }
}

/// Part of the settings document an action touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSection {
    Theme,
    Widgets,
    Wallpaper,
    Language,
    QuickLinks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    Loaded { widgets: usize, from_storage: bool },
    Changed(SettingsSection),
    Saved,
}
