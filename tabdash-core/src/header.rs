// tabdash-core/src/header.rs

/// A control a widget contributes to its container's header, e.g. a refresh button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderAction {
    pub id: String,
    /// Text shown in the frame title
    pub label: String,
    /// Key that triggers the action while the widget is focused
    pub key: char,
}

impl HeaderAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>, key: char) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            key,
        }
    }
}

/// Observer interface the hosting container hands to its widget
pub trait HeaderActionSink {
    fn register_action(&mut self, action: HeaderAction);
    fn unregister_action(&mut self, id: &str);
}

/// Ordered set of header actions owned by a container
#[derive(Debug, Default, Clone)]
pub struct HeaderActions {
    actions: Vec<HeaderAction>,
}

impl HeaderActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderAction> {
        self.actions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Action bound to `key`, if any
    pub fn for_key(&self, key: char) -> Option<&HeaderAction> {
        self.actions.iter().find(|a| a.key == key)
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Render as `[r] Refresh  [n] Next` for the frame title
    pub fn title_suffix(&self) -> String {
        self.actions
            .iter()
            .map(|a| format!("[{}] {}", a.key, a.label))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

impl HeaderActionSink for HeaderActions {
    fn register_action(&mut self, action: HeaderAction) {
        // Re-registering keeps the original slot so the header doesn't reorder
        if let Some(existing) = self.actions.iter_mut().find(|a| a.id == action.id) {
            *existing = action;
        } else {
            self.actions.push(action);
        }
    }

    fn unregister_action(&mut self, id: &str) {
        self.actions.retain(|a| a.id != id);
    }
}
