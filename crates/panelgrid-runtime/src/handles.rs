#![forbid(unsafe_code)]

//! Drag handles and panel contents.
//!
//! Hosts render each panel's contents themselves and may mark arbitrary
//! elements (identified by a host key `K`) as drag handles for that panel.
//! Every panel also has a built-in resize handle addressed by panel id.

use std::hash::Hash;

use panelgrid_layout::{InteractionKind, PanelId};
use rustc_hash::FxHashMap;

/// What a pointer-down landed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandleTarget<K> {
    /// A host element registered as a drag handle.
    Drag(K),
    /// The built-in resize handle of a panel.
    Resize(PanelId),
}

/// Host-supplied renderer for panel contents.
pub trait PanelContents<K> {
    type Output;

    /// Render `panel_id`'s contents, registering drag handles through
    /// `handles`.
    fn render_panel_contents(
        &mut self,
        panel_id: &str,
        handles: &mut DragHandleSetter<'_, K>,
    ) -> Self::Output;
}

/// Map from host handle keys to the panel they drag.
#[derive(Debug, Clone)]
pub struct DragHandleRegistry<K> {
    owners: FxHashMap<K, PanelId>,
    by_panel: FxHashMap<PanelId, Vec<K>>,
}

impl<K> Default for DragHandleRegistry<K> {
    fn default() -> Self {
        Self {
            owners: FxHashMap::default(),
            by_panel: FxHashMap::default(),
        }
    }
}

impl<K: Clone + Eq + Hash> DragHandleRegistry<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the drag handles of `panel_id` with `keys`. A key already
    /// owned by another panel moves to this one.
    pub fn set_handles(&mut self, panel_id: &str, keys: impl IntoIterator<Item = K>) {
        self.remove_panel(panel_id);
        let mut registered = Vec::new();
        for key in keys {
            if let Some(previous) = self.owners.insert(key.clone(), panel_id.to_string()) {
                if previous == panel_id {
                    continue;
                }
                if let Some(list) = self.by_panel.get_mut(&previous) {
                    list.retain(|k| k != &key);
                }
            }
            registered.push(key);
        }
        if !registered.is_empty() {
            self.by_panel.insert(panel_id.to_string(), registered);
        }
    }

    /// Forget every handle of `panel_id` (panel unmounted).
    pub fn remove_panel(&mut self, panel_id: &str) {
        if let Some(keys) = self.by_panel.remove(panel_id) {
            for key in keys {
                self.owners.remove(&key);
            }
        }
    }

    /// Panel dragged by `key`.
    #[must_use]
    pub fn owner(&self, key: &K) -> Option<&str> {
        self.owners.get(key).map(String::as_str)
    }

    /// Handles registered for `panel_id`.
    #[must_use]
    pub fn handles_of(&self, panel_id: &str) -> &[K] {
        self.by_panel.get(panel_id).map_or(&[][..], Vec::as_slice)
    }

    /// Panel and interaction kind for a pointer-down target. `None` for an
    /// unregistered drag handle.
    #[must_use]
    pub fn resolve(&self, target: &HandleTarget<K>) -> Option<(PanelId, InteractionKind)> {
        match target {
            HandleTarget::Drag(key) => self
                .owner(key)
                .map(|id| (id.to_string(), InteractionKind::Drag)),
            HandleTarget::Resize(id) => Some((id.clone(), InteractionKind::Resize)),
        }
    }

    pub fn clear(&mut self) {
        self.owners.clear();
        self.by_panel.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Registration callback handed to [`PanelContents`] for one panel.
#[derive(Debug)]
pub struct DragHandleSetter<'a, K> {
    registry: &'a mut DragHandleRegistry<K>,
    panel_id: &'a str,
}

impl<'a, K: Clone + Eq + Hash> DragHandleSetter<'a, K> {
    pub fn new(registry: &'a mut DragHandleRegistry<K>, panel_id: &'a str) -> Self {
        Self { registry, panel_id }
    }

    #[must_use]
    pub fn panel_id(&self) -> &str {
        self.panel_id
    }

    /// Make `keys` the drag handles of this panel.
    pub fn set_drag_handles(&mut self, keys: impl IntoIterator<Item = K>) {
        self.registry.set_handles(self.panel_id, keys);
    }
}
