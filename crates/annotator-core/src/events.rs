//! Host events and their dispatch to rule engines.
//!
//! The host's change notifications are reduced to two event streams:
//!
//! - [`HostEvent::DocumentChanged`]: the text (or language) of a document changed;
//! - [`HostEvent::ActiveEditorChanged`]: a different editor (or none) became active.
//!
//! Listeners subscribe to one stream at a time and get a [`SubscriptionId`] back, which is
//! all that is needed to unsubscribe. The dispatcher only routes; the caller invokes the
//! listeners it returns, in subscription order.

use crate::workspace::{DocumentId, EditorId};
use std::collections::BTreeMap;

/// A change notification from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// A document's content changed.
    DocumentChanged(DocumentId),
    /// The active editor changed (`None`: no editor is active).
    ActiveEditorChanged(Option<EditorId>),
}

impl HostEvent {
    /// The stream this event belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DocumentChanged(_) => EventKind::DocumentChanged,
            Self::ActiveEditorChanged(_) => EventKind::ActiveEditorChanged,
        }
    }
}

/// Event stream selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`HostEvent::DocumentChanged`].
    DocumentChanged,
    /// [`HostEvent::ActiveEditorChanged`].
    ActiveEditorChanged,
}

/// Identifies one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Route<L> {
    kind: EventKind,
    listener: L,
}

/// Routes host events to subscribed listeners.
#[derive(Debug)]
pub struct EventDispatcher<L> {
    next_id: u64,
    routes: BTreeMap<SubscriptionId, Route<L>>,
}

impl<L> Default for EventDispatcher<L> {
    fn default() -> Self {
        Self {
            next_id: 0,
            routes: BTreeMap::new(),
        }
    }
}

impl<L: Copy> EventDispatcher<L> {
    /// Create a dispatcher with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to one event stream.
    pub fn subscribe(&mut self, kind: EventKind, listener: L) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.routes.insert(id, Route { kind, listener });
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.routes.remove(&id).is_some()
    }

    /// Returns `true` if the subscription is live.
    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.routes.contains_key(&id)
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if there are no live subscriptions.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Listeners for an event, in subscription order.
    pub fn listeners(&self, event: &HostEvent) -> Vec<L> {
        let kind = event.kind();
        self.routes
            .values()
            .filter(|route| route.kind == kind)
            .map(|route| route.listener)
            .collect()
    }
}
