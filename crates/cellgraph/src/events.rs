//! Per-cell change notifications
//!
//! Subscribers register a callback on one cell. Callbacks run synchronously,
//! in registration order, inside the model operation that caused the change.
//! A callback must not mutate the model it observes.

use crate::cell::CellError;
use ahash::AHashMap;
use cellgraph_core::{CellId, Value};

/// A change to one cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellEvent {
    /// The cached value changed
    ValueChanged { value: Value },
    /// The error state changed (`None` = recovered)
    ErrorChanged { error: Option<CellError> },
    /// The formula text changed
    FormulaChanged { formula: String },
    /// A tabular cell was written or resized
    TableChanged { rows: usize, cols: usize },
    /// The display name changed
    NameChanged { old: String, new: String },
    /// The cell is about to be deleted
    DeleteRequested,
}

/// Handle returned by [`Model::subscribe`](crate::Model::subscribe)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback type for cell subscriptions
pub type Callback = Box<dyn FnMut(&CellEvent)>;

/// Subscriber lists, keyed by cell
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    lists: AHashMap<CellId, Vec<(SubscriptionId, Callback)>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self, cell: CellId, callback: Callback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.lists.entry(cell).or_default().push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, cell: CellId, subscription: SubscriptionId) -> bool {
        let Some(list) = self.lists.get_mut(&cell) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != subscription);
        before != list.len()
    }

    pub(crate) fn notify(&mut self, cell: CellId, event: &CellEvent) {
        if let Some(list) = self.lists.get_mut(&cell) {
            for (_, callback) in list.iter_mut() {
                callback(event);
            }
        }
    }

    pub(crate) fn remove_cell(&mut self, cell: CellId) {
        self.lists.remove(&cell);
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count: usize = self.lists.values().map(Vec::len).sum();
        f.debug_struct("Subscribers")
            .field("subscriptions", &count)
            .finish()
    }
}
