//! Two-phase group realization.
//!
//! A paint pass that reaches an unrealized or dummy group does not fetch its
//! content inline. It files a request here and moves on. The owner later
//! drains a batch of [`RealizationTicket`]s, fetches the content, and hands
//! each result back together with its ticket.
//!
//! At most one request per group is in flight. Structural changes that
//! dispose groups (clearing, removing everything) bump the queue's epoch, so
//! results for requests filed before the change are recognized as stale.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use lattice_gallery_core::logging::targets;

use crate::error::{GalleryError, Result};
use crate::item::ItemId;

/// A unique identifier for a realization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicketId(u64);

impl TicketId {
    /// Get the raw u64 value of this ticket ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

static NEXT_TICKET_ID: AtomicU64 = AtomicU64::new(1);

fn next_ticket_id() -> TicketId {
    TicketId(NEXT_TICKET_ID.fetch_add(1, Ordering::Relaxed))
}

/// A pending request to realize one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealizationTicket {
    pub id: TicketId,
    /// The dummy group to realize.
    pub group: ItemId,
    /// Position of the group when the request was filed.
    pub group_index: usize,
    epoch: u64,
}

/// What applying a realization result did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealizationOutcome {
    /// Change of the group's extent.
    pub delta: i64,
    /// The translation moved by `delta` because the group starts before the
    /// viewport.
    pub translation_adjusted: bool,
    /// The provider failed and the group was realized empty.
    pub failed: bool,
}

/// Queue of realization requests.
pub struct RealizationQueue {
    queued: VecDeque<RealizationTicket>,
    in_flight: HashMap<ItemId, TicketId>,
    epoch: u64,
    batch_size: usize,
}

impl Default for RealizationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl RealizationQueue {
    /// Queue with a batch size of ten.
    pub fn new() -> Self {
        Self::with_batch_size(10)
    }

    /// Queue handing out at most `batch_size` requests per batch.
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            queued: VecDeque::new(),
            in_flight: HashMap::new(),
            epoch: 0,
            batch_size: batch_size.max(1),
        }
    }

    /// Change the batch size; zero is raised to one.
    pub fn set_batch_size(&mut self, batch_size: usize) {
        self.batch_size = batch_size.max(1);
    }

    /// File a request for `group`. Returns `None` if one is already in flight.
    pub fn request(&mut self, group: ItemId, group_index: usize) -> Option<RealizationTicket> {
        if self.in_flight.contains_key(&group) {
            return None;
        }
        let ticket = RealizationTicket {
            id: next_ticket_id(),
            group,
            group_index,
            epoch: self.epoch,
        };
        self.in_flight.insert(group, ticket.id);
        self.queued.push_back(ticket);
        tracing::trace!(target: targets::REALIZE, group_index, "realization requested");
        Some(ticket)
    }

    /// A request for `group` is queued or handed out.
    pub fn is_in_flight(&self, group: ItemId) -> bool {
        self.in_flight.contains_key(&group)
    }

    /// Requests not yet handed out.
    pub fn queued_count(&self) -> usize {
        self.queued.len()
    }

    /// Requests handed out or queued, awaiting a result.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Requests wait to be handed out.
    pub fn has_pending(&self) -> bool {
        !self.queued.is_empty()
    }

    /// Hand out up to `batch_size` queued requests, oldest first.
    pub fn take_batch(&mut self) -> Vec<RealizationTicket> {
        let count = self.queued.len().min(self.batch_size);
        self.queued.drain(..count).collect()
    }

    /// Hand out every queued request.
    pub fn take_all(&mut self) -> Vec<RealizationTicket> {
        self.queued.drain(..).collect()
    }

    /// Retire `ticket`, failing if it no longer matches an in-flight request.
    pub fn complete(&mut self, ticket: &RealizationTicket) -> Result<()> {
        if ticket.epoch != self.epoch || self.in_flight.get(&ticket.group) != Some(&ticket.id) {
            tracing::debug!(target: targets::REALIZE, ticket = ticket.id.as_u64(), "stale realization result");
            return Err(GalleryError::StaleRealization);
        }
        self.in_flight.remove(&ticket.group);
        Ok(())
    }

    /// Forget any request for `group`, e.g. because it was removed.
    pub fn cancel(&mut self, group: ItemId) -> bool {
        self.queued.retain(|ticket| ticket.group != group);
        self.in_flight.remove(&group).is_some()
    }

    /// Drop every request and make outstanding tickets stale.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.queued.clear();
        self.in_flight.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<ItemId> {
        let mut map: SlotMap<ItemId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_one_request_per_group() {
        let ids = ids(1);
        let mut queue = RealizationQueue::new();
        assert!(queue.request(ids[0], 0).is_some());
        assert!(queue.request(ids[0], 0).is_none());
        assert_eq!(queue.queued_count(), 1);

        let batch = queue.take_batch();
        assert_eq!(batch.len(), 1);
        // still in flight after being handed out
        assert!(queue.request(ids[0], 0).is_none());
        assert!(queue.complete(&batch[0]).is_ok());
        assert!(!queue.is_in_flight(ids[0]));
        assert!(queue.request(ids[0], 0).is_some());
    }

    #[test]
    fn test_batch_size() {
        let ids = ids(5);
        let mut queue = RealizationQueue::with_batch_size(2);
        for (index, id) in ids.iter().enumerate() {
            queue.request(*id, index);
        }
        let batch = queue.take_batch();
        assert_eq!(batch.iter().map(|t| t.group_index).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(queue.take_all().len(), 3);
        assert_eq!(queue.in_flight_count(), 5);
    }

    #[test]
    fn test_invalidate_makes_stale() {
        let ids = ids(1);
        let mut queue = RealizationQueue::new();
        let ticket = queue.request(ids[0], 0).unwrap();
        queue.invalidate();
        assert_eq!(queue.complete(&ticket), Err(GalleryError::StaleRealization));
        assert!(!queue.has_pending());
    }

    #[test]
    fn test_double_complete_is_stale() {
        let ids = ids(1);
        let mut queue = RealizationQueue::new();
        let ticket = queue.request(ids[0], 0).unwrap();
        assert!(queue.complete(&ticket).is_ok());
        assert_eq!(queue.complete(&ticket), Err(GalleryError::StaleRealization));
    }

    #[test]
    fn test_cancel() {
        let ids = ids(2);
        let mut queue = RealizationQueue::new();
        queue.request(ids[0], 0);
        queue.request(ids[1], 1);
        assert!(queue.cancel(ids[0]));
        assert_eq!(queue.queued_count(), 1);
        assert!(!queue.cancel(ids[0]));
    }
}
