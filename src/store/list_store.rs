use std::future::Future;

use anyhow::Result;
use tracing::{debug, warn};

use crate::utils::clock::Clock;

use super::entities::{ActivityId, ActivityList, ActivityRecord, ActivityStats};

/// Observes committed versions of the activity list. The store notifies the
/// observer after every mutation that actually changed something, which is how
/// persistence is wired without the store knowing about storage.
pub trait ListObserver {
    fn list_committed(&mut self, list: &ActivityList) -> impl Future<Output = Result<()>>;
}

/// Owns the current [ActivityList] and exposes every mutation of it. Each
/// mutation replaces the list with a new immutable version; callers never see
/// in-place changes. Records are addressed by their stable id, and a mutation
/// referencing an unknown id does nothing.
pub struct ActivityStore<O: ListObserver> {
    list: ActivityList,
    next_id: u64,
    clock: Box<dyn Clock>,
    observer: O,
}

impl<O: ListObserver> ActivityStore<O> {
    pub fn new(list: ActivityList, clock: Box<dyn Clock>, observer: O) -> Self {
        let next_id = list
            .records()
            .iter()
            .map(|v| v.id.value())
            .max()
            .map_or(1, |v| v + 1);
        Self {
            list,
            next_id,
            clock,
            observer,
        }
    }

    pub fn list(&self) -> &ActivityList {
        &self.list
    }

    pub fn stats(&self) -> ActivityStats {
        self.list.stats()
    }

    /// Appends a freshly started activity and returns its id.
    pub async fn create(&mut self) -> ActivityId {
        let id = ActivityId::new(self.next_id);
        self.next_id += 1;

        let mut records = self.list.records().to_vec();
        records.push(ActivityRecord::started(id, self.clock.time()));
        self.commit(records).await;
        id
    }

    /// Replaces the location of one activity. Returns false without committing
    /// anything when no activity has the given id.
    pub async fn set_location(&mut self, id: ActivityId, text: &str) -> bool {
        self.update(id, |record| ActivityRecord {
            location: text.to_string(),
            ..record
        })
        .await
    }

    /// Replaces the description of one activity. Returns false without
    /// committing anything when no activity has the given id.
    pub async fn set_description(&mut self, id: ActivityId, text: &str) -> bool {
        self.update(id, |record| ActivityRecord {
            description: text.to_string(),
            ..record
        })
        .await
    }

    /// Marks an activity as finished at the current time. Finishing an already
    /// finished activity keeps its original finish time and is not treated as a
    /// change. Returns false when no activity has the given id.
    pub async fn finish(&mut self, id: ActivityId) -> bool {
        let Some(record) = self.list.get(id) else {
            debug!("Ignoring finish for unknown activity {id}");
            return false;
        };
        if record.is_finished() {
            return true;
        }

        let now = self.clock.time();
        self.update(id, |record| record.with_finished(now)).await
    }

    /// Drops every activity. There is no way back from this.
    pub async fn clear(&mut self) {
        self.commit(Vec::new()).await;
    }

    async fn update(
        &mut self,
        id: ActivityId,
        apply: impl FnOnce(ActivityRecord) -> ActivityRecord,
    ) -> bool {
        let Some(index) = self.list.records().iter().position(|v| v.id == id) else {
            debug!("Ignoring update for unknown activity {id}");
            return false;
        };

        let mut records = self.list.records().to_vec();
        records[index] = apply(records[index].clone());
        self.commit(records).await;
        true
    }

    async fn commit(&mut self, records: Vec<ActivityRecord>) {
        self.list = ActivityList::from(records);
        // Saving is best effort. A failed save must never break the mutation
        // that already happened in memory.
        if let Err(e) = self.observer.list_committed(&self.list).await {
            warn!("Failed to persist the activity list {e:?}");
        }
    }
}
