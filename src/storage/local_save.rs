use anyhow::Result;

use crate::store::{entities::ActivityList, list_store::ListObserver};

use super::list_storage::ListStorage;

/// Bridges the activity store to [ListStorage]. Every committed version of the
/// list is written out whole, overwriting the previous one, so the store never
/// has to know that files exist.
pub struct LocalSaver<S: ListStorage> {
    storage: S,
}

impl<S: ListStorage> LocalSaver<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: ListStorage> ListObserver for LocalSaver<S> {
    async fn list_committed(&mut self, list: &ActivityList) -> Result<()> {
        self.storage.save(list).await
    }
}
