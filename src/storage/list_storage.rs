use std::{
    future::Future,
    io::ErrorKind,
    path::PathBuf,
};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tracing::{debug, warn};

use crate::{
    store::entities::{ActivityId, ActivityList, ActivityRecord},
    utils::clock::Clock,
};

/// Name of the single file the whole list is stored under.
pub const LIST_FILE_NAME: &str = "list";

/// Interface for abstracting storage of the activity list.
pub trait ListStorage {
    /// Reads the stored list. An absent or unreadable list falls back to seed
    /// data instead of failing.
    fn load(&self) -> impl Future<Output = Result<ActivityList>>;

    /// Overwrites the stored list with the given version.
    fn save(&self, list: &ActivityList) -> impl Future<Output = Result<()>>;
}

/// The main realization of [ListStorage]. Keeps the list as one json document
/// in the application directory.
pub struct ListStorageImpl {
    path: PathBuf,
    clock: Box<dyn Clock>,
}

impl ListStorageImpl {
    pub fn new(dir: PathBuf, clock: Box<dyn Clock>) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            path: dir.join(LIST_FILE_NAME),
            clock,
        })
    }

    async fn read_raw(file: &mut File) -> Result<String, std::io::Error> {
        let mut raw = String::new();
        file.read_to_string(&mut raw).await?;
        Ok(raw)
    }

    async fn write_raw(file: &mut File, list: &ActivityList) -> Result<()> {
        let buffer = serde_json::to_vec(list)?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(())
    }
}

impl ListStorage for ListStorageImpl {
    async fn load(&self) -> Result<ActivityList> {
        let mut file = match File::open(&self.path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No stored list at {:?}, starting from seed data", self.path);
                return Ok(seed_list(self.clock.time()));
            }
            Err(e) => return Err(e.into()),
        };

        file.lock_shared()?;
        let result = Self::read_raw(&mut file).await;
        file.unlock_async().await?;
        let raw = result?;

        match serde_json::from_str::<ActivityList>(&raw) {
            Ok(list) => Ok(list),
            Err(e) => {
                // Might happen after shutdowns cutting off a write, or after
                // somebody edited the file by hand.
                warn!(
                    "Stored list at {:?} is corrupted, starting from seed data: {e}",
                    self.path
                );
                Ok(seed_list(self.clock.time()))
            }
        }
    }

    async fn save(&self, list: &ActivityList) -> Result<()> {
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .await?;

        file.lock_exclusive()?;
        let result = Self::write_raw(&mut file, list).await;
        file.unlock_async().await?;
        result
    }
}

/// The example records shown on a first run, or whenever the stored list can't
/// be read back. One finished activity and one still in progress, with
/// illustrative timestamps derived from a single clock reading.
pub fn seed_list(now: DateTime<Utc>) -> ActivityList {
    let meeting = ActivityRecord::started(ActivityId::new(1), now - Duration::minutes(45))
        .with_description("Meeting with client")
        .with_location("Conference Room A")
        .with_finished(now - Duration::minutes(15));
    let review = ActivityRecord::started(ActivityId::new(2), now - Duration::minutes(10))
        .with_description("Code review")
        .with_location("Home Office");
    ActivityList::from(vec![meeting, review])
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    use crate::{
        store::entities::{ActivityId, ActivityList, ActivityRecord},
        utils::clock::MockClock,
    };

    use super::{LIST_FILE_NAME, ListStorage, ListStorageImpl, seed_list};

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    fn test_clock() -> Box<MockClock> {
        let mut clock = MockClock::new();
        clock
            .expect_time()
            .returning(|| Utc.from_utc_datetime(&TEST_START_DATE));
        Box::new(clock)
    }

    fn test_list() -> ActivityList {
        let started = Utc.from_utc_datetime(&TEST_START_DATE);
        ActivityList::from(vec![
            ActivityRecord::started(ActivityId::new(1), started)
                .with_description("Meeting with client")
                .with_location("Conference Room A")
                .with_finished(started + Duration::minutes(30)),
            ActivityRecord::started(ActivityId::new(2), started + Duration::minutes(5)),
        ])
    }

    #[tokio::test]
    async fn test_round_trip_reproduces_the_list() -> Result<()> {
        let dir = tempdir()?;
        let storage = ListStorageImpl::new(dir.path().to_owned(), test_clock())?;

        let list = test_list();
        storage.save(&list).await?;

        assert_eq!(storage.load().await?, list);
        Ok(())
    }

    #[tokio::test]
    async fn test_absent_file_yields_seed_data() -> Result<()> {
        let dir = tempdir()?;
        let storage = ListStorageImpl::new(dir.path().to_owned(), test_clock())?;

        let list = storage.load().await?;

        assert_eq!(list, seed_list(Utc.from_utc_datetime(&TEST_START_DATE)));
        let stats = list.stats();
        assert_eq!((stats.total, stats.completed, stats.in_progress), (2, 1, 1));
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupted_file_yields_seed_data() -> Result<()> {
        let dir = tempdir()?;
        let storage = ListStorageImpl::new(dir.path().to_owned(), test_clock())?;

        let mut file = tokio::fs::File::create(dir.path().join(LIST_FILE_NAME)).await?;
        file.write_all(b"definitely {not} json").await?;
        drop(file);

        let list = storage.load().await?;
        assert_eq!(list, seed_list(Utc.from_utc_datetime(&TEST_START_DATE)));
        Ok(())
    }

    #[tokio::test]
    async fn test_schema_mismatch_yields_seed_data() -> Result<()> {
        let dir = tempdir()?;
        let storage = ListStorageImpl::new(dir.path().to_owned(), test_clock())?;

        let mut file = tokio::fs::File::create(dir.path().join(LIST_FILE_NAME)).await?;
        file.write_all(br#"[{"unexpected": "shape"}]"#).await?;
        drop(file);

        let list = storage.load().await?;
        assert_eq!(list, seed_list(Utc.from_utc_datetime(&TEST_START_DATE)));
        Ok(())
    }

    #[tokio::test]
    async fn test_save_overwrites_the_previous_version() -> Result<()> {
        let dir = tempdir()?;
        let storage = ListStorageImpl::new(dir.path().to_owned(), test_clock())?;

        storage.save(&test_list()).await?;
        storage.save(&ActivityList::default()).await?;

        assert_eq!(storage.load().await?, ActivityList::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_data_shape() {
        let now = Utc.from_utc_datetime(&TEST_START_DATE);
        let seed = seed_list(now);

        let records = seed.records();
        assert_eq!(records.len(), 2);
        assert!(records[0].is_finished());
        assert_eq!(records[0].duration_minutes(), Some(30));
        assert!(!records[1].is_finished());
        assert!(records.iter().all(|v| v.started_at < now));
    }
}
