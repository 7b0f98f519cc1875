use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Stable identifier of an activity. Assigned once when the activity is created
/// and never reused within a list, so references stay valid even after the list
/// around them changes.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(transparent)]
pub struct ActivityId(u64);

impl ActivityId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActivityId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s
            .parse::<u64>()
            .map_err(|_| anyhow!("Can't parse {s} into an activity id"))?;
        Ok(ActivityId(v))
    }
}

/// One tracked activity. The start moment is set once at creation, the finish
/// moment stays absent while the activity is in progress and is set at most
/// once. The text fields are free-form, empty is valid.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: ActivityId,
    pub description: String,
    pub location: String,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl ActivityRecord {
    /// A freshly started activity with empty text fields.
    pub fn started(id: ActivityId, at: DateTime<Utc>) -> Self {
        Self {
            id,
            description: String::new(),
            location: String::new(),
            started_at: at,
            finished_at: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Whole minutes between start and finish, rounded half away from zero.
    /// Absent while the activity is still in progress.
    pub fn duration_minutes(&self) -> Option<i64> {
        let finished = self.finished_at?;
        let millis = (finished - self.started_at).num_milliseconds();
        let rounded = if millis >= 0 {
            (millis + 30_000) / 60_000
        } else {
            (millis - 30_000) / 60_000
        };
        Some(rounded)
    }

    pub fn with_location(self, location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..self
        }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    pub fn with_finished(self, finished_at: DateTime<Utc>) -> Self {
        Self {
            finished_at: Some(finished_at),
            ..self
        }
    }
}

/// An immutable version of the activity list. Creation order is preserved,
/// records are only ever appended, and the only shrinking operation is a full
/// clear. Mutations go through
/// [ActivityStore](crate::store::list_store::ActivityStore), which replaces the
/// whole list with a new version.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(transparent)]
pub struct ActivityList(Arc<[ActivityRecord]>);

impl ActivityList {
    pub fn records(&self) -> &[ActivityRecord] {
        &self.0
    }

    pub fn get(&self, id: ActivityId) -> Option<&ActivityRecord> {
        self.0.iter().find(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn stats(&self) -> ActivityStats {
        let total = self.0.len();
        let completed = self.0.iter().filter(|v| v.is_finished()).count();
        ActivityStats {
            total,
            completed,
            in_progress: total - completed,
        }
    }
}

impl From<Vec<ActivityRecord>> for ActivityList {
    fn from(records: Vec<ActivityRecord>) -> Self {
        Self(records.into())
    }
}

/// Aggregate counts over an [ActivityList]. `completed + in_progress == total`
/// holds by construction.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct ActivityStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use super::{ActivityId, ActivityList, ActivityRecord};

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    fn record(id: u64) -> ActivityRecord {
        ActivityRecord::started(ActivityId::new(id), Utc.from_utc_datetime(&TEST_START_DATE))
    }

    #[test]
    fn test_duration_absent_while_in_progress() {
        assert_eq!(record(1).duration_minutes(), None);
    }

    #[test]
    fn test_duration_rounds_half_away_from_zero() {
        let started = Utc.from_utc_datetime(&TEST_START_DATE);

        let exact = record(1).with_finished(started + Duration::minutes(30));
        assert_eq!(exact.duration_minutes(), Some(30));

        let below_half = record(1).with_finished(started + Duration::seconds(29));
        assert_eq!(below_half.duration_minutes(), Some(0));

        let half = record(1).with_finished(started + Duration::seconds(90));
        assert_eq!(half.duration_minutes(), Some(2));

        let above_half = record(1).with_finished(started + Duration::seconds(31));
        assert_eq!(above_half.duration_minutes(), Some(1));
    }

    #[test]
    fn test_stats_partition_the_list() {
        let started = Utc.from_utc_datetime(&TEST_START_DATE);
        let list = ActivityList::from(vec![
            record(1).with_finished(started + Duration::minutes(5)),
            record(2),
            record(3),
        ]);

        let stats = list.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.completed + stats.in_progress, stats.total);
    }

    #[test]
    fn test_absent_finish_serializes_to_null() {
        let value = serde_json::to_string(&record(7)).unwrap();
        assert!(value.contains("\"finishedAt\":null"));
        assert!(value.contains("\"startedAt\":\"2018-07-04T00:00:00Z\""));
    }

    #[test]
    fn test_activity_id_parsing() {
        assert_eq!("12".parse::<ActivityId>().unwrap(), ActivityId::new(12));
        assert!("twelve".parse::<ActivityId>().is_err());
    }
}
