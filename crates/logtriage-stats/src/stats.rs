use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::buckets::{bucket_level_counts, BucketedCounts};
use crate::types::{Level, LogRecord, PerLevel, StatsError};

/// The bucket holding a maximum and the count reached there
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketMax {
    pub bucket: Option<DateTime<Utc>>,
    pub count: u64,
}

impl BucketMax {
    /// Strictly-greater update, so the first bucket reaching a maximum keeps it
    fn offer(&mut self, bucket: DateTime<Utc>, count: u64) {
        if count > self.count {
            self.bucket = Some(bucket);
            self.count = count;
        }
    }
}

/// Aggregate statistics over bucketed level counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub max_per_level: PerLevel<BucketMax>,
    pub max_total: BucketMax,
    pub overall_total: u64,
    pub count_intervals: usize,
    pub overall_average: f64,
}

impl Stats {
    /// Bucket `logs` at `interval` and derive statistics in one step
    pub fn from_logs(logs: &[LogRecord], interval: Duration) -> Result<Self, StatsError> {
        let counts = bucket_level_counts(logs, interval)?;
        Ok(compute_stats(&counts))
    }
}

/// Derive maxima, totals and the per-bucket average.
///
/// Pure: the same input always yields the same output. No buckets yields an
/// average of zero.
pub fn compute_stats(level_counts: &BucketedCounts) -> Stats {
    let mut max_per_level = PerLevel::<BucketMax>::default();
    let mut max_total = BucketMax::default();
    let mut overall_total = 0u64;

    for entry in level_counts.iter() {
        let interval_total = entry.counts.total();
        overall_total += interval_total;
        for level in Level::ALL {
            max_per_level
                .get_mut(level)
                .offer(entry.bucket, *entry.counts.get(level));
        }
        max_total.offer(entry.bucket, interval_total);
    }

    let count_intervals = level_counts.len();
    let overall_average = if count_intervals > 0 {
        overall_total as f64 / count_intervals as f64
    } else {
        0.0
    };

    Stats {
        max_per_level,
        max_total,
        overall_total,
        count_intervals,
        overall_average,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckets::parse_timestamp;

    fn rec(ts: &str, level: Level) -> LogRecord {
        LogRecord::new(ts, level, vec![])
    }

    #[test]
    fn test_empty_counts() {
        let stats = compute_stats(&BucketedCounts::default());
        assert_eq!(stats.overall_total, 0);
        assert_eq!(stats.count_intervals, 0);
        assert_eq!(stats.overall_average, 0.0);
        assert_eq!(stats.max_total, BucketMax::default());
        assert!(stats.max_per_level.iter().all(|(_, m)| m.bucket.is_none()));
    }

    #[test]
    fn test_ties_keep_first_bucket() {
        let logs = vec![
            rec("2024-03-01T10:00:00Z", Level::Error),
            rec("2024-03-01T10:00:01Z", Level::Error),
            rec("2024-03-01T10:00:02Z", Level::Error),
            rec("2024-03-01T10:00:02Z", Level::Info),
        ];
        let stats = Stats::from_logs(&logs, Duration::from_secs(1)).unwrap();
        let first = parse_timestamp("2024-03-01T10:00:00Z").unwrap();
        let third = parse_timestamp("2024-03-01T10:00:02Z").unwrap();

        assert_eq!(stats.max_per_level.error.bucket, Some(first));
        assert_eq!(stats.max_per_level.error.count, 1);
        assert_eq!(stats.max_per_level.info.bucket, Some(third));
        assert_eq!(stats.max_per_level.debug.bucket, None);
        assert_eq!(stats.max_total.bucket, Some(third));
        assert_eq!(stats.max_total.count, 2);
        assert_eq!(stats.overall_total, 4);
        assert_eq!(stats.count_intervals, 3);
        assert!((stats.overall_average - 4.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_serialized_shape() {
        let logs = vec![rec("2024-03-01T10:00:00Z", Level::Warn)];
        let stats = Stats::from_logs(&logs, Duration::from_secs(1)).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["max_per_level"]["Warn"]["count"], 1);
        assert!(json["max_per_level"]["Debug"]["bucket"].is_null());
        assert_eq!(json["max_total"]["count"], 1);
        assert_eq!(json["count_intervals"], 1);
        assert_eq!(json["overall_average"], 1.0);
    }
}
