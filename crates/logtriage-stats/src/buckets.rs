use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::types::{LevelCounts, LogRecord, StatsError};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 timestamp into an absolute instant.
///
/// Offsets (including a trailing `Z`) are honoured. Timestamps without an
/// offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StatsError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(StatsError::MalformedTimestamp(raw.to_string()))
}

/// Level counts for one time bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCounts {
    pub bucket: DateTime<Utc>,
    pub counts: LevelCounts,
}

/// Level counts per bucket, iterated in the order buckets were first seen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketedCounts {
    start_time: Option<DateTime<Utc>>,
    buckets: Vec<BucketCounts>,
    index: HashMap<DateTime<Utc>, usize>,
}

impl BucketedCounts {
    /// Timestamp of the first record, which anchors every bucket
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn get(&self, bucket: &DateTime<Utc>) -> Option<&LevelCounts> {
        self.index.get(bucket).map(|&i| &self.buckets[i].counts)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BucketCounts> {
        self.buckets.iter()
    }

    /// Buckets sorted by time, for consumers that need chronological order
    pub fn sorted(&self) -> Vec<&BucketCounts> {
        let mut sorted: Vec<&BucketCounts> = self.buckets.iter().collect();
        sorted.sort_by_key(|b| b.bucket);
        sorted
    }

    fn entry(&mut self, bucket: DateTime<Utc>) -> &mut LevelCounts {
        let next = self.buckets.len();
        let idx = *self.index.entry(bucket).or_insert(next);
        if idx == next {
            self.buckets.push(BucketCounts {
                bucket,
                counts: LevelCounts::default(),
            });
        }
        &mut self.buckets[idx].counts
    }
}

/// Tally level counts into fixed-width time buckets.
///
/// The first record's timestamp is the anchor; each record lands in bucket
/// `start + floor((ts - start) / interval) * interval`. Records earlier than the
/// anchor land in negative-offset buckets rather than being rejected.
pub fn bucket_level_counts(
    logs: &[LogRecord],
    interval: Duration,
) -> Result<BucketedCounts, StatsError> {
    let interval_ns = i128::try_from(interval.as_nanos()).unwrap_or(i128::MAX);
    if interval_ns == 0 {
        return Err(StatsError::InvalidInterval);
    }

    let mut counts = BucketedCounts::default();
    let Some(first) = logs.first() else {
        return Ok(counts);
    };
    let start = parse_timestamp(&first.timestamp)?;
    counts.start_time = Some(start);

    for record in logs {
        let ts = parse_timestamp(&record.timestamp)?;
        let delta = ts - start;
        let delta_ns =
            i128::from(delta.num_seconds()) * 1_000_000_000 + i128::from(delta.subsec_nanos());
        let offset_ns = delta_ns.div_euclid(interval_ns) * interval_ns;
        let offset = i64::try_from(offset_ns)
            .map(TimeDelta::nanoseconds)
            .map_err(|_| StatsError::OutOfRange(record.timestamp.clone()))?;
        let bucket = start
            .checked_add_signed(offset)
            .ok_or_else(|| StatsError::OutOfRange(record.timestamp.clone()))?;
        counts.entry(bucket).increment(record.level);
    }

    tracing::debug!(
        records = logs.len(),
        buckets = counts.len(),
        "Bucketed level counts"
    );

    Ok(counts)
}
