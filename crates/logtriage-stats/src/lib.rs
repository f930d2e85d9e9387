//! # logtriage-stats
//!
//! Pure computation over structured log records.
//!
//! ## Key Types
//!
//! - [`LogRecord`] - One externally supplied log entry
//! - [`BucketedCounts`] - Per-bucket level tallies, in first-seen order
//! - [`Stats`] - Maxima, totals and averages derived from the buckets
//! - [`SimpleStats`] - Whole-collection level counts and top keywords
//! - [`KnownIssue`] / [`IssueEvidence`] - Issue catalog entries and the rows matched for them

mod buckets;
mod evidence;
mod keywords;
mod stats;
mod types;

pub use buckets::{bucket_level_counts, parse_timestamp, BucketCounts, BucketedCounts};
pub use evidence::{extract_top_rows, IssueEvidence, DEFAULT_TOP_N};
pub use keywords::{simple_stats, top_keywords, SimpleStats, TOP_KEYWORDS};
pub use stats::{compute_stats, BucketMax, Stats};
pub use types::{KnownIssue, Level, LevelCounts, LogRecord, OrderedMap, PerLevel, StatsError};
