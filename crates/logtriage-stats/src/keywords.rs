use std::collections::HashMap;

use serde::Serialize;

use crate::types::{LevelCounts, LogRecord};

/// Number of keywords reported by [`simple_stats`]
pub const TOP_KEYWORDS: usize = 5;

/// Whole-collection level counts plus the most frequent message tokens
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleStats {
    #[serde(flatten)]
    pub levels: LevelCounts,
    #[serde(rename = "Most Common Keywords")]
    pub top_keywords: Vec<String>,
}

pub fn simple_stats(logs: &[LogRecord]) -> SimpleStats {
    let mut levels = LevelCounts::default();
    for record in logs {
        levels.increment(record.level);
    }
    SimpleStats {
        levels,
        top_keywords: top_keywords(logs, TOP_KEYWORDS),
    }
}

/// Most frequent whitespace-separated tokens across all messages.
///
/// Sorted by descending frequency; equal frequencies keep the order in which
/// the tokens were first encountered.
pub fn top_keywords(logs: &[LogRecord], limit: usize) -> Vec<String> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<(&str, usize)> = Vec::new();

    for token in logs
        .iter()
        .flat_map(|r| r.messages.iter())
        .flat_map(|m| m.split_whitespace())
    {
        match index.get(token) {
            Some(&i) => tallies[i].1 += 1,
            None => {
                index.insert(token, tallies.len());
                tallies.push((token, 1));
            }
        }
    }

    // sort_by is stable
    tallies.sort_by(|a, b| b.1.cmp(&a.1));
    tallies
        .into_iter()
        .take(limit)
        .map(|(token, _)| token.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;

    fn rec(level: Level, messages: &[&str]) -> LogRecord {
        LogRecord::new(
            "2024-03-01T10:00:00Z",
            level,
            messages.iter().map(|m| m.to_string()).collect(),
        )
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let logs = vec![
            rec(Level::Info, &["beta alpha"]),
            rec(Level::Info, &["alpha beta gamma"]),
        ];
        assert_eq!(top_keywords(&logs, 5), vec!["beta", "alpha", "gamma"]);
    }

    #[test]
    fn test_frequency_beats_order() {
        let logs = vec![rec(Level::Debug, &["a b c", "c c", "b"])];
        assert_eq!(top_keywords(&logs, 2), vec!["c", "b"]);
    }

    #[test]
    fn test_simple_stats_serialized_shape() {
        let logs = vec![rec(Level::Error, &["x"]), rec(Level::Info, &["x y"])];
        let json = serde_json::to_value(simple_stats(&logs)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Debug": 0, "Info": 1, "Warn": 0, "Error": 1,
                "Most Common Keywords": ["x", "y"]
            })
        );
    }

    #[test]
    fn test_empty_logs() {
        let stats = simple_stats(&[]);
        assert_eq!(stats.levels.total(), 0);
        assert!(stats.top_keywords.is_empty());
    }
}
