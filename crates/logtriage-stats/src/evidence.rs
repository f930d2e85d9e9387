use crate::types::{LogRecord, OrderedMap};

/// Default number of matches collected per keyword
pub const DEFAULT_TOP_N: usize = 5;

/// Matched Warn/Error records per keyword category, in category order
pub type IssueEvidence = OrderedMap<Vec<LogRecord>>;

/// Collect elevated-severity records mentioning each keyword.
///
/// Each keyword contributes up to `top_n` matches, scanning `logs` in order.
/// Keywords in the same category share one list, so a category can hold up to
/// `top_n` times its keyword count. A record matching two keywords appears
/// once per keyword.
///
/// The count is checked after a match is pushed, so `top_n == 0` still keeps
/// the first match of every keyword.
pub fn extract_top_rows(
    logs: &[LogRecord],
    keyword_groups: &OrderedMap<Vec<String>>,
    top_n: usize,
) -> IssueEvidence {
    let mut extracted = IssueEvidence::new();

    for (category, keywords) in keyword_groups.iter() {
        let mut rows: Vec<LogRecord> = Vec::new();
        for keyword in keywords {
            let mut count = 0;
            for record in logs {
                if record.level.is_elevated() && record.mentions(keyword) {
                    rows.push(record.clone());
                    count += 1;
                    if count >= top_n {
                        break;
                    }
                }
            }
        }
        tracing::trace!(category, matches = rows.len(), "Extracted evidence rows");
        extracted.insert(category, rows);
    }

    extracted
}
