//! Report assembly and aggregate statistics.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::{ConversationRecord, UrlCategory};
use crate::parser::Layout;

/// Aggregate counts over one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    /// Messages yielded by the extractor, duplicates included.
    pub raw_messages: usize,
    /// Records in the report.
    pub total_messages: usize,
    pub duplicates_removed: usize,
    /// Candidate blocks the extractor could not read.
    pub skipped_blocks: usize,
    pub unique_senders: usize,
    pub drift_flagged: usize,
    pub gaps_flagged: usize,
    /// Records whose timestamp could not be parsed.
    pub untimed_messages: usize,
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,
    pub total_urls: usize,
    pub urls_by_category: BTreeMap<UrlCategory, usize>,
    pub messages_with_urls: usize,
    /// URLs that did not parse and fell back to [`UrlCategory::Other`].
    pub unclassified_urls: usize,
    pub total_attachments: usize,
    pub messages_with_attachments: usize,
    pub malformed_attachments: usize,
}

impl ReportStats {
    /// Percentage of extracted messages that were duplicates.
    pub fn duplicate_ratio(&self) -> f64 {
        if self.raw_messages == 0 {
            return 0.0;
        }
        self.duplicates_removed as f64 / self.raw_messages as f64 * 100.0
    }

    /// Average URLs per message that has at least one.
    pub fn average_urls(&self) -> f64 {
        average(self.total_urls, self.messages_with_urls)
    }

    /// Average attachments per message that has at least one.
    pub fn average_attachments(&self) -> f64 {
        average(self.total_attachments, self.messages_with_attachments)
    }
}

fn average(count: usize, over: usize) -> f64 {
    if over == 0 {
        return 0.0;
    }
    count as f64 / over as f64
}

/// Counts carried over from the stages before assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyInput {
    pub raw_count: usize,
    pub duplicates_removed: usize,
    pub skipped_blocks: usize,
}

/// The ordered, annotated record set plus its statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationReport {
    /// Layout the records were extracted with; `None` if nothing matched.
    pub layout: Option<Layout>,
    /// Records in chronological order.
    pub records: Vec<ConversationRecord>,
    pub stats: ReportStats,
}

impl ConversationReport {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns up to `n` senders by message count, most active first.
    ///
    /// Ties are broken by name.
    pub fn top_senders(&self, n: usize) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            *counts.entry(record.message.sender.as_str()).or_insert(0) += 1;
        }
        let mut ranked: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(sender, count)| (sender.to_string(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }
}

/// Sorts records by sequence index and computes statistics.
pub fn assemble(
    layout: Option<Layout>,
    mut records: Vec<ConversationRecord>,
    input: AssemblyInput,
) -> ConversationReport {
    records.sort_by_key(ConversationRecord::sequence_index);
    let stats = compute_stats(&records, input);
    ConversationReport {
        layout,
        records,
        stats,
    }
}

fn compute_stats(records: &[ConversationRecord], input: AssemblyInput) -> ReportStats {
    let mut stats = ReportStats {
        raw_messages: input.raw_count,
        total_messages: records.len(),
        duplicates_removed: input.duplicates_removed,
        skipped_blocks: input.skipped_blocks,
        ..ReportStats::default()
    };

    let mut senders: HashSet<&str> = HashSet::new();
    for record in records {
        senders.insert(record.message.sender.as_str());

        if record.timing.drift {
            stats.drift_flagged += 1;
        }
        if record.timing.gap_flagged {
            stats.gaps_flagged += 1;
        }
        match record.message.timestamp {
            Some(ts) => {
                stats.first_timestamp = Some(stats.first_timestamp.map_or(ts, |first| first.min(ts)));
                stats.last_timestamp = Some(stats.last_timestamp.map_or(ts, |last| last.max(ts)));
            }
            None => stats.untimed_messages += 1,
        }

        if !record.urls.is_empty() {
            stats.messages_with_urls += 1;
        }
        stats.total_urls += record.urls.len();
        for url in &record.urls {
            *stats.urls_by_category.entry(url.category).or_insert(0) += 1;
            if url.normalized.is_none() {
                stats.unclassified_urls += 1;
            }
        }

        if !record.attachments.is_empty() {
            stats.messages_with_attachments += 1;
        }
        stats.total_attachments += record.attachments.len();
        stats.malformed_attachments += record.attachments.iter().filter(|a| a.is_malformed()).count();
    }
    stats.unique_senders = senders.len();

    stats
}
