//! Chronological ordering, gap and drift detection.
//!
//! Ordering policy:
//!
//! 1. Timed messages, ascending by timestamp, ties by source position.
//! 2. Untimed messages afterwards, by source position.
//!
//! Unknown-time messages never reorder known-time ones.

use crate::core::models::TimestampAnnotation;
use crate::message::NormalizedMessage;

/// Returns the indices of `messages` in chronological rank order.
pub fn chronological_order(messages: &[NormalizedMessage]) -> Vec<usize> {
    let mut timed: Vec<usize> = Vec::with_capacity(messages.len());
    let mut untimed: Vec<usize> = Vec::new();
    for (idx, msg) in messages.iter().enumerate() {
        if msg.timestamp.is_some() {
            timed.push(idx);
        } else {
            untimed.push(idx);
        }
    }

    timed.sort_by_key(|&i| (messages[i].timestamp, messages[i].position));
    untimed.sort_by_key(|&i| messages[i].position);
    timed.extend(untimed);
    timed
}

/// Computes one annotation per message.
///
/// `annotations[i]` belongs to `messages[i]`; the input order is untouched.
///
/// - `gap_seconds` is set when this and the previous ranked message both have a timestamp
/// - `gap_flagged` is set when the gap is strictly greater than `gap_threshold_secs`
/// - `drift` is set on a timed message when a message ranked before it sits
///   later in the source
///
/// # Example
///
/// ```rust
/// use chataudit::core::timeline::analyze;
/// use chataudit::core::normalizer::normalize;
/// use chataudit::parsing::default_timestamp_formats;
/// use chataudit::RawMessage;
///
/// let formats = default_timestamp_formats();
/// let messages = vec![
///     normalize(RawMessage::new("late").with_timestamp("2024-01-01T09:05").with_position(0), &formats),
///     normalize(RawMessage::new("early").with_timestamp("2024-01-01T09:00").with_position(1), &formats),
/// ];
/// let ann = analyze(&messages, None);
/// assert_eq!(ann[1].sequence_index, 0);
/// assert_eq!(ann[0].sequence_index, 1);
/// assert!(ann[0].drift);
/// assert_eq!(ann[0].gap_seconds, Some(300));
/// ```
pub fn analyze(
    messages: &[NormalizedMessage],
    gap_threshold_secs: Option<i64>,
) -> Vec<TimestampAnnotation> {
    let order = chronological_order(messages);
    let mut annotations = vec![TimestampAnnotation::default(); messages.len()];

    let mut previous: Option<usize> = None;
    let mut max_position: Option<usize> = None;

    for (rank, &idx) in order.iter().enumerate() {
        let msg = &messages[idx];

        let gap_seconds = previous.and_then(|prev| {
            let (Some(current), Some(before)) = (msg.timestamp, messages[prev].timestamp) else {
                return None;
            };
            Some((current - before).num_seconds())
        });

        let drift = msg.timestamp.is_some() && max_position.is_some_and(|max| max > msg.position);
        if msg.timestamp.is_some() {
            max_position = Some(max_position.map_or(msg.position, |max| max.max(msg.position)));
        }

        annotations[idx] = TimestampAnnotation {
            sequence_index: rank,
            gap_seconds,
            gap_flagged: match (gap_seconds, gap_threshold_secs) {
                (Some(gap), Some(threshold)) => gap > threshold,
                _ => false,
            },
            drift,
        };
        previous = Some(idx);
    }

    annotations
}
