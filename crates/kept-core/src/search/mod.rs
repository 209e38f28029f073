//! Text search and view helpers over a note collection.
//!
//! Search is a plain case-insensitive substring match on title or content,
//! evaluated in memory against the store's active collection.

use chrono::{DateTime, Duration, Utc};

use crate::models::Note;

/// Whether `note` matches `query`. A blank query matches everything.
pub fn matches_query(note: &Note, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }

    let needle = query.to_lowercase();
    note.title.to_lowercase().contains(&needle) || note.content.to_lowercase().contains(&needle)
}

/// Notes matching `query`, in collection order.
pub fn filter_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    notes
        .iter()
        .filter(|note| matches_query(note, query))
        .collect()
}

/// Split into `(pinned, others)`, each keeping its original relative order.
pub fn partition_pinned<'a>(
    notes: impl IntoIterator<Item = &'a Note>,
) -> (Vec<&'a Note>, Vec<&'a Note>) {
    notes.into_iter().partition(|note| note.is_pinned)
}

/// Order trashed notes most recently deleted first.
pub fn sort_trash(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
}

/// Whole days left before a trashed note becomes eligible for purging.
///
/// Partial days already elapsed count as full days, so a note deleted a few
/// hours ago out of a 7-day window shows 6. Notes without a deletion stamp
/// report the full window.
pub fn days_until_purge(note: &Note, now: DateTime<Utc>, retention: Duration) -> i64 {
    let Some(deleted_at) = note.deleted_at else {
        return retention.num_days();
    };

    let age = now.signed_duration_since(deleted_at);
    let elapsed_days = if age <= Duration::zero() {
        0
    } else {
        let whole = age.num_days();
        if age > Duration::days(whole) {
            whole + 1
        } else {
            whole
        }
    };

    (retention.num_days() - elapsed_days).max(0)
}
