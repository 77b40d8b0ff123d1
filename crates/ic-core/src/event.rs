//! Calendar events as seen by the classifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity used for events that list no creators.
pub const UNKNOWN_CREATOR: &str = "(Unknown)";

/// An event suitable for classification.
///
/// This trait allows aggregation to work with different event representations
/// (e.g., rows from the calendar store, or test fixtures).
pub trait CalendarEvent {
    /// Returns the event title, if it has one.
    fn title(&self) -> Option<&str>;

    /// Returns the identities that created the event.
    fn creators(&self) -> &[String];
}

/// Returns the creators an event's tally is attributed to.
///
/// Creators form a set: repeated identities are yielded once, in first-seen
/// order. Events without creators are attributed once to [`UNKNOWN_CREATOR`].
pub fn effective_creators<E: CalendarEvent + ?Sized>(event: &E) -> Vec<&str> {
    let creators = event.creators();
    if creators.is_empty() {
        return vec![UNKNOWN_CREATOR];
    }
    let mut unique: Vec<&str> = Vec::with_capacity(creators.len());
    for creator in creators {
        if !unique.contains(&creator.as_str()) {
            unique.push(creator);
        }
    }
    unique
}

/// A calendar event fetched from an event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventRecord {
    /// Unique identifier for this event.
    pub id: String,
    /// Calendar the event belongs to.
    pub calendar_id: String,
    /// Event title; absent titles classify as empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// When the event starts.
    pub start: DateTime<Utc>,
    /// When the event ends.
    pub end: DateTime<Utc>,
    /// Creator identities (typically email addresses).
    #[serde(default)]
    pub creators: Vec<String>,
}

impl CalendarEvent for CalendarEventRecord {
    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn creators(&self) -> &[String] {
        &self.creators
    }
}
