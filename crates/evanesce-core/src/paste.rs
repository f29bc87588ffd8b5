use crate::error::ValidationError;
use jiff::Timestamp;
use serde::Serialize;
use std::num::{NonZeroU32, NonZeroU64};
use std::time::Duration;

/// Read budget of a paste.
///
/// A bounded budget is never zero: the read that consumes the last view
/// deletes the paste instead of storing an empty budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewLimit {
    /// The paste can be read any number of times.
    Unbounded,
    /// The paste can be read this many more times.
    Bounded(NonZeroU32),
}

impl ViewLimit {
    /// Returns the budget left after one successful read, or `None` if that
    /// read exhausts it.
    pub fn decrement(self) -> Option<Self> {
        match self {
            ViewLimit::Unbounded => Some(ViewLimit::Unbounded),
            ViewLimit::Bounded(views) => NonZeroU32::new(views.get() - 1).map(ViewLimit::Bounded),
        }
    }

    /// Number of remaining views, `None` when unbounded.
    pub fn remaining(self) -> Option<u32> {
        match self {
            ViewLimit::Unbounded => None,
            ViewLimit::Bounded(views) => Some(views.get()),
        }
    }
}

impl From<Option<NonZeroU32>> for ViewLimit {
    fn from(value: Option<NonZeroU32>) -> Self {
        value.map_or(ViewLimit::Unbounded, ViewLimit::Bounded)
    }
}

/// A validated paste that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaste {
    content: String,
    expires_in: Option<NonZeroU64>,
    max_views: Option<NonZeroU32>,
}

impl NewPaste {
    /// Creates a new paste. Fails if `content` is empty.
    pub fn new(
        content: impl Into<String>,
        expires_in: Option<NonZeroU64>,
        max_views: Option<NonZeroU32>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.is_empty() {
            return Err(ValidationError::Content("must not be empty".to_string()));
        }

        Ok(Self {
            content,
            expires_in,
            max_views,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Time after which the backing engine evicts the paste, if any.
    pub fn ttl(&self) -> Option<Duration> {
        self.expires_in.map(|secs| Duration::from_secs(secs.get()))
    }

    pub fn view_limit(&self) -> ViewLimit {
        self.max_views.into()
    }

    /// Turns this paste into the record persisted by a backing engine.
    pub fn into_record(self, created_at: Timestamp) -> PasteRecord {
        PasteRecord {
            views: self.max_views.into(),
            content: self.content,
            created_at,
        }
    }
}

/// A paste as held by a backing engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteRecord {
    /// The stored text.
    pub content: String,
    /// Remaining read budget.
    pub views: ViewLimit,
    /// Creation time. Metadata only; expiry is driven by the engine's TTL.
    pub created_at: Timestamp,
}

impl PasteRecord {
    /// Builds the result of a read that left `remaining_views` behind.
    pub fn viewed(&self, remaining_views: Option<u32>) -> ViewedPaste {
        ViewedPaste {
            content: self.content.clone(),
            created_at: self.created_at,
            remaining_views,
        }
    }
}

/// The outcome of a successful read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewedPaste {
    /// The stored text, byte-for-byte as created.
    pub content: String,
    pub created_at: Timestamp,
    /// Views left after this read. `None` for unbounded pastes, `Some(0)`
    /// on the read that exhausted the paste.
    pub remaining_views: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn views(n: u32) -> ViewLimit {
        ViewLimit::Bounded(NonZeroU32::new(n).unwrap())
    }

    #[test]
    fn decrement_bounded() {
        assert_eq!(views(3).decrement(), Some(views(2)));
        assert_eq!(views(2).decrement(), Some(views(1)));
        assert_eq!(views(1).decrement(), None);
    }

    #[test]
    fn decrement_unbounded_is_noop() {
        assert_eq!(ViewLimit::Unbounded.decrement(), Some(ViewLimit::Unbounded));
        assert_eq!(ViewLimit::Unbounded.remaining(), None);
    }

    #[test]
    fn view_limit_from_option() {
        assert_eq!(ViewLimit::from(None), ViewLimit::Unbounded);
        assert_eq!(ViewLimit::from(NonZeroU32::new(5)), views(5));
    }

    #[test]
    fn new_paste_rejects_empty_content() {
        let err = NewPaste::new("", None, None).unwrap_err();
        assert_eq!(err.field(), "content");
    }

    #[test]
    fn new_paste_into_record() {
        let created_at = Timestamp::from_second(1_700_000_000).unwrap();
        let paste = NewPaste::new("hello", NonZeroU64::new(60), NonZeroU32::new(2)).unwrap();

        assert_eq!(paste.ttl(), Some(Duration::from_secs(60)));
        assert_eq!(paste.view_limit(), views(2));

        let record = paste.into_record(created_at);
        assert_eq!(record.content, "hello");
        assert_eq!(record.views, views(2));
        assert_eq!(record.created_at, created_at);
    }

    #[test]
    fn viewed_paste_serializes_camel_case() {
        let record = PasteRecord {
            content: "hi".to_string(),
            views: ViewLimit::Unbounded,
            created_at: Timestamp::from_second(0).unwrap(),
        };
        let json = serde_json::to_value(record.viewed(Some(0))).unwrap();
        assert_eq!(json["content"], "hi");
        assert_eq!(json["remainingViews"], 0);
        assert!(json.get("createdAt").is_some());
    }
}
