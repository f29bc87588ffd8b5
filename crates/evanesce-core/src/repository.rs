use crate::error::Result;
use crate::id::PasteId;
use crate::paste::{PasteRecord, ViewedPaste};
use async_trait::async_trait;
use std::time::Duration;

/// The backing key-value engine holding pastes.
///
/// Every method is a single atomic operation against the engine. Callers
/// never combine separate reads and writes to mutate a paste.
#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Stores a new paste under `id` if no live paste holds that id.
    ///
    /// When `ttl` is given the engine evicts the paste once it elapses. The
    /// record and its TTL are applied together, so a failed insert leaves
    /// neither behind. Returns `Err(Conflict)` if the id is taken.
    async fn insert(&self, id: &PasteId, record: PasteRecord, ttl: Option<Duration>) -> Result<()>;

    /// Consumes one view of the paste stored under `id`.
    ///
    /// Returns `None` if no live paste exists. An unbounded paste is returned
    /// untouched. A bounded paste has its budget decremented, and is deleted
    /// when the budget reaches zero; the content is returned in both cases.
    async fn consume(&self, id: &PasteId) -> Result<Option<ViewedPaste>>;
}
