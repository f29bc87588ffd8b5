use std::time::Duration;
use typed_builder::TypedBuilder;

/// Tunables of a [`PasteService`](crate::PasteService).
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct StoreSettings {
    /// How many ids to try when a generated id is already taken. Values
    /// below 1 are treated as 1.
    #[builder(default = 3)]
    pub max_attempts: u32,
    /// Upper bound on every backing-engine call.
    #[builder(default = Duration::from_secs(5))]
    pub operation_timeout: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
