use crate::error::PasteError;
use crate::id::PasteId;
use crate::paste::ViewedPaste;
use crate::request::CreatePasteRequest;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, PasteError>;

#[async_trait]
pub trait PasteStore: Send + Sync + 'static {
    /// Validates the request, stores the paste and returns its new id.
    async fn create(&self, request: CreatePasteRequest) -> Result<PasteId>;

    /// Reads a paste, consuming one view if it is view-limited.
    ///
    /// Returns `None` if the paste never existed, has expired, or has used
    /// up its views. The three cases are deliberately indistinguishable.
    async fn read(&self, id: &str) -> Result<Option<ViewedPaste>>;
}
