//! Core types and traits for the Evanesce paste store.
//!
//! This crate provides the paste data model, input validation, the error
//! taxonomy and the contracts shared by the storage backends and the
//! store service.

pub mod clock;
pub mod error;
pub mod id;
pub mod paste;
pub mod repository;
pub mod request;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{PasteError, StorageError, ValidationError};
pub use id::PasteId;
pub use paste::{NewPaste, PasteRecord, ViewLimit, ViewedPaste};
pub use repository::Repository;
pub use request::CreatePasteRequest;
pub use store::PasteStore;
