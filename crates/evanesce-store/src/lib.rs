//! Paste store service.
//!
//! [`PasteService`] drives the paste lifecycle over any
//! [`Repository`](evanesce_core::Repository) and
//! [`Generator`](evanesce_generator::Generator). Core types are re-exported
//! from `evanesce_core`.

pub mod service;
pub mod settings;

pub use evanesce_core::{CreatePasteRequest, PasteError, PasteId, PasteStore, ViewedPaste};
pub use service::PasteService;
pub use settings::StoreSettings;
