//! Backing engines for the paste store.

pub mod memory;
pub mod redis;

pub use evanesce_core::repository::Repository;
pub use crate::memory::InMemoryRepository;
pub use crate::redis::RedisRepository;
