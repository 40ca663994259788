#![doc = include_str!("../README.md")]

pub mod adapter;
pub mod client;
pub mod datetime;
pub mod error;
pub mod filter;
pub mod memory;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use adapter::{AdapterOptions, AuthAdapter, CollectionNames, PocketBaseAdapter};
pub use client::{ClientOptions, PocketBase};
pub use error::{AdapterError, Result};
pub use filter::Filter;
pub use memory::MemoryStore;
pub use store::RecordStore;
pub use types::{
    AdapterAccount, AdapterSession, AdapterUser, NewUser, SessionAndUser, SessionPatch,
    UserPatch, VerificationToken,
};
