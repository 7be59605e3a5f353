//! Supabase storage implementation for the stock dashboard.
//!
//! This crate implements the `AccountStore` trait from `stockdash-core`
//! against a hosted Supabase project:
//! - Token verification through the auth (GoTrue) API
//! - `users` table reads and writes through the REST (PostgREST) API
//!
//! # Architecture
//!
//! This crate is the only place that knows Supabase URLs, headers and error
//! payloads. `core` works with the trait alone.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-supabase (this crate)
//!              │
//!              ▼
//!   Supabase auth + REST APIs
//! ```

pub mod accounts;
pub mod client;
pub mod errors;

pub use accounts::SupabaseAccountStore;
pub use client::{SupabaseClient, SupabaseConfig};
pub use errors::StorageError;
