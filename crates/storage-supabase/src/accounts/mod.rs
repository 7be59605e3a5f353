//! Supabase storage implementation for user accounts.

mod model;
mod repository;

pub use model::AuthUserDB;
pub use repository::SupabaseAccountStore;
