//! Accounts module - user records backed by a hosted account store.

mod accounts_constants;
mod accounts_errors;
mod accounts_memory_store;
mod accounts_model;
mod accounts_service;
mod accounts_traits;

#[cfg(test)]
mod accounts_service_tests;

// Re-export the public interface
pub use accounts_constants::*;
pub use accounts_errors::AccountError;
pub use accounts_memory_store::InMemoryAccountStore;
pub use accounts_model::{AuthUser, NewUser, UserPatch, UserRecord};
pub use accounts_service::AccountService;
pub use accounts_traits::{AccountServiceTrait, AccountStore};
