//! Service layer for Asedex
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, id allocation, and cross-entity operations.

pub mod auth;
pub mod budget;
pub mod client;
pub mod module;

pub use auth::AuthService;
pub use budget::BudgetService;
pub use client::{ClientPatch, ClientService};
pub use module::{ModulePatch, ModuleService, NewModule};
