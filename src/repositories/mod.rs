//! Repositories module - Accesso al database
//!
//! Ogni repository gestisce le operazioni di database per una specifica
//! entità. Le query usano la variante runtime-checked di sqlx così il
//! crate compila anche senza un database raggiungibile.

pub mod invite;

// Re-exports per facilitare l'import
pub use invite::{InviteRepository, InviteStore, StoreError};
