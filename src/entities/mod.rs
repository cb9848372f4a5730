//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene le entità (models) che rappresentano i dati
//! persistiti nel database. Una entity per tabella.

pub mod invite;

// Re-exports per facilitare l'import
pub use invite::{Invite, NewInvite};
