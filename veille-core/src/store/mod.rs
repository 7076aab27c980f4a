//! Database access, one module per table. All queries use the runtime sqlx
//! APIs and bind-parameters throughout; nothing here interpolates user input
//! into SQL text.

pub mod historique;
pub mod session;
pub mod veille;
