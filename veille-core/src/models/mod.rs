pub mod historique;
pub mod session;
pub mod veille;

pub use historique::HistoriqueEntry;
pub use session::Session;
pub use veille::Veille;
