pub mod config;
pub mod db;
pub mod models;
pub mod openai;
pub mod render;
pub mod report;
pub mod store;
pub mod validate;

pub use config::VeilleConfig;
pub use models::{HistoriqueEntry, Session, Veille};
pub use openai::{CompletionConfig, CompletionError, OpenAiClient, OPENAI_BASE_URL};
pub use render::{parse_sections, Section, SectionCategory};
pub use report::{build_prompt, SYSTEM_PROMPT};
pub use validate::ValidationError;
