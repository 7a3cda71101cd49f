pub mod alias;
pub mod chat_history;
pub mod classifier;
pub mod consolidation;
pub mod disambiguation;
pub mod entity_extraction;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod pii;
pub mod repository;
pub mod retrieval;
pub mod session_entities;

pub use error::{CoreError, CoreResult};
