pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod graph;

pub use agent::{AgentStatus, Extraction, KnowledgeMapAgent};
pub use config::{AgentConfig, Config};
pub use error::{KnowledgeMapError, Result};
pub use graph::{Entity, GraphDocument, GraphStore, LoadOutcome, Relation};
