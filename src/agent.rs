//! The knowledge map agent: configuration plus the graph store lifecycle.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{AgentConfig, Config};
use crate::error::Result;
use crate::graph::{
    load_document, save_document, Entity, GraphDocument, GraphStore, LoadOutcome, QueryResponse,
    Relation,
};

pub const GRAPH_BUILT: &str = "已构建";
pub const GRAPH_NOT_BUILT: &str = "未构建";

/// Point-in-time view of the agent, returned by [`KnowledgeMapAgent::status`].
#[derive(Debug, Clone, Serialize)]
pub struct AgentStatus {
    pub name: String,
    pub model: String,
    pub capabilities: Vec<String>,
    pub entity_count: usize,
    pub relation_count: usize,
    pub graph_status: String,
    pub graph_built: bool,
    pub timestamp: DateTime<Utc>,
}

/// Everything one pass of extract -> relate -> build produces.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
    pub graph: GraphDocument,
}

pub struct KnowledgeMapAgent {
    config: AgentConfig,
    store: GraphStore,
    graph_path: PathBuf,
}

impl KnowledgeMapAgent {
    pub fn new(config: AgentConfig, graph_path: impl Into<PathBuf>) -> Self {
        log::info!("KnowledgeMap agent initialized - model: {}", config.model);
        Self {
            config,
            store: GraphStore::new(),
            graph_path: graph_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.agent.clone(), config.graph_path.clone())
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    /// Default file used by [`save_graph`](Self::save_graph) and [`load_graph`](Self::load_graph).
    pub fn graph_path(&self) -> &Path {
        &self.graph_path
    }

    pub fn extract_entities(&mut self, text: &str) -> Vec<Entity> {
        self.store.extract_entities(text)
    }

    pub fn extract_relations(&mut self, text: &str, entities: &[Entity]) -> Vec<Relation> {
        self.store.extract_relations(text, entities)
    }

    pub fn build_knowledge_graph(
        &mut self,
        entities: &[Entity],
        relations: &[Relation],
    ) -> GraphDocument {
        self.store.build_graph(entities, relations).clone()
    }

    /// Run extraction, relation extraction and graph building on one text.
    pub fn process_text(&mut self, text: &str) -> Extraction {
        let entities = self.extract_entities(text);
        let relations = self.extract_relations(text, &entities);
        let graph = self.build_knowledge_graph(&entities, &relations);
        Extraction {
            entities,
            relations,
            graph,
        }
    }

    pub fn query_graph(&self, query: &str) -> QueryResponse {
        self.store.query(query)
    }

    /// Copy of the cached graph, for writing outside any lock.
    pub fn graph_snapshot(&self) -> Option<GraphDocument> {
        self.store.graph().cloned()
    }

    pub fn save_graph(&self) -> Result<()> {
        self.save_graph_to(&self.graph_path)
    }

    pub fn save_graph_to(&self, path: &Path) -> Result<()> {
        save_document(path, self.store.graph())
    }

    pub fn load_graph(&mut self) -> Result<LoadOutcome> {
        let path = self.graph_path.clone();
        self.load_graph_from(&path)
    }

    /// Replace the store with the graph saved at `path`.
    ///
    /// A missing file leaves the current state untouched. Parse failures
    /// propagate, also without touching state.
    pub fn load_graph_from(&mut self, path: &Path) -> Result<LoadOutcome> {
        let outcome = load_document(path)?;
        self.apply_loaded(outcome.clone());
        Ok(outcome)
    }

    /// Apply a load result obtained elsewhere (e.g. read on a blocking thread).
    pub fn apply_loaded(&mut self, outcome: LoadOutcome) {
        if let LoadOutcome::Loaded(document) = outcome {
            self.store.restore(document);
        }
    }

    pub fn status(&self) -> AgentStatus {
        let built = self.store.is_built();
        AgentStatus {
            name: self.config.name.clone(),
            model: self.config.model.clone(),
            capabilities: self.config.capabilities.clone(),
            entity_count: self.store.entity_count(),
            relation_count: self.store.relation_count(),
            graph_status: if built { GRAPH_BUILT } else { GRAPH_NOT_BUILT }.to_string(),
            graph_built: built,
            timestamp: Utc::now(),
        }
    }
}
