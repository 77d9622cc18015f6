//! Keyword routing over the store.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Entity, GraphDocument, GraphStore, Relation};

/// What a free-text query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryCategory {
    Entities,
    Relations,
    Graph,
}

impl QueryCategory {
    /// Case-insensitive substring match on `entity`/`实体`, then `relation`/`关系`.
    /// Anything else falls through to the whole graph.
    pub fn classify(query: &str) -> Self {
        let lowered = query.to_lowercase();
        if lowered.contains("实体") || lowered.contains("entity") {
            QueryCategory::Entities
        } else if lowered.contains("关系") || lowered.contains("relation") {
            QueryCategory::Relations
        } else {
            QueryCategory::Graph
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QueryResults {
    Entities(Vec<Entity>),
    Relations(Vec<Relation>),
    Graph(GraphDocument),
    /// No graph built yet; serializes as `{}`.
    Unbuilt {},
}

impl QueryResults {
    /// Number of records for list results, `None` for graph results.
    pub fn record_count(&self) -> Option<usize> {
        match self {
            QueryResults::Entities(v) => Some(v.len()),
            QueryResults::Relations(v) => Some(v.len()),
            QueryResults::Graph(_) | QueryResults::Unbuilt {} => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub query: String,
    pub results: QueryResults,
    pub timestamp: DateTime<Utc>,
}

impl GraphStore {
    pub fn query(&self, query: &str) -> QueryResponse {
        log::info!("Running graph query: {}", query);

        let results = match QueryCategory::classify(query) {
            QueryCategory::Entities => QueryResults::Entities(self.entities().cloned().collect()),
            QueryCategory::Relations => {
                QueryResults::Relations(self.relations().cloned().collect())
            }
            QueryCategory::Graph => match self.graph() {
                Some(graph) => QueryResults::Graph(graph.clone()),
                None => QueryResults::Unbuilt {},
            },
        };
        match results.record_count() {
            Some(count) => log::info!("Query matched {} records", count),
            None => log::info!("Query answered with the whole graph"),
        }

        QueryResponse {
            query: query.to_string(),
            results,
            timestamp: Utc::now(),
        }
    }
}
