//! Knowledge graph module: data model, store, extraction, query and persistence.
//!
//! Entities and relations live in an insertion-ordered [`GraphStore`]. A
//! [`GraphDocument`] is the serializable projection that gets cached, queried
//! and written to disk.

mod extraction;
mod persistence;
mod query;
mod store;

pub use extraction::{sample_entities, RELATED, SAMPLE_STRENGTH};
pub use persistence::{load_document, save_document, LoadOutcome};
pub use query::{QueryCategory, QueryResponse, QueryResults};
pub use store::GraphStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Open property bag attached to entities and relations.
pub type Properties = Map<String, Value>;

/// A named, typed concept node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique within the owning store, e.g. `entity_1`.
    pub id: String,
    pub name: String,
    /// Category label, e.g. `技术`.
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Entity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        entity_type: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type: entity_type.into(),
            properties,
            created_at: Utc::now(),
        }
    }
}

/// A directed, typed edge between two entity ids (source --relation_type--> target).
///
/// Endpoints are not checked against the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Unique within the owning store, e.g. `relation_1`.
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation_type: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Relation {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        relation_type: impl Into<String>,
        properties: Properties,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            relation_type: relation_type.into(),
            properties,
            created_at: Utc::now(),
        }
    }
}

/// Node view of an [`Entity`] inside a [`GraphDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub properties: Properties,
}

impl From<&Entity> for GraphNode {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            name: entity.name.clone(),
            node_type: entity.entity_type.clone(),
            properties: entity.properties.clone(),
        }
    }
}

impl From<&GraphNode> for Entity {
    fn from(node: &GraphNode) -> Self {
        Entity::new(
            node.id.clone(),
            node.name.clone(),
            node.node_type.clone(),
            node.properties.clone(),
        )
    }
}

/// Edge view of a [`Relation`] inside a [`GraphDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation_type: String,
    pub properties: Properties,
}

impl From<&Relation> for GraphEdge {
    fn from(relation: &Relation) -> Self {
        Self {
            id: relation.id.clone(),
            source: relation.source.clone(),
            target: relation.target.clone(),
            relation_type: relation.relation_type.clone(),
            properties: relation.properties.clone(),
        }
    }
}

impl From<&GraphEdge> for Relation {
    fn from(edge: &GraphEdge) -> Self {
        Relation::new(
            edge.id.clone(),
            edge.source.clone(),
            edge.target.clone(),
            edge.relation_type.clone(),
            edge.properties.clone(),
        )
    }
}

/// Summary counts recorded when a graph is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub created_at: DateTime<Utc>,
    pub entity_count: usize,
    pub relation_count: usize,
}

/// Serializable projection of entities and relations. This is the on-disk format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
    #[serde(default = "GraphMetadata::empty")]
    pub metadata: GraphMetadata,
}

impl GraphMetadata {
    fn empty() -> Self {
        Self {
            created_at: Utc::now(),
            entity_count: 0,
            relation_count: 0,
        }
    }
}

impl GraphDocument {
    /// Project entities and relations into a document, preserving input order.
    pub fn from_parts(entities: &[Entity], relations: &[Relation]) -> Self {
        Self {
            nodes: entities.iter().map(GraphNode::from).collect(),
            edges: relations.iter().map(GraphEdge::from).collect(),
            metadata: GraphMetadata {
                created_at: Utc::now(),
                entity_count: entities.len(),
                relation_count: relations.len(),
            },
        }
    }
}

/// Build a property bag from `(key, value)` pairs.
pub fn properties<I, K, V>(pairs: I) -> Properties
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
