use serde::{Deserialize, Serialize};

use crate::graph::{Entity, GraphDocument, Relation};

/// Body of `POST /api/extract`
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Body of `POST /api/query`
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntitySummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
}

impl From<&Entity> for EntitySummary {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            name: entity.name.clone(),
            entity_type: entity.entity_type.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RelationSummary {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub relation_type: String,
}

impl From<&Relation> for RelationSummary {
    fn from(relation: &Relation) -> Self {
        Self {
            id: relation.id.clone(),
            source: relation.source.clone(),
            target: relation.target.clone(),
            relation_type: relation.relation_type.clone(),
        }
    }
}

/// Response of `POST /api/extract`
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub entities: Vec<EntitySummary>,
    pub relations: Vec<RelationSummary>,
    pub graph: GraphDocument,
}

/// Response of `POST /api/save` and `POST /api/load`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
