//! In-memory entity/relation store with the cached graph document.

use std::collections::HashMap;

use super::{Entity, GraphDocument, Relation};

pub(crate) const ENTITY_ID_PREFIX: &str = "entity_";
pub(crate) const RELATION_ID_PREFIX: &str = "relation_";

/// Loaded ids with a larger numeric suffix do not move the counters, which
/// keeps room for the counters to grow.
const MAX_RESUMED_SEQUENCE: u64 = u64::MAX / 2;

/// Owns the entity and relation mappings plus the last built graph.
///
/// Iteration follows insertion order. Ids are handed out by store-wide
/// counters, so repeated extraction never reuses an id.
#[derive(Debug, Default)]
pub struct GraphStore {
    entities: HashMap<String, Entity>,
    entity_order: Vec<String>,
    relations: HashMap<String, Relation>,
    relation_order: Vec<String>,
    graph: Option<GraphDocument>,
    entity_seq: u64,
    relation_seq: u64,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity. An existing entry with the same id is replaced in place.
    pub fn insert_entity(&mut self, entity: Entity) {
        if !self.entities.contains_key(&entity.id) {
            self.entity_order.push(entity.id.clone());
        }
        self.entities.insert(entity.id.clone(), entity);
    }

    /// Register a relation. An existing entry with the same id is replaced in place.
    pub fn insert_relation(&mut self, relation: Relation) {
        if !self.relations.contains_key(&relation.id) {
            self.relation_order.push(relation.id.clone());
        }
        self.relations.insert(relation.id.clone(), relation);
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn relation(&self, id: &str) -> Option<&Relation> {
        self.relations.get(id)
    }

    /// All entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entity_order.iter().filter_map(|id| self.entities.get(id))
    }

    /// All relations in insertion order.
    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relation_order
            .iter()
            .filter_map(|id| self.relations.get(id))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// The cached graph, if one has been built or loaded.
    pub fn graph(&self) -> Option<&GraphDocument> {
        self.graph.as_ref()
    }

    pub fn is_built(&self) -> bool {
        self.graph.is_some()
    }

    pub(crate) fn next_entity_id(&mut self) -> String {
        self.entity_seq = self.entity_seq.saturating_add(1);
        format!("{}{}", ENTITY_ID_PREFIX, self.entity_seq)
    }

    pub(crate) fn next_relation_id(&mut self) -> String {
        self.relation_seq = self.relation_seq.saturating_add(1);
        format!("{}{}", RELATION_ID_PREFIX, self.relation_seq)
    }

    /// Build a graph document from the given sequences and cache it.
    ///
    /// Last build wins: the previous cached graph is discarded, not merged.
    pub fn build_graph(&mut self, entities: &[Entity], relations: &[Relation]) -> &GraphDocument {
        log::info!("Building knowledge graph");

        for relation in relations {
            let known = |id: &str| {
                self.entities.contains_key(id) || entities.iter().any(|e| e.id == id)
            };
            if !known(&relation.source) || !known(&relation.target) {
                log::warn!(
                    "Relation {} references unknown entity ({} -> {})",
                    relation.id,
                    relation.source,
                    relation.target
                );
            }
        }

        let doc = GraphDocument::from_parts(entities, relations);
        log::info!(
            "Knowledge graph built - nodes: {}, edges: {}",
            doc.nodes.len(),
            doc.edges.len()
        );
        self.graph.insert(doc)
    }

    /// Relations whose source or target is not a known entity id.
    pub fn dangling_relations(&self) -> Vec<&Relation> {
        self.relations()
            .filter(|r| {
                !self.entities.contains_key(&r.source) || !self.entities.contains_key(&r.target)
            })
            .collect()
    }

    /// Replace all state with the contents of a loaded document.
    ///
    /// `None` restores an empty store with no graph built. Id counters are
    /// moved past the highest sequential id present so later extraction
    /// cannot collide with loaded records.
    pub fn restore(&mut self, document: Option<GraphDocument>) {
        self.entities.clear();
        self.entity_order.clear();
        self.relations.clear();
        self.relation_order.clear();

        if let Some(doc) = &document {
            for node in &doc.nodes {
                self.insert_entity(Entity::from(node));
            }
            for edge in &doc.edges {
                self.insert_relation(Relation::from(edge));
            }
        }

        self.entity_seq = max_sequence(self.entity_order.iter(), ENTITY_ID_PREFIX);
        self.relation_seq = max_sequence(self.relation_order.iter(), RELATION_ID_PREFIX);
        self.graph = document;
    }
}

fn max_sequence<'a>(ids: impl Iterator<Item = &'a String>, prefix: &str) -> u64 {
    ids.filter_map(|id| id.strip_prefix(prefix)?.parse::<u64>().ok())
        .filter(|&seq| {
            let fits = seq <= MAX_RESUMED_SEQUENCE;
            if !fits {
                log::warn!("Id suffix {} too large to resume from, ignoring", seq);
            }
            fits
        })
        .max()
        .unwrap_or(0)
}
