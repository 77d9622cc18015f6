//! Entity and relation extraction (demonstration data, text is not analysed).

use super::{properties, Entity, GraphStore, Properties, Relation};

/// Relation type produced between the first two extracted entities.
pub const RELATED: &str = "相关";

/// Strength recorded on the sample relation.
pub const SAMPLE_STRENGTH: f64 = 0.8;

/// The fixed `(name, type, properties)` tuples every extraction yields.
pub fn sample_entities() -> Vec<(&'static str, &'static str, Properties)> {
    vec![
        ("人工智能", "技术", properties([("category", "AI")])),
        ("机器学习", "技术", properties([("category", "ML")])),
        ("深度学习", "技术", properties([("category", "DL")])),
    ]
}

impl GraphStore {
    /// Extract entities from text and register them in the store.
    ///
    /// Always returns the sample entities with fresh ids, whatever the text says.
    pub fn extract_entities(&mut self, text: &str) -> Vec<Entity> {
        log::info!(
            "Extracting entities from text, length: {}",
            text.chars().count()
        );

        let entities: Vec<Entity> = sample_entities()
            .into_iter()
            .map(|(name, entity_type, props)| {
                let id = self.next_entity_id();
                Entity::new(id, name, entity_type, props)
            })
            .collect();

        for entity in &entities {
            self.insert_entity(entity.clone());
        }

        log::info!("Extracted {} entities", entities.len());
        entities
    }

    /// Extract relations between already extracted entities.
    ///
    /// Links the first two entities when there are at least two; otherwise
    /// returns nothing. The text is only accepted for interface symmetry.
    pub fn extract_relations(&mut self, _text: &str, entities: &[Entity]) -> Vec<Relation> {
        log::info!(
            "Extracting relations between entities, count: {}",
            entities.len()
        );

        let mut relations = Vec::new();
        if let [first, second, ..] = entities {
            let relation = Relation::new(
                self.next_relation_id(),
                first.id.clone(),
                second.id.clone(),
                RELATED,
                properties([("strength", SAMPLE_STRENGTH)]),
            );
            self.insert_relation(relation.clone());
            relations.push(relation);
        }

        log::info!("Extracted {} relations", relations.len());
        relations
    }
}
