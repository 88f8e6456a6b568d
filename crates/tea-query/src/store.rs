//! Source of catalog metadata and tracked entity records.

use tea_model::Uid;

use crate::catalog::Catalog;
use crate::dataset::{Dataset, TrackedEntity};
use crate::error::Result;

/// Read access to the data a query runs against.
///
/// Implementations return every record of the type, deleted ones included;
/// the engine decides what to exclude. Failures surface as
/// [`QueryError::Resolution`](crate::QueryError::Resolution).
pub trait TrackedEntityStore {
    fn catalog(&self) -> &Catalog;

    fn tracked_entities(&self, tracked_entity_type: &Uid) -> Result<Vec<&TrackedEntity>>;
}

/// Store backed by a dataset held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    dataset: Dataset,
}

impl InMemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl TrackedEntityStore for InMemoryStore {
    fn catalog(&self) -> &Catalog {
        &self.dataset.catalog
    }

    fn tracked_entities(&self, tracked_entity_type: &Uid) -> Result<Vec<&TrackedEntity>> {
        Ok(self
            .dataset
            .tracked_entities
            .iter()
            .filter(|entity| &entity.tracked_entity_type == tracked_entity_type)
            .collect())
    }
}
