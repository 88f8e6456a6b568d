//! Tracked entity query resolution.
//!
//! Turns a [`QueryRequest`] into a [`tea_model::ResponseEnvelope`] using
//! catalog metadata and records from a [`TrackedEntityStore`].

pub mod catalog;
pub mod columns;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod orgunit;
pub mod paging;
pub mod period;
pub mod request;
pub mod row_context;
pub mod store;

pub use catalog::{
    Catalog, OptionSet, OrgUnit, Program, ProgramStage, QueryItem, TrackedEntityType,
};
pub use columns::{Column, ColumnResolver};
pub use config::{DisplayProperty, QueryConfig};
pub use dataset::{Dataset, Enrollment, EnrollmentStatus, Event, EventStatus, TrackedEntity};
pub use engine::QueryEngine;
pub use error::{ErrorCode, LoadError, QueryError, Result};
pub use metadata::MetadataResolver;
pub use orgunit::OrgUnitSelection;
pub use paging::{Page, paginate};
pub use period::{DateRange, Period, PeriodFilter, RelativePeriod};
pub use request::{ProgramStatusFilter, QueryRequest};
pub use row_context::{Cell, CellResolver, ScopedValue};
pub use store::{InMemoryStore, TrackedEntityStore};
