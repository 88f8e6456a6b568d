pub mod cell;
pub mod dimension;
pub mod envelope;
pub mod error;
pub mod error_response;
pub mod filter;
pub mod header;
pub mod ids;
pub mod metadata;
pub mod row_context;
pub mod sort;
pub mod value_type;

pub use cell::{EMPTY_CELL, Row, compare_cells, render_cell};
pub use dimension::{
    DimensionKey, OffsetUid, ProgramColumn, ProgramItem, StageColumn, StageItem, SystemColumn,
};
pub use envelope::ResponseEnvelope;
pub use error::{ModelError, Result};
pub use error_response::ErrorResponse;
pub use filter::{DimensionSpec, FilterOperator, QueryFilter};
pub use header::GridHeader;
pub use ids::Uid;
pub use metadata::{
    DimensionItemType, DimensionType, Metadata, MetadataItem, OptionRef, Pager,
};
pub use row_context::{CellContext, RowContext, ValueStatus};
pub use sort::{SortDirection, SortKey, SortSpec, compare_rows};
pub use value_type::{AggregationType, ValueClass, ValueType};
