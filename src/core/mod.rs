//! Core types: records, queries, the listing pipeline, aggregations and errors

pub mod aggregate;
pub mod error;
pub mod field;
pub mod listing;
pub mod provider;
pub mod query;
pub mod record;
pub mod validation;

pub use error::{ConfigError, FetchError, Result, ShepherdError, ValidationError};
pub use field::{FieldKind, FieldValue};
pub use provider::DataProvider;
pub use query::{
    FilterSpec, ListQuery, Page, PaginationMeta, RangeFilter, SearchSpec, SortDirection, SortSpec,
};
pub use record::{Record, RecordKind};
