pub mod engine;
pub mod filters;
pub mod state;

pub use engine::FilterEngine;
pub use filters::{derive_visible, filter_by_categories, filter_by_owner, filter_by_query, sort_rows};
pub use state::{
    FilterCriteria, RecomputePolicy, SortDirection, SortKey, SortOrder, ViewEvent, ViewTransition,
};
