pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod render;
pub mod view;

pub use catalog::{
    dataset::{Dataset, DatasetError, IntegrityFinding, IntegrityReport},
    join, Catalog,
};
pub use domain::category::{Category, CategoryId};
pub use domain::product::{DenormalizedProduct, Product, ProductId};
pub use domain::user::{Sex, User, UserId};
pub use errors::ApplicationError;
pub use render::{render, OutputFormat, RenderError, RowStyle, TableRow, EMPTY_MESSAGE};
pub use view::{FilterCriteria, FilterEngine, RecomputePolicy, SortKey, ViewEvent, ViewTransition};
