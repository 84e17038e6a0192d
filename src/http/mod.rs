//! HTTP request/response types and extractors.
//!
//! Response wrappers, pagination parsing, and the RouteModule trait used to
//! compose each resource's router into the application.

pub mod query;
pub mod response;
pub mod routes;

pub use crate::validation::{ValidatedJson, ValidatedQuery};
pub use query::{PaginationQuery, SortOrder};
pub use response::{ApiResponse, CreatedResponse, NoContentResponse, PaginatedData, PaginationMeta};
pub use routes::RouteModule;
