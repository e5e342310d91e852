pub mod cache;
pub mod graphql;
mod http;
mod traits;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use cache::ResponseCache;
pub use http::{GraphqlService, PROJECT_TYPENAME, TASK_TYPENAME};
pub use traits::{DeckService, ServiceError};
