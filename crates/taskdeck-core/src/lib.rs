pub mod board;
pub mod comment;
pub mod draft;
pub mod error;
pub mod organization;
pub mod project;
pub mod task;

pub use comment::TaskComment;
pub use error::{DeckError, ValidationError};
pub use organization::Organization;
pub use project::{Project, ProjectStatistics, ProjectStatus};
pub use task::{Task, TaskStatus};
