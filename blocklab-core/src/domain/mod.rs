//! Domain types for strategy blocks.

pub mod block;
pub mod finding;
pub mod ids;

pub use block::{BlockInstance, BlockKind, BlockTemplate, ParamValue, Parameters};
pub use finding::ValidationFinding;
pub use ids::{InstanceId, TemplateId};
