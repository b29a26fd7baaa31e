//! Structural model of a compiled jar: classes, fields, methods and record components,
//! with method identities unified across each inheritance hierarchy.
//!
//! The pipeline is strictly staged: [`ingest`] populates the model from decoded class
//! events, [`hierarchy::populate_parents`] links classes, [`hierarchy::join_method_entries`]
//! unifies override-compatible methods, and [`remap`] optionally renames everything.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod hierarchy;
pub mod ingest;
pub mod model;
pub mod remap;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PipelineConfig;
pub use diagnostics::{Anomaly, Diagnostics};
pub use error::{JarscopeError, Result};
pub use model::{ClassId, ComponentId, EntityArena, FieldId, JarModel, MethodId};
pub use storage::{ArchiveStorage, ClassStorage};
