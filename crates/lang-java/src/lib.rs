//! Reading real jars into the `jarscope-core` model.

pub mod archive;
pub mod classpath;
pub mod decode;
pub mod pipeline;
pub mod resolver;

pub use archive::{ClassResource, JarArchive};
pub use classpath::Classpath;
pub use decode::decode_class;
pub use pipeline::{JarReader, PipelineReport};
pub use resolver::LazyClasspathStorage;
