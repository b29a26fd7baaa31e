use std::path::PathBuf;

/// Knobs for a single analysis run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory whose entries (jars or class directories) back the lazy classpath.
    pub classpath_dir: Option<PathBuf>,
    /// Unify override-compatible method entries across each class hierarchy.
    pub join_method_entries: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            classpath_dir: None,
            join_method_entries: true,
        }
    }
}

impl PipelineConfig {
    pub fn with_classpath(mut self, dir: impl Into<PathBuf>) -> Self {
        self.classpath_dir = Some(dir.into());
        self
    }

    pub fn without_joining(mut self) -> Self {
        self.join_method_entries = false;
        self
    }
}
