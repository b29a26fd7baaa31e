use crate::archive::JarArchive;
use crate::classpath::Classpath;
use crate::decode::decode_class;
use crate::resolver::LazyClasspathStorage;
use jarscope_core::config::PipelineConfig;
use jarscope_core::diagnostics::{Anomaly, Diagnostics};
use jarscope_core::hierarchy::{join_method_entries, populate_parents};
use jarscope_core::ingest::{ClassIngestor, IngestMode};
use jarscope_core::model::JarModel;
use jarscope_core::remap::{Remapper, remap_model};
use jarscope_core::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Counters and anomalies of one run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PipelineReport {
    pub classes_read: usize,
    pub classpath_classes: usize,
    pub promoted_getters: usize,
    pub joined_methods: usize,
    pub propagated_flags: usize,
    pub traversed_classes: usize,
    pub anomalies: Vec<Anomaly>,
}

/// Reads a jar into a [`JarModel`].
///
/// Stages run strictly in order: ingest every class of the jar, resolve parent edges
/// through the classpath, join method entries, then optionally remap.
pub struct JarReader {
    jar_path: PathBuf,
    config: PipelineConfig,
}

impl JarReader {
    pub fn new(jar_path: impl Into<PathBuf>, config: PipelineConfig) -> Self {
        Self {
            jar_path: jar_path.into(),
            config,
        }
    }

    pub fn jar_path(&self) -> &Path {
        &self.jar_path
    }

    pub fn apply(&self, remapper: Option<&dyn Remapper>) -> Result<(JarModel, PipelineReport)> {
        let mut model = JarModel::default();
        let mut report = PipelineReport::default();
        let mut diagnostics = Diagnostics::new();

        info!("Reading {}...", self.jar_path.display());
        let mut jar = JarArchive::open(&self.jar_path)?;
        let ingestor = ClassIngestor::new(IngestMode::Full);
        for resource in jar.class_resources()? {
            let events = decode_class(resource.bytes, &resource.name, IngestMode::Full)?;
            let ingested =
                ingestor.ingest(&mut model.arena, &mut model.classes, &mut diagnostics, events)?;
            report.classes_read += 1;
            report.promoted_getters += ingested.promoted_getters;
        }
        info!("Read {} classes.", report.classes_read);

        let classpath = match &self.config.classpath_dir {
            Some(dir) => Classpath::open_dir(dir)?,
            None => Classpath::empty(),
        };
        let mut storage = LazyClasspathStorage::new(&model.classes, classpath);

        let primary: Vec<_> = model.classes.class_ids().collect();
        for class in primary {
            populate_parents(&mut model.arena, &mut storage, class)?;
        }
        info!(
            "Populated subclass entries ({} classes from classpath).",
            storage.loaded()
        );

        if self.config.join_method_entries {
            let stats = join_method_entries(&mut model.arena, &model.classes, &mut storage)?;
            report.joined_methods = stats.joined_methods;
            report.propagated_flags = stats.propagated_flags;
            report.traversed_classes = stats.traversed_classes;
        }

        let parts = storage.into_parts();
        model.classpath = parts.classes;
        diagnostics.extend(parts.diagnostics);
        report.classpath_classes = model.classpath.len();

        if let Some(remapper) = remapper {
            remap_model(&mut model.arena, &mut model.classes, remapper);
        }

        report.anomalies = diagnostics.into_vec();
        info!("Done ({} anomalies).", report.anomalies.len());
        Ok((model, report))
    }
}
