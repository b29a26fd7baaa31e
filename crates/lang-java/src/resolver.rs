use crate::classpath::Classpath;
use crate::decode::decode_class;
use jarscope_core::diagnostics::{Anomaly, Diagnostics};
use jarscope_core::event::ClassEvent;
use jarscope_core::hierarchy::populate_parents;
use jarscope_core::ingest::{ClassIngestor, IngestMode};
use jarscope_core::model::{ClassId, EntityArena};
use jarscope_core::storage::{ArchiveStorage, ClassStorage};
use jarscope_core::Result;
use std::collections::HashSet;
use tracing::debug;

/// Class lookup that falls back to an auxiliary classpath.
///
/// Names are answered from the primary archive first, then from classes already loaded.
/// Anything else is read from the classpath on first request, ingested without method
/// bodies, marked non-obfuscated and has its own parents resolved before it is returned.
/// A class the classpath does not have is reported once and stays a terminal edge.
pub struct LazyClasspathStorage<'p> {
    primary: &'p ArchiveStorage,
    classpath: Classpath,
    cache: ArchiveStorage,
    misses: HashSet<String>,
    diagnostics: Diagnostics,
    ingestor: ClassIngestor,
}

/// What the resolver accumulated over a run.
pub struct ClasspathParts {
    pub classes: ArchiveStorage,
    pub diagnostics: Diagnostics,
}

impl<'p> LazyClasspathStorage<'p> {
    pub fn new(primary: &'p ArchiveStorage, classpath: Classpath) -> Self {
        Self {
            primary,
            classpath,
            cache: ArchiveStorage::new(),
            misses: HashSet::new(),
            diagnostics: Diagnostics::new(),
            ingestor: ClassIngestor::new(IngestMode::MetadataOnly).non_obfuscated(true),
        }
    }

    pub fn loaded(&self) -> usize {
        self.cache.len()
    }

    pub fn into_parts(self) -> ClasspathParts {
        ClasspathParts {
            classes: self.cache,
            diagnostics: self.diagnostics,
        }
    }

    fn miss(&mut self, name: &str, anomaly: Anomaly) -> Result<Option<ClassId>> {
        self.misses.insert(name.to_string());
        self.diagnostics.report(anomaly);
        Ok(None)
    }

    fn load(&mut self, arena: &mut EntityArena, name: &str) -> Result<Option<ClassId>> {
        let bytes = match self.classpath.find_class(name) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                return self.miss(
                    name,
                    Anomaly::ClasspathMiss {
                        class: name.to_string(),
                    },
                );
            }
            Err(e) => {
                return self.miss(
                    name,
                    Anomaly::ClasspathDecodeFailed {
                        class: name.to_string(),
                        message: e.to_string(),
                    },
                );
            }
        };

        let events = match decode_class(bytes, &format!("{name}.class"), IngestMode::MetadataOnly) {
            Ok(events) => events,
            Err(e) => {
                return self.miss(
                    name,
                    Anomaly::ClasspathDecodeFailed {
                        class: name.to_string(),
                        message: e.to_string(),
                    },
                );
            }
        };
        if let Some(ClassEvent::Header(header)) = events.first() {
            if header.name != name {
                let message = format!("resource declares class {}", header.name);
                return self.miss(
                    name,
                    Anomaly::ClasspathDecodeFailed {
                        class: name.to_string(),
                        message,
                    },
                );
            }
        }

        let loaded = self
            .ingestor
            .ingest(arena, &mut self.cache, &mut self.diagnostics, events)?;
        debug!("Loaded {} from classpath", name);
        populate_parents(arena, self, loaded.id)?;
        Ok(Some(loaded.id))
    }
}

impl ClassStorage for LazyClasspathStorage<'_> {
    fn resolve_class(&mut self, arena: &mut EntityArena, name: &str) -> Result<Option<ClassId>> {
        if let Some(id) = self.primary.get(name) {
            return Ok(Some(id));
        }
        if let Some(id) = self.cache.get(name) {
            if arena.class(id).is_populated() {
                return Ok(Some(id));
            }
        }
        if self.misses.contains(name) {
            return Ok(None);
        }
        self.load(arena, name)
    }
}
