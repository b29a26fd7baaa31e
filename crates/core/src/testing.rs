//! Event-stream fixtures for unit tests.

use crate::diagnostics::Diagnostics;
use crate::event::{ClassEvent, ClassHeader, FieldDecl, MethodDecl, RecordComponentDecl};
use crate::hierarchy::populate_parents;
use crate::ingest::{ClassIngestor, IngestMode};
use crate::model::{EntityArena, MethodId, RECORD_BASE, access, member_key};
use crate::storage::ArchiveStorage;
use std::collections::HashMap;

pub struct ClassSpec {
    header: ClassHeader,
    components: Vec<(String, String)>,
    methods: Vec<(u16, String, String)>,
}

impl ClassSpec {
    pub fn new(name: &str) -> Self {
        Self {
            header: ClassHeader {
                access: access::PUBLIC,
                name: name.to_string(),
                signature: None,
                super_name: Some("java/lang/Object".to_string()),
                interfaces: Vec::new(),
            },
            components: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// A record with one private final field per component.
    pub fn record(name: &str, components: &[(&str, &str)]) -> Self {
        let mut spec = Self::new(name).extends(RECORD_BASE);
        spec.components = components
            .iter()
            .map(|(n, d)| (n.to_string(), d.to_string()))
            .collect();
        spec
    }

    pub fn extends(mut self, super_name: &str) -> Self {
        self.header.super_name = Some(super_name.to_string());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.header.interfaces.push(interface.to_string());
        self
    }

    pub fn interface(mut self) -> Self {
        self.header.access |= access::INTERFACE | access::ABSTRACT;
        self
    }

    pub fn method(self, name: &str, descriptor: &str) -> Self {
        self.method_with_access(name, descriptor, access::PUBLIC)
    }

    pub fn method_with_access(mut self, name: &str, descriptor: &str, flags: u16) -> Self {
        self.methods
            .push((flags, name.to_string(), descriptor.to_string()));
        self
    }

    pub fn events(&self) -> Vec<ClassEvent> {
        let mut events = vec![ClassEvent::Header(self.header.clone())];
        for (name, descriptor) in &self.components {
            events.push(ClassEvent::RecordComponent(RecordComponentDecl {
                name: name.clone(),
                descriptor: descriptor.clone(),
                signature: None,
            }));
        }
        for (name, descriptor) in &self.components {
            events.push(ClassEvent::Field(FieldDecl {
                access: access::PRIVATE | access::FINAL,
                name: name.clone(),
                descriptor: descriptor.clone(),
                signature: None,
            }));
        }
        for (flags, name, descriptor) in &self.methods {
            events.push(ClassEvent::MethodStart(MethodDecl {
                access: *flags,
                name: name.clone(),
                descriptor: descriptor.clone(),
                signature: None,
            }));
            events.push(ClassEvent::MethodEnd);
        }
        events.push(ClassEvent::End);
        events
    }

    /// Ingest every spec in order in metadata-only mode.
    pub fn model(specs: Vec<ClassSpec>) -> TestModel {
        let mut model = TestModel {
            arena: EntityArena::new(),
            classes: ArchiveStorage::new(),
            diagnostics: Diagnostics::new(),
            originals: HashMap::new(),
        };
        let ingestor = ClassIngestor::new(IngestMode::MetadataOnly);
        for spec in specs {
            let class = ingestor
                .ingest(
                    &mut model.arena,
                    &mut model.classes,
                    &mut model.diagnostics,
                    spec.events(),
                )
                .unwrap()
                .id;
            for (_, name, descriptor) in &spec.methods {
                let key = member_key(name, descriptor);
                let id = model.arena.class_method(class, &key).unwrap();
                model
                    .originals
                    .insert((spec.header.name.clone(), key), id);
            }
        }
        model
    }
}

pub struct TestModel {
    pub arena: EntityArena,
    pub classes: ArchiveStorage,
    pub diagnostics: Diagnostics,
    originals: HashMap<(String, String), MethodId>,
}

impl TestModel {
    pub fn link_all(&mut self) {
        let mut lookup = self.classes.clone();
        let ids: Vec<_> = self.classes.class_ids().collect();
        for id in ids {
            populate_parents(&mut self.arena, &mut lookup, id).unwrap();
        }
    }

    /// The entry a class declared at ingestion, before any joining.
    pub fn original_method(&self, class: &str, key: &str) -> MethodId {
        self.originals[&(class.to_string(), key.to_string())]
    }
}
