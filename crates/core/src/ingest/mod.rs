pub mod record;

use crate::diagnostics::{Anomaly, Diagnostics};
use crate::error::{JarscopeError, Result};
use crate::event::{
    ClassEvent, ClassHeader, FieldDecl, FieldOp, InsnEvent, MethodDecl, RecordComponentDecl,
};
use crate::model::{
    ClassId, EntityArena, FieldEntry, MethodEntry, MethodId, RECORD_BASE, RecordComponentEntry,
    member_key,
};
use crate::storage::ArchiveStorage;
use indexmap::IndexSet;
use record::{AccessorState, SelfScope};

/// How much of a class the decoder delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Structure and method bodies.
    Full,
    /// Structure only; used for classes pulled in from the classpath.
    MetadataOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct IngestedClass {
    pub id: ClassId,
    pub promoted_getters: usize,
}

/// Populates the entity model from one class's event stream.
#[derive(Debug, Clone)]
pub struct ClassIngestor {
    mode: IngestMode,
    non_obfuscated: bool,
}

impl ClassIngestor {
    pub fn new(mode: IngestMode) -> Self {
        Self {
            mode,
            non_obfuscated: false,
        }
    }

    /// Mark every member created by this ingestor as a known, intentional name.
    pub fn non_obfuscated(mut self, value: bool) -> Self {
        self.non_obfuscated = value;
        self
    }

    pub fn mode(&self) -> IngestMode {
        self.mode
    }

    pub fn ingest<I>(
        &self,
        arena: &mut EntityArena,
        storage: &mut ArchiveStorage,
        diagnostics: &mut Diagnostics,
        events: I,
    ) -> Result<IngestedClass>
    where
        I: IntoIterator<Item = ClassEvent>,
    {
        let mut visit = ClassVisit {
            ingestor: self,
            arena,
            storage,
            diagnostics,
            class: None,
            record_cursor: -3,
            method: None,
            promoted_getters: 0,
            finished: false,
        };

        for event in events {
            visit.on_event(event)?;
        }

        match (visit.class, visit.finished) {
            (Some(id), true) => Ok(IngestedClass {
                id,
                promoted_getters: visit.promoted_getters,
            }),
            (None, _) => Err(JarscopeError::EventStream(
                "stream ended without a class header".to_string(),
            )),
            (Some(id), false) => Err(JarscopeError::EventStream(format!(
                "stream for {} ended without an end event",
                visit.arena.class(id).name()
            ))),
        }
    }
}

struct MethodVisit {
    id: MethodId,
    /// Position in the accessor ordering window, if the method falls inside it.
    window_index: Option<usize>,
    state: AccessorState,
}

struct ClassVisit<'a> {
    ingestor: &'a ClassIngestor,
    arena: &'a mut EntityArena,
    storage: &'a mut ArchiveStorage,
    diagnostics: &'a mut Diagnostics,
    class: Option<ClassId>,
    /// Starts at -3 so that `toString`, `equals` and `hashCode` of a record move it to 0.
    record_cursor: i32,
    method: Option<MethodVisit>,
    promoted_getters: usize,
    finished: bool,
}

impl ClassVisit<'_> {
    fn on_event(&mut self, event: ClassEvent) -> Result<()> {
        if self.finished {
            return Err(JarscopeError::EventStream(format!(
                "{} event after end of class",
                event.kind()
            )));
        }
        match event {
            ClassEvent::Header(header) => self.visit_header(header),
            ClassEvent::RecordComponent(decl) => self.visit_record_component(decl),
            ClassEvent::Field(decl) => self.visit_field(decl),
            ClassEvent::MethodStart(decl) => self.visit_method(decl),
            ClassEvent::Insn(insn) => self.visit_insn(insn),
            ClassEvent::MethodEnd => self.visit_method_end(),
            ClassEvent::End => self.visit_end(),
        }
    }

    fn current_class(&self, what: &str) -> Result<ClassId> {
        if self.method.is_some() {
            return Err(JarscopeError::EventStream(format!(
                "{what} inside an open method"
            )));
        }
        self.class
            .ok_or_else(|| JarscopeError::EventStream(format!("{what} before class header")))
    }

    fn visit_header(&mut self, header: ClassHeader) -> Result<()> {
        if self.class.is_some() {
            return Err(JarscopeError::EventStream(format!(
                "second header for {}",
                header.name
            )));
        }
        let id = self.storage.get_or_create(self.arena, &header.name);
        self.arena.class_mut(id).populate(&header)?;
        self.class = Some(id);
        self.record_cursor = -3;
        Ok(())
    }

    fn visit_record_component(&mut self, decl: RecordComponentDecl) -> Result<()> {
        let class = self.current_class("record component")?;
        let key = member_key(&decl.name, &decl.descriptor);
        let component = self.arena.alloc_component(RecordComponentEntry {
            name: decl.name,
            descriptor: decl.descriptor,
            signature: decl.signature,
            non_obfuscated: self.ingestor.non_obfuscated,
        });
        self.arena
            .class_mut(class)
            .record_components
            .insert(key, component);
        Ok(())
    }

    fn visit_field(&mut self, decl: FieldDecl) -> Result<()> {
        let class = self.current_class("field")?;
        let key = member_key(&decl.name, &decl.descriptor);
        let record_component = self.arena.class(class).record_component(&key);
        let field = self.arena.alloc_field(FieldEntry {
            name: decl.name,
            descriptor: decl.descriptor,
            access: decl.access,
            signature: decl.signature,
            record_component,
            non_obfuscated: self.ingestor.non_obfuscated,
        });
        self.arena.class_mut(class).fields.insert(key, field);
        Ok(())
    }

    fn visit_method(&mut self, decl: MethodDecl) -> Result<()> {
        let class = self.current_class("method")?;
        let key = member_key(&decl.name, &decl.descriptor);
        let state = AccessorState::initial(&decl.descriptor);

        let window_index = if self.record_cursor >= 0 {
            let index = self.record_cursor as usize;
            self.record_cursor += 1;
            Some(index)
        } else {
            None
        };

        // advance after the index is taken
        if self.arena.class(class).super_name() == Some(RECORD_BASE) {
            let delegates = matches!(
                (decl.name.as_str(), decl.descriptor.as_str()),
                ("toString", "()Ljava/lang/String;")
                    | ("equals", "(Ljava/lang/Object;)Z")
                    | ("hashCode", "()I")
            );
            if delegates {
                self.record_cursor += 1;
            }
        }

        let id = self.arena.alloc_method(MethodEntry {
            name: decl.name,
            descriptor: decl.descriptor,
            access: decl.access,
            signature: decl.signature,
            record_component: None,
            referenced_self_fields: IndexSet::new(),
            non_obfuscated: self.ingestor.non_obfuscated,
        });
        self.arena.class_mut(class).methods.insert(key, id);
        self.method = Some(MethodVisit {
            id,
            window_index,
            state,
        });
        Ok(())
    }

    fn visit_insn(&mut self, insn: InsnEvent) -> Result<()> {
        let (Some(class), Some(method)) = (self.class, self.method.as_mut()) else {
            return Err(JarscopeError::EventStream(
                "instruction outside of a method".to_string(),
            ));
        };
        let entry = self.arena.class(class);

        let mut self_field = None;
        if let InsnEvent::FieldAccess {
            op: FieldOp::GetField,
            owner,
            name,
            descriptor,
        } = &insn
        {
            if owner == entry.name() {
                self_field = entry.field(&member_key(name, descriptor));
            }
        }

        let scope = SelfScope {
            class_name: entry.name(),
            components: &entry.record_components,
        };
        method.state = method.state.step(&insn, &scope);

        if let Some(field) = self_field {
            self.arena
                .method_mut(method.id)
                .referenced_self_fields
                .insert(field);
        }
        Ok(())
    }

    fn visit_method_end(&mut self) -> Result<()> {
        let Some(method) = self.method.take() else {
            return Err(JarscopeError::EventStream(
                "method end without an open method".to_string(),
            ));
        };
        let class = self.current_class("method end")?;
        let Some(component) = method.state.finish().matched() else {
            return Ok(());
        };

        let entry = self.arena.class(class);
        let class_name = entry.name().to_string();
        let method_key = self.arena.method(method.id).key();
        let found = self.arena.component(component).key();
        let window_len = entry.record_components.len();

        match method.window_index {
            Some(index) if index < window_len => {
                let expected = entry
                    .record_components
                    .get_index(index)
                    .map(|(_, &c)| c)
                    .filter(|&c| c != component)
                    .map(|c| self.arena.component(c).key());
                if let Some(expected) = expected {
                    self.diagnostics.report(Anomaly::SuspiciousRecordGetter {
                        class: class_name,
                        method: method_key,
                        expected: Some(expected),
                        found,
                    });
                }
                self.arena.method_mut(method.id).record_component = Some(component);
            }
            _ => {
                self.diagnostics.report(Anomaly::DemotedRecordGetter {
                    class: class_name,
                    method: method_key,
                });
            }
        }
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        let class = self.current_class("end")?;
        if self.ingestor.mode == IngestMode::Full
            && !self.arena.class(class).record_components.is_empty()
        {
            self.promoted_getters +=
                record::claim_unlinked_components(self.arena, class, self.diagnostics);
        }
        self.finished = true;
        Ok(())
    }
}
