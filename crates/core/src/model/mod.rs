pub mod arena;
pub mod descriptor;

pub use arena::EntityArena;

use crate::error::{JarscopeError, Result};
use crate::event::ClassHeader;
use crate::storage::ArchiveStorage;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

entity_id!(
    /// Handle of a class slot in the [`EntityArena`].
    ClassId
);
entity_id!(FieldId);
entity_id!(
    /// Handle of a method slot. Joined methods share one handle across classes.
    MethodId
);
entity_id!(ComponentId);

/// JVM access flag bits used by the analysis.
pub mod access {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const BRIDGE: u16 = 0x0040;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const SYNTHETIC: u16 = 0x1000;
}

pub const RECORD_BASE: &str = "java/lang/Record";

/// `name + descriptor`, the identity of a field, method or record component inside its class.
pub fn member_key(name: &str, descriptor: &str) -> String {
    let mut key = String::with_capacity(name.len() + descriptor.len());
    key.push_str(name);
    key.push_str(descriptor);
    key
}

#[derive(Debug, Clone)]
pub struct ClassEntry {
    pub(crate) name: String,
    pub(crate) access: u16,
    pub(crate) signature: Option<String>,
    pub(crate) super_name: Option<String>,
    pub(crate) interfaces: Vec<String>,
    pub(crate) populated: bool,
    pub(crate) fields: IndexMap<String, FieldId>,
    pub(crate) methods: IndexMap<String, MethodId>,
    pub(crate) record_components: IndexMap<String, ComponentId>,
    pub(crate) parents_resolved: bool,
    pub(crate) superclass: Option<ClassId>,
    pub(crate) interface_ids: Vec<ClassId>,
    pub(crate) subclasses: Vec<ClassId>,
    pub(crate) implementers: Vec<ClassId>,
}

impl ClassEntry {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access: 0,
            signature: None,
            super_name: None,
            interfaces: Vec::new(),
            populated: false,
            fields: IndexMap::new(),
            methods: IndexMap::new(),
            record_components: IndexMap::new(),
            parents_resolved: false,
            superclass: None,
            interface_ids: Vec::new(),
            subclasses: Vec::new(),
            implementers: Vec::new(),
        }
    }

    /// Fill in the header metadata. A class is populated exactly once.
    pub(crate) fn populate(&mut self, header: &ClassHeader) -> Result<()> {
        if self.populated {
            return Err(JarscopeError::AlreadyPopulated(self.name.clone()));
        }
        self.access = header.access;
        self.signature = header.signature.clone();
        self.super_name = header.super_name.clone();
        self.interfaces.clear();
        for itf in &header.interfaces {
            if !self.interfaces.contains(itf) {
                self.interfaces.push(itf.clone());
            }
        }
        self.populated = true;
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access(&self) -> u16 {
        self.access
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn super_name(&self) -> Option<&str> {
        self.super_name.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn is_interface(&self) -> bool {
        self.access & access::INTERFACE != 0
    }

    pub fn is_record(&self) -> bool {
        self.super_name.as_deref() == Some(RECORD_BASE)
    }

    pub fn field(&self, key: &str) -> Option<FieldId> {
        self.fields.get(key).copied()
    }

    pub fn method(&self, key: &str) -> Option<MethodId> {
        self.methods.get(key).copied()
    }

    pub fn record_component(&self, key: &str) -> Option<ComponentId> {
        self.record_components.get(key).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldId)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn methods(&self) -> impl Iterator<Item = (&str, MethodId)> + '_ {
        self.methods.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Record components in declaration order.
    pub fn record_components(&self) -> impl Iterator<Item = (&str, ComponentId)> + '_ {
        self.record_components.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn superclass(&self) -> Option<ClassId> {
        self.superclass
    }

    pub fn interface_ids(&self) -> &[ClassId] {
        &self.interface_ids
    }

    pub fn subclasses(&self) -> &[ClassId] {
        &self.subclasses
    }

    pub fn implementers(&self) -> &[ClassId] {
        &self.implementers
    }

    pub fn parents_resolved(&self) -> bool {
        self.parents_resolved
    }

    /// Parents first (superclass, interfaces), then children (subclasses, implementers).
    pub fn hierarchy_neighbors(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.superclass
            .iter()
            .chain(self.interface_ids.iter())
            .chain(self.subclasses.iter())
            .chain(self.implementers.iter())
            .copied()
    }

    pub(crate) fn add_subclass(&mut self, child: ClassId) {
        if !self.subclasses.contains(&child) {
            self.subclasses.push(child);
        }
    }

    pub(crate) fn add_implementer(&mut self, child: ClassId) {
        if !self.implementers.contains(&child) {
            self.implementers.push(child);
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldEntry {
    pub name: String,
    pub descriptor: String,
    pub access: u16,
    pub signature: Option<String>,
    pub record_component: Option<ComponentId>,
    pub non_obfuscated: bool,
}

impl FieldEntry {
    pub fn key(&self) -> String {
        member_key(&self.name, &self.descriptor)
    }
}

#[derive(Debug, Clone)]
pub struct MethodEntry {
    pub name: String,
    pub descriptor: String,
    pub access: u16,
    pub signature: Option<String>,
    pub record_component: Option<ComponentId>,
    /// Fields of the declaring class read through `getfield` on that class.
    pub referenced_self_fields: IndexSet<FieldId>,
    pub non_obfuscated: bool,
}

impl MethodEntry {
    pub fn key(&self) -> String {
        member_key(&self.name, &self.descriptor)
    }

    /// Whether the method participates in virtual dispatch and can override or be overridden.
    pub fn is_virtual(&self) -> bool {
        self.access & (access::PRIVATE | access::STATIC) == 0
            && self.name != "<init>"
            && self.name != "<clinit>"
    }
}

#[derive(Debug, Clone)]
pub struct RecordComponentEntry {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub non_obfuscated: bool,
}

impl RecordComponentEntry {
    pub fn key(&self) -> String {
        member_key(&self.name, &self.descriptor)
    }
}

/// The finished model: every entity plus the two name indexes that own them.
#[derive(Debug, Default)]
pub struct JarModel {
    pub arena: EntityArena,
    /// Classes read from the primary archive.
    pub classes: ArchiveStorage,
    /// Classes pulled in from the auxiliary classpath.
    pub classpath: ArchiveStorage,
}

impl JarModel {
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.classes.get(name).or_else(|| self.classpath.get(name))
    }

    pub fn class(&self, name: &str) -> Option<&ClassEntry> {
        self.class_id(name).map(|id| self.arena.class(id))
    }

    /// Method entry declared in `class` itself, without walking the hierarchy.
    pub fn declared_method(&self, class: &str, key: &str) -> Option<&MethodEntry> {
        let id = self.class(class)?.method(key)?;
        Some(self.arena.method(id))
    }

    /// Method visible from `class`, inherited entries included.
    pub fn resolve_method(&self, class: &str, key: &str) -> Option<MethodId> {
        crate::hierarchy::resolve_method(&self.arena, self.class_id(class)?, key)
    }
}
