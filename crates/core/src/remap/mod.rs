//! Optional renaming pass over a finished model.

mod signature;

use crate::error::{JarscopeError, Result};
use crate::model::EntityArena;
use crate::storage::ArchiveStorage;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Supplies new names for classes and members. Descriptor and signature rewriting is
/// derived from [`Remapper::map_class`].
pub trait Remapper {
    fn map_class(&self, internal_name: &str) -> String;

    fn map_field_name(&self, owner: &str, name: &str, descriptor: &str) -> String;

    fn map_method_name(&self, owner: &str, name: &str, descriptor: &str) -> String;

    fn map_record_component_name(&self, owner: &str, name: &str, descriptor: &str) -> String {
        self.map_field_name(owner, name, descriptor)
    }

    fn map_desc(&self, descriptor: &str) -> String {
        let mut out = String::with_capacity(descriptor.len());
        let mut rest = descriptor;
        while let Some(start) = rest.find('L') {
            out.push_str(&rest[..=start]);
            rest = &rest[start + 1..];
            let Some(end) = rest.find(';') else {
                out.push_str(rest);
                return out;
            };
            out.push_str(&self.map_class(&rest[..end]));
            out.push(';');
            rest = &rest[end + 1..];
        }
        out.push_str(rest);
        out
    }

    fn map_method_desc(&self, descriptor: &str) -> String {
        self.map_desc(descriptor)
    }

    /// Rewrite class references in a generic signature. Malformed input is returned as is.
    fn map_signature(&self, signature: &str) -> String {
        signature::remap_signature(self, signature).unwrap_or_else(|| signature.to_string())
    }
}

/// Map-backed remapper; anything not listed keeps its name.
#[derive(Debug, Default, Clone)]
pub struct SimpleRemapper {
    classes: HashMap<String, String>,
    fields: HashMap<(String, String, String), String>,
    methods: HashMap<(String, String, String), String>,
}

impl SimpleRemapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, old: &str, new: &str) -> Self {
        self.classes.insert(old.to_string(), new.to_string());
        self
    }

    pub fn field(mut self, owner: &str, name: &str, descriptor: &str, new: &str) -> Self {
        self.fields.insert(
            (owner.to_string(), name.to_string(), descriptor.to_string()),
            new.to_string(),
        );
        self
    }

    pub fn method(mut self, owner: &str, name: &str, descriptor: &str, new: &str) -> Self {
        self.methods.insert(
            (owner.to_string(), name.to_string(), descriptor.to_string()),
            new.to_string(),
        );
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.fields.len() + self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse tab-separated lines:
    ///
    /// ```text
    /// CLASS   a/a      net/example/Widget
    /// FIELD   a/a      b    I      size
    /// METHOD  a/a      c    ()V    reset
    /// ```
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn from_tsv(text: &str) -> Result<Self> {
        let mut remapper = Self::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim_end();
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let cols: Vec<&str> = line.split('\t').collect();
            let bad = |message: &str| JarscopeError::Mapping {
                line: index + 1,
                message: message.to_string(),
            };
            remapper = match cols.as_slice() {
                ["CLASS", old, new] => remapper.class(old, new),
                ["FIELD", owner, name, desc, new] => remapper.field(owner, name, desc, new),
                ["METHOD", owner, name, desc, new] => remapper.method(owner, name, desc, new),
                ["CLASS" | "FIELD" | "METHOD", ..] => return Err(bad("wrong column count")),
                _ => return Err(bad("unknown entry kind")),
            };
        }
        Ok(remapper)
    }
}

impl Remapper for SimpleRemapper {
    fn map_class(&self, internal_name: &str) -> String {
        self.classes
            .get(internal_name)
            .cloned()
            .unwrap_or_else(|| internal_name.to_string())
    }

    fn map_field_name(&self, owner: &str, name: &str, descriptor: &str) -> String {
        self.fields
            .get(&(owner.to_string(), name.to_string(), descriptor.to_string()))
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    fn map_method_name(&self, owner: &str, name: &str, descriptor: &str) -> String {
        self.methods
            .get(&(owner.to_string(), name.to_string(), descriptor.to_string()))
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

/// Rename every class of `storage` and its members in place, then re-key all tables.
///
/// A joined method entry is renamed once, through the first class (in storage order)
/// whose table holds it.
pub fn remap_model(
    arena: &mut EntityArena,
    storage: &mut ArchiveStorage,
    remapper: &dyn Remapper,
) {
    info!("Remapping {} classes...", storage.len());
    let classes: Vec<_> = storage.class_ids().collect();
    let mut renamed_methods = HashSet::new();

    for &class in &classes {
        let entry = arena.class(class);
        let owner = entry.name().to_string();
        let fields: Vec<_> = entry.fields.values().copied().collect();
        let methods: Vec<_> = entry.methods.values().copied().collect();
        let components: Vec<_> = entry.record_components.values().copied().collect();

        for id in fields {
            let field = arena.field_mut(id);
            field.name = remapper.map_field_name(&owner, &field.name, &field.descriptor);
            field.descriptor = remapper.map_desc(&field.descriptor);
            field.signature = field.signature.as_deref().map(|s| remapper.map_signature(s));
        }

        for id in methods {
            if !renamed_methods.insert(id) {
                continue;
            }
            let method = arena.method_mut(id);
            method.name = remapper.map_method_name(&owner, &method.name, &method.descriptor);
            method.descriptor = remapper.map_method_desc(&method.descriptor);
            method.signature = method.signature.as_deref().map(|s| remapper.map_signature(s));
        }

        for id in components {
            let component = arena.component_mut(id);
            component.name =
                remapper.map_record_component_name(&owner, &component.name, &component.descriptor);
            component.descriptor = remapper.map_desc(&component.descriptor);
            component.signature = component
                .signature
                .as_deref()
                .map(|s| remapper.map_signature(s));
        }

        let entry = arena.class_mut(class);
        entry.name = remapper.map_class(&owner);
        entry.super_name = entry.super_name.as_deref().map(|s| remapper.map_class(s));
        entry.interfaces = entry.interfaces.iter().map(|s| remapper.map_class(s)).collect();
        entry.signature = entry.signature.as_deref().map(|s| remapper.map_signature(s));
    }

    for &class in &classes {
        let fields: IndexMap<_, _> = arena
            .class(class)
            .fields
            .values()
            .map(|&id| (arena.field(id).key(), id))
            .collect();
        let methods: IndexMap<_, _> = arena
            .class(class)
            .methods
            .values()
            .map(|&id| (arena.method(id).key(), id))
            .collect();
        let components: IndexMap<_, _> = arena
            .class(class)
            .record_components
            .values()
            .map(|&id| (arena.component(id).key(), id))
            .collect();

        let entry = arena.class_mut(class);
        entry.fields = fields;
        entry.methods = methods;
        entry.record_components = components;
    }

    storage.rebuild_index(arena);
}
