use crate::error::Result;
use crate::model::{ClassId, EntityArena};
use indexmap::IndexMap;

/// Lookup of classes by internal name (`java/lang/Object`).
///
/// Implemented by the primary archive index and by the lazy classpath resolver; the
/// hierarchy code only ever asks for a name and treats `None` as a terminal edge.
pub trait ClassStorage {
    fn resolve_class(&mut self, arena: &mut EntityArena, name: &str) -> Result<Option<ClassId>>;
}

/// Name index over the classes one source owns, in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct ArchiveStorage {
    classes: IndexMap<String, ClassId>,
}

impl ArchiveStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<ClassId> {
        self.classes.get(name).copied()
    }

    pub fn get_or_create(&mut self, arena: &mut EntityArena, name: &str) -> ClassId {
        if let Some(id) = self.classes.get(name) {
            return *id;
        }
        let id = arena.alloc_class(name);
        self.classes.insert(name.to_string(), id);
        id
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes.values().copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Re-key the index after classes were renamed in place.
    pub(crate) fn rebuild_index(&mut self, arena: &EntityArena) {
        self.classes = self
            .classes
            .values()
            .map(|&id| (arena.class(id).name().to_string(), id))
            .collect();
    }
}

impl ClassStorage for ArchiveStorage {
    fn resolve_class(&mut self, _arena: &mut EntityArena, name: &str) -> Result<Option<ClassId>> {
        Ok(self.get(name))
    }
}
