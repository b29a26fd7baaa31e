use super::{
    ClassEntry, ClassId, ComponentId, FieldEntry, FieldId, MethodEntry, MethodId,
    RecordComponentEntry,
};

/// Backing store for every entity of a run. Entries are never removed; tables in
/// [`ClassEntry`] refer to them through handles, so two classes can point at one method.
#[derive(Debug, Default)]
pub struct EntityArena {
    classes: Vec<ClassEntry>,
    fields: Vec<FieldEntry>,
    methods: Vec<MethodEntry>,
    components: Vec<RecordComponentEntry>,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc_class(&mut self, name: &str) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassEntry::new(name));
        id
    }

    pub(crate) fn alloc_field(&mut self, field: FieldEntry) -> FieldId {
        let id = FieldId(self.fields.len() as u32);
        self.fields.push(field);
        id
    }

    pub(crate) fn alloc_method(&mut self, method: MethodEntry) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(method);
        id
    }

    pub(crate) fn alloc_component(&mut self, component: RecordComponentEntry) -> ComponentId {
        let id = ComponentId(self.components.len() as u32);
        self.components.push(component);
        id
    }

    pub fn class(&self, id: ClassId) -> &ClassEntry {
        &self.classes[id.index()]
    }

    pub(crate) fn class_mut(&mut self, id: ClassId) -> &mut ClassEntry {
        &mut self.classes[id.index()]
    }

    pub fn field(&self, id: FieldId) -> &FieldEntry {
        &self.fields[id.index()]
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut FieldEntry {
        &mut self.fields[id.index()]
    }

    pub fn method(&self, id: MethodId) -> &MethodEntry {
        &self.methods[id.index()]
    }

    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodEntry {
        &mut self.methods[id.index()]
    }

    pub fn component(&self, id: ComponentId) -> &RecordComponentEntry {
        &self.components[id.index()]
    }

    pub fn component_mut(&mut self, id: ComponentId) -> &mut RecordComponentEntry {
        &mut self.components[id.index()]
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Method slot `key` of `class`, as currently installed in its table.
    pub fn class_method(&self, class: ClassId, key: &str) -> Option<MethodId> {
        self.class(class).method(key)
    }

    /// Point `class`'s table slot for `key` at `method`.
    pub(crate) fn install_method(&mut self, class: ClassId, key: &str, method: MethodId) {
        if let Some(slot) = self.class_mut(class).methods.get_mut(key) {
            *slot = method;
        }
    }
}
