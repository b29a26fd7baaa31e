//! Inheritance links and the connected components they form.

pub mod join;

pub use join::{JoinStats, join_method_entries};

use crate::error::Result;
use crate::model::{ClassId, EntityArena, MethodId};
use crate::storage::ClassStorage;
use indexmap::IndexSet;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Resolve the superclass and interface edges of `class` and register it as a child of
/// every parent found. Missing parents leave the edge unresolved. Runs once per class.
pub fn populate_parents(
    arena: &mut EntityArena,
    storage: &mut dyn ClassStorage,
    class: ClassId,
) -> Result<()> {
    let entry = arena.class_mut(class);
    if entry.parents_resolved {
        return Ok(());
    }
    entry.parents_resolved = true;
    let super_name = entry.super_name.clone();
    let interfaces = entry.interfaces.clone();

    if let Some(super_name) = super_name {
        match storage.resolve_class(arena, &super_name)? {
            Some(parent) => {
                arena.class_mut(class).superclass = Some(parent);
                arena.class_mut(parent).add_subclass(class);
            }
            None => debug!("superclass {} of {:?} left unresolved", super_name, class),
        }
    }

    for name in interfaces {
        if let Some(parent) = storage.resolve_class(arena, &name)? {
            let entry = arena.class_mut(class);
            if !entry.interface_ids.contains(&parent) {
                entry.interface_ids.push(parent);
            }
            arena.class_mut(parent).add_implementer(class);
        }
    }
    Ok(())
}

/// Every class reachable from a seed through superclass, subclass, interface and
/// implementer edges. Membership is in discovery order.
#[derive(Debug, Clone)]
pub struct ClassPropagationTree {
    classes: IndexSet<ClassId>,
}

impl ClassPropagationTree {
    pub fn build(
        arena: &mut EntityArena,
        storage: &mut dyn ClassStorage,
        seed: ClassId,
    ) -> Result<Self> {
        let mut classes = IndexSet::new();
        let mut queue = VecDeque::new();
        classes.insert(seed);
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            populate_parents(arena, storage, current)?;
            let neighbors: Vec<ClassId> = arena.class(current).hierarchy_neighbors().collect();
            for next in neighbors {
                if classes.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        Ok(Self { classes })
    }

    pub fn classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.classes.iter().copied()
    }

    /// True when the seed has no resolved hierarchy neighbours.
    pub fn is_singleton(&self) -> bool {
        self.classes.len() == 1
    }
}

fn declares_virtual(arena: &EntityArena, class: ClassId, key: &str) -> bool {
    arena
        .class(class)
        .method(key)
        .is_some_and(|m| arena.method(m).is_virtual())
}

/// Add `class` and its ancestors that declare `key` as a virtual method.
fn collect_sources(
    arena: &EntityArena,
    class: ClassId,
    key: &str,
    visited: &mut HashSet<ClassId>,
    found: &mut IndexSet<ClassId>,
) {
    if !visited.insert(class) {
        return;
    }
    if declares_virtual(arena, class, key) {
        found.insert(class);
    }
    let entry = arena.class(class);
    for parent in entry.superclass().iter().chain(entry.interface_ids()) {
        collect_sources(arena, *parent, key, visited, found);
    }
}

/// Classes whose declaration of `key` is override-compatible with the one in `class`:
/// ancestors declaring it, descendants redeclaring it, and transitively the declaring
/// ancestors of every descendant. Non-virtual methods only match themselves.
pub fn matching_entries(arena: &EntityArena, class: ClassId, key: &str) -> Vec<ClassId> {
    let Some(method) = arena.class(class).method(key) else {
        return Vec::new();
    };
    if !arena.method(method).is_virtual() {
        return vec![class];
    }

    let mut visited_up = HashSet::new();
    let mut found = IndexSet::new();
    collect_sources(arena, class, key, &mut visited_up, &mut found);

    let mut visited_down = HashSet::new();
    let mut cursor = 0;
    while cursor < found.len() {
        let origin = found[cursor];
        cursor += 1;

        let mut stack: Vec<ClassId> = children_of(arena, origin);
        while let Some(child) = stack.pop() {
            if !visited_down.insert(child) {
                continue;
            }
            // a non-declaring child may still inherit an implementation from another parent
            collect_sources(arena, child, key, &mut visited_up, &mut found);
            stack.extend(children_of(arena, child));
        }
    }
    found.into_iter().collect()
}

fn children_of(arena: &EntityArena, class: ClassId) -> Vec<ClassId> {
    let entry = arena.class(class);
    let mut children: Vec<ClassId> = entry
        .subclasses()
        .iter()
        .chain(entry.implementers())
        .copied()
        .collect();
    // popped from the back; keep first-registered children first
    children.reverse();
    children
}

/// The method `class` sees under `key`: its own slot, else the nearest superclass slot,
/// else the first interface slot found breadth-first.
pub fn resolve_method(arena: &EntityArena, class: ClassId, key: &str) -> Option<MethodId> {
    let mut current = Some(class);
    while let Some(id) = current {
        if let Some(method) = arena.class(id).method(key) {
            return Some(method);
        }
        current = arena.class(id).superclass();
    }

    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    let mut current = Some(class);
    while let Some(id) = current {
        queue.extend(arena.class(id).interface_ids().iter().copied());
        current = arena.class(id).superclass();
    }
    while let Some(itf) = queue.pop_front() {
        if !seen.insert(itf) {
            continue;
        }
        if let Some(method) = arena.class(itf).method(key) {
            return Some(method);
        }
        queue.extend(arena.class(itf).interface_ids().iter().copied());
    }
    None
}
