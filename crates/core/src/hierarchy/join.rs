use super::{ClassPropagationTree, matching_entries};
use crate::error::Result;
use crate::model::{ClassId, EntityArena, MethodId};
use crate::storage::{ArchiveStorage, ClassStorage};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    /// Table slots redirected to a representative entry.
    pub joined_methods: usize,
    /// Entries whose non-obfuscated flag was switched on by a partner.
    pub propagated_flags: usize,
    /// Hierarchy components with more than one member.
    pub components: usize,
    pub traversed_classes: usize,
}

/// Unify method entries that stand for the same virtual method.
///
/// Components are visited in `primary` order. Inside one, every distinct method entry is
/// considered once; when its matching entries include a non-obfuscated one, the flag is
/// spread to all of them, otherwise every slot is pointed at the first-seen entry.
pub fn join_method_entries(
    arena: &mut EntityArena,
    primary: &ArchiveStorage,
    storage: &mut dyn ClassStorage,
) -> Result<JoinStats> {
    info!("Joining method entries...");
    let mut stats = JoinStats::default();
    let mut traversed: HashSet<ClassId> = HashSet::new();
    let mut checked: HashSet<MethodId> = HashSet::new();

    let seeds: Vec<ClassId> = primary.class_ids().collect();
    for seed in seeds {
        if traversed.contains(&seed) {
            continue;
        }

        let tree = ClassPropagationTree::build(arena, storage, seed)?;
        if tree.is_singleton() {
            traversed.insert(seed);
            continue;
        }
        stats.components += 1;

        for class in tree.classes() {
            let methods: Vec<(String, MethodId)> = arena
                .class(class)
                .methods()
                .map(|(key, id)| (key.to_string(), id))
                .collect();

            for (key, method) in methods {
                if !checked.insert(method) {
                    continue;
                }
                let matching = matching_entries(arena, class, &key);
                if matching.len() > 1 {
                    join_matching(arena, &matching, &key, method, &mut stats);
                }
            }
        }

        traversed.extend(tree.classes());
    }

    stats.traversed_classes = traversed.len();
    info!(
        "Joined {} method entries ({} flags propagated, {} classes).",
        stats.joined_methods, stats.propagated_flags, stats.traversed_classes
    );
    Ok(stats)
}

fn join_matching(
    arena: &mut EntityArena,
    matching: &[ClassId],
    key: &str,
    representative: MethodId,
    stats: &mut JoinStats,
) {
    let slots: Vec<(ClassId, MethodId)> = matching
        .iter()
        .filter_map(|&class| arena.class_method(class, key).map(|m| (class, m)))
        .collect();

    if slots.iter().any(|&(_, m)| arena.method(m).non_obfuscated) {
        for &(_, m) in &slots {
            let entry = arena.method_mut(m);
            if !entry.non_obfuscated {
                entry.non_obfuscated = true;
                stats.propagated_flags += 1;
            }
        }
        return;
    }

    for (class, m) in slots {
        if m == representative {
            continue;
        }
        debug!(
            "joining {};{} into {:?}",
            arena.class(class).name(),
            key,
            representative
        );
        arena.install_method(class, key, representative);
        if arena.method(representative).record_component.is_none() {
            let carried = arena.method(m).record_component;
            arena.method_mut(representative).record_component = carried;
        }
        stats.joined_methods += 1;
    }
}
