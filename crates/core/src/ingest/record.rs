//! Recognition of record accessor methods.
//!
//! The exact getter shape is `aload_0; getfield <own component field>; <x>return` and
//! nothing else. Any other event forces [`AccessorState::Fail`], which is absorbing.

use crate::diagnostics::{Anomaly, Diagnostics};
use crate::event::{FieldOp, InsnEvent, ValueKind};
use crate::model::descriptor::{return_descriptor, takes_no_args};
use crate::model::{ClassId, ComponentId, EntityArena, access, member_key};
use indexmap::{IndexMap, IndexSet};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorState {
    NotStarted,
    Init,
    LoadedThis,
    ReadSelfField(ComponentId),
    ReturnSeen(ComponentId),
    Success(ComponentId),
    Fail,
}

/// What the matcher may know about the enclosing class.
pub struct SelfScope<'a> {
    pub class_name: &'a str,
    pub components: &'a IndexMap<String, ComponentId>,
}

impl AccessorState {
    /// Methods taking arguments can never be accessors.
    pub fn initial(descriptor: &str) -> Self {
        if takes_no_args(descriptor) {
            AccessorState::NotStarted
        } else {
            AccessorState::Fail
        }
    }

    pub fn step(self, insn: &InsnEvent, scope: &SelfScope<'_>) -> Self {
        use AccessorState::*;

        match (self, insn) {
            (NotStarted, InsnEvent::Code) => Init,
            (
                Init,
                InsnEvent::LoadLocal {
                    kind: ValueKind::Reference,
                    slot: 0,
                },
            ) => LoadedThis,
            (
                LoadedThis,
                InsnEvent::FieldAccess {
                    op: FieldOp::GetField,
                    owner,
                    name,
                    descriptor,
                },
            ) if owner == scope.class_name => scope
                .components
                .get(&member_key(name, descriptor))
                .map_or(Fail, |&component| ReadSelfField(component)),
            (ReadSelfField(component), InsnEvent::Return(Some(_))) => ReturnSeen(component),
            _ => Fail,
        }
    }

    /// Close the method body.
    pub fn finish(self) -> Self {
        match self {
            AccessorState::ReturnSeen(component) => AccessorState::Success(component),
            AccessorState::Success(component) => AccessorState::Success(component),
            _ => AccessorState::Fail,
        }
    }

    pub fn matched(self) -> Option<ComponentId> {
        match self {
            AccessorState::Success(component) => Some(component),
            _ => None,
        }
    }
}

/// Claim components left without an accessor after the pattern pass, using the set of
/// own fields each method reads. Returns the number of promoted getters.
pub(crate) fn claim_unlinked_components(
    arena: &mut EntityArena,
    class: ClassId,
    diagnostics: &mut Diagnostics,
) -> usize {
    let entry = arena.class(class);
    let class_name = entry.name().to_string();
    let methods: Vec<_> = entry.methods.values().copied().collect();
    let mut unclaimed: IndexSet<ComponentId> = entry.record_components.values().copied().collect();

    for &method in &methods {
        if let Some(component) = arena.method(method).record_component {
            if !unclaimed.shift_remove(&component) {
                diagnostics.report(Anomaly::DuplicateRecordClaim {
                    class: class_name.clone(),
                    component: arena.component(component).key(),
                });
            }
        }
    }

    let mut promoted = 0;
    let mut remaining = Vec::new();
    for component in unclaimed {
        let key = arena.component(component).key();
        let Some(field) = arena.class(class).field(&key) else {
            diagnostics.report(Anomaly::DanglingRecordComponent {
                class: class_name.clone(),
                component: key.clone(),
            });
            remaining.push(key);
            continue;
        };

        let descriptor = arena.component(component).descriptor.clone();
        let getter = methods.iter().copied().find(|&method| {
            let m = arena.method(method);
            let flags = m.access;
            m.record_component.is_none()
                && takes_no_args(&m.descriptor)
                && return_descriptor(&m.descriptor) == Some(descriptor.as_str())
                && (flags == access::PUBLIC || flags == access::PUBLIC | access::FINAL)
                && m.referenced_self_fields.contains(&field)
        });

        match getter {
            Some(method) => {
                info!(
                    "Promoting {};{} as record getter for {}",
                    class_name,
                    arena.method(method).key(),
                    key
                );
                arena.method_mut(method).record_component = Some(component);
                promoted += 1;
            }
            None => remaining.push(key),
        }
    }

    if !remaining.is_empty() {
        diagnostics.report(Anomaly::UnclaimedRecordComponents {
            class: class_name,
            components: remaining,
        });
    }
    promoted
}
