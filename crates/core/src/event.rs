//! Flat event stream produced by a classfile decoder and consumed by the ingestor.
//!
//! A class is described as `Header`, then record components, fields and methods in
//! declaration order, then `End`. Every method is bracketed by `MethodStart` and
//! `MethodEnd`; in full mode its body arrives as `Insn` events between the two.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub access: u16,
    pub name: String,
    pub signature: Option<String>,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordComponentDecl {
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Long,
    Float,
    Double,
    Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    GetField,
    PutField,
    GetStatic,
    PutStatic,
}

/// One step of a method body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsnEvent {
    /// The body begins.
    Code,
    /// One exception handler range.
    TryCatch,
    LoadLocal {
        kind: ValueKind,
        slot: u16,
    },
    FieldAccess {
        op: FieldOp,
        owner: String,
        name: String,
        descriptor: String,
    },
    /// `None` for a `void` return.
    Return(Option<ValueKind>),
    /// Any other instruction.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassEvent {
    Header(ClassHeader),
    RecordComponent(RecordComponentDecl),
    Field(FieldDecl),
    MethodStart(MethodDecl),
    Insn(InsnEvent),
    MethodEnd,
    End,
}

impl ClassEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ClassEvent::Header(_) => "header",
            ClassEvent::RecordComponent(_) => "record-component",
            ClassEvent::Field(_) => "field",
            ClassEvent::MethodStart(_) => "method-start",
            ClassEvent::Insn(_) => "instruction",
            ClassEvent::MethodEnd => "method-end",
            ClassEvent::End => "end",
        }
    }
}
