//! Classfile bytes to [`ClassEvent`]s.

use jarscope_core::event::{
    ClassEvent, ClassHeader, FieldDecl, FieldOp, InsnEvent, MethodDecl, RecordComponentDecl,
    ValueKind,
};
use jarscope_core::ingest::IngestMode;
use jarscope_core::{JarscopeError, Result};
use ristretto_classfile::attributes::{Attribute, Instruction};
use ristretto_classfile::{ClassFile, Constant, ConstantPool};
use std::io::Cursor;

/// Decode one class. `resource` only names the input in errors.
///
/// In [`IngestMode::MetadataOnly`] method bodies are skipped and every method is a bare
/// `MethodStart`/`MethodEnd` pair.
pub fn decode_class(bytes: Vec<u8>, resource: &str, mode: IngestMode) -> Result<Vec<ClassEvent>> {
    let class = ClassFile::from_bytes(&mut Cursor::new(bytes)).map_err(|e| {
        JarscopeError::ClassFile {
            resource: resource.to_string(),
            message: format!("{e:?}"),
        }
    })?;
    Decoder {
        pool: &class.constant_pool,
        resource,
    }
    .events(&class, mode)
}

struct Decoder<'a> {
    pool: &'a ConstantPool,
    resource: &'a str,
}

impl Decoder<'_> {
    fn events(&self, class: &ClassFile, mode: IngestMode) -> Result<Vec<ClassEvent>> {
        let mut events = Vec::new();

        let super_name = match class.super_class {
            0 => None,
            index => Some(self.class_name(index)?),
        };
        let interfaces = class
            .interfaces
            .iter()
            .map(|&index| self.class_name(index))
            .collect::<Result<Vec<_>>>()?;
        events.push(ClassEvent::Header(ClassHeader {
            access: class.access_flags.bits(),
            name: self.class_name(class.this_class)?,
            signature: self.signature(&class.attributes)?,
            super_name,
            interfaces,
        }));

        for attribute in &class.attributes {
            if let Attribute::Record { records, .. } = attribute {
                for record in records {
                    events.push(ClassEvent::RecordComponent(RecordComponentDecl {
                        name: self.utf8(record.name_index)?,
                        descriptor: self.utf8(record.descriptor_index)?,
                        signature: self.signature(&record.attributes)?,
                    }));
                }
            }
        }

        for field in &class.fields {
            events.push(ClassEvent::Field(FieldDecl {
                access: field.access_flags.bits(),
                name: self.utf8(field.name_index)?,
                descriptor: self.utf8(field.descriptor_index)?,
                signature: self.signature(&field.attributes)?,
            }));
        }

        for method in &class.methods {
            events.push(ClassEvent::MethodStart(MethodDecl {
                access: method.access_flags.bits(),
                name: self.utf8(method.name_index)?,
                descriptor: self.utf8(method.descriptor_index)?,
                signature: self.signature(&method.attributes)?,
            }));
            if mode == IngestMode::Full {
                for attribute in &method.attributes {
                    if let Attribute::Code {
                        code,
                        exception_table,
                        ..
                    } = attribute
                    {
                        events.push(ClassEvent::Insn(InsnEvent::Code));
                        events.extend(
                            exception_table
                                .iter()
                                .map(|_| ClassEvent::Insn(InsnEvent::TryCatch)),
                        );
                        for instruction in code {
                            events.push(ClassEvent::Insn(self.instruction(instruction)?));
                        }
                    }
                }
            }
            events.push(ClassEvent::MethodEnd);
        }

        events.push(ClassEvent::End);
        Ok(events)
    }

    fn instruction(&self, instruction: &Instruction) -> Result<InsnEvent> {
        use ValueKind::*;

        let load = |kind, slot| InsnEvent::LoadLocal { kind, slot };
        let event = match instruction {
            Instruction::Aload_0 => load(Reference, 0),
            Instruction::Aload_1 => load(Reference, 1),
            Instruction::Aload_2 => load(Reference, 2),
            Instruction::Aload_3 => load(Reference, 3),
            Instruction::Aload(slot) => load(Reference, u16::from(*slot)),
            Instruction::Aload_w(slot) => load(Reference, *slot),
            Instruction::Iload_0 => load(Int, 0),
            Instruction::Iload_1 => load(Int, 1),
            Instruction::Iload_2 => load(Int, 2),
            Instruction::Iload_3 => load(Int, 3),
            Instruction::Iload(slot) => load(Int, u16::from(*slot)),
            Instruction::Iload_w(slot) => load(Int, *slot),
            Instruction::Lload_0 => load(Long, 0),
            Instruction::Lload_1 => load(Long, 1),
            Instruction::Lload_2 => load(Long, 2),
            Instruction::Lload_3 => load(Long, 3),
            Instruction::Lload(slot) => load(Long, u16::from(*slot)),
            Instruction::Lload_w(slot) => load(Long, *slot),
            Instruction::Fload_0 => load(Float, 0),
            Instruction::Fload_1 => load(Float, 1),
            Instruction::Fload_2 => load(Float, 2),
            Instruction::Fload_3 => load(Float, 3),
            Instruction::Fload(slot) => load(Float, u16::from(*slot)),
            Instruction::Fload_w(slot) => load(Float, *slot),
            Instruction::Dload_0 => load(Double, 0),
            Instruction::Dload_1 => load(Double, 1),
            Instruction::Dload_2 => load(Double, 2),
            Instruction::Dload_3 => load(Double, 3),
            Instruction::Dload(slot) => load(Double, u16::from(*slot)),
            Instruction::Dload_w(slot) => load(Double, *slot),
            Instruction::Getfield(index) => self.field_access(FieldOp::GetField, *index)?,
            Instruction::Putfield(index) => self.field_access(FieldOp::PutField, *index)?,
            Instruction::Getstatic(index) => self.field_access(FieldOp::GetStatic, *index)?,
            Instruction::Putstatic(index) => self.field_access(FieldOp::PutStatic, *index)?,
            Instruction::Ireturn => InsnEvent::Return(Some(Int)),
            Instruction::Lreturn => InsnEvent::Return(Some(Long)),
            Instruction::Freturn => InsnEvent::Return(Some(Float)),
            Instruction::Dreturn => InsnEvent::Return(Some(Double)),
            Instruction::Areturn => InsnEvent::Return(Some(Reference)),
            Instruction::Return => InsnEvent::Return(None),
            _ => InsnEvent::Other,
        };
        Ok(event)
    }

    fn field_access(&self, op: FieldOp, index: u16) -> Result<InsnEvent> {
        let Some(Constant::FieldRef {
            class_index,
            name_and_type_index,
        }) = self.pool.get(index)
        else {
            return Err(self.malformed(format!("constant #{index} is not a field reference")));
        };
        let Some(Constant::NameAndType {
            name_index,
            descriptor_index,
        }) = self.pool.get(*name_and_type_index)
        else {
            return Err(self.malformed(format!(
                "constant #{name_and_type_index} is not a name-and-type"
            )));
        };
        Ok(InsnEvent::FieldAccess {
            op,
            owner: self.class_name(*class_index)?,
            name: self.utf8(*name_index)?,
            descriptor: self.utf8(*descriptor_index)?,
        })
    }

    fn signature(&self, attributes: &[Attribute]) -> Result<Option<String>> {
        for attribute in attributes {
            if let Attribute::Signature {
                signature_index, ..
            } = attribute
            {
                return self.utf8(*signature_index).map(Some);
            }
        }
        Ok(None)
    }

    fn class_name(&self, index: u16) -> Result<String> {
        match self.pool.get(index) {
            Some(Constant::Class(name_index)) => self.utf8(*name_index),
            _ => Err(self.malformed(format!("constant #{index} is not a class"))),
        }
    }

    fn utf8(&self, index: u16) -> Result<String> {
        self.pool
            .try_get_utf8(index)
            .map(|s| s.to_string())
            .map_err(|e| self.malformed(format!("{e:?}")))
    }

    fn malformed(&self, message: String) -> JarscopeError {
        JarscopeError::ClassFile {
            resource: self.resource.to_string(),
            message,
        }
    }
}
