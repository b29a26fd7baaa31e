use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const PUBLIC: u16 = 0x0001;
pub const PRIVATE: u16 = 0x0002;
pub const FINAL: u16 = 0x0010;
pub const ABSTRACT: u16 = 0x0400;

/// Bytecode the builder knows how to assemble.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Op {
    Nop,
    AconstNull,
    Iconst0,
    Aload0,
    /// `wide aload <slot>`
    AloadWide(u16),
    GetField(&'static str, &'static str, &'static str),
    Ireturn,
    Areturn,
    Return,
}

struct MethodSpec {
    access: u16,
    name: String,
    descriptor: String,
    code: Option<Vec<Op>>,
}

/// Assembles a minimal but well-formed Java 17 classfile.
pub struct ClassBuilder {
    access: u16,
    name: String,
    super_name: Option<String>,
    interfaces: Vec<String>,
    components: Vec<(String, String)>,
    fields: Vec<(u16, String, String)>,
    methods: Vec<MethodSpec>,
    pool: Vec<u8>,
    pool_count: u16,
    pool_index: HashMap<String, u16>,
}

#[allow(dead_code)]
impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            access: PUBLIC,
            name: name.to_string(),
            super_name: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            components: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            pool: Vec::new(),
            pool_count: 1,
            pool_index: HashMap::new(),
        }
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn extends(mut self, super_name: &str) -> Self {
        self.super_name = Some(super_name.to_string());
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn component(mut self, name: &str, descriptor: &str) -> Self {
        self.components.push((name.to_string(), descriptor.to_string()));
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.fields
            .push((access, name.to_string(), descriptor.to_string()));
        self
    }

    pub fn method(mut self, access: u16, name: &str, descriptor: &str, code: &[Op]) -> Self {
        self.methods.push(MethodSpec {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            code: Some(code.to_vec()),
        });
        self
    }

    pub fn abstract_method(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.methods.push(MethodSpec {
            access: access | ABSTRACT,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            code: None,
        });
        self
    }

    /// The javac layout of `record <name>(int x, int y)`, with canonical accessors.
    pub fn point_record(name: &str) -> Self {
        Self::new(name)
            .access(PUBLIC | FINAL)
            .extends("java/lang/Record")
            .component("x", "I")
            .component("y", "I")
            .field(PRIVATE | FINAL, "x", "I")
            .field(PRIVATE | FINAL, "y", "I")
            .method(PUBLIC, "<init>", "(II)V", &[Op::Return])
            .method(
                PUBLIC | FINAL,
                "toString",
                "()Ljava/lang/String;",
                &[Op::AconstNull, Op::Areturn],
            )
            .method(PUBLIC | FINAL, "hashCode", "()I", &[Op::Iconst0, Op::Ireturn])
            .method(
                PUBLIC | FINAL,
                "equals",
                "(Ljava/lang/Object;)Z",
                &[Op::Iconst0, Op::Ireturn],
            )
    }

    pub fn build(mut self) -> Vec<u8> {
        let this_class = self.class_ref(&self.name.clone());
        let super_class = match self.super_name.clone() {
            Some(name) => self.class_ref(&name),
            None => 0,
        };
        let interfaces: Vec<u16> = self
            .interfaces
            .clone()
            .iter()
            .map(|name| self.class_ref(name))
            .collect();

        let mut body = Vec::new();
        put_u16(&mut body, self.access);
        put_u16(&mut body, this_class);
        put_u16(&mut body, super_class);
        put_u16(&mut body, interfaces.len() as u16);
        for index in interfaces {
            put_u16(&mut body, index);
        }

        let fields = std::mem::take(&mut self.fields);
        put_u16(&mut body, fields.len() as u16);
        for (access, name, descriptor) in fields {
            put_u16(&mut body, access);
            put_u16(&mut body, self.utf8(&name));
            put_u16(&mut body, self.utf8(&descriptor));
            put_u16(&mut body, 0);
        }

        let methods = std::mem::take(&mut self.methods);
        put_u16(&mut body, methods.len() as u16);
        for method in methods {
            put_u16(&mut body, method.access);
            put_u16(&mut body, self.utf8(&method.name));
            put_u16(&mut body, self.utf8(&method.descriptor));
            let Some(ops) = method.code else {
                put_u16(&mut body, 0);
                continue;
            };
            let code = self.assemble(&ops);
            put_u16(&mut body, 1);
            put_u16(&mut body, self.utf8("Code"));
            put_u32(&mut body, 12 + code.len() as u32);
            put_u16(&mut body, 2); // max_stack
            put_u16(&mut body, 4); // max_locals
            put_u32(&mut body, code.len() as u32);
            body.extend_from_slice(&code);
            put_u16(&mut body, 0); // exception table
            put_u16(&mut body, 0); // attributes
        }

        let components = std::mem::take(&mut self.components);
        if components.is_empty() {
            put_u16(&mut body, 0);
        } else {
            put_u16(&mut body, 1);
            put_u16(&mut body, self.utf8("Record"));
            put_u32(&mut body, 2 + 6 * components.len() as u32);
            put_u16(&mut body, components.len() as u16);
            for (name, descriptor) in components {
                put_u16(&mut body, self.utf8(&name));
                put_u16(&mut body, self.utf8(&descriptor));
                put_u16(&mut body, 0);
            }
        }

        let mut out = vec![0xCA, 0xFE, 0xBA, 0xBE];
        put_u16(&mut out, 0);
        put_u16(&mut out, 61);
        put_u16(&mut out, self.pool_count);
        out.extend_from_slice(&self.pool);
        out.extend_from_slice(&body);
        out
    }

    fn assemble(&mut self, ops: &[Op]) -> Vec<u8> {
        let mut code = Vec::new();
        for op in ops {
            match op {
                Op::Nop => code.push(0x00),
                Op::AconstNull => code.push(0x01),
                Op::Iconst0 => code.push(0x03),
                Op::Aload0 => code.push(0x2a),
                Op::AloadWide(slot) => {
                    code.extend_from_slice(&[0xc4, 0x19]);
                    put_u16(&mut code, *slot);
                }
                Op::GetField(owner, name, descriptor) => {
                    let index = self.field_ref(owner, name, descriptor);
                    code.push(0xb4);
                    put_u16(&mut code, index);
                }
                Op::Ireturn => code.push(0xac),
                Op::Areturn => code.push(0xb0),
                Op::Return => code.push(0xb1),
            }
        }
        code
    }

    fn constant(&mut self, key: String, bytes: Vec<u8>) -> u16 {
        if let Some(&index) = self.pool_index.get(&key) {
            return index;
        }
        let index = self.pool_count;
        self.pool.extend_from_slice(&bytes);
        self.pool_count += 1;
        self.pool_index.insert(key, index);
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        let mut bytes = vec![1];
        put_u16(&mut bytes, value.len() as u16);
        bytes.extend_from_slice(value.as_bytes());
        self.constant(format!("utf8:{value}"), bytes)
    }

    fn class_ref(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        let mut bytes = vec![7];
        put_u16(&mut bytes, name_index);
        self.constant(format!("class:{name}"), bytes)
    }

    fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class_ref(owner);
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut nat = vec![12];
        put_u16(&mut nat, name_index);
        put_u16(&mut nat, descriptor_index);
        let nat_index = self.constant(format!("nat:{name}:{descriptor}"), nat);

        let mut bytes = vec![9];
        put_u16(&mut bytes, class_index);
        put_u16(&mut bytes, nat_index);
        self.constant(format!("field:{owner}.{name}:{descriptor}"), bytes)
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Getter body `aload_0; getfield; ireturn`, optionally padded with a `nop`.
#[allow(dead_code)]
pub fn int_getter(owner: &'static str, field: &'static str, padded: bool) -> Vec<Op> {
    let mut ops = vec![Op::Aload0, Op::GetField(owner, field, "I")];
    if padded {
        ops.push(Op::Nop);
    }
    ops.push(Op::Ireturn);
    ops
}

/// Write `classes` into a jar at `path`. Entries are `<internal name>.class`.
#[allow(dead_code)]
pub fn write_jar(path: &Path, classes: Vec<(&str, Vec<u8>)>) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, bytes) in classes {
        zip.start_file(format!("{name}.class"), options).unwrap();
        zip.write_all(&bytes).unwrap();
    }
    zip.finish().unwrap();
}
