//! Recursive-descent rewriting of generic signatures (JVMS 4.7.9.1).

use super::Remapper;

struct SignatureMapper<'a, R: ?Sized> {
    remapper: &'a R,
    input: &'a str,
    pos: usize,
    out: String,
}

pub(super) fn remap_signature<R: Remapper + ?Sized>(remapper: &R, signature: &str) -> Option<String> {
    let mut mapper = SignatureMapper {
        remapper,
        input: signature,
        pos: 0,
        out: String::with_capacity(signature.len()),
    };
    mapper.signature()?;
    Some(mapper.out)
}

impl<R: Remapper + ?Sized> SignatureMapper<'_, R> {
    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        (self.peek()? == byte).then(|| {
            self.out.push(byte as char);
            self.pos += 1;
        })
    }

    /// Consume up to (not including) the first of `stops`.
    fn take_until(&mut self, stops: &[u8]) -> Option<&str> {
        let start = self.pos;
        let len = self.input.as_bytes()[start..]
            .iter()
            .position(|b| stops.contains(b))?;
        self.pos += len;
        Some(&self.input[start..start + len])
    }

    fn signature(&mut self) -> Option<()> {
        if self.peek() == Some(b'<') {
            self.type_parameters()?;
        }
        if self.peek() == Some(b'(') {
            self.expect(b'(')?;
            while self.peek()? != b')' {
                self.java_type()?;
            }
            self.expect(b')')?;
            if self.peek()? == b'V' {
                self.expect(b'V')?;
            } else {
                self.java_type()?;
            }
            while self.peek() == Some(b'^') {
                self.expect(b'^')?;
                self.reference_type()?;
            }
        } else {
            // class signature (super + interfaces) or a single field type
            while self.peek().is_some() {
                self.reference_type()?;
            }
        }
        (self.pos == self.input.len()).then_some(())
    }

    fn type_parameters(&mut self) -> Option<()> {
        self.expect(b'<')?;
        while self.peek()? != b'>' {
            let name = self.take_until(b":")?.to_string();
            self.out.push_str(&name);
            self.expect(b':')?;
            if matches!(self.peek()?, b'L' | b'T' | b'[') {
                self.reference_type()?;
            }
            while self.peek() == Some(b':') {
                self.expect(b':')?;
                self.reference_type()?;
            }
        }
        self.expect(b'>')
    }

    fn java_type(&mut self) -> Option<()> {
        match self.peek()? {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' => {
                let byte = self.peek()?;
                self.expect(byte)
            }
            _ => self.reference_type(),
        }
    }

    fn reference_type(&mut self) -> Option<()> {
        match self.peek()? {
            b'L' => self.class_type(),
            b'T' => {
                self.expect(b'T')?;
                let name = self.take_until(b";")?.to_string();
                self.out.push_str(&name);
                self.expect(b';')
            }
            b'[' => {
                self.expect(b'[')?;
                self.java_type()
            }
            _ => None,
        }
    }

    fn class_type(&mut self) -> Option<()> {
        self.expect(b'L')?;
        let mut original = self.take_until(b";<.")?.to_string();
        let mut mapped = self.remapper.map_class(&original);
        self.out.push_str(&mapped);
        if self.peek()? == b'<' {
            self.type_arguments()?;
        }

        while self.peek()? == b'.' {
            self.expect(b'.')?;
            let inner = self.take_until(b";<.")?.to_string();
            original = format!("{original}${inner}");
            let outer_prefix = format!("{mapped}$");
            mapped = self.remapper.map_class(&original);
            let simple = match mapped.strip_prefix(&outer_prefix) {
                Some(rest) => rest,
                None => mapped.rsplit('$').next().unwrap_or(&mapped),
            };
            self.out.push_str(simple);
            if self.peek()? == b'<' {
                self.type_arguments()?;
            }
        }
        self.expect(b';')
    }

    fn type_arguments(&mut self) -> Option<()> {
        self.expect(b'<')?;
        while self.peek()? != b'>' {
            match self.peek()? {
                b'*' => self.expect(b'*')?,
                b'+' | b'-' => {
                    let byte = self.peek()?;
                    self.expect(byte)?;
                    self.reference_type()?;
                }
                _ => self.reference_type()?,
            }
        }
        self.expect(b'>')
    }
}
