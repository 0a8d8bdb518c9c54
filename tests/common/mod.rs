//! A minimal stack-based VBS reader used to check writer output.
//!
//! It panics on anything malformed, which is exactly what the tests want:
//! a TAIL without an open container, a truncated payload, or a dict key that
//! is neither an integer nor a string.

#![allow(dead_code)]

use vbs_writer::{Decimal64, Dict, Key, List, Value, VbsPacker, Writer};

/// Decodes every top-level item in `bytes`.
pub fn decode(bytes: &[u8]) -> Vec<Value> {
    let mut reader = Reader { bytes, pos: 0 };
    let mut items = Vec::new();
    while reader.pos < bytes.len() {
        match reader.item() {
            Item::Value(v) => items.push(v),
            Item::Tail => panic!("TAIL at offset {} with no open container", reader.pos - 1),
        }
    }
    items
}

/// Decodes a buffer that must hold exactly one top-level item.
pub fn decode_one(bytes: &[u8]) -> Value {
    let mut items = decode(bytes);
    assert_eq!(items.len(), 1, "expected one top-level item in {bytes:02x?}");
    items.remove(0)
}

/// Runs `build` against a fresh in-memory document and returns its bytes.
pub fn pack_doc(build: impl FnOnce(&Writer<VbsPacker>)) -> Vec<u8> {
    let doc = Writer::new(VbsPacker::new());
    build(&doc);
    doc.finish().finish().expect("in-memory packing cannot fail")
}

enum Item {
    Value(Value),
    Tail,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn next_byte(&mut self) -> u8 {
        let b = *self
            .bytes
            .get(self.pos)
            .unwrap_or_else(|| panic!("unexpected end of input at offset {}", self.pos));
        self.pos += 1;
        b
    }

    fn take(&mut self, len: usize) -> &[u8] {
        let end = self.pos + len;
        assert!(end <= self.bytes.len(), "payload of {len} bytes runs past the end");
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        out
    }

    /// Reads leading 7-bit groups, then the descriptor byte.
    fn head(&mut self) -> (u64, u32, u8) {
        let mut n = 0u64;
        let mut shift = 0u32;
        loop {
            let b = self.next_byte();
            if b & 0x80 == 0 {
                return (n, shift, b);
            }
            n |= u64::from(b & 0x7F) << shift;
            shift += 7;
        }
    }

    fn integer(&mut self) -> i64 {
        match self.item() {
            Item::Value(Value::Integer(i)) => i,
            _ => panic!("expected an INTEGER exponent at offset {}", self.pos),
        }
    }

    fn item(&mut self) -> Item {
        let (n, shift, tag) = self.head();
        let inline = |n: u64| n | (u64::from(tag & 0x1F) << shift);
        let value = match tag {
            0x01 => return Item::Tail,
            0x02 => {
                let mut items = Vec::new();
                loop {
                    match self.item() {
                        Item::Value(v) => items.push(v),
                        Item::Tail => break,
                    }
                }
                Value::List(List::from(items))
            }
            0x03 => {
                let mut dict = Dict::new();
                loop {
                    let key = match self.item() {
                        Item::Tail => break,
                        Item::Value(Value::Integer(i)) => Key::Integer(i),
                        Item::Value(Value::String(s)) => Key::String(s),
                        Item::Value(other) => panic!("invalid dict key {other:?}"),
                    };
                    match self.item() {
                        Item::Value(v) => {
                            dict.insert(key, v);
                        }
                        Item::Tail => panic!("dict key {key} has no value"),
                    }
                }
                Value::Dict(dict)
            }
            0x0F => Value::Null,
            0x18 => Value::Bool(false),
            0x19 => Value::Bool(true),
            0x1B => Value::Blob(self.take(n as usize).to_vec()),
            0x1C | 0x1D => {
                let magnitude = n as i64;
                let significand = if tag & 1 == 1 { -magnitude } else { magnitude };
                let exponent = self.integer();
                Value::Decimal(Decimal64::new(significand, exponent as i32))
            }
            0x1E | 0x1F => {
                let exponent = self.integer();
                let magnitude = match (n, exponent) {
                    (0, 0) => 0.0,
                    (0, 1) => f64::INFINITY,
                    (0, 2) => f64::NAN,
                    (m, e) => scale(m as f64, e),
                };
                Value::Float(if tag & 1 == 1 { -magnitude } else { magnitude })
            }
            0x20..=0x3F => {
                let len = inline(n) as usize;
                let text = self.take(len).to_vec();
                Value::String(String::from_utf8(text).expect("STRING payload is not UTF-8"))
            }
            0x40..=0x7F => {
                let magnitude = inline(n);
                if tag & 0x20 != 0 {
                    Value::Integer((magnitude as i64).wrapping_neg())
                } else {
                    Value::Integer(magnitude as i64)
                }
            }
            other => panic!("unknown descriptor {other:#04x} at offset {}", self.pos - 1),
        };
        Item::Value(value)
    }
}

/// `m * 2^e` without overflowing intermediate powers.
fn scale(mut m: f64, mut e: i64) -> f64 {
    while e > 0 {
        let step = e.min(1000);
        m *= 2f64.powi(step as i32);
        e -= step;
    }
    while e < 0 {
        let step = (-e).min(1000);
        m /= 2f64.powi(step as i32);
        e += step;
    }
    m
}
