//! Values that can be written into a VBS document.
//!
//! This module provides two things:
//!
//! - [`Pack`]: the per-type dispatch from a Rust value to the matching
//!   [`Sink`] primitive. Every `append` on a view goes through it.
//! - [`Value`] and [`List`]: an in-memory value tree that can be written
//!   wholesale. A `List` (like a [`Dict`]) may also carry its own encoded
//!   form, in which case writing it splices those bytes instead of walking
//!   the items again.
//!
//! ## Creating Values
//!
//! ```rust
//! use vbs_writer::{vbs, Value};
//!
//! let null = Value::Null;
//! let number = Value::from(42);
//! let text = Value::from("hello");
//!
//! let tree = vbs!({
//!     "name": "Alice",
//!     "tags": ["rust", "vbs"]
//! });
//! assert!(tree.is_dict());
//! ```
//!
//! ### Reusing An Encoding
//!
//! ```rust
//! use vbs_writer::{List, Value};
//!
//! let list = List::from(vec![Value::from(1), Value::from(2)]).with_encoding();
//! assert_eq!(list.encoded(), Some(&[0x02, 0x41, 0x42, 0x01][..]));
//! assert_eq!(list.encoded_body(), Some(&[0x41, 0x42][..]));
//! ```

use crate::pack::{max_nesting, VBS_LIST, VBS_TAIL};
use crate::{Dict, Error, PackOptions, Result, Sink, VbsPacker};
use std::borrow::Cow;
use std::fmt;

/// Anything that maps onto a single VBS primitive or a whole value tree.
///
/// Implemented for the integer, float, boolean and string types, plus the
/// marker types [`Blob`], [`Raw`] and [`Null`], and for [`Value`], [`List`]
/// and [`Dict`].
pub trait Pack {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S);
}

macro_rules! pack_signed {
    ($($ty:ty),*) => {
        $(
            impl Pack for $ty {
                #[inline]
                fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
                    sink.emit_integer(*self as i64);
                }
            }
        )*
    };
}

macro_rules! pack_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Pack for $ty {
                #[inline]
                fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
                    sink.emit_unsigned(*self as u64);
                }
            }
        )*
    };
}

pack_signed!(i8, i16, i32, i64, isize);
pack_unsigned!(u8, u16, u32, u64, usize);

impl Pack for bool {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        sink.emit_bool(*self);
    }
}

impl Pack for f32 {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        sink.emit_float(f64::from(*self));
    }
}

impl Pack for f64 {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        sink.emit_float(*self);
    }
}

impl Pack for char {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        let mut buf = [0u8; 4];
        sink.emit_string(self.encode_utf8(&mut buf).as_bytes());
    }
}

impl Pack for str {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        sink.emit_string(self.as_bytes());
    }
}

impl Pack for String {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        sink.emit_string(self.as_bytes());
    }
}

impl Pack for Cow<'_, str> {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        sink.emit_string(self.as_bytes());
    }
}

impl Pack for () {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        sink.emit_null();
    }
}

impl<T: Pack> Pack for Option<T> {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        match self {
            Some(value) => value.pack(sink),
            None => sink.emit_null(),
        }
    }
}

impl<T: Pack + ?Sized> Pack for &T {
    #[inline]
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        (**self).pack(sink)
    }
}

impl<T: Pack + ?Sized> Pack for Box<T> {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        (**self).pack(sink)
    }
}

/// A fixed-point decimal: `significand × 10^exponent`.
///
/// # Examples
///
/// ```rust
/// use vbs_writer::Decimal64;
///
/// let price = Decimal64::new(1999, -2);
/// assert_eq!(price.to_string(), "19.99");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Decimal64 {
    pub significand: i64,
    pub exponent: i32,
}

impl Decimal64 {
    #[must_use]
    pub const fn new(significand: i64, exponent: i32) -> Self {
        Decimal64 {
            significand,
            exponent,
        }
    }
}

impl fmt::Display for Decimal64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exponent >= 0 {
            write!(f, "{}", self.significand)?;
            for _ in 0..self.exponent {
                f.write_str("0")?;
            }
            return Ok(());
        }
        let digits = self.significand.unsigned_abs().to_string();
        let scale = self.exponent.unsigned_abs() as usize;
        let sign = if self.significand < 0 { "-" } else { "" };
        if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{int}.{frac}")
        } else {
            write!(f, "{sign}0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}

impl Pack for Decimal64 {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        sink.emit_decimal(*self);
    }
}

/// Marks a byte slice as a BLOB rather than a list of small integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blob<'a>(pub &'a [u8]);

impl Pack for Blob<'_> {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        sink.emit_blob(self.0);
    }
}

/// Bytes that are already VBS-encoded and are copied to the sink verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Raw<'a>(pub &'a [u8]);

impl Pack for Raw<'_> {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        sink.emit_raw(self.0);
    }
}

/// The VBS null value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Null;

impl Pack for Null {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        sink.emit_null();
    }
}

/// A dynamically-typed VBS value.
///
/// # Examples
///
/// ```rust
/// use vbs_writer::Value;
///
/// let text = Value::String("hello".to_string());
/// assert!(text.is_string());
/// assert_eq!(text.as_str(), Some("hello"));
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal64),
    String(String),
    Blob(Vec<u8>),
    List(List),
    Dict(Dict),
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }
}

impl Pack for Value {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        match self {
            Value::Null => sink.emit_null(),
            Value::Bool(b) => sink.emit_bool(*b),
            Value::Integer(i) => sink.emit_integer(*i),
            Value::Float(f) => sink.emit_float(*f),
            Value::Decimal(d) => sink.emit_decimal(*d),
            Value::String(s) => sink.emit_string(s.as_bytes()),
            Value::Blob(b) => sink.emit_blob(b),
            Value::List(list) => list.pack(sink),
            Value::Dict(dict) => dict.pack(sink),
        }
    }
}

/// An ordered list of values, optionally carrying its own encoding.
///
/// When an encoding is present it is trusted to be the VBS form of the
/// items: [`Pack`] copies it verbatim and list replay splices its body.
/// Any mutation drops it.
#[derive(Clone, Debug, Default)]
pub struct List {
    items: Vec<Value>,
    encoded: Option<Encoding>,
}

impl List {
    #[must_use]
    pub fn new() -> Self {
        List::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        List {
            items: Vec::with_capacity(capacity),
            encoded: None,
        }
    }

    /// Adopts an encoded list alongside the items it decodes to.
    ///
    /// `encoded` must start with LIST and end with TAIL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRaw`] when the bracketing is wrong.
    pub fn from_encoded(items: Vec<Value>, encoded: Vec<u8>) -> Result<Self> {
        check_brackets("list", VBS_LIST, &encoded)?;
        Ok(List {
            items,
            encoded: Some(Encoding::new(encoded)),
        })
    }

    /// Encodes the items once and keeps the result for later splices.
    #[must_use]
    pub fn with_encoding(mut self) -> Self {
        self.encoded = None;
        self.encoded = Some(Encoding::new(encode_to_vec(&self)));
        self
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.encoded = None;
        self.items.push(value.into());
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// The full encoded form, brackets included.
    pub fn encoded(&self) -> Option<&[u8]> {
        self.encoded.as_ref().map(Encoding::bytes)
    }

    /// The encoded form without its LIST and TAIL bytes.
    pub fn encoded_body(&self) -> Option<&[u8]> {
        self.encoded.as_ref().map(Encoding::body)
    }

    pub(crate) fn encoding(&self) -> Option<&Encoding> {
        self.encoded.as_ref()
    }
}

impl PartialEq for List {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl Pack for List {
    fn pack<S: Sink + ?Sized>(&self, sink: &mut S) {
        if let Some(encoded) = &self.encoded {
            sink.emit_spliced(encoded.bytes(), encoded.nesting());
            return;
        }
        sink.begin_list();
        for item in &self.items {
            item.pack(sink);
        }
        sink.end_container();
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        List {
            items: iter.into_iter().collect(),
            encoded: None,
        }
    }
}

impl From<Vec<Value>> for List {
    fn from(items: Vec<Value>) -> Self {
        List {
            items,
            encoded: None,
        }
    }
}

pub(crate) fn check_brackets(kind: &'static str, open: u8, encoded: &[u8]) -> Result<()> {
    match encoded {
        [first, .., last] if *first == open && *last == VBS_TAIL => Ok(()),
        [] | [_] => Err(Error::invalid_raw(kind, "body is shorter than its brackets")),
        [first, ..] if *first != open => Err(Error::invalid_raw(
            kind,
            &format!("expected open tag {open:#04x}, found {first:#04x}"),
        )),
        _ => Err(Error::invalid_raw(kind, "missing TAIL")),
    }
}

/// A bracketed encoding and the deepest nesting it reaches, LIST or DICT
/// included.
#[derive(Clone, Debug)]
pub(crate) struct Encoding {
    bytes: Vec<u8>,
    nesting: usize,
}

impl Encoding {
    /// `bytes` must already have passed [`check_brackets`].
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        let nesting = max_nesting(&bytes);
        Encoding { bytes, nesting }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn nesting(&self) -> usize {
        self.nesting
    }

    pub(crate) fn body(&self) -> &[u8] {
        &self.bytes[1..self.bytes.len() - 1]
    }

    pub(crate) fn body_nesting(&self) -> usize {
        self.nesting.saturating_sub(1)
    }
}

/// Encodes a value tree on its own, without depth limit or flush threshold.
pub(crate) fn encode_to_vec<T: Pack + ?Sized>(value: &T) -> Vec<u8> {
    let options = PackOptions::new()
        .with_max_depth(usize::MAX)
        .with_buffer_size(usize::MAX);
    let mut packer = VbsPacker::with_options(Vec::new(), options);
    value.pack(&mut packer);
    packer.into_vec()
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! value_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Integer(i64::from(value))
                }
            }
        )*
    };
}

value_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Decimal64> for Value {
    fn from(value: Decimal64) -> Self {
        Value::Decimal(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Blob<'_>> for Value {
    fn from(value: Blob<'_>) -> Self {
        Value::Blob(value.0.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(List::from(value))
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Value::List(value)
    }
}

impl From<Dict> for Value {
    fn from(value: Dict) -> Self {
        Value::Dict(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
