//! # vbs_writer
//!
//! A streaming writer for VBS, a compact self-describing binary encoding of
//! nested lists and dictionaries.
//!
//! ## What is VBS?
//!
//! Every VBS item starts with a tag byte. Small lengths and integers live in
//! the tag itself; bigger ones spill into little-endian base-128 bytes that
//! *precede* the tag. Containers are a LIST or DICT tag, their contents, and
//! a single TAIL byte. There are no up-front lengths, so a document can be
//! written strictly front to back.
//!
//! ## Key Features
//!
//! - **Nesting Is Enforced**: a parent view seals its open child before it
//!   writes again, so sibling containers never interleave
//! - **Streaming Output**: bytes go straight to any [`std::io::Write`] in
//!   bounded chunks
//! - **Segmented Payloads**: strings and blobs can come from several buffers
//!   without being flattened first ([`ByteSource`])
//! - **Splicing**: pre-encoded [`List`] / [`Dict`] values are copied in one
//!   shot instead of being re-encoded
//! - **Serde Compatible**: any `T: Serialize` via [`to_vec`] / [`to_writer`]
//!
//! ## Quick Start
//!
//! ```rust
//! use vbs_writer::{VbsPacker, Writer};
//!
//! let doc = Writer::new(VbsPacker::new());
//! let root = doc.dict();
//! root.append("id", 1);
//! let tags = root.append_list("tags");
//! tags.append("a");
//! tags.append("b");
//! root.append("ok", true); // seals `tags` first
//! root.close();
//!
//! let bytes = doc.finish().finish().unwrap();
//! assert_eq!(bytes.first(), Some(&0x03));
//! assert_eq!(bytes.last(), Some(&0x01));
//! ```
//!
//! ### With Serde
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Reading {
//!     sensor: String,
//!     values: Vec<f64>,
//! }
//!
//! let reading = Reading { sensor: "t1".to_string(), values: vec![0.5, 1.0] };
//! let bytes = vbs_writer::to_vec(&reading).unwrap();
//! assert_eq!(bytes[0], 0x03);
//! ```
//!
//! ### Dynamic Values with vbs! Macro
//!
//! ```rust
//! use vbs_writer::{vbs, VbsPacker, Writer};
//!
//! let value = vbs!({ "name": "probe", "ports": [80, 443] });
//!
//! let doc = Writer::new(VbsPacker::new());
//! doc.values().append(&value);
//! let bytes = doc.finish().finish().unwrap();
//! assert_eq!(bytes[0], 0x03);
//! ```
//!
//! ## Threading
//!
//! A [`Writer`] and its views live on one thread. Views share the document
//! through a `RefCell`, so they are neither `Send` nor `Sync` while borrowed.
//!
//! ## Misuse
//!
//! Closing a container that is already closed (explicitly, or sealed by a
//! later write to its parent), or writing through a view whose container is
//! closed, is a programming error and panics. Errors from the sink (I/O
//! failures, excessive depth) are recorded and surface from
//! [`VbsPacker::finish`].

pub mod dict;
pub mod dispatch;
pub mod error;
pub mod list;
pub mod macros;
pub mod map;
pub mod options;
pub mod pack;
pub mod ser;
pub mod source;
pub mod value;
pub mod writer;

pub use dict::DictWriter;
pub use dispatch::{DictItem, DictSource, ListItem, ListSource};
pub use error::{Error, Result};
pub use list::ListWriter;
pub use map::{Dict, Key};
pub use options::PackOptions;
pub use pack::{Sink, VbsPacker};
pub use ser::Serializer;
pub use source::ByteSource;
pub use value::{Blob, Decimal64, List, Null, Pack, Raw, Value};
pub use writer::{ContainerState, Writer};

use serde::Serialize;
use std::io;

/// Serialize any `T: Serialize` to a VBS byte vector.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let bytes = vbs_writer::to_vec(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(bytes, b"\x03\x21x\x41\x21y\x42\x01".to_vec());
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be expressed in VBS (e.g. a map key
/// that is neither an integer nor a string) or nests too deeply.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_vec_with_options(value, PackOptions::default())
}

/// Serialize any `T: Serialize` to a VBS byte vector with custom options.
///
/// ```rust
/// use vbs_writer::{to_vec_with_options, Error, PackOptions};
///
/// let nested = vec![vec![vec![1]]];
/// let err = to_vec_with_options(&nested, PackOptions::new().with_max_depth(2)).unwrap_err();
/// assert!(matches!(err, Error::DepthExceeded { .. }));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec_with_options<T>(value: &T, options: PackOptions) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    to_writer_with_options(Vec::new(), value, options)
}

/// Serialize any `T: Serialize` into a writer and hand the writer back.
///
/// Output is flushed to `writer` in chunks of
/// [`PackOptions::buffer_size`] bytes while serializing.
///
/// ```rust
/// let out = vbs_writer::to_writer(Vec::new(), &("a", 1)).unwrap();
/// assert_eq!(out, b"\x02\x21a\x41\x01".to_vec());
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
/// Bytes already flushed before the failure remain in the writer.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<W>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, PackOptions::default())
}

/// Serialize any `T: Serialize` into a writer with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(writer: W, value: &T, options: PackOptions) -> Result<W>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let doc = Writer::new(VbsPacker::with_options(writer, options));
    doc.values().append_serialize(value)?;
    doc.finish().finish()
}

/// Encode a [`Pack`] value on its own, e.g. to build the encoding handed to
/// [`List::from_encoded`].
///
/// ```rust
/// use vbs_writer::{encode, vbs};
///
/// assert_eq!(encode(&vbs!([1, 2])).unwrap(), vec![0x02, 0x41, 0x42, 0x01]);
/// ```
///
/// # Errors
///
/// Returns [`Error::DepthExceeded`] if the value nests deeper than the
/// default limit.
pub fn encode<T: Pack + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut packer = VbsPacker::new();
    value.pack(&mut packer);
    packer.finish()
}
