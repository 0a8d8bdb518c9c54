//! The byte sink and its primitive encodings.
//!
//! Everything the writer emits goes through the [`Sink`] trait: one method per
//! primitive, plus container brackets and length heads. The container engine
//! in [`writer`](crate::writer) never looks at bytes; it only decides *when*
//! each primitive is emitted.
//!
//! [`VbsPacker`] is the reference sink. It encodes the VBS tag layout into a
//! staging buffer and drains it into any [`io::Write`].
//!
//! ## Tag Layout
//!
//! | Descriptor      | Meaning                                   |
//! |-----------------|-------------------------------------------|
//! | `0x01`          | TAIL, closes the innermost list or dict   |
//! | `0x02` / `0x03` | LIST / DICT                               |
//! | `0x0F`          | NULL                                      |
//! | `0x18` / `0x19` | false / true                              |
//! | `0x1B`          | BLOB (length in leading groups)           |
//! | `0x1C` / `0x1D` | DECIMAL, positive / negative significand  |
//! | `0x1E` / `0x1F` | FLOATING, positive / negative mantissa    |
//! | `0x20..=0x3F`   | STRING, 5 inline length bits              |
//! | `0x40..=0x5F`   | INTEGER >= 0, 5 inline bits               |
//! | `0x60..=0x7F`   | INTEGER < 0, 5 inline bits of magnitude   |
//!
//! Numbers that do not fit in the descriptor are preceded by little-endian
//! 7-bit groups with the high bit set.
//!
//! ## Examples
//!
//! ```rust
//! use vbs_writer::{Sink, VbsPacker};
//!
//! let mut packer = VbsPacker::new();
//! packer.emit_integer(5);
//! packer.emit_string(b"hi");
//! assert_eq!(packer.finish().unwrap(), vec![0x45, 0x22, b'h', b'i']);
//! ```

use crate::{Decimal64, Error, PackOptions, Result};
use std::io::Write;
use tracing::{debug, warn};

pub const VBS_TAIL: u8 = 0x01;
pub const VBS_LIST: u8 = 0x02;
pub const VBS_DICT: u8 = 0x03;
pub const VBS_NULL: u8 = 0x0F;
pub const VBS_BOOL: u8 = 0x18;
pub const VBS_BLOB: u8 = 0x1B;
pub const VBS_DECIMAL: u8 = 0x1C;
pub const VBS_FLOATING: u8 = 0x1E;
pub const VBS_STRING: u8 = 0x20;
pub const VBS_INTEGER: u8 = 0x40;

/// Sign bit of INTEGER descriptors.
pub const VBS_NEGATIVE: u8 = 0x20;

/// FLOATING exponents paired with a zero mantissa.
pub const FLOATING_INFINITY: i64 = 1;
pub const FLOATING_NAN: i64 = 2;

/// An append-only destination for VBS primitives.
///
/// Implementations never fail synchronously; a sink that can fail records
/// the failure and reports it when it is finished.
///
/// `emit_string` and `emit_blob` are provided in terms of the head and raw
/// operations, which is also how the two-phase head mode composes.
pub trait Sink {
    fn emit_integer(&mut self, v: i64);
    fn emit_unsigned(&mut self, v: u64);
    fn emit_bool(&mut self, v: bool);
    fn emit_float(&mut self, v: f64);
    fn emit_decimal(&mut self, v: Decimal64);
    fn emit_null(&mut self);

    /// Appends bytes that are already in final wire form.
    fn emit_raw(&mut self, bytes: &[u8]);

    fn begin_list(&mut self);
    fn begin_dict(&mut self);
    fn end_container(&mut self);

    /// Declares a string of `len` bytes; exactly `len` raw bytes must follow.
    fn emit_string_head(&mut self, len: usize);

    /// Declares a blob of `len` bytes; exactly `len` raw bytes must follow.
    fn emit_blob_head(&mut self, len: usize);

    fn emit_string(&mut self, bytes: &[u8]) {
        self.emit_string_head(bytes.len());
        self.emit_raw(bytes);
    }

    fn emit_blob(&mut self, bytes: &[u8]) {
        self.emit_blob_head(bytes.len());
        self.emit_raw(bytes);
    }

    /// Splices complete encoded items whose containers nest at most
    /// `nesting` deep below the current position.
    ///
    /// The default copies the bytes like [`emit_raw`](Self::emit_raw).
    fn emit_spliced(&mut self, bytes: &[u8], _nesting: usize) {
        self.emit_raw(bytes);
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn emit_integer(&mut self, v: i64) {
        (**self).emit_integer(v)
    }

    fn emit_unsigned(&mut self, v: u64) {
        (**self).emit_unsigned(v)
    }

    fn emit_bool(&mut self, v: bool) {
        (**self).emit_bool(v)
    }

    fn emit_float(&mut self, v: f64) {
        (**self).emit_float(v)
    }

    fn emit_decimal(&mut self, v: Decimal64) {
        (**self).emit_decimal(v)
    }

    fn emit_null(&mut self) {
        (**self).emit_null()
    }

    fn emit_raw(&mut self, bytes: &[u8]) {
        (**self).emit_raw(bytes)
    }

    fn begin_list(&mut self) {
        (**self).begin_list()
    }

    fn begin_dict(&mut self) {
        (**self).begin_dict()
    }

    fn end_container(&mut self) {
        (**self).end_container()
    }

    fn emit_string_head(&mut self, len: usize) {
        (**self).emit_string_head(len)
    }

    fn emit_blob_head(&mut self, len: usize) {
        (**self).emit_blob_head(len)
    }

    fn emit_string(&mut self, bytes: &[u8]) {
        (**self).emit_string(bytes)
    }

    fn emit_blob(&mut self, bytes: &[u8]) {
        (**self).emit_blob(bytes)
    }

    fn emit_spliced(&mut self, bytes: &[u8], nesting: usize) {
        (**self).emit_spliced(bytes, nesting)
    }
}

/// The reference VBS encoder.
///
/// Bytes are staged in memory and drained into the writer `W` whenever
/// [`PackOptions::buffer_size`] bytes are pending, on [`flush`](Self::flush),
/// and on [`finish`](Self::finish). The first I/O failure or depth violation
/// is latched; later writes are still accepted (and discarded after an I/O
/// failure) so that callers never have to check mid-document.
///
/// # Examples
///
/// ```rust
/// use vbs_writer::{Sink, VbsPacker};
///
/// let mut packer = VbsPacker::new();
/// packer.begin_list();
/// packer.emit_bool(true);
/// packer.emit_null();
/// packer.end_container();
/// assert_eq!(packer.finish().unwrap(), vec![0x02, 0x19, 0x0F, 0x01]);
/// ```
pub struct VbsPacker<W = Vec<u8>> {
    writer: W,
    buf: Vec<u8>,
    depth: usize,
    options: PackOptions,
    error: Option<Error>,
}

impl VbsPacker<Vec<u8>> {
    /// Creates a packer that collects its output in a `Vec<u8>`.
    pub fn new() -> Self {
        VbsPacker::with_options(Vec::new(), PackOptions::default())
    }

    /// Returns everything written so far. Only used where no error can latch.
    pub(crate) fn into_vec(mut self) -> Vec<u8> {
        self.writer.append(&mut self.buf);
        self.writer
    }
}

impl Default for VbsPacker<Vec<u8>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> VbsPacker<W> {
    pub fn with_options(writer: W, options: PackOptions) -> Self {
        VbsPacker {
            writer,
            buf: Vec::with_capacity(options.buffer_size.min(64 * 1024)),
            depth: 0,
            options,
            error: None,
        }
    }

    pub fn options(&self) -> &PackOptions {
        &self.options
    }

    /// Number of containers currently open on this packer.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bytes staged but not yet handed to the writer.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }

    /// The latched error, if any.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Drains the staging buffer into the writer.
    pub fn flush(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        if matches!(self.error, Some(Error::Io(_))) {
            self.buf.clear();
            return;
        }
        debug!(bytes = self.buf.len(), "flushing packed bytes");
        if let Err(err) = self.writer.write_all(&self.buf) {
            self.latch(err.into());
        }
        self.buf.clear();
    }

    /// Flushes everything and returns the writer, or the first latched error.
    pub fn finish(mut self) -> Result<W> {
        self.flush();
        if let Err(err) = self.writer.flush() {
            self.latch(err.into());
        }
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.writer),
        }
    }

    fn latch(&mut self, err: Error) {
        warn!(error = %err, "vbs packer failed");
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    #[inline]
    fn put(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    #[inline]
    fn settle(&mut self) {
        if self.buf.len() >= self.options.buffer_size {
            self.flush();
        }
    }

    /// Writes `n` for a descriptor that carries 5 inline bits.
    fn pack_head(&mut self, kind: u8, mut n: u64) {
        while n >= 0x20 {
            self.put(0x80 | (n as u8 & 0x7F));
            n >>= 7;
        }
        self.put(kind | n as u8);
    }

    /// Writes `n` for a descriptor with no inline bits.
    fn pack_tagged(&mut self, kind: u8, mut n: u64) {
        while n > 0 {
            self.put(0x80 | (n as u8 & 0x7F));
            n >>= 7;
        }
        self.put(kind);
    }

    fn pack_integer(&mut self, v: i64) {
        if v < 0 {
            self.pack_head(VBS_INTEGER | VBS_NEGATIVE, v.unsigned_abs());
        } else {
            self.pack_head(VBS_INTEGER, v as u64);
        }
    }

    fn open(&mut self, kind: u8) {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            let err = Error::DepthExceeded {
                depth: self.depth,
                max: self.options.max_depth,
            };
            self.latch(err);
        }
        self.put(kind);
        self.settle();
    }
}

impl<W: Write> Sink for VbsPacker<W> {
    fn emit_integer(&mut self, v: i64) {
        self.pack_integer(v);
        self.settle();
    }

    fn emit_unsigned(&mut self, v: u64) {
        self.pack_head(VBS_INTEGER, v);
        self.settle();
    }

    fn emit_bool(&mut self, v: bool) {
        self.put(VBS_BOOL | v as u8);
        self.settle();
    }

    fn emit_float(&mut self, v: f64) {
        let (negative, mantissa, exponent) = decompose_float(v);
        self.pack_tagged(VBS_FLOATING | negative as u8, mantissa);
        self.pack_integer(exponent);
        self.settle();
    }

    fn emit_decimal(&mut self, v: Decimal64) {
        let negative = v.significand < 0;
        self.pack_tagged(VBS_DECIMAL | negative as u8, v.significand.unsigned_abs());
        self.pack_integer(i64::from(v.exponent));
        self.settle();
    }

    fn emit_null(&mut self) {
        self.put(VBS_NULL);
        self.settle();
    }

    fn emit_raw(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        self.settle();
    }

    /// Counts the spliced containers against `max_depth`. The reported depth
    /// is the one element-by-element replay would have failed at.
    fn emit_spliced(&mut self, bytes: &[u8], nesting: usize) {
        let max = self.options.max_depth;
        if self.depth.saturating_add(nesting) > max {
            let err = Error::DepthExceeded {
                depth: max.saturating_add(1),
                max,
            };
            self.latch(err);
        }
        self.emit_raw(bytes);
    }

    fn begin_list(&mut self) {
        self.open(VBS_LIST);
    }

    fn begin_dict(&mut self) {
        self.open(VBS_DICT);
    }

    fn end_container(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.put(VBS_TAIL);
        self.settle();
    }

    fn emit_string_head(&mut self, len: usize) {
        self.pack_head(VBS_STRING, len as u64);
    }

    fn emit_blob_head(&mut self, len: usize) {
        self.pack_tagged(VBS_BLOB, len as u64);
    }
}

/// Deepest container nesting reached by a run of encoded items.
///
/// Item heads are walked so that string and blob payloads are skipped rather
/// than read as tags. A TAIL with nothing open is ignored.
pub(crate) fn max_nesting(encoded: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut groups = 0u64;
    let mut shift = 0u32;
    let mut pos = 0usize;

    while let Some(&byte) = encoded.get(pos) {
        pos += 1;
        if byte & 0x80 != 0 {
            groups |= u64::from(byte & 0x7F).checked_shl(shift).unwrap_or(0);
            shift = shift.saturating_add(7);
            continue;
        }
        match byte {
            VBS_LIST | VBS_DICT => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            VBS_TAIL => depth = depth.saturating_sub(1),
            VBS_BLOB => pos = pos.saturating_add(payload_len(groups)),
            _ if byte & 0xE0 == VBS_STRING => {
                let inline = u64::from(byte & 0x1F).checked_shl(shift).unwrap_or(0);
                pos = pos.saturating_add(payload_len(groups | inline));
            }
            _ => {}
        }
        groups = 0;
        shift = 0;
    }
    deepest
}

fn payload_len(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// Splits an `f64` into `(negative, mantissa, exponent)` with
/// `|v| == mantissa * 2^exponent` and an odd (or zero) mantissa.
pub fn decompose_float(v: f64) -> (bool, u64, i64) {
    if v.is_nan() {
        return (false, 0, FLOATING_NAN);
    }
    let negative = v.is_sign_negative();
    if v.is_infinite() {
        return (negative, 0, FLOATING_INFINITY);
    }
    if v == 0.0 {
        return (negative, 0, 0);
    }

    let bits = v.to_bits();
    let biased = ((bits >> 52) & 0x7FF) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mut mantissa, mut exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), biased - 1075)
    };
    let shift = mantissa.trailing_zeros();
    mantissa >>= shift;
    exponent += i64::from(shift);
    (negative, mantissa, exponent)
}
