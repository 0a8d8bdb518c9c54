//! The dict view: a sequence of key → value entries.
//!
//! Each content-producing call takes the key first and writes it right
//! before the value or nested container, so a well-formed call sequence
//! always yields complete pairs. Keys are written in call order; nothing
//! here sorts or deduplicates them.
//!
//! ```rust
//! use vbs_writer::{VbsPacker, Writer};
//!
//! let doc = Writer::new(VbsPacker::new());
//! let root = doc.dict();
//! root.append("id", 7);
//! let tags = root.append_list("tags");
//! tags.append("x");
//! root.close(); // seals `tags`, then the dict
//!
//! let bytes = doc.finish().finish().unwrap();
//! assert_eq!(
//!     bytes,
//!     b"\x03\x22id\x47\x24tags\x02\x21x\x01\x01".to_vec()
//! );
//! ```

use crate::dispatch::{DictItem, DictSource, ListSource};
use crate::source::ByteSource;
use crate::writer::{ContainerState, Cursor};
use crate::{ListWriter, Pack, Sink};
use std::fmt;

/// A view over one open dict of a [`Writer`](crate::Writer).
///
/// Cloning a `DictWriter` yields another handle to the same dict.
pub struct DictWriter<'a, S> {
    cursor: Cursor<'a, S>,
}

impl<S> Clone for DictWriter<'_, S> {
    fn clone(&self) -> Self {
        DictWriter {
            cursor: self.cursor.clone(),
        }
    }
}

impl<'a, S: Sink> DictWriter<'a, S> {
    pub(crate) fn new(cursor: Cursor<'a, S>) -> Self {
        DictWriter { cursor }
    }

    /// Appends one entry.
    ///
    /// # Panics
    ///
    /// Panics if this dict has been closed.
    pub fn append<K: Pack, V: Pack>(&self, key: K, value: V) {
        self.cursor.write(|sink| {
            key.pack(sink);
            value.pack(sink);
        });
    }

    pub fn append_null<K: Pack>(&self, key: K) {
        self.cursor.write(|sink| {
            key.pack(sink);
            sink.emit_null();
        });
    }

    pub fn append_string<K: Pack, B: ByteSource + ?Sized>(&self, key: K, source: &B) {
        self.cursor.write(|sink| {
            key.pack(sink);
            sink.emit_string_head(source.byte_len());
            source.for_each_chunk(&mut |chunk| sink.emit_raw(chunk));
        });
    }

    pub fn append_blob<K: Pack, B: ByteSource + ?Sized>(&self, key: K, source: &B) {
        self.cursor.write(|sink| {
            key.pack(sink);
            sink.emit_blob_head(source.byte_len());
            source.for_each_chunk(&mut |chunk| sink.emit_raw(chunk));
        });
    }

    /// Appends an entry whose value is a formatted string.
    ///
    /// # Panics
    ///
    /// Panics if a `Display` implementation reports an error, as `format!` does.
    pub fn append_fmt<K: Pack>(&self, key: K, args: fmt::Arguments<'_>) {
        let text = fmt::format(args);
        self.append(key, text.as_str());
    }

    /// Appends an entry whose value comes from a formatting callback.
    ///
    /// Nothing is written, not even the key, if the callback fails.
    pub fn append_fmt_with<K, F>(&self, key: K, format: F) -> fmt::Result
    where
        K: Pack,
        F: FnOnce(&mut dyn fmt::Write) -> fmt::Result,
    {
        let mut text = String::new();
        format(&mut text)?;
        self.append(key, text.as_str());
        Ok(())
    }

    /// Splices bytes that are already VBS-encoded: whole entries, or the
    /// payload announced by a `declare_*_head` call. The bytes are not checked.
    pub fn append_raw(&self, bytes: &[u8]) {
        self.cursor.write(|sink| sink.emit_raw(bytes));
    }

    /// Splices encoded items whose containers nest `nesting` deep, so the
    /// sink can hold them to its depth limit.
    pub(crate) fn splice_body(&self, bytes: &[u8], nesting: usize) {
        self.cursor.write(|sink| sink.emit_spliced(bytes, nesting));
    }

    /// Writes `key`, then starts a string of `len` bytes to be supplied
    /// through `append_raw`.
    pub fn declare_string_head<K: Pack>(&self, key: K, len: usize) {
        self.cursor.write(|sink| {
            key.pack(sink);
            sink.emit_string_head(len);
        });
    }

    /// Writes `key`, then starts a blob of `len` bytes to be supplied
    /// through `append_raw`.
    pub fn declare_blob_head<K: Pack>(&self, key: K, len: usize) {
        self.cursor.write(|sink| {
            key.pack(sink);
            sink.emit_blob_head(len);
        });
    }

    /// Writes `key` and opens a nested list as its value.
    pub fn append_list<K: Pack>(&self, key: K) -> ListWriter<'a, S> {
        self.cursor.write_then_open_list(|sink| key.pack(sink))
    }

    /// Writes `key` and opens a nested dict as its value.
    pub fn append_dict<K: Pack>(&self, key: K) -> DictWriter<'a, S> {
        self.cursor.write_then_open_dict(|sink| key.pack(sink))
    }

    /// Writes `key` and a nested list filled from `values`; the list stays open.
    pub fn append_list_from<K, L>(&self, key: K, values: &L) -> ListWriter<'a, S>
    where
        K: Pack,
        L: ListSource + ?Sized,
    {
        let child = self.append_list(key);
        values.write_all(&child);
        child
    }

    /// Writes `key` and a nested dict filled from `dict`; the dict stays open.
    pub fn append_dict_from<K, D>(&self, key: K, dict: &D) -> DictWriter<'a, S>
    where
        K: Pack,
        D: DictSource + ?Sized,
    {
        let child = self.append_dict(key);
        dict.write_all(&child);
        child
    }

    /// Writes one entry through the value's [`DictItem`] implementation.
    pub fn append_entry<K: Pack, V: DictItem + ?Sized>(&self, key: K, value: &V) {
        value.write_entry(self, key);
    }

    /// Writes every entry of `dict` into this dict.
    pub fn append_all<D: DictSource + ?Sized>(&self, dict: &D) {
        dict.write_all(self);
    }

    /// Seals any open child without writing anything else.
    pub fn flush(&self) {
        self.cursor.finish_child();
    }

    /// Seals any open child, then terminates this dict.
    ///
    /// # Panics
    ///
    /// Panics if the dict is already closed.
    pub fn close(&self) {
        self.cursor.close();
    }

    pub fn state(&self) -> ContainerState {
        self.cursor.state()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ContainerState::Open
    }

    pub fn depth(&self) -> usize {
        self.cursor.depth()
    }
}

impl<S: Sink> fmt::Debug for DictWriter<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DictWriter")
            .field("depth", &self.depth())
            .field("state", &self.state())
            .finish()
    }
}
