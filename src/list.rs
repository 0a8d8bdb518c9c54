//! The list view: a sequence of values.
//!
//! Every method first seals any child container still open beneath this
//! list, so siblings can never interleave. Opening a child returns a new
//! view over the child; the parent stays usable and the child is sealed
//! the next time the parent is written to.
//!
//! ```rust
//! use vbs_writer::{VbsPacker, Writer};
//!
//! let doc = Writer::new(VbsPacker::new());
//! let root = doc.list();
//! root.append("a");
//! root.append_list(); // opened and left empty
//! root.append("b");   // seals the empty list first
//! root.close();
//!
//! let bytes = doc.finish().finish().unwrap();
//! assert_eq!(bytes, b"\x02\x21a\x02\x01\x21b\x01".to_vec());
//! ```

use crate::dispatch::{DictSource, ListItem, ListSource};
use crate::source::ByteSource;
use crate::writer::{ContainerState, Cursor};
use crate::{DictWriter, Pack, Sink};
use std::fmt;

/// A view over one open list (or the top-level scope) of a [`Writer`](crate::Writer).
///
/// Cloning a `ListWriter` yields another handle to the same list.
pub struct ListWriter<'a, S> {
    cursor: Cursor<'a, S>,
}

impl<S> Clone for ListWriter<'_, S> {
    fn clone(&self) -> Self {
        ListWriter {
            cursor: self.cursor.clone(),
        }
    }
}

impl<'a, S: Sink> ListWriter<'a, S> {
    pub(crate) fn new(cursor: Cursor<'a, S>) -> Self {
        ListWriter { cursor }
    }

    /// Appends one value.
    ///
    /// # Panics
    ///
    /// Panics if this list has been closed.
    pub fn append<T: Pack>(&self, value: T) {
        self.cursor.write(|sink| value.pack(sink));
    }

    pub fn append_null(&self) {
        self.cursor.write(|sink| sink.emit_null());
    }

    /// Appends a string whose bytes may arrive in several chunks.
    pub fn append_string<B: ByteSource + ?Sized>(&self, source: &B) {
        self.cursor.write(|sink| {
            sink.emit_string_head(source.byte_len());
            source.for_each_chunk(&mut |chunk| sink.emit_raw(chunk));
        });
    }

    /// Appends a blob whose bytes may arrive in several chunks.
    pub fn append_blob<B: ByteSource + ?Sized>(&self, source: &B) {
        self.cursor.write(|sink| {
            sink.emit_blob_head(source.byte_len());
            source.for_each_chunk(&mut |chunk| sink.emit_raw(chunk));
        });
    }

    /// Appends a formatted string, e.g. `list.append_fmt(format_args!("{id}-{n}"))`.
    ///
    /// # Panics
    ///
    /// Panics if a `Display` implementation reports an error, as `format!` does.
    pub fn append_fmt(&self, args: fmt::Arguments<'_>) {
        let text = fmt::format(args);
        self.append(text.as_str());
    }

    /// Appends the string produced by a formatting callback.
    ///
    /// The callback runs before anything is written, so a failing callback
    /// leaves the document untouched.
    pub fn append_fmt_with<F>(&self, format: F) -> fmt::Result
    where
        F: FnOnce(&mut dyn fmt::Write) -> fmt::Result,
    {
        let mut text = String::new();
        format(&mut text)?;
        self.append(text.as_str());
        Ok(())
    }

    /// Splices bytes that are already VBS-encoded.
    ///
    /// Also supplies the payload after [`declare_string_head`](Self::declare_string_head)
    /// or [`declare_blob_head`](Self::declare_blob_head). The bytes are not checked.
    pub fn append_raw(&self, bytes: &[u8]) {
        self.cursor.write(|sink| sink.emit_raw(bytes));
    }

    /// Splices encoded items whose containers nest `nesting` deep, so the
    /// sink can hold them to its depth limit.
    pub(crate) fn splice_body(&self, bytes: &[u8], nesting: usize) {
        self.cursor.write(|sink| sink.emit_spliced(bytes, nesting));
    }

    /// Starts a string of `len` bytes to be supplied through `append_raw`.
    pub fn declare_string_head(&self, len: usize) {
        self.cursor.write(|sink| sink.emit_string_head(len));
    }

    /// Starts a blob of `len` bytes to be supplied through `append_raw`.
    pub fn declare_blob_head(&self, len: usize) {
        self.cursor.write(|sink| sink.emit_blob_head(len));
    }

    /// Opens a nested list and returns a view over it.
    pub fn append_list(&self) -> ListWriter<'a, S> {
        self.cursor.write_then_open_list(|_| {})
    }

    /// Opens a nested dict and returns a view over it.
    pub fn append_dict(&self) -> DictWriter<'a, S> {
        self.cursor.write_then_open_dict(|_| {})
    }

    /// Opens a nested list filled from `values`; the list stays open.
    pub fn append_list_from<L: ListSource + ?Sized>(&self, values: &L) -> ListWriter<'a, S> {
        let child = self.append_list();
        values.write_all(&child);
        child
    }

    /// Opens a nested dict filled from `dict`; the dict stays open.
    pub fn append_dict_from<D: DictSource + ?Sized>(&self, dict: &D) -> DictWriter<'a, S> {
        let child = self.append_dict();
        dict.write_all(&child);
        child
    }

    /// Writes one item through its [`ListItem`] implementation.
    pub fn append_item<T: ListItem + ?Sized>(&self, item: &T) {
        item.write_item(self);
    }

    /// Writes every element of `values` into this list.
    pub fn append_all<L: ListSource + ?Sized>(&self, values: &L) {
        values.write_all(self);
    }

    /// Seals any open child without writing anything else.
    pub fn flush(&self) {
        self.cursor.finish_child();
    }

    /// Seals any open child, then terminates this list.
    ///
    /// # Panics
    ///
    /// Panics if the list is already closed.
    pub fn close(&self) {
        self.cursor.close();
    }

    pub fn state(&self) -> ContainerState {
        self.cursor.state()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ContainerState::Open
    }

    /// Nesting depth; containers opened at the top level have depth 1.
    pub fn depth(&self) -> usize {
        self.cursor.depth()
    }
}

impl<S: Sink> fmt::Debug for ListWriter<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListWriter")
            .field("depth", &self.depth())
            .field("state", &self.state())
            .finish()
    }
}
