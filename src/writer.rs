//! The document and its container-nesting engine.
//!
//! A [`Writer`] owns the sink and a stack of open frames, one per open
//! container. Because every container has at most one open child, the open
//! containers of a document always form a single chain from the top-level
//! scope down to the innermost leaf, so a stack is the whole arena.
//!
//! Views ([`ListWriter`], [`DictWriter`]) hold a shared borrow of the
//! `Writer` plus a small handle: the frame's serial number and its depth.
//! A handle is live while the frame at its depth still carries its serial;
//! once the frame is popped the container is closed for good.
//!
//! ## Closing Rules
//!
//! - Every write through a view first seals whatever child is still open
//!   beneath it, leaf first, emitting one TAIL per sealed container.
//! - `close()` seals the children, emits the container's own TAIL and pops
//!   it. Closing an already closed container panics.
//! - Writing through a closed view panics.
//! - [`Writer::finish`] closes everything still open and returns the sink.
//!
//! ## Examples
//!
//! ```rust
//! use vbs_writer::{VbsPacker, Writer};
//!
//! let doc = Writer::new(VbsPacker::new());
//! let root = doc.list();
//! root.append(1);
//! let inner = root.append_list();
//! inner.append("a");
//! root.append(2); // seals `inner` first
//! root.close();
//!
//! let bytes = doc.finish().finish().unwrap();
//! assert_eq!(bytes, vec![0x02, 0x41, 0x02, 0x21, b'a', 0x01, 0x42, 0x01]);
//! ```

use crate::{DictWriter, ListWriter, Sink};
use std::cell::{Ref, RefCell};
use tracing::trace;

/// Whether a container still accepts writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerState {
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    /// The implicit scope above the first container; it has no terminator.
    TopLevel,
    List,
    Dict,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    serial: u64,
    scope: Scope,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Handle {
    serial: u64,
    depth: usize,
}

struct State<S> {
    sink: S,
    frames: Vec<Frame>,
    next_serial: u64,
}

impl<S: Sink> State<S> {
    fn is_open(&self, handle: Handle) -> bool {
        self.frames
            .get(handle.depth)
            .map_or(false, |frame| frame.serial == handle.serial)
    }

    fn expect_open(&self, handle: Handle) {
        if !self.is_open(handle) {
            panic!(
                "vbs writer: write to a closed container (depth {})",
                handle.depth
            );
        }
    }

    /// Pops and terminates every frame above `depth`, innermost first.
    fn close_above(&mut self, depth: usize) {
        while self.frames.len() > depth + 1 {
            if let Some(frame) = self.frames.pop() {
                self.terminate(frame);
            }
        }
    }

    fn terminate(&mut self, frame: Frame) {
        if frame.scope != Scope::TopLevel {
            self.sink.end_container();
        }
        trace!(depth = self.frames.len(), scope = ?frame.scope, "closed container");
    }

    fn finish_child(&mut self, handle: Handle) {
        self.expect_open(handle);
        if self.frames.len() > handle.depth + 1 {
            trace!(depth = handle.depth, "auto-finishing open child");
            self.close_above(handle.depth);
        }
    }

    fn open_child(&mut self, handle: Handle, scope: Scope) -> Handle {
        self.finish_child(handle);
        match scope {
            Scope::List => self.sink.begin_list(),
            Scope::Dict => self.sink.begin_dict(),
            Scope::TopLevel => {}
        }
        let serial = self.next_serial;
        self.next_serial += 1;
        self.frames.push(Frame { serial, scope });
        let depth = self.frames.len() - 1;
        trace!(depth, scope = ?scope, "opened container");
        Handle { serial, depth }
    }

    fn close(&mut self, handle: Handle) {
        if !self.is_open(handle) {
            panic!(
                "vbs writer: close of a closed container (depth {})",
                handle.depth
            );
        }
        self.close_above(handle.depth);
        if let Some(frame) = self.frames.pop() {
            self.terminate(frame);
        }
    }
}

/// A VBS document under construction.
///
/// `Writer` is the only owner of the sink. It hands out views that borrow it
/// immutably and coordinate through interior mutability, so a document is
/// confined to one thread (`Writer` is not `Sync`).
///
/// # Examples
///
/// ```rust
/// use vbs_writer::{VbsPacker, Writer};
///
/// let doc = Writer::new(VbsPacker::new());
/// let top = doc.values();
/// top.append(true);
/// top.append("bare");
/// let bytes = doc.finish().finish().unwrap();
/// assert_eq!(bytes, vec![0x19, 0x24, b'b', b'a', b'r', b'e']);
/// ```
pub struct Writer<S> {
    state: RefCell<State<S>>,
}

impl<S: Sink> Writer<S> {
    pub fn new(sink: S) -> Self {
        Writer {
            state: RefCell::new(State {
                sink,
                frames: vec![Frame {
                    serial: 0,
                    scope: Scope::TopLevel,
                }],
                next_serial: 1,
            }),
        }
    }

    /// A list-grammar view of the top-level scope.
    ///
    /// Values appended here are written bare, with no enclosing container.
    pub fn values(&self) -> ListWriter<'_, S> {
        ListWriter::new(Cursor {
            doc: self,
            handle: Handle {
                serial: 0,
                depth: 0,
            },
        })
    }

    /// Opens a root list.
    pub fn list(&self) -> ListWriter<'_, S> {
        self.values().append_list()
    }

    /// Opens a root dict.
    pub fn dict(&self) -> DictWriter<'_, S> {
        self.values().append_dict()
    }

    /// Number of containers currently open, not counting the top-level scope.
    pub fn open_containers(&self) -> usize {
        self.state.borrow().frames.len().saturating_sub(1)
    }

    /// Borrows the sink, e.g. to inspect what has been written so far.
    ///
    /// Call `flush()` on the relevant view first if an open child should be
    /// sealed before looking.
    ///
    /// # Panics
    ///
    /// Panics if called while a write is in progress.
    pub fn sink(&self) -> Ref<'_, S> {
        Ref::map(self.state.borrow(), |state| &state.sink)
    }

    /// Closes every container that is still open, innermost first, and
    /// returns the sink.
    pub fn finish(self) -> S {
        let mut state = self.state.into_inner();
        while let Some(frame) = state.frames.pop() {
            state.terminate(frame);
        }
        state.sink
    }
}

/// A view's position in the document: the document plus one container handle.
pub(crate) struct Cursor<'a, S> {
    doc: &'a Writer<S>,
    handle: Handle,
}

impl<S> Clone for Cursor<'_, S> {
    fn clone(&self) -> Self {
        Cursor {
            doc: self.doc,
            handle: self.handle,
        }
    }
}

impl<'a, S: Sink> Cursor<'a, S> {
    pub(crate) fn state(&self) -> ContainerState {
        if self.doc.state.borrow().is_open(self.handle) {
            ContainerState::Open
        } else {
            ContainerState::Closed
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.handle.depth
    }

    pub(crate) fn finish_child(&self) {
        self.doc.state.borrow_mut().finish_child(self.handle);
    }

    /// Seals any open child, then hands the sink to `f`.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut state = self.doc.state.borrow_mut();
        state.finish_child(self.handle);
        f(&mut state.sink)
    }

    /// Like [`write`](Self::write), then opens a list beneath this container.
    pub(crate) fn write_then_open_list(&self, f: impl FnOnce(&mut S)) -> ListWriter<'a, S> {
        let handle = self.open_after(f, Scope::List);
        ListWriter::new(self.child(handle))
    }

    /// Like [`write`](Self::write), then opens a dict beneath this container.
    pub(crate) fn write_then_open_dict(&self, f: impl FnOnce(&mut S)) -> DictWriter<'a, S> {
        let handle = self.open_after(f, Scope::Dict);
        DictWriter::new(self.child(handle))
    }

    fn open_after(&self, f: impl FnOnce(&mut S), scope: Scope) -> Handle {
        let mut state = self.doc.state.borrow_mut();
        state.finish_child(self.handle);
        f(&mut state.sink);
        state.open_child(self.handle, scope)
    }

    fn child(&self, handle: Handle) -> Cursor<'a, S> {
        Cursor {
            doc: self.doc,
            handle,
        }
    }

    pub(crate) fn close(&self) {
        self.doc.state.borrow_mut().close(self.handle);
    }
}
