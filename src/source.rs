//! Byte sources for string and blob values.
//!
//! A [`ByteSource`] knows its total length up front and yields its bytes as
//! one or more chunks. That is all the writer needs to emit a length head
//! followed by the payload, so segmented buffers never have to be flattened
//! into one allocation first.
//!
//! Implemented for contiguous buffers (`[u8]`, `str`, `Vec<u8>`, `String`,
//! `Cow`), scatter/gather lists (`[IoSlice]`, `[&[u8]]`, `[Vec<u8>]`) and the
//! ring buffer `VecDeque<u8>`.
//!
//! ```rust
//! use std::io::IoSlice;
//! use vbs_writer::{VbsPacker, Writer};
//!
//! let doc = Writer::new(VbsPacker::new());
//! let root = doc.list();
//! let parts = [IoSlice::new(b"he"), IoSlice::new(b"llo")];
//! root.append_string(&parts[..]);
//! root.close();
//!
//! let bytes = doc.finish().finish().unwrap();
//! assert_eq!(bytes, b"\x02\x25hello\x01".to_vec());
//! ```

use std::borrow::Cow;
use std::collections::VecDeque;
use std::io::IoSlice;

/// A logically contiguous run of bytes that may be stored in pieces.
///
/// `for_each_chunk` runs while the document's `RefCell` is mutably
/// borrowed. Touching any view of the same [`Writer`](crate::Writer) from
/// inside it panics with a `RefCell` borrow error (`BorrowMutError` for a
/// write, `BorrowError` for a state query).
pub trait ByteSource {
    /// Total number of bytes across all chunks.
    fn byte_len(&self) -> usize;

    /// Calls `f` with each chunk, in order.
    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8]));
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn byte_len(&self) -> usize {
        (**self).byte_len()
    }

    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
        (**self).for_each_chunk(f)
    }
}

impl ByteSource for [u8] {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
        f(self)
    }
}

impl<const N: usize> ByteSource for [u8; N] {
    fn byte_len(&self) -> usize {
        N
    }

    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
        f(self)
    }
}

impl ByteSource for str {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
        f(self.as_bytes())
    }
}

impl ByteSource for String {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
        f(self.as_bytes())
    }
}

impl ByteSource for Vec<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
        f(self)
    }
}

impl ByteSource for Cow<'_, str> {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
        f(self.as_bytes())
    }
}

impl ByteSource for Cow<'_, [u8]> {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
        f(self)
    }
}

impl ByteSource for VecDeque<u8> {
    fn byte_len(&self) -> usize {
        self.len()
    }

    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
        let (front, back) = self.as_slices();
        for chunk in [front, back] {
            if !chunk.is_empty() {
                f(chunk);
            }
        }
    }
}

macro_rules! segmented_source {
    ($($seg:ty),*) => {
        $(
            impl ByteSource for [$seg] {
                fn byte_len(&self) -> usize {
                    self.iter().map(|seg| seg.len()).sum()
                }

                fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
                    for seg in self {
                        f(seg)
                    }
                }
            }

            impl<const N: usize> ByteSource for [$seg; N] {
                fn byte_len(&self) -> usize {
                    self[..].byte_len()
                }

                fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
                    self[..].for_each_chunk(f)
                }
            }

            impl ByteSource for Vec<$seg> {
                fn byte_len(&self) -> usize {
                    self[..].byte_len()
                }

                fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) {
                    self[..].for_each_chunk(f)
                }
            }
        )*
    };
}

segmented_source!(IoSlice<'_>, &[u8], Vec<u8>);
