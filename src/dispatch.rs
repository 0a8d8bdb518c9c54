//! Extension traits for replaying Rust values and collections into views.
//!
//! - [`ListItem`] writes one element of a list. Scalars append themselves;
//!   sequences open a nested list and maps a nested dict.
//! - [`DictItem`] is the same for the value half of a dict entry.
//! - [`ListSource`] / [`DictSource`] write *all* elements of a collection
//!   into an already-open view, in the collection's iteration order.
//!
//! Implement `ListItem` or `DictItem` for your own types to control how
//! they decompose:
//!
//! ```rust
//! use vbs_writer::{ListItem, ListWriter, Sink, VbsPacker, Writer};
//!
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! impl ListItem for Point {
//!     fn write_item<S: Sink>(&self, list: &ListWriter<'_, S>) {
//!         let pair = list.append_list();
//!         pair.append(self.x);
//!         pair.append(self.y);
//!     }
//! }
//!
//! let doc = Writer::new(VbsPacker::new());
//! let root = doc.list();
//! root.append_all(&[Point { x: 1, y: 2 }, Point { x: 3, y: 4 }]);
//! root.close();
//!
//! let bytes = doc.finish().finish().unwrap();
//! assert_eq!(
//!     bytes,
//!     vec![0x02, 0x02, 0x41, 0x42, 0x01, 0x02, 0x43, 0x44, 0x01, 0x01]
//! );
//! ```
//!
//! ## Splicing
//!
//! [`List`] and [`Dict`] values that carry their own encoding are replayed by
//! splicing the encoded body in one `append_raw` call instead of walking the
//! items. The output is byte-identical either way.

use crate::{
    Blob, Decimal64, Dict, DictWriter, Key, List, ListWriter, Null, Pack, Raw, Sink, Value,
};
use indexmap::{IndexMap, IndexSet};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use tracing::debug;

/// Writes one value as an element of a list.
pub trait ListItem {
    fn write_item<S: Sink>(&self, list: &ListWriter<'_, S>);
}

/// Writes one value as the value half of a dict entry under `key`.
pub trait DictItem {
    fn write_entry<S: Sink, K: Pack>(&self, dict: &DictWriter<'_, S>, key: K);
}

/// A collection whose elements can be written into an open list.
pub trait ListSource {
    fn write_all<S: Sink>(&self, list: &ListWriter<'_, S>);
}

/// A collection whose entries can be written into an open dict.
pub trait DictSource {
    fn write_all<S: Sink>(&self, dict: &DictWriter<'_, S>);
}

macro_rules! scalar_items {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ListItem for $ty {
                #[inline]
                fn write_item<S: Sink>(&self, list: &ListWriter<'_, S>) {
                    list.append(self);
                }
            }

            impl DictItem for $ty {
                #[inline]
                fn write_entry<S: Sink, K: Pack>(&self, dict: &DictWriter<'_, S>, key: K) {
                    dict.append(key, self);
                }
            }
        )*
    };
}

scalar_items!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool, f32, f64, char, str, String,
    Cow<'_, str>, (), Null, Decimal64, Blob<'_>, Raw<'_>, Key, Value, List, Dict,
);

impl<T: ListItem + ?Sized> ListItem for &T {
    fn write_item<S: Sink>(&self, list: &ListWriter<'_, S>) {
        (**self).write_item(list)
    }
}

impl<T: DictItem + ?Sized> DictItem for &T {
    fn write_entry<S: Sink, K: Pack>(&self, dict: &DictWriter<'_, S>, key: K) {
        (**self).write_entry(dict, key)
    }
}

impl<T: ListItem + ?Sized> ListItem for Box<T> {
    fn write_item<S: Sink>(&self, list: &ListWriter<'_, S>) {
        (**self).write_item(list)
    }
}

impl<T: DictItem + ?Sized> DictItem for Box<T> {
    fn write_entry<S: Sink, K: Pack>(&self, dict: &DictWriter<'_, S>, key: K) {
        (**self).write_entry(dict, key)
    }
}

impl<T: ListItem> ListItem for Option<T> {
    fn write_item<S: Sink>(&self, list: &ListWriter<'_, S>) {
        match self {
            Some(item) => item.write_item(list),
            None => list.append_null(),
        }
    }
}

impl<T: DictItem> DictItem for Option<T> {
    fn write_entry<S: Sink, K: Pack>(&self, dict: &DictWriter<'_, S>, key: K) {
        match self {
            Some(value) => value.write_entry(dict, key),
            None => dict.append_null(key),
        }
    }
}

// Sequences: replayed element by element, nested as a list when they are
// themselves an item.
macro_rules! sequence_impls {
    ($(impl<$($gen:ident),*> for $ty:ty;)*) => {
        $(
            impl<$($gen: ListItem),*> ListSource for $ty {
                fn write_all<S: Sink>(&self, list: &ListWriter<'_, S>) {
                    for item in self.iter() {
                        item.write_item(list);
                    }
                }
            }

            impl<$($gen: ListItem),*> ListItem for $ty {
                fn write_item<S: Sink>(&self, list: &ListWriter<'_, S>) {
                    list.append_list_from(self);
                }
            }

            impl<$($gen: ListItem),*> DictItem for $ty {
                fn write_entry<S: Sink, K: Pack>(&self, dict: &DictWriter<'_, S>, key: K) {
                    dict.append_list_from(key, self);
                }
            }
        )*
    };
}

sequence_impls! {
    impl<T> for [T];
    impl<T> for Vec<T>;
    impl<T> for VecDeque<T>;
    impl<T> for BTreeSet<T>;
    impl<T> for HashSet<T>;
    impl<T> for IndexSet<T>;
}

impl<T: ListItem, const N: usize> ListSource for [T; N] {
    fn write_all<S: Sink>(&self, list: &ListWriter<'_, S>) {
        self[..].write_all(list)
    }
}

impl<T: ListItem, const N: usize> ListItem for [T; N] {
    fn write_item<S: Sink>(&self, list: &ListWriter<'_, S>) {
        list.append_list_from(&self[..]);
    }
}

impl<T: ListItem, const N: usize> DictItem for [T; N] {
    fn write_entry<S: Sink, K: Pack>(&self, dict: &DictWriter<'_, S>, key: K) {
        dict.append_list_from(key, &self[..]);
    }
}

// Maps: replayed entry by entry, nested as a dict when they are themselves
// an item.
macro_rules! map_impls {
    ($(impl<$($gen:ident),*> for $ty:ty;)*) => {
        $(
            impl<K: Pack, V: DictItem, $($gen),*> DictSource for $ty {
                fn write_all<S: Sink>(&self, dict: &DictWriter<'_, S>) {
                    for (key, value) in self.iter() {
                        value.write_entry(dict, key);
                    }
                }
            }

            impl<K: Pack, V: DictItem, $($gen),*> ListItem for $ty {
                fn write_item<S: Sink>(&self, list: &ListWriter<'_, S>) {
                    list.append_dict_from(self);
                }
            }

            impl<K: Pack, V: DictItem, $($gen),*> DictItem for $ty {
                fn write_entry<S: Sink, KK: Pack>(&self, dict: &DictWriter<'_, S>, key: KK) {
                    dict.append_dict_from(key, self);
                }
            }
        )*
    };
}

map_impls! {
    impl<> for BTreeMap<K, V>;
    impl<H> for HashMap<K, V, H>;
    impl<H> for IndexMap<K, V, H>;
}

/// Ordered pairs, duplicates included, written exactly as given.
impl<K: Pack, V: DictItem> DictSource for [(K, V)] {
    fn write_all<S: Sink>(&self, dict: &DictWriter<'_, S>) {
        for (key, value) in self {
            value.write_entry(dict, key);
        }
    }
}

impl<K: Pack, V: DictItem> DictSource for Vec<(K, V)> {
    fn write_all<S: Sink>(&self, dict: &DictWriter<'_, S>) {
        self[..].write_all(dict)
    }
}

impl ListSource for List {
    fn write_all<S: Sink>(&self, list: &ListWriter<'_, S>) {
        if let Some(encoding) = self.encoding() {
            debug!(bytes = encoding.body().len(), "splicing encoded list body");
            list.splice_body(encoding.body(), encoding.body_nesting());
            return;
        }
        for item in self {
            list.append(item);
        }
    }
}

impl DictSource for Dict {
    fn write_all<S: Sink>(&self, dict: &DictWriter<'_, S>) {
        if let Some(encoding) = self.encoding() {
            debug!(bytes = encoding.body().len(), "splicing encoded dict body");
            dict.splice_body(encoding.body(), encoding.body_nesting());
            return;
        }
        for (key, value) in self {
            dict.append(key, value);
        }
    }
}

impl<T: ListSource + ?Sized> ListSource for &T {
    fn write_all<S: Sink>(&self, list: &ListWriter<'_, S>) {
        (**self).write_all(list)
    }
}

impl<T: DictSource + ?Sized> DictSource for &T {
    fn write_all<S: Sink>(&self, dict: &DictWriter<'_, S>) {
        (**self).write_all(dict)
    }
}
