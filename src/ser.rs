//! Serde serialization into VBS views.
//!
//! This module provides a [`Serializer`] that replays any `T: Serialize`
//! through [`ListWriter`] / [`DictWriter`] calls, so serde types get the
//! same nesting guarantees as hand-written documents.
//!
//! ## Data Model Mapping
//!
//! | serde                                   | VBS                        |
//! |-----------------------------------------|----------------------------|
//! | bool, integers, floats, char, str       | the matching primitive     |
//! | bytes                                   | BLOB                       |
//! | unit, unit struct, `None`               | NULL                       |
//! | seq, tuple, tuple struct                | LIST                       |
//! | map, struct                             | DICT                       |
//! | unit variant                            | STRING (variant name)      |
//! | newtype / tuple / struct variant        | DICT `{variant: payload}`  |
//!
//! Map keys must serialize as integers or strings.
//!
//! ## Usage
//!
//! Most users should use the functions in the crate root:
//!
//! ```rust
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let bytes = vbs_writer::to_vec(&Point { x: 1, y: 2 }).unwrap();
//! assert_eq!(bytes, b"\x03\x21x\x41\x21y\x42\x01".to_vec());
//! ```
//!
//! ## Mixing With Hand-Written Output
//!
//! ```rust
//! use vbs_writer::{VbsPacker, Writer};
//!
//! let doc = Writer::new(VbsPacker::new());
//! let root = doc.dict();
//! root.append("version", 2);
//! root.append_serialize("payload", &vec![1, 2, 3]).unwrap();
//! root.close();
//! let bytes = doc.finish().finish().unwrap();
//! assert_eq!(bytes[0], 0x03);
//! ```

use crate::{Blob, DictWriter, Error, Key, ListWriter, Pack, Result, Sink};
use serde::ser::{self, Impossible, Serialize};

/// Where the next serialized value lands.
enum Slot<'a, S> {
    Item(ListWriter<'a, S>),
    Entry(DictWriter<'a, S>, Key),
}

/// The VBS serializer.
///
/// A `Serializer` writes exactly one value: either as the next element of a
/// list or as the value of one dict entry.
pub struct Serializer<'a, S> {
    slot: Slot<'a, S>,
}

impl<'a, S: Sink> Serializer<'a, S> {
    /// A serializer that appends its value to `list`.
    pub fn list_item(list: &ListWriter<'a, S>) -> Self {
        Serializer {
            slot: Slot::Item(list.clone()),
        }
    }

    /// A serializer that writes its value into `dict` under `key`.
    pub fn dict_entry(dict: &DictWriter<'a, S>, key: impl Into<Key>) -> Self {
        Serializer {
            slot: Slot::Entry(dict.clone(), key.into()),
        }
    }

    fn scalar<T: Pack>(self, value: T) -> Result<()> {
        match self.slot {
            Slot::Item(list) => list.append(value),
            Slot::Entry(dict, key) => dict.append(key, value),
        }
        Ok(())
    }

    fn open_list(self) -> ListWriter<'a, S> {
        match self.slot {
            Slot::Item(list) => list.append_list(),
            Slot::Entry(dict, key) => dict.append_list(key),
        }
    }

    fn open_dict(self) -> DictWriter<'a, S> {
        match self.slot {
            Slot::Item(list) => list.append_dict(),
            Slot::Entry(dict, key) => dict.append_dict(key),
        }
    }
}

impl<'a, S: Sink> ser::Serializer for Serializer<'a, S> {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = SeqSerializer<'a, S>;
    type SerializeTuple = SeqSerializer<'a, S>;
    type SerializeTupleStruct = SeqSerializer<'a, S>;
    type SerializeTupleVariant = TupleVariantSerializer<'a, S>;
    type SerializeMap = MapSerializer<'a, S>;
    type SerializeStruct = StructSerializer<'a, S>;
    type SerializeStructVariant = StructVariantSerializer<'a, S>;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_i128(self, v: i128) -> Result<()> {
        match i64::try_from(v) {
            Ok(v) => self.scalar(v),
            Err(_) => Err(Error::unsupported_type("i128 outside the 64-bit range")),
        }
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_u128(self, v: u128) -> Result<()> {
        match u64::try_from(v) {
            Ok(v) => self.scalar(v),
            Err(_) => Err(Error::unsupported_type("u128 outside the 64-bit range")),
        }
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.scalar(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.scalar(Blob(v))
    }

    fn serialize_none(self) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.scalar(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let outer = self.open_dict();
        value.serialize(Serializer::dict_entry(&outer, variant))?;
        outer.close();
        Ok(())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Ok(SeqSerializer {
            list: self.open_list(),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        let outer = self.open_dict();
        let list = outer.append_list(variant);
        Ok(TupleVariantSerializer { outer, list })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Ok(MapSerializer {
            dict: self.open_dict(),
            current_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Ok(StructSerializer {
            dict: self.open_dict(),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        let outer = self.open_dict();
        let dict = outer.append_dict(variant);
        Ok(StructVariantSerializer { outer, dict })
    }
}

pub struct SeqSerializer<'a, S> {
    list: ListWriter<'a, S>,
}

impl<'a, S: Sink> ser::SerializeSeq for SeqSerializer<'a, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(Serializer::list_item(&self.list))
    }

    fn end(self) -> Result<()> {
        self.list.close();
        Ok(())
    }
}

impl<'a, S: Sink> ser::SerializeTuple for SeqSerializer<'a, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<()> {
        ser::SerializeSeq::end(self)
    }
}

impl<'a, S: Sink> ser::SerializeTupleStruct for SeqSerializer<'a, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<()> {
        ser::SerializeSeq::end(self)
    }
}

pub struct TupleVariantSerializer<'a, S> {
    outer: DictWriter<'a, S>,
    list: ListWriter<'a, S>,
}

impl<'a, S: Sink> ser::SerializeTupleVariant for TupleVariantSerializer<'a, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(Serializer::list_item(&self.list))
    }

    fn end(self) -> Result<()> {
        self.list.close();
        self.outer.close();
        Ok(())
    }
}

pub struct MapSerializer<'a, S> {
    dict: DictWriter<'a, S>,
    current_key: Option<Key>,
}

impl<'a, S: Sink> ser::SerializeMap for MapSerializer<'a, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        value.serialize(Serializer::dict_entry(&self.dict, key))
    }

    fn end(self) -> Result<()> {
        self.dict.close();
        Ok(())
    }
}

pub struct StructSerializer<'a, S> {
    dict: DictWriter<'a, S>,
}

impl<'a, S: Sink> ser::SerializeStruct for StructSerializer<'a, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(Serializer::dict_entry(&self.dict, key))
    }

    fn end(self) -> Result<()> {
        self.dict.close();
        Ok(())
    }
}

pub struct StructVariantSerializer<'a, S> {
    outer: DictWriter<'a, S>,
    dict: DictWriter<'a, S>,
}

impl<'a, S: Sink> ser::SerializeStructVariant for StructVariantSerializer<'a, S> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(Serializer::dict_entry(&self.dict, key))
    }

    fn end(self) -> Result<()> {
        self.dict.close();
        self.outer.close();
        Ok(())
    }
}

/// Turns a serde map key into a [`Key`].
struct KeySerializer;

impl KeySerializer {
    fn reject(kind: &str) -> Error {
        Error::invalid_key(&format!("{kind} cannot be a dictionary key"))
    }
}

impl ser::Serializer for KeySerializer {
    type Ok = Key;
    type Error = Error;

    type SerializeSeq = Impossible<Key, Error>;
    type SerializeTuple = Impossible<Key, Error>;
    type SerializeTupleStruct = Impossible<Key, Error>;
    type SerializeTupleVariant = Impossible<Key, Error>;
    type SerializeMap = Impossible<Key, Error>;
    type SerializeStruct = Impossible<Key, Error>;
    type SerializeStructVariant = Impossible<Key, Error>;

    fn serialize_bool(self, _v: bool) -> Result<Key> {
        Err(Self::reject("bool"))
    }

    fn serialize_i8(self, v: i8) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Key> {
        i64::try_from(v)
            .map(Key::Integer)
            .map_err(|_| Error::invalid_key("u64 key outside the i64 range"))
    }

    fn serialize_f32(self, _v: f32) -> Result<Key> {
        Err(Self::reject("f32"))
    }

    fn serialize_f64(self, _v: f64) -> Result<Key> {
        Err(Self::reject("f64"))
    }

    fn serialize_char(self, v: char) -> Result<Key> {
        Ok(Key::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Key> {
        Err(Self::reject("bytes"))
    }

    fn serialize_none(self) -> Result<Key> {
        Err(Self::reject("none"))
    }

    fn serialize_some<T>(self, value: &T) -> Result<Key>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Key> {
        Err(Self::reject("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Key> {
        Err(Self::reject(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Key> {
        Ok(Key::from(variant))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Key>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Key>
    where
        T: ?Sized + Serialize,
    {
        Err(Self::reject(name))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Self::reject("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Self::reject("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(Self::reject(name))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(Self::reject(name))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Self::reject("map"))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Self::reject(name))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(Self::reject(name))
    }
}

impl<'a, S: Sink> ListWriter<'a, S> {
    /// Appends any `T: Serialize` as one element.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be expressed in VBS. Elements
    /// written before the failure stay in the document.
    pub fn append_serialize<T: ?Sized + Serialize>(&self, value: &T) -> Result<()> {
        value.serialize(Serializer::list_item(self))
    }
}

impl<'a, S: Sink> DictWriter<'a, S> {
    /// Appends an entry whose value is any `T: Serialize`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be expressed in VBS.
    pub fn append_serialize<K, T>(&self, key: K, value: &T) -> Result<()>
    where
        K: Into<Key>,
        T: ?Sized + Serialize,
    {
        value.serialize(Serializer::dict_entry(self, key))
    }
}
