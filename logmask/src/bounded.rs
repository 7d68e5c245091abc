//! Depth-limited serialization.
//!
//! [`Bounded`] wraps a value so that every nested value is serialized through
//! a [`BoundedSerializer`] that knows its depth in the resulting tree. Once a
//! value would land deeper than the limit, serialization stops with a custom
//! error and the shared [`DepthGuard`] records why. Self-referential values
//! therefore fail after `limit` levels instead of recursing until the stack
//! runs out.
//!
//! Depth follows the `serde_json::Value` shape: sequence elements, map values
//! and struct fields sit one level below their container, newtypes and
//! `Some` are transparent, and enum variants with data add the level of the
//! wrapping `{"Variant": ...}` object.

use std::{cell::Cell, fmt::Display};

use serde::{
    ser::{
        Error as _, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
        SerializeTuple, SerializeTupleStruct, SerializeTupleVariant,
    },
    Serialize, Serializer,
};

/// Shared state of one depth-limited conversion.
#[derive(Debug)]
pub(crate) struct DepthGuard {
    limit: usize,
    exceeded: Cell<bool>,
}

impl DepthGuard {
    pub(crate) const fn new(limit: usize) -> Self {
        Self {
            limit,
            exceeded: Cell::new(false),
        }
    }

    pub(crate) fn limit(&self) -> usize {
        self.limit
    }

    /// Whether serialization stopped because the limit was passed.
    pub(crate) fn exceeded(&self) -> bool {
        self.exceeded.get()
    }
}

/// A value serialized at a known depth.
pub(crate) struct Bounded<'a, T: ?Sized> {
    value: &'a T,
    guard: &'a DepthGuard,
    depth: usize,
}

impl<'a, T: ?Sized> Bounded<'a, T> {
    /// Wraps the root value, at depth zero.
    pub(crate) fn root(value: &'a T, guard: &'a DepthGuard) -> Self {
        Self::at(value, guard, 0)
    }

    fn at(value: &'a T, guard: &'a DepthGuard, depth: usize) -> Self {
        Self {
            value,
            guard,
            depth,
        }
    }
}

impl<T> Serialize for Bounded<'_, T>
where
    T: Serialize + ?Sized,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.depth > self.guard.limit {
            self.guard.exceeded.set(true);
            return Err(S::Error::custom(format_args!(
                "value nests deeper than {} levels",
                self.guard.limit
            )));
        }
        self.value.serialize(BoundedSerializer {
            inner: serializer,
            guard: self.guard,
            depth: self.depth,
        })
    }
}

/// Forwards to `inner`, wrapping every nested value in [`Bounded`].
struct BoundedSerializer<'a, S> {
    inner: S,
    guard: &'a DepthGuard,
    depth: usize,
}

/// A compound serializer whose elements sit at `depth`.
struct BoundedCompound<'a, C> {
    inner: C,
    guard: &'a DepthGuard,
    depth: usize,
}

macro_rules! forward_scalars {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, value: $ty) -> Result<Self::Ok, Self::Error> {
                self.inner.$method(value)
            }
        )*
    };
}

impl<'a, S: Serializer> Serializer for BoundedSerializer<'a, S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = BoundedCompound<'a, S::SerializeSeq>;
    type SerializeTuple = BoundedCompound<'a, S::SerializeTuple>;
    type SerializeTupleStruct = BoundedCompound<'a, S::SerializeTupleStruct>;
    type SerializeTupleVariant = BoundedCompound<'a, S::SerializeTupleVariant>;
    type SerializeMap = BoundedCompound<'a, S::SerializeMap>;
    type SerializeStruct = BoundedCompound<'a, S::SerializeStruct>;
    type SerializeStructVariant = BoundedCompound<'a, S::SerializeStructVariant>;

    forward_scalars!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_unit_struct(&'static str),
    );

    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        self.inner.serialize_none()
    }

    fn serialize_some<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.inner
            .serialize_some(&Bounded::at(value, self.guard, self.depth))
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        self.inner.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        self.inner
            .serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.inner
            .serialize_newtype_struct(name, &Bounded::at(value, self.guard, self.depth))
    }

    fn serialize_newtype_variant<T>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.inner.serialize_newtype_variant(
            name,
            variant_index,
            variant,
            &Bounded::at(value, self.guard, self.depth + 1),
        )
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        let (guard, depth) = (self.guard, self.depth);
        let inner = self.inner.serialize_seq(len)?;
        Ok(BoundedCompound {
            inner,
            guard,
            depth: depth + 1,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        let (guard, depth) = (self.guard, self.depth);
        let inner = self.inner.serialize_tuple(len)?;
        Ok(BoundedCompound {
            inner,
            guard,
            depth: depth + 1,
        })
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        let (guard, depth) = (self.guard, self.depth);
        let inner = self.inner.serialize_tuple_struct(name, len)?;
        Ok(BoundedCompound {
            inner,
            guard,
            depth: depth + 1,
        })
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        let (guard, depth) = (self.guard, self.depth);
        let inner = self
            .inner
            .serialize_tuple_variant(name, variant_index, variant, len)?;
        Ok(BoundedCompound {
            inner,
            guard,
            depth: depth + 2,
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        let (guard, depth) = (self.guard, self.depth);
        let inner = self.inner.serialize_map(len)?;
        Ok(BoundedCompound {
            inner,
            guard,
            depth: depth + 1,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        let (guard, depth) = (self.guard, self.depth);
        let inner = self.inner.serialize_struct(name, len)?;
        Ok(BoundedCompound {
            inner,
            guard,
            depth: depth + 1,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        let (guard, depth) = (self.guard, self.depth);
        let inner = self
            .inner
            .serialize_struct_variant(name, variant_index, variant, len)?;
        Ok(BoundedCompound {
            inner,
            guard,
            depth: depth + 2,
        })
    }

    fn collect_str<T>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Display + ?Sized,
    {
        self.inner.collect_str(value)
    }

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }
}

impl<C: SerializeSeq> SerializeSeq for BoundedCompound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let element = Bounded::at(value, self.guard, self.depth);
        self.inner.serialize_element(&element)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: SerializeTuple> SerializeTuple for BoundedCompound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let element = Bounded::at(value, self.guard, self.depth);
        self.inner.serialize_element(&element)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: SerializeTupleStruct> SerializeTupleStruct for BoundedCompound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let field = Bounded::at(value, self.guard, self.depth);
        self.inner.serialize_field(&field)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: SerializeTupleVariant> SerializeTupleVariant for BoundedCompound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let field = Bounded::at(value, self.guard, self.depth);
        self.inner.serialize_field(&field)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: SerializeMap> SerializeMap for BoundedCompound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    // Keys must become strings, so they cannot nest.
    fn serialize_key<T>(&mut self, key: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        self.inner.serialize_key(key)
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let value = Bounded::at(value, self.guard, self.depth);
        self.inner.serialize_value(&value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: SerializeStruct> SerializeStruct for BoundedCompound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let field = Bounded::at(value, self.guard, self.depth);
        self.inner.serialize_field(key, &field)
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), Self::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: SerializeStructVariant> SerializeStructVariant for BoundedCompound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize + ?Sized,
    {
        let field = Bounded::at(value, self.guard, self.depth);
        self.inner.serialize_field(key, &field)
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), Self::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}
