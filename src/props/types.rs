use std::collections::BTreeMap;

use crate::props::{HashedString, PropsError, Result, ValueType};

/// Leaf classification of a property element type.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseKind {
	/// Integer of `BaseTypeInfo::size` bytes.
	Int {
		/// Whether the integer is signed.
		signed: bool,
	},
	/// IEEE float of 4 or 8 bytes.
	Float,
	/// One-byte boolean.
	Bool,
	/// Named enum stored as an integer of `BaseTypeInfo::size` bytes.
	Enum {
		/// Whether the underlying integer is signed.
		signed: bool,
	},
	/// Interned string stored as its 4-byte hash.
	Hash,
	/// Variable-length UTF-8 string.
	String,
	/// Fixed-size record of nested fields.
	Struct(Vec<StructField>),
}

/// One field of a struct base type.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
	/// Field name.
	pub name: Box<str>,
	/// Field type; always fixed-size.
	pub ty: BaseTypeInfo,
	/// Byte offset inside the struct.
	pub offset: usize,
}

/// Describes one leaf type: name, kind and byte size.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseTypeInfo {
	name: Box<str>,
	kind: BaseKind,
	size: usize,
}

/// Width in bytes of a hashed string.
pub const HASH_SIZE: usize = 4;

impl BaseTypeInfo {
	/// Integer of 1, 2, 4 or 8 bytes.
	pub fn int(name: &str, size: usize, signed: bool) -> Result<Self> {
		check_int_size(name, size)?;
		Ok(Self::raw(name, BaseKind::Int { signed }, size))
	}

	/// Float of 4 or 8 bytes.
	pub fn float(name: &str, size: usize) -> Result<Self> {
		if size != 4 && size != 8 {
			return Err(PropsError::InvalidBaseType {
				name: name.to_owned(),
				reason: "float size must be 4 or 8",
			});
		}
		Ok(Self::raw(name, BaseKind::Float, size))
	}

	/// One-byte bool.
	pub fn boolean() -> Self {
		Self::raw("bool", BaseKind::Bool, 1)
	}

	/// Hashed string.
	pub fn hash() -> Self {
		Self::raw("hstring", BaseKind::Hash, HASH_SIZE)
	}

	/// Variable-length string.
	pub fn string() -> Self {
		Self::raw("string", BaseKind::String, 0)
	}

	/// Named enum over an integer of `size` bytes.
	pub fn enumeration(name: &str, size: usize, signed: bool) -> Result<Self> {
		check_int_size(name, size)?;
		Ok(Self::raw(name, BaseKind::Enum { signed }, size))
	}

	/// Struct of fixed-size fields laid out inside `size` bytes without overlap.
	pub fn structure(name: &str, size: usize, fields: Vec<StructField>) -> Result<Self> {
		if fields.is_empty() {
			return Err(PropsError::InvalidBaseType {
				name: name.to_owned(),
				reason: "struct has no fields",
			});
		}

		let mut used = vec![false; size];
		for field in &fields {
			let fits = field.ty.is_fixed_size() && field.offset.checked_add(field.ty.size).is_some_and(|end| end <= size);
			let overlaps = fits && used[field.offset..field.offset + field.ty.size].iter().any(|slot| *slot);
			if !fits || overlaps {
				return Err(PropsError::InvalidStructLayout {
					name: name.to_owned(),
					field: field.name.to_string(),
					offset: field.offset,
					size: field.ty.size,
					struct_size: size,
				});
			}
			used[field.offset..field.offset + field.ty.size].fill(true);
		}

		Ok(Self::raw(name, BaseKind::Struct(fields), size))
	}

	fn raw(name: &str, kind: BaseKind, size: usize) -> Self {
		Self {
			name: name.into(),
			kind,
			size,
		}
	}

	/// Type name; enums use it for resolver lookups.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Kind classification.
	pub fn kind(&self) -> &BaseKind {
		&self.kind
	}

	/// Byte size; `0` for strings.
	pub fn size(&self) -> usize {
		self.size
	}

	/// Whether every value occupies exactly `size` bytes.
	pub fn is_fixed_size(&self) -> bool {
		!matches!(self.kind, BaseKind::String)
	}

	/// Whether this is the string kind.
	pub fn is_string(&self) -> bool {
		matches!(self.kind, BaseKind::String)
	}

	/// Whether values of this type can key a dict.
	pub fn is_valid_key(&self) -> bool {
		matches!(self.kind, BaseKind::Int { .. } | BaseKind::Enum { .. } | BaseKind::Hash | BaseKind::String)
	}

	/// Scalar kind used when the value is read back from text.
	pub fn text_kind(&self) -> ValueType {
		match self.kind {
			BaseKind::Int { .. } => ValueType::Int64,
			BaseKind::Float => ValueType::Float64,
			BaseKind::Bool => ValueType::Bool,
			BaseKind::Enum { .. } | BaseKind::Hash | BaseKind::String | BaseKind::Struct(_) => ValueType::String,
		}
	}
}

fn check_int_size(name: &str, size: usize) -> Result<()> {
	if !matches!(size, 1 | 2 | 4 | 8) {
		return Err(PropsError::InvalidBaseType {
			name: name.to_owned(),
			reason: "integer size must be 1, 2, 4 or 8",
		});
	}
	Ok(())
}

/// Container topology of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyShape {
	/// One value.
	Simple,
	/// Sequence of values.
	Array,
	/// Key to value mapping.
	Dict,
	/// Key to sequence mapping.
	DictOfArray,
}

impl PropertyShape {
	/// Whether the shape is keyed.
	pub fn is_dict(self) -> bool {
		matches!(self, Self::Dict | Self::DictOfArray)
	}

	/// Whether values are sequences (`Array`, or the values of `DictOfArray`).
	pub fn is_array(self) -> bool {
		matches!(self, Self::Array | Self::DictOfArray)
	}
}

/// Full type of a property: shape, element type and dict key type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDesc {
	/// Container topology.
	pub shape: PropertyShape,
	/// Element type.
	pub base: BaseTypeInfo,
	/// Key type for dict shapes.
	pub key: Option<BaseTypeInfo>,
}

impl TypeDesc {
	/// Single value of `base`.
	pub fn simple(base: BaseTypeInfo) -> Self {
		Self {
			shape: PropertyShape::Simple,
			base,
			key: None,
		}
	}

	/// Array of `base`.
	pub fn array(base: BaseTypeInfo) -> Self {
		Self {
			shape: PropertyShape::Array,
			base,
			key: None,
		}
	}

	/// Dict from `key` to `base`.
	pub fn dict(key: BaseTypeInfo, base: BaseTypeInfo) -> Self {
		Self {
			shape: PropertyShape::Dict,
			base,
			key: Some(key),
		}
	}

	/// Dict from `key` to arrays of `base`.
	pub fn dict_of_array(key: BaseTypeInfo, base: BaseTypeInfo) -> Self {
		Self {
			shape: PropertyShape::DictOfArray,
			base,
			key: Some(key),
		}
	}

	/// Whether the value lives in the fixed-offset region.
	pub fn is_pod(&self) -> bool {
		self.shape == PropertyShape::Simple && self.base.is_fixed_size()
	}

	/// Check shape and key consistency for `property`.
	pub fn validate(&self, property: &str) -> Result<()> {
		match (&self.key, self.shape.is_dict()) {
			(Some(key), true) if key.is_valid_key() => Ok(()),
			(Some(key), true) => Err(PropsError::UnsupportedKeyType {
				property: property.to_owned(),
				type_name: key.name().to_owned(),
			}),
			(None, true) => Err(PropsError::UnsupportedKeyType {
				property: property.to_owned(),
				type_name: "<missing>".to_owned(),
			}),
			(Some(key), false) => Err(PropsError::UnsupportedKeyType {
				property: property.to_owned(),
				type_name: key.name().to_owned(),
			}),
			(None, false) => Ok(()),
		}
	}
}

/// Native type usable as a leaf element.
pub trait ElementType {
	/// Base type descriptor.
	fn base_type() -> BaseTypeInfo;
}

/// Native type usable as a dict key.
pub trait KeyType: ElementType + Ord {}

/// Native type that maps to a full property type.
pub trait PropertyType {
	/// Property type descriptor.
	fn type_desc() -> TypeDesc;
}

macro_rules! int_element {
	($($ty:ty => $name:literal, $signed:literal;)*) => {
		$(
			impl ElementType for $ty {
				fn base_type() -> BaseTypeInfo {
					BaseTypeInfo::raw($name, BaseKind::Int { signed: $signed }, std::mem::size_of::<$ty>())
				}
			}

			impl KeyType for $ty {}
		)*
	};
}

int_element! {
	i8 => "int8", true;
	i16 => "int16", true;
	i32 => "int32", true;
	i64 => "int64", true;
	u8 => "uint8", false;
	u16 => "uint16", false;
	u32 => "uint32", false;
	u64 => "uint64", false;
}

impl ElementType for f32 {
	fn base_type() -> BaseTypeInfo {
		BaseTypeInfo::raw("float", BaseKind::Float, 4)
	}
}

impl ElementType for f64 {
	fn base_type() -> BaseTypeInfo {
		BaseTypeInfo::raw("double", BaseKind::Float, 8)
	}
}

impl ElementType for bool {
	fn base_type() -> BaseTypeInfo {
		BaseTypeInfo::boolean()
	}
}

impl ElementType for String {
	fn base_type() -> BaseTypeInfo {
		BaseTypeInfo::string()
	}
}

impl KeyType for String {}

impl ElementType for HashedString {
	fn base_type() -> BaseTypeInfo {
		BaseTypeInfo::hash()
	}
}

impl KeyType for HashedString {}

macro_rules! property_types {
	($($ty:ty),* $(,)?) => {
		$(
			impl PropertyType for $ty {
				fn type_desc() -> TypeDesc {
					TypeDesc::simple(<$ty>::base_type())
				}
			}

			impl PropertyType for Vec<$ty> {
				fn type_desc() -> TypeDesc {
					TypeDesc::array(<$ty>::base_type())
				}
			}

			impl<K: KeyType> PropertyType for BTreeMap<K, $ty> {
				fn type_desc() -> TypeDesc {
					TypeDesc::dict(K::base_type(), <$ty>::base_type())
				}
			}

			impl<K: KeyType> PropertyType for BTreeMap<K, Vec<$ty>> {
				fn type_desc() -> TypeDesc {
					TypeDesc::dict_of_array(K::base_type(), <$ty>::base_type())
				}
			}
		)*
	};
}

property_types!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, bool, String, HashedString);
