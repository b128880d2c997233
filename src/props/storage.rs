//! Per-instance raw property storage.
//!
//! Fixed-size properties share one packed byte region addressed by offsets
//! assigned at registration. Every variable-length property owns a separate
//! buffer. Virtual properties have no storage and go through a
//! [`VirtualAccessor`].

use std::fmt;
use std::sync::Arc;

use crate::props::bytes::{read_int_le, read_uint_le};
use crate::props::serializer::{SerialContext, load_property_from_value, raw_to_value};
use crate::props::{BaseKind, ElementType, Property, PropertyRegistrator, PropsError, Result, StorageSlot, Value};

/// Getter/setter pair backing virtual properties, exchanging raw bytes.
pub trait VirtualAccessor: Send + Sync {
	/// Produce the current raw bytes of `prop`.
	fn get(&self, props: &Properties, prop: &Property) -> Result<Vec<u8>>;
	/// Accept new raw bytes for `prop`.
	fn set(&self, props: &mut Properties, prop: &Property, data: &[u8]) -> Result<()>;
}

/// Whether a variable-length property was ever written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawDataState {
	/// Never written (fixed-size properties are never in this state).
	Unset,
	/// Written with zero bytes.
	Empty,
	/// Holds data.
	Filled,
}

/// Raw storage for one entity instance.
#[derive(Clone)]
pub struct Properties {
	registrator: Arc<PropertyRegistrator>,
	pod: Vec<u8>,
	complex: Vec<Option<Box<[u8]>>>,
	accessor: Option<Arc<dyn VirtualAccessor>>,
}

impl fmt::Debug for Properties {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Properties")
			.field("type_name", &self.registrator.type_name())
			.field("pod", &self.pod.len())
			.field("complex", &self.complex.len())
			.field("accessor", &self.accessor.is_some())
			.finish()
	}
}

impl Properties {
	/// Create zeroed storage for the registrator's layout.
	pub fn new(registrator: Arc<PropertyRegistrator>) -> Self {
		let pod = vec![0; registrator.pod_size()];
		let complex = vec![None; registrator.complex_count()];
		Self {
			registrator,
			pod,
			complex,
			accessor: None,
		}
	}

	/// Schema of this instance.
	pub fn registrator(&self) -> &Arc<PropertyRegistrator> {
		&self.registrator
	}

	/// Install the getter/setter pair for virtual properties.
	pub fn set_virtual_accessor(&mut self, accessor: Arc<dyn VirtualAccessor>) {
		self.accessor = Some(accessor);
	}

	fn check_owner(&self, prop: &Property) -> Result<()> {
		if prop.owner() != self.registrator.id() {
			return Err(PropsError::ForeignRegistrator {
				property: prop.name().to_owned(),
				type_name: self.registrator.type_name().to_owned(),
			});
		}
		Ok(())
	}

	/// Current raw bytes of a stored property; empty for unset variable-length data.
	pub fn get_raw_data(&self, prop: &Property) -> Result<&[u8]> {
		self.check_owner(prop)?;
		match prop.slot() {
			StorageSlot::Pod { offset, size } => Ok(&self.pod[offset..offset + size]),
			StorageSlot::Complex { index } => Ok(self.complex[index].as_deref().unwrap_or_default()),
			StorageSlot::Virtual => Err(PropsError::NoRawStorage {
				property: prop.name().to_owned(),
			}),
		}
	}

	/// Replace the raw bytes of a stored property.
	///
	/// Fixed-size writes must match the declared size exactly. Variable-length
	/// buffers are reallocated only when the size changes.
	pub fn set_raw_data(&mut self, prop: &Property, data: &[u8]) -> Result<()> {
		self.check_owner(prop)?;
		match prop.slot() {
			StorageSlot::Pod { offset, size } => {
				if data.len() != size {
					return Err(PropsError::PodSizeMismatch {
						property: prop.name().to_owned(),
						expected: size,
						got: data.len(),
					});
				}
				self.pod[offset..offset + size].copy_from_slice(data);
			}
			StorageSlot::Complex { index } => match &mut self.complex[index] {
				Some(buf) if buf.len() == data.len() => buf.copy_from_slice(data),
				slot => *slot = Some(data.into()),
			},
			StorageSlot::Virtual => {
				return Err(PropsError::NoRawStorage {
					property: prop.name().to_owned(),
				});
			}
		}
		Ok(())
	}

	/// Whether a property's storage was ever written.
	pub fn raw_data_state(&self, prop: &Property) -> Result<RawDataState> {
		self.check_owner(prop)?;
		Ok(match prop.slot() {
			StorageSlot::Pod { .. } => RawDataState::Filled,
			StorageSlot::Complex { index } => match &self.complex[index] {
				None => RawDataState::Unset,
				Some(buf) if buf.is_empty() => RawDataState::Empty,
				Some(_) => RawDataState::Filled,
			},
			StorageSlot::Virtual => {
				return Err(PropsError::NoRawStorage {
					property: prop.name().to_owned(),
				});
			}
		})
	}

	/// Raw bytes of any property, calling the accessor for virtual ones.
	pub fn read_bytes(&self, prop: &Property) -> Result<Vec<u8>> {
		if prop.is_virtual() {
			self.check_owner(prop)?;
			return self.accessor(prop)?.get(self, prop);
		}
		self.get_raw_data(prop).map(<[u8]>::to_vec)
	}

	/// Write raw bytes to any property, calling the accessor for virtual ones.
	pub fn write_bytes(&mut self, prop: &Property, data: &[u8]) -> Result<()> {
		if prop.is_virtual() {
			self.check_owner(prop)?;
			let accessor = self.accessor(prop)?;
			return accessor.set(self, prop, data);
		}
		self.set_raw_data(prop, data)
	}

	fn accessor(&self, prop: &Property) -> Result<Arc<dyn VirtualAccessor>> {
		self.accessor.clone().ok_or_else(|| PropsError::AccessorMissing {
			property: prop.name().to_owned(),
		})
	}

	/// Copy every stored property from `other`, skipping virtual ones.
	pub fn assign_from(&mut self, other: &Properties) -> Result<()> {
		if !Arc::ptr_eq(&self.registrator, &other.registrator) {
			let property = other.registrator.properties().first().map(|prop| prop.name().to_owned()).unwrap_or_default();
			return Err(PropsError::ForeignRegistrator {
				property,
				type_name: self.registrator.type_name().to_owned(),
			});
		}

		let registrator = Arc::clone(&self.registrator);
		for prop in registrator.properties() {
			if prop.is_virtual() {
				continue;
			}
			match prop.slot() {
				StorageSlot::Complex { index } if other.complex[index].is_none() => self.complex[index] = None,
				_ => self.set_raw_data(prop, other.get_raw_data(prop)?)?,
			}
		}
		Ok(())
	}

	/// Read a fixed-size scalar of the exact native type.
	pub fn get_value<T: PodValue>(&self, prop: &Property) -> Result<T> {
		check_pod_type::<T>(prop)?;
		Ok(T::from_le_slice(&self.read_bytes(prop)?))
	}

	/// Write a fixed-size scalar of the exact native type.
	pub fn set_value<T: PodValue>(&mut self, prop: &Property, value: T) -> Result<()> {
		check_pod_type::<T>(prop)?;
		self.write_bytes(prop, &value.to_le_vec())
	}

	/// Read an integer, enum, bool or float scalar widened to `i64`.
	pub fn get_value_as_int(&self, prop: &Property) -> Result<i64> {
		check_getter(prop)?;
		let kind = scalar_kind(prop, "an integer-convertible scalar")?;
		let bytes = self.read_bytes(prop)?;
		Ok(match kind {
			BaseKind::Int { signed: true } | BaseKind::Enum { signed: true } => read_int_le(&bytes),
			BaseKind::Int { signed: false } | BaseKind::Enum { signed: false } => read_uint_le(&bytes) as i64,
			BaseKind::Bool => i64::from(bytes.first().is_some_and(|byte| *byte != 0)),
			BaseKind::Float if bytes.len() == 4 => f32::from_le_slice(&bytes) as i64,
			_ => f64::from_le_slice(&bytes) as i64,
		})
	}

	/// Write an integer, enum, bool or float scalar from `i64`, rejecting out-of-range values.
	pub fn set_value_as_int(&mut self, prop: &Property, value: i64) -> Result<()> {
		check_setter(prop)?;
		let kind = scalar_kind(prop, "an integer-convertible scalar")?;
		let size = prop.base_type().size();
		let bytes = match kind {
			BaseKind::Int { signed } | BaseKind::Enum { signed } => {
				if !int_fits(value, size, *signed) {
					return Err(PropsError::ValueOutOfRange {
						property: prop.name().to_owned(),
						value,
					});
				}
				value.to_le_bytes()[..size].to_vec()
			}
			BaseKind::Bool => vec![u8::from(value != 0)],
			BaseKind::Float if size == 4 => (value as f32).to_le_vec(),
			_ => (value as f64).to_le_vec(),
		};
		self.write_bytes(prop, &bytes)
	}

	/// Read any property as a document value.
	pub fn get_value_as_any(&self, prop: &Property, ctx: &SerialContext<'_>) -> Result<Value> {
		check_getter(prop)?;
		let bytes = self.read_bytes(prop)?;
		raw_to_value(prop, &bytes, ctx)
	}

	/// Write any property from a document value.
	pub fn set_value_as_any(&mut self, prop: &Property, value: &Value, ctx: &SerialContext<'_>) -> Result<()> {
		check_setter(prop)?;
		load_property_from_value(prop, value, ctx, |data| self.write_bytes(prop, data))
	}
}

fn check_getter(prop: &Property) -> Result<()> {
	if !prop.has_getter() {
		return Err(PropsError::AccessDenied {
			property: prop.name().to_owned(),
			op: "get",
		});
	}
	Ok(())
}

fn check_setter(prop: &Property) -> Result<()> {
	if !prop.has_setter() {
		return Err(PropsError::AccessDenied {
			property: prop.name().to_owned(),
			op: "set",
		});
	}
	Ok(())
}

fn scalar_kind<'a>(prop: &'a Property, expected: &'static str) -> Result<&'a BaseKind> {
	let kind = prop.base_type().kind();
	let scalar = matches!(kind, BaseKind::Int { .. } | BaseKind::Enum { .. } | BaseKind::Bool | BaseKind::Float);
	if !prop.desc().is_pod() || !scalar {
		return Err(PropsError::PropertyTypeMismatch {
			property: prop.name().to_owned(),
			expected,
		});
	}
	Ok(kind)
}

fn check_pod_type<T: PodValue>(prop: &Property) -> Result<()> {
	let want = T::base_type();
	let base = prop.base_type();
	if !prop.desc().is_pod() || base.kind() != want.kind() || base.size() != want.size() {
		return Err(PropsError::PropertyTypeMismatch {
			property: prop.name().to_owned(),
			expected: T::LABEL,
		});
	}
	Ok(())
}

/// 8-byte unsigned values travel as the two's complement `i64`, so every `i64` fits.
fn int_fits(value: i64, size: usize, signed: bool) -> bool {
	if size >= 8 {
		return true;
	}
	let bits = (size * 8) as u32;
	let value = i128::from(value);
	if signed {
		let half = 1_i128 << (bits - 1);
		(-half..half).contains(&value)
	} else {
		(0..(1_i128 << bits)).contains(&value)
	}
}

/// Fixed-size scalar readable and writable through [`Properties::get_value`].
pub trait PodValue: ElementType + Sized {
	/// Type label used in mismatch errors.
	const LABEL: &'static str;
	/// Decode from little-endian bytes of exactly the type's size.
	fn from_le_slice(bytes: &[u8]) -> Self;
	/// Encode as little-endian bytes.
	fn to_le_vec(&self) -> Vec<u8>;
}

macro_rules! pod_values {
	($($ty:ty => $label:literal),* $(,)?) => {
		$(
			impl PodValue for $ty {
				const LABEL: &'static str = $label;

				fn from_le_slice(bytes: &[u8]) -> Self {
					let mut buf = [0_u8; std::mem::size_of::<$ty>()];
					let take = bytes.len().min(buf.len());
					buf[..take].copy_from_slice(&bytes[..take]);
					<$ty>::from_le_bytes(buf)
				}

				fn to_le_vec(&self) -> Vec<u8> {
					self.to_le_bytes().to_vec()
				}
			}
		)*
	};
}

pod_values! {
	i8 => "int8",
	i16 => "int16",
	i32 => "int32",
	i64 => "int64",
	u8 => "uint8",
	u16 => "uint16",
	u32 => "uint32",
	u64 => "uint64",
	f32 => "float",
	f64 => "double",
}

impl PodValue for bool {
	const LABEL: &'static str = "bool";

	fn from_le_slice(bytes: &[u8]) -> Self {
		bytes.first().is_some_and(|byte| *byte != 0)
	}

	fn to_le_vec(&self) -> Vec<u8> {
		vec![u8::from(*self)]
	}
}
