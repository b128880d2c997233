//! Raw property bytes to document values and back.
//!
//! Wire layout per shape (little-endian throughout):
//!
//! - simple string: the whole span is the UTF-8 payload, no prefix
//! - simple fixed-size value: exactly one leaf
//! - array of strings: `u32` count, then `u32`-prefixed strings
//! - array of fixed-size values: packed leaves, count implied by the span length
//! - dict: `key leaf` pairs until the span ends
//! - dict of arrays: `key u32-count leaf*` until the span ends
//!
//! Leaves inside containers that are strings always carry a `u32` length prefix.

use crate::props::bytes::{ByteWriter, Cursor, read_int_le, read_uint_le};
use crate::props::escape::tokens;
use crate::props::text::{parse_bool, parse_float, parse_int, parse_scalar, whole_float_to_int};
use crate::props::{Array, BaseKind, BaseTypeInfo, Dict, HashResolver, NameResolver, Property, PropertyShape, PropsError, Result, TypeDesc, Value};

/// Resolvers needed to turn hashes and enum integers into names and back.
#[derive(Clone, Copy)]
pub struct SerialContext<'a> {
	/// Hashed string table.
	pub hashes: &'a dyn HashResolver,
	/// Enum name table.
	pub names: &'a dyn NameResolver,
}

impl<'a> SerialContext<'a> {
	/// Bundle the two resolvers.
	pub fn new(hashes: &'a dyn HashResolver, names: &'a dyn NameResolver) -> Self {
		Self { hashes, names }
	}
}

/// Decode the raw bytes of `prop` into a document value.
pub fn raw_to_value(prop: &Property, raw: &[u8], ctx: &SerialContext<'_>) -> Result<Value> {
	desc_raw_to_value(prop.name(), prop.desc(), raw, ctx)
}

/// Decode raw bytes described by `desc`; `name` labels errors.
pub fn desc_raw_to_value(name: &str, desc: &TypeDesc, raw: &[u8], ctx: &SerialContext<'_>) -> Result<Value> {
	let decoded = decode_span(name, desc, raw, ctx);
	decoded.map_err(|err| in_property(name, err))
}

/// Encode `value` for `prop` and hand the bytes to `set_data`.
///
/// Nothing is written when the value cannot be encoded.
pub fn load_property_from_value(prop: &Property, value: &Value, ctx: &SerialContext<'_>, set_data: impl FnOnce(&[u8]) -> Result<()>) -> Result<()> {
	let bytes = value_to_raw(prop, value, ctx)?;
	set_data(&bytes)
}

/// Encode `value` into the raw layout of `prop`.
pub fn value_to_raw(prop: &Property, value: &Value, ctx: &SerialContext<'_>) -> Result<Vec<u8>> {
	desc_value_to_raw(prop.name(), prop.desc(), value, ctx)
}

/// Encode `value` into the raw layout described by `desc`; `name` labels errors.
pub fn desc_value_to_raw(name: &str, desc: &TypeDesc, value: &Value, ctx: &SerialContext<'_>) -> Result<Vec<u8>> {
	let encoded = encode_span(name, desc, value, ctx);
	encoded.map_err(|err| in_property(name, err))
}

fn in_property(name: &str, err: PropsError) -> PropsError {
	match err {
		PropsError::Serialization { property, message } if property.is_empty() => PropsError::Serialization {
			property: name.to_owned(),
			message,
		},
		err @ (PropsError::Serialization { .. } | PropsError::InProperty { .. }) => err,
		err => PropsError::InProperty {
			property: name.to_owned(),
			source: Box::new(err),
		},
	}
}

fn shape_error(name: &str, message: String) -> PropsError {
	PropsError::Serialization {
		property: name.to_owned(),
		message,
	}
}

fn describe(value: &Value) -> String {
	match value {
		Value::Array(items) => format!("array of {}", items.len()),
		Value::Dict(dict) => format!("dict of {}", dict.len()),
		other => other.value_type().to_string(),
	}
}

fn decode_span(name: &str, desc: &TypeDesc, raw: &[u8], ctx: &SerialContext<'_>) -> Result<Value> {
	let base = &desc.base;
	let mut cursor = Cursor::new(raw);

	let value = match desc.shape {
		PropertyShape::Simple if base.is_string() => {
			let text = std::str::from_utf8(raw).map_err(|_| PropsError::InvalidUtf8 { context: name.to_owned() })?;
			return Ok(Value::String(text.to_owned()));
		}
		PropertyShape::Simple => {
			if raw.len() != base.size() {
				return Err(shape_error(name, format!("{} byte span for {} of size {}", raw.len(), base.name(), base.size())));
			}
			read_leaf(name, &mut cursor, base, ctx)?
		}
		PropertyShape::Array => Value::Array(read_array_span(name, &mut cursor, base, ctx)?),
		PropertyShape::Dict | PropertyShape::DictOfArray => {
			let key_ty = dict_key(name, desc)?;
			let mut dict = Dict::new();
			while !cursor.is_exhausted() {
				let key = key_text(read_leaf(name, &mut cursor, key_ty, ctx)?);
				let item = if desc.shape == PropertyShape::DictOfArray {
					let count = cursor.read_u32_le()? as usize;
					let mut items = Array::with_capacity(count.min(cursor.remaining()));
					for _ in 0..count {
						items.push(read_leaf(name, &mut cursor, base, ctx)?);
					}
					Value::Array(items)
				} else {
					read_leaf(name, &mut cursor, base, ctx)?
				};
				dict.assign(key, item);
			}
			Value::Dict(dict)
		}
	};

	cursor.finish(name)?;
	Ok(value)
}

fn read_array_span(name: &str, cursor: &mut Cursor<'_>, base: &BaseTypeInfo, ctx: &SerialContext<'_>) -> Result<Array> {
	if base.is_string() {
		if cursor.is_exhausted() {
			return Ok(Array::new());
		}
		let count = cursor.read_u32_le()? as usize;
		let mut items = Array::with_capacity(count.min(cursor.remaining()));
		for _ in 0..count {
			items.push(cursor.read_prefixed_str(name)?);
		}
		return Ok(items);
	}

	let size = base.size();
	if cursor.remaining() % size != 0 {
		return Err(shape_error(name, format!("{} byte span is not a multiple of {} ({size} bytes)", cursor.remaining(), base.name())));
	}
	let count = cursor.remaining() / size;
	let mut items = Array::with_capacity(count);
	for _ in 0..count {
		items.push(read_leaf(name, cursor, base, ctx)?);
	}
	Ok(items)
}

fn dict_key<'d>(name: &str, desc: &'d TypeDesc) -> Result<&'d BaseTypeInfo> {
	desc.key.as_ref().ok_or_else(|| PropsError::UnsupportedKeyType {
		property: name.to_owned(),
		type_name: "<missing>".to_owned(),
	})
}

fn key_text(key: Value) -> String {
	match key {
		Value::String(text) => text,
		other => crate::props::value_to_string(&other),
	}
}

fn read_leaf(name: &str, cursor: &mut Cursor<'_>, ty: &BaseTypeInfo, ctx: &SerialContext<'_>) -> Result<Value> {
	let size = ty.size();
	Ok(match ty.kind() {
		BaseKind::String => Value::String(cursor.read_prefixed_str(name)?.to_owned()),
		BaseKind::Int { signed: true } => Value::Int64(read_int_le(cursor.read_exact(size)?)),
		BaseKind::Int { signed: false } => Value::Int64(read_uint_le(cursor.read_exact(size)?) as i64),
		BaseKind::Float => {
			let bits = read_uint_le(cursor.read_exact(size)?);
			Value::Float64(if size == 4 { f64::from(f32::from_bits(bits as u32)) } else { f64::from_bits(bits) })
		}
		BaseKind::Bool => Value::Bool(cursor.read_exact(size)?.iter().any(|byte| *byte != 0)),
		BaseKind::Enum { signed } => {
			let bytes = cursor.read_exact(size)?;
			let (value, other) = if *signed {
				(read_int_le(bytes), read_uint_le(bytes) as i64)
			} else {
				(read_uint_le(bytes) as i64, read_int_le(bytes))
			};
			// Tables may list the same bit pattern under the other signedness.
			match ctx.names.resolve_enum_value_name(ty.name(), value) {
				Err(_) if other != value => Value::String(ctx.names.resolve_enum_value_name(ty.name(), other).map_err(|_| PropsError::UnresolvedEnumName {
					enum_name: ty.name().to_owned(),
					value,
				})?),
				resolved => Value::String(resolved?),
			}
		}
		BaseKind::Hash => {
			let hash = read_uint_le(cursor.read_exact(size)?) as u32;
			Value::String(ctx.hashes.resolve_hash(hash)?.as_str().to_owned())
		}
		BaseKind::Struct(fields) => {
			let bytes = cursor.read_exact(size)?;
			let mut items = Array::with_capacity(fields.len());
			for field in fields {
				let mut sub = Cursor::new(&bytes[field.offset..field.offset + field.ty.size()]);
				items.push(read_leaf(name, &mut sub, &field.ty, ctx)?);
			}
			Value::Array(items)
		}
	})
}

fn encode_span(name: &str, desc: &TypeDesc, value: &Value, ctx: &SerialContext<'_>) -> Result<Vec<u8>> {
	let base = &desc.base;
	let mut out = ByteWriter::new();

	match desc.shape {
		PropertyShape::Simple if base.is_string() => {
			let text = scalar_text(name, value)?;
			out.write_bytes(text.as_bytes());
		}
		PropertyShape::Simple => write_leaf(name, &mut out, base, value, ctx)?,
		PropertyShape::Array => {
			let Value::Array(items) = value else {
				return Err(shape_error(name, format!("expected array, got {}", describe(value))));
			};
			if base.is_string() {
				if !items.is_empty() {
					out.write_u32_le(count_u32(name, items.len())?);
					for item in items {
						out.write_prefixed(scalar_text(name, item)?.as_bytes())?;
					}
				}
			} else {
				for item in items {
					write_leaf(name, &mut out, base, item, ctx)?;
				}
			}
		}
		PropertyShape::Dict | PropertyShape::DictOfArray => {
			let Value::Dict(dict) = value else {
				return Err(shape_error(name, format!("expected dict, got {}", describe(value))));
			};
			let key_ty = dict_key(name, desc)?;
			for (key, item) in dict.iter() {
				write_leaf(name, &mut out, key_ty, &Value::String(key.to_owned()), ctx)?;
				if desc.shape == PropertyShape::DictOfArray {
					let Value::Array(items) = item else {
						return Err(shape_error(name, format!("expected array under key {key:?}, got {}", describe(item))));
					};
					out.write_u32_le(count_u32(name, items.len())?);
					for element in items {
						write_leaf(name, &mut out, base, element, ctx)?;
					}
				} else {
					write_leaf(name, &mut out, base, item, ctx)?;
				}
			}
		}
	}

	Ok(out.into_bytes())
}

fn count_u32(name: &str, count: usize) -> Result<u32> {
	u32::try_from(count).map_err(|_| shape_error(name, format!("{count} elements do not fit a u32 count")))
}

fn scalar_text(name: &str, value: &Value) -> Result<String> {
	match value {
		Value::String(text) => Ok(text.clone()),
		Value::Int64(_) | Value::Float64(_) | Value::Bool(_) => Ok(crate::props::value_to_string(value)),
		other => Err(shape_error(name, format!("expected string, got {}", describe(other)))),
	}
}

fn write_leaf(name: &str, out: &mut ByteWriter, ty: &BaseTypeInfo, value: &Value, ctx: &SerialContext<'_>) -> Result<()> {
	let size = ty.size();
	match ty.kind() {
		BaseKind::Int { signed } => {
			let number = value_as_int(name, value)?;
			check_range(name, number, size, *signed)?;
			out.write_uint_le(number as u64, size);
		}
		BaseKind::Float => {
			let number = value_as_float(name, value)?;
			if size == 4 {
				out.write_bytes(&(number as f32).to_le_bytes());
			} else {
				out.write_bytes(&number.to_le_bytes());
			}
		}
		BaseKind::Bool => {
			let flag = match value {
				Value::Bool(flag) => *flag,
				Value::Int64(number) => *number != 0,
				Value::String(text) => parse_bool(text)?,
				other => return Err(shape_error(name, format!("expected bool, got {}", describe(other)))),
			};
			out.write_bytes(&[u8::from(flag)]);
		}
		BaseKind::Enum { signed } => {
			let number = match value {
				Value::String(text) => ctx.names.resolve_enum_value(ty.name(), text)?,
				Value::Int64(number) => *number,
				other => return Err(shape_error(name, format!("expected {} name, got {}", ty.name(), describe(other)))),
			};
			// Only the low `size` bytes are stored, so either signedness may fit.
			if check_range(name, number, size, *signed).is_err() {
				check_range(name, number, size, !*signed)?;
			}
			out.write_uint_le(number as u64, size);
		}
		BaseKind::Hash => {
			let text = scalar_text(name, value)?;
			let handle = ctx.hashes.to_hashed_string(&text)?;
			out.write_u32_le(handle.hash());
		}
		BaseKind::String => out.write_prefixed(scalar_text(name, value)?.as_bytes())?,
		BaseKind::Struct(fields) => {
			let parsed;
			let items = match value {
				Value::Array(items) => items,
				Value::String(text) => {
					parsed = struct_fields_from_text(fields, text)?;
					&parsed
				}
				other => return Err(shape_error(name, format!("expected {} fields, got {}", ty.name(), describe(other)))),
			};
			if items.len() != fields.len() {
				return Err(shape_error(name, format!("{} has {} fields, got {}", ty.name(), fields.len(), items.len())));
			}

			let mut record = vec![0_u8; size];
			for (field, item) in fields.iter().zip(items) {
				let mut sub = ByteWriter::new();
				write_leaf(name, &mut sub, &field.ty, item, ctx)?;
				record[field.offset..field.offset + field.ty.size()].copy_from_slice(&sub.into_bytes());
			}
			out.write_bytes(&record);
		}
	}
	Ok(())
}

fn struct_fields_from_text(fields: &[crate::props::StructField], text: &str) -> Result<Array> {
	let mut items = Array::with_capacity(fields.len());
	for (field, token) in fields.iter().zip(tokens(text)) {
		items.push(parse_scalar(token, field.ty.text_kind())?);
	}
	if tokens(text).count() != fields.len() {
		return Err(PropsError::Parse {
			message: format!("expected {} struct fields in {text:?}", fields.len()),
		});
	}
	Ok(items)
}

fn value_as_int(name: &str, value: &Value) -> Result<i64> {
	match value {
		Value::Int64(number) => Ok(*number),
		Value::Float64(number) => whole_float_to_int(*number).ok_or_else(|| shape_error(name, format!("{number} is not a whole number in the i64 range"))),
		Value::Bool(flag) => Ok(i64::from(*flag)),
		Value::String(text) => parse_int(text),
		other => Err(shape_error(name, format!("expected integer, got {}", describe(other)))),
	}
}

fn value_as_float(name: &str, value: &Value) -> Result<f64> {
	match value {
		Value::Int64(number) => Ok(*number as f64),
		Value::Float64(number) => Ok(*number),
		Value::Bool(flag) => Ok(if *flag { 1.0 } else { 0.0 }),
		Value::String(text) => parse_float(text),
		other => Err(shape_error(name, format!("expected number, got {}", describe(other)))),
	}
}

/// Unsigned 64-bit values travel as the two's complement `i64`, so every `i64` fits.
fn check_range(name: &str, value: i64, size: usize, signed: bool) -> Result<()> {
	let bits = (size * 8) as u32;
	let fits = match (signed, bits) {
		(_, 64) => true,
		(true, _) => (-(1_i64 << (bits - 1))..(1_i64 << (bits - 1))).contains(&value),
		(false, _) => (0..(1_i64 << bits)).contains(&value),
	};
	if !fits {
		return Err(PropsError::ValueOutOfRange {
			property: name.to_owned(),
			value,
		});
	}
	Ok(())
}
