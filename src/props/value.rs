//! Document value model.
//!
//! [`Value`] is a closed tagged union. Copies are explicit through
//! [`Value::copy`] so that duplicating a large nested tree is always visible at
//! the call site; a value is replaced wholesale rather than retagged.

use std::collections::HashMap;
use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::props::{PropsError, Result};

/// Tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
	/// Signed 64-bit integer.
	Int64,
	/// 64-bit float.
	Float64,
	/// Boolean.
	Bool,
	/// UTF-8 string.
	String,
	/// Ordered sequence of values.
	Array,
	/// Ordered string-keyed mapping of values.
	Dict,
}

impl ValueType {
	/// Render the tag as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Int64 => "int64",
			Self::Float64 => "float64",
			Self::Bool => "bool",
			Self::String => "string",
			Self::Array => "array",
			Self::Dict => "dict",
		}
	}
}

impl fmt::Display for ValueType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One scalar or container document value.
#[derive(Debug)]
pub enum Value {
	/// Signed 64-bit integer; every integer width widens to this.
	Int64(i64),
	/// 64-bit float; both float widths widen to this.
	Float64(f64),
	/// Boolean.
	Bool(bool),
	/// UTF-8 string.
	String(String),
	/// Exclusively owned array.
	Array(Array),
	/// Exclusively owned dictionary.
	Dict(Dict),
}

impl Value {
	/// Return the active tag.
	pub fn value_type(&self) -> ValueType {
		match self {
			Self::Int64(_) => ValueType::Int64,
			Self::Float64(_) => ValueType::Float64,
			Self::Bool(_) => ValueType::Bool,
			Self::String(_) => ValueType::String,
			Self::Array(_) => ValueType::Array,
			Self::Dict(_) => ValueType::Dict,
		}
	}

	/// Integer payload, if tagged `Int64`.
	pub fn as_int64(&self) -> Option<i64> {
		match self {
			Self::Int64(value) => Some(*value),
			_ => None,
		}
	}

	/// Float payload, if tagged `Float64`.
	pub fn as_double(&self) -> Option<f64> {
		match self {
			Self::Float64(value) => Some(*value),
			_ => None,
		}
	}

	/// Bool payload, if tagged `Bool`.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			_ => None,
		}
	}

	/// String payload, if tagged `String`.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(value) => Some(value),
			_ => None,
		}
	}

	/// Array payload, if tagged `Array`.
	pub fn as_array(&self) -> Option<&Array> {
		match self {
			Self::Array(value) => Some(value),
			_ => None,
		}
	}

	/// Dict payload, if tagged `Dict`.
	pub fn as_dict(&self) -> Option<&Dict> {
		match self {
			Self::Dict(value) => Some(value),
			_ => None,
		}
	}

	/// Deep clone, recursing through arrays and dicts.
	pub fn copy(&self) -> Self {
		match self {
			Self::Int64(value) => Self::Int64(*value),
			Self::Float64(value) => Self::Float64(*value),
			Self::Bool(value) => Self::Bool(*value),
			Self::String(value) => Self::String(value.clone()),
			Self::Array(value) => Self::Array(value.copy()),
			Self::Dict(value) => Self::Dict(value.copy()),
		}
	}

	/// Build a value from JSON. `null` has no counterpart and is rejected.
	pub fn from_json(json: &serde_json::Value) -> Result<Self> {
		Ok(match json {
			serde_json::Value::Null => {
				return Err(PropsError::Parse {
					message: "null has no document value".to_owned(),
				});
			}
			serde_json::Value::Bool(value) => Self::Bool(*value),
			serde_json::Value::Number(number) => match number.as_i64() {
				Some(value) => Self::Int64(value),
				None => Self::Float64(number.as_f64().unwrap_or_default()),
			},
			serde_json::Value::String(value) => Self::String(value.clone()),
			serde_json::Value::Array(items) => {
				let mut out = Array::with_capacity(items.len());
				for item in items {
					out.push(Self::from_json(item)?);
				}
				Self::Array(out)
			}
			serde_json::Value::Object(map) => {
				let mut out = Dict::new();
				for (key, item) in map {
					out.assign(key.clone(), Self::from_json(item)?);
				}
				Self::Dict(out)
			}
		})
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Int64(left), Self::Int64(right)) => left == right,
			(Self::Float64(left), Self::Float64(right)) => float_eq(*left, *right),
			(Self::Bool(left), Self::Bool(right)) => left == right,
			(Self::String(left), Self::String(right)) => left == right,
			(Self::Array(left), Self::Array(right)) => left == right,
			(Self::Dict(left), Self::Dict(right)) => left == right,
			_ => false,
		}
	}
}

/// Compare floats with a relative tolerance that absorbs six-decimal text round-trips.
pub fn float_eq(left: f64, right: f64) -> bool {
	if left == right {
		return true;
	}
	let scale = 1.0_f64.max(left.abs()).max(right.abs());
	(left - right).abs() <= 1e-6 * scale
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Int64(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Int64(i64::from(value))
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Float64(value)
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::String(value.to_owned())
	}
}

impl From<Array> for Value {
	fn from(value: Array) -> Self {
		Self::Array(value)
	}
}

impl From<Dict> for Value {
	fn from(value: Dict) -> Self {
		Self::Dict(value)
	}
}

impl Serialize for Value {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		match self {
			Self::Int64(value) => serializer.serialize_i64(*value),
			Self::Float64(value) => serializer.serialize_f64(*value),
			Self::Bool(value) => serializer.serialize_bool(*value),
			Self::String(value) => serializer.serialize_str(value),
			Self::Array(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items.iter() {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			Self::Dict(dict) => {
				let mut map = serializer.serialize_map(Some(dict.len()))?;
				for (key, item) in dict.iter() {
					map.serialize_entry(key, item)?;
				}
				map.end()
			}
		}
	}
}

/// Ordered sequence of values.
#[derive(Debug, Default, PartialEq)]
pub struct Array {
	items: Vec<Value>,
}

impl Array {
	/// Create an empty array.
	pub fn new() -> Self {
		Self::default()
	}

	/// Create an empty array with reserved capacity.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			items: Vec::with_capacity(capacity),
		}
	}

	/// Number of elements.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Whether the array has no elements.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Reserve room for `additional` more elements.
	pub fn reserve(&mut self, additional: usize) {
		self.items.reserve(additional);
	}

	/// Append an element.
	pub fn push(&mut self, value: impl Into<Value>) {
		self.items.push(value.into());
	}

	/// Element at `index`.
	pub fn get(&self, index: usize) -> Option<&Value> {
		self.items.get(index)
	}

	/// Iterate elements in insertion order.
	pub fn iter(&self) -> std::slice::Iter<'_, Value> {
		self.items.iter()
	}

	/// Deep clone.
	pub fn copy(&self) -> Self {
		Self {
			items: self.items.iter().map(Value::copy).collect(),
		}
	}
}

impl<'a> IntoIterator for &'a Array {
	type Item = &'a Value;
	type IntoIter = std::slice::Iter<'a, Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.items.iter()
	}
}

impl<V: Into<Value>> FromIterator<V> for Array {
	fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
		Self {
			items: iter.into_iter().map(Into::into).collect(),
		}
	}
}

/// Ordered string-keyed mapping of values with unique keys.
#[derive(Debug, Default)]
pub struct Dict {
	entries: Vec<(String, Value)>,
	index: HashMap<String, usize>,
}

impl PartialEq for Dict {
	fn eq(&self, other: &Self) -> bool {
		self.entries == other.entries
	}
}

impl Dict {
	/// Create an empty dict.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the dict has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Whether `key` is present.
	pub fn contains(&self, key: &str) -> bool {
		self.position(key).is_some()
	}

	/// Value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.position(key).map(|index| &self.entries[index].1)
	}

	/// Insert only if `key` is absent. Returns whether the value was inserted.
	pub fn emplace(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
		let key = key.into();
		if self.contains(&key) {
			return false;
		}
		self.push_entry(key, value.into());
		true
	}

	/// Insert or overwrite `key`, keeping the original position on overwrite.
	pub fn assign(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		let key = key.into();
		let value = value.into();
		match self.position(&key) {
			Some(index) => self.entries[index].1 = value,
			None => self.push_entry(key, value),
		}
	}

	/// Iterate entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.entries.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Deep clone.
	pub fn copy(&self) -> Self {
		Self {
			entries: self.entries.iter().map(|(key, value)| (key.clone(), value.copy())).collect(),
			index: self.index.clone(),
		}
	}

	fn position(&self, key: &str) -> Option<usize> {
		self.index.get(key).copied()
	}

	fn push_entry(&mut self, key: String, value: Value) {
		self.index.insert(key.clone(), self.entries.len());
		self.entries.push((key, value));
	}
}

/// Root container holding one record's property values.
#[derive(Debug, Default, PartialEq)]
pub struct Document {
	dict: Dict,
}

impl Document {
	/// Create an empty document.
	pub fn new() -> Self {
		Self::default()
	}

	/// Borrow the underlying dict.
	pub fn as_dict(&self) -> &Dict {
		&self.dict
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.dict.len()
	}

	/// Whether the document is empty.
	pub fn is_empty(&self) -> bool {
		self.dict.is_empty()
	}

	/// Whether `key` is present.
	pub fn contains(&self, key: &str) -> bool {
		self.dict.contains(key)
	}

	/// Value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.dict.get(key)
	}

	/// Insert only if `key` is absent.
	pub fn emplace(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
		self.dict.emplace(key, value)
	}

	/// Insert or overwrite `key`.
	pub fn assign(&mut self, key: impl Into<String>, value: impl Into<Value>) {
		self.dict.assign(key, value);
	}

	/// Iterate entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.dict.iter()
	}

	/// Deep clone.
	pub fn copy(&self) -> Self {
		Self { dict: self.dict.copy() }
	}

	/// Convert into a plain dict value.
	pub fn into_value(self) -> Value {
		Value::Dict(self.dict)
	}
}

impl From<Dict> for Document {
	fn from(dict: Dict) -> Self {
		Self { dict }
	}
}

impl Serialize for Document {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.dict.len()))?;
		for (key, item) in self.dict.iter() {
			map.serialize_entry(key, item)?;
		}
		map.end()
	}
}
