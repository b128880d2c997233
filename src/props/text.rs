//! Value tree to text and back.
//!
//! Containers are space-joined token lists; a container nested in another one
//! is protected with [`code_string`] so it stays a single token. The top level
//! of an array or dict is written unprotected.

use crate::props::escape::{code_string, decode_string, tokens};
use crate::props::{Array, Dict, PropsError, Result, Value, ValueType};

/// Behavior switches for [`parse_value_with`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
	/// Report malformed tokens and odd key/value counts instead of stopping early.
	pub strict: bool,
}

impl ParseOptions {
	/// Preset that rejects malformed input.
	pub fn strict() -> Self {
		Self { strict: true }
	}
}

/// Render a value as text that [`parse_value`] reads back.
pub fn value_to_string(value: &Value) -> String {
	match value {
		Value::Array(items) => join_array(items),
		Value::Dict(dict) => join_dict(dict),
		Value::String(text) => unprotect_top_level(text),
		_ => encode(value),
	}
}

/// Format a float in fixed notation with trailing zeros and point removed.
pub fn format_float(value: f64) -> String {
	let mut out = format!("{value:.6}");
	if out.contains('.') {
		let trimmed = out.trim_end_matches('0').trim_end_matches('.').len();
		out.truncate(trimmed);
	}
	out
}

/// Render a bool with the capitalized wire spelling.
pub fn format_bool(value: bool) -> &'static str {
	if value { "True" } else { "False" }
}

fn encode(value: &Value) -> String {
	match value {
		Value::Int64(number) => number.to_string(),
		Value::Float64(number) => format_float(*number),
		Value::Bool(flag) => format_bool(*flag).to_owned(),
		Value::String(text) => code_string(text),
		Value::Array(items) => code_string(&join_array(items)),
		Value::Dict(dict) => code_string(&join_dict(dict)),
	}
}

fn join_array(items: &Array) -> String {
	items.iter().map(encode).collect::<Vec<_>>().join(" ")
}

fn join_dict(dict: &Dict) -> String {
	dict.iter()
		.map(|(key, item)| format!("{} {}", code_string(key), encode(item)))
		.collect::<Vec<_>>()
		.join(" ")
}

fn unprotect_top_level(text: &str) -> String {
	let coded = code_string(text);
	let Some(inner) = coded.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) else {
		return coded;
	};

	let edges_solid = match (inner.chars().next(), inner.chars().last()) {
		(Some(first), Some(last)) => !first.is_whitespace() && !last.is_whitespace(),
		_ => false,
	};
	if edges_solid && !text.starts_with('"') {
		return decode_string(&coded);
	}
	coded
}

/// Parse text produced by [`value_to_string`], stopping early on malformed input.
///
/// `as_array` and `as_dict` select the container shape; both together read a
/// dict whose values are arrays. `kind` is the scalar type of leaf values.
pub fn parse_value(text: &str, as_dict: bool, as_array: bool, kind: ValueType) -> Value {
	match parse_value_with(text, as_dict, as_array, kind, &ParseOptions::default()) {
		Ok(value) => value,
		Err(_) => empty_value(as_dict, as_array, kind),
	}
}

/// Parse with explicit options; lenient mode never fails on token content.
pub fn parse_value_with(text: &str, as_dict: bool, as_array: bool, kind: ValueType, opt: &ParseOptions) -> Result<Value> {
	match (as_dict, as_array) {
		(false, false) => match parse_scalar(text, kind) {
			Ok(value) => Ok(value),
			Err(err) if opt.strict => Err(err),
			Err(_) => Ok(default_scalar(kind)),
		},
		(false, true) => Ok(Value::Array(parse_array_tokens(text, kind, opt)?)),
		(true, _) => {
			let mut dict = Dict::new();
			let mut iter = tokens(text);
			while let Some(key) = iter.next() {
				let Some(raw) = iter.next() else {
					if opt.strict {
						return Err(PropsError::Parse {
							message: format!("missing value for key {key}"),
						});
					}
					break;
				};

				let value = if as_array {
					Value::Array(parse_array_tokens(&decode_string(raw), kind, opt)?)
				} else {
					match parse_token(raw, kind) {
						Ok(value) => value,
						Err(err) if opt.strict => return Err(err),
						Err(_) => break,
					}
				};
				dict.assign(decode_string(key), value);
			}
			Ok(Value::Dict(dict))
		}
	}
}

fn parse_array_tokens(text: &str, kind: ValueType, opt: &ParseOptions) -> Result<Array> {
	let mut out = Array::new();
	for token in tokens(text) {
		match parse_token(token, kind) {
			Ok(value) => out.push(value),
			Err(err) if opt.strict => return Err(err),
			Err(_) => break,
		}
	}
	Ok(out)
}

fn parse_token(token: &str, kind: ValueType) -> Result<Value> {
	let decoded = decode_string(token);
	match kind {
		ValueType::String => Ok(Value::String(decoded)),
		_ => parse_scalar(&decoded, kind),
	}
}

/// Parse one scalar of `kind`. Strings are decoded when they arrive quoted.
pub fn parse_scalar(text: &str, kind: ValueType) -> Result<Value> {
	match kind {
		ValueType::Int64 => parse_int(text).map(Value::Int64),
		ValueType::Float64 => parse_float(text).map(Value::Float64),
		ValueType::Bool => parse_bool(text).map(Value::Bool),
		ValueType::String => Ok(Value::String(if text.starts_with('"') {
			decode_string(text)
		} else {
			text.to_owned()
		})),
		ValueType::Array | ValueType::Dict => Err(PropsError::Parse {
			message: format!("{kind} is not a scalar kind"),
		}),
	}
}

/// Parse an integer literal, accepting a float literal with a whole value.
pub fn parse_int(text: &str) -> Result<i64> {
	let trimmed = text.trim();
	if let Ok(value) = trimmed.parse::<i64>() {
		return Ok(value);
	}
	trimmed.parse::<f64>().ok().and_then(whole_float_to_int).ok_or_else(|| PropsError::Parse {
		message: format!("invalid integer {trimmed:?}"),
	})
}

/// Exact `i64` for a whole float inside the `i64` range.
pub(crate) fn whole_float_to_int(value: f64) -> Option<i64> {
	const LIMIT: f64 = 9_223_372_036_854_775_808.0;
	(value.fract() == 0.0 && (-LIMIT..LIMIT).contains(&value)).then_some(value as i64)
}

/// Parse a float literal.
pub fn parse_float(text: &str) -> Result<f64> {
	let trimmed = text.trim();
	trimmed.parse::<f64>().map_err(|_| PropsError::Parse {
		message: format!("invalid number {trimmed:?}"),
	})
}

/// Parse `True`/`False` in any case, or an integer where non-zero means true.
pub fn parse_bool(text: &str) -> Result<bool> {
	let trimmed = text.trim();
	if trimmed.eq_ignore_ascii_case("true") {
		return Ok(true);
	}
	if trimmed.eq_ignore_ascii_case("false") {
		return Ok(false);
	}
	trimmed.parse::<i64>().map(|value| value != 0).map_err(|_| PropsError::Parse {
		message: format!("invalid bool {trimmed:?}"),
	})
}

fn default_scalar(kind: ValueType) -> Value {
	match kind {
		ValueType::Int64 => Value::Int64(0),
		ValueType::Float64 => Value::Float64(0.0),
		ValueType::Bool => Value::Bool(false),
		ValueType::String | ValueType::Array | ValueType::Dict => Value::String(String::new()),
	}
}

fn empty_value(as_dict: bool, as_array: bool, kind: ValueType) -> Value {
	match (as_dict, as_array) {
		(true, _) => Value::Dict(Dict::new()),
		(false, true) => Value::Array(Array::new()),
		(false, false) => default_scalar(kind),
	}
}
