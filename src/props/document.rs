//! Whole-instance save and load through [`Document`].

use std::sync::Arc;

use crate::props::escape::{code_string, decode_string, read_token};
use crate::props::serializer::{SerialContext, load_property_from_value, raw_to_value};
use crate::props::text::{parse_value_with, value_to_string};
use crate::props::{Document, ParseOptions, Properties, PropertyRegistrator, PropsError, Result, StorageSlot};

/// Switches for [`save_to_document`].
#[derive(Debug, Clone)]
pub struct SaveOptions {
	/// Also save properties flagged temporary.
	pub include_temporary: bool,
	/// Omit properties equal to the base instance, or to zero/unset without one.
	pub skip_defaults: bool,
}

impl Default for SaveOptions {
	fn default() -> Self {
		Self {
			include_temporary: false,
			skip_defaults: true,
		}
	}
}

/// Save every persistent property of `props` into a document.
///
/// With `base`, properties whose raw bytes equal the base instance are left
/// out so the document only records the differences.
pub fn save_to_document(props: &Properties, base: Option<&Properties>, ctx: &SerialContext<'_>, opts: &SaveOptions) -> Result<Document> {
	let registrator = props.registrator();
	if base.is_some_and(|base| !Arc::ptr_eq(registrator, base.registrator())) {
		return Err(PropsError::ForeignRegistrator {
			property: String::new(),
			type_name: registrator.type_name().to_owned(),
		});
	}

	let mut doc = Document::new();
	for prop in registrator.properties() {
		let flags = prop.flags();
		if flags.is_virtual || flags.disabled || (flags.temporary && !opts.include_temporary) {
			continue;
		}

		let raw = props.get_raw_data(prop)?;
		if opts.skip_defaults {
			let unchanged = match base {
				Some(base) => base.get_raw_data(prop)? == raw,
				None => match prop.slot() {
					StorageSlot::Pod { .. } => raw.iter().all(|byte| *byte == 0),
					_ => raw.is_empty(),
				},
			};
			if unchanged {
				continue;
			}
		}

		doc.assign(prop.name(), raw_to_value(prop, raw, ctx)?);
	}
	Ok(doc)
}

/// Load every document entry into `props`.
///
/// Entries that fail are logged and skipped; the return value tells whether
/// everything loaded.
pub fn load_from_document(props: &mut Properties, doc: &Document, ctx: &SerialContext<'_>) -> bool {
	let registrator = Arc::clone(props.registrator());
	let mut ok = true;

	for (key, value) in doc.iter() {
		let Some(prop) = registrator.find(key) else {
			log::warn!("{}: unknown property {key:?}", registrator.type_name());
			ok = false;
			continue;
		};
		if !prop.is_persistent() {
			log::error!("{}.{key}: property is not persistent", registrator.type_name());
			ok = false;
			continue;
		}
		if let Err(err) = load_property_from_value(prop, value, ctx, |data| props.set_raw_data(prop, data)) {
			log::error!("{}.{key}: {err}", registrator.type_name());
			ok = false;
		}
	}
	ok
}

/// Render a document as one `key value` line per entry.
pub fn document_to_text(doc: &Document) -> String {
	let mut out = String::new();
	for (key, value) in doc.iter() {
		out.push_str(&code_string(key));
		out.push(' ');
		out.push_str(&code_string(&value_to_string(value)));
		out.push('\n');
	}
	out
}

/// Read lines written by [`document_to_text`], typing each value from `registrator`.
///
/// Blank lines and lines starting with `#` or `;` are skipped. Keys that name
/// no property are logged and skipped; malformed values are errors.
pub fn text_to_document(text: &str, registrator: &PropertyRegistrator) -> Result<Document> {
	let mut doc = Document::new();
	let strict = ParseOptions::strict();

	for (line_no, line) in text.lines().enumerate() {
		let line = line.trim();
		if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
			continue;
		}

		let Some((key_token, rest)) = read_token(line) else {
			continue;
		};
		let key = decode_string(key_token);
		let Some(prop) = registrator.find(&key) else {
			log::warn!("{}: line {}: unknown property {key:?}", registrator.type_name(), line_no + 1);
			continue;
		};

		let value_text = match read_token(rest) {
			Some((token, tail)) if tail.trim().is_empty() => decode_string(token),
			_ => {
				return Err(PropsError::Parse {
					message: format!("line {}: expected one value token for {key:?}", line_no + 1),
				});
			}
		};

		let shape = prop.shape();
		let value = parse_value_with(&value_text, shape.is_dict(), shape.is_array(), prop.base_type().text_kind(), &strict).map_err(|err| PropsError::Parse {
			message: format!("line {}: {key}: {err}", line_no + 1),
		})?;
		doc.assign(key, value);
	}
	Ok(doc)
}
