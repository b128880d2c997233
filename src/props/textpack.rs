//! Flat `u32 -> String` packs used for localized text assets.
//!
//! Binary layout: `u32 count`, then per entry `u32 key`, `u32 len`, `len`
//! UTF-8 bytes. Source layout: one `{key}{suffix}{value}` entry per line,
//! where the two key tokens are each a number or a hashed string and are
//! summed into the final key.

use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::props::bytes::{ByteWriter, Cursor};
use crate::props::compression::decode_pack_bytes;
use crate::props::{PropsError, Result, string_hash};

const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 64 * 1024 * 1024;

/// Safety limits applied while loading stored packs.
#[derive(Debug, Clone)]
pub struct TextPackLimits {
	/// Ceiling on decompressed pack size.
	pub max_decompressed_bytes: usize,
}

impl Default for TextPackLimits {
	fn default() -> Self {
		Self {
			max_decompressed_bytes: DEFAULT_MAX_DECOMPRESSED_BYTES,
		}
	}
}

/// Ordered text table keyed by numeric or hashed ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextPack {
	entries: BTreeMap<u32, String>,
}

impl TextPack {
	/// Create an empty pack.
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert or replace one entry.
	pub fn add(&mut self, key: u32, text: impl Into<String>) {
		self.entries.insert(key, text.into());
	}

	/// Entry text for `key`.
	pub fn get(&self, key: u32) -> Option<&str> {
		self.entries.get(&key).map(String::as_str)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the pack is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Entries in key order.
	pub fn iter(&self) -> btree_map::Iter<'_, u32, String> {
		self.entries.iter()
	}

	/// Copy every entry of `other` in, replacing existing keys.
	pub fn merge(&mut self, other: &TextPack) {
		for (key, text) in &other.entries {
			self.entries.insert(*key, text.clone());
		}
	}

	/// Encode into the binary layout.
	pub fn get_binary_data(&self) -> Result<Vec<u8>> {
		let mut out = ByteWriter::new();
		let count = u32::try_from(self.entries.len()).map_err(|_| PropsError::InvalidTextPack {
			line: 0,
			reason: format!("{} entries do not fit a u32 count", self.entries.len()),
		})?;
		out.write_u32_le(count);
		for (key, text) in &self.entries {
			out.write_u32_le(*key);
			out.write_prefixed(text.as_bytes())?;
		}
		Ok(out.into_bytes())
	}

	/// Decode the binary layout and merge it in.
	///
	/// The payload must hold exactly the announced number of entries; on any
	/// error the pack is left untouched.
	pub fn load_from_binary_data(&mut self, data: &[u8]) -> Result<()> {
		let mut cursor = Cursor::new(data);
		let count = cursor.read_u32_le()?;
		let mut loaded = BTreeMap::new();
		for _ in 0..count {
			let key = cursor.read_u32_le()?;
			let text = cursor.read_prefixed_str("text pack entry")?;
			loaded.insert(key, text.to_owned());
		}
		cursor.finish("text pack")?;

		self.entries.extend(loaded);
		Ok(())
	}

	/// Decode stored pack bytes, zstd-compressed or raw, and merge them in.
	pub fn load_from_bytes(&mut self, raw: Vec<u8>, limits: &TextPackLimits) -> Result<()> {
		let (_, data) = decode_pack_bytes(raw, limits)?;
		self.load_from_binary_data(&data)
	}

	/// Render as `{key}{}{value}` source lines that [`TextPack::load_from_string`] reads back.
	pub fn to_source(&self) -> String {
		let mut out = String::new();
		for (key, text) in &self.entries {
			out.push('{');
			out.push_str(&key.to_string());
			out.push_str("}{}{");
			for ch in text.chars() {
				match ch {
					'{' | '}' | '\\' => {
						out.push('\\');
						out.push(ch);
					}
					'\n' => out.push_str("\\n"),
					'\t' => out.push_str("\\t"),
					_ => out.push(ch),
				}
			}
			out.push_str("}\n");
		}
		out
	}

	/// Parse `{key}{suffix}{value}` source lines and merge them in.
	///
	/// Malformed lines are logged and skipped. Returns the number of entries read.
	pub fn load_from_string(&mut self, text: &str) -> usize {
		let mut lines = text.lines().enumerate();
		let mut added = 0;

		while let Some((idx, line)) = lines.next() {
			let trimmed = line.trim_start();
			if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
				continue;
			}

			let line_no = idx + 1;
			let tokens = match read_brace_tokens(trimmed, &mut lines) {
				Ok(tokens) => tokens,
				Err(reason) => {
					log::warn!("text pack line {line_no}: {reason}");
					continue;
				}
			};

			let (key, suffix, value) = match tokens.as_slice() {
				[key, suffix, value] => (key.as_str(), suffix.as_str(), value),
				[key, value] => (key.as_str(), "", value),
				_ => {
					log::warn!("text pack line {line_no}: expected 2 or 3 brace tokens, got {}", tokens.len());
					continue;
				}
			};

			self.add(key_part(key).wrapping_add(key_part(suffix)), value.clone());
			added += 1;
		}
		added
	}
}

impl<'a> IntoIterator for &'a TextPack {
	type Item = (&'a u32, &'a String);
	type IntoIter = btree_map::Iter<'a, u32, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}

/// A key token is its decimal value when it parses as one, else its string hash.
pub fn key_part(token: &str) -> u32 {
	let trimmed = token.trim();
	trimmed.parse::<u32>().unwrap_or_else(|_| string_hash(trimmed))
}

/// Read up to three `{...}` tokens starting on `first`, pulling more lines
/// while a token is still open.
fn read_brace_tokens<'a>(first: &'a str, rest: &mut impl Iterator<Item = (usize, &'a str)>) -> std::result::Result<Vec<String>, String> {
	let mut tokens = Vec::new();
	let mut buf = String::new();
	let mut depth = 0_usize;
	let mut escaped = false;
	let mut line = first;

	loop {
		for ch in line.chars() {
			if depth == 0 {
				match ch {
					'{' if tokens.len() < 3 => depth = 1,
					ch if ch.is_whitespace() => {}
					'#' | ';' if tokens.len() >= 2 => break,
					other => return Err(format!("unexpected {other:?} outside braces")),
				}
				continue;
			}

			if escaped {
				escaped = false;
				match ch {
					'n' => buf.push('\n'),
					't' => buf.push('\t'),
					'{' | '}' | '\\' => buf.push(ch),
					other => {
						buf.push('\\');
						buf.push(other);
					}
				}
			} else if ch == '\\' {
				escaped = true;
			} else if ch == '{' {
				depth += 1;
				buf.push(ch);
			} else if ch == '}' {
				depth -= 1;
				if depth == 0 {
					tokens.push(std::mem::take(&mut buf));
				} else {
					buf.push(ch);
				}
			} else {
				buf.push(ch);
			}
		}

		if depth == 0 {
			return Ok(tokens);
		}
		if escaped {
			escaped = false;
			buf.push('\\');
		}
		match rest.next() {
			Some((_, next)) => {
				buf.push('\n');
				line = next;
			}
			None => return Err("unterminated brace token".to_owned()),
		}
	}
}

#[cfg(test)]
mod tests;
