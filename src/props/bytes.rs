use crate::props::{PropsError, Result};

/// Simple bounded cursor over an immutable byte slice.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8]) -> Self {
		Self { bytes, pos: 0 }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Whether every byte has been consumed.
	pub fn is_exhausted(&self) -> bool {
		self.remaining() == 0
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(PropsError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read a little-endian `u32`.
	pub fn read_u32_le(&mut self) -> Result<u32> {
		let raw = self.read_exact(4)?;
		let mut buf = [0_u8; 4];
		buf.copy_from_slice(raw);
		Ok(u32::from_le_bytes(buf))
	}

	/// Read a `u32` length prefix followed by that many bytes.
	pub fn read_prefixed(&mut self) -> Result<&'a [u8]> {
		let len = self.read_u32_le()? as usize;
		self.read_exact(len)
	}

	/// Read a `u32` length-prefixed UTF-8 string.
	pub fn read_prefixed_str(&mut self, context: &str) -> Result<&'a str> {
		let raw = self.read_prefixed()?;
		std::str::from_utf8(raw).map_err(|_| PropsError::InvalidUtf8 { context: context.to_owned() })
	}

	/// Fail unless the whole span was consumed.
	pub fn finish(&self, context: &str) -> Result<()> {
		if !self.is_exhausted() {
			return Err(PropsError::TrailingBytes {
				context: context.to_owned(),
				consumed: self.pos,
				total: self.bytes.len(),
			});
		}
		Ok(())
	}
}

/// Read an unsigned little-endian integer of 1, 2, 4 or 8 bytes.
pub fn read_uint_le(bytes: &[u8]) -> u64 {
	let mut buf = [0_u8; 8];
	let take = bytes.len().min(8);
	buf[..take].copy_from_slice(&bytes[..take]);
	u64::from_le_bytes(buf)
}

/// Read a signed little-endian integer of 1, 2, 4 or 8 bytes, sign-extending.
pub fn read_int_le(bytes: &[u8]) -> i64 {
	let raw = read_uint_le(bytes);
	match bytes.len() {
		1 => i64::from(raw as u8 as i8),
		2 => i64::from(raw as u16 as i16),
		4 => i64::from(raw as u32 as i32),
		_ => raw as i64,
	}
}

/// Growable little-endian output buffer, the write-side mirror of [`Cursor`].
#[derive(Debug, Default)]
pub struct ByteWriter {
	bytes: Vec<u8>,
}

impl ByteWriter {
	/// Create an empty writer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Bytes written so far.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	/// Whether nothing was written.
	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Append raw bytes.
	pub fn write_bytes(&mut self, data: &[u8]) {
		self.bytes.extend_from_slice(data);
	}

	/// Append a little-endian `u32`.
	pub fn write_u32_le(&mut self, value: u32) {
		self.bytes.extend_from_slice(&value.to_le_bytes());
	}

	/// Append the low `size` bytes of `value` in little-endian order.
	pub fn write_uint_le(&mut self, value: u64, size: usize) {
		let raw = value.to_le_bytes();
		self.bytes.extend_from_slice(&raw[..size.min(8)]);
	}

	/// Append a `u32` length prefix followed by `data`.
	pub fn write_prefixed(&mut self, data: &[u8]) -> Result<()> {
		let len = u32::try_from(data.len()).map_err(|_| PropsError::Serialization {
			property: String::new(),
			message: format!("length {} does not fit a u32 prefix", data.len()),
		})?;
		self.write_u32_le(len);
		self.write_bytes(data);
		Ok(())
	}

	/// Consume the writer and return its bytes.
	pub fn into_bytes(self) -> Vec<u8> {
		self.bytes
	}
}
