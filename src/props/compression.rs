use std::io::Read;

use crate::props::{PropsError, Result, TextPackLimits};

/// zstd frame magic of compressed packs.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Compression mode of a stored pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	/// Raw pack bytes.
	None,
	/// zstd-compressed pack bytes.
	Zstd,
}

impl Compression {
	/// Render compression mode as a stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}
}

/// Detect and decode compression, returning `(mode, decoded_bytes)`.
///
/// Anything that does not start with the zstd magic is passed through as raw.
pub fn decode_pack_bytes(raw: Vec<u8>, limits: &TextPackLimits) -> Result<(Compression, Vec<u8>)> {
	if raw.starts_with(&ZSTD_MAGIC) {
		let out = decode_zstd(&raw, limits.max_decompressed_bytes)?;
		return Ok((Compression::Zstd, out));
	}
	Ok((Compression::None, raw))
}

/// Encode pack bytes with the requested compression.
pub fn encode_pack_bytes(raw: Vec<u8>, compression: Compression) -> Result<Vec<u8>> {
	match compression {
		Compression::None => Ok(raw),
		Compression::Zstd => Ok(zstd::stream::encode_all(raw.as_slice(), 0)?),
	}
}

fn decode_zstd(raw: &[u8], limit: usize) -> Result<Vec<u8>> {
	let mut decoder = zstd::stream::read::Decoder::new(raw)?;
	let mut out = Vec::new();
	let mut buf = [0_u8; 8192];

	loop {
		let read = decoder.read(&mut buf)?;
		if read == 0 {
			break;
		}

		if out.len() + read > limit {
			return Err(PropsError::DecompressedTooLarge { limit });
		}

		out.extend_from_slice(&buf[..read]);
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::{Compression, ZSTD_MAGIC, decode_pack_bytes, encode_pack_bytes};
	use crate::props::{PropsError, TextPackLimits};

	#[test]
	fn raw_bytes_pass_through() {
		let (mode, out) = decode_pack_bytes(vec![1, 0, 0, 0], &TextPackLimits::default()).expect("raw decodes");
		assert_eq!(mode, Compression::None);
		assert_eq!(out, vec![1, 0, 0, 0]);
	}

	#[test]
	fn zstd_is_detected_and_expanded() {
		let raw = vec![7_u8; 4096];
		let packed = encode_pack_bytes(raw.clone(), Compression::Zstd).expect("compresses");
		assert!(packed.starts_with(&ZSTD_MAGIC));
		assert!(packed.len() < raw.len());

		let (mode, out) = decode_pack_bytes(packed, &TextPackLimits::default()).expect("decompresses");
		assert_eq!(mode, Compression::Zstd);
		assert_eq!(out, raw);
	}

	#[test]
	fn decompression_limit_is_enforced() {
		let packed = encode_pack_bytes(vec![0_u8; 64 * 1024], Compression::Zstd).expect("compresses");
		let limits = TextPackLimits { max_decompressed_bytes: 1024 };
		let err = decode_pack_bytes(packed, &limits).expect_err("too large");
		assert!(matches!(err, PropsError::DecompressedTooLarge { limit: 1024 }));
	}
}
