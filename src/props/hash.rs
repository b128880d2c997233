use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::props::{PropsError, Result};

const MURMUR_M: u32 = 0x5bd1_e995;
const MURMUR_R: u32 = 24;

/// 32-bit MurmurHash2.
pub fn murmur2(data: &[u8], seed: u32) -> u32 {
	let mut h = seed ^ data.len() as u32;

	let mut chunks = data.chunks_exact(4);
	for chunk in &mut chunks {
		let mut k = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
		k = k.wrapping_mul(MURMUR_M);
		k ^= k >> MURMUR_R;
		k = k.wrapping_mul(MURMUR_M);
		h = h.wrapping_mul(MURMUR_M);
		h ^= k;
	}

	let tail = chunks.remainder();
	if tail.len() >= 3 {
		h ^= u32::from(tail[2]) << 16;
	}
	if tail.len() >= 2 {
		h ^= u32::from(tail[1]) << 8;
	}
	if !tail.is_empty() {
		h ^= u32::from(tail[0]);
		h = h.wrapping_mul(MURMUR_M);
	}

	h ^= h >> 13;
	h = h.wrapping_mul(MURMUR_M);
	h ^= h >> 15;
	h
}

/// Hash used for interned strings; the empty string is always `0`.
pub fn string_hash(text: &str) -> u32 {
	if text.is_empty() { 0 } else { murmur2(text.as_bytes(), 0) }
}

/// Interned string handle: the hash plus its canonical text.
#[derive(Debug, Clone)]
pub struct HashedString {
	hash: u32,
	text: Arc<str>,
}

impl HashedString {
	/// The empty string handle.
	pub fn empty() -> Self {
		Self { hash: 0, text: Arc::from("") }
	}

	/// Hash value.
	pub fn hash(&self) -> u32 {
		self.hash
	}

	/// Canonical text.
	pub fn as_str(&self) -> &str {
		&self.text
	}

	/// Whether this is the empty string.
	pub fn is_empty(&self) -> bool {
		self.hash == 0
	}
}

impl Default for HashedString {
	fn default() -> Self {
		Self::empty()
	}
}

impl PartialEq for HashedString {
	fn eq(&self, other: &Self) -> bool {
		self.hash == other.hash
	}
}

impl Eq for HashedString {}

impl PartialOrd for HashedString {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for HashedString {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.hash.cmp(&other.hash)
	}
}

impl fmt::Display for HashedString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.text)
	}
}

/// Maps text to hashed handles and hashes back to text.
pub trait HashResolver {
	/// Intern `text` and return its handle.
	fn to_hashed_string(&self, text: &str) -> Result<HashedString>;
	/// Resolve a hash previously produced by [`HashResolver::to_hashed_string`].
	fn resolve_hash(&self, hash: u32) -> Result<HashedString>;
}

/// Process-lifetime intern table.
///
/// Lookups take a shared lock; the exclusive lock is only taken to insert a
/// string that was never seen before.
#[derive(Debug, Default)]
pub struct HashStorage {
	table: RwLock<HashMap<u32, Arc<str>>>,
}

impl HashStorage {
	/// Create an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of interned strings.
	pub fn len(&self) -> usize {
		self.table.read().len()
	}

	/// Whether nothing was interned yet.
	pub fn is_empty(&self) -> bool {
		self.table.read().is_empty()
	}
}

impl HashResolver for HashStorage {
	fn to_hashed_string(&self, text: &str) -> Result<HashedString> {
		let hash = string_hash(text);
		if hash == 0 {
			return Ok(HashedString::empty());
		}

		if let Some(existing) = self.table.read().get(&hash) {
			return checked_handle(hash, existing, text);
		}

		let mut table = self.table.write();
		let entry = table.entry(hash).or_insert_with(|| Arc::from(text));
		checked_handle(hash, entry, text)
	}

	fn resolve_hash(&self, hash: u32) -> Result<HashedString> {
		if hash == 0 {
			return Ok(HashedString::empty());
		}
		self.table
			.read()
			.get(&hash)
			.map(|text| HashedString { hash, text: Arc::clone(text) })
			.ok_or(PropsError::UnresolvedHash { hash })
	}
}

fn checked_handle(hash: u32, existing: &Arc<str>, incoming: &str) -> Result<HashedString> {
	if existing.as_ref() != incoming {
		return Err(PropsError::HashCollision {
			hash,
			existing: existing.to_string(),
			incoming: incoming.to_owned(),
		});
	}
	Ok(HashedString {
		hash,
		text: Arc::clone(existing),
	})
}
