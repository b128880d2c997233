use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, PropsError>;

/// Errors produced while registering, storing, transcoding and parsing properties.
#[derive(Debug, Error)]
pub enum PropsError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Transcoding finished before the byte span was consumed.
	#[error("trailing bytes after {context}: consumed={consumed}, total={total}")]
	TrailingBytes {
		/// What was being decoded.
		context: String,
		/// Bytes consumed by the decoder.
		consumed: usize,
		/// Total span length.
		total: usize,
	},
	/// Bytes were expected to be UTF-8 text.
	#[error("invalid utf-8 in {context}")]
	InvalidUtf8 {
		/// What was being decoded.
		context: String,
	},
	/// Base type descriptor is internally inconsistent.
	#[error("invalid base type {name}: {reason}")]
	InvalidBaseType {
		/// Type name.
		name: String,
		/// Why the descriptor was rejected.
		reason: &'static str,
	},
	/// Struct field layout does not fit the declared struct size.
	#[error("invalid struct layout {name}: field {field} at offset {offset} (size {size}) exceeds {struct_size}")]
	InvalidStructLayout {
		/// Struct type name.
		name: String,
		/// Offending field name.
		field: String,
		/// Field byte offset.
		offset: usize,
		/// Field byte size.
		size: usize,
		/// Declared struct size.
		struct_size: usize,
	},
	/// Dictionary key type is not one of string, hash, enum or integer.
	#[error("unsupported dict key type {type_name} for property {property}")]
	UnsupportedKeyType {
		/// Property name.
		property: String,
		/// Rejected key type name.
		type_name: String,
	},
	/// A property with the same name is already registered.
	#[error("duplicate property {name} on {type_name}")]
	DuplicateProperty {
		/// Entity type name.
		type_name: String,
		/// Property name.
		name: String,
	},
	/// Requested property does not exist.
	#[error("property not found on {type_name}: {name}")]
	PropertyNotFound {
		/// Entity type name.
		type_name: String,
		/// Requested property name.
		name: String,
	},
	/// Property belongs to a different registrator than the storage.
	#[error("property {property} does not belong to {type_name}")]
	ForeignRegistrator {
		/// Property name.
		property: String,
		/// Entity type name of the storage.
		type_name: String,
	},
	/// Fixed-size write did not match the declared property size.
	#[error("pod size mismatch for {property}: expected {expected}, got {got}")]
	PodSizeMismatch {
		/// Property name.
		property: String,
		/// Declared size.
		expected: usize,
		/// Provided size.
		got: usize,
	},
	/// Property has no raw storage (virtual).
	#[error("property {property} has no raw storage")]
	NoRawStorage {
		/// Property name.
		property: String,
	},
	/// Virtual property was accessed without an installed accessor.
	#[error("no virtual accessor installed for {property}")]
	AccessorMissing {
		/// Property name.
		property: String,
	},
	/// Registrator side emitted no accessor for this operation.
	#[error("{op} access denied for {property}")]
	AccessDenied {
		/// Property name.
		property: String,
		/// Denied operation (`get` or `set`).
		op: &'static str,
	},
	/// Typed access requested a type the property does not hold.
	#[error("property {property} is not {expected}")]
	PropertyTypeMismatch {
		/// Property name.
		property: String,
		/// Requested logical type.
		expected: &'static str,
	},
	/// Integer does not fit the property's storage width.
	#[error("value {value} out of range for {property}")]
	ValueOutOfRange {
		/// Property name.
		property: String,
		/// Offending value.
		value: i64,
	},
	/// Hash value is not present in the intern table.
	#[error("unresolved hash {hash:#010x}")]
	UnresolvedHash {
		/// Hash value.
		hash: u32,
	},
	/// Two distinct strings produced the same hash.
	#[error("hash collision {hash:#010x}: {existing:?} vs {incoming:?}")]
	HashCollision {
		/// Hash value.
		hash: u32,
		/// String already interned.
		existing: String,
		/// String being interned.
		incoming: String,
	},
	/// Enum or enum value name is unknown.
	#[error("unresolved enum value {enum_name}::{value_name}")]
	UnresolvedEnumValue {
		/// Enum type name.
		enum_name: String,
		/// Symbolic value name.
		value_name: String,
	},
	/// Enum integer has no symbolic name.
	#[error("unresolved enum name {enum_name}({value})")]
	UnresolvedEnumName {
		/// Enum type name.
		enum_name: String,
		/// Integer value.
		value: i64,
	},
	/// Value shape or content does not match the property schema.
	#[error("serialization of {property} failed: {message}")]
	Serialization {
		/// Property name.
		property: String,
		/// Offending value description.
		message: String,
	},
	/// Transcoding of a property failed on a nested error.
	#[error("property {property}: {source}")]
	InProperty {
		/// Property name.
		property: String,
		/// Underlying failure.
		#[source]
		source: Box<PropsError>,
	},
	/// Text document token could not be parsed as the requested kind.
	#[error("parse error: {message}")]
	Parse {
		/// Description of the failure.
		message: String,
	},
	/// Text pack source or payload is malformed.
	#[error("invalid text pack at line {line}: {reason}")]
	InvalidTextPack {
		/// One-based source line (0 for binary payloads).
		line: usize,
		/// Why the pack was rejected.
		reason: String,
	},
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
}
