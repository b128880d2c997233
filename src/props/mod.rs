mod bytes;
mod compression;
mod document;
mod enums;
mod error;
mod escape;
mod hash;
mod registry;
mod serializer;
mod storage;
mod text;
mod textpack;
mod types;
mod value;

/// Bounded little-endian byte reader and writer.
pub use bytes::{ByteWriter, Cursor};
/// Compression detection and pack byte codecs.
pub use compression::{Compression, ZSTD_MAGIC, decode_pack_bytes, encode_pack_bytes};
/// Whole-instance document save/load and the line text form.
pub use document::{SaveOptions, document_to_text, load_from_document, save_to_document, text_to_document};
/// Enum name resolution.
pub use enums::{EnumRegistry, NameResolver};
/// Error and result aliases.
pub use error::{PropsError, Result};
/// Token escaping codec.
pub use escape::{Tokens, code_string, decode_string, read_token, tokens};
/// Hashed string interning.
pub use hash::{HashResolver, HashStorage, HashedString, murmur2, string_hash};
/// Property schema registration.
pub use registry::{Access, Property, PropertyFlags, PropertyRegistrator, RegistratorSide, Side, StorageSlot, Visibility};
/// Raw bytes to values and back.
pub use serializer::{SerialContext, desc_raw_to_value, desc_value_to_raw, load_property_from_value, raw_to_value, value_to_raw};
/// Per-instance raw storage.
pub use storage::{PodValue, Properties, RawDataState, VirtualAccessor};
/// Value text form.
pub use text::{ParseOptions, format_bool, format_float, parse_bool, parse_float, parse_int, parse_scalar, parse_value, parse_value_with, value_to_string};
/// Localized text packs.
pub use textpack::{TextPack, TextPackLimits, key_part};
/// Type descriptors and native type classification.
pub use types::{BaseKind, BaseTypeInfo, ElementType, HASH_SIZE, KeyType, PropertyShape, PropertyType, StructField, TypeDesc};
/// Document value model.
pub use value::{Array, Dict, Document, Value, ValueType, float_eq};

#[cfg(test)]
mod test_support;
