//! Schema-driven entity property storage with binary and text document transcoding.

/// Value model, property schema, raw storage, serializer and text codecs.
pub mod props;
