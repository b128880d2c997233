/// Token codec command.
pub mod escape;
/// Text pack source to binary command.
pub mod pack;
/// Binary text pack listing command.
pub mod unpack;
/// Shared CLI helpers.
pub(crate) mod util;
/// Value text parsing command.
pub mod value;
