use std::path::Path;

use propdoc::props::Result;
use serde::Serialize;

/// Print a payload as pretty JSON on stdout.
pub(crate) fn emit_json<T: Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: json encode failed: {err}"),
	}
}

/// Read a whole file, mapping failures to the crate error.
pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>> {
	Ok(std::fs::read(path)?)
}
