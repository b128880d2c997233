use std::path::PathBuf;

use propdoc::props::{Result, TextPack, TextPackLimits, decode_pack_bytes};

use crate::cmd::util::{emit_json, read_file};

#[derive(clap::Args)]
pub struct Args {
	pub src: PathBuf,
	#[arg(long)]
	pub json: bool,
	#[arg(long)]
	pub max_decompressed_bytes: Option<usize>,
}

/// List the entries of a binary pack, raw or zstd-compressed.
pub fn run(args: Args) -> Result<()> {
	let Args {
		src,
		json,
		max_decompressed_bytes,
	} = args;

	let mut limits = TextPackLimits::default();
	if let Some(limit) = max_decompressed_bytes {
		limits.max_decompressed_bytes = limit;
	}

	let (compression, data) = decode_pack_bytes(read_file(&src)?, &limits)?;
	let mut pack = TextPack::new();
	pack.load_from_binary_data(&data)?;

	if json {
		let payload = UnpackJson {
			path: src.display().to_string(),
			compression: compression.as_str(),
			count: pack.len(),
			entries: pack.iter().map(|(key, text)| EntryJson { key: *key, text }).collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	print!("{}", pack.to_source());
	Ok(())
}

#[derive(serde::Serialize)]
struct UnpackJson<'a> {
	path: String,
	compression: &'static str,
	count: usize,
	entries: Vec<EntryJson<'a>>,
}

#[derive(serde::Serialize)]
struct EntryJson<'a> {
	key: u32,
	text: &'a str,
}
