use std::path::PathBuf;

use propdoc::props::{Compression, Result, TextPack, encode_pack_bytes};

#[derive(clap::Args)]
pub struct Args {
	pub src: PathBuf,
	pub dst: PathBuf,
	#[arg(long)]
	pub zstd: bool,
}

/// Compile `{key}{suffix}{value}` source lines into a binary pack.
pub fn run(args: Args) -> Result<()> {
	let Args { src, dst, zstd } = args;

	let source = std::fs::read_to_string(&src)?;
	let mut pack = TextPack::new();
	let read = pack.load_from_string(&source);

	let compression = if zstd { Compression::Zstd } else { Compression::None };
	let bytes = encode_pack_bytes(pack.get_binary_data()?, compression)?;
	std::fs::write(&dst, &bytes)?;

	println!("src: {}", src.display());
	println!("dst: {}", dst.display());
	println!("lines_read: {read}");
	println!("entries: {}", pack.len());
	println!("compression: {}", compression.as_str());
	println!("bytes: {}", bytes.len());
	Ok(())
}
