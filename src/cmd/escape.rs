use propdoc::props::{Result, code_string, decode_string};

#[derive(clap::Args)]
pub struct Args {
	pub text: String,
	#[arg(long)]
	pub decode: bool,
}

/// Run the token codec in either direction.
pub fn run(args: Args) -> Result<()> {
	let Args { text, decode } = args;
	if decode {
		println!("{}", decode_string(&text));
	} else {
		println!("{}", code_string(&text));
	}
	Ok(())
}
