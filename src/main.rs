#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "propdoc", about = "Property document and text pack tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Pack(cmd::pack::Args),
	Unpack(cmd::unpack::Args),
	Value(cmd::value::Args),
	Escape(cmd::escape::Args),
}

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> propdoc::props::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Pack(args) => cmd::pack::run(args),
		Commands::Unpack(args) => cmd::unpack::run(args),
		Commands::Value(args) => cmd::value::run(args),
		Commands::Escape(args) => cmd::escape::run(args),
	}
}
