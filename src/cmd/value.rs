use propdoc::props::{ParseOptions, Result, Value, ValueType, parse_value_with, value_to_string};

use crate::cmd::util::emit_json;

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum Kind {
	Int,
	Float,
	Bool,
	String,
}

impl From<Kind> for ValueType {
	fn from(kind: Kind) -> Self {
		match kind {
			Kind::Int => ValueType::Int64,
			Kind::Float => ValueType::Float64,
			Kind::Bool => ValueType::Bool,
			Kind::String => ValueType::String,
		}
	}
}

#[derive(clap::Args)]
pub struct Args {
	pub text: String,
	#[arg(long, value_enum)]
	pub kind: Kind,
	#[arg(long)]
	pub array: bool,
	#[arg(long)]
	pub dict: bool,
	#[arg(long)]
	pub strict: bool,
	#[arg(long)]
	pub json: bool,
}

/// Parse value text and print its canonical form.
pub fn run(args: Args) -> Result<()> {
	let Args {
		text,
		kind,
		array,
		dict,
		strict,
		json,
	} = args;

	let opts = ParseOptions { strict };
	let value = parse_value_with(&text, dict, array, kind.into(), &opts)?;
	let canonical = value_to_string(&value);

	if json {
		emit_json(&ValueJson {
			value_type: value.value_type().as_str(),
			text: canonical,
			value: &value,
		});
		return Ok(());
	}

	println!("type: {}", value.value_type());
	println!("text: {canonical}");
	Ok(())
}

#[derive(serde::Serialize)]
struct ValueJson<'a> {
	#[serde(rename = "type")]
	value_type: &'static str,
	text: String,
	value: &'a Value,
}
