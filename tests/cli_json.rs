#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

#[test]
fn pack_then_unpack_lists_fixture_entries() {
	let dst = scratch_path("plain.pack");
	let output = run(&["pack", &fixture_arg("creatures.pack.txt"), &path_arg(&dst)]);
	assert!(output.status.success(), "pack should succeed");
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.contains("entries: 6"), "unexpected pack summary: {stdout}");

	let json = run_json(&["unpack", &path_arg(&dst), "--json"]);
	assert_eq!(json["compression"], "none");
	assert_eq!(json["count"], 6);

	let entries = json["entries"].as_array().expect("entries array");
	assert_eq!(entries[0]["key"], 1000);
	assert_eq!(entries[0]["text"], "Wolf");
	assert!(entries.iter().any(|entry| entry["key"] == 1011 && entry["text"] == "Two heads,\none opinion."));
	assert!(entries.iter().any(|entry| entry["text"] == "Hello, {player}!"));
	assert!(entries.iter().any(|entry| entry["text"] == "Safe travels {friend}"));
}

#[test]
fn zstd_packs_unpack_transparently() {
	let dst = scratch_path("zstd.pack");
	let output = run(&["pack", &fixture_arg("creatures.pack.txt"), &path_arg(&dst), "--zstd"]);
	assert!(output.status.success(), "pack --zstd should succeed");

	let json = run_json(&["unpack", &path_arg(&dst), "--json"]);
	assert_eq!(json["compression"], "zstd");
	assert_eq!(json["count"], 6);

	let limited = run(&["unpack", &path_arg(&dst), "--max-decompressed-bytes", "8"]);
	assert!(!limited.status.success(), "tiny decompression limit should fail");
}

#[test]
fn unpack_text_output_reads_back_as_source() {
	let dst = scratch_path("text.pack");
	assert!(run(&["pack", &fixture_arg("creatures.pack.txt"), &path_arg(&dst)]).status.success());

	let output = run(&["unpack", &path_arg(&dst)]);
	assert!(output.status.success());
	let stdout = String::from_utf8_lossy(&output.stdout);
	assert!(stdout.starts_with("{1000}{}{Wolf}\n"));
	assert!(stdout.contains("{1011}{}{Two heads,\\none opinion.}\n"));
}

#[test]
fn value_json_reports_canonical_text() {
	let json = run_json(&["value", "1 2 3", "--kind", "int", "--array", "--json"]);
	assert_eq!(json["type"], "array");
	assert_eq!(json["text"], "1 2 3");
	assert_eq!(json["value"], serde_json::json!([1, 2, 3]));

	let json = run_json(&["value", "key1 1 key2 2", "--kind", "int", "--dict", "--json"]);
	assert_eq!(json["value"]["key2"], 2);

	let json = run_json(&["value", "true", "--kind", "bool", "--json"]);
	assert_eq!(json["text"], "True");
}

#[test]
fn strict_value_parsing_fails_the_command() {
	assert!(run(&["value", "abc", "--kind", "int"]).status.success());
	assert!(!run(&["value", "abc", "--kind", "int", "--strict"]).status.success());
}

#[test]
fn escape_round_trips_through_the_cli() {
	let output = run(&["escape", "two words"]);
	assert_eq!(String::from_utf8_lossy(&output.stdout), "\"two words\"\n");

	let output = run(&["escape", "\"say \\\"hi\\\"\"", "--decode"]);
	assert_eq!(String::from_utf8_lossy(&output.stdout), "say \"hi\"\n");
}

fn run(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_propdoc")).args(args).output().expect("command executes")
}

fn run_json(args: &[&str]) -> Value {
	let output = run(args);
	assert!(output.status.success(), "command should succeed: {}", String::from_utf8_lossy(&output.stderr));
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

fn fixture_arg(name: &str) -> String {
	path_arg(&Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures").join(name))
}

fn path_arg(path: &Path) -> String {
	path.display().to_string()
}

fn scratch_path(name: &str) -> PathBuf {
	let dir = std::env::temp_dir().join(format!("propdoc-cli-{}", std::process::id()));
	std::fs::create_dir_all(&dir).expect("scratch dir");
	dir.join(name)
}
