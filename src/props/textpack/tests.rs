use crate::props::{PropsError, TextPack, key_part, string_hash};

#[test]
fn binary_layout_is_count_then_entries() {
	let mut pack = TextPack::new();
	pack.add(2, "hi");
	pack.add(1, "");
	let bytes = pack.get_binary_data().expect("encodes");
	assert_eq!(bytes, vec![2, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, b'h', b'i']);

	let mut loaded = TextPack::new();
	loaded.load_from_binary_data(&bytes).expect("decodes");
	assert_eq!(loaded, pack);
}

#[test]
fn malformed_binary_payloads_are_hard_errors() {
	let mut pack = TextPack::new();
	pack.add(9, "kept");

	let short = [2, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, b'a'];
	assert!(matches!(pack.load_from_binary_data(&short).expect_err("count too big"), PropsError::UnexpectedEof { .. }));

	let trailing = [0, 0, 0, 0, 7];
	assert!(matches!(pack.load_from_binary_data(&trailing).expect_err("extra byte"), PropsError::TrailingBytes { .. }));

	let bad_utf8 = [1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 0xff];
	assert!(matches!(pack.load_from_binary_data(&bad_utf8).expect_err("not utf8"), PropsError::InvalidUtf8 { .. }));

	assert_eq!(pack.len(), 1);
	assert_eq!(pack.get(9), Some("kept"));
}

#[test]
fn source_keys_sum_numbers_and_hashes() {
	let mut pack = TextPack::new();
	let added = pack.load_from_string("{100}{}{Plain}\n{100}{5}{Offset}\n{Greeting}{}{Hello}\n{Greeting}{1}{Hello again}\n");
	assert_eq!(added, 4);
	assert_eq!(pack.get(100), Some("Plain"));
	assert_eq!(pack.get(105), Some("Offset"));
	assert_eq!(pack.get(string_hash("Greeting")), Some("Hello"));
	assert_eq!(pack.get(string_hash("Greeting").wrapping_add(1)), Some("Hello again"));
	assert_eq!(key_part("  42 "), 42);
	assert_eq!(key_part(""), 0);
}

#[test]
fn source_values_handle_braces_escapes_and_lines() {
	let mut pack = TextPack::new();
	let source = "# comment\n; also comment\n{1}{}{a {nested} value}\n{2}{}{close \\} brace\\nnext}\n{3}{}{first\nsecond\n  third}\n{4}{Two tokens}\n";
	assert_eq!(pack.load_from_string(source), 4);
	assert_eq!(pack.get(1), Some("a {nested} value"));
	assert_eq!(pack.get(2), Some("close } brace\nnext"));
	assert_eq!(pack.get(3), Some("first\nsecond\n  third"));
	assert_eq!(pack.get(4), Some("Two tokens"));
}

#[test]
fn malformed_source_lines_are_skipped() {
	let mut pack = TextPack::new();
	let source = "junk line\n{1}\n{2}{}{ok} # trailing note\n{3}{}{never closed\n";
	assert_eq!(pack.load_from_string(source), 1);
	assert_eq!(pack.get(2), Some("ok"));
	assert_eq!(pack.len(), 1);
}

#[test]
fn merge_prefers_incoming_entries() {
	let mut base = TextPack::new();
	base.add(1, "old");
	base.add(2, "keep");
	let mut patch = TextPack::new();
	patch.add(1, "new");
	patch.add(3, "added");

	base.merge(&patch);
	let entries: Vec<(u32, &str)> = base.iter().map(|(key, text)| (*key, text.as_str())).collect();
	assert_eq!(entries, vec![(1, "new"), (2, "keep"), (3, "added")]);
}

#[test]
fn rendered_source_reads_back() {
	let mut pack = TextPack::new();
	pack.add(1, "plain");
	pack.add(2, "braces {and} \\ slashes");
	pack.add(3, "two\nlines\tand tab");
	pack.add(4, "");

	let mut reread = TextPack::new();
	assert_eq!(reread.load_from_string(&pack.to_source()), 4);
	assert_eq!(reread, pack);
}
