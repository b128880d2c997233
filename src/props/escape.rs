//! Token codec: raw strings to whitespace-safe tokens and back.

/// Escape `raw` and wrap it in quotes when it could not be re-read as a single token.
///
/// Newlines, quotes and backslashes are escaped, carriage returns are dropped.
/// The result is quoted when `raw` is empty or contains whitespace, quotes or
/// backslashes.
pub fn code_string(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len() + 2);
	let mut protect = raw.is_empty();

	for ch in raw.chars() {
		match ch {
			'\r' => protect = true,
			'\n' => {
				out.push_str("\\n");
				protect = true;
			}
			'"' => {
				out.push_str("\\\"");
				protect = true;
			}
			'\\' => {
				out.push_str("\\\\");
				protect = true;
			}
			' ' | '\t' => {
				out.push(ch);
				protect = true;
			}
			_ => out.push(ch),
		}
	}

	if protect { format!("\"{out}\"") } else { out }
}

/// Reverse [`code_string`]. Unquoted input is returned unchanged.
pub fn decode_string(coded: &str) -> String {
	let Some(body) = coded.strip_prefix('"') else {
		return coded.to_owned();
	};
	let body = body.strip_suffix('"').unwrap_or(body);

	let mut out = String::with_capacity(body.len());
	let mut chars = body.chars();
	while let Some(ch) = chars.next() {
		if ch != '\\' {
			out.push(ch);
			continue;
		}
		match chars.next() {
			Some('n') => out.push('\n'),
			Some('"') => out.push('"'),
			Some('\\') => out.push('\\'),
			Some(other) => {
				out.push('\\');
				out.push(other);
			}
			None => out.push('\\'),
		}
	}
	out
}

/// Read one whitespace or quote delimited token.
///
/// Returns the token text exactly as written (quotes and escapes included) and
/// the unread remainder, or `None` when only blanks remain. Only ASCII
/// characters act as delimiters, so multi-byte sequences are never split.
pub fn read_token(text: &str) -> Option<(&str, &str)> {
	let start = text.find(|ch: char| ch != ' ' && ch != '\t')?;
	let tail = &text[start..];

	let mut escaped = false;
	if let Some(body) = tail.strip_prefix('"') {
		for (idx, ch) in body.char_indices() {
			if escaped {
				escaped = false;
			} else if ch == '\\' {
				escaped = true;
			} else if ch == '"' {
				let end = idx + 2;
				return Some((&tail[..end], &tail[end..]));
			}
		}
		return Some((tail, ""));
	}

	for (idx, ch) in tail.char_indices() {
		if escaped {
			escaped = false;
		} else if ch == '\\' {
			escaped = true;
		} else if ch == ' ' || ch == '\t' {
			return Some((&tail[..idx], &tail[idx..]));
		}
	}
	Some((tail, ""))
}

/// Iterator over the tokens of a line, see [`read_token`].
pub struct Tokens<'a> {
	rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
	type Item = &'a str;

	fn next(&mut self) -> Option<Self::Item> {
		let (token, rest) = read_token(self.rest)?;
		self.rest = rest;
		Some(token)
	}
}

/// Tokenize `text` with [`read_token`].
pub fn tokens(text: &str) -> Tokens<'_> {
	Tokens { rest: text }
}
