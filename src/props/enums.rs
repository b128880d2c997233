use std::collections::HashMap;

use crate::props::{PropsError, Result};

/// Resolves enum values between symbolic names and integers.
pub trait NameResolver {
	/// Map `value_name` of `enum_name` to its integer. Numeric literals are accepted too.
	fn resolve_enum_value(&self, enum_name: &str, value_name: &str) -> Result<i64>;
	/// Map an integer of `enum_name` to its symbolic name.
	fn resolve_enum_value_name(&self, enum_name: &str, value: i64) -> Result<String>;
}

#[derive(Debug, Default)]
struct EnumDef {
	by_name: HashMap<String, i64>,
	by_value: HashMap<i64, String>,
}

/// In-memory table of named enums.
#[derive(Debug, Default)]
pub struct EnumRegistry {
	enums: HashMap<String, EnumDef>,
}

impl EnumRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Register or extend an enum. The first name registered for a value stays canonical.
	pub fn add_enum<'a>(&mut self, enum_name: &str, entries: impl IntoIterator<Item = (&'a str, i64)>) {
		let def = self.enums.entry(enum_name.to_owned()).or_default();
		for (name, value) in entries {
			def.by_name.insert(name.to_owned(), value);
			def.by_value.entry(value).or_insert_with(|| name.to_owned());
		}
		log::debug!("enum {enum_name}: {} values", def.by_name.len());
	}

	/// Whether `enum_name` is registered.
	pub fn contains(&self, enum_name: &str) -> bool {
		self.enums.contains_key(enum_name)
	}
}

impl NameResolver for EnumRegistry {
	fn resolve_enum_value(&self, enum_name: &str, value_name: &str) -> Result<i64> {
		let def = self.enums.get(enum_name);
		if let Some(value) = def.and_then(|def| def.by_name.get(value_name)) {
			return Ok(*value);
		}
		if let (Some(_), Ok(value)) = (def, value_name.trim().parse::<i64>()) {
			return Ok(value);
		}
		Err(PropsError::UnresolvedEnumValue {
			enum_name: enum_name.to_owned(),
			value_name: value_name.to_owned(),
		})
	}

	fn resolve_enum_value_name(&self, enum_name: &str, value: i64) -> Result<String> {
		self.enums
			.get(enum_name)
			.and_then(|def| def.by_value.get(&value))
			.cloned()
			.ok_or(PropsError::UnresolvedEnumName {
				enum_name: enum_name.to_owned(),
				value,
			})
	}
}

#[cfg(test)]
mod tests {
	use super::{EnumRegistry, NameResolver};

	fn registry() -> EnumRegistry {
		let mut reg = EnumRegistry::new();
		reg.add_enum("Dir", [("North", 0), ("East", 1), ("South", 2), ("Up", 0)]);
		reg
	}

	#[test]
	fn names_resolve_both_ways() {
		let reg = registry();
		assert_eq!(reg.resolve_enum_value("Dir", "South").expect("known name"), 2);
		assert_eq!(reg.resolve_enum_value_name("Dir", 1).expect("known value"), "East");
	}

	#[test]
	fn first_alias_stays_canonical() {
		let reg = registry();
		assert_eq!(reg.resolve_enum_value("Dir", "Up").expect("alias"), 0);
		assert_eq!(reg.resolve_enum_value_name("Dir", 0).expect("value"), "North");
	}

	#[test]
	fn numeric_literals_are_accepted_for_known_enums() {
		let reg = registry();
		assert_eq!(reg.resolve_enum_value("Dir", "7").expect("numeric"), 7);
		assert!(reg.resolve_enum_value("Missing", "7").is_err());
		assert!(reg.resolve_enum_value("Dir", "West").is_err());
		assert!(reg.resolve_enum_value_name("Dir", 9).is_err());
	}
}
