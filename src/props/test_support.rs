use std::collections::BTreeMap;
use std::sync::Arc;

use crate::props::{
	Access, BaseTypeInfo, EnumRegistry, HashStorage, HashedString, Properties, Property, PropertyFlags, PropertyRegistrator, RegistratorSide, SerialContext,
	StructField, TypeDesc,
};

/// Schema covering every shape plus the resolvers it needs.
pub(crate) struct Fixture {
	pub(crate) registrator: Arc<PropertyRegistrator>,
	pub(crate) hashes: HashStorage,
	pub(crate) enums: EnumRegistry,
}

impl Fixture {
	pub(crate) fn ctx(&self) -> SerialContext<'_> {
		SerialContext::new(&self.hashes, &self.enums)
	}

	pub(crate) fn prop(&self, name: &str) -> &Property {
		self.registrator.get(name).expect("fixture property exists")
	}

	pub(crate) fn props(&self) -> Properties {
		Properties::new(Arc::clone(&self.registrator))
	}
}

pub(crate) fn dir_type() -> BaseTypeInfo {
	BaseTypeInfo::enumeration("Dir", 1, false).expect("dir enum")
}

pub(crate) fn pos_type() -> BaseTypeInfo {
	let field = |name: &str, ty: BaseTypeInfo, offset| StructField {
		name: name.into(),
		ty,
		offset,
	};
	BaseTypeInfo::structure(
		"Pos",
		8,
		vec![
			field("x", BaseTypeInfo::int("int16", 2, true).expect("int16"), 0),
			field("y", BaseTypeInfo::int("int16", 2, true).expect("int16"), 2),
			field("z", BaseTypeInfo::float("float", 4).expect("float"), 4),
		],
	)
	.expect("pos layout")
}

pub(crate) fn critter_on(side: RegistratorSide) -> Fixture {
	let none = PropertyFlags::default();
	let mut reg = PropertyRegistrator::new("Critter", side);
	reg.register::<i32>("Hp", Access::PUBLIC_MODIFIABLE, none).expect("Hp");
	reg.register::<f32>("Speed", Access::PUBLIC, none).expect("Speed");
	reg.register::<bool>("Alive", Access::PUBLIC, none).expect("Alive");
	reg.register_desc("Facing", TypeDesc::simple(dir_type()), Access::PUBLIC, none).expect("Facing");
	reg.register::<HashedString>("Proto", Access::PUBLIC, none).expect("Proto");
	reg.register::<String>("Name", Access::PUBLIC, none).expect("Name");
	reg.register_desc("Pos", TypeDesc::simple(pos_type()), Access::PUBLIC, none).expect("Pos");
	reg.register::<Vec<i32>>("Items", Access::PUBLIC, none).expect("Items");
	reg.register::<Vec<String>>("Tags", Access::PUBLIC, none).expect("Tags");
	reg.register::<BTreeMap<String, i32>>("Skills", Access::PUBLIC, none).expect("Skills");
	reg.register::<BTreeMap<u16, Vec<String>>>("Notes", Access::PUBLIC, none).expect("Notes");
	reg.register_desc("Waypoints", TypeDesc::array(pos_type()), Access::PUBLIC, none).expect("Waypoints");
	reg.register::<BTreeMap<HashedString, i64>>("Counters", Access::PUBLIC, none).expect("Counters");
	reg.register_desc("Weights", TypeDesc::dict(dir_type(), BaseTypeInfo::float("double", 8).expect("double")), Access::PUBLIC, none)
		.expect("Weights");
	let temporary = PropertyFlags { temporary: true, ..none };
	reg.register::<i32>("Timer", Access::PUBLIC, temporary).expect("Timer");
	reg.register::<i32>("Secret", Access::PRIVATE_SERVER, none).expect("Secret");
	let read_only = PropertyFlags { read_only: true, ..none };
	reg.register::<i64>("Id", Access::PUBLIC, read_only).expect("Id");
	let computed = PropertyFlags { is_virtual: true, ..none };
	reg.register::<i32>("Computed", Access::PUBLIC, computed).expect("Computed");

	let mut enums = EnumRegistry::new();
	enums.add_enum("Dir", [("North", 0), ("East", 1), ("South", 2), ("West", 3)]);
	reg.register_property_enum(&mut enums);

	Fixture {
		registrator: Arc::new(reg),
		hashes: HashStorage::new(),
		enums,
	}
}

pub(crate) fn critter() -> Fixture {
	critter_on(RegistratorSide::Server)
}
