use std::collections::BTreeMap;

use crate::props::{
	Access, BaseTypeInfo, EnumRegistry, NameResolver, PropertyFlags, PropertyRegistrator, RegistratorSide, Side, StorageSlot, TypeDesc, Visibility,
};

fn server() -> PropertyRegistrator {
	PropertyRegistrator::new("Critter", RegistratorSide::Server)
}

#[test]
fn pod_offsets_pack_and_round_up() {
	let mut reg = server();
	reg.register::<i32>("Hp", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	reg.register::<u8>("Level", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	reg.register::<String>("Name", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	reg.register::<i64>("Money", Access::PUBLIC, PropertyFlags::default()).expect("registers");

	assert_eq!(reg.get("Hp").expect("hp").slot(), StorageSlot::Pod { offset: 0, size: 4 });
	assert_eq!(reg.get("Level").expect("level").slot(), StorageSlot::Pod { offset: 4, size: 1 });
	assert_eq!(reg.get("Name").expect("name").slot(), StorageSlot::Complex { index: 0 });
	assert_eq!(reg.get("Money").expect("money").slot(), StorageSlot::Pod { offset: 5, size: 8 });
	assert_eq!(reg.pod_size(), 16);
	assert_eq!(reg.complex_count(), 1);
}

#[test]
fn wider_pod_after_narrower_never_overlaps() {
	let mut reg = server();
	reg.register::<u8>("A", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	reg.register::<u16>("B", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	assert_eq!(reg.get("A").expect("a").slot(), StorageSlot::Pod { offset: 0, size: 1 });
	assert_eq!(reg.get("B").expect("b").slot(), StorageSlot::Pod { offset: 1, size: 2 });

	let mut reg = server();
	reg.register::<i32>("Hp", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	reg.register::<f32>("Speed", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	reg.register::<i64>("Money", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	assert_eq!(reg.get("Hp").expect("hp").slot(), StorageSlot::Pod { offset: 0, size: 4 });
	assert_eq!(reg.get("Speed").expect("speed").slot(), StorageSlot::Pod { offset: 4, size: 4 });
	assert_eq!(reg.get("Money").expect("money").slot(), StorageSlot::Pod { offset: 8, size: 8 });
	assert_eq!(reg.pod_size(), 16);
}

#[test]
fn critter_pod_slots_are_disjoint() {
	let fx = crate::props::test_support::critter();
	let mut spans: Vec<(usize, usize)> = fx
		.registrator
		.properties()
		.iter()
		.filter_map(|prop| match prop.slot() {
			StorageSlot::Pod { offset, size } => Some((offset, offset + size)),
			_ => None,
		})
		.collect();
	spans.sort();
	for pair in spans.windows(2) {
		assert!(pair[0].1 <= pair[1].0, "{:?} overlaps {:?}", pair[0], pair[1]);
	}
	assert!(spans.last().expect("pod spans").1 <= fx.registrator.pod_size());
}

#[test]
fn complex_indices_are_sequential() {
	let mut reg = server();
	reg.register::<Vec<i32>>("Items", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	reg.register::<BTreeMap<String, i32>>("Skills", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	reg.register::<BTreeMap<u16, Vec<String>>>("Notes", Access::PUBLIC, PropertyFlags::default()).expect("registers");

	let indices: Vec<StorageSlot> = reg.properties().iter().map(|prop| prop.slot()).collect();
	assert_eq!(
		indices,
		vec![StorageSlot::Complex { index: 0 }, StorageSlot::Complex { index: 1 }, StorageSlot::Complex { index: 2 }]
	);
	assert_eq!(reg.pod_size(), 0);
}

#[test]
fn virtual_properties_have_no_storage() {
	let mut reg = server();
	let flags = PropertyFlags {
		is_virtual: true,
		..PropertyFlags::default()
	};
	let prop = reg.register::<i32>("Computed", Access::PUBLIC, flags).expect("registers");
	assert_eq!(prop.slot(), StorageSlot::Virtual);
	assert!(!prop.is_persistent());
	assert_eq!(reg.pod_size(), 0);
}

#[test]
fn lookups_by_name_index_and_enum() {
	let mut reg = server();
	reg.register::<i32>("Hp", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	reg.register::<i32>("Ap", Access::PUBLIC, PropertyFlags::default()).expect("registers");

	assert_eq!(reg.find("Ap").map(|prop| prop.index()), Some(1));
	assert_eq!(reg.get_by_index(0).map(|prop| prop.name()), Some("Hp"));
	assert_eq!(reg.find_by_enum(2).map(|prop| prop.name()), Some("Ap"));
	assert!(reg.find_by_enum(0).is_none());
	assert!(reg.find_by_enum(-4).is_none());
	assert!(reg.find("Missing").is_none());
	assert!(reg.get("Missing").is_err());
}

#[test]
fn property_enum_is_published() {
	let mut reg = server();
	reg.register::<i32>("Hp", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	let mut enums = EnumRegistry::new();
	reg.register_property_enum(&mut enums);

	assert_eq!(enums.resolve_enum_value("CritterProperty", "Hp").expect("published"), 1);
	assert_eq!(enums.resolve_enum_value_name("CritterProperty", 0).expect("none value"), "None");
}

#[test]
fn duplicates_and_bad_keys_fail_fast() {
	let mut reg = server();
	reg.register::<i32>("Hp", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	assert!(reg.register::<u8>("Hp", Access::PUBLIC, PropertyFlags::default()).is_err());

	let desc = TypeDesc::dict(BaseTypeInfo::float("float", 4).expect("float"), BaseTypeInfo::boolean());
	assert!(reg.register_desc("Weights", desc, Access::PUBLIC, PropertyFlags::default()).is_err());
	assert_eq!(reg.len(), 1);
}

#[test]
fn accessors_follow_side_and_access() {
	let hidden = Access {
		visibility: Visibility::Private,
		side: Side::Common,
		modifiable: false,
	};

	let mut srv = server();
	srv.register::<i32>("Public", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	srv.register::<i32>("ClientSide", Access::PRIVATE_CLIENT, PropertyFlags::default()).expect("registers");
	srv.register::<i32>("Hidden", hidden, PropertyFlags::default()).expect("registers");
	let read_only = PropertyFlags {
		read_only: true,
		..PropertyFlags::default()
	};
	srv.register::<i32>("Fixed", Access::PUBLIC, read_only).expect("registers");

	let public = srv.get("Public").expect("public");
	assert!(public.has_getter() && public.has_setter());
	let client_side = srv.get("ClientSide").expect("client side");
	assert!(!client_side.has_getter() && !client_side.has_setter());
	assert!(srv.get("Hidden").expect("hidden").has_getter());
	let fixed = srv.get("Fixed").expect("fixed");
	assert!(fixed.has_getter() && !fixed.has_setter());

	let mut cli = PropertyRegistrator::new("Critter", RegistratorSide::Client);
	cli.register::<i32>("Public", Access::PUBLIC, PropertyFlags::default()).expect("registers");
	cli.register::<i32>("Editable", Access::PUBLIC_MODIFIABLE, PropertyFlags::default()).expect("registers");
	cli.register::<i32>("ServerSide", Access::PRIVATE_SERVER, PropertyFlags::default()).expect("registers");
	cli.register::<i32>("Hidden", hidden, PropertyFlags::default()).expect("registers");

	let public = cli.get("Public").expect("public");
	assert!(public.has_getter() && !public.has_setter());
	let editable = cli.get("Editable").expect("editable");
	assert!(editable.has_getter() && editable.has_setter());
	assert!(!cli.get("ServerSide").expect("server side").has_getter());
	assert!(!cli.get("Hidden").expect("hidden").has_getter());
}
