use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::props::{BaseTypeInfo, EnumRegistry, PropertyShape, PropertyType, PropsError, Result, TypeDesc};

static NEXT_REGISTRATOR_ID: AtomicU64 = AtomicU64::new(1);

/// Which side of the connection a registrator describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistratorSide {
	/// Authoritative side; can write everything it can read.
	Server,
	/// Replica side; writes only client-only or modifiable properties.
	Client,
}

/// Who may observe a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
	/// Owner only.
	Private,
	/// Owner and its group.
	Protected,
	/// Everyone.
	Public,
}

/// Which side stores the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
	/// Both sides.
	Common,
	/// Client only.
	ClientOnly,
	/// Server only.
	ServerOnly,
}

/// Access classification requested at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
	/// Who may observe the property.
	pub visibility: Visibility,
	/// Which side stores it.
	pub side: Side,
	/// Whether the client may write it.
	pub modifiable: bool,
}

impl Access {
	/// Public, common, not client-modifiable.
	pub const PUBLIC: Self = Self {
		visibility: Visibility::Public,
		side: Side::Common,
		modifiable: false,
	};

	/// Public, common, client-modifiable.
	pub const PUBLIC_MODIFIABLE: Self = Self {
		visibility: Visibility::Public,
		side: Side::Common,
		modifiable: true,
	};

	/// Private to the server.
	pub const PRIVATE_SERVER: Self = Self {
		visibility: Visibility::Private,
		side: Side::ServerOnly,
		modifiable: false,
	};

	/// Private to the client.
	pub const PRIVATE_CLIENT: Self = Self {
		visibility: Visibility::Private,
		side: Side::ClientOnly,
		modifiable: true,
	};
}

impl Default for Access {
	fn default() -> Self {
		Self::PUBLIC
	}
}

/// Behavior flags requested at registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyFlags {
	/// Value is computed through a getter/setter pair; no raw storage.
	pub is_virtual: bool,
	/// Runtime-only state, never persisted.
	pub temporary: bool,
	/// Persistence disabled.
	pub disabled: bool,
	/// No setter is emitted.
	pub read_only: bool,
}

/// Where a property's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageSlot {
	/// Fixed range of the packed POD region.
	Pod {
		/// Byte offset.
		offset: usize,
		/// Byte size.
		size: usize,
	},
	/// Index into the variable-length buffer table.
	Complex {
		/// Buffer index.
		index: usize,
	},
	/// No storage; accessed through a virtual accessor.
	Virtual,
}

/// Immutable descriptor of one registered property.
#[derive(Debug, Clone)]
pub struct Property {
	owner: u64,
	name: Box<str>,
	reg_index: usize,
	enum_value: i32,
	desc: TypeDesc,
	access: Access,
	flags: PropertyFlags,
	slot: StorageSlot,
	has_getter: bool,
	has_setter: bool,
}

impl Property {
	/// Property name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Registration index.
	pub fn index(&self) -> usize {
		self.reg_index
	}

	/// Value in the owning type's property enum.
	pub fn enum_value(&self) -> i32 {
		self.enum_value
	}

	/// Full type descriptor.
	pub fn desc(&self) -> &TypeDesc {
		&self.desc
	}

	/// Container shape.
	pub fn shape(&self) -> PropertyShape {
		self.desc.shape
	}

	/// Element type.
	pub fn base_type(&self) -> &BaseTypeInfo {
		&self.desc.base
	}

	/// Dict key type.
	pub fn key_type(&self) -> Option<&BaseTypeInfo> {
		self.desc.key.as_ref()
	}

	/// Access classification.
	pub fn access(&self) -> Access {
		self.access
	}

	/// Registration flags.
	pub fn flags(&self) -> PropertyFlags {
		self.flags
	}

	/// Storage location.
	pub fn slot(&self) -> StorageSlot {
		self.slot
	}

	/// Whether the value lives in the POD region.
	pub fn is_pod(&self) -> bool {
		matches!(self.slot, StorageSlot::Pod { .. })
	}

	/// Whether the value is computed through a virtual accessor.
	pub fn is_virtual(&self) -> bool {
		self.flags.is_virtual
	}

	/// Whether the value is saved to documents.
	pub fn is_persistent(&self) -> bool {
		!self.flags.is_virtual && !self.flags.temporary && !self.flags.disabled
	}

	/// Whether a getter is emitted for the registrator's side.
	pub fn has_getter(&self) -> bool {
		self.has_getter
	}

	/// Whether a setter is emitted for the registrator's side.
	pub fn has_setter(&self) -> bool {
		self.has_setter
	}

	pub(crate) fn owner(&self) -> u64 {
		self.owner
	}
}

/// Per-entity-type property table with packed POD layout.
#[derive(Debug)]
pub struct PropertyRegistrator {
	id: u64,
	type_name: Box<str>,
	side: RegistratorSide,
	properties: Vec<Property>,
	by_name: HashMap<Box<str>, usize>,
	pod_usage: Vec<bool>,
	pod_size: usize,
	complex_count: usize,
}

impl PropertyRegistrator {
	/// Create an empty registrator for `type_name`.
	pub fn new(type_name: &str, side: RegistratorSide) -> Self {
		Self {
			id: NEXT_REGISTRATOR_ID.fetch_add(1, Ordering::Relaxed),
			type_name: type_name.into(),
			side,
			properties: Vec::new(),
			by_name: HashMap::new(),
			pod_usage: Vec::new(),
			pod_size: 0,
			complex_count: 0,
		}
	}

	/// Register a property whose type is classified from a native Rust type.
	pub fn register<T: PropertyType>(&mut self, name: &str, access: Access, flags: PropertyFlags) -> Result<&Property> {
		self.register_desc(name, T::type_desc(), access, flags)
	}

	/// Register a property from an explicit descriptor (enums, structs).
	pub fn register_desc(&mut self, name: &str, desc: TypeDesc, access: Access, flags: PropertyFlags) -> Result<&Property> {
		desc.validate(name)?;
		if self.by_name.contains_key(name) {
			return Err(PropsError::DuplicateProperty {
				type_name: self.type_name.to_string(),
				name: name.to_owned(),
			});
		}

		let slot = if flags.is_virtual {
			StorageSlot::Virtual
		} else if desc.is_pod() {
			let size = desc.base.size();
			StorageSlot::Pod {
				offset: self.allocate_pod(size),
				size,
			}
		} else {
			let index = self.complex_count;
			self.complex_count += 1;
			StorageSlot::Complex { index }
		};

		let has_getter = self.getter_allowed(access);
		let has_setter = has_getter && !flags.read_only && (self.side == RegistratorSide::Server || access.side == Side::ClientOnly || access.modifiable);

		let reg_index = self.properties.len();
		log::debug!("{}.{name}: {:?} {:?} {slot:?}", self.type_name, desc.shape, desc.base.kind());

		self.properties.push(Property {
			owner: self.id,
			name: name.into(),
			reg_index,
			enum_value: reg_index as i32 + 1,
			desc,
			access,
			flags,
			slot,
			has_getter,
			has_setter,
		});
		self.by_name.insert(name.into(), reg_index);
		Ok(&self.properties[reg_index])
	}

	fn getter_allowed(&self, access: Access) -> bool {
		match (self.side, access.side) {
			(RegistratorSide::Server, Side::ClientOnly) => false,
			(RegistratorSide::Server, _) => true,
			(RegistratorSide::Client, Side::ClientOnly) => true,
			(RegistratorSide::Client, Side::ServerOnly) => false,
			(RegistratorSide::Client, Side::Common) => access.visibility != Visibility::Private,
		}
	}

	/// First-fit placement of `size` bytes in the POD region.
	fn allocate_pod(&mut self, size: usize) -> usize {
		let len = self.pod_usage.len();
		let mut offset = 0;
		// A candidate may hang past the end; only the slots inside the region must be free.
		while offset < len {
			let end = (offset + size).min(len);
			if self.pod_usage[offset..end].iter().all(|used| !*used) {
				break;
			}
			offset += 1;
		}

		if offset + size > len {
			self.pod_usage.resize(offset + size, false);
		}
		self.pod_usage[offset..offset + size].fill(true);
		self.pod_size = self.pod_usage.len().div_ceil(8) * 8;
		offset
	}

	/// Entity type name.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// Side this registrator describes.
	pub fn side(&self) -> RegistratorSide {
		self.side
	}

	/// Number of registered properties.
	pub fn len(&self) -> usize {
		self.properties.len()
	}

	/// Whether nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.properties.is_empty()
	}

	/// Properties in registration order.
	pub fn properties(&self) -> &[Property] {
		&self.properties
	}

	/// Look up by name.
	pub fn find(&self, name: &str) -> Option<&Property> {
		self.by_name.get(name).map(|index| &self.properties[*index])
	}

	/// Look up by registration index.
	pub fn get_by_index(&self, index: usize) -> Option<&Property> {
		self.properties.get(index)
	}

	/// Look up by value of the property enum.
	pub fn find_by_enum(&self, enum_value: i32) -> Option<&Property> {
		let index = usize::try_from(enum_value.checked_sub(1)?).ok()?;
		self.properties.get(index)
	}

	/// Look up by name or fail with a schema error.
	pub fn get(&self, name: &str) -> Result<&Property> {
		self.find(name).ok_or_else(|| PropsError::PropertyNotFound {
			type_name: self.type_name.to_string(),
			name: name.to_owned(),
		})
	}

	/// POD region size, rounded up to 8 bytes.
	pub fn pod_size(&self) -> usize {
		self.pod_size
	}

	/// Number of variable-length buffers.
	pub fn complex_count(&self) -> usize {
		self.complex_count
	}

	/// Name of the enum listing this type's properties.
	pub fn property_enum_name(&self) -> String {
		format!("{}Property", self.type_name)
	}

	/// Publish the property enum (`None` = 0, then one value per property).
	pub fn register_property_enum(&self, enums: &mut EnumRegistry) {
		let entries = std::iter::once(("None", 0)).chain(self.properties.iter().map(|prop| (prop.name(), i64::from(prop.enum_value))));
		enums.add_enum(&self.property_enum_name(), entries);
	}

	pub(crate) fn id(&self) -> u64 {
		self.id
	}
}

#[cfg(test)]
mod tests;
