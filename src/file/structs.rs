pub type StringIndex = u32;
pub type TypeIndex = u16;
pub type ProtoIndex = u16;

/// Holds the contents of a type_id_item.
///
/// Chiefly an index into the string table, plus the derived `internal` bit:
/// whether the type is defined by a class_def in this DEX. The bit is false
/// at load time and set by the internal-marking pass.
#[derive(Debug, Clone)]
pub struct TypeIdItem {
    pub descriptor_idx: StringIndex,
    pub internal: bool,
}

/// Holds the contents of a proto_id_item.
///
/// `parameter_type_indices` is resolved in a deferred second pass over the
/// per-item `parameters_off` type-list offsets; a zero offset means no
/// parameters.
#[derive(Debug, Clone)]
pub struct ProtoIdItem {
    pub shorty_idx: StringIndex,
    pub return_type_idx: u32,
    pub parameters_off: u32,
    pub parameter_type_indices: Vec<TypeIndex>,
}

/// Holds the contents of a field_id_item.
#[derive(Debug, Clone)]
pub struct FieldIdItem {
    pub class_idx: TypeIndex, // index into type_ids for the defining class
    pub type_idx: TypeIndex,  // index into type_ids for the field type
    pub name_idx: StringIndex,
}

/// Holds the contents of a method_id_item.
#[derive(Debug, Clone)]
pub struct MethodIdItem {
    pub class_idx: TypeIndex, // index into type_ids for the defining class
    pub proto_idx: ProtoIndex,
    pub name_idx: StringIndex,
}

/// Holds the load-bearing part of a class_def_item. Presence of a type index
/// in the class_defs table is what marks that type as internal.
#[derive(Debug, Clone)]
pub struct ClassDefItem {
    pub class_idx: u32,
}
