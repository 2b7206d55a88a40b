use std::fs::File;
use std::path::Path;

pub mod header;
pub use header::*;
pub mod structs;
pub use structs::*;

use crate::cursor::ByteCursor;
use crate::refs::{ClassRef, FieldRef, MethodRef};
use crate::{dex_err, Result};

macro_rules! check_lt_result {
    ($idx:expr, $count:expr, $item_ty:tt) => {
        if ($idx as usize) >= ($count as usize) {
            return dex_err!(UnresolvedIndex {
                index: $idx as u32,
                item_ty: stringify!($item_ty),
                max: $count as usize,
            });
        }
    };
}

/// A fully decoded DEX source: the header plus the five id tables, owned and
/// immutable once parsed. A failed load aborts the whole parse; there is no
/// partial result.
pub struct DexFile {
    header: Header,
    strings: Vec<String>,
    type_ids: Vec<TypeIdItem>,
    proto_ids: Vec<ProtoIdItem>,
    field_ids: Vec<FieldIdItem>,
    method_ids: Vec<MethodIdItem>,
    class_defs: Vec<ClassDefItem>,
}

impl DexFile {
    /// Parses a DEX file held in memory.
    pub fn parse(data: &[u8]) -> Result<DexFile> {
        let mut cursor = ByteCursor::new(data);
        let header = Header::parse(&mut cursor)?;

        let strings = Self::parse_strings(&mut cursor, &header)?;
        let type_ids = Self::parse_type_ids(&mut cursor, &header)?;
        let proto_ids = Self::parse_proto_ids(&mut cursor, &header)?;
        let field_ids = Self::parse_field_ids(&mut cursor, &header)?;
        let method_ids = Self::parse_method_ids(&mut cursor, &header)?;
        let class_defs = Self::parse_class_defs(&mut cursor, &header)?;

        let mut dex = DexFile {
            header,
            strings,
            type_ids,
            proto_ids,
            field_ids,
            method_ids,
            class_defs,
        };
        dex.mark_internal_classes()?;
        Ok(dex)
    }

    /// Maps a DEX file from disk and parses it.
    pub fn open(path: &Path) -> Result<DexFile> {
        let file = File::open(path)?;
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        DexFile::parse(&mmap)
    }

    /// Loads the string table. All string_id offsets are read first, then
    /// the string_data records, so the primary pass never seeks backward.
    fn parse_strings(cursor: &mut ByteCursor<'_>, header: &Header) -> Result<Vec<String>> {
        let count = header.string_ids_size as usize;
        log::debug!("reading {} string ids", count);

        cursor.seek(header.string_ids_off as usize);
        cursor.ensure_remaining(count.saturating_mul(4))?;
        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            offsets.push(cursor.read_u32()?);
        }

        let mut strings = Vec::with_capacity(count);
        for offset in offsets {
            cursor.seek(offset as usize);
            strings.push(cursor.read_mutf8_string()?);
        }
        Ok(strings)
    }

    fn parse_type_ids(cursor: &mut ByteCursor<'_>, header: &Header) -> Result<Vec<TypeIdItem>> {
        let count = header.type_ids_size as usize;
        log::debug!("reading {} type ids", count);

        cursor.seek(header.type_ids_off as usize);
        cursor.ensure_remaining(count.saturating_mul(4))?;
        let mut type_ids = Vec::with_capacity(count);
        for _ in 0..count {
            type_ids.push(TypeIdItem {
                descriptor_idx: cursor.read_u32()?,
                internal: false,
            });
        }
        Ok(type_ids)
    }

    /// Loads the proto id table. Parameter type-lists live behind per-item
    /// offsets and are resolved in a deferred second pass, after the linear
    /// scan over the fixed-size records.
    fn parse_proto_ids(cursor: &mut ByteCursor<'_>, header: &Header) -> Result<Vec<ProtoIdItem>> {
        let count = header.proto_ids_size as usize;
        log::debug!("reading {} proto ids", count);

        cursor.seek(header.proto_ids_off as usize);
        cursor.ensure_remaining(count.saturating_mul(12))?;
        let mut proto_ids = Vec::with_capacity(count);
        for _ in 0..count {
            proto_ids.push(ProtoIdItem {
                shorty_idx: cursor.read_u32()?,
                return_type_idx: cursor.read_u32()?,
                parameters_off: cursor.read_u32()?,
                parameter_type_indices: Vec::new(),
            });
        }

        for proto in &mut proto_ids {
            if proto.parameters_off == 0 {
                continue;
            }
            cursor.seek(proto.parameters_off as usize);
            let size = cursor.read_u32()? as usize;
            cursor.ensure_remaining(size.saturating_mul(2))?;
            let mut types = Vec::with_capacity(size);
            for _ in 0..size {
                types.push(cursor.read_u16()?);
            }
            proto.parameter_type_indices = types;
        }
        Ok(proto_ids)
    }

    fn parse_field_ids(cursor: &mut ByteCursor<'_>, header: &Header) -> Result<Vec<FieldIdItem>> {
        let count = header.field_ids_size as usize;
        log::debug!("reading {} field ids", count);

        cursor.seek(header.field_ids_off as usize);
        cursor.ensure_remaining(count.saturating_mul(8))?;
        let mut field_ids = Vec::with_capacity(count);
        for _ in 0..count {
            field_ids.push(FieldIdItem {
                class_idx: cursor.read_u16()?,
                type_idx: cursor.read_u16()?,
                name_idx: cursor.read_u32()?,
            });
        }
        Ok(field_ids)
    }

    fn parse_method_ids(cursor: &mut ByteCursor<'_>, header: &Header) -> Result<Vec<MethodIdItem>> {
        let count = header.method_ids_size as usize;
        log::debug!("reading {} method ids", count);

        cursor.seek(header.method_ids_off as usize);
        cursor.ensure_remaining(count.saturating_mul(8))?;
        let mut method_ids = Vec::with_capacity(count);
        for _ in 0..count {
            method_ids.push(MethodIdItem {
                class_idx: cursor.read_u16()?,
                proto_idx: cursor.read_u16()?,
                name_idx: cursor.read_u32()?,
            });
        }
        Ok(method_ids)
    }

    fn parse_class_defs(cursor: &mut ByteCursor<'_>, header: &Header) -> Result<Vec<ClassDefItem>> {
        let count = header.class_defs_size as usize;
        log::debug!("reading {} class defs", count);

        cursor.seek(header.class_defs_off as usize);
        cursor.ensure_remaining(count.saturating_mul(0x20))?;
        let mut class_defs = Vec::with_capacity(count);
        for _ in 0..count {
            let class_idx = cursor.read_u32()?;
            // access_flags, superclass_idx, interfaces_off, source_file_idx,
            // annotations_off, class_data_off, static_values_off
            for _ in 0..7 {
                cursor.read_u32()?;
            }
            class_defs.push(ClassDefItem { class_idx });
        }
        Ok(class_defs)
    }

    /// Sets the `internal` flag on every type id that a class_def defines.
    /// Runs once at parse time, after all tables are loaded; applying it
    /// again is a no-op.
    pub fn mark_internal_classes(&mut self) -> Result<()> {
        for class_def in &self.class_defs {
            check_lt_result!(class_def.class_idx, self.type_ids.len(), TypeIdItem);
            self.type_ids[class_def.class_idx as usize].internal = true;
        }
        Ok(())
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn type_ids(&self) -> &[TypeIdItem] {
        &self.type_ids
    }

    pub fn proto_ids(&self) -> &[ProtoIdItem] {
        &self.proto_ids
    }

    pub fn field_ids(&self) -> &[FieldIdItem] {
        &self.field_ids
    }

    pub fn method_ids(&self) -> &[MethodIdItem] {
        &self.method_ids
    }

    pub fn class_defs(&self) -> &[ClassDefItem] {
        &self.class_defs
    }

    pub fn string_at(&self, idx: u32) -> Result<&str> {
        check_lt_result!(idx, self.strings.len(), String);
        Ok(&self.strings[idx as usize])
    }

    /// Resolves a type index to its raw descriptor string, e.g. `[I` or
    /// `Ljava/lang/String;`. Descriptors are never converted here; dotted
    /// form is a render-time concern.
    pub fn type_desc_at(&self, idx: u32) -> Result<&str> {
        check_lt_result!(idx, self.type_ids.len(), TypeIdItem);
        self.string_at(self.type_ids[idx as usize].descriptor_idx)
    }

    fn proto_at(&self, idx: ProtoIndex) -> Result<&ProtoIdItem> {
        check_lt_result!(idx, self.proto_ids.len(), ProtoIdItem);
        Ok(&self.proto_ids[idx as usize])
    }

    fn resolve_method(&self, method_id: &MethodIdItem) -> Result<MethodRef> {
        let proto = self.proto_at(method_id.proto_idx)?;
        let mut parameter_types = Vec::with_capacity(proto.parameter_type_indices.len());
        for type_idx in &proto.parameter_type_indices {
            parameter_types.push(self.type_desc_at(*type_idx as u32)?.to_string());
        }
        Ok(MethodRef {
            declaring_class: self.type_desc_at(method_id.class_idx as u32)?.to_string(),
            name: self.string_at(method_id.name_idx)?.to_string(),
            parameter_types,
            return_type: self.type_desc_at(proto.return_type_idx)?.to_string(),
        })
    }

    fn resolve_field(&self, field_id: &FieldIdItem) -> Result<FieldRef> {
        Ok(FieldRef {
            declaring_class: self.type_desc_at(field_id.class_idx as u32)?.to_string(),
            name: self.string_at(field_id.name_idx)?.to_string(),
            type_desc: self.type_desc_at(field_id.type_idx as u32)?.to_string(),
        })
    }

    /// Every method reference in the method_ids table, internal and external
    /// alike, projected through the string/type/proto tables.
    pub fn method_refs(&self) -> Result<Vec<MethodRef>> {
        self.method_ids
            .iter()
            .map(|m| self.resolve_method(m))
            .collect()
    }

    /// Every field reference in the field_ids table.
    pub fn field_refs(&self) -> Result<Vec<FieldRef>> {
        self.field_ids
            .iter()
            .map(|f| self.resolve_field(f))
            .collect()
    }

    /// The field/method references whose declaring class is not defined in
    /// this DEX, grouped by declaring class in type-id order. External types
    /// that declare no references contribute no group.
    pub fn external_class_refs(&self) -> Result<Vec<ClassRef>> {
        // sparse array parallel to type_ids; groups materialize on first ref
        let mut groups: Vec<Option<ClassRef>> = vec![None; self.type_ids.len()];

        for field_id in &self.field_ids {
            check_lt_result!(field_id.class_idx, self.type_ids.len(), TypeIdItem);
            let idx = field_id.class_idx as usize;
            if self.type_ids[idx].internal {
                continue;
            }
            let field = self.resolve_field(field_id)?;
            if groups[idx].is_none() {
                groups[idx] = Some(ClassRef::new(self.type_desc_at(idx as u32)?));
            }
            if let Some(group) = groups[idx].as_mut() {
                group.add_field(field);
            }
        }

        for method_id in &self.method_ids {
            check_lt_result!(method_id.class_idx, self.type_ids.len(), TypeIdItem);
            let idx = method_id.class_idx as usize;
            if self.type_ids[idx].internal {
                continue;
            }
            let method = self.resolve_method(method_id)?;
            if groups[idx].is_none() {
                groups[idx] = Some(ClassRef::new(self.type_desc_at(idx as u32)?));
            }
            if let Some(group) = groups[idx].as_mut() {
                group.add_method(method);
            }
        }

        Ok(groups.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DexError;

    /// Hand-built table set: strings and ids for one internal class
    /// `Lcom/app/Main;` calling `Ljava/util/List;.add(Ljava/lang/Object;)Z`.
    fn sample_dex() -> DexFile {
        let strings = [
            "Lcom/app/Main;",
            "Ljava/util/List;",
            "Ljava/lang/Object;",
            "Z",
            "V",
            "add",
            "main",
            "ZL",
            "VL",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let type_ids = vec![
            TypeIdItem { descriptor_idx: 0, internal: false }, // Lcom/app/Main;
            TypeIdItem { descriptor_idx: 1, internal: false }, // Ljava/util/List;
            TypeIdItem { descriptor_idx: 2, internal: false }, // Ljava/lang/Object;
            TypeIdItem { descriptor_idx: 3, internal: false }, // Z
            TypeIdItem { descriptor_idx: 4, internal: false }, // V
        ];

        let proto_ids = vec![
            // (Ljava/lang/Object;)Z
            ProtoIdItem {
                shorty_idx: 7,
                return_type_idx: 3,
                parameters_off: 0x100,
                parameter_type_indices: vec![2],
            },
            // (Ljava/lang/Object;)V
            ProtoIdItem {
                shorty_idx: 8,
                return_type_idx: 4,
                parameters_off: 0x108,
                parameter_type_indices: vec![2],
            },
        ];

        let method_ids = vec![
            MethodIdItem { class_idx: 1, proto_idx: 0, name_idx: 5 }, // List.add
            MethodIdItem { class_idx: 0, proto_idx: 1, name_idx: 6 }, // Main.main
        ];

        let mut dex = DexFile {
            header: Header::default(),
            strings,
            type_ids,
            proto_ids,
            field_ids: Vec::new(),
            method_ids,
            class_defs: vec![ClassDefItem { class_idx: 0 }],
        };
        dex.mark_internal_classes().unwrap();
        dex
    }

    #[test]
    fn test_mark_internal_partition() {
        let dex = sample_dex();
        let internal: Vec<bool> = dex.type_ids().iter().map(|t| t.internal).collect();
        assert_eq!(internal, vec![true, false, false, false, false]);
    }

    #[test]
    fn test_mark_internal_is_idempotent() {
        let mut dex = sample_dex();
        let before: Vec<bool> = dex.type_ids().iter().map(|t| t.internal).collect();
        dex.mark_internal_classes().unwrap();
        let after: Vec<bool> = dex.type_ids().iter().map(|t| t.internal).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_external_class_refs_groups_by_declaring_class() {
        let dex = sample_dex();
        let refs = dex.external_class_refs().unwrap();
        // Object/Z/V are external too but declare nothing, so no group
        assert_eq!(refs.len(), 1);
        let list = &refs[0];
        assert_eq!(list.name, "Ljava/util/List;");
        assert_eq!(list.methods.len(), 1);
        assert_eq!(list.methods[0].name, "add");
        assert_eq!(list.methods[0].return_type, "Z");
    }

    #[test]
    fn test_method_refs_are_unfiltered() {
        let dex = sample_dex();
        let refs = dex.method_refs().unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].declaring_class, "Ljava/util/List;");
        assert_eq!(refs[1].declaring_class, "Lcom/app/Main;");
        assert_eq!(refs[0].descriptor(), "(Ljava/lang/Object;)Z");
    }

    #[test]
    fn test_unresolved_index_is_an_error() {
        let dex = sample_dex();
        assert!(matches!(
            dex.string_at(100),
            Err(DexError::UnresolvedIndex { index: 100, .. })
        ));
        assert!(matches!(
            dex.type_desc_at(99),
            Err(DexError::UnresolvedIndex { .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_class_def_fails_marking() {
        let mut dex = sample_dex();
        dex.class_defs.push(ClassDefItem { class_idx: 42 });
        assert!(matches!(
            dex.mark_internal_classes(),
            Err(DexError::UnresolvedIndex { index: 42, .. })
        ));
    }
}
