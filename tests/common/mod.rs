//! Synthetic DEX builder for integration tests. Emits the header and the
//! five id tables with correct sizes and offsets, followed by a data section
//! holding parameter type-lists and string_data records. Everything the
//! parser skips (checksum, signature, map) is zeroed.

use std::collections::HashMap;

const HEADER_SIZE: usize = 0x70;
const ENDIAN_CONSTANT: u32 = 0x12345678;

pub struct DexBuilder {
    big_endian: bool,
    magic: [u8; 8],
    strings: Vec<String>,
    string_lookup: HashMap<String, u32>,
    type_descriptor_indices: Vec<u32>,
    protos: Vec<(u32, u16, Vec<u16>)>,
    fields: Vec<(u16, u16, u32)>,
    methods: Vec<(u16, u16, u32)>,
    class_defs: Vec<u16>,
}

impl DexBuilder {
    pub fn new() -> DexBuilder {
        DexBuilder {
            big_endian: false,
            magic: *b"dex\n035\0",
            strings: Vec::new(),
            string_lookup: HashMap::new(),
            type_descriptor_indices: Vec::new(),
            protos: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            class_defs: Vec::new(),
        }
    }

    /// Stores all multi-byte fields big-endian and writes the reverse
    /// endian tag so the parser must switch byte order.
    pub fn big_endian(mut self) -> DexBuilder {
        self.big_endian = true;
        self
    }

    pub fn magic(mut self, magic: &[u8; 8]) -> DexBuilder {
        self.magic = *magic;
        self
    }

    /// Interns a string and returns its string_id index. The string table
    /// keeps insertion order, so tests can rely on stable indices.
    pub fn string(&mut self, s: &str) -> u32 {
        if let Some(&idx) = self.string_lookup.get(s) {
            return idx;
        }
        let idx = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.string_lookup.insert(s.to_string(), idx);
        idx
    }

    pub fn type_id(&mut self, descriptor: &str) -> u16 {
        let string_idx = self.string(descriptor);
        let idx = self.type_descriptor_indices.len() as u16;
        self.type_descriptor_indices.push(string_idx);
        idx
    }

    pub fn proto(&mut self, shorty: &str, return_type: u16, params: &[u16]) -> u16 {
        let shorty_idx = self.string(shorty);
        let idx = self.protos.len() as u16;
        self.protos.push((shorty_idx, return_type, params.to_vec()));
        idx
    }

    pub fn field(&mut self, class: u16, ty: u16, name: &str) -> u32 {
        let name_idx = self.string(name);
        let idx = self.fields.len() as u32;
        self.fields.push((class, ty, name_idx));
        idx
    }

    pub fn method(&mut self, class: u16, proto: u16, name: &str) -> u32 {
        let name_idx = self.string(name);
        let idx = self.methods.len() as u32;
        self.methods.push((class, proto, name_idx));
        idx
    }

    pub fn class_def(&mut self, class: u16) {
        self.class_defs.push(class);
    }

    fn push_u16(&self, out: &mut Vec<u8>, v: u16) {
        let bytes = if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        };
        out.extend_from_slice(&bytes);
    }

    fn push_u32(&self, out: &mut Vec<u8>, v: u32) {
        let bytes = if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        };
        out.extend_from_slice(&bytes);
    }

    pub fn build(&self) -> Vec<u8> {
        let string_ids_off = HEADER_SIZE;
        let type_ids_off = string_ids_off + 4 * self.strings.len();
        let proto_ids_off = type_ids_off + 4 * self.type_descriptor_indices.len();
        let field_ids_off = proto_ids_off + 12 * self.protos.len();
        let method_ids_off = field_ids_off + 8 * self.fields.len();
        let class_defs_off = method_ids_off + 8 * self.methods.len();
        let data_off = class_defs_off + 0x20 * self.class_defs.len();

        // lay out parameter type-lists first, 4-byte aligned
        let mut cursor = data_off;
        let mut param_list_offsets = vec![0u32; self.protos.len()];
        for (i, (_, _, params)) in self.protos.iter().enumerate() {
            if params.is_empty() {
                continue;
            }
            param_list_offsets[i] = cursor as u32;
            cursor += 4 + 2 * params.len();
            cursor = (cursor + 3) & !3;
        }

        // then string_data: uleb128 utf16 length, utf8 bytes, NUL
        let mut string_offsets = Vec::with_capacity(self.strings.len());
        let mut string_blobs = Vec::with_capacity(self.strings.len());
        for s in &self.strings {
            string_offsets.push(cursor as u32);
            let utf16_len = s.encode_utf16().count() as u32;
            let (buf, len) = leb128fmt::encode_u32(utf16_len).unwrap();
            let mut blob = buf[..len].to_vec();
            blob.extend_from_slice(s.as_bytes());
            blob.push(0);
            cursor += blob.len();
            string_blobs.push(blob);
        }
        let file_size = cursor;

        let mut out = Vec::with_capacity(file_size);
        out.extend_from_slice(&self.magic);
        self.push_u32(&mut out, 0); // checksum, not verified
        out.extend_from_slice(&[0u8; 20]); // signature, not verified
        self.push_u32(&mut out, file_size as u32);
        self.push_u32(&mut out, HEADER_SIZE as u32);
        self.push_u32(&mut out, ENDIAN_CONSTANT);
        self.push_u32(&mut out, 0); // link_size
        self.push_u32(&mut out, 0); // link_off
        self.push_u32(&mut out, 0); // map_off
        self.push_u32(&mut out, self.strings.len() as u32);
        self.push_u32(&mut out, string_ids_off as u32);
        self.push_u32(&mut out, self.type_descriptor_indices.len() as u32);
        self.push_u32(&mut out, type_ids_off as u32);
        self.push_u32(&mut out, self.protos.len() as u32);
        self.push_u32(&mut out, proto_ids_off as u32);
        self.push_u32(&mut out, self.fields.len() as u32);
        self.push_u32(&mut out, field_ids_off as u32);
        self.push_u32(&mut out, self.methods.len() as u32);
        self.push_u32(&mut out, method_ids_off as u32);
        self.push_u32(&mut out, self.class_defs.len() as u32);
        self.push_u32(&mut out, class_defs_off as u32);
        self.push_u32(&mut out, (file_size - data_off) as u32);
        self.push_u32(&mut out, data_off as u32);
        assert_eq!(out.len(), HEADER_SIZE);

        for offset in &string_offsets {
            self.push_u32(&mut out, *offset);
        }
        for descriptor_idx in &self.type_descriptor_indices {
            self.push_u32(&mut out, *descriptor_idx);
        }
        for (i, (shorty_idx, return_type, _)) in self.protos.iter().enumerate() {
            self.push_u32(&mut out, *shorty_idx);
            self.push_u32(&mut out, *return_type as u32);
            self.push_u32(&mut out, param_list_offsets[i]);
        }
        for (class, ty, name_idx) in &self.fields {
            self.push_u16(&mut out, *class);
            self.push_u16(&mut out, *ty);
            self.push_u32(&mut out, *name_idx);
        }
        for (class, proto, name_idx) in &self.methods {
            self.push_u16(&mut out, *class);
            self.push_u16(&mut out, *proto);
            self.push_u32(&mut out, *name_idx);
        }
        for class in &self.class_defs {
            self.push_u32(&mut out, *class as u32);
            // access_flags, superclass_idx, interfaces_off, source_file_idx,
            // annotations_off, class_data_off, static_values_off
            for _ in 0..7 {
                self.push_u32(&mut out, 0);
            }
        }

        for (i, (_, _, params)) in self.protos.iter().enumerate() {
            if params.is_empty() {
                continue;
            }
            assert_eq!(out.len(), param_list_offsets[i] as usize);
            self.push_u32(&mut out, params.len() as u32);
            for param in params {
                self.push_u16(&mut out, *param);
            }
            while out.len() % 4 != 0 {
                out.push(0);
            }
        }
        for blob in &string_blobs {
            out.extend_from_slice(blob);
        }
        assert_eq!(out.len(), file_size);
        out
    }
}

/// One internal class `Lcom/app/Main;` whose method table references the
/// external `Ljava/util/List;.add(Ljava/lang/Object;)Z`.
pub fn sample_app(builder: &mut DexBuilder) {
    let main = builder.type_id("Lcom/app/Main;");
    let list = builder.type_id("Ljava/util/List;");
    let object = builder.type_id("Ljava/lang/Object;");
    let boolean = builder.type_id("Z");
    let void = builder.type_id("V");
    let int = builder.type_id("I");

    let add_proto = builder.proto("ZL", boolean, &[object]);
    let main_proto = builder.proto("V", void, &[]);

    builder.method(list, add_proto, "add");
    builder.method(main, main_proto, "main");
    builder.field(main, int, "count");

    builder.class_def(main);
}
