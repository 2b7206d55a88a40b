use crate::cursor::{ByteCursor, Endian};
use crate::{dex_err, Result};

pub const DEX_MAGIC: &[u8] = b"dex\n";
pub const DEX_MAGIC_VERSIONS: &[&[u8; 8]] = &[
    b"dex\n035\0",
    // Dex version 036 skipped because of an old dalvik bug on some versions
    // of android where dex files with that version number would erroneously
    // be accepted and run.
    b"dex\n037\0",
    b"dex\n038\0",
    b"dex\n039\0",
];

pub const ENDIAN_CONSTANT: u32 = 0x12345678;

/// Files carrying this constant have performed byte-swapping.
pub const REVERSE_ENDIAN_CONSTANT: u32 = 0x78563412;

/// File offset of the endian tag: magic, checksum, signature, file_size,
/// header_size.
pub const ENDIAN_TAG_OFFSET: usize = 8 + 4 + 20 + 4 + 4;

/// File offset of the first post-signature header field (file_size).
const HEADER_FIELDS_OFFSET: usize = 8 + 4 + 20;

pub fn is_magic_valid(magic: &[u8; 8]) -> bool {
    DEX_MAGIC_VERSIONS.iter().any(|m| *m == magic)
}

/// The fixed-size DEX header: the five id-table `(size, offset)` descriptor
/// pairs plus surrounding bookkeeping. Checksum and signature are skipped,
/// not verified.
#[derive(Debug, Clone, Default)]
pub struct Header {
    pub file_size: u32,
    pub header_size: u32,
    pub endian_tag: u32,
    pub link_size: u32,
    pub link_off: u32,
    pub map_off: u32,
    pub string_ids_size: u32,
    pub string_ids_off: u32,
    pub type_ids_size: u32,
    pub type_ids_off: u32,
    pub proto_ids_size: u32,
    pub proto_ids_off: u32,
    pub field_ids_size: u32,
    pub field_ids_off: u32,
    pub method_ids_size: u32,
    pub method_ids_off: u32,
    pub class_defs_size: u32,
    pub class_defs_off: u32,
    pub data_size: u32,
    pub data_off: u32,
}

impl Header {
    /// Decodes and validates the header, switching the cursor to the byte
    /// order announced by the endian tag so that every subsequent integer
    /// read in the file is correctly byte-ordered.
    pub fn parse(cursor: &mut ByteCursor<'_>) -> Result<Header> {
        cursor.seek(0);
        let mut magic = [0u8; 8];
        magic.copy_from_slice(cursor.read_bytes(8)?);
        if !is_magic_valid(&magic) {
            return dex_err!(InvalidMagic { magic });
        }

        // Read the endian tag first, so we properly swap everything we read
        // from here on.
        cursor.seek(ENDIAN_TAG_OFFSET);
        let endian_tag = cursor.read_u32()?;
        match endian_tag {
            ENDIAN_CONSTANT => cursor.set_endian(Endian::Little),
            REVERSE_ENDIAN_CONSTANT => cursor.set_endian(Endian::Big),
            other => return dex_err!(UnexpectedEndianTag, other),
        }

        // Re-read the full field region in file order now that the byte
        // order is known.
        cursor.seek(HEADER_FIELDS_OFFSET);
        Ok(Header {
            file_size: cursor.read_u32()?,
            header_size: cursor.read_u32()?,
            endian_tag: cursor.read_u32()?,
            link_size: cursor.read_u32()?,
            link_off: cursor.read_u32()?,
            map_off: cursor.read_u32()?,
            string_ids_size: cursor.read_u32()?,
            string_ids_off: cursor.read_u32()?,
            type_ids_size: cursor.read_u32()?,
            type_ids_off: cursor.read_u32()?,
            proto_ids_size: cursor.read_u32()?,
            proto_ids_off: cursor.read_u32()?,
            field_ids_size: cursor.read_u32()?,
            field_ids_off: cursor.read_u32()?,
            method_ids_size: cursor.read_u32()?,
            method_ids_off: cursor.read_u32()?,
            class_defs_size: cursor.read_u32()?,
            class_defs_off: cursor.read_u32()?,
            data_size: cursor.read_u32()?,
            data_off: cursor.read_u32()?,
        })
    }
}
