use std::fmt::Debug;
use std::io;

use thiserror::Error;

#[derive(Error)]
pub enum DexError {
    /// The first eight bytes do not match any accepted `dex\n0NN\0` tag.
    #[error("Bad file magic: {magic:?}")]
    InvalidMagic { magic: [u8; 8] },

    #[error("Unexpected endian tag: {0:#010x}")]
    UnexpectedEndianTag(u32),

    #[error("Truncated input: wanted {wanted} bytes at offset {offset}, only {available} available")]
    TruncatedInput {
        offset: usize,
        wanted: usize,
        available: usize,
    },

    #[error("Unexpected end of file at offset {offset}")]
    UnexpectedEndOfFile { offset: usize },

    #[error("Index({index}) to {item_ty} should be less than {max}")]
    UnresolvedIndex {
        index: u32,
        max: usize,
        item_ty: &'static str,
    },

    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

#[macro_export]
macro_rules! dex_err {
    ($name:ident) => {
        Err($crate::error::DexError::$name)
    };
    ($name:ident { $($arg:tt)* }) => {
        Err($crate::error::DexError::$name { $($arg)* })
    };
    ($name:ident, $($arg:tt)*) => {
        Err($crate::error::DexError::$name($($arg)*))
    };
}

impl Debug for DexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
