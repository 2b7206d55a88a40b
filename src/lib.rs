use std::result;

pub mod cursor;
pub mod deobf;
pub mod desc_names;
pub mod error;
pub mod file;
pub mod refs;
pub mod sources;
pub mod tree;

pub type Result<T> = result::Result<T, error::DexError>;
