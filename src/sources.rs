use crate::file::DexFile;
use crate::refs::{FieldRef, MethodRef};
use crate::Result;

/// An opaque provider of raw reference streams. The aggregation layer is
/// agnostic to how the refs were produced; archive extraction and class-file
/// introspection live behind this seam, outside this crate.
pub trait SourceFile {
    fn method_refs(&self) -> Result<Vec<MethodRef>>;
    fn field_refs(&self) -> Result<Vec<FieldRef>>;
}

impl SourceFile for DexFile {
    fn method_refs(&self) -> Result<Vec<MethodRef>> {
        DexFile::method_refs(self)
    }

    fn field_refs(&self) -> Result<Vec<FieldRef>> {
        DexFile::field_refs(self)
    }
}
