use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use crate::deobf::Deobfuscator;
use crate::desc_names::descriptor_to_dot;
use crate::refs::{FieldRef, HasDeclaringClass, MethodRef};

pub mod options;
pub use options::*;
pub mod render;
pub use render::*;

/// Which projection a reference is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// Entities physically defined in the analyzed unit.
    Declared,
    /// Everything touched, internal or external.
    Referenced,
}

impl Dimension {
    #[inline(always)]
    fn idx(self) -> usize {
        match self {
            Dimension::Declared => 0,
            Dimension::Referenced => 1,
        }
    }
}

/// One segment of a dotted package/class path. Children are owned by their
/// parent, ordered by name; per-dimension counts are memoized and cleared
/// along the insertion path.
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) is_class: bool,
    pub(crate) children: BTreeMap<String, Node>,
    methods: [HashSet<MethodRef>; 2],
    fields: [HashSet<FieldRef>; 2],
    class_count_cache: [OnceLock<usize>; 2],
    method_count_cache: [OnceLock<usize>; 2],
    field_count_cache: [OnceLock<usize>; 2],
}

/// Class segments start with an uppercase letter or denote an array type.
/// This is a structural heuristic; the source data carries no such flag.
fn is_class_name(name: &str) -> bool {
    name.chars().next().map_or(false, char::is_uppercase) || name.contains("[]")
}

impl Node {
    fn new(name: &str) -> Node {
        Node {
            name: name.to_string(),
            is_class: is_class_name(name),
            children: BTreeMap::new(),
            methods: Default::default(),
            fields: Default::default(),
            class_count_cache: Default::default(),
            method_count_cache: Default::default(),
            field_count_cache: Default::default(),
        }
    }

    fn child(&mut self, segment: &str) -> &mut Node {
        self.children
            .entry(segment.to_string())
            .or_insert_with(|| Node::new(segment))
    }

    fn add_method(&mut self, path: &str, dim: Dimension, m: MethodRef) {
        self.method_count_cache[dim.idx()].take();
        self.class_count_cache[dim.idx()].take();
        match path.split_once('.') {
            Some((segment, rest)) => self.child(segment).add_method(rest, dim, m),
            None => {
                let leaf = self.child(path);
                leaf.method_count_cache[dim.idx()].take();
                leaf.class_count_cache[dim.idx()].take();
                leaf.methods[dim.idx()].insert(m);
            }
        }
    }

    fn add_field(&mut self, path: &str, dim: Dimension, f: FieldRef) {
        self.field_count_cache[dim.idx()].take();
        self.class_count_cache[dim.idx()].take();
        match path.split_once('.') {
            Some((segment, rest)) => self.child(segment).add_field(rest, dim, f),
            None => {
                let leaf = self.child(path);
                leaf.field_count_cache[dim.idx()].take();
                leaf.class_count_cache[dim.idx()].take();
                leaf.fields[dim.idx()].insert(f);
            }
        }
    }

    /// A class node counts as exactly one class; package nodes aggregate
    /// their children.
    pub(crate) fn class_count(&self, dim: Dimension) -> usize {
        *self.class_count_cache[dim.idx()].get_or_init(|| {
            if self.is_class {
                1
            } else {
                self.children.values().map(|c| c.class_count(dim)).sum()
            }
        })
    }

    pub(crate) fn method_count(&self, dim: Dimension) -> usize {
        *self.method_count_cache[dim.idx()].get_or_init(|| {
            self.methods[dim.idx()].len()
                + self
                    .children
                    .values()
                    .map(|c| c.method_count(dim))
                    .sum::<usize>()
        })
    }

    pub(crate) fn field_count(&self, dim: Dimension) -> usize {
        *self.field_count_cache[dim.idx()].get_or_init(|| {
            self.fields[dim.idx()].len()
                + self
                    .children
                    .values()
                    .map(|c| c.field_count(dim))
                    .sum::<usize>()
        })
    }

    #[cfg(test)]
    fn own_method_count(&self, dim: Dimension) -> usize {
        self.methods[dim.idx()].len()
    }
}

/// A trie over dotted package/class-name segments, accumulating deduplicated
/// references per node under the declared and referenced dimensions.
///
/// Built incrementally from one or more sources, read many times afterwards.
/// Insertion requires exclusive access; once insertions are complete, count
/// queries and renders may run from any number of threads.
pub struct PackageTree {
    root: Node,
    deobfuscator: Deobfuscator,
}

impl Default for PackageTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageTree {
    pub fn new() -> PackageTree {
        PackageTree::with_deobfuscator(Deobfuscator::empty())
    }

    pub fn with_deobfuscator(deobfuscator: Deobfuscator) -> PackageTree {
        PackageTree {
            root: Node::new(""),
            deobfuscator,
        }
    }

    /// Dotted insertion path for a ref: descriptor to dotted form, then the
    /// deobfuscation map (whole-string match), then `<unnamed>` for names
    /// without a package.
    fn dotted_declaring_class(&self, r: &dyn HasDeclaringClass) -> String {
        let dot = descriptor_to_dot(r.declaring_class());
        let name = self.deobfuscator.deobfuscate(&dot);
        if name.contains('.') {
            name.to_string()
        } else {
            format!("<unnamed>.{}", name)
        }
    }

    pub fn add_method(&mut self, dim: Dimension, m: MethodRef) {
        let path = self.dotted_declaring_class(&m);
        self.root.add_method(&path, dim, m);
    }

    pub fn add_field(&mut self, dim: Dimension, f: FieldRef) {
        let path = self.dotted_declaring_class(&f);
        self.root.add_field(&path, dim, f);
    }

    pub fn add_method_ref(&mut self, m: MethodRef) {
        self.add_method(Dimension::Referenced, m);
    }

    pub fn add_declared_method_ref(&mut self, m: MethodRef) {
        self.add_method(Dimension::Declared, m);
    }

    pub fn add_field_ref(&mut self, f: FieldRef) {
        self.add_field(Dimension::Referenced, f);
    }

    pub fn add_declared_field_ref(&mut self, f: FieldRef) {
        self.add_field(Dimension::Declared, f);
    }

    pub fn class_count(&self, dim: Dimension) -> usize {
        self.root.class_count(dim)
    }

    pub fn method_count(&self, dim: Dimension) -> usize {
        self.root.method_count(dim)
    }

    pub fn field_count(&self, dim: Dimension) -> usize {
        self.root.field_count(dim)
    }
}
