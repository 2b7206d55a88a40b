use std::io::{self, Write};

use serde::Serialize;

use super::{Dimension, Node, PackageTree, PrintOptions};
use crate::Result;

/// Closed set of render strategies; matching is exhaustive so no format can
/// go silently unhandled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Flat list of packages with fixed-width count columns.
    List,
    /// Indented tree with an inline count summary per node.
    Tree,
    /// Nested JSON document mirroring the tree shape.
    Json,
    /// Line-oriented YAML block-sequence document.
    Yaml,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::List | OutputFormat::Tree => ".txt",
            OutputFormat::Json => ".json",
            OutputFormat::Yaml => ".yml",
        }
    }
}

impl PackageTree {
    /// Renders the tree to `out`. For identical input and options every
    /// format produces byte-identical output across runs; the primary use
    /// case is diffing counts across builds.
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        format: OutputFormat,
        opts: &PrintOptions,
    ) -> Result<()> {
        match format {
            OutputFormat::List => self.print_package_list(out, opts)?,
            OutputFormat::Tree => self.print_tree(out, opts)?,
            OutputFormat::Json => self.print_json(out, opts)?,
            OutputFormat::Yaml => self.print_yaml(out, opts)?,
        }
        Ok(())
    }

    fn print_package_list<W: Write>(&self, out: &mut W, opts: &PrintOptions) -> io::Result<()> {
        if opts.include_total_method_count {
            if opts.android_project {
                writeln!(
                    out,
                    "Total methods: {}",
                    self.root.method_count(Dimension::Referenced)
                )?;
            }
            if opts.print_declarations {
                writeln!(
                    out,
                    "Total declared methods: {}",
                    self.root.method_count(Dimension::Declared)
                )?;
            }
        }
        if opts.print_header {
            print_package_list_header(out, opts)?;
        }
        let mut path = String::with_capacity(64);
        for child in self.root.visible_children(opts) {
            child.print_list_rows(out, &mut path, 0, opts)?;
        }
        Ok(())
    }

    fn print_tree<W: Write>(&self, out: &mut W, opts: &PrintOptions) -> io::Result<()> {
        for child in self.root.visible_children(opts) {
            child.print_tree_rows(out, 0, opts)?;
        }
        Ok(())
    }

    fn print_json<W: Write>(&self, out: &mut W, opts: &PrintOptions) -> Result<()> {
        if opts.max_tree_depth == 0 {
            return Ok(());
        }
        let doc = self.root.to_json_node(0, opts);
        serde_json::to_writer_pretty(out, &doc)?;
        Ok(())
    }

    fn print_yaml<W: Write>(&self, out: &mut W, opts: &PrintOptions) -> io::Result<()> {
        writeln!(out, "---")?;
        if opts.include_class_count {
            writeln!(
                out,
                "classes: {}",
                self.root.class_count(Dimension::Referenced)
            )?;
        }
        if opts.android_project {
            if opts.include_method_count {
                writeln!(
                    out,
                    "methods: {}",
                    self.root.method_count(Dimension::Referenced)
                )?;
            }
            if opts.include_field_count {
                writeln!(
                    out,
                    "fields: {}",
                    self.root.field_count(Dimension::Referenced)
                )?;
            }
        }
        if opts.print_declarations {
            writeln!(
                out,
                "declared_methods: {}",
                self.root.method_count(Dimension::Declared)
            )?;
            writeln!(
                out,
                "declared_fields: {}",
                self.root.field_count(Dimension::Declared)
            )?;
        }
        writeln!(out, "counts:")?;
        for child in self.root.visible_children(opts) {
            child.print_yaml_rows(out, 0, opts)?;
        }
        Ok(())
    }
}

fn print_package_list_header<W: Write>(out: &mut W, opts: &PrintOptions) -> io::Result<()> {
    if opts.include_class_count {
        write!(out, "{:<8} ", "classes")?;
    }
    if opts.android_project {
        if opts.include_method_count {
            write!(out, "{:<8} ", "methods")?;
        }
        if opts.include_field_count {
            write!(out, "{:<8} ", "fields")?;
        }
    }
    if opts.print_declarations {
        write!(out, "{:<16} ", "declared methods")?;
        write!(out, "{:<16} ", "declared fields")?;
    }
    writeln!(out, "package/class name")
}

fn pluralize(n: usize, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 {
        one
    } else {
        many
    }
}

#[derive(Serialize)]
struct JsonNode<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    classes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    methods: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    declared_methods: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    declared_fields: Option<usize>,
    children: Vec<JsonNode<'a>>,
}

impl Node {
    /// A node is printable iff class rows are requested or it is not itself
    /// a class.
    fn is_printable(&self, opts: &PrintOptions) -> bool {
        opts.include_classes || !self.is_class
    }

    /// Printable children in render order: lexicographic by name, or a
    /// stable ascending sort by referenced method count when requested.
    fn visible_children(&self, opts: &PrintOptions) -> Vec<&Node> {
        let mut children: Vec<&Node> = self
            .children
            .values()
            .filter(|c| c.is_printable(opts))
            .collect();
        if opts.order_by_method_count {
            children.sort_by_key(|c| c.method_count(Dimension::Referenced));
        }
        children
    }

    fn print_list_rows<W: Write>(
        &self,
        out: &mut W,
        path: &mut String,
        depth: usize,
        opts: &PrintOptions,
    ) -> io::Result<()> {
        if depth >= opts.max_tree_depth {
            return Ok(());
        }
        let len = path.len();
        if len > 0 {
            path.push('.');
        }
        path.push_str(&self.name);

        if opts.include_class_count {
            write!(out, "{:<8} ", self.class_count(Dimension::Referenced))?;
        }
        if opts.android_project {
            if opts.include_method_count {
                write!(out, "{:<8} ", self.method_count(Dimension::Referenced))?;
            }
            if opts.include_field_count {
                write!(out, "{:<8} ", self.field_count(Dimension::Referenced))?;
            }
        }
        if opts.print_declarations {
            // The header for these two columns uses more space.
            let width = if opts.print_header { 16 } else { 8 };
            write!(
                out,
                "{:<width$} ",
                self.method_count(Dimension::Declared),
                width = width
            )?;
            write!(
                out,
                "{:<width$} ",
                self.field_count(Dimension::Declared),
                width = width
            )?;
        }
        writeln!(out, "{}", path)?;

        for child in self.visible_children(opts) {
            child.print_list_rows(out, path, depth + 1, opts)?;
        }
        path.truncate(len);
        Ok(())
    }

    fn print_tree_rows<W: Write>(
        &self,
        out: &mut W,
        depth: usize,
        opts: &PrintOptions,
    ) -> io::Result<()> {
        if depth >= opts.max_tree_depth {
            return Ok(());
        }
        for _ in 0..depth {
            write!(out, "  ")?;
        }
        write!(out, "{}", self.name)?;

        if opts.include_class_count || opts.include_method_count || opts.include_field_count {
            write!(out, " (")?;
            let mut appended = false;
            if opts.include_class_count {
                let n = self.class_count(Dimension::Referenced);
                write!(out, "{} {}", n, pluralize(n, "class", "classes"))?;
                appended = true;
            }
            if opts.android_project {
                if opts.include_method_count {
                    if appended {
                        write!(out, ", ")?;
                    }
                    let n = self.method_count(Dimension::Referenced);
                    write!(out, "{} {}", n, pluralize(n, "method", "methods"))?;
                    appended = true;
                }
                if opts.include_field_count {
                    if appended {
                        write!(out, ", ")?;
                    }
                    let n = self.field_count(Dimension::Referenced);
                    write!(out, "{} {}", n, pluralize(n, "field", "fields"))?;
                    appended = true;
                }
            }
            if opts.print_declarations {
                if appended {
                    write!(out, ", ")?;
                }
                let m = self.method_count(Dimension::Declared);
                let f = self.field_count(Dimension::Declared);
                write!(
                    out,
                    "{} declared {}, {} declared {}",
                    m,
                    pluralize(m, "method", "methods"),
                    f,
                    pluralize(f, "field", "fields")
                )?;
            }
            write!(out, ")")?;
        }
        writeln!(out)?;

        for child in self.visible_children(opts) {
            child.print_tree_rows(out, depth + 1, opts)?;
        }
        Ok(())
    }

    fn to_json_node<'a>(&'a self, depth: usize, opts: &PrintOptions) -> JsonNode<'a> {
        let children = if depth + 1 >= opts.max_tree_depth {
            Vec::new()
        } else {
            self.visible_children(opts)
                .into_iter()
                .map(|c| c.to_json_node(depth + 1, opts))
                .collect()
        };
        JsonNode {
            name: &self.name,
            classes: opts
                .include_class_count
                .then(|| self.class_count(Dimension::Referenced)),
            methods: (opts.android_project && opts.include_method_count)
                .then(|| self.method_count(Dimension::Referenced)),
            fields: (opts.android_project && opts.include_field_count)
                .then(|| self.field_count(Dimension::Referenced)),
            declared_methods: opts
                .print_declarations
                .then(|| self.method_count(Dimension::Declared)),
            declared_fields: opts
                .print_declarations
                .then(|| self.field_count(Dimension::Declared)),
            children,
        }
    }

    fn print_yaml_rows<W: Write>(
        &self,
        out: &mut W,
        depth: usize,
        opts: &PrintOptions,
    ) -> io::Result<()> {
        if depth > opts.max_tree_depth {
            return Ok(());
        }
        let indent = "  ".repeat(depth * 2 + 1);
        writeln!(out, "{}- name: {}", indent, self.name)?;
        let indent = indent + "  ";
        if opts.include_class_count {
            writeln!(
                out,
                "{}classes: {}",
                indent,
                self.class_count(Dimension::Referenced)
            )?;
        }
        if opts.android_project {
            if opts.include_method_count {
                writeln!(
                    out,
                    "{}methods: {}",
                    indent,
                    self.method_count(Dimension::Referenced)
                )?;
            }
            if opts.include_field_count {
                writeln!(
                    out,
                    "{}fields: {}",
                    indent,
                    self.field_count(Dimension::Referenced)
                )?;
            }
        }
        if opts.print_declarations {
            writeln!(
                out,
                "{}declared_methods: {}",
                indent,
                self.method_count(Dimension::Declared)
            )?;
            writeln!(
                out,
                "{}declared_fields: {}",
                indent,
                self.field_count(Dimension::Declared)
            )?;
        }

        let children = if depth + 1 == opts.max_tree_depth {
            Vec::new()
        } else {
            self.visible_children(opts)
        };
        if children.is_empty() {
            writeln!(out, "{}children: []", indent)?;
            return Ok(());
        }
        writeln!(out, "{}children:", indent)?;
        for child in children {
            child.print_yaml_rows(out, depth + 1, opts)?;
        }
        Ok(())
    }
}
