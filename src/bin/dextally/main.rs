use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use dextally::deobf::Deobfuscator;
use dextally::file::DexFile;
use dextally::tree::{OutputFormat, PackageTree, PrintOptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    List,
    Tree,
    Json,
    Yaml,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> OutputFormat {
        match arg {
            FormatArg::List => OutputFormat::List,
            FormatArg::Tree => OutputFormat::Tree,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Yaml => OutputFormat::Yaml,
        }
    }
}

/// Counts class, method and field references in DEX files, grouped by
/// package. References from all inputs aggregate into a single tree.
#[derive(Parser)]
#[command(name = "dextally", version)]
struct Args {
    /// DEX files to analyze
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = FormatArg::List)]
    format: FormatArg,

    /// Proguard mapping file used to deobfuscate class names
    #[arg(long)]
    mapping: Option<PathBuf>,

    /// Emit class-level rows, not just packages
    #[arg(long)]
    include_classes: bool,

    /// Include the class count column
    #[arg(long)]
    include_class_count: bool,

    /// Include the field count column
    #[arg(long)]
    include_field_count: bool,

    /// Prefix the package list with whole-tree totals
    #[arg(long)]
    include_total_method_count: bool,

    /// Print a column header row in the package list
    #[arg(long)]
    print_header: bool,

    /// Sort sibling nodes ascending by method count instead of by name
    #[arg(long)]
    order_by_method_count: bool,

    /// Omit rows at or beyond this depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Write output to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("dextally", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let deobfuscator = match &args.mapping {
        Some(path) => Deobfuscator::from_path(path)
            .with_context(|| format!("reading mapping file {}", path.display()))?,
        None => Deobfuscator::empty(),
    };

    let mut tree = PackageTree::with_deobfuscator(deobfuscator);
    for input in &args.inputs {
        let dex =
            DexFile::open(input).with_context(|| format!("parsing {}", input.display()))?;
        log::debug!(
            "{}: {} method ids, {} field ids",
            input.display(),
            dex.method_ids().len(),
            dex.field_ids().len()
        );
        for method in dex.method_refs()? {
            tree.add_method_ref(method);
        }
        for field in dex.field_refs()? {
            tree.add_field_ref(field);
        }
    }

    let opts = PrintOptions {
        include_classes: args.include_classes,
        include_class_count: args.include_class_count,
        include_field_count: args.include_field_count,
        include_total_method_count: args.include_total_method_count,
        print_header: args.print_header,
        order_by_method_count: args.order_by_method_count,
        max_tree_depth: args.max_depth.unwrap_or(usize::MAX),
        ..PrintOptions::default()
    };

    let format = OutputFormat::from(args.format);
    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(
                File::create(path).with_context(|| format!("creating {}", path.display()))?,
            );
            tree.render(&mut out, format, &opts)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            tree.render(&mut out, format, &opts)?;
        }
    }
    Ok(())
}
