/// Shared option set driving all four renderers.
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Emit class-level rows, not just packages.
    pub include_classes: bool,
    pub include_class_count: bool,
    pub include_method_count: bool,
    pub include_field_count: bool,
    /// Prefix the package list with whole-tree totals.
    pub include_total_method_count: bool,
    /// Print a column header row in the package list.
    pub print_header: bool,
    /// Stable-sort sibling nodes ascending by referenced method count
    /// instead of the default lexicographic order.
    pub order_by_method_count: bool,
    /// Rows at or beyond this depth are omitted and their subtrees skipped.
    pub max_tree_depth: usize,
    /// Also emit the declared-dimension counts.
    pub print_declarations: bool,
    /// When false, method and field metrics are suppressed entirely; they
    /// are meaningless outside that domain.
    pub android_project: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            include_classes: false,
            include_class_count: false,
            include_method_count: true,
            include_field_count: false,
            include_total_method_count: false,
            print_header: false,
            order_by_method_count: false,
            max_tree_depth: usize::MAX,
            print_declarations: false,
            android_project: true,
        }
    }
}
