/// Converts a format descriptor to human-readable dotted form:
/// `Ljava/lang/String;` becomes `java.lang.String`, `[I` becomes `int[]`,
/// single-letter primitives map to their readable names. Unrecognized input
/// is passed through unchanged.
pub fn descriptor_to_dot(desc: &str) -> String {
    let dim = desc.chars().take_while(|c| *c == '[').count();
    let name = &desc[dim..];
    let mut output = String::with_capacity(desc.len());

    if let Some(class_name) = name.strip_prefix('L') {
        let class_name = class_name.strip_suffix(';').unwrap_or(class_name);
        output.push_str(&class_name.replace('/', "."));
    } else {
        output.push_str(match name {
            "B" => "byte",
            "C" => "char",
            "D" => "double",
            "F" => "float",
            "I" => "int",
            "J" => "long",
            "S" => "short",
            "V" => "void",
            "Z" => "boolean",
            other => other,
        });
    }

    for _ in 0..dim {
        output.push_str("[]");
    }
    output
}
