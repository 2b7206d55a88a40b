/// A reference that knows the raw descriptor of its declaring class.
pub trait HasDeclaringClass {
    fn declaring_class(&self) -> &str;
}

/// A fully resolved method reference. Equality and hashing cover the whole
/// signature: two rows resolving to the same text are the same logical
/// reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Raw descriptor of the declaring class, e.g. `Ljava/util/List;`.
    pub declaring_class: String,
    pub name: String,
    /// Raw parameter descriptors in declaration order.
    pub parameter_types: Vec<String>,
    pub return_type: String,
}

impl MethodRef {
    /// The method's format signature, e.g. `(Ljava/lang/String;I)V`.
    pub fn descriptor(&self) -> String {
        let mut out = String::with_capacity(16);
        out.push('(');
        for ty in &self.parameter_types {
            out.push_str(ty);
        }
        out.push(')');
        out.push_str(&self.return_type);
        out
    }
}

impl HasDeclaringClass for MethodRef {
    fn declaring_class(&self) -> &str {
        &self.declaring_class
    }
}

/// A fully resolved field reference, same equality contract as [`MethodRef`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    pub declaring_class: String,
    pub name: String,
    /// Raw descriptor of the field type, e.g. `Ljava/lang/String;`.
    pub type_desc: String,
}

impl HasDeclaringClass for FieldRef {
    fn declaring_class(&self) -> &str {
        &self.declaring_class
    }
}

/// A class referenced from outside the analyzed unit, carrying the external
/// field and method references grouped under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRef {
    pub name: String,
    pub fields: Vec<FieldRef>,
    pub methods: Vec<MethodRef>,
}

impl ClassRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn add_field(&mut self, field: FieldRef) {
        self.fields.push(field);
    }

    pub fn add_method(&mut self, method: MethodRef) {
        self.methods.push(method);
    }
}
