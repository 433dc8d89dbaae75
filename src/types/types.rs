use std::collections::HashMap;
use std::fmt::{self, Display};

/// The coarse category of a type, used where only the kind matters (numeric
/// predicates, dispatch to specialized node families).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericType {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Bool,
    Map,
    Func,
    Array,
    Struct,
    Module,
    Any,
    Nil,
}

/// Full description of a type as the parser sees it. This is the static
/// half of the system: every runtime value's shape was proven against one
/// of these during parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDef {
    Primitive(GenericType),
    Func(FuncDef),
    Map(MapDef),
    Array(ArrayDef),
    Struct(StructDef),
    Module(ModuleDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub args: Vec<TypeDef>,
    /// A variadic function accepts any number of trailing arguments, each
    /// checked against the last declared argument type.
    pub variadic: bool,
    pub return_type: Option<Box<TypeDef>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapDef {
    pub key: Box<TypeDef>,
    pub value: Box<TypeDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDef {
    pub element: Box<TypeDef>,
    /// Fixed length for `type[N]` array types. Not part of the type's
    /// identity; it constrains initialization only.
    pub size: Option<usize>,
}

/// A struct's shape. Property names map to the index their value occupies
/// in the runtime instance sequence; only the parser ever knows the
/// mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub properties: HashMap<String, usize>,
    /// Aligned with the instance indices: the first `value_properties`
    /// entries are value properties, the rest are method signatures.
    pub property_defs: Vec<TypeDef>,
    pub value_properties: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDef {
    pub properties: HashMap<String, TypeDef>,
}

impl TypeDef {
    pub const ANY: TypeDef = TypeDef::Primitive(GenericType::Any);
    pub const NIL: TypeDef = TypeDef::Primitive(GenericType::Nil);

    pub fn generic_type(&self) -> GenericType {
        match self {
            TypeDef::Primitive(generic) => *generic,
            TypeDef::Func(_) => GenericType::Func,
            TypeDef::Map(_) => GenericType::Map,
            TypeDef::Array(_) => GenericType::Array,
            TypeDef::Struct(_) => GenericType::Struct,
            TypeDef::Module(_) => GenericType::Module,
        }
    }

    /// Structural equality with the `any` escape hatch: `any` matches every
    /// type from either side. Used for variadic and duck-typed builtins.
    pub fn equals(&self, other: &TypeDef) -> bool {
        if self.generic_type() == GenericType::Any || other.generic_type() == GenericType::Any {
            return true;
        }
        match (self, other) {
            (TypeDef::Primitive(a), TypeDef::Primitive(b)) => a == b,
            (TypeDef::Func(a), TypeDef::Func(b)) => {
                if a.args.len() != b.args.len() || a.variadic != b.variadic {
                    return false;
                }
                for (arg_a, arg_b) in a.args.iter().zip(&b.args) {
                    if !arg_a.equals(arg_b) {
                        return false;
                    }
                }
                match (&a.return_type, &b.return_type) {
                    (Some(a), Some(b)) => a.equals(b),
                    (None, None) => true,
                    _ => false,
                }
            }
            (TypeDef::Map(a), TypeDef::Map(b)) => {
                a.key.equals(&b.key) && a.value.equals(&b.value)
            }
            (TypeDef::Array(a), TypeDef::Array(b)) => a.element.equals(&b.element),
            (TypeDef::Struct(a), TypeDef::Struct(b)) => {
                a.name == b.name && a.property_defs.len() == b.property_defs.len()
            }
            (TypeDef::Module(_), TypeDef::Module(_)) => true,
            _ => false,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self.generic_type(),
            GenericType::Int8
                | GenericType::Int16
                | GenericType::Int32
                | GenericType::Int64
                | GenericType::Uint8
                | GenericType::Uint16
                | GenericType::Uint32
                | GenericType::Uint64
                | GenericType::Float32
                | GenericType::Float64
        )
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.generic_type(),
            GenericType::Int8
                | GenericType::Int16
                | GenericType::Int32
                | GenericType::Int64
                | GenericType::Uint8
                | GenericType::Uint16
                | GenericType::Uint32
                | GenericType::Uint64
        )
    }

    /// The argument type at a call position, repeating the final declared
    /// type for a variadic function.
    pub fn arg_type(def: &FuncDef, position: usize) -> Option<&TypeDef> {
        if position < def.args.len() {
            return def.args.get(position);
        }
        if def.variadic {
            return def.args.last();
        }
        None
    }
}

impl Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenericType::Int8 => "int8",
            GenericType::Int16 => "int16",
            GenericType::Int32 => "int32",
            GenericType::Int64 => "int64",
            GenericType::Uint8 => "uint8",
            GenericType::Uint16 => "uint16",
            GenericType::Uint32 => "uint32",
            GenericType::Uint64 => "uint64",
            GenericType::Float32 => "float32",
            GenericType::Float64 => "float64",
            GenericType::String => "string",
            GenericType::Bool => "bool",
            GenericType::Map => "map",
            GenericType::Func => "fn",
            GenericType::Array => "array",
            GenericType::Struct => "struct",
            GenericType::Module => "module",
            GenericType::Any => "any",
            GenericType::Nil => "nil",
        };
        write!(f, "{}", name)
    }
}

impl Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDef::Primitive(generic) => write!(f, "{}", generic),
            TypeDef::Func(def) => {
                write!(f, "fn(")?;
                for (i, arg) in def.args.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                if def.variadic {
                    write!(f, "...")?;
                }
                write!(f, ")")?;
                if let Some(return_type) = &def.return_type {
                    write!(f, ": {}", return_type)?;
                }
                Ok(())
            }
            TypeDef::Map(def) => write!(f, "map[{}]{}", def.key, def.value),
            TypeDef::Array(def) => match def.size {
                Some(size) => write!(f, "{}[{}]", def.element, size),
                None => write!(f, "{}[]", def.element),
            },
            TypeDef::Struct(def) => write!(f, "{}", def.name),
            TypeDef::Module(_) => write!(f, "module"),
        }
    }
}
