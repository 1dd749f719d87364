//! Type mapping (C1), spec.md §4 / SPEC_FULL.md §2.
//!
//! Maps a source-level type to the runtime representation the emitter
//! compiles against. Full structural type inference belongs to the external
//! checker (Non-goal, spec.md §0) — this module only consumes an already
//! resolved [`SourceType`] and picks a [`RuntimeType`].

/// Resolved source-level type, as handed down by the external checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceType {
    Number,
    String,
    Boolean,
    BigInt,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
    Void,
    Array(Box<SourceType>),
    Tuple(Vec<SourceType>),
    Function,
    Promise(Box<SourceType>),
    Class(String),
    Enum(String),
    Union(Vec<SourceType>),
}

/// Target runtime representation. `$Array`/`$Promise` etc mirror the
/// well-known runtime type names the stub surface (`sharpts-runtime`)
/// exposes constructors for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeType {
    Object,
    Double,
    Bool,
    StringTy,
    BigIntTy,
    Class(String),
    Array,
    Promise,
    Void,
}

pub fn map_type(ty: &SourceType) -> RuntimeType {
    match ty {
        SourceType::Number => RuntimeType::Double,
        SourceType::Boolean => RuntimeType::Bool,
        SourceType::String => RuntimeType::StringTy,
        SourceType::BigInt => RuntimeType::BigIntTy,
        SourceType::Null | SourceType::Undefined | SourceType::Any | SourceType::Unknown => {
            RuntimeType::Object
        }
        SourceType::Never | SourceType::Void => RuntimeType::Void,
        SourceType::Array(_) | SourceType::Tuple(_) => RuntimeType::Array,
        SourceType::Function => RuntimeType::Object,
        SourceType::Promise(_) => RuntimeType::Promise,
        SourceType::Class(name) | SourceType::Enum(name) => RuntimeType::Class(name.clone()),
        // A union of non-uniform runtime representations has to be boxed;
        // eagerly treating it as `object` keeps the resolver's load path
        // (SPEC_FULL.md §6) from special-casing unions at every call site.
        SourceType::Union(_) => RuntimeType::Object,
    }
}

/// `true` for runtime types that are not reference types — used by the
/// overload generator's zero-value emission (C9) and by the state-machine
/// builder's default-field value (C4).
pub fn is_value_type(rt: &RuntimeType) -> bool {
    matches!(
        rt,
        RuntimeType::Double | RuntimeType::Bool | RuntimeType::BigIntTy
    )
}

/// The zero value for a runtime type: the `initobj` pattern for value types,
/// `null` for reference types.
#[derive(Debug, Clone, PartialEq)]
pub enum ZeroValue {
    InitObj(RuntimeType),
    Null,
}

pub fn zero_value(rt: &RuntimeType) -> ZeroValue {
    if is_value_type(rt) {
        ZeroValue::InitObj(rt.clone())
    } else {
        ZeroValue::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_maps_to_double_and_is_a_value_type() {
        let rt = map_type(&SourceType::Number);
        assert_eq!(rt, RuntimeType::Double);
        assert!(is_value_type(&rt));
        assert_eq!(zero_value(&rt), ZeroValue::InitObj(RuntimeType::Double));
    }

    #[test]
    fn class_maps_to_reference_type_with_null_zero_value() {
        let rt = map_type(&SourceType::Class("Foo".into()));
        assert!(!is_value_type(&rt));
        assert_eq!(zero_value(&rt), ZeroValue::Null);
    }

    #[test]
    fn union_is_boxed_as_object() {
        assert_eq!(
            map_type(&SourceType::Union(vec![SourceType::Number, SourceType::String])),
            RuntimeType::Object
        );
    }
}
