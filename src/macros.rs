//! Helper macros for generating the per-primitive runtime trait
//! implementations. Every integer and float width behaves identically apart
//! from the `Value` variant it lives in, so the impls are stamped out here
//! rather than written twelve times by hand.

/// Implements [`RuntimeType`](crate::runtime::value::RuntimeType) for a
/// primitive with no arithmetic (`bool`, `String`).
#[macro_export]
macro_rules! impl_value_type {
    ($type_:ty, $variant:ident, $name:literal, $default:expr) => {
        impl $crate::runtime::value::RuntimeType for $type_ {
            fn type_name() -> &'static str {
                $name
            }

            fn from_value(value: &$crate::runtime::value::Value) -> Self {
                match value {
                    $crate::runtime::value::Value::$variant(inner) => inner.clone(),
                    other => panic!(
                        "expected a {} value, found {}",
                        $name,
                        other.type_name()
                    ),
                }
            }

            fn to_value(self) -> $crate::runtime::value::Value {
                $crate::runtime::value::Value::$variant(self)
            }

            fn default_value() -> $crate::runtime::value::Value {
                $crate::runtime::value::Value::$variant($default)
            }
        }
    };
}

/// Implements [`RuntimeType`](crate::runtime::value::RuntimeType) and
/// [`Numeric`](crate::runtime::value::Numeric) for an integer width.
/// Arithmetic wraps on overflow; division by zero yields `None` so the
/// evaluating node can raise a runtime panic with the call stack attached.
#[macro_export]
macro_rules! impl_numeric_int {
    ($type_:ty, $variant:ident, $name:literal) => {
        $crate::impl_value_type!($type_, $variant, $name, 0);

        impl $crate::runtime::value::Numeric for $type_ {
            fn add(self, other: Self) -> Self {
                self.wrapping_add(other)
            }

            fn subtract(self, other: Self) -> Self {
                self.wrapping_sub(other)
            }

            fn multiply(self, other: Self) -> Self {
                self.wrapping_mul(other)
            }

            fn divide(self, other: Self) -> Option<Self> {
                if other == 0 {
                    return None;
                }
                Some(self.wrapping_div(other))
            }
        }
    };
}

/// Implements [`RuntimeType`](crate::runtime::value::RuntimeType) and
/// [`Numeric`](crate::runtime::value::Numeric) for a float width. Division
/// follows IEEE semantics, so dividing by zero is not an error here.
#[macro_export]
macro_rules! impl_numeric_float {
    ($type_:ty, $variant:ident, $name:literal) => {
        $crate::impl_value_type!($type_, $variant, $name, 0.0);

        impl $crate::runtime::value::Numeric for $type_ {
            fn add(self, other: Self) -> Self {
                self + other
            }

            fn subtract(self, other: Self) -> Self {
                self - other
            }

            fn multiply(self, other: Self) -> Self {
                self * other
            }

            fn divide(self, other: Self) -> Option<Self> {
                Some(self / other)
            }
        }
    };
}
