//! Type-erased equality for node configuration.
//!
//! The reconciler compares configuration between passes without knowing its concrete
//! type. [`AnyEquatable`] wraps any `PartialEq + Debug` value once per node and compares
//! two wrappers by downcasting: values of different types are never equal.

use alloc::rc::Rc;
use core::{
    any::{Any, type_name},
    fmt::{self, Debug},
};

trait ErasedEq: Any {
    fn eq_erased(&self, other: &dyn ErasedEq) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn fmt_erased(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    fn value_type_name(&self) -> &'static str;
}

impl<T: PartialEq + Debug + 'static> ErasedEq for T {
    fn eq_erased(&self, other: &dyn ErasedEq) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn fmt_erased(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// A cheaply clonable, type-erased value that can be compared for equality.
///
/// Cloning shares the underlying value.
#[derive(Clone)]
pub struct AnyEquatable(Rc<dyn ErasedEq>);

impl AnyEquatable {
    /// Wraps a value.
    pub fn new<T: PartialEq + Debug + 'static>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// The empty configuration, used by nodes that carry no props.
    #[must_use]
    pub fn unit() -> Self {
        Self::new(())
    }

    /// Returns a reference to the wrapped value if it is of type `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Returns `true` if the wrapped value is of type `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Name of the wrapped value's type, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.0.value_type_name()
    }
}

impl Default for AnyEquatable {
    fn default() -> Self {
        Self::unit()
    }
}

impl PartialEq for AnyEquatable {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.eq_erased(&*other.0)
    }
}

impl Debug for AnyEquatable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt_erased(f)
    }
}

#[cfg(test)]
mod tests {
    use super::AnyEquatable;
    use alloc::{format, string::String};

    #[derive(Debug, PartialEq)]
    struct Label(&'static str);

    #[test]
    fn equal_values_of_same_type_compare_equal() {
        assert_eq!(AnyEquatable::new(Label("a")), AnyEquatable::new(Label("a")));
        assert_ne!(AnyEquatable::new(Label("a")), AnyEquatable::new(Label("b")));
    }

    #[test]
    fn different_types_never_compare_equal() {
        assert_ne!(AnyEquatable::new(1_i32), AnyEquatable::new(1_i64));
        assert_ne!(AnyEquatable::unit(), AnyEquatable::new(Label("")));
    }

    #[test]
    fn downcast_recovers_the_value() {
        let value = AnyEquatable::new(String::from("hello"));
        assert!(value.is::<String>());
        assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("hello"));
        assert!(value.downcast_ref::<Label>().is_none());
    }

    #[test]
    fn debug_forwards_to_the_wrapped_value() {
        assert_eq!(format!("{:?}", AnyEquatable::new(Label("x"))), "Label(\"x\")");
    }
}
