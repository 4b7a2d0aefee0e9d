//! Time-graph walking.
//!
//! Entities are trees of fields. [`TimeGraph`] visits every [`TimeValue`]
//! embedded in such a tree in one fixed order: pre-order, depth first, fields
//! in their declared order, sequence elements by index and map entries by key.
//! [`collect`] and [`replace`] both use that order, so the output of a
//! correction request (which preserves input order) pairs up with the slots
//! it came from.
//!
//! Entity types declare their time-bearing fields with [`time_fields!`]:
//!
//! ```
//! use sky_core::{time_fields, TimeValue};
//!
//! struct Passage {
//!     begin: TimeValue,
//!     end: TimeValue,
//!     label: String,
//! }
//!
//! time_fields!(Passage { begin, end });
//!
//! assert_eq!(Passage::TIME_FIELDS, &["begin", "end"]);
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::errors::CoreError;
use crate::time::TimeValue;

/// A node that may contain time values.
pub trait TimeGraph {
    /// Visit every embedded time value in traversal order.
    fn visit_times(&self, visitor: &mut dyn FnMut(&TimeValue));

    /// Visit every embedded time value mutably, in the same order as
    /// [`visit_times`](Self::visit_times).
    fn visit_times_mut(&mut self, visitor: &mut dyn FnMut(&mut TimeValue));
}

impl TimeGraph for TimeValue {
    fn visit_times(&self, visitor: &mut dyn FnMut(&TimeValue)) {
        visitor(self);
    }

    fn visit_times_mut(&mut self, visitor: &mut dyn FnMut(&mut TimeValue)) {
        visitor(self);
    }
}

impl<T: TimeGraph> TimeGraph for Option<T> {
    fn visit_times(&self, visitor: &mut dyn FnMut(&TimeValue)) {
        if let Some(inner) = self {
            inner.visit_times(visitor);
        }
    }

    fn visit_times_mut(&mut self, visitor: &mut dyn FnMut(&mut TimeValue)) {
        if let Some(inner) = self {
            inner.visit_times_mut(visitor);
        }
    }
}

impl<T: TimeGraph> TimeGraph for Vec<T> {
    fn visit_times(&self, visitor: &mut dyn FnMut(&TimeValue)) {
        for item in self {
            item.visit_times(visitor);
        }
    }

    fn visit_times_mut(&mut self, visitor: &mut dyn FnMut(&mut TimeValue)) {
        for item in self {
            item.visit_times_mut(visitor);
        }
    }
}

impl<T: TimeGraph + ?Sized> TimeGraph for Box<T> {
    fn visit_times(&self, visitor: &mut dyn FnMut(&TimeValue)) {
        (**self).visit_times(visitor);
    }

    fn visit_times_mut(&mut self, visitor: &mut dyn FnMut(&mut TimeValue)) {
        (**self).visit_times_mut(visitor);
    }
}

impl<K: Ord, T: TimeGraph> TimeGraph for BTreeMap<K, T> {
    fn visit_times(&self, visitor: &mut dyn FnMut(&TimeValue)) {
        for value in self.values() {
            value.visit_times(visitor);
        }
    }

    fn visit_times_mut(&mut self, visitor: &mut dyn FnMut(&mut TimeValue)) {
        for value in self.values_mut() {
            value.visit_times_mut(visitor);
        }
    }
}

/// Leaf types that never hold a [`TimeValue`].
macro_rules! opaque {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TimeGraph for $ty {
                fn visit_times(&self, _visitor: &mut dyn FnMut(&TimeValue)) {}
                fn visit_times_mut(&mut self, _visitor: &mut dyn FnMut(&mut TimeValue)) {}
            }
        )*
    };
}

opaque!(
    (),
    bool,
    String,
    f32,
    f64,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    NaiveDateTime,
);

/// Declare the time-bearing fields of a struct, in traversal order.
///
/// Generates the [`TimeGraph`] impl and a `TIME_FIELDS` constant listing the
/// field names. Fields not named here are never visited.
#[macro_export]
macro_rules! time_fields {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $ty {
            /// Time-bearing fields in traversal order.
            pub const TIME_FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];
        }

        impl $crate::walker::TimeGraph for $ty {
            #[allow(unused_variables)]
            fn visit_times(&self, visitor: &mut dyn FnMut(&$crate::time::TimeValue)) {
                $( $crate::walker::TimeGraph::visit_times(&self.$field, visitor); )*
            }

            #[allow(unused_variables)]
            fn visit_times_mut(&mut self, visitor: &mut dyn FnMut(&mut $crate::time::TimeValue)) {
                $( $crate::walker::TimeGraph::visit_times_mut(&mut self.$field, visitor); )*
            }
        }
    };
}

/// Number of time values reachable from `root`.
pub fn count<G: TimeGraph + ?Sized>(root: &G) -> usize {
    let mut total = 0;
    root.visit_times(&mut |_| total += 1);
    total
}

/// Clone every time value reachable from `root`, in traversal order.
///
/// Does not mutate the graph.
pub fn collect<G: TimeGraph + ?Sized>(root: &G) -> Vec<TimeValue> {
    let mut values = Vec::new();
    root.visit_times(&mut |value| values.push(value.clone()));
    values
}

/// Overwrite every time slot of `root` with `values`, in traversal order.
///
/// # Errors
///
/// Returns [`CoreError::GraphMismatch`] without touching the graph when the
/// number of replacements differs from the number of slots.
pub fn replace<G: TimeGraph + ?Sized>(root: &mut G, values: Vec<TimeValue>) -> Result<(), CoreError> {
    let expected = count(&*root);
    if expected != values.len() {
        return Err(CoreError::GraphMismatch {
            expected,
            found: values.len(),
        });
    }
    let mut replacements = values.into_iter();
    root.visit_times_mut(&mut |slot| {
        if let Some(value) = replacements.next() {
            *slot = value;
        }
    });
    Ok(())
}

/// Apply `f` to every time value reachable from `root`.
pub fn for_each_mut<G: TimeGraph + ?Sized>(root: &mut G, mut f: impl FnMut(&mut TimeValue)) {
    root.visit_times_mut(&mut |value| f(value));
}
