//! Cached record of what is bound to a single binding point.
//!
//! Redundant binding calls are a measurable per-frame cost in
//! immediate-mode APIs. A [`Binding`] remembers the last value it applied
//! and skips the driver call when asked to apply the same value again.

use std::fmt;

/// One binding point's cached state.
///
/// The record is either known (equal to the real driver state) or unknown
/// after [`Binding::invalidate`]. An unknown record never elides.
#[derive(Debug, Clone)]
pub struct Binding<V> {
    name: &'static str,
    current: Option<V>,
    elide: bool,
}

impl<V: Copy + PartialEq + fmt::Debug> Binding<V> {
    /// Binding whose driver-side state is known to be `initial`.
    #[must_use]
    pub fn new(name: &'static str, initial: V) -> Self {
        Self {
            name,
            current: Some(initial),
            elide: true,
        }
    }

    /// Enable or disable elision of redundant sets. With elision off,
    /// every [`Binding::set`] reaches the driver.
    #[must_use]
    pub fn with_elision(mut self, elide: bool) -> Self {
        self.elide = elide;
        self
    }

    /// Human-readable binding point name, used in log output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The value last applied, or `None` if the record is unknown.
    #[must_use]
    pub fn recorded(&self) -> Option<V> {
        self.current
    }

    /// Apply `value` through `apply` unless it is already bound.
    ///
    /// After this call the record equals `value`.
    pub fn set(&mut self, value: V, apply: impl FnOnce(V)) {
        if self.elide && self.current == Some(value) {
            log::trace!("{}: elided redundant bind of {value:?}", self.name);
            return;
        }
        log::trace!("{}: bind {value:?}", self.name);
        apply(value);
        self.current = Some(value);
    }

    /// Mark the record unknown, so the next [`Binding::set`] always calls
    /// the driver.
    pub fn invalidate(&mut self) {
        self.current = None;
    }

    /// Replace the record with `reset` if it currently equals `value`,
    /// without a driver call. Used when the driver implicitly unbinds an
    /// object, e.g. on deletion.
    pub fn forget(&mut self, value: V, reset: V) {
        if self.current == Some(value) {
            self.current = Some(reset);
        }
    }
}
