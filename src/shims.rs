//! Shim table - dotted source names mapped to C++ callables
//!
//! The table is an immutable value handed to the emitter. Names it does not
//! contain fall back to the emitter's `obj::prop` scoped-name form.

use std::collections::HashMap;

/// Fixed source-name to target-name pairs
pub const BUILTIN_SHIMS: &[(&str, &str)] = &[
    // Runtime support unit
    ("basic.showAkhila", "basic::showAkhila"),
    ("basic.showString", "basic::showString"),
    ("basic.showNumber", "basic::showNumber"),
    ("led.on", "led::on"),
    // <cmath>
    ("Math.sqrt", "sqrt"),
    ("Math.pow", "pow"),
    ("Math.abs", "abs"),
    ("Math.floor", "floor"),
    ("Math.ceil", "ceil"),
    ("Math.round", "round"),
    ("Math.sin", "sin"),
    ("Math.cos", "cos"),
    ("Math.tan", "tan"),
    ("Math.asin", "asin"),
    ("Math.acos", "acos"),
    ("Math.atan2", "atan2"),
];

/// Lookup from dotted source names (`Math.sqrt`) to C++ names (`sqrt`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimTable {
    entries: HashMap<String, String>,
}

impl ShimTable {
    /// Table built from [`BUILTIN_SHIMS`]
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_SHIMS.iter().copied())
    }

    /// Table built from explicit pairs; a later duplicate replaces an earlier one
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn lookup(&self, dotted_name: &str) -> Option<&str> {
        self.entries.get(dotted_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ShimTable {
    fn default() -> Self {
        Self::builtin()
    }
}
