//! Modulo-arithmetic example materialisers.
//!
//! The demo domain the engine grew up with: symbols are integer intervals,
//! and a produced node's key is the parent value advanced by the interval,
//! wrapped into an inclusive range. [`ModuloIntMaterialiser`] is the bare
//! integer version; [`ModuloDurationMaterialiser`] additionally threads a
//! fractional duration through the rule data, multiplying it down each
//! generation. Both double as fixtures for the engine tests and benches.

use thiserror::Error;

use crate::materialise::Materialiser;
use crate::node::Node;

/// Errors from constructing a modulo range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuloError {
    #[error("empty range: min {min} exceeds max {max}")]
    EmptyRange { min: i32, max: i32 },
}

/// Inclusive wrapping integer range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuloRange {
    min: i32,
    max: i32,
    modulo: i32,
}

impl ModuloRange {
    pub fn new(min: i32, max: i32) -> Result<Self, ModuloError> {
        if min > max {
            return Err(ModuloError::EmptyRange { min, max });
        }
        Ok(ModuloRange { min, max, modulo: 1 + max - min })
    }

    /// Advance `base` by `interval`, wrapping the result into the range.
    pub fn wrap(&self, base: i32, interval: i32) -> i32 {
        let shifted = base + interval;
        if shifted < self.min {
            self.max + (1 + shifted - self.min) % self.modulo
        } else {
            (shifted - self.min) % self.modulo + self.min
        }
    }
}

/// Materialiser over bare integers: the produced node's key *is* the
/// wrapped value, so the value a child lands on selects its rewrite rule.
#[derive(Debug, Clone, Copy)]
pub struct ModuloIntMaterialiser {
    range: ModuloRange,
}

impl ModuloIntMaterialiser {
    pub fn new(min: i32, max: i32) -> Result<Self, ModuloError> {
        Ok(ModuloIntMaterialiser { range: ModuloRange::new(min, max)? })
    }
}

impl Materialiser<i32, (), i32> for ModuloIntMaterialiser {
    fn produce(
        &self,
        successor: &i32,
        _data: &(),
        parent: &Node<i32, (), i32>,
        _siblings: usize,
    ) -> Node<i32, (), i32> {
        let value = self.range.wrap(parent.value, *successor);
        Node::plain(value, value)
    }
}

/// A fractional duration, kept unreduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration {
    pub numerator: u64,
    pub denominator: u64,
}

impl Duration {
    pub fn new(numerator: u64, denominator: u64) -> Self {
        Duration { numerator, denominator }
    }

    /// A whole duration (`denominator == 1`).
    pub fn whole(numerator: u64) -> Self {
        Duration::new(numerator, 1)
    }
}

impl Default for Duration {
    fn default() -> Self {
        Duration::new(0, 1)
    }
}

/// Value payload of the duration system: the wrapped interval plus the
/// accumulated fraction of the root duration this node covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuloValue {
    pub interval: i32,
    pub duration: Duration,
}

/// Like [`ModuloIntMaterialiser`], with each rule entry scaling the
/// parent's duration by its own fraction. The sibling count stays unused;
/// the split between siblings is already encoded in the rule data.
#[derive(Debug, Clone, Copy)]
pub struct ModuloDurationMaterialiser {
    range: ModuloRange,
}

impl ModuloDurationMaterialiser {
    pub fn new(min: i32, max: i32) -> Result<Self, ModuloError> {
        Ok(ModuloDurationMaterialiser { range: ModuloRange::new(min, max)? })
    }
}

impl Materialiser<i32, Duration, ModuloValue> for ModuloDurationMaterialiser {
    fn produce(
        &self,
        successor: &i32,
        data: &Duration,
        parent: &Node<i32, Duration, ModuloValue>,
        _siblings: usize,
    ) -> Node<i32, Duration, ModuloValue> {
        let interval = self.range.wrap(parent.value.interval, *successor);
        let duration = Duration::new(
            parent.value.duration.numerator * data.numerator,
            parent.value.duration.denominator * data.denominator,
        );
        Node::new(interval, *data, ModuloValue { interval, duration })
    }
}
