//! Overlapping-chain ("ladder") layout
//!
//! A ladder is the staged form of a carry/propagate-style comparator: unit 0
//! consumes the first `unit_arity` raw inputs, and every later unit combines
//! the single output carried from its predecessor with up to `unit_arity - 1`
//! fresh raw inputs, until the input vector is exhausted. Consecutive units
//! overlap by exactly one carried dependency, never by shared raw inputs.
//!
//! With `base_width = 10` and `unit_arity = 4`:
//!
//! ```text
//! raw      0  1  2  3 | 4  5  6 | 7  8  9
//!          `---u0---'   |  |  |   |  |  |
//!               `------u1------'  |  |  |
//!                       `--------u2-----'
//! ```
//!
//! Unit outputs occupy the flat address space right after the raw inputs, in
//! creation order: `u0` drives address 10, `u1` address 11, `u2` address 12.
//! One pipeline stage per unit, so the chain length is also its latency.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{LayoutError, Result};
use crate::MIN_ARITY;

/// Layout of an overlapping comparator chain.
///
/// A validated `(base_width, unit_arity)` pair; every query is a pure
/// function of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LadderLayout {
    base_width: usize,
    unit_arity: usize,
}

/// One unit of a ladder, as enumerated by [`LadderLayout::units`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderUnit {
    /// Position in the chain, starting at 0
    pub index: usize,
    /// Pipeline stage at which the unit's output settles; one stage per
    /// unit, so this equals `index`
    pub depth: usize,
    /// Live input count, carried value included
    pub width: usize,
    /// Flat address the unit's output drives (`base_width + index`)
    pub output_address: usize,
}

/// Accumulators of one chain descent step, one per unit.
#[derive(Debug, Clone, Copy)]
struct Step {
    index: usize,
    /// Raw inputs this unit consumes (the carried value is not counted).
    fresh: usize,
    /// Flat address of the first raw input this unit consumes.
    first_raw: usize,
    /// Raw inputs still unconsumed after this unit.
    remaining: usize,
}

/// Chain descent: unit 0 takes `min(base_width, arity)` raw inputs, each
/// later unit `min(remaining, arity - 1)`, until nothing remains.
struct Steps {
    arity: usize,
    next: Option<Step>,
}

impl Iterator for Steps {
    type Item = Step;

    fn next(&mut self) -> Option<Step> {
        let step = self.next?;
        self.next = (step.remaining > 0).then(|| {
            let fresh = step.remaining.min(self.arity - 1);
            Step {
                index: step.index + 1,
                fresh,
                first_raw: step.first_raw + step.fresh,
                remaining: step.remaining - fresh,
            }
        });
        Some(step)
    }
}

impl LadderLayout {
    /// Create a layout over `base_width` raw inputs with units of at most
    /// `unit_arity` inputs.
    ///
    /// `base_width <= 1` is the degenerate zero-unit layout; `unit_arity`
    /// below [`MIN_ARITY`] is rejected.
    pub fn new(base_width: usize, unit_arity: usize) -> Result<Self> {
        if unit_arity < MIN_ARITY {
            return Err(LayoutError::ArityTooSmall(unit_arity));
        }
        Ok(Self {
            base_width,
            unit_arity,
        })
    }

    /// Create the layout with the smallest arity whose chain is at most
    /// `max_latency` units long.
    pub fn for_latency(base_width: usize, max_latency: usize) -> Result<Self> {
        let unit_arity = Self::min_arity_for_latency(base_width, max_latency)?;
        Self::new(base_width, unit_arity)
    }

    /// Number of raw inputs the chain compares
    pub fn base_width(&self) -> usize {
        self.base_width
    }

    /// Maximum unit input count
    pub fn unit_arity(&self) -> usize {
        self.unit_arity
    }

    /// Number of units in the chain, which is also its latency in stages.
    ///
    /// Zero when `base_width <= 1`: a single value needs no comparison.
    pub fn unit_count(&self) -> usize {
        self.steps().count()
    }

    /// Total input count of the final unit.
    ///
    /// Every unit but the last has exactly `unit_arity` inputs; the last
    /// takes whatever raw inputs remain plus the carried value. A
    /// single-unit chain carries nothing, so its width is the raw-input
    /// count alone. Zero when no units exist.
    pub fn last_unit_width(&self) -> usize {
        match self.steps().last() {
            None => 0,
            Some(last) if last.index == 0 => last.fresh,
            Some(last) => last.fresh + 1,
        }
    }

    /// Input count of an arbitrary unit, 0 if `unit_index` is out of range.
    pub fn unit_width(&self, unit_index: usize) -> usize {
        let count = self.unit_count();
        if unit_index >= count {
            0
        } else if unit_index + 1 == count {
            self.last_unit_width()
        } else {
            self.unit_arity
        }
    }

    /// Smallest arity whose chain is at most `max_latency` units long.
    ///
    /// Linear search upward from [`MIN_ARITY`]; the chain length is
    /// non-increasing in the arity and reaches 1 once the arity covers the
    /// whole input vector, so the search terminates for any
    /// `max_latency >= 1`.
    pub fn min_arity_for_latency(base_width: usize, max_latency: usize) -> Result<usize> {
        if max_latency == 0 {
            return Err(LayoutError::ZeroLatency);
        }
        let mut unit_arity = MIN_ARITY;
        loop {
            let size = Self {
                base_width,
                unit_arity,
            }
            .unit_count();
            if size <= max_latency {
                trace!(
                    "ladder latency search: base {} latency {} -> arity {}",
                    base_width,
                    max_latency,
                    unit_arity
                );
                return Ok(unit_arity);
            }
            unit_arity += 1;
        }
    }

    /// Flat address read by input `input_slot` of unit `unit_index`.
    ///
    /// Addresses `[0, base_width)` are raw inputs; address
    /// `base_width + i` is unit `i`'s output. Unit 0 reads only raw
    /// inputs; for every later unit, slot 0 is the value carried from its
    /// predecessor and slots `1..width` are fresh raw inputs. `None` if
    /// the unit or slot does not exist.
    pub fn unit_input_address(&self, unit_index: usize, input_slot: usize) -> Option<usize> {
        let step = self.steps().nth(unit_index)?;
        if unit_index == 0 {
            return (input_slot < step.fresh).then_some(input_slot);
        }
        if input_slot == 0 {
            // Carried value: the previous unit's output, stored after the
            // raw inputs in creation order.
            return Some(self.base_width + unit_index - 1);
        }
        (input_slot <= step.fresh).then(|| step.first_raw + input_slot - 1)
    }

    /// Units in creation order, one descriptor per chain stage
    pub fn units(&self) -> impl Iterator<Item = LadderUnit> {
        let base_width = self.base_width;
        self.steps().map(move |step| LadderUnit {
            index: step.index,
            depth: step.index,
            width: if step.index == 0 {
                step.fresh
            } else {
                step.fresh + 1
            },
            output_address: base_width + step.index,
        })
    }

    fn steps(&self) -> Steps {
        let first = (self.base_width > 1).then(|| {
            let fresh = self.base_width.min(self.unit_arity);
            Step {
                index: 0,
                fresh,
                first_raw: 0,
                remaining: self.base_width - fresh,
            }
        });
        Steps {
            arity: self.unit_arity,
            next: first,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_arity() {
        assert_eq!(LadderLayout::new(10, 1), Err(LayoutError::ArityTooSmall(1)));
        assert_eq!(LadderLayout::new(10, 0), Err(LayoutError::ArityTooSmall(0)));
        assert!(LadderLayout::new(10, 2).is_ok());
    }

    #[test]
    fn test_unit_count_base_10() {
        let layout = LadderLayout::new(10, 4).unwrap();
        // Consumes 4, then 3, then 3.
        assert_eq!(layout.unit_count(), 3);
    }

    #[test]
    fn test_degenerate_widths() {
        for base_width in [0, 1] {
            let layout = LadderLayout::new(base_width, 4).unwrap();
            assert_eq!(layout.unit_count(), 0);
            assert_eq!(layout.last_unit_width(), 0);
            assert_eq!(layout.unit_width(0), 0);
            assert_eq!(layout.unit_input_address(0, 0), None);
            assert_eq!(layout.units().count(), 0);
        }
    }

    #[test]
    fn test_last_unit_width_counts_carry() {
        // 4 raw + then 3+3 fresh; the last unit adds the carried value.
        let layout = LadderLayout::new(10, 4).unwrap();
        assert_eq!(layout.last_unit_width(), 4);
    }

    #[test]
    fn test_single_unit_has_no_carry() {
        // The whole vector fits one unit, so no carried input exists.
        assert_eq!(LadderLayout::new(10, 10).unwrap().last_unit_width(), 10);
        assert_eq!(LadderLayout::new(3, 8).unwrap().last_unit_width(), 3);
    }

    #[test]
    fn test_unit_width_matches_chain_shape() {
        let layout = LadderLayout::new(10, 4).unwrap();
        assert_eq!(layout.unit_width(0), 4);
        assert_eq!(layout.unit_width(1), 4);
        assert_eq!(layout.unit_width(2), 4);
        assert_eq!(layout.unit_width(3), 0);
    }

    #[test]
    fn test_input_addresses_base_10_arity_4() {
        let layout = LadderLayout::new(10, 4).unwrap();
        // Unit 0 reads the first four raw inputs.
        for slot in 0..4 {
            assert_eq!(layout.unit_input_address(0, slot), Some(slot));
        }
        // Unit 1: carried output of unit 0, then raw 4..6.
        assert_eq!(layout.unit_input_address(1, 0), Some(10));
        assert_eq!(layout.unit_input_address(1, 1), Some(4));
        assert_eq!(layout.unit_input_address(1, 2), Some(5));
        assert_eq!(layout.unit_input_address(1, 3), Some(6));
        // Unit 2: carried output of unit 1, then raw 7..9.
        assert_eq!(layout.unit_input_address(2, 0), Some(11));
        assert_eq!(layout.unit_input_address(2, 1), Some(7));
        assert_eq!(layout.unit_input_address(2, 2), Some(8));
        assert_eq!(layout.unit_input_address(2, 3), Some(9));
    }

    #[test]
    fn test_input_address_out_of_range() {
        let layout = LadderLayout::new(10, 4).unwrap();
        assert_eq!(layout.unit_input_address(3, 0), None);
        assert_eq!(layout.unit_input_address(0, 4), None);
        assert_eq!(layout.unit_input_address(2, 4), None);
    }

    #[test]
    fn test_units_enumeration() {
        let layout = LadderLayout::new(10, 4).unwrap();
        let units: Vec<LadderUnit> = layout.units().collect();
        assert_eq!(units.len(), 3);
        for (i, unit) in units.iter().enumerate() {
            assert_eq!(unit.index, i);
            assert_eq!(unit.depth, i);
            assert_eq!(unit.width, layout.unit_width(i));
            assert_eq!(unit.output_address, 10 + i);
        }
    }

    #[test]
    fn test_min_arity_for_latency() {
        assert_eq!(LadderLayout::min_arity_for_latency(10, 1), Ok(10));
        assert_eq!(LadderLayout::min_arity_for_latency(10, 2), Ok(6));
        assert_eq!(LadderLayout::min_arity_for_latency(10, 3), Ok(4));
        assert_eq!(LadderLayout::min_arity_for_latency(10, 9), Ok(2));
        assert_eq!(
            LadderLayout::min_arity_for_latency(10, 0),
            Err(LayoutError::ZeroLatency)
        );
    }

    #[test]
    fn test_for_latency_builds_minimal_layout() {
        let layout = LadderLayout::for_latency(10, 3).unwrap();
        assert_eq!(layout.unit_arity(), 4);
        assert_eq!(layout.unit_count(), 3);
    }
}
