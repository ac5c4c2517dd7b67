//! N-ary reduction tree layout
//!
//! A tree reduces the input vector layer by layer: each layer partitions its
//! working values into groups of at most `unit_arity`, one unit per group,
//! and the units' outputs become the next layer's working values. Recursion
//! stops when a single value remains.
//!
//! With `base_width = 10` and `unit_arity = 4`:
//!
//! ```text
//! raw      0  1  2  3 | 4  5  6  7 | 8  9
//!          `---u0---'   `---u1---'   `u2'     depth 0
//!               10           11       12
//!               `---------u3---------'        depth 1
//!                          13
//! ```
//!
//! Each layer reads a contiguous window of the flat address space: layer 0
//! reads the raw inputs at `[0, 10)`, layer 1 reads its predecessors'
//! outputs at `[10, 13)`. Unit `i`'s output always lands at
//! `base_width + i`.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{LayoutError, Result};
use crate::MIN_ARITY;

/// Layout of an n-ary reduction tree.
///
/// A validated `(base_width, unit_arity)` pair; every query is a pure
/// function of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeLayout {
    base_width: usize,
    unit_arity: usize,
}

/// One unit of a reduction tree, as enumerated by [`TreeLayout::units`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeUnit {
    /// Flat unit index in creation order, layer by layer
    pub index: usize,
    /// Layer the unit sits in; the layer consuming the raw inputs is 0
    pub depth: usize,
    /// Live input count
    pub width: usize,
    /// Flat address the unit's output drives (`base_width + index`)
    pub output_address: usize,
}

/// Accumulators of one layer descent step.
#[derive(Debug, Clone, Copy)]
struct Layer {
    depth: usize,
    /// Working values entering this layer.
    width: usize,
    /// Units this layer instantiates: `ceil(width / arity)`.
    groups: usize,
    /// Flat address of the first value this layer reads.
    raw_offset: usize,
    /// Units created by shallower layers.
    units_before: usize,
}

/// Layer descent: the working width shrinks to `ceil(width / arity)` per
/// layer until one value remains.
struct Layers {
    arity: usize,
    next: Option<Layer>,
}

impl Iterator for Layers {
    type Item = Layer;

    fn next(&mut self) -> Option<Layer> {
        let layer = self.next?;
        self.next = (layer.groups > 1).then(|| Layer {
            depth: layer.depth + 1,
            width: layer.groups,
            groups: layer.groups.div_ceil(self.arity),
            raw_offset: layer.raw_offset + layer.width,
            units_before: layer.units_before + layer.groups,
        });
        Some(layer)
    }
}

/// Width of group `local` among `groups` in a layer of `layer_width` values.
/// Only the last group can be narrower than the arity, and it is never empty.
fn group_width(arity: usize, layer_width: usize, local: usize, groups: usize) -> usize {
    if local + 1 == groups {
        let rem = layer_width % arity;
        if rem == 0 {
            arity
        } else {
            rem
        }
    } else {
        arity
    }
}

impl TreeLayout {
    /// Create a layout reducing `base_width` raw values with units of at
    /// most `unit_arity` inputs.
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

    /// Create the layout with the smallest arity whose tree is at most
    /// `max_latency` layers deep.
    pub fn for_latency(base_width: usize, max_latency: usize) -> Result<Self> {
        let unit_arity = Self::min_arity_for_latency(base_width, max_latency)?;
        Self::new(base_width, unit_arity)
    }

    /// Number of raw values the tree reduces
    pub fn base_width(&self) -> usize {
        self.base_width
    }

    /// Maximum unit input count
    pub fn unit_arity(&self) -> usize {
        self.unit_arity
    }

    /// Total number of units across all layers.
    ///
    /// Zero when `base_width <= 1`: a single value needs no reduction.
    pub fn unit_count(&self) -> usize {
        self.layers().map(|layer| layer.groups).sum()
    }

    /// Number of layers, which is also the tree's latency in stages.
    ///
    /// Equals `ceil(log_arity(base_width))` for `base_width > 1`, zero
    /// otherwise.
    pub fn depth(&self) -> usize {
        self.layers().count()
    }

    /// Input count of the requested unit, 0 if `unit_index` is out of
    /// range (so callers can probe past the end of a layer or the tree).
    pub fn unit_width(&self, unit_index: usize) -> usize {
        match self.locate(unit_index) {
            None => 0,
            Some((layer, local)) => group_width(self.unit_arity, layer.width, local, layer.groups),
        }
    }

    /// Layer the requested unit sits in, `None` if out of range.
    ///
    /// The layer consuming the raw inputs is depth 0; the root unit sits
    /// at `depth() - 1`.
    pub fn unit_depth(&self, unit_index: usize) -> Option<usize> {
        self.locate(unit_index).map(|(layer, _)| layer.depth)
    }

    /// Smallest arity whose tree is at most `max_latency` layers deep.
    ///
    /// Linear search upward from [`MIN_ARITY`]; the depth is non-increasing
    /// in the arity and reaches 1 once the arity covers the whole vector,
    /// so the search terminates for any `max_latency >= 1`.
    pub fn min_arity_for_latency(base_width: usize, max_latency: usize) -> Result<usize> {
        if max_latency == 0 {
            return Err(LayoutError::ZeroLatency);
        }
        let mut unit_arity = MIN_ARITY;
        loop {
            let depth = Self {
                base_width,
                unit_arity,
            }
            .depth();
            if depth <= max_latency {
                trace!(
                    "tree latency search: base {} latency {} -> arity {}",
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
    /// Each layer reads a contiguous window of the flat address space
    /// starting at the sum of all shallower layers' widths; within the
    /// layer, unit inputs are consecutive. `None` if the unit does not
    /// exist or the slot is past the unit's width.
    pub fn unit_input_address(&self, unit_index: usize, input_slot: usize) -> Option<usize> {
        let (layer, local) = self.locate(unit_index)?;
        let width = group_width(self.unit_arity, layer.width, local, layer.groups);
        (input_slot < width).then(|| local * self.unit_arity + input_slot + layer.raw_offset)
    }

    /// Units in creation order, layer by layer
    pub fn units(&self) -> impl Iterator<Item = TreeUnit> {
        let base_width = self.base_width;
        let arity = self.unit_arity;
        self.layers().flat_map(move |layer| {
            (0..layer.groups).map(move |local| TreeUnit {
                index: layer.units_before + local,
                depth: layer.depth,
                width: group_width(arity, layer.width, local, layer.groups),
                output_address: base_width + layer.units_before + local,
            })
        })
    }

    /// Resolve a flat unit index to its layer and position within it.
    fn locate(&self, unit_index: usize) -> Option<(Layer, usize)> {
        self.layers().find_map(|layer| {
            let local = unit_index.checked_sub(layer.units_before)?;
            (local < layer.groups).then_some((layer, local))
        })
    }

    fn layers(&self) -> Layers {
        let first = (self.base_width > 1).then(|| Layer {
            depth: 0,
            width: self.base_width,
            groups: self.base_width.div_ceil(self.unit_arity),
            raw_offset: 0,
            units_before: 0,
        });
        Layers {
            arity: self.unit_arity,
            next: first,
        }
    }
}
