//! Structural layout of pipelined, bounded fan-in processing networks.
//!
//! Given a total input width and a maximum unit arity (the largest number of
//! inputs one processing stage may accept), this crate answers the questions
//! a structural generator asks before instantiating anything: how many units
//! a structure needs, how wide each unit is, at what pipeline depth a unit
//! sits, the smallest arity that meets a latency bound, and which flat
//! address every (unit, input slot) pair must be wired to.
//!
//! Two structure families share that contract:
//!
//! - [`LadderLayout`]: an overlapping chain in which each unit combines the
//!   previous unit's output with a fresh slice of raw inputs, the staged
//!   form of a carry/propagate comparator.
//! - [`TreeLayout`]: an n-ary reduction tree in which groups of up to
//!   `arity` values are combined layer by layer until one value remains.
//!
//! Addresses index the conceptual concatenation of all raw inputs followed
//! by every unit's output in creation order: `[0, base_width)` are raw
//! inputs, `base_width + i` is unit `i`'s output. Out-of-range queries
//! answer `None` rather than a sentinel address.
//!
//! All queries are pure integer computations over two scalar parameters;
//! the layout values are `Copy` and freely shared across threads.
//!
//! # Example
//!
//! ```
//! use pipeline_layout::{LadderLayout, TreeLayout};
//!
//! let ladder = LadderLayout::new(10, 4)?;
//! assert_eq!(ladder.unit_count(), 3);
//! // Unit 1 reads the carried output of unit 0, stored after the raw inputs.
//! assert_eq!(ladder.unit_input_address(1, 0), Some(10));
//!
//! let tree = TreeLayout::new(10, 4)?;
//! assert_eq!(tree.unit_count(), 4);
//! assert_eq!(tree.depth(), 2);
//! # Ok::<(), pipeline_layout::LayoutError>(())
//! ```

pub mod error;
pub mod ladder;
pub mod tree;

pub use error::{LayoutError, Result};
pub use ladder::{LadderLayout, LadderUnit};
pub use tree::{TreeLayout, TreeUnit};

/// Smallest unit arity that still shrinks a working set.
///
/// Arity 1 would leave both descents in place: a chain step would consume
/// no fresh inputs and a tree layer would keep its working width.
pub const MIN_ARITY: usize = 2;
