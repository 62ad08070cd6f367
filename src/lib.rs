//! tristrip-rs
//!
//! Converts triangle lists of 2-manifold meshes into a small number of long triangle strips.
//!
//! The pipeline is:
//!
//! 1. [build_adjacency](adjacency::build_adjacency) links every triangle to its edge neighbours, using a
//!    [RadixSorter](radix::RadixSorter) to group the edge records;
//! 2. [compute_strips](stripify::compute_strips) greedily grows strips over that graph;
//! 3. optionally [link_strips](link::link_strips) joins the strips into a single one with degenerate triangles.
//!
//! [stripify](stripify::stripify) runs the whole pipeline.
//!
//! # Features
//!
//! * `serde-serialize`: derives `Serialize` and `Deserialize` for options, strips and statistics

pub mod adjacency;
pub mod error;
pub mod link;
pub mod radix;
pub mod runs;
pub mod stats;
pub mod stripify;

#[cfg(test)]
mod testing;

pub use crate::error::{Error, Result};
