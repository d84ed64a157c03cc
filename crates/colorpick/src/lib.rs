//! # Colorpick
//!
//! Colorpick selects a small, representative palette from a larger corpus of
//! named colors. It groups visually similar colors and then picks one
//! exemplar per group, either by a simple per-cluster policy or by searching
//! for a path that spreads the chosen colors as far apart as possible.
//!
//!
//! ## 1. Overview
//!
//! Colorpick's main abstractions are:
//!
//!   * The **color conversion** functions, e.g., [`rgb_to_lab`] and
//!     [`rgb_to_hsl`], which translate between sRGB, CIE XYZ, CIE L\*a\*b\*,
//!     and HSL, plus [`lab_distance`] for the CIE76 ΔE color difference.
//!   * [`Corpus`] holds the named colors as [`CorpusEntry`]s, each with its
//!     [`Rgb`] color and precomputed L\*a\*b\* and HSL coordinates. A
//!     [`Feature`] names one of those coordinates.
//!   * The [`Clustering`] trait abstracts over the algorithm grouping the
//!     colors into an [`Assignment`]. [`KMeans`] is a seeded, deterministic
//!     implementation.
//!   * [`select`] picks one exemplar per cluster according to a [`Policy`]
//!     and records them in a [`Selection`].
//!   * [`DispersionGraph`] connects colors from different clusters with edges
//!     weighted by their color difference. Its [`max_path`
//!     ](DispersionGraph::max_path) method searches for the [`DispersionPath`]
//!     with the largest total weight that touches every cluster at most once.
//!   * The [`pipeline`] module combines these steps, configured with
//!     [`Options`](pipeline::Options).
//!
//!
//! ## 2. One-Two-Three: Palette!
//!
//! ```
//! # use colorpick::{Corpus, KMeans};
//! # use colorpick::pipeline::{format_palette, run, Options};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 1. Load the corpus
//! let corpus = Corpus::parse(
//!     "black: \"#000000\"\n\
//!      white: \"#ffffff\"\n\
//!      red: \"#ff0000\"\n\
//!      crimson: \"#dc143c\"\n",
//! )?;
//!
//! // 2. Configure and run the pipeline
//! let options = Options::builder().clusters(3).build()?;
//! let outcome = run(&corpus, &options, &KMeans::new(3, options.seed()))?;
//!
//! // 3. Emit the palette
//! assert_eq!(outcome.exemplars().len(), 3);
//! let palette = format_palette(outcome.exemplars());
//! assert!(palette.starts_with("black: \"#000000\""));
//! # Ok(())
//! # }
//! ```
//!
//!
//! ## 3. Optional Features
//!
//! Colorpick supports one feature flag:
//!
//!   - **`f64`** selects the eponymous type as floating point type [`Float`]
//!     and `u64` as [`Bits`] instead of `f32` as [`Float`] and `u32` as
//!     [`Bits`]. This feature is enabled by default.
//!
//!
//! ## 4. Logging
//!
//! Colorpick reports progress and degenerate inputs, e.g., empty clusters,
//! through the [`log`](https://docs.rs/log) facade. It does not install a
//! logger itself.

/// The floating point type in use.
#[cfg(feature = "f64")]
pub type Float = f64;
/// The floating point type in use.
#[cfg(not(feature = "f64"))]
pub type Float = f32;

/// The type of bit strings with the same size as [`Float`].
#[cfg(feature = "f64")]
pub type Bits = u64;
/// The type of bit strings with the same size as [`Float`].
#[cfg(not(feature = "f64"))]
pub type Bits = u32;

mod cluster;
mod core;
mod corpus;
pub mod error;
mod graph;
pub mod pipeline;
mod select;

pub use core::to_eq_bits;
pub use core::{
    lab_centroid, lab_distance, lab_to_rgb, lab_to_xyz, rgb_to_hsl, rgb_to_lab, rgb_to_xyz,
    xyz_to_lab, xyz_to_rgb, D65_WHITE,
};

pub use cluster::{Clustering, KMeans};
pub use corpus::{Assignment, ClusterFeatures, Corpus, CorpusEntry, Feature, Rgb};
pub use graph::{ClusterSet, DispersionGraph, DispersionPath, NodeId, SearchBudget};
pub use select::{select, Policy, Selection};
