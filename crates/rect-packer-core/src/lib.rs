//! Core library for packing rectangles into bins.
//!
//! - Engines: Guillotine (choice + split, optional free-rect merging), MaxRects (BSSF/BLSF/BAF/BL/CP)
//! - Orchestrator: `pack_layout` / `pack_in_place` size the bin themselves and grow it until everything fits
//! - Data model is serde-serializable.
//!
//! Quick example:
//! ```
//! use rect_packer_core::{Item, rectangle_packer, rectangle_packer_mut};
//! # fn main() -> rect_packer_core::Result<()> {
//! let items = vec![Item::new(100, 40), Item::new(30, 30), Item::new(60, 80)];
//! let placed = rectangle_packer(&items)?;
//! assert_eq!(placed.len(), 3);
//! assert!(items[0].x.is_none());
//!
//! let mut items = items;
//! rectangle_packer_mut(&mut items)?;
//! assert!(items.iter().all(|it| it.x.is_some() && it.y.is_some()));
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod packer;
pub mod pipeline;

pub use config::*;
pub use error::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `rect_packer_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{
        AlgorithmFamily, AutoMode, GuillotineChoice, GuillotineSplit, MaxRectsHeuristic,
        PackerConfig, PackerConfigBuilder, SortOrder,
    };
    pub use crate::error::{RectPackError, Result};
    pub use crate::model::{Frame, PackStats, Rect};
    pub use crate::packer::{Packer, guillotine::GuillotinePacker, maxrects::MaxRectsPacker};
    pub use crate::pipeline::{
        Item, Layout, LayoutInfo, PackItem, PackItemMut, Placed, pack_in_place, pack_layout,
        rectangle_packer, rectangle_packer_mut,
    };
}
