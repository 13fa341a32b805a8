use crate::model::{Frame, Rect};

pub mod free_list;
pub mod guillotine;
pub mod maxrects;
pub(crate) mod score;

/// A packer places rectangles into one fixed-size bin.
///
/// Implementations must ensure no overlaps and keep every placement inside the bin.
/// `pack` returns `None` if the rectangle cannot be placed; that is not an error.
pub trait Packer<K> {
    fn can_pack(&self, w: u32, h: u32) -> bool;
    fn pack(&mut self, key: K, w: u32, h: u32) -> Option<Frame<K>>;
    /// Placed rectangles in insertion order.
    fn used_rects(&self) -> &[Rect];
    /// Fraction of the bin covered by placed rectangles.
    fn occupancy(&self) -> f64;
}
