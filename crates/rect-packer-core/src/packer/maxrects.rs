use super::Packer;
use super::free_list::FreeList;
use super::score::ContactCtx;
use crate::config::MaxRectsHeuristic;
use crate::model::{Frame, Rect, occupancy_of};
use tracing::{debug, trace};

/// MaxRects bin packer.
///
/// Free space is kept as the set of maximal free rectangles. They may overlap,
/// but none is contained in another.
pub struct MaxRectsPacker {
    bin_w: u32,
    bin_h: u32,
    free: FreeList,
    used: Vec<Rect>,
    heuristic: MaxRectsHeuristic,
    allow_rotation: bool,
}

impl MaxRectsPacker {
    /// Empty bin using BestShortSideFit, rotation off.
    pub fn new(bin_width: u32, bin_height: u32) -> Self {
        Self {
            bin_w: bin_width,
            bin_h: bin_height,
            free: FreeList::new(Rect::new(0, 0, bin_width, bin_height)),
            used: Vec::new(),
            heuristic: MaxRectsHeuristic::BestShortSideFit,
            allow_rotation: false,
        }
    }

    /// Heuristic used by the `Packer` impl.
    pub fn with_heuristic(mut self, heuristic: MaxRectsHeuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn with_rotation(mut self, allow_rotation: bool) -> Self {
        self.allow_rotation = allow_rotation;
        self
    }

    pub fn bin_width(&self) -> u32 {
        self.bin_w
    }

    pub fn bin_height(&self) -> u32 {
        self.bin_h
    }

    pub fn free_rects(&self) -> &[Rect] {
        self.free.as_slice()
    }

    pub fn used_rects(&self) -> &[Rect] {
        &self.used
    }

    pub fn occupancy(&self) -> f64 {
        occupancy_of(&self.used, self.bin_w, self.bin_h)
    }

    /// Places items in the order given. Rejected items are left out of the result.
    pub fn insert_rects<K, I>(&mut self, items: I, heuristic: MaxRectsHeuristic) -> Vec<Frame<K>>
    where
        I: IntoIterator<Item = (K, u32, u32)>,
    {
        let mut frames = Vec::new();
        for (key, w, h) in items {
            if let Some((frame, rotated)) = self.insert(w, h, heuristic) {
                frames.push(Frame {
                    key,
                    frame,
                    rotated,
                });
            }
        }
        frames
    }

    /// Places one `w x h` item. Returns the placed rectangle and whether it was rotated.
    pub fn insert(&mut self, w: u32, h: u32, heuristic: MaxRectsHeuristic) -> Option<(Rect, bool)> {
        if w == 0 || h == 0 {
            trace!(w, h, "rejecting empty item");
            return None;
        }
        let Some((node, rotated)) = self.find_position(w, h, heuristic) else {
            debug!(w, h, free = self.free.len(), "no free rect fits");
            return None;
        };
        self.place_rect(&node);
        Some((node, rotated))
    }

    /// Runs the containment prune again; returns how many rects it removed.
    pub fn prune_free_list(&mut self) -> usize {
        self.free.prune()
    }

    fn place_rect(&mut self, node: &Rect) {
        self.free
            .replace_with(|fr, out| Self::split_free_node(fr, node, out));
        self.free.prune();
        self.used.push(*node);
    }

    /// Pushes the maximal parts of `fr` left, right, above and below `node`.
    /// Returns false (and pushes nothing) when they do not overlap.
    fn split_free_node(fr: &Rect, node: &Rect, out: &mut Vec<Rect>) -> bool {
        if !fr.overlaps(node) {
            return false;
        }
        // left
        if node.x > fr.x {
            out.push(Rect::new(fr.x, fr.y, node.x - fr.x, fr.h));
        }
        // right
        if node.x2() < fr.x2() {
            out.push(Rect::new(node.x2(), fr.y, fr.x2() - node.x2(), fr.h));
        }
        // above
        if node.y > fr.y {
            out.push(Rect::new(fr.x, fr.y, fr.w, node.y - fr.y));
        }
        // below
        if node.y2() < fr.y2() {
            out.push(Rect::new(fr.x, node.y2(), fr.w, fr.y2() - node.y2()));
        }
        true
    }

    fn find_position(&self, w: u32, h: u32, heuristic: MaxRectsHeuristic) -> Option<(Rect, bool)> {
        let score = heuristic.score_fn();
        let early_out = heuristic.takes_perfect_fit();
        let ctx = ContactCtx {
            bin_w: self.bin_w,
            bin_h: self.bin_h,
            used: &self.used,
        };
        let mut best: Option<(Rect, bool)> = None;
        let mut best_score = (i64::MAX, i64::MAX);

        for fr in self.free.as_slice() {
            // normal
            if fr.fits(w, h) {
                if early_out && fr.fits_perfectly(w, h) {
                    return Some((Rect::new(fr.x, fr.y, w, h), false));
                }
                let s = score(fr, w, h, &ctx);
                if s < best_score {
                    best_score = s;
                    best = Some((Rect::new(fr.x, fr.y, w, h), false));
                }
            }
            // rotated
            if self.allow_rotation && w != h && fr.fits(h, w) {
                if early_out && fr.fits_perfectly(h, w) {
                    return Some((Rect::new(fr.x, fr.y, h, w), true));
                }
                let s = score(fr, h, w, &ctx);
                if s < best_score {
                    best_score = s;
                    best = Some((Rect::new(fr.x, fr.y, h, w), true));
                }
            }
        }
        best
    }
}

impl<K> Packer<K> for MaxRectsPacker {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        w > 0 && h > 0 && self.find_position(w, h, self.heuristic).is_some()
    }

    fn pack(&mut self, key: K, w: u32, h: u32) -> Option<Frame<K>> {
        let (frame, rotated) = self.insert(w, h, self.heuristic)?;
        Some(Frame {
            key,
            frame,
            rotated,
        })
    }

    fn used_rects(&self) -> &[Rect] {
        &self.used
    }

    fn occupancy(&self) -> f64 {
        MaxRectsPacker::occupancy(self)
    }
}
