use super::Packer;
use super::free_list::FreeList;
use crate::config::{GuillotineChoice, GuillotineSplit};
use crate::model::{Frame, Rect, occupancy_of};
use tracing::{debug, trace};

/// Guillotine bin packer.
///
/// Free space is a set of disjoint rectangles that, together with the used
/// rectangles, tile the bin exactly. Each placement removes one free rectangle
/// and cuts its remainder in two with a single straight cut.
pub struct GuillotinePacker {
    bin_w: u32,
    bin_h: u32,
    free: FreeList,
    used: Vec<Rect>,
    choice: GuillotineChoice,
    split: GuillotineSplit,
    allow_merge: bool,
    allow_rotation: bool,
}

impl GuillotinePacker {
    /// Empty bin using BestAreaFit / SplitShorterLeftoverAxis, merging on, rotation off.
    pub fn new(bin_width: u32, bin_height: u32) -> Self {
        Self {
            bin_w: bin_width,
            bin_h: bin_height,
            free: FreeList::new(Rect::new(0, 0, bin_width, bin_height)),
            used: Vec::new(),
            choice: GuillotineChoice::BestAreaFit,
            split: GuillotineSplit::SplitShorterLeftoverAxis,
            allow_merge: true,
            allow_rotation: false,
        }
    }

    /// Heuristics used by the `Packer` impl.
    pub fn with_heuristics(mut self, choice: GuillotineChoice, split: GuillotineSplit) -> Self {
        self.choice = choice;
        self.split = split;
        self
    }

    pub fn with_merge(mut self, allow_merge: bool) -> Self {
        self.allow_merge = allow_merge;
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

    /// True if a `w x h` item fits `free`, rotated when rotation is enabled.
    pub fn fits(&self, w: u32, h: u32, free: &Rect) -> bool {
        free.fits(w, h) || (self.allow_rotation && free.fits(h, w))
    }

    /// True if a `w x h` item fills `free` exactly, rotated when rotation is enabled.
    pub fn fits_perfectly(&self, w: u32, h: u32, free: &Rect) -> bool {
        free.fits_perfectly(w, h) || (self.allow_rotation && free.fits_perfectly(h, w))
    }

    /// Places items in the order given. Rejected items are left out of the result.
    pub fn insert_sizes<K, I>(
        &mut self,
        items: I,
        allow_merge: bool,
        choice: GuillotineChoice,
        split: GuillotineSplit,
    ) -> Vec<Frame<K>>
    where
        I: IntoIterator<Item = (K, u32, u32)>,
    {
        let mut frames = Vec::new();
        for (key, w, h) in items {
            if let Some((frame, rotated)) = self.insert(w, h, allow_merge, choice, split) {
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
    pub fn insert(
        &mut self,
        w: u32,
        h: u32,
        allow_merge: bool,
        choice: GuillotineChoice,
        split: GuillotineSplit,
    ) -> Option<(Rect, bool)> {
        if w == 0 || h == 0 {
            trace!(w, h, "rejecting empty item");
            return None;
        }
        let Some((idx, placed, rotated)) = self.choose(w, h, choice) else {
            debug!(w, h, free = self.free.len(), "no free rect fits");
            return None;
        };
        let fr = self.free.take(idx);
        self.split_free_rect(&fr, &placed, split);
        self.used.push(placed);
        if allow_merge {
            self.free.merge();
        }
        self.free.prune();
        Some((placed, rotated))
    }

    /// Runs the containment prune again; returns how many rects it removed.
    pub fn prune_free_list(&mut self) -> usize {
        self.free.prune()
    }

    /// Runs the edge merge again; returns how many merges it made.
    pub fn merge_free_list(&mut self) -> usize {
        self.free.merge()
    }

    fn choose(&self, w: u32, h: u32, choice: GuillotineChoice) -> Option<(usize, Rect, bool)> {
        let score = choice.score_fn();
        let mut best: Option<(usize, Rect, bool)> = None;
        let mut best_score = i64::MAX;
        for (i, fr) in self.free.as_slice().iter().enumerate() {
            if fr.fits_perfectly(w, h) {
                return Some((i, Rect::new(fr.x, fr.y, w, h), false));
            }
            if self.allow_rotation && fr.fits_perfectly(h, w) {
                return Some((i, Rect::new(fr.x, fr.y, h, w), true));
            }
            if fr.fits(w, h) {
                let s = score(fr, w, h);
                if s < best_score {
                    best_score = s;
                    best = Some((i, Rect::new(fr.x, fr.y, w, h), false));
                }
            }
            if self.allow_rotation && w != h && fr.fits(h, w) {
                let s = score(fr, h, w);
                if s < best_score {
                    best_score = s;
                    best = Some((i, Rect::new(fr.x, fr.y, h, w), true));
                }
            }
        }
        best
    }

    /// Cuts the leftover of `fr` around `placed` (at its top-left) into a bottom and a right part.
    fn split_free_rect(&mut self, fr: &Rect, placed: &Rect, split: GuillotineSplit) {
        let split_horizontal = (split.split_fn())(fr, placed.w, placed.h);

        let mut bottom = Rect::new(fr.x, placed.y2(), 0, fr.h - placed.h);
        let mut right = Rect::new(placed.x2(), fr.y, fr.w - placed.w, 0);
        if split_horizontal {
            bottom.w = fr.w;
            right.h = placed.h;
        } else {
            bottom.w = placed.w;
            right.h = fr.h;
        }
        self.free.push(bottom);
        self.free.push(right);
    }
}

impl<K> Packer<K> for GuillotinePacker {
    fn can_pack(&self, w: u32, h: u32) -> bool {
        w > 0 && h > 0 && self.choose(w, h, self.choice).is_some()
    }

    fn pack(&mut self, key: K, w: u32, h: u32) -> Option<Frame<K>> {
        let (frame, rotated) = self.insert(w, h, self.allow_merge, self.choice, self.split)?;
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
        GuillotinePacker::occupancy(self)
    }
}
