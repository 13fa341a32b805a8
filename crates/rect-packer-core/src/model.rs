use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`), saturating at `u32::MAX`.
    pub fn x2(&self) -> u32 {
        self.x.saturating_add(self.w)
    }
    /// Exclusive bottom edge (`y + h`), saturating at `u32::MAX`.
    pub fn y2(&self) -> u32 {
        self.y.saturating_add(self.h)
    }
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
    /// True if a `w x h` item fits inside this rectangle without rotation.
    pub fn fits(&self, w: u32, h: u32) -> bool {
        w <= self.w && h <= self.h
    }
    /// True if a `w x h` item matches this rectangle exactly.
    pub fn fits_perfectly(&self, w: u32, h: u32) -> bool {
        w == self.w && h == self.h
    }
    /// Returns true if `r` lies fully inside `self`.
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.x2() <= self.x2() && r.y2() <= self.y2()
    }
    /// Returns true if `self` lies fully inside `outer`.
    pub fn is_contained_in(&self, outer: &Rect) -> bool {
        outer.contains(self)
    }
    /// Interiors intersect. Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.x2() <= other.x
            || other.x2() <= self.x
            || self.y2() <= other.y
            || other.y2() <= self.y)
    }
}

/// A placed item inside a bin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Frame<K = usize> {
    /// Caller-supplied key (an input index for the orchestrator).
    pub key: K,
    /// Placed rectangle within the bin (post-rotation width/height).
    pub frame: Rect,
    /// True if the item was rotated 90° when placed.
    pub rotated: bool,
}

/// Statistics about a finished layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PackStats {
    /// Number of placed items.
    pub num_items: usize,
    /// Area of the bin the items were packed into.
    pub bin_area: u64,
    /// Area of the tight (or rounded) bounding box of all placements.
    pub bounds_area: u64,
    /// Sum of placed item areas.
    pub used_area: u64,
    /// used_area / bounds_area (0.0 to 1.0). Higher is better.
    pub occupancy: f64,
    /// Number of rotated items.
    pub num_rotated: usize,
}

impl PackStats {
    pub fn from_frames<K>(frames: &[Frame<K>], bin: (u32, u32), bounds: (u32, u32)) -> Self {
        let used_area: u64 = frames.iter().map(|f| f.frame.area()).sum();
        let bounds_area = bounds.0 as u64 * bounds.1 as u64;
        let occupancy = if bounds_area > 0 {
            used_area as f64 / bounds_area as f64
        } else {
            0.0
        };
        Self {
            num_items: frames.len(),
            bin_area: bin.0 as u64 * bin.1 as u64,
            bounds_area,
            used_area,
            occupancy,
            num_rotated: frames.iter().filter(|f| f.rotated).count(),
        }
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Items: {}, Occupancy: {:.2}%, Bounds Area: {} px², Used Area: {} px², Rotated: {}",
            self.num_items,
            self.occupancy * 100.0,
            self.bounds_area,
            self.used_area,
            self.num_rotated,
        )
    }

    /// Returns wasted space inside the bounding box in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.bounds_area.saturating_sub(self.used_area)
    }
}

/// Fraction of a `bin_w x bin_h` bin covered by `used`. Zero for an empty or degenerate bin.
pub(crate) fn occupancy_of(used: &[Rect], bin_w: u32, bin_h: u32) -> f64 {
    let bin_area = bin_w as u64 * bin_h as u64;
    if bin_area == 0 {
        return 0.0;
    }
    let used_area: u64 = used.iter().map(Rect::area).sum();
    used_area as f64 / bin_area as f64
}
