use crate::model::Rect;

/// Unordered set of free rectangles owned by one engine.
///
/// Removal is `swap_remove`, so positions are not stable across edits.
/// Zero-area rectangles are never stored.
#[derive(Debug, Clone, Default)]
pub struct FreeList {
    rects: Vec<Rect>,
}

impl FreeList {
    pub fn new(bin: Rect) -> Self {
        let mut list = Self::default();
        list.push(bin);
        list
    }

    pub fn as_slice(&self) -> &[Rect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn push(&mut self, r: Rect) {
        if !r.is_empty() {
            self.rects.push(r);
        }
    }

    pub(crate) fn take(&mut self, idx: usize) -> Rect {
        self.rects.swap_remove(idx)
    }

    /// Replaces every rectangle for which `split` returns `Some` by the parts it pushes.
    pub(crate) fn replace_with<F>(&mut self, mut split: F)
    where
        F: FnMut(&Rect, &mut Vec<Rect>) -> bool,
    {
        let mut parts = Vec::new();
        let mut i = 0;
        while i < self.rects.len() {
            if split(&self.rects[i], &mut parts) {
                self.rects.swap_remove(i);
            } else {
                i += 1;
            }
        }
        for p in parts {
            self.push(p);
        }
    }

    /// Removes every rectangle contained in another one; identical copies collapse to one.
    /// Returns the number of removed rectangles.
    pub fn prune(&mut self) -> usize {
        let before = self.rects.len();
        let mut i = 0;
        while i < self.rects.len() {
            let a = self.rects[i];
            let mut remove_i = false;
            let mut j = i + 1;
            while j < self.rects.len() {
                let b = self.rects[j];
                if a.is_contained_in(&b) {
                    remove_i = true;
                    break;
                }
                if b.is_contained_in(&a) {
                    self.rects.swap_remove(j);
                    continue;
                }
                j += 1;
            }
            if remove_i {
                self.rects.swap_remove(i);
            } else {
                i += 1;
            }
        }
        before - self.rects.len()
    }

    /// Merges pairs sharing a full edge until no pair does. Returns the number of merges.
    pub fn merge(&mut self) -> usize {
        let mut merges = 0;
        while let Some((i, j, merged)) = self.find_mergeable() {
            self.rects[i] = merged;
            self.rects.swap_remove(j);
            merges += 1;
        }
        merges
    }

    fn find_mergeable(&self) -> Option<(usize, usize, Rect)> {
        for i in 0..self.rects.len() {
            for j in i + 1..self.rects.len() {
                let a = self.rects[i];
                let b = self.rects[j];
                // horizontal merge (same y, height, contiguous in x)
                if a.y == b.y && a.h == b.h {
                    if a.x2() == b.x {
                        return Some((i, j, Rect::new(a.x, a.y, a.w + b.w, a.h)));
                    } else if b.x2() == a.x {
                        return Some((i, j, Rect::new(b.x, a.y, a.w + b.w, a.h)));
                    }
                }
                // vertical merge (same x, width, contiguous in y)
                if a.x == b.x && a.w == b.w {
                    if a.y2() == b.y {
                        return Some((i, j, Rect::new(a.x, a.y, a.w, a.h + b.h)));
                    } else if b.y2() == a.y {
                        return Some((i, j, Rect::new(a.x, b.y, a.w, a.h + b.h)));
                    }
                }
            }
        }
        None
    }
}
