//! Heuristic dispatch tables.
//!
//! Every heuristic variant maps to a plain function over `(free rect, item size)`.
//! Scores are minimized; "worst fit" and contact-point variants negate their measure.

use crate::config::{GuillotineChoice, GuillotineSplit, MaxRectsHeuristic};
use crate::model::Rect;

/// Guillotine free-rect score for placing a `w x h` item in `fr`. Lower is better.
pub(crate) type ChoiceFn = fn(fr: &Rect, w: u32, h: u32) -> i64;

/// Returns true when the leftover of `fr` after placing `w x h` at its corner
/// should be cut horizontally (bottom strip spans the full free width).
pub(crate) type SplitFn = fn(fr: &Rect, w: u32, h: u32) -> bool;

/// MaxRects score pair for placing a `w x h` item at the corner of `fr`. Lexicographically minimized.
pub(crate) type MaxRectsFn = fn(fr: &Rect, w: u32, h: u32, ctx: &ContactCtx<'_>) -> (i64, i64);

/// What the contact-point rule needs to see besides the candidate itself.
pub(crate) struct ContactCtx<'a> {
    pub bin_w: u32,
    pub bin_h: u32,
    pub used: &'a [Rect],
}

fn leftovers(fr: &Rect, w: u32, h: u32) -> (i64, i64) {
    (fr.w as i64 - w as i64, fr.h as i64 - h as i64)
}

fn area_fit(fr: &Rect, w: u32, h: u32) -> i64 {
    let item = w as u64 * h as u64;
    i64::try_from(fr.area().saturating_sub(item)).unwrap_or(i64::MAX)
}

fn short_side_fit(fr: &Rect, w: u32, h: u32) -> i64 {
    let (dw, dh) = leftovers(fr, w, h);
    dw.abs().min(dh.abs())
}

fn long_side_fit(fr: &Rect, w: u32, h: u32) -> i64 {
    let (dw, dh) = leftovers(fr, w, h);
    dw.abs().max(dh.abs())
}

fn worst_area_fit(fr: &Rect, w: u32, h: u32) -> i64 {
    -area_fit(fr, w, h)
}

fn worst_short_side_fit(fr: &Rect, w: u32, h: u32) -> i64 {
    -short_side_fit(fr, w, h)
}

fn worst_long_side_fit(fr: &Rect, w: u32, h: u32) -> i64 {
    -long_side_fit(fr, w, h)
}

impl GuillotineChoice {
    pub(crate) fn score_fn(self) -> ChoiceFn {
        match self {
            GuillotineChoice::BestAreaFit => area_fit,
            GuillotineChoice::BestShortSideFit => short_side_fit,
            GuillotineChoice::BestLongSideFit => long_side_fit,
            GuillotineChoice::WorstAreaFit => worst_area_fit,
            GuillotineChoice::WorstShortSideFit => worst_short_side_fit,
            GuillotineChoice::WorstLongSideFit => worst_long_side_fit,
        }
    }
}

fn split_shorter_leftover(fr: &Rect, w: u32, h: u32) -> bool {
    let (dw, dh) = leftovers(fr, w, h);
    dw <= dh
}

fn split_longer_leftover(fr: &Rect, w: u32, h: u32) -> bool {
    let (dw, dh) = leftovers(fr, w, h);
    dw > dh
}

fn split_minimize_area(fr: &Rect, w: u32, h: u32) -> bool {
    let (dw, dh) = leftovers(fr, w, h);
    (w as i128) * (dh as i128) > (dw as i128) * (h as i128)
}

fn split_maximize_area(fr: &Rect, w: u32, h: u32) -> bool {
    !split_minimize_area(fr, w, h)
}

fn split_shorter_axis(fr: &Rect, _w: u32, _h: u32) -> bool {
    fr.w <= fr.h
}

fn split_longer_axis(fr: &Rect, _w: u32, _h: u32) -> bool {
    fr.w > fr.h
}

impl GuillotineSplit {
    pub(crate) fn split_fn(self) -> SplitFn {
        match self {
            GuillotineSplit::SplitShorterLeftoverAxis => split_shorter_leftover,
            GuillotineSplit::SplitLongerLeftoverAxis => split_longer_leftover,
            GuillotineSplit::SplitMinimizeArea => split_minimize_area,
            GuillotineSplit::SplitMaximizeArea => split_maximize_area,
            GuillotineSplit::SplitShorterAxis => split_shorter_axis,
            GuillotineSplit::SplitLongerAxis => split_longer_axis,
        }
    }
}

fn mr_short_side(fr: &Rect, w: u32, h: u32, _ctx: &ContactCtx<'_>) -> (i64, i64) {
    (short_side_fit(fr, w, h), long_side_fit(fr, w, h))
}

fn mr_long_side(fr: &Rect, w: u32, h: u32, _ctx: &ContactCtx<'_>) -> (i64, i64) {
    (long_side_fit(fr, w, h), short_side_fit(fr, w, h))
}

fn mr_area(fr: &Rect, w: u32, h: u32, _ctx: &ContactCtx<'_>) -> (i64, i64) {
    (area_fit(fr, w, h), short_side_fit(fr, w, h))
}

fn mr_bottom_left(fr: &Rect, _w: u32, h: u32, _ctx: &ContactCtx<'_>) -> (i64, i64) {
    (fr.y as i64 + h as i64, fr.x as i64)
}

fn mr_contact_point(fr: &Rect, w: u32, h: u32, ctx: &ContactCtx<'_>) -> (i64, i64) {
    let contact = contact_point_score(&Rect::new(fr.x, fr.y, w, h), ctx);
    (-i64::try_from(contact).unwrap_or(i64::MAX), area_fit(fr, w, h))
}

impl MaxRectsHeuristic {
    pub(crate) fn score_fn(self) -> MaxRectsFn {
        match self {
            MaxRectsHeuristic::BestShortSideFit => mr_short_side,
            MaxRectsHeuristic::BestLongSideFit => mr_long_side,
            MaxRectsHeuristic::BestAreaFit => mr_area,
            MaxRectsHeuristic::BottomLeft => mr_bottom_left,
            MaxRectsHeuristic::ContactPoint => mr_contact_point,
        }
    }

    /// Whether an exact-size free rect may end the search early.
    /// Positional rules keep looking: a perfect fit elsewhere may sit lower or touch more.
    pub(crate) fn takes_perfect_fit(self) -> bool {
        !matches!(
            self,
            MaxRectsHeuristic::BottomLeft | MaxRectsHeuristic::ContactPoint
        )
    }
}

/// Total edge length `node` shares with the bin walls and with already placed rects.
pub(crate) fn contact_point_score(node: &Rect, ctx: &ContactCtx<'_>) -> u64 {
    let mut score = 0u64;
    if node.x == 0 {
        score += node.h as u64;
    }
    if node.x2() == ctx.bin_w {
        score += node.h as u64;
    }
    if node.y == 0 {
        score += node.w as u64;
    }
    if node.y2() == ctx.bin_h {
        score += node.w as u64;
    }

    for u in ctx.used {
        if node.x == u.x2() || u.x == node.x2() {
            score += overlap_1d(node.y, node.y2(), u.y, u.y2()) as u64;
        }
        if node.y == u.y2() || u.y == node.y2() {
            score += overlap_1d(node.x, node.x2(), u.x, u.x2()) as u64;
        }
    }
    score
}

fn overlap_1d(a1: u32, a2: u32, b1: u32, b2: u32) -> u32 {
    let start = a1.max(b1);
    let end = a2.min(b2);
    end.saturating_sub(start)
}
