use crate::config::{
    AlgorithmFamily, AutoMode, GuillotineChoice, GuillotineSplit, MaxRectsHeuristic,
    PackerConfig, SortOrder,
};
use crate::error::{RectPackError, Result};
use crate::model::{Frame, PackStats, Rect};
use crate::packer::{Packer, guillotine::GuillotinePacker, maxrects::MaxRectsPacker};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Anything with a size the orchestrator can place.
pub trait PackItem {
    /// `(width, height)` of the item.
    fn size(&self) -> (u32, u32);
}

/// An item that can record where it was placed.
pub trait PackItemMut: PackItem {
    /// `frame` carries the position and the size the item was placed at (post rotation).
    fn set_placement(&mut self, frame: Rect, rotated: bool);
}

/// Ready-made item: a size plus the position it receives once placed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<u32>,
    #[serde(default)]
    pub rotated: bool,
}

impl Item {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

impl PackItem for Item {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl PackItemMut for Item {
    fn set_placement(&mut self, frame: Rect, rotated: bool) {
        self.x = Some(frame.x);
        self.y = Some(frame.y);
        self.width = frame.w;
        self.height = frame.h;
        self.rotated = rotated;
    }
}

impl PackItem for (u32, u32) {
    fn size(&self) -> (u32, u32) {
        *self
    }
}

impl PackItem for Rect {
    fn size(&self) -> (u32, u32) {
        (self.w, self.h)
    }
}

impl PackItemMut for Rect {
    fn set_placement(&mut self, frame: Rect, _rotated: bool) {
        *self = frame;
    }
}

/// A caller item together with where it was placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placed<T> {
    pub item: T,
    pub x: u32,
    pub y: u32,
    /// Placed width (swapped with height when rotated).
    pub w: u32,
    pub h: u32,
    pub rotated: bool,
}

impl<T> Placed<T> {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }
}

/// Summary of a finished packing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    /// Bin the final attempt packed into.
    pub bin_width: u32,
    pub bin_height: u32,
    /// Bounding box of all placements (rounded per `power_of_two`/`square`).
    pub width: u32,
    pub height: u32,
    /// Grow-and-retry attempts of the winning candidate.
    pub attempts: usize,
    /// Engine family that produced the layout (never `Auto`).
    pub family: AlgorithmFamily,
    pub stats: PackStats,
}

/// Result of the non-mutating packer: placements in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layout<T> {
    pub placements: Vec<Placed<T>>,
    pub info: LayoutInfo,
}

/// Packs `items` and returns new placement records; `items` is left untouched.
///
/// Notes:
/// - Placements come back in input order, whatever order they were packed in.
/// - Any zero width or height fails with `Validation` before packing starts.
/// - When `family` is `Auto`, a small portfolio is tried and the smallest bounding box wins.
#[instrument(skip_all, fields(items = items.len()))]
pub fn pack_layout<T: PackItem + Clone>(items: &[T], cfg: &PackerConfig) -> Result<Layout<T>> {
    cfg.validate()?;
    let sizes = collect_sizes(items)?;
    let solution = solve(&sizes, cfg)?;
    let placements = solution
        .frames
        .iter()
        .zip(items)
        .map(|(f, item)| Placed {
            item: item.clone(),
            x: f.frame.x,
            y: f.frame.y,
            w: f.frame.w,
            h: f.frame.h,
            rotated: f.rotated,
        })
        .collect();
    Ok(Layout {
        placements,
        info: solution.info,
    })
}

/// Writes placements onto `items` in place. Nothing is written unless every item fits.
#[instrument(skip_all, fields(items = items.len()))]
pub fn pack_in_place<T: PackItemMut>(items: &mut [T], cfg: &PackerConfig) -> Result<LayoutInfo> {
    cfg.validate()?;
    let sizes = collect_sizes(items)?;
    let solution = solve(&sizes, cfg)?;
    for (f, item) in solution.frames.iter().zip(items.iter_mut()) {
        item.set_placement(f.frame, f.rotated);
    }
    Ok(solution.info)
}

/// `pack_layout` with the default configuration, returning only the placements.
pub fn rectangle_packer<T: PackItem + Clone>(items: &[T]) -> Result<Vec<Placed<T>>> {
    pack_layout(items, &PackerConfig::default()).map(|l| l.placements)
}

/// `pack_in_place` with the default configuration; hands back the same slice.
pub fn rectangle_packer_mut<T: PackItemMut>(items: &mut [T]) -> Result<&mut [T]> {
    pack_in_place(items, &PackerConfig::default())?;
    Ok(items)
}

// ---------- internals ----------

struct Solution {
    /// One frame per input, sorted by input index.
    frames: Vec<Frame<usize>>,
    info: LayoutInfo,
}

fn collect_sizes<T: PackItem>(items: &[T]) -> Result<Vec<(u32, u32)>> {
    items
        .iter()
        .enumerate()
        .map(|(index, it)| {
            let (width, height) = it.size();
            if width == 0 || height == 0 {
                Err(RectPackError::Validation {
                    index,
                    width,
                    height,
                })
            } else {
                Ok((width, height))
            }
        })
        .collect()
}

fn solve(sizes: &[(u32, u32)], cfg: &PackerConfig) -> Result<Solution> {
    if sizes.is_empty() {
        let family = match cfg.family {
            AlgorithmFamily::Auto => AlgorithmFamily::Guillotine,
            f => f,
        };
        return Ok(Solution {
            frames: Vec::new(),
            info: LayoutInfo {
                bin_width: 0,
                bin_height: 0,
                width: 0,
                height: 0,
                attempts: 0,
                family,
                stats: PackStats::from_frames::<usize>(&[], (0, 0), (0, 0)),
            },
        });
    }
    if matches!(cfg.family, AlgorithmFamily::Auto) {
        return solve_auto(sizes, cfg);
    }
    solve_single(sizes, cfg)
}

/// Grow-and-retry loop for one concrete engine family.
fn solve_single(sizes: &[(u32, u32)], cfg: &PackerConfig) -> Result<Solution> {
    let order = sorted_order(sizes, cfg.sort_order);
    let mut bin = initial_bin(sizes, cfg)?;
    debug!(
        family = ?cfg.family,
        width = bin.0,
        height = bin.1,
        "initial bin"
    );

    for attempt in 1..=cfg.max_attempts {
        if let Some(mut frames) = try_pack(sizes, &order, bin, cfg) {
            debug!(attempt, width = bin.0, height = bin.1, "all items placed");
            frames.sort_by_key(|f| f.key);
            let (width, height) = compute_bounds(&frames, cfg);
            let stats = PackStats::from_frames(&frames, bin, (width, height));
            return Ok(Solution {
                frames,
                info: LayoutInfo {
                    bin_width: bin.0,
                    bin_height: bin.1,
                    width,
                    height,
                    attempts: attempt,
                    family: cfg.family,
                    stats,
                },
            });
        }
        if attempt == cfg.max_attempts {
            break;
        }
        match grow(bin, cfg) {
            Some(next) => {
                debug!(
                    attempt,
                    from = ?bin,
                    to = ?next,
                    "bin too small, growing"
                );
                bin = next;
            }
            None => {
                return Err(RectPackError::PackingFailed {
                    attempts: attempt,
                    width: bin.0,
                    height: bin.1,
                });
            }
        }
    }
    Err(RectPackError::PackingFailed {
        attempts: cfg.max_attempts,
        width: bin.0,
        height: bin.1,
    })
}

/// One attempt on a fresh engine. `None` as soon as any item is rejected.
fn try_pack(
    sizes: &[(u32, u32)],
    order: &[usize],
    bin: (u32, u32),
    cfg: &PackerConfig,
) -> Option<Vec<Frame<usize>>> {
    let mut packer: Box<dyn Packer<usize>> = match cfg.family {
        AlgorithmFamily::Guillotine => Box::new(
            GuillotinePacker::new(bin.0, bin.1)
                .with_heuristics(cfg.g_choice, cfg.g_split)
                .with_merge(cfg.allow_merge)
                .with_rotation(cfg.allow_rotation),
        ),
        AlgorithmFamily::MaxRects => Box::new(
            MaxRectsPacker::new(bin.0, bin.1)
                .with_heuristic(cfg.mr_heuristic)
                .with_rotation(cfg.allow_rotation),
        ),
        AlgorithmFamily::Auto => unreachable!("auto is expanded into concrete candidates"),
    };
    let mut frames = Vec::with_capacity(order.len());
    for &idx in order {
        let (w, h) = sizes[idx];
        frames.push(packer.pack(idx, w, h)?);
    }
    Some(frames)
}

/// Stable packing order; ties fall back to input index.
fn sorted_order(sizes: &[(u32, u32)], sort: SortOrder) -> Vec<usize> {
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    let area = |i: usize| sizes[i].0 as u64 * sizes[i].1 as u64;
    match sort {
        SortOrder::None => {}
        SortOrder::HeightDesc => order.sort_by(|&a, &b| {
            sizes[b]
                .1
                .cmp(&sizes[a].1)
                .then_with(|| area(b).cmp(&area(a)))
        }),
        SortOrder::AreaDesc => order.sort_by(|&a, &b| area(b).cmp(&area(a))),
        SortOrder::MaxSideDesc => order.sort_by(|&a, &b| {
            let ma = sizes[a].0.max(sizes[a].1);
            let mb = sizes[b].0.max(sizes[b].1);
            mb.cmp(&ma).then_with(|| area(b).cmp(&area(a)))
        }),
        SortOrder::WidthDesc => order.sort_by(|&a, &b| {
            sizes[b]
                .0
                .cmp(&sizes[a].0)
                .then_with(|| area(b).cmp(&area(a)))
        }),
    }
    order
}

/// Square of the total item area, widened to the largest item and clamped to the caps.
fn initial_bin(sizes: &[(u32, u32)], cfg: &PackerConfig) -> Result<(u32, u32)> {
    let total_area: u128 = sizes.iter().map(|&(w, h)| w as u128 * h as u128).sum();
    let side = (total_area as f64).sqrt().ceil().min(u32::MAX as f64) as u32;
    let max_w = sizes.iter().map(|s| s.0).max().unwrap_or(0);
    let max_h = sizes.iter().map(|s| s.1).max().unwrap_or(0);

    let (need_w, need_h) = if cfg.allow_rotation {
        let max_side = max_w.max(max_h);
        (max_side, max_side)
    } else {
        (max_w, max_h)
    };
    let w = side.max(need_w).min(cfg.max_width);
    let h = side.max(need_h).min(cfg.max_height);

    // an item that exceeds the caps in every allowed orientation can never be placed
    let fits_caps = |&(iw, ih): &(u32, u32)| {
        (iw <= cfg.max_width && ih <= cfg.max_height)
            || (cfg.allow_rotation && ih <= cfg.max_width && iw <= cfg.max_height)
    };
    if !sizes.iter().all(fits_caps) {
        return Err(RectPackError::PackingFailed {
            attempts: 0,
            width: cfg.max_width,
            height: cfg.max_height,
        });
    }
    Ok((w, h))
}

/// Grows the shorter side (width on a tie) by `growth_factor`, at least by one.
/// `None` once both sides sit at their caps.
fn grow(bin: (u32, u32), cfg: &PackerConfig) -> Option<(u32, u32)> {
    let (w, h) = bin;
    let can_w = w < cfg.max_width;
    let can_h = h < cfg.max_height;
    let grow_width = match (can_w, can_h) {
        (false, false) => return None,
        (true, false) => true,
        (false, true) => false,
        (true, true) => w <= h,
    };
    let scale = |v: u32, cap: u32| -> u32 {
        let next = (v as f64 * cfg.growth_factor).ceil();
        let next = if next >= cap as f64 { cap } else { next as u32 };
        next.max(v.saturating_add(1)).min(cap)
    };
    if grow_width {
        Some((scale(w, cfg.max_width), h))
    } else {
        Some((w, scale(h, cfg.max_height)))
    }
}

/// Tight bounding box of the frames, then rounded per config.
fn compute_bounds(frames: &[Frame<usize>], cfg: &PackerConfig) -> (u32, u32) {
    let mut w = 0u32;
    let mut h = 0u32;
    for f in frames {
        w = w.max(f.frame.x2());
        h = h.max(f.frame.y2());
    }
    if cfg.power_of_two {
        w = w.max(1).checked_next_power_of_two().unwrap_or(w);
        h = h.max(1).checked_next_power_of_two().unwrap_or(h);
    }
    if cfg.square {
        let m = w.max(h);
        w = m;
        h = m;
    }
    (w, h)
}

// ---------- auto portfolio ----------

fn portfolio(base: &PackerConfig) -> Vec<PackerConfig> {
    let guillotine = |choice: GuillotineChoice, split: GuillotineSplit| {
        let mut c = base.clone();
        c.family = AlgorithmFamily::Guillotine;
        c.g_choice = choice;
        c.g_split = split;
        c
    };
    let maxrects = |heuristic: MaxRectsHeuristic| {
        let mut c = base.clone();
        c.family = AlgorithmFamily::MaxRects;
        c.mr_heuristic = heuristic;
        c
    };
    match base.auto_mode {
        AutoMode::Fast => vec![
            guillotine(
                GuillotineChoice::BestAreaFit,
                GuillotineSplit::SplitShorterLeftoverAxis,
            ),
            maxrects(MaxRectsHeuristic::BestShortSideFit),
        ],
        AutoMode::Quality => vec![
            guillotine(
                GuillotineChoice::BestAreaFit,
                GuillotineSplit::SplitShorterLeftoverAxis,
            ),
            guillotine(
                GuillotineChoice::BestShortSideFit,
                GuillotineSplit::SplitMinimizeArea,
            ),
            maxrects(MaxRectsHeuristic::BestShortSideFit),
            maxrects(MaxRectsHeuristic::BestAreaFit),
            maxrects(MaxRectsHeuristic::BottomLeft),
            maxrects(MaxRectsHeuristic::ContactPoint),
        ],
    }
}

fn bounds_area(s: &Solution) -> u64 {
    s.info.width as u64 * s.info.height as u64
}

/// True if `cand` beats `best`: smaller bounding area, then fewer attempts.
fn is_better(cand: &Solution, best: &Solution) -> bool {
    (bounds_area(cand), cand.info.attempts) < (bounds_area(best), best.info.attempts)
}

fn solve_auto(sizes: &[(u32, u32)], base: &PackerConfig) -> Result<Solution> {
    let candidates = portfolio(base);
    let budget_ms = base.time_budget_ms.unwrap_or(0);
    let start = Instant::now();

    // Parallel path (optional)
    #[cfg(feature = "parallel")]
    {
        if base.parallel {
            let results: Vec<Result<Solution>> = candidates
                .par_iter()
                .map(|cand| solve_single(sizes, cand))
                .collect();
            return pick_best(results);
        }
    }

    // Sequential path with optional time budget
    let mut results = Vec::with_capacity(candidates.len());
    for cand in &candidates {
        let any_ok = results.iter().any(|r: &Result<Solution>| r.is_ok());
        if budget_ms > 0 && any_ok && start.elapsed().as_millis() as u64 > budget_ms {
            debug!(evaluated = results.len(), "auto time budget exhausted");
            break;
        }
        results.push(solve_single(sizes, cand));
    }
    pick_best(results)
}

/// Best successful candidate in portfolio order; the last error if none succeeded.
fn pick_best(results: Vec<Result<Solution>>) -> Result<Solution> {
    let mut best: Option<Solution> = None;
    let mut last_err = None;
    for r in results {
        match r {
            Ok(s) => {
                debug!(
                    family = ?s.info.family,
                    width = s.info.width,
                    height = s.info.height,
                    "auto candidate"
                );
                if best.as_ref().is_none_or(|b| is_better(&s, b)) {
                    best = Some(s);
                }
            }
            Err(e) => last_err = Some(e),
        }
    }
    match (best, last_err) {
        (Some(s), _) => Ok(s),
        (None, Some(e)) => Err(e),
        (None, None) => Err(RectPackError::InvalidConfig(
            "auto portfolio produced no candidates".into(),
        )),
    }
}
