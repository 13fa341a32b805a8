//! Engine families and orchestrator configuration.
//! Key notes:
//!   - `family` selects Guillotine/MaxRects/Auto
//!   - `growth_factor` and `max_attempts` bound the grow-and-retry loop
//!   - `time_budget_ms` and `parallel` affect Auto portfolio evaluation

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Top-level engine families.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmFamily {
    /// Guillotine splitting (low fragmentation, disjoint free list).
    Guillotine,
    /// MaxRects free-list (high quality; many heuristics).
    MaxRects,
    /// Try a small portfolio of candidates and keep the smallest bounding box.
    Auto,
}

impl FromStr for AlgorithmFamily {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "guillotine" => Ok(Self::Guillotine),
            "maxrects" => Ok(Self::MaxRects),
            "auto" => Ok(Self::Auto),
            _ => Err(()),
        }
    }
}

/// MaxRects placement heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaxRectsHeuristic {
    BestShortSideFit,
    BestLongSideFit,
    BestAreaFit,
    BottomLeft,
    ContactPoint,
}

impl FromStr for MaxRectsHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bl" | "bottomleft" => Ok(Self::BottomLeft),
            "cp" | "contactpoint" => Ok(Self::ContactPoint),
            _ => Err(()),
        }
    }
}

/// Guillotine free-rect choice heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineChoice {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    WorstAreaFit,
    WorstShortSideFit,
    WorstLongSideFit,
}

impl FromStr for GuillotineChoice {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "waf" | "worstareafit" => Ok(Self::WorstAreaFit),
            "wssf" | "worstshortsidefit" => Ok(Self::WorstShortSideFit),
            "wlsf" | "worstlongsidefit" => Ok(Self::WorstLongSideFit),
            _ => Err(()),
        }
    }
}

/// Guillotine split axis heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineSplit {
    SplitShorterLeftoverAxis,
    SplitLongerLeftoverAxis,
    SplitMinimizeArea,
    SplitMaximizeArea,
    SplitShorterAxis,
    SplitLongerAxis,
}

impl FromStr for GuillotineSplit {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slas" | "splitshorterleftoveraxis" => Ok(Self::SplitShorterLeftoverAxis),
            "llas" | "splitlongerleftoveraxis" => Ok(Self::SplitLongerLeftoverAxis),
            "minas" | "splitminimizearea" => Ok(Self::SplitMinimizeArea),
            "maxas" | "splitmaximizearea" => Ok(Self::SplitMaximizeArea),
            "sas" | "splitshorteraxis" => Ok(Self::SplitShorterAxis),
            "las" | "splitlongeraxis" => Ok(Self::SplitLongerAxis),
            _ => Err(()),
        }
    }
}

/// Auto presets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AutoMode {
    Fast,
    Quality,
}

impl FromStr for AutoMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "quality" => Ok(Self::Quality),
            _ => Err(()),
        }
    }
}

/// Order in which the orchestrator feeds items to an engine.
/// Ties always fall back to input order, so packing is deterministic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    HeightDesc,
    AreaDesc,
    MaxSideDesc,
    WidthDesc,
    None,
}

impl FromStr for SortOrder {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "height_desc" => Ok(Self::HeightDesc),
            "area_desc" => Ok(Self::AreaDesc),
            "max_side_desc" => Ok(Self::MaxSideDesc),
            "width_desc" => Ok(Self::WidthDesc),
            "none" => Ok(Self::None),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Largest bin width the orchestrator may grow to.
    #[serde(default = "default_max_dim")]
    pub max_width: u32,
    /// Largest bin height the orchestrator may grow to.
    #[serde(default = "default_max_dim")]
    pub max_height: u32,
    /// Allow 90° rotations for placements where beneficial.
    #[serde(default)]
    pub allow_rotation: bool,
    /// Round the reported bounding box up to powers of two.
    #[serde(default)]
    pub power_of_two: bool,
    /// Force the reported bounding box to be square (max(width,height)).
    #[serde(default)]
    pub square: bool,

    // engine selection
    #[serde(default = "default_family")]
    pub family: AlgorithmFamily,
    #[serde(default = "default_mr_heuristic")]
    pub mr_heuristic: MaxRectsHeuristic,
    #[serde(default = "default_g_choice")]
    pub g_choice: GuillotineChoice,
    #[serde(default = "default_g_split")]
    pub g_split: GuillotineSplit,
    /// Merge guillotine free rectangles that share a full edge after each insertion.
    #[serde(default = "default_allow_merge")]
    pub allow_merge: bool,
    #[serde(default = "default_sort_order")]
    pub sort_order: SortOrder,

    // growth
    /// Factor applied to the shorter bin side after a failed attempt (> 1.0).
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f64,
    /// Upper bound on grow-and-retry attempts per engine candidate.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    // portfolio/parallel controls
    #[serde(default = "default_auto_mode")]
    pub auto_mode: AutoMode,
    /// Optional time budget for auto portfolio (milliseconds). None or 0 disables.
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
    /// Enable parallel candidate evaluation when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_dim(),
            max_height: default_max_dim(),
            allow_rotation: false,
            power_of_two: false,
            square: false,
            family: default_family(),
            mr_heuristic: default_mr_heuristic(),
            g_choice: default_g_choice(),
            g_split: default_g_split(),
            allow_merge: default_allow_merge(),
            sort_order: default_sort_order(),
            growth_factor: default_growth_factor(),
            max_attempts: default_max_attempts(),
            auto_mode: default_auto_mode(),
            time_budget_ms: None,
            parallel: default_parallel(),
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - A maximum bin dimension is zero
    /// - The growth factor cannot make progress
    /// - No attempt would ever be made
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::RectPackError;

        if self.max_width == 0 || self.max_height == 0 {
            return Err(RectPackError::InvalidDimensions {
                width: self.max_width,
                height: self.max_height,
            });
        }

        if !self.growth_factor.is_finite() || self.growth_factor <= 1.0 {
            return Err(RectPackError::InvalidConfig(format!(
                "growth_factor must be a finite number greater than 1.0 (got {})",
                self.growth_factor
            )));
        }

        if self.max_attempts == 0 {
            return Err(RectPackError::InvalidConfig(
                "max_attempts must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

fn default_max_dim() -> u32 {
    u32::MAX
}
fn default_family() -> AlgorithmFamily {
    AlgorithmFamily::Guillotine
}
fn default_mr_heuristic() -> MaxRectsHeuristic {
    MaxRectsHeuristic::BestShortSideFit
}
fn default_g_choice() -> GuillotineChoice {
    GuillotineChoice::BestAreaFit
}
fn default_g_split() -> GuillotineSplit {
    GuillotineSplit::SplitShorterLeftoverAxis
}
fn default_allow_merge() -> bool {
    true
}
fn default_sort_order() -> SortOrder {
    SortOrder::HeightDesc
}
fn default_growth_factor() -> f64 {
    1.5
}
fn default_max_attempts() -> usize {
    64
}
fn default_auto_mode() -> AutoMode {
    AutoMode::Quality
}
fn default_parallel() -> bool {
    false
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn with_max_dimensions(mut self, w: u32, h: u32) -> Self {
        self.cfg.max_width = w;
        self.cfg.max_height = h;
        self
    }
    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.cfg.allow_rotation = v;
        self
    }
    pub fn pow2(mut self, v: bool) -> Self {
        self.cfg.power_of_two = v;
        self
    }
    pub fn square(mut self, v: bool) -> Self {
        self.cfg.square = v;
        self
    }
    pub fn family(mut self, v: AlgorithmFamily) -> Self {
        self.cfg.family = v;
        self
    }
    pub fn mr_heuristic(mut self, v: MaxRectsHeuristic) -> Self {
        self.cfg.mr_heuristic = v;
        self
    }
    pub fn g_choice(mut self, v: GuillotineChoice) -> Self {
        self.cfg.g_choice = v;
        self
    }
    pub fn g_split(mut self, v: GuillotineSplit) -> Self {
        self.cfg.g_split = v;
        self
    }
    pub fn allow_merge(mut self, v: bool) -> Self {
        self.cfg.allow_merge = v;
        self
    }
    pub fn sort_order(mut self, v: SortOrder) -> Self {
        self.cfg.sort_order = v;
        self
    }
    pub fn growth_factor(mut self, v: f64) -> Self {
        self.cfg.growth_factor = v;
        self
    }
    pub fn max_attempts(mut self, v: usize) -> Self {
        self.cfg.max_attempts = v;
        self
    }
    pub fn auto_mode(mut self, v: AutoMode) -> Self {
        self.cfg.auto_mode = v;
        self
    }
    pub fn time_budget_ms(mut self, v: Option<u64>) -> Self {
        self.cfg.time_budget_ms = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
