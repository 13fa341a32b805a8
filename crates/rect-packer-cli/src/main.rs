use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use rect_packer_core::config::{
    AlgorithmFamily, AutoMode, GuillotineChoice, GuillotineSplit, MaxRectsHeuristic, SortOrder,
};
use rect_packer_core::{
    PackItem, PackItemMut, PackerConfig, Placed, Rect, pack_in_place, pack_layout,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[command(
    name = "rect-packer",
    about = "Pack a JSON list of rectangles into a tight bin",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack rectangles and write their positions
    Pack(PackArgs),
    /// Pack once per engine family and print time, bounds and occupancy
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    /// Input JSON file: an array of objects with `width` and `height`
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output JSON file (stdout when omitted)
    #[arg(short, long, help_heading = "Input/Output")]
    output: Option<PathBuf>,
    /// YAML config file; command-line flags override its values
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Print the effective config (json|yaml) and exit
    #[arg(long, value_name = "FORMAT", help_heading = "Input/Output")]
    print_config: Option<String>,

    /// Algorithm family: guillotine | maxrects | auto
    #[arg(long, help_heading = "Algorithm")]
    algorithm: Option<String>,
    /// Guillotine choice: baf | bssf | blsf | waf | wssf | wlsf
    #[arg(long, help_heading = "Algorithm")]
    g_choice: Option<String>,
    /// Guillotine split: slas | llas | minas | maxas | sas | las
    #[arg(long, help_heading = "Algorithm")]
    g_split: Option<String>,
    /// MaxRects heuristic: bssf | blsf | baf | bl | cp
    #[arg(long, help_heading = "Algorithm")]
    heuristic: Option<String>,
    /// Merge adjacent guillotine free rects (true|false)
    #[arg(long, action=ArgAction::Set, help_heading = "Algorithm")]
    merge: Option<bool>,
    /// Auto mode: fast | quality
    #[arg(long, help_heading = "Algorithm")]
    auto_mode: Option<String>,
    /// Time budget for auto mode in milliseconds
    #[arg(long, help_heading = "Algorithm")]
    time_budget: Option<u64>,
    /// Evaluate auto candidates in parallel (needs the `parallel` feature)
    #[arg(long, default_value_t = false, help_heading = "Algorithm")]
    parallel: bool,

    /// Allow 90° rotation
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    allow_rotation: bool,
    /// Sort order: height_desc | area_desc | max_side_desc | width_desc | none
    #[arg(long, help_heading = "Layout")]
    sort_order: Option<String>,
    /// Width cap for the bin
    #[arg(long, help_heading = "Layout")]
    max_width: Option<u32>,
    /// Height cap for the bin
    #[arg(long, help_heading = "Layout")]
    max_height: Option<u32>,
    /// Round reported bounds up to powers of two
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    pow2: bool,
    /// Report square bounds
    #[arg(long, default_value_t = false, help_heading = "Layout")]
    square: bool,
    /// Bin growth factor between attempts (> 1)
    #[arg(long, help_heading = "Layout")]
    growth_factor: Option<f64>,
    /// Give up after this many grow-and-retry attempts
    #[arg(long, help_heading = "Layout")]
    max_attempts: Option<usize>,

    /// Write positions into the input records instead of building new ones
    #[arg(long, default_value_t = false, help_heading = "Output")]
    in_place: bool,
    /// Pack and log stats without writing any output
    #[arg(long, default_value_t = false, help_heading = "Output")]
    dry_run: bool,
    /// Pretty-print the output JSON
    #[arg(long, default_value_t = true, action=ArgAction::Set, help_heading = "Output")]
    pretty: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Input JSON file: an array of objects with `width` and `height`
    input: PathBuf,
    /// Allow 90° rotation
    #[arg(long, default_value_t = false)]
    allow_rotation: bool,
    /// Auto mode used for the `auto` row: fast | quality
    #[arg(long, default_value = "quality")]
    auto_mode: String,
    /// Time budget for the `auto` row in milliseconds
    #[arg(long)]
    time_budget: Option<u64>,
}

/// One input record: the size the packer needs plus whatever else the caller stored on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Record {
    width: u32,
    height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rotated: Option<bool>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl PackItem for Record {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl PackItemMut for Record {
    // width/height stay as given; `rotated` tells the reader they are swapped in the bin
    fn set_placement(&mut self, frame: Rect, rotated: bool) {
        self.x = Some(frame.x);
        self.y = Some(frame.y);
        self.rotated = Some(rotated);
    }
}

impl Record {
    fn from_placed(p: Placed<Record>, with_rotation: bool) -> Self {
        let mut rec = p.item;
        rec.x = Some(p.x);
        rec.y = Some(p.y);
        rec.rotated = with_rotation.then_some(p.rotated);
        rec
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let res = match &cli.command {
        Commands::Pack(args) => run_pack(args),
        Commands::Bench(args) => run_bench(args),
    };
    if let Err(e) = res {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run_pack(args: &PackArgs) -> anyhow::Result<()> {
    let cfg = build_config(args)?;

    if let Some(fmt) = args.print_config.as_deref() {
        match fmt.to_ascii_lowercase().as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&cfg)?),
            "yaml" | "yml" => print!("{}", serde_yaml::to_string(&cfg)?),
            other => anyhow::bail!("unknown config format: {}", other),
        }
        return Ok(());
    }

    let mut records = load_records(&args.input)?;
    info!(items = records.len(), family = ?cfg.family, "packing");

    let start = Instant::now();
    let info = if args.in_place {
        let info = pack_in_place(&mut records, &cfg)?;
        if !cfg.allow_rotation {
            for rec in &mut records {
                rec.rotated = None;
            }
        }
        info
    } else {
        let layout = pack_layout(&records, &cfg)?;
        records = layout
            .placements
            .into_iter()
            .map(|p| Record::from_placed(p, cfg.allow_rotation))
            .collect();
        layout.info
    };
    info!(
        family = ?info.family,
        attempts = info.attempts,
        bounds = %format!("{}x{}", info.width, info.height),
        time = %fmt_dur(start.elapsed()),
        "{}",
        info.stats.summary()
    );

    if args.dry_run {
        info!("dry run: no output written");
        return Ok(());
    }

    let text = if args.pretty {
        serde_json::to_string_pretty(&records)?
    } else {
        serde_json::to_string(&records)?
    };
    match &args.output {
        Some(path) => {
            fs::write(path, text + "\n")
                .with_context(|| format!("write output {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    let records = load_records(&b.input)?;
    let auto_mode: AutoMode = b
        .auto_mode
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown auto mode: {}", b.auto_mode))?;
    let rows = [
        ("guillotine", AlgorithmFamily::Guillotine),
        ("maxrects", AlgorithmFamily::MaxRects),
        ("auto", AlgorithmFamily::Auto),
    ];
    for (name, family) in rows {
        let cfg = PackerConfig::builder()
            .family(family)
            .allow_rotation(b.allow_rotation)
            .auto_mode(auto_mode)
            .time_budget_ms(b.time_budget)
            .build();
        let start = Instant::now();
        let layout = pack_layout(&records, &cfg)?;
        let dur = start.elapsed();
        println!(
            "{:<10} bounds={}x{} occupancy={:.2}% attempts={} time={}",
            name,
            layout.info.width,
            layout.info.height,
            layout.info.stats.occupancy * 100.0,
            layout.info.attempts,
            fmt_dur(dur)
        );
    }
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn load_records(path: &Path) -> anyhow::Result<Vec<Record>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("read input {}", path.display()))?;
    let records: Vec<Record> = serde_json::from_str(&text)
        .with_context(|| format!("parse input {}", path.display()))?;
    debug!(count = records.len(), "loaded records");
    Ok(records)
}

fn build_config(args: &PackArgs) -> anyhow::Result<PackerConfig> {
    let mut cfg = PackerConfig::default();
    if let Some(path) = &args.config {
        let text =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let yaml: YamlConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = yaml.apply(cfg)?;
    }

    if let Some(v) = parse_opt("algorithm", args.algorithm.as_deref())? {
        cfg.family = v;
    }
    if let Some(v) = parse_opt("guillotine choice", args.g_choice.as_deref())? {
        cfg.g_choice = v;
    }
    if let Some(v) = parse_opt("guillotine split", args.g_split.as_deref())? {
        cfg.g_split = v;
    }
    if let Some(v) = parse_opt("maxrects heuristic", args.heuristic.as_deref())? {
        cfg.mr_heuristic = v;
    }
    if let Some(v) = parse_opt("auto mode", args.auto_mode.as_deref())? {
        cfg.auto_mode = v;
    }
    if let Some(v) = parse_opt("sort order", args.sort_order.as_deref())? {
        cfg.sort_order = v;
    }
    if let Some(v) = args.merge {
        cfg.allow_merge = v;
    }
    if let Some(v) = args.max_width {
        cfg.max_width = v;
    }
    if let Some(v) = args.max_height {
        cfg.max_height = v;
    }
    if let Some(v) = args.growth_factor {
        cfg.growth_factor = v;
    }
    if let Some(v) = args.max_attempts {
        cfg.max_attempts = v;
    }
    if args.time_budget.is_some() {
        cfg.time_budget_ms = args.time_budget;
    }
    cfg.allow_rotation |= args.allow_rotation;
    cfg.power_of_two |= args.pow2;
    cfg.square |= args.square;
    cfg.parallel |= args.parallel;

    cfg.validate()?;
    Ok(cfg)
}

fn parse_opt<T: FromStr>(what: &str, value: Option<&str>) -> anyhow::Result<Option<T>> {
    value
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| anyhow::anyhow!("unknown {}: {}", what, s))
        })
        .transpose()
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// YAML config file. Enum values use the same names and short aliases as the flags.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlConfig {
    family: Option<String>,
    heuristic: Option<String>,
    g_choice: Option<String>,
    g_split: Option<String>,
    allow_merge: Option<bool>,
    auto_mode: Option<String>,
    sort_order: Option<String>,
    max_width: Option<u32>,
    max_height: Option<u32>,
    allow_rotation: Option<bool>,
    power_of_two: Option<bool>,
    square: Option<bool>,
    growth_factor: Option<f64>,
    max_attempts: Option<usize>,
    time_budget_ms: Option<u64>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn apply(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        if let Some(v) = parse_opt("algorithm", self.family.as_deref())? {
            cfg.family = v;
        }
        if let Some(v) =
            parse_opt::<MaxRectsHeuristic>("maxrects heuristic", self.heuristic.as_deref())?
        {
            cfg.mr_heuristic = v;
        }
        if let Some(v) =
            parse_opt::<GuillotineChoice>("guillotine choice", self.g_choice.as_deref())?
        {
            cfg.g_choice = v;
        }
        if let Some(v) =
            parse_opt::<GuillotineSplit>("guillotine split", self.g_split.as_deref())?
        {
            cfg.g_split = v;
        }
        if let Some(v) = parse_opt::<SortOrder>("sort order", self.sort_order.as_deref())? {
            cfg.sort_order = v;
        }
        if let Some(v) = parse_opt("auto mode", self.auto_mode.as_deref())? {
            cfg.auto_mode = v;
        }
        if let Some(v) = self.allow_merge {
            cfg.allow_merge = v;
        }
        if let Some(v) = self.max_width {
            cfg.max_width = v;
        }
        if let Some(v) = self.max_height {
            cfg.max_height = v;
        }
        if let Some(v) = self.allow_rotation {
            cfg.allow_rotation = v;
        }
        if let Some(v) = self.power_of_two {
            cfg.power_of_two = v;
        }
        if let Some(v) = self.square {
            cfg.square = v;
        }
        if let Some(v) = self.growth_factor {
            cfg.growth_factor = v;
        }
        if let Some(v) = self.max_attempts {
            cfg.max_attempts = v;
        }
        if let Some(v) = self.time_budget_ms {
            cfg.time_budget_ms = Some(v);
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
