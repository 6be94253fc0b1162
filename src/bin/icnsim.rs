use clap::Parser;
use icnsim_rs::error::ConfigError;
use icnsim_rs::registry::Registry;
use icnsim_rs::sim::experiment::{self, RateResult, SweepSummary};
use icnsim_rs::sim::{SimConfig, SimulationContext};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "icnsim",
    about = "Sweep injection rates on a 2D mesh or hypercube and report delay, throughput and saturation"
)]
struct Args {
    /// Path to config.json; built-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override injection rates (comma separated, packets/cycle/node)
    #[arg(long, value_delimiter = ',')]
    rates: Option<Vec<f64>>,

    /// Override runs per injection rate
    #[arg(long)]
    runs: Option<usize>,

    /// Override topology: 2D_mesh or hypercube
    #[arg(long)]
    topology: Option<String>,

    /// Override routing algorithm: duato or ecube
    #[arg(long)]
    routing: Option<String>,

    /// Override hypercube dimension
    #[arg(long)]
    dimension: Option<usize>,

    /// Override warmup cycles
    #[arg(long)]
    warmup: Option<u64>,

    /// Override measurement cycles
    #[arg(long)]
    measurement: Option<u64>,

    /// Output CSV file (defaults to experiment.output_file)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write per-rate results as a JSON array
    #[arg(long)]
    json: Option<PathBuf>,

    /// List registered topologies and routing algorithms, then exit
    #[arg(long)]
    list: bool,
}

fn load_config(args: &Args) -> Result<SimConfig, ConfigError> {
    let mut cfg = match &args.config {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(rates) = &args.rates {
        cfg.traffic.packet_injection_rates = rates.clone();
    }
    if let Some(runs) = args.runs {
        cfg.experiment.runs_per_injection_rate = runs;
    }
    if let Some(topology) = &args.topology {
        cfg.network.topology = topology.clone();
    }
    if let Some(routing) = &args.routing {
        cfg.routing.algorithm = routing.clone();
    }
    if let Some(dimension) = args.dimension {
        cfg.network.hypercube_dimension = dimension;
    }
    if let Some(warmup) = args.warmup {
        cfg.traffic.warmup_cycles = warmup;
    }
    if let Some(measurement) = args.measurement {
        cfg.traffic.measurement_cycles = measurement;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn init_tracing(cfg: &SimConfig) {
    let mut filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    for directive in cfg.debug_directives() {
        if let Ok(d) = directive.parse::<tracing_subscriber::filter::Directive>() {
            filter = filter.add_directive(d);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();
}

fn print_registry(registry: &Registry) {
    for topology in registry.topologies() {
        let default = registry.default_routing(topology).unwrap_or("-");
        println!(
            "{topology}: {} (default: {default})",
            registry.algorithms_for(topology).join(", ")
        );
    }
}

fn print_results_table(results: &[RateResult]) {
    let rule = "-".repeat(60);
    println!("{rule}");
    println!(
        "{:>14} {:>16} {:>16} {:>10}",
        "InjectionRate", "AvgDelay", "Throughput", "Saturated"
    );
    println!("{rule}");
    for r in results {
        let delay = if r.blocked || r.average_delay > 500.0 {
            "BLOCKED".to_string()
        } else {
            format!("{:.3}", r.average_delay)
        };
        println!(
            "{:>14.3} {:>16} {:>16.4} {:>10}",
            r.injection_rate,
            delay,
            r.throughput,
            if r.saturated { "Yes" } else { "No" }
        );
    }
    println!("{rule}");
}

fn print_summary(ctx: &SimulationContext, results: &[RateResult], summary: &SweepSummary) {
    let cfg = ctx.config();
    println!("Network: {}", ctx.network_description());
    println!("Routing: {}", ctx.routing_description());
    println!(
        "Virtual channels: {}, buffer size: {}, traffic: {}, packet size: {} flits",
        cfg.network.virtual_channels,
        cfg.network.buffer_size,
        cfg.traffic.pattern,
        cfg.traffic.packet_size_flits
    );
    if let Some((lo, hi)) = summary.delay_range {
        println!("Non-saturated delay range: {lo:.3} - {hi:.3} cycles");
        println!(
            "Peak throughput: {:.4} flits/cycle/node",
            summary.peak_throughput
        );
        if lo > 0.0 {
            println!("Pre-saturation delay growth: {:.1}%", (hi - lo) / lo * 100.0);
        }
    }
    match summary.saturation_point {
        Some(rate) => {
            println!("Saturation point: {rate:.3} packets/cycle/node");
            if let Some(drop) = summary.throughput_drop_percent {
                println!("Throughput drop at saturation: {drop:.1}%");
            }
        }
        None => println!("Saturation point: not reached in tested range"),
    }
    if let (Some(first), Some(last)) = (results.first(), results.last()) {
        println!(
            "Test range: {:.3} - {:.3} packets/cycle/node ({} points)",
            first.injection_rate,
            last.injection_rate,
            results.len()
        );
    }
}

fn csv_comments(ctx: &SimulationContext) -> Vec<String> {
    let cfg = ctx.config();
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    vec![
        format!("icnsim results - {}", ctx.routing_description()),
        format!("Network: {}", ctx.network_description()),
        format!("Routing Algorithm: {}", cfg.routing.algorithm),
        format!("Network Topology: {}", cfg.network.topology),
        format!("Traffic Pattern: {}", cfg.traffic.pattern),
        format!("Virtual Channels: {}", cfg.network.virtual_channels),
        format!("Buffer Size: {}", cfg.network.buffer_size),
        format!("Simulation Timestamp: {stamp}"),
    ]
}

/// 读回刚写出的 CSV 并与内存中的结果比对
fn verify_csv(path: &Path, results: &[RateResult]) -> Result<(), ConfigError> {
    let read_back = experiment::from_csv(&fs::read_to_string(path)?);
    if experiment::csv_matches(&read_back, results) {
        info!(entries = read_back.len(), "✅ CSV 校验通过");
    } else {
        warn!(
            expected = results.len(),
            found = read_back.len(),
            "⚠️ CSV 读回结果与内存不一致"
        );
    }
    println!("CSV verification: {} entries", read_back.len());
    Ok(())
}

fn run(args: Args) -> Result<(), ConfigError> {
    let cfg = load_config(&args)?;
    init_tracing(&cfg);

    let ctx = SimulationContext::new(cfg)?;
    if args.list {
        print_registry(ctx.registry());
        return Ok(());
    }

    let cfg = ctx.config();
    println!("{}", cfg.simulation.name);
    println!("{}", cfg.simulation.description);

    let mut engine = ctx.build_engine()?;
    let rates = cfg.traffic.packet_injection_rates.clone();
    let results = experiment::run_sweep(
        &mut engine,
        &rates,
        cfg.experiment.runs_per_injection_rate,
    );

    let csv_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&cfg.experiment.output_file));
    fs::write(&csv_path, experiment::to_csv(&csv_comments(&ctx), &results))?;
    info!(path = %csv_path.display(), "💾 结果已写入 CSV");
    verify_csv(&csv_path, &results)?;

    if let Some(path) = &args.json {
        fs::write(path, serde_json::to_string_pretty(&results)?)?;
        info!(path = %path.display(), "💾 结果已写入 JSON");
    }

    print_results_table(&results);
    print_summary(&ctx, &results, &experiment::summarize(&results));
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("icnsim: {e}");
            ExitCode::FAILURE
        }
    }
}
