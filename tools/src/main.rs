//! attribution-runner: headless attribution runs over a journey population.
//!
//! Usage:
//!   attribution-runner --seed 12345 --users 500
//!   attribution-runner --input rows.json --config data/engine_config.json --json
//!   attribution-runner --seed 12345 --ipc-mode

use anyhow::Result;
use attribution_core::{
    config::{ChannelScoreTable, EngineConfig, ModelConfig},
    engine::{AttributionEngine, AttributionReport},
    ingest::{flatten_rows, group_rows, load_rows, ChannelCatalog},
    journey::Population,
    models::ModelKind,
    synth::{self, SyntheticConfig},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetReport,
    SetModel {
        config: ModelConfig,
    },
    SetScores {
        scores: ChannelScoreTable,
    },
    Regenerate {
        seed: u64,
        #[serde(default)]
        users: Option<usize>,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let users = parse_arg(&args, "--users", 500usize);
    let top = parse_arg(&args, "--top", 0usize);
    let threshold = parse_arg(&args, "--threshold", f64::NAN);
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let json = has_flag(&args, "--json");
    let config_path = str_arg(&args, "--config").unwrap_or("./data/engine_config.json");
    let input = str_arg(&args, "--input");
    let export = str_arg(&args, "--export");

    let mut config = EngineConfig::load(config_path)?;
    if !threshold.is_nan() {
        config.model.navigation_threshold_seconds = threshold;
    }
    if top > 0 {
        config.top_paths = top;
    }

    let catalog = ChannelCatalog::new(config.channel_aliases.clone());
    let mut synthetic = SyntheticConfig { seed, users };
    let mut population = match input {
        Some(path) => group_rows(&load_rows(path)?, &catalog),
        None => synth::generate(synthetic),
    };

    if let Some(path) = export {
        std::fs::write(path, serde_json::to_string_pretty(&flatten_rows(&population))?)?;
        log::info!("exported {} journeys to {path}", population.len());
    }

    let mut engine = AttributionEngine::build(config)?;

    if ipc_mode {
        return run_ipc_loop(&mut engine, &mut population, &mut synthetic);
    }

    let report = engine.run(&population)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&engine, &report, input.unwrap_or("synthetic"), seed);
    }
    Ok(())
}

fn run_ipc_loop(
    engine: &mut AttributionEngine,
    population: &mut Population,
    synthetic: &mut SyntheticConfig,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        let outcome = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetReport => Ok(()),
            IpcCommand::SetModel { config } => engine.set_model_config(config),
            IpcCommand::SetScores { scores } => engine.set_channel_scores(scores),
            IpcCommand::Regenerate { seed, users } => {
                synthetic.seed = seed;
                if let Some(users) = users {
                    synthetic.users = users;
                }
                *population = synth::generate(*synthetic);
                Ok(())
            }
        };

        match outcome.and_then(|()| engine.run(population)) {
            Ok(report) => writeln!(stdout, "{}", serde_json::to_string(&report)?)?,
            Err(e) => write_error(&mut stdout, &e.to_string())?,
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{}", err_json)?;
    out.flush()?;
    Ok(())
}

fn print_summary(engine: &AttributionEngine, report: &AttributionReport, source: &str, seed: u64) {
    let model = &engine.config().model;
    println!("attribution-runner");
    println!("  generated:  {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  source:     {source}");
    println!("  seed:       {seed}");
    println!(
        "  navigation: {} <= {}s",
        model.navigation_channel, model.navigation_threshold_seconds
    );
    println!(
        "  u-shape:    first={} last={} middle={}",
        model.first_weight, model.last_weight, model.middle_weight
    );
    for warning in &report.warnings {
        println!("  WARNING:    {warning}");
    }
    println!();

    println!("=== RUN SUMMARY ===");
    println!("  converting journeys: {}", report.converting);
    println!("  noise journeys:      {}", report.noise);
    println!("  skipped journeys:    {}", report.skipped.len());
    println!("  conversion value:    ${:.0}", report.total_value);
    println!();

    println!("=== CHANNEL REVENUE BY MODEL ===");
    let mut channels: Vec<&String> = report.models.iter().flat_map(|m| m.totals.channels()).collect();
    channels.sort();
    channels.dedup();

    print!("  {:<16}", "channel");
    for m in &report.models {
        print!(" {:>22}", m.kind.label());
    }
    println!();
    for channel in channels {
        print!("  {:<16}", channel);
        for m in &report.models {
            print!(" {:>22}", format!("${:.0}", m.totals.get(channel)));
        }
        println!();
    }
    println!();

    if let Some(deltas) = report.compare(ModelKind::LastTouch, ModelKind::UShaped) {
        println!("=== U-SHAPED vs LAST TOUCH ===");
        for d in deltas {
            let pct = d
                .delta_pct
                .map(|p| format!("{p:+.1}%"))
                .unwrap_or_else(|| "n/a".into());
            println!("  {:<16} {:>+12.0}  {pct}", d.channel, d.delta);
        }
        println!();
    }

    println!("=== TOP CONVERSION PATHS ===");
    if report.top_paths.is_empty() {
        println!("  (no converting journeys)");
    }
    for (rank, p) in report.top_paths.iter().enumerate() {
        println!("  {:>2}. {:>5}  {}", rank + 1, p.count, p.path);
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
