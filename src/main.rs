//! ewh-sim entry point: CLI wiring, Ctrl-C handling and exit codes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use tracing::{info, warn};

use ewh_sim::config::ScenarioConfig;
use ewh_sim::io::export::export_csv;
use ewh_sim::sim::kpi::RunSummary;
use ewh_sim::telemetry::{init_tracing, install_stop_handler};

/// Parsed CLI arguments.
#[derive(Debug, Default)]
struct CliArgs {
    scenario_path: Option<PathBuf>,
    preset: Option<String>,
    seed_override: Option<u64>,
    profile_path: Option<PathBuf>,
    output: Option<PathBuf>,
    summary_json: Option<PathBuf>,
    unbounded: bool,
    quiet: bool,
    help: bool,
}

fn print_help() {
    eprintln!("ewh-sim: water-heater population simulator with demand-response hub");
    eprintln!();
    eprintln!("Usage: ewh-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        ScenarioConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --profile <path>         Environment profile CSV (hour,ambient,inlet,demand)");
    eprintln!("  --output <path>          Export per-step aggregates to CSV");
    eprintln!("  --summary-json <path>    Write the run summary as JSON");
    eprintln!("  --unbounded              Ignore end_step; run until Ctrl-C or out of data");
    eprintln!("  --quiet                  Log warnings only (RUST_LOG overrides)");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args_from(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                cli.help = true;
            }
            "--scenario" => {
                i += 1;
                let path = args.get(i).ok_or("--scenario requires a path argument")?;
                cli.scenario_path = Some(PathBuf::from(path));
            }
            "--preset" => {
                i += 1;
                let name = args.get(i).ok_or("--preset requires a name argument")?;
                cli.preset = Some(name.clone());
            }
            "--seed" => {
                i += 1;
                let raw = args.get(i).ok_or("--seed requires a u64 argument")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                cli.seed_override = Some(seed);
            }
            "--profile" => {
                i += 1;
                let path = args.get(i).ok_or("--profile requires a path argument")?;
                cli.profile_path = Some(PathBuf::from(path));
            }
            "--output" => {
                i += 1;
                let path = args.get(i).ok_or("--output requires a path argument")?;
                cli.output = Some(PathBuf::from(path));
            }
            "--summary-json" => {
                i += 1;
                let path = args.get(i).ok_or("--summary-json requires a path argument")?;
                cli.summary_json = Some(PathBuf::from(path));
            }
            "--unbounded" => {
                cli.unbounded = true;
            }
            "--quiet" | "-q" => {
                cli.quiet = true;
            }
            other => return Err(format!("unknown argument \"{other}\"")),
        }
        i += 1;
    }

    if cli.scenario_path.is_some() && cli.preset.is_some() {
        return Err("--scenario and --preset are mutually exclusive".to_string());
    }

    Ok(cli)
}

/// Loads the scenario and applies CLI overrides.
fn load_scenario(cli: &CliArgs) -> Result<ScenarioConfig, String> {
    // --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        ScenarioConfig::from_toml_file(path).map_err(|e| e.to_string())?
    } else if let Some(ref name) = cli.preset {
        ScenarioConfig::from_preset(name).map_err(|e| e.to_string())?
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(ref path) = cli.profile_path {
        scenario.profile.path = Some(path.clone());
    }
    if cli.unbounded {
        scenario.simulation.end_step = None;
    }
    Ok(scenario)
}

fn write_summary_json(summary: &RunSummary, path: &Path) -> ewh_sim::Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json)?;
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args_from(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {e}");
            print_help();
            process::exit(1);
        }
    };
    if cli.help {
        print_help();
        process::exit(0);
    }

    init_tracing(cli.quiet);

    let scenario = match load_scenario(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let mut hub = match scenario.build_hub() {
        Ok(hub) => hub,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    if let Err(e) = install_stop_handler(hub.stop_handle()) {
        warn!(error = %e, "Ctrl-C handler not installed");
    }

    let report = hub.run();
    let bounded = hub.settings().end_step.is_some();

    // Records are a valid prefix on every outcome, so export regardless
    if let Some(ref path) = cli.output {
        if let Err(e) = export_csv(&report.records, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        info!(path = %path.display(), rows = report.records.len(), "aggregates written");
    }

    let summary = RunSummary::from_records(&report.records, hub.population(), report.outcome);
    println!("{summary}");

    if let Some(ref path) = cli.summary_json {
        if let Err(e) = write_summary_json(&summary, path) {
            eprintln!("error: failed to write summary: {e}");
            process::exit(1);
        }
    }

    process::exit(report.outcome.exit_code(bounded));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_baseline() {
        let cli = parse_args_from(&[]).expect("empty args parse");
        assert!(cli.scenario_path.is_none());
        assert!(cli.preset.is_none());
        let scenario = load_scenario(&cli).expect("baseline loads");
        assert_eq!(scenario.reactivation.hours, 4);
    }

    #[test]
    fn supports_scenario_cli() {
        let cli = parse_args_from(&args(&["--scenario", "scenarios/baseline.toml"]))
            .expect("parse should succeed");
        assert_eq!(
            cli.scenario_path.as_deref().and_then(|p| p.to_str()),
            Some("scenarios/baseline.toml")
        );
        assert!(cli.preset.is_none());
    }

    #[test]
    fn overrides_apply() {
        let cli = parse_args_from(&args(&[
            "--preset",
            "abrupt",
            "--seed",
            "9",
            "--profile",
            "weather.csv",
            "--unbounded",
        ]))
        .expect("parse should succeed");
        let scenario = load_scenario(&cli).expect("preset loads");
        assert_eq!(scenario.simulation.seed, 9);
        assert_eq!(scenario.simulation.end_step, None);
        assert_eq!(scenario.reactivation.hours, 0);
        assert_eq!(
            scenario.profile.path.as_deref().and_then(|p| p.to_str()),
            Some("weather.csv")
        );
    }

    #[test]
    fn rejects_scenario_with_preset() {
        let err = parse_args_from(&args(&["--scenario", "a.toml", "--preset", "baseline"]));
        assert!(err.is_err());
    }

    #[test]
    fn rejects_bad_seed_and_unknown_flag() {
        assert!(parse_args_from(&args(&["--seed", "abc"])).is_err());
        assert!(parse_args_from(&args(&["--seed"])).is_err());
        assert!(parse_args_from(&args(&["--serve"])).is_err());
    }

    #[test]
    fn help_and_quiet_flags() {
        let cli = parse_args_from(&args(&["--quiet", "--help"])).expect("flags parse");
        assert!(cli.quiet);
        assert!(cli.help);
    }
}
