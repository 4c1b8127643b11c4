//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

/// Parsed command-line options.
#[derive(Debug, Default, PartialEq)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub seed: Option<u64>,
    pub bind: Option<String>,
    /// Print one snapshot and its predictions, then exit.
    pub once: bool,
    pub help: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    parse_args_from(env::args().skip(1).collect())
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name = args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--bind" => {
                i += 1;
                let addr = args.next_or_err(i, "missing value for --bind (expected host:port)")?;
                opts.bind = Some(addr.to_string());
            }
            "--once" => opts.once = true,
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("battery-diag - simulated battery telemetry and diagnostics service");
    eprintln!();
    eprintln!("Usage: battery-diag [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>    Load service config from a TOML file");
    eprintln!("  --preset <name>    Use a built-in preset (default, hot_site)");
    eprintln!("  --seed <u64>       Seed the random source");
    eprintln!("  --bind <addr>      Override the listen address");
    eprintln!("  --once             Print one snapshot with predictions and exit");
    eprintln!("  --help             Show this help message");
    eprintln!();
    eprintln!("If neither --config nor --preset is given, the default preset is used.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_arguments_is_default() {
        assert_eq!(parse_args_from(vec![]).unwrap(), CliOptions::default());
    }

    #[test]
    fn parses_every_flag() {
        let opts = parse_args_from(args(&[
            "--preset", "hot_site", "--seed", "9", "--bind", "127.0.0.1:9000", "--once",
        ]))
        .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("hot_site"));
        assert_eq!(opts.seed, Some(9));
        assert_eq!(opts.bind.as_deref(), Some("127.0.0.1:9000"));
        assert!(opts.once);
        assert!(!opts.help);
    }

    #[test]
    fn supports_config_path() {
        let opts = parse_args_from(args(&["--config", "site.toml"])).unwrap();
        assert_eq!(
            opts.config.as_deref().and_then(|p| p.to_str()),
            Some("site.toml")
        );
    }

    #[test]
    fn config_and_preset_conflict() {
        let err = parse_args_from(args(&["--config", "a.toml", "--preset", "default"])).unwrap_err();
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn rejects_bad_seed_and_missing_values() {
        assert!(parse_args_from(args(&["--seed", "abc"])).unwrap_err().contains("abc"));
        assert!(parse_args_from(args(&["--bind"])).unwrap_err().contains("--bind"));
        assert!(parse_args_from(args(&["--verbose"])).unwrap_err().contains("--verbose"));
    }
}
