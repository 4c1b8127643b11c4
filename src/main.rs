//! battery-diag entry point: CLI wiring, config loading, and server start.

use std::process;

use battery_diag::cli::{self, CliOptions};
use battery_diag::config::ServiceConfig;
use battery_diag::logging;
use battery_diag::service::BatteryService;

/// Resolves the config source: `--config`, then `--preset`, then the default preset.
fn load_config(cli: &CliOptions) -> ServiceConfig {
    let loaded = if let Some(ref path) = cli.config {
        ServiceConfig::from_toml_file(path)
    } else if let Some(ref name) = cli.preset {
        ServiceConfig::from_preset(name)
    } else {
        Ok(ServiceConfig::baseline())
    };

    let mut config = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    if let Some(seed) = cli.seed {
        config.generator.seed = Some(seed);
    }
    if let Some(ref bind) = cli.bind {
        config.server.bind = bind.clone();
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

/// Prints one snapshot and its prediction report.
fn run_once(config: &ServiceConfig) {
    let service = BatteryService::new(config);
    let snapshot = service.generate_snapshot();
    let report = service.predict(&snapshot);
    println!("{snapshot}");
    println!("{report}");
}

fn main() {
    let cli = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });
    if cli.help {
        cli::print_usage();
        return;
    }

    logging::init_tracing();
    let config = load_config(&cli);

    if cli.once {
        run_once(&config);
        return;
    }

    #[cfg(feature = "api")]
    {
        use std::sync::Arc;

        use battery_diag::api::{self, AppState};

        let addr = config.bind_addr().unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        });
        let state = Arc::new(AppState::new(&config));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        tracing::info!(
            batteries = config.generator.battery_count,
            interval_ms = config.stream.interval_ms,
            "starting battery diagnostics service"
        );
        if let Err(e) = rt.block_on(api::serve(state, addr)) {
            eprintln!("error: server failed: {e}");
            process::exit(1);
        }
    }

    #[cfg(not(feature = "api"))]
    {
        eprintln!("built without the `api` feature; only --once is available");
        process::exit(1);
    }
}
