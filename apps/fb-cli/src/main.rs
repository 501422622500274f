use clap::{Args, Parser, Subcommand, ValueEnum};
use fb_app::{
    AppError, AppResult, DashboardConfig, RunOptions, RunRequest, config, query, run_service,
    sweep,
};
use fb_controls::{
    AnalyticEvaluator, Evaluator, FeedbackEvaluator, ParamKind, SimulationRequest,
    SimulationResult, steady_state,
};
use fb_results::{SplitFrame, to_csv};
use fb_sim::IntegratorType;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fb-cli")]
#[command(about = "Feedback control demonstrator - open-loop vs closed-loop dynamics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate both loops and print the trajectories
    Simulate {
        #[command(flatten)]
        params: ParamArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Output file (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Store the run in the run store
        #[arg(long)]
        save: bool,
        /// Skip cache and force re-run (with --save)
        #[arg(long)]
        no_cache: bool,
        /// Use the closed-form solution instead of numerical integration
        #[arg(long)]
        analytic: bool,
        /// Run store directory
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Print, write or validate a dashboard configuration
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Final and steady-state values over a range of one parameter
    Sweep {
        /// Parameter to sweep (u, d, G or K)
        #[arg(long)]
        param: ParamKind,
        /// First value
        #[arg(long, allow_negative_numbers = true)]
        from: f64,
        /// Last value
        #[arg(long, allow_negative_numbers = true)]
        to: f64,
        /// Number of values, both ends included
        #[arg(long, default_value_t = 11)]
        steps: usize,
        #[command(flatten)]
        params: ParamArgs,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List stored runs, most recent first
    Runs {
        /// Run store directory
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Show details of a stored run
    ShowRun {
        /// Run ID to display
        run_id: String,
        /// Export one output (open_loop or closed_loop) as CSV
        #[arg(long)]
        series: Option<String>,
        /// Run store directory
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print a configuration as YAML (the default one without a path)
    Show {
        /// Path to the config YAML file
        path: Option<PathBuf>,
    },
    /// Write the default configuration
    Init {
        /// Destination YAML file
        path: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        /// Path to the config YAML file
        path: PathBuf,
    },
}

/// Loop parameters; anything not given comes from the config slider defaults.
#[derive(Args, Debug, Default)]
struct ParamArgs {
    /// Dashboard config YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Setpoint u
    #[arg(long, allow_negative_numbers = true)]
    u: Option<f64>,
    /// Perturbation d
    #[arg(long, allow_negative_numbers = true)]
    d: Option<f64>,
    /// Gain G
    #[arg(long, allow_negative_numbers = true)]
    gain: Option<f64>,
    /// Feedback factor K
    #[arg(long, allow_negative_numbers = true)]
    feedback: Option<f64>,
    /// Simulation horizon
    #[arg(long)]
    horizon: Option<f64>,
    /// Number of samples, both endpoints included
    #[arg(long)]
    samples: Option<usize>,
    /// Integrator (rk4 or forward_euler)
    #[arg(long)]
    integrator: Option<IntegratorType>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
    Split,
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            params,
            format,
            output,
            save,
            no_cache,
            analytic,
            store,
        } => cmd_simulate(
            &params,
            format,
            output.as_deref(),
            save,
            !no_cache,
            analytic,
            store,
        ),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { path } => cmd_config_show(path.as_deref()),
            ConfigCommands::Init { path } => cmd_config_init(&path),
            ConfigCommands::Validate { path } => cmd_config_validate(&path),
        },
        Commands::Sweep {
            param,
            from,
            to,
            steps,
            params,
            json,
        } => cmd_sweep(&params, param, from, to, steps, json),
        Commands::Runs { store } => cmd_runs(store.as_deref()),
        Commands::ShowRun {
            run_id,
            series,
            store,
        } => cmd_show_run(&run_id, series.as_deref(), store.as_deref()),
    }
}

/// Config and request after applying command-line overrides.
fn resolve(args: &ParamArgs) -> AppResult<(DashboardConfig, SimulationRequest)> {
    let mut cfg = match &args.config {
        Some(path) => config::load_config(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(integrator) = args.integrator {
        cfg.integrator = integrator;
    }

    let mut params = cfg.default_params();
    let overrides = [
        (ParamKind::Setpoint, args.u),
        (ParamKind::Perturbation, args.d),
        (ParamKind::Gain, args.gain),
        (ParamKind::Feedback, args.feedback),
    ];
    for (kind, value) in overrides {
        if let Some(v) = value {
            params.set(kind, v);
        }
    }

    let mut request = cfg.request(params);
    if let Some(horizon) = args.horizon {
        request.horizon = horizon;
    }
    if let Some(samples) = args.samples {
        request.sample_count = samples;
    }

    Ok((cfg, request))
}

fn cmd_simulate(
    args: &ParamArgs,
    format: OutputFormat,
    output: Option<&Path>,
    save: bool,
    use_cache: bool,
    analytic: bool,
    store: Option<PathBuf>,
) -> AppResult<()> {
    let (cfg, request) = resolve(args)?;
    let evaluator: Box<dyn Evaluator> = if analytic {
        Box::new(AnalyticEvaluator)
    } else {
        Box::new(FeedbackEvaluator::new(cfg.evaluator_options()))
    };

    let result = if save {
        let run_request = RunRequest {
            request,
            options: RunOptions {
                use_cache,
                store_root: store,
                integrator: cfg.integrator,
                ..RunOptions::default()
            },
        };
        let response = run_service::ensure_run_with(&run_request, evaluator.as_ref())?;
        if response.loaded_from_cache {
            eprintln!("✓ Loaded from cache: {}", response.run_id);
        } else {
            eprintln!(
                "✓ Simulation completed: {} ({:.3}s)",
                response.run_id, response.timing.total_time_s
            );
        }
        response.result
    } else {
        run_service::evaluate_only(&request, evaluator.as_ref())?
    };

    let text = match format {
        OutputFormat::Table => render_table(&request, &result),
        OutputFormat::Csv => to_csv(&result),
        OutputFormat::Json => serde_json::to_string_pretty(&result)
            .map_err(|e| AppError::Results(e.to_string()))?,
        OutputFormat::Split => SplitFrame::from_result(&result).to_json()?,
    };

    if let Some(path) = output {
        std::fs::write(path, text)?;
        println!("✓ Wrote {} samples to {}", result.len(), path.display());
    } else {
        println!("{}", text.trim_end());
    }

    Ok(())
}

fn render_table(request: &SimulationRequest, result: &SimulationResult) -> String {
    let p = &request.params;
    let mut out = format!(
        "u = {}, d = {}, G = {}, K = {}\n\n{:>10} {:>12} {:>12}\n",
        p.setpoint, p.perturbation, p.gain, p.feedback, "time", "open loop", "closed loop"
    );
    for s in result {
        out.push_str(&format!(
            "{:>10.4} {:>12.6} {:>12.6}\n",
            s.time, s.y_open_loop, s.y_closed_loop
        ));
    }

    let steady = steady_state(p);
    out.push_str(&format!("\nSteady state:\n  Open loop:   {:.6}\n", steady.open_loop));
    match steady.closed_loop {
        Some(v) => out.push_str(&format!("  Closed loop: {:.6}\n", v)),
        None => out.push_str("  Closed loop: none (1 + G*K <= 0)\n"),
    }
    out
}

fn cmd_config_show(path: Option<&Path>) -> AppResult<()> {
    let cfg = match path {
        Some(path) => config::load_config(path)?,
        None => DashboardConfig::default(),
    };
    print!("{}", serde_yaml::to_string(&cfg)?);
    Ok(())
}

fn cmd_config_init(path: &Path) -> AppResult<()> {
    config::save_config(path, &DashboardConfig::default())?;
    println!("✓ Wrote default config to {}", path.display());
    Ok(())
}

fn cmd_config_validate(path: &Path) -> AppResult<()> {
    println!("Validating config: {}", path.display());
    config::load_config(path)?;
    println!("✓ Config is valid");
    Ok(())
}

fn cmd_sweep(
    args: &ParamArgs,
    param: ParamKind,
    from: f64,
    to: f64,
    steps: usize,
    json: bool,
) -> AppResult<()> {
    let (cfg, base) = resolve(args)?;
    let values = sweep::sweep_values(from, to, steps)?;
    let evaluator = FeedbackEvaluator::new(cfg.evaluator_options());
    let points = sweep::sweep_with(&base, param, &values, &evaluator)?;

    if json {
        let text =
            serde_json::to_string_pretty(&points).map_err(|e| AppError::Results(e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    println!(
        "Sweep of {} over [{}, {}] at t = {}:",
        param.symbol(),
        from,
        to,
        base.horizon
    );
    println!(
        "{:>10} {:>12} {:>12} {:>12} {:>12}",
        param.symbol(),
        "open(t)",
        "closed(t)",
        "open(inf)",
        "closed(inf)"
    );
    for p in &points {
        let closed_inf = p
            .steady
            .closed_loop
            .map(|v| format!("{:.6}", v))
            .unwrap_or_else(|| "none".to_string());
        println!(
            "{:>10.4} {:>12.6} {:>12.6} {:>12.6} {:>12}",
            p.value, p.final_open_loop, p.final_closed_loop, p.steady.open_loop, closed_inf
        );
    }
    Ok(())
}

fn cmd_runs(store: Option<&Path>) -> AppResult<()> {
    let runs = run_service::list_runs(store)?;

    if runs.is_empty() {
        println!("No stored runs found");
    } else {
        println!("Stored runs:");
        for manifest in runs {
            let p = &manifest.request.params;
            println!(
                "  {} ({}) u={} d={} G={} K={} [{}]",
                manifest.run_id,
                manifest.timestamp,
                p.setpoint,
                p.perturbation,
                p.gain,
                p.feedback,
                manifest.evaluator
            );
        }
    }
    Ok(())
}

fn cmd_show_run(run_id: &str, series: Option<&str>, store: Option<&Path>) -> AppResult<()> {
    let (manifest, result) = run_service::load_run(store, run_id)?;

    if let Some(variable) = series {
        let data = query::extract_series(&result, variable)?;
        let mut csv = String::from("time,value\n");
        for (t, val) in &data {
            csv.push_str(&format!("{},{}\n", t, val));
        }
        print!("{}", csv);
        return Ok(());
    }

    let summary = query::get_run_summary(&result)?;
    let p = &manifest.request.params;

    println!("Run: {}", manifest.run_id);
    println!("  Created: {}", manifest.timestamp);
    println!("  Evaluator: {} (solver {})", manifest.evaluator, manifest.solver_version);
    println!(
        "  Parameters: u={} d={} G={} K={}",
        p.setpoint, p.perturbation, p.gain, p.feedback
    );
    println!("\nRun Summary:");
    println!("  Samples: {}", summary.sample_count);
    println!(
        "  Time range: {:.3} - {:.3}",
        summary.time_range.0, summary.time_range.1
    );
    println!(
        "  Final values: open {:.6}, closed {:.6}",
        summary.final_open_loop, summary.final_closed_loop
    );
    println!(
        "  Peak values:  open {:.6}, closed {:.6}",
        summary.peak_open_loop, summary.peak_closed_loop
    );
    Ok(())
}
