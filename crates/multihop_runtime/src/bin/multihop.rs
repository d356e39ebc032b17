//! Multihop CLI entry point.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use multihop_engine::GenerationStrategy;
use multihop_runtime::{RunConfig, RuntimeError, SeedSpec, Session};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    config: Option<PathBuf>,
    strategy: Option<String>,
    seed: Option<String>,
    rng_seed: Option<u64>,
    json: bool,
    show_help: bool,
    show_version: bool,
}

fn main() -> ExitCode {
    init_logging();
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            if let Some(chain) = e.partial_chain() {
                eprintln!("Partial chain stopped after {} step(s):", chain.applications());
                for state in chain.steps() {
                    if let Some(rule) = &state.produced_by {
                        eprintln!("  {}. {rule} -> {} ({})", state.step, state.value, state.info_type);
                    }
                }
            }
            ExitCode::FAILURE
        }
    }
}

// MULTIHOP_LOG_FORMAT=json switches to machine-parseable output.
fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("MULTIHOP_LOG")
        .unwrap_or_else(|_| "multihop=info".into());

    match env::var("MULTIHOP_LOG_FORMAT").as_deref() {
        Ok("json") => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn value_of(args: &[String], i: usize, flag: &str) -> Result<String, RuntimeError> {
    args.get(i)
        .cloned()
        .ok_or_else(|| RuntimeError::usage(format!("{flag} requires a value")))
}

fn parse_args(args: &[String]) -> Result<CliConfig, RuntimeError> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "--json" => config.json = true,
            "-c" | "--config" => {
                i += 1;
                config.config = Some(PathBuf::from(value_of(args, i, "--config")?));
            }
            "-s" | "--strategy" => {
                i += 1;
                config.strategy = Some(value_of(args, i, "--strategy")?);
            }
            "--seed" => {
                i += 1;
                config.seed = Some(value_of(args, i, "--seed")?);
            }
            "--rng-seed" => {
                i += 1;
                let raw = value_of(args, i, "--rng-seed")?;
                config.rng_seed = Some(
                    raw.parse()
                        .map_err(|_| RuntimeError::usage(format!("invalid --rng-seed value: {raw}")))?,
                );
            }
            arg => return Err(RuntimeError::usage(format!("unknown argument: {arg}"))),
        }
        i += 1;
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), RuntimeError> {
    let cli = parse_args(&args)?;

    if cli.show_help {
        print_help();
        return Ok(());
    }

    if cli.show_version {
        println!("multihop {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(strategy) = cli.strategy {
        config.strategy = Some(strategy);
    }
    if let Some(seed) = &cli.seed {
        config.seed = Some(SeedSpec::parse(seed)?);
    }
    if let Some(rng_seed) = cli.rng_seed {
        config.options.rng_seed = Some(rng_seed);
    }
    if config.seed.is_none() {
        return Err(RuntimeError::usage(
            "no seed given; pass --seed <value>:<TYPE> or a config file with [seed]",
        ));
    }

    let session = Session::from_config(&config)?;
    tracing::debug!(strategy = session.strategy().name(), rules = session.rules().len(), "session ready");
    let outcome = session.generate()?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("{}", outcome.question.text);
        if let Some(answer) = &outcome.question.answer {
            println!();
            println!("Answer: {answer}");
        }
    }
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mMultihop\x1b[0m - Rule-based multi-hop question generator

\x1b[1mUSAGE:\x1b[0m
    multihop [OPTIONS]

\x1b[1mOPTIONS:\x1b[0m
    -c, --config FILE       Load a TOML run configuration
    -s, --strategy NAME     forward, template, constrained, goal or backward
        --seed VALUE:TYPE   Primary seed, e.g. \"Albert Einstein:PERSON_NAME\"
        --rng-seed N        Seed for randomized strategies
        --json              Print the question and chain as JSON
    -h, --help              Print help information
    -V, --version           Print version information

\x1b[1mENVIRONMENT:\x1b[0m
    MULTIHOP_LOG            Log filter (default: multihop=info)
    MULTIHOP_LOG_FORMAT     Set to json for JSON logs

\x1b[1mEXAMPLES:\x1b[0m
    multihop --seed \"Albert Einstein:PERSON_NAME\"
    multihop --seed \"Mona Lisa:ARTWORK_NAME\" --strategy forward --rng-seed 7
    multihop --config duration.toml --json"
    );
}
