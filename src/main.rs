//! Proctor CLI - locate, run and clean up tests and test suites.

use chrono::Local;
use clap::Parser;
use proctor::cli::Cli;
use proctor::commands::{self, Context, FsCollaborators, Output};
use proctor::config::schema::{DEBUG, STDOUT};
use proctor::config::{Defaults, Settings};
use proctor::logging::{self, LogOptions};
use proctor::storage::{self, KdlFileBackend};
use std::io::{self, IsTerminal, Read};
use std::process;

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            if human {
                eprintln!("Error: {}", e);
            } else {
                eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
            }
            process::exit(1);
        }
    }
}

/// Build settings and collaborators, dispatch, print. Returns whether the
/// command succeeded.
fn run(cli: &Cli) -> proctor::Result<bool> {
    let config_dir = storage::config_dir()?;
    let data_dir = storage::data_dir()?;
    let today = Local::now().date_naive();

    let backend = KdlFileBackend::in_dir(&config_dir);
    let settings = Settings::load(Defaults::standard(&data_dir, today), &backend)
        .with_overrides(cli.setting_overrides())?;

    // Logging comes up after settings, so loading problems are logged here
    let debug = settings.bool(DEBUG);
    let console = settings.bool(STDOUT);
    let _guard = logging::init(
        &data_dir,
        LogOptions {
            debug: matches!(debug, Ok(true)),
            console: matches!(console, Ok(true)),
        },
    );
    for warning in settings.warnings() {
        tracing::warn!("{}", warning);
    }
    for e in [debug.err(), console.err()].into_iter().flatten() {
        tracing::warn!(error = %e, "ignoring invalid logging setting");
    }

    let command = cli.to_command();
    let piped = if command.accepts_piped_names() && !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        commands::parse_piped_names(&input)
    } else {
        Vec::new()
    };

    tracing::info!(command = command.name(), piped = piped.len(), "proctor started");

    let collaborators = FsCollaborators::new(&settings);
    let ctx = Context {
        settings: &settings,
        backend: &backend,
        collaborators: &collaborators,
        today,
    };

    let result = commands::dispatch(&ctx, command, &piped)
        .inspect_err(|e| tracing::error!(error = %e, "command failed"))?;
    output(result.as_ref(), cli.human_readable);
    Ok(result.success())
}

fn output(result: &dyn Output, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
