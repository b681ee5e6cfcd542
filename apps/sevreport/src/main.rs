//! Sevreport CLI binary entry point.
//! Resolves configuration, runs the report pipeline, and prints results.

use clap::Parser;
use sevreport::cli::{Cli, Commands};
use sevreport::config::{self, CliOverrides, ConfigSource};
use sevreport::pipeline::RunOutcome;
use sevreport::prompt::{run_session, FixedPath, Interactive};
use sevreport::{output, utils};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(debug: bool) {
    let default = if debug { "sevreport=debug" } else { "sevreport=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(utils::colors_enabled()),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Report {
            input,
            repo_root,
            output_file,
            timestamped,
            output,
            case_insensitive,
            debug,
            open,
            title,
            interactive,
        } => {
            let eff = config::resolve_effective(&CliOverrides {
                repo_root: repo_root.as_deref(),
                input: input.as_deref(),
                output_file: output_file.as_deref(),
                timestamped: timestamped.then_some(true),
                output: output.as_deref(),
                case_insensitive: case_insensitive.then_some(true),
                debug: debug.then_some(true),
                open: open.then_some(true),
                title: title.as_deref(),
            });
            init_tracing(eff.debug);
            if eff.output != "json" {
                match &eff.config {
                    ConfigSource::Loaded(p) => eprintln!(
                        "{} Using config {}",
                        utils::info_prefix(),
                        p.display()
                    ),
                    ConfigSource::Invalid(p) => eprintln!(
                        "{} {} could not be parsed; using defaults.",
                        utils::note_prefix(),
                        p.display()
                    ),
                    ConfigSource::Missing => eprintln!(
                        "{} No sevreport.toml found; using defaults.",
                        utils::note_prefix()
                    ),
                }
            }

            let on_outcome = |outcome: &RunOutcome| {
                output::print_outcome(outcome, &eff.output);
                if let RunOutcome::Success(ok) = outcome {
                    if eff.open {
                        if let Err(e) = utils::open_document(&ok.output_path) {
                            warn!(path = %ok.output_path.display(), error = %e, "could not open report");
                        }
                    }
                }
            };
            let code = if interactive {
                run_session(&mut Interactive::new(eff.input.clone()), &eff, on_outcome)
            } else {
                run_session(&mut FixedPath::new(eff.input.clone()), &eff, on_outcome)
            };
            std::process::exit(code);
        }
    }
}
