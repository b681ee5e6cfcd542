//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sevreport",
    version,
    about = "Parasoft static analysis report by severity",
    long_about = "Sevreport turns a Parasoft static-analysis report (XML, or a legacy text/HTML export) into a standalone HTML report grouped by severity.\n\nConfiguration precedence: CLI > sevreport.toml > defaults.",
    after_help = "Examples:\n  sevreport report build/report.xml\n  sevreport report build/report.xml --output-file out/findings.html --timestamped\n  sevreport report --interactive",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current sevreport version.")]
    Version,
    /// Generate the severity-grouped HTML report
    #[command(
        about = "Generate an HTML report",
        long_about = "Read a Parasoft report, match violations to rule definitions, and write an HTML report grouped by severity. Exit status is non-zero when the input is missing or unreadable (2), structurally unsupported (3), or the output cannot be written (4).",
        after_help = "Examples:\n  sevreport report report.xml\n  sevreport report report.xml --output json --case-insensitive"
    )]
    Report {
        #[arg(help = "Path to the Parasoft report (XML or legacy text/HTML)")]
        input: Option<String>,
        #[arg(long, help = "Repository root used for config discovery (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Output HTML file (default: parasoft_report_by_severity.html)")]
        output_file: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Append a local timestamp to the output file name")]
        timestamped: bool,
        #[arg(long, help = "Console output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Match rule ids ignoring case")]
        case_insensitive: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Log discovered rule ids and severity levels")]
        debug: bool,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Open the written report in the default viewer")]
        open: bool,
        #[arg(long, help = "Report title")]
        title: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Prompt for input paths until declined")]
        interactive: bool,
    },
}
