//! Input path sources: a fixed path from the command line, or an interactive
//! prompt that keeps asking until the user declines.

use crate::config::Effective;
use crate::pipeline::{run, RunOutcome};
use dialoguer::{theme::ColorfulTheme, Confirm, Input};

/// Yields input paths for successive runs.
pub trait PathProvider {
    /// `None` ends the session; `Some(None)` is a run without a path.
    fn next_input(&mut self) -> Option<Option<String>>;
}

/// Single run with a path known up front.
pub struct FixedPath {
    path: Option<Option<String>>,
}

impl FixedPath {
    pub fn new(path: Option<String>) -> Self {
        Self { path: Some(path) }
    }
}

impl PathProvider for FixedPath {
    fn next_input(&mut self) -> Option<Option<String>> {
        self.path.take()
    }
}

/// Terminal prompt backed by `dialoguer`.
pub struct Interactive {
    initial: Option<String>,
    started: bool,
}

impl Interactive {
    /// `initial` is offered as the default answer of the first prompt.
    pub fn new(initial: Option<String>) -> Self {
        Self {
            initial,
            started: false,
        }
    }
}

impl PathProvider for Interactive {
    fn next_input(&mut self) -> Option<Option<String>> {
        let theme = ColorfulTheme::default();
        if self.started {
            let again = Confirm::with_theme(&theme)
                .with_prompt("Process another file?")
                .default(false)
                .interact()
                .unwrap_or(false);
            if !again {
                return None;
            }
        }
        self.started = true;
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt("Path to the Parasoft report")
            .allow_empty(true);
        if let Some(default) = self.initial.take() {
            input = input.default(default);
        }
        let answer = input.interact_text().unwrap_or_default();
        let answer = answer.trim();
        Some((!answer.is_empty()).then(|| answer.to_string()))
    }
}

/// Run once per provided path and return the exit code of the last run.
pub fn run_session<P: PathProvider>(
    provider: &mut P,
    eff: &Effective,
    mut on_outcome: impl FnMut(&RunOutcome),
) -> i32 {
    let mut code = 0;
    while let Some(input) = provider.next_input() {
        let outcome = run(&eff.run_config(input));
        on_outcome(&outcome);
        code = outcome.exit_code();
    }
    code
}
