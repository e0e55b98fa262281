//! CLI module - argument parsing and subcommand runners

mod args;
pub mod evaluate;
pub mod rank;
pub mod reduce;

pub use args::{Cli, Commands};
pub use evaluate::{run_evaluate, EvaluateArgs};
pub use rank::{run_rank, RankArgs};
pub use reduce::{run_reduce, ReduceArgs};

use indicatif::ProgressBar;

use crate::utils::create_spinner;

/// Output switches shared by all subcommands
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub quiet: bool,
    pub show_progress: bool,
}

impl RunOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            quiet: cli.quiet,
            show_progress: !cli.no_progress,
        }
    }

    /// Spinner for a blocking step, when progress display is on.
    pub(crate) fn spinner(&self, message: &str) -> Option<ProgressBar> {
        (self.show_progress && !self.quiet).then(|| create_spinner(message))
    }
}
