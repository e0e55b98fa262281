//! rankbench: feature ranking and top-k classifier evaluation CLI
//!
//! `rank` scores the features of a dataset once per selection method,
//! `reduce` turns rankings into top-k subset files and `evaluate`
//! cross-validates a batch of classifiers on growing subsets, writing one
//! result table per metric and selection method.

use std::process::ExitCode;

use clap::Parser;
use console::style;

use rankbench::cli::{
    run_evaluate, run_rank, run_reduce, Cli, Commands, EvaluateArgs, RankArgs, ReduceArgs,
    RunOptions,
};
use rankbench::pipeline::{BenchError, EvaluationConfig};
use rankbench::utils::ConsoleDiagnostics;

/// EX_NOINPUT: the input dataset could not be loaded
const EXIT_NO_INPUT: u8 = 66;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let options = RunOptions::from_cli(&cli);
    let diagnostics = ConsoleDiagnostics::new(cli.quiet);

    let result = match &cli.command {
        Commands::Rank {
            input,
            output_dir,
            methods,
            separator,
            agreement_seed,
        } => run_rank(
            RankArgs {
                input,
                output_dir,
                methods,
                separator: *separator,
                agreement_seed: *agreement_seed,
            },
            options,
            &diagnostics,
        ),
        Commands::Evaluate {
            reduced_dir,
            output_dir,
            kmin,
            kmax,
            num_folds,
            classifiers,
            metrics,
            separator,
            seed,
        } => run_evaluate(
            EvaluateArgs {
                reduced_dir,
                output_dir,
                config: EvaluationConfig {
                    kmin: *kmin,
                    kmax: *kmax,
                    num_folds: *num_folds,
                    seed: *seed,
                },
                classifiers,
                metrics,
                separator: *separator,
            },
            options,
            &diagnostics,
        ),
        Commands::Reduce {
            input,
            rankings_dir,
            output_dir,
            kmin,
            kmax,
            separator,
        } => run_reduce(
            ReduceArgs {
                input,
                rankings_dir,
                output_dir,
                kmin: *kmin,
                kmax: *kmax,
                separator: *separator,
            },
            options,
            &diagnostics,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), err);
            if matches!(err.downcast_ref::<BenchError>(), Some(BenchError::Load { .. })) {
                ExitCode::from(EXIT_NO_INPUT)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
