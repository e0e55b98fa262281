//! `evaluate` subcommand: run the top-k loop for every selection method found
//! in the reduced-dataset directory

use std::path::Path;

use anyhow::{bail, Context, Result};

use super::RunOptions;
use crate::pipeline::{
    ClassifierRegistry, EvaluationConfig, EvaluationPipeline, Metric, SubsetBuilder,
};
use crate::report::{display_evaluation_summary, export_run_summary, RunParams};
use crate::utils::{
    print_banner, print_completion, print_config, print_step_header, print_success, Diagnostics,
};

pub struct EvaluateArgs<'a> {
    pub reduced_dir: &'a Path,
    pub output_dir: &'a Path,
    pub config: EvaluationConfig,
    pub classifiers: &'a [String],
    pub metrics: &'a [String],
    pub separator: u8,
}

pub fn run_evaluate(
    args: EvaluateArgs,
    options: RunOptions,
    diagnostics: &dyn Diagnostics,
) -> Result<()> {
    let config = args.config;
    if config.kmin > config.kmax {
        bail!("kmin ({}) must not exceed kmax ({})", config.kmin, config.kmax);
    }

    let classifiers = ClassifierRegistry::default().resolve(args.classifiers, diagnostics);
    let metrics = Metric::resolve_all(args.metrics, diagnostics);
    if classifiers.is_empty() {
        bail!("None of the requested classifiers is available");
    }
    if metrics.is_empty() {
        bail!("None of the requested metrics is available");
    }

    let pipeline = EvaluationPipeline::new(config, classifiers, metrics, diagnostics)
        .with_subsets(SubsetBuilder::with_separator(args.separator))
        .with_progress(options.show_progress && !options.quiet);
    let classifier_names = pipeline.classifier_names();
    let metric_names: Vec<String> = pipeline.metrics().iter().map(|m| m.to_string()).collect();

    if !options.quiet {
        print_banner(env!("CARGO_PKG_VERSION"));
        print_config(
            args.reduced_dir,
            args.output_dir,
            &[
                ("Features", format!("{}..{}", config.kmin, config.kmax)),
                ("Folds", config.num_folds.to_string()),
                ("Classifiers", classifier_names.join(", ")),
                ("Metrics", metric_names.join(", ")),
            ],
        );
        print_step_header(1, "Cross-validate top-k subsets");
    }

    let outcomes = pipeline
        .run_all(args.reduced_dir, args.output_dir)
        .with_context(|| {
            format!(
                "Failed to evaluate subsets in {}",
                args.reduced_dir.display()
            )
        })?;

    let summary_path = export_run_summary(
        &outcomes,
        RunParams {
            reduced_dir: args.reduced_dir,
            output_dir: args.output_dir,
            config,
            classifiers: classifier_names,
            metrics: metric_names,
        },
    )?;

    let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
    if failed > 0 {
        diagnostics.warn(&format!(
            "{} of {} selection method(s) did not finish cleanly",
            failed,
            outcomes.len()
        ));
    }

    if !options.quiet {
        print_success(&format!("Run summary written to {}", summary_path.display()));
        display_evaluation_summary(&outcomes, pipeline.metrics());
        print_completion("Evaluation");
    }
    Ok(())
}
