//! `rank` subcommand: score features once per selection method and write the
//! ranking files

use std::path::Path;

use anyhow::{bail, Context, Result};

use super::RunOptions;
use crate::pipeline::{load_dataset, FeatureRanker, RankingOutcome};
use crate::report::{
    agreement_scores, display_agreement, display_ranking_times, write_agreement, write_ranking,
};
use crate::utils::{
    finish_with_success, print_banner, print_completion, print_config,
    print_step_header, print_success, Diagnostics,
};

pub struct RankArgs<'a> {
    pub input: &'a Path,
    pub output_dir: &'a Path,
    pub methods: &'a [String],
    pub separator: u8,
    pub agreement_seed: u64,
}

pub fn run_rank(args: RankArgs, options: RunOptions, diagnostics: &dyn Diagnostics) -> Result<()> {
    let methods: Vec<&str> = args
        .methods
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .collect();
    if methods.is_empty() {
        bail!("No selection method given");
    }

    if !options.quiet {
        print_banner(env!("CARGO_PKG_VERSION"));
        print_config(
            args.input,
            args.output_dir,
            &[("Methods", methods.join(", "))],
        );
        print_step_header(1, "Load dataset");
    }

    let spinner = options.spinner("Reading dataset...");
    let data = load_dataset(args.input, args.separator)
        .with_context(|| format!("Failed to load dataset: {}", args.input.display()))?;
    if let Some(spinner) = spinner {
        finish_with_success(&spinner, "Dataset loaded");
    }
    diagnostics.info(&format!(
        "{} rows, {} features, label '{}' with {} classes",
        data.num_rows(),
        data.num_features(),
        data.label_name(),
        data.num_classes()
    ));

    if !options.quiet {
        print_step_header(2, "Rank features");
    }
    let ranker = FeatureRanker::new(diagnostics);
    let mut outcomes: Vec<RankingOutcome> = Vec::with_capacity(methods.len());
    for method in &methods {
        let outcome = match ranker.rank_timed(&data, method) {
            Ok(outcome) => outcome,
            Err(e) => {
                diagnostics.error(&format!("{}: {}", method, e));
                continue;
            }
        };
        match write_ranking(&outcome.ranking, args.output_dir, method) {
            Ok(path) => {
                if !options.quiet {
                    print_success(&format!("{} ranking written to {}", method, path.display()));
                }
                outcomes.push(outcome);
            }
            Err(e) => diagnostics.error(&format!("{}: {}", method, e)),
        }
    }
    if outcomes.is_empty() {
        bail!("No selection method produced a ranking");
    }

    if outcomes.len() > 1 {
        if !options.quiet {
            print_step_header(3, "Ranking agreement");
        }
        let rankings: Vec<_> = outcomes.iter().map(|o| &o.ranking).collect();
        let scores = agreement_scores(&rankings, args.agreement_seed);
        match write_agreement(&scores, args.output_dir) {
            Ok(path) => diagnostics.info(&format!("Agreement written to {}", path.display())),
            Err(e) => diagnostics.error(&e.to_string()),
        }
        if !options.quiet {
            display_agreement(&scores);
        }
    }

    if !options.quiet {
        display_ranking_times(&outcomes);
        print_completion("Ranking");
    }
    Ok(())
}
