//! `reduce` subcommand: turn ranking files into top-k subset files

use std::path::Path;

use anyhow::{bail, Context, Result};

use super::RunOptions;
use crate::pipeline::{materialize_subsets, read_frame, BenchError};
use crate::report::{ranking_files, read_ranking};
use crate::utils::{
    finish_with_success, print_banner, print_completion, print_config, print_step_header,
    print_success, Diagnostics,
};

pub struct ReduceArgs<'a> {
    pub input: &'a Path,
    pub rankings_dir: &'a Path,
    pub output_dir: &'a Path,
    pub kmin: usize,
    pub kmax: usize,
    pub separator: u8,
}

pub fn run_reduce(args: ReduceArgs, options: RunOptions, diagnostics: &dyn Diagnostics) -> Result<()> {
    if args.kmin > args.kmax {
        bail!("kmin ({}) must not exceed kmax ({})", args.kmin, args.kmax);
    }

    if !options.quiet {
        print_banner(env!("CARGO_PKG_VERSION"));
        print_config(
            args.input,
            args.output_dir,
            &[
                ("Rankings", args.rankings_dir.display().to_string()),
                ("Features", format!("{}..{}", args.kmin, args.kmax)),
            ],
        );
        print_step_header(1, "Load dataset");
    }

    let spinner = options.spinner("Reading dataset...");
    let frame = read_frame(args.input, args.separator)
        .with_context(|| format!("Failed to load dataset: {}", args.input.display()))?;
    if frame.width() < 2 {
        let err = BenchError::load(args.input, "expected an identifier and a label column");
        return Err(anyhow::Error::new(err)
            .context(format!("Failed to load dataset: {}", args.input.display())));
    }
    if let Some(spinner) = spinner {
        finish_with_success(&spinner, "Dataset loaded");
    }

    let rankings = ranking_files(args.rankings_dir).with_context(|| {
        format!("Failed to list rankings in {}", args.rankings_dir.display())
    })?;

    if !options.quiet {
        print_step_header(2, "Write top-k subsets");
    }
    let mut written_methods = 0usize;
    for (method, path) in rankings {
        let ranking = match read_ranking(&path) {
            Ok(ranking) => ranking,
            Err(e) => {
                diagnostics.warn(&format!("Skipping {}: {}", path.display(), e));
                continue;
            }
        };
        match materialize_subsets(
            &frame,
            &ranking,
            &method,
            args.output_dir,
            args.kmin,
            args.kmax,
            diagnostics,
        ) {
            Ok(paths) => {
                written_methods += 1;
                if !options.quiet {
                    print_success(&format!("{}: {} subset file(s)", method, paths.len()));
                }
            }
            Err(e) => diagnostics.error(&format!("{}: {}", method, e)),
        }
    }

    if written_methods == 0 {
        diagnostics.warn(&format!(
            "No usable ranking files found in {}",
            args.rankings_dir.display()
        ));
    }
    if !options.quiet {
        print_completion("Reduction");
    }
    Ok(())
}
