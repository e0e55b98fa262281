//! End-of-run summary tables

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use super::agreement::Agreement;
use crate::pipeline::evaluation::MethodOutcome;
use crate::pipeline::metrics::Metric;
use crate::pipeline::ranking::RankingOutcome;

fn print_section(icon: &str, title: &str) {
    println!();
    println!("    {} {}", style(icon).cyan(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
    println!();
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn bold(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

/// Per-method scoring time of a `rank` run
pub fn display_ranking_times(outcomes: &[RankingOutcome]) {
    print_section("⏱️", "RANKING SUMMARY");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        bold("Method"),
        bold("Scored with"),
        bold("Features"),
        bold("Time (ms)"),
    ]);
    for outcome in outcomes {
        let fallback = outcome.requested != outcome.method.name();
        table.add_row(vec![
            Cell::new(&outcome.requested),
            Cell::new(outcome.method.name()).fg(if fallback { Color::Yellow } else { Color::White }),
            Cell::new(outcome.ranking.len()),
            Cell::new(outcome.elapsed.as_millis()).fg(Color::Cyan),
        ]);
    }
    print_indented(&table);
}

/// Kendall's W per prefix length
pub fn display_agreement(scores: &[Agreement]) {
    print_section("🔗", "RANKING AGREEMENT (KENDALL'S W)");

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![bold("Top n"), bold("W"), bold("p-value")]);
    for a in scores {
        let colour = if a.p_value < 0.05 { Color::Green } else { Color::White };
        table.add_row(vec![
            Cell::new(a.top_n),
            Cell::new(format!("{:.4}", a.w)).fg(colour),
            Cell::new(format!("{:.3}", a.p_value)),
        ]);
    }
    print_indented(&table);
}

/// Best average per metric and the k it was reached at, for one table.
fn best_average(outcome: &MethodOutcome, metric: Metric) -> Option<(usize, f64)> {
    outcome
        .tables
        .iter()
        .find(|t| t.metric == metric)?
        .rows()
        .iter()
        .filter(|r| r.average.is_finite())
        .fold(None, |best: Option<(usize, f64)>, r| match best {
            Some((_, v)) if v >= r.average => best,
            _ => Some((r.k, r.average)),
        })
}

/// One row per selection method of an `evaluate` run
pub fn display_evaluation_summary(outcomes: &[MethodOutcome], metrics: &[Metric]) {
    print_section("📋", "EVALUATION SUMMARY");

    let mut header = vec![bold("Method"), bold("Subsets"), bold("Status")];
    header.extend(metrics.iter().map(|m| bold(&format!("best {}", m))));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(header);

    for outcome in outcomes {
        let status = if let Some(reason) = &outcome.aborted {
            Cell::new(format!("aborted: {}", reason)).fg(Color::Red)
        } else if !outcome.failed_tables.is_empty() {
            Cell::new(format!("write failed: {}", outcome.failed_tables.join(", "))).fg(Color::Red)
        } else {
            Cell::new("ok").fg(Color::Green)
        };
        let subsets = match (outcome.evaluated.first(), outcome.evaluated.last()) {
            (Some(first), Some(last)) => format!("k = {}..{}", first, last),
            _ => "none".to_string(),
        };

        let mut row = vec![Cell::new(&outcome.method), Cell::new(subsets), status];
        for &metric in metrics {
            row.push(match best_average(outcome, metric) {
                Some((k, v)) => Cell::new(format!("{:.4} (k = {})", v, k)),
                None => Cell::new("-").fg(Color::DarkGrey),
            });
        }
        table.add_row(row);
    }
    print_indented(&table);
}
