//! Output formatting: terminal table, plain export lists and JSON.

use serde::Serialize;
use tourney_core::{Item, PercentMatched, ProgressCounters, ReplacementStatus};

#[derive(Serialize)]
struct JsonRankedItem<'a> {
    rank: usize,
    name: &'a str,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    ranked: Vec<JsonRankedItem<'a>>,
    unranked: &'a [Item],
    stored_choices: usize,
    counters: ProgressCounters,
}

/// Items one per line, optionally prefixed with "N. ".
pub fn format_list(items: &[Item], numbers: bool) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| if numbers { format!("{}. {item}", i + 1) } else { item.clone() })
        .collect()
}

/// Print the ranking as a formatted terminal table.
pub fn print_table(ranked: &[Item], unranked: &[Item], stored_choices: usize) {
    let name_width = ranked.iter().map(|r| r.len()).max().unwrap_or(4).max(4);

    println!(" # | {:<name_width$}", "Item");
    println!("---|-{}", "-".repeat(name_width));
    for (i, item) in ranked.iter().enumerate() {
        println!("{:>2} | {:<name_width$}", i + 1, item);
    }

    println!(
        "\n{} items ranked, {} still unranked ({} stored choices)",
        ranked.len(),
        unranked.len(),
        stored_choices,
    );
}

pub fn print_list(items: &[Item], numbers: bool) {
    for line in format_list(items, numbers) {
        println!("{line}");
    }
}

pub fn render_json(
    ranked: &[Item],
    unranked: &[Item],
    stored_choices: usize,
    counters: ProgressCounters,
) -> Result<String, serde_json::Error> {
    let output = JsonOutput {
        ranked: ranked
            .iter()
            .enumerate()
            .map(|(i, name)| JsonRankedItem { rank: i + 1, name })
            .collect(),
        unranked,
        stored_choices,
        counters,
    };
    serde_json::to_string_pretty(&output)
}

fn percent(ratio: Option<f64>) -> String {
    match ratio {
        Some(r) => format!("{:.0}%", r * 100.0),
        None => "-".to_string(),
    }
}

/// One-line progress summary shown above every prompt.
pub fn format_progress(counters: &ProgressCounters, stored_choices: usize) -> String {
    format!(
        "Run {}/{} ({}) | Overall {}/{} ({}) | {} stored choices",
        counters.current_done,
        counters.current_total,
        percent(counters.current_ratio()),
        counters.overall_done,
        counters.overall_total,
        percent(counters.overall_ratio()),
        stored_choices,
    )
}

pub fn format_replacement(status: &ReplacementStatus) -> String {
    format!("Replacing choices for '{}': {}", status.target, status)
}

/// `None` means a newer request is still being computed.
pub fn format_matched(matched: Option<Option<PercentMatched>>) -> String {
    match matched {
        Some(Some(stats)) => stats.to_string(),
        Some(None) => "No pairs left to match".to_string(),
        None => "Percent matched: computing...".to_string(),
    }
}
