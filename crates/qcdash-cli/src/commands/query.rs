//! Query command - print rows matching a filter.

use std::path::PathBuf;

use colored::Colorize;
use qcdash::Row;

use super::load_dashboard;
use crate::cli::{LoadArgs, SelectArgs};

pub fn run(
    file: PathBuf,
    overlay: Option<PathBuf>,
    select: &SelectArgs,
    limit: usize,
    json_output: bool,
    load: &LoadArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (spec, ranges) = select.selection()?;
    let dashboard = load_dashboard(&file, overlay.as_deref(), load)?;
    let result = dashboard.query_within(&spec, &ranges)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!(
        "{} {} of {} rows",
        "Matched".cyan().bold(),
        result.matched_count.to_string().white().bold(),
        result.total_count
    );
    print_rows(&result.rows, limit);

    if overlay.is_some() {
        println!();
        println!(
            "{} {} overlay rows",
            "Matched".magenta().bold(),
            result.overlay_matched_count.to_string().white().bold()
        );
        print_rows(&result.overlay_rows, limit);
    }

    Ok(())
}

/// Print up to `limit` rows as a tab-separated table.
fn print_rows(rows: &[Row], limit: usize) {
    let Some(first) = rows.first() else {
        return;
    };

    let header: Vec<&str> = first.keys().map(String::as_str).collect();
    println!("{}", header.join("\t").bold());
    for row in rows.iter().take(limit) {
        let cells: Vec<String> = row.values().map(|v| v.to_string()).collect();
        println!("{}", cells.join("\t"));
    }

    if rows.len() > limit {
        println!(
            "{}",
            format!("... {} more rows (use --limit to show more)", rows.len() - limit).dimmed()
        );
    }
}
