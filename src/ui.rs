//! Terminal output and prompts.
//!
//! - [`Table`] renders box-drawn tables that shrink to the terminal width
//! - [`InquireInteraction`] answers synthesis questions through `inquire` prompts
//! - [`print_environment`] and [`print_report`] format pipeline results

use crate::ide::{GenerationReport, path_env::PathOutcome};
use crate::synth::Interaction;
use crate::toolchain::{Environment, ToolchainInfo};
use colored::*;
use inquire::{Confirm, Select};
use std::path::Path;

/// Columns never shrink below this many characters
const MIN_COL_WIDTH: usize = 8;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are ignored
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        for line in self.render(term_width as usize) {
            println!("{}", line);
        }
    }

    /// Lines of the table fitted into `max_width` columns
    pub fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }
        let widths = self.column_widths(max_width);

        let border = |left: &str, mid: &str, right: &str| {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, cells.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let mut out = String::from("  │");
            for (cell, &width) in cells.iter().zip(&widths) {
                let text = console::truncate_str(&flatten(cell), width, "...").into_owned();
                let pad = width.saturating_sub(console::measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text };
                out.push_str(&format!(" {}{} │", text, " ".repeat(pad)));
            }
            out
        };

        let mut lines = vec![border("┌", "┬", "┐"), line(&self.headers, true), border("├", "┼", "┤")];
        lines.extend(self.rows.iter().map(|row| line(row, false)));
        lines.push(border("└", "┴", "┘"));
        lines
    }

    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| console::measure_text_width(h))
            .collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(console::measure_text_width(&flatten(cell)));
            }
        }

        // indent + outer borders + padding and separator per column
        let overhead = 3 + 3 * widths.len();
        let available = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > available {
            let Some(widest) = widths.iter_mut().filter(|w| **w > MIN_COL_WIDTH).max() else {
                break;
            };
            *widest -= 1;
        }
        widths
    }
}

fn flatten(s: &str) -> String {
    s.replace(['\n', '\r', '\t'], " ")
}

/// Prints what resolution found
pub fn print_environment(env: &Environment) {
    match &env.editor {
        Some(path) => println!("{} VS Code: {}", "✓".green(), path.display()),
        None => println!("{} VS Code: not found", "x".red()),
    }

    if env.toolchains.is_empty() {
        println!("{} No GCC toolchain found on PATH", "x".red());
        return;
    }

    println!("{} {} toolchain(s):", "✓".green(), env.toolchains.len());
    let mut table = Table::new(&["#", "Directory", "Version", "Package"]);
    for (i, t) in env.toolchains.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            t.bin_directory.display().to_string(),
            t.version_number.clone(),
            t.package_label.clone(),
        ]);
    }
    table.print();
}

/// Summary after a successful generation
pub fn print_report(report: &GenerationReport) {
    println!(
        "{} Wrote {} file(s) to {}",
        "✓".green(),
        report.artifacts.len(),
        report.config_dir.display()
    );
    for path in &report.scripts {
        println!("   {} Helper script {}", "+".green(), path.display());
    }
    match &report.path_outcome {
        Some(PathOutcome::Updated(_)) => println!("   {} User PATH updated", "+".green()),
        Some(PathOutcome::CoveredByMachine) => {
            println!("   {} Toolchain already on the machine PATH", "!".yellow())
        }
        Some(PathOutcome::Unchanged) | None => {}
    }
    if let Some(file) = &report.test_file {
        println!("   {} Test file {}", "+".green(), file.display());
    }
    if let Some(link) = &report.shortcut {
        println!("   {} Shortcut {}", "+".green(), link.display());
    }
    for warning in &report.warnings {
        println!("   {} {}: {}", "!".yellow(), warning.step, warning.message);
    }
}

/// Terminal prompts for ambiguous choices
#[derive(Debug, Default, Clone, Copy)]
pub struct InquireInteraction;

impl Interaction for InquireInteraction {
    fn choose_toolchain(&self, candidates: &[ToolchainInfo]) -> Option<usize> {
        let labels: Vec<String> = candidates.iter().map(ToString::to_string).collect();
        Select::new("Several toolchains were found. Which one should be used?", labels)
            .raw_prompt()
            .ok()
            .map(|choice| choice.index)
    }

    fn confirm_overwrite(&self, config_dir: &Path) -> bool {
        Confirm::new(&format!(
            "{} already exists and will be replaced. Continue?",
            config_dir.display()
        ))
        .with_default(false)
        .prompt()
        .unwrap_or(false)
    }
}
