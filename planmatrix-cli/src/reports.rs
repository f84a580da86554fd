//! Report generators over a built [`MatrixView`].

use anyhow::Result;
use colored::Colorize;
use planmatrix_engine::numbers::round_percent_to_u8;
use planmatrix_engine::pain::{self, PainSet};
use planmatrix_engine::{CellView, FilterState, MatrixConfig, MatrixView, RowView};
use std::io::Write;

use crate::util::{csv_field, md_cell, text_bar};

/// A pain token that matched no category, with the row it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedToken {
    pub section: String,
    pub characteristic: String,
    pub field: &'static str,
    pub token: String,
}

impl std::fmt::Display for DroppedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}: unrecognized {} pain {:?}",
            self.section, self.characteristic, self.field, self.token
        )
    }
}

/// Collect the pain tokens dropped while normalizing the visible rows.
pub fn dropped_tokens(view: &MatrixView) -> Vec<DroppedToken> {
    let mut dropped = Vec::new();
    for row_view in view.sticky.iter().chain(&view.rows) {
        let row = &row_view.row;
        for (field, raw) in [
            ("personal", &row.personal_pain),
            ("corporate", &row.corporate_pain),
        ] {
            for token in pain::normalize_with_report(raw).dropped {
                dropped.push(DroppedToken {
                    section: row.section.clone(),
                    characteristic: row.characteristic.clone(),
                    field,
                    token,
                });
            }
        }
    }
    dropped
}

fn badges(set: PainSet) -> String {
    set.iter()
        .map(|category| category.short_label())
        .collect::<Vec<_>>()
        .join("")
}

fn describe_filter(filter: &FilterState) -> String {
    if filter.is_empty() {
        return "none".to_string();
    }
    let mut parts = Vec::new();
    if let Some(section) = &filter.selected_section {
        parts.push(format!("section={section}"));
    }
    if !filter.personal_categories.is_empty() {
        parts.push(format!(
            "personal={}",
            pain::to_display_string(filter.personal_categories)
        ));
    }
    if !filter.corporate_categories.is_empty() {
        parts.push(format!(
            "corporate={}",
            pain::to_display_string(filter.corporate_categories)
        ));
    }
    parts.join("; ")
}

fn percent_label(cell: &CellView) -> String {
    cell.progress
        .map(|p| format!("{}%", round_percent_to_u8(p)))
        .unwrap_or_default()
}

fn write_console_cells(
    out: &mut dyn Write,
    row_view: &RowView,
    config: &MatrixConfig,
    plan_width: usize,
) -> Result<()> {
    for cell in &row_view.cells {
        let bar = cell
            .bar_width(config)
            .map(|width| text_bar(width).green().to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "    {:plan_width$}  {:24} {} {}",
            cell.plan,
            cell.display.as_text(),
            bar,
            percent_label(cell).bright_white()
        )?;
    }
    Ok(())
}

pub fn generate_console_report(
    out: &mut dyn Write,
    view: &MatrixView,
    filter: &FilterState,
    config: &MatrixConfig,
    dropped: &[DroppedToken],
) -> Result<()> {
    let plan_width = view.plans.iter().map(String::len).max().unwrap_or(0);

    writeln!(out, "{}", "📊 Plan Matrix Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=====================".cyan())?;
    writeln!(out, "Plans: {}", view.plans.join(", "))?;
    writeln!(out, "Sections: {}", view.sections.join(", "))?;
    writeln!(out, "Filters: {}", describe_filter(filter))?;
    writeln!(out)?;

    if !view.sticky.is_empty() {
        writeln!(out, "{}", "📌 Pinned".bright_yellow().bold())?;
        for row_view in &view.sticky {
            writeln!(out, "  {}", row_view.row.characteristic.bold())?;
            write_console_cells(out, row_view, config, plan_width)?;
        }
        writeln!(out)?;
    }

    if view.rows.is_empty() {
        writeln!(out, "No characteristics match the current filters.")?;
    }
    let mut current_section: Option<&str> = None;
    for row_view in &view.rows {
        let row = &row_view.row;
        if current_section != Some(row.section.as_str()) {
            current_section = Some(row.section.as_str());
            writeln!(out, "{}", format!("📂 {}", row.section).bright_blue().bold())?;
            writeln!(out, "{}", "-".repeat(30).blue())?;
        }
        if row.is_section_header {
            if row.characteristic != row.section {
                writeln!(out, "  {}", row.characteristic.bold())?;
            }
            continue;
        }
        let personal = badges(row.personal_set());
        let corporate = badges(row.corporate_set());
        writeln!(
            out,
            "  {} {}",
            row.characteristic.bold(),
            format!("[{personal}|{corporate}]").dimmed()
        )?;
        if !row.description.is_empty() {
            writeln!(out, "    {}", row.description.dimmed())?;
        }
        write_console_cells(out, row_view, config, plan_width)?;
    }

    if !dropped.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "⚠️  Unrecognized pain tokens".yellow().bold())?;
        for token in dropped {
            writeln!(out, "  - {token}")?;
        }
    }
    Ok(())
}

fn markdown_cell(cell: &CellView) -> String {
    let text = md_cell(cell.display.as_text());
    match cell.progress {
        Some(p) => format!("{text} ({}%)", round_percent_to_u8(p)),
        None => text,
    }
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    view: &MatrixView,
    filter: &FilterState,
    dropped: &[DroppedToken],
) -> Result<()> {
    writeln!(out, "# Plan Matrix")?;
    writeln!(out)?;
    writeln!(out, "**Filters:** {}", describe_filter(filter))?;
    writeln!(out)?;

    let plan_headers: String = view.plans.iter().map(|p| format!(" {} |", md_cell(p))).collect();
    writeln!(
        out,
        "| Section | Characteristic | Personal | Corporate |{plan_headers}"
    )?;
    writeln!(
        out,
        "|---|---|---|---|{}",
        "---|".repeat(view.plans.len())
    )?;

    for row_view in view.sticky.iter().chain(&view.rows) {
        let row = &row_view.row;
        let cells: String = row_view
            .cells
            .iter()
            .map(|cell| format!(" {} |", markdown_cell(cell)))
            .collect();
        let characteristic = if row.is_section_header {
            format!("**{}**", md_cell(&row.characteristic))
        } else {
            md_cell(&row.characteristic)
        };
        writeln!(
            out,
            "| {} | {} | {} | {} |{cells}",
            md_cell(&row.section),
            characteristic,
            pain::to_display_string(row.personal_set()),
            pain::to_display_string(row.corporate_set()),
        )?;
    }

    if !dropped.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Warnings")?;
        writeln!(out)?;
        for token in dropped {
            writeln!(out, "- {}", md_cell(&token.to_string()))?;
        }
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, view: &MatrixView) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, view)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_csv_report(out: &mut dyn Write, view: &MatrixView) -> Result<()> {
    writeln!(out, "section,characteristic,plan,value,magnitude,progress")?;
    for row_view in view.sticky.iter().chain(&view.rows) {
        let row = &row_view.row;
        for cell in &row_view.cells {
            writeln!(
                out,
                "{},{},{},{},{},{}",
                csv_field(&row.section),
                csv_field(&row.characteristic),
                csv_field(&cell.plan),
                csv_field(cell.display.as_text()),
                cell.magnitude.map(|m| m.to_string()).unwrap_or_default(),
                cell.progress.map(|p| format!("{p:.1}")).unwrap_or_default(),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use planmatrix_engine::{CharacteristicRecord, Plan, build_view};

    fn sample_view() -> MatrixView {
        let plans = vec![
            Plan::new(
                "Basic",
                vec![
                    CharacteristicRecord::new("Pricing", "Cost")
                        .as_header()
                        .with_value("From 10k | 20"),
                    CharacteristicRecord::new("Support", "Hotline")
                        .with_value("Business hours")
                        .with_raw_value("8")
                        .with_pains("Ease, mystery", "Speed"),
                ],
            ),
            Plan::new(
                "Pro",
                vec![
                    CharacteristicRecord::new("Pricing", "Cost")
                        .as_header()
                        .with_value("From 40k | 80"),
                    CharacteristicRecord::new("Support", "Hotline")
                        .with_value("Round the clock, with escalation")
                        .with_raw_value("24"),
                ],
            ),
        ];
        build_view(&plans, &FilterState::default(), None, &MatrixConfig::default())
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn dropped_tokens_name_their_row() {
        let dropped = dropped_tokens(&sample_view());
        assert_eq!(dropped.len(), 1);
        assert_eq!(
            dropped[0].to_string(),
            "Support/Hotline: unrecognized personal pain \"mystery\""
        );
    }

    #[test]
    fn csv_has_one_line_per_row_and_plan() {
        let view = sample_view();
        let csv = render(|out| generate_csv_report(out, &view));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 1 + 2 * 2);
        assert_eq!(lines[1], "Pricing,Cost,Basic,From 10k,20,20.0");
        assert!(lines.contains(&"Support,Hotline,Pro,\"Round the clock, with escalation\",,100.0"));
    }

    #[test]
    fn markdown_lists_plans_as_columns() {
        let view = sample_view();
        let md = render(|out| {
            generate_markdown_report(out, &view, &FilterState::default(), &dropped_tokens(&view))
        });
        assert!(md.contains("| Section | Characteristic | Personal | Corporate | Basic | Pro |"));
        assert!(md.contains("| Support | Hotline | Ease | Speed | Business hours (0%) |"));
        assert!(md.contains("## Warnings"));
    }

    #[test]
    fn json_is_the_matrix_view() {
        let view = sample_view();
        let json = render(|out| generate_json_report(out, &view));
        let parsed: MatrixView = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, view);
    }

    #[test]
    fn console_reports_empty_matches() {
        colored::control::set_override(false);
        let mut view = sample_view();
        view.rows.clear();
        let text = render(|out| {
            generate_console_report(
                out,
                &view,
                &FilterState::default(),
                &MatrixConfig::default(),
                &[],
            )
        });
        assert!(text.contains("Plan Matrix Summary"));
        assert!(text.contains("📌 Pinned"));
        assert!(text.contains("No characteristics match the current filters."));
    }
}
