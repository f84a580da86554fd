use anyhow::{Result, bail};
use planmatrix_engine::pain::{self, PainCategory};

const BAR_CELLS: usize = 10;

pub fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Parse a comma list of pain categories in either vocabulary.
pub fn parse_categories(input: &str) -> Result<Vec<PainCategory>> {
    let mut categories = Vec::new();
    for token in split_csv(input) {
        let Some(category) = pain::normalize(&token) else {
            bail!(
                "unknown pain category {token:?} (expected one of {})",
                PainCategory::ALL.map(PainCategory::as_str).join(", ")
            );
        };
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    Ok(categories)
}

/// Split a `DRAGGED:TARGET` pair.
pub fn parse_move(input: &str) -> Result<(String, String)> {
    let Some((dragged, target)) = input.split_once(':') else {
        bail!("expected DRAGGED:TARGET, got {input:?}");
    };
    let (dragged, target) = (dragged.trim(), target.trim());
    if dragged.is_empty() || target.is_empty() {
        bail!("both sections are required in {input:?}");
    }
    Ok((dragged.to_string(), target.to_string()))
}

/// Quote a CSV field when it contains a separator, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Escape pipes so a value stays inside its markdown table cell.
pub fn md_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

/// Render a bar width percentage as a fixed-size text bar.
pub fn text_bar(width_percent: f64) -> String {
    let filled = usize::from(planmatrix_engine::numbers::round_percent_to_u8(
        width_percent / 10.0,
    ))
    .min(BAR_CELLS);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_CELLS - filled))
}
