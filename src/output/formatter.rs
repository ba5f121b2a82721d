use std::io::IsTerminal;

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::city::types::Category;
use crate::compare::{AddressOutcome, AddressReport, ComparisonResult};
use crate::scoring::{Persona, ScoringConfig, WeightVector};

/// Category order used in reports
const REPORT_ORDER: [Category; 6] = [
    Category::Health,
    Category::Transport,
    Category::Parks,
    Category::Education,
    Category::Safety,
    Category::CostOfLiving,
];

/// Widest label ("Cost of Living") plus the colon
const LABEL_WIDTH: usize = 15;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Right-align a score in 3 columns and color it by band
fn format_score(score: u8, use_colors: bool) -> String {
    let padded = format!("{:>3}", score);
    if !use_colors {
        padded
    } else if score >= 70 {
        padded.green().to_string()
    } else if score >= 40 {
        padded.yellow().to_string()
    } else {
        padded.red().to_string()
    }
}

/// Meters as kilometers with two decimals
pub fn format_distance_km(meters: f64) -> String {
    format!("{:.2} km", meters / 1000.0)
}

/// Multi-line text report for one scored address
pub fn format_report(report: &AddressReport, use_colors: bool) -> String {
    let result = &report.result;
    let mut lines = Vec::new();

    let header = format!("{} ({})", report.district, report.coordinate);
    if use_colors {
        lines.push(format!("{}  persona: {}", header.bold(), report.persona.cyan()));
    } else {
        lines.push(format!("{}  persona: {}", header, report.persona));
    }

    let total = format!("Total Score: {}/100", result.total_score);
    if use_colors {
        lines.push(total.bold().to_string());
    } else {
        lines.push(total);
    }

    for category in REPORT_ORDER {
        let label = format!("{}:", category.label());
        let mut line = format!(
            "  {:<width$} {}",
            label,
            format_score(result.breakdown.get(category), use_colors),
            width = LABEL_WIDTH
        );
        if category == Category::Parks {
            line.push_str(&format!(" (closest: {})", result.breakdown.closest_park));
        }
        lines.push(line);
    }

    let weights = REPORT_ORDER
        .iter()
        .map(|c| format!("{} {}%", c.label(), result.weights_used.get(*c)))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("Weights: {}", weights));

    lines.join("\n")
}

fn format_outcome(outcome: &AddressOutcome, use_colors: bool) -> String {
    match outcome {
        AddressOutcome::Scored(report) => format_report(report, use_colors),
        AddressOutcome::Failed { coordinate, error } => {
            let line = format!("{}: not scored ({})", coordinate, error);
            if use_colors {
                line.red().to_string()
            } else {
                line
            }
        }
    }
}

/// Both reports side by side (stacked), then the difference
pub fn format_comparison(result: &ComparisonResult, use_colors: bool) -> String {
    let mut sections = vec![
        format_outcome(&result.first, use_colors),
        format_outcome(&result.second, use_colors),
    ];

    let mut summary = Vec::new();
    match result.delta {
        Some(delta) => {
            let line = format!("QoL difference: {} points", delta);
            if use_colors {
                summary.push(line.bold().to_string());
            } else {
                summary.push(line);
            }
        }
        None => summary.push("QoL difference: n/a".to_string()),
    }
    summary.push(format!(
        "Linear distance: {}",
        format_distance_km(result.linear_distance_m)
    ));
    sections.push(summary.join("\n"));

    sections.join("\n\n")
}

fn format_weights(name: &str, weights: &WeightVector) -> String {
    let pct = weights.as_percentages();
    let cells = REPORT_ORDER
        .iter()
        .map(|c| format!("{:>3}%", pct.get(*c)))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{:<12}{}", name, cells)
}

/// Table of built-in and configured personas with their weights
pub fn format_personas(scoring: &ScoringConfig, use_colors: bool) -> String {
    let header = format!(
        "{:<12}{}",
        "persona",
        REPORT_ORDER
            .iter()
            .map(|c| format!("{:>4}", abbreviation(*c)))
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    let custom = scoring.personas.clone().unwrap_or_default();
    for persona in Persona::ALL {
        // Configured personas shadow built-ins of the same name
        if custom.keys().any(|k| k.eq_ignore_ascii_case(persona.name())) {
            continue;
        }
        lines.push(format_weights(persona.name(), &persona.weights()));
    }
    for (name, weights) in &custom {
        let line = format_weights(name, weights);
        if use_colors {
            lines.push(format!("{} {}", line, "(custom)".dimmed()));
        } else {
            lines.push(format!("{} (custom)", line));
        }
    }

    lines.join("\n")
}

fn abbreviation(category: Category) -> &'static str {
    match category {
        Category::Health => "hlth",
        Category::Transport => "trns",
        Category::Parks => "park",
        Category::Education => "edu",
        Category::Safety => "safe",
        Category::CostOfLiving => "cost",
    }
}

/// Pretty-printed JSON for `--format json`
pub fn format_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
