use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::catalog::Settings;
use crate::scoring::{round2, Ranking, ScoreSheet, ScoreView};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score value without trailing zeros ("80", "72.5", "73.67")
pub fn format_number(value: f64) -> String {
    let rounded = round2(value);
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{}", rounded)
    }
}

/// Format a criterion cell: "80%" or "-" when absent
pub fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{}%", format_number(v)),
        None => "-".to_string(),
    }
}

/// Format a total with exactly 2 decimals, "-" when there is none
pub fn format_total(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", round2(v)),
        None => "-".to_string(),
    }
}

pub fn format_rank(rank: Option<usize>) -> String {
    rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
pub fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn pad(text: &str, width: usize, right_align: bool) -> String {
    let len = text.chars().count();
    let fill = " ".repeat(width.saturating_sub(len));
    if right_align {
        format!("{}{}", fill, text)
    } else {
        format!("{}{}", text, fill)
    }
}

/// Header line of a sheet table
fn header_cells(sheet: &ScoreSheet) -> Vec<String> {
    let mut cells = vec!["Contestant".to_string()];
    cells.extend(
        sheet
            .columns
            .iter()
            .map(|c| format!("{} ({}%)", c.name, format_number(c.weight))),
    );
    cells.push("Total Score".to_string());
    if has_comments(sheet) {
        cells.push("Comments".to_string());
    }
    cells.push("Rank".to_string());
    cells
}

fn has_comments(sheet: &ScoreSheet) -> bool {
    !matches!(sheet.view, ScoreView::Aggregate)
}

fn row_cells(sheet: &ScoreSheet, comment_width: Option<usize>) -> Vec<Vec<String>> {
    sheet
        .rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.name.clone()];
            cells.extend(row.cells.iter().map(|v| format_cell(*v)));
            cells.push(format_total(row.total));
            if has_comments(sheet) {
                let comment = row.comment.as_deref().unwrap_or("");
                let comment = if comment.is_empty() { "-" } else { comment };
                cells.push(match comment_width {
                    Some(w) => truncate_text(comment, w),
                    None => comment.to_string(),
                });
            }
            cells.push(format_rank(row.rank));
            cells
        })
        .collect()
}

/// Format a score sheet as an aligned table with its title and judge footer.
///
/// Comments are truncated to the terminal width; pipes get them in full.
pub fn format_sheet(sheet: &ScoreSheet, use_colors: bool) -> String {
    let header = header_cells(sheet);
    let comment_width = get_terminal_width().map(|w| (w / 3).max(20));
    let rows = row_cells(sheet, comment_width);

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    // Contestant and comment columns are text, everything else numeric
    let comment_col = has_comments(sheet).then(|| header.len() - 2);
    let right_align = |i: usize| i != 0 && Some(i) != comment_col;
    let total_col = sheet.columns.len() + 1;
    let separator = "  ";

    let mut lines = Vec::new();
    if use_colors {
        lines.push(sheet.title.bold().to_string());
        lines.push(sheet.heading().cyan().to_string());
    } else {
        lines.push(sheet.title.clone());
        lines.push(sheet.heading());
    }
    lines.push(String::new());

    let header_line = header
        .iter()
        .enumerate()
        .map(|(i, h)| pad(h, widths[i], right_align(i)))
        .collect::<Vec<_>>()
        .join(separator);
    lines.push(if use_colors {
        header_line.bold().to_string()
    } else {
        header_line
    });

    for row in &rows {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let padded = pad(cell, widths[i], right_align(i));
                if !use_colors {
                    padded
                } else if i == total_col {
                    padded.bold().to_string()
                } else if cell == "-" {
                    padded.dimmed().to_string()
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join(separator);
        lines.push(line);
    }

    lines.push(String::new());
    match sheet.view {
        ScoreView::Aggregate => {
            lines.push("Judges:".to_string());
            for judge in &sheet.judges {
                lines.push(format!("  {}: {}", judge.label, judge.name));
            }
        }
        _ => {
            for judge in &sheet.judges {
                lines.push(format!("{} - {}", judge.name, judge.label));
            }
        }
    }

    lines.join("\n")
}

/// Format several sheets one after another, as in "print all"
pub fn format_sheets(sheets: &[ScoreSheet], use_colors: bool) -> String {
    sheets
        .iter()
        .map(|s| format_sheet(s, use_colors))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format a score sheet as tab-separated values for scripting
/// Columns: contestant, one per criterion, total, [comments], rank (header first, no colors)
pub fn format_sheet_tsv(sheet: &ScoreSheet) -> String {
    let mut lines = vec![header_cells(sheet).join("\t")];
    lines.extend(row_cells(sheet, None).into_iter().map(|cells| {
        cells
            .into_iter()
            .map(|c| c.replace(['\t', '\n'], " "))
            .collect::<Vec<_>>()
            .join("\t")
    }));
    lines.join("\n")
}

/// Format a judge's own ranking: " 1.   84.00  Alice"
pub fn format_judge_ranking(ranking: &Ranking, settings: &Settings, use_colors: bool) -> String {
    if ranking.is_empty() {
        return "No contestants scored yet.".to_string();
    }

    ranking
        .iter()
        .map(|entry| {
            let index_str = format!("{:>2}.", entry.rank);
            let total_str = format!("{:>7}", format_total(entry.total));
            let name = settings
                .contestant(&entry.contestant)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| entry.contestant.to_string());
            if use_colors {
                format!("{} {}  {}", index_str.dimmed(), total_str.bold(), name)
            } else {
                format!("{} {}  {}", index_str, total_str, name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
