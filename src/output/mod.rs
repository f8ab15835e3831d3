pub mod formatter;

pub use formatter::{
    format_cell, format_judge_ranking, format_number, format_rank, format_sheet,
    format_sheet_tsv, format_sheets, format_total, should_use_colors, truncate_text,
};
