use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};

use crate::output::{format_number, format_total, truncate_text};
use crate::session::FlashKind;
use crate::store::ScoreStore;
use crate::tui::app::{App, Focus, InputMode};
use crate::tui::theme;

pub fn draw<S: ScoreStore>(frame: &mut Frame, app: &App<S>) {
    let area = frame.area();

    if area.height < 8 || area.width < 30 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    if app.is_ranking_tab() {
        render_ranking(frame, chunks[2], app);
    } else {
        render_contestant(frame, chunks[2], app);
    }
    render_status_bar(frame, chunks[3], app);

    if app.input_mode == InputMode::Help {
        render_help_popup(frame);
    }
}

fn render_title<S: ScoreStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let settings = app.session.settings();
    let left = settings.title.clone();
    let right = settings.judge_label(app.session.judge()).unwrap_or_default();
    let padding = (area.width as usize).saturating_sub(left.chars().count() + right.chars().count());

    let title = Line::from(vec![
        Span::styled(left, Style::default().fg(theme::TITLE_COLOR).bold()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, Style::default().fg(theme::MUTED)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn render_tabs<S: ScoreStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let tabs = Tabs::new(app.tab_titles())
        .select(app.tab)
        .style(theme::TAB_INACTIVE)
        .highlight_style(theme::TAB_ACTIVE)
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_contestant<S: ScoreStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let Some(contestant) = app.active_contestant() else {
        return;
    };
    let criteria = &app.session.settings().criteria;

    let chunks = Layout::vertical([
        Constraint::Length(criteria.len() as u16 + 3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    let rows: Vec<Row> = criteria
        .iter()
        .enumerate()
        .map(|(idx, criterion)| {
            let value = app.field_value(criterion);
            let focused = app.focus == Focus::Criterion(idx);
            let field = if focused {
                Cell::from(format!(" {:>3}| ", value)).style(theme::FIELD_FOCUSED)
            } else {
                Cell::from(format!(" {:>3}  ", value)).style(theme::FIELD_IDLE)
            };

            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme::ROW_ALT_BG)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(truncate_text(&criterion.name, 40)),
                Cell::from(format!("{}%", format_number(criterion.weight.round())))
                    .style(Style::default().fg(theme::MUTED)),
                field,
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(8),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Criterion", "Weight", "Score"])
                .style(theme::HEADER_STYLE)
                .bottom_margin(1),
        )
        .block(Block::default().title(Span::styled(
            contestant.name.clone(),
            Style::default().fg(theme::TITLE_COLOR).bold(),
        )));
    frame.render_widget(table, chunks[0]);

    let border = if app.focus == Focus::Comments {
        theme::BORDER_FOCUSED
    } else {
        theme::BORDER_IDLE
    };
    let mut comment = app.comment_value().to_string();
    if app.focus == Focus::Comments {
        comment.push('|');
    }
    let comments = Paragraph::new(comment)
        .wrap(Wrap { trim: false })
        .block(
            Block::bordered()
                .title(" Comments ")
                .border_style(Style::default().fg(border)),
        );
    frame.render_widget(comments, chunks[1]);

    let total = app.session.total(&contestant.id);
    let total_style = match total {
        Some(t) => Style::default().fg(theme::total_color(t)).bold(),
        None => Style::default().fg(theme::MUTED),
    };
    let line = Line::from(vec![
        Span::styled("Your total: ", Style::default().fg(theme::MUTED)),
        Span::styled(format_total(total), total_style),
    ]);
    frame.render_widget(Paragraph::new(line), chunks[2]);
}

fn render_ranking<S: ScoreStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let ranking = app.session.judge_ranking();
    let settings = app.session.settings();

    if ranking.is_empty() {
        let msg = Paragraph::new("No contestants scored yet.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme::MUTED));
        frame.render_widget(msg, area);
        return;
    }

    let rows: Vec<Row> = ranking
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let name = settings
                .contestant(&entry.contestant)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| entry.contestant.to_string());
            let total_style = match entry.total {
                Some(t) => Style::default().fg(theme::total_color(t)),
                None => Style::default().fg(theme::MUTED),
            };
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme::ROW_ALT_BG)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(format!("{}.", entry.rank)).style(Style::default().fg(theme::INDEX_COLOR)),
                Cell::from(format!("{:>7}", format_total(entry.total))).style(total_style),
                Cell::from(truncate_text(&name, 60)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(8),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths).header(
        Row::new(vec!["Rank", "Total", "Contestant"])
            .style(theme::HEADER_STYLE)
            .bottom_margin(1),
    );
    frame.render_widget(table, area);
}

fn render_status_bar<S: ScoreStore>(frame: &mut Frame, area: Rect, app: &App<S>) {
    let text = if let Some(flash) = app.session.flash() {
        let color = match flash.kind {
            FlashKind::Success => theme::FLASH_SUCCESS,
            FlashKind::Error => theme::FLASH_ERROR,
        };
        Line::from(Span::styled(flash.text.clone(), Style::default().fg(color)))
    } else {
        let hints = [
            ("Left/Right", ":contestant "),
            ("Tab", ":field "),
            ("Ctrl-s", ":save "),
            ("F1", ":help "),
            ("Esc", ":quit"),
        ];

        let mut spans = Vec::new();
        if app.session.has_pending_autosave() {
            spans.push(Span::styled("unsaved", Style::default().fg(theme::PENDING_COLOR)));
            spans.push(Span::raw("  "));
        }
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme::STATUS_KEY_COLOR)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme::STATUS_BAR_BG)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

fn render_help_popup(frame: &mut Frame) {
    let popup_area = centered_rect_fixed(50, 13, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(" Keyboard Shortcuts ")
        .border_style(Style::default().fg(theme::POPUP_BORDER));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let shortcuts = [
        ("Left / Right  ", "Previous / next contestant"),
        ("Tab / Down    ", "Next field"),
        ("S-Tab / Up    ", "Previous field"),
        ("0-9           ", "Type a score (0-100)"),
        ("Backspace     ", "Delete last character"),
        ("Delete        ", "Clear field"),
        ("Ctrl-s        ", "Save this contestant"),
        ("F1            ", "Show/hide this help"),
        ("Esc / Ctrl-c  ", "Save pending and quit"),
    ];

    let mut help_lines: Vec<Line> = shortcuts
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(*key, Style::default().fg(theme::STATUS_KEY_COLOR).bold()),
                Span::raw(*action),
            ])
        })
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme::MUTED),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed_clamps() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect_fixed(20, 4, area);
        assert_eq!(rect, Rect::new(10, 3, 20, 4));

        let clamped = centered_rect_fixed(100, 100, area);
        assert_eq!(clamped, area);
    }
}
