use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};

use crate::config::Theme;
use crate::grouping::{DateGroup, format_kickoff, kickoff_time};
use crate::outcome::{Accuracy, Outcome};
use crate::state::{
    AppState, FixturesPage, FixturesView, LoadMore, MatchCard, MatchPage, MatchView, Page,
    Prediction, PredictionSlot, ResultRecord, ResultsPage, ResultsView,
};

const CONSOLE_LINES: usize = 2;

pub fn ui(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(CONSOLE_LINES as u16 + 2),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Paragraph::new(header_text(state))
        .style(Style::default().fg(theme.accent))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match &state.page {
        Page::Fixtures(page) => render_fixtures(frame, chunks[1], page, theme),
        Page::Results(page) => render_results(frame, chunks[1], page, theme),
        Page::Match(page) => render_match(frame, chunks[1], page, theme),
    }

    let console = Paragraph::new(console_text(state))
        .style(Style::default().fg(theme.muted))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(theme.muted));
    frame.render_widget(footer, chunks[3]);

    if state.help_overlay {
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> String {
    let title = match &state.page {
        Page::Fixtures(page) => {
            let matchday = match (page.matchday_filter, page.reported_matchday) {
                (Some(day), _) => format!("Matchday {day}"),
                (None, Some(day)) => format!("Matchday {day} (current)"),
                (None, None) => "Current matchday".to_string(),
            };
            format!("MATCH PREDICTOR | FIXTURES | {matchday}")
        }
        Page::Results(page) => match &page.view {
            ResultsView::Loaded { results, total, .. } => {
                format!("MATCH PREDICTOR | RESULTS | {} of {}", results.len(), total)
            }
            _ => "MATCH PREDICTOR | RESULTS".to_string(),
        },
        Page::Match(page) => format!("MATCH PREDICTOR | MATCH {}", page.match_id),
    };
    let line1 = format!("  .-.  {title}");
    let line2 = format!(" /___\\ {}", state.route);
    let line3 = "  |_|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    match &state.page {
        Page::Fixtures(_) => {
            "1 Fixtures | 2 Results | j/k/↑/↓ Move | Enter Match | r Refresh | [/] Matchday | m Current | ? Help | q Quit".to_string()
        }
        Page::Results(_) => {
            "1 Fixtures | 2 Results | j/k/↑/↓ Move | Enter Match | n More | r Refresh | ? Help | q Quit".to_string()
        }
        Page::Match(_) => "b/Esc Back | r Reload | 1 Fixtures | 2 Results | ? Help | q Quit".to_string(),
    }
}

fn render_notice(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let notice = Paragraph::new(text.to_string())
        .style(style)
        .wrap(Wrap { trim: true });
    frame.render_widget(notice, area);
}

fn render_fixtures(frame: &mut Frame, area: Rect, page: &FixturesPage, theme: &Theme) {
    match &page.view {
        FixturesView::Loading => render_notice(
            frame,
            area,
            "Loading fixtures...",
            Style::default().fg(theme.muted),
        ),
        FixturesView::Failed(message) => render_notice(
            frame,
            area,
            message,
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        ),
        FixturesView::Empty => render_notice(
            frame,
            area,
            "No upcoming fixtures for this matchday",
            Style::default().fg(theme.muted),
        ),
        FixturesView::Loaded { groups } => {
            if area.height == 0 {
                return;
            }
            let (lines, selected_line) = fixture_lines(groups, page.selected, theme);
            let (start, end) = visible_range(selected_line, lines.len(), area.height as usize);
            let list = Paragraph::new(lines[start..end].to_vec());
            frame.render_widget(list, area);
        }
    }
}

/// One heading per day followed by its fixtures. Returns the lines and the
/// index of the line holding the selected fixture.
pub fn fixture_lines(
    groups: &[DateGroup],
    selected: usize,
    theme: &Theme,
) -> (Vec<Line<'static>>, usize) {
    let mut lines = Vec::new();
    let mut selected_line = 0;
    let mut idx = 0;

    for (group_idx, group) in groups.iter().enumerate() {
        if group_idx > 0 {
            lines.push(Line::raw(""));
        }
        lines.push(Line::styled(
            group.label(),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ));
        for fixture in &group.fixtures {
            let is_selected = idx == selected;
            let prefix = if is_selected { "> " } else { "  " };
            let middle = match fixture.final_score() {
                Some((home, away)) => format!("{home}-{away}"),
                None => "vs".to_string(),
            };
            let venue = fixture
                .venue
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .map(|v| format!("  ({v})"))
                .unwrap_or_default();
            let text = format!(
                "{prefix}{}  {} {middle} {}{venue}",
                kickoff_time(&fixture.date),
                fixture.home_team_name,
                fixture.away_team_name
            );
            let style = if is_selected {
                Style::default().fg(Color::White).bg(theme.selected_bg)
            } else {
                Style::default()
            };
            if is_selected {
                selected_line = lines.len();
            }
            lines.push(Line::styled(text, style));
            idx += 1;
        }
    }

    (lines, selected_line)
}

fn render_results(frame: &mut Frame, area: Rect, page: &ResultsPage, theme: &Theme) {
    let (results, more) = match &page.view {
        ResultsView::Loading => {
            return render_notice(
                frame,
                area,
                "Loading results...",
                Style::default().fg(theme.muted),
            );
        }
        ResultsView::Failed(message) => {
            return render_notice(
                frame,
                area,
                message,
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            );
        }
        ResultsView::Empty => {
            return render_notice(
                frame,
                area,
                "No results yet this season",
                Style::default().fg(theme.muted),
            );
        }
        ResultsView::Loaded { results, more, .. } => (results, more),
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    let widths = results_columns();
    render_results_header(frame, sections[0], &widths);

    let list_area = sections[1];
    let visible = list_area.height as usize;
    let (start, end) = visible_range(page.selected, results.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = idx == page.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(theme.selected_bg)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);
        render_result_row(frame, &cols, &results[idx], row_style, theme);
    }

    let (status, style) = load_more_status(page, more, theme);
    render_cell_text(frame, sections[2], &status, style);
}

fn render_result_row(
    frame: &mut Frame,
    cols: &[Rect],
    record: &ResultRecord,
    row_style: Style,
    theme: &Theme,
) {
    let date = format_kickoff(&record.date);
    let name = format!("{} vs {}", record.home_team, record.away_team);
    let score = format!("{}-{}", record.home_goals, record.away_goals);
    let predicted = record
        .predicted_outcome()
        .map(Outcome::label)
        .unwrap_or("N/A");
    let hda = record
        .prediction
        .as_ref()
        .map(|p| {
            format!(
                "H{:.0} D{:.0} A{:.0}",
                p.home_win_probability * 100.0,
                p.draw_probability * 100.0,
                p.away_win_probability * 100.0
            )
        })
        .unwrap_or_else(|| "-".to_string());
    let label_style = match record.accuracy() {
        Some(accuracy) => row_style
            .fg(accuracy_color(theme, accuracy))
            .add_modifier(Modifier::BOLD),
        None => row_style.fg(theme.muted),
    };
    let sep_style = row_style.fg(theme.muted);

    render_cell_text(frame, cols[0], &date, row_style);
    render_vseparator(frame, cols[1], sep_style);
    render_cell_text(frame, cols[2], &name, row_style);
    render_cell_text(frame, cols[3], &score, row_style);
    render_cell_text(frame, cols[4], predicted, label_style);
    render_cell_text(frame, cols[5], &hda, row_style);
}

fn load_more_status(page: &ResultsPage, more: &LoadMore, theme: &Theme) -> (String, Style) {
    let loaded = page.results().len();
    match more {
        LoadMore::Loading => (
            "Loading more...".to_string(),
            Style::default().fg(theme.muted),
        ),
        LoadMore::Failed(message) => (
            format!("{message} (n to retry)"),
            Style::default().fg(theme.error),
        ),
        LoadMore::Idle if page.has_more() => {
            let total = match &page.view {
                ResultsView::Loaded { total, .. } => *total,
                _ => 0,
            };
            (
                format!("n Load more ({loaded} of {total})"),
                Style::default().fg(theme.accent),
            )
        }
        LoadMore::Idle => (
            format!("All {loaded} results loaded"),
            Style::default().fg(theme.muted),
        ),
    }
}

pub fn accuracy_color(theme: &Theme, accuracy: Accuracy) -> Color {
    match accuracy {
        Accuracy::Correct => theme.correct,
        Accuracy::MissedDraw => theme.missed_draw,
        Accuracy::Wrong => theme.wrong,
    }
}

fn results_columns() -> [Constraint; 6] {
    [
        Constraint::Length(17),
        Constraint::Length(2),
        Constraint::Min(24),
        Constraint::Length(7),
        Constraint::Length(11),
        Constraint::Length(16),
    ]
}

fn render_results_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    render_cell_text(frame, cols[0], "Date", style);
    render_cell_text(frame, cols[2], "Match", style);
    render_cell_text(frame, cols[3], "Score", style);
    render_cell_text(frame, cols[4], "Predicted", style);
    render_cell_text(frame, cols[5], "H/D/A %", style);
}

fn render_match(frame: &mut Frame, area: Rect, page: &MatchPage, theme: &Theme) {
    let (card, prediction) = match &page.view {
        MatchView::Loading => {
            return render_notice(
                frame,
                area,
                "Loading match...",
                Style::default().fg(theme.muted),
            );
        }
        MatchView::NotFound => {
            return render_notice(
                frame,
                area,
                &format!("Match {} not found", page.match_id),
                Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD),
            );
        }
        MatchView::Failed(message) => {
            return render_notice(
                frame,
                area,
                message,
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
            );
        }
        MatchView::Found { card, prediction } => (card, prediction),
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let summary = Paragraph::new(match_card_text(card))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Match").borders(Borders::ALL));
    frame.render_widget(summary, columns[0]);

    match prediction {
        PredictionSlot::Ready(prediction) => {
            render_prediction_card(frame, columns[1], card, prediction, theme)
        }
        PredictionSlot::Failed(message) => {
            let failed = Paragraph::new(message.clone())
                .style(Style::default().fg(theme.error))
                .wrap(Wrap { trim: true })
                .block(Block::default().title("Prediction").borders(Borders::ALL));
            frame.render_widget(failed, columns[1]);
        }
    }
}

pub fn match_card_text(card: &MatchCard) -> String {
    let mut lines = vec![format!("{} vs {}", card.home.name, card.away.name)];
    if let Some(score) = card.score {
        lines.push(format!("Score: {} - {}", score.home, score.away));
    }
    lines.push(format!("Kickoff: {}", format_kickoff(&card.kickoff)));
    lines.push(format!(
        "Venue: {}",
        card.venue.as_deref().unwrap_or("TBD")
    ));
    lines.push(format!("Status: {}", card.status));
    if let Some(matchday) = card.matchday {
        lines.push(format!("Matchday: {matchday}"));
    }
    if let Some(competition) = &card.competition {
        lines.push(format!("Competition: {competition}"));
    }
    lines.join("\n")
}

fn render_prediction_card(
    frame: &mut Frame,
    area: Rect,
    card: &MatchCard,
    prediction: &Prediction,
    theme: &Theme,
) {
    let block = Block::default().title("Prediction").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(inner);

    let lines: Vec<Line> = prediction_rows(card, prediction)
        .into_iter()
        .map(|(text, best)| {
            if best {
                Line::from(Span::styled(
                    format!("▶ {text}"),
                    Style::default()
                        .fg(theme.highlight)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::raw(format!("  {text}"))
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), rows[0]);

    if rows[1].height > 0 {
        frame.render_widget(win_bar_chart(prediction, theme), rows[1]);
    }
}

/// Text of each outcome row and whether it is the predicted one.
pub fn prediction_rows(card: &MatchCard, prediction: &Prediction) -> Vec<(String, bool)> {
    let best = prediction.predicted_outcome();
    [
        (Outcome::Home, format!("{} win", card.home.name)),
        (Outcome::Draw, "Draw".to_string()),
        (Outcome::Away, format!("{} win", card.away.name)),
    ]
    .into_iter()
    .map(|(outcome, name)| {
        let pct = prediction.probability(outcome) * 100.0;
        (format!("{name}: {pct:.1}%"), outcome == best)
    })
    .collect()
}

fn win_bar_chart(prediction: &Prediction, theme: &Theme) -> BarChart<'static> {
    let pct = |p: f64| (p * 100.0).round().clamp(0.0, 100.0) as u64;
    let home = Bar::default()
        .value(pct(prediction.home_win_probability))
        .label("H".into())
        .style(Style::default().fg(theme.correct));
    let draw = Bar::default()
        .value(pct(prediction.draw_probability))
        .label("D".into())
        .style(Style::default().fg(theme.highlight));
    let away = Bar::default()
        .value(pct(prediction.away_win_probability))
        .label("A".into())
        .style(Style::default().fg(theme.wrong));

    BarChart::default()
        .data(BarGroup::default().bars(&[home, draw, away]))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(0)
        .max(100)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(CONSOLE_LINES);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1.min(area.height),
    };
    let paragraph = Paragraph::new(text.to_string()).style(style);
    frame.render_widget(paragraph, text_area);
}

fn render_vseparator(frame: &mut Frame, area: Rect, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let mut text = String::new();
    for i in 0..area.height {
        if i > 0 {
            text.push('\n');
        }
        text.push('│');
    }
    frame.render_widget(Paragraph::new(text).style(style), area);
}

pub fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Match Predictor - Help",
        "",
        "Global:",
        "  1            Fixtures",
        "  2            Results",
        "  Enter        Open selected match",
        "  b / Esc      Back",
        "  r            Refresh",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Fixtures:",
        "  [ / ]        Previous / next matchday",
        "  m            Current matchday",
        "",
        "Results:",
        "  n            Load more",
        "  green = correct, orange = missed draw, red = wrong",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
