use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    rules::Rules,
    session::{Alert, AlertAction, Phase, SessionState},
};

const HORIZONTAL_MARGIN: u16 = 2;
const SOURCE_PADDING: u16 = 6;
const ALERT_WIDTH: u16 = 48;
const ALERT_HEIGHT: u16 = 7;

pub const HINTS: &str = "[←/y] correct   [→/n] wrong   [s] new game   [esc] quit";

pub fn action_key(action: AlertAction) -> char {
    match action {
        AlertAction::CloseApp => 'q',
        AlertAction::Restart => 'r',
    }
}

pub fn action_for_key(c: char) -> Option<AlertAction> {
    [AlertAction::CloseApp, AlertAction::Restart]
        .into_iter()
        .find(|action| action_key(*action) == c)
}

/// The whole quiz screen for one session state
pub struct QuizView<'a> {
    state: &'a SessionState,
    rules: &'a Rules,
}

impl<'a> QuizView<'a> {
    pub fn new(state: &'a SessionState, rules: &'a Rules) -> Self {
        Self { state, rules }
    }
}

impl Widget for QuizView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(4), // scores
                Constraint::Min(1),    // falling translation
                Constraint::Length(3), // source word
                Constraint::Length(1), // padding
                Constraint::Length(1), // hints
            ])
            .split(area);

        render_scores(state, chunks[0], buf, bold_style);

        if state.awaiting_restart_signal {
            centered_message("Press any key to play again", chunks[1], buf, bold_style);
        } else if state.phase == Phase::Idle && state.tasks.is_empty() {
            centered_message(
                "Nothing to display. Press s to start a new game.",
                chunks[1],
                buf,
                bold_style,
            );
        } else if !state.current_source.is_empty() {
            render_translation(state, self.rules, chunks[1], buf, bold_style);
            render_source(&state.current_source, chunks[2], buf);
        }

        Paragraph::new(Span::styled(HINTS, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        if let Some(alert) = &state.pending_alert {
            render_alert(alert, area, buf);
        }
    }
}

fn render_scores(state: &SessionState, area: Rect, buf: &mut Buffer, style: Style) {
    let lines = vec![
        Line::from(Span::styled(
            format!("Correct attempts: {}", state.correct_count),
            style.fg(Color::Green),
        )),
        Line::from(Span::styled(
            format!("Wrong attempts: {}", state.wrong_count),
            style.fg(Color::Red),
        )),
    ];
    let width = 24.min(area.width);
    let panel = Rect {
        x: area.right().saturating_sub(width),
        width,
        ..area
    };
    Paragraph::new(lines)
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL))
        .render(panel, buf);
}

// The translation drifts from the top of its area to the bottom as the attempt runs out.
fn render_translation(
    state: &SessionState,
    rules: &Rules,
    area: Rect,
    buf: &mut Buffer,
    style: Style,
) {
    if area.height == 0 {
        return;
    }
    let span = u32::from(area.height - 1);
    let elapsed = state.timer_ticks.min(rules.max_attempt_time);
    let offset = (span * elapsed / rules.max_attempt_time.max(1)) as u16;

    let line = Rect {
        y: area.y + offset,
        height: 1,
        ..area
    };
    Paragraph::new(Span::styled(state.current_translation.as_str(), style))
        .alignment(Alignment::Center)
        .render(line, buf);
}

fn render_source(source: &str, area: Rect, buf: &mut Buffer) {
    let width = (source.width() as u16)
        .saturating_add(SOURCE_PADDING)
        .min(area.width);
    let boxed = Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    };
    Paragraph::new(source)
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL))
        .render(boxed, buf);
}

fn centered_message(text: &str, area: Rect, buf: &mut Buffer, style: Style) {
    if area.height == 0 {
        return;
    }
    let line = Rect {
        y: area.y + area.height / 2,
        height: 1,
        ..area
    };
    Paragraph::new(Span::styled(text, style))
        .alignment(Alignment::Center)
        .render(line, buf);
}

fn render_alert(alert: &Alert, area: Rect, buf: &mut Buffer) {
    let popup = centered_rect(ALERT_WIDTH, ALERT_HEIGHT, area);
    let buttons = alert
        .actions
        .iter()
        .map(|action| format!("[{}] {}", action_key(*action), action))
        .join("   ");

    let text = vec![
        Line::from(alert.message()),
        Line::from(""),
        Line::from(Span::styled(
            buttons,
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    Clear.render(popup, buf);
    Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Alert::TITLE)
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow)),
        )
        .render(popup, buf);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
