use crate::game::{GameEngine, Outcome, Side};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::board_widget::{self, BoardHighlights};

pub fn side_color(side: Side) -> Color {
    match side {
        Side::White => Color::White,
        Side::Black => Color::LightRed,
    }
}

pub fn render(
    frame: &mut Frame,
    engine: &GameEngine,
    highlights: &BoardHighlights,
    message: &Option<String>,
    game_mode: &str,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Board
            Constraint::Length(3), // Message
            Constraint::Length(4), // Controls
        ])
        .split(frame.area());

    render_header(frame, engine, game_mode, chunks[0]);
    board_widget::render_board(frame, engine.board(), highlights, chunks[1]);
    render_message(frame, message, chunks[2]);
    render_controls(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, engine: &GameEngine, game_mode: &str, area: Rect) {
    let (status, color) = match engine.outcome() {
        Outcome::InProgress => (
            format!("To move: {}  |  {}", engine.turn(), game_mode),
            side_color(engine.turn()),
        ),
        Outcome::Draw => (format!("Draw  |  {}", game_mode), Color::Yellow),
        outcome => (
            format!("{}  |  {}", outcome, game_mode),
            outcome.winner().map_or(Color::Yellow, side_color),
        ),
    };

    let header = Paragraph::new(status)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Hexapawn"));

    frame.render_widget(header, area);
}

fn render_message(frame: &mut Frame, message: &Option<String>, area: Rect) {
    let text = message.as_deref().unwrap_or("");
    let msg_widget = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let line1 = Line::from("Arrows: Move cursor  |  Enter: Select / Move  |  Esc: Cancel / Menu");
    let line2 = Line::from("R: Restart  |  Q: Quit");

    let controls = Paragraph::new(vec![line1, line2])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(controls, area);
}

/// Main menu with the entries the app understands.
pub fn render_menu(frame: &mut Frame, message: &Option<String>, table_entries: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Entries
            Constraint::Length(3), // Message
        ])
        .split(frame.area());

    let header = Paragraph::new("Hexapawn with a self-taught opponent")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Hexapawn"));
    frame.render_widget(header, chunks[0]);

    let key = |k: &'static str| {
        Span::styled(k, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    };
    let entries = vec![
        Line::from(vec![key("1"), Span::raw("  Play White against the AI")]),
        Line::from(vec![key("2"), Span::raw("  Two players")]),
        Line::from(vec![key("T"), Span::raw("  Train the AI by self-play")]),
        Line::from(vec![key("X"), Span::raw("  Reset everything the AI learned")]),
        Line::from(vec![key("Q"), Span::raw("  Quit")]),
        Line::from(""),
        Line::from(Span::styled(
            format!("Black's table: {table_entries} entries"),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let menu = Paragraph::new(entries)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Menu"));
    frame.render_widget(menu, chunks[1]);

    render_message(frame, message, chunks[2]);
}
