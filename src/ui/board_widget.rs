use crate::game::{Board, Cell, Position, BOARD_SIZE};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Highlights drawn on top of the board.
#[derive(Debug, Clone, Default)]
pub struct BoardHighlights {
    pub cursor: Option<Position>,
    pub selected: Option<Position>,
    pub destinations: Vec<Position>,
}

fn cell_span(cell: Cell, pos: Position, highlights: &BoardHighlights) -> Span<'static> {
    let (symbol, fg) = match cell {
        Cell::Empty => (" · ", Color::DarkGray),
        Cell::White => (" \u{2659} ", Color::White),
        Cell::Black => (" \u{265f} ", Color::LightRed),
    };
    let mut style = Style::default().fg(fg).add_modifier(Modifier::BOLD);
    if highlights.selected == Some(pos) {
        style = style.bg(Color::Blue);
    } else if highlights.destinations.contains(&pos) {
        style = style.bg(Color::Green);
    }
    if highlights.cursor == Some(pos) {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(symbol, style)
}

/// Board lines with row and column indices, row 0 at the top.
pub fn board_lines(board: &Board, highlights: &BoardHighlights) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let mut header = vec![Span::raw("    ")];
    for col in 0..BOARD_SIZE {
        header.push(Span::styled(format!(" {col} "), Style::default().fg(Color::Cyan)));
    }
    lines.push(Line::from(header));
    lines.push(Line::from("   ╔═════════╗"));

    for (row, cells) in board.rows().iter().enumerate() {
        let mut spans = vec![
            Span::styled(format!(" {row} "), Style::default().fg(Color::Cyan)),
            Span::raw("║"),
        ];
        for (col, &cell) in cells.iter().enumerate() {
            let pos = Position { row, col };
            spans.push(cell_span(cell, pos, highlights));
        }
        spans.push(Span::raw("║"));
        lines.push(Line::from(spans));
    }

    lines.push(Line::from("   ╚═════════╝"));
    lines
}

/// Render the board centered in `area`.
pub fn render_board(frame: &mut Frame, board: &Board, highlights: &BoardHighlights, area: Rect) {
    let widget = Paragraph::new(board_lines(board, highlights)).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}
