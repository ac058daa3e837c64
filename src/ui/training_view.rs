use std::collections::VecDeque;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Sparkline},
    Frame,
};

use crate::training::{TrainingProgress, TrainingSummary};

const MAX_HISTORY: usize = 200;

/// Status of the training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingStatus {
    Running,
    Cancelled,
    Finished,
}

/// What the training screen shows.
pub struct TrainingScreen {
    pub status: TrainingStatus,
    pub total_episodes: usize,
    pub latest: Option<TrainingProgress>,
    /// Black win rate per report, in percent.
    pub black_win_history: VecDeque<u64>,
    pub summary: Option<TrainingSummary>,
    pub error: Option<String>,
}

impl TrainingScreen {
    pub fn new(total_episodes: usize) -> Self {
        TrainingScreen {
            status: TrainingStatus::Running,
            total_episodes,
            latest: None,
            black_win_history: VecDeque::new(),
            summary: None,
            error: None,
        }
    }

    pub fn record(&mut self, progress: TrainingProgress) {
        self.black_win_history
            .push_back((progress.black_win_rate * 100.0).round() as u64);
        if self.black_win_history.len() > MAX_HISTORY {
            self.black_win_history.pop_front();
        }
        self.latest = Some(progress);
    }

    pub fn finish(&mut self, summary: TrainingSummary) {
        self.status = if summary.cancelled {
            TrainingStatus::Cancelled
        } else {
            TrainingStatus::Finished
        };
        self.summary = Some(summary);
    }

    pub fn progress(&self) -> f64 {
        let done = match (&self.summary, &self.latest) {
            (Some(summary), _) => summary.episodes_completed,
            (None, Some(latest)) => latest.completed,
            (None, None) => 0,
        };
        if self.total_episodes == 0 {
            return 0.0;
        }
        done as f64 / self.total_episodes as f64
    }
}

/// Render the training screen.
pub fn render(frame: &mut Frame, screen: &TrainingScreen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Progress gauge
            Constraint::Min(8),    // Stats
            Constraint::Length(5), // Black win rate sparkline
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    render_header(frame, screen, chunks[0]);
    render_progress_gauge(frame, screen, chunks[1]);
    render_stats_panel(frame, screen, chunks[2]);
    render_win_sparkline(frame, screen, chunks[3]);
    render_footer(frame, screen, chunks[4]);
}

fn render_header(frame: &mut Frame, screen: &TrainingScreen, area: Rect) {
    let (status_str, status_color) = match screen.status {
        TrainingStatus::Running => ("RUNNING", Color::Green),
        TrainingStatus::Cancelled => ("CANCELLED", Color::Yellow),
        TrainingStatus::Finished => ("FINISHED", Color::Cyan),
    };

    let header_text = Line::from(vec![
        Span::styled(
            "Self-play training",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  ["),
        Span::styled(status_str, Style::default().fg(status_color).add_modifier(Modifier::BOLD)),
        Span::raw("]"),
    ]);

    let header = Paragraph::new(header_text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn render_progress_gauge(frame: &mut Frame, screen: &TrainingScreen, area: Rect) {
    let progress = screen.progress();
    let label = format!(
        "{:.0}/{} ({:.1}%)",
        progress * screen.total_episodes as f64,
        screen.total_episodes,
        progress * 100.0
    );

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Blue))
        .ratio(progress.clamp(0.0, 1.0))
        .label(label);

    frame.render_widget(gauge, area);
}

fn stat_line(label: &'static str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::White)),
        Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

fn render_stats_panel(frame: &mut Frame, screen: &TrainingScreen, area: Rect) {
    let mut lines = Vec::new();

    match &screen.latest {
        Some(p) => {
            lines.push(stat_line("White wins:  ", format!("{:.1}%", p.white_win_rate * 100.0), Color::White));
            lines.push(stat_line("Black wins:  ", format!("{:.1}%", p.black_win_rate * 100.0), Color::LightRed));
            lines.push(stat_line("Draws:       ", format!("{:.1}%", p.draw_rate * 100.0), Color::Yellow));
            lines.push(stat_line("Avg Length:  ", format!("{:.1}", p.average_game_length), Color::Gray));
            lines.push(stat_line(
                "Entries:     ",
                format!("{} white / {} black", p.white_entries, p.black_entries),
                Color::Gray,
            ));
        }
        None => lines.push(Line::from(Span::styled(
            "Waiting for first report...",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    if let Some(summary) = &screen.summary {
        lines.push(Line::from(""));
        lines.push(stat_line(
            "Totals:      ",
            format!(
                "white {} | black {} | draw {}",
                summary.white_wins, summary.black_wins, summary.draws
            ),
            Color::Cyan,
        ));
        if let Some(eval) = summary.black_eval {
            lines.push(stat_line(
                "Black vs Random: ",
                format!("{:.1}%", eval.win_rate() * 100.0),
                Color::Cyan,
            ));
        }
    }

    if let Some(error) = &screen.error {
        lines.push(Line::from(""));
        lines.push(stat_line("Error: ", error.clone(), Color::Red));
    }

    let stats = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Stats"));
    frame.render_widget(stats, area);
}

fn render_win_sparkline(frame: &mut Frame, screen: &TrainingScreen, area: Rect) {
    let data: Vec<u64> = screen.black_win_history.iter().copied().collect();

    let sparkline = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title("Black win rate"))
        .data(&data)
        .max(100)
        .style(Style::default().fg(Color::Magenta));

    frame.render_widget(sparkline, area);
}

fn render_footer(frame: &mut Frame, screen: &TrainingScreen, area: Rect) {
    let text = match screen.status {
        TrainingStatus::Running => "Esc: Stop after the current episode",
        TrainingStatus::Cancelled | TrainingStatus::Finished => "Any key: Back to menu",
    };
    let footer = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(footer, area);
}
