use crate::ai::QLearningAgent;
use crate::checkpoint::{AgentId, TableStore};
use crate::config::AppConfig;
use crate::game::{GameEngine, Move, MoveError, Outcome, Position, Side, BOARD_SIZE};
use crate::training::{online, Trainer};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use std::io;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::board_widget::BoardHighlights;
use super::training_view::{self, TrainingScreen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    VsAgent,
    TwoPlayer,
}

impl Mode {
    fn label(self) -> &'static str {
        match self {
            Mode::VsAgent => "You (White) vs AI (Black)",
            Mode::TwoPlayer => "Two players",
        }
    }
}

enum Screen {
    Menu,
    Game,
    Training(TrainingScreen),
}

/// Black opponent with the episode count its table was loaded with.
struct Opponent {
    agent: QLearningAgent,
    episodes_trained: usize,
}

pub struct App {
    config: AppConfig,
    store: TableStore,
    screen: Screen,
    mode: Mode,
    engine: GameEngine,
    cursor: Position,
    selected: Option<Position>,
    opponent: Option<Opponent>,
    training_requested: bool,
    should_quit: bool,
    message: Option<String>,
    /// Entries in Black's saved table, as of the last save, reset or training run.
    black_entries: usize,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let store = TableStore::new(config.store.clone());
        let mut app = App {
            config,
            store,
            screen: Screen::Menu,
            mode: Mode::VsAgent,
            engine: GameEngine::new(),
            cursor: Position { row: 0, col: 1 },
            selected: None,
            opponent: None,
            training_requested: false,
            should_quit: false,
            message: None,
            black_entries: 0,
        };
        app.refresh_black_entries();
        app
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B::Error: Into<io::Error>,
    {
        loop {
            terminal.draw(|f| self.render(f)).map_err(Into::into)?;

            if self.should_quit {
                break;
            }

            if self.training_requested {
                self.training_requested = false;
                self.run_training(terminal)?;
                continue;
            }

            self.handle_events()?;
        }
        Ok(())
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Clear message on any key press
        self.message = None;

        match self.screen {
            Screen::Menu => self.handle_menu_key(key),
            Screen::Game => self.handle_game_key(key),
            Screen::Training(_) => self.screen = Screen::Menu,
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('1') => self.start_game(Mode::VsAgent),
            KeyCode::Char('2') => self.start_game(Mode::TwoPlayer),
            KeyCode::Char('t') | KeyCode::Char('T') => {
                self.screen = Screen::Training(TrainingScreen::new(self.config.training.num_episodes));
                self.training_requested = true;
            }
            KeyCode::Char('x') | KeyCode::Char('X') => self.reset_learning(),
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_game_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                if self.selected.take().is_none() {
                    self.leave_game();
                }
            }
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Right => self.move_cursor(0, 1),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate_cell(),
            KeyCode::Char('r') => {
                self.start_game(self.mode);
                self.message = Some("New game started!".to_string());
            }
            _ => {}
        }
    }

    fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        let row = self.cursor.row.saturating_add_signed(d_row).min(BOARD_SIZE - 1);
        let col = self.cursor.col.saturating_add_signed(d_col).min(BOARD_SIZE - 1);
        self.cursor = Position { row, col };
    }

    fn start_game(&mut self, mode: Mode) {
        self.mode = mode;
        self.engine = GameEngine::new();
        self.cursor = Position { row: 0, col: 1 };
        self.selected = None;
        self.opponent = match mode {
            Mode::VsAgent => {
                let loaded = self.store.load_or_empty(&AgentId::new(Side::Black));
                let episodes_trained = loaded.episodes_trained();
                Some(Opponent {
                    agent: QLearningAgent::new(Side::Black, self.config.agent.clone(), loaded.table),
                    episodes_trained,
                })
            }
            Mode::TwoPlayer => None,
        };
        self.screen = Screen::Game;
    }

    fn leave_game(&mut self) {
        self.opponent = None;
        self.screen = Screen::Menu;
    }

    fn is_human_turn(&self) -> bool {
        match self.mode {
            Mode::VsAgent => self.engine.turn() == Side::White,
            Mode::TwoPlayer => true,
        }
    }

    /// Enter on a cell: pick up one of the mover's pawns, or play the
    /// selected pawn to the cursor.
    fn activate_cell(&mut self) {
        if self.engine.is_terminal() {
            self.message = Some("Game over! Press 'r' to restart.".to_string());
            return;
        }
        if !self.is_human_turn() {
            return;
        }

        let turn = self.engine.turn();
        let on_own_pawn = self.engine.board().get(self.cursor).side() == Some(turn);

        match self.selected {
            Some(from) if from != self.cursor && !on_own_pawn => {
                self.play_human_move(Move::new(from, self.cursor));
            }
            Some(from) if from == self.cursor => self.selected = None,
            _ if on_own_pawn => {
                if self.destinations_from(self.cursor).is_empty() {
                    self.message = Some("That pawn cannot move.".to_string());
                } else {
                    self.selected = Some(self.cursor);
                }
            }
            _ => self.message = Some(format!("Select one of {}'s pawns.", turn)),
        }
    }

    fn destinations_from(&self, from: Position) -> Vec<Position> {
        self.engine
            .current_moves()
            .into_iter()
            .filter(|mv| mv.from == from)
            .map(|mv| mv.to)
            .collect()
    }

    fn play_human_move(&mut self, mv: Move) {
        match self.engine.apply_move(mv) {
            Ok(_) => {
                self.selected = None;
                if self.engine.is_terminal() {
                    if let Some(opponent) = self.opponent.as_mut() {
                        online::learn_from_game_end(&mut opponent.agent, &self.engine);
                    }
                    self.finish_game();
                } else if self.mode == Mode::VsAgent {
                    self.play_agent_move();
                }
            }
            Err(MoveError::Illegal { .. }) => {
                self.message = Some(format!("Illegal move: {mv}"));
            }
            Err(MoveError::GameOver(_)) => {
                self.message = Some("Game is over!".to_string());
            }
        }
    }

    fn play_agent_move(&mut self) {
        let Some(opponent) = self.opponent.as_mut() else {
            return;
        };
        match online::agent_move(&mut opponent.agent, &mut self.engine, true) {
            Ok(Some(mv)) => {
                self.message = Some(format!("AI played {mv}"));
                if self.engine.is_terminal() {
                    self.finish_game();
                }
            }
            Ok(None) => self.message = Some("AI has no move.".to_string()),
            Err(e) => self.message = Some(format!("AI error: {e}")),
        }
    }

    /// Announce the result and save what the opponent learned.
    fn finish_game(&mut self) {
        let mut text = match self.engine.outcome() {
            Outcome::Draw => "It's a draw!".to_string(),
            outcome => match outcome.winner() {
                Some(side) => format!("{} wins!", side.name()),
                None => return,
            },
        };

        if let Some(opponent) = &self.opponent {
            let id = AgentId::new(Side::Black);
            let agent = &opponent.agent;
            if let Err(e) = self.store.save(&id, agent.table(), agent.config(), opponent.episodes_trained) {
                text.push_str(&format!(" (could not save AI: {e})"));
            }
            self.refresh_black_entries();
        }
        self.message = Some(text);
    }

    fn reset_learning(&mut self) {
        self.message = Some(match self.store.reset_learning(&AgentId::self_play_pair()) {
            Ok(0) => "Nothing to reset.".to_string(),
            Ok(n) => format!("Deleted {n} learned table(s)."),
            Err(e) => format!("Reset failed: {e}"),
        });
        self.refresh_black_entries();
    }

    /// Run self-play training, redrawing the progress screen at every
    /// report. Esc stops the run between episodes.
    fn run_training<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B::Error: Into<io::Error>,
    {
        let Screen::Training(mut screen) = std::mem::replace(&mut self.screen, Screen::Menu) else {
            return Ok(());
        };

        let trainer = Trainer::new(
            self.config.training.clone(),
            self.config.agent.clone(),
            TableStore::new(self.config.store.clone()),
        );
        let cancel = trainer.cancel_flag();
        let mut ui_error: Option<io::Error> = None;

        let result = trainer.train_self_play(self.config.training.num_episodes, |progress| {
            screen.record(progress);
            if ui_error.is_some() {
                return;
            }
            if let Err(e) = terminal.draw(|f| training_view::render(f, &screen)) {
                ui_error = Some(e.into());
                return;
            }
            match poll_escape() {
                Ok(true) => cancel.store(true, Ordering::Relaxed),
                Ok(false) => {}
                Err(e) => ui_error = Some(e),
            }
        });

        match result {
            Ok(summary) => screen.finish(summary),
            Err(e) => {
                screen.status = training_view::TrainingStatus::Finished;
                screen.error = Some(e.to_string());
            }
        }
        self.screen = Screen::Training(screen);
        self.refresh_black_entries();

        match ui_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn refresh_black_entries(&mut self) {
        self.black_entries = self
            .store
            .load(&AgentId::new(Side::Black))
            .ok()
            .flatten()
            .map_or(0, |file| file.entries.len());
    }

    fn black_table_entries(&self) -> usize {
        match &self.opponent {
            Some(opponent) => opponent.agent.table().len(),
            None => self.black_entries,
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        match &self.screen {
            Screen::Menu => {
                super::game_view::render_menu(frame, &self.message, self.black_table_entries());
            }
            Screen::Game => {
                let highlights = BoardHighlights {
                    cursor: Some(self.cursor),
                    selected: self.selected,
                    destinations: self
                        .selected
                        .map(|from| self.destinations_from(from))
                        .unwrap_or_default(),
                };
                super::game_view::render(frame, &self.engine, &highlights, &self.message, self.mode.label());
            }
            Screen::Training(screen) => training_view::render(frame, screen),
        }
    }
}

/// Non-blocking check for a pending Esc key press.
fn poll_escape() -> io::Result<bool> {
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && key.code == KeyCode::Esc {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
