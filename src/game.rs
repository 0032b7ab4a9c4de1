use tracing::debug;

use crate::grid::{collides, CellState, Grid, DEFAULT_COLS, DEFAULT_ROWS};
use crate::piece::{Piece, PieceProvider, RandomPieceProvider};
use crate::scoring::Scoreboard;

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameMode {
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Discrete player input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    TogglePause,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    GameStarted,
    PieceSpawned,
    PieceMoved,
    PieceRotated,
    HardDropped(u32),
    PieceLocked,
    LinesCleared(u32),
    ScoreChanged,
    Paused,
    Resumed,
    GameOver,
}

// ============================================================================
// Game
// ============================================================================

/// One play session: the board, the active piece, the counters and the mode.
///
/// There is an active piece exactly while the mode is `Running` or `Paused`.
pub struct Game {
    pub grid: Grid,
    pub current_piece: Option<Piece>,
    pub scoreboard: Scoreboard,
    pub mode: GameMode,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_provider(Box::new(RandomPieceProvider::new()))
    }

    pub fn with_provider(provider: Box<dyn PieceProvider>) -> Self {
        Self::with_dimensions(DEFAULT_ROWS, DEFAULT_COLS, provider)
    }

    /// An idle game on a `rows` x `cols` board. The size holds across restarts.
    pub fn with_dimensions(rows: usize, cols: usize, provider: Box<dyn PieceProvider>) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            current_piece: None,
            scoreboard: Scoreboard::default(),
            mode: GameMode::Idle,
            piece_provider: provider,
            events: Vec::new(),
        }
    }

    /// A running game over a prepared board, with `current_piece` already active.
    pub fn with_grid(grid: Grid, current_piece: Piece) -> Self {
        Self {
            grid,
            current_piece: Some(current_piece),
            scoreboard: Scoreboard::default(),
            mode: GameMode::Running,
            piece_provider: Box::new(RandomPieceProvider::new()),
            events: Vec::new(),
        }
    }

    pub fn score(&self) -> u32 {
        self.scoreboard.score
    }

    pub fn lines(&self) -> u32 {
        self.scoreboard.lines
    }

    pub fn is_game_over(&self) -> bool {
        self.mode == GameMode::GameOver
    }

    // ------------------------------------------------------------------------
    // Mode transitions
    // ------------------------------------------------------------------------

    /// Clears the board and counters, then spawns the first piece.
    pub fn start(&mut self) {
        self.grid = Grid::new(self.grid.rows(), self.grid.cols());
        self.scoreboard.reset();
        self.current_piece = None;
        self.events.clear();
        self.mode = GameMode::Running;
        debug!(rows = self.grid.rows(), cols = self.grid.cols(), "game started");
        self.events.push(GameEvent::GameStarted);
        self.events.push(GameEvent::ScoreChanged);
        self.spawn_next_piece();
    }

    /// Full reset from any mode.
    pub fn restart(&mut self) {
        self.start();
    }

    /// Start/Pause control: starts a fresh game from Idle or GameOver, otherwise toggles pause.
    pub fn start_or_toggle_pause(&mut self) {
        match self.mode {
            GameMode::Idle | GameMode::GameOver => self.start(),
            GameMode::Running | GameMode::Paused => self.toggle_pause(),
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.mode {
            GameMode::Running => {
                self.mode = GameMode::Paused;
                debug!("paused");
                self.events.push(GameEvent::Paused);
            }
            GameMode::Paused => {
                self.mode = GameMode::Running;
                debug!("resumed");
                self.events.push(GameEvent::Resumed);
            }
            // Nothing to pause before the first start or after the board overflows
            GameMode::Idle | GameMode::GameOver => {}
        }
    }

    pub fn start_pause_label(&self) -> &'static str {
        match self.mode {
            GameMode::Idle | GameMode::GameOver => "Start Game",
            GameMode::Paused => "Resume",
            GameMode::Running => "Pause",
        }
    }

    // ------------------------------------------------------------------------
    // Piece lifecycle
    // ------------------------------------------------------------------------

    /// Draws the next piece at the spawn position. A collision there ends the game.
    pub fn spawn_next_piece(&mut self) {
        let kind = self.piece_provider.next_piece();
        let piece = Piece::spawn(kind, self.grid.cols());

        if collides(&self.grid, &piece.shape, piece.x, piece.y) {
            debug!(?kind, score = self.scoreboard.score, "spawn blocked, game over");
            self.current_piece = None;
            self.mode = GameMode::GameOver;
            self.events.push(GameEvent::GameOver);
            return;
        }

        debug!(?kind, x = piece.x, "spawned");
        self.current_piece = Some(piece);
        self.events.push(GameEvent::PieceSpawned);
    }

    /// Shifts the piece one column. Blocked moves leave it where it is.
    pub fn move_piece(&mut self, dir: i32) -> bool {
        if self.mode != GameMode::Running {
            return false;
        }
        let Some(piece) = self.current_piece.as_mut() else {
            return false;
        };
        if collides(&self.grid, &piece.shape, piece.x + dir, piece.y) {
            return false;
        }
        piece.x += dir;
        self.events.push(GameEvent::PieceMoved);
        true
    }

    /// Clockwise rotation in place; rejected when the rotated shape would collide.
    pub fn rotate_piece(&mut self) -> bool {
        if self.mode != GameMode::Running {
            return false;
        }
        let Some(piece) = self.current_piece.as_mut() else {
            return false;
        };
        let rotated = piece.shape.rotated();
        if collides(&self.grid, &rotated, piece.x, piece.y) {
            return false;
        }
        piece.shape = rotated;
        self.events.push(GameEvent::PieceRotated);
        true
    }

    /// One row down, or lock when the piece has landed.
    pub fn soft_drop(&mut self) {
        if self.mode != GameMode::Running {
            return;
        }
        if !self.step_down() {
            self.lock_and_spawn();
        }
    }

    /// Drops to the resting row, 2 points per row, then locks.
    pub fn hard_drop(&mut self) {
        if self.mode != GameMode::Running {
            return;
        }
        let mut rows = 0;
        while self.step_down() {
            self.scoreboard.record_hard_drop_row();
            rows += 1;
        }
        self.events.push(GameEvent::HardDropped(rows));
        self.lock_and_spawn();
        self.events.push(GameEvent::ScoreChanged);
    }

    /// Gravity. Ignored unless running, so a timer left going during pause does nothing.
    pub fn tick(&mut self) {
        if self.mode != GameMode::Running {
            return;
        }
        if !self.step_down() {
            self.lock_and_spawn();
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match (self.mode, action) {
            (GameMode::Idle | GameMode::GameOver, _) => {}
            (GameMode::Paused, Action::TogglePause) => self.toggle_pause(),
            (GameMode::Paused, _) => {}
            (GameMode::Running, Action::MoveLeft) => {
                self.move_piece(-1);
            }
            (GameMode::Running, Action::MoveRight) => {
                self.move_piece(1);
            }
            (GameMode::Running, Action::SoftDrop) => self.soft_drop(),
            (GameMode::Running, Action::Rotate) => {
                self.rotate_piece();
            }
            (GameMode::Running, Action::HardDrop) => self.hard_drop(),
            (GameMode::Running, Action::TogglePause) => self.toggle_pause(),
        }
    }

    fn step_down(&mut self) -> bool {
        let Some(piece) = self.current_piece.as_mut() else {
            return false;
        };
        if collides(&self.grid, &piece.shape, piece.x, piece.y + 1) {
            return false;
        }
        piece.y += 1;
        true
    }

    fn lock_and_spawn(&mut self) {
        let Some(piece) = self.current_piece.take() else {
            return;
        };
        self.grid.merge(&piece);
        self.events.push(GameEvent::PieceLocked);

        let lines = self.grid.clear_lines();
        if lines > 0 {
            let points = self.scoreboard.record_clear(lines);
            debug!(lines, points, total = self.scoreboard.score, "lines cleared");
            self.events.push(GameEvent::LinesCleared(lines));
            self.events.push(GameEvent::ScoreChanged);
        }

        self.spawn_next_piece();
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    /// Returns the visual grid state with the current piece overlaid
    pub fn render_grid(&self) -> Vec<Vec<CellState>> {
        let mut visual: Vec<Vec<CellState>> =
            self.grid.iter_rows().map(<[CellState]>::to_vec).collect();

        if let Some(piece) = &self.current_piece {
            for (x, y) in piece.cells() {
                if self.grid.get(x, y).is_some() {
                    visual[y as usize][x as usize] = CellState::Filled(piece.color);
                }
            }
        }

        visual
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::piece::PieceColor;

    pub fn empty_grid() -> Grid {
        Grid::new(DEFAULT_ROWS, DEFAULT_COLS)
    }

    pub fn fill_row(grid: &mut Grid, y: usize) {
        for x in 0..grid.cols() {
            grid.set(x, y, CellState::Filled(PieceColor::Purple));
        }
    }

    pub fn fill_row_with_gap(grid: &mut Grid, y: usize, gap_x: usize) {
        for x in 0..grid.cols() {
            if x != gap_x {
                grid.set(x, y, CellState::Filled(PieceColor::Purple));
            }
        }
    }
}
