//! Input mapping and timer bookkeeping around a [`Game`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::game::{Action, Game, GameEvent};
use crate::piece::{PieceProvider, RandomPieceProvider};
use crate::settings::{self, Settings};
use crate::timer::GravityTimer;

/// Everything a key can trigger.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Play(Action),
    StartPause,
    Restart,
    Quit,
}

/// Parses a key name such as `"Left"`, `"Space"` or `"p"`.
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let code = match name.to_lowercase().as_str() {
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "space" => KeyCode::Char(' '),
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "esc" | "escape" => KeyCode::Esc,
        _ => {
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c.to_ascii_lowercase()),
                _ => return None,
            }
        }
    };
    Some(code)
}

/// Resolved key table. Unknown key names are skipped with a log line.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: Vec<(KeyCode, Command)>,
}

impl KeyMap {
    pub fn from_settings(keys: &settings::KeyBindings) -> Self {
        let table: [(&[String], Command); 9] = [
            (keys.move_left.as_slice(), Command::Play(Action::MoveLeft)),
            (keys.move_right.as_slice(), Command::Play(Action::MoveRight)),
            (keys.soft_drop.as_slice(), Command::Play(Action::SoftDrop)),
            (keys.rotate.as_slice(), Command::Play(Action::Rotate)),
            (keys.hard_drop.as_slice(), Command::Play(Action::HardDrop)),
            (keys.pause.as_slice(), Command::Play(Action::TogglePause)),
            (keys.start.as_slice(), Command::StartPause),
            (keys.restart.as_slice(), Command::Restart),
            (keys.quit.as_slice(), Command::Quit),
        ];

        let mut bindings = Vec::new();
        for (names, command) in table {
            for name in names {
                match parse_key(name) {
                    Some(code) => bindings.push((code, command)),
                    None => debug!(key = %name, ?command, "ignoring unknown key name"),
                }
            }
        }
        Self { bindings }
    }

    /// Letters match regardless of case.
    pub fn lookup(&self, code: KeyCode) -> Option<Command> {
        let code = match code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|(_, command)| *command)
    }

    /// Display names of every key bound to `command`, joined with `/`.
    pub fn label(&self, command: Command) -> Option<String> {
        let names: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, bound)| *bound == command)
            .map(|(code, _)| key_label(*code))
            .collect();
        (!names.is_empty()).then(|| names.join("/"))
    }
}

fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        other => format!("{other:?}"),
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_settings(&settings::KeyBindings::default())
    }
}

/// Owns the game and its gravity timer and keeps them in step.
pub struct App {
    pub game: Game,
    pub timer: GravityTimer,
    keymap: KeyMap,
    should_quit: bool,
}

impl App {
    pub fn new(game: Game, timer: GravityTimer, keymap: KeyMap) -> Self {
        Self {
            game,
            timer,
            keymap,
            should_quit: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let gameplay = &settings.gameplay;
        let provider: Box<dyn PieceProvider> = match gameplay.seed {
            Some(seed) => Box::new(RandomPieceProvider::seeded(seed)),
            None => Box::new(RandomPieceProvider::new()),
        };
        Self::new(
            Game::with_dimensions(gameplay.rows, gameplay.cols, provider),
            GravityTimer::new(Duration::from_millis(gameplay.tick_ms)),
            KeyMap::from_settings(&settings.keys),
        )
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if let Some(command) = self.keymap.lookup(key.code) {
            self.execute(command, now);
        }
    }

    pub fn execute(&mut self, command: Command, now: Instant) {
        match command {
            Command::Play(action) => self.game.handle_action(action),
            Command::StartPause => self.game.start_or_toggle_pause(),
            Command::Restart => self.game.restart(),
            Command::Quit => {
                info!(score = self.game.score(), "quit requested");
                self.should_quit = true;
            }
        }
        self.sync(now);
    }

    /// Runs the gravity tick if one has come due.
    pub fn update(&mut self, now: Instant) {
        if self.timer.poll(now) {
            self.game.tick();
            self.sync(now);
        }
    }

    /// How long the caller may block waiting for input.
    pub fn poll_timeout(&self, now: Instant, idle: Duration) -> Duration {
        self.timer.time_until_next(now).unwrap_or(idle)
    }

    /// Drains game events. Starting schedules a fresh timer; game over stops it.
    fn sync(&mut self, now: Instant) {
        for event in self.game.take_events() {
            match event {
                GameEvent::GameStarted => self.timer.start(now),
                GameEvent::GameOver => {
                    self.timer.stop();
                    info!(
                        score = self.game.score(),
                        lines = self.game.lines(),
                        "game over"
                    );
                }
                GameEvent::LinesCleared(n) => debug!(n, "lines cleared"),
                _ => {}
            }
        }
    }
}
