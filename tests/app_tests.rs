//! Tests for the application shell: gravity timer, key handling, settings and rendering

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::TestBackend, Terminal};
use serial_test::serial;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tetris::app::{App, Command, KeyMap};
use tetris::game::{Action, Game, GameMode};
use tetris::piece::{SequencePieceProvider, TetrominoType};
use tetris::settings::{Settings, CONFIG_ENV};
use tetris::timer::GravityTimer;
use tetris::ui;

const TICK: Duration = Duration::from_millis(1000);

fn o_only_app() -> App {
    let game = Game::with_provider(Box::new(SequencePieceProvider::new(vec![TetrominoType::O])));
    App::new(game, GravityTimer::new(TICK), KeyMap::default())
}

fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn piece_y(app: &App) -> i32 {
    app.game.current_piece.as_ref().unwrap().y
}

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tetris-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// Gravity Timer Tests
// ============================================================================

mod gravity_timer {
    use super::*;

    #[test]
    fn stopped_timer_never_fires() {
        let mut timer = GravityTimer::new(TICK);
        let now = Instant::now();

        assert!(!timer.is_running());
        assert!(!timer.poll(now + TICK * 5));
        assert_eq!(timer.time_until_next(now), None);
    }

    #[test]
    fn fires_once_per_interval() {
        let mut timer = GravityTimer::new(TICK);
        let start = Instant::now();
        timer.start(start);

        assert!(!timer.poll(start + Duration::from_millis(999)));
        assert!(timer.poll(start + TICK));
        assert!(!timer.poll(start + TICK + Duration::from_millis(10)));
        assert!(timer.poll(start + TICK * 4));
        assert!(!timer.poll(start + TICK * 5 - Duration::from_millis(1)));
    }

    #[test]
    fn stall_collapses_into_one_tick() {
        let mut timer = GravityTimer::new(TICK);
        let start = Instant::now();
        timer.start(start);

        let stalled = start + TICK * 30 + Duration::from_millis(400);
        assert!(timer.poll(stalled));
        assert!(!timer.poll(stalled));
        // Phase is kept: the next deadline is the 31st interval.
        assert_eq!(timer.time_until_next(stalled), Some(Duration::from_millis(600)));
    }

    #[test]
    fn restart_replaces_pending_deadline() {
        let mut timer = GravityTimer::new(TICK);
        let start = Instant::now();
        timer.start(start);

        let later = start + Duration::from_millis(900);
        timer.start(later);

        assert!(!timer.poll(start + TICK));
        assert_eq!(timer.time_until_next(later), Some(TICK));
        assert!(timer.poll(later + TICK));
    }
}

// ============================================================================
// App Tests
// ============================================================================

mod app {
    use super::*;

    #[test]
    fn start_key_starts_game_and_timer() {
        let mut app = o_only_app();
        let now = Instant::now();

        app.handle_key(press(KeyCode::Enter), now);

        assert_eq!(app.game.mode, GameMode::Running);
        assert!(app.timer.is_running());
        assert_eq!(app.poll_timeout(now, Duration::from_millis(250)), TICK);
    }

    #[test]
    fn idle_app_uses_idle_poll_timeout() {
        let app = o_only_app();
        let idle = Duration::from_millis(250);
        assert_eq!(app.poll_timeout(Instant::now(), idle), idle);
    }

    #[test]
    fn due_ticks_move_piece_down() {
        let mut app = o_only_app();
        let now = Instant::now();
        app.execute(Command::StartPause, now);

        for n in 1..=3 {
            app.update(now + TICK * n);
        }

        assert_eq!(piece_y(&app), 3);
    }

    #[test]
    fn stalled_loop_drops_one_row() {
        let mut app = o_only_app();
        let now = Instant::now();
        app.execute(Command::StartPause, now);

        app.update(now + TICK * 30);

        assert_eq!(piece_y(&app), 1);
        assert_eq!(app.game.mode, GameMode::Running);
    }

    #[test]
    fn pause_keeps_timer_running_but_ignores_ticks() {
        let mut app = o_only_app();
        let now = Instant::now();
        app.execute(Command::StartPause, now);
        app.handle_key(press(KeyCode::Char('p')), now);

        app.update(now + TICK * 2);

        assert_eq!(app.game.mode, GameMode::Paused);
        assert!(app.timer.is_running());
        assert_eq!(piece_y(&app), 0);

        app.execute(Command::StartPause, now + TICK * 2);
        app.update(now + TICK * 3);
        assert_eq!(piece_y(&app), 1);
    }

    #[test]
    fn game_over_stops_timer() {
        let mut app = o_only_app();
        let now = Instant::now();
        app.execute(Command::StartPause, now);

        for _ in 0..20 {
            app.handle_key(press(KeyCode::Char(' ')), now);
        }

        assert_eq!(app.game.mode, GameMode::GameOver);
        assert!(!app.timer.is_running());
    }

    #[test]
    fn restart_reschedules_timer() {
        let mut app = o_only_app();
        let start = Instant::now();
        app.execute(Command::StartPause, start);

        let later = start + Duration::from_millis(700);
        app.handle_key(press(KeyCode::Char('r')), later);

        // The first schedule's deadline no longer fires.
        app.update(start + TICK);
        assert_eq!(piece_y(&app), 0);
        app.update(later + TICK);
        assert_eq!(piece_y(&app), 1);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut app = o_only_app();
        let mut release = press(KeyCode::Enter);
        release.kind = KeyEventKind::Release;

        app.handle_key(release, Instant::now());

        assert_eq!(app.game.mode, GameMode::Idle);
    }

    #[test]
    fn movement_keys_reach_the_game() {
        let mut app = o_only_app();
        let now = Instant::now();
        app.execute(Command::StartPause, now);

        app.handle_key(press(KeyCode::Left), now);
        app.handle_key(press(KeyCode::Down), now);

        let piece = app.game.current_piece.as_ref().unwrap();
        assert_eq!((piece.x, piece.y), (4, 1));
    }

    #[test]
    fn quit_sets_flag() {
        let mut app = o_only_app();
        app.handle_key(press(KeyCode::Char('q')), Instant::now());
        assert!(app.should_quit());
    }

    #[test]
    fn custom_bindings_replace_defaults() {
        let settings = Settings::from_toml("[keys]\nrotate = \"w\"\n").unwrap();
        let keymap = KeyMap::from_settings(&settings.keys);

        assert_eq!(keymap.lookup(KeyCode::Char('w')), Some(Command::Play(Action::Rotate)));
        assert_eq!(keymap.lookup(KeyCode::Up), None);
    }
}

// ============================================================================
// Settings Tests
// ============================================================================

mod settings {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("tetris-tests-does-not-exist.toml");
        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!((settings.gameplay.rows, settings.gameplay.cols), (20, 12));
        assert_eq!(settings.gameplay.tick_ms, 1000);
    }

    #[test]
    fn file_values_override_defaults() {
        let path = temp_config("gameplay.toml", "[gameplay]\nrows = 16\ntick_ms = 500\nseed = 7\n");
        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.gameplay.rows, 16);
        assert_eq!(settings.gameplay.cols, 12);
        assert_eq!(settings.gameplay.tick_ms, 500);
        assert_eq!(settings.gameplay.seed, Some(7));
    }

    #[test]
    fn invalid_file_reports_path() {
        let path = temp_config("broken.toml", "[gameplay]\nrows = \"many\"\n");
        let err = Settings::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }

    #[test]
    #[serial]
    fn env_var_selects_config_file() {
        let path = temp_config("env.toml", "[gameplay]\ncols = 8\n");
        std::env::set_var(CONFIG_ENV, &path);

        let settings = Settings::load(None);
        std::env::remove_var(CONFIG_ENV);

        assert_eq!(settings.unwrap().gameplay.cols, 8);
    }

    #[test]
    #[serial]
    fn explicit_path_wins_over_env_var() {
        let env_path = temp_config("env-loses.toml", "[gameplay]\ncols = 8\n");
        let explicit = temp_config("explicit.toml", "[gameplay]\ncols = 10\n");
        std::env::set_var(CONFIG_ENV, &env_path);

        let settings = Settings::load(Some(&explicit));
        std::env::remove_var(CONFIG_ENV);

        assert_eq!(settings.unwrap().gameplay.cols, 10);
    }

    #[test]
    fn app_from_settings_uses_board_size() {
        let settings = Settings::from_toml("[gameplay]\nrows = 10\ncols = 6\nseed = 3\n").unwrap();
        let mut app = App::from_settings(&settings);

        app.execute(Command::StartPause, Instant::now());

        assert_eq!((app.game.grid.rows(), app.game.grid.cols()), (10, 6));
        assert_eq!(app.game.current_piece.as_ref().unwrap().x, 2);
    }

    #[test]
    fn smallest_board_fits_every_spawn() {
        let settings = Settings::from_toml("[gameplay]\nrows = 1\ncols = 1\n").unwrap().sanitized();
        assert_eq!((settings.gameplay.rows, settings.gameplay.cols), (4, 5));

        for seed in 0..32 {
            let mut settings = settings.clone();
            settings.gameplay.seed = Some(seed);
            let mut app = App::from_settings(&settings);

            app.execute(Command::StartPause, Instant::now());

            assert_eq!(app.game.mode, GameMode::Running, "seed {seed}");
            assert!(app.game.current_piece.is_some());
        }
    }
}

// ============================================================================
// Rendering Tests
// ============================================================================

mod rendering {
    use super::*;

    fn screen_text(game: &Game) -> String {
        screen_text_with(game, &KeyMap::default())
    }

    fn screen_text_with(game: &Game, keys: &KeyMap) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| ui::render(frame, game, keys)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn idle_screen_shows_prompt() {
        let game = Game::new();
        let text = screen_text(&game);
        assert!(text.contains("Press Start to Play"));
        assert!(text.contains("Start Game"));
    }

    #[test]
    fn paused_screen_shows_banner_and_resume_label() {
        let mut game = Game::new();
        game.start();
        game.toggle_pause();

        let text = screen_text(&game);
        assert!(text.contains("PAUSED"));
        assert!(text.contains("Resume"));
    }

    #[test]
    fn game_over_screen_shows_banner() {
        let mut game = Game::with_provider(Box::new(SequencePieceProvider::new(vec![TetrominoType::O])));
        game.start();
        while !game.is_game_over() {
            game.hard_drop();
        }

        let text = screen_text(&game);
        assert!(text.contains("GAME OVER"));
    }

    #[test]
    fn running_screen_shows_score() {
        let mut game = Game::with_provider(Box::new(SequencePieceProvider::new(vec![TetrominoType::O])));
        game.start();
        game.hard_drop();

        let text = screen_text(&game);
        assert!(text.contains("Score"));
        assert!(text.contains("36"));
        assert!(text.contains("Pause"));
        assert!(!text.contains("PAUSED"));
    }

    #[test]
    fn default_hints_name_default_keys() {
        let text = screen_text(&Game::new());
        assert!(text.contains("↑ Rotate"));
        assert!(text.contains("Space Hard drop"));
        assert!(text.contains("[Enter] Start Game"));
    }

    #[test]
    fn hints_follow_custom_bindings() {
        let settings = Settings::from_toml("[keys]\nrotate = \"w\"\nstart = \"s\"\n").unwrap();
        let keys = KeyMap::from_settings(&settings.keys);

        let text = screen_text_with(&Game::new(), &keys);

        assert!(text.contains("W Rotate"));
        assert!(!text.contains("↑ Rotate"));
        assert!(text.contains("[S] Start Game"));
        assert!(!text.contains("[Enter]"));
    }

    #[test]
    fn oversized_board_renders_without_panicking() {
        let mut game = Game::with_dimensions(20, 40_000, Box::new(SequencePieceProvider::new(vec![TetrominoType::O])));
        game.start();

        let text = screen_text(&game);
        assert!(text.contains("Rotate"));
    }

    #[test]
    fn configured_huge_board_is_clamped_and_renders() {
        let settings = Settings::from_toml("[gameplay]\ncols = 40000\nrows = 20\n").unwrap().sanitized();
        let mut app = App::from_settings(&settings);
        app.execute(Command::StartPause, Instant::now());

        assert_eq!(app.game.grid.cols(), 255);
        let text = screen_text_with(&app.game, app.keymap());
        assert!(text.contains("Rotate"));
    }
}
