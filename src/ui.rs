use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{Command, KeyMap};
use crate::game::{Action, Game, GameMode};
use crate::grid::CellState;
use crate::piece::PieceColor;

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const INFO_WIDTH: u16 = 22;

const MOVE_HINTS: [(Command, &str); 4] = [
    (Command::Play(Action::MoveLeft), "Left"),
    (Command::Play(Action::MoveRight), "Right"),
    (Command::Play(Action::Rotate), "Rotate"),
    (Command::Play(Action::SoftDrop), "Drop"),
];

const CONTROL_HINTS: [(Command, &str); 4] = [
    (Command::Play(Action::HardDrop), "Hard drop"),
    (Command::Play(Action::TogglePause), "Pause"),
    (Command::Restart, "Restart"),
    (Command::Quit, "Quit"),
];

fn piece_color(color: PieceColor) -> Color {
    let (r, g, b) = color.rgb();
    Color::Rgb(r, g, b)
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render(frame: &mut Frame, game: &Game, keys: &KeyMap) {
    let area = frame.size();
    let board = render_game(frame, game, keys, area);

    match game.mode {
        GameMode::Running => {}
        GameMode::Idle => render_banner(frame, board, "Press Start to Play", Color::White),
        GameMode::Paused => render_banner(frame, board, "PAUSED", Color::Yellow),
        GameMode::GameOver => render_banner(frame, board, "GAME OVER", Color::Red),
    }
}

/// Draws board, info panel and key hints. Returns the board's area.
fn render_game(frame: &mut Frame, game: &Game, keys: &KeyMap, area: Rect) -> Rect {
    let cols = u16::try_from(game.grid.cols()).unwrap_or(u16::MAX);
    let rows = u16::try_from(game.grid.rows()).unwrap_or(u16::MAX);
    let grid_display_width = cols.saturating_mul(CELL_WIDTH).saturating_add(2);
    let grid_display_height = rows.saturating_add(2);
    let total_width = grid_display_width.saturating_add(INFO_WIDTH + 1);
    let total_height = grid_display_height.saturating_add(2);

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(INFO_WIDTH),
    ])
    .split(vertical[0]);

    render_grid(frame, game, horizontal[0]);
    render_info(frame, game, keys, horizontal[1]);

    let controls = Paragraph::new(vec![
        hint_line(keys, &MOVE_HINTS),
        hint_line(keys, &CONTROL_HINTS),
    ])
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(controls, vertical[1]);

    horizontal[0]
}

/// "<keys> <name>" for every hint with at least one bound key.
fn hint_line(keys: &KeyMap, hints: &[(Command, &str)]) -> Line<'static> {
    let parts: Vec<String> = hints
        .iter()
        .filter_map(|(command, name)| keys.label(*command).map(|label| format!("{label} {name}")))
        .collect();
    Line::from(parts.join("  "))
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Tetris ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = game
        .render_grid()
        .into_iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .into_iter()
                .map(|cell| match cell {
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                    CellState::Filled(color) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(piece_color(color)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, keys: &KeyMap, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let start_pause = match keys.label(Command::StartPause) {
        Some(label) => format!("[{label}] {}", game.start_pause_label()),
        None => game.start_pause_label().to_string(),
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(game.score().to_string()),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(game.lines().to_string()),
        Line::from(""),
        Line::from(Span::styled(start_pause, Style::default().fg(Color::Green))),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_banner(frame: &mut Frame, board: Rect, message: &str, color: Color) {
    let width = (message.chars().count() as u16 + 4).min(board.width);
    let popup_area = centered_rect(width, 3, board);

    let paragraph = Paragraph::new(Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(color),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}
