//! Score and line counters.

pub const LINE_CLEAR_BASE: u32 = 100;
pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

/// Points for clearing `lines` rows in one lock: `100 * n * n`.
pub fn line_clear_points(lines: u32) -> u32 {
    LINE_CLEAR_BASE.saturating_mul(lines.saturating_mul(lines))
}

/// Session counters. Both only grow until [`Scoreboard::reset`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Scoreboard {
    pub score: u32,
    pub lines: u32,
}

impl Scoreboard {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns the points awarded.
    pub fn record_clear(&mut self, lines: u32) -> u32 {
        let points = line_clear_points(lines);
        self.score = self.score.saturating_add(points);
        self.lines = self.lines.saturating_add(lines);
        points
    }

    pub fn record_hard_drop_row(&mut self) {
        self.score = self.score.saturating_add(HARD_DROP_POINTS_PER_ROW);
    }
}
