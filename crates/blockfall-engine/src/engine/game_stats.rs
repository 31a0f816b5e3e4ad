use std::time::Duration;

/// Score values for line clears.
///
/// Index corresponds to the number of lines cleared in a single pass; the
/// value is multiplied by the current level:
/// - 1 line: 100 points
/// - 2 lines: 300 points
/// - 3 lines: 500 points
/// - 4 lines: 800 points
const SCORE_TABLE: [usize; 5] = [0, 100, 300, 500, 800];

const LINES_PER_LEVEL: usize = 10;
const BASE_DROP_MILLIS: u64 = 1000;
const DROP_MILLIS_PER_LEVEL: u64 = 50;
const MIN_DROP_MILLIS: u64 = 100;

/// Per-run counters and the quantities derived from them.
///
/// Score and cleared lines are the stored state; level and drop interval are
/// recomputed from cleared lines on demand, so they can never drift out of
/// sync with the counters. Scoring is simplified: no combos, no
/// back-to-back bonuses, no soft/hard-drop points.
#[derive(Debug, Clone)]
pub struct GameStats {
    score: usize,
    cleared_lines: usize,
    locked_pieces: usize,
    line_clear_counter: [usize; 5],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            cleared_lines: 0,
            locked_pieces: 0,
            line_clear_counter: [0; 5],
        }
    }

    /// The current score.
    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Total lines cleared this run.
    #[must_use]
    pub const fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }

    /// Number of pieces locked into the grid this run.
    #[must_use]
    pub const fn locked_pieces(&self) -> usize {
        self.locked_pieces
    }

    /// Histogram of clears by size.
    ///
    /// `[0]` counts locks that cleared nothing; `[1]`-`[4]` count singles
    /// through quadruple clears.
    #[must_use]
    pub const fn line_clear_counter(&self) -> &[usize; 5] {
        &self.line_clear_counter
    }

    /// The current level, starting at 1 and increasing every 10 lines.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.cleared_lines / LINES_PER_LEVEL + 1
    }

    /// Time between automatic forced drops at the current level.
    ///
    /// Starts at 1000ms and shrinks by 50ms per level, floored at 100ms.
    #[must_use]
    pub fn drop_interval(&self) -> Duration {
        let reduction = (self.level() as u64 - 1) * DROP_MILLIS_PER_LEVEL;
        let millis = BASE_DROP_MILLIS.saturating_sub(reduction).max(MIN_DROP_MILLIS);
        Duration::from_millis(millis)
    }

    /// Updates the counters after a piece lock.
    ///
    /// `cleared_lines` is the number of rows removed by that lock (0-4).
    /// The score award uses the level in effect before this clear is
    /// applied, so a clear that crosses a level boundary is paid at the old
    /// rate.
    pub fn record_piece_lock(&mut self, cleared_lines: usize) {
        self.locked_pieces += 1;
        if cleared_lines < self.line_clear_counter.len() {
            self.line_clear_counter[cleared_lines] += 1;
        }
        if cleared_lines == 0 {
            return;
        }
        let level = self.level();
        self.cleared_lines += cleared_lines;
        self.score += SCORE_TABLE[cleared_lines] * level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let stats = GameStats::new();
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.cleared_lines(), 0);
        assert_eq!(stats.locked_pieces(), 0);
        assert_eq!(stats.level(), 1);
        assert_eq!(stats.drop_interval(), Duration::from_millis(1000));
    }

    #[test]
    fn test_score_per_clear_size() {
        for (cleared, expected) in [(1, 100), (2, 300), (3, 500), (4, 800)] {
            let mut stats = GameStats::new();
            stats.record_piece_lock(cleared);
            assert_eq!(stats.score(), expected, "{cleared} lines at level 1");
            assert_eq!(stats.cleared_lines(), cleared);
        }
    }

    #[test]
    fn test_score_scales_with_level() {
        let mut stats = GameStats::new();
        // Reach level 2 (10 lines)
        for _ in 0..5 {
            stats.record_piece_lock(2);
        }
        assert_eq!(stats.level(), 2);
        let before = stats.score();

        stats.record_piece_lock(1);
        assert_eq!(stats.score(), before + 100 * 2);
    }

    #[test]
    fn test_clear_crossing_level_boundary_pays_old_level() {
        let mut stats = GameStats::new();
        // 9 lines: still level 1
        stats.record_piece_lock(4);
        stats.record_piece_lock(4);
        stats.record_piece_lock(1);
        assert_eq!(stats.cleared_lines(), 9);
        assert_eq!(stats.level(), 1);
        let before = stats.score();

        // The quad that reaches 13 lines is paid at level 1
        stats.record_piece_lock(4);
        assert_eq!(stats.score(), before + 800);
        assert_eq!(stats.level(), 2);
    }

    #[test]
    fn test_level_progression() {
        let mut stats = GameStats::new();
        for clears in 0..30 {
            assert_eq!(stats.level(), clears / 10 + 1);
            stats.record_piece_lock(1);
        }
        assert_eq!(stats.level(), 4);
    }

    #[test]
    fn test_drop_interval_shrinks_with_level() {
        let mut stats = GameStats::new();
        // 10 lines -> level 2 -> 950ms
        for _ in 0..10 {
            stats.record_piece_lock(1);
        }
        assert_eq!(stats.level(), 2);
        assert_eq!(stats.drop_interval(), Duration::from_millis(950));
    }

    #[test]
    fn test_drop_interval_floors_at_100ms() {
        let mut stats = GameStats::new();
        // 180 lines -> level 19 -> 1000 - 18*50 = 100ms
        for _ in 0..45 {
            stats.record_piece_lock(4);
        }
        assert_eq!(stats.level(), 19);
        assert_eq!(stats.drop_interval(), Duration::from_millis(100));

        // Further levels stay clamped
        for _ in 0..10 {
            stats.record_piece_lock(4);
        }
        assert!(stats.level() > 19);
        assert_eq!(stats.drop_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_lock_without_clear_keeps_score() {
        let mut stats = GameStats::new();
        stats.record_piece_lock(0);
        stats.record_piece_lock(0);
        assert_eq!(stats.score(), 0);
        assert_eq!(stats.cleared_lines(), 0);
        assert_eq!(stats.locked_pieces(), 2);
        assert_eq!(stats.line_clear_counter()[0], 2);
    }

    #[test]
    fn test_line_clear_counter() {
        let mut stats = GameStats::new();
        stats.record_piece_lock(1);
        stats.record_piece_lock(2);
        stats.record_piece_lock(2);
        stats.record_piece_lock(4);
        assert_eq!(stats.line_clear_counter(), &[0, 1, 2, 0, 1]);
    }
}
