use std::time::Duration;

use crate::core::{
    grid::Grid,
    piece::{FallingPiece, PieceKind},
};

use super::{GameStats, PieceGenerator, PieceSeed};

/// Lifecycle state of a game session.
///
/// `Idle` is the initial state; `start` enters `Running`, which toggles with
/// `Paused`. `GameOver` is terminal and only reachable from `Running`, when a
/// freshly spawned piece collides at its spawn position. `reset` returns to
/// `Idle` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum SessionState {
    #[display("IDLE")]
    Idle,
    #[display("RUNNING")]
    Running,
    #[display("PAUSED")]
    Paused,
    #[display("GAME OVER")]
    GameOver,
}

/// A single-player game session.
///
/// Owns the grid, the falling piece, the pending next piece, the random
/// generator, and the per-run statistics. All commands are synchronous and
/// silently ignore invalid invocations (wrong state, illegal move); the only
/// terminal condition, game over, is a state flag rather than an error.
///
/// The session never reads a clock. An external frame driver reports elapsed
/// time through [`Self::advance`], which forces a drop whenever the
/// accumulated time reaches the level's drop interval. Sessions are plain
/// values - construct as many as needed.
#[derive(Debug, Clone)]
pub struct GameSession {
    grid: Grid,
    falling_piece: Option<FallingPiece>,
    next_piece: PieceKind,
    generator: PieceGenerator,
    stats: GameStats,
    state: SessionState,
    since_last_drop: Duration,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates an idle session with a random piece sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::from_generator(PieceGenerator::new())
    }

    /// Like [`Self::new`], but with a deterministic piece sequence.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::from_generator(PieceGenerator::with_seed(seed))
    }

    fn from_generator(mut generator: PieceGenerator) -> Self {
        let next_piece = generator.next_kind();
        Self {
            grid: Grid::EMPTY,
            falling_piece: None,
            next_piece,
            generator,
            stats: GameStats::new(),
            state: SessionState::Idle,
            since_last_drop: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The currently falling piece, if a run is underway.
    ///
    /// `None` while idle; in game over the piece that failed to spawn is
    /// still reported so the renderer can show the final position.
    #[must_use]
    pub fn falling_piece(&self) -> Option<&FallingPiece> {
        self.falling_piece.as_ref()
    }

    /// The kind that will spawn next.
    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.next_piece
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Begins a run from `Idle` or `GameOver`; otherwise a no-op.
    ///
    /// Starting after a game over resets the grid and counters first (the
    /// restart path); starting from idle keeps whatever `reset` set up.
    pub fn start(&mut self) {
        match self.state {
            SessionState::Idle => {}
            SessionState::GameOver => self.reset_run(),
            SessionState::Running | SessionState::Paused => return,
        }
        self.state = SessionState::Running;
        self.spawn_piece();
    }

    /// Toggles between `Running` and `Paused`; otherwise a no-op.
    ///
    /// Resuming resets the drop clock reference so the pause never causes an
    /// instant forced drop.
    pub fn toggle_pause(&mut self) {
        match self.state {
            SessionState::Running => self.state = SessionState::Paused,
            SessionState::Paused => {
                self.since_last_drop = Duration::ZERO;
                self.state = SessionState::Running;
            }
            SessionState::Idle | SessionState::GameOver => {}
        }
    }

    /// Returns the session to `Idle`: empty grid, zeroed counters, default
    /// drop interval, and a fresh next piece.
    pub fn reset(&mut self) {
        self.reset_run();
        self.state = SessionState::Idle;
    }

    fn reset_run(&mut self) {
        self.grid = Grid::EMPTY;
        self.falling_piece = None;
        self.next_piece = self.generator.next_kind();
        self.stats = GameStats::new();
        self.since_last_drop = Duration::ZERO;
    }

    /// Moves the falling piece one column left if legal.
    pub fn move_left(&mut self) {
        self.apply_move(-1, 0);
    }

    /// Moves the falling piece one column right if legal.
    pub fn move_right(&mut self) {
        self.apply_move(1, 0);
    }

    /// Moves the falling piece one row down; a blocked downward move locks
    /// the piece, clears full rows, and spawns the next piece.
    pub fn soft_drop(&mut self) {
        self.apply_move(0, 1);
    }

    /// Advances the falling piece to its next rotation state if legal.
    ///
    /// No kick adjustment is attempted: a rotation that would overlap a wall
    /// or the stack simply does not happen.
    pub fn rotate(&mut self) {
        if !self.state.is_running() {
            return;
        }
        let Some(piece) = self.falling_piece else {
            return;
        };
        let rotated = piece.rotated();
        if !self.grid.is_colliding(&rotated) {
            self.falling_piece = Some(rotated);
        }
    }

    /// Reports elapsed time to the drop clock.
    ///
    /// While running, accumulates `delta`; once the accumulated time reaches
    /// the current drop interval, issues one forced soft drop and resets the
    /// accumulator. Ignored while idle, paused, or after game over.
    pub fn advance(&mut self, delta: Duration) {
        if !self.state.is_running() {
            return;
        }
        self.since_last_drop += delta;
        if self.since_last_drop >= self.stats.drop_interval() {
            self.since_last_drop = Duration::ZERO;
            self.apply_move(0, 1);
        }
    }

    fn apply_move(&mut self, dx: i16, dy: i16) {
        if !self.state.is_running() {
            return;
        }
        let Some(piece) = self.falling_piece else {
            return;
        };
        let moved = piece.translated(dx, dy);
        if self.grid.is_colliding(&moved) {
            if dy > 0 {
                self.lock_and_respawn(&piece);
            }
            return;
        }
        self.falling_piece = Some(moved);
    }

    fn lock_and_respawn(&mut self, piece: &FallingPiece) {
        self.grid.lock_piece(piece);
        let cleared = self.grid.clear_lines();
        self.stats.record_piece_lock(cleared);
        self.spawn_piece();
    }

    /// Promotes the pending next piece to the falling piece and draws a new
    /// pending one. A spawn-position collision means the board is full:
    /// the session transitions to `GameOver` with the score as it stands.
    fn spawn_piece(&mut self) {
        let piece = FallingPiece::spawn(self.next_piece);
        self.next_piece = self.generator.next_kind();
        self.falling_piece = Some(piece);
        if self.grid.is_colliding(&piece) {
            self.state = SessionState::GameOver;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::grid::{Cell, GRID_HEIGHT, GRID_WIDTH};

    use super::*;

    fn seeded_session() -> GameSession {
        let seed: PieceSeed = serde_json::from_str("\"2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a\"").unwrap();
        GameSession::with_seed(seed)
    }

    fn running_session() -> GameSession {
        let mut session = seeded_session();
        session.start();
        assert!(session.state().is_running());
        session
    }

    /// Fills the bottom row except for the given columns.
    fn fill_bottom_row_except(session: &mut GameSession, holes: &[usize]) {
        for x in 0..GRID_WIDTH {
            if !holes.contains(&x) {
                session.grid.set_cell(x, GRID_HEIGHT - 1, Cell::Piece(PieceKind::J));
            }
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = seeded_session();
        assert!(session.state().is_idle());
        assert!(session.falling_piece().is_none());
        assert_eq!(session.stats().score(), 0);
    }

    #[test]
    fn test_start_spawns_centered_piece() {
        let mut session = seeded_session();
        let expected = session.next_piece();
        session.start();

        assert!(session.state().is_running());
        let piece = session.falling_piece().unwrap();
        assert_eq!(piece.kind(), expected);
        assert_eq!(piece.y(), 0);
        // A new pending piece was generated immediately
        assert!(!session.grid().is_colliding(piece));
    }

    #[test]
    fn test_start_is_noop_while_running_or_paused() {
        let mut session = running_session();
        let piece = *session.falling_piece().unwrap();
        session.start();
        assert_eq!(session.falling_piece(), Some(&piece));

        session.toggle_pause();
        session.start();
        assert!(session.state().is_paused());
    }

    #[test]
    fn test_intents_ignored_unless_running() {
        let mut session = seeded_session();
        session.move_left();
        session.rotate();
        session.soft_drop();
        session.advance(Duration::from_secs(10));
        assert!(session.state().is_idle());
        assert!(session.falling_piece().is_none());

        let mut session = running_session();
        session.toggle_pause();
        let piece = *session.falling_piece().unwrap();
        session.move_left();
        session.move_right();
        session.rotate();
        session.soft_drop();
        assert_eq!(session.falling_piece(), Some(&piece));
    }

    #[test]
    fn test_horizontal_moves() {
        let mut session = running_session();
        let x = session.falling_piece().unwrap().x();

        session.move_left();
        assert_eq!(session.falling_piece().unwrap().x(), x - 1);
        session.move_right();
        session.move_right();
        assert_eq!(session.falling_piece().unwrap().x(), x + 1);
    }

    #[test]
    fn test_blocked_horizontal_move_is_ignored() {
        let mut session = running_session();
        // Push the piece into the left wall; extra moves change nothing
        for _ in 0..GRID_WIDTH {
            session.move_left();
        }
        let piece = *session.falling_piece().unwrap();
        session.move_left();
        assert_eq!(session.falling_piece(), Some(&piece));
        assert!(session.state().is_running());
    }

    #[test]
    fn test_soft_drop_moves_down() {
        let mut session = running_session();
        let y = session.falling_piece().unwrap().y();
        session.soft_drop();
        assert_eq!(session.falling_piece().unwrap().y(), y + 1);
    }

    #[test]
    fn test_blocked_soft_drop_locks_and_respawns() {
        let mut session = running_session();
        let next_kind = session.next_piece();

        // Drop until the piece lands and the next one spawns
        while session.stats().locked_pieces() == 0 {
            session.soft_drop();
        }

        assert_eq!(session.stats().locked_pieces(), 1);
        let spawned = session.falling_piece().unwrap();
        assert_eq!(spawned.kind(), next_kind);
        assert_eq!(spawned.y(), 0);

        // The landed piece is locked into the grid
        let occupied = session
            .grid()
            .rows()
            .flat_map(|row| row.cells().iter())
            .filter(|c| !c.is_empty())
            .count();
        assert_eq!(occupied, 4);
    }

    #[test]
    fn test_rotation_commits_only_when_legal() {
        let mut session = running_session();
        session.falling_piece = Some(FallingPiece::spawn(PieceKind::T));

        session.rotate();
        assert_eq!(session.falling_piece().unwrap().rotation_index(), 1);

        // Park the state-1 T against the left wall: its occupied cells keep
        // to matrix columns 1-2, so the anchor sits one column outside.
        let mut pushed = *session.falling_piece().unwrap();
        while !session.grid.is_colliding(&pushed.translated(-1, 0)) {
            pushed = pushed.translated(-1, 0);
        }
        assert_eq!(pushed.x(), -1);
        session.falling_piece = Some(pushed);

        // The next state occupies matrix column 0, outside the wall; with no
        // kick search the rotation is simply refused.
        session.rotate();
        assert_eq!(session.falling_piece().unwrap().rotation_index(), 1);
        assert_eq!(session.falling_piece().unwrap().x(), -1);
    }

    #[test]
    fn test_rotating_t_four_times_restores_piece() {
        let mut session = running_session();
        session.falling_piece = Some(FallingPiece::spawn(PieceKind::T));
        let original = *session.falling_piece().unwrap();

        for _ in 0..4 {
            session.rotate();
        }
        assert_eq!(session.falling_piece(), Some(&original));
    }

    #[test]
    fn test_advance_forces_drop_at_interval() {
        let mut session = running_session();
        let y = session.falling_piece().unwrap().y();

        session.advance(Duration::from_millis(400));
        session.advance(Duration::from_millis(400));
        assert_eq!(session.falling_piece().unwrap().y(), y, "not yet due");

        session.advance(Duration::from_millis(200));
        assert_eq!(session.falling_piece().unwrap().y(), y + 1);

        // The accumulator was reset; another sub-interval delta does nothing
        session.advance(Duration::from_millis(400));
        assert_eq!(session.falling_piece().unwrap().y(), y + 1);
    }

    #[test]
    fn test_advance_ignored_while_paused() {
        let mut session = running_session();
        let y = session.falling_piece().unwrap().y();

        session.toggle_pause();
        session.advance(Duration::from_secs(5));
        assert_eq!(session.falling_piece().unwrap().y(), y);
    }

    #[test]
    fn test_resume_resets_drop_clock() {
        let mut session = running_session();
        let y = session.falling_piece().unwrap().y();

        session.advance(Duration::from_millis(900));
        session.toggle_pause();
        session.toggle_pause();

        // The 900ms from before the pause were discarded at resume
        session.advance(Duration::from_millis(900));
        assert_eq!(session.falling_piece().unwrap().y(), y);
        session.advance(Duration::from_millis(100));
        assert_eq!(session.falling_piece().unwrap().y(), y + 1);
    }

    #[test]
    fn test_single_line_clear_through_gameplay() {
        let mut session = running_session();
        fill_bottom_row_except(&mut session, &[4, 5]);

        // Drop an O into the two-column hole
        session.falling_piece = Some(FallingPiece::spawn(PieceKind::O));
        for _ in 0..GRID_HEIGHT {
            session.soft_drop();
        }

        assert_eq!(session.stats().cleared_lines(), 1);
        assert_eq!(session.stats().score(), 100);
        // The O's upper half survives the clear and sits on the bottom row
        assert_eq!(session.grid().cell(4, GRID_HEIGHT - 1), Cell::Piece(PieceKind::O));
        assert_eq!(session.grid().cell(5, GRID_HEIGHT - 1), Cell::Piece(PieceKind::O));
        assert!(session.grid().cell(0, GRID_HEIGHT - 1).is_empty());
    }

    #[test]
    fn test_horizontal_i_completes_single_column_hole() {
        let mut session = running_session();
        fill_bottom_row_except(&mut session, &[0, 1, 2, 3]);

        // A horizontal I dropped at the left wall fills columns 0-3
        session.falling_piece = Some(FallingPiece::spawn(PieceKind::I).translated(-3, 0));
        for _ in 0..GRID_HEIGHT {
            session.soft_drop();
        }

        assert_eq!(session.stats().cleared_lines(), 1);
        assert_eq!(session.stats().score(), 100);
        // Clearing the only occupied row leaves the grid empty again
        let occupied = session
            .grid()
            .rows()
            .flat_map(|row| row.cells().iter())
            .filter(|c| !c.is_empty())
            .count();
        assert_eq!(occupied, 0);
    }

    #[test]
    fn test_vertical_i_fills_single_column_hole() {
        let mut session = running_session();
        fill_bottom_row_except(&mut session, &[0]);

        // A vertical I dropped in column 0 completes the bottom row
        session.falling_piece = Some(FallingPiece::spawn(PieceKind::I).rotated().translated(-5, 0));
        for _ in 0..GRID_HEIGHT + 2 {
            session.soft_drop();
        }

        assert_eq!(session.stats().cleared_lines(), 1);
        assert_eq!(session.stats().score(), 100);
        // The I's three upper cells survive and slide down one row
        for y in [17, 18, 19] {
            assert_eq!(session.grid().cell(0, y), Cell::Piece(PieceKind::I));
        }
        assert!(session.grid().cell(0, 16).is_empty());
        assert!(session.grid().cell(1, GRID_HEIGHT - 1).is_empty());
    }

    #[test]
    fn test_spawn_collision_triggers_game_over() {
        let mut session = running_session();
        let score_before = session.stats().score();

        // Fill every cell, then force a spawn into the occupied board
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                session.grid.set_cell(x, y, Cell::Piece(PieceKind::Z));
            }
        }
        session.spawn_piece();

        assert!(session.state().is_game_over());
        assert_eq!(session.stats().score(), score_before);
        // The piece that failed to spawn is still visible to the renderer
        assert!(session.falling_piece().is_some());

        // Terminal state ignores further intents
        session.soft_drop();
        session.move_left();
        session.advance(Duration::from_secs(5));
        assert!(session.state().is_game_over());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut session = running_session();
        fill_bottom_row_except(&mut session, &[0]);
        session.reset();

        assert!(session.state().is_idle());
        assert!(session.falling_piece().is_none());
        assert_eq!(session.stats().score(), 0);
        assert_eq!(session.stats().cleared_lines(), 0);
        let occupied = session
            .grid()
            .rows()
            .flat_map(|row| row.cells().iter())
            .filter(|c| !c.is_empty())
            .count();
        assert_eq!(occupied, 0);
    }

    #[test]
    fn test_start_after_game_over_resets_run() {
        let mut session = running_session();
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                session.grid.set_cell(x, y, Cell::Piece(PieceKind::Z));
            }
        }
        session.spawn_piece();
        assert!(session.state().is_game_over());

        session.start();
        assert!(session.state().is_running());
        assert_eq!(session.stats().locked_pieces(), 0);
        let piece = session.falling_piece().unwrap();
        assert!(!session.grid().is_colliding(piece));
    }

    #[test]
    fn test_pause_has_no_effect_when_idle_or_over() {
        let mut session = seeded_session();
        session.toggle_pause();
        assert!(session.state().is_idle());

        let mut session = running_session();
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                session.grid.set_cell(x, y, Cell::Piece(PieceKind::Z));
            }
        }
        session.spawn_piece();
        session.toggle_pause();
        assert!(session.state().is_game_over());
    }
}
