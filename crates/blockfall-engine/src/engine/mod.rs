//! Game engine logic and state management.
//!
//! This module provides the high-level game logic that orchestrates the core
//! data structures into a playable session:
//!
//! - [`GameSession`] - The session state machine (spawn, move/rotate, lock,
//!   clear, respawn) and the drop clock
//! - [`GameStats`] - Score, cleared lines, and the derived level and drop
//!   interval
//! - [`PieceGenerator`] - Uniform random piece selection
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. Construct a [`GameSession`] (idle; nothing falls yet)
//! 2. `start()` spawns the first piece and begins the run
//! 3. The input layer issues move/rotate/soft-drop intents; the frame driver
//!    feeds elapsed time into `advance()`, which forces periodic drops
//! 4. A blocked downward move locks the piece, clears full rows, and spawns
//!    the pending next piece
//! 5. The run ends when a freshly spawned piece collides at its spawn
//!    position
//!
//! The engine never blocks and never reads a clock; all timing comes in
//! through [`GameSession::advance`].

pub use self::{game_session::*, game_stats::*, piece_generator::*};

mod game_session;
mod game_stats;
mod piece_generator;
