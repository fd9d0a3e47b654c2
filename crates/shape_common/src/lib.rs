//! Shape Common - shared data model and plumbing for Summoner's Shape.
//!
//! Holds the persisted snapshot types, the fixed game tables (scoring,
//! badges, quest templates), calendar helpers, the backup interchange
//! format and the error taxonomy. No game rules live here; those belong to
//! `shape_engine`.

pub mod backup;
pub mod constants;
pub mod error;
pub mod state;
pub mod types;
pub mod week;

pub use error::{PolicyError, ShapeError};
pub use state::{GameState, StateStore};
