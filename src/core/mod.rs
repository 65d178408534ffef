//! Roster parsing, score normalization and per-subject reshaping

pub mod reshape;
pub mod roster;
pub mod score;

pub use reshape::{find_subject, reshape, SubjectAccumulators};
pub use roster::{parse_grid, RosterParser};
pub use score::{process_score_value, ScoreOptions};
