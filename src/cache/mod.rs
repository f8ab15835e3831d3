pub mod input;
pub mod shape;

pub use input::{Score, ScoreInput};
pub use shape::{ContestantEntry, ScoreShape};
