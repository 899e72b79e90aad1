pub mod clock;
pub mod config;
pub mod models;
pub mod repositories;
pub mod services;

pub use models::board::{Board, GameOutcome};
pub use models::game::{Cell, GameRecord, Marker, Phase, StatusDate};
