pub mod board_evaluator;
pub mod errors;
pub mod game_service;
pub mod recency_merge;
