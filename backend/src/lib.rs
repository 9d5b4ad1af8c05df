pub mod api;
pub mod assistant;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod preferences;
pub mod progression;
pub mod services;
pub mod simulation;
pub mod state;
