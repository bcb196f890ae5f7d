// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod import;
pub mod persistence;
pub mod timer;

pub use crate::core::engine::GameSession;
pub use crate::error::{KkutuError, Result};
