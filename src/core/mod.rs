// src/core/mod.rs
pub mod context;
pub mod dictionary;
pub mod engine;
pub mod hangul;
pub mod rules;
pub mod types;
