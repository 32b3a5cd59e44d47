// src/core/mod.rs

pub mod encoder;
pub mod engine;
pub mod grouper;
pub mod types;
pub mod vocabulary;
