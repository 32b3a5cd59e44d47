// src/lib.rs

pub mod core;
pub mod error;
pub mod network;
pub mod persistence;
pub mod repl;
pub mod training;

pub use crate::core::engine::{Prediction, Speller};
pub use crate::error::{Result, SpellerError};
