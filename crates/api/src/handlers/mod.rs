pub mod generation;
pub mod lyrics;
pub mod webhook;
