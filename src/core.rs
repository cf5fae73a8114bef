pub mod augment;
pub mod config;
pub mod display;
pub mod duration;
pub mod error;
pub mod palette;
pub mod tiles;
