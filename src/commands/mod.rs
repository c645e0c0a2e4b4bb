// src/commands/mod.rs
pub mod current;
pub mod desktop;
