//! # Hexapawn
//!
//! A 3×3 pawn game with an opponent that learns by tabular Q-learning.
//! Features a terminal UI built with Ratatui, a headless self-play trainer
//! and value tables persisted as JSON.
//!
//! ## Modules
//!
//! - [`game`] — Core game logic: board, sides, moves, rule engine
//! - [`ai`] — Agent trait, random baseline, Q-learning agent and value table
//! - [`training`] — Self-play trainer, evaluation, rewards, online learning
//! - [`checkpoint`] — Value table persistence
//! - [`session`] — Independent games keyed by session id
//! - [`ui`] — Terminal UI: menu, game view, training progress
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod game;
pub mod session;
pub mod training;
pub mod ui;
