//! FitCoach - personal AI strength & conditioning coach
//!
//! FitCoach chats with you about training and recovery, grounded in your
//! real data: workouts from [Hevy](https://hevy.com) and sleep/heart-rate
//! signals from Fitbit. Any OpenAI-compatible endpoint can drive it, local
//! Ollama included.
//!
//! The crate is organized around one data path:
//!
//! - [`clients`]: thin HTTP gateways for the Hevy and Fitbit APIs
//! - [`fitness`]: pure transforms from raw API payloads to coaching facts
//! - [`tools`]: the registry exposing those facts to the model
//! - [`providers`]: the OpenAI-compatible chat-completions wire
//! - [`agent`]: the per-turn loop between model and tools
//! - [`session`]: SQLite-backed conversation history
//! - [`cli`]: the interactive shell and maintenance commands

pub mod agent;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod fitness;
pub mod http;
pub mod providers;
pub mod session;
pub mod tools;

pub use error::{CoachError, Result};
