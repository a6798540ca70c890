//! Core domain logic for fitcoach.
//!
//! Everything in this crate is independent of the HTTP surface: the plan
//! model, prompt formatting and response decoding, the persisted plan store,
//! narration and playback, document layout and export, and image dispatch.
//! Provider access goes through the traits in [`provider`].

pub mod client;
pub mod export;
pub mod image;
pub mod model;
pub mod plan;
pub mod provider;
pub mod store;
pub mod voice;

pub use model::{Gender, Goal, Meal, Plan, UserProfile, Workout};
