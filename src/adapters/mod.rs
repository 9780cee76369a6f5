//! Adapters implementing the port traits.
//!
//! `live` talks to the real world, `recording` wraps live adapters and
//! captures every interaction into a cassette, `replaying` serves answers
//! from a cassette.

pub mod live;
pub mod recording;
pub mod replaying;
