//! Row types and queries for the board schema.
//!
//! Request payloads (`Create*` / `Update*`) live next to the rows they
//! produce. Position changes never go through these types directly; they are
//! applied by [`crate::position::PositionSequencer`].

pub mod activity;
pub mod board;
pub mod card;
pub mod list;
pub mod user;
