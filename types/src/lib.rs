//! Shared types for sidebet.
//!
//! Everything that crosses the boundary between the game engines and their
//! callers lives here: game identifiers, round settlements, the records and
//! events handed to the history and achievement collaborators, and the
//! in-memory player wallet.

pub mod casino;
