// Metronome Arena Schema - Shared type definitions
// This crate contains the move and difficulty types that are shared between
// the main metronome-arena crate and its build script, enabling the use of
// postcard for the compiled move catalog.

pub use battle_data::*;
pub use move_types::*;

pub mod battle_data;
pub mod move_types;
