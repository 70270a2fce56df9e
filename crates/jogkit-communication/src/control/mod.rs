//! Operator input: debounce gate, key table and the command pipeline

pub mod gate;
pub mod keymap;
pub mod pipeline;
