//! Control decisions: threshold comparison and pump cooldown.

pub mod decision;
