//! Per-entity animation state machines.

/// Rising, fading balloons.
pub mod balloon;
/// Letters and their firework → balloon → done lifecycle.
pub mod letter;
