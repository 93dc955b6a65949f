//=========================================================================
// Animation
//=========================================================================
//
// Ready-made tasks that drive node properties over time, plus the easing
// curves they sample.
//
//=========================================================================

//=== Module Declarations =================================================

mod easing;
mod tasks;

//=== Public API ==========================================================

pub use easing::{CubicBezier, Easing};
pub use tasks::{Delay, Direction, DropIn, FadeIn, FadeOut, FloatLoop, HeartBeat, ScaleEase};
