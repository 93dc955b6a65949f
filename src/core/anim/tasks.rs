//=========================================================================
// Animation Tasks
//=========================================================================
//
// Concrete task kinds, each with its own parameter struct.
//
// Finite tasks accumulate `passed` and stop once `passed >= duration`,
// snapping to their final value. Looping tasks never stop; they flip
// direction and reset `passed` at every period boundary.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::easing::Easing;
use crate::core::error::TaskError;
use crate::core::stage::NodeId;
use crate::core::task::{Task, TaskFrame, TaskHandle};

//=== Direction ===========================================================

/// Travel direction of a looping animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }

    fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

fn assert_duration(kind: &str, duration: f64) {
    assert!(
        duration.is_finite() && duration > 0.0,
        "{} duration must be positive, got {}",
        kind,
        duration
    );
}

//=== FadeIn ==============================================================

/// Linear alpha ramp from 0 to 1.
#[derive(Debug, Clone)]
pub struct FadeIn {
    target: NodeId,
    duration: f64,
    passed: f64,
}

impl FadeIn {
    /// # Panics
    ///
    /// Panics if `duration <= 0.0` or `duration` is not finite.
    pub fn new(target: NodeId, duration: f64) -> Self {
        assert_duration("FadeIn", duration);
        Self { target, duration, passed: 0.0 }
    }
}

impl Task for FadeIn {
    fn step(&mut self, delta: f64, frame: &mut TaskFrame<'_>, handle: &TaskHandle) -> Result<(), TaskError> {
        self.passed += delta;
        let node = frame.stage.node_mut(self.target)?;
        node.alpha = self.passed / self.duration;

        if self.passed >= self.duration {
            node.alpha = 1.0;
            handle.stop();
        }
        Ok(())
    }
}

//=== FadeOut =============================================================

/// Linear alpha ramp from 1 down to `floor`.
#[derive(Debug, Clone)]
pub struct FadeOut {
    target: NodeId,
    duration: f64,
    floor: f64,
    passed: f64,
}

impl FadeOut {
    /// # Panics
    ///
    /// Panics if `duration <= 0.0` or `duration` is not finite.
    pub fn new(target: NodeId, duration: f64) -> Self {
        assert_duration("FadeOut", duration);
        Self { target, duration, floor: 0.0, passed: 0.0 }
    }

    /// Stops dimming at `floor` instead of full transparency.
    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = floor;
        self
    }
}

impl Task for FadeOut {
    fn step(&mut self, delta: f64, frame: &mut TaskFrame<'_>, handle: &TaskHandle) -> Result<(), TaskError> {
        self.passed += delta;
        let node = frame.stage.node_mut(self.target)?;
        node.alpha = (1.0 - self.passed / self.duration).max(self.floor);

        if self.passed >= self.duration {
            handle.stop();
        }
        Ok(())
    }
}

//=== DropIn ==============================================================

/// Linear vertical move from `from` to `to`.
#[derive(Debug, Clone)]
pub struct DropIn {
    target: NodeId,
    duration: f64,
    from: f64,
    to: f64,
    passed: f64,
}

impl DropIn {
    pub fn new(target: NodeId, duration: f64, from: f64, to: f64) -> Self {
        assert_duration("DropIn", duration);
        Self { target, duration, from, to, passed: 0.0 }
    }
}

impl Task for DropIn {
    fn step(&mut self, delta: f64, frame: &mut TaskFrame<'_>, handle: &TaskHandle) -> Result<(), TaskError> {
        self.passed += delta;
        let node = frame.stage.node_mut(self.target)?;
        let progress = self.passed / self.duration;
        node.position.y = self.from + (self.to - self.from) * progress;

        if self.passed >= self.duration {
            node.position.y = self.to;
            handle.stop();
        }
        Ok(())
    }
}

//=== FloatLoop ===========================================================

/// Endless vertical bob covering `amplitude` per `period`.
#[derive(Debug, Clone)]
pub struct FloatLoop {
    target: NodeId,
    period: f64,
    amplitude: f64,
    direction: Direction,
    passed: f64,
}

impl FloatLoop {
    /// # Panics
    ///
    /// Panics if `period <= 0.0` or `period` is not finite.
    pub fn new(target: NodeId, period: f64, amplitude: f64) -> Self {
        assert_duration("FloatLoop", period);
        Self {
            target,
            period,
            amplitude,
            direction: Direction::Forward,
            passed: 0.0,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl Task for FloatLoop {
    fn step(&mut self, delta: f64, frame: &mut TaskFrame<'_>, _handle: &TaskHandle) -> Result<(), TaskError> {
        self.passed += delta;
        let speed = self.amplitude / self.period;
        frame.stage.node_mut(self.target)?.position.y += speed * delta * self.direction.sign();

        if self.passed >= self.period {
            self.direction = self.direction.flipped();
            self.passed = 0.0;
        }
        Ok(())
    }
}

//=== ScaleEase ===========================================================

/// Uniform scale following an easing curve from 0 to 1.
#[derive(Debug, Clone)]
pub struct ScaleEase {
    target: NodeId,
    duration: f64,
    easing: Easing,
    passed: f64,
}

impl ScaleEase {
    pub fn new(target: NodeId, duration: f64, easing: impl Into<Easing>) -> Self {
        assert_duration("ScaleEase", duration);
        Self { target, duration, easing: easing.into(), passed: 0.0 }
    }
}

impl Task for ScaleEase {
    fn step(&mut self, delta: f64, frame: &mut TaskFrame<'_>, handle: &TaskHandle) -> Result<(), TaskError> {
        self.passed += delta;
        let value = self.easing.apply(self.passed / self.duration);
        frame.stage.node_mut(self.target)?.set_uniform_scale(value);

        if self.passed >= self.duration {
            handle.stop();
        }
        Ok(())
    }
}

//=== HeartBeat ===========================================================

/// Endless pulse: scale swings between 1 and `1 + amplitude`.
#[derive(Debug, Clone)]
pub struct HeartBeat {
    target: NodeId,
    period: f64,
    amplitude: f64,
    easing: Easing,
    direction: Direction,
    passed: f64,
}

impl HeartBeat {
    pub fn new(target: NodeId, period: f64, easing: impl Into<Easing>) -> Self {
        assert_duration("HeartBeat", period);
        Self {
            target,
            period,
            amplitude: 0.04,
            easing: easing.into(),
            direction: Direction::Forward,
            passed: 0.0,
        }
    }

    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }
}

impl Task for HeartBeat {
    fn step(&mut self, delta: f64, frame: &mut TaskFrame<'_>, _handle: &TaskHandle) -> Result<(), TaskError> {
        self.passed += delta;
        let unit = self.passed / self.period;
        let input = match self.direction {
            Direction::Forward => unit,
            Direction::Backward => 1.0 - unit,
        };
        let value = 1.0 + self.easing.apply(input) * self.amplitude;
        frame.stage.node_mut(self.target)?.set_uniform_scale(value);

        if self.passed >= self.period {
            self.direction = self.direction.flipped();
            self.passed = 0.0;
        }
        Ok(())
    }
}

//=== Delay ===============================================================

type Continuation = Box<dyn FnOnce(&mut TaskFrame<'_>) -> Result<(), TaskError>>;

/// Waits `wait` milliseconds, then stops and runs a one-shot continuation.
///
/// The continuation receives the current frame, so it can attach nodes or
/// spawn follow-up tasks (those start on the next tick).
pub struct Delay {
    wait: f64,
    passed: f64,
    then: Option<Continuation>,
}

impl Delay {
    pub fn new<F>(wait: f64, then: F) -> Self
    where
        F: FnOnce(&mut TaskFrame<'_>) -> Result<(), TaskError> + 'static,
    {
        Self { wait, passed: 0.0, then: Some(Box::new(then)) }
    }
}

impl Task for Delay {
    fn step(&mut self, delta: f64, frame: &mut TaskFrame<'_>, handle: &TaskHandle) -> Result<(), TaskError> {
        self.passed += delta;

        if self.passed >= self.wait {
            handle.stop();
            if let Some(then) = self.then.take() {
                then(frame)?;
            }
        }
        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anim::CubicBezier;
    use crate::core::stage::Stage;
    use crate::core::task::TaskScheduler;
    use std::cell::Cell;
    use std::rc::Rc;

    fn setup() -> (Stage, TaskScheduler, NodeId) {
        let mut stage = Stage::new();
        let node = stage.create_layer();
        (stage, TaskScheduler::new(), node)
    }

    //=====================================================================
    // Finite Tasks
    //=====================================================================

    #[test]
    fn fade_in_reaches_one_and_stops() {
        let (mut stage, mut tasks, node) = setup();
        let handle = tasks.spawn(FadeIn::new(node, 1000.0));

        tasks.advance(500.0, &mut stage).unwrap();
        assert_eq!(stage.node(node).unwrap().alpha, 0.5);
        assert!(handle.is_alive());

        tasks.advance(500.0, &mut stage).unwrap();
        assert_eq!(stage.node(node).unwrap().alpha, 1.0);
        assert!(!handle.is_alive(), "Fade stops at its duration");

        stage.node_mut(node).unwrap().alpha = 0.2;
        tasks.advance(500.0, &mut stage).unwrap();
        assert_eq!(stage.node(node).unwrap().alpha, 0.2, "Stopped task no longer advances");
    }

    #[test]
    fn fade_out_respects_floor() {
        let (mut stage, mut tasks, node) = setup();
        let handle = tasks.spawn(FadeOut::new(node, 1000.0).with_floor(0.3));

        tasks.advance(500.0, &mut stage).unwrap();
        assert_eq!(stage.node(node).unwrap().alpha, 0.5);
        tasks.advance(500.0, &mut stage).unwrap();
        assert_eq!(stage.node(node).unwrap().alpha, 0.3);
        assert!(!handle.is_alive());
    }

    #[test]
    fn drop_snaps_to_target() {
        let (mut stage, mut tasks, node) = setup();
        tasks.spawn(DropIn::new(node, 200.0, -20.0, 30.0));

        tasks.advance(100.0, &mut stage).unwrap();
        assert_eq!(stage.node(node).unwrap().position.y, 5.0);
        tasks.advance(150.0, &mut stage).unwrap();
        assert_eq!(stage.node(node).unwrap().position.y, 30.0, "Overshooting delta snaps to `to`");
        assert!(tasks.is_empty());
    }

    #[test]
    fn scale_ease_finishes_at_full_scale() {
        let (mut stage, mut tasks, node) = setup();
        tasks.spawn(ScaleEase::new(node, 600.0, CubicBezier::back_in_out()));

        tasks.advance(300.0, &mut stage).unwrap();
        tasks.advance(300.0, &mut stage).unwrap();

        let scale = stage.node(node).unwrap().scale;
        assert_eq!((scale.x, scale.y), (1.0, 1.0));
        assert!(tasks.is_empty());
    }

    #[test]
    fn delay_runs_continuation_once() {
        let (mut stage, mut tasks, node) = setup();
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);

        tasks.spawn(Delay::new(1000.0, move |frame| {
            counter.set(counter.get() + 1);
            frame.spawn(FadeIn::new(node, 100.0));
            Ok(())
        }));

        tasks.advance(600.0, &mut stage).unwrap();
        assert_eq!(runs.get(), 0);
        tasks.advance(600.0, &mut stage).unwrap();
        assert_eq!(runs.get(), 1);
        assert_eq!(tasks.len(), 1, "Only the spawned fade remains");
        tasks.advance(600.0, &mut stage).unwrap();
        assert_eq!(runs.get(), 1);
    }

    //=====================================================================
    // Looping Tasks
    //=====================================================================

    #[test]
    fn float_loop_flips_only_after_full_period() {
        let (mut stage, mut tasks, node) = setup();
        let handle = tasks.spawn(FloatLoop::new(node, 1500.0, 10.0));

        let mut heights = Vec::new();
        for _ in 0..4 {
            tasks.advance(500.0, &mut stage).unwrap();
            heights.push(stage.node(node).unwrap().position.y);
        }

        assert!(heights[0] < heights[1] && heights[1] < heights[2], "Rises for 1500 ms");
        assert!((heights[2] - 10.0).abs() < 1e-9, "Covers the amplitude in one period");
        assert!(heights[3] < heights[2], "Falls after the flip");
        assert!(handle.is_alive(), "Looping task never stops itself");
    }

    #[test]
    fn heartbeat_pulses_between_bounds() {
        let (mut stage, mut tasks, node) = setup();
        tasks.spawn(HeartBeat::new(node, 1000.0, Easing::Linear).with_amplitude(0.1));

        tasks.advance(1000.0, &mut stage).unwrap();
        assert!((stage.node(node).unwrap().scale.x - 1.1).abs() < 1e-9);

        tasks.advance(500.0, &mut stage).unwrap();
        assert!((stage.node(node).unwrap().scale.x - 1.05).abs() < 1e-9);

        tasks.advance(500.0, &mut stage).unwrap();
        assert!((stage.node(node).unwrap().scale.x - 1.0).abs() < 1e-9);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn animation_on_destroyed_node_faults() {
        let (mut stage, mut tasks, node) = setup();
        tasks.spawn(FadeIn::new(node, 100.0));
        stage.destroy(node).unwrap();

        assert!(tasks.advance(16.0, &mut stage).is_err());
        assert!(tasks.is_empty());
    }

    #[test]
    fn fade_and_float_share_one_scheduler() {
        let mut stage = Stage::new();
        let logo = stage.create_layer();
        let hammer = stage.create_layer();
        let mut tasks = TaskScheduler::new();

        let fade = tasks.spawn(FadeIn::new(logo, 1000.0));
        let float = tasks.spawn(FloatLoop::new(hammer, 1500.0, 10.0));

        tasks.advance(500.0, &mut stage).unwrap();
        tasks.advance(500.0, &mut stage).unwrap();
        assert_eq!(stage.node(logo).unwrap().alpha, 1.0);
        assert!(!fade.is_alive(), "Fade stops after 1000 ms");
        assert!(float.is_alive());
        assert_eq!(tasks.len(), 1, "Only the float remains");

        tasks.advance(500.0, &mut stage).unwrap();
        let peak = stage.node(hammer).unwrap().position.y;
        assert!((peak - 10.0).abs() < 1e-9, "Float reaches its amplitude at 1500 ms");
        assert_eq!(stage.node(logo).unwrap().alpha, 1.0, "Stopped fade is not stepped");

        tasks.advance(500.0, &mut stage).unwrap();
        assert!(stage.node(hammer).unwrap().position.y < peak, "Float reversed after the period");
    }

    //=====================================================================
    // Parameter Validation
    //=====================================================================

    #[test]
    #[should_panic(expected = "FadeIn duration must be positive")]
    fn fade_in_rejects_zero_duration() {
        let (_stage, _tasks, node) = setup();
        FadeIn::new(node, 0.0);
    }

    #[test]
    #[should_panic(expected = "FadeOut duration must be positive")]
    fn fade_out_rejects_negative_duration() {
        let (_stage, _tasks, node) = setup();
        FadeOut::new(node, -5.0);
    }

    #[test]
    #[should_panic(expected = "DropIn duration must be positive")]
    fn drop_rejects_zero_duration() {
        let (_stage, _tasks, node) = setup();
        DropIn::new(node, 0.0, 0.0, 10.0);
    }

    #[test]
    #[should_panic(expected = "FloatLoop duration must be positive")]
    fn float_loop_rejects_zero_period() {
        let (_stage, _tasks, node) = setup();
        FloatLoop::new(node, 0.0, 10.0);
    }

    #[test]
    #[should_panic(expected = "ScaleEase duration must be positive")]
    fn scale_ease_rejects_zero_duration() {
        let (_stage, _tasks, node) = setup();
        ScaleEase::new(node, 0.0, Easing::Linear);
    }

    #[test]
    #[should_panic(expected = "HeartBeat duration must be positive")]
    fn heartbeat_rejects_non_finite_period() {
        let (_stage, _tasks, node) = setup();
        HeartBeat::new(node, f64::NAN, Easing::Linear);
    }

    #[test]
    fn delay_accepts_zero_wait() {
        let (mut stage, mut tasks, _node) = setup();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        tasks.spawn(Delay::new(0.0, move |_| {
            flag.set(true);
            Ok(())
        }));

        tasks.advance(0.0, &mut stage).unwrap();
        assert!(ran.get(), "Zero wait fires on the first tick");
    }

    #[test]
    fn direction_flip_round_trips() {
        assert_eq!(Direction::Forward.flipped(), Direction::Backward);
        assert_eq!(Direction::Backward.flipped().sign(), 1.0);
    }
}
