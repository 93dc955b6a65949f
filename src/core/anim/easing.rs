//=========================================================================
// Easing Curves
//=========================================================================
//
// CSS-style cubic Bézier timing functions.
//
// The curve runs from (0,0) to (1,1) with two free control points. For an
// input progress `x` the parameter `t` with B_x(t) = x is found with a
// few Newton steps, falling back to bisection when the slope vanishes,
// and B_y(t) is returned. Control point y values may leave [0, 1] to
// produce overshoot ("back" curves).
//
//=========================================================================

//=== Constants ===========================================================

const NEWTON_ITERATIONS: usize = 8;
const NEWTON_MIN_SLOPE: f64 = 1e-6;
const BISECTION_ITERATIONS: usize = 32;
const PRECISION: f64 = 1e-7;

//=== CubicBezier =========================================================

/// Cubic Bézier timing curve with control points `(x1, y1)` and `(x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl CubicBezier {
    /// Creates a curve.
    ///
    /// # Panics
    ///
    /// Panics if `x1` or `x2` is outside `[0, 1]` (the curve would not be a
    /// function of progress).
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2),
            "Bezier x control points must lie in [0, 1], got {} and {}",
            x1,
            x2
        );
        Self { x1, y1, x2, y2 }
    }

    /// Overshooting "back in-out" curve used for pop-in scaling.
    pub fn back_in_out() -> Self {
        Self::new(0.68, -0.6, 0.32, 1.6)
    }

    /// Symmetric sine-like curve used for pulsing.
    pub fn sine_in_out() -> Self {
        Self::new(0.37, 0.0, 0.63, 1.0)
    }

    /// Evaluates the curve at progress `x` (clamped to `[0, 1]`).
    pub fn ease(&self, x: f64) -> f64 {
        let x = x.clamp(0.0, 1.0);
        if x == 0.0 || x == 1.0 {
            return x;
        }
        if self.x1 == self.y1 && self.x2 == self.y2 {
            return x;
        }
        sample(self.solve_t(x), self.y1, self.y2)
    }

    fn solve_t(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let slope = slope(t, self.x1, self.x2);
            if slope.abs() < NEWTON_MIN_SLOPE {
                break;
            }
            let error = sample(t, self.x1, self.x2) - x;
            if error.abs() < PRECISION {
                return t;
            }
            t -= error / slope;
        }

        let (mut low, mut high) = (0.0, 1.0);
        t = x;
        for _ in 0..BISECTION_ITERATIONS {
            let value = sample(t, self.x1, self.x2);
            if (value - x).abs() < PRECISION {
                break;
            }
            if value < x {
                low = t;
            } else {
                high = t;
            }
            t = (low + high) * 0.5;
        }
        t
    }
}

//--- Polynomial helpers --------------------------------------------------
//
// B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³ with p0 = 0 and p3 = 1.
//
fn sample(t: f64, p1: f64, p2: f64) -> f64 {
    ((coeff_a(p1, p2) * t + coeff_b(p1, p2)) * t + coeff_c(p1)) * t
}

fn slope(t: f64, p1: f64, p2: f64) -> f64 {
    3.0 * coeff_a(p1, p2) * t * t + 2.0 * coeff_b(p1, p2) * t + coeff_c(p1)
}

fn coeff_a(p1: f64, p2: f64) -> f64 {
    1.0 - 3.0 * p2 + 3.0 * p1
}

fn coeff_b(p1: f64, p2: f64) -> f64 {
    3.0 * p2 - 6.0 * p1
}

fn coeff_c(p1: f64) -> f64 {
    3.0 * p1
}

//=== Easing ==============================================================

/// Progress-to-value mapping used by animation tasks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    Bezier(CubicBezier),
}

impl Easing {
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Self::Linear => x.clamp(0.0, 1.0),
            Self::Bezier(curve) => curve.ease(x),
        }
    }
}

impl From<CubicBezier> for Easing {
    fn from(curve: CubicBezier) -> Self {
        Self::Bezier(curve)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn endpoints_are_exact() {
        let curve = CubicBezier::back_in_out();
        assert_eq!(curve.ease(0.0), 0.0);
        assert_eq!(curve.ease(1.0), 1.0);
        assert_eq!(curve.ease(1.5), 1.0, "Progress past the end is clamped");
    }

    #[test]
    fn linear_control_points_are_identity() {
        let curve = CubicBezier::new(0.25, 0.25, 0.75, 0.75);
        for x in [0.1, 0.33, 0.5, 0.9] {
            assert!(approx(curve.ease(x), x), "Expected identity at {}", x);
        }
    }

    #[test]
    fn symmetric_curve_passes_through_midpoint() {
        let curve = CubicBezier::sine_in_out();
        assert!(approx(curve.ease(0.5), 0.5));
        assert!(curve.ease(0.25) < 0.25, "Ease-in part starts slow");
        assert!(curve.ease(0.75) > 0.75, "Ease-out part ends slow");
    }

    #[test]
    fn back_curve_overshoots() {
        let curve = CubicBezier::back_in_out();
        let early_min = (1..20).map(|i| curve.ease(i as f64 / 100.0)).fold(f64::MAX, f64::min);
        let late_max = (80..100).map(|i| curve.ease(i as f64 / 100.0)).fold(f64::MIN, f64::max);
        assert!(early_min < 0.0, "Back curve dips below zero early");
        assert!(late_max > 1.0, "Back curve overshoots one late");
    }

    #[test]
    #[should_panic(expected = "Bezier x control points")]
    fn invalid_control_points_panic() {
        CubicBezier::new(1.5, 0.0, 0.5, 1.0);
    }

    #[test]
    fn linear_easing_clamps() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(0.4), 0.4);
        assert_eq!(Easing::from(CubicBezier::sine_in_out()).apply(1.0), 1.0);
    }
}
