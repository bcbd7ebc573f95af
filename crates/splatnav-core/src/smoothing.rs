//! Exponential smoothing of camera parameters.
//!
//! Camera state is kept as target/current pairs: input writes the target,
//! and every frame the current value advances toward it by
//! `current += (target - current) * (1 - e^(-dt*k))`. The blend factor is
//! frame-rate independent. Once the remaining delta falls below an epsilon
//! the value snaps exactly to the target, so smoothing terminates instead of
//! creeping asymptotically.

use glam::Vec3;

/// A smoothed scalar: a target value and a current value that chases it.
#[derive(Debug, Clone, Copy)]
pub struct Smoothed {
    current: f32,
    target: f32,
    epsilon: f32,
}

impl Smoothed {
    /// Creates a settled pair (current == target) with the given snap epsilon.
    #[must_use]
    pub fn new(value: f32, epsilon: f32) -> Self {
        Self {
            current: value,
            target: value,
            epsilon,
        }
    }

    /// Returns the current (smoothed) value.
    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Returns the target value.
    #[must_use]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Sets the target; `immediate` also snaps the current value to it.
    pub fn set(&mut self, value: f32, immediate: bool) {
        self.target = value;
        if immediate {
            self.current = value;
        }
    }

    /// Clamps both target and current into `[min, max]`.
    pub fn clamp(&mut self, min: f32, max: f32) {
        self.target = self.target.clamp(min, max);
        self.current = self.current.clamp(min, max);
    }

    /// True once current has reached target exactly.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Advances current toward target with smoothing strength `k`.
    pub fn advance(&mut self, dt: f32, strength: f32) {
        let blend = 1.0 - (-dt.max(0.0) * strength).exp();
        self.current += (self.target - self.current) * blend;
        if (self.target - self.current).abs() < self.epsilon {
            self.current = self.target;
        }
    }
}

/// A smoothed vector; same law as [`Smoothed`], snap tested on the
/// remaining delta's length.
#[derive(Debug, Clone, Copy)]
pub struct SmoothedVec3 {
    current: Vec3,
    target: Vec3,
    epsilon: f32,
}

impl SmoothedVec3 {
    /// Creates a settled pair with the given snap epsilon.
    #[must_use]
    pub fn new(value: Vec3, epsilon: f32) -> Self {
        Self {
            current: value,
            target: value,
            epsilon,
        }
    }

    /// Returns the current (smoothed) value.
    #[must_use]
    pub fn current(&self) -> Vec3 {
        self.current
    }

    /// Returns the target value.
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Sets the target; `immediate` also snaps the current value to it.
    pub fn set(&mut self, value: Vec3, immediate: bool) {
        self.target = value;
        if immediate {
            self.current = value;
        }
    }

    /// Offsets the target by `delta` without touching the current value.
    pub fn offset_target(&mut self, delta: Vec3) {
        self.target += delta;
    }

    /// True once current has reached target exactly.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Advances current toward target with smoothing strength `k`.
    pub fn advance(&mut self, dt: f32, strength: f32) {
        let blend = 1.0 - (-dt.max(0.0) * strength).exp();
        self.current += (self.target - self.current) * blend;
        if (self.target - self.current).length() < self.epsilon {
            self.current = self.target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_advance_moves_toward_target() {
        let mut s = Smoothed::new(0.0, 1e-4);
        s.set(10.0, false);
        s.advance(0.016, 4.5);
        assert!(s.current() > 0.0);
        assert!(s.current() < 10.0);
    }

    #[test]
    fn test_advance_settles_exactly() {
        let mut s = Smoothed::new(0.0, 1e-4);
        s.set(1.0, false);
        // Plenty of frames for the delta to fall under epsilon and snap.
        for _ in 0..500 {
            s.advance(0.016, 4.5);
        }
        assert_eq!(s.current(), 1.0);
        assert!(s.is_settled());
    }

    #[test]
    fn test_immediate_set_snaps() {
        let mut s = Smoothed::new(0.0, 1e-4);
        s.set(5.0, true);
        assert_eq!(s.current(), 5.0);
        assert!(s.is_settled());
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut s = Smoothed::new(2.0, 1e-4);
        s.set(9.0, false);
        s.advance(0.0, 4.5);
        assert_eq!(s.current(), 2.0);
    }

    #[test]
    fn test_stronger_smoothing_converges_faster() {
        let mut slow = Smoothed::new(0.0, 1e-6);
        let mut fast = Smoothed::new(0.0, 1e-6);
        slow.set(1.0, false);
        fast.set(1.0, false);
        slow.advance(0.016, 4.5);
        fast.advance(0.016, 12.0);
        assert!(fast.current() > slow.current());
    }

    #[test]
    fn test_clamp_applies_to_both_values() {
        let mut s = Smoothed::new(120.0, 1e-4);
        s.set(-120.0, false);
        s.clamp(-89.9, 89.9);
        assert_eq!(s.target(), -89.9);
        assert_eq!(s.current(), 89.9);
    }

    #[test]
    fn test_vec3_advance_settles() {
        let mut v = SmoothedVec3::new(Vec3::ZERO, 1e-4);
        v.set(Vec3::new(1.0, 2.0, 3.0), false);
        for _ in 0..500 {
            v.advance(0.016, 4.5);
        }
        assert_eq!(v.current(), Vec3::new(1.0, 2.0, 3.0));
    }

    proptest! {
        /// Each step never overshoots and never increases the remaining delta.
        #[test]
        fn prop_advance_is_monotone(start in -100.0f32..100.0, target in -100.0f32..100.0,
                                    dt in 0.0f32..0.5, k in 0.1f32..20.0) {
            let mut s = Smoothed::new(start, 1e-5);
            s.set(target, false);
            let before = (s.target() - s.current()).abs();
            s.advance(dt, k);
            let after = (s.target() - s.current()).abs();
            prop_assert!(after <= before + 1e-4);
        }
    }
}
