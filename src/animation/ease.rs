/// Easing functions used to map normalized animation progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// `t^k`. Exponents below 1 move fast then slow; above 1 slow then fast.
    Power(f64),
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power(k) => t.powf(k),
        }
    }

    /// Interpolate between `from` and `to` along this curve.
    pub fn lerp(self, from: f64, to: f64, t: f64) -> f64 {
        from + (to - from) * self.apply(t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
