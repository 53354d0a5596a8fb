use super::property::VisualState;

/// Trait for types that can be animated by interpolating between values
pub trait Animatable: Clone + PartialEq + 'static {
    /// Linear interpolation between two values
    /// t = 0.0 returns `from`, t = 1.0 returns `to`
    /// t can exceed [0, 1] range for overshoot effects
    fn lerp(from: &Self, to: &Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Animatable for VisualState {
    /// Interpolates every property present in `to`. Properties missing from
    /// `from` start at their rest value. The endpoints are reproduced exactly.
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        let mut out = VisualState::new();
        for (property, end) in to.iter() {
            let start = from.resolved(property);
            let value = if t == 1.0 {
                end
            } else if t == 0.0 {
                start
            } else {
                f32::lerp(&start, &end, t)
            };
            out.set(property, value);
        }
        out
    }
}
