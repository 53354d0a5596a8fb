//! Timing functions (easing curves) for animations.
//!
//! Timing functions control the rate of change during an animation, allowing
//! for natural-feeling motion rather than linear interpolation.
//!
//! ## Built-in Easing Functions
//!
//! - [`TimingFunction::Linear`] - Constant speed (no easing)
//! - [`TimingFunction::EaseIn`] - Starts slow, ends fast (acceleration)
//! - [`TimingFunction::EaseOut`] - Starts fast, ends slow (deceleration)
//! - [`TimingFunction::EaseInOut`] - Slow start and end, fast middle
//! - [`TimingFunction::Power`] - Polynomial curves (`power1` .. `power4`)
//! - [`TimingFunction::Sine`] - Sinusoidal curves
//!
//! ## Overshooting curves
//!
//! - [`TimingFunction::BackOut`] - Pulls past the end value then settles
//! - [`TimingFunction::ElasticOut`] - Oscillates around the end value
//!
//! These leave the [0, 1] range transiently and are meant for decorative
//! hover effects.
//!
//! ## Parsing
//!
//! Curves can be named the way page code usually names them:
//!
//! ```
//! use folio::animation::TimingFunction;
//!
//! let ease: TimingFunction = "power3.out".parse().unwrap();
//! assert!(ease.evaluate(0.5) > 0.5);
//!
//! let wobble: TimingFunction = "elastic.out(1, 0.3)".parse().unwrap();
//! assert_eq!(wobble.evaluate(1.0), 1.0);
//! ```

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ParseError;

/// Which end of the curve gets the easing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EaseDirection {
    In,
    Out,
    InOut,
}

/// Timing function that controls the animation curve
#[derive(Clone)]
pub enum TimingFunction {
    /// Linear interpolation (constant speed)
    Linear,
    /// Starts slow, ends fast
    EaseIn,
    /// Starts fast, ends slow
    EaseOut,
    /// Starts slow, speeds up, then slows down
    EaseInOut,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
    /// Polynomial easing; `power1` is quadratic, `power4` quintic
    Power(u8, EaseDirection),
    Sine(EaseDirection),
    /// Back-out with the given overshoot strength
    BackOut(f32),
    /// Elastic-out (amplitude, period)
    ElasticOut(f32, f32),
    /// Custom timing function
    Custom(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

impl TimingFunction {
    /// Evaluate the timing function at time t (0.0 to 1.0)
    /// Returns the interpolation factor (can exceed [0, 1] for overshoot)
    pub fn evaluate(&self, t: f32) -> f32 {
        match self {
            TimingFunction::Linear => t,
            TimingFunction::EaseIn => ease_in(t),
            TimingFunction::EaseOut => ease_out(t),
            TimingFunction::EaseInOut => ease_in_out(t),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
            TimingFunction::Power(power, direction) => power_ease(t, *power, *direction),
            TimingFunction::Sine(direction) => sine_ease(t, *direction),
            TimingFunction::BackOut(strength) => back_out(t, *strength),
            TimingFunction::ElasticOut(amplitude, period) => elastic_out(t, *amplitude, *period),
            TimingFunction::Custom(f) => f(t),
        }
    }

    /// Create a custom timing function from a closure
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f32) -> f32 + Send + Sync + 'static,
    {
        TimingFunction::Custom(Arc::new(f))
    }
}

impl Default for TimingFunction {
    /// Matches the usual tween default of `power1.out`
    fn default() -> Self {
        TimingFunction::Power(1, EaseDirection::Out)
    }
}

impl std::fmt::Debug for TimingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingFunction::Linear => write!(f, "Linear"),
            TimingFunction::EaseIn => write!(f, "EaseIn"),
            TimingFunction::EaseOut => write!(f, "EaseOut"),
            TimingFunction::EaseInOut => write!(f, "EaseInOut"),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "CubicBezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            TimingFunction::Power(n, direction) => write!(f, "Power{}({:?})", n, direction),
            TimingFunction::Sine(direction) => write!(f, "Sine({:?})", direction),
            TimingFunction::BackOut(s) => write!(f, "BackOut({})", s),
            TimingFunction::ElasticOut(a, p) => write!(f, "ElasticOut({}, {})", a, p),
            TimingFunction::Custom(_) => write!(f, "Custom"),
        }
    }
}

impl FromStr for TimingFunction {
    type Err = ParseError;

    /// Parses names such as `linear`, `ease-out`, `power3.out`,
    /// `sine.inOut`, `back.out(1.7)` and `elastic.out(1, 0.3)`.
    /// A family name without a direction defaults to `out`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let (head, params) = match name.find('(') {
            Some(open) => {
                let close = name
                    .rfind(')')
                    .filter(|&close| close > open)
                    .ok_or_else(|| ParseError::UnknownEase(name.to_string()))?;
                (&name[..open], Some(&name[open + 1..close]))
            }
            None => (name, None),
        };

        match head {
            "none" | "linear" | "power0" | "power0.out" | "power0.in" | "power0.inOut" => {
                return Ok(TimingFunction::Linear);
            }
            "ease-in" => return Ok(TimingFunction::EaseIn),
            "ease-out" => return Ok(TimingFunction::EaseOut),
            "ease-in-out" => return Ok(TimingFunction::EaseInOut),
            _ => {}
        }

        let (family, direction) = match head.split_once('.') {
            Some((family, suffix)) => {
                let direction = match suffix {
                    "in" => EaseDirection::In,
                    "out" => EaseDirection::Out,
                    "inOut" => EaseDirection::InOut,
                    _ => return Err(ParseError::UnknownEase(name.to_string())),
                };
                (family, direction)
            }
            None => (head, EaseDirection::Out),
        };

        let numbers = parse_params(name, params)?;
        let unknown = || ParseError::UnknownEase(name.to_string());

        match family {
            "power1" | "quad" => Ok(TimingFunction::Power(1, direction)),
            "power2" | "cubic" => Ok(TimingFunction::Power(2, direction)),
            "power3" | "quart" => Ok(TimingFunction::Power(3, direction)),
            "power4" | "quint" => Ok(TimingFunction::Power(4, direction)),
            "sine" => Ok(TimingFunction::Sine(direction)),
            "back" if direction == EaseDirection::Out => {
                let strength = numbers.first().copied().unwrap_or(1.70158);
                Ok(TimingFunction::BackOut(strength))
            }
            "elastic" if direction == EaseDirection::Out => {
                let amplitude = numbers.first().copied().unwrap_or(1.0);
                let period = numbers.get(1).copied().unwrap_or(0.3);
                if period <= 0.0 {
                    return Err(ParseError::InvalidEaseParams {
                        name: family.to_string(),
                        params: params.unwrap_or_default().to_string(),
                    });
                }
                Ok(TimingFunction::ElasticOut(amplitude, period))
            }
            _ => Err(unknown()),
        }
    }
}

fn parse_params(name: &str, params: Option<&str>) -> Result<Vec<f32>, ParseError> {
    let Some(params) = params else {
        return Ok(Vec::new());
    };
    if params.trim().is_empty() {
        return Ok(Vec::new());
    }
    params
        .split(',')
        .map(|p| {
            p.trim()
                .parse::<f32>()
                .map_err(|_| ParseError::InvalidEaseParams {
                    name: name.to_string(),
                    params: params.to_string(),
                })
        })
        .collect()
}

// Easing functions

fn ease_in(t: f32) -> f32 {
    t * t
}

fn ease_out(t: f32) -> f32 {
    t * (2.0 - t)
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

fn power_ease(t: f32, power: u8, direction: EaseDirection) -> f32 {
    let exponent = i32::from(power) + 1;
    match direction {
        EaseDirection::In => t.powi(exponent),
        EaseDirection::Out => 1.0 - (1.0 - t).powi(exponent),
        EaseDirection::InOut => {
            if t < 0.5 {
                (2.0 * t).powi(exponent) / 2.0
            } else {
                1.0 - (2.0 * (1.0 - t)).powi(exponent) / 2.0
            }
        }
    }
}

fn sine_ease(t: f32, direction: EaseDirection) -> f32 {
    match direction {
        EaseDirection::In => 1.0 - (t * FRAC_PI_2).cos(),
        EaseDirection::Out => (t * FRAC_PI_2).sin(),
        EaseDirection::InOut => -((PI * t).cos() - 1.0) / 2.0,
    }
}

fn back_out(t: f32, strength: f32) -> f32 {
    let p = t - 1.0;
    1.0 + (strength + 1.0) * p * p * p + strength * p * p
}

fn elastic_out(t: f32, amplitude: f32, period: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let amplitude = amplitude.max(1.0);
    let phase = period / TAU * (1.0 / amplitude).asin();
    amplitude * 2f32.powf(-10.0 * t) * ((t - phase) * TAU / period).sin() + 1.0
}

/// Cubic bezier curve evaluation
/// Simplified implementation assuming x1, x2 are in [0, 1]
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Use Newton-Raphson to solve for t given x
    let mut current_t = t;
    for _ in 0..8 {
        let current_x = cubic_bezier_x(current_t, x1, x2);
        let current_slope = cubic_bezier_slope(current_t, x1, x2);
        if current_slope.abs() < 1e-6 {
            break;
        }
        current_t -= (current_x - t) / current_slope;
    }
    cubic_bezier_y(current_t, y1, y2)
}

fn cubic_bezier_x(t: f32, x1: f32, x2: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    3.0 * mt2 * t * x1 + 3.0 * mt * t2 * x2 + t3
}

fn cubic_bezier_y(t: f32, y1: f32, y2: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;
    3.0 * mt2 * t * y1 + 3.0 * mt * t2 * y2 + t3
}

fn cubic_bezier_slope(t: f32, x1: f32, x2: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * x1 + 6.0 * mt * t * (x2 - x1) + 3.0 * t * t * (1.0 - x2)
}
