//! Decorative floating spheres behind the page.
//!
//! Purely ambient: the spheres follow the frame clock and read nothing from
//! the animation core. The host renders them however it likes.

use std::time::Duration;

/// Vertical bob amplitude in scene units
const BOB_AMPLITUDE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub position: [f32; 3],
    pub size: f32,
    /// Angular speed of the bob in radians per second
    pub speed: f32,
    pub distort: f32,
    /// sRGB colour as 0xRRGGBB
    pub color: u32,
}

impl Sphere {
    /// Position at `elapsed` since the scene started.
    pub fn position_at(&self, elapsed: Duration) -> [f32; 3] {
        let [x, y, z] = self.position;
        let bob = (elapsed.as_secs_f32() * self.speed).sin() * BOB_AMPLITUDE;
        [x, y + bob, z]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub spheres: Vec<Sphere>,
    /// Overall layer opacity
    pub opacity: f32,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            spheres: vec![
                Sphere {
                    position: [-3.0, -1.0, -5.0],
                    size: 1.5,
                    speed: 0.5,
                    distort: 0.4,
                    color: 0x6d28d9,
                },
                Sphere {
                    position: [4.0, 2.0, -6.0],
                    size: 2.0,
                    speed: 0.3,
                    distort: 0.3,
                    color: 0x8b5cf6,
                },
                Sphere {
                    position: [-5.0, 3.0, -4.0],
                    size: 1.0,
                    speed: 0.7,
                    distort: 0.5,
                    color: 0x7c3aed,
                },
            ],
            opacity: 0.4,
        }
    }
}

impl Background {
    pub fn positions_at(&self, elapsed: Duration) -> Vec<[f32; 3]> {
        self.spheres.iter().map(|s| s.position_at(elapsed)).collect()
    }
}
