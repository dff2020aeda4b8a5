//! Rectangular environments with solid and/or periodic edges

use rand::{Rng, RngCore};

use super::{Navigator, NavigatorStyle};
use crate::components::Vec2;

/// Navigator for a `[0, width] x [0, height]` box.
///
/// Each axis either reflects (elastic bounce off the wall, the heading
/// component flips sign) or wraps around to the opposite edge.
#[derive(Debug, Clone)]
pub struct RectangularNavigator {
    width: f64,
    height: f64,
    wrap_x: bool,
    wrap_y: bool,
    heading: Vec2,
}

impl RectangularNavigator {
    pub fn new(style: NavigatorStyle, width: f64, height: f64) -> Self {
        let (wrap_x, wrap_y) = match style {
            NavigatorStyle::RectangularNonPeriodic => (false, false),
            NavigatorStyle::RectangularPeriodic => (true, true),
            NavigatorStyle::RectangularPartiallyPeriodic => (true, false),
        };
        Self {
            width,
            height,
            wrap_x,
            wrap_y,
            heading: Vec2::ZERO,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Fold a coordinate back inside `[0, extent]`, flipping the heading
/// component once per wall hit.
///
/// Motion between two walls is periodic with period `2 * extent`, so the
/// fold is computed in closed form however far the step overshoots.
fn reflect(coord: f64, heading: f64, extent: f64) -> (f64, f64) {
    if !coord.is_finite() || extent <= 0.0 {
        return (coord.clamp(0.0, extent.max(0.0)), heading);
    }
    if (0.0..=extent).contains(&coord) {
        return (coord, heading);
    }

    let period = 2.0 * extent;
    let m = coord.rem_euclid(period);
    let folded = if m <= extent { m } else { period - m };

    let hits = if coord > extent {
        (coord / extent).ceil() - 1.0
    } else {
        (-coord / extent).ceil()
    };
    let heading = if hits % 2.0 == 0.0 { heading } else { -heading };
    (folded.clamp(0.0, extent), heading)
}

fn wrap(coord: f64, extent: f64) -> f64 {
    if extent <= 0.0 {
        return 0.0;
    }
    coord.rem_euclid(extent)
}

/// Shortest separation along a periodic axis
fn minimum_image(delta: f64, extent: f64) -> f64 {
    delta - extent * (delta / extent).round()
}

impl Navigator for RectangularNavigator {
    fn initialize(&mut self, rng: &mut dyn RngCore) -> (Vec2, Vec2) {
        let position = Vec2::new(
            rng.gen_range(0.0..=self.width),
            rng.gen_range(0.0..=self.height),
        );
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        self.heading = Vec2::from_angle(angle);
        (position, self.heading)
    }

    fn step(&mut self, position: Vec2, speed: f64, _neighbours: &[Vec2]) -> (Vec2, Vec2) {
        let moved = position + self.heading * speed;

        let (x, hx) = if self.wrap_x {
            (wrap(moved.x, self.width), self.heading.x)
        } else {
            reflect(moved.x, self.heading.x, self.width)
        };
        let (y, hy) = if self.wrap_y {
            (wrap(moved.y, self.height), self.heading.y)
        } else {
            reflect(moved.y, self.heading.y, self.height)
        };

        self.heading = Vec2::new(hx, hy);
        (Vec2::new(x, y), self.heading)
    }

    fn distance(&self, a: Vec2, b: Vec2) -> f64 {
        let mut delta = b - a;
        if self.wrap_x {
            delta.x = minimum_image(delta.x, self.width);
        }
        if self.wrap_y {
            delta.y = minimum_image(delta.y, self.height);
        }
        delta.length()
    }

    fn replicate(&self) -> Box<dyn Navigator> {
        Box::new(Self {
            heading: Vec2::ZERO,
            ..self.clone()
        })
    }

    fn heading(&self) -> Vec2 {
        self.heading
    }

    fn set_heading(&mut self, heading: Vec2) {
        self.heading = heading;
    }
}
