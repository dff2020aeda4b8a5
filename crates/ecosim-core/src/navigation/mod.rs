//! Navigation - the pluggable geometry/boundary strategy.
//!
//! A navigator decides where an organism ends up after a tick and how far
//! apart two points are. Organisms and the simulation only ever talk to the
//! [`Navigator`] trait, so the boundary rules (solid walls, periodic edges,
//! mixed) can change without touching the engine.
//!
//! Every organism owns its own navigator instance, replicated from the
//! archetype built out of [`EnvironmentConfig`].

mod rectangular;

pub use rectangular::*;

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::components::Vec2;
use crate::error::SimError;

/// Movement and distance rules for a bounded 2D space
pub trait Navigator: Send + Sync + fmt::Debug {
    /// Randomized starting position and unit heading inside the space
    fn initialize(&mut self, rng: &mut dyn RngCore) -> (Vec2, Vec2);

    /// Advance one tick from `position` at `speed`, applying boundary rules.
    ///
    /// Returns the new position and the (possibly reflected) unit heading.
    fn step(&mut self, position: Vec2, speed: f64, neighbours: &[Vec2]) -> (Vec2, Vec2);

    /// True iff the distance between `a` and `b` is at most `threshold`
    fn is_in_range(&self, a: Vec2, b: Vec2, threshold: f64) -> bool {
        self.distance(a, b) <= threshold
    }

    fn distance(&self, a: Vec2, b: Vec2) -> f64;

    /// Fresh instance with the same geometry and no heading
    fn replicate(&self) -> Box<dyn Navigator>;

    fn heading(&self) -> Vec2;

    fn set_heading(&mut self, heading: Vec2);
}

impl Clone for Box<dyn Navigator> {
    fn clone(&self) -> Self {
        self.replicate()
    }
}

/// Recognized environment styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorStyle {
    /// Solid walls on every side; organisms bounce elastically
    RectangularNonPeriodic,
    /// Both axes wrap around
    RectangularPeriodic,
    /// x wraps around, y has solid walls
    RectangularPartiallyPeriodic,
}

impl NavigatorStyle {
    pub const ALL: [NavigatorStyle; 3] = [
        NavigatorStyle::RectangularNonPeriodic,
        NavigatorStyle::RectangularPeriodic,
        NavigatorStyle::RectangularPartiallyPeriodic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NavigatorStyle::RectangularNonPeriodic => "rectangular_non_periodic",
            NavigatorStyle::RectangularPeriodic => "rectangular_periodic",
            NavigatorStyle::RectangularPartiallyPeriodic => "rectangular_partially_periodic",
        }
    }

    /// Names of every style, joined for error messages
    pub fn available() -> String {
        Self::ALL
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(" - ")
    }
}

impl FromStr for NavigatorStyle {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.name() == s)
            .ok_or_else(|| SimError::UnknownEnvironment {
                style: s.to_string(),
                available: Self::available(),
            })
    }
}

impl fmt::Display for NavigatorStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Environment section of the simulation config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub style: String,
    pub width: f64,
    pub height: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            style: NavigatorStyle::RectangularNonPeriodic.name().to_string(),
            width: 100.0,
            height: 100.0,
        }
    }
}

impl EnvironmentConfig {
    pub fn validate(&self) -> Result<NavigatorStyle, SimError> {
        let style = self.style.parse::<NavigatorStyle>()?;
        let extents = [
            ("environment.width", self.width),
            ("environment.height", self.height),
        ];
        for (field, value) in extents {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::invalid(
                    field,
                    format!("must be a positive finite number, got {}", value),
                ));
            }
        }
        Ok(style)
    }

    /// Build the archetype navigator that every organism replicates
    pub fn build_navigator(&self) -> Result<Box<dyn Navigator>, SimError> {
        let style = self.validate()?;
        Ok(Box::new(RectangularNavigator::new(style, self.width, self.height)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_roundtrip_names() {
        for style in NavigatorStyle::ALL {
            assert_eq!(style.name().parse::<NavigatorStyle>().unwrap(), style);
        }
    }

    #[test]
    fn test_unknown_style_lists_alternatives() {
        let err = "hexagonal".parse::<NavigatorStyle>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("hexagonal"));
        for style in NavigatorStyle::ALL {
            assert!(msg.contains(style.name()));
        }
    }

    #[test]
    fn test_environment_rejects_bad_extent() {
        let config = EnvironmentConfig {
            width: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.build_navigator(),
            Err(SimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_boxed_navigator_clone_keeps_geometry() {
        let nav = EnvironmentConfig::default().build_navigator().unwrap();
        let copy = nav.clone();
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(nav.distance(a, b), copy.distance(a, b));
    }
}
