//! Unit-tagged 2-D coordinates.
//!
//! The mosaic view works in its own "scene" pixel space; the stage itself
//! works in physical micrometers. Every coordinate this crate emits carries
//! an explicit unit tag so the two can never be confused. Conversion between
//! the unit systems (objective magnification, camera pixel size) belongs to
//! the instrument-control side and is not done here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The unit system a point is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    /// Mosaic scene pixels.
    Pixels,
    /// Physical stage distance.
    Micrometers,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Pixels => write!(f, "pix"),
            Units::Micrometers => write!(f, "um"),
        }
    }
}

/// A 2-D point tagged with the unit system it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    pub x: f64,
    pub y: f64,
    pub units: Units,
}

impl ScenePoint {
    /// A point in mosaic scene pixels.
    pub fn pixels(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            units: Units::Pixels,
        }
    }

    /// A point in physical stage micrometers.
    pub fn micrometers(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            units: Units::Micrometers,
        }
    }
}

impl fmt::Display for ScenePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}) {}", self.x, self.y, self.units)
    }
}
