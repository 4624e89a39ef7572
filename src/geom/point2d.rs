//! Plan (XY) points.
//!
//! `Point2D` doubles as a plan-direction vector: subtraction yields the
//! difference as another `Point2D`, and `dot`/`cross` treat it as a vector.

use crate::geom::EPS;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_close(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < EPS && (self.y - other.y).abs() < EPS
    }

    /// Returns true if the distance between both points is within `tol`.
    pub fn is_close_tol(&self, other: &Self, tol: f64) -> bool {
        self.distance(other) <= tol
    }

    pub fn distance(&self, other: &Self) -> f64 {
        (*other - *self).length()
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z-component of the 3D cross product.
    pub fn cross(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Rotates counter-clockwise by `angle` (radians) around `origin`.
    pub fn rotate(&self, angle: f64, origin: Point2D) -> Self {
        let (s, c) = angle.sin_cos();
        let d = *self - origin;
        Self::new(origin.x + d.x * c - d.y * s, origin.y + d.x * s + d.y * c)
    }

    /// Scales the distance from `origin` by `factor`.
    pub fn scale(&self, factor: f64, origin: Point2D) -> Self {
        origin + (*self - origin) * factor
    }

    /// Mirrors the point across the line through `origin` perpendicular to `normal`.
    pub fn reflect(&self, normal: Point2D, origin: Point2D) -> Self {
        let len = normal.length();
        if len < EPS {
            return *self;
        }
        let n = normal * (1. / len);
        let d = (*self - origin).dot(&n);
        *self - n * (2. * d)
    }

    /// Rounds both coordinates to the nearest multiple of `increment`.
    pub fn snap_to_grid(&self, increment: f64) -> Self {
        if increment <= 0. {
            return *self;
        }
        Self::new(
            (self.x / increment).round() * increment,
            (self.y / increment).round() * increment,
        )
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(2); // Default 2 decimals
        write!(f, "Point2D({:.prec$}, {:.prec$})", self.x, self.y, prec = prec)
    }
}

impl Add for Point2D {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point2D {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;
    fn mul(self, other: f64) -> Self {
        Self::new(self.x * other, self.y * other)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(value: (f64, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(value: Point2D) -> Self {
        [value.x, value.y]
    }
}

impl From<geo::Coord<f64>> for Point2D {
    fn from(value: geo::Coord<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<Point2D> for geo::Coord<f64> {
    fn from(value: Point2D) -> Self {
        geo::Coord {
            x: value.x,
            y: value.y,
        }
    }
}
