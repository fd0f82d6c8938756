//! Angle arithmetic and planar line geometry.
//!
//! All angles are radians in the arena convention: 0 = North (up),
//! increasing clockwise. Headings are normalized to `[0, 2π)`, turn angles
//! to `(-π, π]`.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Slopes with an absolute run below this are treated as vertical.
const VERTICAL_EPSILON: f64 = 1e-9;

/// Normalize an absolute heading into `[0, 2π)`.
pub fn normalize_heading(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU {
        0.0
    } else {
        a
    }
}

/// Signed smallest rotation from `from` to `to`, in `(-π, π]`.
/// Positive is clockwise.
pub fn turn_angle(from: f64, to: f64) -> f64 {
    let mut diff = (to - from).rem_euclid(TAU);
    if diff > PI {
        diff -= TAU;
    }
    diff
}

/// Whether `angle` lies within `tolerance` of `reference`, ignoring
/// front/back (the comparison is made modulo π). Symmetric: an offset of
/// `π - x` matches exactly when `x` does, on either side of the axis.
pub fn within_axis_tolerance(angle: f64, reference: f64, tolerance: f64) -> bool {
    let diff = turn_angle(reference, angle).abs().rem_euclid(PI);
    diff <= tolerance || PI - diff <= tolerance
}

/// True when `a` and `b` differ by less than `fraction` of the larger magnitude.
pub fn differ_by_less_than_fraction(a: f64, b: f64, fraction: f64) -> bool {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        return true;
    }
    (a - b).abs() / scale < fraction
}

/// Whether `p` lies within the bounding box of segment `a`..`b`.
pub fn segment_contains(a: &Point, b: &Point, p: &Point) -> bool {
    const EPS: f64 = 1e-6;
    p.x >= a.x.min(b.x) - EPS
        && p.x <= a.x.max(b.x) + EPS
        && p.y >= a.y.min(b.y) - EPS
        && p.y <= a.y.max(b.y) + EPS
}

/// A 2D line in slope-intercept form. Vertical lines carry no slope and
/// store their x coordinate in `intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineEquation {
    pub slope: Option<f64>,
    pub intercept: f64,
}

impl LineEquation {
    pub fn vertical(x: f64) -> Self {
        Self {
            slope: None,
            intercept: x,
        }
    }

    pub fn with_slope(slope: f64, intercept: f64) -> Self {
        Self {
            slope: Some(slope),
            intercept,
        }
    }

    /// Line through two points. Coincident points yield `None`.
    pub fn through(a: &Point, b: &Point) -> Option<Self> {
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        if dx.abs() < VERTICAL_EPSILON && dy.abs() < VERTICAL_EPSILON {
            return None;
        }
        if dx.abs() < VERTICAL_EPSILON {
            return Some(Self::vertical(a.x));
        }
        let m = dy / dx;
        Some(Self::with_slope(m, a.y - m * a.x))
    }

    /// Line through `p` travelling along `heading`.
    pub fn from_heading(p: &Point, heading: f64) -> Self {
        let run = heading.sin();
        let rise = heading.cos();
        if run.abs() < VERTICAL_EPSILON {
            Self::vertical(p.x)
        } else {
            let m = rise / run;
            Self::with_slope(m, p.y - m * p.x)
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.slope.is_none()
    }

    /// y at the given x. Undefined for vertical lines.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        self.slope.map(|m| m * x + self.intercept)
    }

    /// x at the given y. Undefined for horizontal lines.
    pub fn x_at(&self, y: f64) -> Option<f64> {
        match self.slope {
            None => Some(self.intercept),
            Some(m) if m.abs() < VERTICAL_EPSILON => None,
            Some(m) => Some((y - self.intercept) / m),
        }
    }

    /// The perpendicular line passing through `p`.
    pub fn perpendicular_through(&self, p: &Point) -> Self {
        match self.slope {
            None => Self::with_slope(0.0, p.y),
            Some(m) if m.abs() < VERTICAL_EPSILON => Self::vertical(p.x),
            Some(m) => {
                let pm = -1.0 / m;
                Self::with_slope(pm, p.y - pm * p.x)
            }
        }
    }

    /// Intersection with another line. Parallel lines yield `None`.
    pub fn intersection(&self, other: &LineEquation) -> Option<Point> {
        match (self.slope, other.slope) {
            (None, None) => None,
            (None, Some(m)) => Some(Point::new(self.intercept, m * self.intercept + other.intercept)),
            (Some(m), None) => Some(Point::new(other.intercept, m * other.intercept + self.intercept)),
            (Some(m1), Some(m2)) => {
                if (m1 - m2).abs() < VERTICAL_EPSILON {
                    return None;
                }
                let x = (other.intercept - self.intercept) / (m1 - m2);
                Some(Point::new(x, m1 * x + self.intercept))
            }
        }
    }

    /// Points where this line meets the circle at `center` with `radius`:
    /// none, one (tangent) or two.
    pub fn circle_intersections(&self, center: &Point, radius: f64) -> Vec<Point> {
        match self.slope {
            None => {
                let dx = self.intercept - center.x;
                let disc = radius * radius - dx * dx;
                roots(disc).map_or_else(Vec::new, |(r1, r2)| {
                    dedup(
                        Point::new(self.intercept, center.y + r1),
                        Point::new(self.intercept, center.y + r2),
                    )
                })
            }
            Some(m) => {
                let k = self.intercept - center.y;
                let a = 1.0 + m * m;
                let b = 2.0 * (m * k - center.x);
                let c = center.x * center.x + k * k - radius * radius;
                let disc = b * b - 4.0 * a * c;
                roots(disc).map_or_else(Vec::new, |(r1, r2)| {
                    let x1 = (-b + r1) / (2.0 * a);
                    let x2 = (-b + r2) / (2.0 * a);
                    dedup(
                        Point::new(x1, m * x1 + self.intercept),
                        Point::new(x2, m * x2 + self.intercept),
                    )
                })
            }
        }
    }
}

/// `±sqrt(disc)`, or `None` when the discriminant is negative or not finite.
fn roots(disc: f64) -> Option<(f64, f64)> {
    if !disc.is_finite() || disc < 0.0 {
        return None;
    }
    let s = disc.sqrt();
    Some((s, -s))
}

fn dedup(a: Point, b: Point) -> Vec<Point> {
    if a.distance_sq_to(&b) < 1e-18 {
        vec![a]
    } else {
        vec![a, b]
    }
}
