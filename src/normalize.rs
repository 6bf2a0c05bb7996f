// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rescales a point sequence onto the pixel grid.
//!
//! Each axis is mapped linearly from its observed `[min, max]` onto
//! `[0, dimension - 1]`, truncating toward zero.  An axis on which
//! every point agrees has no range; `epsilon` stands in for it, which
//! sends the whole axis to pixel 0.

use crate::orbit::Point;
use crate::planes::Pixel;

/// Range substituted for a degenerate axis unless configured otherwise.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Per-axis extremes of a sequence.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    /// Smallest x seen.
    pub min_x: f64,
    /// Largest x seen.
    pub max_x: f64,
    /// Smallest y seen.
    pub min_y: f64,
    /// Largest y seen.
    pub max_y: f64,
}

impl Bounds {
    /// Extremes of `points`, or `None` for an empty slice.
    pub fn of(points: &[Point]) -> Option<Bounds> {
        let first = points.first()?;
        let start = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        Some(points.iter().fold(start, |b, p| Bounds {
            min_x: b.min_x.min(p.x),
            max_x: b.max_x.max(p.x),
            min_y: b.min_y.min(p.y),
            max_y: b.max_y.max(p.y),
        }))
    }

    fn ranges(&self, epsilon: f64) -> (f64, f64) {
        let range = |lo: f64, hi: f64| if hi != lo { hi - lo } else { epsilon };
        (range(self.min_x, self.max_x), range(self.min_y, self.max_y))
    }
}

/// Maps points into a `width`×`height` pixel grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Normalizer {
    width: usize,
    height: usize,
    epsilon: f64,
}

impl Normalizer {
    /// A normalizer using `DEFAULT_EPSILON`.
    pub fn new(width: usize, height: usize) -> Self {
        Normalizer {
            width,
            height,
            epsilon: DEFAULT_EPSILON,
        }
    }

    /// Overrides the degenerate-range tolerance.  Non-positive or
    /// non-finite values fall back to the default.
    pub fn with_epsilon(self, epsilon: f64) -> Self {
        let epsilon = if epsilon.is_finite() && epsilon > 0.0 {
            epsilon
        } else {
            DEFAULT_EPSILON
        };
        Normalizer { epsilon, ..self }
    }

    /// Pixel coordinates for every point, in sequence order.  The
    /// result is clamped into the grid, so it is safe to index with
    /// even if the caller passes points outside the bounds.
    pub fn normalize(&self, points: &[Point]) -> Vec<Pixel> {
        match Bounds::of(points) {
            Some(bounds) => self.normalize_within(points, &bounds),
            None => vec![],
        }
    }

    /// Like `normalize`, with bounds the caller already has.
    pub fn normalize_within(&self, points: &[Point], bounds: &Bounds) -> Vec<Pixel> {
        let (range_x, range_y) = bounds.ranges(self.epsilon);
        let span_x = self.width.saturating_sub(1);
        let span_y = self.height.saturating_sub(1);
        points
            .iter()
            .map(|p| {
                Pixel(
                    scale(p.x, bounds.min_x, range_x, span_x),
                    scale(p.y, bounds.min_y, range_y, span_y),
                )
            })
            .collect()
    }

    /// Places points from the square `[-1, 1]²` at fixed positions,
    /// `int((v + 1) / 2 × dimension)` per axis, whatever their spread.
    /// Points on or past the far edge land on the last pixel.
    pub fn normalize_unit(&self, points: &[Point]) -> Vec<Pixel> {
        points
            .iter()
            .map(|p| Pixel(unit(p.x, self.width), unit(p.y, self.height)))
            .collect()
    }
}

fn unit(v: f64, dimension: usize) -> usize {
    let scaled = (v + 1.0) / 2.0 * dimension as f64;
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else {
        (scaled as usize).min(dimension.saturating_sub(1))
    }
}

#[inline]
fn scale(v: f64, min: f64, range: f64, span: usize) -> usize {
    let scaled = (v - min) / range * span as f64;
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else if scaled >= span as f64 {
        span
    } else {
        scaled as usize
    }
}
