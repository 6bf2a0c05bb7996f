// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Turns generator output into `(pixel, color)` writes for the
//! renderer.  Every strategy is lazy so a full-size field never
//! needs a second buffer.

use std::f64::consts::PI;

use crate::escape::{EscapeField, Sample};
use crate::gradient::{ColorSpec, GradientRule, BLACK};
use crate::orbit::Point;
use crate::planes::Pixel;

/// Color of the `index`-th of `len` recorded points.  Depends only on
/// position in the sequence, never on where the point landed.
pub fn sequence_color(rule: &GradientRule, index: usize, len: usize) -> ColorSpec {
    if len == 0 {
        return rule.color_at(0.0);
    }
    rule.color_at(index as f64 / len as f64)
}

/// Pairs each normalized pixel with its sequence-order color.
pub fn sequence_order<'a>(
    rule: &'a GradientRule,
    pixels: &'a [Pixel],
) -> impl Iterator<Item = (Pixel, ColorSpec)> + 'a {
    let len = pixels.len();
    pixels
        .iter()
        .enumerate()
        .map(move |(i, p)| (*p, sequence_color(rule, i, len)))
}

/// A color computed from a point's own coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PointColor {
    /// Red from `|sin(x y) + cos(x - y)|`, green from
    /// `|sin(π x) cos(π y)|`, each halved, scaled to 255 by
    /// `brightness` and clipped.  Blue is the mean of the two.
    SineCosine {
        /// Gain applied before clipping.
        brightness: f64,
    },
}

impl PointColor {
    /// The color of `p`.
    pub fn color_at(&self, p: Point) -> ColorSpec {
        match *self {
            PointColor::SineCosine { brightness } => {
                let red = ((p.x * p.y).sin() + (p.x - p.y).cos()).abs();
                let green = ((PI * p.x).sin() * (PI * p.y).cos()).abs();
                let gain = 255.0 / 2.0 * brightness;
                let ColorSpec(r, g, _) = ColorSpec::from_channels(red * gain, green * gain, 0.0);
                ColorSpec(r, g, ((u16::from(r) + u16::from(g)) / 2) as u8)
            }
        }
    }
}

/// Pairs each pixel with the color of the point it was placed from.
pub fn point_order<'a>(
    color: &'a PointColor,
    points: &'a [Point],
    pixels: &'a [Pixel],
) -> impl Iterator<Item = (Pixel, ColorSpec)> + 'a {
    pixels
        .iter()
        .zip(points.iter())
        .map(move |(px, p)| (*px, color.color_at(*p)))
}

/// Color for an escape count.  A count at (or beyond) the cap is black
/// whatever the rule says.
pub fn iteration_color(rule: &GradientRule, count: u32, max_iter: u32) -> ColorSpec {
    if count >= max_iter {
        return BLACK;
    }
    rule.color_at(f64::from(count) / f64::from(max_iter))
}

/// Color for a Newton sample: the root's color dimmed by how many steps
/// the pixel needed.
pub fn basin_color(roots: &[ColorSpec], sample: Sample, max_iter: u32) -> ColorSpec {
    let base = sample
        .root
        .and_then(|i| roots.get(i).copied())
        .unwrap_or(BLACK);
    if max_iter == 0 {
        return base;
    }
    base.scaled(f64::from(sample.count) / f64::from(max_iter))
}

/// How a field's samples become colors.
#[derive(Copy, Clone, Debug)]
pub enum FieldPalette<'a> {
    /// `iteration_color` with this rule.
    IterationRatio(&'a GradientRule),
    /// `basin_color` with these root colors.
    RootBasin(&'a [ColorSpec]),
}

impl<'a> FieldPalette<'a> {
    fn color(&self, sample: Sample, max_iter: u32) -> ColorSpec {
        match self {
            FieldPalette::IterationRatio(rule) => iteration_color(rule, sample.count, max_iter),
            FieldPalette::RootBasin(roots) => basin_color(roots, sample, max_iter),
        }
    }
}

/// Every canvas pixel covered by the field, each block filled with its
/// sample's color.  Blocks at the right and bottom edges are cut to the
/// canvas.
pub fn field_pixels<'a>(
    field: &'a EscapeField,
    palette: FieldPalette<'a>,
) -> impl Iterator<Item = (Pixel, ColorSpec)> + 'a {
    let (width, height, stride, max_iter) = (field.width, field.height, field.stride, field.max_iter);
    field.iter().flat_map(move |(corner, sample)| {
        let color = palette.color(sample, max_iter);
        let right = (corner.0 + stride).min(width);
        let bottom = (corner.1 + stride).min(height);
        (corner.1..bottom)
            .flat_map(move |y| (corner.0..right).map(move |x| (Pixel(x, y), color)))
    })
}
