// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane with an arbitrary pair of
//! corners defining the leftlower and rightupper corners of the complex
//! plane.  Escape-time fields use it to find the parameter behind each
//! pixel they sample.
use num::Complex;

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of the
/// Complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

impl ComplexPlane {
    /// Shorthand taking the four extents directly.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        ComplexPlane(Complex::new(x_min, y_min), Complex::new(x_max, y_max))
    }
}

/// Describes the x, y of a pixel in an image.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels of the integral plane onto the complex plane.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The right-upper hand corner of the integral cartesian plane.
    /// The left-lower is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    /// The two coordinates defining the complex cartesian plane,
    /// left-lower and right-upper
    pub complex_plane: ComplexPlane,
    // Width and height of the complex region.
    extent: (f64, f64),
}

impl PlaneMapper {
    /// Takes the size of the integral plane and two points describing
    /// the complex plane.
    pub fn new(
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<PlaneMapper, String> {
        if rightupper.re < leftlower.re {
            return Err(
                "The left lower corner is not to the left of the right upper corner.".to_string(),
            );
        }

        if rightupper.im < leftlower.im {
            return Err(
                "The left lower corner is not lower than the right upper corner".to_string(),
            );
        }

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(leftlower, rightupper),
            extent: (rightupper.re - leftlower.re, rightupper.im - leftlower.im),
        })
    }

    /// Same as `new`, from a `ComplexPlane`.
    pub fn from_plane(width: usize, height: usize, plane: ComplexPlane) -> Result<Self, String> {
        PlaneMapper::new(width, height, plane.0, plane.1)
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Given a pixel on the integral cartesian plane, map it to the
    /// complex plane as `min + (pixel / size) * extent`.  Pixel 0 lands
    /// exactly on the left-lower corner; the right-upper corner itself is
    /// one pixel past the end of the grid.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let origin = self.complex_plane.0;
        Complex::new(
            origin.re + (pixel.0 as f64 / self.integral_plane.0 as f64) * self.extent.0,
            origin.im + (pixel.1 as f64 / self.integral_plane.1 as f64) * self.extent.1,
        )
    }
}
