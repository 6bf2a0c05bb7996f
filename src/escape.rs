// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time fields.
//!
//! For every sampled pixel we map the pixel to the complex plane and
//! iterate `z -> f(z, c)` while `|z| <= bound`, counting updates.  A
//! count equal to `max_iter` means the orbit never escaped.  With a
//! stride S only every S-th pixel in each direction is computed; the
//! colorizer later fills the S×S block it stands for.
//!
//! The Newton basin field lives here too: it is the same per-pixel
//! scan, it just records which cube root of unity a pixel converged
//! toward in addition to how long that took.

use itertools::iproduct;
use num::Complex;

use crate::errors::{Result, WallpaperError};
use crate::planes::{ComplexPlane, Pixel, PlaneMapper};

/// The per-pattern update rule.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum EscapeRule {
    /// `z0 = 0`, `z -> z² + c`, `c` = pixel.
    Mandelbrot,
    /// `z0` = pixel, `z -> z² + c` for a fixed `c`.
    Julia(Complex<f64>),
    /// `z0 = 0`, `z -> (|re z| + i |im z|)² + c`.
    BurningShip,
    /// `z0 = 0`, `z -> conj(z)² + c`.
    Tricorn,
}

impl EscapeRule {
    /// Starting `z` and the constant `c` for a pixel's point.
    fn start(self, point: Complex<f64>) -> (Complex<f64>, Complex<f64>) {
        match self {
            EscapeRule::Julia(c) => (point, c),
            _ => (Complex::new(0.0, 0.0), point),
        }
    }

    /// One update.
    #[inline]
    pub fn update(self, z: Complex<f64>, c: Complex<f64>) -> Complex<f64> {
        match self {
            EscapeRule::Mandelbrot | EscapeRule::Julia(_) => z * z + c,
            EscapeRule::BurningShip => {
                let folded = Complex::new(z.re.abs(), z.im.abs());
                folded * folded + c
            }
            EscapeRule::Tricorn => {
                let conj = z.conj();
                conj * conj + c
            }
        }
    }
}

/// What kind of field a pattern renders.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FieldKind {
    /// Classic escape time with the given rule.
    Escape(EscapeRule),
    /// Newton's method on `z³ - 1`.
    Newton,
}

/// Everything needed to compute one field.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EscapeSpec {
    /// Which recurrence runs per pixel.
    pub kind: FieldKind,
    /// The part of the complex plane spread over the canvas.
    pub region: ComplexPlane,
    /// Iteration cap; reaching it means "did not escape".
    pub max_iter: u32,
    /// Escape happens once `|z|` exceeds this.
    pub bound: f64,
}

/// One computed sample.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Updates performed before escaping, or `max_iter`.  Newton
    /// samples hold the last loop index, at most `max_iter - 1`.
    pub count: u32,
    /// Index of the nearest root, for Newton fields only.
    pub root: Option<usize>,
}

/// A grid of samples taken every `stride` pixels over a
/// `width`×`height` canvas, stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct EscapeField {
    /// Canvas width the field was sampled for.
    pub width: usize,
    /// Canvas height the field was sampled for.
    pub height: usize,
    /// Distance between sampled pixels.
    pub stride: usize,
    /// The cap the counts were computed against.
    pub max_iter: u32,
    samples: Vec<Sample>,
    columns: usize,
}

impl EscapeField {
    /// Iterates `(top-left pixel of the block, sample)` in scan order:
    /// rows top to bottom, left to right inside a row.
    pub fn iter(&self) -> impl Iterator<Item = (Pixel, Sample)> + '_ {
        let columns = self.columns.max(1);
        let stride = self.stride;
        self.samples
            .iter()
            .enumerate()
            .map(move |(i, s)| (Pixel((i % columns) * stride, (i / columns) * stride), *s))
    }
}

// Principal cube roots of unity.
const ROOTS: [(f64, f64); 3] = [(1.0, 0.0), (-0.5, 0.866), (-0.5, -0.866)];
const NEWTON_TOLERANCE: f64 = 1e-10;

/// Computes fields for one spec.
pub struct FieldGenerator<'a> {
    name: &'a str,
    spec: &'a EscapeSpec,
}

impl<'a> FieldGenerator<'a> {
    /// `name` is only used for error reports.
    pub fn new(name: &'a str, spec: &'a EscapeSpec) -> Self {
        FieldGenerator { name, spec }
    }

    fn divergence(&self, step: usize) -> WallpaperError {
        WallpaperError::NumericDivergence {
            pattern: self.name.to_string(),
            step,
        }
    }

    /// Samples every `stride`-th pixel of a `width`×`height` canvas.
    pub fn generate(&self, width: usize, height: usize, stride: usize) -> Result<EscapeField> {
        if stride == 0 {
            return Err(WallpaperError::InvalidConfig(
                "sub-sampling stride must be at least 1".to_string(),
            ));
        }
        let plane = PlaneMapper::from_plane(width, height, self.spec.region)
            .map_err(WallpaperError::InvalidConfig)?;
        if plane.is_empty() {
            return Err(WallpaperError::InvalidConfig(format!(
                "cannot sample an empty {}x{} field",
                width, height
            )));
        }
        let columns = (width + stride - 1) / stride;
        let rows = (height + stride - 1) / stride;
        let mut samples = Vec::with_capacity(columns * rows);
        for (row, column) in iproduct!(0..rows, 0..columns) {
            let point = plane.pixel_to_point(&Pixel(column * stride, row * stride));
            let sample = match self.spec.kind {
                FieldKind::Escape(rule) => self.escape(rule, point),
                FieldKind::Newton => self.newton(point),
            };
            samples.push(sample.map_err(|step| self.divergence(step))?);
        }
        Ok(EscapeField {
            width,
            height,
            stride,
            max_iter: self.spec.max_iter,
            samples,
            columns,
        })
    }

    // Err carries the update that went non-finite.
    fn escape(&self, rule: EscapeRule, point: Complex<f64>) -> std::result::Result<Sample, usize> {
        let (mut z, c) = rule.start(point);
        let mut n = 0;
        loop {
            if !(z.re.is_finite() && z.im.is_finite()) {
                return Err(n as usize);
            }
            if z.norm() > self.spec.bound || n >= self.spec.max_iter {
                break;
            }
            z = rule.update(z, c);
            n += 1;
        }
        Ok(Sample { count: n, root: None })
    }

    // `count` is the index of the last loop pass: the step that hit the
    // tolerance, or `max_iter - 1` when the cap ran out.
    fn newton(&self, point: Complex<f64>) -> std::result::Result<Sample, usize> {
        let mut z = point;
        let mut steps = 0;
        for i in 0..self.spec.max_iter {
            steps = i;
            if z.norm() < NEWTON_TOLERANCE {
                break;
            }
            z = z - (z * z * z - 1.0) / (z * z * 3.0);
            if !(z.re.is_finite() && z.im.is_finite()) {
                return Err(i as usize);
            }
        }
        let root = ROOTS
            .iter()
            .map(|&(re, im)| (z - Complex::new(re, im)).norm())
            .enumerate()
            .fold((0, std::f64::INFINITY), |best, (i, d)| {
                if d < best.1 {
                    (i, d)
                } else {
                    best
                }
            })
            .0;
        Ok(Sample { count: steps, root: Some(root) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mandelbrot(max_iter: u32) -> EscapeSpec {
        EscapeSpec {
            kind: FieldKind::Escape(EscapeRule::Mandelbrot),
            region: ComplexPlane::new(-2.5, -1.25, 1.0, 1.25),
            max_iter,
            bound: 2.0,
        }
    }

    #[test]
    fn origin_never_escapes() {
        let spec = EscapeSpec {
            region: ComplexPlane::new(-0.1, -0.1, 0.1, 0.1),
            ..mandelbrot(50)
        };
        let field = FieldGenerator::new("m", &spec).generate(10, 10, 1).unwrap();
        assert!(field.iter().all(|(_, s)| s.count == 50));
    }

    #[test]
    fn far_points_escape_after_one_update() {
        let spec = EscapeSpec {
            region: ComplexPlane::new(10.0, 10.0, 11.0, 11.0),
            ..mandelbrot(50)
        };
        let field = FieldGenerator::new("m", &spec).generate(4, 4, 1).unwrap();
        assert!(field.iter().all(|(_, s)| s.count == 1));
    }

    #[test]
    fn stride_samples_every_other_pixel() {
        let spec = mandelbrot(20);
        let field = FieldGenerator::new("m", &spec).generate(5, 4, 2).unwrap();
        let corners: Vec<Pixel> = field.iter().map(|(p, _)| p).collect();
        assert_eq!(
            corners,
            vec![
                Pixel(0, 0),
                Pixel(2, 0),
                Pixel(4, 0),
                Pixel(0, 2),
                Pixel(2, 2),
                Pixel(4, 2)
            ]
        );
    }

    #[test]
    fn zero_stride_is_rejected() {
        let spec = mandelbrot(20);
        assert!(FieldGenerator::new("m", &spec).generate(5, 5, 0).is_err());
    }

    #[test]
    fn empty_fields_are_rejected() {
        let spec = mandelbrot(20);
        match FieldGenerator::new("m", &spec).generate(0, 5, 1) {
            Err(WallpaperError::InvalidConfig(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn burning_ship_folds_before_squaring() {
        let z = Complex::new(-1.0, -2.0);
        let c = Complex::new(0.0, 0.0);
        // (1 + 2i)² = -3 + 4i
        assert_eq!(EscapeRule::BurningShip.update(z, c), Complex::new(-3.0, 4.0));
        // conj(-1 - 2i)² = (-1 + 2i)² = -3 - 4i
        assert_eq!(EscapeRule::Tricorn.update(z, c), Complex::new(-3.0, -4.0));
        assert_eq!(EscapeRule::Mandelbrot.update(z, c), Complex::new(-3.0, 4.0));
    }

    #[test]
    fn julia_starts_from_the_pixel() {
        let c = Complex::new(-0.7, 0.27015);
        let spec = EscapeSpec {
            kind: FieldKind::Escape(EscapeRule::Julia(c)),
            region: ComplexPlane::new(3.0, 3.0, 4.0, 4.0),
            max_iter: 100,
            bound: 2.0,
        };
        let field = FieldGenerator::new("j", &spec).generate(2, 2, 1).unwrap();
        // |z0| > 2 already, so no update runs.
        assert!(field.iter().all(|(_, s)| s.count == 0));
    }

    #[test]
    fn non_finite_regions_diverge() {
        let spec = EscapeSpec {
            region: ComplexPlane::new(std::f64::NEG_INFINITY, 0.0, 0.0, 1.0),
            ..mandelbrot(10)
        };
        let err = FieldGenerator::new("bad", &spec).generate(4, 4, 1).unwrap_err();
        assert!(err.is_divergence());
    }

    #[test]
    fn newton_finds_the_real_root() {
        let spec = EscapeSpec {
            kind: FieldKind::Newton,
            region: ComplexPlane::new(0.9, -0.1, 1.1, 0.1),
            max_iter: 50,
            bound: 2.0,
        };
        let field = FieldGenerator::new("n", &spec).generate(3, 3, 1).unwrap();
        assert!(field.iter().all(|(_, s)| s.root == Some(0)));
    }

    #[test]
    fn newton_counts_stop_one_short_of_the_cap() {
        // Starting exactly on a root never brings |z| under the tolerance.
        let spec = EscapeSpec {
            kind: FieldKind::Newton,
            region: ComplexPlane::new(1.0, 0.0, 2.0, 1.0),
            max_iter: 50,
            bound: 2.0,
        };
        let field = FieldGenerator::new("n", &spec).generate(1, 1, 1).unwrap();
        let samples: Vec<Sample> = field.iter().map(|(_, s)| s).collect();
        assert_eq!(samples, vec![Sample { count: 49, root: Some(0) }]);
    }

    #[test]
    fn newton_counts_the_step_that_reached_the_origin() {
        let spec = EscapeSpec {
            kind: FieldKind::Newton,
            region: ComplexPlane::new(0.0, 0.0, 1.0, 1.0),
            max_iter: 50,
            bound: 2.0,
        };
        let field = FieldGenerator::new("n", &spec).generate(1, 1, 1).unwrap();
        assert!(field.iter().all(|(_, s)| s.count == 0));
    }
}
