// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Point-sequence generators: discrete maps, Euler-integrated flows,
//! iterated function systems and parametric curves.
//!
//! A recurrence is applied `warmup` times from its seed without
//! recording, then `samples` more times, recording the projection of
//! every resulting state.  Everything here is deterministic except the
//! IFS family, which draws its selector from the `StdRng` handed to the
//! generator; seed that and the IFS is reproducible too.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

use crate::errors::{Result, WallpaperError};

/// The full state of a system.  Two-dimensional maps leave the third
/// component at zero.
pub type State = [f64; 3];

/// A plotted point, already projected to two dimensions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    /// Horizontal coordinate before normalization.
    pub x: f64,
    /// Vertical coordinate before normalization.
    pub y: f64,
}

impl Point {
    /// Constructor.
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Both coordinates are neither NaN nor infinite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Recorded points, in the order they were produced.
pub type PointSequence = Vec<Point>;

/// Which two state axes are plotted.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Projection {
    /// Plot (x, y).
    XY,
    /// Plot (x, z).
    XZ,
}

impl Projection {
    /// Drops the unplotted axis.
    pub fn project(self, s: &State) -> Point {
        match self {
            Projection::XY => Point::new(s[0], s[1]),
            Projection::XZ => Point::new(s[0], s[2]),
        }
    }
}

/// Right-hand sides of the continuous systems.  Each returns the
/// derivative (dx, dy, dz) at a state.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum VectorField {
    /// Lorenz system.
    Lorenz {
        /// Prandtl number, the coupling of x to y.
        sigma: f64,
        /// Rayleigh number, the drive on y.
        rho: f64,
        /// Damping of z.
        beta: f64,
    },
    /// Rössler system.
    Rossler {
        /// Feedback of y on itself.
        a: f64,
        /// Constant drive on z.
        b: f64,
        /// Threshold x must pass for z to grow.
        c: f64,
    },
    /// Thomas' cyclically symmetric attractor.
    Thomas {
        /// Damping shared by all three axes.
        b: f64,
    },
    /// Aizawa (Langford) attractor.
    Aizawa {
        /// Linear growth of z.
        a: f64,
        /// Offset of z in the x and y rotation terms.
        b: f64,
        /// Constant drive on z.
        c: f64,
        /// Rotation rate in the xy plane.
        d: f64,
        /// Coupling of the xy radius to z.
        e: f64,
        /// Weight of the `z x³` term.
        f: f64,
    },
    /// Dadras attractor.
    Dadras {
        /// Damping of x.
        a: f64,
        /// Weight of `y z` in dx.
        b: f64,
        /// Growth of y.
        c: f64,
        /// Weight of `x y` in dz.
        d: f64,
        /// Damping of z.
        e: f64,
    },
    /// Chen (Chen-Lee form) attractor.
    Chen {
        /// Growth of x.
        a: f64,
        /// Growth of y.
        b: f64,
        /// Growth of z.
        c: f64,
    },
    /// Halvorsen attractor.
    Halvorsen {
        /// Damping shared by all three axes.
        a: f64,
    },
    /// Four-wing attractor.
    FourWing {
        /// Growth of x.
        a: f64,
        /// Coupling of x into y.
        b: f64,
        /// Growth of y.
        c: f64,
    },
}

impl VectorField {
    /// The derivative at `s`.
    pub fn derivative(&self, s: &State) -> State {
        let [x, y, z] = *s;
        match *self {
            VectorField::Lorenz { sigma, rho, beta } => {
                [sigma * (y - x), x * (rho - z) - y, x * y - beta * z]
            }
            VectorField::Rossler { a, b, c } => [-y - z, x + a * y, b + z * (x - c)],
            VectorField::Thomas { b } => [y.sin() - b * x, z.sin() - b * y, x.sin() - b * z],
            VectorField::Aizawa { a, b, c, d, e, f } => [
                (z - b) * x - d * y,
                d * x + (z - b) * y,
                c + a * z - z.powi(3) / 3.0 - (x.powi(2) + y.powi(2)) * (1.0 + e * z)
                    + f * z * x.powi(3),
            ],
            VectorField::Dadras { a, b, c, d, e } => {
                [y - a * x + b * y * z, c * y - x * z + z, d * x * y - e * z]
            }
            VectorField::Chen { a, b, c } => [a * x - y * z, b * y + x * z, c * z + x * y / 3.0],
            VectorField::Halvorsen { a } => [
                -a * x - 4.0 * y - 4.0 * z - y.powi(2),
                -a * y - 4.0 * z - 4.0 * x - z.powi(2),
                -a * z - 4.0 * x - 4.0 * y - x.powi(2),
            ],
            VectorField::FourWing { a, b, c } => [a * x + y * z, b * x + c * y - x * z, -z - x * y],
        }
    }
}

/// One affine map `(x, y) -> (a x + b y + e, c x + d y + f)` of an
/// iterated function system, with the cumulative probability bound
/// under which it is chosen.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Affine {
    /// Matrix and translation coefficients, in `a b c d e f` order.
    pub coefficients: [f64; 6],
    /// The map is chosen when the uniform selector is below this bound
    /// and not below the previous map's.
    pub cumulative: f64,
}

impl Affine {
    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.coefficients;
        (a * x + b * y + e, c * x + d * y + f)
    }
}

/// A state-to-state step function.
#[derive(Clone, Debug, PartialEq)]
pub enum Recurrence {
    /// Peter de Jong map,
    /// `(sin(a y) - cos(b x), sin(c x) - cos(d y))`.
    DeJong {
        /// Frequency of y in the new x.
        a: f64,
        /// Frequency of x in the new x.
        b: f64,
        /// Frequency of x in the new y.
        c: f64,
        /// Frequency of y in the new y.
        d: f64,
    },
    /// Clifford map; also the Pickover form.
    /// `(sin(a y) + c cos(a x), sin(b x) + d cos(b y))`.
    Clifford {
        /// Frequency of the new x terms.
        a: f64,
        /// Frequency of the new y terms.
        b: f64,
        /// Weight of the cosine in the new x.
        c: f64,
        /// Weight of the cosine in the new y.
        d: f64,
    },
    /// Hénon map, `(1 - a x² + y, b x)`.
    Henon {
        /// Strength of the quadratic fold.
        a: f64,
        /// Contraction carried from x into y.
        b: f64,
    },
    /// Ikeda map.
    Ikeda {
        /// Contraction per step; chaotic around 0.9.
        u: f64,
    },
    /// Gingerbreadman map.
    Gingerbreadman,
    /// Tinkerbell map,
    /// `(x² - y² + a x + b y, 2 x y + c x + d y)`.
    Tinkerbell {
        /// Weight of x in the new x.
        a: f64,
        /// Weight of y in the new x.
        b: f64,
        /// Weight of x in the new y.
        c: f64,
        /// Weight of y in the new y.
        d: f64,
    },
    /// A continuous system advanced by one explicit Euler step of `dt`.
    Flow {
        /// The derivative being integrated.
        field: VectorField,
        /// Euler step size.
        dt: f64,
    },
    /// Random iterated function system.  Maps must be sorted by
    /// `cumulative`; the last bound should be 1.0.
    Ifs(Vec<Affine>),
}

impl Recurrence {
    /// True for the one family that consumes randomness.
    pub fn is_random(&self) -> bool {
        match self {
            Recurrence::Ifs(_) => true,
            _ => false,
        }
    }

    /// Applies the recurrence once.  Only the IFS touches `rng`.
    pub fn step<R: Rng>(&self, s: &State, rng: &mut R) -> State {
        let [x, y, z] = *s;
        match self {
            Recurrence::DeJong { a, b, c, d } => [
                (a * y).sin() - (b * x).cos(),
                (c * x).sin() - (d * y).cos(),
                0.0,
            ],
            Recurrence::Clifford { a, b, c, d } => [
                (a * y).sin() + c * (a * x).cos(),
                (b * x).sin() + d * (b * y).cos(),
                0.0,
            ],
            Recurrence::Henon { a, b } => [1.0 - a * x * x + y, b * x, 0.0],
            Recurrence::Ikeda { u } => {
                let t = 0.4 - 6.0 / (1.0 + x * x + y * y);
                let (sin_t, cos_t) = t.sin_cos();
                [
                    1.0 + u * (x * cos_t - y * sin_t),
                    u * (x * sin_t + y * cos_t),
                    0.0,
                ]
            }
            Recurrence::Gingerbreadman => [1.0 - y + x.abs(), x, 0.0],
            Recurrence::Tinkerbell { a, b, c, d } => [
                x * x - y * y + a * x + b * y,
                2.0 * x * y + c * x + d * y,
                0.0,
            ],
            Recurrence::Flow { field, dt } => {
                let d = field.derivative(s);
                [x + d[0] * dt, y + d[1] * dt, z + d[2] * dt]
            }
            Recurrence::Ifs(maps) => {
                let r: f64 = rng.gen();
                let map = maps
                    .iter()
                    .find(|m| r < m.cumulative)
                    .or_else(|| maps.last());
                match map {
                    Some(m) => {
                        let (nx, ny) = m.apply(x, y);
                        [nx, ny, 0.0]
                    }
                    None => *s,
                }
            }
        }
    }
}

/// Everything needed to iterate one attractor or map.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitSpec {
    /// The step function.
    pub recurrence: Recurrence,
    /// Where iteration starts.
    pub seed: State,
    /// Steps discarded before recording.
    pub warmup: usize,
    /// Default number of recorded points.
    pub samples: usize,
    /// Which axes are plotted.
    pub projection: Projection,
}

/// A closed-form curve sampled on an inclusive linspace over
/// `[0, period]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Curve {
    /// Hypotrochoid with fixed radius `big_r`, rolling radius `r` and pen
    /// offset `l`.
    Spirograph {
        /// Radius of the fixed circle.
        big_r: f64,
        /// Radius of the rolling circle.
        r: f64,
        /// Distance of the pen from the rolling circle's center.
        l: f64,
        /// Full turns of the parameter, each `2π`.
        turns: f64,
    },
    /// `(sin(a t + delta), sin(b t))` over one full period.
    Lissajous {
        /// Horizontal frequency.
        a: f64,
        /// Vertical frequency.
        b: f64,
        /// Phase of the horizontal term.
        delta: f64,
    },
}

impl Curve {
    fn period(&self) -> f64 {
        match *self {
            Curve::Spirograph { turns, .. } => turns * 2.0 * PI,
            Curve::Lissajous { .. } => 2.0 * PI,
        }
    }

    /// The curve at parameter `t`.
    pub fn at(&self, t: f64) -> Point {
        match *self {
            Curve::Spirograph { big_r, r, l, .. } => {
                let k = (big_r - r) / r;
                Point::new(
                    (big_r - r) * t.cos() + l * (k * t).cos(),
                    (big_r - r) * t.sin() - l * (k * t).sin(),
                )
            }
            Curve::Lissajous { a, b, delta } => {
                Point::new((a * t + delta).sin(), (b * t).sin())
            }
        }
    }

    /// `samples` evenly spaced points, both ends included.
    pub fn sample(&self, samples: usize) -> PointSequence {
        let period = self.period();
        match samples {
            0 => vec![],
            1 => vec![self.at(0.0)],
            n => {
                let step = period / (n - 1) as f64;
                (0..n)
                    .map(|i| {
                        let t = if i == n - 1 { period } else { i as f64 * step };
                        self.at(t)
                    })
                    .collect()
            }
        }
    }
}

/// Iterates an `OrbitSpec` and records its trajectory.
pub struct SequenceGenerator<'a> {
    name: &'a str,
    spec: &'a OrbitSpec,
    rng: StdRng,
}

impl<'a> SequenceGenerator<'a> {
    /// `name` is only used for error reports.  `seed` fixes the random
    /// selector of IFS recurrences; without one they draw from entropy.
    pub fn new(name: &'a str, spec: &'a OrbitSpec, seed: Option<u64>) -> Self {
        SequenceGenerator {
            name,
            spec,
            rng: seeded_rng(seed),
        }
    }

    fn divergence(&self, step: usize) -> WallpaperError {
        WallpaperError::NumericDivergence {
            pattern: self.name.to_string(),
            step,
        }
    }

    /// Runs the warm-up, then records `samples` points.  Any non-finite
    /// state fails the whole run.
    pub fn generate(&mut self, samples: usize) -> Result<PointSequence> {
        let mut points = Vec::with_capacity(samples);
        match self.run(samples, &mut points) {
            Some(step) => Err(self.divergence(step)),
            None => Ok(points),
        }
    }

    /// Like `generate`, but a divergence after at least one point was
    /// recorded ends the sequence there instead of failing it.  The
    /// second element is the step that diverged, if any.
    pub fn generate_truncating(
        &mut self,
        samples: usize,
    ) -> Result<(PointSequence, Option<usize>)> {
        let mut points = Vec::with_capacity(samples);
        match self.run(samples, &mut points) {
            Some(step) if points.is_empty() => Err(self.divergence(step)),
            diverged => Ok((points, diverged)),
        }
    }

    // Returns the index of the step that went non-finite, if one did.
    fn run(&mut self, samples: usize, points: &mut PointSequence) -> Option<usize> {
        let spec = self.spec;
        let mut state = spec.seed;
        for i in 0..spec.warmup {
            state = spec.recurrence.step(&state, &mut self.rng);
            if !is_finite(&state) {
                return Some(i);
            }
        }
        for i in 0..samples {
            state = spec.recurrence.step(&state, &mut self.rng);
            let point = spec.projection.project(&state);
            if !is_finite(&state) {
                return Some(spec.warmup + i);
            }
            points.push(point);
        }
        None
    }
}

fn is_finite(s: &State) -> bool {
    s.iter().all(|v| v.is_finite())
}

/// A generator fixed by `seed`, or drawn from entropy without one.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// `samples` points drawn independently and uniformly from the square
/// `[-1, 1)²`, x before y for each point.
pub fn scatter<R: Rng>(rng: &mut R, samples: usize) -> PointSequence {
    (0..samples)
        .map(|_| {
            let x = rng.gen_range(-1.0, 1.0);
            let y = rng.gen_range(-1.0, 1.0);
            Point::new(x, y)
        })
        .collect()
}

/// The Barnsley fern's four maps.
pub fn barnsley_fern() -> Vec<Affine> {
    vec![
        Affine { coefficients: [0.0, 0.0, 0.0, 0.16, 0.0, 0.0], cumulative: 0.01 },
        Affine { coefficients: [0.85, 0.04, -0.04, 0.85, 0.0, 1.6], cumulative: 0.86 },
        Affine { coefficients: [0.2, -0.26, 0.23, 0.22, 0.0, 1.6], cumulative: 0.93 },
        Affine { coefficients: [-0.15, 0.28, 0.26, 0.24, 0.0, 0.44], cumulative: 1.0 },
    ]
}
