// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The pattern table.  Every wallpaper is one entry here: a generator
//! definition, its constants, its gradient and its file name.  Order
//! matters; it is the menu numbering.

use num::Complex;
use std::f64::consts::PI;

use crate::colorize::PointColor;
use crate::escape::{EscapeRule, EscapeSpec, FieldKind};
use crate::gradient::{ColorSpec, GradientRule, Stop};
use crate::orbit::{barnsley_fern, Curve, OrbitSpec, Projection, Recurrence, VectorField};
use crate::planes::ComplexPlane;

/// How a pattern produces its pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum Family {
    /// An iterated map, flow or IFS, colored by sequence order.
    Orbit(OrbitSpec),
    /// A closed-form curve, colored by sequence order.
    Curve {
        /// The curve.
        curve: Curve,
        /// Default number of samples.
        samples: usize,
    },
    /// An escape-time field, colored by iteration ratio.
    Field(EscapeSpec),
    /// Random points in `[-1, 1]²`, each colored from its own
    /// coordinates.
    Scatter {
        /// Default number of points.
        samples: usize,
    },
}

impl Family {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Family::Orbit(_) => "orbit",
            Family::Curve { .. } => "curve",
            Family::Field(_) => "field",
            Family::Scatter { .. } => "scatter",
        }
    }
}

/// How a pattern is colored.
#[derive(Clone, Debug, PartialEq)]
pub enum Coloring {
    /// A ratio-to-color rule.
    Gradient(GradientRule),
    /// One color per Newton root.
    Roots(Vec<ColorSpec>),
    /// A color computed from each point's coordinates.
    Function(PointColor),
}

/// One catalog entry.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternSpec {
    /// Short identifier used on the command line and in file names.
    pub name: &'static str,
    /// Human-readable title for the menu.
    pub title: &'static str,
    /// Generator definition and constants.
    pub family: Family,
    /// Color rule.
    pub coloring: Coloring,
}

impl PatternSpec {
    /// Default output file name.
    pub fn file_name(&self) -> String {
        format!("{}.png", self.name)
    }
}

fn orbit(
    recurrence: Recurrence,
    seed: [f64; 3],
    warmup: usize,
    samples: usize,
    projection: Projection,
) -> Family {
    Family::Orbit(OrbitSpec {
        recurrence,
        seed,
        warmup,
        samples,
        projection,
    })
}

fn flow(field: VectorField, dt: f64, warmup: usize, projection: Projection) -> Family {
    orbit(
        Recurrence::Flow { field, dt },
        [1.0, 1.0, 1.0],
        warmup,
        300_000,
        projection,
    )
}

fn map2(recurrence: Recurrence, warmup: usize) -> Family {
    orbit(recurrence, [0.0, 0.0, 0.0], warmup, 300_000, Projection::XY)
}

fn field(kind: FieldKind, region: ComplexPlane, max_iter: u32) -> Family {
    Family::Field(EscapeSpec {
        kind,
        region,
        max_iter,
        bound: 2.0,
    })
}

fn linear(from: (u8, u8, u8), to: (u8, u8, u8)) -> Coloring {
    Coloring::Gradient(GradientRule::linear(from, to))
}

fn pattern(name: &'static str, title: &'static str, family: Family, coloring: Coloring) -> PatternSpec {
    PatternSpec {
        name,
        title,
        family,
        coloring,
    }
}

/// Every pattern, in menu order.
pub fn catalog() -> Vec<PatternSpec> {
    vec![
        pattern(
            "random_math_art",
            "Random Mathematical Art",
            Family::Scatter { samples: 300_000 },
            Coloring::Function(PointColor::SineCosine { brightness: 1.5 }),
        ),
        pattern(
            "dejong_attractor",
            "de Jong Attractor",
            map2(Recurrence::DeJong { a: 2.01, b: -2.53, c: 1.61, d: -0.33 }, 100),
            linear((128, 0, 128), (255, 255, 255)),
        ),
        pattern(
            "spirograph",
            "Spirograph Pattern",
            Family::Curve {
                curve: Curve::Spirograph { big_r: 200.0, r: 80.0, l: 90.0, turns: 10.0 },
                samples: 10_000,
            },
            linear((128, 0, 128), (255, 255, 255)),
        ),
        pattern(
            "clifford_attractor",
            "Clifford Attractor",
            map2(Recurrence::Clifford { a: -1.4, b: 1.6, c: 1.0, d: 0.7 }, 100),
            linear((0, 255, 255), (255, 0, 255)),
        ),
        pattern(
            "henon_attractor",
            "Hénon Attractor",
            map2(Recurrence::Henon { a: 1.4, b: 0.3 }, 100),
            linear((0, 0, 128), (128, 191, 255)),
        ),
        pattern(
            "ikeda_attractor",
            "Ikeda Attractor",
            map2(Recurrence::Ikeda { u: 0.9 }, 100),
            linear((0, 0, 139), (139, 255, 255)),
        ),
        pattern(
            "lorenz_attractor",
            "Lorenz Attractor",
            orbit(
                Recurrence::Flow {
                    field: VectorField::Lorenz { sigma: 10.0, rho: 28.0, beta: 8.0 / 3.0 },
                    dt: 0.01,
                },
                [1.0, 1.0, 1.0],
                1000,
                200_000,
                Projection::XZ,
            ),
            linear((139, 0, 0), (255, 255, 0)),
        ),
        pattern(
            "julia_set",
            "Julia Set",
            field(
                FieldKind::Escape(EscapeRule::Julia(Complex::new(-0.7, 0.27015))),
                ComplexPlane::new(-2.0, -2.0, 2.0, 2.0),
                100,
            ),
            linear((0, 0, 139), (139, 255, 255)),
        ),
        pattern(
            "mandelbrot_set",
            "Mandelbrot Set",
            field(
                FieldKind::Escape(EscapeRule::Mandelbrot),
                ComplexPlane::new(-2.5, -1.25, 1.0, 1.25),
                80,
            ),
            linear((0, 0, 128), (128, 191, 255)),
        ),
        pattern(
            "barnsley_fern",
            "Barnsley Fern",
            orbit(
                Recurrence::Ifs(barnsley_fern()),
                [0.0, 0.0, 0.0],
                0,
                300_000,
                Projection::XY,
            ),
            linear((0, 50, 0), (50, 238, 144)),
        ),
        pattern(
            "lissajous_curve",
            "Lissajous Curve",
            Family::Curve {
                curve: Curve::Lissajous { a: 3.0, b: 2.0, delta: PI / 2.0 },
                samples: 50_000,
            },
            linear((64, 224, 208), (255, 255, 255)),
        ),
        pattern(
            "rossler_attractor",
            "Rössler Attractor (Rainbow Spiral)",
            flow(VectorField::Rossler { a: 0.2, b: 0.2, c: 5.7 }, 0.01, 1000, Projection::XY),
            Coloring::Gradient(GradientRule::Rainbow),
        ),
        pattern(
            "thomas_attractor",
            "Thomas Attractor",
            flow(VectorField::Thomas { b: 0.208_186 }, 0.1, 1000, Projection::XZ),
            linear((0, 100, 255), (100, 255, 255)),
        ),
        pattern(
            "aizawa_attractor",
            "Aizawa Attractor (Cosmic Butterfly)",
            flow(
                VectorField::Aizawa { a: 0.95, b: 0.7, c: 0.6, d: 3.5, e: 0.25, f: 0.1 },
                0.01,
                1000,
                Projection::XY,
            ),
            linear((75, 0, 130), (255, 215, 0)),
        ),
        pattern(
            "dadras_attractor",
            "Dadras Attractor (Neon Lightning)",
            flow(
                VectorField::Dadras { a: 3.0, b: 2.7, c: 1.7, d: 2.0, e: 9.0 },
                0.005,
                1000,
                Projection::XZ,
            ),
            linear((0, 255, 127), (64, 224, 255)),
        ),
        pattern(
            "chen_attractor",
            "Chen Attractor (Fiery Phoenix)",
            flow(VectorField::Chen { a: 5.0, b: -10.0, c: -0.38 }, 0.003, 1000, Projection::XY),
            linear((255, 0, 0), (255, 255, 50)),
        ),
        pattern(
            "halvorsen_attractor",
            "Halvorsen Attractor",
            flow(VectorField::Halvorsen { a: 1.89 }, 0.005, 1000, Projection::XY),
            linear((0, 255, 100), (100, 155, 255)),
        ),
        pattern(
            "newton_fractal",
            "Newton Fractal",
            field(FieldKind::Newton, ComplexPlane::new(-2.0, -2.0, 2.0, 2.0), 50),
            Coloring::Roots(vec![
                ColorSpec(255, 0, 0),
                ColorSpec(0, 255, 0),
                ColorSpec(0, 0, 255),
            ]),
        ),
        pattern(
            "burning_ship",
            "Burning Ship (Molten Lava)",
            field(
                FieldKind::Escape(EscapeRule::BurningShip),
                ComplexPlane::new(-2.5, -2.0, 1.5, 1.0),
                100,
            ),
            Coloring::Gradient(GradientRule::Stops(vec![
                Stop { at: 0.0, rgb: [0.0, 0.0, 0.0] },
                Stop { at: 0.5, rgb: [255.0, 0.0, 25.0] },
                Stop { at: 1.0, rgb: [255.0, 255.0, 50.0] },
            ])),
        ),
        pattern(
            "tricorn_fractal",
            "Tricorn Fractal",
            field(
                FieldKind::Escape(EscapeRule::Tricorn),
                ComplexPlane::new(-2.5, -1.5, 1.0, 1.5),
                100,
            ),
            linear((100, 150, 255), (255, 255, 255)),
        ),
        pattern(
            "pickover_attractor",
            "Pickover Attractor",
            map2(Recurrence::Clifford { a: 2.24, b: 0.43, c: -0.65, d: -2.43 }, 0),
            linear((100, 255, 100), (255, 100, 255)),
        ),
        pattern(
            "gingerbreadman_map",
            "Gingerbreadman Map",
            orbit(
                Recurrence::Gingerbreadman,
                // from the origin the map falls into a six-point cycle
                [-0.1, 0.0, 0.0],
                0,
                300_000,
                Projection::XY,
            ),
            linear((139, 69, 19), (255, 215, 100)),
        ),
        pattern(
            "tinkerbell_map",
            "Tinkerbell Map",
            orbit(
                Recurrence::Tinkerbell { a: 0.9, b: -0.6013, c: 2.0, d: 0.5 },
                // the origin is a fixed point of this map
                [-0.72, -0.64, 0.0],
                0,
                300_000,
                Projection::XY,
            ),
            linear((255, 105, 180), (255, 255, 0)),
        ),
        pattern(
            "four_wing_attractor",
            "Four Wing Attractor",
            flow(VectorField::FourWing { a: 0.2, b: 0.01, c: -0.4 }, 0.01, 0, Projection::XY),
            linear((255, 165, 0), (0, 0, 255)),
        ),
    ]
}

/// Looks a pattern up by name.  Accepts the exact name, or the name
/// without its `_attractor`/`_map`/... suffix.
pub fn find<'a>(patterns: &'a [PatternSpec], name: &str) -> Option<&'a PatternSpec> {
    let wanted = name.trim().to_lowercase();
    patterns.iter().find(|p| p.name == wanted).or_else(|| {
        patterns
            .iter()
            .find(|p| p.name.split('_').next() == Some(wanted.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let patterns = catalog();
        let names: HashSet<&str> = patterns.iter().map(|p| p.name).collect();
        assert_eq!(names.len(), patterns.len());
    }

    #[test]
    fn find_by_full_or_short_name() {
        let patterns = catalog();
        assert_eq!(find(&patterns, "lorenz_attractor").unwrap().name, "lorenz_attractor");
        assert_eq!(find(&patterns, "Henon").unwrap().name, "henon_attractor");
        assert!(find(&patterns, "nope").is_none());
    }

    #[test]
    fn only_the_scatter_and_the_fern_are_random() {
        let random: Vec<&str> = catalog()
            .iter()
            .filter(|p| match &p.family {
                Family::Orbit(o) => o.recurrence.is_random(),
                Family::Scatter { .. } => true,
                _ => false,
            })
            .map(|p| p.name)
            .collect();
        assert_eq!(random, vec!["random_math_art", "barnsley_fern"]);
    }

    #[test]
    fn random_art_leads_the_menu() {
        let patterns = catalog();
        assert_eq!(patterns.len(), 24);
        let art = find(&patterns, "random").unwrap();
        assert_eq!(art.title, "Random Mathematical Art");
        assert_eq!(art.family, Family::Scatter { samples: 300_000 });
        assert_eq!(art.coloring, Coloring::Function(PointColor::SineCosine { brightness: 1.5 }));
    }

    #[test]
    fn map_seeds_start_off_the_origin() {
        let seed_of = |name: &str| match &find(&catalog(), name).unwrap().family {
            Family::Orbit(o) => o.seed,
            other => panic!("{} is {:?}", name, other),
        };
        assert_eq!(seed_of("tinkerbell_map"), [-0.72, -0.64, 0.0]);
        assert_eq!(seed_of("gingerbreadman_map"), [-0.1, 0.0, 0.0]);
    }

    #[test]
    fn newton_uses_root_colors_and_fields_use_gradients() {
        for p in catalog() {
            match (&p.family, &p.coloring) {
                (Family::Field(spec), Coloring::Roots(_)) => {
                    assert_eq!(spec.kind, FieldKind::Newton)
                }
                (_, Coloring::Roots(_)) => panic!("{} has root colors", p.name),
                _ => {}
            }
        }
    }

    #[test]
    fn file_names_follow_the_pattern_name() {
        assert_eq!(catalog()[0].file_name(), "random_math_art.png");
        assert_eq!(catalog()[1].file_name(), "dejong_attractor.png");
    }
}
