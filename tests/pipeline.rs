// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate image;
extern crate mathpaper;
extern crate tempfile;

use mathpaper::catalog::{Coloring, Family};
use mathpaper::escape::{EscapeRule, EscapeSpec, FieldKind};
use mathpaper::orbit::{OrbitSpec, Projection, Recurrence};
use mathpaper::planes::ComplexPlane;
use mathpaper::{
    catalog, draw, find, render, run_batch, DivergencePolicy, GradientRule, ImageSurface,
    PatternSpec, RenderConfig, Signature,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn henon(name: &'static str, seed: [f64; 3]) -> PatternSpec {
    PatternSpec {
        name,
        title: "Hénon test map",
        family: Family::Orbit(OrbitSpec {
            recurrence: Recurrence::Henon { a: 1.4, b: 0.3 },
            seed,
            warmup: 100,
            samples: 1000,
            projection: Projection::XY,
        }),
        coloring: Coloring::Gradient(GradientRule::linear((255, 0, 0), (0, 0, 255))),
    }
}

fn config_in(dir: &Path, width: u32, height: u32) -> RenderConfig {
    RenderConfig {
        width,
        height,
        output_dir: dir.to_path_buf(),
        samples: Some(2000),
        max_iter: Some(40),
        seed: Some(7),
        ..RenderConfig::default()
    }
}

fn png_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn henon_lights_at_most_one_pixel_per_sample() {
    let dir = TempDir::new().unwrap();
    let config = RenderConfig {
        samples: None,
        ..config_in(dir.path(), 100, 100)
    };
    let canvas = draw(&henon("henon", [0.0; 3]), &config, &ImageSurface).unwrap();
    let lit = canvas.lit_pixels();
    assert!(lit >= 1 && lit <= 1000, "lit {}", lit);
}

#[test]
fn a_region_inside_the_set_renders_black() {
    let dir = TempDir::new().unwrap();
    let spec = PatternSpec {
        name: "inside",
        title: "Inside the Mandelbrot set",
        family: Family::Field(EscapeSpec {
            kind: FieldKind::Escape(EscapeRule::Mandelbrot),
            region: ComplexPlane::new(-0.1, -0.1, 0.1, 0.1),
            max_iter: 50,
            bound: 2.0,
        }),
        coloring: Coloring::Gradient(GradientRule::linear((255, 255, 255), (255, 255, 255))),
    };
    let config = RenderConfig {
        max_iter: None,
        stride: 1,
        ..config_in(dir.path(), 50, 50)
    };
    let path = render(&spec, &config, &ImageSurface).unwrap();
    let img = image::open(&path).unwrap().to_rgb();
    assert_eq!(img.dimensions(), (50, 50));
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0]));
}

#[test]
fn one_broken_pattern_does_not_sink_the_batch() {
    let dir = TempDir::new().unwrap();
    let all = catalog();
    let mut patterns: Vec<PatternSpec> = ["clifford", "mandelbrot", "lissajous"]
        .iter()
        .map(|n| find(&all, n).unwrap().clone())
        .collect();
    patterns.insert(1, henon("broken", [std::f64::NAN, 0.0, 0.0]));

    let reports = run_batch(&patterns, &config_in(dir.path(), 64, 36), &ImageSurface);

    assert_eq!(reports.len(), 4);
    let failed: Vec<&str> = reports.iter().filter(|r| !r.is_ok()).map(|r| r.name).collect();
    assert_eq!(failed, vec!["broken"]);
    assert!(reports[1].outcome.as_ref().unwrap_err().is_divergence());
    assert_eq!(
        png_files(dir.path()),
        vec!["clifford_attractor.png", "lissajous_curve.png", "mandelbrot_set.png"]
    );
}

#[test]
fn parallel_batches_report_in_input_order() {
    let dir = TempDir::new().unwrap();
    let patterns: Vec<PatternSpec> = catalog().into_iter().take(6).collect();
    let config = RenderConfig {
        threads: 3,
        ..config_in(dir.path(), 48, 27)
    };
    let reports = run_batch(&patterns, &config, &ImageSurface);
    let names: Vec<&str> = reports.iter().map(|r| r.name).collect();
    let expected: Vec<&str> = patterns.iter().map(|p| p.name).collect();
    assert_eq!(names, expected);
    assert!(reports.iter().all(|r| r.is_ok()));
    assert_eq!(png_files(dir.path()).len(), 6);
}

#[test]
fn seeded_runs_are_reproducible() {
    let all = catalog();
    for name in &["clifford", "barnsley", "julia"] {
        let spec = find(&all, name).unwrap();
        let (a, b) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let pa = render(spec, &config_in(a.path(), 80, 45), &ImageSurface).unwrap();
        let pb = render(spec, &config_in(b.path(), 80, 45), &ImageSurface).unwrap();
        let ia = image::open(&pa).unwrap().to_rgb();
        let ib = image::open(&pb).unwrap().to_rgb();
        assert!(ia.into_raw() == ib.into_raw(), "{} differs between runs", name);
    }
}

#[test]
fn strict_runs_abort_on_divergence() {
    let dir = TempDir::new().unwrap();
    let mut spec = henon("runaway", [0.0; 3]);
    if let Family::Orbit(orbit) = &mut spec.family {
        orbit.recurrence = Recurrence::Henon { a: 10.0, b: 0.3 };
        orbit.warmup = 0;
    }
    let strict = RenderConfig {
        divergence: DivergencePolicy::Abort,
        ..config_in(dir.path(), 32, 32)
    };
    let reports = run_batch(&[spec.clone()], &strict, &ImageSurface);
    assert!(!reports[0].is_ok());
    assert!(png_files(dir.path()).is_empty());

    let lenient = run_batch(&[spec], &config_in(dir.path(), 32, 32), &ImageSurface);
    assert!(lenient[0].is_ok());
}

#[test]
fn signatures_land_in_the_bottom_right() {
    let dir = TempDir::new().unwrap();
    let spec = henon("dark", [0.0; 3]);
    let config = RenderConfig {
        samples: Some(1),
        signature: Some(Signature {
            font_size: Some(14),
            fonts: vec![],
            ..Signature::new("@me")
        }),
        ..config_in(dir.path(), 400, 200)
    };
    let signed = draw(&spec, &config, &ImageSurface).unwrap();
    let plain = draw(&spec, &RenderConfig { signature: None, ..config.clone() }, &ImageSurface).unwrap();
    assert!(signed.lit_pixels() > plain.lit_pixels());
    let img = signed.as_image();
    let white: Vec<(u32, u32)> = img
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0 == [255, 255, 255])
        .map(|(x, y, _)| (x, y))
        .collect();
    assert!(!white.is_empty());
    assert!(white.iter().all(|&(x, y)| x > 200 && y > 100 && x < 370 && y < 170));
}
