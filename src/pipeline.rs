// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Generate, normalize, colorize, render, persist.  One call per
//! pattern; a batch is just those calls with every failure caught at
//! the pattern boundary.

use crossbeam::thread::ScopedJoinHandle;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::canvas::{Canvas, Surface};
use crate::catalog::{Coloring, Family, PatternSpec};
use crate::colorize::{field_pixels, point_order, sequence_order, FieldPalette};
use crate::errors::{Result, WallpaperError};
use crate::escape::{EscapeSpec, FieldGenerator};
use crate::gradient::{ColorSpec, GradientRule, BLACK};
use crate::normalize::{Bounds, Normalizer, DEFAULT_EPSILON};
use crate::orbit::{scatter, seeded_rng, PointSequence, SequenceGenerator};
use crate::overlay::{Overlay, Signature};
use crate::planes::Pixel;

/// What to do when a recurrence leaves the finite numbers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DivergencePolicy {
    /// Keep the points recorded so far.  A sequence that diverges before
    /// recording anything still fails.
    Truncate,
    /// Fail the pattern.
    Abort,
}

/// Knobs shared by every pattern in a run.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Directory receiving one PNG per pattern.
    pub output_dir: PathBuf,
    /// Overrides each sequence pattern's sample count.
    pub samples: Option<usize>,
    /// Overrides each field pattern's iteration cap.
    pub max_iter: Option<u32>,
    /// Escape-field sub-sampling factor.
    pub stride: usize,
    /// Range used for degenerate normalizer axes.
    pub epsilon: f64,
    /// Resolution hint handed to the surface.
    pub dpi: (u32, u32),
    /// Seed for the random IFS selector.
    pub seed: Option<u64>,
    /// Signature to stamp on every image, if any.
    pub signature: Option<Signature>,
    /// Ask the surface to preview each saved file.
    pub show: bool,
    /// Divergence handling for sequence patterns.
    pub divergence: DivergencePolicy,
    /// Batch worker count; 1 runs patterns one after another.
    pub threads: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 3840,
            height: 2160,
            output_dir: PathBuf::from("wallpapers"),
            samples: None,
            max_iter: None,
            stride: 2,
            epsilon: DEFAULT_EPSILON,
            dpi: (1000, 1000),
            seed: None,
            signature: None,
            show: false,
            divergence: DivergencePolicy::Truncate,
            threads: 1,
        }
    }
}

impl RenderConfig {
    /// Where `spec` will be written.
    pub fn output_path(&self, spec: &PatternSpec) -> PathBuf {
        self.output_dir.join(spec.file_name())
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(WallpaperError::InvalidConfig(format!(
                "canvas must not be empty ({}x{})",
                self.width, self.height
            )));
        }
        if self.samples == Some(0) {
            return Err(WallpaperError::InvalidConfig(
                "sample count must be at least 1".to_string(),
            ));
        }
        if self.stride == 0 {
            return Err(WallpaperError::InvalidConfig(
                "sub-sampling stride must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of one pattern in a batch.
#[derive(Debug)]
pub struct RunReport {
    /// Catalog name.
    pub name: &'static str,
    /// The written file, or why there is none.
    pub outcome: Result<PathBuf>,
    /// Wall time spent on the pattern.
    pub elapsed: Duration,
}

impl RunReport {
    /// Did the pattern make it to disk?
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

fn mismatch(spec: &PatternSpec) -> WallpaperError {
    WallpaperError::InvalidConfig(format!(
        "{} cannot color a {} with {:?}",
        spec.name,
        spec.family.label(),
        spec.coloring
    ))
}

fn gradient_of(spec: &PatternSpec) -> Result<&GradientRule> {
    match &spec.coloring {
        Coloring::Gradient(rule) => Ok(rule),
        _ => Err(mismatch(spec)),
    }
}

fn paint<S, I>(surface: &S, canvas: &mut Canvas, writes: I) -> usize
where
    S: Surface + ?Sized,
    I: IntoIterator<Item = (Pixel, ColorSpec)>,
{
    let mut count = 0;
    for (Pixel(x, y), color) in writes {
        surface.set_pixel(canvas, x as i64, y as i64, color);
        count += 1;
    }
    count
}

fn sequence_for(spec: &PatternSpec, config: &RenderConfig) -> Result<PointSequence> {
    match &spec.family {
        Family::Orbit(orbit) => {
            let samples = config.samples.unwrap_or(orbit.samples);
            let mut generator = SequenceGenerator::new(spec.name, orbit, config.seed);
            match config.divergence {
                DivergencePolicy::Abort => generator.generate(samples),
                DivergencePolicy::Truncate => {
                    let (points, diverged) = generator.generate_truncating(samples)?;
                    if let Some(step) = diverged {
                        warn!(
                            pattern = spec.name,
                            step,
                            kept = points.len(),
                            "sequence diverged, truncating"
                        );
                    }
                    Ok(points)
                }
            }
        }
        Family::Curve { curve, samples } => {
            let points = curve.sample(config.samples.unwrap_or(*samples));
            match points.iter().position(|p| !p.is_finite()) {
                Some(step) => Err(WallpaperError::NumericDivergence {
                    pattern: spec.name.to_string(),
                    step,
                }),
                None => Ok(points),
            }
        }
        Family::Scatter { samples } => Ok(scatter(
            &mut seeded_rng(config.seed),
            config.samples.unwrap_or(*samples),
        )),
        Family::Field(_) => Err(WallpaperError::InvalidConfig(format!(
            "{} is a field, not a sequence",
            spec.name
        ))),
    }
}

/// Builds the canvas for `spec` without persisting it.
pub fn draw<S: Surface + ?Sized>(
    spec: &PatternSpec,
    config: &RenderConfig,
    surface: &S,
) -> Result<Canvas> {
    config.validate()?;
    let (width, height) = (config.width as usize, config.height as usize);
    let mut canvas = surface.new_image(config.width, config.height, BLACK);

    let written = match &spec.family {
        Family::Orbit(_) | Family::Curve { .. } => {
            let rule = gradient_of(spec)?;
            let points = sequence_for(spec, config)?;
            let bounds = Bounds::of(&points);
            debug!(pattern = spec.name, points = points.len(), ?bounds, "normalizing");
            let pixels = Normalizer::new(width, height)
                .with_epsilon(config.epsilon)
                .normalize(&points);
            paint(surface, &mut canvas, sequence_order(rule, &pixels))
        }
        Family::Scatter { .. } => {
            let color = match &spec.coloring {
                Coloring::Function(color) => color,
                _ => return Err(mismatch(spec)),
            };
            let points = sequence_for(spec, config)?;
            let pixels = Normalizer::new(width, height).normalize_unit(&points);
            paint(surface, &mut canvas, point_order(color, &points, &pixels))
        }
        Family::Field(escape) => {
            let escape = match config.max_iter {
                Some(max_iter) => EscapeSpec { max_iter, ..*escape },
                None => *escape,
            };
            let field = FieldGenerator::new(spec.name, &escape).generate(width, height, config.stride)?;
            let palette = match &spec.coloring {
                Coloring::Gradient(rule) => FieldPalette::IterationRatio(rule),
                Coloring::Roots(roots) => FieldPalette::RootBasin(roots),
                Coloring::Function(_) => return Err(mismatch(spec)),
            };
            paint(surface, &mut canvas, field_pixels(&field, palette))
        }
    };
    debug!(pattern = spec.name, writes = written, "painted");

    if let Some(signature) = &config.signature {
        signature.apply(&mut canvas);
    }
    Ok(canvas)
}

/// Renders `spec` and saves it under the configured directory.
pub fn render<S: Surface + ?Sized>(
    spec: &PatternSpec,
    config: &RenderConfig,
    surface: &S,
) -> Result<PathBuf> {
    info!(pattern = spec.name, family = spec.family.label(), "generating");
    let canvas = draw(spec, config, surface)?;
    let path = config.output_path(spec);
    surface.save(&canvas, &path, config.dpi)?;
    if config.show {
        surface.show(&path);
    }
    info!(pattern = spec.name, path = %path.display(), "saved");
    Ok(path)
}

fn run_one<S: Surface + ?Sized>(spec: &PatternSpec, config: &RenderConfig, surface: &S) -> RunReport {
    let started = Instant::now();
    let outcome = render(spec, config, surface);
    if let Err(e) = &outcome {
        error!(pattern = spec.name, error = %e, "pattern failed");
    }
    RunReport {
        name: spec.name,
        outcome,
        elapsed: started.elapsed(),
    }
}

/// Renders every pattern, never letting one failure stop the rest.
/// Reports come back in the order of `patterns` whatever the worker
/// count.
pub fn run_batch<S: Surface + Sync>(
    patterns: &[PatternSpec],
    config: &RenderConfig,
    surface: &S,
) -> Vec<RunReport> {
    let threads = config.threads.max(1).min(patterns.len().max(1));
    let reports = if threads == 1 {
        patterns.iter().map(|p| run_one(p, config, surface)).collect()
    } else {
        run_parallel(patterns, config, surface, threads)
    };
    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    info!(total = reports.len(), failed, "batch finished");
    reports
}

fn run_parallel<S: Surface + Sync>(
    patterns: &[PatternSpec],
    config: &RenderConfig,
    surface: &S,
    threads: usize,
) -> Vec<RunReport> {
    let queue = Arc::new(Mutex::new(patterns.iter().enumerate()));
    let mut indexed: Vec<(usize, RunReport)> = vec![];
    let scoped = crossbeam::scope(|spawner| {
        let handles: Vec<ScopedJoinHandle<Vec<(usize, RunReport)>>> = (0..threads)
            .map(|_| {
                let queue = queue.clone();
                spawner.spawn(move |_| {
                    let mut done = vec![];
                    loop {
                        let next = match queue.lock() {
                            Ok(mut q) => q.next(),
                            Err(_) => None,
                        };
                        match next {
                            Some((i, spec)) => done.push((i, run_one(spec, config, surface))),
                            None => break,
                        }
                    }
                    done
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(done) => indexed.extend(done),
                Err(_) => error!("batch worker panicked"),
            }
        }
    });
    if scoped.is_err() {
        error!("batch scope ended with a panic");
    }
    indexed.sort_by_key(|(i, _)| *i);
    indexed.into_iter().map(|(_, r)| r).collect()
}
