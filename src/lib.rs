#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mathematical wallpaper generator
//!
//! Two kinds of mathematics end up on the wall.  Attractors, maps and
//! parametric curves produce a long sequence of points; those points
//! are fitted to the canvas by a linear normalizer and painted in
//! sequence order along a color gradient, so the early part of an orbit
//! and the late part of an orbit read differently.  Escape-time
//! fractals instead ask a question of every pixel: how many iterations
//! until the point runs away?  That count, divided by the cap, picks
//! the color; points that never run away stay black.  One pattern is
//! plain noise: seeded random points in the unit square, each colored
//! by a function of its own coordinates.
//!
//! Every pattern is described by data in the `catalog`.  The `pipeline`
//! turns one description into one PNG and runs whole batches, catching
//! each pattern's failure so one bad recurrence cannot sink the rest.

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate num;
extern crate rand;
extern crate rusttype;
extern crate tracing;

pub mod canvas;
pub mod catalog;
pub mod colorize;
pub mod errors;
pub mod escape;
pub mod gradient;
pub mod menu;
pub mod normalize;
pub mod orbit;
pub mod overlay;
pub mod pipeline;
pub mod planes;

pub use canvas::{Canvas, ImageSurface, Surface};
pub use catalog::{catalog, find, PatternSpec};
pub use errors::{Result, WallpaperError};
pub use gradient::{ColorSpec, GradientRule};
pub use overlay::Signature;
pub use pipeline::{draw, render, run_batch, DivergencePolicy, RenderConfig, RunReport};
