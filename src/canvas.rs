// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The renderer surface: an owned RGB buffer and the thing that knows
//! how to persist it.

use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, warn};

use crate::errors::{Result, WallpaperError};
use crate::gradient::ColorSpec;

/// A mutable RGB image whose size is fixed at creation.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// A `width`×`height` canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: ColorSpec) -> Self {
        Canvas {
            image: RgbImage::from_pixel(width, height, background.into()),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Writes `color` at `(x, y)` after clamping both coordinates into
    /// the canvas.  Last write wins.
    pub fn set_pixel(&mut self, x: i64, y: i64, color: ColorSpec) {
        let (w, h) = (i64::from(self.width()), i64::from(self.height()));
        if w == 0 || h == 0 {
            return;
        }
        let x = x.max(0).min(w - 1) as u32;
        let y = y.max(0).min(h - 1) as u32;
        self.image.put_pixel(x, y, color.into());
    }

    /// Mixes `color` over what is at `(x, y)` by `coverage` in [0, 1],
    /// truncating each channel.  Writes outside the canvas are dropped;
    /// overlays use this, and clamping would smear glyphs along the
    /// border.
    pub fn blend(&mut self, x: i64, y: i64, color: ColorSpec, coverage: f64) {
        if x < 0 || y < 0 || x >= i64::from(self.width()) || y >= i64::from(self.height()) {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        let mixed = if coverage >= 1.0 {
            color
        } else {
            let under = self.get(x, y);
            let k = if coverage > 0.0 { coverage } else { 0.0 };
            let mix = |a: u8, b: u8| f64::from(a) + (f64::from(b) - f64::from(a)) * k;
            ColorSpec::from_channels(
                mix(under.0, color.0),
                mix(under.1, color.1),
                mix(under.2, color.2),
            )
        };
        self.image.put_pixel(x, y, mixed.into());
    }

    /// The color at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> ColorSpec {
        (*self.image.get_pixel(x, y)).into()
    }

    /// Number of pixels that are not pure black.
    pub fn lit_pixels(&self) -> usize {
        self.image.pixels().filter(|p| **p != Rgb([0, 0, 0])).count()
    }

    /// Read-only access to the underlying buffer.
    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }
}

/// Where finished canvases go.
pub trait Surface {
    /// A fresh canvas.
    fn new_image(&self, width: u32, height: u32, background: ColorSpec) -> Canvas {
        Canvas::new(width, height, background)
    }

    /// Writes one pixel.
    fn set_pixel(&self, canvas: &mut Canvas, x: i64, y: i64, color: ColorSpec) {
        canvas.set_pixel(x, y, color)
    }

    /// Persists the canvas at `path`.  Nothing may be left at `path`
    /// if this fails.
    fn save(&self, canvas: &Canvas, path: &Path, dpi: (u32, u32)) -> Result<()>;

    /// Best-effort preview of a saved file.  Never fails.
    fn show(&self, path: &Path);
}

/// PNG files on the local filesystem.
#[derive(Default, Debug, Clone, Copy)]
pub struct ImageSurface;

impl ImageSurface {
    // Hidden sibling with a .png extension so the encoder can infer the
    // format from it.
    fn partial_path(path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        path.with_file_name(format!(".{}.partial.png", stem))
    }
}

impl Surface for ImageSurface {
    fn save(&self, canvas: &Canvas, path: &Path, dpi: (u32, u32)) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|e| WallpaperError::io(dir, e))?;
            }
        }
        let partial = ImageSurface::partial_path(path);
        debug!(path = %path.display(), dpi_x = dpi.0, dpi_y = dpi.1, "encoding png");
        if let Err(e) = canvas.image.save(&partial) {
            let _ = fs::remove_file(&partial);
            return Err(WallpaperError::io(path, e));
        }
        fs::rename(&partial, path).map_err(|e| {
            let _ = fs::remove_file(&partial);
            WallpaperError::io(path, e)
        })
    }

    fn show(&self, path: &Path) {
        let opener = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(target_os = "windows") {
            "explorer"
        } else {
            "xdg-open"
        };
        if let Err(e) = Command::new(opener).arg(path).spawn() {
            warn!(path = %path.display(), error = %e, "could not open a preview");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::BLACK;

    #[test]
    fn new_canvases_are_black() {
        let canvas = Canvas::new(8, 4, BLACK);
        assert_eq!(canvas.lit_pixels(), 0);
        assert_eq!((canvas.width(), canvas.height()), (8, 4));
    }

    #[test]
    fn writes_are_clamped() {
        let mut canvas = Canvas::new(4, 4, BLACK);
        canvas.set_pixel(-5, 99, ColorSpec(1, 2, 3));
        assert_eq!(canvas.get(0, 3), ColorSpec(1, 2, 3));
        canvas.set_pixel(i64::max_value(), 1, ColorSpec(4, 5, 6));
        assert_eq!(canvas.get(3, 1), ColorSpec(4, 5, 6));
    }

    #[test]
    fn last_write_wins() {
        let mut canvas = Canvas::new(2, 2, BLACK);
        canvas.set_pixel(1, 1, ColorSpec(9, 9, 9));
        canvas.set_pixel(1, 1, ColorSpec(7, 7, 7));
        assert_eq!(canvas.get(1, 1), ColorSpec(7, 7, 7));
        assert_eq!(canvas.lit_pixels(), 1);
    }

    #[test]
    fn blend_drops_outside_writes() {
        let mut canvas = Canvas::new(2, 2, BLACK);
        canvas.blend(-1, 0, ColorSpec(1, 1, 1), 1.0);
        canvas.blend(2, 0, ColorSpec(1, 1, 1), 1.0);
        assert_eq!(canvas.lit_pixels(), 0);
    }

    #[test]
    fn partial_coverage_mixes_with_the_background() {
        let mut canvas = Canvas::new(2, 2, ColorSpec(0, 0, 200));
        canvas.blend(0, 0, ColorSpec(255, 255, 0), 0.5);
        assert_eq!(canvas.get(0, 0), ColorSpec(127, 127, 100));
        canvas.blend(1, 1, ColorSpec(255, 255, 0), 0.0);
        assert_eq!(canvas.get(1, 1), ColorSpec(0, 0, 200));
    }

    #[test]
    fn partial_files_sit_next_to_the_target() {
        let p = ImageSurface::partial_path(Path::new("out/lorenz.png"));
        assert_eq!(p, Path::new("out/.lorenz.partial.png"));
    }
}
