// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Signature text stamped into the bottom-right corner of a finished
//! canvas.
//!
//! The face is the first entry of `Signature::fonts` that loads as a
//! TrueType or OpenType font; when none does, a built-in 5×7 bitmap font
//! scaled up to the requested size stands in.  The outline is drawn by
//! stamping the text in the outline color at every offset within
//! `outline_width`, then the fill on top.  Drawing never fails;
//! characters the face lacks are skipped.

use rusttype::{point, Font, Scale};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::canvas::Canvas;
use crate::gradient::ColorSpec;

/// Anything that decorates a finished canvas.
pub trait Overlay {
    /// Draws onto `canvas` in place.
    fn apply(&self, canvas: &mut Canvas);
}

/// Distance kept from the right and bottom edges.
pub const MARGIN: i64 = 30;

/// Font files tried, in order, by a default signature.
pub const DEFAULT_FONTS: &[&str] = &[
    "Monoton-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const GLYPH_W: i64 = 5;
const GLYPH_H: i64 = 7;
const ADVANCE: i64 = GLYPH_W + 1;

/// The typeface a signature ends up drawn with.
pub enum Face {
    /// A font file that loaded.
    Loaded(Font<'static>),
    /// The built-in bitmap font.
    Builtin,
}

impl Face {
    /// Width and height in pixels of `text` at a `size`-pixel font.
    pub fn extent(&self, text: &str, size: u32) -> (i64, i64) {
        if text.is_empty() {
            return (0, 0);
        }
        match self {
            Face::Loaded(font) => {
                let scale = Scale::uniform(size as f32);
                let v = font.v_metrics(scale);
                let width = font
                    .layout(text, scale, point(0.0, v.ascent))
                    .filter_map(|g| g.pixel_bounding_box())
                    .map(|bb| i64::from(bb.max.x))
                    .max()
                    .unwrap_or(0);
                (width, (v.ascent - v.descent).ceil() as i64)
            }
            Face::Builtin => {
                let scale = builtin_scale(size);
                let chars = text.chars().count() as i64;
                ((chars * ADVANCE - 1) * scale, GLYPH_H * scale)
            }
        }
    }

    /// Draws `text` with its top-left corner at `(x, y)`.
    pub fn stamp(&self, canvas: &mut Canvas, text: &str, size: u32, x: i64, y: i64, color: ColorSpec) {
        match self {
            Face::Loaded(font) => {
                let scale = Scale::uniform(size as f32);
                let v = font.v_metrics(scale);
                for g in font.layout(text, scale, point(x as f32, y as f32 + v.ascent)) {
                    if let Some(bb) = g.pixel_bounding_box() {
                        g.draw(|gx, gy, coverage| {
                            canvas.blend(
                                i64::from(bb.min.x) + i64::from(gx),
                                i64::from(bb.min.y) + i64::from(gy),
                                color,
                                f64::from(coverage),
                            )
                        });
                    }
                }
            }
            Face::Builtin => stamp_builtin(canvas, text, builtin_scale(size), x, y, color),
        }
    }
}

// Integer scale applied to the 5x7 cells.
fn builtin_scale(size: u32) -> i64 {
    (i64::from(size) / GLYPH_H).max(1)
}

fn stamp_builtin(canvas: &mut Canvas, text: &str, scale: i64, x: i64, y: i64, color: ColorSpec) {
    for (i, ch) in text.chars().enumerate() {
        let glyph = match glyph(ch) {
            Some(g) => g,
            None => continue,
        };
        let left = x + i as i64 * ADVANCE * scale;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                let (px, py) = (left + col * scale, y + row as i64 * scale);
                for dy in 0..scale {
                    for dx in 0..scale {
                        canvas.blend(px + dx, py + dy, color, 1.0);
                    }
                }
            }
        }
    }
}

/// The signature and how to draw it.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    /// What to write.
    pub text: String,
    /// Text height in pixels; `None` means one hundredth of the canvas
    /// height.
    pub font_size: Option<u32>,
    /// Font files to try, first to last, before the built-in font.
    pub fonts: Vec<PathBuf>,
    /// Glyph color.
    pub fill: ColorSpec,
    /// Outline color.
    pub outline: ColorSpec,
    /// Outline thickness in pixels.
    pub outline_width: u32,
}

impl Default for Signature {
    fn default() -> Self {
        Signature {
            text: "@aeronautyy".to_string(),
            font_size: None,
            fonts: DEFAULT_FONTS.iter().map(PathBuf::from).collect(),
            fill: ColorSpec(255, 255, 255),
            outline: ColorSpec(0, 0, 0),
            outline_width: 1,
        }
    }
}

impl Signature {
    /// A default-styled signature reading `text`.
    pub fn new<S: Into<String>>(text: S) -> Self {
        Signature {
            text: text.into(),
            ..Signature::default()
        }
    }

    /// The first font in `fonts` that loads, or the built-in one.
    pub fn face(&self) -> Face {
        for path in &self.fonts {
            match fs::read(path) {
                Ok(bytes) => match Font::try_from_vec(bytes) {
                    Some(font) => {
                        debug!(font = %path.display(), "signature font loaded");
                        return Face::Loaded(font);
                    }
                    None => debug!(font = %path.display(), "not a usable font"),
                },
                Err(e) => debug!(font = %path.display(), error = %e, "font unavailable"),
            }
        }
        Face::Builtin
    }

    /// Font size in pixels on a canvas `canvas_height` tall.
    pub fn size(&self, canvas_height: u32) -> u32 {
        self.font_size.unwrap_or(canvas_height / 100).max(1)
    }

    /// Top-left corner of the text block on a canvas of the given size.
    pub fn origin(&self, face: &Face, width: u32, height: u32) -> (i64, i64) {
        let (w, h) = face.extent(&self.text, self.size(height));
        (i64::from(width) - w - MARGIN, i64::from(height) - h - MARGIN)
    }
}

impl Overlay for Signature {
    fn apply(&self, canvas: &mut Canvas) {
        let face = self.face();
        let size = self.size(canvas.height());
        let (x, y) = self.origin(&face, canvas.width(), canvas.height());
        let reach = i64::from(self.outline_width);
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                if dx != 0 || dy != 0 {
                    face.stamp(canvas, &self.text, size, x + dx, y + dy, self.outline);
                }
            }
        }
        face.stamp(canvas, &self.text, size, x, y, self.fill);
    }
}

fn glyph(ch: char) -> Option<&'static [u8; 7]> {
    let code = ch as u32;
    if code < 32 || code > 126 {
        return None;
    }
    FONT_5X7.get((code - 32) as usize)
}

// Each glyph: 7 rows, each row's lower 5 bits are pixels (MSB = left).
#[rustfmt::skip]
const FONT_5X7: [[u8; 7]; 95] = [
    [0x00,0x00,0x00,0x00,0x00,0x00,0x00], // 32 ' '
    [0x04,0x04,0x04,0x04,0x04,0x00,0x04], // 33 '!'
    [0x0A,0x0A,0x0A,0x00,0x00,0x00,0x00], // 34 '"'
    [0x0A,0x0A,0x1F,0x0A,0x1F,0x0A,0x0A], // 35 '#'
    [0x04,0x0F,0x14,0x0E,0x05,0x1E,0x04], // 36 '$'
    [0x18,0x19,0x02,0x04,0x08,0x13,0x03], // 37 '%'
    [0x0C,0x12,0x14,0x08,0x15,0x12,0x0D], // 38 '&'
    [0x04,0x04,0x08,0x00,0x00,0x00,0x00], // 39 '''
    [0x02,0x04,0x08,0x08,0x08,0x04,0x02], // 40 '('
    [0x08,0x04,0x02,0x02,0x02,0x04,0x08], // 41 ')'
    [0x00,0x04,0x15,0x0E,0x15,0x04,0x00], // 42 '*'
    [0x00,0x04,0x04,0x1F,0x04,0x04,0x00], // 43 '+'
    [0x00,0x00,0x00,0x00,0x00,0x04,0x08], // 44 ','
    [0x00,0x00,0x00,0x1F,0x00,0x00,0x00], // 45 '-'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x04], // 46 '.'
    [0x00,0x01,0x02,0x04,0x08,0x10,0x00], // 47 '/'
    [0x0E,0x11,0x13,0x15,0x19,0x11,0x0E], // 48 '0'
    [0x04,0x0C,0x04,0x04,0x04,0x04,0x0E], // 49 '1'
    [0x0E,0x11,0x01,0x02,0x04,0x08,0x1F], // 50 '2'
    [0x1F,0x02,0x04,0x02,0x01,0x11,0x0E], // 51 '3'
    [0x02,0x06,0x0A,0x12,0x1F,0x02,0x02], // 52 '4'
    [0x1F,0x10,0x1E,0x01,0x01,0x11,0x0E], // 53 '5'
    [0x06,0x08,0x10,0x1E,0x11,0x11,0x0E], // 54 '6'
    [0x1F,0x01,0x02,0x04,0x08,0x08,0x08], // 55 '7'
    [0x0E,0x11,0x11,0x0E,0x11,0x11,0x0E], // 56 '8'
    [0x0E,0x11,0x11,0x0F,0x01,0x02,0x0C], // 57 '9'
    [0x00,0x00,0x04,0x00,0x00,0x04,0x00], // 58 ':'
    [0x00,0x00,0x04,0x00,0x00,0x04,0x08], // 59 ';'
    [0x02,0x04,0x08,0x10,0x08,0x04,0x02], // 60 '<'
    [0x00,0x00,0x1F,0x00,0x1F,0x00,0x00], // 61 '='
    [0x08,0x04,0x02,0x01,0x02,0x04,0x08], // 62 '>'
    [0x0E,0x11,0x01,0x02,0x04,0x00,0x04], // 63 '?'
    [0x0E,0x11,0x17,0x15,0x17,0x10,0x0E], // 64 '@'
    [0x0E,0x11,0x11,0x1F,0x11,0x11,0x11], // 65 'A'
    [0x1E,0x11,0x11,0x1E,0x11,0x11,0x1E], // 66 'B'
    [0x0E,0x11,0x10,0x10,0x10,0x11,0x0E], // 67 'C'
    [0x1C,0x12,0x11,0x11,0x11,0x12,0x1C], // 68 'D'
    [0x1F,0x10,0x10,0x1E,0x10,0x10,0x1F], // 69 'E'
    [0x1F,0x10,0x10,0x1E,0x10,0x10,0x10], // 70 'F'
    [0x0E,0x11,0x10,0x17,0x11,0x11,0x0F], // 71 'G'
    [0x11,0x11,0x11,0x1F,0x11,0x11,0x11], // 72 'H'
    [0x0E,0x04,0x04,0x04,0x04,0x04,0x0E], // 73 'I'
    [0x07,0x02,0x02,0x02,0x02,0x12,0x0C], // 74 'J'
    [0x11,0x12,0x14,0x18,0x14,0x12,0x11], // 75 'K'
    [0x10,0x10,0x10,0x10,0x10,0x10,0x1F], // 76 'L'
    [0x11,0x1B,0x15,0x15,0x11,0x11,0x11], // 77 'M'
    [0x11,0x11,0x19,0x15,0x13,0x11,0x11], // 78 'N'
    [0x0E,0x11,0x11,0x11,0x11,0x11,0x0E], // 79 'O'
    [0x1E,0x11,0x11,0x1E,0x10,0x10,0x10], // 80 'P'
    [0x0E,0x11,0x11,0x11,0x15,0x12,0x0D], // 81 'Q'
    [0x1E,0x11,0x11,0x1E,0x14,0x12,0x11], // 82 'R'
    [0x0F,0x10,0x10,0x0E,0x01,0x01,0x1E], // 83 'S'
    [0x1F,0x04,0x04,0x04,0x04,0x04,0x04], // 84 'T'
    [0x11,0x11,0x11,0x11,0x11,0x11,0x0E], // 85 'U'
    [0x11,0x11,0x11,0x11,0x11,0x0A,0x04], // 86 'V'
    [0x11,0x11,0x11,0x15,0x15,0x1B,0x11], // 87 'W'
    [0x11,0x11,0x0A,0x04,0x0A,0x11,0x11], // 88 'X'
    [0x11,0x11,0x0A,0x04,0x04,0x04,0x04], // 89 'Y'
    [0x1F,0x01,0x02,0x04,0x08,0x10,0x1F], // 90 'Z'
    [0x0E,0x08,0x08,0x08,0x08,0x08,0x0E], // 91 '['
    [0x00,0x10,0x08,0x04,0x02,0x01,0x00], // 92 '\'
    [0x0E,0x02,0x02,0x02,0x02,0x02,0x0E], // 93 ']'
    [0x04,0x0A,0x11,0x00,0x00,0x00,0x00], // 94 '^'
    [0x00,0x00,0x00,0x00,0x00,0x00,0x1F], // 95 '_'
    [0x08,0x04,0x02,0x00,0x00,0x00,0x00], // 96 '`'
    [0x00,0x00,0x0E,0x01,0x0F,0x11,0x0F], // 97 'a'
    [0x10,0x10,0x16,0x19,0x11,0x11,0x1E], // 98 'b'
    [0x00,0x00,0x0E,0x10,0x10,0x11,0x0E], // 99 'c'
    [0x01,0x01,0x0D,0x13,0x11,0x11,0x0F], // 100 'd'
    [0x00,0x00,0x0E,0x11,0x1F,0x10,0x0E], // 101 'e'
    [0x06,0x09,0x08,0x1C,0x08,0x08,0x08], // 102 'f'
    [0x00,0x00,0x0F,0x11,0x0F,0x01,0x0E], // 103 'g'
    [0x10,0x10,0x16,0x19,0x11,0x11,0x11], // 104 'h'
    [0x04,0x00,0x0C,0x04,0x04,0x04,0x0E], // 105 'i'
    [0x02,0x00,0x06,0x02,0x02,0x12,0x0C], // 106 'j'
    [0x10,0x10,0x12,0x14,0x18,0x14,0x12], // 107 'k'
    [0x0C,0x04,0x04,0x04,0x04,0x04,0x0E], // 108 'l'
    [0x00,0x00,0x1A,0x15,0x15,0x11,0x11], // 109 'm'
    [0x00,0x00,0x16,0x19,0x11,0x11,0x11], // 110 'n'
    [0x00,0x00,0x0E,0x11,0x11,0x11,0x0E], // 111 'o'
    [0x00,0x00,0x1E,0x11,0x1E,0x10,0x10], // 112 'p'
    [0x00,0x00,0x0D,0x13,0x0F,0x01,0x01], // 113 'q'
    [0x00,0x00,0x16,0x19,0x10,0x10,0x10], // 114 'r'
    [0x00,0x00,0x0E,0x10,0x0E,0x01,0x1E], // 115 's'
    [0x08,0x08,0x1C,0x08,0x08,0x09,0x06], // 116 't'
    [0x00,0x00,0x11,0x11,0x11,0x13,0x0D], // 117 'u'
    [0x00,0x00,0x11,0x11,0x11,0x0A,0x04], // 118 'v'
    [0x00,0x00,0x11,0x11,0x15,0x15,0x0A], // 119 'w'
    [0x00,0x00,0x11,0x0A,0x04,0x0A,0x11], // 120 'x'
    [0x00,0x00,0x11,0x11,0x0F,0x01,0x0E], // 121 'y'
    [0x00,0x00,0x1F,0x02,0x04,0x08,0x1F], // 122 'z'
    [0x02,0x04,0x04,0x08,0x04,0x04,0x02], // 123 '{'
    [0x04,0x04,0x04,0x04,0x04,0x04,0x04], // 124 '|'
    [0x08,0x04,0x04,0x02,0x04,0x04,0x08], // 125 '}'
    [0x00,0x00,0x08,0x15,0x02,0x00,0x00], // 126 '~'
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient::BLACK;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn builtin(text: &str) -> Signature {
        Signature {
            font_size: Some(7),
            fonts: vec![],
            ..Signature::new(text)
        }
    }

    #[test]
    fn sits_in_the_bottom_right_corner() {
        let sig = builtin("ab");
        // two glyphs at scale 1: 11 x 7
        assert_eq!(sig.origin(&Face::Builtin, 200, 100), (200 - 11 - 30, 100 - 7 - 30));
    }

    #[test]
    fn default_size_follows_canvas_height() {
        let sig = Signature::new("x");
        assert_eq!(sig.size(2160), 21);
        assert_eq!(builtin_scale(sig.size(2160)), 3);
        assert_eq!(sig.size(50), 1);
    }

    #[test]
    fn draws_fill_over_outline() {
        let mut canvas = Canvas::new(100, 60, BLACK);
        let sig = Signature {
            outline: ColorSpec(10, 10, 10),
            ..builtin("I")
        };
        sig.apply(&mut canvas);
        let (x, y) = sig.origin(&Face::Builtin, 100, 60);
        // 'I' has its top bar across columns 1..4 of row 0
        assert_eq!(canvas.get((x + 2) as u32, y as u32), ColorSpec(255, 255, 255));
        assert_eq!(canvas.get((x + 2) as u32, (y - 1) as u32), ColorSpec(10, 10, 10));
        assert!(canvas.lit_pixels() > 0);
    }

    #[test]
    fn missing_and_broken_fonts_fall_back_to_the_builtin_face() {
        let mut junk = NamedTempFile::new().unwrap();
        junk.write_all(b"definitely not a font").unwrap();
        let sig = Signature {
            fonts: vec![PathBuf::from("/no/such/dir/font.ttf"), junk.path().to_path_buf()],
            ..builtin("@me")
        };
        match sig.face() {
            Face::Builtin => {}
            Face::Loaded(_) => panic!("loaded a font that does not exist"),
        }

        let mut fallen_back = Canvas::new(120, 60, BLACK);
        sig.apply(&mut fallen_back);
        let mut plain = Canvas::new(120, 60, BLACK);
        builtin("@me").apply(&mut plain);
        assert!(fallen_back.lit_pixels() > 0);
        assert_eq!(fallen_back.as_image().as_ref(), plain.as_image().as_ref());
    }

    #[test]
    fn unknown_characters_are_skipped() {
        let mut canvas = Canvas::new(80, 50, BLACK);
        builtin("\u{263a}").apply(&mut canvas);
        assert_eq!(canvas.lit_pixels(), 0);
    }

    #[test]
    fn tiny_canvases_do_not_panic() {
        let mut canvas = Canvas::new(3, 3, BLACK);
        Signature::default().apply(&mut canvas);
    }
}
