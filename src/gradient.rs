// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colors and the rules that turn a ratio in [0, 1] into one.
//!
//! Every pattern owns exactly one `GradientRule`.  The rules are data:
//! a pair of endpoint colors, a list of stops, or the fixed six-segment
//! rainbow.  Channels are computed in floating point and truncated
//! toward zero, so `128 + 127 * 0.5` becomes 191, not 192.

use image::Rgb;
use num::clamp;

/// An 8-bit-per-channel RGB triple.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ColorSpec(pub u8, pub u8, pub u8);

/// The background of every canvas, and the color of points that never
/// escaped.
pub const BLACK: ColorSpec = ColorSpec(0, 0, 0);

impl ColorSpec {
    /// Builds a color from three floating point channels, clamping each
    /// to [0, 255] and truncating.
    pub fn from_channels(r: f64, g: f64, b: f64) -> Self {
        ColorSpec(channel(r), channel(g), channel(b))
    }

    /// Scales every channel by `intensity`, which is clamped to [0, 1].
    pub fn scaled(self, intensity: f64) -> Self {
        let k = clamp(intensity, 0.0, 1.0);
        ColorSpec::from_channels(
            f64::from(self.0) * k,
            f64::from(self.1) * k,
            f64::from(self.2) * k,
        )
    }
}

impl From<ColorSpec> for Rgb<u8> {
    fn from(c: ColorSpec) -> Rgb<u8> {
        Rgb([c.0, c.1, c.2])
    }
}

impl From<Rgb<u8>> for ColorSpec {
    fn from(p: Rgb<u8>) -> ColorSpec {
        ColorSpec(p.0[0], p.0[1], p.0[2])
    }
}

#[inline]
fn channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    clamp(v, 0.0, 255.0) as u8
}

/// A position in a piecewise-linear gradient.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stop {
    /// Where along [0, 1] this color sits.
    pub at: f64,
    /// Channel values at that position.
    pub rgb: [f64; 3],
}

/// A pure function from progress ratio to color.
#[derive(Clone, Debug, PartialEq)]
pub enum GradientRule {
    /// `from + (to - from) * ratio`, channel by channel.
    Linear {
        /// Color at ratio 0.
        from: [f64; 3],
        /// Color approached as the ratio goes to 1.
        to: [f64; 3],
    },
    /// Linear interpolation between consecutive stops, which must be
    /// sorted by `at`.  Ratios outside the first and last stop take the
    /// nearest stop's color.
    Stops(Vec<Stop>),
    /// Hue rotation over [0°, 360°) in six 60° linear segments.
    Rainbow,
}

impl GradientRule {
    /// Two-color rule from integer endpoints.
    pub fn linear(from: (u8, u8, u8), to: (u8, u8, u8)) -> Self {
        GradientRule::Linear {
            from: [f64::from(from.0), f64::from(from.1), f64::from(from.2)],
            to: [f64::from(to.0), f64::from(to.1), f64::from(to.2)],
        }
    }

    /// The color at `ratio`.  Ratios are clamped to [0, 1]; NaN is
    /// treated as 0.
    pub fn color_at(&self, ratio: f64) -> ColorSpec {
        let t = if ratio.is_nan() {
            0.0
        } else {
            clamp(ratio, 0.0, 1.0)
        };
        match self {
            GradientRule::Linear { from, to } => ColorSpec::from_channels(
                from[0] + (to[0] - from[0]) * t,
                from[1] + (to[1] - from[1]) * t,
                from[2] + (to[2] - from[2]) * t,
            ),
            GradientRule::Stops(stops) => interpolate_stops(stops, t),
            GradientRule::Rainbow => rainbow(t * 360.0),
        }
    }
}

fn interpolate_stops(stops: &[Stop], t: f64) -> ColorSpec {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return BLACK,
    };
    if t <= first.at {
        return ColorSpec::from_channels(first.rgb[0], first.rgb[1], first.rgb[2]);
    }
    for pair in stops.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if t <= hi.at {
            let span = hi.at - lo.at;
            let k = if span > 0.0 { (t - lo.at) / span } else { 1.0 };
            return ColorSpec::from_channels(
                lo.rgb[0] + (hi.rgb[0] - lo.rgb[0]) * k,
                lo.rgb[1] + (hi.rgb[1] - lo.rgb[1]) * k,
                lo.rgb[2] + (hi.rgb[2] - lo.rgb[2]) * k,
            );
        }
    }
    ColorSpec::from_channels(last.rgb[0], last.rgb[1], last.rgb[2])
}

/// Six-segment hue wheel with corners at 0, 60, 120, 180, 240 and 300
/// degrees.  Hue is taken modulo 360.
pub fn rainbow(hue: f64) -> ColorSpec {
    let hue = hue.rem_euclid(360.0);
    let rise = |h: f64| 255.0 * h / 60.0;
    if hue < 60.0 {
        ColorSpec::from_channels(255.0, rise(hue), 0.0)
    } else if hue < 120.0 {
        ColorSpec::from_channels(rise(120.0 - hue), 255.0, 0.0)
    } else if hue < 180.0 {
        ColorSpec::from_channels(0.0, 255.0, rise(hue - 120.0))
    } else if hue < 240.0 {
        ColorSpec::from_channels(0.0, rise(240.0 - hue), 255.0)
    } else if hue < 300.0 {
        ColorSpec::from_channels(rise(hue - 240.0), 0.0, 255.0)
    } else {
        ColorSpec::from_channels(255.0, 0.0, rise(360.0 - hue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rainbow_corners() {
        assert_eq!(rainbow(0.0), ColorSpec(255, 0, 0));
        assert_eq!(rainbow(60.0), ColorSpec(255, 255, 0));
        assert_eq!(rainbow(120.0), ColorSpec(0, 255, 0));
        assert_eq!(rainbow(180.0), ColorSpec(0, 255, 255));
        assert_eq!(rainbow(240.0), ColorSpec(0, 0, 255));
        assert_eq!(rainbow(300.0), ColorSpec(255, 0, 255));
        assert_eq!(rainbow(360.0), rainbow(0.0));
    }

    #[test]
    fn rainbow_truncates_inside_a_segment() {
        // 255 * 30 / 60 = 127.5
        assert_eq!(rainbow(30.0), ColorSpec(255, 127, 0));
    }

    #[test]
    fn linear_endpoints() {
        let rule = GradientRule::linear((128, 0, 128), (255, 255, 255));
        assert_eq!(rule.color_at(0.0), ColorSpec(128, 0, 128));
        assert_eq!(rule.color_at(1.0), ColorSpec(255, 255, 255));
        assert_eq!(rule.color_at(0.5), ColorSpec(191, 127, 191));
    }

    #[test]
    fn linear_handles_falling_channels() {
        let rule = GradientRule::linear((75, 0, 130), (255, 215, 0));
        assert_eq!(rule.color_at(1.0), ColorSpec(255, 215, 0));
        let near_end = rule.color_at(0.999_999);
        assert!(near_end.0 >= 254 && near_end.1 >= 214 && near_end.2 <= 1);
    }

    #[test]
    fn out_of_range_ratios_are_clamped() {
        let rule = GradientRule::linear((0, 0, 0), (200, 100, 50));
        assert_eq!(rule.color_at(-3.0), ColorSpec(0, 0, 0));
        assert_eq!(rule.color_at(7.0), ColorSpec(200, 100, 50));
        assert_eq!(rule.color_at(std::f64::NAN), ColorSpec(0, 0, 0));
    }

    #[test]
    fn stops_interpolate_piecewise() {
        let rule = GradientRule::Stops(vec![
            Stop { at: 0.0, rgb: [0.0, 0.0, 0.0] },
            Stop { at: 0.5, rgb: [255.0, 0.0, 25.0] },
            Stop { at: 1.0, rgb: [255.0, 255.0, 50.0] },
        ]);
        assert_eq!(rule.color_at(0.25), ColorSpec(127, 0, 12));
        assert_eq!(rule.color_at(0.5), ColorSpec(255, 0, 25));
        assert_eq!(rule.color_at(0.75), ColorSpec(255, 127, 37));
        assert_eq!(rule.color_at(1.0), ColorSpec(255, 255, 50));
    }

    #[test]
    fn empty_stops_are_black() {
        assert_eq!(GradientRule::Stops(vec![]).color_at(0.3), BLACK);
    }

    #[test]
    fn scaling_a_color() {
        assert_eq!(ColorSpec(255, 0, 100).scaled(0.5), ColorSpec(127, 0, 50));
        assert_eq!(ColorSpec(255, 0, 100).scaled(2.0), ColorSpec(255, 0, 100));
    }
}
