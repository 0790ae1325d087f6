use palette::{FromColor, Hsl, RgbHue, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color with every channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses any CSS color: names, hex, `rgb()`/`rgba()`, `hsl()`.
    pub fn parse(text: &str) -> ChartResult<Self> {
        let parsed = csscolorparser::parse(text)
            .map_err(|err| ChartError::InvalidColor(format!("`{text}`: {err}")))?;
        Ok(Self::rgba(
            f64::from(parsed.r),
            f64::from(parsed.g),
            f64::from(parsed.b),
            f64::from(parsed.a),
        ))
    }

    pub fn validate(self) -> ChartResult<Self> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidColor(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(self)
    }

    /// RGB channels as bytes, rounded and clamped.
    #[must_use]
    pub fn to_bytes(self) -> [u8; 3] {
        [self.red, self.green, self.blue].map(to_byte)
    }

    /// `rgba(r,g,b,a)` with byte RGB channels.
    #[must_use]
    pub fn to_rgba_string(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("rgba({r},{g},{b},{})", self.alpha.clamp(0.0, 1.0))
    }

    /// Replaces any of hue (degrees), saturation or lightness.
    #[must_use]
    pub fn modify_hsl(self, hue: Option<f64>, saturation: Option<f64>, lightness: Option<f64>) -> Self {
        let mut hsl: Hsl<palette::encoding::Srgb, f64> =
            Hsl::from_color(Srgb::new(self.red, self.green, self.blue));
        if let Some(hue) = hue.filter(|hue| hue.is_finite()) {
            hsl.hue = RgbHue::from_degrees(hue);
        }
        if let Some(saturation) = saturation.filter(|value| value.is_finite()) {
            hsl.saturation = saturation.clamp(0.0, 1.0);
        }
        if let Some(lightness) = lightness.filter(|value| value.is_finite()) {
            hsl.lightness = lightness.clamp(0.0, 1.0);
        }
        let rgb: Srgb<f64> = Srgb::from_color(hsl);
        Self::rgba(
            rgb.red.clamp(0.0, 1.0),
            rgb.green.clamp(0.0, 1.0),
            rgb.blue.clamp(0.0, 1.0),
            self.alpha,
        )
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            alpha: if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { self.alpha },
            ..self
        }
    }
}

impl std::str::FromStr for Color {
    type Err = ChartError;

    fn from_str(text: &str) -> ChartResult<Self> {
        Self::parse(text)
    }
}

fn to_byte(channel: f64) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Interpolates across evenly spaced `stops` at `normalized` in `[0, 1]`.
///
/// RGB is blended in byte space and rounded, alpha stays continuous.
/// Returns `None` for an empty stop list or a value outside `[0, 1]`.
#[must_use]
pub fn fast_lerp(normalized: f64, stops: &[Color]) -> Option<Color> {
    if stops.is_empty() || !(0.0..=1.0).contains(&normalized) {
        return None;
    }
    let value = normalized * (stops.len() - 1) as f64;
    let left = stops[value.floor() as usize];
    let right = stops[value.ceil() as usize];
    let t = value - value.floor();

    let byte = |a: f64, b: f64| -> f64 {
        let a = a * 255.0;
        let b = b * 255.0;
        (a + (b - a) * t).round().clamp(0.0, 255.0) / 255.0
    };
    Some(Color::rgba(
        byte(left.red, right.red),
        byte(left.green, right.green),
        byte(left.blue, right.blue),
        (left.alpha + (right.alpha - left.alpha) * t).clamp(0.0, 1.0),
    ))
}

/// [`fast_lerp`] formatted as `rgba(...)`.
#[must_use]
pub fn lerp_to_string(normalized: f64, stops: &[Color]) -> Option<String> {
    fast_lerp(normalized, stops).map(Color::to_rgba_string)
}
