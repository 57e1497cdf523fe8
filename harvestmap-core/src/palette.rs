//! Choropleth color mapping
//!
//! A fixed gradient is interpolated in CIE Lab space between a handful of
//! control colors, then sampled into evenly spaced steps. Values are placed on
//! the gradient by their position inside the dataset range.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::aggregate::{UnitSummary, ValueRange};
use crate::constants::{GRADIENT_STEPS, GRADIENT_STOPS, NO_DATA_COLOR, ZERO_COLOR};
use crate::numbers::{ratio_to_bucket, round_f64_to_u8, usize_to_f64};

// D65 reference white and Lab companding constants.
const WHITE_X: f64 = 0.950_470;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.088_830;
const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaletteError {
    #[error("invalid hex color `{0}`")]
    InvalidHex(String),
    #[error("gradient needs at least two control colors (got {0})")]
    TooFewStops(usize),
    #[error("gradient needs at least one step")]
    NoSteps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#rgb` or `#rrggbb`, with or without the leading `#`.
    ///
    /// # Errors
    ///
    /// Returns [`PaletteError::InvalidHex`] for any other shape.
    pub fn from_hex(hex: &str) -> Result<Self, PaletteError> {
        let invalid = || PaletteError::InvalidHex(hex.to_string());
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(invalid()),
        };
        let channel = |idx: usize| {
            expanded
                .get(idx..idx + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(invalid)
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    #[must_use]
    pub fn to_lab(self) -> Lab {
        let r = srgb_to_linear(self.r);
        let g = srgb_to_linear(self.g);
        let b = srgb_to_linear(self.b);
        let x = xyz_to_lab_component(
            0.412_456_4f64.mul_add(r, 0.357_576_1f64.mul_add(g, 0.180_437_5 * b)) / WHITE_X,
        );
        let y = xyz_to_lab_component(
            0.212_672_9f64.mul_add(r, 0.715_152_2f64.mul_add(g, 0.072_175_0 * b)) / WHITE_Y,
        );
        let z = xyz_to_lab_component(
            0.019_333_9f64.mul_add(r, 0.119_192_0f64.mul_add(g, 0.950_304_1 * b)) / WHITE_Z,
        );
        let l = 116.0f64.mul_add(y, -16.0);
        Lab {
            l: l.max(0.0),
            a: 500.0 * (x - y),
            b: 200.0 * (y - z),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Lab {
    #[must_use]
    pub fn mix(self, other: Self, t: f64) -> Self {
        Self {
            l: t.mul_add(other.l - self.l, self.l),
            a: t.mul_add(other.a - self.a, self.a),
            b: t.mul_add(other.b - self.b, self.b),
        }
    }

    /// Convert back to sRGB, clipping out-of-gamut channels.
    #[must_use]
    pub fn to_rgb(self) -> Rgb {
        let fy = (self.l + 16.0) / 116.0;
        let fx = fy + self.a / 500.0;
        let fz = fy - self.b / 200.0;
        let x = WHITE_X * lab_to_xyz_component(fx);
        let y = WHITE_Y * lab_to_xyz_component(fy);
        let z = WHITE_Z * lab_to_xyz_component(fz);
        let r = 3.240_454_2f64.mul_add(x, (-1.537_138_5f64).mul_add(y, -0.498_531_4 * z));
        let g = (-0.969_266_0f64).mul_add(x, 1.876_010_8f64.mul_add(y, 0.041_556_0 * z));
        let b = 0.055_643_4f64.mul_add(x, (-0.204_025_9f64).mul_add(y, 1.057_225_2 * z));
        Rgb {
            r: linear_to_srgb(r),
            g: linear_to_srgb(g),
            b: linear_to_srgb(b),
        }
    }
}

fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(channel: f64) -> u8 {
    let c = if channel <= 0.003_04 {
        12.92 * channel
    } else {
        1.055f64.mul_add(channel.powf(1.0 / 2.4), -0.055)
    };
    round_f64_to_u8(255.0 * c)
}

fn xyz_to_lab_component(t: f64) -> f64 {
    if t > T3 { t.cbrt() } else { t / T2 + T0 }
}

fn lab_to_xyz_component(t: f64) -> f64 {
    if t > T1 { t * t * t } else { T2 * (t - T0) }
}

/// Evenly sampled colors between control stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gradient {
    colors: Vec<String>,
}

impl Gradient {
    /// Interpolate `steps` colors across `stops` in Lab space.
    ///
    /// Stops sit at equal spacing on `[0, 1]`; step `i` samples `i / (steps - 1)`.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed stop colors, fewer than two stops, or zero steps.
    pub fn lab<S: AsRef<str>>(stops: &[S], steps: usize) -> Result<Self, PaletteError> {
        if stops.len() < 2 {
            return Err(PaletteError::TooFewStops(stops.len()));
        }
        if steps == 0 {
            return Err(PaletteError::NoSteps);
        }
        let labs = stops
            .iter()
            .map(|stop| Rgb::from_hex(stop.as_ref()).map(Rgb::to_lab))
            .collect::<Result<Vec<_>, _>>()?;

        let segments = labs.len() - 1;
        let colors = (0..steps)
            .map(|step| {
                let t = if steps == 1 {
                    0.0
                } else {
                    usize_to_f64(step) / usize_to_f64(steps - 1)
                };
                sample(&labs, segments, t).to_rgb().to_hex()
            })
            .collect();
        Ok(Self { colors })
    }

    /// The red-orange-yellow-green gradient used by the map, built once.
    #[must_use]
    pub fn standard() -> &'static Self {
        static STANDARD: OnceLock<Gradient> = OnceLock::new();
        STANDARD.get_or_init(|| {
            Self::lab(&GRADIENT_STOPS, GRADIENT_STEPS).unwrap_or_else(|err| {
                log::error!("standard gradient failed to build: {err}");
                Self {
                    colors: vec![ZERO_COLOR.to_string()],
                }
            })
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.colors.get(idx).map(String::as_str)
    }

    #[must_use]
    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}

fn sample(labs: &[Lab], segments: usize, t: f64) -> Lab {
    let scaled = t.clamp(0.0, 1.0) * usize_to_f64(segments);
    let mut segment = 0;
    while segment + 1 < segments && usize_to_f64(segment + 1) <= scaled {
        segment += 1;
    }
    let local = scaled - usize_to_f64(segment);
    labs[segment].mix(labs[segment + 1], local)
}

/// Which fill a unit receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "bucket", rename_all = "snake_case")]
pub enum ColorClass {
    NoData,
    Zero,
    Bucket(usize),
}

/// Maps unit values to fill colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorMapper {
    gradient: Gradient,
    no_data: String,
    zero: String,
}

impl Default for ColorMapper {
    fn default() -> Self {
        Self::new(
            Gradient::standard().clone(),
            NO_DATA_COLOR.to_string(),
            ZERO_COLOR.to_string(),
        )
    }
}

impl ColorMapper {
    #[must_use]
    pub const fn new(gradient: Gradient, no_data: String, zero: String) -> Self {
        Self {
            gradient,
            no_data,
            zero,
        }
    }

    #[must_use]
    pub const fn gradient(&self) -> &Gradient {
        &self.gradient
    }

    /// Classify a value: null first, then zero or NaN, then its gradient bucket.
    #[must_use]
    pub fn classify(&self, value: f64, is_null: bool, range: ValueRange) -> ColorClass {
        if is_null {
            return ColorClass::NoData;
        }
        if value == 0.0 || value.is_nan() {
            return ColorClass::Zero;
        }
        ColorClass::Bucket(ratio_to_bucket(range.ratio(value), self.gradient.len()))
    }

    #[must_use]
    pub fn color(&self, class: ColorClass) -> &str {
        match class {
            ColorClass::NoData => &self.no_data,
            ColorClass::Zero => &self.zero,
            ColorClass::Bucket(idx) => self.gradient.get(idx).unwrap_or(&self.zero),
        }
    }

    /// Fill color for a unit under the selected view.
    #[must_use]
    pub fn color_for(&self, summary: &UnitSummary, range: ValueRange, per_hunter: bool) -> &str {
        self.color(self.classify(
            summary.value(per_hunter),
            summary.is_null(per_hunter),
            range,
        ))
    }
}
