//! Values computed from several settings at once.
//!
//! These are shared by more than one flag rule: the frame size feeds both the
//! size and the aspect flags, the selected frame rate feeds the rate and both
//! keyframe flags.

use crate::setting::Setting;
use crate::{Error, Result};
use std::fmt;

/// Frame sizes are multiples of this unless the profile says otherwise.
pub const DEFAULT_DIMENSIONS_MODULUS: u32 = 8;

/// Milliseconds between keyframes unless the profile says otherwise.
pub const DEFAULT_GOP_DURATION_MS: u32 = 4000;

/// Largest absolute difference at which a candidate frame rate matches the
/// source rate.
pub const FRAME_RATE_TOLERANCE: f64 = 0.01;

/// Output frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Display aspect ratio in lowest terms, e.g. `16:9`.
    pub fn aspect_ratio(&self) -> String {
        let divisor = gcd(self.width, self.height).max(1);
        format!("{}:{}", self.width / divisor, self.height / divisor)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Greatest common divisor.
pub fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Round down to a multiple of `modulus`.
pub fn round_down(value: u32, modulus: u32) -> u32 {
    value - value % modulus
}

/// Round to the nearest multiple of `modulus`, never below `modulus` itself.
///
/// Returns `None` when the value is not finite or the result does not fit
/// in a `u32`.
pub fn round_nearest(value: f64, modulus: u32) -> Option<u32> {
    let steps = (value / f64::from(modulus)).round().max(1.0);
    if !steps.is_finite() || steps > f64::from(u32::MAX) {
        return None;
    }
    (steps as u32).checked_mul(modulus)
}

/// Compute the output frame size.
///
/// The width is rounded down to the modulus. A fixed `height` is rounded down
/// as well; otherwise the height keeps the source's aspect ratio and is
/// rounded to the nearest multiple of the modulus.
///
/// ```
/// use mp4forge_encoder::derive::scale_dimensions;
///
/// let size = scale_dimensions(767, None, Some((1920, 1080)), 8)?;
/// assert_eq!(size.to_string(), "760x424");
/// # Ok::<(), mp4forge_encoder::Error>(())
/// ```
pub fn scale_dimensions(
    width: u32,
    height: Option<u32>,
    source: Option<(u32, u32)>,
    modulus: u32,
) -> Result<Dimensions> {
    if modulus == 0 {
        return Err(Error::profile(
            Setting::DimensionsModulus,
            "modulus must be greater than zero",
        ));
    }

    let width = round_down(width, modulus);
    if width == 0 {
        return Err(Error::profile(
            Setting::Width,
            format!("width is smaller than the modulus {}", modulus),
        ));
    }

    let height = match (height, source) {
        (Some(h), _) => {
            let h = round_down(h, modulus);
            if h == 0 {
                return Err(Error::profile(
                    Setting::Height,
                    format!("height is smaller than the modulus {}", modulus),
                ));
            }
            h
        }
        (None, Some((src_w, src_h))) => {
            let exact = f64::from(width) * f64::from(src_h) / f64::from(src_w);
            round_nearest(exact, modulus).ok_or_else(|| {
                Error::profile(
                    Setting::Height,
                    format!(
                        "height derived from {}x{} at width {} is out of range",
                        src_w, src_h, width
                    ),
                )
            })?
        }
        (None, None) => {
            return Err(Error::profile(
                Setting::Width,
                "source dimensions are unknown, cannot derive height",
            ))
        }
    };

    Ok(Dimensions { width, height })
}

/// Pick the candidate matching the source rate, or the first candidate.
///
/// List order decides among several matches and when nothing matches; the
/// numerically closest candidate is not preferred. Returns `None` only for
/// an empty list.
pub fn select_frame_rate(candidates: &[f64], source_rate: Option<f64>) -> Option<f64> {
    source_rate
        .and_then(|source| {
            candidates
                .iter()
                .copied()
                .find(|candidate| (candidate - source).abs() < FRAME_RATE_TOLERANCE)
        })
        .or_else(|| candidates.first().copied())
}

/// Frames between keyframes: `floor(gop_duration_ms / 1000 * rate)`.
pub fn keyframe_interval(gop_duration_ms: f64, rate: f64) -> u64 {
    (gop_duration_ms / 1000.0 * rate).floor().max(0.0) as u64
}
