//! Pixel-to-centimeter conversion of body measurements.
//!
//! Three numeric steps, applied per measurement: rescale from mask
//! resolution to the photo resolution, correct vertical extents for camera
//! tilt, and calibrate to centimeters with a distance-aware
//! pixels-per-centimeter constant.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::measure::PixelMeasurements;

/// Camera distance assumed when the caller provides none, in meters.
pub const DEFAULT_DISTANCE_M: f64 = 1.5;
/// Camera tilt assumed when the caller provides none, in degrees.
pub const DEFAULT_ANGLE_DEG: f64 = 20.0;
/// Mask and photo resolution assumed when the caller provides none, as
/// [height, width].
pub const DEFAULT_SHAPE: [usize; 2] = [640, 640];

/// Conversion parameters.
///
/// `calibration` is the pixels-per-centimeter figure measured against a
/// reference object photographed at `calibration_distance_cm`. The pair is
/// specific to a camera setup and must always be supplied; the remaining
/// fields default as documented on the constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertOptions {
    #[serde(default = "default_distance")]
    pub distance_m: f64,
    #[serde(default = "default_angle")]
    pub angle_deg: f64,
    pub calibration: f64,
    pub calibration_distance_cm: f64,
    /// Photo resolution as [height, width].
    #[serde(default = "default_shape")]
    pub orig_shape: [usize; 2],
    /// Mask resolution as [height, width].
    #[serde(default = "default_shape")]
    pub mask_shape: [usize; 2],
}

fn default_distance() -> f64 {
    DEFAULT_DISTANCE_M
}

fn default_angle() -> f64 {
    DEFAULT_ANGLE_DEG
}

fn default_shape() -> [usize; 2] {
    DEFAULT_SHAPE
}

impl ConvertOptions {
    /// Options with the documented defaults and the given calibration pair.
    pub fn new(calibration: f64, calibration_distance_cm: f64) -> Self {
        Self {
            distance_m: DEFAULT_DISTANCE_M,
            angle_deg: DEFAULT_ANGLE_DEG,
            calibration,
            calibration_distance_cm,
            orig_shape: DEFAULT_SHAPE,
            mask_shape: DEFAULT_SHAPE,
        }
    }

    pub fn with_distance(mut self, distance_m: f64) -> Self {
        self.distance_m = distance_m;
        self
    }

    pub fn with_angle(mut self, angle_deg: f64) -> Self {
        self.angle_deg = angle_deg;
        self
    }

    pub fn with_orig_shape(mut self, height: usize, width: usize) -> Self {
        self.orig_shape = [height, width];
        self
    }

    pub fn with_mask_shape(mut self, height: usize, width: usize) -> Self {
        self.mask_shape = [height, width];
        self
    }

    /// Check every divisor the conversion formulas use.
    ///
    /// The tilt correction has a cosine singularity at 90 degrees, so
    /// angles are rejected from there on; practical captures should stay
    /// at or below 80 degrees.
    pub fn validate(&self) -> Result<()> {
        if !(self.distance_m.is_finite() && self.distance_m > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "distance must be positive and finite, got {}",
                self.distance_m
            )));
        }
        if !(self.calibration.is_finite() && self.calibration > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "calibration must be positive and finite, got {}",
                self.calibration
            )));
        }
        if !(self.calibration_distance_cm.is_finite() && self.calibration_distance_cm > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "calibration distance must be positive and finite, got {}",
                self.calibration_distance_cm
            )));
        }
        if !(0.0..90.0).contains(&self.angle_deg) {
            return Err(Error::InvalidConfiguration(format!(
                "angle must lie in [0, 90) degrees, got {}",
                self.angle_deg
            )));
        }
        if self.orig_shape.contains(&0) || self.mask_shape.contains(&0) {
            return Err(Error::InvalidConfiguration(
                "photo and mask shapes must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Pixels per centimeter at the configured camera distance.
    fn pixels_per_cm(&self) -> f64 {
        self.calibration * self.calibration_distance_cm / (self.distance_m * 100.0)
    }
}

/// Rescale a horizontal pixel measurement to the photo resolution.
pub fn scale_to_width(pixels: f64, options: &ConvertOptions) -> f64 {
    pixels / options.mask_shape[1] as f64 * options.orig_shape[1] as f64
}

/// Rescale a vertical pixel measurement to the photo resolution.
pub fn scale_to_height(pixels: f64, options: &ConvertOptions) -> f64 {
    pixels / options.mask_shape[0] as f64 * options.orig_shape[0] as f64
}

/// Undo the foreshortening of a vertical extent under a tilted camera.
pub fn tilt_correct(pixels: f64, angle_deg: f64) -> f64 {
    pixels / angle_deg.to_radians().cos()
}

/// Calibrate a photo-resolution pixel measurement to centimeters.
pub fn pixels_to_cm(pixels: f64, options: &ConvertOptions) -> f64 {
    pixels / options.pixels_per_cm()
}

/// Body measurements in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurements {
    pub body_length_cm: f64,
    pub shoulder_height_cm: f64,
    pub rump_height_cm: f64,
    pub body_height_cm: f64,
}

/// Convert pixel measurements to centimeters.
///
/// Body length uses the width scale and no tilt correction; the three
/// vertical measurements use the height scale with tilt correction.
pub fn to_centimeters(
    pixels: &PixelMeasurements,
    options: &ConvertOptions,
) -> Result<BodyMeasurements> {
    options.validate()?;

    let length = |px: usize| pixels_to_cm(scale_to_width(px as f64, options), options);
    let height = |px: usize| {
        pixels_to_cm(
            tilt_correct(scale_to_height(px as f64, options), options.angle_deg),
            options,
        )
    };

    Ok(BodyMeasurements {
        body_length_cm: length(pixels.body_length),
        shoulder_height_cm: height(pixels.shoulder_height),
        rump_height_cm: height(pixels.rump_height),
        body_height_cm: height(pixels.body_height),
    })
}
