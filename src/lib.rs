//! # goat-gauge
//!
//! Goat body measurements and live-weight estimation from binary
//! segmentation masks.
//!
//! This crate provides:
//! - **Body Measurements**: body length, shoulder height, rump height and
//!   torso height read off a silhouette via geometric heuristics
//! - **Unit Conversion**: pixels to centimeters from camera distance,
//!   camera tilt and a per-setup calibration constant
//! - **Weight Estimation**: a pluggable regression over the converted
//!   measurements, with the production coefficient set built in
//!
//! ## Algorithm Overview
//!
//! 1. Crop the mask to the detection box and trim empty margin columns
//! 2. Build per-column top/bottom silhouette profiles
//! 3. Partition the silhouette into head, shoulder, rump and tail zones
//!    (mirrored for animals facing right) and pick the landmark columns
//! 4. Read the four measurements off the profiles: the longest foreground
//!    run halfway down the torso gives the body length
//! 5. Convert to centimeters and apply the weight regression
//!
//! ## Quick Start
//!
//! ```rust
//! use goat_gauge::{
//!     default_weight_model, measure, BoundingBox, ConvertOptions, Direction, Mask,
//! };
//!
//! // A synthetic silhouette: a 400x100 slab in a 640x640 mask.
//! let mask = Mask::from_fn(640, 640, |x, y| {
//!     u8::from((270..370).contains(&y) && (100..500).contains(&x))
//! });
//! let bbox = BoundingBox::from_corner(100, 270, 400, 100);
//!
//! // The calibration pair is specific to the camera setup: pixels per
//! // centimeter measured against a reference object at a known distance.
//! let options = ConvertOptions::new(155.42, 20.0)
//!     .with_distance(1.5)
//!     .with_angle(20.0);
//!
//! let model = default_weight_model();
//! let result = measure(&mask, &bbox, Direction::Left, &options, &model)
//!     .unwrap()
//!     .unwrap();
//! println!("estimated weight: {:.1} kg", result.weight_kg);
//! ```
//!
//! ## Custom Providers
//!
//! A [`MeasurementSession`] pulls its inputs from three capability
//! traits. Implement them for your own detector or sensors:
//!
//! ```rust
//! use goat_gauge::{Detection, Detector, Result, Snapshot};
//!
//! struct OnnxDetector { /* ... */ }
//!
//! impl Detector for OnnxDetector {
//!     fn detect(&self, snapshot: &Snapshot) -> Result<Option<Detection>> {
//!         // Run the segmentation model here; accept only detections at
//!         // or above the confidence threshold.
//!         Ok(None)
//!     }
//! }
//! ```

mod convert;
mod error;
mod landmarks;
mod measure;
mod profile;
mod providers;
mod scan;
mod session;
mod types;
mod weight;

pub use convert::{
    pixels_to_cm, scale_to_height, scale_to_width, tilt_correct, to_centimeters, BodyMeasurements,
    ConvertOptions, DEFAULT_ANGLE_DEG, DEFAULT_DISTANCE_M, DEFAULT_SHAPE,
};
pub use error::{Error, Result};
pub use landmarks::{Landmark, Landmarks, Zone, ZoneLayout};
pub use measure::{measure, measure_pixels, MeasurementResult, PixelMeasurements};
pub use profile::MaskProfile;
pub use providers::{
    AngleSource, Detection, Detector, DistanceSource, FixedAngle, FixedDetector, FixedDistance,
    MaskFileDetector, NameTableDistance, OrientationAngle, Snapshot, DEFAULT_CONFIDENCE_THRESHOLD,
};
pub use scan::{longest_run, Run};
pub use session::{MeasurementLog, MeasurementRecord, MeasurementSession};
pub use types::{BoundingBox, Direction, Mask};
pub use weight::{default_weight_model, Feature, LinearWeightModel, WeightModel, WeightTerm};
