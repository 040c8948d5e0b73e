//! External capabilities feeding a measurement: detection, camera
//! distance and camera tilt. Each is a trait with interchangeable
//! implementations, so bench setups, sensor-backed field rigs and offline
//! replays plug into the same session.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::convert::DEFAULT_ANGLE_DEG;
use crate::error::Result;
use crate::types::{BoundingBox, Mask};

/// Confidence a scored detector needs before its result is accepted.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.85;

/// A captured still handed to the providers.
///
/// Providers that need pixel data read the file at `path`; providers
/// keyed by subject match against `name` (the file stem); fixed providers
/// ignore it entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem of the snapshot, used as its display name.
    pub fn name(&self) -> &str {
        self.path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
    }
}

/// A segmentation produced by a detector.
#[derive(Debug, Clone)]
pub struct Detection {
    pub mask: Mask,
    pub bbox: BoundingBox,
}

/// Produces the segmentation mask and bounding box for a snapshot.
///
/// Implementations wrapping a scored model must gate on confidence
/// internally: accept a detection only at or above their threshold and
/// return `Ok(None)` below it.
pub trait Detector: Send + Sync {
    fn detect(&self, snapshot: &Snapshot) -> Result<Option<Detection>>;
}

/// Estimates the camera-to-animal distance in meters.
pub trait DistanceSource: Send + Sync {
    fn distance(&self, snapshot: &Snapshot) -> Result<f64>;
}

/// Reports the camera tilt in degrees.
pub trait AngleSource: Send + Sync {
    fn angle(&self, snapshot: &Snapshot) -> Result<f64>;
}

/// A detector returning a pre-computed result, gated the way a scored
/// detector would be.
///
/// Stands in for the segmentation model in bench setups and replay runs:
/// the detection is accepted only when `confidence >= threshold`.
pub struct FixedDetector {
    detection: Option<Detection>,
    confidence: f32,
    threshold: f32,
}

impl FixedDetector {
    /// Detector that always yields `detection`, at full confidence.
    pub fn new(detection: Option<Detection>) -> Self {
        Self {
            detection,
            confidence: 1.0,
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Detector for FixedDetector {
    fn detect(&self, _snapshot: &Snapshot) -> Result<Option<Detection>> {
        if self.confidence < self.threshold {
            return Ok(None);
        }
        Ok(self.detection.clone())
    }
}

/// Always reports the same distance.
pub struct FixedDistance(pub f64);

impl DistanceSource for FixedDistance {
    fn distance(&self, _snapshot: &Snapshot) -> Result<f64> {
        Ok(self.0)
    }
}

/// Always reports the same angle.
pub struct FixedAngle(pub f64);

impl AngleSource for FixedAngle {
    fn angle(&self, _snapshot: &Snapshot) -> Result<f64> {
        Ok(self.0)
    }
}

/// Distance lookup keyed by snapshot name.
///
/// The first table entry whose pattern occurs in the name wins; unmatched
/// snapshots get the fallback distance.
pub struct NameTableDistance {
    table: Vec<(String, f64)>,
    fallback: f64,
}

impl NameTableDistance {
    pub fn new(table: Vec<(String, f64)>, fallback: f64) -> Self {
        Self { table, fallback }
    }
}

impl DistanceSource for NameTableDistance {
    fn distance(&self, snapshot: &Snapshot) -> Result<f64> {
        let name = snapshot.name();
        for (pattern, meters) in &self.table {
            if name.contains(pattern.as_str()) {
                return Ok(*meters);
            }
        }
        Ok(self.fallback)
    }
}

/// Derives the camera tilt from device-orientation readings.
///
/// A reading is the orientation event's gamma value in degrees; for a
/// device held upright facing the animal the tilt is `90 + gamma`.
/// Without a reading the default angle applies.
pub struct OrientationAngle {
    reading: Mutex<Option<f64>>,
}

impl OrientationAngle {
    pub fn new() -> Self {
        Self {
            reading: Mutex::new(None),
        }
    }

    /// Store the latest gamma reading from the orientation sensor.
    pub fn record_gamma(&self, gamma: f64) {
        let mut reading = self.reading.lock().unwrap_or_else(|e| e.into_inner());
        *reading = Some(gamma);
    }

    /// Drop the stored reading, falling back to the default angle.
    pub fn clear(&self) {
        let mut reading = self.reading.lock().unwrap_or_else(|e| e.into_inner());
        *reading = None;
    }
}

impl Default for OrientationAngle {
    fn default() -> Self {
        Self::new()
    }
}

impl AngleSource for OrientationAngle {
    fn angle(&self, _snapshot: &Snapshot) -> Result<f64> {
        let reading = self.reading.lock().unwrap_or_else(|e| e.into_inner());
        Ok(match *reading {
            Some(gamma) => 90.0 + gamma,
            None => DEFAULT_ANGLE_DEG,
        })
    }
}

/// Loads the snapshot file itself as a binary mask image.
///
/// Pixels with luminance above the threshold are foreground; the bounding
/// box is the tight rectangle around the foreground. Blank images yield no
/// detection.
pub struct MaskFileDetector {
    threshold: u8,
}

impl MaskFileDetector {
    pub fn new() -> Self {
        Self { threshold: 127 }
    }

    /// Luminance above which a pixel counts as foreground.
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Default for MaskFileDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for MaskFileDetector {
    fn detect(&self, snapshot: &Snapshot) -> Result<Option<Detection>> {
        let gray = image::open(snapshot.path())?.to_luma8();
        let (width, height) = gray.dimensions();
        let threshold = self.threshold;
        let mask = Mask::from_fn(width as usize, height as usize, |x, y| {
            u8::from(gray.get_pixel(x as u32, y as u32).0[0] > threshold)
        });

        let Some(bbox) = foreground_box(&mask) else {
            return Ok(None);
        };
        Ok(Some(Detection { mask, bbox }))
    }
}

/// Tight bounding box around the mask's foreground, if any.
fn foreground_box(mask: &Mask) -> Option<BoundingBox> {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if mask.is_foreground(x, y) {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
    }
    let (x0, y0, x1, y1) = bounds?;
    Some(BoundingBox::from_corner(x0, y0, x1 - x0 + 1, y1 - y0 + 1))
}
