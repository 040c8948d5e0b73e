use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::convert::{to_centimeters, ConvertOptions};
use crate::error::{Error, Result};
use crate::landmarks::Landmarks;
use crate::profile::MaskProfile;
use crate::scan::longest_run;
use crate::types::{BoundingBox, Direction, Mask};
use crate::weight::WeightModel;

/// The four body measurements in cropped-mask pixels.
///
/// `offset` translates crop coordinates back to the full mask, for
/// overlay rendering downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelMeasurements {
    pub body_length: usize,
    pub shoulder_height: usize,
    pub rump_height: usize,
    pub body_height: usize,
    pub offset: (usize, usize),
}

/// Assemble pixel measurements from a profile and its landmarks.
///
/// Body length is the longest foreground run on the scan line halfway
/// down the torso at the middle column. Rump height pairs the rump
/// column's foot line with the hill column's back line; when the hill
/// sits below the rump foot the height clamps to zero.
pub fn measure_pixels(profile: &MaskProfile, landmarks: &Landmarks) -> Result<PixelMeasurements> {
    let (middle_top, middle_bottom) = profile
        .column_span(landmarks.middle)
        .ok_or(Error::EmptyColumn {
            column: landmarks.middle,
        })?;
    let body_height = middle_bottom - middle_top;

    let scan_row = middle_top + body_height / 2;
    let run = longest_run(profile.crop().row(scan_row)).ok_or(Error::NoBodyLine { row: scan_row })?;

    let shoulder_height = landmarks.shoulder.bottom - landmarks.shoulder.top;
    let rump_height = match landmarks.rump.bottom.checked_sub(landmarks.hill.top) {
        Some(h) => h,
        None => {
            warn!(
                rump_bottom = landmarks.rump.bottom,
                hill_top = landmarks.hill.top,
                "hill sits below the rump foot line, clamping rump height to zero"
            );
            0
        }
    };

    Ok(PixelMeasurements {
        body_length: run.len(),
        shoulder_height,
        rump_height,
        body_height,
        offset: profile.offset(),
    })
}

/// A completed measurement in physical units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    pub body_length_cm: f64,
    pub shoulder_height_cm: f64,
    pub rump_height_cm: f64,
    pub body_height_cm: f64,
    /// Camera distance the conversion used, in meters.
    pub distance_m: f64,
    /// Camera tilt the conversion used, in degrees.
    pub angle_deg: f64,
    pub weight_kg: f64,
    /// Set when the rump front edge fell back to the zone's leading
    /// column.
    pub hill_fallback: bool,
}

/// Measure a detection end to end: profile, landmarks, pixel
/// measurements, unit conversion, weight estimate.
///
/// Returns `Ok(None)` when the box crops to an all-background region or a
/// landmark zone is empty; both mean "nothing to measure", not a failure.
pub fn measure(
    mask: &Mask,
    bbox: &BoundingBox,
    direction: Direction,
    options: &ConvertOptions,
    model: &dyn WeightModel,
) -> Result<Option<MeasurementResult>> {
    let Some(profile) = MaskProfile::from_mask(mask, bbox)? else {
        debug!("bounding box crops to an empty region");
        return Ok(None);
    };
    let Some(landmarks) = Landmarks::locate(&profile, direction) else {
        debug!("a landmark zone has no foreground, skipping measurement");
        return Ok(None);
    };

    let pixels = measure_pixels(&profile, &landmarks)?;
    let body = to_centimeters(&pixels, options)?;
    let weight_kg = model.estimate(&body);

    Ok(Some(MeasurementResult {
        body_length_cm: body.body_length_cm,
        shoulder_height_cm: body.shoulder_height_cm,
        rump_height_cm: body.rump_height_cm,
        body_height_cm: body.body_height_cm,
        distance_m: options.distance_m,
        angle_deg: options.angle_deg,
        weight_kg,
        hill_fallback: landmarks.hill_fallback,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weight::default_weight_model;

    fn profile_of(mask: &Mask) -> MaskProfile {
        let bbox = BoundingBox::from_corner(0, 0, mask.width(), mask.height());
        MaskProfile::from_mask(mask, &bbox).unwrap().unwrap()
    }

    /// 20x20 mask with a solid slab on rows 5..15, columns 2..18.
    fn slab_mask() -> Mask {
        Mask::from_fn(20, 20, |x, y| {
            u8::from((2..18).contains(&x) && (5..15).contains(&y))
        })
    }

    #[test]
    fn slab_pixel_measurements() {
        let mask = slab_mask();
        let profile = profile_of(&mask);
        let landmarks = Landmarks::locate(&profile, Direction::Left).unwrap();

        let pixels = measure_pixels(&profile, &landmarks).unwrap();
        // Trimmed width 16: the scan row crosses the full slab.
        assert_eq!(pixels.body_length, 16);
        assert_eq!(pixels.body_height, 9);
        assert_eq!(pixels.shoulder_height, 9);
        assert_eq!(pixels.rump_height, 9);
        assert_eq!(pixels.offset, (2, 0));
    }

    #[test]
    fn scan_row_sits_halfway_down_the_torso() {
        // Torso rows 4..10 with a stray dot sharing the scan row beyond a
        // gap; the longest run must span only the slab.
        let mask = Mask::from_fn(12, 12, |x, y| {
            u8::from((1..9).contains(&x) && (4..10).contains(&y)) | u8::from(x == 10 && y == 6)
        });
        let profile = profile_of(&mask);
        let landmarks = Landmarks::locate(&profile, Direction::Left).unwrap();

        let pixels = measure_pixels(&profile, &landmarks).unwrap();
        // body_height = 9 - 4 = 5, scan row = 4 + 2 = 6, slab run is 8 wide.
        assert_eq!(pixels.body_height, 5);
        assert_eq!(pixels.body_length, 8);
    }

    #[test]
    fn empty_scan_row_is_an_error() {
        // Two horizontal bars; the middle column spans both, and the scan
        // row lands in the gap between them.
        let mask = Mask::from_fn(20, 12, |_, y| u8::from((2..4).contains(&y) || (8..10).contains(&y)));
        let profile = profile_of(&mask);
        let landmarks = Landmarks::locate(&profile, Direction::Left).unwrap();

        // body_height = 9 - 2 = 7, scan row = 2 + 3 = 5, which is empty.
        let err = measure_pixels(&profile, &landmarks).unwrap_err();
        assert!(matches!(err, Error::NoBodyLine { row: 5 }));
    }

    #[test]
    fn empty_middle_column_is_an_error() {
        // Foreground at columns 0..4 and 12..16 of the trimmed crop; the
        // middle lands between the blocks.
        let mask = Mask::from_fn(16, 10, |x, y| {
            u8::from((x < 4 || (12..16).contains(&x)) && (2..8).contains(&y))
        });
        let profile = profile_of(&mask);
        let landmarks = Landmarks::locate(&profile, Direction::Left).unwrap();

        assert_eq!(landmarks.shoulder.column, 3);
        assert_eq!(landmarks.rump.column, 12);
        let err = measure_pixels(&profile, &landmarks).unwrap_err();
        assert!(matches!(err, Error::EmptyColumn { column: 7 }));
    }

    #[test]
    fn measure_runs_the_full_pipeline() {
        let mask = slab_mask();
        let bbox = BoundingBox::from_corner(0, 0, 20, 20);
        let options = ConvertOptions::new(200.0, 20.0)
            .with_angle(0.0)
            .with_mask_shape(20, 20)
            .with_orig_shape(20, 20);
        let model = default_weight_model();

        let result = measure(&mask, &bbox, Direction::Left, &options, &model)
            .unwrap()
            .unwrap();

        // 200 px/cm at 20 cm from 1.5 m away; no rescale, no tilt.
        let per_cm = 200.0 * 20.0 / 150.0;
        assert!((result.body_length_cm - 16.0 / per_cm).abs() < 1e-9);
        assert!((result.shoulder_height_cm - 9.0 / per_cm).abs() < 1e-9);
        assert!((result.rump_height_cm - 9.0 / per_cm).abs() < 1e-9);
        assert!((result.body_height_cm - 9.0 / per_cm).abs() < 1e-9);
        assert_eq!(result.distance_m, 1.5);
        assert_eq!(result.angle_deg, 0.0);
        assert!(result.hill_fallback);

        let expected_weight = result.body_length_cm * 0.45287999
            + result.rump_height_cm * 1.30813392
            + result.shoulder_height_cm * 0.55532975
            - 111.45145379928671;
        assert!((result.weight_kg - expected_weight).abs() < 1e-9);
    }

    #[test]
    fn measure_skips_empty_detections() {
        let mask = slab_mask();
        let bbox = BoundingBox::from_corner(0, 0, 2, 2);
        let options = ConvertOptions::new(200.0, 20.0);
        let model = default_weight_model();

        let result = measure(&mask, &bbox, Direction::Left, &options, &model).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn measure_propagates_bad_options() {
        let mask = slab_mask();
        let bbox = BoundingBox::from_corner(0, 0, 20, 20);
        let options = ConvertOptions::new(200.0, 20.0).with_angle(90.0);
        let model = default_weight_model();

        let result = measure(&mask, &bbox, Direction::Left, &options, &model);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }
}
