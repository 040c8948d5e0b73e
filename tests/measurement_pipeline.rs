//! Integration tests running the measurement pipeline against
//! hand-computed reference values.

use goat_gauge::{
    default_weight_model, measure, BoundingBox, ConvertOptions, Detection, Direction, FixedAngle,
    FixedDetector, FixedDistance, Mask, MaskFileDetector, MeasurementLog, MeasurementResult,
    MeasurementSession, Snapshot,
};

const CALIBRATION: f64 = 155.42;
const CALIBRATION_DISTANCE_CM: f64 = 20.0;

/// Restated conversion formula: pixels per centimeter at `distance_m`.
fn pixels_per_cm(distance_m: f64) -> f64 {
    CALIBRATION * CALIBRATION_DISTANCE_CM / (distance_m * 100.0)
}

/// Restated weight regression over the converted measurements.
fn reference_weight(body_length_cm: f64, shoulder_height_cm: f64, rump_height_cm: f64) -> f64 {
    body_length_cm * 0.45287999 + rump_height_cm * 1.30813392 + shoulder_height_cm * 0.55532975
        - 111.45145379928671
}

#[test]
fn rectangle_reference_values() {
    // A 400x100 rectangle: rows 270..370, columns 100..500 of a 640x640
    // mask. Every expected value below is derived by hand.
    let mask = Mask::from_fn(640, 640, |x, y| {
        u8::from((270..370).contains(&y) && (100..500).contains(&x))
    });
    let bbox = BoundingBox::from_corner(100, 270, 400, 100);
    let options = ConvertOptions::new(CALIBRATION, CALIBRATION_DISTANCE_CM);
    let model = default_weight_model();

    let result = measure(&mask, &bbox, Direction::Left, &options, &model)
        .expect("measurement failed")
        .expect("rectangle not detected");

    // 400 px across the torso scan line; 99 px for every vertical extent.
    let per_cm = pixels_per_cm(1.5);
    let expected_length = 400.0 / per_cm;
    let expected_height = 99.0 / (20.0_f64.to_radians()).cos() / per_cm;

    let comparisons = [
        ("body length", result.body_length_cm, expected_length),
        ("shoulder height", result.shoulder_height_cm, expected_height),
        ("rump height", result.rump_height_cm, expected_height),
        ("body height", result.body_height_cm, expected_height),
    ];

    println!("\nRectangle mask vs reference:");
    println!("{:<16} {:>10} {:>10}", "Measurement", "pipeline", "reference");
    println!("{:-<38}", "");
    for (name, actual, expected) in comparisons {
        println!("{:<16} {:>10.4} {:>10.4}", name, actual, expected);
        assert!(
            (actual - expected).abs() < 1e-9,
            "{} {:.6} differs from reference {:.6}",
            name,
            actual,
            expected
        );
    }

    // A rectangle has a flat back line, so the hill must fall back.
    assert!(result.hill_fallback);

    let expected_weight = reference_weight(expected_length, expected_height, expected_height);
    assert!((result.weight_kg - expected_weight).abs() < 1e-9);
}

/// Crude side-view silhouette on a 200x120 grid, facing left: a torso
/// slab, a head, two legs and a raised rump so the back line rises.
///
///  - head: columns 5..20, rows 30..50
///  - torso: columns 20..180, rows 40..70
///  - rump hump: columns 140..180, rows 35..40
///  - front leg: columns 40..50, rows 70..100
///  - rear leg: columns 150..160, rows 70..100
fn goat_mask() -> Mask {
    Mask::from_fn(200, 120, |x, y| {
        let head = (5..20).contains(&x) && (30..50).contains(&y);
        let torso = (20..180).contains(&x) && (40..70).contains(&y);
        let hump = (140..180).contains(&x) && (35..40).contains(&y);
        let front_leg = (40..50).contains(&x) && (70..100).contains(&y);
        let rear_leg = (150..160).contains(&x) && (70..100).contains(&y);
        u8::from(head || torso || hump || front_leg || rear_leg)
    })
}

/// Mirror of [`goat_mask`], facing right.
fn mirrored_goat_mask() -> Mask {
    let original = goat_mask();
    Mask::from_fn(200, 120, |x, y| original.get(199 - x, y))
}

fn goat_options() -> ConvertOptions {
    // Identity rescale and no tilt keep the expected values legible.
    ConvertOptions::new(200.0, CALIBRATION_DISTANCE_CM)
        .with_angle(0.0)
        .with_mask_shape(120, 200)
        .with_orig_shape(120, 200)
}

/// Hand-derived pixel extents for [`goat_mask`]: torso run 160 px wide,
/// shoulder 59 px, rump 64 px (rear foot to hump top), torso 29 px.
fn expected_goat_result(distance_m: f64) -> (f64, f64, f64, f64, f64) {
    let per_cm = 200.0 * CALIBRATION_DISTANCE_CM / (distance_m * 100.0);
    let body_length = 160.0 / per_cm;
    let shoulder = 59.0 / per_cm;
    let rump = 64.0 / per_cm;
    let body_height = 29.0 / per_cm;
    let weight = reference_weight(body_length, shoulder, rump);
    (body_length, shoulder, rump, body_height, weight)
}

fn assert_goat_result(result: &MeasurementResult, distance_m: f64) {
    let (body_length, shoulder, rump, body_height, weight) = expected_goat_result(distance_m);

    assert!((result.body_length_cm - body_length).abs() < 1e-9);
    assert!((result.shoulder_height_cm - shoulder).abs() < 1e-9);
    assert!((result.rump_height_cm - rump).abs() < 1e-9);
    assert!((result.body_height_cm - body_height).abs() < 1e-9);
    assert!((result.weight_kg - weight).abs() < 1e-9);
    // The hump gives the back line a genuine rise.
    assert!(!result.hill_fallback);
}

#[test]
fn goat_silhouette_reference_values() {
    let mask = goat_mask();
    let bbox = BoundingBox::from_corner(0, 0, 200, 120);
    let model = default_weight_model();

    let result = measure(&mask, &bbox, Direction::Left, &goat_options(), &model)
        .expect("measurement failed")
        .expect("silhouette not detected");

    assert_goat_result(&result, 1.5);
}

#[test]
fn mirrored_silhouette_measures_identically() {
    let model = default_weight_model();
    let bbox = BoundingBox::from_corner(0, 0, 200, 120);

    let left = measure(
        &goat_mask(),
        &bbox,
        Direction::Left,
        &goat_options(),
        &model,
    )
    .unwrap()
    .unwrap();
    let right = measure(
        &mirrored_goat_mask(),
        &bbox,
        Direction::Right,
        &goat_options(),
        &model,
    )
    .unwrap()
    .unwrap();

    assert!((left.body_length_cm - right.body_length_cm).abs() < 1e-9);
    assert!((left.shoulder_height_cm - right.shoulder_height_cm).abs() < 1e-9);
    assert!((left.rump_height_cm - right.rump_height_cm).abs() < 1e-9);
    assert!((left.body_height_cm - right.body_height_cm).abs() < 1e-9);
    assert!((left.weight_kg - right.weight_kg).abs() < 1e-9);
    assert_eq!(left.hill_fallback, right.hill_fallback);
}

#[test]
fn session_with_providers_measures_the_silhouette() {
    let detection = Detection {
        mask: goat_mask(),
        bbox: BoundingBox::from_corner(0, 0, 200, 120),
    };
    let detector = FixedDetector::new(Some(detection));
    let distance = FixedDistance(2.0);
    let angle = FixedAngle(0.0);
    let model = default_weight_model();
    let session = MeasurementSession::new(&detector, &distance, &angle, goat_options(), &model);

    let result = session
        .measure(&Snapshot::new("pen_A/goat_7.png"), Direction::Left)
        .unwrap()
        .unwrap();

    // The provider distance overrides the options default.
    assert_eq!(result.distance_m, 2.0);
    assert_goat_result(&result, 2.0);

    let mut log = MeasurementLog::new();
    log.push("goat_7", result);
    assert_eq!(log.len(), 1);
    assert_eq!(log.records()[0].tag, "goat_7");
}

#[test]
fn mask_file_detector_matches_the_in_memory_path() {
    // Round-trip the silhouette through a PNG on disk; the file-backed
    // detector must land on the same measurements as the fixed one.
    let mask = goat_mask();
    let mut img = image::GrayImage::new(200, 120);
    for y in 0..120 {
        for x in 0..200 {
            if mask.is_foreground(x as usize, y as usize) {
                img.put_pixel(x, y, image::Luma([255]));
            }
        }
    }
    let path = std::env::temp_dir().join("goat_gauge_pipeline_test.png");
    img.save(&path).expect("failed to write test mask");

    let file_detector = MaskFileDetector::new();
    let fixed_detector = FixedDetector::new(Some(Detection {
        mask,
        // Tight box around the silhouette, as the file detector builds it.
        bbox: BoundingBox::from_corner(5, 30, 175, 70),
    }));
    let distance = FixedDistance(1.5);
    let angle = FixedAngle(0.0);
    let model = default_weight_model();

    let from_file = MeasurementSession::new(&file_detector, &distance, &angle, goat_options(), &model)
        .measure(&Snapshot::new(&path), Direction::Left)
        .unwrap()
        .unwrap();
    let from_memory =
        MeasurementSession::new(&fixed_detector, &distance, &angle, goat_options(), &model)
            .measure(&Snapshot::new(&path), Direction::Left)
            .unwrap()
            .unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(from_file, from_memory);
    assert_goat_result(&from_file, 1.5);
}
