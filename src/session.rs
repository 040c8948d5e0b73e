//! Measurement orchestration over the external providers.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::convert::ConvertOptions;
use crate::error::Result;
use crate::measure::{measure, MeasurementResult};
use crate::providers::{AngleSource, Detector, DistanceSource, Snapshot};
use crate::types::Direction;
use crate::weight::WeightModel;

/// Drives one measurement end to end: asks the providers for detection,
/// distance and angle, then runs the measurement pipeline on what they
/// returned.
pub struct MeasurementSession<'a> {
    detector: &'a dyn Detector,
    distance: &'a dyn DistanceSource,
    angle: &'a dyn AngleSource,
    options: ConvertOptions,
    model: &'a dyn WeightModel,
}

impl<'a> MeasurementSession<'a> {
    pub fn new(
        detector: &'a dyn Detector,
        distance: &'a dyn DistanceSource,
        angle: &'a dyn AngleSource,
        options: ConvertOptions,
        model: &'a dyn WeightModel,
    ) -> Self {
        Self {
            detector,
            distance,
            angle,
            options,
            model,
        }
    }

    /// Measure one snapshot.
    ///
    /// The three provider calls can each block on device or model I/O, so
    /// they run concurrently; the pipeline starts once all three have
    /// returned. A missing detection yields `Ok(None)` no matter what the
    /// other providers reported; provider and pipeline failures propagate.
    pub fn measure(
        &self,
        snapshot: &Snapshot,
        direction: Direction,
    ) -> Result<Option<MeasurementResult>> {
        debug!(
            snapshot = snapshot.name(),
            "requesting detection, distance and angle"
        );

        let detector = self.detector;
        let distance = self.distance;
        let angle = self.angle;
        let (detection, distance_m, angle_deg) = thread::scope(|s| {
            let detection = s.spawn(move || detector.detect(snapshot));
            let distance = s.spawn(move || distance.distance(snapshot));
            let angle = s.spawn(move || angle.angle(snapshot));
            (join(detection), join(distance), join(angle))
        });

        let Some(detection) = detection? else {
            debug!(snapshot = snapshot.name(), "no detection");
            return Ok(None);
        };
        let distance_m = distance_m?;
        let angle_deg = angle_deg?;

        let options = self
            .options
            .clone()
            .with_distance(distance_m)
            .with_angle(angle_deg);
        let result = measure(
            &detection.mask,
            &detection.bbox,
            direction,
            &options,
            self.model,
        )?;

        if let Some(ref measurement) = result {
            info!(
                snapshot = snapshot.name(),
                weight_kg = format!("{:.2}", measurement.weight_kg),
                body_length_cm = format!("{:.1}", measurement.body_length_cm),
                "measurement complete"
            );
        }

        Ok(result)
    }
}

/// Unwrap a scoped-thread result, resuming the panic on this thread.
fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(value) => value,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

/// One logged measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Free-form label for the measured animal or source image.
    pub tag: String,
    pub result: MeasurementResult,
}

/// An ordered, caller-owned collection of measurement outcomes.
///
/// There is no process-wide accumulator; create a log where results
/// should gather and pass it around explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementLog {
    records: Vec<MeasurementRecord>,
}

impl MeasurementLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tag: impl Into<String>, result: MeasurementResult) {
        self.records.push(MeasurementRecord {
            tag: tag.into(),
            result,
        });
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the log as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Read a log back from JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}
