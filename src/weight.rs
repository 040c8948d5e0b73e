use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::convert::BodyMeasurements;
use crate::error::{Error, Result};

/// Estimates live weight in kilograms from converted body measurements.
///
/// Implementations must be pure: the same measurements always produce the
/// same estimate.
pub trait WeightModel {
    fn estimate(&self, measurements: &BodyMeasurements) -> f64;
}

/// A body measurement a regression term can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    BodyLength,
    ShoulderHeight,
    RumpHeight,
    BodyHeight,
}

impl Feature {
    fn value(self, m: &BodyMeasurements) -> f64 {
        match self {
            Feature::BodyLength => m.body_length_cm,
            Feature::ShoulderHeight => m.shoulder_height_cm,
            Feature::RumpHeight => m.rump_height_cm,
            Feature::BodyHeight => m.body_height_cm,
        }
    }
}

/// One regression term: `coefficient * feature^power`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightTerm {
    pub feature: Feature,
    pub coefficient: f64,
    /// Exponent on the feature value; 1 for plain linear terms.
    #[serde(default = "default_power")]
    pub power: u8,
}

fn default_power() -> u8 {
    1
}

/// An affine model over measurement features.
///
/// Coefficient sets are data, not code: models refit offline load from
/// JSON without touching the measurement pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearWeightModel {
    terms: Vec<WeightTerm>,
    intercept: f64,
}

impl LinearWeightModel {
    pub fn new(terms: Vec<WeightTerm>, intercept: f64) -> Result<Self> {
        if terms.is_empty() {
            return Err(Error::InvalidModel("model has no terms".to_string()));
        }
        if !intercept.is_finite() {
            return Err(Error::InvalidModel(format!(
                "intercept {} is not finite",
                intercept
            )));
        }
        for term in &terms {
            if !term.coefficient.is_finite() {
                return Err(Error::InvalidModel(format!(
                    "coefficient {} for {:?} is not finite",
                    term.coefficient, term.feature
                )));
            }
        }
        Ok(Self { terms, intercept })
    }

    /// Load a coefficient set from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let model: Self = serde_json::from_reader(reader)?;
        Self::new(model.terms, model.intercept)
    }

    /// Save the coefficient set to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn terms(&self) -> &[WeightTerm] {
        &self.terms
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl WeightModel for LinearWeightModel {
    fn estimate(&self, measurements: &BodyMeasurements) -> f64 {
        let sum: f64 = self
            .terms
            .iter()
            .map(|t| t.coefficient * t.feature.value(measurements).powi(i32::from(t.power)))
            .sum();
        sum + self.intercept
    }
}

/// The production coefficient set, fitted offline against the reference
/// herd.
pub fn default_weight_model() -> LinearWeightModel {
    LinearWeightModel {
        terms: vec![
            WeightTerm {
                feature: Feature::BodyLength,
                coefficient: 0.45287999,
                power: 1,
            },
            WeightTerm {
                feature: Feature::RumpHeight,
                coefficient: 1.30813392,
                power: 1,
            },
            WeightTerm {
                feature: Feature::ShoulderHeight,
                coefficient: 0.55532975,
                power: 1,
            },
        ],
        intercept: -111.45145379928671,
    }
}
