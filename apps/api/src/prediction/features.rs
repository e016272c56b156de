//! Feature extraction: turns a submitted form into the exact column vector
//! the classifier was trained on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Training columns, in the order the model expects them.
pub const FEATURE_COLUMNS: [&str; 50] = [
    "Age",
    "Gender",
    "Temperature (C)",
    "Humidity",
    "Wind Speed (km/h)",
    "nausea",
    "joint_pain",
    "abdominal_pain",
    "high_fever",
    "chills",
    "fatigue",
    "runny_nose",
    "pain_behind_the_eyes",
    "dizziness",
    "headache",
    "chest_pain",
    "vomiting",
    "cough",
    "shivering",
    "asthma_history",
    "high_cholesterol",
    "diabetes",
    "obesity",
    "hiv_aids",
    "nasal_polyps",
    "asthma",
    "high_blood_pressure",
    "severe_headache",
    "weakness",
    "trouble_seeing",
    "fever",
    "body_aches",
    "sore_throat",
    "sneezing",
    "diarrhea",
    "rapid_breathing",
    "rapid_heart_rate",
    "pain_behind_eyes",
    "swollen_glands",
    "rashes",
    "sinus_headache",
    "facial_pain",
    "shortness_of_breath",
    "reduced_smell_and_taste",
    "skin_irritation",
    "itchiness",
    "throbbing_headache",
    "confusion",
    "back_pain",
    "knee_ache",
];

pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// Number of leading numeric (non-symptom) columns.
const NUMERIC_COLUMNS: usize = 5;

/// Training data carries both spellings; only the first is offered on the
/// form and the second always mirrors it.
const PAIN_BEHIND_EYES_FORM: &str = "pain_behind_the_eyes";
const PAIN_BEHIND_EYES_ALIAS: &str = "pain_behind_eyes";

/// Required numeric/categorical fields, checked in this order.
const REQUIRED_FIELDS: [&str; 5] = ["age", "temperature", "humidity", "wind_speed", "gender"];

/// Symptoms rendered as checkboxes on the form.
pub fn symptom_features() -> Vec<&'static str> {
    FEATURE_COLUMNS[NUMERIC_COLUMNS..]
        .iter()
        .copied()
        .filter(|s| *s != PAIN_BEHIND_EYES_ALIAS)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("ERROR: The field '{0}' is required.")]
    MissingField(String),

    #[error("ERROR: Please ensure Age, Temperature, Humidity, and Wind Speed are valid numbers.")]
    InvalidNumber,

    #[error("ERROR: Unknown symptom '{0}'.")]
    UnknownSymptom(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[serde(other)]
    Unspecified,
}

impl Gender {
    fn parse(value: &str) -> Self {
        match value {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Unspecified,
        }
    }

    /// Encoding used in training. Unrecognised values were filled with 0.
    fn encode(self) -> f64 {
        match self {
            Gender::Male => 1.0,
            Gender::Female | Gender::Unspecified => 0.0,
        }
    }
}

/// Typed prediction input, used by the JSON API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub age: f64,
    pub gender: Gender,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

impl PredictRequest {
    /// Parses the HTML form representation.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, FeatureError> {
        for field in REQUIRED_FIELDS {
            let present = form.get(field).is_some_and(|v| !v.is_empty());
            if !present {
                return Err(FeatureError::MissingField(title_case(field)));
            }
        }

        // All required fields are present at this point.
        let number = |field: &str| -> Result<f64, FeatureError> {
            form.get(field)
                .map(|v| v.trim())
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .ok_or(FeatureError::InvalidNumber)
        };

        let age = number("age")?;
        let temperature = number("temperature")?;
        let humidity = number("humidity")?;
        let wind_speed = number("wind_speed")?;
        let gender = Gender::parse(form.get("gender").map(String::as_str).unwrap_or_default());

        let symptoms = symptom_features()
            .into_iter()
            .filter(|s| form.get(*s).is_some_and(|v| v == "1"))
            .map(str::to_string)
            .collect();

        Ok(PredictRequest {
            age,
            gender,
            temperature,
            humidity,
            wind_speed,
            symptoms,
        })
    }

    /// Builds the model input vector, rejecting unknown symptoms and
    /// non-finite numbers.
    pub fn to_features(&self) -> Result<FeatureVector, FeatureError> {
        let numeric = [self.age, self.temperature, self.humidity, self.wind_speed];
        if numeric.iter().any(|v| !v.is_finite()) {
            return Err(FeatureError::InvalidNumber);
        }

        let mut values = vec![0.0; FEATURE_COUNT];
        values[0] = self.age;
        values[1] = self.gender.encode();
        values[2] = self.temperature;
        values[3] = self.humidity;
        values[4] = self.wind_speed;

        for symptom in &self.symptoms {
            let idx = column_index(symptom)
                .filter(|idx| *idx >= NUMERIC_COLUMNS)
                .ok_or_else(|| FeatureError::UnknownSymptom(symptom.clone()))?;
            values[idx] = 1.0;
        }

        if let (Some(form_idx), Some(alias_idx)) = (
            column_index(PAIN_BEHIND_EYES_FORM),
            column_index(PAIN_BEHIND_EYES_ALIAS),
        ) {
            values[alias_idx] = values[form_idx];
        }

        Ok(FeatureVector(values))
    }
}

/// One row of model input, always `FEATURE_COUNT` wide.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[cfg(test)]
    pub fn get(&self, column: &str) -> Option<f64> {
        column_index(column).map(|idx| self.0[idx])
    }

    /// Names of the symptom columns set to 1.
    pub fn active_symptoms(&self) -> Vec<&'static str> {
        FEATURE_COLUMNS[NUMERIC_COLUMNS..]
            .iter()
            .zip(&self.0[NUMERIC_COLUMNS..])
            .filter(|(name, v)| **v > 0.0 && **name != PAIN_BEHIND_EYES_ALIAS)
            .map(|(name, _)| *name)
            .collect()
    }
}

fn column_index(column: &str) -> Option<usize> {
    FEATURE_COLUMNS.iter().position(|c| *c == column)
}

/// `wind_speed` -> `Wind Speed`.
fn title_case(field: &str) -> String {
    field
        .split('_')
        .map(|w| {
            let mut c = w.chars();
            match c.next() {
                None => String::new(),
                Some(f) => f.to_uppercase().to_string() + c.as_str(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
