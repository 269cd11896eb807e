//! The validated, immutable clinical record.

use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::{Field, FieldValue};
use crate::raw::{RawFields, RawValue};
use crate::schema::FEATURE_COUNT;
use crate::validate::{validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub fn code(self) -> u8 {
        match self {
            Sex::Female => 0,
            Sex::Male => 1,
        }
    }

    pub fn from_code(code: i64) -> Option<Sex> {
        match code {
            0 => Some(Sex::Female),
            1 => Some(Sex::Male),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Female => f.write_str("Female"),
            Sex::Male => f.write_str("Male"),
        }
    }
}

/// One patient's measurements, every field inside its schema domain.
///
/// The only way to obtain a `ClinicalRecord` is through validation, either
/// [`crate::validate()`] or the `TryFrom<RawFields>` / `Deserialize` impls
/// that delegate to it. Fields are read-only once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFields", into = "RawFields")]
pub struct ClinicalRecord {
    age: u8,
    sex: Sex,
    chest_pain_type: u8,
    resting_blood_pressure: u16,
    serum_cholesterol: u16,
    fasting_blood_sugar: bool,
    resting_ecg: u8,
    max_heart_rate: u16,
    exercise_angina: bool,
    st_depression: f64,
    st_slope: u8,
    major_vessels: u8,
    thalassemia: u8,
}

impl ClinicalRecord {
    /// Assemble a record from values already checked against the schema.
    /// Narrowing casts are lossless because every domain fits its target type.
    pub(crate) fn from_checked(values: &[FieldValue; FEATURE_COUNT]) -> Self {
        let int = |field: Field| match values[field.index()] {
            FieldValue::Int(v) => v,
            FieldValue::Float(v) => v as i64,
        };
        let float = |field: Field| values[field.index()].as_f64();
        Self {
            age: int(Field::Age) as u8,
            sex: Sex::from_code(int(Field::Sex)).unwrap_or(Sex::Female),
            chest_pain_type: int(Field::ChestPainType) as u8,
            resting_blood_pressure: int(Field::RestingBloodPressure) as u16,
            serum_cholesterol: int(Field::SerumCholesterol) as u16,
            fasting_blood_sugar: int(Field::FastingBloodSugar) == 1,
            resting_ecg: int(Field::RestingEcg) as u8,
            max_heart_rate: int(Field::MaxHeartRate) as u16,
            exercise_angina: int(Field::ExerciseAngina) == 1,
            st_depression: float(Field::StDepression),
            st_slope: int(Field::StSlope) as u8,
            major_vessels: int(Field::MajorVessels) as u8,
            thalassemia: int(Field::Thalassemia) as u8,
        }
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn chest_pain_type(&self) -> u8 {
        self.chest_pain_type
    }

    /// mmHg
    pub fn resting_blood_pressure(&self) -> u16 {
        self.resting_blood_pressure
    }

    /// mg/dl
    pub fn serum_cholesterol(&self) -> u16 {
        self.serum_cholesterol
    }

    /// Fasting blood sugar above 120 mg/dl.
    pub fn fasting_blood_sugar(&self) -> bool {
        self.fasting_blood_sugar
    }

    pub fn resting_ecg(&self) -> u8 {
        self.resting_ecg
    }

    pub fn max_heart_rate(&self) -> u16 {
        self.max_heart_rate
    }

    pub fn exercise_angina(&self) -> bool {
        self.exercise_angina
    }

    pub fn st_depression(&self) -> f64 {
        self.st_depression
    }

    pub fn st_slope(&self) -> u8 {
        self.st_slope
    }

    pub fn major_vessels(&self) -> u8 {
        self.major_vessels
    }

    pub fn thalassemia(&self) -> u8 {
        self.thalassemia
    }

    /// Numeric value of a field; booleans and categories yield their codes.
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::Age => FieldValue::Int(i64::from(self.age)),
            Field::Sex => FieldValue::Int(i64::from(self.sex.code())),
            Field::ChestPainType => FieldValue::Int(i64::from(self.chest_pain_type)),
            Field::RestingBloodPressure => FieldValue::Int(i64::from(self.resting_blood_pressure)),
            Field::SerumCholesterol => FieldValue::Int(i64::from(self.serum_cholesterol)),
            Field::FastingBloodSugar => FieldValue::Int(i64::from(self.fasting_blood_sugar)),
            Field::RestingEcg => FieldValue::Int(i64::from(self.resting_ecg)),
            Field::MaxHeartRate => FieldValue::Int(i64::from(self.max_heart_rate)),
            Field::ExerciseAngina => FieldValue::Int(i64::from(self.exercise_angina)),
            Field::StDepression => FieldValue::Float(self.st_depression),
            Field::StSlope => FieldValue::Int(i64::from(self.st_slope)),
            Field::MajorVessels => FieldValue::Int(i64::from(self.major_vessels)),
            Field::Thalassemia => FieldValue::Int(i64::from(self.thalassemia)),
        }
    }
}

impl TryFrom<RawFields> for ClinicalRecord {
    type Error = ValidationError;

    fn try_from(raw: RawFields) -> Result<Self, Self::Error> {
        validate(&raw)
    }
}

impl From<ClinicalRecord> for RawFields {
    fn from(record: ClinicalRecord) -> Self {
        RawFields::from(&record)
    }
}

impl From<&ClinicalRecord> for RawFields {
    fn from(record: &ClinicalRecord) -> Self {
        Field::ALL
            .iter()
            .map(|&field| {
                let value = match record.value(field) {
                    FieldValue::Int(v) => RawValue::Int(v),
                    FieldValue::Float(v) => RawValue::Float(v),
                };
                (field.key().to_string(), value)
            })
            .collect()
    }
}
