//! Patient roster types and the `/check-bias` request body.
//!
//! Missing fields are defaulted here, at the deserialization boundary, so the
//! checks never deal with absent values.

use serde::{Deserialize, Serialize};

/// Trial identifier used when a request does not carry one.
pub const UNKNOWN_TRIAL: &str = "unknown";

/// A single enrolled patient. Unknown fields in the payload are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// Recognised values of the `gender` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    /// Missing or any value other than `M`/`F`.
    Unrecognized,
}

impl Sex {
    pub fn parse(value: &str) -> Self {
        match value.to_uppercase().as_str() {
            "M" => Self::Male,
            "F" => Self::Female,
            _ => Self::Unrecognized,
        }
    }
}

impl PatientRecord {
    pub fn new(age: f64, gender: impl Into<String>) -> Self {
        Self {
            age: Some(age),
            gender: Some(gender.into()),
        }
    }

    /// Age in years; `0` when absent.
    pub fn age(&self) -> f64 {
        self.age.unwrap_or(0.0)
    }

    pub fn sex(&self) -> Sex {
        self.gender.as_deref().map_or(Sex::Unrecognized, Sex::parse)
    }
}

/// Body of `POST /check-bias`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBiasRequest {
    #[serde(default)]
    pub trial_id: Option<String>,
    #[serde(default)]
    pub patient_data: Option<Vec<PatientRecord>>,
}

impl CheckBiasRequest {
    pub fn trial_id(&self) -> &str {
        self.trial_id.as_deref().unwrap_or(UNKNOWN_TRIAL)
    }

    pub fn patients(&self) -> &[PatientRecord] {
        self.patient_data.as_deref().unwrap_or_default()
    }
}

/// Roster input accepted by the offline `check` command: either a bare array
/// of patients or a full request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RosterInput {
    Patients(Vec<PatientRecord>),
    Request(CheckBiasRequest),
}

impl RosterInput {
    pub fn into_request(self) -> CheckBiasRequest {
        match self {
            Self::Patients(patients) => CheckBiasRequest {
                trial_id: None,
                patient_data: Some(patients),
            },
            Self::Request(request) => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sex_is_case_insensitive() {
        assert_eq!(Sex::parse("M"), Sex::Male);
        assert_eq!(Sex::parse("m"), Sex::Male);
        assert_eq!(Sex::parse("f"), Sex::Female);
        assert_eq!(Sex::parse("X"), Sex::Unrecognized);
        assert_eq!(Sex::parse("male"), Sex::Unrecognized);
        assert_eq!(Sex::parse(""), Sex::Unrecognized);
    }

    #[test]
    fn test_record_defaults() {
        let record: PatientRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.age(), 0.0);
        assert_eq!(record.sex(), Sex::Unrecognized);
    }

    #[test]
    fn test_record_null_fields_default() {
        let record: PatientRecord =
            serde_json::from_str(r#"{"age": null, "gender": null}"#).unwrap();
        assert_eq!(record.age(), 0.0);
        assert_eq!(record.sex(), Sex::Unrecognized);
    }

    #[test]
    fn test_record_ignores_extra_fields() {
        let record: PatientRecord =
            serde_json::from_str(r#"{"age": 34, "gender": "f", "site": "Boston"}"#).unwrap();
        assert_eq!(record.age(), 34.0);
        assert_eq!(record.sex(), Sex::Female);
    }

    #[test]
    fn test_record_rejects_wrong_types() {
        assert!(serde_json::from_str::<PatientRecord>(r#"{"age": "old"}"#).is_err());
        assert!(serde_json::from_str::<PatientRecord>(r#"{"gender": 1}"#).is_err());
    }

    #[test]
    fn test_request_defaults() {
        let req: CheckBiasRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.trial_id(), "unknown");
        assert!(req.patients().is_empty());
    }

    #[test]
    fn test_request_camel_case() {
        let req: CheckBiasRequest = serde_json::from_str(
            r#"{"trialId": "NCT001", "patientData": [{"age": 25, "gender": "M"}]}"#,
        )
        .unwrap();
        assert_eq!(req.trial_id(), "NCT001");
        assert_eq!(req.patients(), &[PatientRecord::new(25.0, "M")]);
    }

    #[test]
    fn test_request_rejects_non_array_patients() {
        let result =
            serde_json::from_str::<CheckBiasRequest>(r#"{"patientData": {"age": 25}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_roster_input_bare_array() {
        let input: RosterInput =
            serde_json::from_str(r#"[{"age": 50, "gender": "F"}, {"age": 61}]"#).unwrap();
        let req = input.into_request();
        assert_eq!(req.trial_id(), "unknown");
        assert_eq!(req.patients().len(), 2);
    }

    #[test]
    fn test_roster_input_full_request() {
        let input: RosterInput =
            serde_json::from_str(r#"{"trialId": "T9", "patientData": []}"#).unwrap();
        let req = input.into_request();
        assert_eq!(req.trial_id(), "T9");
        assert!(req.patients().is_empty());
    }
}
