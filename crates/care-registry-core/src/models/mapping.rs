//! Patient/doctor assignment models.

use serde::{Deserialize, Serialize};

/// Assignment of a doctor to a patient. References both profiles and
/// owns neither; the (patient, doctor) pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientDoctorMapping {
    pub id: String,
    /// Patient profile ID
    #[serde(rename = "patient")]
    pub patient_id: String,
    /// Doctor profile ID
    #[serde(rename = "doctor")]
    pub doctor_id: String,
    /// Assignment timestamp (RFC 3339), set at creation
    pub assigned_at: String,
}

/// Request body for a new assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappingInput {
    #[serde(rename = "patient")]
    pub patient_id: String,
    #[serde(rename = "doctor")]
    pub doctor_id: String,
}

impl PatientDoctorMapping {
    /// Create a new assignment stamped with the current time.
    pub fn new(patient_id: String, doctor_id: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            doctor_id,
            assigned_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_mapping() {
        let mapping = PatientDoctorMapping::new("patient-1".into(), "doctor-1".into());
        assert_eq!(mapping.id.len(), 36);
        assert!(chrono::DateTime::parse_from_rfc3339(&mapping.assigned_at).is_ok());
    }

    #[test]
    fn test_wire_field_names() {
        let mapping = PatientDoctorMapping::new("p".into(), "d".into());
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["patient"], "p");
        assert_eq!(json["doctor"], "d");
        assert!(json.get("patient_id").is_none());

        let input: MappingInput =
            serde_json::from_str(r#"{"patient": "p", "doctor": "d"}"#).unwrap();
        assert_eq!(input.patient_id, "p");
        assert_eq!(input.doctor_id, "d");
    }
}
