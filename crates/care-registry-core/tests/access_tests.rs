//! Access layer integration tests.

use care_registry_core::access::{AccessError, AccessLayer};
use care_registry_core::db::Database;
use care_registry_core::models::{
    DoctorInput, Identity, MappingInput, PatientInput, PatientPatch,
};

fn identity(db: &Database, username: &str) -> Identity {
    db.register_identity(username.to_string(), format!("{}@example.com", username))
        .unwrap()
        .identity
}

fn asthma() -> PatientInput {
    PatientInput {
        age: 25,
        gender: "female".to_string(),
        medical_history: "Asthma".to_string(),
    }
}

fn dermatology() -> DoctorInput {
    DoctorInput {
        specialization: "Dermatology".to_string(),
        phone: "9876543210".to_string(),
    }
}

#[test]
fn test_second_profile_for_identity_conflicts() {
    let db = Database::open_in_memory().unwrap();
    let access = AccessLayer::new(&db);
    let a = identity(&db, "alice");

    access.create_doctor(Some(&a), dermatology()).unwrap();
    access.create_patient(Some(&a), asthma()).unwrap();

    assert!(matches!(
        access.create_doctor(Some(&a), dermatology()),
        Err(AccessError::Conflict(_))
    ));
    assert!(matches!(
        access.create_patient(Some(&a), asthma()),
        Err(AccessError::Conflict(_))
    ));
}

#[test]
fn test_assignment_scenario() {
    let db = Database::open_in_memory().unwrap();
    let access = AccessLayer::new(&db);
    let a = identity(&db, "testuser");
    let b = identity(&db, "doc2");

    let patient = access.create_patient(Some(&a), asthma()).unwrap();
    let doctor = access.create_doctor(Some(&b), dermatology()).unwrap();
    assert_eq!(patient.user, a);
    assert_eq!(doctor.user, b);

    let input = MappingInput {
        patient_id: patient.id.clone(),
        doctor_id: doctor.id.clone(),
    };
    let mapping = access.create_mapping(Some(&a), input.clone()).unwrap();

    let again = access.create_mapping(Some(&a), input);
    match again {
        Err(AccessError::Conflict(msg)) => {
            assert_eq!(msg, "This doctor is already assigned to this patient.")
        }
        other => panic!("expected conflict, got {:?}", other),
    }

    // First assignment is still retrievable
    let retrieved = access.get_mapping(Some(&b), &mapping.id).unwrap();
    assert_eq!(retrieved, mapping);
}

#[test]
fn test_unassigned_patient_lists_empty() {
    let db = Database::open_in_memory().unwrap();
    let access = AccessLayer::new(&db);
    let a = identity(&db, "alice");
    let patient = access.create_patient(Some(&a), asthma()).unwrap();

    assert!(access
        .list_mappings_for_patient(Some(&a), &patient.id)
        .unwrap()
        .is_empty());
    assert!(access
        .list_mappings_for_patient(Some(&a), "no-such-patient")
        .unwrap()
        .is_empty());
}

#[test]
fn test_patient_listing_is_owner_scoped() {
    let db = Database::open_in_memory().unwrap();
    let access = AccessLayer::new(&db);
    let a = identity(&db, "alice");
    let b = identity(&db, "bob");

    let patient = access.create_patient(Some(&a), asthma()).unwrap();

    assert!(access.list_patients(Some(&b)).unwrap().is_empty());
    assert_eq!(access.list_patients(Some(&a)).unwrap(), vec![patient]);
}

#[test]
fn test_patient_delete_cascades_to_assignments() {
    let db = Database::open_in_memory().unwrap();
    let access = AccessLayer::new(&db);
    let a = identity(&db, "alice");
    let b = identity(&db, "bob");
    let c = identity(&db, "carol");

    let patient = access.create_patient(Some(&a), asthma()).unwrap();
    let first = access.create_doctor(Some(&b), dermatology()).unwrap();
    let second = access.create_doctor(Some(&c), dermatology()).unwrap();

    let mapping_ids: Vec<String> = [&first, &second]
        .iter()
        .map(|doctor| {
            access
                .create_mapping(
                    Some(&a),
                    MappingInput {
                        patient_id: patient.id.clone(),
                        doctor_id: doctor.id.clone(),
                    },
                )
                .unwrap()
                .id
        })
        .collect();

    access.delete_patient(Some(&a), &patient.id).unwrap();

    for id in &mapping_ids {
        assert!(matches!(
            access.get_mapping(Some(&a), id),
            Err(AccessError::NotFound(_))
        ));
    }
    // Doctors are untouched
    assert_eq!(access.list_doctors(Some(&a)).unwrap().len(), 2);
}

#[test]
fn test_identity_delete_cascades() {
    let db = Database::open_in_memory().unwrap();
    let access = AccessLayer::new(&db);
    let a = identity(&db, "alice");
    let b = identity(&db, "bob");

    let patient = access.create_patient(Some(&a), asthma()).unwrap();
    let doctor = access.create_doctor(Some(&b), dermatology()).unwrap();
    let mapping = access
        .create_mapping(
            Some(&a),
            MappingInput {
                patient_id: patient.id.clone(),
                doctor_id: doctor.id.clone(),
            },
        )
        .unwrap();

    assert!(db.delete_identity(&b.id).unwrap());

    assert!(matches!(
        access.get_doctor(Some(&a), &doctor.id),
        Err(AccessError::NotFound(_))
    ));
    assert!(matches!(
        access.get_mapping(Some(&a), &mapping.id),
        Err(AccessError::NotFound(_))
    ));
    assert!(access.get_patient(Some(&a), &patient.id).is_ok());
}

#[test]
fn test_unauthenticated_calls_do_not_mutate() {
    let db = Database::open_in_memory().unwrap();
    let access = AccessLayer::new(&db);
    let a = identity(&db, "alice");
    let patient = access.create_patient(Some(&a), asthma()).unwrap();

    assert!(matches!(
        access.create_doctor(None, dermatology()),
        Err(AccessError::Authentication)
    ));
    assert!(matches!(
        access.update_patient(
            None,
            &patient.id,
            PatientPatch {
                age: Some(99),
                ..Default::default()
            }
        ),
        Err(AccessError::Authentication)
    ));
    assert!(matches!(
        access.delete_patient(None, &patient.id),
        Err(AccessError::Authentication)
    ));

    assert!(db.list_doctors().unwrap().is_empty());
    assert_eq!(db.get_patient(&patient.id).unwrap().unwrap().age, 25);
}

#[test]
fn test_assignments_visible_to_any_caller() {
    let db = Database::open_in_memory().unwrap();
    let access = AccessLayer::new(&db);
    let a = identity(&db, "alice");
    let b = identity(&db, "bob");
    let stranger = identity(&db, "mallory");

    let patient = access.create_patient(Some(&a), asthma()).unwrap();
    let doctor = access.create_doctor(Some(&b), dermatology()).unwrap();

    // Neither profile belongs to the caller
    let mapping = access
        .create_mapping(
            Some(&stranger),
            MappingInput {
                patient_id: patient.id.clone(),
                doctor_id: doctor.id,
            },
        )
        .unwrap();

    assert_eq!(
        access.list_mappings_for_patient(Some(&stranger), &patient.id).unwrap(),
        vec![mapping.clone()]
    );
    access.delete_mapping(Some(&stranger), &mapping.id).unwrap();
    assert!(access.list_mappings(Some(&a)).unwrap().is_empty());
}
