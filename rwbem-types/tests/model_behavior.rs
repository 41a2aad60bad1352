//! Behavior tests for the CIM object model
//!
//! These exercise the model through its public API the way operation
//! results and the MOF compiler do: build objects, compare them, render
//! them, and check that every typing invariant holds at the boundaries.

use rwbem_types::{
    CimClass, CimDateTime, CimInstance, CimInstanceName, CimMethod, CimParameter, CimProperty,
    CimQualifier, CimType, CimValue, ModelError,
};

fn disk_class() -> CimClass {
    CimClass::new("ACME_Disk")
        .with_superclass("CIM_StorageExtent")
        .with_qualifier(CimQualifier::boolean("Abstract", false))
        .with_property(
            CimProperty::new("DeviceID", CimType::String, false, None)
                .unwrap()
                .with_qualifier(CimQualifier::boolean("Key", true)),
        )
        .with_property(
            CimProperty::new("BlockSize", CimType::Uint64, false, Some(CimValue::Uint64(512)))
                .unwrap(),
        )
        .with_method(
            CimMethod::new("Reset", CimType::Uint32)
                .with_parameter(CimParameter::new("Force", CimType::Boolean, false)),
        )
}

#[test]
fn class_lookup_is_case_insensitive_but_output_preserves_case() {
    let class = disk_class();
    assert!(class.properties.contains("deviceid"));
    assert!(class.methods.contains("RESET"));
    let names: Vec<_> = class.properties.keys().map(|n| n.as_str()).collect();
    assert_eq!(names, ["DeviceID", "BlockSize"]);
}

#[test]
fn clone_and_modify_leaves_original_untouched() {
    let class = disk_class();
    let mut modified = class.clone();
    modified
        .properties
        .get_mut("BlockSize")
        .unwrap()
        .set_value(Some(CimValue::Uint64(4096)))
        .unwrap();
    assert_ne!(class, modified);
    assert_eq!(
        class.properties.get("BlockSize").unwrap().value,
        Some(CimValue::Uint64(512))
    );
}

#[test]
fn instance_paths_carry_identity() {
    let mut path = CimInstanceName::new("ACME_Disk").with_namespace("root/cimv2");
    path.bind("DeviceID", CimValue::from("disk0")).unwrap();

    let a = CimInstance::new("ACME_Disk").with_path(path.clone());
    let mut renamed = path.clone();
    renamed.bind("DeviceID", CimValue::from("disk1")).unwrap();
    let b = CimInstance::new("ACME_Disk").with_path(renamed);
    assert_ne!(a, b);
}

#[test]
fn width_checked_integers_reject_out_of_range() {
    let err = CimValue::integer(CimType::Uint8, 256).unwrap_err();
    assert!(matches!(err, ModelError::OutOfRange { .. }));
    assert_eq!(
        CimValue::integer(CimType::Uint8, 255).unwrap(),
        CimValue::Uint8(255)
    );
}

#[test]
fn datetime_canonical_form_round_trips_through_values() {
    let text = "20240101123045.123456+060";
    let value = CimValue::from_cim_str(CimType::DateTime, text).unwrap();
    assert_eq!(value.to_cim_str(), text);
    let CimValue::DateTime(dt) = &value else {
        panic!("expected datetime value");
    };
    assert!(!dt.is_interval());
}

#[test]
fn interval_and_timestamp_are_distinct() {
    let interval: CimDateTime = "00000001000000.000000:000".parse().unwrap();
    let timestamp: CimDateTime = "20240101000000.000000+000".parse().unwrap();
    assert!(interval.is_interval());
    assert!(!timestamp.is_interval());
    assert_ne!(interval, timestamp);
}

#[test]
fn class_mof_renders_members_in_declaration_order() {
    let mof = disk_class().to_mof();
    let device = mof.find("DeviceID").unwrap();
    let block = mof.find("BlockSize").unwrap();
    let reset = mof.find("Reset").unwrap();
    assert!(device < block && block < reset);
    assert!(mof.contains("[Key ( true )]"));
    assert!(mof.contains("uint64 BlockSize = 512;"));
}
