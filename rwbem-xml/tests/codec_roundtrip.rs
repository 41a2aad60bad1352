//! Codec behavior: encode/parse round trips and response decoding
//!
//! The round-trip property: for every CIM object O,
//! `parse(encode(O)) == O` under the model's structural equality.

use rwbem_types::{
    CimClass, CimInstance, CimInstanceName, CimMethod, CimParameter, CimProperty, CimQualifier,
    CimQualifierDeclaration, CimScopes, CimType, CimValue,
};
use rwbem_xml::{
    parse_element, parse_response, CimXmlError, CimXmlItem, ResponseBody, ToCimXml,
};

fn sample_class() -> CimClass {
    CimClass::new("ACME_TapeDrive")
        .with_superclass("CIM_MediaAccessDevice")
        .with_qualifier(CimQualifier::boolean("Abstract", false))
        .with_property(
            CimProperty::new("DeviceID", CimType::String, false, None)
                .unwrap()
                .with_qualifier(CimQualifier::boolean("Key", true)),
        )
        .with_property(
            CimProperty::new(
                "Capabilities",
                CimType::Uint16,
                true,
                Some(
                    CimValue::array(
                        CimType::Uint16,
                        vec![CimValue::Uint16(2), CimValue::Uint16(7)],
                    )
                    .unwrap(),
                ),
            )
            .unwrap(),
        )
        .with_property(CimProperty::reference("System", "CIM_System", None).unwrap())
        .with_method(
            CimMethod::new("LoadMedia", CimType::Uint32)
                .with_parameter(CimParameter::new("Slot", CimType::Uint16, false))
                .with_parameter(CimParameter::reference("Media", "CIM_PhysicalMedia", false)),
        )
}

#[test]
fn class_round_trips_through_cim_xml() {
    let class = sample_class();
    let xml = class.to_cim_xml();
    match parse_element(&xml).unwrap() {
        CimXmlItem::Class(parsed) => assert_eq!(parsed, class),
        other => panic!("expected class, got {other:?}"),
    }
}

#[test]
fn instance_round_trips_through_cim_xml() {
    let mut path = CimInstanceName::new("ACME_TapeDrive").with_namespace("root/cimv2");
    path.bind("DeviceID", CimValue::from("tape0")).unwrap();
    let instance = CimInstance::new("ACME_TapeDrive")
        .with_property(
            CimProperty::new(
                "DeviceID",
                CimType::String,
                false,
                Some(CimValue::from("tape0")),
            )
            .unwrap(),
        )
        .with_property(
            CimProperty::new(
                "Started",
                CimType::Boolean,
                false,
                Some(CimValue::Boolean(true)),
            )
            .unwrap(),
        );
    let xml = instance.to_cim_xml();
    match parse_element(&xml).unwrap() {
        CimXmlItem::Instance(parsed) => assert_eq!(parsed, instance),
        other => panic!("expected instance, got {other:?}"),
    }
}

#[test]
fn instance_name_round_trips_with_reference_key() {
    let mut inner = CimInstanceName::new("CIM_System").with_namespace("root/cimv2");
    inner.bind("Name", CimValue::from("sys1")).unwrap();
    let mut path = CimInstanceName::new("CIM_InstalledOS");
    path.bind("System", CimValue::from(inner)).unwrap();
    path.bind("Serial", CimValue::Uint64(17)).unwrap();

    let xml = path.to_cim_xml();
    match parse_element(&xml).unwrap() {
        CimXmlItem::InstanceName(parsed) => assert_eq!(parsed, path),
        other => panic!("expected instance name, got {other:?}"),
    }
}

#[test]
fn qualifier_declaration_round_trips() {
    let mut scopes = CimScopes::default();
    scopes.set("property").unwrap();
    scopes.set("class").unwrap();
    let mut decl = CimQualifierDeclaration::new(
        "Description",
        CimType::String,
        false,
        Some(CimValue::from("")),
        scopes,
    )
    .unwrap();
    decl.translatable = Some(true);

    let xml = decl.to_cim_xml();
    match parse_element(&xml).unwrap() {
        CimXmlItem::QualifierDeclaration(parsed) => assert_eq!(parsed, decl),
        other => panic!("expected qualifier declaration, got {other:?}"),
    }
}

#[test]
fn error_response_is_decoded() {
    let body = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\
        <CIM CIMVERSION=\"2.0\" DTDVERSION=\"2.0\">\
        <MESSAGE ID=\"1001\" PROTOCOLVERSION=\"1.0\">\
        <SIMPLERSP>\
        <IMETHODRESPONSE NAME=\"DeleteQualifier\">\
        <ERROR CODE=\"6\" DESCRIPTION=\"CIM_ERR_NOT_FOUND: FooQualDecl\"/>\
        </IMETHODRESPONSE>\
        </SIMPLERSP></MESSAGE></CIM>";
    let response = parse_response(body.as_bytes()).unwrap();
    assert_eq!(response.message_id, 1001);
    assert_eq!(response.method_name, "DeleteQualifier");
    let error = response.error().unwrap();
    assert_eq!(error.code, 6);
    assert_eq!(
        error.description.as_deref(),
        Some("CIM_ERR_NOT_FOUND: FooQualDecl")
    );
}

#[test]
fn instances_with_paths_are_decoded() {
    let body = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\
        <CIM CIMVERSION=\"2.0\" DTDVERSION=\"2.0\">\
        <MESSAGE ID=\"1002\" PROTOCOLVERSION=\"1.0\">\
        <SIMPLERSP>\
        <IMETHODRESPONSE NAME=\"EnumerateInstances\">\
        <IRETURNVALUE>\
        <VALUE.NAMEDINSTANCE>\
        <INSTANCENAME CLASSNAME=\"ACME_Disk\">\
        <KEYBINDING NAME=\"DeviceID\"><KEYVALUE VALUETYPE=\"string\">disk0</KEYVALUE></KEYBINDING>\
        </INSTANCENAME>\
        <INSTANCE CLASSNAME=\"ACME_Disk\">\
        <PROPERTY NAME=\"DeviceID\" TYPE=\"string\"><VALUE>disk0</VALUE></PROPERTY>\
        <PROPERTY NAME=\"BlockSize\" TYPE=\"uint64\"><VALUE>512</VALUE></PROPERTY>\
        </INSTANCE>\
        </VALUE.NAMEDINSTANCE>\
        </IRETURNVALUE>\
        </IMETHODRESPONSE>\
        </SIMPLERSP></MESSAGE></CIM>";
    let response = parse_response(body.as_bytes()).unwrap();
    let ResponseBody::IMethod(Ok(result)) = &response.body else {
        panic!("expected successful intrinsic result");
    };
    assert_eq!(result.return_items.len(), 1);
    let CimXmlItem::Instance(instance) = &result.return_items[0] else {
        panic!("expected instance");
    };
    let path = instance.path.as_ref().unwrap();
    assert_eq!(path.class_name.as_str(), "ACME_Disk");
    assert_eq!(
        instance.property_value("BlockSize"),
        Some(&CimValue::Uint64(512))
    );
}

#[test]
fn pull_out_params_are_decoded() {
    let body = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\
        <CIM CIMVERSION=\"2.0\" DTDVERSION=\"2.0\">\
        <MESSAGE ID=\"1003\" PROTOCOLVERSION=\"1.0\">\
        <SIMPLERSP>\
        <IMETHODRESPONSE NAME=\"OpenEnumerateInstances\">\
        <IRETURNVALUE/>\
        <PARAMVALUE NAME=\"EnumerationContext\" PARAMTYPE=\"string\"><VALUE>ctx-1</VALUE></PARAMVALUE>\
        <PARAMVALUE NAME=\"EndOfSequence\" PARAMTYPE=\"boolean\"><VALUE>false</VALUE></PARAMVALUE>\
        </IMETHODRESPONSE>\
        </SIMPLERSP></MESSAGE></CIM>";
    let response = parse_response(body.as_bytes()).unwrap();
    let ResponseBody::IMethod(Ok(result)) = &response.body else {
        panic!("expected successful intrinsic result");
    };
    assert_eq!(
        result.out_param("enumerationcontext"),
        Some(&Some(CimValue::String("ctx-1".to_string())))
    );
    assert_eq!(
        result.out_param("EndOfSequence"),
        Some(&Some(CimValue::Boolean(false)))
    );
}

#[test]
fn wrong_root_element_fails_before_cim_handling() {
    let body = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\
        <CIMX CIMVERSION=\"2.0\" DTDVERSION=\"2.0\"></CIMX>";
    let err = parse_response(body.as_bytes()).unwrap_err();
    match err {
        CimXmlError::CimXmlParse { element, .. } => assert_eq!(element, "CIMX"),
        other => panic!("expected CimXmlParse, got {other:?}"),
    }
}

#[test]
fn unsupported_versions_are_rejected() {
    let cim3 = "<CIM CIMVERSION=\"3.0\" DTDVERSION=\"2.0\"></CIM>";
    assert!(matches!(
        parse_response(cim3.as_bytes()).unwrap_err(),
        CimXmlError::CimVersion(_)
    ));

    let dtd3 = "<CIM CIMVERSION=\"2.0\" DTDVERSION=\"3.0\"></CIM>";
    assert!(matches!(
        parse_response(dtd3.as_bytes()).unwrap_err(),
        CimXmlError::DtdVersion(_)
    ));

    let proto2 = "<CIM CIMVERSION=\"2.0\" DTDVERSION=\"2.0\">\
        <MESSAGE ID=\"1\" PROTOCOLVERSION=\"2.0\"></MESSAGE></CIM>";
    assert!(matches!(
        parse_response(proto2.as_bytes()).unwrap_err(),
        CimXmlError::ProtocolVersion(_)
    ));
}

#[test]
fn malformed_xml_is_an_xml_parse_error() {
    let err = parse_response(b"<CIM CIMVERSION=\"2.0\"").unwrap_err();
    assert!(matches!(err, CimXmlError::XmlParse { .. }));
}

#[test]
fn empty_namespace_segments_are_rejected_on_parse() {
    let body = "<CIM CIMVERSION=\"2.0\" DTDVERSION=\"2.0\">\
        <MESSAGE ID=\"9\" PROTOCOLVERSION=\"1.0\">\
        <SIMPLERSP>\
        <IMETHODRESPONSE NAME=\"GetInstance\">\
        <IRETURNVALUE>\
        <LOCALINSTANCEPATH>\
        <LOCALNAMESPACEPATH><NAMESPACE NAME=\"\"/></LOCALNAMESPACEPATH>\
        <INSTANCENAME CLASSNAME=\"X\"/>\
        </LOCALINSTANCEPATH>\
        </IRETURNVALUE>\
        </IMETHODRESPONSE>\
        </SIMPLERSP></MESSAGE></CIM>";
    let err = parse_response(body.as_bytes()).unwrap_err();
    match err {
        CimXmlError::CimXmlParse { element, .. } => assert_eq!(element, "NAMESPACE"),
        other => panic!("expected CimXmlParse, got {other:?}"),
    }
}

#[test]
fn whitespace_between_elements_is_tolerated() {
    let body = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n\
        <CIM CIMVERSION=\"2.0\" DTDVERSION=\"2.0\">\n \
        <MESSAGE ID=\"1004\" PROTOCOLVERSION=\"1.0\">\n  \
        <SIMPLERSP>\n   \
        <IMETHODRESPONSE NAME=\"GetClass\">\n    \
        <IRETURNVALUE>\n     \
        <CLASS NAME=\"Empty\"/>\n    \
        </IRETURNVALUE>\n   \
        </IMETHODRESPONSE>\n  \
        </SIMPLERSP>\n \
        </MESSAGE>\n\
        </CIM>";
    let response = parse_response(body.as_bytes()).unwrap();
    let ResponseBody::IMethod(Ok(result)) = &response.body else {
        panic!("expected successful intrinsic result");
    };
    assert!(matches!(&result.return_items[0], CimXmlItem::Class(c) if c.class_name == "Empty"));
}
