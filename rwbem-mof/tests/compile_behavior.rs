//! End-to-end compiler behavior against the in-memory repository

use rwbem_mof::{MofCompiler, MofError, MutationKind};
use rwbem_repo::{MemoryRepository, Repository, RepositoryError};
use rwbem_types::{CimType, CimValue};
use std::io::Write;

const QUALIFIERS: &str = "\
    Qualifier Key : boolean = false, Scope(property, reference), Flavor(DisableOverride);\n\
    Qualifier Description : string, Scope(any), Flavor(EnableOverride, Translatable);\n";

#[test]
fn compiles_qualifier_class_and_property() {
    let mut repo = MemoryRepository::new();
    let mut compiler = MofCompiler::new(&mut repo, "root/cimv2");
    let mof = format!(
        "{QUALIFIERS}\
         class Foo {{\n\
         \x20   [Key] uint8 P;\n\
         \x20   [Description(\"hi\")] uint8 Q = 4;\n\
         }};"
    );
    let report = compiler.compile_str(&mof, "unit.mof").unwrap();
    assert_eq!(report.qualifiers, 2);
    assert_eq!(report.classes, 1);

    let class = repo.get_class("root/cimv2", "foo", false, true, true).unwrap();
    let q = class.properties.get("Q").unwrap();
    assert_eq!(q.cim_type, CimType::Uint8);
    assert_eq!(q.value, Some(CimValue::Uint8(4)));
    assert_eq!(
        q.qualifiers.get("Description").unwrap().value,
        Some(CimValue::from("hi"))
    );
    assert!(class.properties.get("P").unwrap().is_key());
}

#[test]
fn recompile_is_idempotent() {
    let mut repo = MemoryRepository::new();
    let mof = format!(
        "{QUALIFIERS}\
         class Foo {{\n\
         \x20   [Key] uint8 P;\n\
         }};"
    );
    MofCompiler::new(&mut repo, "root/cimv2")
        .compile_str(&mof, "unit.mof")
        .unwrap();
    let before = repo.get_class("root/cimv2", "Foo", false, true, true).unwrap();

    MofCompiler::new(&mut repo, "root/cimv2")
        .compile_str(&mof, "unit.mof")
        .unwrap();
    let after = repo.get_class("root/cimv2", "Foo", false, true, true).unwrap();
    assert_eq!(before, after);
}

#[test]
fn inherited_members_are_propagated() {
    let mut repo = MemoryRepository::new();
    let mof = format!(
        "{QUALIFIERS}\
         class Derived : Base {{\n\
         \x20   uint16 Extra;\n\
         }};\n\
         class Base {{\n\
         \x20   [Key] string Id;\n\
         \x20   [Description(\"base\")] uint8 Level;\n\
         }};"
    );
    // Derived precedes Base in the source; topological apply handles it
    MofCompiler::new(&mut repo, "root/cimv2")
        .compile_str(&mof, "unit.mof")
        .unwrap();

    let derived = repo
        .get_class("root/cimv2", "Derived", false, true, true)
        .unwrap();
    let id = derived.properties.get("Id").unwrap();
    assert!(id.propagated);
    assert_eq!(id.class_origin.as_ref().unwrap().as_str(), "Base");
    assert!(derived.properties.get("Extra").is_some());
    assert!(!derived.properties.get("Extra").unwrap().propagated);
}

#[test]
fn instances_are_typed_against_their_class() {
    let mut repo = MemoryRepository::new();
    let mof = format!(
        "{QUALIFIERS}\
         class Foo {{\n\
         \x20   [Key] string Id;\n\
         \x20   uint8 Level;\n\
         }};\n\
         instance of Foo {{\n\
         \x20   Id = \"a\";\n\
         \x20   Level = 200;\n\
         }};"
    );
    MofCompiler::new(&mut repo, "root/cimv2")
        .compile_str(&mof, "unit.mof")
        .unwrap();
    let mut probe = rwbem_types::CimInstanceName::new("Foo");
    probe.bind("Id", CimValue::from("a")).unwrap();
    let instance = repo.get_instance("root/cimv2", &probe).unwrap();
    assert_eq!(instance.property_value("Level"), Some(&CimValue::Uint8(200)));
}

#[test]
fn out_of_range_initializer_is_a_resolve_error() {
    let mut repo = MemoryRepository::new();
    let mof = format!(
        "{QUALIFIERS}\
         class Foo {{\n\
         \x20   [Key] string Id;\n\
         \x20   uint8 Level = 256;\n\
         }};"
    );
    let err = MofCompiler::new(&mut repo, "root/cimv2")
        .compile_str(&mof, "unit.mof")
        .unwrap_err();
    assert!(matches!(err, MofError::Resolve { .. }), "got {err:?}");
}

#[test]
fn alias_references_resolve_backwards() {
    let mut repo = MemoryRepository::new();
    let mof = format!(
        "{QUALIFIERS}\
         class Target {{\n\
         \x20   [Key] string Id;\n\
         }};\n\
         class Holder {{\n\
         \x20   [Key] string Id;\n\
         \x20   Target REF Points;\n\
         }};\n\
         instance of Target as $t {{ Id = \"t1\"; }};\n\
         instance of Holder {{ Id = \"h1\"; Points = $t; }};"
    );
    MofCompiler::new(&mut repo, "root/cimv2")
        .compile_str(&mof, "unit.mof")
        .unwrap();
    let mut probe = rwbem_types::CimInstanceName::new("Holder");
    probe.bind("Id", CimValue::from("h1")).unwrap();
    let holder = repo.get_instance("root/cimv2", &probe).unwrap();
    let CimValue::Reference(target) = holder.property_value("Points").unwrap() else {
        panic!("expected reference value");
    };
    assert_eq!(target.class_name.as_str(), "Target");
}

#[test]
fn undeclared_qualifier_is_a_resolve_error() {
    let mut repo = MemoryRepository::new();
    let err = MofCompiler::new(&mut repo, "root/cimv2")
        .compile_str("class Foo { [Bogus] uint8 P; };", "unit.mof")
        .unwrap_err();
    assert!(matches!(err, MofError::Resolve { .. }), "got {err:?}");
}

#[test]
fn dry_run_returns_plan_without_applying() {
    let mut repo = MemoryRepository::new();
    let mof = format!(
        "{QUALIFIERS}\
         class Foo {{ [Key] uint8 P; }};"
    );
    let plan = MofCompiler::new(&mut repo, "root/cimv2")
        .plan_str(&mof, "unit.mof")
        .unwrap();
    let kinds: Vec<&'static str> = plan
        .iter()
        .map(|m| match &m.kind {
            MutationKind::CreateNamespace { .. } => "create_namespace",
            MutationKind::SetQualifier { .. } => "set_qualifier",
            MutationKind::CreateClass { .. } => "create_class",
            MutationKind::ModifyClass { .. } => "modify_class",
            MutationKind::CreateInstance { .. } => "create_instance",
            MutationKind::ModifyInstance { .. } => "modify_instance",
        })
        .collect();
    assert_eq!(
        kinds,
        [
            "create_namespace",
            "set_qualifier",
            "set_qualifier",
            "create_class"
        ]
    );
    // nothing was applied
    assert!(repo.namespaces().unwrap().is_empty());
}

#[test]
fn resolve_failure_applies_nothing() {
    let mut repo = MemoryRepository::with_namespaces(["root/cimv2"]);
    let qualifiers_before = repo.enumerate_qualifiers("root/cimv2").unwrap();
    let failing = format!(
        "{QUALIFIERS}\
         class Fresh {{ [Key] uint8 P; }};\n\
         instance of Missing {{ P = 1; }};"
    );
    let err = MofCompiler::new(&mut repo, "root/cimv2")
        .compile_str(&failing, "unit.mof")
        .unwrap_err();
    assert!(matches!(err, MofError::Resolve { .. }), "got {err:?}");

    // resolution failed before any mutation was issued
    assert_eq!(
        repo.enumerate_qualifiers("root/cimv2").unwrap(),
        qualifiers_before
    );
    assert!(matches!(
        repo.get_class("root/cimv2", "Fresh", false, true, true),
        Err(RepositoryError::NotFound { .. })
    ));
}

#[test]
fn apply_failure_rolls_back_to_prior_state() {
    // two instances with the same keys: both plan as creates, the second
    // create fails mid-apply and the undo log replays in reverse
    let mut repo = MemoryRepository::new();
    let failing = format!(
        "{QUALIFIERS}\
         class Foo {{ [Key] string Id; }};\n\
         instance of Foo {{ Id = \"dup\"; }};\n\
         instance of Foo {{ Id = \"dup\"; }};"
    );
    let err = MofCompiler::new(&mut repo, "root/cimv2")
        .compile_str(&failing, "unit.mof")
        .unwrap_err();
    match err {
        MofError::Repository { source, .. } => {
            assert!(matches!(source, RepositoryError::AlreadyExists { .. }))
        }
        other => panic!("expected repository error, got {other:?}"),
    }

    // everything the unit applied was undone, including the namespace
    assert!(repo.namespaces().unwrap().is_empty());
}

#[test]
fn includes_are_spliced_and_cycles_detected() {
    let dir = tempfile::tempdir().unwrap();
    let quals = dir.path().join("quals.mof");
    let main = dir.path().join("main.mof");
    let mut f = std::fs::File::create(&quals).unwrap();
    write!(f, "{QUALIFIERS}").unwrap();
    let mut f = std::fs::File::create(&main).unwrap();
    write!(
        f,
        "#pragma include(\"quals.mof\")\nclass Foo {{ [Key] uint8 P; }};"
    )
    .unwrap();

    let mut repo = MemoryRepository::new();
    MofCompiler::new(&mut repo, "root/cimv2")
        .compile_file(&main)
        .unwrap();
    assert!(repo.get_class("root/cimv2", "Foo", false, true, true).is_ok());

    // self-including file
    let cyclic = dir.path().join("cycle.mof");
    let mut f = std::fs::File::create(&cyclic).unwrap();
    write!(f, "#pragma include(\"cycle.mof\")\n").unwrap();
    let mut repo = MemoryRepository::new();
    let err = MofCompiler::new(&mut repo, "root/cimv2")
        .compile_file(&cyclic)
        .unwrap_err();
    match err {
        MofError::Parse { message, .. } => assert!(message.contains("cycle")),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn namespace_pragma_switches_target() {
    let mut repo = MemoryRepository::new();
    let mof = format!(
        "#pragma namespace(\"root/alpha\")\n\
         {QUALIFIERS}\
         class A {{ [Key] uint8 P; }};\n\
         #pragma namespace(\"root/beta\")\n\
         Qualifier Key : boolean = false, Scope(property);\n\
         class B {{ [Key] uint8 P; }};"
    );
    MofCompiler::new(&mut repo, "root/cimv2")
        .compile_str(&mof, "unit.mof")
        .unwrap();
    assert!(repo.get_class("root/alpha", "A", false, true, true).is_ok());
    assert!(repo.get_class("root/beta", "B", false, true, true).is_ok());
    assert!(repo.get_class("root/alpha", "B", false, true, true).is_err());
}
