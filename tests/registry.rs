//! Tests for the operation registry's tooling-facing surface: metadata
//! enumeration and export for palette/context-menu construction.
mod common;
use common::*;
use kairo::prelude::*;

#[test]
fn infos_enumerate_operations_sorted_by_menu_path() {
    let registry = math_registry();
    let infos = registry.infos();

    assert_eq!(infos.len(), registry.len());
    let paths: Vec<&str> = infos.iter().map(|i| i.path.as_str()).collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted, "palette order must be stable by menu path");
    assert!(paths.contains(&"Operators/Add"));
    assert!(paths.contains(&"Helper/Starter"));
}

#[test]
fn infos_carry_the_structural_flags() {
    let registry = math_registry();
    let infos = registry.infos();

    let starter = infos.iter().find(|i| i.name == "starter").unwrap();
    assert!(starter.exec_init);
    assert!(starter.callable);

    let value = infos.iter().find(|i| i.name == "value").unwrap();
    assert!(!value.callable);
    assert!(!value.exec_init);
}

#[test]
fn operation_metadata_serializes_for_tooling() {
    let registry = math_registry();
    let infos = registry.infos();
    let add = infos.iter().find(|i| i.name == "add").unwrap();

    let json = serde_json::to_value(add).unwrap();
    assert_eq!(json["title"], "Add");
    assert_eq!(json["menu"], "Operators");
    assert_eq!(json["category"], "Basic");
    assert_eq!(json["path"], "Operators/Add");
    assert_eq!(json["callable"], false);
    assert_eq!(json["params"][0]["name"], "a");
    assert_eq!(json["params"][0]["direction"], "Input");
    assert_eq!(json["params"][0]["value_type"], "Number");
    assert_eq!(json["params"][2]["name"], "result");
    assert_eq!(json["params"][2]["direction"], "Output");
}

#[test]
fn registering_under_a_taken_name_replaces_the_operation() {
    let mut registry = math_registry();
    let before = registry.len();
    registry.register(
        Operation::build("add")
            .title("Add (patched)")
            .menu("Operators")
            .callable(false)
            .run(|_ctx| Ok(())),
    );

    assert_eq!(registry.len(), before);
    assert_eq!(
        registry.resolve("add").unwrap().title,
        "Add (patched)"
    );
}
