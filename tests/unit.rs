//! Unit tests for core Yoshiki functionality.
mod common;
use indexmap::IndexMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use yoshiki::engine::{GroupTrace, Lookup, RuleTrace, TargetTrace, TraceFormatter};
use yoshiki::form::LoginConfig;
use yoshiki::prelude::*;
use yoshiki::variables::{NoSource, VariableAssignments, render};

fn hash_of(value: &Value) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::Number(42.0)), "42");
    assert_eq!(format!("{}", Value::Number(2.5)), "2.5");
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::Null), "null");
    assert_eq!(format!("{}", Value::from("hi")), "\"hi\"");
    assert_eq!(Value::from(vec!["a", "b"]).as_text(), "a,b");
}

#[test]
fn test_value_emptiness_and_numbers() {
    assert!(Value::Null.is_empty());
    assert!(Value::from("").is_empty());
    assert!(Value::List(vec![]).is_empty());
    assert!(!Value::Bool(false).is_empty());
    assert_eq!(Value::from(" 12.5 ").as_number(), Some(12.5));
    assert_eq!(Value::from("twelve").as_number(), None);
    assert_eq!(Value::Bool(true).as_number(), None);
    assert_eq!(Value::Number(f64::NAN).as_number(), None);
    assert!(!Value::from(" ").is_empty());
}

#[test]
fn test_value_objects_stay_structured() {
    let value = Value::from(serde_json::json!({"id": "001", "tags": ["a", "b"]}));
    let Value::Object(map) = &value else {
        panic!("expected an object, got {:?}", value);
    };
    assert_eq!(map["id"], Value::from("001"));
    assert_eq!(value.as_text(), r#"{"id":"001","tags":["a","b"]}"#);
    assert!(!value.is_empty());
    assert!(Value::Object(IndexMap::new()).is_empty());
    assert_eq!(Value::Object(IndexMap::new()).as_number(), None);

    let parsed: Value = serde_json::from_str(r#"{"b":1,"a":{"nested":true}}"#).unwrap();
    assert_eq!(serde_json::to_string(&parsed).unwrap(), r#"{"b":1.0,"a":{"nested":true}}"#);
}

#[test]
fn test_equal_values_hash_alike() {
    assert_eq!(Value::Number(0.0), Value::Number(-0.0));
    assert_eq!(hash_of(&Value::Number(0.0)), hash_of(&Value::Number(-0.0)));
    assert_eq!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    assert_eq!(
        hash_of(&Value::Number(f64::NAN)),
        hash_of(&Value::Number(-f64::NAN))
    );
    assert_ne!(Value::Number(1.0), Value::from("1"));

    let forward = Value::from(serde_json::json!({"a": 1, "b": 2}));
    let mut reversed = IndexMap::new();
    reversed.insert("b".to_string(), Value::Number(2.0));
    reversed.insert("a".to_string(), Value::Number(1.0));
    let backward = Value::Object(reversed);
    assert_eq!(forward, backward);
    assert_eq!(hash_of(&forward), hash_of(&backward));
}

#[test]
fn test_operator_semantics() {
    let ada = Value::from("Ada Lovelace");
    assert!(Operator::Equals.apply(&ada, "Ada Lovelace"));
    assert!(!Operator::Equals.apply(&ada, "ada lovelace"));
    assert!(Operator::NotEquals.apply(&ada, "Grace"));
    assert!(Operator::Contains.apply(&ada, "Love"));
    assert!(Operator::NotContains.apply(&ada, "Hopper"));
    assert!(Operator::StartsWith.apply(&ada, "Ada"));
    assert!(Operator::EndsWith.apply(&ada, "lace"));
    assert!(Operator::IsNotEmpty.apply(&ada, ""));
    assert!(Operator::IsEmpty.apply(&Value::Null, "ignored"));

    let ten = Value::Number(10.0);
    assert!(Operator::GreaterThan.apply(&ten, "9.5"));
    assert!(Operator::LessThan.apply(&ten, "11"));
    assert!(Operator::GreaterEqual.apply(&ten, "10"));
    assert!(Operator::LessEqual.apply(&Value::from("10"), "10"));
    // Failed coercion is false, never an error.
    assert!(!Operator::GreaterThan.apply(&ten, "lots"));
    assert!(!Operator::LessThan.apply(&Value::Null, "5"));
    // Equality compares the stringified value.
    assert!(Operator::Equals.apply(&Value::Bool(true), "true"));
    assert!(Operator::Equals.apply(&Value::Number(5.0), "5"));
    assert!(Operator::NotEquals.apply(&Value::Number(5.0), "5.0"));
    assert!(!Operator::Contains.apply(&ada, "love"));
}

#[test]
fn test_rule_group_wire_format() {
    let group: RuleGroup = serde_json::from_str(
        r#"{"enabled":true,"logic":"OR","rules":[{"dependsOn":"a","condition":"equals","value":"x"}]}"#,
    )
    .unwrap();
    assert_eq!(group.logic, Logic::Or);
    assert!(group.is_active());
    assert_eq!(group.rules[0].operator, Operator::Equals);
    assert_eq!(serde_json::to_value(Logic::And).unwrap(), "AND");

    let rule: Rule =
        serde_json::from_str(r#"{"dependsOn":"email","condition":"is_not_empty"}"#).unwrap();
    assert_eq!(rule, Rule::unary("email", Operator::IsNotEmpty));

    let default = RuleGroup::default();
    assert!(!default.enabled);
    assert!(!default.is_active());
    assert!(!RuleGroup::all(vec![]).is_active());
}

#[test]
fn test_logic_combine() {
    assert!(Logic::And.combine(&[true, true]));
    assert!(!Logic::And.combine(&[true, false]));
    assert!(Logic::Or.combine(&[false, true]));
    assert!(!Logic::Or.combine(&[false, false]));
}

#[test]
fn test_operator_wire_names() {
    for operator in Operator::ALL {
        let json = serde_json::to_string(&operator).unwrap();
        assert_eq!(json, format!("\"{}\"", operator.as_str()));
        let back: Operator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, operator);
    }
}

#[test]
fn test_rule_display() {
    assert_eq!(
        Rule::new("age", Operator::GreaterThan, "18").to_string(),
        "$age > \"18\""
    );
    assert_eq!(
        Rule::unary("email", Operator::IsEmpty).to_string(),
        "$email is_empty"
    );
}

#[test]
fn test_target_display() {
    assert_eq!(Target::field("email").to_string(), "field 'email'");
    assert_eq!(Target::Page(2).to_string(), "page 2");
    assert_eq!(
        Target::submit_button(0).to_string(),
        "submit button of page 0"
    );
}

#[test]
fn test_slot_parsing() {
    assert_eq!("".parse::<ContainerSlot>().unwrap(), ContainerSlot::Root);
    assert_eq!(
        "field_3#1".parse::<ContainerSlot>().unwrap(),
        ContainerSlot::column("field_3", 1)
    );
    assert_eq!(ContainerSlot::section("box").to_string(), "box");
    assert!("field_3#x".parse::<ContainerSlot>().is_err());
    assert!("#2".parse::<ContainerSlot>().is_err());
    for slot in [
        ContainerSlot::Root,
        ContainerSlot::section("a"),
        ContainerSlot::column("cols", 2),
    ] {
        assert_eq!(slot.to_string().parse::<ContainerSlot>().unwrap(), slot);
    }
}

#[test]
fn test_template_rendering() {
    let mut vars = VariableRegistry::new();
    vars.set("count", 3i64);
    vars.set("name", "Ada");
    assert_eq!(render("{{count}}", &vars), Value::Number(3.0));
    assert_eq!(render("{{ name }}", &vars), Value::from("Ada"));
    assert_eq!(render("Hi {{name}}, {{missing}}!", &vars), Value::from("Hi Ada, !"));
    assert_eq!(render("{{missing}}", &vars), Value::Null);
    assert_eq!(render("plain", &vars), Value::from("plain"));
}

#[test]
fn test_template_keeps_structure_of_single_placeholder() {
    let mut source = IndexMap::new();
    source.insert("value".to_string(), Value::from("ada@example.com"));
    source.insert("roles".to_string(), Value::from(vec!["admin", "ops"]));
    source.insert("count".to_string(), Value::Number(3.0));

    assert_eq!(render("{{roles}}", &source), Value::from(vec!["admin", "ops"]));
    assert_eq!(render(" {{ count }} ", &source), Value::Number(3.0));
    assert_eq!(render("true", &source), Value::from("true"));
    assert_eq!(render("", &source), Value::from(""));
    assert_eq!(
        render("user:{{value}} ({{count}})", &source),
        Value::from("user:ada@example.com (3)")
    );
    assert_eq!(render("a{{missing}}b", &NoSource), Value::from("ab"));
}

#[test]
fn test_on_change_assignments_use_new_value() {
    let field = Field::new("field_3", FieldKind::Text).with_variables(VariableAssignments::new([
        ("lastEdited", "{{fieldId}}"),
        ("customerName", "{{value}}"),
        ("greeting", "Hello {{value}}, role {{role}}"),
    ]));
    let mut vars = VariableRegistry::new();
    vars.set("role", "admin");
    let writes = field.variable_writes_on_change(&Value::from("Ada"), &vars);
    assert_eq!(
        writes,
        vec![
            ("lastEdited".to_string(), Value::from("field_3")),
            ("customerName".to_string(), Value::from("Ada")),
            ("greeting".to_string(), Value::from("Hello Ada, role admin")),
        ]
    );

    let mut disabled = VariableAssignments::new([("x", "1")]);
    disabled.enabled = false;
    assert!(vars.apply_assignments(&disabled, &NoSource).is_empty());
    assert!(!vars.has("x"));
    let plain = Field::new("f", FieldKind::Text);
    assert!(plain.variable_writes_on_change(&Value::Null, &NoSource).is_empty());
}

#[test]
fn test_assignments_keep_document_order() {
    let parsed: VariableAssignments = serde_json::from_str(
        r#"{"enabled":true,"assignments":{"b":"{{value}}","a":"x"}}"#,
    )
    .unwrap();
    assert_eq!(parsed.assignments.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    let mut vars = VariableRegistry::new();
    let written = vars.apply_assignments(&parsed, &NoSource);
    assert_eq!(written, vec!["b".to_string(), "a".to_string()]);
    assert_eq!(vars.get("b"), Some(&Value::Null));
}

#[test]
fn test_login_success_writes_variables() {
    let mut config = LoginConfig::default();
    config
        .success_variables
        .insert("isLoggedIn".into(), "true".into());
    config
        .success_variables
        .insert("userName".into(), "{{username}}".into());
    let mut outcome = IndexMap::new();
    outcome.insert("username".to_string(), Value::from("ada"));

    let mut vars = VariableRegistry::new();
    vars.set_many(config.success_writes(&outcome));
    assert_eq!(vars.get("isLoggedIn"), Some(&Value::from("true")));
    assert_eq!(vars.get("userName"), Some(&Value::from("ada")));
}

#[test]
fn test_registry_operations() {
    let mut vars = VariableRegistry::new();
    assert!(vars.is_empty());
    vars.set("b", 1i64);
    vars.set("a", true);
    vars.set("b", 2i64);
    assert_eq!(vars.len(), 2);
    assert_eq!(vars.names().collect::<Vec<_>>(), vec!["b", "a"]);
    assert_eq!(vars.get("b"), Some(&Value::Number(2.0)));
    assert!(vars.has("a"));

    let snapshot = vars.get_all();
    assert_eq!(vars.delete("a"), Some(Value::Bool(true)));
    assert!(!vars.has("a"));
    assert_eq!(snapshot.len(), 2);

    vars.clear();
    assert!(vars.is_empty());
    assert_eq!(vars.delete("b"), None);

    vars.set_many([("isLoggedIn", "true"), ("userName", "ada")]);
    assert_eq!(vars.names().collect::<Vec<_>>(), vec!["isLoggedIn", "userName"]);

    let parsed: VariableRegistry =
        serde_json::from_str(r#"{"isLoggedIn":"true","score":3,"tags":["a","b"]}"#).unwrap();
    assert_eq!(parsed.get("score"), Some(&Value::Number(3.0)));
    assert_eq!(parsed.get("tags").unwrap().as_text(), "a,b");
}

#[test]
fn test_registry_keeps_structured_values() {
    let doc = r#"{"account":{"id":"001","name":"Acme"},"isLoggedIn":"true"}"#;
    let mut vars: VariableRegistry = serde_json::from_str(doc).unwrap();
    let account = vars.get("account").cloned().unwrap();
    assert!(matches!(&account, Value::Object(map) if map["name"] == Value::from("Acme")));
    assert_eq!(serde_json::to_string(&vars).unwrap(), doc);

    vars.set("lookup", serde_json::json!({"id": "002"}));
    assert_eq!(
        serde_json::to_value(&vars).unwrap()["lookup"],
        serde_json::json!({"id": "002"})
    );
    assert_eq!(render("{{lookup}}", &vars), vars.get("lookup").cloned().unwrap());
    assert_eq!(render("id={{lookup}}", &vars), Value::from(r#"id={"id":"002"}"#));
}

#[test]
fn test_trace_formatter_hidden_parent() {
    let trace = TargetTrace {
        group: GroupTrace::unrestricted(true, Logic::And),
        hidden_by: Some(Target::field("box")),
        visible: false,
    };
    assert_eq!(
        TraceFormatter::format_target(&trace),
        "hidden: field 'box' is hidden"
    );
}

#[test]
fn test_trace_formatter_joins_rules_with_logic() {
    let trace = GroupTrace {
        enabled: true,
        logic: Logic::Or,
        rules: vec![
            RuleTrace {
                rule: Rule::unary("email", Operator::IsNotEmpty),
                lookup: Lookup::Found(Value::from("")),
                outcome: false,
            },
            RuleTrace {
                rule: Rule::new("age", Operator::GreaterThan, "18"),
                lookup: Lookup::Found(Value::Number(21.0)),
                outcome: true,
            },
        ],
        outcome: true,
    };
    assert_eq!(
        TraceFormatter::format_group(&trace),
        "$email is_not_empty (was \"\") OR $age > \"18\" (was 21)"
    );

    let shown = TargetTrace {
        group: GroupTrace::unrestricted(true, Logic::And),
        hidden_by: None,
        visible: true,
    };
    assert_eq!(TraceFormatter::format_target(&shown), "shown: no conditions");
}

#[test]
fn test_trace_formatter_blocked_rule() {
    let trace = GroupTrace {
        enabled: true,
        logic: Logic::And,
        rules: vec![RuleTrace {
            rule: Rule::unary("x", Operator::IsEmpty),
            lookup: Lookup::Blocked,
            outcome: false,
        }],
        outcome: false,
    };
    assert_eq!(
        TraceFormatter::format_group(&trace),
        "$x is_empty (blocked by dependency error)"
    );
}

#[test]
fn test_error_display() {
    let err = EditError::SelfContainment {
        field_id: "outer".to_string(),
        slot: "inner#0".to_string(),
    };
    assert!(err.to_string().contains("outer"));
    assert!(err.to_string().contains("inner#0"));

    let id_err: EditError = IdError::Duplicate("email".to_string()).into();
    assert!(id_err.to_string().contains("'email'"));

    let dep_err = DependencyError::Circular {
        target: Target::field("x"),
        depends_on: "y".to_string(),
        cycle: vec!["x".into(), "y".into(), "x".into()],
    };
    assert!(dep_err.to_string().contains("x -> y -> x"));
    assert_eq!(dep_err.depends_on(), "y");

    let page_err = DependencyError::PageOrder {
        target: Target::Page(0),
        depends_on: "later".to_string(),
        owner_page: 0,
        referenced_page: 1,
    };
    assert!(page_err.to_string().contains("only earlier pages"));
}

#[test]
fn test_signup_fixture_parses() {
    let form = Form::from_json(common::SIGNUP_FORM_JSON).expect("Failed to parse fixture");
    assert_eq!(form.pages.len(), 2);
    assert_eq!(form.field_ids(), vec!["email", "notes"]);
    assert!(form.pages[1].conditional_visibility.enabled);
    assert_eq!(form.settings.submit_label, "Submit");
}
