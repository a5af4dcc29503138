//! Common test utilities for building form definitions and values.
use yoshiki::form::{Column, ColumnsConfig, LoginConfig, SectionConfig};
use yoshiki::prelude::*;

/// Scenario A: `email` on page 1, page 2 gated on `email` being filled in.
#[allow(dead_code)]
pub const SIGNUP_FORM_JSON: &str = r#"{
    "name": "Signup",
    "pages": [
        {
            "id": "page_1",
            "name": "Contact",
            "fields": [
                { "id": "email", "type": "email", "label": "Email" }
            ]
        },
        {
            "id": "page_2",
            "name": "Details",
            "fields": [
                { "id": "notes", "type": "textarea", "label": "Notes", "rows": 3 }
            ],
            "conditionalVisibility": {
                "enabled": true,
                "logic": "AND",
                "rules": [ { "dependsOn": "email", "condition": "is_not_empty" } ]
            }
        }
    ]
}"#;

/// A `Text` field with the given id.
#[allow(dead_code)]
pub fn text(id: &str) -> Field {
    Field::new(id, FieldKind::Text)
}

/// A section holding `children`.
#[allow(dead_code)]
pub fn section(id: &str, children: Vec<Field>) -> Field {
    Field::new(
        id,
        FieldKind::Section(SectionConfig {
            fields: children,
            collapsible: false,
        }),
    )
}

/// A columns container, one child list per entry of `columns`.
#[allow(dead_code)]
pub fn columns(id: &str, columns: Vec<Vec<Field>>) -> Field {
    Field::new(
        id,
        FieldKind::Columns(ColumnsConfig {
            columns: columns
                .into_iter()
                .map(|fields| Column {
                    width: None,
                    fields,
                })
                .collect(),
        }),
    )
}

/// Scenario B: a login field writing `isLoggedIn`, and a submit button that
/// waits for it.
#[allow(dead_code)]
pub fn login_form() -> Form {
    let mut login = LoginConfig::default();
    login
        .success_variables
        .insert("isLoggedIn".to_string(), "true".to_string());
    login
        .success_variables
        .insert("userName".to_string(), "{{username}}".to_string());

    let mut page = Page::new("page_1", "Sign in")
        .with_fields(vec![Field::new("field_1", FieldKind::Login(login))]);
    page.navigation.submit = RuleGroup::all(vec![Rule::new(
        "isLoggedIn",
        Operator::Equals,
        "true",
    )]);
    Form::new("Members").with_pages(vec![page])
}

/// Scenario C: `field_5` sits in column 0 of `field_2` and carries a rule;
/// `field_3` is an empty section.
#[allow(dead_code)]
pub fn layout_form() -> Form {
    let conditional = text("field_5").with_visibility(RuleGroup::all(vec![Rule::new(
        "field_1",
        Operator::Equals,
        "yes",
    )]));
    Form::new("Layout").with_pages(vec![Page::new("page_1", "Layout").with_fields(vec![
        text("field_1"),
        columns("field_2", vec![vec![conditional, text("field_6")], vec![]]),
        section("field_3", vec![]),
        text("field_4"),
    ])])
}

/// Three pages exercising every kind of rule owner and nesting, used for the
/// document round-trip.
#[allow(dead_code)]
pub fn rich_form() -> Form {
    let mut page2 = Page::new("page_2", "Preferences")
        .with_fields(vec![
            section(
                "prefs",
                vec![
                    Field::new("colour", FieldKind::Select(Default::default())),
                    columns("split", vec![vec![text("left")], vec![text("right")]]),
                ],
            ),
            text("comment").with_visibility(RuleGroup::any(vec![
                Rule::new("colour", Operator::Equals, "red"),
                Rule::unary("vip", Operator::IsNotEmpty),
            ])),
        ])
        .with_visibility(RuleGroup::all(vec![Rule::unary("name", Operator::IsNotEmpty)]));
    page2.navigation.next = RuleGroup::all(vec![Rule::new("age", Operator::GreaterThan, "17")]);

    Form::new("Everything").with_pages(vec![
        Page::new("page_1", "About you").with_fields(vec![
            text("name").with_label("Name"),
            Field::new("age", FieldKind::Number(Default::default())),
        ]),
        page2,
        Page::new("page_3", "Done").with_fields(vec![Field::new(
            "summary",
            FieldKind::Display(Default::default()),
        )]),
    ])
}

/// Builds a value map from `(field id, value)` pairs.
#[allow(dead_code)]
pub fn values(entries: &[(&str, Value)]) -> HashMap<String, Value> {
    entries
        .iter()
        .map(|(id, value)| (id.to_string(), value.clone()))
        .collect()
}

/// Top-level field ids of a page.
#[allow(dead_code)]
pub fn ids(fields: &[Field]) -> Vec<&str> {
    fields.iter().map(|f| f.id.as_str()).collect()
}
