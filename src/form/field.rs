use crate::condition::RuleGroup;
use crate::variables::VariableAssignments;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single form field.
///
/// The type tag and its configuration travel together in [`FieldKind`]; the
/// JSON form keeps them flat next to the common properties
/// (`{"id": "field_1", "type": "select", "options": [...]}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// Opaque reference to a field of the mapped external object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_field: Option<String>,
    #[serde(default)]
    pub conditional_visibility: RuleGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_variables: Option<VariableAssignments>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl Field {
    /// A field with the kind's default label and no conditions.
    pub fn new(id: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            label: kind.default_label().to_string(),
            placeholder: None,
            required: false,
            help_text: None,
            external_field: None,
            conditional_visibility: RuleGroup::default(),
            set_variables: None,
            kind,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_visibility(mut self, group: RuleGroup) -> Self {
        self.conditional_visibility = group;
        self
    }

    pub fn with_variables(mut self, assignments: VariableAssignments) -> Self {
        self.set_variables = Some(assignments);
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Total number of fields nested below this one.
    pub fn descendant_count(&self) -> usize {
        self.child_lists()
            .flat_map(|list| list.iter())
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

/// The closed set of field types, each with its own configuration payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Number(NumberConfig),
    Date,
    Textarea(TextareaConfig),
    Select(ChoiceConfig),
    Checkbox(ChoiceConfig),
    Radio(ChoiceConfig),
    Lookup(LookupConfig),
    Richtext(ContentConfig),
    Signature(SignatureConfig),
    File(FileConfig),
    Display(ContentConfig),
    Login(LoginConfig),
    EmailVerify(EmailVerifyConfig),
    Datatable(DataTableConfig),
    Section(SectionConfig),
    Columns(ColumnsConfig),
}

impl FieldKind {
    /// The wire name of the type tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Number(_) => "number",
            FieldKind::Date => "date",
            FieldKind::Textarea(_) => "textarea",
            FieldKind::Select(_) => "select",
            FieldKind::Checkbox(_) => "checkbox",
            FieldKind::Radio(_) => "radio",
            FieldKind::Lookup(_) => "lookup",
            FieldKind::Richtext(_) => "richtext",
            FieldKind::Signature(_) => "signature",
            FieldKind::File(_) => "file",
            FieldKind::Display(_) => "display",
            FieldKind::Login(_) => "login",
            FieldKind::EmailVerify(_) => "email_verify",
            FieldKind::Datatable(_) => "datatable",
            FieldKind::Section(_) => "section",
            FieldKind::Columns(_) => "columns",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, FieldKind::Section(_) | FieldKind::Columns(_))
    }

    /// Label given to freshly added fields of this kind.
    pub fn default_label(&self) -> &'static str {
        match self {
            FieldKind::Text => "Text Field",
            FieldKind::Email => "Email",
            FieldKind::Phone => "Phone",
            FieldKind::Number(_) => "Number",
            FieldKind::Date => "Date",
            FieldKind::Textarea(_) => "Long Text",
            FieldKind::Select(_) => "Select",
            FieldKind::Checkbox(_) => "Checkboxes",
            FieldKind::Radio(_) => "Radio Buttons",
            FieldKind::Lookup(_) => "Lookup",
            FieldKind::Richtext(_) => "Rich Text",
            FieldKind::Signature(_) => "Signature",
            FieldKind::File(_) => "File Upload",
            FieldKind::Display(_) => "Display Text",
            FieldKind::Login(_) => "Login",
            FieldKind::EmailVerify(_) => "Email Verification",
            FieldKind::Datatable(_) => "Data Table",
            FieldKind::Section(_) => "Section",
            FieldKind::Columns(_) => "Columns",
        }
    }

    /// An empty `section` container.
    pub fn section() -> Self {
        FieldKind::Section(SectionConfig::default())
    }

    /// An empty `columns` container with `count` columns.
    pub fn columns(count: usize) -> Self {
        FieldKind::Columns(ColumnsConfig {
            columns: (0..count).map(|_| Column::default()).collect(),
        })
    }

    /// Number of child lists this kind owns. Non-containers own none.
    pub fn child_list_count(&self) -> usize {
        match self {
            FieldKind::Section(_) => 1,
            FieldKind::Columns(c) => c.columns.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextareaConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Options shared by `select`, `checkbox` and `radio`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceConfig {
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    #[serde(default)]
    pub multiple: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupFilter {
    pub field: String,
    pub operator: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupConfig {
    /// External object the lookup searches.
    #[serde(default)]
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    #[serde(default)]
    pub filters: Vec<LookupFilter>,
}

/// Static markup for `richtext` and `display` fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureConfig {
    #[serde(default)]
    pub require_full_name: bool,
    #[serde(default)]
    pub require_date: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub accept: Vec<String>,
    #[serde(default)]
    pub multiple: bool,
}

/// A `login` field. On a successful login the host writes
/// `success_variables` into the registry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_field: Option<String>,
    /// Variable name -> value template.
    #[serde(default)]
    pub success_variables: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailVerifyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_field: Option<String>,
    /// Variable name -> value template.
    #[serde(default)]
    pub success_variables: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTableColumn {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTableConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub columns: Vec<DataTableColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SectionConfig {
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub collapsible: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default)]
    pub columns: Vec<Column>,
}
