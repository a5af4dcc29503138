//! The form document: pages, fields, nested containers and settings.

mod document;
pub mod field;
pub mod page;

pub use field::*;
pub use page::*;

use crate::condition::{NavButton, RuleGroup, Target};
use crate::tree::{ContainerSlot, Located, walk};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Root aggregate of a form definition. Owns every page exclusively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub settings: FormSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<FormNavigation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    pub submit_label: String,
    pub success_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_style: Option<String>,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            submit_label: "Submit".to_string(),
            success_message: "Thank you for your submission.".to_string(),
            redirect_url: None,
            theme: None,
            custom_style: None,
        }
    }
}

/// Form-wide navigation display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormNavigation {
    #[serde(default)]
    pub show_progress: bool,
    #[serde(default = "default_true")]
    pub allow_back: bool,
}

fn default_true() -> bool {
    true
}

/// A field located anywhere in the form.
#[derive(Debug, Clone)]
pub struct FormLocation<'a> {
    pub page: usize,
    pub located: Located<'a>,
}

impl Form {
    /// A form with a single empty page.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            pages: vec![Page::new("page_1", "Page 1")],
            settings: FormSettings::default(),
            navigation: None,
        }
    }

    pub fn with_pages(mut self, pages: Vec<Page>) -> Self {
        self.pages = pages;
        self
    }

    /// Every field of every page, depth-first, paired with its page index.
    pub fn fields(&self) -> Vec<(usize, &Field)> {
        let mut out = Vec::new();
        for (page_index, page) in self.pages.iter().enumerate() {
            walk::visit(&page.fields, &ContainerSlot::Root, &mut |field, _, _| {
                out.push((page_index, field))
            });
        }
        out
    }

    pub fn field_ids(&self) -> Vec<&str> {
        self.fields().into_iter().map(|(_, f)| f.id.as_str()).collect()
    }

    /// Form-wide uniqueness probe, including every container subtree.
    pub fn contains_field(&self, id: &str) -> bool {
        self.locate_field(id).is_some()
    }

    pub fn locate_field(&self, id: &str) -> Option<FormLocation<'_>> {
        self.pages.iter().enumerate().find_map(|(page, p)| {
            walk::find(&p.fields, id)
                .map(|located| FormLocation { page, located })
        })
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.locate_field(id).map(|loc| loc.located.field)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.pages
            .iter_mut()
            .find_map(|p| walk::find_mut(&mut p.fields, id))
    }

    /// Page index holding the field, if any.
    pub fn page_of_field(&self, id: &str) -> Option<usize> {
        self.locate_field(id).map(|loc| loc.page)
    }

    /// Identifiers that occur more than once, each reported once.
    pub fn duplicate_ids(&self) -> Vec<String> {
        self.fields()
            .into_iter()
            .map(|(_, field)| field.id.as_str())
            .duplicates()
            .map(str::to_string)
            .collect()
    }

    /// Every rule-group of the form with its owner: fields first (page by
    /// page, depth-first), then each page followed by its two buttons.
    pub fn rule_groups(&self) -> Vec<(Target, &RuleGroup)> {
        let mut groups: Vec<(Target, &RuleGroup)> = self
            .fields()
            .into_iter()
            .map(|(_, f)| (Target::Field(f.id.clone()), &f.conditional_visibility))
            .collect();
        for (index, page) in self.pages.iter().enumerate() {
            groups.push((Target::Page(index), &page.conditional_visibility));
            groups.push((Target::next_button(index), &page.navigation.next));
            groups.push((Target::submit_button(index), &page.navigation.submit));
        }
        groups
    }

    pub fn rule_group(&self, target: &Target) -> Option<&RuleGroup> {
        match target {
            Target::Field(id) => self.field(id).map(|f| &f.conditional_visibility),
            Target::Page(index) => self.pages.get(*index).map(|p| &p.conditional_visibility),
            Target::Button { page, button } => {
                self.pages.get(*page).map(|p| p.button_rules(*button))
            }
        }
    }

    pub fn rule_group_mut(&mut self, target: &Target) -> Option<&mut RuleGroup> {
        match target {
            Target::Field(id) => self.field_mut(id).map(|f| &mut f.conditional_visibility),
            Target::Page(index) => self
                .pages
                .get_mut(*index)
                .map(|p| &mut p.conditional_visibility),
            Target::Button { page, button } => self
                .pages
                .get_mut(*page)
                .map(|p| p.button_rules_mut(*button)),
        }
    }

    /// All rule-group owners that can exist on a page: the page and its buttons.
    pub fn page_targets(&self) -> Vec<Target> {
        (0..self.pages.len())
            .flat_map(|index| {
                [
                    Target::Page(index),
                    Target::Button {
                        page: index,
                        button: NavButton::Next,
                    },
                    Target::Button {
                        page: index,
                        button: NavButton::Submit,
                    },
                ]
            })
            .collect()
    }
}
