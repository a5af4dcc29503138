use super::validate_identifier;
use crate::condition::Target;
use crate::error::IdError;
use crate::form::Form;
use tracing::debug;

/// A rule that must be rewritten: the owner of its group and its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSite {
    pub target: Target,
    pub rule: usize,
}

impl Form {
    /// Every rule in the form whose `dependsOn` is `reference`.
    pub fn rule_sites(&self, reference: &str) -> Vec<RuleSite> {
        self.rule_groups()
            .into_iter()
            .flat_map(|(target, group)| {
                group
                    .rules
                    .iter()
                    .enumerate()
                    .filter(|(_, rule)| rule.depends_on == reference)
                    .map(move |(rule, _)| RuleSite {
                        target: target.clone(),
                        rule,
                    })
            })
            .collect()
    }

    /// Renames a field and rewrites every rule that referenced its old id.
    ///
    /// All checks happen before anything is written. The affected rules are
    /// collected first and rewritten afterwards, with the field id changed
    /// last, so each rule site is still addressable by its old owner id.
    /// Returns the number of rewritten rules.
    pub fn rename_field(&mut self, old: &str, new: &str) -> Result<usize, IdError> {
        if !self.contains_field(old) {
            return Err(IdError::NotFound(old.to_string()));
        }
        if old == new {
            return Ok(0);
        }
        validate_identifier(new)?;
        if self.contains_field(new) {
            return Err(IdError::Duplicate(new.to_string()));
        }

        let sites = self.rule_sites(old);
        for site in &sites {
            if let Some(rule) = self
                .rule_group_mut(&site.target)
                .and_then(|group| group.rules.get_mut(site.rule))
            {
                rule.depends_on = new.to_string();
            }
        }
        if let Some(field) = self.field_mut(old) {
            field.id = new.to_string();
        }

        debug!(old = %old, new = %new, rewritten = sites.len(), "renamed field");
        Ok(sites.len())
    }
}
