use std::collections::HashMap;

use crate::error::{TagExprError, TagExprResult};
use crate::expression::Expression;
use crate::interface::{PluginGate, TagList};

/// `PluginRegistry` is the primary implementation of the [`PluginGate`]
/// trait: a set of named plugins, each gated by a tag expression.
///
/// # Examples
///
/// ```
/// use tagexpr::{PluginGate, PluginRegistry, TagList};
///
/// let mut registry = PluginRegistry::new();
/// registry.add_plugin("telehealth", "PL.DOCTOR.!(DENTIST,physio)").unwrap();
/// registry.add_plugin("beta", "~").unwrap();
///
/// let tags = TagList::from_delimited("pl,doctor", ',');
/// assert!(registry.is_enabled("telehealth", Some(&tags)).unwrap());
/// assert_eq!(registry.enabled_plugins(Some(&tags)), ["telehealth"]);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Expression>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an already parsed expression under `name`.
    ///
    /// # Errors
    /// - If a plugin with the same name is already registered.
    pub fn add_expression<N: AsRef<str>>(
        &mut self,
        name: N,
        expression: Expression,
    ) -> TagExprResult<()> {
        let name = name.as_ref();
        if self.plugins.contains_key(name) {
            return Err(TagExprError::DuplicatePlugin {
                plugin_name: name.to_string(),
            });
        }

        log::trace!("Registered plugin {name:?} gated by {:?}", expression.source());
        self.plugins.insert(name.to_string(), expression);
        Ok(())
    }

    pub fn get<N: AsRef<str>>(&self, name: N) -> Option<&Expression> {
        self.plugins.get(name.as_ref())
    }

    pub fn remove<N: AsRef<str>>(&mut self, name: N) -> Option<Expression> {
        self.plugins.remove(name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl PluginGate for PluginRegistry {
    fn add_plugin<N: AsRef<str>, E: AsRef<str>>(
        &mut self,
        name: N,
        expression: E,
    ) -> TagExprResult<()> {
        // Check the name first so a duplicate is reported even when the
        // expression is also broken.
        if self.plugins.contains_key(name.as_ref()) {
            return Err(TagExprError::DuplicatePlugin {
                plugin_name: name.as_ref().to_string(),
            });
        }

        let expression = Expression::new(expression.as_ref())?;
        self.add_expression(name, expression)
    }

    fn is_enabled<N: AsRef<str>>(&self, name: N, tags: Option<&TagList>) -> TagExprResult<bool> {
        let name = name.as_ref();
        let expression = self
            .plugins
            .get(name)
            .ok_or_else(|| TagExprError::MissingPlugin {
                plugin_name: name.to_string(),
            })?;

        let enabled = expression.matches_opt(tags.map(TagList::as_slice));
        log::trace!("Plugin {name:?} enabled: {enabled}");
        Ok(enabled)
    }

    fn enabled_plugins<'a>(&'a self, tags: Option<&TagList>) -> Vec<&'a str> {
        let tags = tags.map(TagList::as_slice);
        let mut enabled: Vec<&str> = self
            .plugins
            .iter()
            .filter(|(_, expression)| expression.matches_opt(tags))
            .map(|(name, _)| name.as_str())
            .collect();
        enabled.sort_unstable();
        enabled
    }
}
