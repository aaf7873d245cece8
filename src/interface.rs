use crate::ast::eq_ignore_case;

/// The tags attached to a subject, such as a user or a request.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TagList {
    tags: Vec<String>,
}

impl TagList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits a delimited tag string, e.g. `"PL,DOCTOR,VIP"`.
    ///
    /// Surrounding whitespace is trimmed and empty entries are dropped.
    pub fn from_delimited(input: &str, delimiter: char) -> Self {
        input
            .split(delimiter)
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    pub fn insert<T: Into<String>>(&mut self, tag: T) -> &mut Self {
        self.tags.push(tag.into());
        self
    }

    /// Case-insensitive membership, the same comparison expressions use.
    pub fn contains<T: AsRef<str>>(&self, tag: T) -> bool {
        self.tags.iter().any(|t| eq_ignore_case(t, tag.as_ref()))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tags
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl<T: Into<String>> FromIterator<T> for TagList {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<T: Into<String>> Extend<T> for TagList {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tags.extend(iter.into_iter().map(Into::into));
    }
}

impl<'a> IntoIterator for &'a TagList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

/// `PluginGate` decides which plugins are active for a subject, based on a
/// tag expression registered for each plugin.
pub trait PluginGate {
    /// `add_plugin` parses `expression` and registers it under `name`.
    ///
    /// # Errors
    /// - If a plugin with the same name is already registered.
    /// - If the expression does not parse.
    fn add_plugin<N: AsRef<str>, E: AsRef<str>>(
        &mut self,
        name: N,
        expression: E,
    ) -> crate::TagExprResult<()>;

    /// `is_enabled` evaluates the named plugin's expression against `tags`.
    /// Passing `None` is the same as passing an empty tag list.
    ///
    /// # Errors
    /// - If no plugin with that name is registered.
    fn is_enabled<N: AsRef<str>>(
        &self,
        name: N,
        tags: Option<&TagList>,
    ) -> crate::TagExprResult<bool>;

    /// `enabled_plugins` returns the names of every plugin whose expression
    /// is satisfied by `tags`, sorted by name.
    fn enabled_plugins<'a>(&'a self, tags: Option<&TagList>) -> Vec<&'a str>;
}
