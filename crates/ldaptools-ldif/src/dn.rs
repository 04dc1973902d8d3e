//! Distinguished Name model for user, group and administrator entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use ldaptools_core::error::Error as CoreError;

/// Errors that can occur when parsing distinguished names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistinguishedNameError {
    /// The distinguished name was empty.
    #[error("distinguished name cannot be empty")]
    Empty,
    /// A component did not consist of exactly one `key=value` pair.
    #[error("invalid distinguished name component: {0:?}")]
    InvalidComponent(String),
    /// A component used an attribute other than `cn`, `uid`, `ou` or `dc`.
    #[error("unknown distinguished name attribute: {0:?}")]
    UnknownAttribute(String),
    /// A single-valued attribute appeared more than once.
    #[error("duplicate distinguished name attribute: {0}")]
    DuplicateAttribute(DnAttribute),
    /// A component was missing the value to the right of the `=`.
    #[error("distinguished name component missing value for attribute {0}")]
    MissingValue(String),
}

impl From<DistinguishedNameError> for CoreError {
    fn from(err: DistinguishedNameError) -> Self {
        CoreError::MalformedDistinguishedName(err.to_string())
    }
}

/// Attribute keys recognized in distinguished names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DnAttribute {
    /// Common name (groups, administrator)
    Cn,
    /// User login
    Uid,
    /// Organizational unit
    Ou,
    /// Domain component
    Dc,
}

impl DnAttribute {
    /// Lowercase attribute key as written in a DN.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cn => "cn",
            Self::Uid => "uid",
            Self::Ou => "ou",
            Self::Dc => "dc",
        }
    }

    /// Returns true if the attribute may appear at most once in a DN.
    #[must_use]
    pub const fn is_singleton(self) -> bool {
        !matches!(self, Self::Dc)
    }

    /// Looks up an attribute by key (case-insensitive).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        [Self::Cn, Self::Uid, Self::Ou, Self::Dc]
            .into_iter()
            .find(|attribute| attribute.as_str().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for DnAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single `key=value` component of a distinguished name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DnComponent {
    attribute: DnAttribute,
    value: String,
}

impl DnComponent {
    /// Create a new component.
    #[must_use]
    pub fn new(attribute: DnAttribute, value: impl Into<String>) -> Self {
        Self {
            attribute,
            value: value.into(),
        }
    }

    /// Attribute portion of the component.
    #[must_use]
    pub const fn attribute(&self) -> DnAttribute {
        self.attribute
    }

    /// Value portion of the component.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for DnComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attribute, self.value)
    }
}

/// Yields one `dc` component per non-empty segment of a dotted domain.
pub fn domain_components(domain: &str) -> impl Iterator<Item = DnComponent> + '_ {
    domain
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(|segment| DnComponent::new(DnAttribute::Dc, segment))
}

/// Ordered sequence of DN components, most specific first.
///
/// The order is kept exactly as constructed. Values are written verbatim: commas or other
/// special characters inside a value are not escaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DistinguishedName {
    components: Vec<DnComponent>,
}

impl DistinguishedName {
    /// Creates a distinguished name from explicit components.
    #[must_use]
    pub fn new(components: impl IntoIterator<Item = DnComponent>) -> Self {
        Self {
            components: components.into_iter().collect(),
        }
    }

    /// `uid=<login>,ou=<ou>,dc=...` for a user entry.
    #[must_use]
    pub fn for_user(login: &str, ou: &str, domain: &str) -> Self {
        Self::new(
            [
                DnComponent::new(DnAttribute::Uid, login),
                DnComponent::new(DnAttribute::Ou, ou),
            ]
            .into_iter()
            .chain(domain_components(domain)),
        )
    }

    /// `cn=<name>,ou=<ou>,dc=...` for a group entry.
    #[must_use]
    pub fn for_group(name: &str, ou: &str, domain: &str) -> Self {
        Self::new(
            [
                DnComponent::new(DnAttribute::Cn, name),
                DnComponent::new(DnAttribute::Ou, ou),
            ]
            .into_iter()
            .chain(domain_components(domain)),
        )
    }

    /// `cn=<admin>,dc=...` for binding as the directory administrator.
    #[must_use]
    pub fn for_admin(cn: &str, domain: &str) -> Self {
        Self::new(
            std::iter::once(DnComponent::new(DnAttribute::Cn, cn)).chain(domain_components(domain)),
        )
    }

    /// Parses a distinguished name of the form `key1=val1,key2=val2,...`.
    ///
    /// # Errors
    ///
    /// Returns [`DistinguishedNameError`] if the input is empty, a component is not exactly one
    /// `key=value` pair, a key is not one of `cn`, `uid`, `ou`, `dc`, or `cn`/`uid`/`ou` repeats.
    pub fn parse(input: impl AsRef<str>) -> std::result::Result<Self, DistinguishedNameError> {
        let raw = input.as_ref();
        if raw.is_empty() {
            return Err(DistinguishedNameError::Empty);
        }

        let mut components: Vec<DnComponent> = Vec::new();
        for field in raw.split(',') {
            let (key, value) = split_field(field)?;
            let attribute = DnAttribute::from_key(key)
                .ok_or_else(|| DistinguishedNameError::UnknownAttribute(key.to_string()))?;

            if attribute.is_singleton()
                && components
                    .iter()
                    .any(|component| component.attribute == attribute)
            {
                return Err(DistinguishedNameError::DuplicateAttribute(attribute));
            }

            components.push(DnComponent::new(attribute, value));
        }

        Ok(Self { components })
    }

    /// Checks that the written form parses back into the same components.
    ///
    /// Values are never escaped, so a value holding `,` or `=`, or an empty value, either fails to
    /// parse or changes the shape of the name.
    ///
    /// # Errors
    ///
    /// Returns the parse error, or [`DistinguishedNameError::InvalidComponent`] carrying the
    /// written form if it parses into different components.
    pub fn validated(self) -> std::result::Result<Self, DistinguishedNameError> {
        let text = self.to_string();
        if Self::parse(&text)? == self {
            Ok(self)
        } else {
            Err(DistinguishedNameError::InvalidComponent(text))
        }
    }

    /// Returns the components in order.
    #[must_use]
    pub fn components(&self) -> &[DnComponent] {
        &self.components
    }

    /// Looks up the value of the first component with the given attribute.
    #[must_use]
    pub fn get(&self, attribute: DnAttribute) -> Option<&str> {
        self.components
            .iter()
            .find(|component| component.attribute == attribute)
            .map(DnComponent::value)
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, component) in self.components.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl FromStr for DistinguishedName {
    type Err = DistinguishedNameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DistinguishedName {
    type Error = DistinguishedNameError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DistinguishedName> for String {
    fn from(value: DistinguishedName) -> Self {
        value.to_string()
    }
}

fn split_field(field: &str) -> std::result::Result<(&str, &str), DistinguishedNameError> {
    let mut parts = field.split('=');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(key), Some(value), None) => {
            let key = key.trim();
            if key.is_empty() {
                return Err(DistinguishedNameError::InvalidComponent(field.to_string()));
            }
            if value.is_empty() {
                return Err(DistinguishedNameError::MissingValue(key.to_string()));
            }
            Ok((key, value))
        }
        _ => Err(DistinguishedNameError::InvalidComponent(field.to_string())),
    }
}
