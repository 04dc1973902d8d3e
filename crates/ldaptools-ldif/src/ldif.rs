//! LDIF entry and document models.

use std::fmt;
use std::io::Write;

use tempfile::NamedTempFile;

use crate::dn::DistinguishedName;
use crate::Result;

/// Line separator used when serializing documents.
pub const LINE_SEPARATOR: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// A single `name: value` line.
///
/// The value is written verbatim. No base64 encoding or escaping is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdifEntry {
    name: String,
    value: String,
}

impl LdifEntry {
    /// Create a new entry.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for LdifEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Kind of change applied to an attribute in a modify record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOperation {
    /// Add attribute values.
    Add,
    /// Delete attribute values.
    Delete,
    /// Replace all attribute values.
    Replace,
}

impl ChangeOperation {
    /// Directive name used in LDIF.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Replace => "replace",
        }
    }
}

/// One change group of a modify record: the directive line followed by the values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    operation: ChangeOperation,
    attribute: String,
    values: Vec<String>,
}

impl Modification {
    /// Creates a change group with the given values.
    #[must_use]
    pub fn new<I, V>(operation: ChangeOperation, attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        Self {
            operation,
            attribute: attribute.into(),
            values: values.into_iter().map(|value| value.to_string()).collect(),
        }
    }

    /// Replaces `attribute` with a single value.
    #[must_use]
    pub fn replace(attribute: impl Into<String>, value: impl fmt::Display) -> Self {
        Self::new(ChangeOperation::Replace, attribute, [value])
    }
}

/// Attribute of a document together with its values, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdifAttribute {
    name: String,
    values: Vec<String>,
}

impl LdifAttribute {
    /// Attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values of the attribute.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Ordered LDIF record.
///
/// Documents are built by appending attributes and are read-only once complete. Multi-valued
/// attributes serialize as one line per value, and repeated attribute names are kept as separate
/// lines in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LdifDocument {
    attributes: Vec<LdifAttribute>,
}

impl LdifDocument {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a record whose first line is `dn: <dn>`.
    #[must_use]
    pub fn for_entry(dn: &DistinguishedName) -> Self {
        let mut document = Self::new();
        document.append("dn", dn);
        document
    }

    /// Starts a modify record: `dn: <dn>` followed by `changetype: modify`.
    #[must_use]
    pub fn modify(dn: &DistinguishedName) -> Self {
        let mut document = Self::for_entry(dn);
        document.append("changetype", "modify");
        document
    }

    /// Appends a single-valued attribute.
    pub fn append(&mut self, name: impl Into<String>, value: impl fmt::Display) -> &mut Self {
        self.append_values(name, [value])
    }

    /// Appends an attribute with any number of values.
    pub fn append_values<I, V>(&mut self, name: impl Into<String>, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        self.attributes.push(LdifAttribute {
            name: name.into(),
            values: values.into_iter().map(|value| value.to_string()).collect(),
        });
        self
    }

    /// Appends the attribute only if a value is present.
    pub fn append_optional<V>(&mut self, name: impl Into<String>, value: Option<V>) -> &mut Self
    where
        V: fmt::Display,
    {
        if let Some(value) = value {
            self.append(name, value);
        }
        self
    }

    /// Appends a change group (`<operation>: <attribute>` then the values).
    pub fn append_modification(&mut self, modification: &Modification) -> &mut Self {
        self.append(modification.operation.as_str(), &modification.attribute);
        self.append_values(modification.attribute.clone(), &modification.values)
    }

    /// Returns the attributes in insertion order.
    #[must_use]
    pub fn attributes(&self) -> &[LdifAttribute] {
        &self.attributes
    }

    /// Flattens the document into one entry per value.
    #[must_use]
    pub fn entries(&self) -> Vec<LdifEntry> {
        self.attributes
            .iter()
            .flat_map(|attribute| {
                attribute
                    .values
                    .iter()
                    .map(|value| LdifEntry::new(attribute.name.clone(), value.clone()))
            })
            .collect()
    }

    /// Value of the leading `dn` line, if the document has one.
    #[must_use]
    pub fn dn(&self) -> Option<&str> {
        self.attributes
            .first()
            .filter(|attribute| attribute.name == "dn")
            .and_then(|attribute| attribute.values.first())
            .map(String::as_str)
    }

    /// Serializes the document, one line per entry.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.entries()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(LINE_SEPARATOR)
    }

    /// Writes the document to a named temporary `.ldif` file.
    ///
    /// The file is removed when the returned handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ldaptools_core::Error::Io`] if the file cannot be created or written.
    pub fn write_temp_file(&self) -> Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("ldaptools-")
            .suffix(".ldif")
            .tempfile()?;
        file.write_all(self.to_text().as_bytes())?;
        file.flush()?;
        Ok(file)
    }
}

impl fmt::Display for LdifDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(document: &LdifDocument) -> Vec<String> {
        document
            .to_text()
            .split(LINE_SEPARATOR)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn multi_valued_attribute_serializes_one_line_per_value() {
        let mut document = LdifDocument::new();
        document.append_values("objectClass", ["top", "posixGroup"]);
        assert_eq!(
            document.to_text(),
            format!("objectClass: top{LINE_SEPARATOR}objectClass: posixGroup")
        );
    }

    #[test]
    fn entries_keep_insertion_order() {
        let dn = DistinguishedName::for_group("staff", "Group", "example.com");
        let mut document = LdifDocument::for_entry(&dn);
        document
            .append("cn", "staff")
            .append("gidNumber", 2001)
            .append_values("objectClass", ["top", "posixGroup"])
            .append_values("memberUid", ["alice", "bob"]);

        let entries = document.entries();
        let names: Vec<&str> = entries.iter().map(LdifEntry::name).collect();
        assert_eq!(
            names,
            vec![
                "dn",
                "cn",
                "gidNumber",
                "objectClass",
                "objectClass",
                "memberUid",
                "memberUid"
            ]
        );
        assert_eq!(entries[2].value(), "2001");
        assert_eq!(entries[6].value(), "bob");
        assert_eq!(document.attributes().len(), 5);
    }

    #[test]
    fn absent_values_are_not_serialized() {
        let mut document = LdifDocument::new();
        document
            .append("uid", "jdoe")
            .append_optional("title", None::<&str>)
            .append_optional("description", Some(""));

        assert_eq!(lines(&document), vec!["uid: jdoe", "description: "]);
    }

    #[test]
    fn modify_record_layout() {
        let dn = DistinguishedName::for_user("jdoe", "People", "example.com");
        let mut document = LdifDocument::modify(&dn);
        document
            .append_modification(&Modification::replace("loginShell", "/bin/zsh"))
            .append_modification(&Modification::new(
                ChangeOperation::Add,
                "memberUid",
                ["alice", "bob"],
            ));

        assert_eq!(
            lines(&document),
            vec![
                "dn: uid=jdoe,ou=People,dc=example,dc=com",
                "changetype: modify",
                "replace: loginShell",
                "loginShell: /bin/zsh",
                "add: memberUid",
                "memberUid: alice",
                "memberUid: bob",
            ]
        );
        assert_eq!(
            document.dn(),
            Some("uid=jdoe,ou=People,dc=example,dc=com")
        );
    }

    #[test]
    fn dn_is_only_reported_for_leading_dn_line() {
        let mut document = LdifDocument::new();
        document.append("cn", "staff").append("dn", "cn=staff");
        assert_eq!(document.dn(), None);
    }

    #[test]
    fn entry_display() {
        assert_eq!(LdifEntry::new("sn", "Doe").to_string(), "sn: Doe");
        assert_eq!(ChangeOperation::Delete.as_str(), "delete");
    }

    #[test]
    fn write_temp_file_contains_document() {
        let dn = DistinguishedName::for_admin("admin", "example.com");
        let document = LdifDocument::for_entry(&dn);
        let file = document.write_temp_file().unwrap();

        assert!(file
            .path()
            .extension()
            .is_some_and(|extension| extension == "ldif"));
        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents, "dn: cn=admin,dc=example,dc=com");
    }
}
