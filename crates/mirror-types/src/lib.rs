//! Validated text types shared across the offsite mirror crates.
//!
//! Remote identifiers, folder names and log-target fields all arrive as plain strings
//! from configuration or callers. Wrapping them here means the rest of the workspace
//! can assume they are non-empty (and, for folder names, safe to join onto a path).

use std::fmt;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input has leading or trailing whitespace where it would be significant
    #[error("{0:?} has leading or trailing whitespace")]
    SurroundingWhitespace(String),

    /// The input cannot be used as a single folder name
    #[error("Invalid folder name {0:?}: must be a single path component")]
    InvalidFolderName(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is trimmed of leading and trailing whitespace during construction, which
/// suits free-form fields such as log table names. Identifiers and folder names use
/// [`RemoteId`] and [`FolderName`], which reject surrounding whitespace instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Like [`NonEmptyText::new`], but refuses input that trimming would change.
    fn exact(input: &str) -> Result<Self, TextError> {
        let text = Self::new(input)?;
        if text.as_str() != input {
            return Err(TextError::SurroundingWhitespace(input.to_owned()));
        }
        Ok(text)
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Opaque identifier handed out by a remote service (folder, object, spreadsheet).
///
/// Nothing is assumed about the format beyond being non-empty. Whether the id actually
/// refers to something only becomes known on first use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct RemoteId(NonEmptyText);

impl RemoteId {
    /// Wraps a remote identifier.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` for empty or whitespace-only input and
    /// `TextError::SurroundingWhitespace` if the id is padded. Ids are used verbatim.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        NonEmptyText::exact(input.as_ref()).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl AsRef<str> for RemoteId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl<'de> serde::Deserialize<'de> for RemoteId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RemoteId::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Name of a folder that is created on both the remote and the local side.
///
/// The same string becomes a remote folder name and a local path component, so it
/// must be a single component: no separators, no NUL, and not `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct FolderName(NonEmptyText);

impl FolderName {
    /// Validates a folder name.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` for blank input, `TextError::SurroundingWhitespace`
    /// for padded input and `TextError::InvalidFolderName` when the name would escape
    /// or nest inside the parent directory.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let text = NonEmptyText::exact(input.as_ref())?;
        let name = text.as_str();

        if name == "." || name == ".." {
            return Err(TextError::InvalidFolderName(name.to_owned()));
        }

        if name.chars().any(|c| c == '/' || c == '\\' || c == '\0') {
            return Err(TextError::InvalidFolderName(name.to_owned()));
        }

        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FolderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl AsRef<str> for FolderName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Sheet1  ").unwrap();
        assert_eq!(text.as_str(), "Sheet1");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
        assert_eq!(NonEmptyText::new(""), Err(TextError::Empty));
    }

    #[test]
    fn remote_id_rejects_empty() {
        assert!(RemoteId::new("").is_err());
        assert_eq!(RemoteId::new("R0").unwrap().as_str(), "R0");
    }

    #[test]
    fn remote_id_serialises_as_plain_string() {
        let id = RemoteId::new("1AbC").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1AbC\"");

        let back: RemoteId = serde_json::from_str("\"1AbC\"").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<RemoteId>("\"  \"").is_err());
    }

    #[test]
    fn folder_name_accepts_single_component() {
        assert_eq!(FolderName::new("projA").unwrap().as_str(), "projA");
        assert_eq!(FolderName::new("2024 reports").unwrap().as_str(), "2024 reports");
    }

    #[test]
    fn folder_name_rejects_traversal_and_nesting() {
        for bad in ["..", ".", "a/b", "a\\b", "/abs", "nul\0"] {
            assert!(
                matches!(FolderName::new(bad), Err(TextError::InvalidFolderName(_))),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(FolderName::new(" "), Err(TextError::Empty));
    }

    #[test]
    fn identifiers_are_not_trimmed() {
        assert_eq!(
            FolderName::new(" projA"),
            Err(TextError::SurroundingWhitespace(" projA".into()))
        );
        assert_eq!(
            RemoteId::new("R0 "),
            Err(TextError::SurroundingWhitespace("R0 ".into()))
        );
        assert!(serde_json::from_str::<RemoteId>("\" 1AbC\"").is_err());
        assert_eq!(FolderName::new("proj A").unwrap().as_str(), "proj A");
    }
}
