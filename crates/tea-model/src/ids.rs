#![deny(unsafe_code)]

use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Length of a metadata identifier.
pub const UID_LENGTH: usize = 11;

/// Metadata identifier: eleven alphanumeric characters starting with a letter.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Uid(String);

impl Uid {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        if is_valid_uid(&value) {
            Ok(Self(value))
        } else {
            Err(ModelError::InvalidUid(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns true if `value` has the shape of a metadata identifier.
pub fn is_valid_uid(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    value.len() == UID_LENGTH
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric())
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Uid {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Uid {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Uid> for String {
    fn from(value: Uid) -> Self {
        value.0
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_uids() {
        assert!(Uid::new("IpHINAT79UW").is_ok());
        assert!(Uid::new("a3kGcGDCuk6").is_ok());
    }

    #[test]
    fn rejects_malformed_uids() {
        assert!(Uid::new("").is_err());
        assert!(Uid::new("1pHINAT79UW").is_err());
        assert!(Uid::new("IpHINAT79U").is_err());
        assert!(Uid::new("IpHINAT79U-").is_err());
    }
}
