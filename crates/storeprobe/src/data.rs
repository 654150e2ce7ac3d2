//! Fixture data: registration form values and static keyword data.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const BUNDLED_REGISTER_DATA: &str = include_str!("../resources/register_data.json");
const BUNDLED_STATIC_DATA: &str = include_str!("../resources/static_data.json");

/// Valid registration values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidRegistration {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email (unique emails are generated for the success flow)
    pub email: String,
    /// Password
    pub password: String,
}

/// Values for the registration flows, positive and negative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterData {
    /// Values that pass every validation
    pub valid: ValidRegistration,
    /// Whitespace-only input for every field
    #[serde(default = "default_empty_spaces")]
    pub empty_spaces: String,
    /// Malformed email address
    #[serde(default = "default_invalid_email")]
    pub invalid_email: String,
    /// Confirm-password value that differs from `valid.password`
    #[serde(default = "default_mismatch_password", alias = "password_mismatch_confirm")]
    pub mismatch_confirm_password: String,
    /// Name containing markup the form must reject
    #[serde(default = "default_forbidden_name")]
    pub forbidden_chars_name: String,
}

fn default_empty_spaces() -> String {
    "   ".to_string()
}

fn default_invalid_email() -> String {
    "notanemail".to_string()
}

fn default_mismatch_password() -> String {
    "OtherPass456!".to_string()
}

fn default_forbidden_name() -> String {
    "<script>alert(1)</script>".to_string()
}

impl RegisterData {
    /// Parse registration data from JSON
    pub fn from_json_str(json: &str) -> ProbeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load registration data from a file
    pub fn load(path: impl AsRef<Path>) -> ProbeResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path.as_ref())?)
    }

    /// Registration data shipped with the crate
    pub fn bundled() -> ProbeResult<Self> {
        Self::from_json_str(BUNDLED_REGISTER_DATA)
    }
}

/// Free-form `section -> key -> value` data, such as search keywords
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticData {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl StaticData {
    /// Parse static data from JSON
    pub fn from_json_str(json: &str) -> ProbeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load static data from a file
    pub fn load(path: impl AsRef<Path>) -> ProbeResult<Self> {
        Self::from_json_str(&std::fs::read_to_string(path.as_ref())?)
    }

    /// Static data shipped with the crate
    pub fn bundled() -> ProbeResult<Self> {
        Self::from_json_str(BUNDLED_STATIC_DATA)
    }

    /// Value at `section.key`
    pub fn value(&self, section: &str, key: &str) -> ProbeResult<&str> {
        self.sections
            .get(section)
            .and_then(|values| values.get(key))
            .map(String::as_str)
            .ok_or_else(|| ProbeError::data_not_found(section, key))
    }
}

/// All fixture data a session carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureData {
    /// Registration values
    pub register: RegisterData,
    /// Static keyword data
    pub statics: StaticData,
}

impl FixtureData {
    /// Bundled registration and static data
    pub fn bundled() -> ProbeResult<Self> {
        Ok(Self {
            register: RegisterData::bundled()?,
            statics: StaticData::bundled()?,
        })
    }

    /// Load each source from its path, falling back to bundled data
    pub fn load(register: Option<&Path>, statics: Option<&Path>) -> ProbeResult<Self> {
        Ok(Self {
            register: match register {
                Some(path) => RegisterData::load(path)?,
                None => RegisterData::bundled()?,
            },
            statics: match statics {
                Some(path) => StaticData::load(path)?,
                None => StaticData::bundled()?,
            },
        })
    }
}
