//! Request and response payloads exchanged with the pipeline orchestrator

use serde::{Deserialize, Serialize};

/// Where the version lives and how to reach it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub version_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_ssl_verification: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_code_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_version: Option<String>,
}

/// A version as the orchestrator tracks it: the number plus the source commit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub number: String,
    #[serde(default, rename = "ref")]
    pub commit: String,
}

impl Version {
    pub fn new(number: impl Into<String>, commit: impl Into<String>) -> Self {
        Version {
            number: number.into(),
            commit: commit.into(),
        }
    }
}

/// How `in` and `out` should change the version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionParams {
    #[serde(default)]
    pub bump: String,
    #[serde(default)]
    pub pre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub name: String,
    pub value: String,
}

impl MetadataField {
    pub fn number(value: impl Into<String>) -> Self {
        MetadataField {
            name: "number".to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    pub source: Source,
    #[serde(default)]
    pub version: Option<Version>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InRequest {
    pub source: Source,
    pub version: Version,
    #[serde(default)]
    pub params: VersionParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutRequest {
    pub source: Source,
    #[serde(default)]
    pub params: VersionParams,
}

/// Response of both `in` and `out`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: Version,
    pub metadata: Vec<MetadataField>,
}
