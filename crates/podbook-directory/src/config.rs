use std::path::Path;

use podbook_types::{ResourceUrl, TypeTag, Vocabulary};
use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, DirectoryResult};

/// Naming and vocabulary of an address book layout.
///
/// ```toml
/// people_index_file = "people.ttl"
/// person_container = "Person"
///
/// [vocabulary]
/// formatted_name = "http://www.w3.org/2006/vcard/ns#fn"
/// ```
///
/// Every field is optional in TOML; missing fields take the defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Main index document, relative to the directory container.
    pub main_index_file: String,
    /// Default people index document, relative to the directory container.
    pub people_index_file: String,
    /// Default group index document, relative to the directory container.
    pub group_index_file: String,
    /// Sub-container holding one container per person.
    pub person_container: String,
    /// Sub-container holding one container per group.
    pub group_container: String,
    /// Document name inside each entity container.
    pub entity_file: String,
    /// Fragment naming the main subject of the main index and entity documents.
    pub record_fragment: String,
    pub vocabulary: Vocabulary,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            main_index_file: "index.ttl".to_string(),
            people_index_file: "people.ttl".to_string(),
            group_index_file: "groups.ttl".to_string(),
            person_container: "Person".to_string(),
            group_container: "Group".to_string(),
            entity_file: "index.ttl".to_string(),
            record_fragment: "this".to_string(),
            vocabulary: Vocabulary::default(),
        }
    }
}

impl DirectoryConfig {
    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(input: &str) -> DirectoryResult<Self> {
        let config: Self =
            toml::from_str(input).map_err(|e| DirectoryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: &Path) -> DirectoryResult<Self> {
        let input = std::fs::read_to_string(path)?;
        Self::from_toml_str(&input)
    }

    /// Check that names form valid URL segments and type tags are URLs.
    pub fn validate(&self) -> DirectoryResult<()> {
        let segments = [
            ("main_index_file", &self.main_index_file),
            ("people_index_file", &self.people_index_file),
            ("group_index_file", &self.group_index_file),
            ("person_container", &self.person_container),
            ("group_container", &self.group_container),
            ("entity_file", &self.entity_file),
            ("record_fragment", &self.record_fragment),
        ];
        for (field, value) in segments {
            if value.is_empty() {
                return Err(DirectoryError::Config(format!("{field} must not be empty")));
            }
            if value.contains('/') || value.contains('#') {
                return Err(DirectoryError::Config(format!(
                    "{field} must be a single path segment, got {value:?}"
                )));
            }
        }
        if self.people_index_file == self.group_index_file
            || self.people_index_file == self.main_index_file
            || self.group_index_file == self.main_index_file
        {
            return Err(DirectoryError::Config(
                "main, people and group index files must differ".to_string(),
            ));
        }
        if self.person_container == self.group_container {
            return Err(DirectoryError::Config(
                "person and group containers must differ".to_string(),
            ));
        }
        for tag in TypeTag::ALL {
            let iri = self.vocabulary.type_iri(tag);
            ResourceUrl::parse(iri).map_err(|e| {
                DirectoryError::Config(format!("type identifier for {tag:?} is not a url: {e}"))
            })?;
        }
        Ok(())
    }
}
