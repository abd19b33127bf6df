use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::TypeError;

/// Absolute, hierarchical URL of a remote resource.
///
/// A URL whose path ends in `/` (and carries no fragment) names a container.
/// Any other URL names a single document, and a `#fragment` selects one
/// subject inside that document.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceUrl(Url);

impl ResourceUrl {
    /// Parse and validate an absolute URL.
    pub fn parse(input: &str) -> Result<Self, TypeError> {
        let url = Url::parse(input).map_err(|e| TypeError::InvalidUrl {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(TypeError::InvalidUrl {
                input: input.to_string(),
                reason: "not a hierarchical url".to_string(),
            });
        }
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns `true` if this URL names a container.
    pub fn is_container(&self) -> bool {
        self.0.fragment().is_none() && self.0.path().ends_with('/')
    }

    pub fn fragment(&self) -> Option<&str> {
        self.0.fragment()
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// The document this URL points into (fragment removed).
    pub fn document(&self) -> ResourceUrl {
        let mut url = self.0.clone();
        url.set_fragment(None);
        Self(url)
    }

    /// A subject URL inside this document.
    pub fn with_fragment(&self, fragment: &str) -> ResourceUrl {
        let mut url = self.0.clone();
        url.set_fragment(Some(fragment));
        Self(url)
    }

    /// Resolve a relative reference against this URL.
    ///
    /// Relative paths only extend the URL when it is a container; a document
    /// URL resolves siblings, as in any URL resolution.
    pub fn join(&self, relative: &str) -> Result<ResourceUrl, TypeError> {
        let joined = self.0.join(relative).map_err(|e| TypeError::InvalidUrl {
            input: format!("{} + {relative}", self.0),
            reason: e.to_string(),
        })?;
        Ok(Self(joined))
    }

    /// The container directly enclosing this resource.
    ///
    /// Returns `None` for the root container of a host.
    pub fn parent(&self) -> Option<ResourceUrl> {
        let trimmed = self.0.path().trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        let cut = trimmed.rfind('/')?;
        let mut parent = self.0.clone();
        parent.set_fragment(None);
        parent.set_query(None);
        parent.set_path(&trimmed[..=cut]);
        Some(Self(parent))
    }

    /// Returns `true` if `other` lives somewhere below this container.
    pub fn contains(&self, other: &ResourceUrl) -> bool {
        self.is_container() && other != self && other.as_str().starts_with(self.as_str())
    }

    /// Last non-empty path segment, if any.
    pub fn last_segment(&self) -> Option<&str> {
        self.0
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .last()
    }
}

impl fmt::Debug for ResourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceUrl({})", self.0)
    }
}

impl fmt::Display for ResourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for ResourceUrl {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceUrl {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourceUrl> for String {
    fn from(url: ResourceUrl) -> Self {
        url.0.into()
    }
}

impl AsRef<str> for ResourceUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> ResourceUrl {
        ResourceUrl::parse(s).unwrap()
    }

    #[test]
    fn rejects_relative_and_opaque_urls() {
        assert!(ResourceUrl::parse("contacts/index.ttl").is_err());
        assert!(ResourceUrl::parse("urn:uuid:1234").is_err());
        assert!(ResourceUrl::parse("mailto:alice@example.org").is_err());
    }

    #[test]
    fn container_detection() {
        assert!(url("https://pod.example/contacts/").is_container());
        assert!(!url("https://pod.example/contacts/index.ttl").is_container());
        assert!(!url("https://pod.example/contacts/#this").is_container());
    }

    #[test]
    fn document_strips_fragment() {
        let subject = url("https://pod.example/contacts/index.ttl#this");
        assert_eq!(subject.fragment(), Some("this"));
        assert_eq!(
            subject.document().as_str(),
            "https://pod.example/contacts/index.ttl"
        );
        assert_eq!(subject.document().with_fragment("this"), subject);
    }

    #[test]
    fn join_extends_containers() {
        let container = url("https://pod.example/contacts/");
        assert_eq!(
            container.join("people.ttl").unwrap().as_str(),
            "https://pod.example/contacts/people.ttl"
        );
        assert_eq!(
            container.join("Person/abc/index.ttl").unwrap().as_str(),
            "https://pod.example/contacts/Person/abc/index.ttl"
        );
    }

    #[test]
    fn parent_walks_up_one_level() {
        let doc = url("https://pod.example/contacts/Person/abc/index.ttl#this");
        let entity_container = doc.parent().unwrap();
        assert_eq!(entity_container.as_str(), "https://pod.example/contacts/Person/abc/");
        assert_eq!(
            entity_container.parent().unwrap().as_str(),
            "https://pod.example/contacts/Person/"
        );
        assert!(url("https://pod.example/").parent().is_none());
        assert_eq!(
            url("https://pod.example/a").parent().unwrap().as_str(),
            "https://pod.example/"
        );
    }

    #[test]
    fn contains_only_descendants() {
        let container = url("https://pod.example/contacts/");
        assert!(container.contains(&url("https://pod.example/contacts/people.ttl")));
        assert!(container.contains(&url("https://pod.example/contacts/Person/")));
        assert!(!container.contains(&container));
        assert!(!container.contains(&url("https://pod.example/other/x.ttl")));
    }

    #[test]
    fn last_segment_ignores_trailing_slash() {
        assert_eq!(url("https://alice.example/profile/card").last_segment(), Some("card"));
        assert_eq!(url("https://pod.example/contacts/").last_segment(), Some("contacts"));
        assert_eq!(url("https://pod.example/").last_segment(), None);
    }

    #[test]
    fn serde_uses_plain_strings() {
        let u = url("https://pod.example/contacts/index.ttl#this");
        let json = serde_json::to_string(&u).unwrap();
        assert_eq!(json, "\"https://pod.example/contacts/index.ttl#this\"");
        let back: ResourceUrl = serde_json::from_str(&json).unwrap();
        assert_eq!(back, u);
        assert!(serde_json::from_str::<ResourceUrl>("\"not a url\"").is_err());
    }
}
