//! Share links: `<base>/<id>#<hex key>`
//!
//! The key sits in the URL fragment, which clients strip before sending a
//! request, so the server only ever sees `<base>/<id>`.

use std::fmt;
use std::str::FromStr;

use zbin_core::sanitize_id;

use crate::{CryptoError, NoteKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    /// Everything before the id, without a trailing slash
    pub base: String,
    /// Store-assigned document id
    pub id: String,
    /// Lowercase hex key from the fragment, if the link carries one
    pub key: Option<String>,
}

impl ShareLink {
    pub fn new(base: &str, id: &str, key: &NoteKey) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            id: id.to_string(),
            key: Some(key.to_hex()),
        }
    }

    /// The part of the link a server is allowed to see.
    pub fn server_url(&self) -> String {
        format!("{}/{}", self.base, self.id)
    }

    /// Decode the fragment key.
    pub fn note_key(&self) -> Result<NoteKey, CryptoError> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| CryptoError::InvalidLink("link has no key fragment".into()))?;
        NoteKey::from_hex(key)
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.server_url())?;
        if let Some(key) = &self.key {
            write!(f, "#{key}")?;
        }
        Ok(())
    }
}

impl FromStr for ShareLink {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (path, fragment) = match s.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (s, None),
        };

        let path = path.trim_end_matches('/');
        let (scheme, rest) = match path.split_once("://") {
            Some((scheme, rest)) => (Some(scheme), rest),
            None => (None, path),
        };
        // with a scheme, the first segment is the host and never an id
        let (prefix, raw_id) = match (rest.rsplit_once('/'), scheme) {
            (Some((prefix, id)), _) => (prefix, id),
            (None, Some(_)) => (rest, ""),
            (None, None) => ("", rest),
        };
        let base = match scheme {
            Some(scheme) => format!("{scheme}://{prefix}"),
            None => prefix.to_string(),
        };
        let id = sanitize_id(raw_id)
            .ok_or_else(|| CryptoError::InvalidLink(format!("no document id in {s:?}")))?;

        let key = match fragment.map(str::trim).filter(|f| !f.is_empty()) {
            Some(fragment) => Some(NoteKey::from_hex(fragment)?.to_hex()),
            None => None,
        };

        Ok(Self {
            base,
            id,
            key,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        let key = NoteKey::from_hex("65eaa9ba497f4527eb6a3131265e7439").unwrap();
        let link = ShareLink::new("https://zbin.example.com/", "CgnTycJHTErpuFaSnb9Z", &key);
        assert_eq!(
            link.to_string(),
            "https://zbin.example.com/CgnTycJHTErpuFaSnb9Z#65eaa9ba497f4527eb6a3131265e7439"
        );
        assert_eq!(
            link.server_url(),
            "https://zbin.example.com/CgnTycJHTErpuFaSnb9Z"
        );
    }

    #[test]
    fn test_parse() {
        let link: ShareLink = "https://zbin.example.com/n/abc123#65EAA9BA497F4527EB6A3131265E7439"
            .parse()
            .unwrap();
        assert_eq!(link.base, "https://zbin.example.com/n");
        assert_eq!(link.id, "abc123");
        assert_eq!(
            link.key.as_deref(),
            Some("65eaa9ba497f4527eb6a3131265e7439")
        );
        assert_eq!(link.note_key().unwrap().len(), 16);
    }

    #[test]
    fn test_parse_without_fragment() {
        let link: ShareLink = "http://localhost:8080/abc123".parse().unwrap();
        assert_eq!(link.id, "abc123");
        assert_eq!(link.key, None);
        assert!(matches!(link.note_key(), Err(CryptoError::InvalidLink(_))));
    }

    #[test]
    fn test_parse_bare_id() {
        let link: ShareLink = "abc123".parse().unwrap();
        assert_eq!(link.base, "");
        assert_eq!(link.id, "abc123");
    }

    #[test]
    fn test_parse_rejects_missing_id() {
        assert!(matches!(
            "https://zbin.example.com/#00".parse::<ShareLink>(),
            Err(CryptoError::InvalidLink(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_key() {
        assert!("http://h/abc#xyz".parse::<ShareLink>().is_err());
        assert!(matches!(
            "http://h/abc#0011".parse::<ShareLink>(),
            Err(CryptoError::InvalidKeySize(2))
        ));
    }
}
