//! Capability probe for Web Monetization support on a page.

/// Link relation that declares a monetization receiver.
pub const MONETIZATION_REL: &str = "monetization";

/// Reports whether the page can receive Web Monetization payments at all.
pub trait CapabilityProbe: Send + Sync {
    /// `true` if the monetization capability is present.
    fn supports_monetization(&self) -> bool;
}

/// `rel` attribute values of the page's `<link>` elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRelations {
    rels: Vec<String>,
}

impl LinkRelations {
    /// Build from the `rel` attribute of each declared link.
    #[must_use]
    pub fn new<I, S>(rels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rels: rels.into_iter().map(Into::into).collect(),
        }
    }

    /// Declared `rel` attribute values.
    #[must_use]
    pub fn rels(&self) -> &[String] {
        &self.rels
    }
}

impl CapabilityProbe for LinkRelations {
    fn supports_monetization(&self) -> bool {
        // `rel` is a space-separated, ASCII case-insensitive token list
        self.rels.iter().any(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case(MONETIZATION_REL))
        })
    }
}

impl CapabilityProbe for bool {
    fn supports_monetization(&self) -> bool {
        *self
    }
}
