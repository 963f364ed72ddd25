//! Query parameters accepted by the preview tool.
//!
//! Every field is validated on its own. Invalid values are dropped, never
//! reported, so a bad field renders as empty instead of failing the request.

use std::fmt;
use url::Url;

/// Which deployment of `offerwall.js` the preview loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    /// Staging deployment.
    Staging,
    /// Production deployment.
    Production,
    /// Preview deployment of a pull request, as the digits were entered.
    PullRequest(String),
}

impl ScriptSource {
    /// Parse `staging`, `production` or a non-zero pull request number.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "staging" => Some(Self::Staging),
            "production" => Some(Self::Production),
            digits
                if digits.bytes().all(|b| b.is_ascii_digit())
                    && digits.bytes().any(|b| b != b'0') =>
            {
                Some(Self::PullRequest(digits.to_string()))
            }
            _ => None,
        }
    }

    /// Prefix prepended to the CDN host for this deployment.
    #[must_use]
    pub fn host_prefix(&self) -> String {
        match self {
            Self::Production => String::new(),
            Self::Staging => "staging-".to_string(),
            Self::PullRequest(digits) => format!("pr{digits}-"),
        }
    }
}

impl fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staging => f.write_str("staging"),
            Self::Production => f.write_str("production"),
            Self::PullRequest(digits) => f.write_str(digits),
        }
    }
}

/// Offerwall profile to preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// First profile.
    Version1,
    /// Second profile.
    Version2,
    /// Third profile.
    Version3,
}

impl Profile {
    /// Every selectable profile, in display order.
    pub const ALL: [Self; 3] = [Self::Version1, Self::Version2, Self::Version3];

    /// Profile identifier as used in queries and markup.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Version1 => "version1",
            Self::Version2 => "version2",
            Self::Version3 => "version3",
        }
    }

    /// Parse a profile identifier.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|profile| profile.as_str() == value)
    }
}

/// Validated preview parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolParams {
    /// Script source (`src`).
    pub src: Option<ScriptSource>,
    /// Wallet address (`wa`), kept as entered.
    pub wallet_address: Option<String>,
    /// Offerwall profile (`profile`).
    pub profile: Option<Profile>,
}

impl ToolParams {
    /// Parse from a raw query string. The first occurrence of a key wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut src = None;
        let mut wa = None;
        let mut profile = None;

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "src" => &mut src,
                "wa" => &mut wa,
                "profile" => &mut profile,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        Self {
            src: src.as_deref().and_then(ScriptSource::parse),
            wallet_address: wa.filter(|value| is_https_url(value)),
            profile: profile.as_deref().and_then(Profile::parse),
        }
    }

    /// URL of `offerwall.js` when every field is valid.
    #[must_use]
    pub fn script_url(&self, cdn_host: &str) -> Option<Url> {
        let (src, _, _) = self.complete()?;
        let base = Url::parse(&format!("https://{}{cdn_host}", src.host_prefix())).ok()?;
        base.join("/offerwall.js").ok()
    }

    /// All three fields, if every one is valid.
    #[must_use]
    pub fn complete(&self) -> Option<(&ScriptSource, &str, Profile)> {
        Some((self.src.as_ref()?, self.wallet_address.as_deref()?, self.profile?))
    }
}

fn is_https_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| url.scheme() == "https")
}
