//! Package origin descriptors and cache keys.

/// Name marker meaning "no resolvable package name".
///
/// Origins carrying it (or an empty name) get no cache key; their cache
/// entry is named after the URL basename instead, so two such origins with
/// the same basename alias the same cache path. Known weak invariant, kept.
pub const UNKNOWN_NAME: &str = "unknown";

/// A request to materialize a specific ref rather than the default state.
///
/// At most one pin is meaningful per origin; callers that collected several
/// candidates pick one with [`Pin::first_of`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pin {
    Branch(String),
    Tag(String),
    Revision(String),
}

impl Pin {
    /// First declared pin wins: branch, then tag, then revision.
    pub fn first_of(
        branch: Option<String>,
        tag: Option<String>,
        revision: Option<String>,
    ) -> Option<Self> {
        branch
            .map(Pin::Branch)
            .or(tag.map(Pin::Tag))
            .or(revision.map(Pin::Revision))
    }

    /// The raw ref this pin points at.
    pub fn reference(&self) -> &str {
        match self {
            Pin::Branch(r) | Pin::Tag(r) | Pin::Revision(r) => r,
        }
    }
}

/// Where a package's source comes from.
#[derive(Debug, Clone)]
pub struct Origin {
    pub url: String,
    pub name: String,
    pub version: String,
    pub pin: Option<Pin>,
}

impl Origin {
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            version: version.into(),
            pin: None,
        }
    }

    pub fn with_pin(mut self, pin: Pin) -> Self {
        self.pin = Some(pin);
        self
    }

    /// Deterministic cache identifier, `"{name}-{version}"`.
    ///
    /// `None` when the name is empty or the [`UNKNOWN_NAME`] marker.
    pub fn cache_key(&self) -> Option<String> {
        if self.name.is_empty() || self.name == UNKNOWN_NAME {
            None
        } else {
            Some(format!("{}-{}", self.name, self.version))
        }
    }

    /// Name of this origin's cache entry: the cache key, or the URL
    /// basename when no key can be formed.
    pub fn cache_entry_name(&self) -> String {
        self.cache_key().unwrap_or_else(|| basename(&self.url))
    }
}

/// Last path segment of a URL, with query string and fragment stripped.
pub fn basename(url: &str) -> String {
    let clean = url.split(['?', '#']).next().unwrap_or(url);
    clean
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("download")
        .to_string()
}

/// File extension of a URL's basename, including the leading dot.
///
/// Compound `.tar.*` suffixes are kept whole; an all-digit suffix (a version
/// segment like `-5.2`) does not count as an extension.
pub fn extension(url: &str) -> String {
    let name = basename(url);
    if let Some(pos) = name.find(".tar.") {
        return name[pos..].to_string();
    }
    match name.rfind('.') {
        Some(pos) if pos > 0 && name[pos + 1..].chars().any(|c| !c.is_ascii_digit()) => {
            name[pos..].to_string()
        }
        _ => String::new(),
    }
}
