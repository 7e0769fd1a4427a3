use crate::utils::DEFAULT_CATEGORY;

/// One playlist record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChannelEntry {
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub stream_url: String,
}

impl ChannelEntry {
    pub fn new(name: &str, category: Option<&str>, logo_url: Option<&str>, stream_url: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.filter(|c| !c.trim().is_empty()).unwrap_or(DEFAULT_CATEGORY).to_string(),
            logo_url: logo_url.filter(|l| !l.trim().is_empty()).map(ToString::to_string),
            stream_url: stream_url.to_string(),
        }
    }

    /// Same entry pointing to another stream.
    pub fn with_stream_url(&self, stream_url: &str) -> Self {
        Self { stream_url: stream_url.to_string(), ..self.clone() }
    }
}

/// Selection used by filtered runs, case-insensitive substring match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryFilter {
    All,
    Category(String),
    Name(String),
}

impl EntryFilter {
    pub fn matches(&self, entry: &ChannelEntry) -> bool {
        match self {
            Self::All => true,
            Self::Category(value) => entry.category.to_lowercase().contains(&value.to_lowercase()),
            Self::Name(value) => entry.name.to_lowercase().contains(&value.to_lowercase()),
        }
    }
}
