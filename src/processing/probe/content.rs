use crate::model::ProbeConfig;

/// Named check on a fetched manifest body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPredicate {
    HasManifestMarker(Vec<String>),
    HasSegmentSuffixLines(Vec<String>),
}

impl ContentPredicate {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HasManifestMarker(_) => "hasManifestMarker",
            Self::HasSegmentSuffixLines(_) => "hasSegmentSuffixLines",
        }
    }

    pub fn test(&self, body: &str) -> bool {
        match self {
            Self::HasManifestMarker(markers) => markers.iter().any(|marker| body.contains(marker.as_str())),
            Self::HasSegmentSuffixLines(suffixes) => body.lines()
                .map(|line| line.trim().split(['?', '#']).next().unwrap_or_default())
                .filter(|line| !line.is_empty())
                .any(|line| suffixes.iter().any(|suffix| line.ends_with(suffix.as_str()))),
        }
    }
}

/// Predicates evaluated in order, the first hit verifies the content.
#[derive(Debug, Clone)]
pub struct ContentRules {
    predicates: Vec<ContentPredicate>,
}

impl ContentRules {
    pub const fn new(predicates: Vec<ContentPredicate>) -> Self {
        Self { predicates }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(vec![
            ContentPredicate::HasManifestMarker(config.manifest_markers.clone()),
            ContentPredicate::HasSegmentSuffixLines(config.segment_suffixes.clone()),
        ])
    }

    /// Name of the first matching predicate.
    pub fn verify(&self, body: &str) -> Option<&'static str> {
        self.predicates.iter().find(|p| p.test(body)).map(ContentPredicate::name)
    }
}
