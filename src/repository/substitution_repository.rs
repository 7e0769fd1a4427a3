use std::collections::HashMap;
use std::path::Path;

use crate::m3u_checker_error::{info_err, M3uCheckerError};
use crate::utils::read_resolved_text;

/// Channel name to replacement stream url, read fresh on every use.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct SubstitutionMap {
    urls: HashMap<String, String>,
}

impl SubstitutionMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.urls.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl FromIterator<(String, String)> for SubstitutionMap {
    fn from_iter<I: IntoIterator<Item=(String, String)>>(iter: I) -> Self {
        Self { urls: iter.into_iter().collect() }
    }
}

pub fn read_substitutions(path: &Path) -> Result<SubstitutionMap, M3uCheckerError> {
    let content = read_resolved_text(path)
        .map_err(|err| info_err!("cant read substitutions file {}: {}", path.display(), err))?;
    if content.trim().is_empty() {
        return Ok(SubstitutionMap::default());
    }
    let substitutions: SubstitutionMap = serde_yaml::from_str(&content)
        .map_err(|err| info_err!("cant parse substitutions file {}: {}", path.display(), err))?;
    if let Some((name, _)) = substitutions.urls.iter().find(|(_, url)| url.trim().is_empty()) {
        return Err(info_err!("empty replacement url for '{}'", name));
    }
    Ok(substitutions)
}
