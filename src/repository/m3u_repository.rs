use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;

use crate::m3u_checker_error::{notify_err, M3uCheckerError};
use crate::model::{ChannelEntry, OrphanPolicy};
use crate::processing::parser::{consume_m3u, parse_m3u, LineSpan};
use crate::utils::{backup_file_path, write_atomic, M3U_EXTINF, M3U_HEADER};

macro_rules! cant_write_result {
    ($path:expr, $err:expr) => {
        notify_err!("failed to write {}: {}", $path.display(), $err)
    }
}

pub fn entry_to_m3u(entry: &ChannelEntry) -> String {
    let mut line = format!("{M3U_EXTINF}:-1 group-title=\"{}\"", entry.category);
    if let Some(logo) = entry.logo_url.as_ref() {
        let _ = write!(line, " tvg-logo=\"{logo}\"");
    }
    format!("{line},{}\n{}", entry.name, entry.stream_url)
}

/// Header line followed by metadata and url line per entry, in input order.
pub fn serialize_m3u(entries: &[ChannelEntry]) -> String {
    let mut content = String::with_capacity(entries.len() * 160 + M3U_HEADER.len() + 1);
    content.push_str(M3U_HEADER);
    content.push('\n');
    for entry in entries {
        content.push_str(&entry_to_m3u(entry));
        content.push('\n');
    }
    content
}

/// Playlist text with the line span of every parsed entry. Lines outside the
/// spans (header attributes, comments, dropped metadata) and all directives
/// inside a span are written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDocument {
    lines: Vec<String>,
    entries: Vec<(ChannelEntry, LineSpan)>,
}

impl PlaylistDocument {
    pub fn parse(text: &str, orphan_policy: OrphanPolicy) -> Result<Self, M3uCheckerError> {
        let mut entries = vec![];
        consume_m3u(text.lines(), orphan_policy, |entry, span| entries.push((entry, span)))?;
        Ok(Self { lines: text.lines().map(ToString::to_string).collect(), entries })
    }

    pub fn entries(&self) -> Vec<ChannelEntry> {
        self.entries.iter().map(|(entry, _)| entry.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes the lines of every entry whose index is rejected by `keep`.
    /// Returns the number of removed entries.
    pub fn retain_entries<F: Fn(usize) -> bool>(&mut self, keep: F) -> usize {
        let mut dropped = vec![false; self.lines.len()];
        let before = self.entries.len();
        let mut index = 0;
        self.entries.retain(|(_, span)| {
            let kept = keep(index);
            index += 1;
            if !kept {
                dropped[span.first..=span.url].fill(true);
            }
            kept
        });

        let mut moved_to = vec![0; self.lines.len()];
        let mut lines = Vec::with_capacity(self.lines.len());
        for (idx, line) in std::mem::take(&mut self.lines).into_iter().enumerate() {
            moved_to[idx] = lines.len();
            if !dropped[idx] {
                lines.push(line);
            }
        }
        for (_, span) in &mut self.entries {
            span.first = moved_to[span.first];
            span.url = moved_to[span.url];
        }
        self.lines = lines;
        before - self.entries.len()
    }

    /// Points the entry at `index` to `stream_url`, only its url line changes.
    pub fn replace_url(&mut self, index: usize, stream_url: &str) -> bool {
        match self.entries.get_mut(index) {
            Some((entry, span)) => {
                *entry = entry.with_stream_url(stream_url);
                self.lines[span.url] = stream_url.to_string();
                true
            }
            None => false,
        }
    }

    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut content = self.lines.join("\n");
        content.push('\n');
        content
    }
}

/// Loads and persists the playlist file.
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    path: PathBuf,
    orphan_policy: OrphanPolicy,
}

impl PlaylistStore {
    pub fn new(path: &Path, orphan_policy: OrphanPolicy) -> Self {
        Self { path: path.to_path_buf(), orphan_policy }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw playlist text, a missing or unreadable file is an error.
    pub fn load_text(&self) -> Result<String, M3uCheckerError> {
        std::fs::read_to_string(&self.path)
            .map_err(|err| notify_err!("cant read playlist {}: {}", self.path.display(), err))
    }

    pub fn load(&self) -> Result<Vec<ChannelEntry>, M3uCheckerError> {
        let text = self.load_text()?;
        parse_m3u(&text, self.orphan_policy)
    }

    pub fn document(&self, text: &str) -> Result<PlaylistDocument, M3uCheckerError> {
        PlaylistDocument::parse(text, self.orphan_policy)
    }

    pub fn load_document(&self) -> Result<PlaylistDocument, M3uCheckerError> {
        let text = self.load_text()?;
        self.document(&text)
    }

    /// Writes a playlist built from `entries` alone, see [`serialize_m3u`].
    pub fn save(&self, entries: &[ChannelEntry]) -> Result<(), M3uCheckerError> {
        self.write_text(&serialize_m3u(entries), entries.len())
    }

    pub fn save_document(&self, document: &PlaylistDocument) -> Result<(), M3uCheckerError> {
        self.write_text(&document.render(), document.len())
    }

    fn write_text(&self, content: &str, channels: usize) -> Result<(), M3uCheckerError> {
        write_atomic(&self.path, content.as_bytes())
            .map_err(|err| cant_write_result!(self.path, err))?;
        info!("playlist {} written with {} channels", self.path.display(), channels);
        Ok(())
    }

    /// Writes `content` as timestamped copy of the playlist into `backup_dir`.
    pub fn backup(&self, content: &str, backup_dir: &Path, timestamp: &DateTime<Utc>) -> Result<PathBuf, M3uCheckerError> {
        let backup_path = backup_file_path(&self.path, backup_dir, timestamp);
        write_atomic(&backup_path, content.as_bytes())
            .map_err(|err| cant_write_result!(backup_path, err))?;
        info!("backup written to {}", backup_path.display());
        Ok(backup_path)
    }
}
