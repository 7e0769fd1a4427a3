use log::debug;

use crate::m3u_checker_error::{info_err, M3uCheckerError};
use crate::model::{ChannelEntry, OrphanPolicy};
use crate::utils::{debug_if_enabled, sanitize_sensitive_info, M3U_EXTGRP, M3U_EXTINF};

#[inline]
fn token_value(it: &mut std::str::Chars) -> String {
    if it.any(|ch| ch == '"') {
        return get_value(it);
    }
    String::new()
}

fn get_value(it: &mut std::str::Chars) -> String {
    let mut result = String::with_capacity(128);
    for oc in it.by_ref() {
        if oc == '"' {
            break;
        }
        result.push(oc);
    }
    result.shrink_to_fit();
    result
}

fn token_till(it: &mut std::str::Chars, stop_char: char, start_with_alpha: bool) -> Option<String> {
    let mut result = String::with_capacity(128);
    let mut skip_non_alpha = start_with_alpha;

    for ch in it.by_ref() {
        if ch == stop_char {
            break;
        }
        if result.is_empty() && ch.is_whitespace() {
            continue;
        }
        if skip_non_alpha {
            if ch.is_alphabetic() {
                skip_non_alpha = false;
            } else {
                continue;
            }
        }
        result.push(ch);
    }

    if result.is_empty() {
        None
    } else {
        result.shrink_to_fit();
        Some(result)
    }
}

/// Consumes the duration (`-1`, `0`, `3.5`) following `#EXTINF:`.
fn skip_duration(it: &mut std::iter::Peekable<std::str::Chars>) {
    while it.next_if(|c| *c == '-' || *c == '+' || *c == '.' || c.is_ascii_digit()).is_some() {}
}

#[derive(Debug, Default)]
struct EntryHeader {
    name: String,
    tvg_name: String,
    group: String,
    logo: String,
}

macro_rules! process_header_fields {
    ($header:expr, $token:expr, $(($prop:ident, $field:expr)),*; $val:expr) => {
        match $token {
            $(
               $field => $header.$prop = $val,
             )*
            _ => {}
        }
    };
}

/// Extracts attributes and the display name from an `#EXTINF` line.
/// The name is everything after the last comma.
fn process_header(content: &str) -> EntryHeader {
    let (attributes, name) = content.rsplit_once(',').map_or((content, ""), |(attrs, name)| (attrs, name.trim()));
    let mut header = EntryHeader { name: name.to_string(), ..EntryHeader::default() };

    let mut it = attributes.chars();
    let line_token = token_till(&mut it, ':', false);
    if line_token.as_deref() == Some(M3U_EXTINF) {
        let mut peekable = it.peekable();
        skip_duration(&mut peekable);
        let rest: String = peekable.collect();
        let mut it = rest.chars();
        while let Some(token) = token_till(&mut it, '=', true) {
            let value = token_value(&mut it);
            process_header_fields!(header, token.to_lowercase().as_str(),
                (group, "group-title"),
                (logo, "tvg-logo"),
                (tvg_name, "tvg-name"); value);
        }
    }

    if header.name.is_empty() && !header.tvg_name.is_empty() {
        header.name.clone_from(&header.tvg_name);
    }
    header
}

fn handle_orphan(line_no: usize, policy: OrphanPolicy) -> Result<(), M3uCheckerError> {
    match policy {
        OrphanPolicy::Drop => {
            debug!("metadata at line {line_no} has no stream url, dropped");
            Ok(())
        }
        OrphanPolicy::Reject => Err(info_err!("metadata at line {} has no stream url", line_no)),
    }
}

/// Zero based line numbers of an entry, from its `#EXTINF` line to its url line.
/// Directives in between (`#EXTVLCOPT`, `#EXTGRP`, ...) belong to the entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineSpan {
    pub first: usize,
    pub url: usize,
}

/// Walks the playlist lines and hands every complete entry with its line span to `visit`.
pub fn consume_m3u<'a, I, F: FnMut(ChannelEntry, LineSpan)>(lines: I, orphan_policy: OrphanPolicy, mut visit: F) -> Result<(), M3uCheckerError>
where
    I: Iterator<Item=&'a str>,
{
    let mut header: Option<(usize, &str)> = None;
    let mut group: Option<&str> = None;

    for (idx, raw_line) in lines.enumerate() {
        let line = raw_line.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with(M3U_EXTINF) {
            if let Some((first, _)) = header {
                handle_orphan(first + 1, orphan_policy)?;
            }
            header = Some((idx, line));
            continue;
        }
        if line.starts_with(M3U_EXTGRP) {
            group = line.split_once(':').map(|(_, g)| g.trim());
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        if let Some((first, header_value)) = header.take() {
            let fields = process_header(header_value);
            if fields.name.is_empty() {
                debug!("metadata at line {} has no name, skipped", first + 1);
            } else {
                let category = if fields.group.is_empty() { group } else { Some(fields.group.as_str()) };
                visit(ChannelEntry::new(&fields.name, category, Some(fields.logo.as_str()), line), LineSpan { first, url: idx });
            }
        } else {
            debug_if_enabled!("url without metadata skipped: {}", sanitize_sensitive_info(line));
        }
        group = None;
    }

    if let Some((first, _)) = header {
        handle_orphan(first + 1, orphan_policy)?;
    }
    Ok(())
}

pub fn parse_m3u(text: &str, orphan_policy: OrphanPolicy) -> Result<Vec<ChannelEntry>, M3uCheckerError> {
    let mut entries = vec![];
    consume_m3u(text.lines(), orphan_policy, |entry, _| entries.push(entry))?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use crate::model::{ChannelEntry, OrphanPolicy};
    use crate::processing::parser::m3u::{consume_m3u, parse_m3u, process_header, LineSpan};

    const PLAYLIST: &str = r#"#EXTM3U
#EXTINF:-1 group-title="Haber" tvg-logo="https://logo/ntv.png",NTV
https://dogus-live.daioncdn.net/ntv/ntv.m3u8

#EXTINF:-1 tvg-name="TRT 1" group-title="TRT",TRT 1 HD
https://tv-trt1.medya.trt.com.tr/master.m3u8
"#;

    #[test]
    fn test_parse_entries() {
        let entries = parse_m3u(PLAYLIST, OrphanPolicy::Drop).unwrap();
        assert_eq!(entries, vec![
            ChannelEntry::new("NTV", Some("Haber"), Some("https://logo/ntv.png"), "https://dogus-live.daioncdn.net/ntv/ntv.m3u8"),
            ChannelEntry::new("TRT 1 HD", Some("TRT"), None, "https://tv-trt1.medya.trt.com.tr/master.m3u8"),
        ]);
    }

    #[test]
    fn test_header_name_after_last_comma() {
        let header = process_header(r#"#EXTINF:-1 group-title="Spor, Yerli",A Spor"#);
        assert_eq!(header.group, "Spor, Yerli");
        assert_eq!(header.name, "A Spor");
    }

    #[test]
    fn test_missing_attributes_default() {
        let entries = parse_m3u("#EXTINF:-1,Kanal D\r\nhttps://x/kanald.m3u8\r\n", OrphanPolicy::Drop).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, "Uncategorized");
        assert_eq!(entries[0].logo_url, None);
    }

    #[test]
    fn test_extgrp_category() {
        let entries = parse_m3u("#EXTINF:-1,Show TV\n#EXTGRP:Ana Kanal\nhttps://x/show.m3u8\n", OrphanPolicy::Drop).unwrap();
        assert_eq!(entries[0].category, "Ana Kanal");
    }

    #[test]
    fn test_tvg_name_fallback_and_nameless_skip() {
        let text = "#EXTINF:-1 tvg-name=\"Star TV\",\nhttps://x/star.m3u8\n#EXTINF:-1,\nhttps://x/none.m3u8\n";
        let entries = parse_m3u(text, OrphanPolicy::Drop).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Star TV");
    }

    #[test]
    fn test_orphan_metadata_dropped() {
        let text = "#EXTM3U\n#EXTINF:-1,Orphan\n#EXTINF:-1,Kept\nhttps://x/kept.m3u8\n#EXTINF:-1,Trailing\n";
        let entries = parse_m3u(text, OrphanPolicy::Drop).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Kept");
    }

    #[test]
    fn test_orphan_metadata_rejected() {
        let err = parse_m3u("#EXTINF:-1,Orphan\n#EXTINF:-1,Kept\nhttps://x/kept.m3u8\n", OrphanPolicy::Reject).unwrap_err();
        assert!(err.message.contains("line 1"));
        assert!(parse_m3u("#EXTINF:-1,Kept\nhttps://x/kept.m3u8\n#EXTINF:-1,Trailing", OrphanPolicy::Reject).is_err());
    }

    #[test]
    fn test_url_without_metadata_and_comments_ignored() {
        let text = "#EXTM3U\nhttps://x/bare.m3u8\n#EXTINF:-1,A\n#EXTVLCOPT:http-user-agent=x\nhttps://x/a.m3u8\n";
        let entries = parse_m3u(text, OrphanPolicy::Drop).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].stream_url, "https://x/a.m3u8");
    }

    #[test]
    fn test_line_spans() {
        let text = "#EXTM3U url-tvg=\"https://epg/tr.xml\"\n#EXTINF:-1 tvg-id=\"ntv.tr\",NTV\n#EXTVLCOPT:http-referrer=https://ntv.com.tr\nhttps://x/ntv.m3u8\n\n#EXTINF:-1,TRT 1\nhttps://x/trt1.m3u8\n";
        let mut spans = vec![];
        consume_m3u(text.lines(), OrphanPolicy::Reject, |entry, span| spans.push((entry.name, span))).unwrap();
        assert_eq!(spans, vec![
            ("NTV".to_string(), LineSpan { first: 1, url: 3 }),
            ("TRT 1".to_string(), LineSpan { first: 5, url: 6 }),
        ]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_m3u("", OrphanPolicy::Reject).unwrap().is_empty());
    }
}
