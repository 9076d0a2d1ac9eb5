//! Line-oriented M3U8 parsing.
//!
//! Lines starting with `#` are tags; every other non-empty line is a URI
//! resolved against the playlist's own URL. A playlist containing any
//! `#EXT-X-STREAM-INF` tag is treated as a master playlist.

use url::Url;

const STREAM_INF_TAG: &str = "#EXT-X-STREAM-INF";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub uri: Url,
    pub resolution: Option<String>,
    pub bandwidth: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playlist {
    Master(Vec<Variant>),
    Media(Vec<Url>),
}

impl Playlist {
    pub fn parse(content: &str, base: &Url) -> Self {
        let mut variants = Vec::new();
        let mut segments = Vec::new();
        let mut pending: Option<(Option<String>, Option<u64>)> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(attributes) = line.strip_prefix(STREAM_INF_TAG) {
                let attributes = attributes.strip_prefix(':').unwrap_or(attributes);
                pending = Some((
                    attribute(attributes, "RESOLUTION"),
                    attribute(attributes, "BANDWIDTH").and_then(|b| b.parse().ok()),
                ));
                continue;
            }

            if line.starts_with('#') {
                continue;
            }

            let uri = match base.join(line) {
                Ok(uri) => uri,
                Err(e) => {
                    warn!("Skipping unresolvable playlist entry {:?}: {}", line, e);
                    pending = None;
                    continue;
                }
            };

            match pending.take() {
                Some((resolution, bandwidth)) => variants.push(Variant {
                    uri,
                    resolution,
                    bandwidth,
                }),
                None => segments.push(uri),
            }
        }

        if variants.is_empty() {
            Playlist::Media(segments)
        } else {
            Playlist::Master(variants)
        }
    }

    /// Variant with the highest declared bandwidth, for master playlists
    pub fn best_variant(&self) -> Option<&Variant> {
        match self {
            Playlist::Master(variants) => variants
                .iter()
                .max_by_key(|v| v.bandwidth.unwrap_or(0)),
            Playlist::Media(_) => None,
        }
    }
}

/// Look up `name` in an attribute list such as
/// `BANDWIDTH=1280000,CODECS="avc1.4d401f,mp4a.40.2",RESOLUTION=1280x720`.
/// Commas inside quoted values do not split attributes.
fn attribute(list: &str, name: &str) -> Option<String> {
    let mut in_quotes = false;
    let mut start = 0;
    let mut parts = Vec::new();

    for (i, c) in list.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);

    parts.into_iter().find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        if key.trim().eq_ignore_ascii_case(name) {
            Some(value.trim().trim_matches('"').to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://cdn.example.com/live/master.m3u8").unwrap()
    }

    #[test]
    fn test_parse_master_playlist() {
        let content = "#EXTM3U\n\
            #EXT-X-STREAM-INF:BANDWIDTH=800000,CODECS=\"avc1.4d401e,mp4a.40.2\",RESOLUTION=640x360\n\
            360p/index.m3u8\n\
            #EXT-X-STREAM-INF:BANDWIDTH=2500000,RESOLUTION=1280x720\n\
            https://other.example.com/720p.m3u8\n";

        let playlist = Playlist::parse(content, &base());
        let Playlist::Master(variants) = &playlist else {
            panic!("expected master playlist, got {:?}", playlist);
        };

        assert_eq!(variants.len(), 2);
        assert_eq!(
            variants[0].uri.as_str(),
            "https://cdn.example.com/live/360p/index.m3u8"
        );
        assert_eq!(variants[0].resolution.as_deref(), Some("640x360"));
        assert_eq!(variants[0].bandwidth, Some(800_000));
        assert_eq!(variants[1].uri.as_str(), "https://other.example.com/720p.m3u8");
        assert_eq!(
            playlist.best_variant().map(|v| v.uri.as_str()),
            Some("https://other.example.com/720p.m3u8")
        );
    }

    #[test]
    fn test_parse_media_playlist() {
        let content = "#EXTM3U\n#EXT-X-TARGETDURATION:10\n\n#EXTINF:9.9,\nseg0.ts\n#EXTINF:9.9,\n/abs/seg1.ts\n#EXT-X-ENDLIST\n";

        let playlist = Playlist::parse(content, &base());
        assert_eq!(
            playlist,
            Playlist::Media(vec![
                Url::parse("https://cdn.example.com/live/seg0.ts").unwrap(),
                Url::parse("https://cdn.example.com/abs/seg1.ts").unwrap(),
            ])
        );
        assert!(playlist.best_variant().is_none());
    }

    #[test]
    fn test_variant_without_resolution() {
        let content = "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=64000\naudio.m3u8\n";
        let Playlist::Master(variants) = Playlist::parse(content, &base()) else {
            panic!("expected master playlist");
        };
        assert_eq!(variants.len(), 1);
        assert!(variants[0].resolution.is_none());
    }

    #[test]
    fn test_attribute_ignores_commas_in_quotes() {
        let list = "CODECS=\"avc1.64001f,mp4a.40.2\",RESOLUTION=1920x1080,BANDWIDTH=5000000";
        assert_eq!(attribute(list, "RESOLUTION").as_deref(), Some("1920x1080"));
        assert_eq!(
            attribute(list, "CODECS").as_deref(),
            Some("avc1.64001f,mp4a.40.2")
        );
        assert!(attribute(list, "FRAME-RATE").is_none());
    }
}
