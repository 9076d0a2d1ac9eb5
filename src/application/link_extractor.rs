use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::domain::DownloadOption;
use crate::utils::url_extension;

const MEDIA_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "m3u8", "ts"];

// src="..." on <video> and <source> tags
static MEDIA_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<(?:video|source)\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#)
        .expect("media src pattern is valid")
});

// href="..." on <a> tags
static ANCHOR_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']+)["']"#)
        .expect("anchor href pattern is valid")
});

/// Scan an HTML page for video files and HLS playlists.
///
/// Matches are resolved against `base_url`, deduplicated and returned
/// sorted by resolved URL. An empty result means no links were found.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<DownloadOption> {
    let candidates: BTreeSet<Url> = MEDIA_SRC_RE
        .captures_iter(html)
        .chain(ANCHOR_HREF_RE.captures_iter(html))
        .filter_map(|caps| {
            let raw = caps[1].trim();
            base_url.join(raw).ok()
        })
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .collect();

    candidates
        .into_iter()
        .filter_map(|url| {
            let extension = url_extension(&url)?;
            if !MEDIA_EXTENSIONS.contains(&extension.as_str()) {
                return None;
            }

            let option = if extension == "m3u8" {
                DownloadOption::hls(format!("HLS: {}", url), url.as_str())
            } else {
                DownloadOption::direct(
                    format!("{}: {}", extension.to_uppercase(), url),
                    url.as_str(),
                    &extension,
                )
            };
            Some(option)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OptionKind;

    fn base() -> Url {
        Url::parse("https://example.com/videos/page.html").unwrap()
    }

    #[test]
    fn test_video_src_and_anchor_href() {
        let html = r#"<html><body>
            <video src="a.mp4" controls></video>
            <a href="b.m3u8">stream</a>
        </body></html>"#;

        let options = extract_links(html, &base());
        assert_eq!(options.len(), 2);

        assert_eq!(options[0].url, "https://example.com/videos/a.mp4");
        assert_eq!(options[0].kind, OptionKind::Direct);
        assert_eq!(options[0].extension, "mp4");
        assert_eq!(options[0].mime, "video/mp4");

        assert_eq!(options[1].url, "https://example.com/videos/b.m3u8");
        assert_eq!(options[1].kind, OptionKind::Hls);
    }

    #[test]
    fn test_source_tags_dedup_and_sorted() {
        let html = r#"
            <VIDEO controls>
              <source type="video/x-matroska" src='/media/z.mkv'>
              <source src="https://cdn.example.com/clip.MOV">
            </VIDEO>
            <a class="dl" href="/media/z.mkv">again</a>
            <a href="https://cdn.example.com/seg/part1.ts?token=1">segment</a>
        "#;

        let options = extract_links(html, &base());
        let urls: Vec<&str> = options.iter().map(|o| o.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn.example.com/clip.MOV",
                "https://cdn.example.com/seg/part1.ts?token=1",
                "https://example.com/media/z.mkv",
            ]
        );
        assert_eq!(options[0].mime, "video/quicktime");
        assert_eq!(options[1].mime, "video/mp2t");
        assert_eq!(options[2].extension, "mkv");
    }

    #[test]
    fn test_ignores_non_media_links() {
        let html = r#"
            <a href="/about.html">About</a>
            <img src="poster.mp4.jpg">
            <a href="mailto:someone@example.com">Mail</a>
            <script src="player.js"></script>
        "#;

        assert!(extract_links(html, &base()).is_empty());
    }
}
