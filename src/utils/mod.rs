use url::Url;

const DEFAULT_BASE_NAME: &str = "video";

/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Last path segment of a URL, empty when the path ends with `/`
fn url_basename(url: &Url) -> &str {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("")
}

/// Lowercased extension of the URL path, ignoring query and fragment
pub fn url_extension(url: &Url) -> Option<String> {
    let (stem, ext) = url_basename(url).rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Build a download name from the URL path basename with its extension
/// replaced by `extension`. Falls back to `video` when the basename is empty.
pub fn derive_file_name(source_url: &str, extension: &str) -> String {
    let base_name = Url::parse(source_url)
        .ok()
        .map(|url| {
            let basename = url_basename(&url);
            match basename.rsplit_once('.') {
                Some((stem, _)) => stem.to_string(),
                None => basename.to_string(),
            }
        })
        .map(|stem| sanitize_filename(&stem))
        .filter(|stem| !stem.trim_matches(|c| c == '.' || c == ' ').is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_NAME.to_string());

    format!("{}.{}", base_name, extension)
}

/// True when the payload starts like an HTML document, ignoring leading
/// whitespace and case
pub fn looks_like_html(data: &[u8]) -> bool {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let head = &data[start..];

    [b"<!doctype html".as_slice(), b"<html".as_slice()]
        .iter()
        .any(|marker| {
            head.len() >= marker.len() && head[..marker.len()].eq_ignore_ascii_case(marker)
        })
}
