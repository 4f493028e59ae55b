use thiserror::Error;
use url::Url;

/// A Figma file key plus an optional node id, from a URL or a bare key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigmaTarget {
    pub file_key: String,
    pub node_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum ResourceParseError {
    #[error("Invalid URL '{value}': {message}. Hint: include http(s):// and ensure the URL is well-formed.")]
    InvalidUrl { value: String, message: String },
    #[error("Figma URL missing file key in '{url}'. Hint: use https://www.figma.com/design/<FILE_KEY>/... and node-id if needed.")]
    FigmaMissingFileKey { url: String },
    #[error("Not a Figma URL: '{url}'.")]
    NotFigma { url: String },
    #[error("Invalid file key '{value}'. Hint: pass the key from the file URL or the whole URL.")]
    InvalidFileKey { value: String },
}

/// Parse `--file-key`: either a Figma URL or a bare file key.
pub fn parse_figma_target(value: &str) -> Result<FigmaTarget, ResourceParseError> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        return parse_figma_url(value);
    }

    if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ResourceParseError::InvalidFileKey {
            value: value.to_string(),
        });
    }

    Ok(FigmaTarget {
        file_key: value.to_string(),
        node_id: None,
    })
}

pub fn parse_figma_url(value: &str) -> Result<FigmaTarget, ResourceParseError> {
    let url = Url::parse(value).map_err(|e| ResourceParseError::InvalidUrl {
        value: value.to_string(),
        message: e.to_string(),
    })?;

    let host = url.host_str().unwrap_or("");
    if host != "figma.com" && !host.ends_with(".figma.com") {
        return Err(ResourceParseError::NotFigma {
            url: value.to_string(),
        });
    }

    let path_segments: Vec<&str> = url.path_segments().map(|c| c.collect()).unwrap_or_default();

    let file_key = path_segments
        .iter()
        .position(|&s| s == "file" || s == "design")
        .and_then(|i| path_segments.get(i + 1))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| ResourceParseError::FigmaMissingFileKey {
            url: value.to_string(),
        })?;

    Ok(FigmaTarget {
        file_key,
        node_id: url
            .query_pairs()
            .find(|(k, _)| k == "node-id")
            .map(|(_, v)| normalize_node_id(&v)),
    })
}

/// URL node ids use `-` where the API uses `:`.
pub fn normalize_node_id(id: &str) -> String {
    id.trim().replace('-', ":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_figma_file_url() {
        let url = "https://www.figma.com/file/ABC123/My-Design?node-id=12-34";
        let target = parse_figma_target(url).unwrap();
        assert_eq!(target.file_key, "ABC123");
        assert_eq!(target.node_id, Some("12:34".to_string()));
    }

    #[test]
    fn test_parse_figma_design_url() {
        let url = "https://www.figma.com/design/XYZ789/Another-Design?node-id=5-10&t=abc";
        let target = parse_figma_target(url).unwrap();
        assert_eq!(target.file_key, "XYZ789");
        assert_eq!(target.node_id, Some("5:10".to_string()));
    }

    #[test]
    fn test_parse_figma_url_no_node_id() {
        let target = parse_figma_target("https://www.figma.com/file/ABC123/My-Design").unwrap();
        assert_eq!(target.file_key, "ABC123");
        assert!(target.node_id.is_none());
    }

    #[test]
    fn test_bare_file_key() {
        let target = parse_figma_target("ABC123").unwrap();
        assert_eq!(target.file_key, "ABC123");
        assert!(target.node_id.is_none());
    }

    #[test]
    fn test_missing_file_key() {
        let res = parse_figma_target("https://www.figma.com/files/recent");
        assert!(matches!(
            res,
            Err(ResourceParseError::FigmaMissingFileKey { .. })
        ));
    }

    #[test]
    fn test_non_figma_url_rejected() {
        let res = parse_figma_target("https://example.com/file/ABC123");
        assert!(matches!(res, Err(ResourceParseError::NotFigma { .. })));
    }

    #[test]
    fn test_lookalike_host_rejected() {
        let res = parse_figma_target("https://notfigma.com/file/ABC123");
        assert!(matches!(res, Err(ResourceParseError::NotFigma { .. })));
        assert!(parse_figma_target("https://figma.com/design/ABC123/x").is_ok());
    }

    #[test]
    fn test_invalid_bare_key() {
        assert!(parse_figma_target("not a key").is_err());
        assert!(parse_figma_target("").is_err());
    }

    #[test]
    fn test_node_id_normalization() {
        assert_eq!(normalize_node_id("1-2"), "1:2");
        assert_eq!(normalize_node_id("1:2"), "1:2");
    }
}
