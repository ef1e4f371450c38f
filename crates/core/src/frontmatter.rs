use serde_json::Value as JsonValue;
use thiserror::Error;

/// Syntax of a frontmatter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// `---` fenced YAML.
    Yaml,
    /// `+++` fenced TOML.
    Toml,
}

impl FrontmatterFormat {
    fn fence(self) -> &'static str {
        match self {
            FrontmatterFormat::Yaml => "---",
            FrontmatterFormat::Toml => "+++",
        }
    }
}

/// Result returned after extracting frontmatter from a Markdown document.
#[derive(Debug)]
pub struct FrontmatterExtraction {
    /// Parsed frontmatter as a JSON object.
    pub value: JsonValue,
    /// Byte offset inside the original document where Markdown content begins.
    pub body_start: usize,
    /// Block syntax, `None` when the document has no frontmatter.
    pub format: Option<FrontmatterFormat>,
}

impl FrontmatterExtraction {
    fn empty() -> Self {
        Self {
            value: JsonValue::Object(Default::default()),
            body_start: 0,
            format: None,
        }
    }

    /// Returns the Markdown body that follows the frontmatter block.
    pub fn body<'a>(&self, input: &'a str) -> &'a str {
        &input[self.body_start..]
    }

    /// Looks up a top-level string field.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(JsonValue::as_str)
    }
}

/// Errors emitted while parsing or extracting frontmatter.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Unclosed fence (e.g., missing terminating `---`).
    #[error("Unterminated frontmatter block: expected closing '{0}'")]
    Unterminated(&'static str),
    /// YAML or TOML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level node was not a mapping.
    #[error("Frontmatter must be a mapping at the top level")]
    InvalidRootType,
}

/// Extracts YAML (`---`) or TOML (`+++`) frontmatter from an input document.
pub fn extract_frontmatter(input: &str) -> Result<FrontmatterExtraction, FrontmatterError> {
    match find_block(input)? {
        Some((format, block, body_start)) => {
            let value = match format {
                FrontmatterFormat::Yaml => parse_yaml_block(block)?,
                FrontmatterFormat::Toml => parse_toml_block(block)?,
            };
            Ok(FrontmatterExtraction {
                value,
                body_start,
                format: Some(format),
            })
        }
        None => Ok(FrontmatterExtraction::empty()),
    }
}

fn parse_yaml_block(block: &str) -> Result<JsonValue, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(JsonValue::Object(Default::default()));
    }

    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|err| FrontmatterError::Parse(err.to_string()))?;

    match json_value {
        JsonValue::Null => Ok(JsonValue::Object(Default::default())),
        JsonValue::Object(_) => Ok(json_value),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

fn parse_toml_block(block: &str) -> Result<JsonValue, FrontmatterError> {
    // TOML documents are always tables, so there is no root-type check.
    let table: toml::Table =
        toml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    serde_json::to_value(table).map_err(|err| FrontmatterError::Parse(err.to_string()))
}

/// Finds the frontmatter block, returning its format, raw text and the body offset.
fn find_block(input: &str) -> Result<Option<(FrontmatterFormat, &str, usize)>, FrontmatterError> {
    let bom_len = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };

    let mut cursor = bom_len;
    while let Some((line, next_cursor)) = next_line(input, cursor) {
        if line.trim().is_empty() {
            cursor = next_cursor;
            continue;
        }

        let format = match fence_format(line) {
            Some(format) => format,
            None => return Ok(None),
        };

        let block_start = next_cursor;
        let mut scan_cursor = next_cursor;
        while let Some((block_line, next_line_cursor)) = next_line(input, scan_cursor) {
            if fence_format(block_line) == Some(format) {
                let block = input[block_start..scan_cursor].trim_end_matches(['\r', '\n']);
                return Ok(Some((format, block, next_line_cursor)));
            }
            scan_cursor = next_line_cursor;
        }
        return Err(FrontmatterError::Unterminated(format.fence()));
    }

    Ok(None)
}

fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }

    match input[start..].find('\n') {
        Some(pos) => Some((&input[start..start + pos], start + pos + 1)),
        None => Some((&input[start..], input.len())),
    }
}

fn fence_format(line: &str) -> Option<FrontmatterFormat> {
    match line.trim_end_matches('\r') {
        "---" => Some(FrontmatterFormat::Yaml),
        "+++" => Some(FrontmatterFormat::Toml),
        _ => None,
    }
}
