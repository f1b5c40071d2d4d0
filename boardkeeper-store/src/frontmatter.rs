//! YAML frontmatter codec for record files
//!
//! A record file is a `---` line, a YAML header, a closing `---` line and a
//! free-form markdown body:
//!
//! ```markdown
//! ---
//! id: T-000001
//! title: Write the parser
//! ---
//! Body text goes here.
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

const DELIMITER: &str = "---";

/// Why a record file could not be decoded or encoded
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// The file does not start with a delimiter line
    #[error("invalid frontmatter: missing opening '---'")]
    MissingOpening,

    /// The header block is never closed
    #[error("invalid frontmatter: header block is not closed")]
    Unclosed,

    /// The header is not valid YAML for the expected fields
    #[error("invalid header: {0}")]
    InvalidHeader(#[source] serde_yaml_ng::Error),

    /// The header could not be serialized
    #[error("cannot render header: {0}")]
    Render(#[source] serde_yaml_ng::Error),
}

/// Parsed header and body
#[derive(Debug, Clone, PartialEq)]
pub struct Document<H> {
    pub header: H,
    pub body: String,
}

/// Split a record into its decoded header and body
///
/// The one trailing newline [`render`] always appends is stripped again, so
/// rendering a parsed document reproduces the original bytes.
pub fn parse<H: DeserializeOwned>(text: &str) -> Result<Document<H>, FrontmatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let (first, mut rest) = split_line(text);
    if first.trim_end() != DELIMITER {
        return Err(FrontmatterError::MissingOpening);
    }

    let header_start = text.len() - rest.len();
    loop {
        if rest.is_empty() {
            return Err(FrontmatterError::Unclosed);
        }
        let line_start = text.len() - rest.len();
        let (line, after) = split_line(rest);
        if line.trim_end() == DELIMITER {
            let header_text = &text[header_start..line_start];
            let header = if header_text.trim().is_empty() {
                serde_yaml_ng::from_str("{}")
            } else {
                serde_yaml_ng::from_str(header_text)
            }
            .map_err(FrontmatterError::InvalidHeader)?;

            let body = after
                .strip_suffix("\r\n")
                .or_else(|| after.strip_suffix('\n'))
                .unwrap_or(after);
            return Ok(Document {
                header,
                body: body.to_string(),
            });
        }
        rest = after;
    }
}

/// Render a header and body into record text, always ending with a newline
pub fn render<H: Serialize>(header: &H, body: &str) -> Result<String, FrontmatterError> {
    let yaml = serde_yaml_ng::to_string(header).map_err(FrontmatterError::Render)?;

    let mut out = String::with_capacity(yaml.len() + body.len() + 10);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(body);
    out.push('\n');
    Ok(out)
}

/// Split off the first line, returning it without its `\n` and the remainder
fn split_line(text: &str) -> (&str, &str) {
    match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    }
}
