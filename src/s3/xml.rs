//! S3 XML document scanning and generation helpers.
//!
//! The configuration documents handled by strongbox are small and flat, so they are
//! read with a minimal element scanner instead of a full XML parser. The scanner is
//! strict about structure (a single root, balanced elements) and lenient about
//! content it does not need (declarations, comments, attributes, namespace prefixes
//! and unknown elements).

use thiserror::Error;

/// The S3 document namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Error type for XML scanning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlParseError {
    #[error("Invalid XML format: {0}")]
    InvalidFormat(String),

    #[error("Unexpected root element: expected <{expected}>, found <{found}>")]
    UnexpectedRoot { expected: String, found: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for <{field}>: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<XmlParseError> for crate::error::StrongboxError {
    fn from(e: XmlParseError) -> Self {
        crate::error::StrongboxError::Decode(e.to_string())
    }
}

/// An element found by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlElement<'a> {
    /// Local element name (namespace prefix stripped).
    pub name: &'a str,
    /// Raw content between the start and end tags.
    pub content: &'a str,
}

impl<'a> XmlElement<'a> {
    /// Direct child elements of this element, in document order.
    pub fn children(&self) -> Result<Vec<XmlElement<'a>>, XmlParseError> {
        child_elements(self.content)
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Result<Option<XmlElement<'a>>, XmlParseError> {
        Ok(self.children()?.into_iter().find(|c| c.name == name))
    }

    /// All direct children with the given local name.
    pub fn children_named(&self, name: &str) -> Result<Vec<XmlElement<'a>>, XmlParseError> {
        Ok(self
            .children()?
            .into_iter()
            .filter(|c| c.name == name)
            .collect())
    }

    /// Unescaped text of a leaf element, surrounding whitespace included.
    pub fn text(&self) -> Result<String, XmlParseError> {
        let content = self.content;
        if let Some(cdata) = content
            .trim()
            .strip_prefix("<![CDATA[")
            .and_then(|rest| rest.strip_suffix("]]>"))
        {
            return Ok(cdata.to_string());
        }
        if content.contains('<') {
            return Err(XmlParseError::InvalidValue {
                field: self.name.to_string(),
                reason: "expected text content".to_string(),
            });
        }
        Ok(xml_unescape(content))
    }

    /// Text of an optional child element.
    pub fn child_text(&self, name: &str) -> Result<Option<String>, XmlParseError> {
        self.child(name)?.map(|c| c.text()).transpose()
    }

    /// Trimmed text of an optional child element, for enumerations, dates and flags.
    pub fn child_token(&self, name: &str) -> Result<Option<String>, XmlParseError> {
        Ok(self.child_text(name)?.map(|t| t.trim().to_string()))
    }
}

/// Locate the root element of a document and check its name.
pub fn root_element<'a>(xml: &'a str, expected: &str) -> Result<XmlElement<'a>, XmlParseError> {
    let rest = skip_misc(xml)?;
    if rest.is_empty() {
        return Err(XmlParseError::InvalidFormat("empty document".to_string()));
    }
    if !rest.starts_with('<') {
        return Err(XmlParseError::InvalidFormat("document does not start with an element".to_string()));
    }

    let (element, remainder) = next_element(rest)?;
    if !skip_misc(remainder)?.is_empty() {
        return Err(XmlParseError::InvalidFormat(
            "unexpected content after root element".to_string(),
        ));
    }
    if element.name != expected {
        return Err(XmlParseError::UnexpectedRoot {
            expected: expected.to_string(),
            found: element.name.to_string(),
        });
    }
    Ok(element)
}

/// Scan the direct child elements of some element content.
fn child_elements(content: &str) -> Result<Vec<XmlElement<'_>>, XmlParseError> {
    let mut children = Vec::new();
    let mut rest = skip_misc(content)?;

    while !rest.is_empty() {
        if !rest.starts_with('<') {
            return Err(XmlParseError::InvalidFormat(
                "unexpected text between elements".to_string(),
            ));
        }
        let (element, remainder) = next_element(rest)?;
        children.push(element);
        rest = skip_misc(remainder)?;
    }

    Ok(children)
}

/// Skip whitespace, declarations, processing instructions and comments.
fn skip_misc(mut s: &str) -> Result<&str, XmlParseError> {
    loop {
        s = s.trim_start();
        if s.starts_with("<?") {
            let end = s
                .find("?>")
                .ok_or_else(|| XmlParseError::InvalidFormat("unterminated declaration".to_string()))?;
            s = &s[end + 2..];
        } else if s.starts_with("<!--") {
            let end = s
                .find("-->")
                .ok_or_else(|| XmlParseError::InvalidFormat("unterminated comment".to_string()))?;
            s = &s[end + 3..];
        } else {
            return Ok(s);
        }
    }
}

/// Parse the element starting at `s[0] == '<'`, returning it and the remaining input.
fn next_element(s: &str) -> Result<(XmlElement<'_>, &str), XmlParseError> {
    let tag_end = s
        .find('>')
        .ok_or_else(|| XmlParseError::InvalidFormat("unterminated start tag".to_string()))?;
    let tag = &s[1..tag_end];
    if tag.starts_with('/') || tag.starts_with('!') {
        return Err(XmlParseError::InvalidFormat(format!("unexpected tag <{}>", tag)));
    }

    let self_closing = tag.ends_with('/');
    let qualified = tag
        .trim_end_matches('/')
        .split(|c: char| c.is_whitespace())
        .next()
        .unwrap_or_default();
    if qualified.is_empty() {
        return Err(XmlParseError::InvalidFormat("element without a name".to_string()));
    }
    let name = local_name(qualified);
    let after_start = &s[tag_end + 1..];

    if self_closing {
        return Ok((XmlElement { name, content: "" }, after_start));
    }

    let (content_len, close_len) = find_close(after_start, qualified)?;
    Ok((
        XmlElement {
            name,
            content: &after_start[..content_len],
        },
        &after_start[content_len + close_len..],
    ))
}

/// Find the end tag matching `qualified`, accounting for nested elements of the same
/// name. Returns the content length and the length of the end tag.
fn find_close(s: &str, qualified: &str) -> Result<(usize, usize), XmlParseError> {
    let mut depth = 0usize;
    let mut pos = 0usize;

    while let Some(offset) = s[pos..].find('<') {
        let start = pos + offset;
        let rest = &s[start..];

        if rest.starts_with("<!--") {
            let end = rest
                .find("-->")
                .ok_or_else(|| XmlParseError::InvalidFormat("unterminated comment".to_string()))?;
            pos = start + end + 3;
            continue;
        }
        if rest.starts_with("<![CDATA[") {
            let end = rest
                .find("]]>")
                .ok_or_else(|| XmlParseError::InvalidFormat("unterminated CDATA".to_string()))?;
            pos = start + end + 3;
            continue;
        }

        let end = rest
            .find('>')
            .ok_or_else(|| XmlParseError::InvalidFormat("unterminated tag".to_string()))?;
        let tag = &rest[1..end];

        if let Some(closing) = tag.strip_prefix('/') {
            if closing.trim() == qualified {
                if depth == 0 {
                    return Ok((start, end + 1));
                }
                depth -= 1;
            }
        } else if !tag.ends_with('/') {
            let name = tag.split(|c: char| c.is_whitespace()).next().unwrap_or_default();
            if name == qualified {
                depth += 1;
            }
        }
        pos = start + end + 1;
    }

    Err(XmlParseError::InvalidFormat(format!(
        "missing end tag </{}>",
        qualified
    )))
}

fn local_name(qualified: &str) -> &str {
    qualified
        .rsplit_once(':')
        .map(|(_, local)| local)
        .unwrap_or(qualified)
}

/// Escape special XML characters.
pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Reverse [`xml_escape`].
pub fn xml_unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Fields of an S3 `<Error>` response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDocument {
    pub code: Option<String>,
    pub message: Option<String>,
    pub resource: Option<String>,
    pub request_id: Option<String>,
    pub host_id: Option<String>,
}

/// Parse an S3 error response body.
///
/// Example input:
/// ```xml
/// <Error>
///   <Code>NoSuchObjectLockConfiguration</Code>
///   <Message>The specified object does not have a ObjectLock configuration</Message>
///   <Resource>/b/o</Resource>
///   <RequestId>17D6F1A2B3C4D5E6</RequestId>
/// </Error>
/// ```
pub fn parse_error_document(xml: &str) -> Result<ErrorDocument, XmlParseError> {
    let root = root_element(xml, "Error")?;
    Ok(ErrorDocument {
        code: root.child_token("Code")?.filter(|c| !c.is_empty()),
        message: root.child_token("Message")?,
        resource: root.child_token("Resource")?,
        request_id: root.child_token("RequestId")?,
        host_id: root.child_token("HostId")?,
    })
}
