//! Input loading, markup sniffing, and XML tree access helpers.

use crate::error::ReportError;
use crate::models::ReportMeta;
use roxmltree::{Document, Node, ParsingOptions};
use std::fs;
use std::path::{Path, PathBuf};

/// Root-level container that marks a static-analysis report.
pub const CATALOG_CONTAINER: &str = "CodingStandards";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Xml,
    /// Loosely tagged HTML or plain text
    Legacy,
}

#[derive(Debug)]
/// Whole input file held in memory.
pub struct RawInput {
    pub path: PathBuf,
    pub text: String,
    pub kind: SourceKind,
}

/// Read `path` fully and decide which parser path it takes.
pub fn read_input(path: &Path) -> Result<RawInput, ReportError> {
    let bytes = fs::read(path).map_err(|source| ReportError::InputUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = String::from_utf8_lossy(&bytes);
    let text = decoded
        .strip_prefix('\u{feff}')
        .unwrap_or(&decoded)
        .to_string();
    let kind = sniff(&text);
    Ok(RawInput {
        path: path.to_path_buf(),
        text,
        kind,
    })
}

/// Element names that only appear at the top of HTML exports and fragments.
const HTML_ROOTS: &[&str] = &[
    "html", "head", "body", "table", "thead", "tbody", "tr", "td", "div", "p", "pre", "span",
    "ul", "ol", "li", "h1", "h2", "h3", "h4", "font", "center", "br",
];

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Classify text by its first element name. Comments, processing
/// instructions and doctypes ahead of it are skipped.
pub fn sniff(text: &str) -> SourceKind {
    if !text.trim_start().starts_with('<') {
        return SourceKind::Legacy;
    }
    match first_element_name(text) {
        Some(name) if !is_html_name(name) => SourceKind::Xml,
        _ => SourceKind::Legacy,
    }
}

/// Whether the text opens with an `<?xml` declaration (after a BOM strip).
pub fn declares_xml(text: &str) -> bool {
    text.trim_start().starts_with("<?xml")
}

/// A parsed root that is really an HTML page: an HTML element name or the XHTML namespace.
pub fn is_html_root(root: Node<'_, '_>) -> bool {
    root.tag_name().namespace() == Some(XHTML_NS) || is_html_name(root.tag_name().name())
}

fn is_html_name(name: &str) -> bool {
    HTML_ROOTS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

fn first_element_name(text: &str) -> Option<&str> {
    let mut head = text.trim_start();
    loop {
        let (open, close) = if head.starts_with("<!--") {
            ("<!--", "-->")
        } else if head.starts_with("<?") {
            ("<?", "?>")
        } else if head.starts_with("<!") {
            // A doctype with an internal subset ends at `]>`.
            let decl = head.find('>').map_or(head, |e| &head[..e]);
            if decl.contains('[') {
                ("<!", "]>")
            } else {
                ("<!", ">")
            }
        } else {
            break;
        };
        let end = head[open.len()..].find(close)?;
        head = head[open.len() + end + close.len()..].trim_start();
    }
    let body = head.strip_prefix('<')?;
    let end = body
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(body.len());
    let name = &body[..end];
    // Prefixed roots compare by local name.
    let local = name.rsplit_once(':').map_or(name, |(_, l)| l);
    (!local.is_empty()).then_some(local)
}

/// Parse the input as XML. DTDs are tolerated; entity definitions are not expanded beyond roxmltree's rules.
pub fn parse_xml(input: &RawInput) -> Result<Document<'_>, ReportError> {
    let mut opts = ParsingOptions::default();
    opts.allow_dtd = true;
    Document::parse_with_options(&input.text, opts).map_err(|e| ReportError::MalformedMarkup {
        path: input.path.clone(),
        message: e.to_string(),
    })
}

#[derive(Debug, Clone, Copy)]
/// A parsed XML report that carries the required catalog container.
pub struct XmlReport<'a, 'input> {
    pub root: Node<'a, 'input>,
    pub standards: Node<'a, 'input>,
}

impl<'a, 'input> XmlReport<'a, 'input> {
    pub fn open(doc: &'a Document<'input>, path: &Path) -> Result<Self, ReportError> {
        let root = doc.root_element();
        let standards =
            first_child(root, CATALOG_CONTAINER).ok_or_else(|| ReportError::Unsupported {
                path: path.to_path_buf(),
            })?;
        Ok(Self { root, standards })
    }

    /// Header metadata from root attributes, when the report generator wrote them.
    pub fn meta(&self, source: &str) -> ReportMeta {
        let attr = |name: &str| {
            self.root
                .attribute(name)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        ReportMeta {
            source: source.to_string(),
            tool: attr("toolDispName").or_else(|| attr("toolName")),
            tool_version: attr("toolVer"),
            project: attr("project"),
            session_time: attr("time"),
        }
    }
}

/// First element child with the given local name.
pub fn first_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// All element children with the given local name, in document order.
pub fn children_named<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}
