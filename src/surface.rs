use kuchiki::NodeRef;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_SIDEBAR_SELECTOR: &str = ".sidebar-item";

/// Position of a sidebar item on its surface, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId(pub usize);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Anything that can enumerate selectable sidebar items and report their text.
///
/// Activations are delivered to the relay as [`ItemId`]s by whoever owns the
/// surface; the relay reads the item's text when the activation arrives.
pub trait SidebarSurface {
    fn sidebar_items(&self) -> Vec<ItemId>;
    fn item_text(&self, item: ItemId) -> Option<String>;
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("invalid sidebar selector {0:?}")]
    Selector(String),
}

/// Canonical identifier for an item: the first line of its text, trimmed.
pub fn canonical_label(text: &str) -> &str {
    text.split('\n').next().unwrap_or_default().trim()
}

/// Sidebar items discovered in an HTML document.
#[derive(Debug, Clone, Default)]
pub struct HtmlSidebarSurface {
    selector: String,
    texts: Vec<String>,
}

impl HtmlSidebarSurface {
    pub fn from_document(document: &NodeRef, selector: &str) -> Result<Self, SurfaceError> {
        let items = document
            .select(selector)
            .map_err(|_| SurfaceError::Selector(selector.to_string()))?;
        let texts = items.map(|item| inner_text(item.as_node())).collect();
        Ok(Self {
            selector: selector.to_string(),
            texts,
        })
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

impl SidebarSurface for HtmlSidebarSurface {
    fn sidebar_items(&self) -> Vec<ItemId> {
        (0..self.texts.len()).map(ItemId).collect()
    }

    fn item_text(&self, item: ItemId) -> Option<String> {
        self.texts.get(item.0).cloned()
    }
}

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

/// Rendered text of a node, approximating the browser's `innerText`.
fn inner_text(node: &NodeRef) -> String {
    let mut out = String::new();
    for child in node.children() {
        collect_text(&child, &mut out);
    }
    out.trim_end().to_string()
}

fn collect_text(node: &NodeRef, out: &mut String) {
    if let Some(text) = node.as_text() {
        push_collapsed(out, &text.borrow());
        return;
    }
    let Some(element) = node.as_element() else {
        for child in node.children() {
            collect_text(&child, out);
        }
        return;
    };
    let name: &str = &element.name.local;
    if SKIPPED_ELEMENTS.contains(&name) {
        return;
    }
    if name == "br" {
        push_break(out);
        return;
    }
    let block = BLOCK_ELEMENTS.contains(&name);
    if block {
        push_break(out);
    }
    for child in node.children() {
        collect_text(&child, out);
    }
    if block {
        push_break(out);
    }
}

fn push_collapsed(out: &mut String, text: &str) {
    let mut pending_space = text.starts_with(char::is_whitespace);
    for word in text.split_whitespace() {
        if pending_space && !out.is_empty() && !out.ends_with(['\n', ' ']) {
            out.push(' ');
        }
        out.push_str(word);
        pending_space = true;
    }
    if text.ends_with(char::is_whitespace) && !out.is_empty() && !out.ends_with(['\n', ' ']) {
        out.push(' ');
    }
}

fn push_break(out: &mut String) {
    let trimmed = out.trim_end_matches(' ').len();
    out.truncate(trimmed);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuchiki::traits::*;

    fn parse(html: &str, selector: &str) -> Result<HtmlSidebarSurface, SurfaceError> {
        HtmlSidebarSurface::from_document(&kuchiki::parse_html().one(html), selector)
    }

    #[test]
    fn canonical_label_takes_trimmed_first_line() {
        assert_eq!(canonical_label("Health\nCoverage"), "Health");
        assert_eq!(canonical_label("  Passport  \r\nApply or renew"), "Passport");
        assert_eq!(canonical_label(""), "");
        assert_eq!(canonical_label("\nSecond"), "");
    }

    #[test]
    fn finds_items_in_document_order() {
        let html = r#"<ul>
            <li class="sidebar-item">Passport<br>Apply or renew</li>
            <li class="other">Ignored</li>
            <li class="sidebar-item"><span>Driving</span> <span>License</span></li>
        </ul>"#;
        let surface = parse(html, DEFAULT_SIDEBAR_SELECTOR).unwrap();
        assert_eq!(surface.sidebar_items(), vec![ItemId(0), ItemId(1)]);
        assert_eq!(
            surface.item_text(ItemId(0)).as_deref(),
            Some("Passport\nApply or renew")
        );
        assert_eq!(surface.item_text(ItemId(1)).as_deref(), Some("Driving License"));
        assert_eq!(surface.item_text(ItemId(2)), None);
    }

    #[test]
    fn block_children_break_lines() {
        let html = r#"<div class="sidebar-item">
              <div class="title">  Ration   Card </div>
              <p class="hint">PDS entitlement</p>
              <script>ignored()</script>
            </div>"#;
        let surface = parse(html, DEFAULT_SIDEBAR_SELECTOR).unwrap();
        let text = surface.item_text(ItemId(0)).unwrap();
        assert_eq!(text, "Ration Card\nPDS entitlement");
        assert_eq!(canonical_label(&text), "Ration Card");
    }

    #[test]
    fn document_without_items_is_empty() {
        let surface = parse("<p>nothing here</p>", ".sidebar-item").unwrap();
        assert!(surface.is_empty());
        assert!(surface.sidebar_items().is_empty());
    }

    #[test]
    fn invalid_selector_is_rejected() {
        let err = parse("<p></p>", "[[").unwrap_err();
        assert!(matches!(err, SurfaceError::Selector(_)));
    }
}
