use crate::surface::{HtmlSidebarSurface, SurfaceError};
use anyhow::Context;
use kuchiki::NodeRef;
use kuchiki::traits::*;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

pub const SDK_PATH: &str = "/sdk.js";

const DEFAULT_PAGE: &str = include_str!("../assets/index.html");

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error("html manipulation failed: {0}")]
    Html(String),
}

/// The chat page served at `/`, with its sidebar discovered once at startup.
#[derive(Debug, Clone)]
pub struct ChatPage {
    html: String,
    surface: HtmlSidebarSurface,
}

impl ChatPage {
    pub async fn load(path: Option<&Path>, selector: &str) -> anyhow::Result<Self> {
        let raw = match path {
            Some(path) => fs::read_to_string(path)
                .await
                .with_context(|| format!("reading chat page {}", path.display()))?,
            None => DEFAULT_PAGE.to_string(),
        };
        let page = Self::from_html(&raw, selector)?;
        if page.surface.is_empty() {
            warn!(%selector, "chat page has no sidebar items");
        } else {
            info!(%selector, items = page.surface.len(), "discovered sidebar items");
        }
        Ok(page)
    }

    pub fn from_html(raw: &str, selector: &str) -> Result<Self, PageError> {
        let document = kuchiki::parse_html().one(raw);
        let surface = HtmlSidebarSurface::from_document(&document, selector)?;
        inject_sdk_script(&document)?;
        Ok(Self {
            html: document.to_string(),
            surface,
        })
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn surface(&self) -> &HtmlSidebarSurface {
        &self.surface
    }
}

fn inject_sdk_script(document: &NodeRef) -> Result<(), PageError> {
    let sdk_selector = format!("script[src=\"{SDK_PATH}\"]");
    let already = document
        .select(&sdk_selector)
        .map_err(|e| PageError::Html(format!("query selector {sdk_selector} failed: {e:?}")))?
        .next()
        .is_some();
    if already {
        return Ok(());
    }

    let body = document
        .select_first("body")
        .map_err(|_| PageError::Html("document has no body".to_string()))?;

    let wrapper_html = format!(
        "<div id=\"__certdesk_wrapper\"><script src=\"{SDK_PATH}\" data-autostart></script></div>"
    );
    let fragment_doc = kuchiki::parse_html().one(wrapper_html);
    let wrapper = fragment_doc
        .select_first("#__certdesk_wrapper")
        .map_err(|_| PageError::Html("select wrapper failed".to_string()))?;
    let children: Vec<_> = wrapper.as_node().children().collect();
    for child in children {
        body.as_node().append(child);
    }
    Ok(())
}
