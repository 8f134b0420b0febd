//! Icon
//!
//! `src` holds either a URL or inline SVG markup. Remote markup is fetched
//! through an [`IconFetcher`]; concurrent loads of one URL share a single
//! fetch. The markup lands in the icon's shadow root.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;

use smol::lock::OnceCell;
use trellis_a11y::{AriaRole, AttributeSet};
use trellis_dom::NodeId;
use url::Url;

use super::WidgetKind;
use crate::Context;
use crate::notify::NotificationKind;

/// Graphic used when a source cannot be resolved
pub const EMPTY_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 0 0"></svg>"#;

/// Classified `src`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    Url(Url),
    Inline(String),
    Empty,
}

fn is_svg_markup(text: &str) -> bool {
    text.get(..4).is_some_and(|head| head.eq_ignore_ascii_case("<svg"))
}

impl IconSource {
    pub fn classify(src: &str) -> Self {
        let src = src.trim();
        if src.is_empty() {
            return Self::Empty;
        }
        if is_svg_markup(src) {
            return Self::Inline(src.to_string());
        }
        match Url::parse(src) {
            Ok(url) => Self::Url(url),
            Err(e) => {
                tracing::warn!("Icon source is neither a URL nor SVG markup ({}): {:.40}", e, src);
                Self::Empty
            }
        }
    }
}

/// Retrieves SVG markup for a URL
pub trait IconFetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = anyhow::Result<String>>;
}

/// Fetched markup by URL. A failed fetch leaves no entry, so the next load
/// retries.
#[derive(Default)]
pub struct IconCache {
    cells: RefCell<HashMap<String, Rc<OnceCell<String>>>>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs whose markup has been fetched
    pub fn len(&self) -> usize {
        self.cells.borrow().values().filter(|c| c.is_initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Markup for `source`, fetching at most once per URL
    pub async fn load<F: IconFetcher>(&self, fetcher: &F, source: &IconSource) -> anyhow::Result<String> {
        let url = match source {
            IconSource::Empty => return Ok(EMPTY_SVG.to_string()),
            IconSource::Inline(svg) => return Ok(svg.clone()),
            IconSource::Url(url) => url,
        };
        let cell = self
            .cells
            .borrow_mut()
            .entry(url.to_string())
            .or_insert_with(|| Rc::new(OnceCell::new()))
            .clone();
        let svg = cell
            .get_or_try_init(|| async {
                tracing::debug!("Fetching icon {}", url);
                let body = fetcher.fetch(url).await?;
                if is_svg_markup(body.trim_start()) {
                    Ok::<_, anyhow::Error>(body.trim().to_string())
                } else {
                    tracing::warn!("Icon {} did not return SVG markup", url);
                    Ok(EMPTY_SVG.to_string())
                }
            })
            .await?;
        Ok(svg.clone())
    }
}

pub fn source(ctx: &Context, node: NodeId) -> IconSource {
    IconSource::classify(ctx.get_attribute(node, "src").unwrap_or_default())
}

pub(crate) fn connected(ctx: &mut Context, node: NodeId) {
    let src = source(ctx, node);
    tracing::trace!("Icon {:?} connected with {:?}", node, src);
    sync(ctx, node);
}

pub(crate) fn sync(ctx: &mut Context, node: NodeId) {
    let label = ctx.get_attribute(node, "label").map(str::to_string);
    let hidden = label.is_none().then_some("true");
    ctx.sync_attrs(
        node,
        &AttributeSet::new()
            .role(AriaRole::Img)
            .set_opt("aria-label", label)
            .set_opt("aria-hidden", hidden),
    );
}

pub(crate) fn attribute_changed(ctx: &mut Context, node: NodeId, name: &str) {
    if name == "src" {
        let src = source(ctx, node);
        tracing::trace!("Icon {:?} source now {:?}", node, src);
    }
    sync(ctx, node);
}

/// Write `svg` into the icon's shadow root. Nothing is written once the
/// icon has left the document.
pub fn apply_icon(ctx: &mut Context, node: NodeId, svg: &str) -> bool {
    let live = ctx.component(node).is_some_and(|c| c.kind == WidgetKind::Icon && c.connected);
    if !live {
        tracing::debug!("Icon {:?} is gone, dropping its markup", node);
        return false;
    }
    let shadow = match ctx.dom.shadow_root(node) {
        Some(shadow) => shadow,
        None => match ctx.dom.attach_shadow(node) {
            Ok(shadow) => shadow,
            Err(e) => {
                tracing::warn!("Could not attach shadow root to {:?}: {}", node, e);
                return false;
            }
        },
    };
    let stale: Vec<NodeId> = ctx.dom.children(shadow).collect();
    for child in stale {
        if let Err(e) = ctx.dom.remove(child) {
            tracing::warn!("Could not clear icon {:?}: {}", node, e);
        }
    }
    let markup = ctx.dom.create_text(svg);
    if let Err(e) = ctx.dom.append_child(shadow, markup) {
        tracing::warn!("Could not render icon {:?}: {}", node, e);
        return false;
    }
    ctx.emit(node, NotificationKind::IconLoad);
    true
}

/// Resolve the icon's source through `cache` and render it
pub async fn render<F: IconFetcher>(
    ctx: &mut Context,
    node: NodeId,
    cache: &IconCache,
    fetcher: &F,
) -> anyhow::Result<bool> {
    let source = source(ctx, node);
    let svg = cache.load(fetcher, &source).await?;
    Ok(apply_icon(ctx, node, &svg))
}
