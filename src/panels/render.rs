//! Render surfaces and the dispatch between them.
//!
//! A panel always has a full renderer; console and toolbar renderers are
//! optional and fall back to the full one. [`resolve_renderer`] is the single
//! place that decides which function runs for a surface.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::definition::{PanelDefinition, RenderFn};
use super::state::PanelState;
use crate::adapters::EscapingHighlighter;
use crate::traits::Highlighter;

/// Markup shown on the toolbar for panels that opt out of it.
pub const TOOLBAR_UNAVAILABLE: &str =
    "<span class=\"dc-unavailable\">Not available in toolbar</span>";

/// Where a panel is being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Full,
    Console,
    Toolbar,
}

impl Surface {
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Full => "full",
            Surface::Console => "console",
            Surface::Toolbar => "toolbar",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Surface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Surface::Full),
            "console" => Ok(Surface::Console),
            "toolbar" => Ok(Surface::Toolbar),
            other => Err(format!("unknown surface: {}", other)),
        }
    }
}

/// Colors used by the built-in renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub foreground: &'static str,
    pub muted: &'static str,
    pub accent: &'static str,
    pub border: &'static str,
    pub error: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleTheme {
    #[default]
    Light,
    Dark,
}

impl StyleTheme {
    pub fn palette(&self) -> Palette {
        match self {
            StyleTheme::Light => Palette {
                background: "#ffffff",
                foreground: "#1f2328",
                muted: "#656d76",
                accent: "#0969da",
                border: "#d0d7de",
                error: "#cf222e",
            },
            StyleTheme::Dark => Palette {
                background: "#0d1117",
                foreground: "#e6edf3",
                muted: "#8d96a0",
                accent: "#4493f8",
                border: "#30363d",
                error: "#f85149",
            },
        }
    }
}

/// Per-call knobs for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Show at most this many entries, newest first. `None` shows all.
    pub limit: Option<usize>,
    pub show_timestamps: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            limit: None,
            show_timestamps: true,
        }
    }
}

/// Everything a renderer may consult besides the state itself.
#[derive(Clone)]
pub struct RenderContext {
    pub theme: StyleTheme,
    pub options: RenderOptions,
    pub highlighter: Arc<dyn Highlighter>,
}

impl RenderContext {
    pub fn new(highlighter: Arc<dyn Highlighter>) -> Self {
        Self {
            theme: StyleTheme::default(),
            options: RenderOptions::default(),
            highlighter,
        }
    }

    pub fn with_theme(mut self, theme: StyleTheme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn palette(&self) -> Palette {
        self.theme.palette()
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(Arc::new(EscapingHighlighter))
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("theme", &self.theme)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Outcome of surface dispatch.
pub enum ResolvedRenderer<'a> {
    Render(&'a RenderFn),
    /// The panel opted out of the toolbar.
    Unavailable,
}

impl fmt::Debug for ResolvedRenderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedRenderer::Render(_) => f.write_str("Render(..)"),
            ResolvedRenderer::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// Pick the renderer for `surface`.
///
/// A toolbar request for a panel with `supports_toolbar == false` is always
/// [`ResolvedRenderer::Unavailable`], even if a toolbar renderer is set.
pub fn resolve_renderer(panel: &PanelDefinition, surface: Surface) -> ResolvedRenderer<'_> {
    let specific = match surface {
        Surface::Full => None,
        Surface::Console => panel.render_console.as_ref(),
        Surface::Toolbar => {
            if !panel.supports_toolbar {
                return ResolvedRenderer::Unavailable;
            }
            panel.render_toolbar.as_ref()
        }
    };
    ResolvedRenderer::Render(specific.unwrap_or(&panel.render))
}

pub fn render_panel(
    panel: &PanelDefinition,
    state: Option<&PanelState>,
    surface: Surface,
    ctx: &RenderContext,
) -> String {
    match resolve_renderer(panel, surface) {
        ResolvedRenderer::Render(render) => render(state, ctx),
        ResolvedRenderer::Unavailable => TOOLBAR_UNAVAILABLE.to_string(),
    }
}

/// Escape text for HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Fallback full renderer: pretty JSON in a `<pre>` block.
pub fn render_json(state: Option<&PanelState>, ctx: &RenderContext) -> String {
    let palette = ctx.palette();
    match state {
        None => empty_message(ctx, "No data"),
        Some(state) => {
            let pretty = serde_json::to_string_pretty(&state.to_value()).unwrap_or_default();
            format!(
                "<pre class=\"dc-json\" style=\"color:{};background:{}\">{}</pre>",
                palette.foreground,
                palette.background,
                escape_html(&pretty)
            )
        }
    }
}

pub(crate) fn empty_message(ctx: &RenderContext, message: &str) -> String {
    format!(
        "<div class=\"dc-empty\" style=\"color:{}\">{}</div>",
        ctx.palette().muted,
        escape_html(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixed(text: &'static str) -> impl Fn(Option<&PanelState>, &RenderContext) -> String {
        move |_, _| text.to_string()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_surface_parse_and_display() {
        for surface in [Surface::Full, Surface::Console, Surface::Toolbar] {
            assert_eq!(surface.as_str().parse::<Surface>().unwrap(), surface);
        }
        assert!("sidebar".parse::<Surface>().is_err());
    }

    #[test]
    fn test_console_falls_back_to_full() {
        let panel = PanelDefinition::new("p", "P").with_render(fixed("full"));
        let ctx = RenderContext::default();
        assert_eq!(render_panel(&panel, None, Surface::Console, &ctx), "full");
        assert_eq!(render_panel(&panel, None, Surface::Toolbar, &ctx), "full");
    }

    #[test]
    fn test_surface_specific_renderers_win() {
        let panel = PanelDefinition::new("p", "P")
            .with_render(fixed("full"))
            .with_console_renderer(fixed("console"))
            .with_toolbar_renderer(fixed("toolbar"));
        let ctx = RenderContext::default();
        assert_eq!(render_panel(&panel, None, Surface::Full, &ctx), "full");
        assert_eq!(render_panel(&panel, None, Surface::Console, &ctx), "console");
        assert_eq!(render_panel(&panel, None, Surface::Toolbar, &ctx), "toolbar");
    }

    #[test]
    fn test_toolbar_opt_out_beats_toolbar_renderer() {
        let panel = PanelDefinition::new("p", "P")
            .with_toolbar_renderer(fixed("toolbar"))
            .without_toolbar();
        let ctx = RenderContext::default();
        assert!(matches!(
            resolve_renderer(&panel, Surface::Toolbar),
            ResolvedRenderer::Unavailable
        ));
        assert_eq!(
            render_panel(&panel, None, Surface::Toolbar, &ctx),
            TOOLBAR_UNAVAILABLE
        );
    }

    #[test]
    fn test_render_json_escapes() {
        let state = PanelState::from_value(json!({"html": "<b>"}));
        let out = render_json(Some(&state), &RenderContext::default());
        assert!(out.contains("&lt;b&gt;"));
        assert!(!out.contains("<b>"));
    }

    #[test]
    fn test_themes_differ() {
        assert_ne!(StyleTheme::Light.palette(), StyleTheme::Dark.palette());
        let ctx = RenderContext::default().with_theme(StyleTheme::Dark);
        assert_eq!(ctx.palette().background, "#0d1117");
    }
}
