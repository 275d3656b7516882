//! Renderers turn one file's raw content into its final textual form.
//!
//! - [`PlainRenderer`] passes content through untouched.
//! - [`AnnotatedRenderer`] highlights content with syntect and emits class-based markup
//!   (`tok-keyword`, `tok-string`, `tok-comment`, ...) styled by [`DOCUMENT_STYLE`].
//!
//! The variant is chosen once through [`RendererKind::build`] and never re-checked per file.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;
use tracing::{debug, warn};

use crate::contract::RenderedContent;

/// Ruleset used when a type tag has no syntax of its own.
pub const DEFAULT_TYPE_TAG: &str = "js";

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "tok-" };

const THEME_NAME: &str = "InspiredGitHub";

const BASE_STYLE: &str = r#"
body {
    font: 10pt Georgia, "Times New Roman", Times, serif;
    line-height: 1.3;
    margin: .5cm .5cm .5cm 1.5cm;
}
.pagebreak {
    margin-top: 50px;
}
pre code {
    font: 9pt Menlo, Consolas, "Liberation Mono", monospace;
    white-space: pre-wrap;
}
.tok-keyword, .tok-storage {
    color: #7114A9;
    font-weight: bold;
}
.tok-constant, .tok-support {
    color: #E90;
}
"#;

/// Document style block: the fixed base style followed by the token classes of the theme.
pub static DOCUMENT_STYLE: LazyLock<String> = LazyLock::new(|| {
    let mut style = String::from(BASE_STYLE);
    let themes = ThemeSet::load_defaults();
    match themes.themes.get(THEME_NAME) {
        Some(theme) => match css_for_theme_with_class_style(theme, CLASS_STYLE) {
            Ok(css) => style.push_str(&css),
            Err(e) => warn!(error = %e, theme = THEME_NAME, "Failed to generate theme css"),
        },
        None => warn!(theme = THEME_NAME, "Highlighting theme not bundled, using base style only"),
    }
    style
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    Plain,
    Annotated,
}

impl RendererKind {
    pub fn build(self) -> Box<dyn Renderer> {
        match self {
            RendererKind::Plain => Box::new(PlainRenderer),
            RendererKind::Annotated => Box::new(AnnotatedRenderer::new()),
        }
    }
}

pub trait Renderer: Send + Sync {
    fn kind(&self) -> RendererKind;

    /// Never fails: unknown tags fall back to a default ruleset.
    fn render(&self, content: &str, type_tag: &str) -> RenderedContent;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Plain
    }

    fn render(&self, content: &str, _type_tag: &str) -> RenderedContent {
        RenderedContent::Plain {
            text: content.to_string(),
        }
    }
}

pub struct AnnotatedRenderer {
    syntax_set: SyntaxSet,
}

impl AnnotatedRenderer {
    pub fn new() -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
        }
    }

    fn syntax_for(&self, type_tag: &str) -> &SyntaxReference {
        Some(type_tag)
            .filter(|tag| !tag.is_empty())
            .and_then(|tag| self.syntax_set.find_syntax_by_extension(tag))
            .or_else(|| {
                debug!(type_tag, fallback = DEFAULT_TYPE_TAG, "No syntax for type tag");
                self.syntax_set.find_syntax_by_extension(DEFAULT_TYPE_TAG)
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    fn highlight(&self, content: &str, syntax: &SyntaxReference) -> Result<String, syntect::Error> {
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(content) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }
}

impl Default for AnnotatedRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for AnnotatedRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Annotated
    }

    fn render(&self, content: &str, type_tag: &str) -> RenderedContent {
        let syntax = self.syntax_for(type_tag);
        let markup = match self.highlight(content, syntax) {
            Ok(markup) => markup,
            Err(e) => {
                warn!(error = %e, syntax = %syntax.name, "Highlighting failed, emitting escaped text");
                escape_html(content)
            }
        };
        RenderedContent::Annotated {
            markup,
            type_tag: type_tag.to_string(),
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_renderer_passes_content_through() {
        let rendered = PlainRenderer.render("<b>raw</b>", "html");
        assert_eq!(
            rendered,
            RenderedContent::Plain {
                text: "<b>raw</b>".to_string()
            }
        );
    }

    #[test]
    fn annotated_renderer_emits_token_classes() {
        let renderer = AnnotatedRenderer::new();
        let rendered = renderer.render("fn main() { let x = \"hi\"; }\n", "rs");
        let RenderedContent::Annotated { markup, type_tag } = rendered else {
            panic!("expected annotated output");
        };
        assert_eq!(type_tag, "rs");
        assert!(markup.contains("tok-"), "markup has no token classes: {markup}");
        assert!(markup.contains("&quot;hi&quot;") || markup.contains("hi"));
    }

    #[test]
    fn unknown_tag_falls_back_without_failing() {
        let renderer = AnnotatedRenderer::new();
        let rendered = renderer.render("var a = 1;\n", "unknownlang");
        let RenderedContent::Annotated { markup, type_tag } = rendered else {
            panic!("expected annotated output");
        };
        assert_eq!(type_tag, "unknownlang");
        assert!(!markup.is_empty());
    }

    #[test]
    fn empty_tag_uses_the_default_ruleset() {
        let renderer = AnnotatedRenderer::new();
        assert_eq!(
            renderer.syntax_for("").name,
            renderer.syntax_for(DEFAULT_TYPE_TAG).name
        );
    }

    #[test]
    fn annotated_markup_escapes_html() {
        let renderer = AnnotatedRenderer::new();
        let RenderedContent::Annotated { markup, .. } = renderer.render("a < b && c\n", "txt")
        else {
            panic!("expected annotated output");
        };
        assert!(!markup.contains("a < b"));
        assert!(markup.contains("&lt;"));
    }

    #[test]
    fn kind_selects_the_variant() {
        assert_eq!(RendererKind::Plain.build().kind(), RendererKind::Plain);
        assert_eq!(RendererKind::Annotated.build().kind(), RendererKind::Annotated);
    }

    #[test]
    fn document_style_contains_base_and_theme_rules() {
        assert!(DOCUMENT_STYLE.contains(".pagebreak"));
        assert!(DOCUMENT_STYLE.contains(".tok-"));
    }

    #[test]
    fn escape_html_covers_markup_characters() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
