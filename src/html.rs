//! An HTML renderer for edit scripts, mainly intended as an example from
//! which to write one's own display functions.

use crate::diff::cleanup_semantic;
use crate::edits::{Edit, Op};
use crate::Redline;

/// Knobs for [`Redline::pretty_html`].
///
/// Each op gets its own wrapping tag plus optional `class`/`style`
/// attributes. With `newline_to_break` set (the default), `\n` renders as
/// `&para;<br>`.
#[derive(Debug, Clone)]
pub struct HtmlConfig<'a> {
    pub insert_tag: &'a str,
    pub delete_tag: &'a str,
    pub equality_tag: &'a str,
    pub newline_to_break: bool,
    pub insert_class: Option<&'a str>,
    pub delete_class: Option<&'a str>,
    pub equality_class: Option<&'a str>,
    pub insert_style: Option<&'a str>,
    pub delete_style: Option<&'a str>,
    pub equality_style: Option<&'a str>,
}

impl Default for HtmlConfig<'_> {
    fn default() -> Self {
        Self {
            insert_tag: "ins",
            delete_tag: "del",
            equality_tag: "span",
            newline_to_break: true,
            insert_class: None,
            delete_class: None,
            equality_class: None,
            insert_style: None,
            delete_style: None,
            equality_style: None,
        }
    }
}

impl HtmlConfig<'_> {
    pub fn new() -> Self {
        Self::default()
    }

    fn dressing(&self, op: Op) -> (&str, Option<&str>, Option<&str>) {
        match op {
            Op::Insert => (self.insert_tag, self.insert_class, self.insert_style),
            Op::Delete => (self.delete_tag, self.delete_class, self.delete_style),
            Op::Equal => (self.equality_tag, self.equality_class, self.equality_style),
        }
    }
}

impl Redline {
    /// Render an edit script as HTML, one wrapped element per edit, after a
    /// semantic cleanup pass. `&`, `<` and `>` are entity-escaped.
    pub fn pretty_html(&self, edits: &[Edit], config: &HtmlConfig) -> String {
        let mut edits = edits.to_vec();
        cleanup_semantic(&mut edits);

        let mut html = String::new();
        for edit in &edits {
            let mut text = edit
                .text()
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            if config.newline_to_break {
                text = text.replace('\n', "&para;<br>");
            }

            if text.is_empty() {
                continue;
            }

            let (tag, class, style) = config.dressing(edit.op());
            html.push('<');
            html.push_str(tag);
            if let Some(class) = class {
                html.push_str(&format!(" class=\"{class}\""));
            }
            if let Some(style) = style {
                html.push_str(&format!(" style=\"{style}\""));
            }
            html.push('>');
            html.push_str(&text);
            html.push_str("</");
            html.push_str(tag);
            html.push('>');
        }

        html
    }
}
