use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::events::{PageEvent, PageInstrumentation, PageMutation};

/// Error raised when a stylesheet's rules cannot be read.
#[derive(Debug, Error)]
pub enum PageAccessError {
    #[error("stylesheet {name} is cross-origin and its rules cannot be read")]
    CrossOrigin { name: String },
}

/// A stylesheet attached to the document. Cross-origin sheets are present
/// in the registry but refuse to expose their rule text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleSheet {
    name: String,
    rules: Vec<String>,
    readable: bool,
}

impl StyleSheet {
    pub fn new(name: impl Into<String>, rules: Vec<String>) -> Self {
        Self {
            name: name.into(),
            rules,
            readable: true,
        }
    }

    pub fn cross_origin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            readable: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    /// Concatenated text of every rule in the sheet.
    pub fn rule_text(&self) -> Result<String, PageAccessError> {
        if !self.readable {
            return Err(PageAccessError::CrossOrigin {
                name: self.name.clone(),
            });
        }
        Ok(self.rules.concat())
    }
}

/// In-memory document the edit agent reads from and writes to: an editable
/// region's markup, the attached stylesheets, and the style elements the
/// agent has appended to the head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDocument {
    markup: String,
    sheets: IndexMap<String, StyleSheet>,
    injected_styles: Vec<String>,
    instrumentation: PageInstrumentation,
}

impl PageDocument {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            sheets: IndexMap::new(),
            injected_styles: Vec::new(),
            instrumentation: PageInstrumentation::new(),
        }
    }

    pub fn add_stylesheet(&mut self, sheet: StyleSheet) {
        self.sheets.insert(sheet.name().to_string(), sheet);
    }

    /// Current markup of the editable region. Pure read.
    pub fn capture_html(&self) -> String {
        self.markup.clone()
    }

    /// Concatenated rule text of every readable stylesheet, document sheets
    /// first and injected style elements after, with all whitespace
    /// stripped. Sheets that refuse to be read are skipped and contribute
    /// nothing. Pure read.
    pub fn capture_css(&self) -> String {
        let mut css = String::new();
        for sheet in self.sheets.values() {
            match sheet.rule_text() {
                Ok(text) => css.push_str(&text),
                Err(err) => {
                    warn!(sheet = sheet.name(), %err, "couldn't read CSS rules");
                }
            }
        }
        for style in &self.injected_styles {
            css.push_str(style);
        }
        css.chars().filter(|c| !c.is_whitespace()).collect()
    }

    /// Applies a model edit: replaces the editable region's markup and
    /// appends a new style element to the head. Additive with respect to
    /// styles; earlier injected elements are never removed.
    pub fn apply_edit(&mut self, html: &str, css: &str) {
        self.markup = html.to_string();
        self.instrumentation.record(PageMutation::ReplaceMarkup {
            bytes: html.len(),
        });
        self.injected_styles.push(css.to_string());
        self.instrumentation
            .record(PageMutation::AppendStyle { bytes: css.len() });
    }

    pub fn injected_styles(&self) -> &[String] {
        &self.injected_styles
    }

    pub fn events(&self) -> &[PageEvent] {
        self.instrumentation.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_page() -> PageDocument {
        let mut page = PageDocument::new("<p>hello</p>");
        page.add_stylesheet(StyleSheet::new(
            "base",
            vec!["p { color: blue; }".to_string(), "h1 { margin: 0; }".to_string()],
        ));
        page
    }

    #[test]
    fn capture_css_concatenates_and_strips_whitespace() {
        let page = demo_page();
        assert_eq!(page.capture_css(), "p{color:blue;}h1{margin:0;}");
    }

    #[test]
    fn capture_css_skips_cross_origin_sheets() {
        let mut page = demo_page();
        page.add_stylesheet(StyleSheet::cross_origin("cdn"));
        assert_eq!(page.capture_css(), "p{color:blue;}h1{margin:0;}");
    }

    #[test]
    fn capture_does_not_mutate_the_document() {
        let page = demo_page();
        let before = serde_json::to_string(&page).unwrap();
        let _ = page.capture_html();
        let _ = page.capture_css();
        assert_eq!(serde_json::to_string(&page).unwrap(), before);
    }

    #[test]
    fn apply_edit_replaces_markup_and_appends_style() {
        let mut page = demo_page();
        page.apply_edit("<p>hi</p>", "p{color:red}");
        assert_eq!(page.capture_html(), "<p>hi</p>");
        assert_eq!(page.injected_styles(), ["p{color:red}".to_string()]);
        assert_eq!(page.events().len(), 2);
    }

    #[test]
    fn injected_styles_are_additive_and_visible_to_capture() {
        let mut page = demo_page();
        page.apply_edit("<p>one</p>", "p{color:red}");
        page.apply_edit("<p>two</p>", "p{color:red}");
        assert_eq!(page.injected_styles().len(), 2);
        assert_eq!(
            page.capture_css(),
            "p{color:blue;}h1{margin:0;}p{color:red}p{color:red}"
        );
    }
}
