//! Debug panel and console reporting.

use std::sync::Arc;

use serde_json::Value as Json;

use crate::page::Page;
use crate::templates::PageTemplates;

/// Styling of a debug entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Info,
    Winning,
    NoBid,
}

impl EntryKind {
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Info => "bid-info",
            Self::Winning => "bid-info winning",
            Self::NoBid => "bid-info no-bid",
        }
    }
}

/// Plain text, or a structure that is pretty-printed.
#[derive(Debug, Clone, PartialEq)]
pub enum DebugContent {
    Text(String),
    Structured(Json),
}

impl DebugContent {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

impl From<&str> for DebugContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for DebugContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Json> for DebugContent {
    fn from(value: Json) -> Self {
        Self::Structured(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEntry {
    pub kind: EntryKind,
    pub line: String,
}

/// Appends entries to the debug panel element and the log.
#[derive(Debug)]
pub struct DebugReporter {
    panel_id: String,
    console_prefix: String,
    templates: Arc<PageTemplates>,
    entries: Vec<DebugEntry>,
}

impl DebugReporter {
    #[must_use]
    pub fn new(
        panel_id: impl Into<String>,
        console_prefix: impl Into<String>,
        templates: Arc<PageTemplates>,
    ) -> Self {
        Self {
            panel_id: panel_id.into(),
            console_prefix: console_prefix.into(),
            templates,
            entries: Vec::new(),
        }
    }

    pub fn log<P: Page>(&mut self, page: &mut P, content: impl Into<DebugContent>, kind: EntryKind) {
        let line = content.into().render();

        if page.has_element(&self.panel_id) {
            match self.templates.debug_entry(kind.css_class(), &line) {
                Ok(html) => page.append_html(&self.panel_id, &html),
                Err(e) => log::error!("Failed to render debug entry: {:?}", e),
            }
        }
        log::info!("{} {}", self.console_prefix, line);

        self.entries.push(DebugEntry { kind, line });
    }

    /// Empty the panel and forget accumulated entries.
    pub fn clear<P: Page>(&mut self, page: &mut P) {
        page.set_inner_html(&self.panel_id, "");
        self.entries.clear();
    }

    /// Entries logged since the last [`DebugReporter::clear`].
    #[must_use]
    pub fn entries(&self) -> &[DebugEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HtmlPage;
    use serde_json::json;

    fn reporter() -> DebugReporter {
        let templates = Arc::new(PageTemplates::new().expect("templates should compile"));
        DebugReporter::new("debugOutput", "[Prebid Loader]", templates)
    }

    #[test]
    fn test_text_and_structured_entries() {
        let mut page =
            HtmlPage::parse(r#"<div id="debugOutput"></div>"#).expect("should parse page");
        let mut reporter = reporter();

        reporter.log(&mut page, "Applying Prebid config:", EntryKind::Info);
        reporter.log(&mut page, json!({"debug": true}), EntryKind::Info);
        reporter.log(&mut page, "top: ix - no bid", EntryKind::NoBid);

        assert_eq!(
            reporter.entries(),
            &[
                DebugEntry {
                    kind: EntryKind::Info,
                    line: "Applying Prebid config:".to_string()
                },
                DebugEntry {
                    kind: EntryKind::Info,
                    line: "{\n  \"debug\": true\n}".to_string()
                },
                DebugEntry {
                    kind: EntryKind::NoBid,
                    line: "top: ix - no bid".to_string()
                },
            ]
        );

        let panel = page.inner_html("debugOutput").expect("panel should be written");
        assert!(panel.contains(r#"<div class="bid-info"><pre>Applying Prebid config:</pre></div>"#));
        assert!(panel.contains("&quot;debug&quot;: true"));
        assert!(panel.contains(r#"<div class="bid-info no-bid"><pre>top: ix - no bid</pre></div>"#));
    }

    #[test]
    fn test_clear() {
        let mut page = HtmlPage::parse(r#"<div id="debugOutput"><p>old</p></div>"#)
            .expect("should parse page");
        let mut reporter = reporter();
        reporter.log(&mut page, "one", EntryKind::Info);

        reporter.clear(&mut page);

        assert!(reporter.entries().is_empty());
        assert_eq!(page.inner_html("debugOutput").as_deref(), Some(""));
    }

    #[test]
    fn test_missing_panel_still_records() {
        let mut page = HtmlPage::parse("<p>no panel</p>").expect("should parse page");
        let mut reporter = reporter();
        reporter.log(&mut page, "still logged", EntryKind::Winning);
        assert_eq!(reporter.entries().len(), 1);
        assert_eq!(page.render().expect("should render"), "<p>no panel</p>");
    }
}
