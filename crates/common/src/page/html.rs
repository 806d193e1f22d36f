//! [`Page`] over a static HTML document.
//!
//! The document is scanned once for elements carrying an `id`. Mutations are
//! recorded per id and applied when the page is rendered back to HTML with
//! `lol_html`, so content the loader never touched is streamed through verbatim.

use std::collections::HashMap;

use error_stack::Report;
use handlebars::html_escape;
use lol_html::html_content::ContentType;
use lol_html::{element, HtmlRewriter, Settings as RewriterSettings};

use crate::error::LoaderError;

use super::Page;

#[derive(Debug, Clone, Default)]
struct ElementState {
    replaced: Option<String>,
    appended: Vec<String>,
    class: Option<String>,
    disabled: Option<bool>,
    style: String,
    style_changed: bool,
}

impl ElementState {
    fn written_content(&self) -> Option<String> {
        if self.replaced.is_none() && self.appended.is_empty() {
            return None;
        }
        let mut content = self.replaced.clone().unwrap_or_default();
        for html in &self.appended {
            content.push_str(html);
        }
        Some(content)
    }
}

/// Inline `display` value of a `style` attribute.
fn display_from_style(style: &str) -> String {
    style
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .filter(|(property, _)| property.trim().eq_ignore_ascii_case("display"))
        .map(|(_, value)| value.trim().to_string())
        .last()
        .unwrap_or_default()
}

/// `style` with its `display` declaration replaced.
fn style_with_display(style: &str, display: &str) -> String {
    let mut declarations: Vec<&str> = style
        .split(';')
        .map(str::trim)
        .filter(|declaration| !declaration.is_empty())
        .filter(|declaration| {
            declaration
                .split_once(':')
                .is_none_or(|(property, _)| !property.trim().eq_ignore_ascii_case("display"))
        })
        .collect();
    let display_declaration = format!("display: {display}");
    declarations.push(&display_declaration);
    declarations.join("; ")
}

#[derive(Debug, Clone)]
pub struct HtmlPage {
    source: String,
    elements: HashMap<String, ElementState>,
}

impl HtmlPage {
    /// Scan a document for elements with ids.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Page`] if the document cannot be tokenised.
    pub fn parse(html: impl Into<String>) -> Result<Self, Report<LoaderError>> {
        let source = html.into();
        let mut elements: HashMap<String, ElementState> = HashMap::new();

        let mut rewriter = HtmlRewriter::new(
            RewriterSettings {
                element_content_handlers: vec![element!("[id]", |el| {
                    if let Some(id) = el.get_attribute("id") {
                        let style = el.get_attribute("style").unwrap_or_default();
                        elements.entry(id).or_insert_with(|| ElementState {
                            style,
                            ..ElementState::default()
                        });
                    }
                    Ok(())
                })],
                ..RewriterSettings::default()
            },
            |_: &[u8]| {},
        );

        rewriter.write(source.as_bytes()).map_err(|e| {
            Report::new(LoaderError::Page {
                message: format!("Failed to scan page: {}", e),
            })
        })?;
        rewriter.end().map_err(|e| {
            Report::new(LoaderError::Page {
                message: format!("Failed to scan page: {}", e),
            })
        })?;

        log::debug!("Page has {} elements with ids", elements.len());
        Ok(Self { source, elements })
    }

    /// Markup the loader has written into an element, if any.
    #[must_use]
    pub fn inner_html(&self, id: &str) -> Option<String> {
        self.elements.get(id)?.written_content()
    }

    #[must_use]
    pub fn class(&self, id: &str) -> Option<&str> {
        self.elements.get(id)?.class.as_deref()
    }

    #[must_use]
    pub fn is_disabled(&self, id: &str) -> Option<bool> {
        self.elements.get(id)?.disabled
    }

    /// Render the document with every recorded mutation applied.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Page`] if rewriting fails.
    pub fn render(&self) -> Result<String, Report<LoaderError>> {
        let elements = &self.elements;
        let mut out = Vec::with_capacity(self.source.len());

        let mut rewriter = HtmlRewriter::new(
            RewriterSettings {
                element_content_handlers: vec![element!("[id]", |el| {
                    let Some(state) = el.get_attribute("id").and_then(|id| elements.get(&id))
                    else {
                        return Ok(());
                    };

                    if let Some(class) = &state.class {
                        el.set_attribute("class", class)?;
                    }
                    match state.disabled {
                        Some(true) => el.set_attribute("disabled", "")?,
                        Some(false) => el.remove_attribute("disabled"),
                        None => {}
                    }
                    if state.style_changed {
                        el.set_attribute("style", &state.style)?;
                    }
                    if state.replaced.is_some() {
                        if let Some(content) = state.written_content() {
                            el.set_inner_content(&content, ContentType::Html);
                        }
                    } else {
                        for html in &state.appended {
                            el.append(html, ContentType::Html);
                        }
                    }
                    Ok(())
                })],
                ..RewriterSettings::default()
            },
            |chunk: &[u8]| out.extend_from_slice(chunk),
        );

        rewriter.write(self.source.as_bytes()).map_err(|e| {
            Report::new(LoaderError::Page {
                message: format!("Failed to render page: {}", e),
            })
        })?;
        rewriter.end().map_err(|e| {
            Report::new(LoaderError::Page {
                message: format!("Failed to render page: {}", e),
            })
        })?;

        String::from_utf8(out).map_err(|e| {
            Report::new(LoaderError::Page {
                message: format!("Rendered page is not UTF-8: {}", e),
            })
        })
    }
}

impl Page for HtmlPage {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set_text(&mut self, id: &str, text: &str) {
        self.set_inner_html(id, &html_escape(text));
    }

    fn set_class(&mut self, id: &str, class: &str) {
        if let Some(state) = self.elements.get_mut(id) {
            state.class = Some(class.to_string());
        }
    }

    fn set_inner_html(&mut self, id: &str, html: &str) {
        if let Some(state) = self.elements.get_mut(id) {
            state.replaced = Some(html.to_string());
            state.appended.clear();
        }
    }

    fn append_html(&mut self, id: &str, html: &str) {
        if let Some(state) = self.elements.get_mut(id) {
            state.appended.push(html.to_string());
        }
    }

    fn set_disabled(&mut self, id: &str, disabled: bool) {
        if let Some(state) = self.elements.get_mut(id) {
            state.disabled = Some(disabled);
        }
    }

    fn display(&self, id: &str) -> Option<String> {
        self.elements
            .get(id)
            .map(|state| display_from_style(&state.style))
    }

    fn set_display(&mut self, id: &str, display: &str) {
        if let Some(state) = self.elements.get_mut(id) {
            state.style = style_with_display(&state.style, display);
            state.style_changed = true;
        }
    }
}
