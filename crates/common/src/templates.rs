//! Markup written into the page.
//!
//! Everything interpolated is HTML-escaped by handlebars, so creative markup is
//! carried verbatim in the frame's `srcdoc` attribute.

use error_stack::Report;
use handlebars::Handlebars;
use serde_json::json;

use crate::error::LoaderError;

pub const CREATIVE_FRAME_TEMPLATE: &str = r#"<iframe width="{{width}}" height="{{height}}" scrolling="no" frameborder="0" style="border: none;" srcdoc="{{markup}}"></iframe>"#;

pub const NO_BID_PLACEHOLDER: &str = r#"<span class="ad-placeholder">No bids received</span>"#;

pub const DEBUG_ENTRY_TEMPLATE: &str = r#"<div class="{{class}}"><pre>{{content}}</pre></div>"#;

const CREATIVE_FRAME: &str = "creative_frame";
const DEBUG_ENTRY: &str = "debug_entry";

/// Registered page templates.
pub struct PageTemplates {
    handlebars: Handlebars<'static>,
}

impl std::fmt::Debug for PageTemplates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageTemplates").finish_non_exhaustive()
    }
}

impl PageTemplates {
    /// Compile the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Template`] if a template fails to compile.
    pub fn new() -> Result<Self, Report<LoaderError>> {
        let mut handlebars = Handlebars::new();
        for (name, source) in [
            (CREATIVE_FRAME, CREATIVE_FRAME_TEMPLATE),
            (DEBUG_ENTRY, DEBUG_ENTRY_TEMPLATE),
        ] {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| {
                    Report::new(LoaderError::Template {
                        message: format!("Failed to compile template '{}': {}", name, e),
                    })
                })?;
        }
        Ok(Self { handlebars })
    }

    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String, Report<LoaderError>> {
        self.handlebars.render(name, data).map_err(|e| {
            Report::new(LoaderError::Template {
                message: format!("Failed to render template '{}': {}", name, e),
            })
        })
    }

    /// Borderless, non-scrolling frame carrying the creative markup.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Template`] if rendering fails.
    pub fn creative_frame(
        &self,
        markup: &str,
        width: u32,
        height: u32,
    ) -> Result<String, Report<LoaderError>> {
        self.render(
            CREATIVE_FRAME,
            &json!({"markup": markup, "width": width, "height": height}),
        )
    }

    /// One debug panel entry.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Template`] if rendering fails.
    pub fn debug_entry(&self, class: &str, content: &str) -> Result<String, Report<LoaderError>> {
        self.render(DEBUG_ENTRY, &json!({"class": class, "content": content}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creative_frame_escapes_markup() {
        let templates = PageTemplates::new().expect("templates should compile");
        let frame = templates
            .creative_frame(r#"<div class="ad">Buy</div>"#, 728, 90)
            .expect("should render frame");

        assert!(frame.starts_with("<iframe "));
        assert!(frame.contains(r#"width="728""#));
        assert!(frame.contains(r#"height="90""#));
        assert!(frame.contains(r#"scrolling="no""#));
        assert!(frame.contains("&lt;div class&#x3D;&quot;ad&quot;&gt;Buy&lt;/div&gt;"));
        assert!(!frame.contains("<div"));
    }

    #[test]
    fn test_debug_entry() {
        let templates = PageTemplates::new().expect("templates should compile");
        let entry = templates
            .debug_entry("bid-info no-bid", "top: ix - no bid")
            .expect("should render entry");

        assert_eq!(
            entry,
            r#"<div class="bid-info no-bid"><pre>top: ix - no bid</pre></div>"#
        );
    }
}
