//! The page the loader reads mount points from and renders into.
//!
//! Every mutator tolerates a missing element: writing to an id the page does
//! not have is a no-op.

pub mod html;

pub use html::HtmlPage;

pub trait Page {
    /// Whether an element with this id exists.
    fn has_element(&self, id: &str) -> bool;

    /// Replace the element's content with plain text.
    fn set_text(&mut self, id: &str, text: &str);

    fn set_class(&mut self, id: &str, class: &str);

    /// Replace the element's content with markup.
    fn set_inner_html(&mut self, id: &str, html: &str);

    /// Append markup after the element's current content.
    fn append_html(&mut self, id: &str, html: &str);

    fn set_disabled(&mut self, id: &str, disabled: bool);

    /// The element's inline `display` value, empty if unset. `None` if the
    /// element does not exist.
    fn display(&self, id: &str) -> Option<String>;

    fn set_display(&mut self, id: &str, display: &str);
}
