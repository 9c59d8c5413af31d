//! Syntax highlighting collaborator.
//!
//! Renderers hand source text (SQL statements, JSON bodies) and a language id
//! to a [`Highlighter`] and embed whatever markup comes back. The returned
//! markup must already be safe to embed in HTML.

pub trait Highlighter: Send + Sync {
    fn highlight(&self, source: &str, language: &str) -> String;
}
