//! Self-contained HTML pages.

pub mod html;

pub use html::render_availability_html;
