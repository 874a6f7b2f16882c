// Template renderer: (document, style) → layout description.
// Pure and stateless; the same inputs always give structurally equal layouts.

pub mod layout;
pub mod templates;
pub mod viewport;

pub use layout::Layout;
pub use templates::render;
pub use viewport::Viewport;
