pub mod context;
pub mod layout;
pub mod overlays;
pub mod sections;

pub use context::RenderContext;
