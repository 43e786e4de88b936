pub mod native;
pub(crate) mod shared;

pub use native::Renderer;
