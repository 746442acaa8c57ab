pub mod binding;
pub mod map;
pub mod render;
pub mod seen;

pub use binding::LiveBinding;
pub use map::MapLayerAdapter;
pub use render::Renderer;
pub use seen::{FirstSnapshot, SeenSet};
