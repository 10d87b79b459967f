pub mod frame;
pub mod renderer;
pub mod surface;

pub use frame::{FrameRow, WidgetFrame};
pub use renderer::Renderer;
pub use surface::{JsonSurface, Surface};
