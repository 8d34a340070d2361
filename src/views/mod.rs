//! Home of the fractal views.

mod double;
mod fractal;
mod utils;
mod view;

pub use self::double::DoubleViewManager;
pub use self::fractal::{CameraMut, Fractal, FractalType, DEFAULT_ZOOM_LEVEL};
pub use self::view::{Buffers, FractalLoadError, FractalView};
pub use self::prelude::{FONT_PATH, SHADERS_PATH};

mod prelude;
