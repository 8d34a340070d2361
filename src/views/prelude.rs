//! Stuff that gets imported by a lot of other files.

pub use winit::dpi;
pub use std::path::{PathBuf, Path};
pub use std::sync::{Arc, Mutex, mpsc};

pub use crate::views::fractal::{Fractal, FractalType, DEFAULT_ZOOM_LEVEL};
pub use crate::views::view::{Buffers, FractalLoadError, FractalView};

pub use crate::views::utils::{
	create_buffer, load_palette, load_shader,
	ZOOM_SENSITIVITY,
	WHOLE_CORNERS, RIGHT_CORNERS, LEFT_CORNERS
};

pub use crate::utils::{
	AtomicDevice,
	ABSOLUTE_PATH,
	Iterations, ITERATIONS_SIZE,
	InvView, INV_VIEW_SIZE,
	Seed, SEED_SIZE,
	Vertex, VERTEX_SIZE
};

pub use notify::{RecommendedWatcher, DebouncedEvent};

lazy_static! {
	/// Directory watched for shader edits.
	pub static ref SHADERS_PATH: PathBuf = {
		let mut shaders_path_buf: PathBuf = ABSOLUTE_PATH.clone();
		shaders_path_buf.push("shaders");

		log::info!("Shaders path: {:?}", shaders_path_buf);
		shaders_path_buf
	};
	/// Vertex shader shared by both views.
	pub static ref VERT_SHADER_PATH: PathBuf = SHADERS_PATH.join("fractal.vert");
	pub static ref MANDELBROT_FRAG_PATH: PathBuf = SHADERS_PATH.join("mandelbrot.frag");
	pub static ref JULIA_FRAG_PATH: PathBuf = SHADERS_PATH.join("julia.frag");
	/// Color strip the fragment shaders sample by escape time.
	pub static ref PALETTE_PATH: PathBuf = {
		let mut palette_path_buf: PathBuf = ABSOLUTE_PATH.clone();
		let x = ["rc", "palette.png"].iter().collect();
		palette_path_buf.push::<PathBuf>(x);
		palette_path_buf
	};
	/// Overlay font. The overlay is skipped when this file is missing.
	pub static ref FONT_PATH: PathBuf = {
		let mut font_path_buf: PathBuf = ABSOLUTE_PATH.clone();
		let x = ["rc", "font.ttf"].iter().collect();
		font_path_buf.push::<PathBuf>(x);
		font_path_buf
	};
}
