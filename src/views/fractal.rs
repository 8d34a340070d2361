//! What each view shows, independent of any GPU resource.

use std::ops::{Deref, DerefMut};

use crate::camera::Camera;

/// Which set a view renders. Fixed for the lifetime of the view; selects the
/// fragment shader and decides whether the seed participates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FractalType {
	Mandelbrot,
	Julia,
}

pub const DEFAULT_ZOOM_LEVEL: f32 = 0.5;
const DEFAULT_MAX_ITER: u32 = 100;
const MIN_MAX_ITER: u32 = 2;

/// Parameters of one fractal view plus the redraw bookkeeping. Every change
/// that can alter the rendered image raises `needs_redraw`; only the render
/// step lowers it.
pub struct Fractal {
	kind: FractalType,
	seed: [f32; 2],
	max_iter: u32,
	camera: Camera,
	needs_redraw: bool,
}

impl Fractal {
	pub fn new(kind: FractalType, screen_width: f32, screen_height: f32) -> Self {
		Self {
			kind,
			seed: [0f32, 0f32],
			max_iter: DEFAULT_MAX_ITER,
			camera: Camera::new(screen_width, screen_height, [0f32, 0f32], DEFAULT_ZOOM_LEVEL),
			needs_redraw: true,
		}
	}

	pub fn kind(&self) -> FractalType {
		self.kind
	}

	pub fn seed(&self) -> [f32; 2] {
		self.seed
	}

	pub fn max_iter(&self) -> u32 {
		self.max_iter
	}

	pub fn needs_redraw(&self) -> bool {
		self.needs_redraw
	}

	pub fn camera(&self) -> &Camera {
		&self.camera
	}

	/// Mutable camera access. Dropping the guard marks the view for redraw
	/// whether or not the camera actually changed.
	pub fn camera_mut(&mut self) -> CameraMut {
		CameraMut { fractal: self }
	}

	pub fn set_max_iter(&mut self, max_iter: u32) {
		if max_iter != self.max_iter {
			self.needs_redraw = true;
		}
		self.max_iter = max_iter;
	}

	/// Adds `diff` to the iteration cap, never going below the minimum of 2.
	pub fn change_max_iter(&mut self, diff: i32) {
		let max_iter = (i64::from(self.max_iter) + i64::from(diff))
			.max(i64::from(MIN_MAX_ITER))
			.min(i64::from(u32::max_value())) as u32;
		self.set_max_iter(max_iter);
	}

	/// Stores the seed. Only a Julia view renders it, so only a Julia view
	/// is marked for redraw.
	pub fn set_seed(&mut self, seed: [f32; 2]) {
		if self.kind == FractalType::Julia {
			self.needs_redraw = true;
		}
		self.seed = seed;
	}

	/// Forces the next frame to draw, for when the displayed image went
	/// stale without a parameter change (expose, shader reload).
	pub fn invalidate(&mut self) {
		self.needs_redraw = true;
	}

	pub(crate) fn clear_redraw(&mut self) {
		self.needs_redraw = false;
	}

	/// Human-readable state block for the overlay.
	pub fn info_string(&self) -> String {
		let mut info = String::new();
		info.push_str(&format!("max iteration: {} (A/E)\n", self.max_iter));
		info.push_str(&format!("zoom: {}\n\n", self.camera.zoom_level()));
		if self.kind == FractalType::Julia {
			info.push_str(&format!("seed: {} ; {}\n\n", self.seed[0], self.seed[1]));
		}
		let origin = self.camera.origin();
		let view_size = self.camera.view_size();
		info.push_str(&format!("origin: ({} ; {})\n", origin[0], origin[1]));
		info.push_str(&format!("width:  {}\n", view_size[0]));
		info.push_str(&format!("height: {}", view_size[1]));
		info
	}
}

/// Scope guard for camera mutation. Obtaining it signals intent to mutate,
/// so releasing it unconditionally marks the owning view dirty.
pub struct CameraMut<'a> {
	fractal: &'a mut Fractal,
}

impl<'a> Deref for CameraMut<'a> {
	type Target = Camera;

	fn deref(&self) -> &Camera {
		&self.fractal.camera
	}
}

impl<'a> DerefMut for CameraMut<'a> {
	fn deref_mut(&mut self) -> &mut Camera {
		&mut self.fractal.camera
	}
}

impl<'a> Drop for CameraMut<'a> {
	fn drop(&mut self) {
		self.fractal.needs_redraw = true;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_dirty_with_defaults() {
		let fractal = Fractal::new(FractalType::Mandelbrot, 600.0, 600.0);

		assert!(fractal.needs_redraw());
		assert_eq!(fractal.max_iter(), 100);
		assert_eq!(fractal.seed(), [0.0, 0.0]);
		assert_eq!(fractal.camera().origin(), [0.0, 0.0]);
		assert_eq!(fractal.camera().zoom_level(), 0.5);
	}

	#[test]
	fn set_max_iter_marks_dirty_only_on_change() {
		let mut fractal = Fractal::new(FractalType::Mandelbrot, 600.0, 600.0);
		fractal.clear_redraw();

		fractal.set_max_iter(100);
		assert!(!fractal.needs_redraw());

		fractal.set_max_iter(101);
		assert!(fractal.needs_redraw());

		fractal.clear_redraw();
		fractal.set_max_iter(101);
		assert!(!fractal.needs_redraw());
	}

	#[test]
	fn mutators_never_lower_a_pending_redraw() {
		let mut fractal = Fractal::new(FractalType::Mandelbrot, 600.0, 600.0);
		assert!(fractal.needs_redraw());

		fractal.set_max_iter(100);
		fractal.set_seed([0.0, 0.0]);

		assert!(fractal.needs_redraw());
	}

	#[test]
	fn change_max_iter_clamps_at_two() {
		let mut fractal = Fractal::new(FractalType::Julia, 600.0, 600.0);

		fractal.change_max_iter(-1_000_000);
		assert_eq!(fractal.max_iter(), 2);

		fractal.change_max_iter(-1);
		assert_eq!(fractal.max_iter(), 2);

		fractal.change_max_iter(5);
		assert_eq!(fractal.max_iter(), 7);

		fractal.change_max_iter(i32::min_value());
		assert_eq!(fractal.max_iter(), 2);
	}

	#[test]
	fn seed_dirties_julia_even_on_repeat_values() {
		let mut julia = Fractal::new(FractalType::Julia, 600.0, 600.0);
		julia.clear_redraw();

		julia.set_seed([0.0, 0.0]);
		assert!(julia.needs_redraw());

		julia.clear_redraw();
		julia.set_seed([0.3, -0.2]);
		assert!(julia.needs_redraw());
		assert_eq!(julia.seed(), [0.3, -0.2]);
	}

	#[test]
	fn seed_never_dirties_mandelbrot() {
		let mut mandelbrot = Fractal::new(FractalType::Mandelbrot, 600.0, 600.0);
		mandelbrot.clear_redraw();

		mandelbrot.set_seed([0.3, -0.2]);

		assert!(!mandelbrot.needs_redraw());
		assert_eq!(mandelbrot.seed(), [0.3, -0.2]);
	}

	#[test]
	fn camera_guard_marks_dirty_even_without_mutation() {
		let mut fractal = Fractal::new(FractalType::Mandelbrot, 600.0, 600.0);
		fractal.clear_redraw();

		{
			let _camera = fractal.camera_mut();
		}

		assert!(fractal.needs_redraw());
	}

	#[test]
	fn camera_guard_mutation_flows_through() {
		let mut fractal = Fractal::new(FractalType::Mandelbrot, 600.0, 600.0);
		fractal.clear_redraw();

		fractal.camera_mut().set_origin([1.0, 2.0]);

		assert_eq!(fractal.camera().origin(), [1.0, 2.0]);
		assert!(fractal.needs_redraw());
	}

	#[test]
	fn reads_stay_clean() {
		let mut fractal = Fractal::new(FractalType::Julia, 600.0, 600.0);
		fractal.clear_redraw();

		let _ = fractal.camera().view_size();
		let _ = fractal.info_string();
		let _ = fractal.needs_redraw();

		assert!(!fractal.needs_redraw());
	}

	#[test]
	fn info_string_shows_seed_only_for_julia() {
		let mut julia = Fractal::new(FractalType::Julia, 600.0, 600.0);
		julia.set_seed([0.25, -0.5]);
		assert!(julia.info_string().contains("seed: 0.25 ; -0.5"));

		let mandelbrot = Fractal::new(FractalType::Mandelbrot, 600.0, 600.0);
		assert!(!mandelbrot.info_string().contains("seed"));
		assert!(mandelbrot.info_string().contains("max iteration: 100 (A/E)"));
		assert!(mandelbrot.info_string().contains("width:  4"));
	}
}
