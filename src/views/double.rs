//! The two fractal views sharing one window.

use crate::views::prelude::*;
use wgpu::CommandBuffer;
use winit::event::{ElementState, MouseButton, VirtualKeyCode};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Side {
	Left,
	Right,
}

/// Mandelbrot on the left half, its Julia set on the right. Input goes to
/// whichever half the cursor is over.
pub struct DoubleViewManager {
	left: FractalView,
	right: FractalView,
	window_size: [f32; 2],
	cursor_pos: [f32; 2],
	left_button_pressed: bool,
	right_button_pressed: bool,
}

impl DoubleViewManager {
	pub fn new(
		device: &wgpu::Device,
		queue: &mut wgpu::Queue,
		window_size: [f32; 2],
	) -> Result<Self, FractalLoadError> {
		let half_size = [window_size[0] / 2f32, window_size[1]];
		let left = FractalView::new(
			device, queue, FractalType::Mandelbrot, &PALETTE_PATH, half_size, &LEFT_CORNERS
		)?;
		let right = FractalView::new(
			device, queue, FractalType::Julia, &PALETTE_PATH, half_size, &RIGHT_CORNERS
		)?;

		Ok(Self {
			left,
			right,
			window_size,
			cursor_pos: [window_size[0] / 2f32, window_size[1] / 2f32],
			left_button_pressed: false,
			right_button_pressed: false,
		})
	}

	fn hovered_side(&self) -> Side {
		if self.cursor_pos[0] < self.window_size[0] / 2f32 {
			Side::Left
		} else {
			Side::Right
		}
	}

	fn hovered_view(&mut self) -> &mut FractalView {
		match self.hovered_side() {
			Side::Left => &mut self.left,
			Side::Right => &mut self.right,
		}
	}

	pub fn needs_redraw(&self) -> bool {
		self.left.fractal.needs_redraw() || self.right.fractal.needs_redraw()
	}

	/// Forces both halves onto the next frame.
	pub fn invalidate(&mut self) {
		self.left.fractal.invalidate();
		self.right.fractal.invalidate();
	}

	pub fn render(
		&mut self,
		device: &AtomicDevice,
		frame: &wgpu::SwapChainOutput,
	) -> Vec<CommandBuffer> {
		let buf1 = self.left.render(device, frame, true);
		let buf2 = self.right.render(device, frame, false);

		vec![buf1, buf2]
	}

	pub fn resized(&mut self, window_size: [f32; 2]) {
		self.window_size = window_size;
		self.left.fractal.camera_mut().set_screen_size(window_size[0] / 2f32, window_size[1]);
		self.right.fractal.camera_mut().set_screen_size(window_size[0] / 2f32, window_size[1]);
	}

	pub fn mouse_input(&mut self, button: MouseButton, state: ElementState) {
		let pressed = state == ElementState::Pressed;
		match button {
			MouseButton::Left => self.left_button_pressed = pressed,
			MouseButton::Right => {
				self.right_button_pressed = pressed;
				if pressed && self.hovered_side() == Side::Left {
					self.pick_seed();
				}
			}
			_ => {}
		}
	}

	/// Reseeds the Julia view from the world point under the cursor.
	fn pick_seed(&mut self) {
		let win = normalized(self.cursor_pos, self.window_size, Side::Left);
		let seed = self.left.fractal.camera().window_to_world(win);
		log::info!("Julia seed now {:?}", seed);
		self.right.fractal.set_seed(seed);
	}

	pub fn cursor_moved(&mut self, x: f32, y: f32) {
		let prev_cursor_pos = self.cursor_pos;
		self.cursor_pos = [x, y];

		if self.left_button_pressed {
			let side = self.hovered_side();
			let prev = normalized(prev_cursor_pos, self.window_size, side);
			let new = normalized(self.cursor_pos, self.window_size, side);
			let movement = [prev[0] - new[0], prev[1] - new[1]];
			self.hovered_view().fractal.camera_mut().relative_movement(movement);
		}
		if self.right_button_pressed && self.hovered_side() == Side::Left {
			self.pick_seed();
		}
	}

	/// Zooms the hovered half towards the world point under the cursor.
	pub fn scrolled(&mut self, delta: f32) {
		let side = self.hovered_side();
		let win = normalized(self.cursor_pos, self.window_size, side);
		let view = match side {
			Side::Left => &mut self.left,
			Side::Right => &mut self.right,
		};
		let towards = view.fractal.camera().window_to_world(win);
		view.fractal.camera_mut().zoom(towards, ZOOM_SENSITIVITY * delta);
	}

	pub fn key_pressed(&mut self, key: VirtualKeyCode, device: &AtomicDevice, queue: &mut wgpu::Queue) {
		match key {
			VirtualKeyCode::A => self.hovered_view().fractal.change_max_iter(1),
			VirtualKeyCode::E => self.hovered_view().fractal.change_max_iter(-1),
			VirtualKeyCode::R => {
				let mut camera = self.hovered_view().fractal.camera_mut();
				camera.set_origin([0f32, 0f32]);
				camera.set_zoom_level(DEFAULT_ZOOM_LEVEL);
			}
			VirtualKeyCode::S => {
				let view = match self.hovered_side() {
					Side::Left => &self.left,
					Side::Right => &self.right,
				};
				view.save_to_file(device, queue, Path::new("fractal.png"));
			}
			_ => {}
		}
	}

	/// Rebuilds whichever pipelines use the edited shader file.
	pub fn reload_shader(&mut self, device: &AtomicDevice, path: &Path) {
		match path.file_name().and_then(|name| name.to_str()) {
			Some("mandelbrot.frag") => self.left.reload_fragment_shader(device),
			Some("julia.frag") => self.right.reload_fragment_shader(device),
			Some("fractal.vert") => {
				self.left.reload_vertex_shader(device);
				self.right.reload_vertex_shader(device);
			}
			_ => {}
		}
	}

	/// Overlay text for both halves with their window positions.
	pub fn info_blocks(&self) -> Vec<(String, (f32, f32))> {
		let margin = self.window_size[1] / 100f32;
		vec![
			(self.left.fractal.info_string(), (margin, margin)),
			(self.right.fractal.info_string(), (self.window_size[0] / 2f32 + margin, margin)),
		]
	}
}

/// Window pixels to the normalized coordinates of one half, with y pointing
/// up like world space.
fn normalized(cursor_pos: [f32; 2], window_size: [f32; 2], side: Side) -> [f32; 2] {
	let half_width = window_size[0] / 2f32;
	let x_offset = match side {
		Side::Left => 0f32,
		Side::Right => half_width,
	};
	[
		(cursor_pos[0] - x_offset) / half_width * 2f32 - 1f32,
		(window_size[1] - cursor_pos[1]) / window_size[1] * 2f32 - 1f32,
	]
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPS: f32 = 1e-5;

	fn assert_close(a: [f32; 2], b: [f32; 2]) {
		assert!((a[0] - b[0]).abs() < EPS && (a[1] - b[1]).abs() < EPS, "{:?} != {:?}", a, b);
	}

	#[test]
	fn normalized_covers_each_half() {
		let size = [1200f32, 600f32];

		assert_close(normalized([300f32, 300f32], size, Side::Left), [0f32, 0f32]);
		assert_close(normalized([0f32, 600f32], size, Side::Left), [-1f32, -1f32]);
		assert_close(normalized([600f32, 0f32], size, Side::Left), [1f32, 1f32]);

		assert_close(normalized([900f32, 300f32], size, Side::Right), [0f32, 0f32]);
		assert_close(normalized([600f32, 600f32], size, Side::Right), [-1f32, -1f32]);
		assert_close(normalized([1200f32, 0f32], size, Side::Right), [1f32, 1f32]);
	}

	#[test]
	fn dragging_down_lowers_normalized_y() {
		let size = [1200f32, 600f32];
		let before = normalized([300f32, 200f32], size, Side::Left);
		let after = normalized([300f32, 400f32], size, Side::Left);

		assert!(after[1] < before[1]);
	}
}
