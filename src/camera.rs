//! Maps normalized window coordinates to world coordinates under pan and zoom.

/// 2D affine view over the plane: a world-space origin shown at the center of
/// the viewport, a uniform zoom level and the window aspect ratio.
///
/// The inverse view matrix is cached and recomputed inside every mutator, so
/// a read always observes a matrix consistent with the current state.
pub struct Camera {
	origin: [f32; 2],
	zoom_level: f32,
	aspect_ratio: f32,
	inv_view_matrix: [[f32; 3]; 3],
}

impl Camera {
	pub fn new(screen_width: f32, screen_height: f32, origin: [f32; 2], zoom_level: f32) -> Self {
		debug_assert!(screen_height != 0.0);
		debug_assert!(zoom_level != 0.0);
		let mut camera = Self {
			origin,
			zoom_level,
			aspect_ratio: screen_width / screen_height,
			inv_view_matrix: [[0f32; 3]; 3],
		};
		camera.compute_inv_view_matrix();
		camera
	}

	pub fn origin(&self) -> [f32; 2] {
		self.origin
	}

	pub fn zoom_level(&self) -> f32 {
		self.zoom_level
	}

	pub fn aspect_ratio(&self) -> f32 {
		self.aspect_ratio
	}

	/// World-space width and height currently visible.
	pub fn view_size(&self) -> [f32; 2] {
		[
			2f32 * self.aspect_ratio / self.zoom_level,
			2f32 / self.zoom_level,
		]
	}

	/// Columns of the matrix taking normalized window coordinates to world
	/// coordinates. Handed to the fragment stage as-is.
	pub fn inv_view_matrix(&self) -> &[[f32; 3]; 3] {
		&self.inv_view_matrix
	}

	pub fn set_screen_size(&mut self, width: f32, height: f32) {
		self.aspect_ratio = width / height;
		self.compute_inv_view_matrix();
	}

	pub fn set_origin(&mut self, origin: [f32; 2]) {
		self.origin = origin;
		self.compute_inv_view_matrix();
	}

	/// A zero zoom level would degenerate the view, so that assignment is
	/// rejected and the previous value stays.
	pub fn set_zoom_level(&mut self, zoom_level: f32) {
		if zoom_level == 0.0 {
			return;
		}
		self.zoom_level = zoom_level;
		self.compute_inv_view_matrix();
	}

	/// Zooms by `factor` towards the world point `towards`, which stays
	/// visually fixed while the visible scale changes by `1 + factor`.
	/// A factor of exactly -1 divides by zero; callers keep their factors
	/// away from it.
	pub fn zoom(&mut self, towards: [f32; 2], factor: f32) {
		self.origin = [
			self.origin[0] * (factor + 1f32) - towards[0] * factor,
			self.origin[1] * (factor + 1f32) - towards[1] * factor,
		];
		self.zoom_level /= 1f32 + factor;
		self.compute_inv_view_matrix();
	}

	/// Pans by a window-space delta scaled into world units, so a drag moves
	/// the same fraction of the viewport at any zoom.
	pub fn relative_movement(&mut self, movement: [f32; 2]) {
		self.origin = [
			self.origin[0] + movement[0] / self.zoom_level,
			self.origin[1] + movement[1] / self.zoom_level,
		];
		self.compute_inv_view_matrix();
	}

	/// Maps a point in normalized window coordinates ([-1,1] on both axes)
	/// to world coordinates.
	pub fn window_to_world(&self, win_pos: [f32; 2]) -> [f32; 2] {
		[
			win_pos[0] / self.zoom_level + self.origin[0],
			win_pos[1] / self.zoom_level + self.origin[1],
		]
	}

	fn compute_inv_view_matrix(&mut self) {
		self.inv_view_matrix = [
			[self.aspect_ratio / self.zoom_level, 0f32, 0f32],
			[0f32, 1f32 / self.zoom_level, 0f32],
			[self.origin[0], self.origin[1], 0f32],
		];
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPS: f32 = 1e-5;

	fn assert_close(a: [f32; 2], b: [f32; 2]) {
		assert!(
			(a[0] - b[0]).abs() < EPS && (a[1] - b[1]).abs() < EPS,
			"{:?} != {:?}",
			a,
			b
		);
	}

	#[test]
	fn matrix_matches_closed_form() {
		let camera = Camera::new(800.0, 600.0, [1.5, -0.25], 2.0);
		let aspect_ratio = 800.0 / 600.0f32;
		assert_eq!(
			*camera.inv_view_matrix(),
			[
				[aspect_ratio / 2.0, 0.0, 0.0],
				[0.0, 0.5, 0.0],
				[1.5, -0.25, 0.0]
			]
		);
	}

	#[test]
	fn matrix_recomputes_on_every_mutator() {
		let mut camera = Camera::new(600.0, 600.0, [0.0, 0.0], 1.0);

		camera.set_origin([3.0, 4.0]);
		assert_eq!(camera.inv_view_matrix()[2], [3.0, 4.0, 0.0]);

		camera.set_zoom_level(4.0);
		assert_eq!(camera.inv_view_matrix()[0], [0.25, 0.0, 0.0]);
		assert_eq!(camera.inv_view_matrix()[1], [0.0, 0.25, 0.0]);

		camera.set_screen_size(1200.0, 600.0);
		assert_eq!(camera.inv_view_matrix()[0], [0.5, 0.0, 0.0]);
		assert_eq!(camera.aspect_ratio(), 2.0);

		camera.relative_movement([1.0, 0.0]);
		assert_eq!(camera.inv_view_matrix()[2], [3.25, 4.0, 0.0]);
	}

	#[test]
	fn zero_zoom_level_is_rejected() {
		let mut camera = Camera::new(600.0, 600.0, [0.5, 0.5], 0.5);
		let before = *camera.inv_view_matrix();

		camera.set_zoom_level(0.0);

		assert_eq!(camera.zoom_level(), 0.5);
		assert_eq!(*camera.inv_view_matrix(), before);
	}

	#[test]
	fn window_to_world_matches_direct_form() {
		let camera = Camera::new(600.0, 400.0, [-0.7, 0.3], 2.5);
		for &win in &[[0.0f32, 0.0], [1.0, -1.0], [-0.5, 0.25], [0.125, 0.875]] {
			assert_close(
				camera.window_to_world(win),
				[win[0] / 2.5 + -0.7, win[1] / 2.5 + 0.3],
			);
		}
	}

	#[test]
	fn zoom_keeps_target_point_fixed() {
		let mut camera = Camera::new(600.0, 600.0, [0.4, -0.2], 0.8);
		let win = [0.6, -0.3];
		let towards = camera.window_to_world(win);

		camera.zoom(towards, 0.35);
		assert_close(camera.window_to_world(win), towards);

		camera.zoom(towards, -0.5);
		assert_close(camera.window_to_world(win), towards);
	}

	#[test]
	fn relative_movement_is_invertible() {
		let mut camera = Camera::new(600.0, 600.0, [0.125, 0.25], 0.5);

		camera.relative_movement([0.25, -0.5]);
		camera.relative_movement([-0.25, 0.5]);

		assert_eq!(camera.origin(), [0.125, 0.25]);
	}

	#[test]
	fn view_size_examples() {
		let mut camera = Camera::new(600.0, 600.0, [0.0, 0.0], 0.5);
		assert_eq!(camera.view_size(), [4.0, 4.0]);

		camera.set_zoom_level(1.0);
		assert_eq!(camera.view_size(), [2.0, 2.0]);
	}

	#[test]
	fn zoom_towards_current_origin_leaves_it_in_place() {
		let mut camera = Camera::new(600.0, 600.0, [0.0, 0.0], 0.5);

		camera.zoom([0.0, 0.0], 0.1);

		assert!((camera.zoom_level() - 0.5 / 1.1).abs() < EPS);
		assert_close(camera.origin(), [0.0, 0.0]);
	}
}
