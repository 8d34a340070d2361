use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use wgpu_glyph::{Section, Scale};
use zerocopy::{AsBytes, FromBytes};

use crate::camera::Camera;

lazy_static! {
	pub static ref ABSOLUTE_PATH: PathBuf = std::env::current_dir().unwrap();
	pub static ref ITERATIONS_SIZE: wgpu::BufferAddress = std::mem::size_of::<Iterations>() as wgpu::BufferAddress;
	pub static ref INV_VIEW_SIZE: wgpu::BufferAddress = std::mem::size_of::<InvView>() as wgpu::BufferAddress;
	pub static ref SEED_SIZE: wgpu::BufferAddress = std::mem::size_of::<Seed>() as wgpu::BufferAddress;
	pub static ref VERTEX_SIZE: wgpu::BufferAddress = std::mem::size_of::<Vertex>() as wgpu::BufferAddress;
}

pub type AtomicDevice = Arc<Mutex<wgpu::Device>>;

#[repr(C)]
#[derive(Clone, Copy, Debug, AsBytes, FromBytes)]
pub struct Iterations {
	pub iterations: u32
}

/// Inverse view matrix in std140 layout, each mat3 column padded to a vec4.
#[repr(C)]
#[derive(Clone, Copy, Debug, AsBytes, FromBytes)]
pub struct InvView {
	pub columns: [[f32; 4]; 3]
}

impl InvView {
	pub fn from_camera(camera: &Camera) -> Self {
		let mut columns = [[0f32; 4]; 3];
		for (column, source) in columns.iter_mut().zip(camera.inv_view_matrix().iter()) {
			column[..3].copy_from_slice(source);
		}
		Self { columns }
	}
}

#[repr(C)]
#[derive(Clone, Copy, Debug, AsBytes, FromBytes)]
pub struct Seed {
	pub seed: [f32; 2]
}

#[repr(C)]
#[derive(Clone, Copy, AsBytes, FromBytes)]
pub struct Vertex {
	/// Where the corner lands in clip space.
	pub pos: [f32; 2],
	/// Normalized window coordinate handed to the fragment shader.
	pub win: [f32; 2],
}

/// Queues every info block twice, a black shadow one pixel down-right and
/// the white text on top of it, and encodes the draw.
pub fn overlay_command(
	device: &AtomicDevice,
	glyph_brush: &mut wgpu_glyph::GlyphBrush<()>,
	target_size: (u32, u32),
	frame: &wgpu::SwapChainOutput,
	blocks: &[(String, (f32, f32))],
) -> wgpu::CommandBuffer {
	let mut encoder =
		device.lock().unwrap().create_command_encoder(&wgpu::CommandEncoderDescriptor { todo: 0 });

	for (text, position) in blocks {
		let section = Section {
			text,
			screen_position: *position,
			scale: Scale::uniform(18.0),
			color: [1.0f32, 1.0f32, 1.0f32, 1.0f32],
			..Section::default()
		};

		let mut shadow = section;
		shadow.color = [0.0f32, 0.0f32, 0.0f32, 1.0f32];
		shadow.screen_position.0 += 1.0f32;
		shadow.screen_position.1 += 1.0f32;

		glyph_brush.queue(shadow);
		glyph_brush.queue(section);
	}

	if let Err(err) = glyph_brush.draw_queued(
		&mut device.lock().unwrap(),
		&mut encoder,
		&frame.view,
		target_size.0,
		target_size.1,
	) {
		log::error!("Text overlay failed: {:?}", err);
	}

	encoder.finish()
}
use notify::{Watcher, RecursiveMode, RecommendedWatcher};
use std::time::Duration;

pub fn create_watcher(path: &PathBuf) -> (RecommendedWatcher, mpsc::Receiver<notify::DebouncedEvent>) {
	let (tx, rx) = mpsc::channel();
	let mut watcher: RecommendedWatcher = Watcher::new(tx, Duration::from_millis(500)).unwrap();

	watcher.watch(path.clone(), RecursiveMode::NonRecursive).unwrap();
	log::info!("Starting watcher on {:?}", path);

	(watcher, rx)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn inv_view_pads_columns_to_vec4() {
		let camera = Camera::new(800.0, 600.0, [1.5, -0.25], 2.0);
		let uniform = InvView::from_camera(&camera);

		for (padded, source) in uniform.columns.iter().zip(camera.inv_view_matrix().iter()) {
			assert_eq!(&padded[..3], &source[..]);
			assert_eq!(padded[3], 0.0);
		}
	}

	#[test]
	fn uniform_sizes_match_std140_expectations() {
		assert_eq!(*ITERATIONS_SIZE, 4);
		assert_eq!(*INV_VIEW_SIZE, 48);
		assert_eq!(*SEED_SIZE, 8);
		assert_eq!(*VERTEX_SIZE, 16);
	}
}
