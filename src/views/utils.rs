pub use crate::utils::{
	AtomicDevice,
	ABSOLUTE_PATH,
	Iterations, ITERATIONS_SIZE,
	InvView, INV_VIEW_SIZE,
	Seed, SEED_SIZE,
	Vertex, VERTEX_SIZE,
};

/// How much one scroll line zooms, as the factor handed to `Camera::zoom`.
pub const ZOOM_SENSITIVITY: f32 = 0.1;

pub fn create_buffer<T: 'static + Copy>(device: &wgpu::Device, value: T) -> wgpu::Buffer {
	device.create_buffer_mapped(
		1,
		wgpu::BufferUsage::UNIFORM
			| wgpu::BufferUsage::COPY_DST
	).fill_from_slice(&[value])
}

/// Two triangles covering a viewport, in normalized window coordinates.
const WIN: [[f32; 2]; 6] = [
	[-1f32, -1f32],
	[1f32, 1f32],
	[-1f32, 1f32],
	[-1f32, -1f32],
	[1f32, 1f32],
	[1f32, -1f32],
];

fn corners(x_min: f32, x_max: f32) -> Vec<Vertex> {
	WIN.iter().map(|win| Vertex {
		pos: [if win[0] < 0f32 { x_min } else { x_max }, win[1]],
		win: *win,
	}).collect()
}

lazy_static! {
	pub static ref WHOLE_CORNERS: Vec<Vertex> = corners(-1f32, 1f32);
	pub static ref LEFT_CORNERS: Vec<Vertex> = corners(-1f32, 0f32);
	pub static ref RIGHT_CORNERS: Vec<Vertex> = corners(0f32, 1f32);
}
use super::prelude::*;

pub fn load_shader(path: &Path, stage: glsl_to_spirv::ShaderType) -> Result<Vec<u32>, FractalLoadError> {
	let source = std::fs::read_to_string(path)
		.map_err(|source| FractalLoadError::ShaderRead { path: path.to_path_buf(), source })?;
	let compiled = glsl_to_spirv::compile(&source, stage)
		.map_err(|message| FractalLoadError::ShaderCompile { path: path.to_path_buf(), message })?;

	wgpu::read_spirv(compiled)
		.map_err(|source| FractalLoadError::ShaderRead { path: path.to_path_buf(), source })
}

/// Uploads the palette image and returns the view and sampler the fragment
/// shaders index by escape time.
pub fn load_palette(
	device: &wgpu::Device,
	queue: &mut wgpu::Queue,
	path: &Path
) -> Result<(wgpu::TextureView, wgpu::Sampler), FractalLoadError> {
	let palette = image::open(path)
		.map_err(|source| FractalLoadError::PaletteLoad { path: path.to_path_buf(), source })?
		.to_rgba();
	let (width, height) = palette.dimensions();

	let texture = device.create_texture(&wgpu::TextureDescriptor {
		size: wgpu::Extent3d { width, height, depth: 1 },
		array_layer_count: 1,
		mip_level_count: 1,
		sample_count: 1,
		dimension: wgpu::TextureDimension::D2,
		format: wgpu::TextureFormat::Rgba8UnormSrgb,
		usage: wgpu::TextureUsage::SAMPLED | wgpu::TextureUsage::COPY_DST,
	});

	let pixels = palette.into_raw();
	let pixel_buf = device.create_buffer_mapped(pixels.len(), wgpu::BufferUsage::COPY_SRC)
		.fill_from_slice(&pixels);

	let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor { todo: 0 });
	encoder.copy_buffer_to_texture(
		wgpu::BufferCopyView {
			buffer: &pixel_buf,
			offset: 0,
			row_pitch: 4 * width,
			image_height: height,
		},
		wgpu::TextureCopyView {
			texture: &texture,
			mip_level: 0,
			array_layer: 0,
			origin: wgpu::Origin3d { x: 0.0, y: 0.0, z: 0.0 },
		},
		wgpu::Extent3d { width, height, depth: 1 },
	);
	queue.submit(&[encoder.finish()]);

	let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
		address_mode_u: wgpu::AddressMode::ClampToEdge,
		address_mode_v: wgpu::AddressMode::ClampToEdge,
		address_mode_w: wgpu::AddressMode::ClampToEdge,
		mag_filter: wgpu::FilterMode::Linear,
		min_filter: wgpu::FilterMode::Linear,
		mipmap_filter: wgpu::FilterMode::Nearest,
		lod_min_clamp: -100.0,
		lod_max_clamp: 100.0,
		compare_function: wgpu::CompareFunction::Always,
	});

	log::info!("Loaded palette {:?} ({}x{})", path, width, height);
	Ok((texture.create_default_view(), sampler))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn corner_tables_share_the_window_mapping() {
		assert_eq!(WHOLE_CORNERS.len(), 6);
		for (corner, win) in WHOLE_CORNERS.iter().zip(WIN.iter()) {
			assert_eq!(corner.win, *win);
			assert_eq!(corner.pos, *win);
		}
	}

	#[test]
	fn half_tables_clamp_x_to_their_half() {
		for (corner, win) in LEFT_CORNERS.iter().zip(WIN.iter()) {
			assert_eq!(corner.win, *win);
			assert_eq!(corner.pos[0], if win[0] < 0.0 { -1.0 } else { 0.0 });
			assert_eq!(corner.pos[1], win[1]);
		}
		for (corner, win) in RIGHT_CORNERS.iter().zip(WIN.iter()) {
			assert_eq!(corner.win, *win);
			assert_eq!(corner.pos[0], if win[0] < 0.0 { 0.0 } else { 1.0 });
			assert_eq!(corner.pos[1], win[1]);
		}
	}
}
