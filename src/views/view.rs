//! GPU side of a single fractal view.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::utils::{
	AtomicDevice,
	Iterations, ITERATIONS_SIZE,
	InvView, INV_VIEW_SIZE,
	Seed, SEED_SIZE,
	Vertex, VERTEX_SIZE
};
use crate::views::fractal::{Fractal, FractalType};
use super::utils::{create_buffer, load_palette, load_shader, WHOLE_CORNERS};
use super::prelude::VERT_SHADER_PATH;
use super::prelude::{JULIA_FRAG_PATH, MANDELBROT_FRAG_PATH};

/// Exports are this many pixels tall; width follows the view's aspect ratio.
const EXPORT_HEIGHT: u32 = 3000;

/// Whatever keeps a view from coming up. Anything going wrong later, like a
/// failed reload of an edited shader, is only logged.
#[derive(Debug, Error)]
pub enum FractalLoadError {
	#[error("unable to read shader {path:?}: {source}")]
	ShaderRead {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("unable to compile shader {path:?}: {message}")]
	ShaderCompile {
		path: PathBuf,
		message: String,
	},
	#[error("unable to load palette {path:?}: {source}")]
	PaletteLoad {
		path: PathBuf,
		source: image::ImageError,
	},
}

pub struct Buffers {
	pub iterations: wgpu::Buffer,
	pub inv_view: wgpu::Buffer,
	pub seed: wgpu::Buffer,
	pub corners: wgpu::Buffer,
}

/// One fractal with everything needed to draw it into its part of the
/// window. The uniforms are refreshed from `fractal` on every draw.
pub struct FractalView {
	pub fractal: Fractal,
	pub bufs: Buffers,
	vs_module: wgpu::ShaderModule,
	fs_module: wgpu::ShaderModule,
	pipeline_layout: wgpu::PipelineLayout,
	render_pipeline: wgpu::RenderPipeline,
	bind_group: wgpu::BindGroup,
	frag_shader_path: PathBuf,
}

impl FractalView {
	pub fn new(
		device: &wgpu::Device,
		queue: &mut wgpu::Queue,
		kind: FractalType,
		palette_path: &Path,
		screen_size: [f32; 2],
		corners: &[Vertex],
	) -> Result<Self, FractalLoadError> {
		let fractal = Fractal::new(kind, screen_size[0], screen_size[1]);
		let frag_shader_path = match kind {
			FractalType::Mandelbrot => MANDELBROT_FRAG_PATH.clone(),
			FractalType::Julia => JULIA_FRAG_PATH.clone(),
		};

		let vs = load_shader(&VERT_SHADER_PATH, glsl_to_spirv::ShaderType::Vertex)?;
		let fs = load_shader(&frag_shader_path, glsl_to_spirv::ShaderType::Fragment)?;
		let (palette_view, palette_sampler) = load_palette(device, queue, palette_path)?;

		let iterations_buf = create_buffer(device, Iterations { iterations: fractal.max_iter() });
		let inv_view_buf = create_buffer(device, InvView::from_camera(fractal.camera()));
		let seed_buf = create_buffer(device, Seed { seed: fractal.seed() });

		let corners_buf = device.create_buffer_mapped(
			corners.len(),
			wgpu::BufferUsage::VERTEX
		).fill_from_slice(corners);

		let bind_group_layout =
			device.create_bind_group_layout(
				&wgpu::BindGroupLayoutDescriptor {
					bindings: &[
						wgpu::BindGroupLayoutBinding {
							binding: 0,
							visibility: wgpu::ShaderStage::FRAGMENT,
							ty: wgpu::BindingType::UniformBuffer {
								dynamic: false
							}
						},
						wgpu::BindGroupLayoutBinding {
							binding: 1,
							visibility: wgpu::ShaderStage::FRAGMENT,
							ty: wgpu::BindingType::UniformBuffer {
								dynamic: false
							}
						},
						wgpu::BindGroupLayoutBinding {
							binding: 2,
							visibility: wgpu::ShaderStage::FRAGMENT,
							ty: wgpu::BindingType::UniformBuffer {
								dynamic: false
							}
						},
						wgpu::BindGroupLayoutBinding {
							binding: 3,
							visibility: wgpu::ShaderStage::FRAGMENT,
							ty: wgpu::BindingType::SampledTexture {
								multisampled: false,
								dimension: wgpu::TextureViewDimension::D2,
							}
						},
						wgpu::BindGroupLayoutBinding {
							binding: 4,
							visibility: wgpu::ShaderStage::FRAGMENT,
							ty: wgpu::BindingType::Sampler
						},
					]
				}
			);

		let bind_group = device
			.create_bind_group(&wgpu::BindGroupDescriptor {
				layout: &bind_group_layout,
				bindings: &[
					wgpu::Binding {
						binding: 0,
						resource: wgpu::BindingResource::Buffer {
							buffer: &iterations_buf,
							range: 0..*ITERATIONS_SIZE
						}
					},
					wgpu::Binding {
						binding: 1,
						resource: wgpu::BindingResource::Buffer {
							buffer: &inv_view_buf,
							range: 0..*INV_VIEW_SIZE
						}
					},
					wgpu::Binding {
						binding: 2,
						resource: wgpu::BindingResource::Buffer {
							buffer: &seed_buf,
							range: 0..*SEED_SIZE
						}
					},
					wgpu::Binding {
						binding: 3,
						resource: wgpu::BindingResource::TextureView(&palette_view)
					},
					wgpu::Binding {
						binding: 4,
						resource: wgpu::BindingResource::Sampler(&palette_sampler)
					},
				],
			});

		let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
			bind_group_layouts: &[&bind_group_layout],
		});

		let vs_module = device.create_shader_module(&vs);
		let fs_module = device.create_shader_module(&fs);
		let render_pipeline = create_render_pipeline(device, &pipeline_layout, &vs_module, &fs_module);

		log::info!("Created {:?} view", kind);

		Ok(Self {
			fractal,
			bufs: Buffers {
				iterations: iterations_buf,
				inv_view: inv_view_buf,
				seed: seed_buf,
				corners: corners_buf,
			},
			vs_module,
			fs_module,
			pipeline_layout,
			render_pipeline,
			bind_group,
			frag_shader_path,
		})
	}

	/// Stages the current iteration cap, inverse view matrix and seed into
	/// the uniform buffers the bind group points at.
	fn upload_params(&self, device: &wgpu::Device, encoder: &mut wgpu::CommandEncoder) {
		let temp_buf = device.create_buffer_mapped(
			1,
			wgpu::BufferUsage::COPY_SRC
		).fill_from_slice(&[Iterations { iterations: self.fractal.max_iter() }]);
		encoder.copy_buffer_to_buffer(&temp_buf, 0, &self.bufs.iterations, 0, *ITERATIONS_SIZE);

		let temp_buf = device.create_buffer_mapped(
			1,
			wgpu::BufferUsage::COPY_SRC
		).fill_from_slice(&[InvView::from_camera(self.fractal.camera())]);
		encoder.copy_buffer_to_buffer(&temp_buf, 0, &self.bufs.inv_view, 0, *INV_VIEW_SIZE);

		let temp_buf = device.create_buffer_mapped(
			1,
			wgpu::BufferUsage::COPY_SRC
		).fill_from_slice(&[Seed { seed: self.fractal.seed() }]);
		encoder.copy_buffer_to_buffer(&temp_buf, 0, &self.bufs.seed, 0, *SEED_SIZE);
	}

	pub fn render(
		&mut self,
		device: &AtomicDevice,
		frame: &wgpu::SwapChainOutput,
		clear: bool,
	) -> wgpu::CommandBuffer {
		let mut encoder =
			device.lock().unwrap().create_command_encoder(&wgpu::CommandEncoderDescriptor { todo: 0 });
		self.upload_params(&device.lock().unwrap(), &mut encoder);
		{
			let mut rpass = encoder.begin_render_pass(
				&wgpu::RenderPassDescriptor {
					color_attachments: &[wgpu::RenderPassColorAttachmentDescriptor {
						attachment: &frame.view,
						resolve_target: None,
						load_op: if clear { wgpu::LoadOp::Clear } else { wgpu::LoadOp::Load },
						store_op: wgpu::StoreOp::Store,
						clear_color: wgpu::Color::BLACK
					}],
					depth_stencil_attachment: None,
				}
			);
			rpass.set_pipeline(&self.render_pipeline);
			rpass.set_bind_group(0, &self.bind_group, &[]);
			rpass.set_vertex_buffers(0, &[(&self.bufs.corners, 0)]);
			rpass.draw(0..6, 0..1);
		}
		self.fractal.clear_redraw();

		encoder.finish()
	}

	/// Renders this view alone into an offscreen target and writes it out
	/// as a PNG. Blocks until the readback finishes.
	pub fn save_to_file(&self, device: &AtomicDevice, queue: &mut wgpu::Queue, path: &Path) {
		let view_size = self.fractal.camera().view_size();
		let height = EXPORT_HEIGHT;
		let width = (height as f32 * view_size[0] / view_size[1]).round() as u32;
		log::info!("Rendering {}x{} export of the {:?} view", width, height, self.fractal.kind());

		let device = device.lock().unwrap();

		let texture = device.create_texture(&wgpu::TextureDescriptor {
			size: wgpu::Extent3d { width, height, depth: 1 },
			array_layer_count: 1,
			mip_level_count: 1,
			sample_count: 1,
			dimension: wgpu::TextureDimension::D2,
			format: wgpu::TextureFormat::Bgra8UnormSrgb,
			usage: wgpu::TextureUsage::OUTPUT_ATTACHMENT | wgpu::TextureUsage::COPY_SRC,
		});
		let target = texture.create_default_view();

		let corners_buf = device.create_buffer_mapped(
			WHOLE_CORNERS.len(),
			wgpu::BufferUsage::VERTEX
		).fill_from_slice(&WHOLE_CORNERS);

		// Texture-to-buffer copies need rows aligned to 256 bytes.
		let padded_row = (4 * wgpu::BufferAddress::from(width) + 255) & !255;
		let output_buf = device.create_buffer(&wgpu::BufferDescriptor {
			size: padded_row * wgpu::BufferAddress::from(height),
			usage: wgpu::BufferUsage::MAP_READ | wgpu::BufferUsage::COPY_DST,
		});

		let mut encoder =
			device.create_command_encoder(&wgpu::CommandEncoderDescriptor { todo: 0 });
		self.upload_params(&device, &mut encoder);
		{
			let mut rpass = encoder.begin_render_pass(
				&wgpu::RenderPassDescriptor {
					color_attachments: &[wgpu::RenderPassColorAttachmentDescriptor {
						attachment: &target,
						resolve_target: None,
						load_op: wgpu::LoadOp::Clear,
						store_op: wgpu::StoreOp::Store,
						clear_color: wgpu::Color::BLACK
					}],
					depth_stencil_attachment: None,
				}
			);
			rpass.set_pipeline(&self.render_pipeline);
			rpass.set_bind_group(0, &self.bind_group, &[]);
			rpass.set_vertex_buffers(0, &[(&corners_buf, 0)]);
			rpass.draw(0..6, 0..1);
		}
		encoder.copy_texture_to_buffer(
			wgpu::TextureCopyView {
				texture: &texture,
				mip_level: 0,
				array_layer: 0,
				origin: wgpu::Origin3d { x: 0.0, y: 0.0, z: 0.0 },
			},
			wgpu::BufferCopyView {
				buffer: &output_buf,
				offset: 0,
				row_pitch: padded_row as u32,
				image_height: height,
			},
			wgpu::Extent3d { width, height, depth: 1 },
		);
		queue.submit(&[encoder.finish()]);

		let path = path.to_path_buf();
		output_buf.map_read_async(
			0,
			padded_row * wgpu::BufferAddress::from(height),
			move |result: wgpu::BufferMapAsyncResult<&[u8]>| {
				match result {
					Ok(mapping) => write_png(&path, mapping.data, width, height, padded_row as usize),
					Err(()) => log::error!("Readback for {:?} failed", path),
				}
			}
		);
		device.poll(true);
	}

	/// Swaps in the edited fragment shader. A failed compile keeps the old
	/// pipeline running.
	pub fn reload_fragment_shader(&mut self, device: &AtomicDevice) {
		log::info!("Loading fragment shader {:?}", self.frag_shader_path);
		match load_shader(&self.frag_shader_path, glsl_to_spirv::ShaderType::Fragment) {
			Ok(fs) => {
				let device = device.lock().unwrap();
				self.fs_module = device.create_shader_module(&fs);
				self.render_pipeline =
					create_render_pipeline(&device, &self.pipeline_layout, &self.vs_module, &self.fs_module);
				self.fractal.invalidate();
			}
			Err(err) => log::error!("Ignoring shader reload: {}", err),
		}
	}

	pub fn reload_vertex_shader(&mut self, device: &AtomicDevice) {
		log::info!("Loading vertex shader {:?}", &*VERT_SHADER_PATH);
		match load_shader(&VERT_SHADER_PATH, glsl_to_spirv::ShaderType::Vertex) {
			Ok(vs) => {
				let device = device.lock().unwrap();
				self.vs_module = device.create_shader_module(&vs);
				self.render_pipeline =
					create_render_pipeline(&device, &self.pipeline_layout, &self.vs_module, &self.fs_module);
				self.fractal.invalidate();
			}
			Err(err) => log::error!("Ignoring shader reload: {}", err),
		}
	}
}

fn create_render_pipeline(
	device: &wgpu::Device,
	pipeline_layout: &wgpu::PipelineLayout,
	vs_module: &wgpu::ShaderModule,
	fs_module: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
	log::info!("Creating render pipeline");
	device.create_render_pipeline(
		&wgpu::RenderPipelineDescriptor {
			layout: pipeline_layout,
			vertex_stage: wgpu::ProgrammableStageDescriptor {
				module: vs_module,
				entry_point: "main",
			},
			fragment_stage: Some(wgpu::ProgrammableStageDescriptor {
				module: fs_module,
				entry_point: "main",
			}),
			rasterization_state: Some(wgpu::RasterizationStateDescriptor {
				front_face: wgpu::FrontFace::Ccw,
				cull_mode: wgpu::CullMode::None,
				depth_bias: 0,
				depth_bias_slope_scale: 0.0,
				depth_bias_clamp: 0.0,
			}),
			primitive_topology: wgpu::PrimitiveTopology::TriangleList,
			color_states: &[wgpu::ColorStateDescriptor {
				format: wgpu::TextureFormat::Bgra8UnormSrgb,
				color_blend: wgpu::BlendDescriptor::REPLACE,
				alpha_blend: wgpu::BlendDescriptor::REPLACE,
				write_mask: wgpu::ColorWrite::ALL,
			}],
			depth_stencil_state: None,
			index_format: wgpu::IndexFormat::Uint32,
			vertex_buffers: &[wgpu::VertexBufferDescriptor {
				stride: *VERTEX_SIZE,
				step_mode: wgpu::InputStepMode::Vertex,
				attributes: &[
					wgpu::VertexAttributeDescriptor {
						format: wgpu::VertexFormat::Float2,
						offset: 0,
						shader_location: 0,
					},
					wgpu::VertexAttributeDescriptor {
						format: wgpu::VertexFormat::Float2,
						offset: 8,
						shader_location: 1,
					},
				],
			}],
			sample_count: 1,
			sample_mask: !0,
			alpha_to_coverage_enabled: false,
		}
	)
}

fn write_png(path: &Path, data: &[u8], width: u32, height: u32, padded_row: usize) {
	let mut pixels = Vec::with_capacity(4 * (width * height) as usize);
	for row in data.chunks(padded_row).take(height as usize) {
		for bgra in row[..4 * width as usize].chunks(4) {
			pixels.extend_from_slice(&[bgra[2], bgra[1], bgra[0], bgra[3]]);
		}
	}

	match image::save_buffer(path, &pixels, width, height, image::ColorType::RGBA(8)) {
		Ok(()) => log::info!("Saved render to {:?}", path),
		Err(err) => log::error!("Unable to save {:?}: {}", path, err),
	}
}
