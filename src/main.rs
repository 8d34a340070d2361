extern crate env_logger;
extern crate glsl_to_spirv;
extern crate image;
#[macro_use]
extern crate lazy_static;
extern crate log;
extern crate notify;
extern crate thiserror;
extern crate wgpu;
extern crate wgpu_glyph;
extern crate winit;
extern crate zerocopy;

mod camera;
mod utils;
mod views;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use notify::DebouncedEvent;
use wgpu_glyph::GlyphBrushBuilder;
use winit::{
	event,
	event_loop::{ControlFlow, EventLoop},
};

use crate::utils::{create_watcher, overlay_command, AtomicDevice};
use crate::views::{DoubleViewManager, FONT_PATH, SHADERS_PATH};

/// Up to 50 frames a second while parameters keep changing.
const FRAME_BUDGET: Duration = Duration::from_millis(20);

fn main() {
	env_logger::init();
	let event_loop = EventLoop::new();

	let (_window, hidpi_factor, size, surface) = {
		let window = winit::window::WindowBuilder::new()
			.with_title("Fractals: Mandelbrot | Julia")
			.with_inner_size(winit::dpi::LogicalSize::new(1200.0, 600.0))
			.build(&event_loop)
			.unwrap();
		let hidpi_factor = window.hidpi_factor();
		let size = window.inner_size().to_physical(hidpi_factor);

		let surface = wgpu::Surface::create(&window);
		(window, hidpi_factor, size, surface)
	};

	let adapter = wgpu::Adapter::request(
		&wgpu::RequestAdapterOptions {
			power_preference: wgpu::PowerPreference::Default,
			backends: wgpu::BackendBit::PRIMARY,
		},
	).unwrap();

	let (device, mut queue) = adapter.request_device(&wgpu::DeviceDescriptor {
		extensions: wgpu::Extensions {
			anisotropic_filtering: false,
		},
		limits: wgpu::Limits::default(),
	});

	let mut manager = match DoubleViewManager::new(
		&device,
		&mut queue,
		[size.width as f32, size.height as f32],
	) {
		Ok(manager) => manager,
		Err(err) => {
			log::error!("Unable to set up the fractal views: {}", err);
			std::process::exit(1);
		}
	};

	let device: AtomicDevice = Arc::new(Mutex::new(device));

	let mut glyph_brush = match std::fs::read(&*FONT_PATH) {
		Ok(font) => Some(
			GlyphBrushBuilder::using_font_bytes(font)
				.build(&mut device.lock().unwrap(), wgpu::TextureFormat::Bgra8UnormSrgb),
		),
		Err(err) => {
			log::warn!("No overlay font at {:?}, running without the overlay: {}", &*FONT_PATH, err);
			None
		}
	};

	let (watcher, shader_rx) = create_watcher(&SHADERS_PATH);
	let mut watcher = Some(watcher);

	let mut sc_desc = wgpu::SwapChainDescriptor {
		usage: wgpu::TextureUsage::OUTPUT_ATTACHMENT,
		format: wgpu::TextureFormat::Bgra8UnormSrgb,
		width: size.width.round() as u32,
		height: size.height.round() as u32,
		present_mode: wgpu::PresentMode::Vsync,
	};

	let mut swap_chain = device.lock().unwrap().create_swap_chain(&surface, &sc_desc);

	let mut past = Instant::now();

	event_loop.run(move |event, _, control_flow| {
		*control_flow = ControlFlow::Poll;
		match event {
			event::Event::WindowEvent { event, .. } => match event {
				event::WindowEvent::Resized(size) => {
					let physical = size.to_physical(hidpi_factor);
					log::info!("Resizing to {:?}", physical);
					if physical.width == 0. || physical.height == 0. {
						return;
					}
					sc_desc.width = physical.width.round() as u32;
					sc_desc.height = physical.height.round() as u32;
					swap_chain = device.lock().unwrap().create_swap_chain(&surface, &sc_desc);
					manager.resized([physical.width as f32, physical.height as f32]);
				}
				event::WindowEvent::KeyboardInput {
					input:
					event::KeyboardInput {
						virtual_keycode: Some(key),
						state: event::ElementState::Pressed,
						..
					},
					..
				} => match key {
					event::VirtualKeyCode::Escape => {
						*control_flow = ControlFlow::Exit;
					}
					key => manager.key_pressed(key, &device, &mut queue),
				},
				event::WindowEvent::CloseRequested => {
					*control_flow = ControlFlow::Exit;
				}
				event::WindowEvent::MouseInput { button, state, .. } => {
					manager.mouse_input(button, state);
				}
				event::WindowEvent::CursorMoved { position, .. } => {
					let physical = position.to_physical(hidpi_factor);
					manager.cursor_moved(physical.x as f32, physical.y as f32);
				}
				event::WindowEvent::MouseWheel { delta, .. } => {
					let y_delta = match delta {
						event::MouseScrollDelta::LineDelta(_, y) => y,
						event::MouseScrollDelta::PixelDelta(pos) => (pos.y / 40.0) as f32,
					};
					if y_delta != 0f32 {
						manager.scrolled(y_delta);
					}
				}
				event::WindowEvent::RedrawRequested => {
					manager.invalidate();
				}
				_ => {}
			},
			event::Event::EventsCleared => {
				while let Ok(change) = shader_rx.try_recv() {
					match change {
						DebouncedEvent::Write(path) | DebouncedEvent::Create(path) => {
							manager.reload_shader(&device, &path);
						}
						_ => {}
					}
				}

				let elapsed = past.elapsed();
				if elapsed < FRAME_BUDGET {
					std::thread::sleep(FRAME_BUDGET - elapsed);
				}
				past = Instant::now();

				if !manager.needs_redraw() {
					return;
				}

				let frame = swap_chain.get_next_texture();
				let mut bufs = manager.render(&device, &frame);
				if let Some(glyph_brush) = glyph_brush.as_mut() {
					bufs.push(overlay_command(
						&device,
						glyph_brush,
						(sc_desc.width, sc_desc.height),
						&frame,
						&manager.info_blocks(),
					));
				}
				queue.submit(&bufs);
			}
			event::Event::LoopDestroyed => {
				// Drop the watcher with the window, not at process teardown.
				watcher.take();
			}
			_ => (),
		}
	});
}
