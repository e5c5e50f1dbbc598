use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, MouseButton, Touch, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, WindowBuilder};

use crate::application::{Overlay, RedrawHook};
use crate::domain::{
    DisplayMetrics, FlatArtwork, Framebuffer, LogSink, OverlayMask, PointerId, TouchEvent,
    TouchPhase,
};
use crate::infrastructure::{FilePreferences, OverlayConfig};

// Touch ids come from the platform; keep the mouse clear of them.
const MOUSE_POINTER: PointerId = PointerId::MAX;
const SCALE_STEP: f32 = 0.25;
const OPACITY_STEP: u8 = 10;

#[derive(Debug, Clone, Copy)]
enum HostEvent {
    Redraw,
}

pub fn run(config: OverlayConfig, prefs_path: PathBuf) {
    pollster::block_on(run_async(config, prefs_path));
}

async fn run_async(config: OverlayConfig, prefs_path: PathBuf) {
    let event_loop = EventLoopBuilder::<HostEvent>::with_user_event()
        .build()
        .expect("event loop");
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("overpad")
            .with_inner_size(PhysicalSize::new(
                config.display.width.max(1),
                config.display.height.max(1),
            ))
            .with_min_inner_size(PhysicalSize::new(320, 240))
            .build(&event_loop)
            .expect("window"),
    );

    let target_window_id = window.id();
    let size = window.inner_size();
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        ..Default::default()
    });
    let surface = instance
        .create_surface(Arc::clone(&window))
        .expect("surface");

    let mut config = config;
    config.display = DisplayMetrics::new(size.width.max(1), size.height.max(1));
    let prefs = FilePreferences::open(&prefs_path);
    let overlay = Overlay::new(&config, LogSink, prefs);
    let mut state = State::new(instance, surface, size, overlay).await;

    let proxy = Mutex::new(event_loop.create_proxy());
    let redraw: RedrawHook = Arc::new(move || {
        if let Ok(proxy) = proxy.lock() {
            let _ = proxy.send_event(HostEvent::Redraw);
        }
    });
    state.overlay.start_idle_timer(redraw);
    log::info!("overlay host ready, layout in {}", prefs_path.display());

    let _ = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, window_id } if window_id == target_window_id => match event {
            WindowEvent::CloseRequested => {
                state.overlay.stop_idle_timer();
                elwt.exit();
            }
            WindowEvent::Resized(size) => {
                state.resize(size);
                window.request_redraw();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    let pressed = event.state == ElementState::Pressed;
                    if pressed && !event.repeat {
                        if code == KeyCode::F11 {
                            toggle_borderless_fullscreen(&window);
                        }
                        state.handle_key(code);
                        window.request_redraw();
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if state.handle_cursor(position) {
                    window.request_redraw();
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button: MouseButton::Left,
                ..
            } => {
                if state.handle_mouse_button(button_state == ElementState::Pressed) {
                    window.request_redraw();
                }
            }
            WindowEvent::Touch(touch) => {
                if state.handle_touch(touch) {
                    window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => match state.render() {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost) => state.resize(state.size),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(wgpu::SurfaceError::Outdated) => {}
                Err(wgpu::SurfaceError::Timeout) => {}
            },
            _ => {}
        },
        Event::UserEvent(HostEvent::Redraw) => window.request_redraw(),
        Event::AboutToWait => elwt.set_control_flow(ControlFlow::Wait),
        _ => {}
    });
}

struct State {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    texture: wgpu::Texture,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
    frame: Framebuffer,
    overlay: Overlay<LogSink, FilePreferences>,
    pointers: PointerTracker,
}

/// Turns mouse and raw touch callbacks into overlay pointer events.
#[derive(Debug, Default)]
struct PointerTracker {
    cursor: PhysicalPosition<f64>,
    mouse_down: bool,
    active: usize,
}

impl PointerTracker {
    fn press(&mut self, pointer: PointerId, x: f32, y: f32) -> TouchEvent {
        let phase = if self.active == 0 {
            TouchPhase::Down
        } else {
            TouchPhase::PointerDown
        };
        self.active += 1;
        TouchEvent::new(phase, pointer, x, y)
    }

    fn release(&mut self, pointer: PointerId, x: f32, y: f32, cancelled: bool) -> TouchEvent {
        self.active = self.active.saturating_sub(1);
        let phase = match (cancelled, self.active) {
            (true, _) => TouchPhase::Cancel,
            (false, 0) => TouchPhase::Up,
            (false, _) => TouchPhase::PointerUp,
        };
        TouchEvent::new(phase, pointer, x, y)
    }
}

impl State {
    async fn new(
        instance: wgpu::Instance,
        surface: wgpu::Surface<'static>,
        size: PhysicalSize<u32>,
        overlay: Overlay<LogSink, FilePreferences>,
    ) -> Self {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                power_preference: wgpu::PowerPreference::LowPower,
                force_fallback_adapter: false,
            })
            .await
            .expect("adapter");
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .expect("device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("overlay_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overlay_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let (texture, bind_group) =
            create_overlay_texture(&device, &bind_group_layout, &sampler, config.width, config.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blit_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_blit.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("overlay_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let frame = Framebuffer::new(config.width as usize, config.height as usize);

        Self {
            surface,
            device,
            queue,
            config,
            size,
            texture,
            bind_group_layout,
            sampler,
            bind_group,
            pipeline,
            frame,
            overlay,
            pointers: PointerTracker::default(),
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.size = size;
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);

        let (texture, bind_group) = create_overlay_texture(
            &self.device,
            &self.bind_group_layout,
            &self.sampler,
            size.width,
            size.height,
        );
        self.texture = texture;
        self.bind_group = bind_group;
        self.frame.resize(size.width as usize, size.height as usize);
        self.overlay
            .set_display(DisplayMetrics::new(size.width, size.height));
    }

    fn handle_key(&mut self, code: KeyCode) {
        let overlay = &mut self.overlay;
        match code {
            KeyCode::KeyE => overlay.set_edit_mode(!overlay.is_editing()),
            KeyCode::Digit1 => overlay.set_state(overlay.mask().toggled(OverlayMask::BASIC)),
            KeyCode::Digit2 => overlay.set_state(overlay.mask().toggled(OverlayMask::L2R2)),
            KeyCode::Digit3 => {
                overlay.set_state(overlay.mask().toggled(OverlayMask::TOUCH_SCREEN_SWITCH))
            }
            KeyCode::Equal | KeyCode::NumpadAdd => {
                overlay.set_scale(overlay.scale() + SCALE_STEP);
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                overlay.set_scale(overlay.scale() - SCALE_STEP);
            }
            KeyCode::BracketLeft => {
                overlay.set_opacity(overlay.opacity().saturating_sub(OPACITY_STEP));
            }
            KeyCode::BracketRight => {
                overlay.set_opacity(overlay.opacity().saturating_add(OPACITY_STEP));
            }
            KeyCode::KeyR => overlay.reset_layout(),
            _ => {}
        }
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) -> bool {
        self.pointers.cursor = position;
        if !self.pointers.mouse_down {
            return false;
        }
        let event = TouchEvent::moved(MOUSE_POINTER, position.x as f32, position.y as f32);
        self.overlay.on_touch(&event).redraw
    }

    fn handle_mouse_button(&mut self, pressed: bool) -> bool {
        if pressed == self.pointers.mouse_down {
            return false;
        }
        self.pointers.mouse_down = pressed;
        let x = self.pointers.cursor.x as f32;
        let y = self.pointers.cursor.y as f32;
        let event = if pressed {
            self.pointers.press(MOUSE_POINTER, x, y)
        } else {
            self.pointers.release(MOUSE_POINTER, x, y, false)
        };
        self.overlay.on_touch(&event).redraw
    }

    fn handle_touch(&mut self, touch: Touch) -> bool {
        let x = touch.location.x as f32;
        let y = touch.location.y as f32;
        let event = match touch.phase {
            winit::event::TouchPhase::Started => self.pointers.press(touch.id, x, y),
            winit::event::TouchPhase::Moved => TouchEvent::moved(touch.id, x, y),
            winit::event::TouchPhase::Ended => self.pointers.release(touch.id, x, y, false),
            winit::event::TouchPhase::Cancelled => self.pointers.release(touch.id, x, y, true),
        };
        self.overlay.on_touch(&event).redraw
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.overlay.draw(&FlatArtwork, &mut self.frame);
        let (padded, bytes_per_row) = prepare_framebuffer_upload(&self.frame);
        let width = self.frame.width() as u32;
        let height = self.frame.height() as u32;

        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &padded,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // Stand-in for the emulated display underneath.
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.08,
                            g: 0.08,
                            b: 0.1,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn create_overlay_texture(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::BindGroup) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("overlay"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("overlay_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    });
    (texture, bind_group)
}

/// Copies the frame into rows padded to wgpu's copy alignment.
fn prepare_framebuffer_upload(frame: &Framebuffer) -> (Vec<u8>, u32) {
    let width = frame.width();
    let height = frame.height();
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
    let padded = unpadded.div_ceil(align) * align;
    let mut data = vec![0u8; padded * height];
    let pixels = frame.as_slice();
    for y in 0..height {
        let src = y * unpadded;
        let dst = y * padded;
        data[dst..dst + unpadded].copy_from_slice(&pixels[src..src + unpadded]);
    }
    (data, padded as u32)
}

fn toggle_borderless_fullscreen(window: &winit::window::Window) {
    if window.fullscreen().is_some() {
        window.set_fullscreen(None);
    } else {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    }
}
