use anyhow::{anyhow, Context as AnyhowContext, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::TextureFormatFeatureFlags;
use winit::dpi::PhysicalSize;

use crate::types::Antialiasing;

pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub sample_count: u32,
    pub surface_format: wgpu::TextureFormat,
}

impl GpuContext {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        vsync: bool,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target
            .window_handle()
            .map_err(|err| anyhow!("failed to acquire window handle: {err}"))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| anyhow!("failed to acquire display handle: {err}"))?;

        // The window outlives the surface: both live on the render thread and
        // the surface is dropped first.
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .context("failed to create rendering surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let adapter_info = adapter.get_info();
        let limits = adapter.limits();
        let is_software = adapter_info.device_type == wgpu::DeviceType::Cpu;
        tracing::debug!(
            name = %adapter_info.name,
            backend = ?adapter_info.backend,
            device_type = ?adapter_info.device_type,
            is_software,
            "selected GPU adapter"
        );

        if limits.max_storage_buffers_per_shader_stage == 0 {
            anyhow::bail!(
                "GPU adapter {} does not support storage buffers in shaders",
                adapter_info.name
            );
        }

        let max_dimension = limits.max_texture_dimension_2d;
        let requested_width = initial_size.width.max(1);
        let requested_height = initial_size.height.max(1);
        if requested_width > max_dimension || requested_height > max_dimension {
            anyhow::bail!(
                "GPU max texture dimension is {max_dimension}, requested surface is {requested_width}x{requested_height}"
            );
        }

        let surface_caps = surface.get_capabilities(&adapter);
        // Shader output is written as-is (gamma space), so skip sRGB encoding.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;
        if surface_format.is_srgb() {
            tracing::warn!(
                ?surface_format,
                "no linear (non-sRGB) surface format available; colors will look brighter"
            );
        }

        let format_features = adapter.get_texture_format_features(surface_format);
        let sample_count = select_sample_count(
            antialiasing,
            format_features.flags.supported_sample_counts(),
            format_features
                .flags
                .contains(TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE),
            is_software,
        );

        let mut required_features = wgpu::Features::empty();
        if sample_count > 4 {
            required_features |= wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("led visualizer device"),
            required_features,
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        let present_mode = select_present_mode(&surface_caps.present_modes, vsync);
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        tracing::debug!(?present_mode, vsync, sample_count, "configuring surface");

        let size = PhysicalSize::new(requested_width, requested_height);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size,
            sample_count,
            surface_format,
        })
    }

    /// Zero-sized windows (minimized) keep the previous configuration.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub(crate) fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub(crate) fn aspect(&self) -> f32 {
        self.size.width.max(1) as f32 / self.size.height.max(1) as f32
    }
}

fn select_sample_count(
    antialiasing: Antialiasing,
    mut supported_samples: Vec<u32>,
    supports_resolve: bool,
    is_software: bool,
) -> u32 {
    if !supported_samples.contains(&1) {
        supported_samples.push(1);
    }
    supported_samples.sort_unstable();
    supported_samples.dedup();

    let sample_count = match antialiasing {
        Antialiasing::Auto => supported_samples.last().copied().unwrap_or(1),
        Antialiasing::Off => 1,
        Antialiasing::Samples(requested) => {
            if supported_samples.contains(&requested) {
                requested
            } else {
                let fallback = supported_samples
                    .iter()
                    .copied()
                    .filter(|&count| count <= requested)
                    .max()
                    .unwrap_or(1);
                tracing::warn!(
                    requested,
                    fallback,
                    ?supported_samples,
                    "requested MSAA sample count not supported; falling back"
                );
                fallback
            }
        }
    };

    if sample_count > 1 && !supports_resolve {
        tracing::warn!("surface format does not support MSAA resolve; disabling MSAA");
        return 1;
    }
    if sample_count > 1 && is_software {
        tracing::warn!(
            sample_count,
            "software rasterizer detected; disabling MSAA for performance"
        );
        return 1;
    }
    sample_count
}

/// Fifo when vsync is on; otherwise Immediate, then Mailbox, then whatever
/// the surface offers first.
fn select_present_mode(modes: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    let find = |wanted: wgpu::PresentMode| modes.iter().copied().find(|mode| *mode == wanted);
    let fallback = modes.first().copied().unwrap_or(wgpu::PresentMode::Fifo);
    if vsync {
        find(wgpu::PresentMode::Fifo).unwrap_or(fallback)
    } else {
        find(wgpu::PresentMode::Immediate)
            .or_else(|| find(wgpu::PresentMode::Mailbox))
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::PresentMode;

    #[test]
    fn auto_picks_highest_supported_count() {
        assert_eq!(
            select_sample_count(Antialiasing::Auto, vec![4, 1, 2], true, false),
            4
        );
    }

    #[test]
    fn unsupported_request_falls_back_to_lower_count() {
        assert_eq!(
            select_sample_count(Antialiasing::Samples(8), vec![1, 4], true, false),
            4
        );
        assert_eq!(
            select_sample_count(Antialiasing::Samples(2), vec![4], true, false),
            1
        );
    }

    #[test]
    fn msaa_disabled_without_resolve_or_on_software() {
        assert_eq!(
            select_sample_count(Antialiasing::Samples(4), vec![1, 4], false, false),
            1
        );
        assert_eq!(
            select_sample_count(Antialiasing::Auto, vec![1, 4], true, true),
            1
        );
        assert_eq!(
            select_sample_count(Antialiasing::Off, vec![1, 4], true, false),
            1
        );
    }

    #[test]
    fn vsync_prefers_fifo() {
        let modes = [PresentMode::Mailbox, PresentMode::Fifo];
        assert_eq!(select_present_mode(&modes, true), PresentMode::Fifo);
    }

    #[test]
    fn no_vsync_prefers_immediate_then_mailbox() {
        let modes = [PresentMode::Fifo, PresentMode::Mailbox, PresentMode::Immediate];
        assert_eq!(select_present_mode(&modes, false), PresentMode::Immediate);
        let modes = [PresentMode::Fifo, PresentMode::Mailbox];
        assert_eq!(select_present_mode(&modes, false), PresentMode::Mailbox);
        assert_eq!(select_present_mode(&[], false), PresentMode::Fifo);
    }
}
