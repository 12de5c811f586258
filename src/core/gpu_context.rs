use std::sync::Arc;

use anyhow::{anyhow, Result};
use wgpu::{Adapter, Device, DeviceDescriptor, Features, Instance, Limits, Queue, Surface};

/// Device and queue for one render surface
///
/// Device and queue are reference counted so pipelines and buffers can be
/// built from a cheap clone of the context.
#[derive(Clone)]
pub struct GpuContext {
    adapter: Arc<Adapter>,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GpuContext {
    /// Create a context whose adapter can present to `surface`
    pub async fn for_surface(instance: &Instance, surface: &Surface<'_>) -> Result<Self> {
        let adapter = Self::request_adapter(instance, surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        Ok(Self {
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    /// Get reference to the device
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Get reference to the queue
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Highest MSAA sample count up to `requested` the device may use with `format`
    pub fn supported_sample_count(&self, format: wgpu::TextureFormat, requested: u32) -> u32 {
        let adapter_specific = self
            .device
            .features()
            .contains(Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES);
        let flags = self.adapter.get_texture_format_features(format).flags;
        pick_sample_count(requested, adapter_specific, |count| {
            flags.sample_count_supported(count)
        })
    }

    /// Request adapter with surface compatibility
    async fn request_adapter(instance: &Instance, surface: &Surface<'_>) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("Failed to find appropriate adapter: {:?}", e))
    }

    /// Request device and queue
    async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
        // Downlevel limits so GL adapters qualify
        let limits = Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());
        // Sample counts beyond 1 and 4 need adapter-specific format features
        let required_features =
            adapter.features() & Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;

        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Ambient Backdrop Device"),
                required_features,
                required_limits: limits,
                memory_hints: wgpu::MemoryHints::MemoryUsage,
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| anyhow!("Failed to create device: {:?}", e))
    }
}

/// Counts every device accepts for a renderable format
const GUARANTEED_SAMPLE_COUNTS: [u32; 2] = [4, 1];

/// Pick the highest count not above `requested`
///
/// Without adapter-specific format features only the guaranteed counts are
/// valid, whatever the adapter reports.
fn pick_sample_count(
    requested: u32,
    adapter_specific: bool,
    supported: impl Fn(u32) -> bool,
) -> u32 {
    if adapter_specific {
        [16, 8, 4, 2]
            .into_iter()
            .filter(|&count| count <= requested)
            .find(|&count| supported(count))
            .unwrap_or(1)
    } else {
        GUARANTEED_SAMPLE_COUNTS
            .into_iter()
            .find(|&count| count <= requested)
            .unwrap_or(1)
    }
}
