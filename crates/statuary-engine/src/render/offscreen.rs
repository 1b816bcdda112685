use crate::device::Gpu;

pub const OFFSCREEN_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const OFFSCREEN_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Multisample render target for the scene pass.
///
/// Holds a color attachment and a combined depth/stencil attachment at the
/// same sample count. With more than one sample, the color attachment
/// resolves into a single-sample texture at the end of the pass; that
/// texture is what later passes sample.
///
/// The size is fixed at creation.
pub struct OffscreenTarget {
    size: (u32, u32),
    sample_count: u32,
    complete: bool,

    color_view: wgpu::TextureView,
    resolve_view: Option<wgpu::TextureView>,
    depth_view: wgpu::TextureView,
}

impl OffscreenTarget {
    /// Creates the target, checking that the adapter can render both
    /// attachment formats at `requested_samples`.
    ///
    /// An unsupported sample count is logged as an error and the target is
    /// built single-sampled instead.
    pub fn new(gpu: &Gpu<'_>, size: (u32, u32), requested_samples: u32) -> Self {
        let color_ok = gpu.supports_sample_count(OFFSCREEN_COLOR_FORMAT, requested_samples);
        let depth_ok = gpu.supports_sample_count(OFFSCREEN_DEPTH_FORMAT, requested_samples);
        let (sample_count, complete) = resolve_sample_count(requested_samples, color_ok, depth_ok);

        if complete {
            log::info!(
                "offscreen target {}x{} with {sample_count}x MSAA",
                size.0,
                size.1
            );
        } else {
            log::error!(
                "offscreen target incomplete: {requested_samples}x MSAA unsupported \
                 (color: {color_ok}, depth/stencil: {depth_ok}); using {sample_count} sample"
            );
        }

        Self::with_sample_count(gpu.device(), size, sample_count, complete)
    }

    fn with_sample_count(
        device: &wgpu::Device,
        size: (u32, u32),
        sample_count: u32,
        complete: bool,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.0.max(1),
            height: size.1.max(1),
            depth_or_array_layers: 1,
        };
        let multisampled = sample_count > 1;

        let color_usage = if multisampled {
            wgpu::TextureUsages::RENDER_ATTACHMENT
        } else {
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("statuary offscreen color"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_COLOR_FORMAT,
            usage: color_usage,
            view_formats: &[],
        });

        let resolve_view = multisampled.then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("statuary offscreen resolve"),
                    size: extent,
                    mip_level_count: 1,
                    sample_count: 1,
                    dimension: wgpu::TextureDimension::D2,
                    format: OFFSCREEN_COLOR_FORMAT,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("statuary offscreen depth/stencil"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            size,
            sample_count,
            complete,
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            resolve_view,
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// False when the requested sample count had to be dropped.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Single-sample color view holding the pass result.
    pub fn sampled_view(&self) -> &wgpu::TextureView {
        self.resolve_view.as_ref().unwrap_or(&self.color_view)
    }

    /// Begins the scene pass: clears color to `clear`, depth to 1.0 and
    /// stencil to 0.
    pub fn begin_pass<'e>(
        &'e self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: wgpu::Color,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("statuary offscreen pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.color_view,
                resolve_target: self.resolve_view.as_ref(),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: if self.resolve_view.is_some() {
                        wgpu::StoreOp::Discard
                    } else {
                        wgpu::StoreOp::Store
                    },
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(0),
                    store: wgpu::StoreOp::Discard,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// Returns `(sample_count, complete)` for a requested count given format
/// support for the color and depth attachments.
pub(crate) fn resolve_sample_count(requested: u32, color_ok: bool, depth_ok: bool) -> (u32, bool) {
    if requested <= 1 {
        return (1, true);
    }
    if color_ok && depth_ok {
        (requested, true)
    } else {
        (1, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── sample count ──────────────────────────────────────────────────────

    #[test]
    fn supported_count_is_kept() {
        assert_eq!(resolve_sample_count(4, true, true), (4, true));
    }

    #[test]
    fn unsupported_color_falls_back() {
        assert_eq!(resolve_sample_count(4, false, true), (1, false));
    }

    #[test]
    fn unsupported_depth_falls_back() {
        assert_eq!(resolve_sample_count(4, true, false), (1, false));
    }

    #[test]
    fn single_sample_always_complete() {
        assert_eq!(resolve_sample_count(1, false, false), (1, true));
        assert_eq!(resolve_sample_count(0, false, false), (1, true));
    }
}
