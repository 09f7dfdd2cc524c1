use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

const SRGB_FORMATS: [wgpu::TextureFormat; 2] = [
    wgpu::TextureFormat::Bgra8UnormSrgb,
    wgpu::TextureFormat::Rgba8UnormSrgb,
];

const LINEAR_FORMATS: [wgpu::TextureFormat; 2] = [
    wgpu::TextureFormat::Bgra8Unorm,
    wgpu::TextureFormat::Rgba8Unorm,
];

/// Picks a surface format from `supported`, honoring the sRGB preference when
/// one of the common 8-bit formats is available.
pub(crate) fn choose_surface_format(
    supported: &[wgpu::TextureFormat],
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let preferred = if prefer_srgb { SRGB_FORMATS } else { LINEAR_FORMATS };
    preferred
        .into_iter()
        .find(|f| supported.contains(f))
        .or_else(|| supported.first().copied())
}

pub(crate) fn choose_alpha_mode(
    supported: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| supported.contains(m))
        .or_else(|| supported.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Applies a new drawable size. A zero-area size is recorded but not
/// configured; wgpu rejects 0x0 surfaces.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if new_size.width == 0 || new_size.height == 0 {
        log::debug!("surface resize to {}x{} deferred", new_size.width, new_size.height);
        return;
    }

    config.width = new_size.width;
    config.height = new_size.height;
    surface.configure(device, config);
}

pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: wgpu::SurfaceError,
) -> SurfaceErrorAction {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            if size.width > 0 && size.height > 0 {
                surface.configure(device, config);
            }
            log::debug!("surface {err:?}; reconfigured");
            SurfaceErrorAction::Reconfigured
        }
        wgpu::SurfaceError::OutOfMemory => {
            log::error!("surface out of memory");
            SurfaceErrorAction::Fatal
        }
        wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => {
            log::warn!("surface {err:?}; skipping frame");
            SurfaceErrorAction::SkipFrame
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat as F;

    #[test]
    fn linear_preference_skips_srgb() {
        let supported = [F::Bgra8UnormSrgb, F::Bgra8Unorm];
        assert_eq!(choose_surface_format(&supported, false), Some(F::Bgra8Unorm));
        assert_eq!(choose_surface_format(&supported, true), Some(F::Bgra8UnormSrgb));
    }

    #[test]
    fn falls_back_to_first_supported() {
        assert_eq!(choose_surface_format(&[F::Rgb10a2Unorm], false), Some(F::Rgb10a2Unorm));
        assert_eq!(choose_surface_format(&[], true), None);
    }

    #[test]
    fn unsupported_alpha_mode_is_replaced() {
        let supported = [wgpu::CompositeAlphaMode::Opaque];
        assert_eq!(
            choose_alpha_mode(&supported, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
        assert_eq!(choose_alpha_mode(&[], None), wgpu::CompositeAlphaMode::Auto);
    }
}
