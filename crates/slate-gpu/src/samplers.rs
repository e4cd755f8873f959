//! Sampler deduplication.
//!
//! Filter/wrap requests arrive in a portable enumeration and are resolved to
//! concrete context filter codes before they are used as a cache key, so two
//! requests that resolve identically share one sampler object per wrap mode.
//! The cache never evicts: the key space is bounded by the closed filter
//! enumeration and the handful of anisotropy levels callers actually use.

use hashbrown::HashMap;
use tracing::trace;

use crate::context::{Context, ContextCapabilities, SamplerId};
use crate::error::ErrorChannel;

/// Portable texture filter request, prior to resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    /// No filtering preference; resolves to nearest.
    #[default]
    None,
    Point,
    Linear,
    Anisotropic,
}

/// Texture coordinate wrap mode. The two modes use distinct sampler objects
/// sharing the same filter settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureAddress {
    #[default]
    Wrap,
    Clamp,
}

impl TextureAddress {
    fn variant_index(self) -> usize {
        match self {
            TextureAddress::Wrap => 0,
            TextureAddress::Clamp => 1,
        }
    }
}

/// Minification filter code as the context consumes it. Minification and mip
/// filtering collapse into a single code at this level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MinFilterCode {
    Nearest,
    Linear,
    NearestMipNearest,
    LinearMipNearest,
    NearestMipLinear,
    LinearMipLinear,
}

/// Magnification filter code as the context consumes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MagFilterCode {
    Nearest,
    Linear,
}

/// The filter tuple as requested through the public setters, before
/// resolution against context capabilities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSpec {
    pub min: TextureFilter,
    pub mag: TextureFilter,
    pub mip: TextureFilter,
    pub max_anisotropy: f32,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            min: TextureFilter::Point,
            mag: TextureFilter::Point,
            mip: TextureFilter::None,
            max_anisotropy: 1.0,
        }
    }
}

/// Resolve a minification request to a concrete code.
pub fn resolve_min_filter(filter: TextureFilter, mip: TextureFilter) -> MinFilterCode {
    let linear = matches!(filter, TextureFilter::Linear | TextureFilter::Anisotropic);
    match mip {
        TextureFilter::None => {
            if linear {
                MinFilterCode::Linear
            } else {
                MinFilterCode::Nearest
            }
        }
        TextureFilter::Point => {
            if linear {
                MinFilterCode::LinearMipNearest
            } else {
                MinFilterCode::NearestMipNearest
            }
        }
        TextureFilter::Linear | TextureFilter::Anisotropic => {
            if linear {
                MinFilterCode::LinearMipLinear
            } else {
                MinFilterCode::NearestMipLinear
            }
        }
    }
}

/// Resolve a magnification request to a concrete code.
pub fn resolve_mag_filter(filter: TextureFilter) -> MagFilterCode {
    match filter {
        TextureFilter::None | TextureFilter::Point => MagFilterCode::Nearest,
        TextureFilter::Linear | TextureFilter::Anisotropic => MagFilterCode::Linear,
    }
}

/// Exact-match cache key: resolved filter codes plus the anisotropy level.
///
/// Anisotropy is stored through its bit pattern so the key is `Eq + Hash`
/// while preserving the exact-tuple-equality contract (no approximate
/// matching of anisotropy values).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SamplerFilterKey {
    pub min: MinFilterCode,
    pub mag: MagFilterCode,
    anisotropy_bits: u32,
}

impl SamplerFilterKey {
    /// Resolve a portable filter request against the context capabilities.
    /// `Anisotropic` degrades to the best available linear filtering when the
    /// context reports no anisotropy support.
    pub fn resolve(spec: FilterSpec, caps: &ContextCapabilities) -> Self {
        let wants_anisotropy = matches!(spec.min, TextureFilter::Anisotropic)
            || matches!(spec.mag, TextureFilter::Anisotropic);
        let anisotropy = if wants_anisotropy && caps.max_anisotropy > 1.0 {
            spec.max_anisotropy.clamp(1.0, caps.max_anisotropy)
        } else {
            1.0
        };
        Self {
            min: resolve_min_filter(spec.min, spec.mip),
            mag: resolve_mag_filter(spec.mag),
            anisotropy_bits: anisotropy.to_bits(),
        }
    }

    pub fn max_anisotropy(&self) -> f32 {
        f32::from_bits(self.anisotropy_bits)
    }
}

/// Parameters for one context sampler object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerDesc {
    pub min: MinFilterCode,
    pub mag: MagFilterCode,
    pub max_anisotropy: f32,
    pub address: TextureAddress,
}

/// The two sampler objects (repeat and clamp) created for one filter key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerVariants {
    wrap_modes: [SamplerId; 2],
}

impl SamplerVariants {
    pub fn for_address(&self, address: TextureAddress) -> SamplerId {
        self.wrap_modes[address.variant_index()]
    }
}

/// Content-addressed sampler store. Lives for the life of the device.
pub(crate) struct SamplerCache {
    samplers: HashMap<SamplerFilterKey, SamplerVariants>,
}

impl SamplerCache {
    pub fn new() -> Self {
        Self {
            samplers: HashMap::new(),
        }
    }

    /// Look up (creating on miss) the sampler pair for `key`.
    ///
    /// Creation failure is recorded in the error channel and leaves the cache
    /// untouched, so the same key is retried at the next apply instead of
    /// being cached as a permanent failure.
    pub fn resolve<C: Context>(
        &mut self,
        context: &mut C,
        errors: &mut ErrorChannel,
        key: SamplerFilterKey,
    ) -> Option<SamplerVariants> {
        if let Some(variants) = self.samplers.get(&key) {
            return Some(*variants);
        }

        let repeat = match context.create_sampler(&SamplerDesc {
            min: key.min,
            mag: key.mag,
            max_anisotropy: key.max_anisotropy(),
            address: TextureAddress::Wrap,
        }) {
            Ok(id) => id,
            Err(err) => {
                errors.record(format_args!("sampler creation failed: {err}"));
                return None;
            }
        };
        let clamp = match context.create_sampler(&SamplerDesc {
            min: key.min,
            mag: key.mag,
            max_anisotropy: key.max_anisotropy(),
            address: TextureAddress::Clamp,
        }) {
            Ok(id) => id,
            Err(err) => {
                context.destroy_sampler(repeat);
                errors.record(format_args!("sampler creation failed: {err}"));
                return None;
            }
        };

        let variants = SamplerVariants {
            wrap_modes: [repeat, clamp],
        };
        trace!(?key, ?variants, "created sampler pair");
        self.samplers.insert(key, variants);
        Some(variants)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.samplers.len()
    }
}
