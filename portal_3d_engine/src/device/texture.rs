/// Texture trait, texture descriptor, texture info and sampler state

/// Texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum TextureFormat {
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    /// Half-float color, used for off-screen frame buffers
    R16G16B16A16_SFLOAT,
    D32_FLOAT,
    D24_UNORM_S8_UINT,
}

impl TextureFormat {
    /// Size of one texel in bytes
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            TextureFormat::R16G16B16A16_SFLOAT => 8,
            _ => 4,
        }
    }

    /// Returns true for depth (and depth/stencil) formats
    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::D32_FLOAT | TextureFormat::D24_UNORM_S8_UINT)
    }
}

/// Texture usage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureUsage {
    /// Texture can be sampled in shaders
    Sampled,
    /// Texture can be used as render target
    RenderTarget,
    /// Texture can be used for both (frame buffers)
    SampledAndRenderTarget,
    /// Texture can be used as depth/stencil attachment
    DepthStencil,
}

/// Descriptor for creating a texture
#[derive(Debug, Clone)]
pub struct TextureDesc {
    /// Debug label
    pub label: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage
    pub usage: TextureUsage,
    /// Optional initial data, `byte_size()` bytes long
    pub data: Option<Vec<u8>>,
}

impl TextureDesc {
    /// Number of bytes of a full upload for this descriptor
    pub fn byte_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel() as usize
    }
}

/// Read-only properties of a created texture
#[derive(Debug, Clone)]
pub struct TextureInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Usage
    pub usage: TextureUsage,
}

/// Texture resource trait
///
/// Implemented by backend-specific texture types.
/// The texture is destroyed when the last reference is dropped.
pub trait Texture: Send + Sync {
    /// Get the read-only properties of this texture
    fn info(&self) -> &TextureInfo;
}

// ===== SAMPLER STATE =====

/// Texture addressing outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

/// Texel filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Sampler state used when binding a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerDesc {
    pub address_u: AddressMode,
    pub address_v: AddressMode,
    pub filter: FilterMode,
}

impl SamplerDesc {
    /// Linear filtering, clamped on both axes (frame buffer reads)
    pub fn clamped() -> Self {
        Self {
            address_u: AddressMode::ClampToEdge,
            address_v: AddressMode::ClampToEdge,
            filter: FilterMode::Linear,
        }
    }

    /// Linear filtering, repeating on both axes (material maps)
    pub fn repeating() -> Self {
        Self {
            address_u: AddressMode::Repeat,
            address_v: AddressMode::Repeat,
            filter: FilterMode::Linear,
        }
    }

    /// Clamped horizontally, wrapped vertically (scrolling feedback reads)
    pub fn vertical_scroll() -> Self {
        Self {
            address_u: AddressMode::ClampToEdge,
            address_v: AddressMode::Repeat,
            filter: FilterMode::Linear,
        }
    }
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self::clamped()
    }
}
