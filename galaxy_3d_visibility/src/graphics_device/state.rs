/// Fixed-function state consumed by the shadow and blur passes
///
/// Plain value types handed to `GraphicsDevice` setters. The device is free
/// to cache and diff them; this crate always sets the full state it needs.

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Pixel viewport covering `rect` (normalized x, y, width, height) of a target
    pub fn from_normalized(rect: glam::Vec4, target_width: u32, target_height: u32) -> Self {
        let w = target_width as f32;
        let h = target_height as f32;
        Self {
            x: (rect.x * w).floor(),
            y: (rect.y * h).floor(),
            width: (rect.z * w).floor(),
            height: (rect.w * h).floor(),
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// 2D rectangle (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect2D {
    /// Pixel rectangle covering `rect` (normalized x, y, width, height) of a target
    pub fn from_normalized(rect: glam::Vec4, target_width: u32, target_height: u32) -> Self {
        let w = target_width as f32;
        let h = target_height as f32;
        Self {
            x: (rect.x * w).floor() as i32,
            y: (rect.y * h).floor() as i32,
            width: (rect.z * w).floor().max(0.0) as u32,
            height: (rect.w * h).floor().max(0.0) as u32,
        }
    }

    /// Whether the pixel (x, y) lies inside the rectangle
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && x < self.x + self.width as i32
            && y < self.y + self.height as i32
    }
}

/// What `GraphicsDevice::clear` resets.
///
/// Clears are limited to the current scissor rectangle so that atlas
/// neighbours are left untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearOptions {
    /// Color clear value (RGBA), `None` keeps the color buffer
    pub color: Option<[f32; 4]>,
    /// Depth clear value, `None` keeps the depth buffer
    pub depth: Option<f32>,
}

/// Blend / color-write state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    pub blend: bool,
    pub color_write: bool,
}

impl BlendState {
    /// No blending, color writes enabled
    pub const NO_BLEND: BlendState = BlendState { blend: false, color_write: true };
    /// No blending, color writes disabled (depth-only passes)
    pub const NO_COLOR_WRITE: BlendState = BlendState { blend: false, color_write: false };
}

/// Depth comparison function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunc {
    Never,
    Less,
    LessEqual,
    Equal,
    Greater,
    Always,
}

/// Depth test / write state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthState {
    pub test: bool,
    pub write: bool,
    pub func: CompareFunc,
}

impl DepthState {
    /// Depth test and write, LessEqual
    pub const DEFAULT: DepthState = DepthState { test: true, write: true, func: CompareFunc::LessEqual };
    /// No depth test, no depth write (fullscreen passes)
    pub const NO_DEPTH: DepthState = DepthState { test: false, write: false, func: CompareFunc::Always };
}

impl Default for DepthState {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Polygon offset values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBias {
    pub constant: f32,
    pub slope_scale: f32,
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    None,
    #[default]
    Back,
    Front,
}
