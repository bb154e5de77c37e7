use glam::Vec3;
use smallvec::SmallVec;

/// Linear RGB color with components nominally in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Decode a `0xRRGGBB` integer. The hex value is treated as sRGB and
    /// converted to linear components.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
        Self::new(channel(16), channel(8), channel(0))
    }

    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color::new(
            self.r + t * (other.r - self.r),
            self.g + t * (other.g - self.g),
            self.b + t * (other.b - self.b),
        )
    }

    pub fn scaled(self, k: f32) -> Color {
        Color::new(self.r * k, self.g * k, self.b * k)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }

    pub fn to_array4(self, a: f32) -> [f32; 4] {
        [self.r, self.g, self.b, a]
    }
}

#[inline]
pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

/// Ordered color stops sampled by a normalized ratio.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorRamp {
    stops: SmallVec<[Color; 8]>,
}

impl ColorRamp {
    /// A ramp needs at least two stops; fewer means "no gradient".
    pub fn new(stops: impl IntoIterator<Item = Color>) -> Option<Self> {
        let stops: SmallVec<[Color; 8]> = stops.into_iter().collect();
        (stops.len() >= 2).then_some(Self { stops })
    }

    pub fn from_hex(colors: &[u32]) -> Option<Self> {
        Self::new(colors.iter().copied().map(Color::from_hex))
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stops(&self) -> &[Color] {
        &self.stops
    }

    /// Interpolate between the two stops bracketing `ratio`.
    ///
    /// The ratio is clamped to [0, 1]; 1.0 returns the last stop exactly.
    pub fn color_at(&self, ratio: f32) -> Color {
        let last = self.stops.len() - 1;
        let scaled = ratio.clamp(0.0, 1.0) * last as f32;
        let idx = scaled.floor() as usize;
        if idx >= last {
            return self.stops[last];
        }
        let alpha = scaled - idx as f32;
        self.stops[idx].lerp(self.stops[idx + 1], alpha)
    }
}
