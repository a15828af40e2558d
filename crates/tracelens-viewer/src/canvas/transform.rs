use bevy::math::Vec2;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 20.0;

// One wheel notch (~100 px) zooms by roughly 2^0.2.
const WHEEL_ZOOM_RATE: f32 = 0.002;

/// User pan/zoom applied on top of the base scales:
/// `screen = k * scaled + translate`.
///
/// Translation is never clamped, content may be dragged fully offscreen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub translate: Vec2,
    pub k: f32,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        k: 1.0,
    };

    pub fn new(translate: Vec2, k: f32) -> Self {
        Self {
            translate,
            k: clamp_zoom(k),
        }
    }

    pub fn apply(&self, scaled: Vec2) -> Vec2 {
        scaled * self.k + self.translate
    }

    pub fn invert(&self, screen: Vec2) -> Vec2 {
        (screen - self.translate) / self.k
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.is_finite() {
            self.translate += delta;
        }
    }

    /// Multiply the zoom by `factor` while keeping the scaled point under
    /// `anchor` fixed on screen. Returns whether anything changed.
    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32) -> bool {
        if !factor.is_finite() || factor <= 0.0 || !anchor.is_finite() {
            return false;
        }
        let k = clamp_zoom(self.k * factor);
        if k == self.k {
            return false;
        }
        let fixed = self.invert(anchor);
        self.k = k;
        self.translate = anchor - fixed * k;
        true
    }
}

pub fn clamp_zoom(k: f32) -> f32 {
    if k.is_nan() {
        return 1.0;
    }
    k.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// Zoom factor for a vertical wheel delta in points (positive = scroll up).
pub fn wheel_factor(delta_y: f32) -> f32 {
    2f32.powf(delta_y * WHEEL_ZOOM_RATE)
}
