use bevy::math::Vec2;
use tracelens_core::Point;

/// Pixel inset on every side of the plot area.
pub const MARGIN: f32 = 20.0;
/// Fraction of the data range added beyond the extremes.
pub const DOMAIN_PAD: f32 = 0.05;
/// Used when the container reports a zero or non-finite extent.
pub const FALLBACK_EXTENT: f32 = 600.0;

/// Monotonic linear map from a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f32; 2],
    range: [f32; 2],
}

impl LinearScale {
    pub const IDENTITY: Self = Self {
        domain: [0.0, 1.0],
        range: [0.0, 1.0],
    };

    pub fn new(domain: [f32; 2], range: [f32; 2]) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> [f32; 2] {
        self.domain
    }

    pub fn range(&self) -> [f32; 2] {
        self.range
    }

    pub fn apply(&self, v: f32) -> f32 {
        let span = self.domain[1] - self.domain[0];
        if span == 0.0 {
            return self.range[0];
        }
        self.range[0] + (v - self.domain[0]) / span * (self.range[1] - self.range[0])
    }

    pub fn invert(&self, px: f32) -> f32 {
        let span = self.range[1] - self.range[0];
        if span == 0.0 {
            return self.domain[0];
        }
        self.domain[0] + (px - self.range[0]) / span * (self.domain[1] - self.domain[0])
    }
}

/// Independent x and y scales for one point set in one container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scales {
    pub x: LinearScale,
    pub y: LinearScale,
}

impl Default for Scales {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Scales {
    pub const IDENTITY: Self = Self {
        x: LinearScale::IDENTITY,
        y: LinearScale::IDENTITY,
    };

    /// Fit the padded extents of `points` into `container` (logical pixels).
    ///
    /// Only rebuilt when the point set or the container changes; pan and zoom
    /// live entirely in the transform.
    pub fn fit(points: &[Point], container: Vec2) -> Self {
        let Some((min, max)) = extents(points) else {
            return Self::IDENTITY;
        };
        Self {
            x: fit_axis(min.x, max.x, container.x),
            y: fit_axis(min.y, max.y, container.y),
        }
    }

    /// Base-scaled position of a data coordinate, before pan/zoom.
    pub fn project(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(self.x.apply(x), self.y.apply(y))
    }

    pub fn project_point(&self, p: &Point) -> Vec2 {
        self.project(p.x, p.y)
    }
}

fn extents(points: &[Point]) -> Option<(Vec2, Vec2)> {
    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for p in points.iter().filter(|p| p.is_finite()) {
        min = min.min(Vec2::new(p.x, p.y));
        max = max.max(Vec2::new(p.x, p.y));
    }
    min.x.is_finite().then_some((min, max))
}

fn fit_axis(min: f32, max: f32, extent: f32) -> LinearScale {
    let mut range = max - min;
    if range == 0.0 {
        range = 1.0;
    }
    let extent = if extent.is_finite() && extent > 0.0 {
        extent
    } else {
        FALLBACK_EXTENT
    };
    let extent = extent.max(2.0 * MARGIN);
    LinearScale::new(
        [min - range * DOMAIN_PAD, max + range * DOMAIN_PAD],
        [MARGIN, extent - MARGIN],
    )
}
