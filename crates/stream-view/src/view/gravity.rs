use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};

use crate::media::types::Extent;

/// How a frame is fitted into the drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GravityMode {
    /// Stretch to fill, ignoring aspect ratio.
    Resize,
    /// Uniform scale to fit inside, letterboxing the remainder.
    #[default]
    ResizeAspect,
    /// Uniform scale to cover, cropping the overflow.
    ResizeAspectFill,
    /// Unrecognized mode: the frame is drawn untransformed.
    #[serde(other)]
    Other,
}

impl GravityMode {
    /// Next mode in the resize -> fit -> fill cycle.
    pub fn next(self) -> Self {
        match self {
            GravityMode::Resize => GravityMode::ResizeAspect,
            GravityMode::ResizeAspect => GravityMode::ResizeAspectFill,
            GravityMode::ResizeAspectFill | GravityMode::Other => GravityMode::Resize,
        }
    }
}

/// Axis-aligned rectangle in surface pixels, origin at the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn from_extent(extent: Extent) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: f64::from(extent.width),
            height: f64::from(extent.height),
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }
}

/// Scale and translation applied to a frame for one tick.
///
/// Translation is expressed in pre-scale units: a point `p` of the frame
/// lands at `(p + translation) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub scale_x: f64,
    pub scale_y: f64,
    pub translation_x: f64,
    pub translation_y: f64,
}

impl Geometry {
    pub const fn identity() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            translation_x: 0.0,
            translation_y: 0.0,
        }
    }

    /// Fit `source` into `target` according to `mode`.
    ///
    /// An empty source or target yields identity rather than a division by
    /// zero; callers skip such frames anyway.
    pub fn compute(source: Extent, target: Extent, mode: GravityMode) -> Self {
        if source.is_empty() || target.is_empty() {
            return Self::identity();
        }

        let (sw, sh) = (f64::from(source.width), f64::from(source.height));
        let (tw, th) = (f64::from(target.width), f64::from(target.height));
        let ratio_x = tw / sw;
        let ratio_y = th / sh;

        match mode {
            GravityMode::Resize => Self {
                scale_x: ratio_x,
                scale_y: ratio_y,
                translation_x: 0.0,
                translation_y: 0.0,
            },
            GravityMode::ResizeAspect => Self::centered(ratio_x.min(ratio_y), sw, sh, tw, th),
            GravityMode::ResizeAspectFill => Self::centered(ratio_x.max(ratio_y), sw, sh, tw, th),
            GravityMode::Other => Self::identity(),
        }
    }

    fn centered(scale: f64, sw: f64, sh: f64, tw: f64, th: f64) -> Self {
        Self {
            scale_x: scale,
            scale_y: scale,
            translation_x: (tw - sw * scale) / scale / 2.0,
            translation_y: (th - sh * scale) / scale / 2.0,
        }
    }

    /// Translate first, then scale.
    pub fn affine(&self) -> DAffine2 {
        DAffine2::from_scale(DVec2::new(self.scale_x, self.scale_y))
            * DAffine2::from_translation(DVec2::new(self.translation_x, self.translation_y))
    }

    /// Where a frame of extent `source` ends up on the surface.
    pub fn destination(&self, source: Extent) -> Rect {
        let m = self.affine();
        let min = m.transform_point2(DVec2::ZERO);
        let max = m.transform_point2(DVec2::new(
            f64::from(source.width),
            f64::from(source.height),
        ));
        Rect {
            x: min.x,
            y: min.y,
            width: max.x - min.x,
            height: max.y - min.y,
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn extents() -> Vec<Extent> {
        vec![
            Extent::new(1920, 1080),
            Extent::new(1080, 1920),
            Extent::new(640, 480),
            Extent::new(1000, 500),
            Extent::new(333, 777),
            Extent::new(1, 1),
            Extent::new(500, 500),
        ]
    }

    fn pairs() -> impl Iterator<Item = (Extent, Extent)> {
        extents()
            .into_iter()
            .flat_map(|s| extents().into_iter().map(move |t| (s, t)))
    }

    #[test]
    fn resize_stretches_each_axis() {
        for (s, t) in pairs() {
            let g = Geometry::compute(s, t, GravityMode::Resize);
            assert!((g.scale_x - t.width as f64 / s.width as f64).abs() < EPS);
            assert!((g.scale_y - t.height as f64 / s.height as f64).abs() < EPS);
            assert_eq!((g.translation_x, g.translation_y), (0.0, 0.0));

            let d = g.destination(s);
            assert!((d.width - t.width as f64).abs() < EPS);
            assert!((d.height - t.height as f64).abs() < EPS);
        }
    }

    #[test]
    fn aspect_fits_inside_touching_an_edge_pair_and_centered() {
        for (s, t) in pairs() {
            let g = Geometry::compute(s, t, GravityMode::ResizeAspect);
            assert_eq!(g.scale_x, g.scale_y);
            let d = g.destination(s);
            let (tw, th) = (t.width as f64, t.height as f64);

            assert!(d.x >= -EPS && d.y >= -EPS, "{s:?} -> {t:?}: {d:?}");
            assert!(d.max_x() <= tw + EPS && d.max_y() <= th + EPS, "{s:?} -> {t:?}: {d:?}");

            let touches_x = (d.width - tw).abs() < 1e-6 * tw;
            let touches_y = (d.height - th).abs() < 1e-6 * th;
            assert!(touches_x || touches_y, "{s:?} -> {t:?}: {d:?}");

            assert!((d.x - (tw - d.max_x())).abs() < 1e-6 * tw);
            assert!((d.y - (th - d.max_y())).abs() < 1e-6 * th);
        }
    }

    #[test]
    fn aspect_fill_covers_target() {
        for (s, t) in pairs() {
            let g = Geometry::compute(s, t, GravityMode::ResizeAspectFill);
            assert_eq!(g.scale_x, g.scale_y);
            let d = g.destination(s);
            let (tw, th) = (t.width as f64, t.height as f64);

            assert!(d.x <= EPS && d.y <= EPS, "{s:?} -> {t:?}: {d:?}");
            assert!(d.max_x() >= tw - 1e-6 * tw, "{s:?} -> {t:?}: {d:?}");
            assert!(d.max_y() >= th - 1e-6 * th, "{s:?} -> {t:?}: {d:?}");

            // centered overflow
            assert!((d.x - (tw - d.max_x())).abs() < 1e-6 * tw);
            assert!((d.y - (th - d.max_y())).abs() < 1e-6 * th);
        }
    }

    #[test]
    fn hd_into_wide_target_letterboxes_horizontally() {
        let g = Geometry::compute(
            Extent::new(1920, 1080),
            Extent::new(1000, 500),
            GravityMode::ResizeAspect,
        );
        assert!((g.scale_x - 0.463).abs() < 1e-3);
        assert!((g.translation_x - 120.0).abs() < 0.2);
        assert!(g.translation_y.abs() < EPS);
    }

    #[test]
    fn hd_into_wide_target_fill_overflows_vertically() {
        let g = Geometry::compute(
            Extent::new(1920, 1080),
            Extent::new(1000, 500),
            GravityMode::ResizeAspectFill,
        );
        assert!((g.scale_x - 0.5208).abs() < 1e-3);
        assert!(g.translation_x.abs() < EPS);
        assert!(g.translation_y < 0.0);
        assert!((g.translation_y - -60.0).abs() < 1e-6);

        let d = g.destination(Extent::new(1920, 1080));
        assert!(d.height > 500.0);
    }

    #[test]
    fn unknown_mode_is_identity() {
        let g = Geometry::compute(Extent::new(640, 480), Extent::new(100, 100), GravityMode::Other);
        assert_eq!(g, Geometry::identity());
        let d = g.destination(Extent::new(640, 480));
        assert_eq!(d, Rect::from_extent(Extent::new(640, 480)));
    }

    #[test]
    fn empty_source_is_identity_not_nan() {
        for mode in [
            GravityMode::Resize,
            GravityMode::ResizeAspect,
            GravityMode::ResizeAspectFill,
        ] {
            let g = Geometry::compute(Extent::new(0, 1080), Extent::new(100, 100), mode);
            assert_eq!(g, Geometry::identity());
        }
    }

    #[test]
    fn gravity_parses_known_and_unknown_names() {
        let m: GravityMode = serde_json::from_str("\"resizeAspectFill\"").unwrap();
        assert_eq!(m, GravityMode::ResizeAspectFill);
        let m: GravityMode = serde_json::from_str("\"resize\"").unwrap();
        assert_eq!(m, GravityMode::Resize);
        let m: GravityMode = serde_json::from_str("\"tile\"").unwrap();
        assert_eq!(m, GravityMode::Other);
    }

    #[test]
    fn gravity_cycle_visits_all_modes() {
        let mut m = GravityMode::Resize;
        m = m.next();
        assert_eq!(m, GravityMode::ResizeAspect);
        m = m.next();
        assert_eq!(m, GravityMode::ResizeAspectFill);
        assert_eq!(m.next(), GravityMode::Resize);
        assert_eq!(GravityMode::Other.next(), GravityMode::Resize);
    }
}
