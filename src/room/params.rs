//! Window, shading and skylight parameters.
//!
//! Window parameters describe glazing on one wall segment. Detailed windows
//! are polygons in segment-local coordinates: `x` runs along the segment from
//! its start point and `y` is the height above the floor. All other variants
//! are symmetric about the segment midpoint, so flipping leaves them unchanged.

use crate::geom::point2d::Point2D;
use crate::vecutils::cumulative;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WindowParameter {
    /// Fraction of the wall area that is glazed.
    SimpleRatio { ratio: f64 },
    /// One centered window.
    SingleWindow {
        width: f64,
        height: f64,
        sill_height: f64,
    },
    /// Repeating windows filling a fraction of the wall.
    RepeatingRatio {
        ratio: f64,
        window_height: f64,
        sill_height: f64,
        horizontal_separation: f64,
    },
    /// Explicit window polygons in segment-local coordinates.
    Detailed { polygons: Vec<Vec<Point2D>> },
}

impl WindowParameter {
    /// Glazed area on a segment of length `segment_length` and wall height `height`.
    pub fn area_from_segment(&self, segment_length: f64, height: f64) -> f64 {
        match self {
            Self::SimpleRatio { ratio } | Self::RepeatingRatio { ratio, .. } => {
                ratio * segment_length * height
            }
            Self::SingleWindow {
                width,
                height: win_height,
                sill_height,
            } => {
                let w = width.min(segment_length).max(0.);
                let h = win_height.min(height - sill_height).max(0.);
                w * h
            }
            Self::Detailed { polygons } => polygons.iter().map(|p| ring_area(p)).sum(),
        }
    }

    pub fn is_detailed(&self) -> bool {
        matches!(self, Self::Detailed { .. })
    }

    /// Only detailed windows depend on the segment direction.
    pub fn is_asymmetric(&self) -> bool {
        self.is_detailed()
    }

    /// Mirrors the parameter for the same segment walked in reverse.
    pub fn flip(&self, segment_length: f64) -> Self {
        match self {
            Self::Detailed { polygons } => Self::Detailed {
                polygons: polygons
                    .iter()
                    .map(|p| {
                        p.iter()
                            .rev()
                            .map(|pt| Point2D::new(segment_length - pt.x, pt.y))
                            .collect()
                    })
                    .collect(),
            },
            _ => self.clone(),
        }
    }

    /// Scales all dimensions by `factor` (ratios are unchanged).
    pub fn scale(&self, factor: f64) -> Self {
        match self {
            Self::SimpleRatio { .. } => self.clone(),
            Self::SingleWindow {
                width,
                height,
                sill_height,
            } => Self::SingleWindow {
                width: width * factor,
                height: height * factor,
                sill_height: sill_height * factor,
            },
            Self::RepeatingRatio {
                ratio,
                window_height,
                sill_height,
                horizontal_separation,
            } => Self::RepeatingRatio {
                ratio: *ratio,
                window_height: window_height * factor,
                sill_height: sill_height * factor,
                horizontal_separation: horizontal_separation * factor,
            },
            Self::Detailed { polygons } => Self::Detailed {
                polygons: polygons
                    .iter()
                    .map(|p| p.iter().map(|pt| *pt * factor).collect())
                    .collect(),
            },
        }
    }

    /// Parameter for the part of the segment between distances `start` and `end`.
    ///
    /// Ratio-based variants carry over. A single window on a shorter piece
    /// becomes a ratio with the same glazed fraction. Detailed polygons are
    /// clipped to the piece and shifted to its start. Returns `None` when no
    /// glazing is left.
    pub fn trim(&self, segment_length: f64, start: f64, end: f64, height: f64) -> Option<Self> {
        let full = start.abs() < 1e-9 && (end - segment_length).abs() < 1e-9;
        match self {
            Self::SimpleRatio { .. } | Self::RepeatingRatio { .. } => Some(self.clone()),
            Self::SingleWindow { .. } if full => Some(self.clone()),
            Self::SingleWindow { .. } => {
                if segment_length <= 0. || height <= 0. {
                    return None;
                }
                let ratio = self.area_from_segment(segment_length, height) / (segment_length * height);
                if ratio <= 0. {
                    return None;
                }
                Some(Self::SimpleRatio { ratio })
            }
            Self::Detailed { polygons } => {
                let clipped: Vec<Vec<Point2D>> = polygons
                    .iter()
                    .map(|p| clip_x_range(p, start, end))
                    .filter(|p| p.len() >= 3 && ring_area(p) > 1e-9)
                    .map(|p| p.into_iter().map(|pt| Point2D::new(pt.x - start, pt.y)).collect())
                    .collect();
                if clipped.is_empty() {
                    None
                } else {
                    Some(Self::Detailed { polygons: clipped })
                }
            }
        }
    }

    /// Splits the parameter over consecutive pieces with the given lengths.
    pub fn split(&self, segment_length: f64, lengths: &[f64], height: f64) -> Vec<Option<Self>> {
        cumulative(lengths)
            .windows(2)
            .map(|w| self.trim(segment_length, w[0], w[1], height))
            .collect()
    }

    /// Merges parameters of consecutive colinear pieces into one.
    ///
    /// `parts` holds each piece's parameter and length, in order. Identical
    /// simple ratios stay as they are, all-detailed pieces are concatenated
    /// along the merged segment, and anything else becomes a simple ratio with
    /// the combined glazed fraction.
    pub fn merge(parts: &[(Option<&WindowParameter>, f64)], height: f64) -> Option<Self> {
        if parts.iter().all(|(w, _)| w.is_none()) {
            return None;
        }
        let total_len: f64 = parts.iter().map(|(_, l)| *l).sum();

        if let Some(Self::SimpleRatio { ratio }) = parts[0].0 {
            let same = parts.iter().all(|(w, _)| match w {
                Some(Self::SimpleRatio { ratio: r }) => (r - ratio).abs() < 1e-9,
                _ => false,
            });
            if same {
                return Some(Self::SimpleRatio { ratio: *ratio });
            }
        }

        if parts.iter().all(|(w, _)| w.is_some_and(|w| w.is_detailed())) {
            let mut polygons = Vec::new();
            let mut offset = 0.;
            for (w, len) in parts.iter() {
                if let Some(Self::Detailed { polygons: polys }) = w {
                    for p in polys.iter() {
                        polygons.push(p.iter().map(|pt| Point2D::new(pt.x + offset, pt.y)).collect());
                    }
                }
                offset += len;
            }
            return Some(Self::Detailed { polygons });
        }

        if total_len <= 0. || height <= 0. {
            return None;
        }
        let area: f64 = parts
            .iter()
            .filter_map(|(w, len)| w.map(|w| w.area_from_segment(*len, height)))
            .sum();
        let ratio = (area / (total_len * height)).min(0.99);
        if ratio <= 0. {
            None
        } else {
            Some(Self::SimpleRatio { ratio })
        }
    }

    /// Same variant with all values within `tol`.
    pub fn is_equivalent(&self, other: &Self, tol: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tol;
        match (self, other) {
            (Self::SimpleRatio { ratio: a }, Self::SimpleRatio { ratio: b }) => close(*a, *b),
            (
                Self::SingleWindow {
                    width: w1,
                    height: h1,
                    sill_height: s1,
                },
                Self::SingleWindow {
                    width: w2,
                    height: h2,
                    sill_height: s2,
                },
            ) => close(*w1, *w2) && close(*h1, *h2) && close(*s1, *s2),
            (
                Self::RepeatingRatio {
                    ratio: r1,
                    window_height: h1,
                    sill_height: s1,
                    horizontal_separation: d1,
                },
                Self::RepeatingRatio {
                    ratio: r2,
                    window_height: h2,
                    sill_height: s2,
                    horizontal_separation: d2,
                },
            ) => close(*r1, *r2) && close(*h1, *h2) && close(*s1, *s2) && close(*d1, *d2),
            (Self::Detailed { polygons: p1 }, Self::Detailed { polygons: p2 }) => {
                p1.len() == p2.len()
                    && p1.iter().zip(p2.iter()).all(|(a, b)| {
                        a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.is_close_tol(y, tol))
                    })
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShadingParameter {
    /// Single overhang above the windows. `angle` in degrees from horizontal.
    Overhang { depth: f64, angle: f64 },
    /// Horizontal louvers in front of the wall.
    Louvers {
        count: usize,
        depth: f64,
        offset: f64,
        angle: f64,
    },
}

impl ShadingParameter {
    pub fn scale(&self, factor: f64) -> Self {
        match self {
            Self::Overhang { depth, angle } => Self::Overhang {
                depth: depth * factor,
                angle: *angle,
            },
            Self::Louvers {
                count,
                depth,
                offset,
                angle,
            } => Self::Louvers {
                count: *count,
                depth: depth * factor,
                offset: offset * factor,
                angle: *angle,
            },
        }
    }

    pub fn is_equivalent(&self, other: &Self, tol: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tol;
        match (self, other) {
            (Self::Overhang { depth: d1, angle: a1 }, Self::Overhang { depth: d2, angle: a2 }) => {
                close(*d1, *d2) && close(*a1, *a2)
            }
            (
                Self::Louvers {
                    count: c1,
                    depth: d1,
                    offset: o1,
                    angle: a1,
                },
                Self::Louvers {
                    count: c2,
                    depth: d2,
                    offset: o2,
                    angle: a2,
                },
            ) => c1 == c2 && close(*d1, *d2) && close(*o1, *o2) && close(*a1, *a2),
            _ => false,
        }
    }

    /// Picks the shade of the longest piece (first on ties).
    pub fn merge(parts: &[(Option<&ShadingParameter>, f64)]) -> Option<Self> {
        let mut best: Option<(&ShadingParameter, f64)> = None;
        for (s, len) in parts.iter() {
            if let Some(s) = s {
                match best {
                    Some((_, best_len)) if *len <= best_len => {}
                    _ => best = Some((s, *len)),
                }
            }
        }
        best.map(|(s, _)| s.clone())
    }
}

/// Skylights on the top face of a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SkylightParameter {
    /// Fraction of the roof area glazed, laid out on a grid.
    GriddedRatio { ratio: f64, spacing: Option<f64> },
    /// Explicit skylight polygons in world XY.
    Detailed { polygons: Vec<Vec<Point2D>> },
}

impl SkylightParameter {
    pub fn area(&self, floor_area: f64) -> f64 {
        match self {
            Self::GriddedRatio { ratio, .. } => ratio * floor_area,
            Self::Detailed { polygons } => polygons.iter().map(|p| ring_area(p)).sum(),
        }
    }

    /// Applies a plan transform; `factor` scales grid spacing.
    pub fn transform<F: Fn(Point2D) -> Point2D>(&self, f: F, factor: f64) -> Self {
        match self {
            Self::GriddedRatio { ratio, spacing } => Self::GriddedRatio {
                ratio: *ratio,
                spacing: spacing.map(|s| s * factor),
            },
            Self::Detailed { polygons } => Self::Detailed {
                polygons: polygons
                    .iter()
                    .map(|p| p.iter().map(|pt| f(*pt)).collect())
                    .collect(),
            },
        }
    }

    /// Reverses polygon winding after a reflection.
    pub fn reverse_polygons(&self) -> Self {
        match self {
            Self::Detailed { polygons } => Self::Detailed {
                polygons: polygons.iter().map(|p| p.iter().rev().copied().collect()).collect(),
            },
            _ => self.clone(),
        }
    }
}

fn ring_area(pts: &[Point2D]) -> f64 {
    let n = pts.len();
    if n < 3 {
        return 0.;
    }
    let mut sum = 0.;
    for i in 0..n {
        sum += pts[i].cross(&pts[(i + 1) % n]);
    }
    0.5 * sum.abs()
}

/// Clips a ring to the vertical band `lo <= x <= hi`.
fn clip_x_range(pts: &[Point2D], lo: f64, hi: f64) -> Vec<Point2D> {
    let keep_right = clip_half(pts, |p| p.x >= lo, lo);
    clip_half(&keep_right, |p| p.x <= hi, hi)
}

/// One Sutherland-Hodgman pass against the vertical line `x = x_cut`.
fn clip_half<F: Fn(&Point2D) -> bool>(pts: &[Point2D], inside: F, x_cut: f64) -> Vec<Point2D> {
    let n = pts.len();
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let cur = pts[i];
        let prev = pts[(i + n - 1) % n];
        let (cur_in, prev_in) = (inside(&cur), inside(&prev));
        if cur_in != prev_in {
            let t = (x_cut - prev.x) / (cur.x - prev.x);
            out.push(Point2D::new(x_cut, prev.y + t * (cur.y - prev.y)));
        }
        if cur_in {
            out.push(cur);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(x0, y0),
            Point2D::new(x1, y0),
            Point2D::new(x1, y1),
            Point2D::new(x0, y1),
        ]
    }

    #[test]
    fn test_area_from_segment() {
        let simple = WindowParameter::SimpleRatio { ratio: 0.4 };
        assert!((simple.area_from_segment(10., 3.) - 12.).abs() < 1e-12);
        let single = WindowParameter::SingleWindow {
            width: 2.,
            height: 1.5,
            sill_height: 1.,
        };
        assert!((single.area_from_segment(10., 3.) - 3.).abs() < 1e-12);
        // Window taller than the wall above the sill is clipped
        assert!((single.area_from_segment(10., 2.) - 2.).abs() < 1e-12);
        let detailed = WindowParameter::Detailed {
            polygons: vec![rect(1., 1., 3., 2.)],
        };
        assert!((detailed.area_from_segment(10., 3.) - 2.).abs() < 1e-12);
    }

    #[test]
    fn test_flip_detailed() {
        let detailed = WindowParameter::Detailed {
            polygons: vec![rect(1., 1., 3., 2.)],
        };
        assert!(detailed.is_asymmetric());
        let WindowParameter::Detailed { polygons } = detailed.flip(10.) else {
            panic!("flip must keep the variant");
        };
        let xs: Vec<f64> = polygons[0].iter().map(|p| p.x).collect();
        assert!(xs.iter().all(|x| (*x - 7.).abs() < 1e-12 || (*x - 9.).abs() < 1e-12));
        assert!((ring_area(&polygons[0]) - 2.).abs() < 1e-12);
        assert_eq!(detailed.flip(10.).flip(10.), detailed);
    }

    #[test]
    fn test_trim_and_split_detailed() {
        let detailed = WindowParameter::Detailed {
            polygons: vec![rect(1., 1., 3., 2.), rect(6., 1., 8., 2.)],
        };
        let parts = detailed.split(10., &[2., 3., 5.], 3.);
        assert_eq!(parts.len(), 3);
        let first = parts[0].as_ref().unwrap();
        assert!((first.area_from_segment(2., 3.) - 1.).abs() < 1e-9);
        let second = parts[1].as_ref().unwrap();
        assert!((second.area_from_segment(3., 3.) - 1.).abs() < 1e-9);
        let third = parts[2].as_ref().unwrap();
        assert!((third.area_from_segment(5., 3.) - 2.).abs() < 1e-9);
        assert!(detailed.trim(10., 4., 5., 3.).is_none());
    }

    #[test]
    fn test_trim_single_window_keeps_ratio() {
        let single = WindowParameter::SingleWindow {
            width: 4.,
            height: 1.5,
            sill_height: 1.,
        };
        let trimmed = single.trim(10., 0., 5., 3.).unwrap();
        assert!((trimmed.area_from_segment(10., 3.) - 6.).abs() < 1e-9);
        assert_eq!(single.trim(10., 0., 10., 3.), Some(single.clone()));
    }

    #[test]
    fn test_merge() {
        let a = WindowParameter::SimpleRatio { ratio: 0.4 };
        let b = WindowParameter::SimpleRatio { ratio: 0.2 };
        assert_eq!(WindowParameter::merge(&[(None, 5.), (None, 5.)], 3.), None);
        assert_eq!(WindowParameter::merge(&[(Some(&a), 5.), (Some(&a), 3.)], 3.), Some(a.clone()));
        let merged = WindowParameter::merge(&[(Some(&a), 5.), (Some(&b), 5.)], 3.).unwrap();
        assert!(merged.is_equivalent(&WindowParameter::SimpleRatio { ratio: 0.3 }, 1e-9));
        let merged = WindowParameter::merge(&[(Some(&a), 5.), (None, 5.)], 3.).unwrap();
        assert!(merged.is_equivalent(&WindowParameter::SimpleRatio { ratio: 0.2 }, 1e-9));

        let d1 = WindowParameter::Detailed {
            polygons: vec![rect(1., 1., 2., 2.)],
        };
        let d2 = WindowParameter::Detailed {
            polygons: vec![rect(0., 1., 1., 2.)],
        };
        let WindowParameter::Detailed { polygons } =
            WindowParameter::merge(&[(Some(&d1), 4.), (Some(&d2), 4.)], 3.).unwrap()
        else {
            panic!("detailed windows must merge into a detailed window");
        };
        assert_eq!(polygons.len(), 2);
        assert!((polygons[1][0].x - 4.).abs() < 1e-12);
    }

    #[test]
    fn test_shading_merge_and_scale() {
        let o1 = ShadingParameter::Overhang { depth: 1., angle: 0. };
        let o2 = ShadingParameter::Overhang { depth: 0.5, angle: 0. };
        assert_eq!(ShadingParameter::merge(&[(Some(&o1), 2.), (Some(&o2), 5.)]), Some(o2.clone()));
        assert_eq!(ShadingParameter::merge(&[(None, 2.), (None, 5.)]), None);
        assert!(o1.scale(0.5).is_equivalent(&o2, 1e-12));
    }

    #[test]
    fn test_skylight_area() {
        let gridded = SkylightParameter::GriddedRatio {
            ratio: 0.1,
            spacing: Some(2.),
        };
        assert!((gridded.area(80.) - 8.).abs() < 1e-12);
        let detailed = SkylightParameter::Detailed {
            polygons: vec![rect(1., 1., 3., 3.)],
        };
        assert!((detailed.area(80.) - 4.).abs() < 1e-12);
        let moved = detailed.transform(|p| p + Point2D::new(1., 0.), 1.);
        assert!((moved.area(80.) - 4.).abs() < 1e-12);
    }
}
