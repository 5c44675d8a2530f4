use kurbo::{Circle, Shape as _};

use crate::{
    config::Settings,
    foundation::core::{BezPath, Point, Rect, Vec2},
    pose::{KeypointName, LimbChain, Pose, TORSO_CORNERS},
};

const CURVE_TOLERANCE: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Torso,
    Head,
    Limb(LimbChain),
}

/// Filled shape in target-surface pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Polygon(Vec<Point>),
    Disc { center: Point, radius: f64 },
}

impl Shape {
    pub fn bounding_box(&self) -> Rect {
        match self {
            Self::Polygon(points) => {
                let mut iter = points.iter();
                let Some(first) = iter.next() else {
                    return Rect::ZERO;
                };
                iter.fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p))
            }
            Self::Disc { center, radius } => Rect::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            ),
        }
    }

    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        match self {
            Self::Polygon(points) => {
                let mut iter = points.iter();
                if let Some(first) = iter.next() {
                    path.move_to(*first);
                    for p in iter {
                        path.line_to(*p);
                    }
                    path.close_path();
                }
            }
            Self::Disc { center, radius } => {
                for el in Circle::new(*center, *radius).path_elements(CURVE_TOLERANCE) {
                    path.push(el);
                }
            }
        }
        path
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub part: BodyPart,
    pub shape: Shape,
}

/// Mapping from keypoint (video) coordinates to the target surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthesisParams {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Limb width in target pixels.
    pub thickness: f64,
}

impl SynthesisParams {
    pub fn unscaled(thickness: f64) -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            thickness,
        }
    }

    fn map(&self, p: Point) -> Point {
        Point::new(p.x * self.scale_x, p.y * self.scale_y)
    }
}

/// Turns sparse keypoints into filled body-part shapes.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilhouetteSynthesizer;

impl SilhouetteSynthesizer {
    pub fn synthesize(pose: &Pose, settings: &Settings, params: SynthesisParams) -> Vec<Primitive> {
        let threshold = settings.detection_threshold;
        let point = |name: KeypointName| pose.valid_point(name, threshold).map(|p| params.map(p));
        let half = params.thickness / 2.0;
        let mut out = Vec::new();

        // Torso: quad, edges widened to `thickness`, rounded corners.
        let corners: Option<Vec<Point>> = TORSO_CORNERS.iter().map(|&n| point(n)).collect();
        if let Some(corners) = corners {
            let mut push = |shape| {
                out.push(Primitive {
                    part: BodyPart::Torso,
                    shape,
                })
            };
            push(Shape::Polygon(corners.clone()));
            for i in 0..corners.len() {
                let a = corners[i];
                let b = corners[(i + 1) % corners.len()];
                if let Some(quad) = segment_quad(a, b, half) {
                    push(quad);
                }
            }
            for c in &corners {
                push(Shape::Disc {
                    center: *c,
                    radius: half,
                });
            }
        }

        if let Some(nose) = point(KeypointName::Nose) {
            let eyes = (point(KeypointName::LeftEye), point(KeypointName::RightEye));
            let thickness_radius = 2.0 * params.thickness;
            let base = match eyes {
                (Some(l), Some(r)) => (2.0 * l.distance(r)).max(thickness_radius),
                (Some(_), None) | (None, Some(_)) => thickness_radius,
                (None, None) => 0.0,
            };
            if base > 0.0 {
                out.push(Primitive {
                    part: BodyPart::Head,
                    shape: Shape::Disc {
                        center: nose,
                        radius: base * settings.head_size,
                    },
                });
            }
        }

        for chain in LimbChain::ALL {
            let joints: Option<Vec<Point>> = chain.joints().iter().map(|&n| point(n)).collect();
            let Some(joints) = joints else {
                continue;
            };
            let part = BodyPart::Limb(chain);
            for j in &joints {
                out.push(Primitive {
                    part,
                    shape: Shape::Disc {
                        center: *j,
                        radius: half,
                    },
                });
            }
            for pair in joints.windows(2) {
                if let Some(quad) = segment_quad(pair[0], pair[1], half) {
                    out.push(Primitive { part, shape: quad });
                }
            }
        }

        out
    }
}

/// Quad covering `a..b` offset by `half_width` along the segment normal.
pub(crate) fn segment_quad(a: Point, b: Point, half_width: f64) -> Option<Shape> {
    let d = b - a;
    let len = d.hypot();
    if !len.is_finite() || len <= f64::EPSILON || half_width <= 0.0 {
        return None;
    }
    let n = Vec2::new(-d.y, d.x) * (half_width / len);
    Some(Shape::Polygon(vec![a + n, b + n, b - n, a - n]))
}

#[cfg(test)]
#[path = "../../tests/unit/silhouette/synth.rs"]
mod tests;
