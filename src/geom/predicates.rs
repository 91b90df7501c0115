//! Robust geometric predicates: half-plane orientation, in-circle
//! continence, signed area and circumcircle, each with a fast
//! double-precision path and an extended-precision fallback for
//! near-zero results.

use nalgebra::{Matrix3, Matrix4, Vector2};

use super::doubledouble::DoubleDouble;

/// A bare 2D coordinate pair. The mesh's `Vertex` wraps this; geometry
/// code only ever needs the pair, never vertex identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Coord { x, y }
    }
}

/// Sign of a half-plane / in-circle test, with an explicit `OnBoundary`
/// state rather than forcing callers to compare a float to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
    Zero,
}

impl Sign {
    pub fn from_value(v: f64, threshold: f64) -> Self {
        if v > threshold {
            Sign::Positive
        } else if v < -threshold {
            Sign::Negative
        } else {
            Sign::Zero
        }
    }
}

/// Twice the signed area of triangle (a, b, c); positive when a,b,c run
/// counterclockwise.
pub fn signed_area2(a: Coord, b: Coord, c: Coord) -> f64 {
    let m = Matrix3::new(
        a.x, a.y, 1.0, //
        b.x, b.y, 1.0, //
        c.x, c.y, 1.0,
    );
    m.determinant()
}

fn signed_area2_dd(a: Coord, b: Coord, c: Coord) -> DoubleDouble {
    // Expand the 3x3 determinant along the last column (all ones) into
    // three 2x2 minors, each computed as an error-free product-difference.
    let m00 = DoubleDouble::two_prod(a.x - c.x, b.y - c.y);
    let m01 = DoubleDouble::two_prod(a.y - c.y, b.x - c.x);
    m00.sub(m01)
}

/// Signed area of (a, b, c); positive = counterclockwise.
pub fn signed_area(a: Coord, b: Coord, c: Coord) -> f64 {
    signed_area2(a, b, c) / 2.0
}

/// Half-plane test: which side of the directed line a->b does p lie on.
/// Falls back to double-double arithmetic when the naive result is
/// within `threshold` of zero.
pub fn half_plane(a: Coord, b: Coord, p: Coord, threshold: f64) -> Sign {
    let naive = signed_area2(a, b, p);
    if naive.abs() > threshold {
        return if naive > 0.0 { Sign::Positive } else { Sign::Negative };
    }
    let exact = signed_area2_dd(a, b, p).value();
    Sign::from_value(exact, 0.0).or_zero_if(exact.abs() <= threshold)
}

impl Sign {
    fn or_zero_if(self, force_zero: bool) -> Sign {
        if force_zero {
            Sign::Zero
        } else {
            self
        }
    }
}

/// In-circle test for the CCW triangle (a, b, c) against point d.
/// Positive means d lies strictly inside the circumcircle of abc.
fn in_circle_naive(a: Coord, b: Coord, c: Coord, d: Coord) -> f64 {
    let row = |p: Coord| {
        let dx = p.x;
        let dy = p.y;
        (dx, dy, dx * dx + dy * dy, 1.0)
    };
    let (ax, ay, al, _) = row(a);
    let (bx, by, bl, _) = row(b);
    let (cx, cy, cl, _) = row(c);
    let (dx, dy, dl, _) = row(d);
    let m = Matrix4::new(
        ax, ay, al, 1.0, //
        bx, by, bl, 1.0, //
        cx, cy, cl, 1.0, //
        dx, dy, dl, 1.0,
    );
    m.determinant()
}

fn in_circle_dd(a: Coord, b: Coord, c: Coord, d: Coord) -> DoubleDouble {
    // Translate so d is the origin, then expand the classic 3x3 in-circle
    // determinant (Shewchuk's formulation) with double-double terms.
    let ax = DoubleDouble::two_diff(a.x, d.x);
    let ay = DoubleDouble::two_diff(a.y, d.y);
    let bx = DoubleDouble::two_diff(b.x, d.x);
    let by = DoubleDouble::two_diff(b.y, d.y);
    let cx = DoubleDouble::two_diff(c.x, d.x);
    let cy = DoubleDouble::two_diff(c.y, d.y);

    let a2 = ax.mul(ax).add(ay.mul(ay));
    let b2 = bx.mul(bx).add(by.mul(by));
    let c2 = cx.mul(cx).add(cy.mul(cy));

    // det [ax ay a2; bx by b2; cx cy c2]
    let t1 = a2.mul(bx.mul(cy).sub(by.mul(cx)));
    let t2 = b2.mul(ax.mul(cy).sub(ay.mul(cx)));
    let t3 = c2.mul(ax.mul(by).sub(ay.mul(bx)));
    t1.sub(t2).add(t3)
}

/// In-circle predicate with extended-precision fallback. `threshold` is
/// `MeshConfig::in_circle_threshold()`.
pub fn in_circle(a: Coord, b: Coord, c: Coord, d: Coord, threshold: f64) -> Sign {
    let naive = in_circle_naive(a, b, c, d);
    if naive.abs() > threshold {
        return if naive > 0.0 { Sign::Positive } else { Sign::Negative };
    }
    let exact = in_circle_dd(a, b, c, d).value();
    Sign::from_value(exact, 0.0).or_zero_if(exact.abs() <= threshold)
}

/// Center and radius of the circle through three non-collinear points.
/// Returns `None` when the points are (numerically) collinear.
pub fn circumcircle(a: Coord, b: Coord, c: Coord) -> Option<(Coord, f64)> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < f64::EPSILON {
        return None;
    }
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;

    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    let center = Coord::new(ux, uy);
    let r = ((center.x - a.x).powi(2) + (center.y - a.y).powi(2)).sqrt();
    Some((center, r))
}

/// Angle at vertex `b` of triangle (a, b, c), in radians, in `[0, pi]`.
pub fn angle_at(a: Coord, b: Coord, c: Coord) -> Option<f64> {
    let u = Vector2::new(a.x - b.x, a.y - b.y);
    let v = Vector2::new(c.x - b.x, c.y - b.y);
    let nu = u.norm();
    let nv = v.norm();
    if nu == 0.0 || nv == 0.0 {
        return None;
    }
    let cos = (u.dot(&v) / (nu * nv)).clamp(-1.0, 1.0);
    Some(cos.acos())
}

pub fn distance(a: Coord, b: Coord) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

pub fn midpoint(a: Coord, b: Coord) -> Coord {
    Coord::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f64 = 1e-12;

    #[test]
    fn half_plane_detects_ccw_and_cw() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(1.0, 0.0);
        assert_eq!(half_plane(a, b, Coord::new(0.5, 1.0), T), Sign::Positive);
        assert_eq!(half_plane(a, b, Coord::new(0.5, -1.0), T), Sign::Negative);
    }

    #[test]
    fn half_plane_on_line_is_zero() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(1.0, 0.0);
        assert_eq!(half_plane(a, b, Coord::new(0.5, 0.0), T), Sign::Zero);
    }

    #[test]
    fn in_circle_classic_unit_square() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(1.0, 0.0);
        let c = Coord::new(0.0, 1.0);
        assert_eq!(in_circle(a, b, c, Coord::new(0.1, 0.1), T), Sign::Positive);
        assert_eq!(in_circle(a, b, c, Coord::new(5.0, 5.0), T), Sign::Negative);
    }

    #[test]
    fn circumcircle_of_right_triangle() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(2.0, 0.0);
        let c = Coord::new(0.0, 2.0);
        let (center, r) = circumcircle(a, b, c).unwrap();
        assert!((center.x - 1.0).abs() < 1e-9);
        assert!((center.y - 1.0).abs() < 1e-9);
        assert!((r - 2.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn circumcircle_none_for_collinear() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(1.0, 0.0);
        let c = Coord::new(2.0, 0.0);
        assert!(circumcircle(a, b, c).is_none());
    }

    #[test]
    fn angle_of_right_angle_is_half_pi() {
        let a = Coord::new(1.0, 0.0);
        let b = Coord::new(0.0, 0.0);
        let c = Coord::new(0.0, 1.0);
        let ang = angle_at(a, b, c).unwrap();
        assert!((ang - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }
}
