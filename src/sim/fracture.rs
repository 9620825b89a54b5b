//! Asteroid shapes and precomputed fracture geometry
//!
//! Every splittable asteroid carries its breakup at creation time: a jagged
//! crack through its center and the two child polygons on either side of it.
//! Splitting later is just spawning those children.
//!
//! All geometry is in the asteroid's local (unrotated) frame.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{ASTEROID_VERTICES, SEPARATION_SPEED};
use crate::heading;

/// Interior points along a crack
const CRACK_POINTS: usize = 3;
/// Max perpendicular crack jitter as a fraction of the crack half-length
const CRACK_JITTER: f32 = 0.15;
/// Tolerance for "on the cut line"
const LINE_EPS: f32 = 1e-3;

/// One piece of a precomputed breakup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildShape {
    /// Polygon relative to the child's own center
    pub vertices: Vec<Vec2>,
    /// Child center relative to the parent center
    pub offset: Vec2,
    /// Velocity added to the parent's when the split happens
    pub separation: Vec2,
    /// Bounding radius of `vertices`
    pub radius: f32,
}

/// Breakup precomputed when an asteroid is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractureData {
    /// Jagged split path, end to end
    pub crack: Vec<Vec2>,
    pub children: Vec<ChildShape>,
}

/// Jittered polygon ring around the origin
pub fn asteroid_shape<R: Rng>(rng: &mut R, radius: f32) -> Vec<Vec2> {
    let step = std::f32::consts::TAU / ASTEROID_VERTICES as f32;
    (0..ASTEROID_VERTICES)
        .map(|i| {
            let theta = i as f32 * step + rng.random_range(-0.25..0.25) * step;
            let r = radius * rng.random_range(0.78..1.04);
            heading(theta) * r
        })
        .collect()
}

/// Bounding radius of a polygon around the origin
pub fn bounding_radius(vertices: &[Vec2]) -> f32 {
    vertices.iter().map(|v| v.length()).fold(0.0, f32::max)
}

/// Precompute a two-piece breakup of `vertices`
///
/// The polygon must be star-shaped around the origin (every generated
/// asteroid and every child is). Returns `None` for degenerate input.
pub fn precompute<R: Rng>(rng: &mut R, vertices: &[Vec2]) -> Option<FractureData> {
    if vertices.len() < 3 {
        return None;
    }

    let theta = rng.random_range(0.0..std::f32::consts::PI);
    let dir = heading(theta);
    let normal = dir.perp();

    let front = clip_half_plane(vertices, normal);
    let back = clip_half_plane(vertices, -normal);
    if front.len() < 3 || back.len() < 3 {
        return None;
    }

    // Crack endpoints are the cut points on the line, ordered along `dir`
    let mut cut: Vec<f32> = front
        .iter()
        .filter(|p| p.dot(normal).abs() < LINE_EPS)
        .map(|p| p.dot(dir))
        .collect();
    if cut.len() < 2 {
        return None;
    }
    cut.sort_by(|a, b| a.total_cmp(b));
    let (s0, s1) = (cut[0], cut[cut.len() - 1]);
    let half_len = (s1 - s0) * 0.5;
    if half_len <= LINE_EPS {
        return None;
    }

    // (along, across) pairs for the interior crack points, shared by both halves
    let interior: Vec<(f32, f32)> = (1..=CRACK_POINTS)
        .map(|i| {
            let t = i as f32 / (CRACK_POINTS + 1) as f32;
            let along = s0 + (s1 - s0) * t;
            let across = rng.random_range(-CRACK_JITTER..CRACK_JITTER) * half_len;
            (along, across)
        })
        .collect();
    let to_local = |(along, across): (f32, f32)| dir * along + normal * across;

    let mut crack = Vec::with_capacity(CRACK_POINTS + 2);
    crack.push(dir * s0);
    crack.extend(interior.iter().copied().map(to_local));
    crack.push(dir * s1);

    let children = [(front, normal), (back, -normal)]
        .into_iter()
        .map(|(ring, side)| {
            let ring = insert_crack(ring, normal, dir, &interior);
            make_child(ring, side)
        })
        .collect();

    Some(FractureData { crack, children })
}

/// Keep the part of `poly` where `p · normal >= 0` (Sutherland–Hodgman)
fn clip_half_plane(poly: &[Vec2], normal: Vec2) -> Vec<Vec2> {
    let mut out = Vec::with_capacity(poly.len() + 2);
    for (i, &a) in poly.iter().enumerate() {
        let b = poly[(i + 1) % poly.len()];
        let da = a.dot(normal);
        let db = b.dot(normal);
        if da >= 0.0 {
            out.push(a);
        }
        if (da >= 0.0) != (db >= 0.0) {
            let t = da / (da - db);
            // Snap onto the line so the cut points are exactly recognisable
            let p = a + (b - a) * t;
            out.push(p - normal * p.dot(normal));
        }
    }
    out
}

/// Replace the straight cut edge of a clipped half with the jagged crack
fn insert_crack(ring: Vec<Vec2>, normal: Vec2, dir: Vec2, interior: &[(f32, f32)]) -> Vec<Vec2> {
    let n = ring.len();
    let on_line = |p: Vec2| p.dot(normal).abs() < LINE_EPS;
    let Some(i) = (0..n).find(|&i| on_line(ring[i]) && on_line(ring[(i + 1) % n])) else {
        return ring;
    };

    let from = ring[i].dot(dir);
    let to = ring[(i + 1) % n].dot(dir);
    let mut points: Vec<Vec2> = interior
        .iter()
        .map(|&(along, across)| dir * along + normal * across)
        .collect();
    if from > to {
        points.reverse();
    }

    let mut out = Vec::with_capacity(n + points.len());
    out.extend_from_slice(&ring[..=i]);
    out.extend(points);
    out.extend_from_slice(&ring[i + 1..]);
    out
}

fn make_child(ring: Vec<Vec2>, side: Vec2) -> ChildShape {
    let center = ring.iter().copied().sum::<Vec2>() / ring.len() as f32;
    let vertices: Vec<Vec2> = ring.into_iter().map(|p| p - center).collect();
    let radius = bounding_radius(&vertices);
    ChildShape {
        vertices,
        offset: center,
        separation: side * SEPARATION_SPEED,
        radius,
    }
}
