//! Barnes–Hut quadtree for the many-body charge force.
//!
//! Quads live in an arena and refer to each other by index. Leaves hold
//! every body that falls into them, so coincident points never force an
//! unbounded split.

use crate::graph::Vec2;

const MAX_DEPTH: usize = 24;

#[derive(Debug, Clone)]
struct Quad {
    origin: Vec2,
    size: f32,
    /// Summed charge of every body below this quad.
    charge: f32,
    /// Charge-weighted center of the bodies below this quad.
    center: Vec2,
    children: Option<[usize; 4]>,
    bodies: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct QuadTree {
    quads: Vec<Quad>,
}

impl QuadTree {
    /// Build a tree over `positions`, every body carrying `charge`.
    pub fn build(positions: &[Vec2], charge: f32) -> Self {
        let mut tree = QuadTree { quads: Vec::new() };
        if positions.is_empty() {
            return tree;
        }

        let (mut min, mut max) = (positions[0], positions[0]);
        for p in positions {
            min = Vec2::new(min.x.min(p.x), min.y.min(p.y));
            max = Vec2::new(max.x.max(p.x), max.y.max(p.y));
        }
        let size = (max.x - min.x).max(max.y - min.y).max(1.0);

        let all: Vec<usize> = (0..positions.len()).collect();
        tree.subdivide(positions, charge, all, min, size, 0);
        tree
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    fn subdivide(
        &mut self,
        positions: &[Vec2],
        charge: f32,
        bodies: Vec<usize>,
        origin: Vec2,
        size: f32,
        depth: usize,
    ) -> usize {
        let idx = self.quads.len();
        let total = charge * bodies.len() as f32;
        let center = if bodies.is_empty() {
            origin
        } else {
            let sum = bodies
                .iter()
                .fold(Vec2::ZERO, |acc, &b| acc + positions[b]);
            sum * (1.0 / bodies.len() as f32)
        };
        self.quads.push(Quad {
            origin,
            size,
            charge: total,
            center,
            children: None,
            bodies: Vec::new(),
        });

        if bodies.len() <= 1 || depth >= MAX_DEPTH {
            self.quads[idx].bodies = bodies;
            return idx;
        }

        let half = size / 2.0;
        let mid = origin + Vec2::new(half, half);
        let mut parts: [Vec<usize>; 4] = Default::default();
        for b in bodies {
            let p = positions[b];
            let slot = usize::from(p.x >= mid.x) | (usize::from(p.y >= mid.y) << 1);
            parts[slot].push(b);
        }

        let mut children = [0; 4];
        for (slot, part) in parts.into_iter().enumerate() {
            let child_origin = Vec2::new(
                if slot & 1 == 1 { mid.x } else { origin.x },
                if slot & 2 == 2 { mid.y } else { origin.y },
            );
            children[slot] = self.subdivide(positions, charge, part, child_origin, half, depth + 1);
        }
        self.quads[idx].children = Some(children);
        idx
    }

    /// Velocity change on `body` from every other body, scaled by `alpha`.
    ///
    /// Quads whose width is small relative to their distance (`w / d < theta`)
    /// are treated as a single aggregated charge.
    pub fn force_on(
        &self,
        body: usize,
        positions: &[Vec2],
        alpha: f32,
        theta: f32,
        distance_min: f32,
        jiggle: &mut dyn FnMut() -> f32,
    ) -> Vec2 {
        let mut dv = Vec2::ZERO;
        if self.quads.is_empty() {
            return dv;
        }
        let pos = positions[body];
        let theta2 = theta * theta;
        let distance_min2 = distance_min * distance_min;
        let soften = |l: f32| if l < distance_min2 { (distance_min2 * l).sqrt() } else { l };

        let mut stack = vec![0];
        while let Some(idx) = stack.pop() {
            let quad = &self.quads[idx];
            if quad.charge == 0.0 {
                continue;
            }

            let d = quad.center - pos;
            let l = d.length_sq();
            if quad.size * quad.size / theta2 < l {
                dv += d * (quad.charge * alpha / soften(l));
                continue;
            }

            if let Some(children) = quad.children {
                stack.extend(children);
                continue;
            }

            let per_body = quad.charge / quad.bodies.len() as f32;
            for &other in &quad.bodies {
                if other == body {
                    continue;
                }
                let mut d = positions[other] - pos;
                if d.x == 0.0 {
                    d.x = jiggle();
                }
                if d.y == 0.0 {
                    d.y = jiggle();
                }
                dv += d * (per_body * alpha / soften(d.length_sq()));
            }
        }
        dv
    }
}
