#![allow(dead_code)]

use std::f64::consts::PI;

use geo::{Coord, Line, LineString, Rect};

use rand::Rng;
use rand_distr::Standard;

#[inline]
pub fn uniform_point<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Coord<f64> {
    let coords: [f64; 2] = rng.sample(Standard);
    let dims = bounds.max() - bounds.min();
    Coord {
        x: bounds.min().x + dims.x * coords[0],
        y: bounds.min().y + dims.y * coords[1],
    }
}

#[inline]
pub fn uniform_line<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Line<f64> {
    Line::new(uniform_point(rng, bounds), uniform_point(rng, bounds))
}

/// A box with its min corner in `bounds` and sides up to `max_side`.
#[inline]
pub fn uniform_rect<R: Rng>(rng: &mut R, bounds: Rect<f64>, max_side: f64) -> Rect<f64> {
    let min = uniform_point(rng, bounds);
    let sides: [f64; 2] = rng.sample(Standard);
    Rect::new(
        min,
        Coord {
            x: min.x + sides[0] * max_side,
            y: min.y + sides[1] * max_side,
        },
    )
}

/// A random walk of `vertices` points starting inside `bounds`, with
/// steps of length `step` in uniformly random directions.
pub fn random_polyline<R: Rng>(
    rng: &mut R,
    bounds: Rect<f64>,
    vertices: usize,
    step: f64,
) -> LineString<f64> {
    let mut last = uniform_point(rng, bounds);
    let mut coords = Vec::with_capacity(vertices);
    coords.push(last);
    for _ in 1..vertices {
        let angle = rng.sample::<f64, _>(Standard) * 2. * PI;
        last = Coord {
            x: last.x + step * angle.cos(),
            y: last.y + step * angle.sin(),
        };
        coords.push(last);
    }
    LineString::new(coords)
}
