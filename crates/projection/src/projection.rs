use std::f64::consts::{FRAC_PI_2, PI, TAU};

use foundation::Aabb2;
use foundation::math::{Rotation, Vec3, angular_distance, interpolate, small_circle};
use formats::{GeoObject, Geometry, Position};

use crate::raw::RawProjection;

/// Maximum great-circle step (degrees) between projected samples.
pub const RESAMPLE_STEP_DEG: f64 = 2.0;

/// Sample spacing (degrees) along the outline of the projected sphere.
pub const OUTLINE_STEP_DEG: f64 = 2.0;

/// Longitude (degrees) just inside the cut of non-azimuthal projections.
const ANTIMERIDIAN_EDGE_DEG: f64 = 180.0 - 1e-6;

/// Receives projected (screen-space) drawing commands.
pub trait PathSink {
    fn move_to(&mut self, p: [f64; 2]);
    fn line_to(&mut self, p: [f64; 2]);
    fn close(&mut self);
    fn point(&mut self, p: [f64; 2]);
}

/// A configured projection: raw formula, rotation, scale and translation.
///
/// Screen coordinates have y pointing down: `[tx + k * x, ty - k * y]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    raw: RawProjection,
    rotation: Rotation,
    scale: f64,
    translate: [f64; 2],
}

impl Projection {
    pub fn new(raw: RawProjection) -> Self {
        Self {
            raw,
            rotation: Rotation::identity(),
            scale: 150.0,
            translate: [480.0, 250.0],
        }
    }

    pub fn raw(&self) -> RawProjection {
        self.raw
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> [f64; 2] {
        self.translate
    }

    /// Rotates by `[lambda, phi]` degrees (longitude spin, then latitude tilt).
    pub fn rotate(mut self, angles: [f64; 2]) -> Self {
        self.rotation = Rotation::from_degrees(angles[0], angles[1], 0.0);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_translate(mut self, translate: [f64; 2]) -> Self {
        self.translate = translate;
        self
    }

    /// Sets scale and translation so `object` fills a `[width, height]` box,
    /// centered on the shorter axis.
    pub fn fit_size<T: GeoObject + ?Sized>(self, size: [f64; 2], object: &T) -> Self {
        let unit = self.with_scale(1.0).with_translate([0.0, 0.0]);
        let mut bounds = BoundsSink::default();
        unit.stream(object, &mut bounds);
        let b = bounds.into_bounds();
        if !b.is_valid() || b.width() <= 0.0 || b.height() <= 0.0 {
            return self;
        }

        let k = (size[0] / b.width()).min(size[1] / b.height());
        let tx = (size[0] - k * (b.min[0] + b.max[0])) / 2.0;
        let ty = (size[1] - k * (b.min[1] + b.max[1])) / 2.0;
        self.with_scale(k).with_translate([tx, ty])
    }

    /// Projects `[lon, lat]` degrees; `None` when clipped away.
    pub fn project(&self, p: Position) -> Option<[f64; 2]> {
        let (lambda, phi) = self.rotation.apply(p[0].to_radians(), p[1].to_radians());
        self.project_rotated(lambda, phi)
    }

    fn project_rotated(&self, lambda: f64, phi: f64) -> Option<[f64; 2]> {
        if !self.raw.is_visible(lambda, phi) {
            return None;
        }
        let [x, y] = self.raw.forward(lambda, phi)?;
        Some([
            self.translate[0] + self.scale * x,
            self.translate[1] - self.scale * y,
        ])
    }

    /// Edge of the drawable domain, in rotated `[lon, lat]` degrees.
    ///
    /// Rotation never changes it: the globe's outline stays put while the
    /// surface spins underneath.
    pub fn outline_ring(&self) -> Vec<Position> {
        if let Some(angle) = self.raw.clip_angle() {
            return small_circle([0.0, 0.0], angle, OUTLINE_STEP_DEG);
        }

        let edge = ANTIMERIDIAN_EDGE_DEG;
        let steps = (180.0 / OUTLINE_STEP_DEG).ceil() as usize;
        let lerp = |a: f64, b: f64, i: usize, n: usize| a + (b - a) * i as f64 / n as f64;

        let mut ring = Vec::with_capacity(4 * steps + 1);
        for i in 0..steps {
            ring.push([edge, lerp(-90.0, 90.0, i, steps)]);
        }
        for i in 0..2 * steps {
            ring.push([lerp(edge, -edge, i, 2 * steps), 90.0]);
        }
        for i in 0..steps {
            ring.push([-edge, lerp(90.0, -90.0, i, steps)]);
        }
        for i in 0..2 * steps {
            ring.push([lerp(-edge, edge, i, 2 * steps), -90.0]);
        }
        ring.push(ring[0]);
        ring
    }

    /// Streams `object` through the projection into `sink`.
    pub fn stream<T: GeoObject + ?Sized>(&self, object: &T, sink: &mut dyn PathSink) {
        object.for_each_geometry(&mut |g| self.stream_geometry(g, sink));
    }

    fn stream_geometry(&self, geometry: &Geometry, sink: &mut dyn PathSink) {
        match geometry {
            Geometry::Sphere => {
                let ring = self.outline_ring();
                let mut first = true;
                for p in &ring[..ring.len() - 1] {
                    let Some([x, y]) = self.raw.forward(p[0].to_radians(), p[1].to_radians())
                    else {
                        continue;
                    };
                    let xy = [
                        self.translate[0] + self.scale * x,
                        self.translate[1] - self.scale * y,
                    ];
                    if first {
                        sink.move_to(xy);
                        first = false;
                    } else {
                        sink.line_to(xy);
                    }
                }
                if !first {
                    sink.close();
                }
            }
            Geometry::Point(p) => {
                if let Some(xy) = self.project(*p) {
                    sink.point(xy);
                }
            }
            Geometry::MultiPoint(ps) => {
                for xy in ps.iter().filter_map(|p| self.project(*p)) {
                    sink.point(xy);
                }
            }
            other => other.for_each_line(&mut |line, closed| self.stream_line(line, closed, sink)),
        }
    }

    /// Resamples and projects one line or ring.
    ///
    /// Lines lift the pen where they leave the drawable domain. Rings cut by
    /// the domain edge are closed again along that edge.
    fn stream_line(&self, line: &[Position], closed: bool, sink: &mut dyn PathSink) {
        if line.len() < 2 {
            return;
        }

        let rotated: Vec<Vec3> = line
            .iter()
            .map(|p| {
                let (lambda, phi) = self.rotation.apply(p[0].to_radians(), p[1].to_radians());
                lon_lat_rad_to_unit(lambda, phi)
            })
            .collect();

        let mut samples: Vec<(f64, f64)> = Vec::with_capacity(rotated.len());
        samples.push(unit_to_lon_lat_rad(rotated[0]));
        let max_step = RESAMPLE_STEP_DEG.to_radians();
        for pair in rotated.windows(2) {
            let steps = (angular_distance(pair[0], pair[1]) / max_step).ceil().max(1.0) as usize;
            for i in 1..=steps {
                let v = interpolate(pair[0], pair[1], i as f64 / steps as f64);
                samples.push(unit_to_lon_lat_rad(v));
            }
        }

        let edge = self.clip_edge();
        let mut pieces: Vec<Piece> = Vec::new();
        let mut current = Piece::default();
        let mut previous: Option<((f64, f64), bool)> = None;

        for &sample in &samples {
            let visible = self.raw.is_visible(sample.0, sample.1);
            if let Some((prev, prev_visible)) = previous {
                match edge {
                    ClipEdge::Circle { .. } if prev_visible && !visible => {
                        let exit = self.horizon_crossing(prev, sample);
                        current.leave(exit, edge.param(exit));
                        pieces.push(std::mem::take(&mut current));
                    }
                    ClipEdge::Circle { .. } if !prev_visible && visible => {
                        let entry = self.horizon_crossing(sample, prev);
                        current = Piece::entering(entry, edge.param(entry));
                    }
                    ClipEdge::Antimeridian if (sample.0 - prev.0).abs() > PI => {
                        let phi = antimeridian_latitude(prev, sample);
                        let side = ANTIMERIDIAN_EDGE_DEG.to_radians();
                        let exit = (side.copysign(prev.0), phi);
                        let entry = (side.copysign(sample.0), phi);
                        current.leave(exit, edge.param(exit));
                        pieces.push(std::mem::take(&mut current));
                        current = Piece::entering(entry, edge.param(entry));
                    }
                    _ => {}
                }
            }
            if visible {
                current.points.push(sample);
            }
            previous = Some((sample, visible));
        }
        if !current.points.is_empty() {
            pieces.push(current);
        }

        if !closed {
            for piece in &pieces {
                self.emit_rotated(sink, &piece.points, false);
            }
            return;
        }

        // A ring that starts inside continues across its closing vertex.
        if pieces.len() > 1 && pieces[0].start.is_none() && pieces[pieces.len() - 1].end.is_none() {
            let first = pieces.remove(0);
            if let Some(last) = pieces.last_mut() {
                last.points.extend(first.points.into_iter().skip(1));
                last.end = first.end;
            }
        }

        match pieces.as_slice() {
            [] => {
                if matches!(edge, ClipEdge::Circle { .. }) && encircles_center(&samples) {
                    let mut ring = edge.full_loop();
                    if let Some(&first) = ring.first() {
                        ring.push(first);
                    }
                    self.emit_rotated(sink, &ring, true);
                }
            }
            [only] if only.start.is_none() && only.end.is_none() => {
                self.emit_rotated(sink, &only.points, true);
            }
            _ => self.rejoin(edge, &pieces, sink),
        }
    }

    fn clip_edge(&self) -> ClipEdge {
        match self.raw.clip_angle() {
            Some(angle) => ClipEdge::Circle {
                radius: angle.to_radians(),
            },
            None => ClipEdge::Antimeridian,
        }
    }

    /// Last visible point on the great-circle arc from `inside` to `outside`.
    fn horizon_crossing(&self, inside: (f64, f64), outside: (f64, f64)) -> (f64, f64) {
        let a = lon_lat_rad_to_unit(inside.0, inside.1);
        let b = lon_lat_rad_to_unit(outside.0, outside.1);
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..40 {
            let mid = 0.5 * (lo + hi);
            let (lambda, phi) = unit_to_lon_lat_rad(interpolate(a, b, mid));
            if self.raw.is_visible(lambda, phi) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        unit_to_lon_lat_rad(interpolate(a, b, lo))
    }

    /// Chains cut pieces into closed rings: from each exit, follow the edge
    /// clockwise to the nearest entry.
    fn rejoin(&self, edge: ClipEdge, pieces: &[Piece], sink: &mut dyn PathSink) {
        let Some(ends) = pieces
            .iter()
            .map(|p| Some((p.start?, p.end?)))
            .collect::<Option<Vec<_>>>()
        else {
            for piece in pieces {
                self.emit_rotated(sink, &piece.points, false);
            }
            return;
        };

        let period = edge.period();
        let mut used = vec![false; pieces.len()];
        for first in 0..pieces.len() {
            if used[first] {
                continue;
            }
            let mut ring: Vec<(f64, f64)> = Vec::new();
            let mut at = first;
            loop {
                used[at] = true;
                ring.extend_from_slice(&pieces[at].points);
                let exit = ends[at].1;
                let gap = |k: usize| (exit - ends[k].0).rem_euclid(period);
                let next = (0..pieces.len())
                    .filter(|&k| k == first || !used[k])
                    .min_by(|&a, &b| gap(a).total_cmp(&gap(b)))
                    .unwrap_or(first);
                edge.walk(exit, ends[next].0, &mut ring);
                if next == first {
                    break;
                }
                at = next;
            }
            if let Some(&start) = ring.first() {
                ring.push(start);
            }
            self.emit_rotated(sink, &ring, true);
        }
    }

    /// Projects rotated `(lambda, phi)` radians without a visibility test;
    /// points on the domain edge sit right at its limit.
    fn emit_rotated(&self, sink: &mut dyn PathSink, points: &[(f64, f64)], close: bool) {
        let projected: Vec<[f64; 2]> = points
            .iter()
            .filter_map(|&(lambda, phi)| {
                let [x, y] = self.raw.forward(lambda, phi)?;
                Some([
                    self.translate[0] + self.scale * x,
                    self.translate[1] - self.scale * y,
                ])
            })
            .collect();
        emit(sink, &projected, close);
    }
}

/// Run of drawable samples, with the edge positions where it enters and
/// leaves the domain (`None` when it starts or ends inside).
#[derive(Debug, Default)]
struct Piece {
    points: Vec<(f64, f64)>,
    start: Option<f64>,
    end: Option<f64>,
}

impl Piece {
    fn entering(point: (f64, f64), param: f64) -> Self {
        Self {
            points: vec![point],
            start: Some(param),
            end: None,
        }
    }

    fn leave(&mut self, point: (f64, f64), param: f64) {
        self.points.push(point);
        self.end = Some(param);
    }
}

/// Boundary of the drawable domain in rotated coordinates. Positions along
/// it are parameters that grow counter-clockwise seen from outside.
#[derive(Debug, Copy, Clone)]
enum ClipEdge {
    /// Small circle of `radius` radians around the projection center.
    Circle { radius: f64 },
    /// Both sides of the cut meridian joined across the poles.
    Antimeridian,
}

impl ClipEdge {
    fn period(self) -> f64 {
        match self {
            ClipEdge::Circle { .. } => TAU,
            ClipEdge::Antimeridian => 4.0,
        }
    }

    fn step(self) -> f64 {
        match self {
            ClipEdge::Circle { .. } => OUTLINE_STEP_DEG.to_radians(),
            ClipEdge::Antimeridian => OUTLINE_STEP_DEG / 360.0,
        }
    }

    /// Parameter of a point lying on the edge.
    fn param(self, (lambda, phi): (f64, f64)) -> f64 {
        match self {
            ClipEdge::Circle { .. } => {
                let v = lon_lat_rad_to_unit(lambda, phi);
                v.z.atan2(v.y)
            }
            ClipEdge::Antimeridian if lambda > 0.0 => (phi + FRAC_PI_2) / PI,
            ClipEdge::Antimeridian => 2.0 + (FRAC_PI_2 - phi) / PI,
        }
    }

    fn point(self, t: f64) -> (f64, f64) {
        match self {
            ClipEdge::Circle { radius } => {
                let (sin_r, cos_r) = radius.sin_cos();
                unit_to_lon_lat_rad(Vec3::new(cos_r, sin_r * t.cos(), sin_r * t.sin()))
            }
            ClipEdge::Antimeridian => {
                let edge = ANTIMERIDIAN_EDGE_DEG.to_radians();
                let t = t.rem_euclid(4.0);
                if t < 1.0 {
                    (edge, t * PI - FRAC_PI_2)
                } else if t < 2.0 {
                    (edge - (t - 1.0) * 2.0 * edge, FRAC_PI_2)
                } else if t < 3.0 {
                    (-edge, FRAC_PI_2 - (t - 2.0) * PI)
                } else {
                    (-edge + (t - 3.0) * 2.0 * edge, -FRAC_PI_2)
                }
            }
        }
    }

    /// Appends the edge points strictly between `from` and `to`, walking
    /// clockwise.
    fn walk(self, from: f64, to: f64, out: &mut Vec<(f64, f64)>) {
        let step = self.step();
        let span = (from - to).rem_euclid(self.period());
        let mut t = ((from / step).ceil() - 1.0) * step;
        while from - t < span {
            out.push(self.point(t));
            t -= step;
        }
    }

    fn full_loop(self) -> Vec<(f64, f64)> {
        let step = self.step();
        let n = (self.period() / step).round() as usize;
        (0..n).map(|i| self.point(-(i as f64) * step)).collect()
    }
}

/// Latitude where the great circle through `a` and `b` meets the antimeridian.
fn antimeridian_latitude(a: (f64, f64), b: (f64, f64)) -> f64 {
    let u = lon_lat_rad_to_unit(a.0, a.1);
    let v = lon_lat_rad_to_unit(b.0, b.1);
    let denom = u.y - v.y;
    let t = if denom.abs() > 1e-12 { u.y / denom } else { 0.5 };
    (u + (v - u).scale(t))
        .normalized()
        .map_or(0.5 * (a.1 + b.1), |p| unit_to_lon_lat_rad(p).1)
}

/// Whether a clockwise ring winds around the projection center.
fn encircles_center(samples: &[(f64, f64)]) -> bool {
    let bearing = |&(lambda, phi): &(f64, f64)| {
        let v = lon_lat_rad_to_unit(lambda, phi);
        v.z.atan2(v.y)
    };
    let turn: f64 = samples
        .windows(2)
        .map(|w| (bearing(&w[1]) - bearing(&w[0]) + PI).rem_euclid(TAU) - PI)
        .sum();
    turn < -PI
}

fn emit(sink: &mut dyn PathSink, points: &[[f64; 2]], close: bool) {
    let Some((first, rest)) = points.split_first() else {
        return;
    };
    if rest.is_empty() {
        return;
    }
    sink.move_to(*first);
    let rest = if close { &rest[..rest.len() - 1] } else { rest };
    for p in rest {
        sink.line_to(*p);
    }
    if close {
        sink.close();
    }
}

fn lon_lat_rad_to_unit(lambda: f64, phi: f64) -> Vec3 {
    let cos_phi = phi.cos();
    Vec3::new(cos_phi * lambda.cos(), cos_phi * lambda.sin(), phi.sin())
}

fn unit_to_lon_lat_rad(v: Vec3) -> (f64, f64) {
    (
        v.y.atan2(v.x),
        v.z.atan2((v.x * v.x + v.y * v.y).sqrt()),
    )
}

/// Collects the screen-space bounding box of everything streamed into it.
#[derive(Debug)]
pub struct BoundsSink {
    bounds: Aabb2,
}

impl Default for BoundsSink {
    fn default() -> Self {
        Self {
            bounds: Aabb2::empty(),
        }
    }
}

impl BoundsSink {
    pub fn into_bounds(self) -> Aabb2 {
        self.bounds
    }
}

impl PathSink for BoundsSink {
    fn move_to(&mut self, p: [f64; 2]) {
        self.bounds.extend(p);
    }

    fn line_to(&mut self, p: [f64; 2]) {
        self.bounds.extend(p);
    }

    fn close(&mut self) {}

    fn point(&mut self, p: [f64; 2]) {
        self.bounds.extend(p);
    }
}
