//! Schnittpunkt-Berechnungen in der XZ-Bodenebene.
//!
//! Höhenkomponenten werden ignoriert: zwei Trajektorien schneiden sich, wenn
//! ihre Grundriss-Projektionen sich kreuzen. Ein fehlender Schnittpunkt ist
//! nie ein Fehler — die Aufrufer haben dokumentierte Ausweichwerte.

use super::trajectory::{Bezier3, StraightLine};

/// Parametrische Treffer auf beiden Operanden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub first_t: f32,
    pub second_t: f32,
}

/// Unterhalb dieser Determinante gelten Richtungen als parallel.
const PARALLEL_EPS: f32 = 1e-7;

/// Maximale Abweichung der Kontrollpunkte von der Sehne (Meter), ab der eine
/// Teilkurve als Strecke behandelt wird.
const FLAT_TOLERANCE: f32 = 1e-3;

const MAX_DEPTH: u32 = 24;

/// Schnitt zweier Geraden. `first_t` liegt auf `a`, `second_t` auf `b`;
/// bei `bounded` wird der jeweilige Parameter auf [0, 1] geprüft.
pub fn line_line(a: &StraightLine, b: &StraightLine) -> Option<Hit> {
    let ad = a.direction();
    let bd = b.direction();
    let det = ad.x * bd.z - ad.z * bd.x;
    if det.abs() < PARALLEL_EPS {
        return None;
    }
    let dx = b.start.x - a.start.x;
    let dz = b.start.z - a.start.z;
    let s = (dx * bd.z - dz * bd.x) / det;
    let u = (dx * ad.z - dz * ad.x) / det;
    if a.bounded && !(0.0..=1.0).contains(&s) {
        return None;
    }
    if b.bounded && !(0.0..=1.0).contains(&u) {
        return None;
    }
    Some(Hit {
        first_t: s,
        second_t: u,
    })
}

/// Erster Schnitt einer Kurve mit einer Geraden, in Kurvenrichtung gesucht.
/// `first_t` liegt auf der Kurve, `second_t` auf der Geraden.
pub fn bezier_line(curve: &Bezier3, line: &StraightLine) -> Option<Hit> {
    let (mut t, mut s) = scan_segment(curve, 0.0, 1.0, 64, line)?;
    // Zweistufige Verfeinerung um die Treffer-Stützstelle
    let mut window = 1.0 / 64.0;
    for _ in 0..2 {
        let lo = (t - window).max(0.0);
        let hi = (t + window).min(1.0);
        if let Some((rt, rs)) = scan_segment(curve, lo, hi, 16, line) {
            t = rt;
            s = rs;
        }
        window /= 16.0;
    }
    Some(Hit {
        first_t: t,
        second_t: s,
    })
}

/// Polylinien-Abtastung von [t0, t1]; liefert den ersten Sehnen-Treffer.
fn scan_segment(
    curve: &Bezier3,
    t0: f32,
    t1: f32,
    steps: usize,
    line: &StraightLine,
) -> Option<(f32, f32)> {
    let mut prev_t = t0;
    let mut prev_p = curve.position(t0);
    for i in 1..=steps {
        let t = t0 + (t1 - t0) * (i as f32 / steps as f32);
        let p = curve.position(t);
        let chord = StraightLine::new(prev_p, p);
        if let Some(hit) = line_line(&chord, line) {
            return Some((prev_t + (t - prev_t) * hit.first_t, hit.second_t));
        }
        prev_t = t;
        prev_p = p;
    }
    None
}

/// Erster Schnitt zweier Kurven über rekursive Unterteilung.
///
/// Beide Kurven werden halbiert, solange ihre Hüllboxen überlappen und eine
/// von beiden noch nicht sehnen-flach ist; flache Paare werden als Strecken
/// geschnitten. Die Suchreihenfolge (linke Hälften zuerst) liefert den
/// Treffer mit dem kleinsten Parameter auf der ersten Kurve.
pub fn bezier_bezier(a: &Bezier3, b: &Bezier3) -> Option<Hit> {
    subdivide(a, 0.0, 1.0, b, 0.0, 1.0, 0)
}

#[allow(clippy::too_many_arguments)]
fn subdivide(
    a: &Bezier3,
    a0: f32,
    a1: f32,
    b: &Bezier3,
    b0: f32,
    b1: f32,
    depth: u32,
) -> Option<Hit> {
    if !boxes_overlap(a, b) {
        return None;
    }
    if depth >= MAX_DEPTH || (is_flat(a) && is_flat(b)) {
        let chord_a = StraightLine::new(a.p0, a.p3);
        let chord_b = StraightLine::new(b.p0, b.p3);
        let hit = line_line(&chord_a, &chord_b)?;
        return Some(Hit {
            first_t: a0 + (a1 - a0) * hit.first_t,
            second_t: b0 + (b1 - b0) * hit.second_t,
        });
    }
    let (al, ar) = a.split(0.5);
    let (bl, br) = b.split(0.5);
    let am = (a0 + a1) * 0.5;
    let bm = (b0 + b1) * 0.5;
    subdivide(&al, a0, am, &bl, b0, bm, depth + 1)
        .or_else(|| subdivide(&al, a0, am, &br, bm, b1, depth + 1))
        .or_else(|| subdivide(&ar, am, a1, &bl, b0, bm, depth + 1))
        .or_else(|| subdivide(&ar, am, a1, &br, bm, b1, depth + 1))
}

/// XZ-Hüllboxen der Kontrollpolygone, mit Toleranz-Rand.
fn boxes_overlap(a: &Bezier3, b: &Bezier3) -> bool {
    let (a_min_x, a_max_x) = min_max(a.p0.x, a.p1.x, a.p2.x, a.p3.x);
    let (a_min_z, a_max_z) = min_max(a.p0.z, a.p1.z, a.p2.z, a.p3.z);
    let (b_min_x, b_max_x) = min_max(b.p0.x, b.p1.x, b.p2.x, b.p3.x);
    let (b_min_z, b_max_z) = min_max(b.p0.z, b.p1.z, b.p2.z, b.p3.z);
    a_min_x - FLAT_TOLERANCE <= b_max_x
        && b_min_x - FLAT_TOLERANCE <= a_max_x
        && a_min_z - FLAT_TOLERANCE <= b_max_z
        && b_min_z - FLAT_TOLERANCE <= a_max_z
}

fn min_max(a: f32, b: f32, c: f32, d: f32) -> (f32, f32) {
    (a.min(b).min(c).min(d), a.max(b).max(c).max(d))
}

/// Sehnen-Flachheit: maximaler XZ-Abstand der inneren Kontrollpunkte
/// zur Sehne p0→p3.
fn is_flat(c: &Bezier3) -> bool {
    let dx = c.p3.x - c.p0.x;
    let dz = c.p3.z - c.p0.z;
    let len_sq = dx * dx + dz * dz;
    if len_sq < f32::EPSILON {
        return true;
    }
    let dist = |px: f32, pz: f32| -> f32 {
        let cross = (px - c.p0.x) * dz - (pz - c.p0.z) * dx;
        cross.abs() / len_sq.sqrt()
    };
    dist(c.p1.x, c.p1.z) <= FLAT_TOLERANCE && dist(c.p2.x, c.p2.z) <= FLAT_TOLERANCE
}
