//! Trajektorien: kubische Bézier-Kurven und Geradenstücke im Raum.
//!
//! Parametrische Positionen `t` liegen in [0, 1]. `travel` und `distance`
//! arbeiten auf der Bogenlänge (über eine Stützstellen-Tabelle), nicht auf
//! dem rohen Kurvenparameter.

use glam::Vec3;

/// Stützstellen für Bogenlängen-Tabellen. Reicht für Kurven im
/// Straßenmaßstab (einige hundert Meter) deutlich unter 1 cm Fehler.
const ARC_SAMPLES: usize = 64;

/// Kubische Bézier-Kurve über vier Kontrollpunkte.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bezier3 {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
}

impl Bezier3 {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Kurve aus Endpunkten und Endrichtungen (beide zeigen ins Kurveninnere).
    ///
    /// Die Kontrollpunkte werden im Abstand Sehnenlänge/3 entlang der
    /// Richtungen platziert; degenerierte Richtungen fallen auf die Sehne
    /// zurück.
    pub fn from_ends(start: Vec3, start_dir: Vec3, end: Vec3, end_dir: Vec3) -> Self {
        let chord = end - start;
        let d = chord.length() / 3.0;
        let sdir = normalize_or(start_dir, chord);
        let edir = normalize_or(end_dir, -chord);
        Self {
            p0: start,
            p1: start + sdir * d,
            p2: end + edir * d,
            p3: end,
        }
    }

    /// B(t) in Bernstein-Form.
    pub fn position(&self, t: f32) -> Vec3 {
        let inv = 1.0 - t;
        let inv2 = inv * inv;
        let t2 = t * t;
        inv2 * inv * self.p0 + 3.0 * inv2 * t * self.p1 + 3.0 * inv * t2 * self.p2 + t2 * t * self.p3
    }

    /// Erste Ableitung B'(t) — nicht normalisiert.
    pub fn tangent(&self, t: f32) -> Vec3 {
        let inv = 1.0 - t;
        3.0 * inv * inv * (self.p1 - self.p0)
            + 6.0 * inv * t * (self.p2 - self.p1)
            + 3.0 * t * t * (self.p3 - self.p2)
    }

    /// Approximierte Gesamtlänge über Polylinien-Segmente.
    pub fn length(&self) -> f32 {
        let mut length = 0.0;
        let mut prev = self.p0;
        for i in 1..=ARC_SAMPLES {
            let t = i as f32 / ARC_SAMPLES as f32;
            let p = self.position(t);
            length += prev.distance(p);
            prev = p;
        }
        length
    }

    /// Kumulative Bogenlängen an den Stützstellen 0..=ARC_SAMPLES.
    fn arc_table(&self) -> Vec<f32> {
        let mut table = Vec::with_capacity(ARC_SAMPLES + 1);
        table.push(0.0);
        let mut prev = self.p0;
        let mut cumulative = 0.0f32;
        for i in 1..=ARC_SAMPLES {
            let t = i as f32 / ARC_SAMPLES as f32;
            let p = self.position(t);
            cumulative += prev.distance(p);
            table.push(cumulative);
            prev = p;
        }
        table
    }

    /// Parameter, an dem die Bogenlänge `length` erreicht ist (geklemmt).
    fn t_at_arc(table: &[f32], target: f32) -> f32 {
        let total = *table.last().unwrap_or(&0.0);
        if total < f32::EPSILON {
            return 0.0;
        }
        if target <= 0.0 {
            return 0.0;
        }
        if target >= total {
            return 1.0;
        }
        let idx = table
            .partition_point(|&len| len < target)
            .min(ARC_SAMPLES)
            .max(1);
        let before = table[idx - 1];
        let after = table[idx];
        let frac = if (after - before).abs() > f32::EPSILON {
            (target - before) / (after - before)
        } else {
            0.0
        };
        ((idx - 1) as f32 + frac) / ARC_SAMPLES as f32
    }

    /// Bogenlänge vom Kurvenanfang bis `t`.
    fn arc_at(table: &[f32], t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let scaled = t * ARC_SAMPLES as f32;
        let idx = (scaled.floor() as usize).min(ARC_SAMPLES - 1);
        let frac = scaled - idx as f32;
        table[idx] + (table[idx + 1] - table[idx]) * frac
    }

    /// Wandert von `start_t` um `distance` Meter Bogenlänge weiter
    /// (negativ = rückwärts). Ergebnis geklemmt auf [0, 1].
    pub fn travel(&self, start_t: f32, distance: f32) -> f32 {
        let table = self.arc_table();
        let target = Self::arc_at(&table, start_t) + distance;
        Self::t_at_arc(&table, target)
    }

    /// Bogenlänge zwischen zwei Parametern (immer ≥ 0).
    pub fn distance(&self, t0: f32, t1: f32) -> f32 {
        let table = self.arc_table();
        (Self::arc_at(&table, t1) - Self::arc_at(&table, t0)).abs()
    }

    /// Teilkurve auf [t0, t1] über zweifaches de-Casteljau-Splitting.
    pub fn cut(&self, t0: f32, t1: f32) -> Bezier3 {
        let t0 = t0.clamp(0.0, 1.0);
        let t1 = t1.clamp(t0, 1.0);
        // Erst den Teil ab t0 extrahieren, darin dann bis t1 schneiden
        let (_, tail) = self.split(t0);
        let local = if (1.0 - t0).abs() < f32::EPSILON {
            0.0
        } else {
            (t1 - t0) / (1.0 - t0)
        };
        let (head, _) = tail.split(local);
        head
    }

    /// De-Casteljau-Split an `t` in zwei Teilkurven.
    pub fn split(&self, t: f32) -> (Bezier3, Bezier3) {
        let a = self.p0.lerp(self.p1, t);
        let b = self.p1.lerp(self.p2, t);
        let c = self.p2.lerp(self.p3, t);
        let ab = a.lerp(b, t);
        let bc = b.lerp(c, t);
        let mid = ab.lerp(bc, t);
        (
            Bezier3::new(self.p0, a, ab, mid),
            Bezier3::new(mid, bc, c, self.p3),
        )
    }

    /// Kurve mit umgekehrter Laufrichtung.
    pub fn invert(&self) -> Bezier3 {
        Bezier3::new(self.p3, self.p2, self.p1, self.p0)
    }

    /// Parameter des Punkts mit minimalem XZ-Abstand zu `point`.
    ///
    /// Grobe Abtastung mit anschließender lokaler Verfeinerung — für
    /// Interpolationszwecke (Höhenabgriff), nicht für exakte Projektion.
    pub fn closest_t(&self, point: Vec3) -> f32 {
        let mut best_t = 0.0;
        let mut best_d = f32::MAX;
        for i in 0..=ARC_SAMPLES {
            let t = i as f32 / ARC_SAMPLES as f32;
            let d = dist_sq_xz(self.position(t), point);
            if d < best_d {
                best_d = d;
                best_t = t;
            }
        }
        // Verfeinerung im Nachbarintervall der besten Stützstelle
        let step = 1.0 / ARC_SAMPLES as f32;
        let mut lo = (best_t - step).max(0.0);
        let mut hi = (best_t + step).min(1.0);
        for _ in 0..20 {
            let m1 = lo + (hi - lo) / 3.0;
            let m2 = hi - (hi - lo) / 3.0;
            if dist_sq_xz(self.position(m1), point) < dist_sq_xz(self.position(m2), point) {
                hi = m2;
            } else {
                lo = m1;
            }
        }
        (lo + hi) * 0.5
    }

    /// Nächstgelegener Kurvenpunkt samt normalisierter Richtung.
    pub fn closest_position_and_direction(&self, point: Vec3) -> (Vec3, Vec3) {
        let t = self.closest_t(point);
        let dir = normalize_or(self.tangent(t), self.p3 - self.p0);
        (self.position(t), dir)
    }
}

/// Geradenstück zwischen zwei Punkten.
///
/// `bounded = false` bedeutet: für Schnittberechnungen gilt die unendliche
/// Gerade, `position(t)` interpoliert trotzdem linear über [start, end].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightLine {
    pub start: Vec3,
    pub end: Vec3,
    pub bounded: bool,
}

impl StraightLine {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            start,
            end,
            bounded: true,
        }
    }

    pub fn unbounded(start: Vec3, end: Vec3) -> Self {
        Self {
            start,
            end,
            bounded: false,
        }
    }

    /// Lineare Interpolation, nicht geklemmt.
    pub fn position(&self, t: f32) -> Vec3 {
        self.start + (self.end - self.start) * t
    }

    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Normalisiert `v`; fällt bei degenerierter Länge auf `fallback` zurück.
fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let len = v.length();
    if len < f32::EPSILON {
        let flen = fallback.length();
        if flen < f32::EPSILON {
            Vec3::X
        } else {
            fallback / flen
        }
    } else {
        v / len
    }
}

fn dist_sq_xz(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    dx * dx + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn beispiel_kurve() -> Bezier3 {
        Bezier3::from_ends(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(30.0, 0.0, 30.0),
            Vec3::new(0.0, 0.0, -1.0),
        )
    }

    #[test]
    fn test_position_endpunkte() {
        let b = beispiel_kurve();
        assert_relative_eq!(b.position(0.0).x, 0.0);
        assert_relative_eq!(b.position(1.0).x, 30.0);
        assert_relative_eq!(b.position(1.0).z, 30.0);
    }

    #[test]
    fn test_tangent_folgt_endrichtungen() {
        let b = beispiel_kurve();
        let t0 = b.tangent(0.0).normalize();
        assert_relative_eq!(t0.x, 1.0, epsilon = 1e-5);
        let t1 = b.tangent(1.0).normalize();
        // Endrichtung zeigt ins Kurveninnere, Tangente am Ende also entgegen
        assert_relative_eq!(t1.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_laenge_gerade_strecke() {
        let b = Bezier3::from_ends(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
        );
        assert_relative_eq!(b.length(), 100.0, epsilon = 0.01);
    }

    #[test]
    fn test_travel_laeuft_bogenlaenge() {
        let b = Bezier3::from_ends(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
        );
        let t = b.travel(0.0, 25.0);
        assert_relative_eq!(b.position(t).x, 25.0, epsilon = 0.1);
        // Rückwärts wandern
        let zurueck = b.travel(t, -10.0);
        assert_relative_eq!(b.position(zurueck).x, 15.0, epsilon = 0.1);
    }

    #[test]
    fn test_travel_klemmt_an_kurvenenden() {
        let b = beispiel_kurve();
        assert_relative_eq!(b.travel(0.9, 10_000.0), 1.0);
        assert_relative_eq!(b.travel(0.1, -10_000.0), 0.0);
    }

    #[test]
    fn test_distance_symmetrisch() {
        let b = beispiel_kurve();
        assert_relative_eq!(b.distance(0.2, 0.7), b.distance(0.7, 0.2), epsilon = 1e-4);
    }

    #[test]
    fn test_cut_erhaelt_endpunkte() {
        let b = beispiel_kurve();
        let teil = b.cut(0.25, 0.75);
        let start = b.position(0.25);
        let ende = b.position(0.75);
        assert_relative_eq!(teil.p0.x, start.x, epsilon = 1e-4);
        assert_relative_eq!(teil.p0.z, start.z, epsilon = 1e-4);
        assert_relative_eq!(teil.p3.x, ende.x, epsilon = 1e-4);
        assert_relative_eq!(teil.p3.z, ende.z, epsilon = 1e-4);
        // Mittelpunkt des Teilstücks liegt auf der Originalkurve
        let mitte = teil.position(0.5);
        let original = b.position(b.closest_t(mitte));
        assert_relative_eq!(mitte.x, original.x, epsilon = 1e-2);
        assert_relative_eq!(mitte.z, original.z, epsilon = 1e-2);
    }

    #[test]
    fn test_invert_spiegelt_parameter() {
        let b = beispiel_kurve();
        let inv = b.invert();
        let p = b.position(0.3);
        let q = inv.position(0.7);
        assert_relative_eq!(p.x, q.x, epsilon = 1e-5);
        assert_relative_eq!(p.z, q.z, epsilon = 1e-5);
    }

    #[test]
    fn test_closest_t_findet_projektion() {
        let b = Bezier3::from_ends(
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(100.0, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
        );
        let t = b.closest_t(Vec3::new(40.0, 3.0, 7.0));
        assert_relative_eq!(b.position(t).x, 40.0, epsilon = 0.05);
    }

    #[test]
    fn test_straight_line_position() {
        let l = StraightLine::new(Vec3::ZERO, Vec3::new(10.0, 2.0, 0.0));
        let m = l.position(0.5);
        assert_relative_eq!(m.x, 5.0);
        assert_relative_eq!(m.y, 1.0);
    }
}
