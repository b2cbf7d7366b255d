//! Hilfsfunktionen für Vektoren in der XZ-Bodenebene (Y ist die Höhenachse).
//!
//! Alle Dreh-Operationen arbeiten nur auf den XZ-Komponenten und lassen die
//! Höhe unverändert. Positive Winkel drehen die +X-Achse in Richtung +Z.

use glam::Vec3;

/// Setzt die Höhenkomponente auf 0.
pub fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Flachgelegter, normalisierter Vektor. Degeneriert (Länge ≈ 0) → +X.
pub fn flat_normalized(v: Vec3) -> Vec3 {
    let f = flat(v);
    let len = f.length();
    if len < f32::EPSILON {
        Vec3::X
    } else {
        f / len
    }
}

/// Länge der XZ-Projektion.
pub fn length_xz(v: Vec3) -> f32 {
    (v.x * v.x + v.z * v.z).sqrt()
}

/// Skaliert den Vektor so, dass seine XZ-Projektion Länge 1 hat.
///
/// Die Höhenkomponente bleibt als Steigung pro Meter erhalten — im Gegensatz
/// zu `normalize`, das die Gesamtrichtung auf Länge 1 bringt.
pub fn normalize_xz(v: Vec3) -> Vec3 {
    let len = length_xz(v);
    if len < f32::EPSILON {
        Vec3::X
    } else {
        v / len
    }
}

/// 90° nach links (in Fahrtrichtung gesehen), Höhe unverändert.
pub fn turn90_left(v: Vec3) -> Vec3 {
    Vec3::new(-v.z, v.y, v.x)
}

/// 90° nach rechts, Höhe unverändert.
pub fn turn90_right(v: Vec3) -> Vec3 {
    Vec3::new(v.z, v.y, -v.x)
}

/// Dreht die XZ-Komponenten um `angle` (Radiant). Positiv = Richtung links.
pub fn turn_rad(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.z * sin, v.y, v.x * sin + v.z * cos)
}

/// Dreht die XZ-Komponenten um `angle` (Grad).
pub fn turn_deg(v: Vec3, angle: f32) -> Vec3 {
    turn_rad(v, angle.to_radians())
}

/// Absoluter Richtungswinkel der XZ-Projektion (Radiant, atan2-Konvention).
pub fn absolute_angle(v: Vec3) -> f32 {
    v.z.atan2(v.x)
}

/// Signierter Winkel (Grad) von der linken Querachse von `fwd` zu `v`.
///
/// Positiv, wenn `v` gegenüber der Querachse in Fahrtrichtung kippt —
/// das ist die Vorzeichenkonvention der Rotations-Grenzwinkel.
pub fn lateral_angle_deg(fwd: Vec3, v: Vec3) -> f32 {
    let lat = turn90_left(fwd);
    let along = v.x * fwd.x + v.z * fwd.z;
    let across = v.x * lat.x + v.z * lat.z;
    along.atan2(across).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_turn90_ist_orthogonal() {
        let v = Vec3::new(3.0, 1.5, -2.0);
        let l = turn90_left(v);
        let r = turn90_right(v);
        assert_relative_eq!(v.x * l.x + v.z * l.z, 0.0);
        assert_relative_eq!(v.x * r.x + v.z * r.z, 0.0);
        // Höhe bleibt erhalten
        assert_relative_eq!(l.y, 1.5);
        assert_relative_eq!(r.y, 1.5);
    }

    #[test]
    fn test_turn90_left_von_x_zeigt_nach_plus_z() {
        let l = turn90_left(Vec3::X);
        assert_relative_eq!(l.x, 0.0);
        assert_relative_eq!(l.z, 1.0);
    }

    #[test]
    fn test_turn_deg_roundtrip() {
        let v = Vec3::new(1.0, 0.0, 2.0);
        let zurueck = turn_deg(turn_deg(v, 37.0), -37.0);
        assert_relative_eq!(zurueck.x, v.x, epsilon = 1e-5);
        assert_relative_eq!(zurueck.z, v.z, epsilon = 1e-5);
    }

    #[test]
    fn test_normalize_xz_erhaelt_steigung() {
        let v = Vec3::new(3.0, 1.5, 4.0); // XZ-Länge 5, Steigung 0.3/m
        let n = normalize_xz(v);
        assert_relative_eq!(length_xz(n), 1.0, epsilon = 1e-6);
        assert_relative_eq!(n.y, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_lateral_angle_vorzeichen() {
        let fwd = Vec3::X;
        // Genau auf der linken Querachse: 0°
        assert_relative_eq!(lateral_angle_deg(fwd, Vec3::Z), 0.0, epsilon = 1e-4);
        // In Fahrtrichtung gekippt: positiv
        assert!(lateral_angle_deg(fwd, Vec3::new(1.0, 0.0, 1.0)) > 0.0);
        // Entgegen der Fahrtrichtung: negativ
        assert!(lateral_angle_deg(fwd, Vec3::new(-1.0, 0.0, 1.0)) < 0.0);
    }

    #[test]
    fn test_flat_normalized_degeneriert() {
        let n = flat_normalized(Vec3::new(0.0, 5.0, 0.0));
        assert_relative_eq!(n.length(), 1.0);
    }
}
