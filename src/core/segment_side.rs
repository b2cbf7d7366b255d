//! Eine Randkurve (linke oder rechte Fahrbahnkante) eines Segmentendes.
//!
//! Jede Seite trägt ihre volle Rohkurve vom Kreuzungsmittelpunkt weg, dazu
//! den legalen Parameterbereich `[min_t, max_t]`, den Ist-Wert `raw_t` und
//! den archetyp-abhängigen Vorgabewert `default_t`. Aus dem geklemmten
//! Ist-Wert entstehen Eckposition und Eckrichtung.

use glam::{Quat, Vec3};

use crate::geometry::vector::{flat_normalized, normalize_xz, turn90_left};
use crate::geometry::{intersection, Bezier3, StraightLine};
use crate::shared::overlay::{OverlayCurve, OverlayStyle};

/// Unterhalb dieser Bogenlänge gilt eine Rohkurve als entartet.
const MIN_CURVE_LENGTH: f32 = 1e-4;
/// Kürzester freier Abschnitt (in Metern), der noch als eigenes
/// Overlay-Stück gezeichnet wird.
const MIN_RENDER_PIECE: f32 = 0.2;
/// Parameter-Toleranz, unterhalb derer die Ecke als "am Limit" gilt.
const BORDER_EPS: f32 = 0.001;

/// Linke oder rechte Fahrbahnkante, von der Kreuzung ins Segment blickend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideType {
    Left,
    Right,
}

impl SideType {
    pub fn invert(self) -> Self {
        match self {
            SideType::Left => SideType::Right,
            SideType::Right => SideType::Left,
        }
    }

    /// Vorzeichen für Quer-Effekte: links −1, rechts +1.
    pub fn sign(self) -> f32 {
        match self {
            SideType::Left => -1.0,
            SideType::Right => 1.0,
        }
    }
}

/// Die Haupt-Randkurven einer Kreuzung, auf die Nebensegmente ihre Höhe
/// projizieren.
#[derive(Debug, Clone, Copy)]
pub struct MainCurves {
    pub left: Bezier3,
    pub right: Bezier3,
}

/// Umgebung für [`SegmentSide::calculate`], von der Kreuzung geliefert.
#[derive(Debug, Clone, Copy)]
pub struct SideContext<'a> {
    /// Höhe des Kreuzungsknotens.
    pub junction_height: f32,
    /// Klemmung hält ε Abstand zum Minimal-Limit. Nur Durchgangsknoten
    /// (Middle) dürfen exakt auf `min_t` liegen.
    pub min_gap: bool,
    /// Middle- oder End-Archetyp: Neigung und Twist wirken direkt auf die
    /// Kante statt über die Kreuzungsebene.
    pub banked: bool,
    pub is_slope: bool,
    pub slope_deg: f32,
    pub twist_deg: f32,
    /// Unverzerrte halbe Fahrbahnbreite des Segments.
    pub half_width: f32,
    pub is_main: bool,
    /// Nur für Nebensegmente einer geneigten Kreuzung gesetzt.
    pub main_curves: Option<&'a MainCurves>,
}

#[derive(Debug, Clone)]
pub struct SegmentSide {
    pub side: SideType,
    /// Volle Randkurve, t=0 am Kreuzungsmittelpunkt.
    pub raw_curve: Bezier3,
    /// Auf `[min_t, max_t]` zugeschnittene Randkurve.
    pub curve: Bezier3,
    pub min_t: f32,
    pub max_t: f32,
    /// Ungeklemmter Ist-Parameter der Ecke.
    pub raw_t: f32,
    /// Archetyp-Vorgabe für `raw_t`.
    pub default_t: f32,
    pub position: Vec3,
    pub direction: Vec3,
}

impl SegmentSide {
    pub fn new(side: SideType) -> Self {
        let degenerate = Bezier3::new(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::ZERO);
        Self {
            side,
            raw_curve: degenerate,
            curve: degenerate,
            min_t: 0.0,
            max_t: 1.0,
            raw_t: 0.0,
            default_t: 0.0,
            position: Vec3::ZERO,
            direction: Vec3::X,
        }
    }

    /// Neue Rohkurve übernehmen; die zugeschnittene Kurve gilt bis zur
    /// nächsten Limit-Berechnung als volle Kurve.
    pub fn set_raw_curve(&mut self, curve: Bezier3) {
        self.raw_curve = curve;
        self.curve = curve;
    }

    /// Setzt den legalen Bereich; `max_t` wird nie unter `min_t` gedrückt.
    pub fn set_limits(&mut self, min_t: f32, max_t: f32) {
        self.min_t = min_t;
        self.max_t = max_t.max(min_t);
        self.curve = self.raw_curve.cut(self.min_t, self.max_t);
    }

    /// Parameter-ε, das 5 cm Bogenlänge entspricht. Entartete Kurven liefern
    /// 1, damit die Klemmung nicht explodiert.
    pub fn delta_t(&self) -> f32 {
        let length = self.raw_curve.length();
        if length <= MIN_CURVE_LENGTH {
            1.0
        } else {
            0.05 / length
        }
    }

    /// Liegt die Ecke praktisch am Minimal-Limit?
    pub fn is_border_t(&self) -> bool {
        self.raw_t - BORDER_EPS <= self.min_t
    }

    /// Effektiver Kurvenparameter der Ecke nach Klemmung.
    pub fn current_t(&self, min_gap: bool) -> f32 {
        let delta = if min_gap { self.delta_t() } else { 0.0 };
        self.raw_t.max(self.min_t + delta).min(self.max_t)
    }

    /// Berechnet Eckposition und Eckrichtung aus dem geklemmten Parameter
    /// und dem Höhenmodus der Kreuzung.
    pub fn calculate(&mut self, ctx: &SideContext<'_>) {
        let t = self.current_t(ctx.min_gap);
        let mut position = self.raw_curve.position(t);
        let mut direction = self
            .raw_curve
            .tangent(t)
            .try_normalize()
            .unwrap_or(Vec3::X);

        if ctx.banked {
            // Neigung kippt die Richtung um die Querachse, Twist hebt bzw.
            // senkt die Kante gegenläufig zur Gegenseite.
            let axis = turn90_left(flat_normalized(direction));
            direction = Quat::from_axis_angle(axis, ctx.slope_deg.to_radians()) * direction;
            position.y += self.side.sign() * ctx.half_width * ctx.twist_deg.to_radians().sin();
        } else if !ctx.is_slope {
            position.y = ctx.junction_height;
            direction = flat_normalized(direction);
        } else if !ctx.is_main {
            if let Some(mains) = ctx.main_curves {
                project_onto_main(mains, &mut position, &mut direction);
            }
        }

        self.position = position;
        self.direction = normalize_xz(direction);
    }

    /// Overlay-Stücke vom Kreuzungsmittelpunkt bis zur Ecke: gesperrter
    /// Bereich unterhalb von `min_t`, freier Bereich dahinter.
    pub fn render(&self, allowed: OverlayStyle, forbidden: OverlayStyle) -> Vec<OverlayCurve> {
        let mut pieces = Vec::new();
        if self.min_t <= 0.0 {
            pieces.push(OverlayCurve::new(
                self.raw_curve.cut(0.0, self.raw_t),
                allowed,
            ));
        } else {
            let mut forbidden = forbidden;
            let mut allowed = allowed;
            forbidden.cut_end = true;
            allowed.cut_start = true;

            pieces.push(OverlayCurve::new(
                self.raw_curve.cut(0.0, self.raw_t.min(self.min_t)),
                forbidden,
            ));
            let length = self.raw_curve.length();
            if length > MIN_CURVE_LENGTH && self.raw_t - self.min_t >= MIN_RENDER_PIECE / length {
                pieces.push(OverlayCurve::new(
                    self.raw_curve.cut(self.min_t, self.raw_t),
                    allowed,
                ));
            }
        }
        pieces
    }
}

/// Höhe von der näheren Haupt-Randkurve übernehmen und die Richtung auf
/// deren Steigung ausrichten.
fn project_onto_main(mains: &MainCurves, position: &mut Vec3, direction: &mut Vec3) {
    let (left_pos, left_dir) = mains.left.closest_position_and_direction(*position);
    let (right_pos, right_dir) = mains.right.closest_position_and_direction(*position);
    let (closest, closest_dir) =
        if left_pos.distance_squared(*position) < right_pos.distance_squared(*position) {
            (left_pos, left_dir)
        } else {
            (right_pos, right_dir)
        };

    position.y = closest.y;

    let closest_line = StraightLine::unbounded(closest, closest + closest_dir);
    let own_line = StraightLine::unbounded(*position, *position - *direction);
    if let Some(hit) = intersection::line_line(&closest_line, &own_line) {
        let anchor = closest + closest_dir * hit.first_t;
        if let Some(new_direction) = (*position - anchor).try_normalize() {
            *direction = new_direction;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight_side(side: SideType, from: Vec3, to: Vec3) -> SegmentSide {
        let mut segment_side = SegmentSide::new(side);
        let dir = to - from;
        segment_side.set_raw_curve(Bezier3::from_ends(from, dir, to, -dir));
        segment_side
    }

    fn flat_ctx() -> SideContext<'static> {
        SideContext {
            junction_height: 3.0,
            min_gap: true,
            banked: false,
            is_slope: false,
            slope_deg: 0.0,
            twist_deg: 0.0,
            half_width: 4.0,
            is_main: true,
            main_curves: None,
        }
    }

    #[test]
    fn test_current_t_klemmt_mit_epsilon() {
        let mut side = straight_side(SideType::Left, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        side.set_limits(0.3, 0.9);
        side.raw_t = 0.1;
        let delta = side.delta_t();
        assert_relative_eq!(side.current_t(true), 0.3 + delta, epsilon = 1e-6);
        // Durchgangsknoten ohne ε.
        assert_relative_eq!(side.current_t(false), 0.3, epsilon = 1e-6);
        side.raw_t = 0.95;
        assert_relative_eq!(side.current_t(true), 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_set_limits_haelt_max_ueber_min_und_schneidet_kurve() {
        let mut side = straight_side(SideType::Right, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        side.set_limits(0.6, 0.4);
        assert_relative_eq!(side.max_t, 0.6);
        let start = side.curve.position(0.0);
        assert_relative_eq!(start.x, side.raw_curve.position(0.6).x, epsilon = 1e-4);
    }

    #[test]
    fn test_is_border_t() {
        let mut side = straight_side(SideType::Left, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        side.set_limits(0.2, 1.0);
        side.raw_t = 0.2005;
        assert!(side.is_border_t());
        side.raw_t = 0.4;
        assert!(!side.is_border_t());
    }

    #[test]
    fn test_flache_kreuzung_zieht_hoehe_auf_knotenniveau() {
        let mut side = straight_side(
            SideType::Left,
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(10.0, 5.0, 0.0),
        );
        side.raw_t = 0.5;
        side.calculate(&flat_ctx());
        assert_relative_eq!(side.position.y, 3.0);
        assert_relative_eq!(side.direction.y, 0.0);
    }

    #[test]
    fn test_gebankte_seite_hebt_rechte_kante() {
        let mut ctx = flat_ctx();
        ctx.banked = true;
        ctx.twist_deg = 30.0;
        let mut left = straight_side(SideType::Left, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        let mut right = straight_side(SideType::Right, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        left.raw_t = 0.5;
        right.raw_t = 0.5;
        left.calculate(&ctx);
        right.calculate(&ctx);
        let expected = 4.0 * 30.0_f32.to_radians().sin();
        assert_relative_eq!(right.position.y, expected, epsilon = 1e-5);
        assert_relative_eq!(left.position.y, -expected, epsilon = 1e-5);
    }

    #[test]
    fn test_gebankte_seite_kippt_richtung_um_slope() {
        let mut ctx = flat_ctx();
        ctx.banked = true;
        ctx.slope_deg = 20.0;
        let mut side = straight_side(SideType::Left, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        side.raw_t = 0.2;
        side.calculate(&ctx);
        // Positive Neigung hebt die Richtung an; normalize_xz macht daraus
        // Steigung pro Meter.
        assert_relative_eq!(side.direction.y, 20.0_f32.to_radians().tan(), epsilon = 1e-4);
        assert_relative_eq!(
            (side.direction.x * side.direction.x + side.direction.z * side.direction.z).sqrt(),
            1.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_nebensegment_erbt_hoehe_der_hauptkurve() {
        let main = Bezier3::from_ends(
            Vec3::new(-10.0, 2.0, 5.0),
            Vec3::new(20.0, 0.0, 0.0),
            Vec3::new(10.0, 2.0, 5.0),
            Vec3::new(-20.0, 0.0, 0.0),
        );
        let mains = MainCurves {
            left: main,
            right: main,
        };
        let mut ctx = flat_ctx();
        ctx.is_slope = true;
        ctx.is_main = false;
        ctx.main_curves = Some(&mains);
        let mut side = straight_side(SideType::Left, Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0));
        side.raw_t = 0.4;
        side.calculate(&ctx);
        assert_relative_eq!(side.position.y, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_render_ohne_limit_liefert_nur_freien_bereich() {
        let mut side = straight_side(SideType::Left, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        side.raw_t = 0.5;
        let pieces = side.render(OverlayStyle::ALLOWED, OverlayStyle::FORBIDDEN);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].style, OverlayStyle::ALLOWED);
    }

    #[test]
    fn test_render_mit_limit_teilt_gesperrt_und_frei() {
        let mut side = straight_side(SideType::Left, Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0));
        side.set_limits(0.2, 1.0);
        side.raw_t = 0.6;
        let pieces = side.render(OverlayStyle::ALLOWED, OverlayStyle::FORBIDDEN);
        assert_eq!(pieces.len(), 2);
        assert!(pieces[0].style.cut_end);
        assert!(pieces[1].style.cut_start);

        // Zu kurzer freier Rest fällt weg.
        side.raw_t = 0.205;
        let pieces = side.render(OverlayStyle::ALLOWED, OverlayStyle::FORBIDDEN);
        assert_eq!(pieces.len(), 1);
        assert!(pieces[0].style.cut_end);
    }
}
