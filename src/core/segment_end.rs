//! Ein Segmentende an einer Kreuzung: Rohkurven, Parameter und der
//! aufgelöste Eckpunkt.
//!
//! Das Ende besitzt die Mittelkurve des Segments (t=0 an der eigenen
//! Kreuzung) und seine beiden Randkurven. Aus Offset und Rotation entsteht
//! der Querschnitt, dessen Schnitt mit den Randkurven die Ecken liefert;
//! umgekehrt rekonstruiert [`SegmentEndData::set_by_corners`] Offset und
//! Rotation aus verschobenen Ecken. Die Kurven selbst hängen über die
//! Shift-Kopplung auch vom Gegenende ab und werden deshalb zentral über
//! [`compute_segment_curves`] erzeugt.

use glam::Vec3;

use crate::core::network::{SegmentKind, SegmentTopology};
use crate::core::segment_side::{MainCurves, SegmentSide, SideContext, SideType};
use crate::core::style::{
    StylePolicy, DEFAULT_STRETCH, MAX_OFFSET, MAX_SHIFT, MAX_SLOPE, MAX_STRETCH, MAX_TWIST,
    MIN_OFFSET, MIN_SHIFT, MIN_SLOPE, MIN_STRETCH, MIN_TWIST,
};
use crate::geometry::vector::{
    absolute_angle, flat_normalized, lateral_angle_deg, length_xz, turn90_left, turn90_right,
    turn_rad,
};
use crate::geometry::{intersection, Bezier3, StraightLine};
use crate::shared::overlay::{OverlayCurve, OverlayStyle};

/// Härteste Rotations-Grenzen, unabhängig von der Geometrie.
pub const MIN_POSSIBLE_ROTATE: f32 = -80.0;
pub const MAX_POSSIBLE_ROTATE: f32 = 80.0;

/// Unterhalb dieser halben Breite entfällt der Standard-Offset.
const NARROW_HALF_WIDTH: f32 = 4.0;

/// Querschnitts-Parameter eines Endes, die in die Segmentkurven einfließen.
#[derive(Debug, Clone, Copy)]
pub struct EndInfluence {
    pub shift: f32,
    pub twist_deg: f32,
    pub stretch: f32,
}

impl Default for EndInfluence {
    fn default() -> Self {
        Self {
            shift: 0.0,
            twist_deg: 0.0,
            stretch: DEFAULT_STRETCH,
        }
    }
}

/// Mittel- und Randkurven eines Segments in kanonischer Orientierung
/// (t=0 am Startknoten).
#[derive(Debug, Clone, Copy)]
pub struct SegmentCurves {
    pub center: Bezier3,
    pub left: Bezier3,
    pub right: Bezier3,
}

/// Berechnet Mittel- und Randkurven eines Segments aus Topologie und den
/// Parametern beider Enden.
///
/// Shift an einem Ende verbiegt die gesamte Kurve: beide Endpunkte wandern
/// entlang einer gemeinsamen, um den Shift-Winkel gedrehten Normalen, die
/// Tangenten drehen mit. `start_fix`/`end_fix` tragen an Durchgangsknoten
/// die Richtung des Nachbarsegments bei, damit die Tangenten dort spiegel-
/// symmetrisch werden.
pub fn compute_segment_curves(
    segment: &SegmentTopology,
    start_pos: Vec3,
    end_pos: Vec3,
    start: EndInfluence,
    end: EndInfluence,
    start_fix: Option<Vec3>,
    end_fix: Option<Vec3>,
) -> SegmentCurves {
    let mut start_pos = start_pos;
    let mut end_pos = end_pos;
    let mut start_dir = segment.start_direction;
    let mut end_dir = segment.end_direction;

    if let Some(near_dir) = start_fix {
        start_dir = (start_dir - near_dir).try_normalize().unwrap_or(start_dir);
    }
    if let Some(near_dir) = end_fix {
        end_dir = (end_dir - near_dir).try_normalize().unwrap_or(end_dir);
    }

    if start.shift != 0.0 || end.shift != 0.0 {
        let chord = end_pos - start_pos;
        let chord_length = length_xz(chord);
        if chord_length > f32::EPSILON {
            let shift = (start.shift + end.shift) / 2.0;
            let delta = (shift / chord_length).clamp(-1.0, 1.0).asin();
            let normal = turn_rad(chord, -(std::f32::consts::FRAC_PI_2 + delta)).normalize();

            start_pos -= normal * start.shift;
            end_pos += normal * end.shift;
            start_dir = turn_rad(start_dir, -delta);
            end_dir = turn_rad(end_dir, -delta);
        }
    }

    let center = Bezier3::from_ends(start_pos, start_dir, end_pos, end_dir);

    let start_half = segment.half_width * start.stretch * start.twist_deg.to_radians().cos();
    let end_half = segment.half_width * end.stretch * end.twist_deg.to_radians().cos();
    let start_normal = turn90_left(flat_normalized(start_dir));
    let end_normal = turn90_right(flat_normalized(end_dir));

    let left = Bezier3::from_ends(
        start_pos + start_normal * start_half,
        start_dir,
        end_pos + end_normal * end_half,
        end_dir,
    );
    let right = Bezier3::from_ends(
        start_pos - start_normal * start_half,
        start_dir,
        end_pos - end_normal * end_half,
        end_dir,
    );

    SegmentCurves {
        center,
        left,
        right,
    }
}

/// Umgebung für [`SegmentEndData::calculate`], von der Kreuzung geliefert.
#[derive(Debug, Clone, Copy)]
pub struct EndContext<'a> {
    pub junction_height: f32,
    /// Klemmung hält ε Abstand zum Minimal-Limit; gilt für jeden Archetyp
    /// außer Middle.
    pub min_gap: bool,
    /// Middle- oder End-Archetyp: Neigung wirkt direkt auf die Kanten.
    pub banked: bool,
    pub is_main: bool,
    pub main_curves: Option<&'a MainCurves>,
}

#[derive(Debug, Clone)]
pub struct SegmentEndData {
    pub segment_id: u64,
    pub node_id: u64,
    pub kind: SegmentKind,
    /// Unverzerrte halbe Fahrbahnbreite.
    pub half_width: f32,
    pub untouchable: bool,
    /// Liegt dieses Ende am Startknoten des Segments?
    pub is_start: bool,

    /// Mittelkurve, t=0 an der eigenen Kreuzung.
    pub raw_center: Bezier3,
    /// Auf `[segment_min_t, segment_max_t]` zugeschnittene Mittelkurve.
    pub segment_curve: Bezier3,
    pub left: SegmentSide,
    pub right: SegmentSide,

    offset: f32,
    shift: f32,
    rotate_deg: f32,
    slope_deg: f32,
    twist_deg: f32,
    stretch: f32,
    pub no_markings: bool,
    pub collision: bool,
    pub force_node_less: bool,
    pub is_slope: bool,
    /// Ecken folgen den Archetyp-Vorgaben statt gespeicherten Zahlenwerten.
    pub keep_defaults: bool,

    pub min_offset: f32,
    pub max_offset: f32,
    pub min_rotate: f32,
    pub max_rotate: f32,
    pub segment_min_t: f32,
    pub segment_max_t: f32,

    /// Aufgelöster Eckpunkt der Fahrbahnmitte.
    pub position: Vec3,
    pub direction: Vec3,
    /// Überhöhung des Querschnitts aus dem Höhenunterschied der Ecken.
    pub vehicle_twist_deg: f32,
}

impl SegmentEndData {
    pub fn new(segment: &SegmentTopology, node_id: u64) -> Self {
        let degenerate = Bezier3::new(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::ZERO);
        Self {
            segment_id: segment.id,
            node_id,
            kind: segment.kind,
            half_width: segment.half_width,
            untouchable: segment.untouchable,
            is_start: segment.start_node == node_id,
            raw_center: degenerate,
            segment_curve: degenerate,
            left: SegmentSide::new(SideType::Left),
            right: SegmentSide::new(SideType::Right),
            offset: 0.0,
            shift: 0.0,
            rotate_deg: 0.0,
            slope_deg: 0.0,
            twist_deg: 0.0,
            stretch: DEFAULT_STRETCH,
            no_markings: false,
            collision: segment.kind != SegmentKind::Track,
            force_node_less: false,
            is_slope: false,
            keep_defaults: true,
            min_offset: MIN_OFFSET,
            max_offset: MAX_OFFSET,
            min_rotate: MIN_POSSIBLE_ROTATE,
            max_rotate: MAX_POSSIBLE_ROTATE,
            segment_min_t: 0.0,
            segment_max_t: 1.0,
            position: Vec3::ZERO,
            direction: Vec3::X,
            vehicle_twist_deg: 0.0,
        }
    }

    /// Übernimmt frisch berechnete Segmentkurven. Am Nicht-Startende werden
    /// die Kurven invertiert und links/rechts getauscht, damit t=0 immer an
    /// der eigenen Kreuzung liegt.
    pub fn set_raw_curves(&mut self, curves: &SegmentCurves) {
        if self.is_start {
            self.raw_center = curves.center;
            self.left.set_raw_curve(curves.left);
            self.right.set_raw_curve(curves.right);
        } else {
            self.raw_center = curves.center.invert();
            self.left.set_raw_curve(curves.right.invert());
            self.right.set_raw_curve(curves.left.invert());
        }
        self.segment_curve = self.raw_center;
    }

    /// Richtungswinkel der Mittelkurve am Kreuzungsmittelpunkt, für die
    /// Winkelsortierung der Enden.
    pub fn absolute_angle(&self) -> f32 {
        absolute_angle(self.raw_center.tangent(0.0))
    }

    pub fn side(&self, side: SideType) -> &SegmentSide {
        match side {
            SideType::Left => &self.left,
            SideType::Right => &self.right,
        }
    }

    pub fn side_mut(&mut self, side: SideType) -> &mut SegmentSide {
        match side {
            SideType::Left => &mut self.left,
            SideType::Right => &mut self.right,
        }
    }

    // ── Parameter ───────────────────────────────────────────────────────────

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn shift(&self) -> f32 {
        self.shift
    }

    pub fn rotate_deg(&self) -> f32 {
        self.rotate_deg
    }

    pub fn slope_deg(&self) -> f32 {
        self.slope_deg
    }

    pub fn twist_deg(&self) -> f32 {
        self.twist_deg
    }

    pub fn stretch(&self) -> f32 {
        self.stretch
    }

    /// Numerische Offset-Eingabe; beendet den Vorgabe-Modus.
    pub fn set_offset(&mut self, value: f32) {
        self.keep_defaults = false;
        self.set_offset_internal(value, true);
    }

    fn set_offset_internal(&mut self, value: f32, change_rotate: bool) {
        self.offset = value.max(self.min_offset).min(self.max_offset);
        if change_rotate && self.is_border_t() {
            self.set_rotate_internal(0.0);
        }
    }

    /// Numerische Rotations-Eingabe; beendet den Vorgabe-Modus.
    pub fn set_rotate(&mut self, value: f32) {
        self.keep_defaults = false;
        self.set_rotate_internal(value);
    }

    fn set_rotate_internal(&mut self, value: f32) {
        self.calculate_min_max_rotate();
        self.rotate_deg = value.max(self.min_rotate).min(self.max_rotate);
    }

    pub fn set_shift(&mut self, value: f32) {
        self.shift = value.clamp(MIN_SHIFT, MAX_SHIFT);
    }

    pub fn set_slope(&mut self, value: f32) {
        self.slope_deg = value.clamp(MIN_SLOPE, MAX_SLOPE);
    }

    pub fn set_twist(&mut self, value: f32) {
        self.twist_deg = value.clamp(MIN_TWIST, MAX_TWIST);
    }

    pub fn set_stretch(&mut self, value: f32) {
        self.stretch = value.clamp(MIN_STRETCH, MAX_STRETCH);
    }

    /// Stellt gespeicherte Zahlenwerte wieder her. Hier gelten nur die
    /// globalen Grenzen; die kurvenabhängigen Fenster zieht die nächste
    /// Neuberechnung nach, sobald echte Kurven vorliegen.
    pub fn restore_parameters(
        &mut self,
        offset: f32,
        shift: f32,
        rotate_deg: f32,
        slope_deg: f32,
        twist_deg: f32,
        stretch: f32,
    ) {
        self.offset = offset.clamp(MIN_OFFSET, MAX_OFFSET);
        self.shift = shift.clamp(MIN_SHIFT, MAX_SHIFT);
        self.rotate_deg = rotate_deg.clamp(MIN_POSSIBLE_ROTATE, MAX_POSSIBLE_ROTATE);
        self.slope_deg = slope_deg.clamp(MIN_SLOPE, MAX_SLOPE);
        self.twist_deg = twist_deg.clamp(MIN_TWIST, MAX_TWIST);
        self.stretch = stretch.clamp(MIN_STRETCH, MAX_STRETCH);
    }

    pub fn is_border_offset(&self) -> bool {
        self.offset <= self.min_offset
    }

    /// Liegt die maßgebliche Ecke am Minimal-Limit?
    pub fn is_border_t(&self) -> bool {
        if self.left.raw_t >= self.right.raw_t {
            self.left.is_border_t()
        } else {
            self.right.is_border_t()
        }
    }

    /// Standard-Offset dieses Endes unter einem Archetyp: sehr schmale
    /// Fahrbahnen starten ohne Abstand.
    pub fn default_offset(&self, policy: &StylePolicy) -> f32 {
        let style_default = if self.half_width < NARROW_HALF_WIDTH {
            0.0
        } else {
            policy.default_offset
        };
        self.min_offset.max(style_default)
    }

    pub fn default_collision(&self) -> bool {
        self.kind != SegmentKind::Track
    }

    /// Setzt alle Parameter zurück, die der Archetyp nicht stützt — bei
    /// `force` alle. Ein zurückgesetzter Offset aktiviert den Vorgabe-Modus,
    /// damit die Ecken aus den Archetyp-Vorgaben statt aus der Zahl entstehen.
    pub fn reset_to_default(&mut self, policy: &StylePolicy, default_is_slope: bool, force: bool) {
        if !policy.support_shift.any() || force {
            self.shift = 0.0;
        }
        if !policy.support_rotate.any() || force {
            self.rotate_deg = 0.0;
        }
        if !policy.support_slope.any() || force {
            self.slope_deg = 0.0;
        }
        if !policy.support_twist.any() || force {
            self.twist_deg = 0.0;
        }
        if !policy.support_stretch.any() || force {
            self.stretch = DEFAULT_STRETCH;
        }
        if !policy.support_marking.any() || force {
            self.no_markings = policy.default_no_markings;
        }
        if !policy.support_collision.any() || force {
            self.collision = self.default_collision();
        }
        if !policy.support_nodeless.any() || force {
            self.force_node_less = false;
        }
        if !policy.support_slope_junction.any() || force {
            self.is_slope = policy.force_slope_junction.unwrap_or(default_is_slope);
        }
        if !policy.support_offset.any() || force {
            let default = self.default_offset(policy);
            self.set_offset_internal(default, false);
            self.keep_defaults = true;
        } else {
            self.set_offset_internal(self.offset, false);
        }
    }

    // ── Limits & Auflösung ──────────────────────────────────────────────────

    /// Kurvenparameter, an dem der Querschnitt für den aktuellen Offset
    /// genommen wird.
    pub fn offset_t(&self) -> f32 {
        if self.offset <= self.min_offset {
            self.segment_min_t
        } else if self.offset >= self.max_offset {
            self.segment_max_t
        } else {
            self.raw_center.travel(0.0, self.offset)
        }
    }

    /// Schneidet die Mittelkurve mit den Verbindungslinien der beiderseitigen
    /// Limit-Punkte und leitet daraus das legale Offset-Fenster ab. Ohne
    /// Schnittpunkt (divergierende Randkurven) gelten die Kurvenenden.
    pub(crate) fn calculate_segment_limit(&mut self) {
        let start_line = StraightLine::new(self.left.curve.p0, self.right.curve.p0);
        self.segment_min_t = intersection::bezier_line(&self.raw_center, &start_line)
            .map(|hit| hit.first_t)
            .unwrap_or(0.0);

        let end_line = StraightLine::new(self.left.curve.p3, self.right.curve.p3);
        self.segment_max_t = intersection::bezier_line(&self.raw_center, &end_line)
            .map(|hit| hit.first_t)
            .unwrap_or(1.0);

        self.min_offset = self.raw_center.distance(0.0, self.segment_min_t).max(MIN_OFFSET);
        self.max_offset = self.raw_center.distance(0.0, self.segment_max_t).min(MAX_OFFSET);
        self.set_offset_internal(self.offset, false);

        self.segment_curve = self.raw_center.cut(self.segment_min_t, self.segment_max_t);
    }

    /// Begrenzt die Rotation so, dass der Querschnitt keinen Endpunkt einer
    /// Randkurve überstreichen kann.
    fn calculate_min_max_rotate(&mut self) {
        let t = self.offset_t();
        let position = self.raw_center.position(t);
        let fwd = flat_normalized(self.raw_center.tangent(t));

        let start_left = lateral_angle_deg(fwd, self.left.curve.p0 - position);
        let end_left = lateral_angle_deg(fwd, self.left.curve.p3 - position);
        let start_right = lateral_angle_deg(fwd, position - self.right.curve.p0);
        let end_right = lateral_angle_deg(fwd, position - self.right.curve.p3);

        self.min_rotate = start_left
            .max(end_right)
            .clamp(MIN_POSSIBLE_ROTATE, MAX_POSSIBLE_ROTATE);
        self.max_rotate = end_left
            .min(start_right)
            .clamp(MIN_POSSIBLE_ROTATE, MAX_POSSIBLE_ROTATE);

        self.rotate_deg = self.rotate_deg.max(self.min_rotate).min(self.max_rotate);
    }

    /// Schneidet den um `rotate` gedrehten Querschnitts-Strahl mit der
    /// Randkurve einer Seite und liefert den Kurvenparameter der Ecke.
    pub fn corner_offset_t(&self, side: SideType) -> f32 {
        let side_data = self.side(side);
        let t = self.offset_t();
        let position = self.raw_center.position(t);
        let fwd = flat_normalized(self.raw_center.tangent(t));
        let rotate_rad = self.rotate_deg.to_radians();
        let direction = turn90_left(fwd) * rotate_rad.cos() + fwd * rotate_rad.sin();

        let line = StraightLine::unbounded(position, position + direction);
        match intersection::bezier_line(&side_data.raw_curve, &line) {
            Some(hit) => hit.first_t,
            // Kein Schnitt: der Strahl verfehlt die Randkurve. Ohne Rotation
            // entscheidet die Kurvenhälfte, sonst die Drehrichtung.
            None if self.rotate_deg == 0.0 => {
                if t <= 0.5 {
                    0.0
                } else {
                    1.0
                }
            }
            None => {
                if (side == SideType::Left) == (self.rotate_deg > 0.0) {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    fn corners_to_offset_rotate(&self) -> Option<(f32, f32)> {
        let left_pos = self.left.raw_curve.position(self.left.raw_t);
        let right_pos = self.right.raw_curve.position(self.right.raw_t);

        let line = StraightLine::unbounded(left_pos, right_pos);
        let hit = intersection::bezier_line(&self.raw_center, &line)?;

        let offset = self.raw_center.distance(0.0, hit.first_t);
        let fwd = flat_normalized(self.raw_center.tangent(hit.first_t));
        let rotate = lateral_angle_deg(fwd, left_pos - right_pos);
        Some((offset, rotate))
    }

    /// Offset und Rotation aus den aktuellen Eckparametern ableiten, ohne den
    /// Vorgabe-Modus zu verlassen.
    fn apply_corners(&mut self) {
        if let Some((offset, rotate)) = self.corners_to_offset_rotate() {
            self.set_offset_internal(offset, false);
            self.set_rotate_internal(rotate);
        }
    }

    /// Eine von Hand verschobene Ecke übernehmen: beide Seitenparameter
    /// setzen, Offset/Rotation daraus rekonstruieren und den Vorgabe-Modus
    /// beenden.
    pub fn set_by_corners(&mut self, left_t: f32, right_t: f32) {
        self.left.raw_t = left_t.max(0.0).min(1.0);
        self.right.raw_t = right_t.max(0.0).min(1.0);
        self.apply_corners();
        self.keep_defaults = false;
    }

    /// Zieht eine einzelne Ecke; die Gegenseite behält ihren aktuellen
    /// Eckparameter.
    pub fn set_corner(&mut self, side: SideType, t: f32) {
        match side {
            SideType::Left => self.set_by_corners(t, self.right.raw_t),
            SideType::Right => self.set_by_corners(self.left.raw_t, t),
        }
    }

    /// Vollständige Neuberechnung des Endes nach Limit- oder Parameteränderung.
    pub fn calculate(&mut self, ctx: &EndContext<'_>) {
        self.calculate_segment_limit();
        self.calculate_min_max_rotate();

        if self.keep_defaults {
            self.left.raw_t = self.left.default_t;
            self.right.raw_t = self.right.default_t;
            self.apply_corners();
        } else {
            self.left.raw_t = self.corner_offset_t(SideType::Left);
            self.right.raw_t = self.corner_offset_t(SideType::Right);
        }

        let side_ctx = SideContext {
            junction_height: ctx.junction_height,
            min_gap: ctx.min_gap,
            banked: ctx.banked,
            is_slope: self.is_slope,
            slope_deg: self.slope_deg,
            twist_deg: self.twist_deg,
            half_width: self.half_width,
            is_main: ctx.is_main,
            main_curves: ctx.main_curves,
        };
        self.left.calculate(&side_ctx);
        self.right.calculate(&side_ctx);

        self.calculate_position_and_direction();

        let diff = self.right.position - self.left.position;
        self.vehicle_twist_deg = diff.y.atan2(length_xz(diff)).to_degrees();
    }

    /// Eckpunkt der Fahrbahnmitte: Schnitt der Ecken-Verbindungslinie mit der
    /// Mittelkurve, Richtung als über die Linie gewichtete Mischung.
    fn calculate_position_and_direction(&mut self) {
        let line = StraightLine::new(self.left.position, self.right.position);
        let t = intersection::bezier_line(&self.raw_center, &line)
            .map(|hit| hit.second_t)
            .unwrap_or(0.5);

        self.position = line.position(t);
        self.direction = crate::geometry::vector::normalize_xz(
            self.left.direction * t + self.right.direction * (1.0 - t),
        );
    }

    // ── Overlay ─────────────────────────────────────────────────────────────

    /// Beide Randkurven als frei/gesperrt-Stücke.
    pub fn render_sides(&self, allowed: OverlayStyle, forbidden: OverlayStyle) -> Vec<OverlayCurve> {
        let mut pieces = self.left.render(allowed, forbidden);
        pieces.extend(self.right.render(allowed, forbidden));
        pieces
    }

    /// Kontur des Endes: beide Restkurven ab der Ecke plus die Querkanten an
    /// Ecke und Segmentende.
    pub fn render_contour(&self, style: OverlayStyle) -> Vec<OverlayCurve> {
        let mut pieces = Vec::with_capacity(4);
        for side in [&self.left, &self.right] {
            let end_pos = side.curve.p3;
            let end_dir = -side.curve.tangent(1.0);
            pieces.push(OverlayCurve::new(
                Bezier3::from_ends(side.position, side.direction, end_pos, end_dir),
                style,
            ));
        }
        pieces.push(OverlayCurve::new(
            straight_piece(self.left.curve.p3, self.right.curve.p3),
            style,
        ));
        pieces.push(OverlayCurve::new(
            straight_piece(self.left.position, self.right.position),
            style,
        ));
        pieces
    }
}

fn straight_piece(from: Vec3, to: Vec3) -> Bezier3 {
    Bezier3::from_ends(from, to - from, to, from - to)
}

/// Eckparameter beider Seiten, wie sie in die Max-Limit-Rechnung des
/// Gegenendes eingehen.
pub fn corner_parameters(end: &SegmentEndData) -> (f32, f32) {
    (
        end.corner_offset_t(SideType::Left),
        end.corner_offset_t(SideType::Right),
    )
}

/// Begrenzt ein Segmentende gegen das Gegenende desselben Segments: die
/// Ecken der beiden Kreuzungen dürfen sich entlang des Segments nicht
/// überlappen. `far_corners` sind die [`corner_parameters`] des Gegenendes
/// in dessen eigenem Bezugsrahmen; `None` steht für ein unkontrolliertes
/// Gegenende, dort gilt die volle Kurve.
pub fn calculate_max_limits(end: &mut SegmentEndData, far_corners: Option<(f32, f32)>) {
    let Some((far_left, far_right)) = far_corners else {
        end.left.set_limits(end.left.min_t, 1.0);
        end.right.set_limits(end.right.min_t, 1.0);
        return;
    };

    // Gleiche Weltkante, gegenläufige Parameter: left ↔ far.right.
    let left_max = shared_edge_max(end.corner_offset_t(SideType::Left), far_right);
    let right_max = shared_edge_max(end.corner_offset_t(SideType::Right), far_left);
    end.left.set_limits(end.left.min_t, left_max);
    end.right.set_limits(end.right.min_t, right_max);
}

/// Überlappen sich die Wunsch-Ecken auf einer gemeinsamen Kante, nimmt jede
/// Seite die Hälfte des Überhangs zurück; das Max-Limit ist der Rest hinter
/// der Gegen-Ecke.
fn shared_edge_max(near_t: f32, far_t: f32) -> f32 {
    let sum = near_t + far_t;
    let far_t = if sum > 1.0 {
        far_t - (sum - 1.0) / 2.0
    } else {
        far_t
    };
    1.0 - far_t
}
