//! Eine kontrollierte Kreuzung: Archetyp, Hauptstraße und alle Segmentenden.
//!
//! Die Kreuzung besitzt die [`SegmentEndData`]-Objekte ihrer angeschlossenen
//! Segmente und löst deren gegenseitige Beschränkungen auf: benachbarte
//! Randkurven dürfen sich nicht kreuzen (Min-Limits), Vorgabe-Ecken liegen
//! etwas lockerer dahinter, und die Hauptstraße bestimmt Höhenverlauf und
//! Parameter-Kopplung der übrigen Enden.

use std::cmp::Ordering;

use glam::Vec3;

use crate::core::network::SegmentKind;
use crate::core::segment_end::{EndContext, SegmentEndData};
use crate::core::segment_side::{MainCurves, SegmentSide};
use crate::core::style::{
    available_styles, NodeStyleType, TwistCoupling, DEFAULT_ROTATE, DEFAULT_SHIFT, DEFAULT_SLOPE,
    DEFAULT_STRETCH, DEFAULT_TWIST,
};
use crate::geometry::vector::{flat_normalized, turn90_left};
use crate::geometry::{intersection, Bezier3, StraightLine};
use crate::shared::overlay::{OverlayCurve, OverlayStyle};

/// XZ-Skalarprodukt zweier Vorwärtsrichtungen, unterhalb dessen zwei Enden
/// als "fast gegenüberliegend" gelten (durchgehende Straße).
pub const NEAR_OPPOSITE_DOT: f32 = -0.75;

/// Abstand hinter der Nachbar-Ecke, an dem die Querlinie für Vorgabe-Ecken
/// angesetzt wird (Meter).
const CORNER_LOOKAHEAD: f32 = 2.0;

/// Auswahl der beiden dominanten Enden einer Kreuzung.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainRoad {
    /// Automatisch nachführen, solange der Nutzer nichts festgelegt hat.
    pub auto: bool,
    pub first: Option<u64>,
    pub second: Option<u64>,
}

impl Default for MainRoad {
    fn default() -> Self {
        Self {
            auto: true,
            first: None,
            second: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JunctionData {
    pub id: u64,
    /// Knotenposition des Hosts; die Höhe dient als Referenz für flache
    /// Kreuzungen.
    pub position: Vec3,
    pub style: NodeStyleType,
    pub main_road: MainRoad,
    ends: Vec<SegmentEndData>,
}

impl JunctionData {
    pub fn new(id: u64, position: Vec3, style: NodeStyleType) -> Self {
        Self {
            id,
            position,
            style,
            main_road: MainRoad::default(),
            ends: Vec::new(),
        }
    }

    pub fn ends(&self) -> &[SegmentEndData] {
        &self.ends
    }

    pub fn ends_mut(&mut self) -> &mut [SegmentEndData] {
        &mut self.ends
    }

    pub fn end(&self, segment_id: u64) -> Option<&SegmentEndData> {
        self.ends.iter().find(|end| end.segment_id == segment_id)
    }

    pub fn end_mut(&mut self, segment_id: u64) -> Option<&mut SegmentEndData> {
        self.ends
            .iter_mut()
            .find(|end| end.segment_id == segment_id)
    }

    pub fn end_count(&self) -> usize {
        self.ends.len()
    }

    pub fn add_end(&mut self, end: SegmentEndData) {
        self.ends.push(end);
    }

    pub fn remove_end(&mut self, segment_id: u64) -> bool {
        let before = self.ends.len();
        self.ends.retain(|end| end.segment_id != segment_id);
        self.ends.len() != before
    }

    pub fn is_two_roads(&self) -> bool {
        self.ends.len() == 2
    }

    /// Besteht die Kreuzung ausschließlich aus Zier-Segmenten?
    pub fn is_decoration_junction(&self) -> bool {
        !self.ends.is_empty()
            && self
                .ends
                .iter()
                .all(|end| end.kind == SegmentKind::Decoration)
    }

    fn index_of(&self, segment_id: u64) -> Option<usize> {
        self.ends.iter().position(|end| end.segment_id == segment_id)
    }

    fn touchable_ends(&self) -> impl Iterator<Item = &SegmentEndData> {
        self.ends.iter().filter(|end| !end.untouchable)
    }

    fn flat_forward(&self, index: usize) -> Vec3 {
        flat_normalized(self.ends[index].raw_center.tangent(0.0))
    }

    // ── Archetyp ────────────────────────────────────────────────────────────

    /// Wechselt den Archetyp und setzt alle Enden vollständig auf dessen
    /// Vorgaben zurück; auch bisher gestützte Parameterwerte werden verworfen.
    /// Unzulässige Archetypen (falsche Segmentzahl) werden abgewiesen.
    pub fn set_style(&mut self, style: NodeStyleType, default_is_slope: bool) -> bool {
        if !available_styles(self.ends.len()).contains(&style) {
            log::warn!(
                "Archetyp {} ist für Kreuzung {} mit {} Segmenten nicht zulässig",
                style.name(),
                self.id,
                self.ends.len()
            );
            return false;
        }
        self.style = style;
        let policy = style.policy();
        for end in self.ends.iter_mut() {
            end.reset_to_default(policy, default_is_slope, true);
        }
        true
    }

    // ── Hauptstraße ─────────────────────────────────────────────────────────

    /// Wählt bei aktiver Automatik das am stärksten gegenläufige Paar
    /// berührbarer Enden als Hauptstraße; Straßen-Segmente werden Gleisen
    /// und Wegen vorgezogen. Eine manuelle Wahl bleibt bestehen, solange
    /// beide Segmente noch angeschlossen sind.
    pub fn update_main_road(&mut self) {
        if !self.main_road.auto {
            let first_ok = self
                .main_road
                .first
                .is_some_and(|id| self.index_of(id).is_some());
            let second_ok = self
                .main_road
                .second
                .is_some_and(|id| self.index_of(id).is_some());
            if first_ok && second_ok {
                return;
            }
            self.main_road.auto = true;
        }

        let mut candidates: Vec<usize> = (0..self.ends.len())
            .filter(|&i| !self.ends[i].untouchable)
            .collect();
        if candidates.is_empty() {
            candidates = (0..self.ends.len()).collect();
        }

        match candidates.len() {
            0 => {
                self.main_road.first = None;
                self.main_road.second = None;
            }
            1 => {
                self.main_road.first = Some(self.ends[candidates[0]].segment_id);
                self.main_road.second = None;
            }
            _ => {
                let mut best: Option<(bool, f32, usize, usize)> = None;
                for a in 0..candidates.len() {
                    for b in (a + 1)..candidates.len() {
                        let i = candidates[a];
                        let j = candidates[b];
                        let dot = self.flat_forward(i).dot(self.flat_forward(j));
                        let both_roads = self.ends[i].kind == SegmentKind::Road
                            && self.ends[j].kind == SegmentKind::Road;
                        let better = match &best {
                            None => true,
                            Some((best_roads, best_dot, _, _)) => {
                                (both_roads && !best_roads)
                                    || (both_roads == *best_roads && dot < *best_dot)
                            }
                        };
                        if better {
                            best = Some((both_roads, dot, i, j));
                        }
                    }
                }
                if let Some((_, _, i, j)) = best {
                    self.main_road.first = Some(self.ends[i].segment_id);
                    self.main_road.second = Some(self.ends[j].segment_id);
                }
            }
        }
    }

    /// Manuelle Hauptstraßen-Wahl; schlägt fehl, wenn eines der Segmente
    /// nicht angeschlossen ist.
    pub fn set_main_road(&mut self, first: u64, second: u64) -> bool {
        if first == second || self.index_of(first).is_none() || self.index_of(second).is_none() {
            return false;
        }
        self.main_road = MainRoad {
            auto: false,
            first: Some(first),
            second: Some(second),
        };
        true
    }

    pub fn reset_main_road(&mut self) {
        self.main_road = MainRoad::default();
        self.update_main_road();
    }

    fn main_pair(&self) -> Option<(usize, usize)> {
        let first = self.main_road.first.and_then(|id| self.index_of(id))?;
        let second = self.main_road.second.and_then(|id| self.index_of(id))?;
        (first != second).then_some((first, second))
    }

    fn main_indices(&self) -> Vec<usize> {
        let mut indices = Vec::with_capacity(2);
        if let Some(i) = self.main_road.first.and_then(|id| self.index_of(id)) {
            indices.push(i);
        }
        if let Some(i) = self.main_road.second.and_then(|id| self.index_of(id)) {
            if !indices.contains(&i) {
                indices.push(i);
            }
        }
        indices
    }

    /// Verbindungskurven der Hauptstraße über die Kreuzung hinweg, aus den
    /// aufgelösten Eckpunkten beider Hauptenden. Linke Kante des ersten Endes
    /// und rechte des zweiten liegen auf derselben Weltseite.
    fn main_curves(&self) -> Option<MainCurves> {
        let (first, second) = self.main_pair()?;
        let first = &self.ends[first];
        let second = &self.ends[second];
        Some(MainCurves {
            left: Bezier3::from_ends(
                first.left.position,
                -first.left.direction,
                second.right.position,
                -second.right.direction,
            ),
            right: Bezier3::from_ends(
                first.right.position,
                -first.right.direction,
                second.left.position,
                -second.left.direction,
            ),
        })
    }

    // ── Limits ──────────────────────────────────────────────────────────────

    fn angular_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.ends.len()).collect();
        order.sort_by(|&a, &b| {
            self.ends[a]
                .absolute_angle()
                .partial_cmp(&self.ends[b].absolute_angle())
                .unwrap_or(Ordering::Equal)
        });
        order
    }

    /// Erste Lösungsphase: wie nah darf jede Randkurve der Kreuzung kommen,
    /// ohne die Randkurve eines Nachbarn zu kreuzen? Zusätzlich entstehen
    /// die lockereren Vorgabe-Ecken (`default_t`) hinter den Nachbar-Limits.
    ///
    /// Einzelenden und Middle-Kreuzungen haben keine Nachbarn zu meiden —
    /// dort bleibt alles bei 0.
    pub fn calculate_min_limits(&mut self) {
        let count = self.ends.len();
        if count == 0 {
            return;
        }

        let mut left_min = vec![0.0f32; count];
        let mut right_min = vec![0.0f32; count];
        let solve_pairs = count >= 2 && self.style != NodeStyleType::Middle;
        let order = self.angular_order();

        if solve_pairs {
            for k in 0..count {
                let i = order[k];
                let j = order[(k + 1) % count];
                if i == j {
                    continue;
                }
                // Im Winkel aufeinanderfolgend: die linke Kante von i und die
                // rechte von j zeigen aufeinander. Alle drei Kurvenpaare
                // können sich je nach Winkel schneiden.
                let left_i = &self.ends[i].left.raw_curve;
                let right_i = &self.ends[i].right.raw_curve;
                let left_j = &self.ends[j].left.raw_curve;
                let right_j = &self.ends[j].right.raw_curve;

                if let Some(hit) = intersection::bezier_bezier(left_i, right_j) {
                    left_min[i] = left_min[i].max(hit.first_t);
                    right_min[j] = right_min[j].max(hit.second_t);
                }
                if let Some(hit) = intersection::bezier_bezier(left_i, left_j) {
                    left_min[i] = left_min[i].max(hit.first_t);
                    left_min[j] = left_min[j].max(hit.second_t);
                }
                if let Some(hit) = intersection::bezier_bezier(right_i, right_j) {
                    right_min[i] = right_min[i].max(hit.first_t);
                    right_min[j] = right_min[j].max(hit.second_t);
                }
            }
        }

        for (idx, end) in self.ends.iter_mut().enumerate() {
            let left_max = end.left.max_t;
            let right_max = end.right.max_t;
            end.left.set_limits(left_min[idx], left_max);
            end.right.set_limits(right_min[idx], right_max);
        }

        let mut default_left = left_min;
        let mut default_right = right_min;

        if solve_pairs {
            for k in 0..count {
                let i = order[k];
                let j = order[(k + 1) % count];
                if i == j {
                    continue;
                }
                if let Some(t) = default_corner_cast(&self.ends[j].right, &self.ends[i].left) {
                    default_left[i] = default_left[i].max(t);
                }
                if let Some(t) = default_corner_cast(&self.ends[i].left, &self.ends[j].right) {
                    default_right[j] = default_right[j].max(t);
                }
            }

            // Fast gegenüberliegende Paare: beide Seiten eines Endes auf die
            // weitere Vorgabe ziehen, sonst kneift der Querschnitt an der
            // Innenseite eines 180°-Knicks zusammen.
            for k in 0..count {
                let i = order[k];
                let j = order[(k + 1) % count];
                if i == j {
                    continue;
                }
                if self.flat_forward(i).dot(self.flat_forward(j)) < NEAR_OPPOSITE_DOT {
                    for idx in [i, j] {
                        let widened = default_left[idx].max(default_right[idx]);
                        default_left[idx] = widened;
                        default_right[idx] = widened;
                    }
                }
            }
        }

        let additional = self.style.policy().additional_offset;
        for (idx, end) in self.ends.iter_mut().enumerate() {
            end.calculate_segment_limit();
            let reach = end.min_offset + additional;
            let left_floor = end.left.raw_curve.travel(0.0, reach);
            let right_floor = end.right.raw_curve.travel(0.0, reach);
            end.left.default_t = default_left[idx].max(left_floor);
            end.right.default_t = default_right[idx].max(right_floor);
        }
    }

    // ── Neuberechnung ───────────────────────────────────────────────────────

    /// Löst alle Enden der Kreuzung neu auf: erst die Hauptenden (sie liefern
    /// die Höhenreferenz), dann die Nebenenden gegen die Hauptkurven.
    pub fn calculate(&mut self) {
        if self.ends.is_empty() {
            return;
        }
        self.update_main_road();

        let ctx = EndContext {
            junction_height: self.position.y,
            min_gap: self.style != NodeStyleType::Middle,
            banked: matches!(self.style, NodeStyleType::Middle | NodeStyleType::End),
            is_main: true,
            main_curves: None,
        };

        let main_indices = self.main_indices();
        for &idx in &main_indices {
            self.ends[idx].calculate(&ctx);
        }

        let main_curves = self.main_curves();
        let minor_ctx = EndContext {
            is_main: false,
            main_curves: main_curves.as_ref(),
            ..ctx
        };
        for idx in 0..self.ends.len() {
            if !main_indices.contains(&idx) {
                self.ends[idx].calculate(&minor_ctx);
            }
        }
    }

    // ── Aggregierte Parameter ───────────────────────────────────────────────

    fn average_or(&self, default: f32, value: impl Fn(&SegmentEndData) -> f32) -> f32 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for end in self.touchable_ends() {
            sum += value(end);
            count += 1;
        }
        if count == 0 {
            default
        } else {
            sum / count as f32
        }
    }

    pub fn get_offset(&self) -> f32 {
        self.average_or(self.style.policy().default_offset, |end| end.offset())
    }

    pub fn set_offset(&mut self, value: f32) {
        for end in self.ends.iter_mut().filter(|end| !end.untouchable) {
            end.set_offset(value);
        }
    }

    /// Shift der Kreuzung. Bei genau zwei Segmenten sind die beiden Enden
    /// gegengleich gekoppelt: gleicher Welt-Versatz heißt entgegengesetztes
    /// Vorzeichen in den lokalen Bezugsrahmen.
    pub fn get_shift(&self) -> f32 {
        if self.is_two_roads() {
            if let Some((f, s)) = self.main_pair() {
                let first = &self.ends[f];
                let second = &self.ends[s];
                return match (first.untouchable, second.untouchable) {
                    (true, true) => 0.0,
                    (true, false) => -second.shift(),
                    (false, true) => first.shift(),
                    (false, false) => (first.shift() - second.shift()) / 2.0,
                };
            }
        }
        self.average_or(DEFAULT_SHIFT, |end| end.shift())
    }

    pub fn set_shift(&mut self, value: f32) {
        if self.is_two_roads() {
            if let Some((f, s)) = self.main_pair() {
                if allow_shift(&self.ends[f]) {
                    self.ends[f].set_shift(value);
                }
                if allow_shift(&self.ends[s]) {
                    self.ends[s].set_shift(-value);
                }
                return;
            }
        }
        for end in self.ends.iter_mut() {
            if allow_shift(end) {
                end.set_shift(value);
            }
        }
    }

    pub fn get_rotate(&self) -> f32 {
        self.average_or(DEFAULT_ROTATE, |end| end.rotate_deg())
    }

    pub fn set_rotate(&mut self, value: f32) {
        for end in self.ends.iter_mut().filter(|end| !end.untouchable) {
            end.set_rotate(value);
        }
    }

    pub fn get_slope(&self) -> f32 {
        if self.style.policy().slope_antisymmetric {
            if let Some((f, s)) = self.main_pair() {
                return (self.ends[f].slope_deg() - self.ends[s].slope_deg()) / 2.0;
            }
        }
        self.average_or(DEFAULT_SLOPE, |end| end.slope_deg())
    }

    pub fn set_slope(&mut self, value: f32) {
        if self.style.policy().slope_antisymmetric {
            if let Some((f, s)) = self.main_pair() {
                self.ends[f].set_slope(value);
                self.ends[s].set_slope(-value);
                return;
            }
        }
        for end in self.ends.iter_mut().filter(|end| !end.untouchable) {
            end.set_slope(value);
        }
    }

    pub fn get_twist(&self) -> f32 {
        match self.style.policy().twist_coupling {
            TwistCoupling::Uniform => self.average_or(DEFAULT_TWIST, |end| end.twist_deg()),
            TwistCoupling::Antisymmetric => match self.main_pair() {
                Some((f, s)) => (self.ends[f].twist_deg() - self.ends[s].twist_deg()) / 2.0,
                None => self.average_or(DEFAULT_TWIST, |end| end.twist_deg()),
            },
            TwistCoupling::AntisymmetricExceptDecoration => {
                if self.is_decoration_junction() {
                    return self.average_or(DEFAULT_TWIST, |end| end.twist_deg());
                }
                match self.main_pair() {
                    Some((f, s)) => {
                        let first = &self.ends[f];
                        let second = &self.ends[s];
                        match (first.untouchable, second.untouchable) {
                            (true, true) => 0.0,
                            (true, false) => second.twist_deg(),
                            (false, true) => first.twist_deg(),
                            (false, false) => (first.twist_deg() - second.twist_deg()) / 2.0,
                        }
                    }
                    None => self.average_or(DEFAULT_TWIST, |end| end.twist_deg()),
                }
            }
        }
    }

    pub fn set_twist(&mut self, value: f32) {
        match self.style.policy().twist_coupling {
            TwistCoupling::Uniform => self.set_twist_uniform(value),
            TwistCoupling::Antisymmetric => match self.main_pair() {
                Some((f, s)) => {
                    self.ends[f].set_twist(value);
                    self.ends[s].set_twist(-value);
                }
                None => self.set_twist_uniform(value),
            },
            TwistCoupling::AntisymmetricExceptDecoration => {
                if self.is_decoration_junction() {
                    self.set_twist_uniform(value);
                    return;
                }
                match self.main_pair() {
                    Some((f, s)) => {
                        let first_touchable = !self.ends[f].untouchable;
                        let second_touchable = !self.ends[s].untouchable;
                        if first_touchable && second_touchable {
                            self.ends[f].set_twist(value);
                            self.ends[s].set_twist(-value);
                        } else {
                            if first_touchable {
                                self.ends[f].set_twist(value);
                            }
                            if second_touchable {
                                self.ends[s].set_twist(value);
                            }
                        }
                    }
                    None => self.set_twist_uniform(value),
                }
            }
        }
    }

    fn set_twist_uniform(&mut self, value: f32) {
        for end in self.ends.iter_mut().filter(|end| !end.untouchable) {
            end.set_twist(value);
        }
    }

    pub fn get_stretch(&self) -> f32 {
        if self.style.policy().stretch_via_mains {
            if let Some((f, s)) = self.main_pair() {
                return (self.ends[f].stretch() + self.ends[s].stretch()) / 2.0;
            }
        }
        self.average_or(DEFAULT_STRETCH, |end| end.stretch())
    }

    pub fn set_stretch(&mut self, value: f32) {
        if self.style.policy().stretch_via_mains {
            if let Some((f, s)) = self.main_pair() {
                self.ends[f].set_stretch(value);
                self.ends[s].set_stretch(value);
                return;
            }
        }
        for end in self.ends.iter_mut().filter(|end| !end.untouchable) {
            end.set_stretch(value);
        }
    }

    /// Markierungen über alle Straßen-Enden; `None` bei gemischtem Zustand.
    pub fn get_no_markings(&self) -> Option<bool> {
        tri_state(
            self.ends
                .iter()
                .filter(|end| end.kind == SegmentKind::Road)
                .map(|end| end.no_markings),
        )
    }

    pub fn set_no_markings(&mut self, value: bool) {
        for end in self
            .ends
            .iter_mut()
            .filter(|end| end.kind == SegmentKind::Road)
        {
            end.no_markings = value;
        }
    }

    pub fn get_collision(&self) -> Option<bool> {
        tri_state(self.touchable_ends().map(|end| end.collision))
    }

    pub fn set_collision(&mut self, value: bool) {
        for end in self.ends.iter_mut().filter(|end| !end.untouchable) {
            end.collision = value;
        }
    }

    pub fn get_force_node_less(&self) -> Option<bool> {
        tri_state(self.touchable_ends().map(|end| end.force_node_less))
    }

    pub fn set_force_node_less(&mut self, value: bool) {
        for end in self.ends.iter_mut().filter(|end| !end.untouchable) {
            end.force_node_less = value;
        }
    }

    /// Sloped, sobald irgendein berührbares Ende den Modus trägt.
    pub fn get_is_slope_junction(&self) -> bool {
        self.touchable_ends().any(|end| end.is_slope)
    }

    pub fn set_is_slope_junction(&mut self, value: bool) {
        for end in self.ends.iter_mut().filter(|end| !end.untouchable) {
            end.is_slope = value;
        }
    }

    /// Trägt die Kreuzung noch überall die Archetyp-Vorgaben? Offsets zählen
    /// nicht mit — sie folgen der Geometrie, nicht dem Nutzer.
    pub fn is_default(&self, default_is_slope: bool) -> bool {
        let policy = self.style.policy();
        if (self.get_shift() - DEFAULT_SHIFT).abs() > 0.001 {
            return false;
        }
        if (self.get_rotate() - DEFAULT_ROTATE).abs() > 0.1 {
            return false;
        }
        if (self.get_slope() - DEFAULT_SLOPE).abs() > 0.1 {
            return false;
        }
        if (self.get_twist() - DEFAULT_TWIST).abs() > 0.1 {
            return false;
        }
        if (self.get_stretch() - DEFAULT_STRETCH).abs() > 0.001 {
            return false;
        }
        if self
            .ends
            .iter()
            .filter(|end| end.kind == SegmentKind::Road)
            .any(|end| end.no_markings != policy.default_no_markings)
        {
            return false;
        }
        if self
            .ends
            .iter()
            .any(|end| end.collision != end.default_collision())
        {
            return false;
        }
        if self.get_is_slope_junction() != policy.force_slope_junction.unwrap_or(default_is_slope) {
            return false;
        }
        if self.get_force_node_less() != Some(false) {
            return false;
        }
        true
    }

    // ── Overlay ─────────────────────────────────────────────────────────────

    /// Overlay-Kurven der ganzen Kreuzung: Randkurven (frei/gesperrt) und
    /// Konturen aller Enden.
    pub fn render_overlays(
        &self,
        allowed: OverlayStyle,
        forbidden: OverlayStyle,
        contour: OverlayStyle,
    ) -> Vec<OverlayCurve> {
        let mut pieces = Vec::new();
        for end in &self.ends {
            pieces.extend(end.render_sides(allowed, forbidden));
            pieces.extend(end.render_contour(contour));
        }
        pieces
    }
}

fn allow_shift(end: &SegmentEndData) -> bool {
    !end.untouchable && end.kind != SegmentKind::Decoration
}

/// Gemeinsamer Zustand einer Bool-Eigenschaft über mehrere Enden;
/// `None` bei Mischung, leere Mengen gelten als einheitlich `true`.
fn tri_state(values: impl Iterator<Item = bool>) -> Option<bool> {
    let mut any_true = false;
    let mut any_false = false;
    for value in values {
        if value {
            any_true = true;
        } else {
            any_false = true;
        }
    }
    match (any_true, any_false) {
        (_, false) => Some(true),
        (false, true) => Some(false),
        (true, true) => None,
    }
}

/// Vorgabe-Ecke einer Seite: Querlinie im Lookahead-Abstand hinter der
/// Limit-Ecke des Nachbarn, geschnitten mit der eigenen Randkurve.
fn default_corner_cast(neighbor: &SegmentSide, target: &SegmentSide) -> Option<f32> {
    let anchor_t = neighbor.raw_curve.travel(neighbor.min_t, CORNER_LOOKAHEAD);
    let anchor = neighbor.raw_curve.position(anchor_t);
    let lateral = turn90_left(flat_normalized(neighbor.raw_curve.tangent(anchor_t)));
    let line = StraightLine::unbounded(anchor, anchor + lateral);
    intersection::bezier_line(&target.raw_curve, &line).map(|hit| hit.first_t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::network::SegmentTopology;
    use crate::core::segment_end::{compute_segment_curves, EndInfluence};
    use approx::assert_relative_eq;

    fn junction_with_arms(style: NodeStyleType, arms: &[(Vec3, SegmentKind)]) -> JunctionData {
        let mut junction = JunctionData::new(1, Vec3::ZERO, style);
        for (i, &(direction, kind)) in arms.iter().enumerate() {
            let id = (i + 1) as u64;
            let segment = SegmentTopology {
                id,
                start_node: 1,
                end_node: 100 + id,
                start_direction: direction,
                end_direction: -direction,
                half_width: 4.0,
                kind,
                untouchable: false,
            };
            let curves = compute_segment_curves(
                &segment,
                Vec3::ZERO,
                direction * 40.0,
                EndInfluence::default(),
                EndInfluence::default(),
                None,
                None,
            );
            let mut end = SegmentEndData::new(&segment, 1);
            end.set_raw_curves(&curves);
            junction.add_end(end);
        }
        junction
    }

    fn four_way() -> JunctionData {
        junction_with_arms(
            NodeStyleType::Custom,
            &[
                (Vec3::X, SegmentKind::Road),
                (Vec3::Z, SegmentKind::Road),
                (-Vec3::X, SegmentKind::Road),
                (-Vec3::Z, SegmentKind::Road),
            ],
        )
    }

    #[test]
    fn test_vierarmige_kreuzung_min_limits() {
        let mut junction = four_way();
        junction.calculate_min_limits();

        // Randkurven benachbarter Arme kreuzen sich 4 m vor dem Knoten
        // (halbe Breite des Nachbarn), also bei t = 4/40.
        for end in junction.ends() {
            assert_relative_eq!(end.left.min_t, 0.1, epsilon = 0.02);
            assert_relative_eq!(end.right.min_t, 0.1, epsilon = 0.02);
        }
    }

    #[test]
    fn test_default_t_liegt_hinter_min_t() {
        let mut junction = four_way();
        junction.calculate_min_limits();

        // min_offset = 4 m plus additional_offset 2 m des Custom-Archetyps
        // ergibt die Vorgabe-Ecke bei t = 6/40.
        for end in junction.ends() {
            assert!(end.left.default_t > end.left.min_t);
            assert_relative_eq!(end.left.default_t, 0.15, epsilon = 0.02);
            assert_relative_eq!(end.right.default_t, 0.15, epsilon = 0.02);
        }
    }

    #[test]
    fn test_spitzer_winkel_lockert_vorgabe_ecke() {
        let diagonal = Vec3::new(1.0, 0.0, 1.0).normalize();
        let mut junction = junction_with_arms(
            NodeStyleType::Custom,
            &[
                (Vec3::X, SegmentKind::Road),
                (diagonal, SegmentKind::Road),
                (-Vec3::X, SegmentKind::Road),
            ],
        );
        junction.calculate_min_limits();

        // Zwischen +X und der Diagonale (45°) liegt die Vorgabe-Ecke des
        // spitzen Keils deutlich hinter dem Limit.
        let east = junction.end(1).unwrap();
        assert!(
            east.left.default_t > east.left.min_t + 0.02,
            "Vorgabe {} muss hinter Limit {} liegen",
            east.left.default_t,
            east.left.min_t
        );
    }

    #[test]
    fn test_middle_kreuzung_bleibt_ohne_limits() {
        let mut junction = junction_with_arms(
            NodeStyleType::Middle,
            &[(Vec3::X, SegmentKind::Road), (-Vec3::X, SegmentKind::Road)],
        );
        junction.calculate_min_limits();

        for end in junction.ends() {
            assert_relative_eq!(end.left.min_t, 0.0);
            assert_relative_eq!(end.right.min_t, 0.0);
            assert_relative_eq!(end.left.default_t, 0.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_hauptstrasse_waehlt_gegenlaeufiges_paar() {
        let mut junction = junction_with_arms(
            NodeStyleType::Custom,
            &[
                (Vec3::X, SegmentKind::Road),
                (Vec3::Z, SegmentKind::Road),
                (-Vec3::X, SegmentKind::Road),
            ],
        );
        junction.update_main_road();

        let first = junction.main_road.first;
        let second = junction.main_road.second;
        assert!(
            (first == Some(1) && second == Some(3)) || (first == Some(3) && second == Some(1)),
            "±X-Paar erwartet, war {:?}/{:?}",
            first,
            second
        );
    }

    #[test]
    fn test_hauptstrasse_bevorzugt_strassen_vor_gleisen() {
        let tilted = Vec3::new(-0.996, 0.0, 0.087).normalize();
        let mut junction = junction_with_arms(
            NodeStyleType::Custom,
            &[
                (Vec3::X, SegmentKind::Track),
                (-Vec3::X, SegmentKind::Track),
                (Vec3::new(1.0, 0.0, 0.0), SegmentKind::Road),
                (tilted, SegmentKind::Road),
            ],
        );
        junction.update_main_road();

        // Das Gleis-Paar ist exakt gegenläufig, aber Straßen gewinnen.
        assert_eq!(junction.main_road.first, Some(3));
        assert_eq!(junction.main_road.second, Some(4));
    }

    #[test]
    fn test_set_style_prueft_segmentzahl() {
        let mut junction = four_way();
        assert!(!junction.set_style(NodeStyleType::Middle, false));
        assert_eq!(junction.style, NodeStyleType::Custom);
        assert!(junction.set_style(NodeStyleType::Custom, false));
    }

    #[test]
    fn test_twist_gegengleich_ueber_hauptenden() {
        let mut junction = junction_with_arms(
            NodeStyleType::Bend,
            &[(Vec3::X, SegmentKind::Road), (-Vec3::X, SegmentKind::Road)],
        );
        junction.update_main_road();
        junction.set_twist(10.0);

        let (f, s) = junction.main_pair().unwrap();
        assert_relative_eq!(junction.ends()[f].twist_deg(), 10.0);
        assert_relative_eq!(junction.ends()[s].twist_deg(), -10.0);
        assert_relative_eq!(junction.get_twist(), 10.0);
    }

    #[test]
    fn test_zier_kreuzung_twist_einheitlich() {
        let mut junction = junction_with_arms(
            NodeStyleType::Custom,
            &[
                (Vec3::X, SegmentKind::Decoration),
                (-Vec3::X, SegmentKind::Decoration),
            ],
        );
        junction.update_main_road();
        junction.set_twist(7.0);

        assert_relative_eq!(junction.ends()[0].twist_deg(), 7.0);
        assert_relative_eq!(junction.ends()[1].twist_deg(), 7.0);
        assert_relative_eq!(junction.get_twist(), 7.0);
    }

    #[test]
    fn test_shift_kopplung_bei_zwei_segmenten() {
        let mut junction = junction_with_arms(
            NodeStyleType::Bend,
            &[(Vec3::X, SegmentKind::Road), (-Vec3::X, SegmentKind::Road)],
        );
        junction.update_main_road();
        junction.set_shift(5.0);

        let (f, s) = junction.main_pair().unwrap();
        assert_relative_eq!(junction.ends()[f].shift(), 5.0);
        assert_relative_eq!(junction.ends()[s].shift(), -5.0);
        assert_relative_eq!(junction.get_shift(), 5.0);
    }

    #[test]
    fn test_stretch_middle_wirkt_gleichsinnig() {
        let mut junction = junction_with_arms(
            NodeStyleType::Middle,
            &[(Vec3::X, SegmentKind::Road), (-Vec3::X, SegmentKind::Road)],
        );
        junction.update_main_road();
        junction.set_stretch(1.5);

        assert_relative_eq!(junction.ends()[0].stretch(), 1.5);
        assert_relative_eq!(junction.ends()[1].stretch(), 1.5);
        assert_relative_eq!(junction.get_stretch(), 1.5);
    }

    #[test]
    fn test_is_default_nach_archetyp_reset() {
        let mut junction = junction_with_arms(
            NodeStyleType::Bend,
            &[(Vec3::X, SegmentKind::Road), (-Vec3::X, SegmentKind::Road)],
        );
        junction.update_main_road();
        junction.set_twist(10.0);
        assert!(!junction.is_default(false));

        junction.set_style(NodeStyleType::Bend, false);
        assert!(junction.is_default(false));
    }

    #[test]
    fn test_manuelle_hauptstrasse_bleibt_erhalten() {
        let mut junction = junction_with_arms(
            NodeStyleType::Custom,
            &[
                (Vec3::X, SegmentKind::Road),
                (Vec3::Z, SegmentKind::Road),
                (-Vec3::X, SegmentKind::Road),
            ],
        );
        assert!(junction.set_main_road(1, 2));
        junction.update_main_road();
        assert_eq!(junction.main_road.first, Some(1));
        assert_eq!(junction.main_road.second, Some(2));

        // Entfernt man ein gewähltes Segment, greift wieder die Automatik.
        junction.remove_end(2);
        junction.update_main_road();
        assert!(junction.main_road.auto);
        assert_eq!(junction.main_road.first, Some(1));
        assert_eq!(junction.main_road.second, Some(3));
    }

    #[test]
    fn test_calculate_loest_eckpunkte_auf() {
        let mut junction = four_way();
        junction.calculate_min_limits();
        junction.calculate();

        // Vorgabe-Modus: Ecken bei default_t = 0.15, also 6 m vor dem Knoten.
        let east = junction.end(1).unwrap();
        assert_relative_eq!(east.position.x, 6.0, epsilon = 0.2);
        assert!(east.position.z.abs() < 0.1);
        assert_relative_eq!(east.direction.x, 1.0, epsilon = 1e-2);
        assert_relative_eq!(east.left.position.z, 4.0, epsilon = 0.1);
        assert_relative_eq!(east.vehicle_twist_deg, 0.0, epsilon = 0.1);
        assert_relative_eq!(east.offset(), 6.0, epsilon = 0.2);
    }

    #[test]
    fn test_crossing_ecke_haelt_epsilon_abstand_zum_limit() {
        let mut junction = junction_with_arms(
            NodeStyleType::Crossing,
            &[(Vec3::X, SegmentKind::Road), (Vec3::Z, SegmentKind::Road)],
        );
        junction.calculate_min_limits();

        // Vorgabe-Ecke exakt auf das Minimal-Limit zwingen.
        let east = junction.end_mut(1).unwrap();
        east.keep_defaults = true;
        east.left.default_t = east.left.min_t;
        junction.calculate();

        // Nur Middle darf auf dem Limit liegen; jeder andere Archetyp rückt
        // um 5 cm Bogenlänge ab.
        let side = &junction.end(1).unwrap().left;
        assert_relative_eq!(side.min_t, 0.1, epsilon = 0.02);
        let expected = side.raw_curve.position(side.min_t + side.delta_t());
        assert!(
            side.position.distance(expected) < 1e-3,
            "Ecke muss bei min_t + ε liegen, Abstand {}",
            side.position.distance(expected)
        );
        assert_relative_eq!(
            side.position.distance(side.raw_curve.position(side.min_t)),
            0.05,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_nebensegment_erbt_hauptstrassen_hoehe() {
        // Hauptstraße ±X mit Gefälle über die Kreuzung, Nebenarm +Z.
        let mut junction = junction_with_arms(
            NodeStyleType::Custom,
            &[
                (Vec3::X, SegmentKind::Road),
                (-Vec3::X, SegmentKind::Road),
                (Vec3::Z, SegmentKind::Road),
            ],
        );
        junction.set_is_slope_junction(true);

        // Höhenversatz der Hauptenden von Hand einprägen: Ost oben.
        for end in junction.ends_mut() {
            if end.segment_id == 1 {
                let mut curve = end.raw_center;
                curve.p0.y = 2.0;
                curve.p1.y = 2.0;
                end.raw_center = curve;
                let mut left = end.left.raw_curve;
                left.p0.y = 2.0;
                left.p1.y = 2.0;
                end.left.set_raw_curve(left);
                let mut right = end.right.raw_curve;
                right.p0.y = 2.0;
                right.p1.y = 2.0;
                end.right.set_raw_curve(right);
            }
        }
        junction.calculate_min_limits();
        junction.calculate();

        // Der Nebenarm greift seine Höhe von den Hauptkurven ab statt flach
        // auf Knotenhöhe zu fallen; seine rechte Ecke liegt nahe dem
        // angehobenen Ost-Ende.
        let minor = junction.end(3).unwrap();
        assert!(
            minor.right.position.y > 0.5,
            "Nebenarm muss Höhe der Hauptstraße übernehmen, war {}",
            minor.right.position.y
        );
    }
}
