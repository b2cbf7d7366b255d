//! Kreuzungs-Archetypen und ihre Parameter-Richtlinien.
//!
//! Jeder Archetyp legt pro Parameter fest, ob er je Segmentende editierbar
//! ist, nur als Aggregat über die ganze Kreuzung, beides oder gar nicht —
//! dazu Standardwerte und Kopplungsregeln für die beiden Hauptenden.
//! Kein Klassenbaum: ein Enum plus statische Richtlinien-Tabelle, die
//! Kopplungs-Sonderfälle stehen als kleine Modus-Enums daneben.

/// Die sieben festen Kreuzungs-Archetypen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeStyleType {
    Middle,
    Bend,
    Stretch,
    Crossing,
    UTurn,
    End,
    Custom,
}

/// Editierbarkeit eines Parameters unter einem Archetyp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportOption {
    None,
    Individual,
    Group,
    All,
}

impl SupportOption {
    /// Je Segmentende einzeln editierbar?
    pub fn individual(self) -> bool {
        matches!(self, SupportOption::Individual | SupportOption::All)
    }

    /// Als Kreuzungs-Aggregat editierbar?
    pub fn group(self) -> bool {
        matches!(self, SupportOption::Group | SupportOption::All)
    }

    pub fn any(self) -> bool {
        !matches!(self, SupportOption::None)
    }
}

/// Kopplung des Twist-Werts zwischen den beiden Hauptenden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwistCoupling {
    /// Alle Enden erhalten denselben Wert.
    Uniform,
    /// Haupt-Enden gegengleich: `twist_A = -twist_B`.
    Antisymmetric,
    /// Wie `Antisymmetric`, aber Zier-Segmente bleiben unabhängig.
    AntisymmetricExceptDecoration,
}

/// Statische Richtlinien eines Archetyps.
#[derive(Debug, Clone, Copy)]
pub struct StylePolicy {
    pub support_offset: SupportOption,
    pub support_shift: SupportOption,
    pub support_rotate: SupportOption,
    pub support_slope: SupportOption,
    pub support_twist: SupportOption,
    pub support_stretch: SupportOption,
    pub support_marking: SupportOption,
    pub support_collision: SupportOption,
    pub support_nodeless: SupportOption,
    pub support_slope_junction: SupportOption,
    /// Standard-Offset in Metern (wird je Ende gegen `min_offset` verrechnet).
    pub default_offset: f32,
    /// Zusatzabstand hinter dem Pflicht-Minimum für Default-Ecken.
    pub additional_offset: f32,
    pub default_no_markings: bool,
    /// `Some(..)` erzwingt den Slope-Junction-Modus unabhängig von den
    /// Engine-Optionen.
    pub force_slope_junction: Option<bool>,
    /// Offset existiert nur im Ecken-Modus (kein numerischer Offset-Editor).
    pub only_keep_defaults: bool,
    /// Dürfen Ecken im Werkzeug frei verschoben werden?
    pub is_moveable: bool,
    pub twist_coupling: TwistCoupling,
    /// Slope gegengleich über die Hauptenden (nur Middle).
    pub slope_antisymmetric: bool,
    /// Stretch wirkt gemeinsam auf beide Hauptenden statt auf alle Enden.
    pub stretch_via_mains: bool,
}

// ── Wertebereiche (für alle Archetypen gleich) ──────────────────────────────

pub const MIN_SHIFT: f32 = -64.0;
pub const MAX_SHIFT: f32 = 64.0;
pub const MIN_SLOPE: f32 = -60.0;
pub const MAX_SLOPE: f32 = 60.0;
pub const MIN_TWIST: f32 = -60.0;
pub const MAX_TWIST: f32 = 60.0;
/// Stretch als Faktor: 1 % bis 500 %.
pub const MIN_STRETCH: f32 = 0.01;
pub const MAX_STRETCH: f32 = 5.0;
pub const MIN_OFFSET: f32 = 0.0;
pub const MAX_OFFSET: f32 = 1000.0;

pub const DEFAULT_SHIFT: f32 = 0.0;
pub const DEFAULT_ROTATE: f32 = 0.0;
pub const DEFAULT_SLOPE: f32 = 0.0;
pub const DEFAULT_TWIST: f32 = 0.0;
pub const DEFAULT_STRETCH: f32 = 1.0;

// ── Richtlinien-Tabelle ─────────────────────────────────────────────────────

const BASE: StylePolicy = StylePolicy {
    support_offset: SupportOption::None,
    support_shift: SupportOption::None,
    support_rotate: SupportOption::None,
    support_slope: SupportOption::None,
    support_twist: SupportOption::None,
    support_stretch: SupportOption::None,
    support_marking: SupportOption::None,
    support_collision: SupportOption::None,
    support_nodeless: SupportOption::None,
    support_slope_junction: SupportOption::None,
    default_offset: 0.0,
    additional_offset: 0.0,
    default_no_markings: false,
    force_slope_junction: None,
    only_keep_defaults: false,
    is_moveable: false,
    twist_coupling: TwistCoupling::Uniform,
    slope_antisymmetric: false,
    stretch_via_mains: false,
};

/// Durchgehende Straße über einen Zwischenknoten.
const MIDDLE: StylePolicy = StylePolicy {
    support_shift: SupportOption::Group,
    support_slope: SupportOption::All,
    support_twist: SupportOption::Group,
    support_stretch: SupportOption::Group,
    force_slope_junction: Some(true),
    twist_coupling: TwistCoupling::Antisymmetric,
    slope_antisymmetric: true,
    stretch_via_mains: true,
    ..BASE
};

/// Knick zwischen zwei Segmenten mit frei editierbaren Ecken.
const BEND: StylePolicy = StylePolicy {
    support_offset: SupportOption::All,
    support_shift: SupportOption::All,
    support_rotate: SupportOption::All,
    support_twist: SupportOption::All,
    support_stretch: SupportOption::All,
    support_slope_junction: SupportOption::Group,
    default_offset: 8.0,
    additional_offset: 2.0,
    is_moveable: true,
    twist_coupling: TwistCoupling::Antisymmetric,
    ..BASE
};

/// Wie `Bend`, betont den Stretch-Anwendungsfall.
const STRETCH: StylePolicy = BEND;

/// Fußgängerübergang: enge Default-Ecken, Markierungen schaltbar.
const CROSSING: StylePolicy = StylePolicy {
    support_shift: SupportOption::Group,
    support_twist: SupportOption::Group,
    support_stretch: SupportOption::Group,
    support_marking: SupportOption::All,
    support_slope_junction: SupportOption::Group,
    default_offset: 2.0,
    only_keep_defaults: true,
    twist_coupling: TwistCoupling::Antisymmetric,
    ..BASE
};

/// Wendeschleife: wie Crossing, aber ohne Markierungen ab Werk.
const UTURN: StylePolicy = StylePolicy {
    support_shift: SupportOption::Group,
    support_twist: SupportOption::Group,
    support_stretch: SupportOption::Group,
    support_marking: SupportOption::All,
    support_slope_junction: SupportOption::Group,
    default_offset: 8.0,
    default_no_markings: true,
    only_keep_defaults: true,
    twist_coupling: TwistCoupling::Antisymmetric,
    ..BASE
};

/// Sackgassen-Ende mit genau einem Segment.
const END: StylePolicy = StylePolicy {
    support_shift: SupportOption::Group,
    support_rotate: SupportOption::Group,
    support_slope: SupportOption::Group,
    support_twist: SupportOption::Group,
    support_stretch: SupportOption::Group,
    support_slope_junction: SupportOption::Group,
    is_moveable: true,
    ..BASE
};

/// Freie Kreuzung: alles editierbar.
const CUSTOM: StylePolicy = StylePolicy {
    support_offset: SupportOption::All,
    support_shift: SupportOption::All,
    support_rotate: SupportOption::All,
    support_slope: SupportOption::All,
    support_twist: SupportOption::All,
    support_stretch: SupportOption::All,
    support_marking: SupportOption::All,
    support_collision: SupportOption::All,
    support_nodeless: SupportOption::All,
    support_slope_junction: SupportOption::Group,
    default_offset: 8.0,
    additional_offset: 2.0,
    is_moveable: true,
    twist_coupling: TwistCoupling::AntisymmetricExceptDecoration,
    ..BASE
};

impl NodeStyleType {
    pub const ALL: [NodeStyleType; 7] = [
        NodeStyleType::Middle,
        NodeStyleType::Bend,
        NodeStyleType::Stretch,
        NodeStyleType::Crossing,
        NodeStyleType::UTurn,
        NodeStyleType::End,
        NodeStyleType::Custom,
    ];

    pub fn policy(self) -> &'static StylePolicy {
        match self {
            NodeStyleType::Middle => &MIDDLE,
            NodeStyleType::Bend => &BEND,
            NodeStyleType::Stretch => &STRETCH,
            NodeStyleType::Crossing => &CROSSING,
            NodeStyleType::UTurn => &UTURN,
            NodeStyleType::End => &END,
            NodeStyleType::Custom => &CUSTOM,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NodeStyleType::Middle => "Middle",
            NodeStyleType::Bend => "Bend",
            NodeStyleType::Stretch => "Stretch",
            NodeStyleType::Crossing => "Crossing",
            NodeStyleType::UTurn => "UTurn",
            NodeStyleType::End => "End",
            NodeStyleType::Custom => "Custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.name() == name)
    }
}

/// Archetypen, die für eine Kreuzung mit `end_count` Segmenten wählbar sind.
pub fn available_styles(end_count: usize) -> &'static [NodeStyleType] {
    match end_count {
        0 | 1 => &[NodeStyleType::End],
        2 => &[
            NodeStyleType::Middle,
            NodeStyleType::Bend,
            NodeStyleType::Stretch,
            NodeStyleType::Crossing,
            NodeStyleType::UTurn,
            NodeStyleType::Custom,
        ],
        _ => &[NodeStyleType::Custom],
    }
}

/// Archetyp beim Anlegen einer Kreuzung.
///
/// `near_opposite`: zeigen die beiden Segmente fast exakt voneinander weg
/// (durchgehende Straße)?
pub fn default_style(end_count: usize, near_opposite: bool) -> NodeStyleType {
    match end_count {
        0 | 1 => NodeStyleType::End,
        2 => {
            if near_opposite {
                NodeStyleType::Middle
            } else {
                NodeStyleType::Bend
            }
        }
        _ => NodeStyleType::Custom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_option_flags() {
        assert!(SupportOption::All.individual());
        assert!(SupportOption::All.group());
        assert!(SupportOption::Individual.individual());
        assert!(!SupportOption::Individual.group());
        assert!(!SupportOption::None.any());
    }

    #[test]
    fn test_crossing_default_offset() {
        assert_eq!(NodeStyleType::Crossing.policy().default_offset, 2.0);
        assert!(NodeStyleType::Crossing.policy().only_keep_defaults);
    }

    #[test]
    fn test_middle_ist_nicht_beweglich_und_erzwingt_slope() {
        let policy = NodeStyleType::Middle.policy();
        assert!(!policy.is_moveable);
        assert_eq!(policy.force_slope_junction, Some(true));
        assert!(policy.slope_antisymmetric);
        assert_eq!(policy.support_offset, SupportOption::None);
    }

    #[test]
    fn test_end_hat_keinen_offset() {
        let policy = NodeStyleType::End.policy();
        assert_eq!(policy.support_offset, SupportOption::None);
        assert!(policy.support_rotate.group());
    }

    #[test]
    fn test_verfuegbare_archetypen_nach_segmentzahl() {
        assert_eq!(available_styles(1), &[NodeStyleType::End]);
        assert!(available_styles(2).contains(&NodeStyleType::UTurn));
        assert_eq!(available_styles(4), &[NodeStyleType::Custom]);
    }

    #[test]
    fn test_default_archetyp() {
        assert_eq!(default_style(1, false), NodeStyleType::End);
        assert_eq!(default_style(2, true), NodeStyleType::Middle);
        assert_eq!(default_style(2, false), NodeStyleType::Bend);
        assert_eq!(default_style(3, true), NodeStyleType::Custom);
    }

    #[test]
    fn test_namen_roundtrip() {
        for style in NodeStyleType::ALL {
            assert_eq!(NodeStyleType::from_name(style.name()), Some(style));
        }
        assert_eq!(NodeStyleType::from_name("Unbekannt"), None);
    }
}
