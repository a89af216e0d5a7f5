// FeatureClass: a predicate over sounds that doubles as a template.
//
// As a predicate, a class requires every `present` feature and forbids
// every `absent` one. As a template, `instantiate` pushes a base sound into
// the class: contextual features are resolved against the base, the
// present features are applied, copy slots are filled from a reference
// sound, and the result is repaired by phonotactic normalization.
//
// Normalization is two ordered tables below: `REPAIRS` snaps illegal
// combinations to the nearest legal one, and `IMPOSSIBLE` lists the
// combinations that have no legal neighbour. A change that hits an
// impossible combination, or whose repair would undo a dimension the rule
// set literally (e.g. `+CENTRAL` on a stop, which would snap back to
// velar), is vetoed and `instantiate` returns the base unchanged. There
// are no partial applications.
//
// See also: `sound.rs` for the predicates, `process/segment.rs` for how
// rules pick base and reference sounds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::feature::{
    Articulator, CopySlot, Dimension, Feature, Laterality, Manner, Nasality, Place, Quality,
    Resolution, Secondary, Syllabicity, Voicing, resolve_contextual,
};
use crate::sound::{Phone, Sound};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureClass {
    pub present: Vec<Feature>,
    pub absent: Vec<Feature>,
    pub copy_from: Vec<CopySlot>,
}

impl FeatureClass {
    pub fn new(present: Vec<Feature>, absent: Vec<Feature>, copy_from: Vec<CopySlot>) -> Self {
        FeatureClass {
            present,
            absent,
            copy_from,
        }
    }

    pub fn with_present(present: Vec<Feature>) -> Self {
        FeatureClass {
            present,
            ..Default::default()
        }
    }

    /// The word-boundary class, `#`.
    pub fn boundary() -> Self {
        FeatureClass {
            absent: vec![Quality::Spoken.into()],
            ..Default::default()
        }
    }

    /// The class that pins down a specific sound: its manner, place,
    /// voicing, laterality, syllabicity and secondary articulation.
    /// Used for bare IPA symbols in rule text.
    pub fn literal(phone: &Phone) -> Self {
        FeatureClass::with_present(vec![
            phone.manner.into(),
            phone.place.into(),
            phone.voicing.into(),
            phone.laterality.into(),
            phone.syllabicity.into(),
            phone.secondary.into(),
        ])
    }

    pub fn matches(&self, sound: &Sound) -> bool {
        self.present.iter().all(|&f| sound.has(f)) && !self.absent.iter().any(|&f| sound.has(f))
    }

    /// True iff a pause can satisfy this class.
    pub fn matches_silence(&self) -> bool {
        self.present.is_empty()
    }

    pub fn references_anything(&self) -> bool {
        !self.copy_from.is_empty()
    }

    /// Whether the template names both a manner and a place, which a
    /// freshly inserted segment needs.
    pub fn is_buildable(&self) -> bool {
        let has = |dimension| self.present.iter().any(|f| f.dimension() == Some(dimension));
        has(Dimension::Manner) && has(Dimension::Place)
    }

    /// Push `base` into this class. Returns `base` unchanged if the change
    /// is vetoed. `reference` supplies the values for copy slots.
    pub fn instantiate(&self, base: &Sound, reference: Option<&Sound>) -> Sound {
        if self.present.is_empty() && self.copy_from.is_empty() {
            return *base;
        }
        let Sound::Spoken(phone) = base else {
            return *base;
        };
        match self.apply(*phone, reference) {
            Some(changed) => Sound::Spoken(changed),
            None => *base,
        }
    }

    /// Build a new segment from scratch, for insertions. `None` if the
    /// class does not describe a complete legal sound.
    pub fn build(&self) -> Option<Sound> {
        let manner = self.present.iter().find_map(|f| match f {
            Feature::Manner(m) => Some(*m),
            _ => None,
        })?;
        let place = self.present.iter().find_map(|f| match f {
            Feature::Place(p) => Some(*p),
            _ => None,
        })?;
        self.apply(Phone::new(manner, place), None).map(Sound::Spoken)
    }

    fn apply(&self, base: Phone, reference: Option<&Sound>) -> Option<Phone> {
        let mut phone = base;
        let mut pinned: Vec<Dimension> = Vec::new();

        // Contextual features resolve against the untouched base.
        let context = Sound::Spoken(base);
        for &feature in &self.present {
            let resolved = match resolve_contextual(feature, &context) {
                Resolution::Feature(resolved) => resolved,
                Resolution::NeedsDiphthongization => Voicing::Ejective.into(),
                Resolution::Unresolvable => return None,
            };
            match resolved {
                Feature::Quality(quality) => apply_quality(&mut phone, quality)?,
                primitive => {
                    phone.assign(primitive);
                    if let Some(dimension) = primitive.dimension().filter(|_| feature == primitive)
                    {
                        pinned.push(dimension);
                    }
                }
            }
        }

        if !self.copy_from.is_empty() {
            let source = reference.and_then(Sound::phone)?;
            for slot in &self.copy_from {
                phone.copy_dimension(source, slot.dimension());
                pinned.retain(|&d| d != slot.dimension());
            }
        }

        let before = phone;
        normalize(&mut phone);
        if pinned.iter().any(|&d| phone.differs_in(&before, d)) {
            return None;
        }
        if IMPOSSIBLE.iter().any(|(_, check)| check(&phone)) {
            return None;
        }
        Some(phone)
    }
}

/// Map an appliable quality onto primitive values. `None` vetoes the
/// change.
fn apply_quality(phone: &mut Phone, quality: Quality) -> Option<()> {
    let lax = phone.manner.is_lax();
    let vocoid = phone.is(Quality::Vocoid);
    match quality {
        Quality::Palatal => phone.place = Place::Palatal,
        Quality::Velar => phone.place = Place::Velar,
        Quality::Alveolar => phone.place = Place::Alveolar,
        Quality::Nasal => phone.manner = Manner::Nasal,
        Quality::High => phone.manner = if lax { Manner::NearClose } else { Manner::Close },
        Quality::Mid => phone.manner = if lax { Manner::OpenMid } else { Manner::CloseMid },
        Quality::Low => phone.manner = if lax { Manner::NearOpen } else { Manner::Open },
        Quality::Tense if vocoid => {
            phone.manner = match phone.manner {
                Manner::NearClose => Manner::Close,
                Manner::OpenMid => Manner::CloseMid,
                Manner::NearOpen => Manner::Open,
                other => other,
            }
        }
        Quality::Lax if vocoid => {
            phone.manner = match phone.manner {
                Manner::Close => Manner::NearClose,
                Manner::CloseMid => Manner::OpenMid,
                Manner::Open => Manner::NearOpen,
                other => other,
            }
        }
        Quality::Syllabic => {
            if phone.syllabicity == Syllabicity::Nonsyllabic {
                phone.syllabicity = Syllabicity::Unstressed;
            }
        }
        _ => return None,
    }
    Some(())
}

// ---------------------------------------------------------------------------
// Phonotactic normalization
// ---------------------------------------------------------------------------

type Repair = fn(&mut Phone);
type Check = fn(&Phone) -> bool;

/// Ordered repairs. Later entries assume earlier ones have run.
const REPAIRS: &[(&str, Repair)] = &[
    ("uvular vowels are velar", |p| {
        if p.place == Place::Uvular && p.manner.sonority() >= 4.0 {
            p.place = Place::Velar;
        }
    }),
    ("central consonants are velar", |p| {
        if p.place == Place::Central && p.manner.sonority() < 4.0 {
            p.place = Place::Velar;
        }
    }),
    ("near-close vowels are front or back by rounding", |p| {
        if p.manner == Manner::NearClose {
            p.place = if p.secondary == Secondary::Labialized {
                Place::Velar
            } else {
                Place::Palatal
            };
        }
    }),
    ("rounded low vowels are back", |p| {
        if p.manner.sonority() >= 4.2 && p.secondary == Secondary::Labialized {
            p.place = Place::Velar;
        }
    }),
    ("rounded near-open vowels are open-mid", |p| {
        if p.manner == Manner::NearOpen && p.secondary == Secondary::Labialized {
            p.manner = Manner::OpenMid;
        }
    }),
    ("back near-open vowels are central", |p| {
        if p.manner == Manner::NearOpen && p.place == Place::Velar {
            p.place = Place::Central;
        }
    }),
    ("stops and nasals are median", |p| {
        if matches!(p.manner, Manner::Stop | Manner::Nasal) {
            p.laterality = Laterality::Median;
        }
    }),
    ("secondary articulation cannot repeat the primary", clear_redundant_secondary),
    ("nasal consonants are not also nasalized", |p| {
        if p.manner == Manner::Nasal && p.nasality == Nasality::Nasalized {
            p.nasality = Nasality::Oral;
        }
    }),
    ("postalveolar stops are affricates", |p| {
        if p.manner == Manner::Stop && p.place == Place::Postalveolar {
            p.manner = Manner::Affricate;
        }
    }),
    ("non-sibilant and lateral front coronals are dental", |p| {
        let front = matches!(p.place, Place::Dental | Place::Alveolar | Place::Postalveolar);
        let sibilant = matches!(p.manner, Manner::Fricative | Manner::Affricate);
        if front && (!sibilant || p.laterality == Laterality::Lateral) {
            p.place = Place::Dental;
        }
    }),
    ("secondary articulation cannot repeat the primary", clear_redundant_secondary),
    ("clicks have four places", |p| {
        if p.manner != Manner::Click {
            return;
        }
        p.place = if p.laterality == Laterality::Lateral
            || p.place.articulator() == Articulator::Dorsum
            || p.place == Place::Postalveolar
        {
            Place::Palatal
        } else if p.place.articulator() == Articulator::Lips {
            Place::Bilabial
        } else if p.place == Place::Retroflex {
            Place::Retroflex
        } else {
            Place::Alveolar
        };
    }),
];

fn clear_redundant_secondary(p: &mut Phone) {
    let articulator = p.place.articulator();
    let redundant = match p.secondary {
        Secondary::Labialized => articulator == Articulator::Lips,
        Secondary::Palatalized => matches!(p.place, Place::Postalveolar | Place::Palatal),
        Secondary::Velarized => p.place == Place::Velar,
        Secondary::Pharyngealized => articulator == Articulator::Pharynx,
        Secondary::Unrounded => false,
    };
    if redundant {
        p.secondary = Secondary::Unrounded;
    }
}

/// Combinations with no legal neighbour.
const IMPOSSIBLE: &[(&str, Check)] = &[
    ("nasal pharyngeals", |p| {
        p.is(Quality::Nasal) && p.place.articulator() == Articulator::Pharynx
    }),
    ("voiced glottals", |p| {
        p.place == Place::Glottal
            && matches!(p.voicing, Voicing::Voiced | Voicing::Breathy | Voicing::Ejective)
    }),
    ("taps off the tongue blade or teeth", |p| {
        p.manner == Manner::Tap
            && p.place.articulator() != Articulator::Tongue
            && p.place != Place::Labiodental
    }),
    ("trills off the lips, teeth or uvula", |p| {
        p.manner == Manner::Trill
            && !matches!(p.place, Place::Bilabial | Place::Dental | Place::Uvular)
    }),
    ("laterals off the tongue", |p| {
        p.laterality == Laterality::Lateral
            && !matches!(p.place.articulator(), Articulator::Tongue | Articulator::Dorsum)
    }),
    ("open vowels off the dorsum", |p| {
        p.manner.sonority() > 4.0 && p.place.articulator() != Articulator::Dorsum
    }),
];

/// Run every repair in order.
pub fn normalize(phone: &mut Phone) {
    for (_, repair) in REPAIRS {
        repair(phone);
    }
}

/// Whether the phone is already normal and possible.
pub fn is_legal(phone: &Phone) -> bool {
    let mut normal = *phone;
    normalize(&mut normal);
    normal == *phone && !IMPOSSIBLE.iter().any(|(_, check)| check(phone))
}

impl fmt::Display for FeatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .present
            .iter()
            .map(|feature| format!("+{feature}"))
            .chain(self.absent.iter().map(|feature| format!("-{feature}")))
            .chain(self.copy_from.iter().map(|slot| format!("±{slot}")))
            .collect();
        write!(f, "[{}]", parts.join(" "))
    }
}
