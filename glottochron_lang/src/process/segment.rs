// Segment rewrite rules: `source > target / left _ right`.
//
// A rule replaces every occurrence of the source span (a sequence of
// feature classes) that sits between the left and right contexts with the
// target span. Each target class either rewrites one of the source
// segments (`Correspondence::Source`) or inserts a new segment
// (`Correspondence::Fresh`). Mapping two targets to one source splits a
// segment; mapping targets to sources out of order is metathesis.
//
// Scanning runs right to left and feeds: the right context is matched
// against output that has already been rewritten, while the left context
// and the source are matched against the input word. One pause sits
// beyond each edge so that `#` can anchor a context to the word boundary.
//
// Copy slots in a target take their values from a reference segment whose
// position is fixed by the rule's shape (see `ReferenceShape`). Any other
// shape is refused by `SegmentRule::new`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::class::FeatureClass;
use crate::error::ShapeError;
use crate::feature::{Length, Secondary};
use crate::sound::Sound;
use crate::word::Word;

/// Where a target segment comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correspondence {
    /// Rewrite the source segment at this index.
    Source(usize),
    /// Build a new segment from the target class alone.
    Fresh,
}

/// Which segment supplies copy-slot values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceShape {
    /// No target copies anything.
    None,
    /// Two-segment source, no context: each segment copies from the other.
    OtherSource,
    /// One-segment source with left context only: the segment to its left.
    LeftNeighbour,
    /// One-segment source with right context only: the segment to its
    /// right in the input word.
    RightNeighbour,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentRule {
    source: Vec<FeatureClass>,
    target: Vec<FeatureClass>,
    correspondence: Vec<Correspondence>,
    left: Vec<FeatureClass>,
    right: Vec<FeatureClass>,
    reference: ReferenceShape,
}

impl SegmentRule {
    pub fn new(
        source: Vec<FeatureClass>,
        target: Vec<FeatureClass>,
        correspondence: Vec<Correspondence>,
        left: Vec<FeatureClass>,
        right: Vec<FeatureClass>,
    ) -> Result<Self, ShapeError> {
        if correspondence.len() != target.len() {
            return Err(ShapeError::CorrespondenceCount {
                correspondences: correspondence.len(),
                targets: target.len(),
            });
        }
        for (class, link) in target.iter().zip(&correspondence) {
            match *link {
                Correspondence::Source(index) if index >= source.len() => {
                    return Err(ShapeError::IndexOutOfRange {
                        index,
                        len: source.len(),
                    });
                }
                Correspondence::Fresh if class.references_anything() => {
                    return Err(ShapeError::CopyIntoInsertion);
                }
                Correspondence::Fresh if !class.is_buildable() => {
                    return Err(ShapeError::IncompleteInsertion);
                }
                _ => {}
            }
        }

        let reference = if !target.iter().any(FeatureClass::references_anything) {
            ReferenceShape::None
        } else {
            match (source.len(), left.is_empty(), right.is_empty()) {
                (2, true, true) => ReferenceShape::OtherSource,
                (1, false, true) => ReferenceShape::LeftNeighbour,
                (1, true, false) => ReferenceShape::RightNeighbour,
                _ => return Err(ShapeError::UnreferencedCopy),
            }
        };

        Ok(SegmentRule {
            source,
            target,
            correspondence,
            left,
            right,
            reference,
        })
    }

    /// A rule that changes nothing.
    pub fn identity() -> Self {
        SegmentRule {
            source: Vec::new(),
            target: Vec::new(),
            correspondence: Vec::new(),
            left: Vec::new(),
            right: Vec::new(),
            reference: ReferenceShape::None,
        }
    }

    pub fn source(&self) -> &[FeatureClass] {
        &self.source
    }

    pub fn target(&self) -> &[FeatureClass] {
        &self.target
    }

    pub fn left(&self) -> &[FeatureClass] {
        &self.left
    }

    pub fn right(&self) -> &[FeatureClass] {
        &self.right
    }

    pub fn correspondence(&self) -> &[Correspondence] {
        &self.correspondence
    }

    /// Deletes segments and every context class can be satisfied by a
    /// word edge, so the rule could erase a whole word.
    pub fn is_unchecked_deletion(&self) -> bool {
        !self.source.is_empty()
            && self.target.is_empty()
            && self.left.iter().all(FeatureClass::matches_silence)
            && self.right.iter().all(FeatureClass::matches_silence)
    }

    pub fn apply(&self, word: &Word) -> Word {
        if self.source.is_empty() && self.target.is_empty() {
            return word.clone();
        }
        let width = self.source.len();
        // Output is built back to front.
        let mut reversed: Vec<Sound> = Vec::with_capacity(word.len() + self.target.len());
        let mut end = word.len();
        loop {
            if self.matches_at(word, &reversed, end) {
                let start = end - width;
                for (class, link) in self.target.iter().zip(&self.correspondence).rev() {
                    let produced = match *link {
                        Correspondence::Source(index) => {
                            let base = word.get((start + index) as isize);
                            let reference = self.reference_for(word, start, index);
                            Some(class.instantiate(&base, reference.as_ref()))
                        }
                        Correspondence::Fresh => class.build(),
                    };
                    reversed.extend(produced);
                }
                end = start;
                // An insertion consumes nothing, so step past one segment
                // before trying again.
                if width > 0 {
                    continue;
                }
            }
            if end == 0 {
                break;
            }
            end -= 1;
            reversed.push(word.get(end as isize));
        }
        reversed.reverse();
        Word::new(reversed)
    }

    /// Whether the source span ending just before `end` matches, together
    /// with both contexts.
    fn matches_at(&self, word: &Word, reversed: &[Sound], end: usize) -> bool {
        let width = self.source.len();
        if end < width {
            return false;
        }
        let start = end - width;
        // One pause sentinel is allowed beyond each edge.
        if self.left.len() > start + 1 || self.right.len() > reversed.len() + 1 {
            return false;
        }
        if width == 1 && !self.left.is_empty() && !self.right.is_empty() {
            let candidate = word.get(start as isize);
            if candidate.has(Length::Long) || candidate.has(Secondary::Pharyngealized) {
                return false;
            }
        }
        let left_start = start as isize - self.left.len() as isize;
        self.source
            .iter()
            .enumerate()
            .all(|(k, class)| class.matches(&word.get((start + k) as isize)))
            && self
                .left
                .iter()
                .enumerate()
                .all(|(k, class)| class.matches(&word.get(left_start + k as isize)))
            && self.right.iter().enumerate().all(|(k, class)| {
                let sound = reversed
                    .len()
                    .checked_sub(k + 1)
                    .map_or(Sound::Pause, |i| reversed[i]);
                class.matches(&sound)
            })
    }

    fn reference_for(&self, word: &Word, start: usize, index: usize) -> Option<Sound> {
        let start = start as isize;
        match self.reference {
            ReferenceShape::None => None,
            ReferenceShape::OtherSource => Some(word.get(start + 1 - index as isize)),
            ReferenceShape::LeftNeighbour => Some(word.get(start - 1)),
            ReferenceShape::RightNeighbour => Some(word.get(start + 1)),
        }
    }
}

impl fmt::Display for SegmentRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |classes: &[FeatureClass]| {
            classes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        };
        let target = self
            .target
            .iter()
            .zip(&self.correspondence)
            .map(|(class, link)| match link {
                Correspondence::Source(index) => format!("{class}{index}"),
                Correspondence::Fresh => format!("{class}*"),
            })
            .collect::<Vec<_>>()
            .join(" ");
        write!(
            f,
            "{} > {} / {} _ {}",
            join(&self.source),
            target,
            join(&self.left),
            join(&self.right)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{
        CopySlot, Feature, Manner, Nasality, Place, Quality, Syllabicity, Voicing,
    };
    use crate::ipa::default_ipa_table;

    fn word(text: &str) -> Word {
        default_ipa_table().decode(text).unwrap()
    }

    fn text(word: &Word) -> String {
        default_ipa_table().encode(word)
    }

    fn class(present: &[Feature]) -> FeatureClass {
        FeatureClass::with_present(present.to_vec())
    }

    fn one_to_one(
        source: FeatureClass,
        target: FeatureClass,
        left: Vec<FeatureClass>,
        right: Vec<FeatureClass>,
    ) -> SegmentRule {
        SegmentRule::new(
            vec![source],
            vec![target],
            vec![Correspondence::Source(0)],
            left,
            right,
        )
        .unwrap()
    }

    #[test]
    fn test_intervocalic_voicing() {
        let rule = one_to_one(
            class(&[Quality::Obstruent.into()]),
            class(&[Voicing::Voiced.into()]),
            vec![class(&[Quality::Vocoid.into()])],
            vec![class(&[Quality::Vocoid.into()])],
        );
        assert_eq!(text(&rule.apply(&word("tadalatat"))), "tadaladat");
    }

    #[test]
    fn test_devoicing_before_voiceless() {
        let rule = one_to_one(
            class(&[Quality::Obstruent.into()]),
            class(&[Voicing::Tenuis.into()]),
            vec![],
            vec![FeatureClass::new(vec![], vec![Voicing::Voiced.into()], vec![])],
        );
        assert_eq!(text(&rule.apply(&word("pads"))), "pats");
        assert_eq!(text(&rule.apply(&word("pada"))), "pada");
    }

    #[test]
    fn test_final_devoicing() {
        let rule = one_to_one(
            class(&[Quality::Obstruent.into()]),
            class(&[Voicing::Tenuis.into()]),
            vec![],
            vec![FeatureClass::boundary()],
        );
        assert_eq!(text(&rule.apply(&word("bad"))), "bat");
        assert_eq!(text(&rule.apply(&word("bada"))), "bada");
    }

    #[test]
    fn test_right_context_sees_rewritten_output() {
        // Obstruents voice before a voiced segment. Scanning right to left
        // lets the change spread leftwards through a cluster.
        let rule = one_to_one(
            class(&[Quality::Obstruent.into()]),
            class(&[Voicing::Voiced.into()]),
            vec![],
            vec![class(&[Voicing::Voiced.into()])],
        );
        assert_eq!(text(&rule.apply(&word("aftsa"))), "avdza");
    }

    #[test]
    fn test_left_neighbour_reference() {
        let rule = one_to_one(
            class(&[Syllabicity::Nonsyllabic.into()]),
            FeatureClass::new(vec![], vec![], vec![CopySlot::Secondary]),
            vec![class(&[Quality::Vowel.into()]), class(&[Quality::Coronal.into()])],
            vec![],
        );
        assert_eq!(text(&rule.apply(&word("uɫtw"))), "uɫtˠw");
    }

    #[test]
    fn test_right_neighbour_reference() {
        let rule = one_to_one(
            class(&[Quality::Obstruent.into()]),
            FeatureClass::new(vec![], vec![], vec![CopySlot::Voicing]),
            vec![],
            vec![class(&[Quality::Obstruent.into()]), class(&[Quality::Vowel.into()])],
        );
        assert_eq!(text(&rule.apply(&word("stɡa"))), "sdɡa");
    }

    #[test]
    fn test_place_swap_between_two_sources() {
        let copy_place = FeatureClass::new(vec![], vec![], vec![CopySlot::Place]);
        let rule = SegmentRule::new(
            vec![FeatureClass::default(), FeatureClass::default()],
            vec![copy_place.clone(), copy_place.clone()],
            vec![Correspondence::Source(0), Correspondence::Source(1)],
            vec![],
            vec![],
        )
        .unwrap();
        assert_eq!(text(&rule.apply(&word("ms"))), "nɸ");

        let swapped = SegmentRule::new(
            vec![FeatureClass::default(), FeatureClass::default()],
            vec![copy_place.clone(), copy_place],
            vec![Correspondence::Source(1), Correspondence::Source(0)],
            vec![],
            vec![],
        )
        .unwrap();
        assert_eq!(text(&swapped.apply(&word("ms"))), "ɸn");
    }

    #[test]
    fn test_metathesis() {
        let rule = SegmentRule::new(
            vec![class(&[Quality::Vowel.into()]), class(&[Quality::Liquid.into()])],
            vec![FeatureClass::default(), FeatureClass::default()],
            vec![Correspondence::Source(1), Correspondence::Source(0)],
            vec![class(&[Quality::Obstruent.into(), Quality::Occlusive.into()])],
            vec![],
        )
        .unwrap();
        assert_eq!(text(&rule.apply(&word("ɡar"))), "ɡra");
        assert_eq!(text(&rule.apply(&word("sar"))), "sar");
    }

    #[test]
    fn test_epenthesis() {
        let schwa = class(&[
            Manner::OpenMid.into(),
            Place::Central.into(),
            Syllabicity::Unstressed.into(),
        ]);
        let sibilant = class(&[Quality::Sibilant.into()]);
        let rule = SegmentRule::new(
            vec![],
            vec![schwa],
            vec![Correspondence::Fresh],
            vec![sibilant.clone()],
            vec![sibilant],
        )
        .unwrap();
        assert_eq!(text(&rule.apply(&word("assa"))), "asəsa");
        assert_eq!(text(&rule.apply(&word("asa"))), "asa");
    }

    #[test]
    fn test_insertion_at_word_edges() {
        let glottal = class(&[Manner::Stop.into(), Place::Glottal.into(), Voicing::Tenuis.into()]);
        let rule = SegmentRule::new(
            vec![],
            vec![glottal],
            vec![Correspondence::Fresh],
            vec![FeatureClass::boundary()],
            vec![class(&[Quality::Vowel.into()])],
        )
        .unwrap();
        assert_eq!(text(&rule.apply(&word("ata"))), "ʔata");
        assert_eq!(text(&rule.apply(&word("ta"))), "ta");
    }

    #[test]
    fn test_deletion_with_context() {
        let rule = SegmentRule::new(
            vec![class(&[Manner::Fricative.into(), Place::Glottal.into()])],
            vec![],
            vec![],
            vec![class(&[Quality::Vowel.into()])],
            vec![class(&[Quality::Vowel.into()])],
        )
        .unwrap();
        assert!(!rule.is_unchecked_deletion());
        assert_eq!(text(&rule.apply(&word("ahaha"))), "aaa");
    }

    #[test]
    fn test_unchecked_deletion_detected() {
        let rule = SegmentRule::new(
            vec![class(&[Quality::Vowel.into()])],
            vec![],
            vec![],
            vec![FeatureClass::boundary()],
            vec![],
        )
        .unwrap();
        assert!(rule.is_unchecked_deletion());
    }

    #[test]
    fn test_split_into_two() {
        // A nasal vowel becomes vowel plus nasal consonant.
        let nasal_vowel = FeatureClass::new(
            vec![Quality::Vowel.into(), Quality::Nasal.into()],
            vec![],
            vec![],
        );
        let rule = SegmentRule::new(
            vec![nasal_vowel],
            vec![
                class(&[Nasality::Oral.into()]),
                class(&[
                    Manner::Nasal.into(),
                    Place::Velar.into(),
                    Syllabicity::Nonsyllabic.into(),
                ]),
            ],
            vec![Correspondence::Source(0), Correspondence::Source(0)],
            vec![],
            vec![],
        )
        .unwrap();
        let input = word("ta\u{303}");
        assert_eq!(text(&rule.apply(&input)), "taŋ");
    }

    #[test]
    fn test_geminates_resist_medial_rules() {
        let rule = one_to_one(
            class(&[Quality::Obstruent.into()]),
            class(&[Voicing::Voiced.into()]),
            vec![class(&[Quality::Vowel.into()])],
            vec![class(&[Quality::Vowel.into()])],
        );
        assert_eq!(text(&rule.apply(&word("atːa"))), "atːa");
    }

    #[test]
    fn test_no_match_is_identity() {
        let rule = one_to_one(
            class(&[Manner::Click.into()]),
            class(&[Voicing::Voiced.into()]),
            vec![],
            vec![],
        );
        let input = word("patakana");
        assert_eq!(rule.apply(&input), input);
        assert_eq!(SegmentRule::identity().apply(&input), input);
    }

    #[test]
    fn test_shape_errors() {
        let copy = FeatureClass::new(vec![], vec![], vec![CopySlot::Place]);
        let err = SegmentRule::new(
            vec![FeatureClass::default()],
            vec![copy.clone()],
            vec![Correspondence::Source(0)],
            vec![],
            vec![],
        );
        assert_eq!(err, Err(ShapeError::UnreferencedCopy));

        let err = SegmentRule::new(
            vec![FeatureClass::default()],
            vec![FeatureClass::default()],
            vec![Correspondence::Source(3)],
            vec![],
            vec![],
        );
        assert_eq!(err, Err(ShapeError::IndexOutOfRange { index: 3, len: 1 }));

        let err = SegmentRule::new(
            vec![],
            vec![class(&[Manner::Stop.into()])],
            vec![Correspondence::Fresh],
            vec![],
            vec![],
        );
        assert_eq!(err, Err(ShapeError::IncompleteInsertion));
    }

    #[test]
    fn test_display() {
        let rule = one_to_one(
            class(&[Quality::Obstruent.into()]),
            class(&[Voicing::Voiced.into()]),
            vec![],
            vec![FeatureClass::boundary()],
        );
        assert_eq!(rule.to_string(), "[+OBSTRUENT] > [+VOICED]0 /  _ [-SPOKEN]");
    }
}
