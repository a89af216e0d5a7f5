// Syllabification by sonority peaks.
//
// A segment is a nucleus if it is at least as sonorous as both neighbours.
// On a plateau the bias breaks the tie: with a negative bias the leftmost
// segment of a falling plateau loses, with a positive bias the rightmost
// segment of a rising plateau loses. A nucleus below `minimum_sonority`
// cannot carry a syllable by itself, so a schwa is inserted before it and
// it becomes a consonant.
//
// Stress survives syllabification: a nucleus keeps its stress level, and a
// primary stress on a segment that stops being syllabic moves to the next
// nucleus (or, failing that, to the last syllabic segment of the word).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::feature::{
    Laterality, Length, Manner, Nasality, Place, Quality, Secondary, Syllabicity, Voicing,
};
use crate::sound::{Phone, Sound};
use crate::word::Word;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyllabifyRule {
    pub minimum_sonority: f64,
    /// Plateau tie-break: negative, zero or positive.
    pub bias: i8,
}

impl SyllabifyRule {
    pub fn new(minimum_sonority: f64, bias: i8) -> Self {
        SyllabifyRule {
            minimum_sonority,
            bias,
        }
    }

    fn is_nucleus(&self, left: f64, centre: f64, right: f64) -> bool {
        centre >= left
            && centre >= right
            && !(self.bias < 0 && centre == left && centre > right)
            && !(self.bias > 0 && centre > left && centre == right)
    }

    pub fn apply(&self, word: &Word) -> Word {
        let mut output: Vec<Sound> = Vec::with_capacity(word.len() + 1);
        let mut orphaned_primary = false;
        for (i, sound) in word.iter().enumerate() {
            let Sound::Spoken(phone) = sound else {
                output.push(*sound);
                continue;
            };
            let i = i as isize;
            let left = word.get(i - 1).sonority();
            let right = word.get(i + 1).sonority();
            let centre = phone.sonority();

            if !self.is_nucleus(left, centre, right) {
                if phone.syllabicity == Syllabicity::PrimaryStressed {
                    orphaned_primary = true;
                }
                output.push(sound.with(Syllabicity::Nonsyllabic));
                continue;
            }

            let level = if orphaned_primary {
                orphaned_primary = false;
                Syllabicity::PrimaryStressed
            } else if phone.syllabicity != Syllabicity::Nonsyllabic {
                phone.syllabicity
            } else {
                Syllabicity::Unstressed
            };

            if centre < self.minimum_sonority {
                output.push(Sound::Spoken(schwa(level)));
                output.push(sound.with(Syllabicity::Nonsyllabic));
            } else {
                output.push(sound.with(level));
            }
        }

        if orphaned_primary {
            if let Some(last) = output.iter_mut().rev().find(|s| s.has(Quality::Syllabic)) {
                *last = last.with(Syllabicity::PrimaryStressed);
            }
        }
        Word::new(output)
    }
}

/// The epenthetic vowel.
fn schwa(level: Syllabicity) -> Phone {
    Phone {
        manner: Manner::OpenMid,
        place: Place::Central,
        voicing: Voicing::Voiced,
        syllabicity: level,
        length: Length::Short,
        laterality: Laterality::Median,
        secondary: Secondary::Unrounded,
        nasality: Nasality::Oral,
    }
}

impl fmt::Display for SyllabifyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "syllabify (minimum sonority {}, bias {})",
            self.minimum_sonority, self.bias
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::default_ipa_table;

    fn run(rule: SyllabifyRule, input: &str) -> String {
        let table = default_ipa_table();
        table.encode(&rule.apply(&table.decode(input).unwrap()))
    }

    #[test]
    fn test_right_bias() {
        assert_eq!(run(SyllabifyRule::new(4.0, 1), "jwtjtntwj"), "jutitəntwi");
    }

    #[test]
    fn test_no_bias() {
        assert_eq!(run(SyllabifyRule::new(4.0, 0), "jwtjtntwj"), "iutitəntui");
    }

    #[test]
    fn test_left_bias() {
        assert_eq!(run(SyllabifyRule::new(4.0, -1), "jwtjtntwj"), "iwtitəntuj");
    }

    #[test]
    fn test_syllabic_consonants_when_allowed() {
        assert_eq!(run(SyllabifyRule::new(2.0, 0), "tnta"), "tn\u{329}ta");
    }

    #[test]
    fn test_weak_glide_nucleus_takes_a_schwa() {
        let table = default_ipa_table();
        let output = SyllabifyRule::new(6.0, 0).apply(&table.decode("tjt").unwrap());
        assert_eq!(table.encode(&output), "təjt");
        assert!(output.segments()[1].has(Syllabicity::Unstressed));
        assert!(output.segments()[2].has(Syllabicity::Nonsyllabic));
    }

    #[test]
    fn test_stress_level_is_kept() {
        assert_eq!(run(SyllabifyRule::new(4.0, 0), "tˈata"), "tˈata");
    }

    #[test]
    fn test_orphaned_primary_moves_on() {
        // The stressed vowel is demoted to a glide before a more sonorous
        // vowel; its stress passes to that vowel.
        assert_eq!(run(SyllabifyRule::new(4.0, 0), "tˈia"), "tjˈa");
    }

    #[test]
    fn test_orphaned_primary_falls_back_to_last_nucleus() {
        assert_eq!(run(SyllabifyRule::new(4.0, 0), "tataˈi"), "tatˈaj");
    }

    #[test]
    fn test_pauses_are_boundaries() {
        assert_eq!(run(SyllabifyRule::new(4.0, 0), "ja#aj"), "ja#aj");
    }

    #[test]
    fn test_no_epenthesis_between_vowel_peaks() {
        let table = default_ipa_table();
        let input = table.decode("taltanka").unwrap();
        let output = SyllabifyRule::new(4.0, 0).apply(&input);
        assert_eq!(output, input);
    }
}
