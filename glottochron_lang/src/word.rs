// Word: an immutable sequence of sounds.
//
// Every process takes a `&Word` and returns a new one. Both edges of a
// word are implicitly bordered by a pause; `get` returns `Sound::Pause`
// for any out-of-range index so context matching never has to special-case
// the boundaries.

use serde::{Deserialize, Serialize};

use crate::feature::Quality;
use crate::sound::Sound;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Word {
    segments: Vec<Sound>,
}

impl Word {
    pub fn new(segments: Vec<Sound>) -> Self {
        Word { segments }
    }

    pub fn segments(&self) -> &[Sound] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segment at `index`, or a pause outside the word. Signed so that
    /// callers can look one step left of the start.
    pub fn get(&self, index: isize) -> Sound {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.segments.get(i))
            .copied()
            .unwrap_or(Sound::Pause)
    }

    /// Indices of the syllabic segments, left to right.
    pub fn nuclei(&self) -> Vec<usize> {
        self.segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.has(Quality::Syllabic))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sound> {
        self.segments.iter()
    }
}

impl From<Vec<Sound>> for Word {
    fn from(segments: Vec<Sound>) -> Self {
        Word::new(segments)
    }
}

impl FromIterator<Sound> for Word {
    fn from_iter<I: IntoIterator<Item = Sound>>(iter: I) -> Self {
        Word::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Word {
    type Item = &'a Sound;
    type IntoIter = std::slice::Iter<'a, Sound>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::default_ipa_table;

    #[test]
    fn test_get_pads_with_pauses() {
        let word = default_ipa_table().decode("ta").unwrap();
        assert_eq!(word.len(), 2);
        assert_eq!(word.get(-1), Sound::Pause);
        assert_eq!(word.get(2), Sound::Pause);
        assert!(!word.get(0).is_pause());
    }

    #[test]
    fn test_nuclei() {
        let word = default_ipa_table().decode("tanta").unwrap();
        assert_eq!(word.nuclei(), vec![1, 4]);
        assert!(Word::default().nuclei().is_empty());
    }

    #[test]
    fn test_collect() {
        let word: Word = vec![Sound::Pause, Sound::Pause].into_iter().collect();
        assert_eq!(word.len(), 2);
        assert_eq!((&word).into_iter().count(), 2);
    }
}

#[cfg(test)]
pub(crate) mod strategy {
    use proptest::prelude::*;

    use super::Word;
    use crate::class::is_legal;
    use crate::ipa::default_ipa_table;
    use crate::sound::Sound;

    /// Words of up to `max_len` legal tabulated sounds, with the odd pause.
    pub(crate) fn arb_word(max_len: usize) -> impl Strategy<Value = Word> {
        let table = default_ipa_table();
        let sounds: Vec<Sound> = table
            .iter()
            .filter_map(|(symbol, _)| table.symbol(symbol))
            .filter(|sound| sound.phone().is_some_and(is_legal))
            .chain([Sound::Pause])
            .collect();
        prop::collection::vec(prop::sample::select(sounds), 0..=max_len).prop_map(Word::new)
    }
}
