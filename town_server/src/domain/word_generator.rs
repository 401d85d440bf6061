use std::path::Path;
use std::sync::Arc;

use crate::domain::errors::GameError;
use crate::domain::ports::RandomSource;

/// Random word supplier backed by a line-delimited corpus.
///
/// The corpus must be loaded with [`WordGenerator::load_words`] before any word is drawn.
pub struct WordGenerator {
    words: Option<Vec<String>>,
    random: Arc<dyn RandomSource>,
}

impl WordGenerator {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self {
            words: None,
            random,
        }
    }

    /// Reads the whole corpus into memory, one word per non-blank line.
    pub fn load_words(&mut self, path: &Path) -> Result<(), GameError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GameError::WordListLoad(format!("{}: {e}", path.display())))?;

        let words: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if words.is_empty() {
            return Err(GameError::WordListLoad(format!(
                "{}: no words found",
                path.display()
            )));
        }

        self.words = Some(words);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.words.is_some()
    }

    pub fn next_word(&self) -> Result<String, GameError> {
        let words = self.words.as_ref().ok_or(GameError::WordListNotLoaded)?;
        // Guard against a misbehaving source rather than panicking on the index.
        let index = self.random.index(words.len()).min(words.len() - 1);
        Ok(words[index].clone())
    }
}

impl std::fmt::Debug for WordGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordGenerator")
            .field("words", &self.words.as_ref().map(Vec::len))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{ScriptedRandom, write_word_list};

    #[test]
    fn when_not_loaded_then_next_word_fails() {
        let generator = WordGenerator::new(Arc::new(ScriptedRandom::new(vec![0])));

        assert_eq!(generator.next_word(), Err(GameError::WordListNotLoaded));
    }

    #[test]
    fn when_loaded_then_draws_the_index_chosen_by_the_random_source() {
        let path = write_word_list(&["ollie", "  kickflip ", "", "wheelie"]);
        let mut generator = WordGenerator::new(Arc::new(ScriptedRandom::new(vec![1, 2, 0])));

        generator.load_words(&path).expect("word list should load");

        assert_eq!(generator.next_word().unwrap(), "kickflip");
        assert_eq!(generator.next_word().unwrap(), "wheelie");
        assert_eq!(generator.next_word().unwrap(), "ollie");
    }

    #[test]
    fn when_corpus_is_missing_then_load_fails() {
        let mut generator = WordGenerator::new(Arc::new(ScriptedRandom::new(vec![0])));

        let result = generator.load_words(Path::new("/definitely/not/here/words.txt"));

        assert!(matches!(result, Err(GameError::WordListLoad(_))));
        assert!(!generator.is_loaded());
    }

    #[test]
    fn when_corpus_is_blank_then_load_fails() {
        let path = write_word_list(&["", "   "]);
        let mut generator = WordGenerator::new(Arc::new(ScriptedRandom::new(vec![0])));

        assert!(matches!(
            generator.load_words(&path),
            Err(GameError::WordListLoad(_))
        ));
    }
}
