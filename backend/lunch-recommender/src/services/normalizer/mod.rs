// ============================================
// Text Normalizer (餐點名稱正規化)
// ============================================
//
// Turns a free-form meal name into a set of canonical tokens:
// 1. Split on word boundaries
// 2. Resolve each word's lemma (case-insensitive dictionary lookup)
// 3. Drop words without a lemma
// 4. Lowercase, drop stopwords, deduplicate
//
// Dictionary and stopword list are loaded once and never mutated,
// so a single normalizer can be shared across requests.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w+\b").expect("word pattern is a valid regex"));

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resource {0} contains no usable entries")]
    Empty(PathBuf),
}

pub type Result<T> = std::result::Result<T, ResourceError>;

/// Morphological lookup from an inflected word to its base form
pub trait Lemmatizer: Send + Sync {
    fn lemma(&self, word: &str) -> Option<&str>;
}

/// Word → lemma table read from a `word<TAB>lemma` file
#[derive(Debug, Clone, Default)]
pub struct LemmaDictionary {
    entries: HashMap<String, String>,
}

impl LemmaDictionary {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = read_resource(path)?;
        let dictionary = Self::parse(&contents);

        if dictionary.is_empty() {
            return Err(ResourceError::Empty(path.to_path_buf()));
        }

        info!(
            path = %path.display(),
            entries = dictionary.len(),
            "Loaded lemma dictionary"
        );

        Ok(dictionary)
    }

    /// Parse dictionary text. The first lemma listed for a word wins;
    /// blank lines, `#` comments and lines without a tab are skipped.
    pub fn parse(contents: &str) -> Self {
        Self::from_pairs(contents.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let (word, lemma) = line.split_once('\t')?;
            let (word, lemma) = (word.trim(), lemma.trim());
            if word.is_empty() || lemma.is_empty() {
                return None;
            }
            Some((word, lemma))
        }))
    }

    pub fn from_pairs<I, W, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (W, L)>,
        W: AsRef<str>,
        L: AsRef<str>,
    {
        let mut entries = HashMap::new();
        for (word, lemma) in pairs {
            entries
                .entry(word.as_ref().to_lowercase())
                .or_insert_with(|| lemma.as_ref().to_string());
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lemmatizer for LemmaDictionary {
    fn lemma(&self, word: &str) -> Option<&str> {
        self.entries.get(&word.to_lowercase()).map(String::as_str)
    }
}

/// Words that carry no signal about a meal (articles, prepositions, ...)
#[derive(Debug, Clone, Default)]
pub struct StopwordList {
    words: HashSet<String>,
}

impl StopwordList {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let stopwords = Self::parse(&read_resource(path)?);

        info!(
            path = %path.display(),
            words = stopwords.len(),
            "Loaded stopword list"
        );

        Ok(stopwords)
    }

    /// One stopword per line; surrounding whitespace and blank lines ignored
    pub fn parse(contents: &str) -> Self {
        Self::from_words(contents.lines())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

pub struct TextNormalizer {
    lemmatizer: Box<dyn Lemmatizer>,
    stopwords: StopwordList,
}

impl TextNormalizer {
    pub fn new<L>(lemmatizer: L, stopwords: StopwordList) -> Self
    where
        L: Lemmatizer + 'static,
    {
        Self {
            lemmatizer: Box::new(lemmatizer),
            stopwords,
        }
    }

    /// Load the dictionary and stopword files. Missing files are fatal.
    pub fn from_files<P, Q>(dictionary_path: P, stopwords_path: Q) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let dictionary = LemmaDictionary::load(dictionary_path)?;
        let stopwords = StopwordList::load(stopwords_path)?;
        Ok(Self::new(dictionary, stopwords))
    }

    /// Canonical token set of a meal name
    pub fn normalize(&self, name: &str) -> BTreeSet<String> {
        let mut tokens = BTreeSet::new();

        for word in WORD_PATTERN.find_iter(name).map(|m| m.as_str()) {
            let Some(lemma) = self.lemmatizer.lemma(word) else {
                debug!(word = word, "No lemma found, dropping word");
                continue;
            };

            let lemma = lemma.to_lowercase();
            if !self.stopwords.contains(&lemma) {
                tokens.insert(lemma);
            }
        }

        tokens
    }
}

fn read_resource(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| ResourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
