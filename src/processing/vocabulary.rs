//! Canonical skill vocabulary loaded from a CSV source

use crate::error::{Result, ScorerError};
use log::{debug, info, warn};
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Immutable set of normalized skill terms.
///
/// Stored ordered so every scan over the vocabulary is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    skills: BTreeSet<String>,
}

impl Vocabulary {
    /// Build from raw skill strings, lowercasing, trimming and dropping empties.
    pub fn from_terms<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let skills: BTreeSet<String> = terms
            .into_iter()
            .map(|s| normalize_term(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();

        if skills.is_empty() {
            return Err(ScorerError::VocabularyEmpty(
                "no usable skill entries".to_string(),
            ));
        }

        Ok(Self { skills })
    }

    /// Parse CSV content. Reads `column` when the first row names it; otherwise
    /// the file is taken as headerless and every row's first cell is a skill.
    pub fn from_csv_reader<R: Read>(reader: R, column: &str) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = csv_reader.records();
        let mut terms = Vec::new();

        let column_idx = match records.next().transpose()? {
            Some(first) => match first
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(column))
            {
                Some(idx) => idx,
                None => {
                    warn!(
                        "No '{}' column header in skill vocabulary, reading the first column from the first row",
                        column
                    );
                    if let Some(cell) = first.get(0) {
                        terms.push(cell.to_string());
                    }
                    0
                }
            },
            None => 0,
        };
        debug!("Reading skill vocabulary from column {}", column_idx);

        for record in records {
            let record = record?;
            if let Some(cell) = record.get(column_idx) {
                terms.push(cell.to_string());
            }
        }

        Self::from_terms(terms)
    }

    pub fn from_csv_path(path: &Path, column: &str) -> Result<Self> {
        if !path.exists() {
            return Err(ScorerError::VocabularyUnavailable(format!(
                "vocabulary file not found: {}",
                path.display()
            )));
        }

        let file = std::fs::File::open(path).map_err(|e| {
            ScorerError::VocabularyUnavailable(format!("{}: {}", path.display(), e))
        })?;

        Self::from_csv_reader(file, column).map_err(|e| match e {
            ScorerError::VocabularyEmpty(_) => {
                ScorerError::VocabularyEmpty(path.display().to_string())
            }
            other => other,
        })
    }

    pub fn contains(&self, term: &str) -> bool {
        self.skills.contains(term)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(|s| s.as_str())
    }

    /// Entries containing a space
    pub fn multiword_entries(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|s| s.contains(' '))
    }
}

/// Lowercase and trim a raw term.
pub fn normalize_term(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Loads the vocabulary once and hands out the shared instance.
pub struct VocabularyStore {
    source: PathBuf,
    column: String,
    cell: OnceCell<Arc<Vocabulary>>,
}

impl VocabularyStore {
    pub fn new(source: impl Into<PathBuf>, column: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            column: column.into(),
            cell: OnceCell::new(),
        }
    }

    /// Store that is already populated, for callers holding the terms in memory.
    pub fn preloaded(vocabulary: Vocabulary) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(Arc::new(vocabulary));
        Self {
            source: PathBuf::new(),
            column: String::new(),
            cell,
        }
    }

    /// First caller reads the source; concurrent callers wait and share the result.
    pub fn load(&self) -> Result<Arc<Vocabulary>> {
        self.cell
            .get_or_try_init(|| {
                let vocabulary = Vocabulary::from_csv_path(&self.source, &self.column)?;
                info!(
                    "Loaded {} skills from {}",
                    vocabulary.len(),
                    self.source.display()
                );
                Ok(Arc::new(vocabulary))
            })
            .map(Arc::clone)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_normalizes_and_deduplicates() {
        let vocab = Vocabulary::from_terms(["  Python ", "python", "SQL", "", "Machine Learning"]).unwrap();
        assert_eq!(vocab.len(), 3);
        assert!(vocab.contains("python"));
        assert!(vocab.contains("sql"));
        assert!(vocab.contains("machine learning"));
    }

    #[test]
    fn test_multiword_entries() {
        let vocab = Vocabulary::from_terms(["python", "machine learning", "data science"]).unwrap();
        let multi: Vec<&str> = vocab.multiword_entries().collect();
        assert_eq!(multi, vec!["data science", "machine learning"]);
    }

    #[test]
    fn test_csv_uses_named_column() {
        let csv = "id,skill\n1,Rust\n2,\n3, Docker \n";
        let vocab = Vocabulary::from_csv_reader(csv.as_bytes(), "skill").unwrap();
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["docker", "rust"]);
    }

    #[test]
    fn test_headerless_csv_keeps_first_row() {
        let vocab = Vocabulary::from_csv_reader("python\nsql\n".as_bytes(), "skill").unwrap();
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["python", "sql"]);
    }

    #[test]
    fn test_headerless_csv_reads_first_column() {
        let csv = "Kubernetes,devops\nTerraform,devops\n";
        let vocab = Vocabulary::from_csv_reader(csv.as_bytes(), "skill").unwrap();
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["kubernetes", "terraform"]);
    }

    #[test]
    fn test_header_match_is_case_insensitive() {
        let vocab = Vocabulary::from_csv_reader(" Skill \nRust\n".as_bytes(), "skill").unwrap();
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["rust"]);
    }

    #[test]
    fn test_empty_source_fails_fast() {
        let csv = "skill\n\n  \n";
        let err = Vocabulary::from_csv_reader(csv.as_bytes(), "skill").unwrap_err();
        assert!(matches!(err, ScorerError::VocabularyEmpty(_)));
    }

    #[test]
    fn test_missing_source_fails_fast() {
        let store = VocabularyStore::new("/nonexistent/skills.csv", "skill");
        let err = store.load().unwrap_err();
        assert!(err.is_fatal());
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_store_returns_shared_instance() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "skill\npython\nsql").unwrap();

        let store = VocabularyStore::new(file.path(), "skill");
        let first = store.load().unwrap();
        let second = store.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_concurrent_loads_share_one_instance() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "skill\ngo\nrust\nsql").unwrap();

        let store = Arc::new(VocabularyStore::new(file.path(), "skill"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.load().unwrap())
            })
            .collect();

        let loaded: Vec<Arc<Vocabulary>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for vocab in &loaded[1..] {
            assert!(Arc::ptr_eq(&loaded[0], vocab));
        }
    }
}
