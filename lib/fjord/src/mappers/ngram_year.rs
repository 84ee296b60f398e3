use crate::api::Mapper;
use crate::constants::{DEFAULT_MAX_YEAR, DEFAULT_SUBSTRINGS};
use crate::io::Record;

/// Tags n-gram counts by `year,substring` for every configured substring found
/// in the n-gram's words.
///
/// Accepts unigram rows `word year match_count volume_count` and bigram rows
/// `word1 word2 year match_count volume_count`; every other arity is skipped.
/// The year must parse as an integer in `(0, max_year]`.
#[derive(Clone, Debug)]
pub struct NgramYearMapper {
    substrings: Vec<String>,
    max_year: i64,
}

impl Default for NgramYearMapper {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSTRINGS.iter().map(|s| s.to_string()).collect())
    }
}

impl NgramYearMapper {
    pub fn new(substrings: Vec<String>) -> Self {
        Self {
            substrings,
            max_year: DEFAULT_MAX_YEAR,
        }
    }

    pub fn with_max_year(mut self, max_year: i64) -> Self {
        self.max_year = max_year;
        self
    }

    pub fn substrings(&self) -> &[String] {
        &self.substrings
    }

    fn year_in_range(&self, year: &str) -> bool {
        match year.parse::<i64>() {
            Ok(y) => 0 < y && y <= self.max_year,
            Err(_) => false,
        }
    }
}

impl Mapper for NgramYearMapper {
    fn do_map<F>(&self, record: &Record, emit: &mut F)
    where
        F: FnMut(String, String),
    {
        let (words, year, count) = match record.fields() {
            [_word, year, count, _volume] => (&record.fields()[..1], year, count),
            [_w1, _w2, year, count, _volume] => (&record.fields()[..2], year, count),
            _ => return,
        };
        if !self.year_in_range(year) {
            return;
        }
        for sub in &self.substrings {
            for word in words {
                if word.contains(sub.as_str()) {
                    emit(format!("{year},{sub}"), count.clone());
                }
            }
        }
    }
}
