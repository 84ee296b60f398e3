//! Example mappers for the bundled demos.

mod artist_duration;
mod ngram_year;

pub use artist_duration::ArtistDurationMapper;
pub use ngram_year::NgramYearMapper;
