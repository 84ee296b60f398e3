use crate::api::Mapper;
use crate::io::Record;
use crate::reducers::format_number;

/// Pulls `(artist, duration)` out of a song row. Rows without both columns, or
/// whose duration is not a number, emit nothing.
#[derive(Clone, Copy, Debug)]
pub struct ArtistDurationMapper {
    artist_column: usize,
    duration_column: usize,
}

impl Default for ArtistDurationMapper {
    fn default() -> Self {
        Self::new(1, 2)
    }
}

impl ArtistDurationMapper {
    pub fn new(artist_column: usize, duration_column: usize) -> Self {
        Self {
            artist_column,
            duration_column,
        }
    }
}

impl Mapper for ArtistDurationMapper {
    fn do_map<F>(&self, record: &Record, emit: &mut F)
    where
        F: FnMut(String, String),
    {
        let Some(artist) = record.get(self.artist_column) else {
            return;
        };
        let Some(duration) = record
            .get(self.duration_column)
            .and_then(|d| d.trim().parse::<f64>().ok())
        else {
            return;
        };
        emit(artist.to_string(), format_number(duration));
    }
}
