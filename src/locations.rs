use std::path::Path;

/// One row of the locations table: a year and the place visited that year.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub year: i32,
    pub place: String,
}

/// User-curated year → place table, loaded from a comma-separated text file.
///
/// Parsing is best effort: rows without an integer year and a non-empty
/// place are skipped, duplicate years are kept, and insertion order is
/// preserved (it breaks ties during caption resolution).
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    records: Vec<LocationRecord>,
}

impl LocationTable {
    /// Load a table from a file. An unreadable file logs a warning and
    /// yields an empty table.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) => {
                log::warn!("Cannot read locations file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Parse rows of the form `year,place` (fields beyond the second are
    /// ignored).
    pub fn parse(text: &str) -> Self {
        let mut records = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let mut fields = line.split(',');
            let year = fields.next().and_then(|f| f.trim().parse::<i32>().ok());
            let place = fields.next().map(str::trim);

            match (year, place) {
                (Some(year), Some(place)) if !place.is_empty() => {
                    records.push(LocationRecord {
                        year,
                        place: place.to_string(),
                    });
                }
                _ if line.trim().is_empty() => {}
                _ => {
                    log::debug!("Skipping malformed locations row {}: {line:?}", number + 1);
                }
            }
        }
        Self { records }
    }

    /// All places recorded for a year, in table order.
    pub fn lookup_by_year(&self, year: i32) -> Vec<&str> {
        self.records
            .iter()
            .filter(|record| record.year == year)
            .map(|record| record.place.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
