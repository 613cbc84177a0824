//! File-per-city cache of rendered weather tables.
//!
//! Entries live in a single directory as `<CITY>_<lat>_<lon>.txt`. The file's
//! modification time is the only freshness signal; entries are overwritten in
//! place and never deleted.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use serde::{Deserialize, Serialize};

use crate::{
    City,
    error::{Result, WeatherError},
    freshness::FreshnessPolicy,
    model::Coordinates,
};

const EXTENSION: &str = "txt";

/// How a cache filename is matched against a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CityMatch {
    /// The city part of `<CITY>_<lat>_<lon>.txt` must equal the city.
    #[default]
    Exact,
    /// Any filename containing the city matches, so `NY` finds `NEWYORK_...`.
    Substring,
}

impl CityMatch {
    fn matches(self, file_name: &str, city: &City) -> bool {
        match self {
            CityMatch::Exact => match parse_city(file_name) {
                Some(name) => name == city.as_str(),
                None => {
                    tracing::warn!(file_name, "skipping unparsable cache filename");
                    false
                }
            },
            CityMatch::Substring => file_name.contains(city.as_str()),
        }
    }
}

/// A cache file located for a city.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub path: PathBuf,
    pub modified: SystemTime,
}

#[derive(Debug, Clone)]
pub struct CacheIndex {
    dir: PathBuf,
    city_match: CityMatch,
}

impl CacheIndex {
    pub fn new(dir: impl Into<PathBuf>, city_match: CityMatch) -> Self {
        Self {
            dir: dir.into(),
            city_match,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Filename a fresh entry gets: `<CITY>_<lat>_<lon>.txt`.
    pub fn file_name(city: &City, coords: Coordinates) -> String {
        format!("{city}_{coords}.{EXTENSION}")
    }

    /// The single entry for `city`, if any.
    ///
    /// Filenames are scanned in sorted order and the first match wins, so the
    /// result does not depend on directory iteration order. A missing cache
    /// directory means no entries.
    pub fn find(&self, city: &City) -> Result<Option<CacheEntry>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(WeatherError::io(&self.dir, e)),
        };

        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| WeatherError::io(&self.dir, e))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => tracing::warn!(?name, "skipping non UTF-8 cache filename"),
            }
        }
        names.sort();

        let found = names
            .into_iter()
            .find(|name| self.city_match.matches(name, city));
        let Some(name) = found else {
            tracing::debug!(%city, "no cache entry");
            return Ok(None);
        };

        let path = self.dir.join(name);
        let modified = fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .map_err(|e| WeatherError::io(&path, e))?;

        tracing::debug!(%city, path = %path.display(), "cache entry found");
        Ok(Some(CacheEntry { path, modified }))
    }

    pub fn has_entry(&self, city: &City) -> Result<bool> {
        Ok(self.find(city)?.is_some())
    }

    /// Missing entries are stale; existing ones are judged by `policy`.
    pub fn is_stale(
        &self,
        city: &City,
        policy: &FreshnessPolicy,
        now: SystemTime,
    ) -> Result<bool> {
        Ok(match self.find(city)? {
            Some(entry) => policy.is_stale(entry.modified, now),
            None => true,
        })
    }

    /// Store `text` for `city`, overwriting the existing entry in place or
    /// creating `<CITY>_<lat>_<lon>.txt`. Returns the path written.
    pub fn write(&self, city: &City, coords: Coordinates, text: &str) -> Result<PathBuf> {
        let path = match self.find(city)? {
            Some(entry) => entry.path,
            None => {
                fs::create_dir_all(&self.dir).map_err(|e| WeatherError::io(&self.dir, e))?;
                self.dir.join(Self::file_name(city, coords))
            }
        };

        fs::write(&path, text).map_err(|e| WeatherError::io(&path, e))?;

        tracing::info!(%city, path = %path.display(), "cache entry written");
        Ok(path)
    }

    /// Contents of the entry for `city`, verbatim.
    pub fn read(&self, city: &City) -> Result<Option<String>> {
        let Some(entry) = self.find(city)? else {
            return Ok(None);
        };

        Ok(Some(self.read_at(&entry.path)?))
    }

    /// Contents of a cache file already located by [`find`](Self::find) or [`write`](Self::write).
    pub fn read_at(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| WeatherError::io(path, e))
    }
}

/// City part of `<CITY>_<lat>_<lon>.txt`, split on the last two underscores.
fn parse_city(file_name: &str) -> Option<&str> {
    let stem = file_name.strip_suffix(EXTENSION)?.strip_suffix('.')?;
    let mut parts = stem.rsplitn(3, '_');
    let lon = parts.next()?;
    let lat = parts.next()?;
    let city = parts.next()?;

    if lat.parse::<f64>().is_err() || lon.parse::<f64>().is_err() || city.is_empty() {
        return None;
    }
    Some(city)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn city(name: &str) -> City {
        City::new(name).expect("valid city")
    }

    fn index(city_match: CityMatch) -> (CacheIndex, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let index = CacheIndex::new(dir.path().join("data"), city_match);
        (index, dir)
    }

    fn touch(index: &CacheIndex, name: &str) {
        fs::create_dir_all(index.dir()).expect("mkdir");
        fs::write(index.dir().join(name), "table").expect("write");
    }

    #[test]
    fn file_name_concatenates_city_and_coordinates() {
        let name = CacheIndex::file_name(&city("paris"), Coordinates::new(48.8566, 2.3522));
        assert_eq!(name, "PARIS_48.8566_2.3522.txt");
    }

    #[test]
    fn parse_city_handles_underscores_and_negatives() {
        assert_eq!(parse_city("PARIS_48.8566_2.3522.txt"), Some("PARIS"));
        assert_eq!(parse_city("NEW_YORK_40.7128_-74.006.txt"), Some("NEW_YORK"));
        assert_eq!(parse_city("SAO PAULO_-23.55_-46.63.txt"), Some("SAO PAULO"));
        assert_eq!(parse_city("PARIS.txt"), None);
        assert_eq!(parse_city("PARIS_a_b.txt"), None);
        assert_eq!(parse_city("PARIS_1_2.json"), None);
    }

    #[test]
    fn missing_directory_has_no_entries() {
        let (index, _dir) = index(CityMatch::Exact);

        assert!(!index.has_entry(&city("paris")).expect("scan"));
        assert_eq!(index.read(&city("paris")).expect("read"), None);
    }

    #[test]
    fn missing_entry_is_stale() {
        let (index, _dir) = index(CityMatch::Exact);
        let stale = index
            .is_stale(&city("paris"), &FreshnessPolicy::default(), SystemTime::now())
            .expect("scan");
        assert!(stale);
    }

    #[test]
    fn staleness_follows_entry_age() {
        let (index, _dir) = index(CityMatch::Exact);
        let paris = city("paris");
        index
            .write(&paris, Coordinates::new(48.8566, 2.3522), "table")
            .expect("write");
        let policy = FreshnessPolicy::default();

        let now = SystemTime::now();
        let two_hours = now + Duration::from_secs(2 * 60 * 60);
        let four_hours = now + Duration::from_secs(4 * 60 * 60);
        assert!(!index.is_stale(&paris, &policy, now).expect("scan"));
        assert!(!index.is_stale(&paris, &policy, two_hours).expect("scan"));
        assert!(index.is_stale(&paris, &policy, four_hours).expect("scan"));
    }

    #[test]
    fn write_then_read_reproduces_text() {
        let (index, _dir) = index(CityMatch::Exact);
        let paris = city("paris");
        let text = "Weather for PARIS\n+-----+\n| Now |\n+-----+\n";

        let path = index
            .write(&paris, Coordinates::new(48.8566, 2.3522), text)
            .expect("write");

        assert_eq!(path, index.dir().join("PARIS_48.8566_2.3522.txt"));
        assert_eq!(index.read(&paris).expect("read").as_deref(), Some(text));
    }

    #[test]
    fn write_overwrites_existing_entry_in_place() {
        let (index, _dir) = index(CityMatch::Exact);
        let london = city("london");
        let first = index
            .write(&london, Coordinates::new(51.5074, -0.1278), "old")
            .expect("write");

        // Geocoding may drift; the existing filename is kept regardless.
        let second = index
            .write(&london, Coordinates::new(51.5072, -0.1276), "new")
            .expect("write");

        assert_eq!(first, second);
        assert_eq!(fs::read_dir(index.dir()).expect("list").count(), 1);
        assert_eq!(index.read(&london).expect("read").as_deref(), Some("new"));
    }

    #[test]
    fn exact_match_ignores_longer_names() {
        let (index, _dir) = index(CityMatch::Exact);
        touch(&index, "NEWYORK_40.7128_-74.006.txt");

        assert!(!index.has_entry(&city("NY")).expect("scan"));
        assert!(index.has_entry(&city("newyork")).expect("scan"));
    }

    #[test]
    fn substring_match_collides_on_shared_text() {
        let (index, _dir) = index(CityMatch::Substring);
        touch(&index, "NEWYORK_40.7128_-74.006.txt");

        assert!(index.has_entry(&city("NY")).expect("scan"));
    }

    #[test]
    fn first_sorted_match_wins() {
        let (index, _dir) = index(CityMatch::Substring);
        touch(&index, "YORK_53.96_-1.08.txt");
        touch(&index, "NEWYORK_40.7128_-74.006.txt");

        let entry = index.find(&city("york")).expect("scan").expect("entry");
        assert_eq!(entry.path, index.dir().join("NEWYORK_40.7128_-74.006.txt"));
    }

    #[test]
    fn subdirectories_are_not_entries() {
        let (index, _dir) = index(CityMatch::Substring);
        fs::create_dir_all(index.dir().join("PARIS_1_2.txt")).expect("mkdir");

        assert!(!index.has_entry(&city("paris")).expect("scan"));
    }

    #[test]
    fn unparsable_names_are_skipped_in_exact_mode() {
        let (index, _dir) = index(CityMatch::Exact);
        touch(&index, "PARIS.txt");
        touch(&index, "PARIS_north_south.txt");

        assert!(!index.has_entry(&city("paris")).expect("scan"));

        touch(&index, "PARIS_48.8566_2.3522.txt");
        let entry = index.find(&city("paris")).expect("scan").expect("entry");
        assert_eq!(entry.path, index.dir().join("PARIS_48.8566_2.3522.txt"));
    }

    #[test]
    fn written_entries_stay_inside_the_directory() {
        let (index, dir) = index(CityMatch::Exact);

        let path = index
            .write(&city("san jose"), Coordinates::new(37.3382, -121.8863), "table")
            .expect("write");

        assert!(path.starts_with(index.dir()));
        assert_eq!(fs::read_dir(dir.path()).expect("list").count(), 1);
        assert!(City::new("../escape").is_err());
    }
}
