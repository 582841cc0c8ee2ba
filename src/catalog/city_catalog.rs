use crate::catalog::error::CatalogError;
use crate::monitor::LatLon;
use log::{info, warn};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 3] = ["city", "lat", "lon"];

/// One entry of the city catalog: a unique, trimmed name and its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub name: String,
    pub location: LatLon,
}

/// A static mapping from city name to coordinates, loaded once per process.
///
/// Constructed at startup from a CSV file with the required columns
/// `city`, `lat`, `lon` and passed by reference to every component that needs
/// it; immutable after load. Loading is best-effort: a missing or malformed
/// file degrades to an empty catalog rather than aborting the process
/// (use [`CityCatalog::try_load`] when that should be a hard error).
#[derive(Debug, Clone, Default)]
pub struct CityCatalog {
    cities: Vec<City>,
    by_name: HashMap<String, LatLon>,
}

impl CityCatalog {
    /// Loads the catalog, degrading to an empty catalog on any failure.
    pub fn load(path: impl AsRef<Path>) -> CityCatalog {
        match Self::try_load(path.as_ref()) {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Falling back to an empty city catalog: {}", e);
                CityCatalog::default()
            }
        }
    }

    /// Loads the catalog, surfacing failures as [`CatalogError`].
    pub fn try_load(path: impl AsRef<Path>) -> Result<CityCatalog, CatalogError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::FileNotFound(path.to_path_buf()));
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| CatalogError::CsvRead(path.to_path_buf(), e))?
            .finish()
            .map_err(|e| CatalogError::CsvRead(path.to_path_buf(), e))?;

        for column in REQUIRED_COLUMNS {
            if df.column(column).is_err() {
                return Err(CatalogError::MissingColumn {
                    path: path.to_path_buf(),
                    column: column.to_string(),
                });
            }
        }

        let catalog = Self::from_frame(&df)?;
        info!(
            "Loaded {} cities from catalog {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    fn from_frame(df: &DataFrame) -> Result<CityCatalog, CatalogError> {
        let typed_f64 = |column: &str| -> Result<Float64Chunked, CatalogError> {
            df.column(column)
                .and_then(|c| c.cast(&DataType::Float64))
                .and_then(|c| c.f64().map(|ca| ca.clone()))
                .map_err(|e| CatalogError::ColumnType {
                    column: column.to_string(),
                    source: e,
                })
        };
        let names = df
            .column("city")
            .and_then(|c| c.cast(&DataType::String))
            .and_then(|c| c.str().map(|ca| ca.clone()))
            .map_err(|e| CatalogError::ColumnType {
                column: "city".to_string(),
                source: e,
            })?;
        let lats = typed_f64("lat")?;
        let lons = typed_f64("lon")?;

        let mut cities = Vec::new();
        let mut by_name = HashMap::new();
        for ((name, lat), lon) in names.iter().zip(lats.iter()).zip(lons.iter()) {
            let (Some(name), Some(lat), Some(lon)) = (name, lat, lon) else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() || !lat.is_finite() || !lon.is_finite() {
                continue;
            }
            // Identity is the name; first occurrence wins.
            if by_name.contains_key(name) {
                continue;
            }
            let location = LatLon(lat, lon);
            by_name.insert(name.to_string(), location);
            cities.push(City {
                name: name.to_string(),
                location,
            });
        }
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(CityCatalog { cities, by_name })
    }

    /// All cities, sorted by name.
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    /// Coordinates of a city by its (trimmed) name.
    pub fn coords(&self, name: &str) -> Option<LatLon> {
        self.by_name.get(name.trim()).copied()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_catalog(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_trims_and_sorts() {
        let file = write_catalog(
            "city,lat,lon\n  New Delhi ,28.6139,77.2090\nAgra,27.1767,78.0081\n",
        );
        let catalog = CityCatalog::try_load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.cities()[0].name, "Agra");
        assert_eq!(catalog.cities()[1].name, "New Delhi");
        let delhi = catalog.coords("New Delhi").unwrap();
        assert_eq!(delhi, LatLon(28.6139, 77.2090));
    }

    #[test]
    fn duplicate_names_keep_first_occurrence() {
        let file = write_catalog("city,lat,lon\nPune,18.52,73.85\nPune,0.0,0.0\n");
        let catalog = CityCatalog::try_load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.coords("Pune"), Some(LatLon(18.52, 73.85)));
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let catalog = CityCatalog::load("/definitely/not/here.csv");
        assert!(catalog.is_empty());
        assert!(matches!(
            CityCatalog::try_load("/definitely/not/here.csv"),
            Err(CatalogError::FileNotFound(_))
        ));
    }

    #[test]
    fn missing_required_column_degrades_to_empty() {
        let file = write_catalog("city,latitude,longitude\nPune,18.52,73.85\n");
        assert!(CityCatalog::load(file.path()).is_empty());
        assert!(matches!(
            CityCatalog::try_load(file.path()),
            Err(CatalogError::MissingColumn { column, .. }) if column == "lat"
        ));
    }

    #[test]
    fn unknown_city_has_no_coords() {
        let file = write_catalog("city,lat,lon\nPune,18.52,73.85\n");
        let catalog = CityCatalog::try_load(file.path()).unwrap();
        assert_eq!(catalog.coords("Atlantis"), None);
    }

    #[test]
    fn rows_with_missing_fields_are_skipped() {
        let file = write_catalog("city,lat,lon\nPune,18.52,73.85\n,19.0,74.0\nNagpur,,79.08\n");
        let catalog = CityCatalog::try_load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
    }
}
