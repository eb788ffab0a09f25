use crate::config::AppConfig;
use crate::types::ViolationRecord;
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use geo::Point;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

/// Loads violation records from the configured CSV file.
pub fn load_data(config: &AppConfig) -> Result<Vec<ViolationRecord>> {
    println!("Loading data from {:?}...", config.input.data_csv);
    let file = File::open(&config.input.data_csv)
        .with_context(|| format!("Failed to open CSV file: {:?}", config.input.data_csv))?;
    let records = read_records(file)?;
    println!("Loaded {} records", records.len());
    Ok(records)
}

/// Parses violation records from any CSV reader. A header row is required
/// and must contain `longitude` and `latitude` columns; every other
/// column is carried through as an opaque popup field.
///
/// Coordinate cells that fail numeric coercion become NaN, so malformed
/// rows survive to assignment and are reported there as unassignable
/// instead of vanishing at load time.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ViolationRecord>> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();

    let lon_idx = headers
        .iter()
        .position(|h| h == "longitude")
        .ok_or_else(|| anyhow!("Column 'longitude' not found in CSV"))?;
    let lat_idx = headers
        .iter()
        .position(|h| h == "latitude")
        .ok_or_else(|| anyhow!("Column 'latitude' not found in CSV"))?;

    let mut records = Vec::new();

    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let longitude: f64 = record.get(lon_idx).unwrap_or("").trim().parse().unwrap_or(f64::NAN);
        let latitude: f64 = record.get(lat_idx).unwrap_or("").trim().parse().unwrap_or(f64::NAN);

        let mut fields = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if idx == lon_idx || idx == lat_idx {
                continue;
            }
            fields.insert(
                header.to_string(),
                record.get(idx).unwrap_or("").to_string(),
            );
        }

        records.push(ViolationRecord {
            point: Point::new(longitude, latitude),
            fields,
        });
    }

    Ok(records)
}
