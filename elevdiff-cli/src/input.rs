use anyhow::{bail, Context, Result};
use elevdiff::Point;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::InputArgs;

/// Load points from the input file, picking the format from its extension.
pub fn load(args: &InputArgs) -> Result<Vec<Point>> {
    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let points = match extension.as_str() {
        "json" => elevdiff::point::load_points(&args.input)
            .with_context(|| format!("Failed to load locations from {}", args.input.display()))?,
        "geojson" => elevdiff::geojson::load_geojson_points(&args.input)
            .with_context(|| format!("Failed to load GeoJSON from {}", args.input.display()))?,
        "csv" => load_csv(&args.input, &args.lat_col, &args.lon_col, &args.z_col)?,
        _ => bail!(
            "Unsupported file format: {}. Use .json, .geojson or .csv",
            extension
        ),
    };

    tracing::info!(
        input = %args.input.display(),
        points = points.len(),
        "Loaded input points"
    );
    Ok(points)
}

fn load_csv(input: &Path, lat_col: &str, lon_col: &str, z_col: &str) -> Result<Vec<Point>> {
    let file = File::open(input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    // Find column indices
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("Column '{}' not found in CSV", name))
    };
    let lat_idx = column(lat_col)?;
    let lon_idx = column(lon_col)?;
    let z_idx = column(z_col)?;

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let field = |idx: usize, what: &str| -> Result<f64> {
            record
                .get(idx)
                .with_context(|| format!("Row {}: missing {}", row + 1, what))?
                .trim()
                .parse()
                .with_context(|| format!("Row {}: invalid {}", row + 1, what))
        };
        let point = Point::new(
            field(lat_idx, "latitude")?,
            field(lon_idx, "longitude")?,
            field(z_idx, "reference elevation")?,
        );
        point
            .validate()
            .with_context(|| format!("Row {}", row + 1))?;
        points.push(point);
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn args(input: &Path) -> InputArgs {
        InputArgs {
            input: input.to_path_buf(),
            lat_col: "lat".to_string(),
            lon_col: "lon".to_string(),
            z_col: "z".to_string(),
        }
    }

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "points.csv", "name,lat,lon,z\na,35.5,138.5,500\nb,35.6, 138.6,750.5\n");
        let points = load(&args(&path)).unwrap();
        assert_eq!(
            points,
            vec![Point::new(35.5, 138.5, 500.0), Point::new(35.6, 138.6, 750.5)]
        );
    }

    #[test]
    fn test_load_csv_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "points.csv", "lat,lon\n35.5,138.5\n");
        let err = load(&args(&path)).unwrap_err();
        assert!(err.to_string().contains("'z'"));
    }

    #[test]
    fn test_load_json() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "points.json",
            r#"{"locations": [{"lat": 1.0, "lon": 2.0, "z": 3.0}]}"#,
        );
        assert_eq!(load(&args(&path)).unwrap(), vec![Point::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_load_geojson() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "track.geojson",
            r#"{"type": "LineString", "coordinates": [[2.0, 1.0, 3.0], [2.5, 1.5, 4.0]]}"#,
        );
        assert_eq!(load(&args(&path)).unwrap().len(), 2);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "points.txt", "");
        assert!(load(&args(&path)).is_err());
    }
}
