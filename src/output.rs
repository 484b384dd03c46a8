use crate::error::DashResult;
use crate::types::{Complaint, MatrixRow};
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::{info, warn};

/// Approximate (lat, lon) centroids for Indian states and union
/// territories, keyed by lowercase name. Older spellings map to the same
/// point.
static STATE_CENTROIDS: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    HashMap::from([
        ("andhra pradesh", (15.9129, 79.7400)),
        ("arunachal pradesh", (28.2180, 94.7278)),
        ("assam", (26.2006, 92.9376)),
        ("bihar", (25.0961, 85.3131)),
        ("chhattisgarh", (21.2787, 81.8661)),
        ("goa", (15.2993, 74.1240)),
        ("gujarat", (22.2587, 71.1924)),
        ("haryana", (29.0588, 76.0856)),
        ("himachal pradesh", (31.1048, 77.1734)),
        ("jharkhand", (23.6102, 85.2799)),
        ("karnataka", (15.3173, 75.7139)),
        ("kerala", (10.8505, 76.2711)),
        ("madhya pradesh", (22.9734, 78.6569)),
        ("maharashtra", (19.7515, 75.7139)),
        ("manipur", (24.6637, 93.9063)),
        ("meghalaya", (25.4670, 91.3662)),
        ("mizoram", (23.1645, 92.9376)),
        ("nagaland", (26.1584, 94.5624)),
        ("odisha", (20.9517, 85.0985)),
        ("orissa", (20.9517, 85.0985)),
        ("punjab", (31.1471, 75.3412)),
        ("rajasthan", (27.0238, 74.2179)),
        ("sikkim", (27.5330, 88.5122)),
        ("tamil nadu", (11.1271, 78.6569)),
        ("telangana", (18.1124, 79.0193)),
        ("tripura", (23.9408, 91.9882)),
        ("uttar pradesh", (26.8467, 80.9462)),
        ("uttarakhand", (30.0668, 79.0193)),
        ("uttaranchal", (30.0668, 79.0193)),
        ("west bengal", (22.9868, 87.8550)),
        ("delhi", (28.7041, 77.1025)),
        ("new delhi", (28.6139, 77.2090)),
        ("nct of delhi", (28.7041, 77.1025)),
        ("jammu and kashmir", (33.7782, 76.5762)),
        ("jammu & kashmir", (33.7782, 76.5762)),
        ("ladakh", (34.1526, 77.5771)),
        ("puducherry", (11.9416, 79.8083)),
        ("pondicherry", (11.9416, 79.8083)),
        ("chandigarh", (30.7333, 76.7794)),
        ("andaman and nicobar islands", (11.7401, 92.6586)),
        ("dadra and nagar haveli and daman and diu", (20.3974, 72.8328)),
        ("lakshadweep", (10.5667, 72.6417)),
    ])
});

pub fn state_centroid(state: &str) -> Option<(f64, f64)> {
    STATE_CENTROIDS.get(state.trim().to_lowercase().as_str()).copied()
}

/// One complaint flattened to a single CSV line.
#[derive(Debug, Serialize)]
struct ComplaintCsvRow<'a> {
    id: &'a str,
    direction: &'a str,
    year: i32,
    state: &'a str,
    complainant: &'a str,
    complainant_affiliation: &'a str,
    complainant_category: &'a str,
    complainant_occupation: &'a str,
    accused: &'a str,
    accused_affiliation: &'a str,
    accused_category: &'a str,
    accused_occupation: &'a str,
    complaint_type: &'a str,
    complaint_type_normalized: &'a str,
    decision: &'a str,
    decision_parent: &'a str,
    decision_specific: &'a str,
    press_level: &'a str,
    complaint_text: &'a str,
}

impl<'a> From<&'a Complaint> for ComplaintCsvRow<'a> {
    fn from(c: &'a Complaint) -> Self {
        Self {
            id: &c.id,
            direction: c.direction.as_str(),
            year: c.year,
            state: &c.state,
            complainant: &c.complainant.name,
            complainant_affiliation: &c.complainant.affiliation,
            complainant_category: &c.complainant.category,
            complainant_occupation: &c.complainant.occupation,
            accused: &c.accused.name,
            accused_affiliation: &c.accused.affiliation,
            accused_category: &c.accused.category,
            accused_occupation: &c.accused.occupation,
            complaint_type: &c.complaint_type,
            complaint_type_normalized: &c.complaint_type_normalized,
            decision: &c.decision,
            decision_parent: &c.decision_parent,
            decision_specific: &c.decision_specific,
            press_level: &c.press_level,
            complaint_text: &c.complaint_text,
        }
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> DashResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> DashResult<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Filtered complaints as flat CSV. Fields containing commas, quotes or
/// newlines are quoted by the writer.
pub fn write_complaints_csv(path: &Path, complaints: &[Complaint]) -> DashResult<()> {
    let rows: Vec<ComplaintCsvRow<'_>> = complaints.iter().map(ComplaintCsvRow::from).collect();
    write_csv(path, &rows)?;
    info!("Wrote complaints CSV - path={}, rows={}", path.display(), rows.len());
    Ok(())
}

/// Matrix rows with one column per bucket.
pub fn write_matrix_csv(path: &Path, rows: &[MatrixRow]) -> DashResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut header = vec!["Label".to_string()];
    if let Some(first) = rows.first() {
        header.extend(first.buckets.iter().map(|b| b.bucket.clone()));
    }
    header.push("Total".to_string());
    header.push("Rate".to_string());
    wtr.write_record(&header)?;
    for row in rows {
        let mut rec = vec![row.label.clone()];
        rec.extend(row.buckets.iter().map(|b| b.count.to_string()));
        rec.push(row.total.to_string());
        rec.push(row.rate.clone());
        wtr.write_record(&rec)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Point features at each complaint's state centroid. Complaints whose
/// state has no known centroid are left out.
pub fn complaints_geojson(complaints: &[Complaint]) -> (Value, usize) {
    let mut skipped = 0usize;
    let features: Vec<Value> = complaints
        .iter()
        .filter_map(|c| {
            let Some((lat, lon)) = state_centroid(&c.state) else {
                skipped += 1;
                return None;
            };
            Some(json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [lon, lat] },
                "properties": {
                    "id": c.id,
                    "direction": c.direction.as_str(),
                    "year": c.year,
                    "state": c.state,
                    "complainant": c.complainant.name,
                    "accused": c.accused.name,
                    "complaint_type": c.complaint_type_normalized,
                    "decision": c.decision_parent,
                },
            }))
        })
        .collect();
    (json!({ "type": "FeatureCollection", "features": features }), skipped)
}

pub fn write_geojson(path: &Path, complaints: &[Complaint]) -> DashResult<()> {
    let (doc, skipped) = complaints_geojson(complaints);
    if skipped > 0 {
        warn!("GeoJSON export skipped complaints without a state centroid - skipped={}", skipped);
    }
    write_json(path, &doc)
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
