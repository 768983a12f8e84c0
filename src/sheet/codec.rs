//! Spreadsheet row format for inspection records.
//!
//! Grouped cells hold one slot per line:
//!
//! ```text
//! cell  := ""  |  line ("\n" line)*
//! line  := position ": " value  |  position
//! ```
//!
//! Decoding splits on newline, drops blank lines, and splits each line on its
//! first colon; both halves are trimmed. A line without a colon is a bare
//! position with an empty value. In link cells the value is a URL or the
//! [`NO_PHOTO`] placeholder, which decodes to `None`. Values never contain a
//! newline: [`sanitize`] folds line breaks into spaces before encoding.

use std::collections::HashMap;

use crate::models::{CreatedBy, InspectionRecord, TyreRecord, VehicleImageRecord};

/// Written in a link cell line for a slot without an uploaded photo.
pub const NO_PHOTO: &str = "(no photo)";

pub const COL_RECORD_ID: &str = "Record ID";
pub const COL_TIMESTAMP: &str = "Timestamp";
pub const COL_VEHICLE_NUMBER: &str = "Vehicle Number";
pub const COL_BATTERY1_NUMBER: &str = "Battery1 Number";
pub const COL_BATTERY1_LINK: &str = "Battery1 Image Link";
pub const COL_BATTERY2_NUMBER: &str = "Battery2 Number";
pub const COL_BATTERY2_LINK: &str = "Battery2 Image Link";
pub const COL_ODOMETER_VALUE: &str = "Odometer Value";
pub const COL_ODOMETER_LINK: &str = "Odometer Image Link";
pub const COL_PRIME_READABLE: &str = "Prime Tyres (Readable)";
pub const COL_PRIME_LINKS: &str = "Prime Tyre Links";
pub const COL_TRAILER_READABLE: &str = "Trailer Tyres (Readable)";
pub const COL_TRAILER_LINKS: &str = "Trailer Tyre Links";
pub const COL_VEHICLE_READABLE: &str = "Vehicle Images (Readable)";
pub const COL_VEHICLE_LINKS: &str = "Vehicle Image Links";
pub const COL_CREATED_BY_USER_ID: &str = "CreatedBy_userId";
pub const COL_CREATED_BY_EMAIL: &str = "CreatedBy_email";
pub const COL_CREATED_BY_NAME: &str = "CreatedBy_name";
pub const COL_SUBMISSION_TOKEN: &str = "Submission Token";

/// Column order of appended rows; also the header row written to an empty sheet.
pub const HEADER: [&str; 19] = [
    COL_RECORD_ID,
    COL_TIMESTAMP,
    COL_VEHICLE_NUMBER,
    COL_BATTERY1_NUMBER,
    COL_BATTERY1_LINK,
    COL_BATTERY2_NUMBER,
    COL_BATTERY2_LINK,
    COL_ODOMETER_VALUE,
    COL_ODOMETER_LINK,
    COL_PRIME_READABLE,
    COL_PRIME_LINKS,
    COL_TRAILER_READABLE,
    COL_TRAILER_LINKS,
    COL_VEHICLE_READABLE,
    COL_VEHICLE_LINKS,
    COL_CREATED_BY_USER_ID,
    COL_CREATED_BY_EMAIL,
    COL_CREATED_BY_NAME,
    COL_SUBMISSION_TOKEN,
];

pub fn header_row() -> Vec<String> {
    HEADER.iter().map(|h| h.to_string()).collect()
}

/// Older sheets were edited by hand; accept the header spellings seen there.
const ALIASES: &[(&str, &[&str])] = &[
    (COL_RECORD_ID, &["record_id"]),
    (COL_TIMESTAMP, &["timestamp"]),
    (COL_VEHICLE_NUMBER, &["vehicle_number"]),
    (COL_BATTERY1_NUMBER, &["Battery 1 Number", "battery1_number"]),
    (COL_BATTERY1_LINK, &["Battery1 Photo Link", "battery1_photo_link"]),
    (COL_BATTERY2_NUMBER, &["Battery 2 Number", "battery2_number"]),
    (COL_BATTERY2_LINK, &["Battery2 Photo Link", "battery2_photo_link"]),
    (COL_ODOMETER_VALUE, &["odometer_value"]),
    (COL_ODOMETER_LINK, &["odometer_photo_link"]),
    (COL_PRIME_READABLE, &["Prime Tyres"]),
    (COL_VEHICLE_READABLE, &["Vehicle Images"]),
    (COL_CREATED_BY_USER_ID, &["created_by_user_id"]),
    (COL_CREATED_BY_EMAIL, &["created_by_email"]),
    (COL_CREATED_BY_NAME, &["created_by_name"]),
];

fn aliases(column: &str) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

/// Folds line breaks into spaces and trims, so a value fits on one line.
pub fn sanitize(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Encodes `(position, value)` pairs as a grouped cell.
pub fn encode_cell<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    entries
        .into_iter()
        .map(|(position, value)| format!("{}: {}", position, sanitize(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Encodes bare positions, one per line.
pub fn encode_positions<'a, I>(positions: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    positions.into_iter().collect::<Vec<_>>().join("\n")
}

/// Inverse of [`encode_cell`] and [`encode_positions`].
pub fn decode_cell(cell: &str) -> Vec<(String, String)> {
    cell.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(':') {
            Some((position, value)) => (position.trim().to_string(), value.trim().to_string()),
            None => (line.to_string(), String::new()),
        })
        .collect()
}

pub fn encode_link(link: Option<&str>) -> &str {
    match link {
        Some(link) if !link.is_empty() => link,
        _ => NO_PHOTO,
    }
}

/// Maps the placeholder (and blanks) back to `None`.
pub fn decode_link(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value == NO_PHOTO {
        None
    } else {
        Some(value.to_string())
    }
}

fn decode_link_cell(cell: &str) -> Vec<(String, Option<String>)> {
    decode_cell(cell)
        .into_iter()
        .map(|(position, value)| (position, decode_link(&value)))
        .collect()
}

/// Removes and returns the link recorded for `position`.
fn take_link(links: &mut Vec<(String, Option<String>)>, position: &str) -> Option<String> {
    let index = links.iter().position(|(p, _)| p == position)?;
    links.remove(index).1
}

/// Serializes a record into one row in [`HEADER`] order.
pub fn encode_row(record: &InspectionRecord) -> Vec<String> {
    let tyre_cells = |tyres: &[TyreRecord]| {
        (
            encode_cell(tyres.iter().map(|t| (t.position.as_str(), t.number.as_str()))),
            encode_cell(
                tyres
                    .iter()
                    .map(|t| (t.position.as_str(), encode_link(t.photo_link.as_deref()))),
            ),
        )
    };
    let (prime_readable, prime_links) = tyre_cells(&record.prime_tyres);
    let (trailer_readable, trailer_links) = tyre_cells(&record.trailer_tyres);
    let vehicle_readable =
        encode_positions(record.vehicle_images.iter().map(|v| v.position.as_str()));
    let vehicle_links = encode_cell(
        record
            .vehicle_images
            .iter()
            .map(|v| (v.position.as_str(), encode_link(v.photo_link.as_deref()))),
    );

    vec![
        record.record_id.clone(),
        record.timestamp.clone(),
        sanitize(&record.vehicle_number),
        sanitize(&record.battery1_number),
        record.battery1_photo_link.clone().unwrap_or_default(),
        sanitize(&record.battery2_number),
        record.battery2_photo_link.clone().unwrap_or_default(),
        sanitize(&record.odometer_value),
        record.odometer_photo_link.clone().unwrap_or_default(),
        prime_readable,
        prime_links,
        trailer_readable,
        trailer_links,
        vehicle_readable,
        vehicle_links,
        record.created_by.user_id.clone(),
        record.created_by.email.clone(),
        record.created_by.name.clone(),
        record.submission_token.clone().unwrap_or_default(),
    ]
}

/// Header-aware view of one data row.
struct RowView<'a> {
    columns: &'a HashMap<&'a str, usize>,
    row: &'a [String],
}

impl RowView<'_> {
    fn get(&self, column: &str) -> &str {
        std::iter::once(column)
            .chain(aliases(column).iter().copied())
            .find_map(|name| self.columns.get(name))
            .and_then(|&index| self.row.get(index))
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

/// Joins a readable cell and its link cell by position label.
fn decode_tyres(readable: &str, links: &str) -> Vec<TyreRecord> {
    let mut links = decode_link_cell(links);
    let mut tyres: Vec<TyreRecord> = decode_cell(readable)
        .into_iter()
        .map(|(position, number)| TyreRecord {
            photo_link: take_link(&mut links, &position),
            position,
            number,
        })
        .collect();
    // Slots listed only in the link cell still carry their photo.
    tyres.extend(links.into_iter().map(|(position, photo_link)| TyreRecord {
        position,
        number: String::new(),
        photo_link,
    }));
    tyres
}

fn decode_vehicle_images(readable: &str, links: &str) -> Vec<VehicleImageRecord> {
    let mut links = decode_link_cell(links);
    let mut images: Vec<VehicleImageRecord> = decode_cell(readable)
        .into_iter()
        .map(|(position, _)| VehicleImageRecord {
            photo_link: take_link(&mut links, &position),
            position,
        })
        .collect();
    images.extend(
        links
            .into_iter()
            .map(|(position, photo_link)| VehicleImageRecord {
                position,
                photo_link,
            }),
    );
    images
}

/// Parses one data row against the header row.
pub fn decode_row(header: &[String], row: &[String]) -> InspectionRecord {
    let columns: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();
    let view = RowView {
        columns: &columns,
        row,
    };

    let token = view.get(COL_SUBMISSION_TOKEN);
    InspectionRecord {
        record_id: view.get(COL_RECORD_ID).to_string(),
        timestamp: view.get(COL_TIMESTAMP).to_string(),
        vehicle_number: view.get(COL_VEHICLE_NUMBER).to_string(),
        battery1_number: view.get(COL_BATTERY1_NUMBER).to_string(),
        battery1_photo_link: decode_link(view.get(COL_BATTERY1_LINK)),
        battery2_number: view.get(COL_BATTERY2_NUMBER).to_string(),
        battery2_photo_link: decode_link(view.get(COL_BATTERY2_LINK)),
        odometer_value: view.get(COL_ODOMETER_VALUE).to_string(),
        odometer_photo_link: decode_link(view.get(COL_ODOMETER_LINK)),
        prime_tyres: decode_tyres(view.get(COL_PRIME_READABLE), view.get(COL_PRIME_LINKS)),
        trailer_tyres: decode_tyres(view.get(COL_TRAILER_READABLE), view.get(COL_TRAILER_LINKS)),
        vehicle_images: decode_vehicle_images(
            view.get(COL_VEHICLE_READABLE),
            view.get(COL_VEHICLE_LINKS),
        ),
        created_by: CreatedBy {
            user_id: view.get(COL_CREATED_BY_USER_ID).to_string(),
            email: view.get(COL_CREATED_BY_EMAIL).to_string(),
            name: view.get(COL_CREATED_BY_NAME).to_string(),
        },
        synced_to_sheets: true,
        submission_token: (!token.is_empty()).then(|| token.to_string()),
    }
}

/// Parses a full sheet (header row first) in append order. Blank rows are skipped.
pub fn decode_rows(rows: &[Vec<String>]) -> Vec<InspectionRecord> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };
    data.iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| decode_row(header, row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> InspectionRecord {
        InspectionRecord {
            record_id: "5f1c7c2e-8d4b-4a57-9a53-2f4a3e1b9c10".into(),
            timestamp: "2026-10-17T08:30:00+00:00".into(),
            vehicle_number: "HR55AZ3114".into(),
            battery1_number: "BAT001".into(),
            battery1_photo_link: Some("https://storage.googleapis.com/fleet/b1.jpg".into()),
            battery2_number: String::new(),
            battery2_photo_link: None,
            odometer_value: "120345".into(),
            odometer_photo_link: None,
            prime_tyres: vec![
                TyreRecord {
                    position: "Front Left".into(),
                    number: "TYRE001".into(),
                    photo_link: Some("https://storage.googleapis.com/fleet/fl.jpg".into()),
                },
                TyreRecord {
                    position: "Rear Right Outer".into(),
                    number: "TYRE:9".into(),
                    photo_link: None,
                },
            ],
            trailer_tyres: vec![TyreRecord {
                position: "Axle 3 Right Inner".into(),
                number: String::new(),
                photo_link: Some("r2://fleet/t.jpg".into()),
            }],
            vehicle_images: vec![
                VehicleImageRecord {
                    position: "Front".into(),
                    photo_link: Some("https://storage.googleapis.com/fleet/front.jpg".into()),
                },
                VehicleImageRecord {
                    position: "Rear".into(),
                    photo_link: None,
                },
            ],
            created_by: CreatedBy {
                user_id: "user_2abc".into(),
                email: "driver@example.com".into(),
                name: "Asha Rao".into(),
            },
            synced_to_sheets: true,
            submission_token: Some("token-1".into()),
        }
    }

    #[test]
    fn test_cell_encode_decode_pair() {
        let entries = [("Front Left", "TYRE001"), ("Rear Left Inner", "")];
        let cell = encode_cell(entries);
        assert_eq!(cell, "Front Left: TYRE001\nRear Left Inner: ");
        assert_eq!(
            decode_cell(&cell),
            vec![
                ("Front Left".to_string(), "TYRE001".to_string()),
                ("Rear Left Inner".to_string(), String::new()),
            ]
        );
        assert!(decode_cell("").is_empty());
        assert!(decode_cell("\n  \n").is_empty());
    }

    #[test]
    fn test_decode_splits_on_first_colon_only() {
        let decoded = decode_cell("Front: https://drive.google.com/file/d/abc/view");
        assert_eq!(decoded[0].0, "Front");
        assert_eq!(decoded[0].1, "https://drive.google.com/file/d/abc/view");
        assert_eq!(decode_cell("Rear")[0], ("Rear".to_string(), String::new()));
    }

    #[test]
    fn test_placeholder_normalizes_to_none() {
        assert_eq!(encode_link(None), NO_PHOTO);
        assert_eq!(encode_link(Some("")), NO_PHOTO);
        assert_eq!(decode_link(NO_PHOTO), None);
        assert_eq!(decode_link(" "), None);
        assert_eq!(decode_link("gs://b/k"), Some("gs://b/k".to_string()));
    }

    #[test]
    fn test_sanitize_folds_newlines() {
        assert_eq!(sanitize(" BAT\n001 \r\n"), "BAT 001");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_row_round_trip() {
        let record = sample_record();
        let rows = vec![header_row(), encode_row(&record)];
        assert_eq!(decode_rows(&rows), vec![record]);
    }

    #[test]
    fn test_every_slot_filled_round_trip() {
        use crate::positions::{
            PRIME_TYRE_POSITIONS, TRAILER_TYRE_POSITIONS, VEHICLE_IMAGE_POSITIONS,
        };

        // Every other slot has no uploaded photo
        let link = |prefix: &str, i: usize| {
            (i % 2 == 0)
                .then(|| format!("https://storage.googleapis.com/fleet/{}{}.jpg", prefix, i))
        };
        let tyres = |positions: &[&str], prefix: &str| -> Vec<TyreRecord> {
            positions
                .iter()
                .enumerate()
                .map(|(i, position)| TyreRecord {
                    position: position.to_string(),
                    number: format!("{}-{:02}", prefix.to_uppercase(), i),
                    photo_link: link(prefix, i),
                })
                .collect()
        };
        let record = InspectionRecord {
            battery2_number: "BAT002".into(),
            battery2_photo_link: None,
            odometer_photo_link: Some("r2://fleet/odo.jpg".into()),
            prime_tyres: tyres(&PRIME_TYRE_POSITIONS[..], "p"),
            trailer_tyres: tyres(&TRAILER_TYRE_POSITIONS[..], "t"),
            vehicle_images: VEHICLE_IMAGE_POSITIONS
                .iter()
                .enumerate()
                .map(|(i, position)| VehicleImageRecord {
                    position: position.to_string(),
                    photo_link: link("v", i + 1),
                })
                .collect(),
            ..sample_record()
        };
        assert_eq!(record.prime_tyres.len(), 6);
        assert_eq!(record.trailer_tyres.len(), 12);
        assert_eq!(record.vehicle_images.len(), 4);
        assert!(record.synced_to_sheets);
        assert!(record.submission_token.is_some());

        let row = encode_row(&record);
        assert_eq!(row[10].lines().count(), 6);
        assert_eq!(row[12].lines().filter(|l| l.ends_with(NO_PHOTO)).count(), 6);
        assert_eq!(decode_row(&header_row(), &row), record);
    }

    #[test]
    fn test_row_cells_follow_grammar() {
        let row = encode_row(&sample_record());
        assert_eq!(row.len(), HEADER.len());
        assert_eq!(row[9], "Front Left: TYRE001\nRear Right Outer: TYRE:9");
        assert_eq!(
            row[10],
            "Front Left: https://storage.googleapis.com/fleet/fl.jpg\nRear Right Outer: (no photo)"
        );
        assert_eq!(row[13], "Front\nRear");
        assert_eq!(row[6], "");
    }

    #[test]
    fn test_links_join_by_position_not_index() {
        let header = header_row();
        let mut row = vec![String::new(); HEADER.len()];
        row[0] = "r1".into();
        row[9] = "Front Left: A1\nFront Right: A2".into();
        row[10] = "Front Right: https://x/fr.jpg\nFront Left: (no photo)".into();
        let record = decode_row(&header, &row);
        assert_eq!(record.prime_tyres[0].position, "Front Left");
        assert_eq!(record.prime_tyres[0].photo_link, None);
        assert_eq!(record.prime_tyres[1].photo_link.as_deref(), Some("https://x/fr.jpg"));
    }

    #[test]
    fn test_legacy_headers_and_short_rows() {
        let header: Vec<String> = ["record_id", "Vehicle Number", "Battery 1 Number", "Prime Tyres"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let row = vec!["r9".to_string(), "NL01AE4999".to_string()];
        let record = decode_row(&header, &row);
        assert_eq!(record.record_id, "r9");
        assert_eq!(record.vehicle_number, "NL01AE4999");
        assert_eq!(record.battery1_number, "");
        assert!(record.prime_tyres.is_empty());
        assert!(record.submission_token.is_none());
        assert!(record.synced_to_sheets);
    }

    #[test]
    fn test_decode_rows_needs_header() {
        assert!(decode_rows(&[]).is_empty());
        assert!(decode_rows(&[header_row()]).is_empty());
        let blank = vec![String::new(); 3];
        assert!(decode_rows(&[header_row(), blank]).is_empty());
    }
}
