use std::collections::HashSet;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use futures::future::join_all;
use uuid::Uuid;

use crate::db::MaintenanceArchive;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreatedBy, EncodedImage, InspectionRecord, LogsResponse, LookupResponse, SubmissionPayload,
    SubmitResponse, TyreEntry, TyreRecord, UploadFailure, VehicleImageEntry, VehicleImageRecord,
    WirePhoto,
};
use crate::positions::{slug, SlotGroup};
use crate::sheet::{codec, RowStore};
use crate::storage::{photo_key, StorageBackend};

/// Where an uploaded photo's link lands in the record
#[derive(Debug, Clone, Copy)]
enum PhotoTarget {
    Battery1,
    Battery2,
    Odometer,
    PrimeTyre(usize),
    TrailerTyre(usize),
    VehicleImage(usize),
}

struct PhotoJob<'a> {
    target: PhotoTarget,
    slot: String,
    image: &'a EncodedImage,
}

/// Accepts inspection submissions and reads them back from the row store.
pub struct MaintenanceService {
    storage: Arc<dyn StorageBackend>,
    rows: Arc<dyn RowStore>,
    archive: Option<MaintenanceArchive>,
}

impl MaintenanceService {
    pub fn new(storage: Arc<dyn StorageBackend>, rows: Arc<dyn RowStore>) -> Self {
        Self {
            storage,
            rows,
            archive: None,
        }
    }

    pub fn with_archive(mut self, archive: MaintenanceArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Checks group positions and drops unfilled slots.
    fn filled_tyres(group: SlotGroup, entries: Vec<TyreEntry>) -> AppResult<Vec<TyreEntry>> {
        check_positions(group, entries.iter().map(|e| e.position.as_str()))?;
        Ok(entries.into_iter().filter(TyreEntry::is_filled).collect())
    }

    fn filled_images(entries: Vec<VehicleImageEntry>) -> AppResult<Vec<VehicleImageEntry>> {
        check_positions(
            SlotGroup::VehicleImages,
            entries.iter().map(|e| e.position.as_str()),
        )?;
        Ok(entries
            .into_iter()
            .filter(VehicleImageEntry::is_filled)
            .collect())
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<InspectionRecord>> {
        let rows = self.rows.read_all_rows().await?;
        Ok(codec::decode_rows(&rows)
            .into_iter()
            .find(|record| record.submission_token.as_deref() == Some(token)))
    }

    pub async fn submit(
        &self,
        payload: SubmissionPayload,
        created_by: CreatedBy,
    ) -> AppResult<SubmitResponse> {
        let vehicle_number = payload.vehicle_number.trim().to_string();
        if vehicle_number.is_empty() {
            return Err(AppError::Validation(
                "vehicle_number is required".to_string(),
            ));
        }
        let prime_tyres = Self::filled_tyres(SlotGroup::PrimeTyres, payload.prime_tyres)?;
        let trailer_tyres = Self::filled_tyres(SlotGroup::TrailerTyres, payload.trailer_tyres)?;
        let vehicle_images = Self::filled_images(payload.vehicle_images)?;

        let submission_token = payload
            .submission_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let mut record = InspectionRecord {
            record_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            vehicle_number,
            battery1_number: payload.battery1_number.trim().to_string(),
            battery1_photo_link: None,
            battery2_number: payload.battery2_number.trim().to_string(),
            battery2_photo_link: None,
            odometer_value: payload.odometer_value.trim().to_string(),
            odometer_photo_link: None,
            prime_tyres: prime_tyres.iter().map(tyre_record).collect(),
            trailer_tyres: trailer_tyres.iter().map(tyre_record).collect(),
            vehicle_images: vehicle_images
                .iter()
                .map(|image| VehicleImageRecord {
                    position: image.position.clone(),
                    photo_link: None,
                })
                .collect(),
            created_by,
            synced_to_sheets: true,
            submission_token,
        };

        if let Some(token) = record.submission_token.as_deref() {
            if let Some(existing) = self.find_by_token(token).await? {
                // Compare against what the row store would hold for this payload
                let draft = codec::decode_row(&codec::header_row(), &codec::encode_row(&record));
                if !same_inspection(&existing, &draft) {
                    tracing::warn!(
                        "Submission token reused: record_id={}, vehicle={}",
                        existing.record_id,
                        record.vehicle_number
                    );
                    return Err(AppError::Conflict(format!(
                        "submission token already used for record {}",
                        existing.record_id
                    )));
                }
                tracing::info!(
                    "Submission token already stored: record_id={}, vehicle={}",
                    existing.record_id,
                    existing.vehicle_number
                );
                return Ok(SubmitResponse::from_record(
                    &existing,
                    "Log already submitted",
                    Vec::new(),
                ));
            }
        }

        let mut jobs = Vec::new();
        let mut upload_failures = Vec::new();
        let singles = [
            (PhotoTarget::Battery1, "battery1", &payload.battery1_photo_base64),
            (PhotoTarget::Battery2, "battery2", &payload.battery2_photo_base64),
            (PhotoTarget::Odometer, "odometer", &payload.odometer_photo_base64),
        ];
        for (target, slot, photo) in singles {
            if let Some(photo) = photo {
                queue_photo(&mut jobs, &mut upload_failures, target, slot.to_string(), photo);
            }
        }
        push_tyre_jobs(
            &mut jobs,
            &mut upload_failures,
            SlotGroup::PrimeTyres,
            &prime_tyres,
            PhotoTarget::PrimeTyre,
        );
        push_tyre_jobs(
            &mut jobs,
            &mut upload_failures,
            SlotGroup::TrailerTyres,
            &trailer_tyres,
            PhotoTarget::TrailerTyre,
        );
        for (i, entry) in vehicle_images.iter().enumerate() {
            if let Some(photo) = &entry.photo_base64 {
                queue_photo(
                    &mut jobs,
                    &mut upload_failures,
                    PhotoTarget::VehicleImage(i),
                    group_slot(SlotGroup::VehicleImages, &entry.position),
                    photo,
                );
            }
        }

        upload_failures.extend(self.upload_all(&mut record, jobs).await);

        self.rows.append_row(codec::encode_row(&record)).await?;
        tracing::info!(
            "Stored inspection: record_id={}, vehicle={}, failed_uploads={}",
            record.record_id,
            record.vehicle_number,
            upload_failures.len()
        );

        if let Some(archive) = &self.archive {
            if let Err(e) = archive.insert(&record).await {
                tracing::warn!("Archive insert failed for {}: {}", record.record_id, e);
            }
        }

        let message = if upload_failures.is_empty() {
            "Log submitted".to_string()
        } else {
            format!(
                "Log submitted; {} photo(s) failed to upload",
                upload_failures.len()
            )
        };
        Ok(SubmitResponse::from_record(&record, message, upload_failures))
    }

    /// Uploads every photo concurrently and writes the links into `record`.
    async fn upload_all(
        &self,
        record: &mut InspectionRecord,
        jobs: Vec<PhotoJob<'_>>,
    ) -> Vec<UploadFailure> {
        let vehicle_number = record.vehicle_number.clone();
        let record_id = record.record_id.clone();
        let storage = &self.storage;

        let results = join_all(jobs.into_iter().map(|job| {
            let key = photo_key(&vehicle_number, &record_id, &job.slot, job.image.extension());
            async move {
                let result = storage
                    .upload(&key, job.image.bytes(), job.image.media_type())
                    .await;
                (job.target, job.slot, result)
            }
        }))
        .await;

        let mut failures = Vec::new();
        for (target, slot, result) in results {
            match result {
                Ok(link) => {
                    let field = match target {
                        PhotoTarget::Battery1 => &mut record.battery1_photo_link,
                        PhotoTarget::Battery2 => &mut record.battery2_photo_link,
                        PhotoTarget::Odometer => &mut record.odometer_photo_link,
                        PhotoTarget::PrimeTyre(i) => &mut record.prime_tyres[i].photo_link,
                        PhotoTarget::TrailerTyre(i) => &mut record.trailer_tyres[i].photo_link,
                        PhotoTarget::VehicleImage(i) => &mut record.vehicle_images[i].photo_link,
                    };
                    *field = Some(link);
                }
                Err(e) => {
                    tracing::error!(
                        "Photo upload failed: record_id={}, slot={}, error={}",
                        record_id,
                        slot,
                        e
                    );
                    failures.push(UploadFailure {
                        slot,
                        reason: e.to_string(),
                    });
                }
            }
        }
        failures
    }

    /// All stored records in append order, optionally restricted to one vehicle (exact match).
    pub async fn list(&self, vehicle_number: Option<&str>) -> AppResult<Vec<InspectionRecord>> {
        let rows = self.rows.read_all_rows().await?;
        let mut records = codec::decode_rows(&rows);
        if let Some(filter) = vehicle_number.map(str::trim).filter(|f| !f.is_empty()) {
            records.retain(|record| record.vehicle_number == filter);
        }
        Ok(records)
    }

    /// Finds one record by id, or every record whose vehicle number contains the identifier.
    pub async fn lookup(&self, identifier: &str) -> AppResult<LookupResponse> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(AppError::Validation("identifier is required".to_string()));
        }

        let records = self.list(None).await?;
        if let Some(record) = records.iter().find(|r| r.record_id == identifier) {
            return Ok(LookupResponse::Record(Box::new(record.clone())));
        }

        let needle = identifier.to_lowercase();
        let logs: Vec<InspectionRecord> = records
            .into_iter()
            .filter(|r| r.vehicle_number.to_lowercase().contains(&needle))
            .collect();
        if logs.is_empty() {
            return Err(AppError::NotFound(format!(
                "no maintenance log matches {}",
                identifier
            )));
        }
        Ok(LookupResponse::Matches(LogsResponse { logs }))
    }
}

/// Queues an upload, or records the slot as failed when its data URL did not decode.
fn queue_photo<'a>(
    jobs: &mut Vec<PhotoJob<'a>>,
    failures: &mut Vec<UploadFailure>,
    target: PhotoTarget,
    slot: String,
    photo: &'a WirePhoto,
) {
    match photo {
        WirePhoto::Image(image) => jobs.push(PhotoJob {
            target,
            slot,
            image,
        }),
        WirePhoto::Undecodable { reason, .. } => {
            tracing::warn!("Photo skipped: slot={}, error={}", slot, reason);
            failures.push(UploadFailure {
                slot,
                reason: reason.clone(),
            });
        }
    }
}

fn push_tyre_jobs<'a>(
    jobs: &mut Vec<PhotoJob<'a>>,
    failures: &mut Vec<UploadFailure>,
    group: SlotGroup,
    entries: &'a [TyreEntry],
    target: fn(usize) -> PhotoTarget,
) {
    for (i, entry) in entries.iter().enumerate() {
        if let Some(photo) = &entry.photo_base64 {
            queue_photo(
                jobs,
                failures,
                target(i),
                group_slot(group, &entry.position),
                photo,
            );
        }
    }
}

/// True when two records describe the same inspection. Links, ids and
/// timestamps are ignored.
fn same_inspection(a: &InspectionRecord, b: &InspectionRecord) -> bool {
    let tyres = |tyres: &[TyreRecord]| -> Vec<(String, String)> {
        tyres
            .iter()
            .map(|t| (t.position.clone(), t.number.clone()))
            .collect()
    };
    let images = |images: &[VehicleImageRecord]| -> Vec<String> {
        images.iter().map(|v| v.position.clone()).collect()
    };
    a.vehicle_number == b.vehicle_number
        && a.battery1_number == b.battery1_number
        && a.battery2_number == b.battery2_number
        && a.odometer_value == b.odometer_value
        && tyres(&a.prime_tyres) == tyres(&b.prime_tyres)
        && tyres(&a.trailer_tyres) == tyres(&b.trailer_tyres)
        && images(&a.vehicle_images) == images(&b.vehicle_images)
}

fn tyre_record(entry: &TyreEntry) -> TyreRecord {
    TyreRecord {
        position: entry.position.clone(),
        number: entry.number.trim().to_string(),
        photo_link: None,
    }
}

/// Object-name slot for a group entry, e.g. `prime_front_left`
fn group_slot(group: SlotGroup, position: &str) -> String {
    format!("{}_{}", group.key_prefix(), slug(position))
}

fn check_positions<'a>(
    group: SlotGroup,
    positions: impl Iterator<Item = &'a str>,
) -> AppResult<()> {
    let mut seen = HashSet::new();
    for position in positions {
        if !group.contains(position) {
            return Err(AppError::InvalidInput(format!(
                "unknown {} position: {}",
                group.label(),
                position
            )));
        }
        if !seen.insert(position) {
            return Err(AppError::InvalidInput(format!(
                "duplicate {} position: {}",
                group.label(),
                position
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::MemoryRowStore;
    use crate::storage::MemoryBackend;
    use crate::testing::{png_fixture, test_user, FailingStorage};

    struct Harness {
        service: MaintenanceService,
        storage: Arc<MemoryBackend>,
        rows: Arc<MemoryRowStore>,
    }

    fn harness() -> Harness {
        let storage = Arc::new(MemoryBackend::new("fleet"));
        let rows = Arc::new(MemoryRowStore::new());
        Harness {
            service: MaintenanceService::new(storage.clone(), rows.clone()),
            storage,
            rows,
        }
    }

    fn photo() -> Option<WirePhoto> {
        Some(EncodedImage::new("image/png", png_fixture(4, 4)).into())
    }

    fn payload(vehicle: &str) -> SubmissionPayload {
        SubmissionPayload {
            vehicle_number: vehicle.to_string(),
            ..Default::default()
        }
    }

    fn user() -> CreatedBy {
        test_user().into()
    }

    #[tokio::test]
    async fn test_single_tyre_submission_round_trips_through_rows() {
        let h = harness();
        let mut p = payload("HR55AZ3114");
        p.prime_tyres.push(TyreEntry {
            position: "Front Left".into(),
            number: "TYRE001".into(),
            photo_base64: photo(),
        });

        let response = h.service.submit(p, user()).await.unwrap();
        assert!(response.success);
        assert!(response.upload_failures.is_empty());
        assert_eq!(h.storage.object_count().await, 1);

        let link = response.prime_tyre_links[0].photo_link.clone().unwrap();
        assert_eq!(
            link,
            format!(
                "memory://fleet/hr55az3114/{}/prime_front_left.png",
                response.record_id
            )
        );

        let rows = h.rows.read_all_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        let header = codec::header_row();
        let cell = |name: &str| {
            let i = header.iter().position(|h| h == name).unwrap();
            rows[1][i].clone()
        };
        assert_eq!(cell(codec::COL_PRIME_READABLE), "Front Left: TYRE001");
        assert_eq!(cell(codec::COL_PRIME_LINKS), format!("Front Left: {}", link));
        assert_eq!(cell(codec::COL_TRAILER_READABLE), "");

        let logs = h.service.list(Some("HR55AZ3114")).await.unwrap();
        assert_eq!(logs.len(), 1);
        let record = &logs[0];
        assert_eq!(record.record_id, response.record_id);
        assert_eq!(
            record.prime_tyres,
            vec![TyreRecord {
                position: "Front Left".into(),
                number: "TYRE001".into(),
                photo_link: Some(link),
            }]
        );
        assert!(record.trailer_tyres.is_empty());
        assert!(record.synced_to_sheets);
        assert_eq!(record.created_by.email, "inspector@example.com");
    }

    #[tokio::test]
    async fn test_zero_photo_submission() {
        let h = harness();
        let mut p = payload("MH12AB1234");
        p.battery1_number = "BAT001".into();
        p.odometer_value = "120345".into();

        let response = h.service.submit(p, user()).await.unwrap();
        assert!(response.success);
        assert_eq!(response.message, "Log submitted");
        assert_eq!(h.storage.object_count().await, 0);
        assert!(response.battery1_photo_link.is_none());
        assert!(response.odometer_photo_link.is_none());

        let record = &h.service.list(None).await.unwrap()[0];
        assert_eq!(record.battery1_number, "BAT001");
        assert_eq!(record.odometer_value, "120345");
        assert!(record.battery1_photo_link.is_none());
        assert!(record.prime_tyres.is_empty());
        assert!(record.vehicle_images.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_submissions_get_distinct_rows() {
        let h = harness();
        let mut a = payload("V1");
        a.battery1_photo_base64 = photo();
        let mut b = payload("V1");
        b.odometer_photo_base64 = photo();

        let (ra, rb) = tokio::join!(h.service.submit(a, user()), h.service.submit(b, user()));
        let (ra, rb) = (ra.unwrap(), rb.unwrap());
        assert_ne!(ra.record_id, rb.record_id);

        let logs = h.service.list(Some("V1")).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(h.storage.object_count().await, 2);
        let ids: HashSet<_> = logs.iter().map(|r| r.record_id.clone()).collect();
        assert!(ids.contains(&ra.record_id) && ids.contains(&rb.record_id));
    }

    #[tokio::test]
    async fn test_submission_token_replay_stores_once() {
        let h = harness();
        let mut p = payload("V2");
        p.vehicle_images.push(VehicleImageEntry {
            position: "Front".into(),
            photo_base64: photo(),
        });
        p.submission_token = Some("form-token-1".into());

        let first = h.service.submit(p.clone(), user()).await.unwrap();
        let second = h.service.submit(p, user()).await.unwrap();

        assert_eq!(first.record_id, second.record_id);
        assert_eq!(first.vehicle_image_links, second.vehicle_image_links);
        assert_eq!(second.message, "Log already submitted");
        assert_eq!(h.rows.row_count().await, 2);
        assert_eq!(h.storage.object_count().await, 1);
    }

    #[tokio::test]
    async fn test_reused_token_with_different_payload_is_rejected() {
        let h = harness();
        let mut v1 = payload("V1");
        v1.battery1_number = "BAT001".into();
        v1.submission_token = Some("tok".into());
        let mut v2 = payload("V2");
        v2.battery1_number = "BAT002".into();
        v2.submission_token = Some("tok".into());

        let first = h.service.submit(v1.clone(), user()).await.unwrap();
        let err = h.service.submit(v2, user()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref m) if m.contains(&first.record_id)));
        assert!(h.service.list(Some("V2")).await.unwrap().is_empty());
        assert_eq!(h.rows.row_count().await, 2);

        // Same vehicle, edited reading
        let mut edited = v1.clone();
        edited.odometer_value = "120345".into();
        assert!(matches!(
            h.service.submit(edited, user()).await,
            Err(AppError::Conflict(_))
        ));

        // Whitespace differences are not a different inspection
        let mut padded = v1;
        padded.battery1_number = " BAT001 ".into();
        let replay = h.service.submit(padded, user()).await.unwrap();
        assert_eq!(replay.record_id, first.record_id);
        assert_eq!(h.rows.row_count().await, 2);
    }

    #[tokio::test]
    async fn test_line_wrapped_photo_uploads() {
        let h = harness();
        let mut p = payload("V6");
        p.battery1_number = "BAT001".into();
        p.prime_tyres.push(TyreEntry {
            position: "Front Left".into(),
            number: "TYRE001".into(),
            photo_base64: Some(WirePhoto::from_wire("data:image/jpeg;base64,AQID\nBAUG")),
        });

        let response = h.service.submit(p, user()).await.unwrap();
        assert!(response.upload_failures.is_empty());
        let link = response.prime_tyre_links[0].photo_link.clone().unwrap();
        assert!(link.ends_with("/prime_front_left.jpg"));
        assert_eq!(h.storage.object_count().await, 1);
    }

    #[tokio::test]
    async fn test_undecodable_photo_fails_only_its_slot() {
        let h = harness();
        let mut p = payload("V7");
        p.battery1_number = "BAT001".into();
        p.battery1_photo_base64 = photo();
        p.prime_tyres.push(TyreEntry {
            position: "Front Left".into(),
            number: "TYRE001".into(),
            photo_base64: Some(WirePhoto::from_wire("data:image/jpeg;base64,@@not-base64@@")),
        });

        let response = h.service.submit(p, user()).await.unwrap();
        assert!(response.success);
        assert_eq!(response.upload_failures.len(), 1);
        assert_eq!(response.upload_failures[0].slot, "prime_front_left");
        assert!(response.battery1_photo_link.is_some());
        assert_eq!(response.prime_tyre_links[0].photo_link, None);
        assert_eq!(h.storage.object_count().await, 1);

        let record = &h.service.list(Some("V7")).await.unwrap()[0];
        assert_eq!(record.battery1_number, "BAT001");
        assert_eq!(record.prime_tyres[0].number, "TYRE001");
        assert_eq!(record.prime_tyres[0].photo_link, None);
    }

    #[tokio::test]
    async fn test_partial_upload_failure_still_stores_record() {
        let rows = Arc::new(MemoryRowStore::new());
        let service = MaintenanceService::new(
            Arc::new(FailingStorage { fail_on: "odometer" }),
            rows.clone(),
        );
        let mut p = payload("V3");
        p.battery1_photo_base64 = photo();
        p.odometer_value = "9000".into();
        p.odometer_photo_base64 = photo();

        let response = service.submit(p, user()).await.unwrap();
        assert!(response.success);
        assert!(response.battery1_photo_link.is_some());
        assert!(response.odometer_photo_link.is_none());
        assert_eq!(response.upload_failures.len(), 1);
        assert_eq!(response.upload_failures[0].slot, "odometer");
        assert!(response.message.contains("1 photo(s) failed"));

        let record = &service.list(None).await.unwrap()[0];
        assert_eq!(record.odometer_value, "9000");
        assert!(record.odometer_photo_link.is_none());
    }

    #[tokio::test]
    async fn test_list_filters_exactly_in_append_order() {
        let h = harness();
        for vehicle in ["AB1", "ab1", "AB10", "AB1"] {
            h.service.submit(payload(vehicle), user()).await.unwrap();
        }

        let all = h.service.list(None).await.unwrap();
        assert_eq!(
            all.iter().map(|r| r.vehicle_number.as_str()).collect::<Vec<_>>(),
            vec!["AB1", "ab1", "AB10", "AB1"]
        );

        let exact = h.service.list(Some("AB1")).await.unwrap();
        assert_eq!(exact.len(), 2);
        assert_eq!(exact[0].record_id, all[0].record_id);
        assert_eq!(exact[1].record_id, all[3].record_id);
        assert_eq!(h.service.list(Some("  ")).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_lookup_by_id_then_substring() {
        let h = harness();
        let stored = h.service.submit(payload("HR55AZ3114"), user()).await.unwrap();
        h.service.submit(payload("HR55AZ9999"), user()).await.unwrap();

        match h.service.lookup(&stored.record_id).await.unwrap() {
            LookupResponse::Record(record) => assert_eq!(record.vehicle_number, "HR55AZ3114"),
            other => panic!("expected a single record, got {:?}", other),
        }
        match h.service.lookup("hr55az").await.unwrap() {
            LookupResponse::Matches(found) => assert_eq!(found.logs.len(), 2),
            other => panic!("expected matches, got {:?}", other),
        }
        assert!(matches!(
            h.service.lookup("KA01").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let h = harness();
        assert!(matches!(
            h.service.submit(payload("   "), user()).await,
            Err(AppError::Validation(_))
        ));

        let mut unknown = payload("V4");
        unknown.prime_tyres.push(TyreEntry {
            position: "Axle 1 Left Outer".into(),
            number: "T1".into(),
            photo_base64: None,
        });
        assert!(matches!(
            h.service.submit(unknown, user()).await,
            Err(AppError::InvalidInput(_))
        ));

        let mut duplicate = payload("V4");
        for _ in 0..2 {
            duplicate.vehicle_images.push(VehicleImageEntry {
                position: "Rear".into(),
                photo_base64: photo(),
            });
        }
        assert!(matches!(
            h.service.submit(duplicate, user()).await,
            Err(AppError::InvalidInput(_))
        ));
        assert_eq!(h.rows.row_count().await, 1);
        assert_eq!(h.storage.object_count().await, 0);
    }

    #[tokio::test]
    async fn test_unfilled_entries_are_dropped() {
        let h = harness();
        let mut p = payload("V5");
        p.trailer_tyres.push(TyreEntry {
            position: "Axle 2 Right Inner".into(),
            number: "  ".into(),
            photo_base64: None,
        });
        p.trailer_tyres.push(TyreEntry {
            position: "Axle 3 Left Outer".into(),
            number: "TR-9".into(),
            photo_base64: None,
        });

        let response = h.service.submit(p, user()).await.unwrap();
        assert_eq!(response.trailer_tyre_links.len(), 1);
        assert_eq!(response.trailer_tyre_links[0].position, "Axle 3 Left Outer");
        assert_eq!(response.trailer_tyre_links[0].photo_link, None);
    }
}
