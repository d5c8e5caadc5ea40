//! Integration tests for the store crate

use pretty_assertions::assert_eq;
use serde_json::json;
use store::{
    BlobStore, FsBlobStore, JsonFileRepository, MemoryRepository, Placement, ReportRecord,
    Repository,
};

fn record(id: &str, lot: &str, url: &str) -> ReportRecord {
    ReportRecord {
        id: id.to_string(),
        template: "quality-control".to_string(),
        file_name: format!("quality_control_{lot}.pdf"),
        lot_number: Some(lot.to_string()),
        pages: 2,
        url: url.to_string(),
        created_by: Some("u-1".to_string()),
        created_at: "2024-01-02T08:00:00Z".to_string(),
    }
}

/// Code written against the trait works with every backend
fn archive<R: Repository<ReportRecord>>(repo: &mut R, blobs: &mut impl BlobStore) -> String {
    let url = blobs
        .put("reports/quality_control_AV-1.pdf", b"%PDF-1.5", "application/pdf")
        .unwrap();
    repo.create(record("r-1", "AV-1", &url)).unwrap();
    repo.create(record("r-2", "AV-2", &url)).unwrap();
    url
}

#[test]
fn test_archive_with_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut blobs = FsBlobStore::new(dir.path().join("blobs"));
    let mut repo = JsonFileRepository::<ReportRecord>::open(dir.path().join("data")).unwrap();

    let url = archive(&mut repo, &mut blobs);

    let reopened = JsonFileRepository::<ReportRecord>::open(dir.path().join("data")).unwrap();
    let found = reopened.find_by_field("lotNumber", &json!("AV-2")).unwrap();
    assert_eq!(found, vec![record("r-2", "AV-2", &url)]);
    assert_eq!(
        blobs.get("reports/quality_control_AV-1.pdf").unwrap(),
        b"%PDF-1.5".to_vec()
    );
}

#[test]
fn test_placements_in_memory() {
    let mut repo = MemoryRepository::new();
    for (i, location) in ["CF1-A", "CF1-A", "CF2-B"].iter().enumerate() {
        repo.create(Placement {
            id: format!("p-{i}"),
            lot_number: "AV-1".to_string(),
            pallet: format!("P-{i:02}"),
            location: location.to_string(),
            boxes: 220,
            placed_at: "2024-01-02T09:00:00Z".to_string(),
        })
        .unwrap();
    }

    let cold_room = repo.find_by_field("location", &json!("CF1-A")).unwrap();
    assert_eq!(cold_room.len(), 2);
    assert_eq!(repo.find_by_field("boxes", &json!(220)).unwrap().len(), 3);
}
