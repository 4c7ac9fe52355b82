//! End-to-end tests for the catalog/delete pipeline.
//!
//! These drive full interactive sessions through a scripted console and
//! assert on the state of all three stores afterwards.

mod common;

use archive_cataloger::blob_store::BlobStore;
use archive_cataloger::catalog_store::CatalogStore;
use common::TestArchive;

#[tokio::test]
async fn test_catalog_archived_image_commits_pair_and_clears_staging() {
    let archive = TestArchive::new();
    archive.stage_png("photo.png", 64, 48);
    archive.stage_png("photo-upscaled.png", 256, 192);

    let mut session = archive.session([
        "catalog",
        "archived-image",
        "https://example.com/photo", // SOURCE
        "https://example.com/found", // FOUND AT
        "a found photo",             // DESCRIPTION
        "photos",                    // TAG
        "n",                         // another tag?
        "y",                         // does this look correct?
        "n",                         // continue with another action?
    ]);
    session.run().await.unwrap();

    // Staging drained, exactly one item committed.
    assert!(archive.staged_files().is_empty());
    let ids = archive.committed_ids();
    assert_eq!(ids.len(), 1);
    let id = &ids[0];

    // Catalog record carries the probed dimensions and the carried-over name.
    let record = archive.catalog.find_by_id(id).unwrap().unwrap();
    assert_eq!(record.name, "photo.png");
    assert_eq!(record.display_width, Some(64));
    assert_eq!(record.display_height, Some(48));
    assert_eq!(
        record.filenames,
        vec!["photo-upscaled.png", "photo.png"]
    );

    // Local mirror: metadata snapshot plus both files.
    assert_eq!(
        archive.mirrored_files(id),
        vec!["data.json", "photo-upscaled.png", "photo.png"]
    );

    // Object store: both files under the id prefix.
    let keys: Vec<String> = archive
        .blobs
        .list_by_prefix(&format!("{}/", id))
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.key)
        .collect();
    assert_eq!(
        keys,
        vec![
            format!("{}/photo-upscaled.png", id),
            format!("{}/photo.png", id)
        ]
    );
}

#[tokio::test]
async fn test_four_file_sequence_commits_under_one_identifier_then_deletes() {
    let archive = TestArchive::new();
    archive.stage_png("photo-1.png", 32, 32);
    archive.stage_png("photo-2.png", 32, 32);
    archive.stage_png("photo-1-upscaled.png", 128, 128);
    archive.stage_png("photo-2-upscaled.png", 128, 128);

    let mut session = archive.session([
        "catalog",
        "software",
        "Photo Tool",               // ITEM NAME
        "Author One",               // CREATOR NAME
        "n",                        // another creator?
        "https://example.com/tool", // FOUND AT
        "a tool",                   // DESCRIPTION
        "tools",                    // TAG
        "n",                        // another tag?
        "y",                        // correct?
        "n",                        // continue?
    ]);
    session.run().await.unwrap();

    let ids = archive.committed_ids();
    assert_eq!(ids.len(), 1, "all four files belong to one item");
    let id = ids[0].clone();

    let record = archive.catalog.find_by_id(&id).unwrap().unwrap();
    assert_eq!(
        record.filenames,
        vec![
            "photo-1-upscaled.png",
            "photo-1.png",
            "photo-2-upscaled.png",
            "photo-2.png",
        ]
    );
    assert!(archive.staged_files().is_empty());
    assert_eq!(
        archive.blobs.list_by_prefix(&format!("{}/", id)).await.unwrap().len(),
        4
    );

    // Now reverse the commit in a second session.
    let mut session = archive.session([
        "delete",
        id.as_str(),
        "y", // delete item?
        "n", // continue with a new item id?
        "n", // continue with another action?
    ]);
    session.run().await.unwrap();

    // Round trip: record gone, prefix empty, directory absent.
    assert!(archive.catalog.find_by_id(&id).unwrap().is_none());
    assert!(archive
        .blobs
        .list_by_prefix(&format!("{}/", id))
        .await
        .unwrap()
        .is_empty());
    assert!(!archive.cataloged().join(&id).exists());
}

#[tokio::test]
async fn test_redo_restarts_from_fresh_staging_scan() {
    let archive = TestArchive::new();
    archive.stage_raw("clip.wav", b"riff bytes");

    let mut session = archive.session([
        "catalog",
        // First attempt, rejected at the final review.
        "archived-audio",
        "https://example.com/wrong-source",
        "https://example.com/found",
        "first description",
        "audio",
        "n",
        "n", // does this look correct? -> redo
        // Second attempt, accepted.
        "archived-audio",
        "https://example.com/right-source",
        "https://example.com/found",
        "second description",
        "audio",
        "n",
        "y",
        "n", // continue?
    ]);
    session.run().await.unwrap();

    let ids = archive.committed_ids();
    assert_eq!(ids.len(), 1);

    let record = archive.catalog.find_by_id(&ids[0]).unwrap().unwrap();
    assert_eq!(
        record.original_source_url.as_deref(),
        Some("https://example.com/right-source")
    );
    assert_eq!(record.description, "second description");
    // Audio items carry no dimensions and no creators.
    assert!(record.display_width.is_none());
    assert!(record.display_height.is_none());
    assert!(record.creators.is_none());
    assert_eq!(record.filenames, vec!["clip.wav"]);
}

#[tokio::test]
async fn test_multiple_items_catalog_in_sequence() {
    let archive = TestArchive::new();
    archive.stage_raw("a-clip.wav", b"a");
    archive.stage_raw("b-clip.wav", b"b");

    let mut session = archive.session([
        "catalog",
        // a-clip.wav (sorted first)
        "archived-audio",
        "https://example.com/a",
        "https://example.com/found-a",
        "first clip",
        "audio",
        "n",
        "y",
        // b-clip.wav picked up on the re-read
        "archived-audio",
        "https://example.com/b",
        "https://example.com/found-b",
        "second clip",
        "audio",
        "n",
        "y",
        "n", // continue?
    ]);
    session.run().await.unwrap();

    assert!(archive.staged_files().is_empty());
    assert_eq!(archive.committed_ids().len(), 2);
}

#[tokio::test]
async fn test_deleting_unknown_id_changes_nothing() {
    let archive = TestArchive::new();
    archive.stage_raw("keep.wav", b"bytes");

    let mut session = archive.session([
        "catalog",
        "archived-audio",
        "https://example.com/keep",
        "https://example.com/found",
        "kept clip",
        "audio",
        "n",
        "y",
        "y", // continue with another action
        "delete",
        "2c5ea4c0-4067-11e9-8bad-9b1deb4d3b7d", // valid UUID, unknown id
        "n",                                    // try again with a different id?
        "n",                                    // continue?
    ]);
    session.run().await.unwrap();

    let ids = archive.committed_ids();
    assert_eq!(ids.len(), 1);
    assert!(archive.catalog.find_by_id(&ids[0]).unwrap().is_some());
    assert_eq!(
        archive.mirrored_files(&ids[0]),
        vec!["data.json", "keep.wav"]
    );
}
