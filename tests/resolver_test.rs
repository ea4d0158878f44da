mod common;

use std::time::Duration;

use common::*;
use serde_json::json;
use songfeat::{
    config::BatchConfig, error::TableError, resolver::IdentifierResolver, table::Table,
};

fn resolver(
    catalog: &FakeCatalog,
    pacer: RecordingPacer,
    config: BatchConfig,
) -> IdentifierResolver<&FakeCatalog, RecordingPacer> {
    IdentifierResolver::with_pacer(catalog, pacer, config)
}

#[tokio::test]
async fn test_one_identifier_per_row_even_when_songs_are_missing() {
    let catalog = FakeCatalog::new()
        .with_song("Halo", "id-halo")
        .with_song("Hello", "id-hello")
        .with_song("Yellow", "id-yellow");
    let table = songs(&[
        ("Halo", "Beyonce"),
        ("Nope", "Nobody"),
        ("Hello", "Adele"),
        ("Missing Too", "Nobody"),
        ("Yellow", "Coldplay"),
    ]);

    let resolution = resolver(&catalog, RecordingPacer::new(), quiet_config())
        .resolve(&table, "Song_title", "Artist")
        .await
        .unwrap();

    assert_eq!(resolution.identifiers.len(), table.len());
    assert_eq!(
        resolution.identifiers,
        vec![
            Some("id-halo".to_string()),
            None,
            Some("id-hello".to_string()),
            None,
            Some("id-yellow".to_string()),
        ]
    );
    assert_eq!(resolution.found, ids(&["id-halo", "id-hello", "id-yellow"]));
    assert_eq!(resolution.missing(), 2);
    assert!(resolution.errored.is_empty());
}

#[tokio::test]
async fn test_clean_table_keeps_resolved_rows_in_order() {
    let catalog = FakeCatalog::new()
        .with_song("Halo", "id-halo")
        .with_song("Yellow", "id-yellow");
    let table = songs(&[("Yellow", "Coldplay"), ("Nope", "Nobody"), ("Halo", "Beyonce")]);

    let resolution = resolver(&catalog, RecordingPacer::new(), quiet_config())
        .resolve(&table, "Song_title", "Artist")
        .await
        .unwrap();

    let clean = &resolution.clean;
    assert_eq!(clean.columns(), ["Song_title", "Artist", "song_id"]);
    assert_eq!(clean.len(), 2);
    assert_eq!(clean.get(0, "Song_title"), Some(&json!("Yellow")));
    assert_eq!(clean.get(0, "song_id"), Some(&json!("id-yellow")));
    assert_eq!(clean.get(1, "Song_title"), Some(&json!("Halo")));
    assert_eq!(clean.get(1, "song_id"), Some(&json!("id-halo")));

    // input is left untouched
    assert_eq!(table.columns(), ["Song_title", "Artist"]);
}

#[tokio::test]
async fn test_pauses_after_each_chunk() {
    let catalog = FakeCatalog::new().with_song("a", "1");
    let table = songs(&[("a", "x"), ("a", "x"), ("a", "x"), ("a", "x"), ("a", "x")]);
    let config = BatchConfig {
        search_chunk_size: 2,
        ..quiet_config()
    };

    let resolver = resolver(&catalog, RecordingPacer::new(), config);
    let resolution = resolver
        .resolve(&table, "Song_title", "Artist")
        .await
        .unwrap();

    assert_eq!(resolution.found.len(), 5);
    assert_eq!(catalog.searches_for("a"), 5);
    assert_eq!(
        resolver_events(&resolver),
        vec![
            PaceEvent::ChunkDone(0),
            PaceEvent::ChunkDone(1),
            PaceEvent::ChunkDone(2)
        ]
    );
}

#[tokio::test]
async fn test_empty_table_makes_no_calls() {
    let catalog = FakeCatalog::new();
    let resolver = resolver(&catalog, RecordingPacer::new(), quiet_config());

    let resolution = resolver
        .resolve(&songs(&[]), "Song_title", "Artist")
        .await
        .unwrap();

    assert!(resolution.identifiers.is_empty());
    assert!(resolution.clean.is_empty());
    assert_eq!(resolution.clean.columns(), ["Song_title", "Artist", "song_id"]);
    assert!(catalog.search_calls.lock().unwrap().is_empty());
    assert!(resolver_events(&resolver).is_empty());
}

#[tokio::test]
async fn test_blank_artist_searches_by_title_and_blank_title_is_skipped() {
    let catalog = FakeCatalog::new().with_song("Halo", "id-halo");
    let table = songs(&[("Halo", ""), ("", "Adele")]);

    let resolution = resolver(&catalog, RecordingPacer::new(), quiet_config())
        .resolve(&table, "Song_title", "Artist")
        .await
        .unwrap();

    assert_eq!(
        resolution.identifiers,
        vec![Some("id-halo".to_string()), None]
    );
    assert_eq!(
        *catalog.search_calls.lock().unwrap(),
        vec![("Halo".to_string(), None)]
    );
}

#[tokio::test]
async fn test_rate_limited_search_is_retried() {
    let catalog = FakeCatalog::new()
        .with_song("Halo", "id-halo")
        .fail_search("Halo", rate_limited(2));
    let resolver = resolver(&catalog, RecordingPacer::new(), quiet_config());

    let resolution = resolver
        .resolve(&songs(&[("Halo", "Beyonce")]), "Song_title", "Artist")
        .await
        .unwrap();

    assert_eq!(resolution.found, ids(&["id-halo"]));
    assert_eq!(catalog.searches_for("Halo"), 2);
    assert_eq!(
        resolver_events(&resolver),
        vec![
            PaceEvent::RateLimited(Some(Duration::from_secs(2))),
            PaceEvent::ChunkDone(0)
        ]
    );
}

#[tokio::test]
async fn test_transient_errors_are_retried_within_budget() {
    let catalog = FakeCatalog::new()
        .with_song("Halo", "id-halo")
        .fail_search("Halo", server_error());
    let resolver = resolver(&catalog, RecordingPacer::new(), quiet_config());

    let resolution = resolver
        .resolve(&songs(&[("Halo", "Beyonce")]), "Song_title", "Artist")
        .await
        .unwrap();

    assert_eq!(resolution.found, ids(&["id-halo"]));
    assert!(resolution.errored.is_empty());
    assert_eq!(
        resolver_events(&resolver),
        vec![PaceEvent::TransientRetry(1), PaceEvent::ChunkDone(0)]
    );
}

#[tokio::test]
async fn test_persistent_failure_marks_row_errored_and_continues() {
    let catalog = FakeCatalog::new()
        .with_song("Halo", "id-halo")
        .with_song("Hello", "id-hello")
        .fail_search("Halo", server_error())
        .fail_search("Halo", server_error())
        .fail_search("Halo", server_error());
    let resolver = resolver(&catalog, RecordingPacer::new(), quiet_config());

    let resolution = resolver
        .resolve(
            &songs(&[("Halo", "Beyonce"), ("Hello", "Adele")]),
            "Song_title",
            "Artist",
        )
        .await
        .unwrap();

    // one attempt plus two retries
    assert_eq!(catalog.searches_for("Halo"), 3);
    assert_eq!(resolution.identifiers[0], None);
    assert_eq!(resolution.errored, vec![0]);
    assert_eq!(resolution.found, ids(&["id-hello"]));
    assert_eq!(resolution.clean.len(), 1);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let catalog = FakeCatalog::new()
        .with_song("Halo", "id-halo")
        .fail_search("Halo", bad_request());
    let resolver = resolver(&catalog, RecordingPacer::new(), quiet_config());

    let resolution = resolver
        .resolve(&songs(&[("Halo", "Beyonce")]), "Song_title", "Artist")
        .await
        .unwrap();

    assert_eq!(catalog.searches_for("Halo"), 1);
    assert_eq!(resolution.errored, vec![0]);
    assert_eq!(resolver_events(&resolver), vec![PaceEvent::ChunkDone(0)]);
}

#[tokio::test]
async fn test_rate_limit_retry_bound() {
    let catalog = FakeCatalog::new()
        .with_song("Halo", "id-halo")
        .fail_search("Halo", rate_limited(1))
        .fail_search("Halo", rate_limited(1));
    let config = BatchConfig {
        max_rate_limit_retries: Some(1),
        ..quiet_config()
    };
    let resolver = resolver(&catalog, RecordingPacer::new(), config);

    let resolution = resolver
        .resolve(&songs(&[("Halo", "Beyonce")]), "Song_title", "Artist")
        .await
        .unwrap();

    assert_eq!(catalog.searches_for("Halo"), 2);
    assert_eq!(resolution.errored, vec![0]);
}

#[tokio::test]
async fn test_missing_column_fails_before_any_call() {
    let catalog = FakeCatalog::new();
    let table = Table::from_rows(["Song_title"], vec![vec![json!("Halo")]]).unwrap();

    let err = resolver(&catalog, RecordingPacer::new(), quiet_config())
        .resolve(&table, "Song_title", "Artist")
        .await
        .unwrap_err();

    assert_eq!(err, TableError::UnknownColumn("Artist".to_string()));
    assert!(catalog.search_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_existing_id_column_is_rejected() {
    let catalog = FakeCatalog::new();
    let table = songs(&[("Halo", "Beyonce")]);

    let err = resolver(&catalog, RecordingPacer::new(), quiet_config())
        .id_column("Artist")
        .resolve(&table, "Song_title", "Artist")
        .await
        .unwrap_err();

    assert_eq!(err, TableError::DuplicateColumn("Artist".to_string()));
}

fn resolver_events(
    resolver: &IdentifierResolver<&FakeCatalog, RecordingPacer>,
) -> Vec<PaceEvent> {
    resolver.pacer().events()
}
