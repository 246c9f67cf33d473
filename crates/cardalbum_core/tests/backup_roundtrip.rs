use cardalbum_core::db::open_db_in_memory;
use cardalbum_core::{
    export_all, export_json, import_all, import_json, parse_document, Album, Attribute,
    BackupDocument, BackupError, Card, CatalogService, Collection, ErrorKind, NewCard,
    RecordStore, SqliteRecordStore,
};
use rusqlite::Connection;
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

fn catalog(conn: &Connection) -> CatalogService<SqliteRecordStore<'_>> {
    CatalogService::new(SqliteRecordStore::try_new(conn).unwrap())
}

fn seed(service: &CatalogService<SqliteRecordStore<'_>>) {
    let forest = service.create_attribute("Forest", None).unwrap();
    let fox = service
        .register_card(NewCard {
            name: "Fox".to_string(),
            image_data_url: "data:image/jpeg;base64,Rm94".to_string(),
            attribute_ids: vec![forest.id],
        })
        .unwrap();
    let owl = service
        .register_card(NewCard {
            name: "Owl".to_string(),
            ..NewCard::default()
        })
        .unwrap();
    service
        .create_album("Woods", vec![fox.id, owl.id], vec![forest.id])
        .unwrap();
}

fn by_id<T, K: Ord>(records: Vec<T>, key: impl Fn(&T) -> K) -> BTreeMap<K, T> {
    records.into_iter().map(|record| (key(&record), record)).collect()
}

fn assert_same_contents(left: BackupDocument, right: BackupDocument) {
    assert_eq!(by_id(left.cards, |c: &Card| c.id), by_id(right.cards, |c: &Card| c.id));
    assert_eq!(
        by_id(left.albums, |a: &Album| a.id),
        by_id(right.albums, |a: &Album| a.id)
    );
    assert_eq!(
        by_id(left.attributes, |a: &Attribute| a.id),
        by_id(right.attributes, |a: &Attribute| a.id)
    );
}

#[test]
fn export_then_import_into_empty_store_round_trips() {
    let source_conn = open_db_in_memory().unwrap();
    let source = catalog(&source_conn);
    seed(&source);
    // An album emptied by a cascade must survive the trip too.
    let solo = source
        .register_card(NewCard {
            name: "Solo".to_string(),
            ..NewCard::default()
        })
        .unwrap();
    source.create_album("Single", vec![solo.id], Vec::new()).unwrap();
    source.delete_card(solo.id).unwrap();

    let text = export_json(source.store()).unwrap();

    let target_conn = open_db_in_memory().unwrap();
    let target = SqliteRecordStore::try_new(&target_conn).unwrap();
    let summary = import_json(&target, &text).unwrap();
    assert_eq!((summary.cards, summary.albums, summary.attributes), (2, 2, 1));

    assert_same_contents(
        export_all(source.store()).unwrap(),
        export_all(&target).unwrap(),
    );
}

#[test]
fn two_cards_one_album_scenario() {
    let source_conn = open_db_in_memory().unwrap();
    let source = catalog(&source_conn);
    let fox = source
        .register_card(NewCard {
            name: "Fox".to_string(),
            ..NewCard::default()
        })
        .unwrap();
    let owl = source
        .register_card(NewCard {
            name: "Owl".to_string(),
            ..NewCard::default()
        })
        .unwrap();
    source.create_album("Pair", vec![fox.id, owl.id], Vec::new()).unwrap();

    let document = export_all(source.store()).unwrap();

    let target_conn = open_db_in_memory().unwrap();
    let target = catalog(&target_conn);
    import_all(target.store(), &document).unwrap();

    assert_eq!(target.list_cards().unwrap().len(), 2);
    assert_eq!(target.list_albums().unwrap().len(), 1);
    assert_eq!(target.list_attributes().unwrap().len(), 0);
}

#[test]
fn export_document_uses_interchange_keys() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);
    seed(&service);

    let value: serde_json::Value = serde_json::from_str(&export_json(service.store()).unwrap()).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys.len(), 3);
    for collection in Collection::ALL {
        assert!(value[collection.name()].is_array(), "missing {collection}");
    }
    let album = &value["albums"][0];
    assert!(album["cardIds"].is_array());
    assert!(album["attributeIds"].is_array());
    assert!(album["createdAt"].is_i64());
}

#[test]
fn import_merges_instead_of_replacing() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);
    let kept = service
        .register_card(NewCard {
            name: "Kept".to_string(),
            ..NewCard::default()
        })
        .unwrap();
    let overwritten = service
        .register_card(NewCard {
            name: "Old name".to_string(),
            ..NewCard::default()
        })
        .unwrap();

    let mut replacement = overwritten.clone();
    replacement.name = "New name".to_string();
    let incoming = Card::new("Incoming", "");
    let document = BackupDocument {
        cards: vec![replacement.clone(), incoming.clone()],
        ..BackupDocument::default()
    };
    import_all(service.store(), &document).unwrap();

    assert_eq!(service.get_card(kept.id).unwrap(), Some(kept));
    assert_eq!(service.get_card(overwritten.id).unwrap(), Some(replacement));
    assert_eq!(service.get_card(incoming.id).unwrap(), Some(incoming));
    assert_eq!(service.list_cards().unwrap().len(), 3);
}

#[test]
fn import_twice_is_idempotent() {
    let source_conn = open_db_in_memory().unwrap();
    let source = catalog(&source_conn);
    seed(&source);
    let text = export_json(source.store()).unwrap();

    let target_conn = open_db_in_memory().unwrap();
    let target = SqliteRecordStore::try_new(&target_conn).unwrap();
    import_json(&target, &text).unwrap();
    let once = export_all(&target).unwrap();
    import_json(&target, &text).unwrap();
    assert_same_contents(once, export_all(&target).unwrap());
}

#[test]
fn legacy_document_without_attributes_imports() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let card_id = Uuid::new_v4();
    let text = json!({
        "cards": [{
            "id": card_id,
            "name": "Fox",
            "genres": ["forest"],
            "imageDataUrl": "data:image/jpeg;base64,AAAA",
            "createdAt": 1_700_000_000_000_i64
        }],
        "albums": [{
            "id": Uuid::new_v4(),
            "title": "Woods",
            "genres": [],
            "cardIds": [card_id],
            "createdAt": 1_700_000_000_500_i64
        }]
    })
    .to_string();

    let summary = import_json(&store, &text).unwrap();
    assert_eq!(summary.attributes, 0);
    let cards = store.get_all::<Card>().unwrap();
    assert_eq!(cards.len(), 1);
    assert!(cards[0].attribute_ids.is_empty());
    let albums = store.get_all::<Album>().unwrap();
    assert_eq!(albums[0].card_ids, vec![card_id]);
}

#[test]
fn malformed_documents_are_rejected_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let good_card = json!({"id": Uuid::new_v4(), "name": "Fox", "createdAt": 1});

    let cases = [
        "not json".to_string(),
        json!([good_card]).to_string(),
        json!({"cards": {"id": "x"}}).to_string(),
        json!({"cards": [good_card, {"name": "No id", "createdAt": 2}]}).to_string(),
        json!({"cards": [good_card], "albums": [{
            "id": Uuid::new_v4(),
            "title": "Too many",
            "cardIds": (0..21).map(|_| Uuid::new_v4()).collect::<Vec<_>>(),
            "createdAt": 3
        }]})
        .to_string(),
        json!({"cards": [good_card], "attributes": [{"id": Uuid::nil(), "name": "Nil", "createdAt": 4}]})
            .to_string(),
    ];

    for text in &cases {
        let err = import_json(&store, text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ImportFormat, "case {text}");
        assert!(store.get_all::<Card>().unwrap().is_empty(), "case {text}");
    }
}

#[test]
fn parse_reports_offending_record() {
    let text = json!({
        "albums": [{"id": Uuid::new_v4(), "title": "", "cardIds": [], "createdAt": 1}]
    })
    .to_string();

    match parse_document(&text).unwrap_err() {
        BackupError::InvalidRecord {
            collection: Collection::Albums,
            index: 0,
            message,
        } => assert!(message.contains("title")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn import_all_revalidates_programmatic_documents() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let document = BackupDocument {
        cards: vec![Card::new("Fine", ""), Card::new(" ", "")],
        ..BackupDocument::default()
    };

    let err = import_all(&store, &document).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ImportFormat);
    assert!(store.get_all::<Card>().unwrap().is_empty());
}

#[test]
fn import_counts_album_card_ids_without_a_card() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let card = Card::new("Fox", "");
    let missing = Uuid::new_v4();
    let document = BackupDocument {
        cards: vec![card.clone()],
        albums: vec![Album::new("Woods", vec![card.id, missing], Vec::new())],
        ..BackupDocument::default()
    };

    let summary = import_all(&store, &document).unwrap();
    assert_eq!(summary.unresolved_card_ids, 1);
    assert_eq!(store.get_all::<Album>().unwrap()[0].card_ids, vec![card.id, missing]);

    // A later import that brings the card resolves the reference.
    let follow_up = BackupDocument {
        cards: vec![Card::with_id(missing, 1, "Owl", "")],
        albums: document.albums.clone(),
        ..BackupDocument::default()
    };
    assert_eq!(import_all(&store, &follow_up).unwrap().unresolved_card_ids, 0);
}

#[test]
fn absent_optional_fields_are_normalized_on_reexport() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let card_id = Uuid::new_v4();
    let text = json!({
        "cards": [{"id": card_id, "name": "Fox", "createdAt": 1}]
    })
    .to_string();
    import_json(&store, &text).unwrap();

    let exported: serde_json::Value = serde_json::from_str(&export_json(&store).unwrap()).unwrap();
    let card = &exported["cards"][0];
    assert_eq!(card["imageDataUrl"], "");
    assert_eq!(card["attributeIds"], json!([]));
}
