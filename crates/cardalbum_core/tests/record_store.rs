use cardalbum_core::db::open_db_in_memory;
use cardalbum_core::{
    Album, Attribute, Card, Collection, ErrorKind, RecordStore, SqliteRecordStore, StoreError,
};
use uuid::Uuid;

#[test]
fn put_then_get_all_returns_records() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let fox = Card::new("Fox", "data:image/jpeg;base64,AAAA");
    let owl = Card::new("Owl", "");
    store.put(&fox).unwrap();
    store.put(&owl).unwrap();

    let mut ids: Vec<_> = store
        .get_all::<Card>()
        .unwrap()
        .into_iter()
        .map(|card| card.id)
        .collect();
    ids.sort();
    let mut expected = vec![fox.id, owl.id];
    expected.sort();
    assert_eq!(ids, expected);

    assert_eq!(store.get::<Card>(fox.id).unwrap(), Some(fox));
}

#[test]
fn empty_collection_reads_as_empty() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    assert!(store.get_all::<Album>().unwrap().is_empty());
    assert!(store.get_all::<Attribute>().unwrap().is_empty());
    assert_eq!(store.get::<Card>(Uuid::new_v4()).unwrap(), None);
}

#[test]
fn put_is_full_overwrite_and_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let mut card = Card::new("Draft", "");
    store.put(&card).unwrap();
    card.name = "Final".to_string();
    card.image_data_url = "data:image/jpeg;base64,BBBB".to_string();
    store.put(&card).unwrap();
    store.put(&card).unwrap();

    let all = store.get_all::<Card>().unwrap();
    assert_eq!(all, vec![card]);
}

#[test]
fn delete_removes_and_absent_delete_is_noop() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let attribute = Attribute::new("Forest", None);
    store.put(&attribute).unwrap();

    assert!(store.delete(Collection::Attributes, attribute.id).unwrap());
    assert!(!store.delete(Collection::Attributes, attribute.id).unwrap());
    assert!(store.get_all::<Attribute>().unwrap().is_empty());
}

#[test]
fn collections_are_isolated_by_name() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let card = Card::new("Fox", "");
    store.put(&card).unwrap();

    assert!(!store.delete(Collection::Albums, card.id).unwrap());
    assert_eq!(store.get_all::<Card>().unwrap().len(), 1);
}

#[test]
fn put_all_writes_whole_batch() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let cards: Vec<_> = (0..5).map(|idx| Card::new(format!("card {idx}"), "")).collect();
    store.put_all(&cards).unwrap();
    store.put_all::<Card>(&[]).unwrap();

    assert_eq!(store.get_all::<Card>().unwrap().len(), 5);
}

#[test]
fn undecodable_rows_are_reported_not_skipped() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store.put(&Card::new("Fox", "")).unwrap();

    conn.execute(
        "INSERT INTO cards (id, created_at, body) VALUES ('broken', 1, 'not json');",
        [],
    )
    .unwrap();

    let err = store.get_all::<Card>().unwrap_err();
    assert!(matches!(
        err,
        StoreError::Corrupt {
            collection: Collection::Cards,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Read);
}

#[test]
fn row_key_must_match_body_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let card = Card::new("Fox", "");
    let other_id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO cards (id, created_at, body) VALUES (?1, 1, ?2);",
        rusqlite::params![
            other_id.to_string(),
            serde_json::to_string(&card).unwrap()
        ],
    )
    .unwrap();

    let err = store.get::<Card>(other_id).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    let card = Card::new("Fox", "");

    {
        let conn = cardalbum_core::db::open_db(&path).unwrap();
        let store = SqliteRecordStore::try_new(&conn).unwrap();
        store.put(&card).unwrap();
    }

    let conn = cardalbum_core::db::open_db(&path).unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    assert_eq!(store.get::<Card>(card.id).unwrap(), Some(card));
}
