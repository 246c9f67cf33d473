use cardalbum_core::{Album, Attribute, Card, Collection, Record, RecordValidationError};
use serde_json::json;
use uuid::Uuid;

#[test]
fn card_serializes_with_camel_case_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let card = Card::with_id(id, 1_700_000_000_000, "Fox", "data:image/jpeg;base64,AAAA");

    let value = serde_json::to_value(&card).unwrap();
    assert_eq!(
        value,
        json!({
            "id": "11111111-2222-4333-8444-555555555555",
            "name": "Fox",
            "imageDataUrl": "data:image/jpeg;base64,AAAA",
            "attributeIds": [],
            "createdAt": 1_700_000_000_000_i64
        })
    );

    let decoded: Card = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, card);
}

#[test]
fn attribute_omits_absent_image() {
    let attribute = Attribute::new("Forest", None);
    let value = serde_json::to_value(&attribute).unwrap();
    assert!(value.get("imageDataUrl").is_none());

    let with_image = Attribute::new("Night", Some("data:image/png;base64,AA".to_string()));
    let value = serde_json::to_value(&with_image).unwrap();
    assert_eq!(value["imageDataUrl"], "data:image/png;base64,AA");
}

#[test]
fn album_defaults_missing_attribute_ids() {
    let card_id = Uuid::new_v4();
    let album: Album = serde_json::from_value(json!({
        "id": Uuid::new_v4(),
        "title": "Woods",
        "cardIds": [card_id],
        "createdAt": 5
    }))
    .unwrap();

    assert_eq!(album.card_ids, vec![card_id]);
    assert!(album.attribute_ids.is_empty());
    assert!(album.validate().is_ok());
}

#[test]
fn validation_rejects_nil_ids_and_blank_names() {
    let card = Card::with_id(Uuid::nil(), 1, "Fox", "");
    assert_eq!(
        card.validate(),
        Err(RecordValidationError::NilId(Collection::Cards))
    );

    let attribute = Attribute::new("\t", None);
    assert_eq!(
        attribute.validate(),
        Err(RecordValidationError::BlankName(Collection::Attributes))
    );
}

#[test]
fn new_records_get_distinct_ids_and_ordered_timestamps() {
    let first = Card::new("First", "");
    let second = Card::new("Second", "");
    assert_ne!(first.id, second.id);
    assert!(second.created_at >= first.created_at);
}
