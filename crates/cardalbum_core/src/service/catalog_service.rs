//! Catalog use-case service and referential integrity coordinator.
//!
//! # Responsibility
//! - Register, edit and delete cards, albums and attribute labels.
//! - Cascade card deletion into every album that references the card.
//! - Validate album card cardinality and existence before writes.
//! - Drop attribute ids that no longer resolve before writes.
//! - Resolve albums for display, dropping references that no longer resolve.
//!
//! # Invariants
//! - Album writes carry `1..=20` distinct card ids that all exist.
//! - Writes never fail on a stale attribute id; the id is dropped instead.
//! - Attribute deletion never rewrites albums or cards.
//! - A cascade never rolls back the card removal; album rewrite failures
//!   are collected in the returned `CascadeReport`.
//! - Stale references are never an error on read paths.

use crate::model::album::{Album, AlbumId};
use crate::model::attribute::{Attribute, AttributeId};
use crate::model::card::{Card, CardId};
use crate::model::selection::CardSelection;
use crate::model::{dedup_ids, Record, RecordId};
use crate::repo::{
    AlbumRepository, AttributeRepository, CardRepository, RepoError, RepoResult, Repository,
};
use crate::store::{RecordStore, StoreError};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Input for registering one card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCard {
    pub name: String,
    /// Encoded image produced by the caller; may be empty.
    pub image_data_url: String,
    pub attribute_ids: Vec<AttributeId>,
}

/// Field-wise card edit. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardEdit {
    pub name: Option<String>,
    pub image_data_url: Option<String>,
    pub attribute_ids: Option<Vec<AttributeId>>,
}

/// Field-wise attribute edit. `None` keeps the stored value;
/// `image_data_url: Some(None)` clears the image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeEdit {
    pub name: Option<String>,
    pub image_data_url: Option<Option<String>>,
}

/// Album with its references resolved for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumView {
    pub album: Album,
    /// Resolved cards in album order. Unresolved ids are omitted.
    pub cards: Vec<Card>,
    /// Resolved attributes in album order. Unresolved ids are omitted.
    pub attributes: Vec<Attribute>,
    /// Image of the first resolved card, when it has one.
    pub cover_image: Option<String>,
}

impl AlbumView {
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .map(|attribute| attribute.name.as_str())
            .collect()
    }
}

/// One step of a card-deletion cascade that did not complete.
#[derive(Debug)]
pub enum CascadeFailure {
    /// Albums could not be loaded; none were rewritten.
    LoadAlbums(StoreError),
    /// One album still references the deleted card.
    RewriteAlbum { album_id: AlbumId, error: StoreError },
}

impl Display for CascadeFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoadAlbums(err) => write!(f, "failed to load albums: {err}"),
            Self::RewriteAlbum { album_id, error } => {
                write!(f, "failed to rewrite album {album_id}: {error}")
            }
        }
    }
}

/// Outcome of `CatalogService::delete_card`.
#[derive(Debug)]
pub struct CascadeReport {
    pub card_id: CardId,
    /// Whether the card record existed and was removed.
    pub card_removed: bool,
    /// Albums rewritten without the card.
    pub rewritten_albums: Vec<AlbumId>,
    /// Subset of `rewritten_albums` left without any card.
    pub emptied_albums: Vec<AlbumId>,
    pub failures: Vec<CascadeFailure>,
}

impl CascadeReport {
    fn new(card_id: CardId, card_removed: bool) -> Self {
        Self {
            card_id,
            card_removed,
            rewritten_albums: Vec::new(),
            emptied_albums: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Whether every album referencing the card was rewritten.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Catalog service over one record store.
pub struct CatalogService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store, e.g. for backup export/import.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cards(&self) -> CardRepository<'_, S> {
        Repository::new(&self.store)
    }

    pub fn albums(&self) -> AlbumRepository<'_, S> {
        Repository::new(&self.store)
    }

    pub fn attributes(&self) -> AttributeRepository<'_, S> {
        Repository::new(&self.store)
    }

    /// Registers one card with a fresh id and timestamp.
    pub fn register_card(&self, request: NewCard) -> RepoResult<Card> {
        let mut card = Card::new(request.name.trim(), request.image_data_url);
        card.validate()?;
        card.attribute_ids = self.live_attribute_ids(request.attribute_ids)?;
        self.cards().upsert(&card)?;

        info!(
            "event=card_register module=catalog status=ok card_id={} has_image={}",
            card.id,
            card.image().is_some()
        );
        Ok(card)
    }

    /// Replaces the provided card fields and keeps the rest.
    pub fn edit_card(&self, id: CardId, edit: CardEdit) -> RepoResult<Card> {
        let mut card = self.cards().require(id)?;
        if let Some(name) = edit.name {
            card.name = name.trim().to_string();
        }
        if let Some(image_data_url) = edit.image_data_url {
            card.image_data_url = image_data_url;
        }
        card.validate()?;
        if let Some(attribute_ids) = edit.attribute_ids {
            card.attribute_ids = self.live_attribute_ids(attribute_ids)?;
        }
        self.cards().upsert(&card)?;

        info!("event=card_edit module=catalog status=ok card_id={id}");
        Ok(card)
    }

    pub fn get_card(&self, id: CardId) -> RepoResult<Option<Card>> {
        self.cards().get(id)
    }

    /// Lists cards newest first.
    pub fn list_cards(&self) -> RepoResult<Vec<Card>> {
        let mut cards = self.cards().list()?;
        sort_newest_first(&mut cards);
        Ok(cards)
    }

    /// Deletes a card and removes it from every album that references it.
    ///
    /// The cascade also runs when the card is already gone, so calling this
    /// again finishes an interrupted cascade.
    ///
    /// # Errors
    /// Only a failure to remove the card itself is returned as `Err`.
    /// Everything after that is reported in `CascadeReport::failures`.
    pub fn delete_card(&self, id: CardId) -> RepoResult<CascadeReport> {
        let card_removed = self.cards().remove(id)?;
        let mut report = CascadeReport::new(id, card_removed);

        let albums = match self.store.get_all::<Album>() {
            Ok(albums) => albums,
            Err(error) => {
                warn!(
                    "event=card_delete_cascade module=catalog status=error card_id={id} error_code=albums_load_failed error={error}"
                );
                report.failures.push(CascadeFailure::LoadAlbums(error));
                return Ok(report);
            }
        };

        for mut album in albums {
            if !album.remove_card(id) {
                continue;
            }
            // Written through the store: an emptied album is kept as-is.
            match self.store.put(&album) {
                Ok(()) => {
                    if album.card_ids.is_empty() {
                        report.emptied_albums.push(album.id);
                    }
                    report.rewritten_albums.push(album.id);
                }
                Err(error) => {
                    warn!(
                        "event=card_delete_cascade module=catalog status=error card_id={id} album_id={} error_code=album_rewrite_failed error={error}",
                        album.id
                    );
                    report.failures.push(CascadeFailure::RewriteAlbum {
                        album_id: album.id,
                        error,
                    });
                }
            }
        }

        info!(
            "event=card_delete module=catalog status={} card_id={id} card_removed={} rewritten={} emptied={} failures={}",
            if report.is_complete() { "ok" } else { "partial" },
            report.card_removed,
            report.rewritten_albums.len(),
            report.emptied_albums.len(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Creates an album after validating title, cardinality and card ids.
    ///
    /// Repeated ids are collapsed before counting. Attribute ids that do not
    /// resolve are dropped.
    pub fn create_album(
        &self,
        title: impl Into<String>,
        card_ids: Vec<CardId>,
        attribute_ids: Vec<AttributeId>,
    ) -> RepoResult<Album> {
        let title = title.into();
        let attribute_ids = self.live_attribute_ids(attribute_ids)?;
        let album = Album::new(title.trim(), dedup_ids(card_ids), attribute_ids);
        self.write_album(&album)?;

        info!(
            "event=album_create module=catalog status=ok album_id={} cards={} attributes={}",
            album.id,
            album.card_ids.len(),
            album.attribute_ids.len()
        );
        Ok(album)
    }

    /// Creates an album from the caller's in-progress card selection.
    pub fn create_album_from_selection(
        &self,
        title: impl Into<String>,
        selection: &CardSelection,
        attribute_ids: Vec<AttributeId>,
    ) -> RepoResult<Album> {
        self.create_album(title, selection.card_ids().to_vec(), attribute_ids)
    }

    /// Replaces title and references of an existing album.
    ///
    /// Keeps the album's id and creation time. Stale attribute ids, e.g.
    /// from a deleted attribute still stored on the album, are dropped.
    pub fn update_album(
        &self,
        id: AlbumId,
        title: impl Into<String>,
        card_ids: Vec<CardId>,
        attribute_ids: Vec<AttributeId>,
    ) -> RepoResult<Album> {
        let existing = self.albums().require(id)?;
        let title = title.into();
        let attribute_ids = self.live_attribute_ids(attribute_ids)?;
        let album = Album::with_id(
            existing.id,
            existing.created_at,
            title.trim(),
            dedup_ids(card_ids),
            attribute_ids,
        );
        self.write_album(&album)?;

        info!(
            "event=album_update module=catalog status=ok album_id={id} cards={} attributes={}",
            album.card_ids.len(),
            album.attribute_ids.len()
        );
        Ok(album)
    }

    pub fn delete_album(&self, id: AlbumId) -> RepoResult<bool> {
        let removed = self.albums().remove(id)?;
        info!("event=album_delete module=catalog status=ok album_id={id} removed={removed}");
        Ok(removed)
    }

    pub fn get_album(&self, id: AlbumId) -> RepoResult<Option<Album>> {
        self.albums().get(id)
    }

    /// Lists albums newest first.
    pub fn list_albums(&self) -> RepoResult<Vec<Album>> {
        let mut albums = self.albums().list()?;
        sort_newest_first(&mut albums);
        Ok(albums)
    }

    /// Loads one album with cards and attributes resolved.
    pub fn resolve_album(&self, id: AlbumId) -> RepoResult<Option<AlbumView>> {
        let Some(album) = self.albums().get(id)? else {
            return Ok(None);
        };
        let cards = self.resolve::<Card>(&album.card_ids)?;
        let attributes = self.resolve::<Attribute>(&album.attribute_ids)?;
        let cover_image = cards
            .first()
            .and_then(Card::image)
            .map(ToString::to_string);

        Ok(Some(AlbumView {
            album,
            cards,
            attributes,
            cover_image,
        }))
    }

    /// Names of the attributes that still exist, in reference order.
    pub fn resolve_attribute_names(&self, ids: &[AttributeId]) -> RepoResult<Vec<String>> {
        Ok(self
            .resolve::<Attribute>(ids)?
            .into_iter()
            .map(|attribute| attribute.name)
            .collect())
    }

    /// Finds albums labelled with a matching attribute.
    ///
    /// The keyword matches case-insensitively as a substring of an attribute
    /// name attached to the album or to any of its cards. A blank keyword
    /// returns every album. Results are newest first.
    pub fn search_albums(&self, keyword: &str) -> RepoResult<Vec<Album>> {
        let needle = keyword.trim().to_lowercase();
        let mut albums = self.list_albums()?;
        if needle.is_empty() {
            return Ok(albums);
        }

        let attribute_names: HashMap<AttributeId, String> = self
            .attributes()
            .list()?
            .into_iter()
            .map(|attribute| (attribute.id, attribute.name.to_lowercase()))
            .collect();
        let card_attributes: HashMap<CardId, Vec<AttributeId>> = self
            .cards()
            .list()?
            .into_iter()
            .map(|card| (card.id, card.attribute_ids))
            .collect();

        let labelled = |ids: &[AttributeId]| {
            ids.iter()
                .filter_map(|id| attribute_names.get(id))
                .any(|name| name.contains(needle.as_str()))
        };
        albums.retain(|album| {
            labelled(album.attribute_ids.as_slice())
                || album
                    .card_ids
                    .iter()
                    .filter_map(|id| card_attributes.get(id))
                    .any(|ids| labelled(ids.as_slice()))
        });
        Ok(albums)
    }

    pub fn create_attribute(
        &self,
        name: impl Into<String>,
        image_data_url: Option<String>,
    ) -> RepoResult<Attribute> {
        let name = name.into();
        let attribute = Attribute::new(name.trim(), image_data_url);
        self.attributes().upsert(&attribute)?;
        info!(
            "event=attribute_create module=catalog status=ok attribute_id={}",
            attribute.id
        );
        Ok(attribute)
    }

    pub fn edit_attribute(&self, id: AttributeId, edit: AttributeEdit) -> RepoResult<Attribute> {
        let mut attribute = self.attributes().require(id)?;
        if let Some(name) = edit.name {
            attribute.name = name.trim().to_string();
        }
        if let Some(image_data_url) = edit.image_data_url {
            attribute.image_data_url = image_data_url;
        }
        self.attributes().upsert(&attribute)?;
        info!("event=attribute_edit module=catalog status=ok attribute_id={id}");
        Ok(attribute)
    }

    /// Deletes one attribute label. Albums and cards keep the stale id.
    pub fn delete_attribute(&self, id: AttributeId) -> RepoResult<bool> {
        let removed = self.attributes().remove(id)?;
        info!(
            "event=attribute_delete module=catalog status=ok attribute_id={id} removed={removed}"
        );
        Ok(removed)
    }

    pub fn get_attribute(&self, id: AttributeId) -> RepoResult<Option<Attribute>> {
        self.attributes().get(id)
    }

    /// Lists attributes newest first.
    pub fn list_attributes(&self) -> RepoResult<Vec<Attribute>> {
        let mut attributes = self.attributes().list()?;
        sort_newest_first(&mut attributes);
        Ok(attributes)
    }

    fn write_album(&self, album: &Album) -> RepoResult<()> {
        album.validate()?;
        self.ensure_exist::<Card>(&album.card_ids)?;
        self.albums().upsert(album)
    }

    /// Deduplicates attribute ids and keeps only those that still resolve.
    fn live_attribute_ids(&self, ids: Vec<AttributeId>) -> RepoResult<Vec<AttributeId>> {
        let mut live = Vec::new();
        for id in dedup_ids(ids) {
            if self.store.get::<Attribute>(id)?.is_some() {
                live.push(id);
            } else {
                debug!("event=attribute_ref_dropped module=catalog status=ok attribute_id={id}");
            }
        }
        Ok(live)
    }

    fn ensure_exist<T: Record>(&self, ids: &[RecordId]) -> RepoResult<()> {
        for id in ids {
            if self.store.get::<T>(*id)?.is_none() {
                return Err(RepoError::DanglingReference {
                    collection: T::COLLECTION,
                    id: *id,
                });
            }
        }
        Ok(())
    }

    fn resolve<T: Record>(&self, ids: &[RecordId]) -> RepoResult<Vec<T>> {
        let mut resolved = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.store.get::<T>(*id)? {
                resolved.push(record);
            }
        }
        Ok(resolved)
    }
}

fn sort_newest_first<T: Record>(records: &mut [T]) {
    records.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}
