//! Generic typed repository and its per-collection aliases.

use super::{RepoError, RepoResult};
use crate::model::album::Album;
use crate::model::attribute::Attribute;
use crate::model::card::Card;
use crate::model::{Record, RecordId};
use crate::store::RecordStore;
use std::marker::PhantomData;

/// Typed CRUD facade for one collection.
pub struct Repository<'s, S: RecordStore, T: Record> {
    store: &'s S,
    _record: PhantomData<fn() -> T>,
}

pub type CardRepository<'s, S> = Repository<'s, S, Card>;
pub type AlbumRepository<'s, S> = Repository<'s, S, Album>;
pub type AttributeRepository<'s, S> = Repository<'s, S, Attribute>;

impl<'s, S: RecordStore, T: Record> Repository<'s, S, T> {
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Lists every record in the collection.
    pub fn list(&self) -> RepoResult<Vec<T>> {
        Ok(self.store.get_all()?)
    }

    pub fn get(&self, id: RecordId) -> RepoResult<Option<T>> {
        Ok(self.store.get(id)?)
    }

    /// Loads one record or fails with `NotFound`.
    pub fn require(&self, id: RecordId) -> RepoResult<T> {
        self.get(id)?.ok_or(RepoError::NotFound {
            collection: T::COLLECTION,
            id,
        })
    }

    /// Validates and writes one record, replacing any record with its id.
    pub fn upsert(&self, record: &T) -> RepoResult<()> {
        record.validate()?;
        self.store.put(record)?;
        Ok(())
    }

    /// Removes one record. Absent ids are a no-op that returns `false`.
    pub fn remove(&self, id: RecordId) -> RepoResult<bool> {
        Ok(self.store.delete(T::COLLECTION, id)?)
    }
}
