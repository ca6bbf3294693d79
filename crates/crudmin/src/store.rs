//! Data-access seams implemented by the host application.
//!
//! The admin never persists anything itself. Every read and write goes
//! through an [`Accessor`], optional full-text lookups through a
//! [`Searcher`], and primary keys are turned into URL segments by a
//! [`PkStringer`].

use crudmin_router::{BoxFuture, FormData};

use crate::error::StoreResult;
use crate::list::SortOrder;
use crate::marshal::display_value;
use crate::record::{FieldValue, Record};

/// A page of records returned by a store.
pub type Records = Vec<Box<dyn Record>>;

/// Read/write access to the records of one model.
pub trait Accessor: Send + Sync {
    /// Returns an empty record, used for widget inference and the create form.
    fn prototype(&self) -> Box<dyn Record>;

    /// Fetches one record.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError::NotFound) or
    /// [`StoreError::InvalidId`](crate::StoreError::InvalidId) for a missing
    /// or malformed key.
    fn get<'a>(&'a self, pk: &'a str) -> BoxFuture<'a, StoreResult<Box<dyn Record>>>;

    /// Fetches page `page` (zero-based) of `page_size` records.
    fn list<'a>(
        &'a self,
        page_size: usize,
        page: usize,
        sort: Option<&'a SortOrder>,
    ) -> BoxFuture<'a, StoreResult<Records>>;

    /// Returns the total number of records.
    fn count(&self) -> BoxFuture<'_, StoreResult<usize>>;

    /// Creates (empty `pk`) or updates a record from submitted values and
    /// returns its primary key.
    fn upsert<'a>(&'a self, pk: &'a str, values: &'a FormData) -> BoxFuture<'a, StoreResult<String>>;

    /// Deletes one record.
    fn delete<'a>(&'a self, pk: &'a str) -> BoxFuture<'a, StoreResult<()>>;
}

/// Optional search capability of a model.
pub trait Searcher: Send + Sync {
    /// Hint shown in the search box.
    fn placeholder(&self) -> &str;

    /// Returns one page of matching records and the total match count.
    fn search<'a>(
        &'a self,
        page_size: usize,
        page: usize,
        query: &'a str,
        sort: Option<&'a SortOrder>,
    ) -> BoxFuture<'a, StoreResult<(Records, usize)>>;
}

/// Converts a primary key value into its URL form.
pub trait PkStringer: Send + Sync {
    fn pk_string(&self, value: &FieldValue<'_>) -> String;
}

impl<F> PkStringer for F
where
    F: Fn(&FieldValue<'_>) -> String + Send + Sync,
{
    fn pk_string(&self, value: &FieldValue<'_>) -> String {
        self(value)
    }
}

/// Renders scalar keys through their canonical string form.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayPk;

impl PkStringer for DisplayPk {
    fn pk_string(&self, value: &FieldValue<'_>) -> String {
        display_value(value)
    }
}
