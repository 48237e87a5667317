//! A running session: the quote collection paired with the store it is
//! persisted to. Every mutation is followed by a snapshot write.

use crate::categories::CategoryFilter;
use crate::collection::QuoteBook;
use crate::error::QuoteError;
use crate::persist;
use crate::quote::{Quote, default_quotes};
use crate::store::{KeyValueStore, Scope};
use log::{debug, info, warn};
use rand::Rng;

pub struct Session<S: KeyValueStore> {
    store: S,
    book: QuoteBook,
    filter: CategoryFilter,
}

impl<S: KeyValueStore> Session<S> {
    /// Load the collection (seeding defaults when needed), the session
    /// pointer and the persisted filter.
    pub fn open(mut store: S) -> Self {
        let quotes = persist::load_quotes(&mut store);
        let last_viewed = persist::load_last_viewed(&store);
        let filter = persist::load_filter(&store);
        Self { store, book: QuoteBook::new(quotes, last_viewed), filter }
    }

    pub fn book(&self) -> &QuoteBook {
        &self.book
    }

    pub fn quotes(&self) -> &[Quote] {
        self.book.quotes()
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Re-read the collection, pointer and filter from the store so writes by
    /// other processes are picked up. On a read failure the in-memory state is
    /// left as it was.
    pub fn reload(&mut self) -> Result<(), QuoteError> {
        let quotes = persist::try_load_quotes(&mut self.store).inspect_err(|e| {
            warn!("event=quotes_reload status=failed error={e}");
        })?;
        let last_viewed = persist::load_last_viewed(&self.store);
        self.book = QuoteBook::new(quotes, last_viewed);
        self.filter = persist::load_filter(&self.store);
        debug!("event=quotes_reloaded count={}", self.book.len());
        Ok(())
    }

    /// Append a new quote. Blank text is rejected without touching state.
    pub fn add(
        &mut self,
        text: &str,
        author: &str,
        category: &str,
    ) -> Result<Quote, QuoteError> {
        let quote = Quote::new(text, author, category)
            .ok_or_else(|| QuoteError::validation("Please add quote text."))?;
        self.book.push(quote.clone());
        info!("event=quote_added count={}", self.book.len());
        self.persist_quotes()?;
        Ok(quote)
    }

    /// Remove by 0-based position; `Ok(None)` when out of range.
    pub fn remove_at(&mut self, index: usize) -> Result<Option<Quote>, QuoteError> {
        let Some(removed) = self.book.remove_at(index) else {
            return Ok(None);
        };
        info!("event=quote_removed index={index} count={}", self.book.len());
        let saved = self.persist_quotes();
        self.persist_pointer()?;
        saved?;
        Ok(Some(removed))
    }

    pub fn view(&mut self, index: usize) -> Result<Option<Quote>, QuoteError> {
        let Some(quote) = self.book.view(index).cloned() else {
            return Ok(None);
        };
        self.persist_pointer()?;
        Ok(Some(quote))
    }

    /// View a uniformly chosen quote; `Ok(None)` when the collection is empty.
    pub fn view_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<(usize, Quote)>, QuoteError> {
        let Some(index) = self.book.random_index(rng) else {
            return Ok(None);
        };
        Ok(self.view(index)?.map(|q| (index, q)))
    }

    pub fn replace_all(&mut self, quotes: Vec<Quote>) -> Result<(), QuoteError> {
        self.book.replace_all(quotes);
        self.persist_quotes()
    }

    pub fn append_all(&mut self, quotes: Vec<Quote>) -> Result<(), QuoteError> {
        self.book.append_all(quotes);
        self.persist_quotes()
    }

    /// Reset to the defaults, then drop the stored collection and the session
    /// pointer and reseed. The in-memory reset happens even when the store
    /// fails; the first storage error is returned.
    pub fn clear_to_defaults(&mut self) -> Result<(), QuoteError> {
        self.book = QuoteBook::new(default_quotes(), None);
        if let Err(e) = persist::clear_quotes(&mut self.store) {
            warn!("event=quotes_clear status=failed error={e}");
        }
        let cleared = self.store.clear_scope(Scope::Session).map_err(|e| {
            warn!("event=session_clear status=failed error={e}");
            QuoteError::from(e)
        });
        self.persist_quotes()?;
        cleared
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) -> Result<(), QuoteError> {
        self.filter = filter;
        persist::save_filter(&mut self.store, &self.filter)?;
        Ok(())
    }

    fn persist_quotes(&mut self) -> Result<(), QuoteError> {
        persist::save_quotes(&mut self.store, self.book.quotes()).map_err(|e| {
            warn!("event=quotes_save status=failed error={e}");
            QuoteError::from(e)
        })
    }

    fn persist_pointer(&mut self) -> Result<(), QuoteError> {
        persist::save_last_viewed(&mut self.store, self.book.last_viewed())?;
        Ok(())
    }
}
