use crate::quote::Quote;
use rand::Rng;

/// Ordered quote collection plus the session's last-viewed pointer.
/// Purely in-memory; `Session` pairs it with a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteBook {
    quotes: Vec<Quote>,
    last_viewed: Option<usize>,
}

impl QuoteBook {
    pub fn new(quotes: Vec<Quote>, last_viewed: Option<usize>) -> Self {
        Self { quotes, last_viewed }
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Quote> {
        self.quotes.get(index)
    }

    /// Raw pointer value; it may be out of range after a replace.
    pub fn last_viewed(&self) -> Option<usize> {
        self.last_viewed
    }

    pub fn push(&mut self, quote: Quote) {
        self.quotes.push(quote);
    }

    pub fn append_all(&mut self, quotes: Vec<Quote>) {
        self.quotes.extend(quotes);
    }

    pub fn replace_all(&mut self, quotes: Vec<Quote>) {
        self.quotes = quotes;
    }

    /// Remove the quote at `index`. Out of range is a no-op. The last-viewed
    /// pointer is cleared when it pointed at the removed entry and shifted
    /// down when it pointed past it.
    pub fn remove_at(&mut self, index: usize) -> Option<Quote> {
        if index >= self.quotes.len() {
            return None;
        }
        let removed = self.quotes.remove(index);
        self.last_viewed = match self.last_viewed {
            Some(p) if p == index => None,
            Some(p) if p > index => Some(p - 1),
            other => other,
        };
        Some(removed)
    }

    /// Mark `index` as viewed. Out of range leaves the pointer untouched.
    pub fn view(&mut self, index: usize) -> Option<&Quote> {
        if index >= self.quotes.len() {
            return None;
        }
        self.last_viewed = Some(index);
        self.quotes.get(index)
    }

    pub fn random_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.is_empty() {
            None
        } else {
            Some(rng.gen_range(0..self.quotes.len()))
        }
    }
}
