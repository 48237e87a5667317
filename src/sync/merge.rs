use crate::quote::Quote;
use std::collections::HashMap;

/// Projection used to decide whether two records are the same quote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupKey {
    Text,
    #[default]
    TextAndAuthor,
}

impl DedupKey {
    pub fn key<'a>(self, quote: &'a Quote) -> (&'a str, &'a str) {
        match self {
            Self::Text => (&quote.text, ""),
            Self::TextAndAuthor => (&quote.text, &quote.author),
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "text+author" | "text-author" | "text_and_author" => {
                Some(Self::TextAndAuthor)
            }
            _ => None,
        }
    }
}

/// Union of `local` and `incoming` keyed by `key`, external winning ties.
///
/// Local order is preserved and a local record whose key appears in the
/// incoming batch is replaced in place. Incoming records with new keys are
/// appended in fetch order; repeated keys inside the batch keep the first.
pub fn merge(local: &[Quote], incoming: &[Quote], key: DedupKey) -> Vec<Quote> {
    let mut by_key: HashMap<(&str, &str), usize> = HashMap::new();
    let mut unique: Vec<&Quote> = Vec::new();
    for q in incoming {
        by_key.entry(key.key(q)).or_insert_with(|| {
            unique.push(q);
            unique.len() - 1
        });
    }

    let mut used = vec![false; unique.len()];
    let mut merged: Vec<Quote> = local
        .iter()
        .map(|q| match by_key.get(&key.key(q)) {
            Some(&i) => {
                used[i] = true;
                unique[i].clone()
            }
            None => q.clone(),
        })
        .collect();

    merged.extend(
        unique
            .iter()
            .zip(used.iter())
            .filter(|(_, seen)| !**seen)
            .map(|(q, _)| (*q).clone()),
    );
    merged
}
