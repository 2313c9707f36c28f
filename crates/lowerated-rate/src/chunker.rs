//! Splitting the review corpus into bounded-size chunks.
//!
//! Chunk lengths are measured in Unicode scalar values, never bytes, so a
//! chunk boundary can not land inside a multi-byte character.

use std::iter::FusedIterator;
use std::num::NonZeroUsize;

/// Concatenate reviews into one text blob, newline separated.
#[must_use]
pub fn join_reviews<S: AsRef<str>>(reviews: &[S]) -> String {
    let mut text = String::new();
    for (i, review) in reviews.iter().enumerate() {
        if i > 0 {
            text.push('\n');
        }
        text.push_str(review.as_ref());
    }
    text
}

/// Number of chunks [`ReviewChunks`] yields for `text`: `ceil(len / size)`, or 1 when empty.
#[must_use]
pub fn chunk_count(text: &str, chunk_size: NonZeroUsize) -> usize {
    text.chars().count().div_ceil(chunk_size.get()).max(1)
}

/// Lazy iterator over contiguous, non-overlapping chunks of `text`.
///
/// Every chunk but the last holds exactly `chunk_size` characters. An empty
/// input yields a single empty chunk so downstream averaging always has a
/// non-zero denominator. Cloning the iterator restarts from its current
/// position.
#[derive(Debug, Clone)]
pub struct ReviewChunks<'a> {
    rest: &'a str,
    chunk_size: NonZeroUsize,
    started: bool,
}

impl<'a> ReviewChunks<'a> {
    #[must_use]
    pub fn new(text: &'a str, chunk_size: NonZeroUsize) -> Self {
        Self {
            rest: text,
            chunk_size,
            started: false,
        }
    }
}

impl<'a> Iterator for ReviewChunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            if self.started {
                return None;
            }
            self.started = true;
            return Some("");
        }

        self.started = true;
        let split = self
            .rest
            .char_indices()
            .nth(self.chunk_size.get())
            .map_or(self.rest.len(), |(byte_idx, _)| byte_idx);
        let (chunk, rest) = self.rest.split_at(split);
        self.rest = rest;
        Some(chunk)
    }
}

impl FusedIterator for ReviewChunks<'_> {}
