//! Comment sentiment scoring for reachdb.
//!
//! Classifies each comment in a corpus as positive, neutral, or negative
//! using a weighted word-and-emoji lexicon, and aggregates the counts into
//! a percentage [`reachdb_core::SentimentBreakdown`]. Pure and infallible:
//! empty input yields the all-zero breakdown.

pub mod scorer;

pub use scorer::{comment_score, score_comments};
