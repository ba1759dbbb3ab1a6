//! Lexicon scorer for social-media comment sentiment.

use reachdb_core::SentimentBreakdown;

/// Word weights for comment text.
///
/// Keys are lowercase single words (including common slang). Values in
/// `(0.0, 1.0]` are positive, in `[-1.0, 0.0)` negative. A comment's score
/// is the clamped sum of its matched weights.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("great", 0.4),
    ("good", 0.3),
    ("awesome", 0.5),
    ("love", 0.5),
    ("loved", 0.5),
    ("amazing", 0.5),
    ("fantastic", 0.5),
    ("wonderful", 0.5),
    ("excellent", 0.5),
    ("perfect", 0.5),
    ("beautiful", 0.4),
    ("incredible", 0.5),
    ("stunning", 0.5),
    ("gorgeous", 0.5),
    ("best", 0.5),
    ("favorite", 0.4),
    ("adore", 0.5),
    ("obsessed", 0.4),
    ("nice", 0.3),
    ("cool", 0.3),
    ("wow", 0.3),
    ("yay", 0.3),
    ("haha", 0.2),
    ("lol", 0.2),
    ("fire", 0.4),
    ("slay", 0.4),
    ("lit", 0.3),
    ("vibes", 0.2),
    ("queen", 0.3),
    ("flawless", 0.5),
    // Negative signals
    ("bad", -0.4),
    ("terrible", -0.6),
    ("hate", -0.6),
    ("awful", -0.6),
    ("poor", -0.3),
    ("disappointed", -0.5),
    ("worst", -0.6),
    ("disgusting", -0.6),
    ("horrible", -0.6),
    ("ugly", -0.5),
    ("annoying", -0.4),
    ("boring", -0.4),
    ("stupid", -0.5),
    ("dumb", -0.4),
    ("sucks", -0.5),
    ("trash", -0.5),
    ("garbage", -0.5),
    ("gross", -0.5),
    ("nah", -0.2),
    ("meh", -0.2),
    ("mid", -0.3),
    ("pathetic", -0.5),
    ("fake", -0.4),
    ("cringe", -0.4),
];

/// Emoji weights, matched by substring since emoji rarely arrive
/// whitespace-delimited.
pub(crate) const EMOJI_LEXICON: &[(&str, f32)] = &[
    ("😍", 0.4),
    ("🥰", 0.4),
    ("😊", 0.3),
    ("😂", 0.2),
    ("🤣", 0.2),
    ("👍", 0.3),
    ("👏", 0.3),
    ("🙌", 0.3),
    ("❤️", 0.4),
    ("💕", 0.4),
    ("💯", 0.4),
    ("🔥", 0.4),
    ("✨", 0.3),
    ("🎉", 0.3),
    ("👑", 0.3),
    ("😞", -0.3),
    ("😢", -0.3),
    ("😭", -0.3),
    ("😠", -0.4),
    ("😡", -0.5),
    ("🤬", -0.6),
    ("👎", -0.4),
    ("💔", -0.4),
    ("❌", -0.3),
    ("🚫", -0.3),
];

/// Classification cut-offs: scores within `(-0.05, 0.05)` count as neutral.
const POSITIVE_THRESHOLD: f32 = 0.05;
const NEGATIVE_THRESHOLD: f32 = -0.05;

/// Score a single comment using the word and emoji lexicons.
///
/// Words are matched lowercase with surrounding punctuation stripped; emoji
/// are matched as substrings. The result is clamped to `[-1.0, 1.0]` and is
/// `0.0` for empty or unknown text.
#[must_use]
pub fn comment_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        for &(lex_word, weight) in LEXICON {
            if w == lex_word {
                score += weight;
                break;
            }
        }
    }
    for &(emoji, weight) in EMOJI_LEXICON {
        if text.contains(emoji) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}

/// Score a comment corpus into a percentage breakdown.
///
/// Each non-empty comment is classified by [`comment_score`] against the
/// ±0.05 neutral band; counts are converted to percentages of the corpus,
/// rounded to 2 decimals. Empty input (or input with only blank comments)
/// yields the all-zero breakdown.
#[must_use]
pub fn score_comments(comments: &[String]) -> SentimentBreakdown {
    let mut positive = 0u32;
    let mut neutral = 0u32;
    let mut negative = 0u32;

    for comment in comments {
        if comment.trim().is_empty() {
            continue;
        }
        let score = comment_score(comment);
        if score >= POSITIVE_THRESHOLD {
            positive += 1;
        } else if score <= NEGATIVE_THRESHOLD {
            negative += 1;
        } else {
            neutral += 1;
        }
    }

    let total = positive + neutral + negative;
    if total == 0 {
        return SentimentBreakdown::zero();
    }

    let percent = |count: u32| -> f64 {
        let raw = f64::from(count) / f64::from(total) * 100.0;
        (raw * 100.0).round() / 100.0
    };

    let breakdown = SentimentBreakdown {
        positive: percent(positive),
        neutral: percent(neutral),
        negative: percent(negative),
    };
    tracing::debug!(
        positive = breakdown.positive,
        neutral = breakdown.neutral,
        negative = breakdown.negative,
        comments = total,
        "scored comment corpus"
    );
    breakdown
}
