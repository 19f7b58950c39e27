// Raw scraper items → TweetRecord.
// Different Apify actors name the same concept differently; every concept is
// resolved through an ordered alias table, first populated alias wins.

use chrono::Utc;
use serde_json::Value;

use sand_common::{TweetRecord, RETWEET_PREFIX};

/// Ordered JSON pointer paths that all name the same concept.
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases(pub &'static [&'static str]);

impl FieldAliases {
    /// First alias holding a non-empty string or a number, rendered as text.
    pub fn resolve(&self, item: &Value) -> Option<String> {
        self.0
            .iter()
            .find_map(|path| item.pointer(path).and_then(scalar_text))
    }

    /// True when any alias holds a truthy value.
    pub fn any_truthy(&self, item: &Value) -> bool {
        self.0
            .iter()
            .any(|path| item.pointer(path).is_some_and(truthy))
    }
}

pub const CONTENT: FieldAliases = FieldAliases(&["/text", "/full_text", "/tweetText", "/content"]);
pub const ID: FieldAliases = FieldAliases(&["/id", "/tweetId", "/id_str"]);
pub const THREAD_ID: FieldAliases = FieldAliases(&[
    "/inReplyToId",
    "/in_reply_to_status_id_str",
    "/conversationId",
]);
pub const RETWEET_FLAG: FieldAliases = FieldAliases(&["/isRetweet", "/retweeted"]);

// Resolved relative to a nested retweeted/quoted tweet.
pub const NESTED_AUTHOR: FieldAliases = FieldAliases(&["/author/userName", "/user/screen_name"]);
pub const NESTED_TEXT: FieldAliases = FieldAliases(&["/text", "/full_text"]);

const UNKNOWN_AUTHOR: &str = "unknown";

/// Map one raw item into a record. Never fails: every field has a fallback.
pub fn normalize(item: &Value) -> TweetRecord {
    TweetRecord {
        id: resolve_id(item),
        thread_id: THREAD_ID.resolve(item),
        content: resolve_content(item),
    }
}

pub fn normalize_all(items: &[Value]) -> Vec<TweetRecord> {
    items.iter().map(normalize).collect()
}

/// Display text with retweet / quote provenance folded in.
pub fn resolve_content(item: &Value) -> String {
    let mut content = CONTENT.resolve(item).unwrap_or_default();

    if RETWEET_FLAG.any_truthy(item) {
        if let Some(retweeted) = nested(item, "retweetedTweet") {
            let (author, text) = nested_author_and_text(retweeted);
            content = format!("{RETWEET_PREFIX}{author}: {text}");
        }
    }

    if let Some(quoted) = nested(item, "quotedTweet") {
        let (author, text) = nested_author_and_text(quoted);
        content.push_str(&format!(" QT: @{author}: {text}"));
    }

    content
}

/// Upstream id, then the last segment of the tweet URL, then a synthesized id.
pub fn resolve_id(item: &Value) -> String {
    ID.resolve(item)
        .or_else(|| id_from_url(item))
        .unwrap_or_else(synthesize_id)
}

/// `unknown_<millis>_<fraction>`. Unique within a process, unstable across runs.
pub fn synthesize_id() -> String {
    format!(
        "unknown_{}_{}",
        Utc::now().timestamp_millis(),
        rand::random::<f64>()
    )
}

pub fn is_synthesized(id: &str) -> bool {
    id.starts_with("unknown_")
}

fn id_from_url(item: &Value) -> Option<String> {
    let url = item.get("url")?.as_str()?;
    url.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn nested<'a>(item: &'a Value, key: &str) -> Option<&'a Value> {
    item.get(key).filter(|v| v.is_object())
}

fn nested_author_and_text(tweet: &Value) -> (String, String) {
    (
        NESTED_AUTHOR
            .resolve(tweet)
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        NESTED_TEXT.resolve(tweet).unwrap_or_default(),
    )
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primary_text_field_wins() {
        let item = json!({"id": "1", "text": "primary", "full_text": "secondary"});
        assert_eq!(normalize(&item).content, "primary");
    }

    #[test]
    fn empty_primary_falls_through_to_alias() {
        let item = json!({"id": "1", "text": "", "tweetText": "from alias"});
        assert_eq!(normalize(&item).content, "from alias");
    }

    #[test]
    fn numeric_ids_render_as_decimal() {
        let item = json!({"tweetId": 1849302193847u64, "in_reply_to_status_id_str": "1849302193000"});
        let record = normalize(&item);
        assert_eq!(record.id, "1849302193847");
        assert_eq!(record.thread_id.as_deref(), Some("1849302193000"));
    }

    #[test]
    fn conversation_id_is_last_thread_alias() {
        let item = json!({"id": "5", "conversationId": "2", "inReplyToId": "4"});
        assert_eq!(normalize(&item).thread_id.as_deref(), Some("4"));

        let item = json!({"id": "5", "conversationId": "2"});
        assert_eq!(normalize(&item).thread_id.as_deref(), Some("2"));
    }

    #[test]
    fn standalone_item_has_no_thread() {
        let item = json!({"id": "5", "text": "hi", "inReplyToId": null});
        assert_eq!(normalize(&item).thread_id, None);
    }

    #[test]
    fn retweet_is_rewritten_with_author() {
        let item = json!({
            "id": "10",
            "text": "RT @orig: truncated…",
            "isRetweet": true,
            "retweetedTweet": {"author": {"userName": "orig"}, "text": "the full text"}
        });
        assert_eq!(normalize(&item).content, "RT @orig: the full text");
    }

    #[test]
    fn legacy_retweet_convention_is_recognized() {
        let item = json!({
            "id_str": "10",
            "full_text": "ignored",
            "retweeted": true,
            "retweetedTweet": {"user": {"screen_name": "legacy"}, "full_text": "legacy text"}
        });
        assert_eq!(normalize(&item).content, "RT @legacy: legacy text");
    }

    #[test]
    fn retweet_without_author_uses_unknown() {
        let item = json!({"id": "10", "isRetweet": true, "retweetedTweet": {"text": "t"}});
        assert_eq!(normalize(&item).content, "RT @unknown: t");
    }

    #[test]
    fn retweet_flag_without_nested_tweet_keeps_text() {
        let item = json!({"id": "10", "text": "plain", "isRetweet": true});
        assert_eq!(normalize(&item).content, "plain");
    }

    #[test]
    fn nested_tweet_without_flag_is_not_a_retweet() {
        let item = json!({
            "id": "10",
            "text": "plain",
            "isRetweet": false,
            "retweetedTweet": {"author": {"userName": "x"}, "text": "t"}
        });
        assert_eq!(normalize(&item).content, "plain");
    }

    #[test]
    fn quote_is_appended() {
        let item = json!({
            "id": "11",
            "text": "my take",
            "quotedTweet": {"author": {"userName": "them"}, "text": "their take"}
        });
        assert_eq!(normalize(&item).content, "my take QT: @them: their take");
    }

    #[test]
    fn quote_is_appended_to_retweet() {
        let item = json!({
            "id": "12",
            "isRetweet": true,
            "retweetedTweet": {"author": {"userName": "a"}, "text": "rt"},
            "quotedTweet": {"text": "q"}
        });
        assert_eq!(normalize(&item).content, "RT @a: rt QT: @unknown: q");
    }

    #[test]
    fn id_falls_back_to_url_segment() {
        let item = json!({"url": "https://x.com/sand/status/1790000000000000000", "text": "t"});
        assert_eq!(normalize(&item).id, "1790000000000000000");
    }

    #[test]
    fn missing_id_is_synthesized() {
        let record = normalize(&json!({"text": "no identity"}));
        assert!(is_synthesized(&record.id));

        let mut parts = record.id.splitn(3, '_');
        assert_eq!(parts.next(), Some("unknown"));
        let millis = parts.next().unwrap();
        assert!(!millis.is_empty() && millis.chars().all(|c| c.is_ascii_digit()));
        let fraction: f64 = parts.next().unwrap().parse().unwrap();
        assert!((0.0..1.0).contains(&fraction));
    }

    #[test]
    fn synthesized_ids_do_not_collide() {
        let a = normalize(&json!({}));
        let b = normalize(&json!({}));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn empty_item_degrades_gracefully() {
        let record = normalize(&json!({}));
        assert_eq!(record.content, "");
        assert_eq!(record.thread_id, None);
        assert!(is_synthesized(&record.id));

        let record = normalize(&Value::Null);
        assert_eq!(record.content, "");
    }
}
