use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::clients::FirecrawlClient;

/// Financial RSS feeds polled every run.
const RSS_SOURCES: &[&str] = &[
    "https://feeds.finance.yahoo.com/rss/2.0/headline",
    "https://www.cnbc.com/id/100003114/device/rss/rss.html",
    "https://feeds.marketwatch.com/marketwatch/StockstoWatch/",
    "https://feeds.finance.yahoo.com/rss/2.0/category-stocks",
];

/// JavaScript-rendered news pages scraped through Firecrawl.
const WEB_SOURCES: &[&str] = &[
    "https://www.marketwatch.com/latest-news",
    "https://finance.yahoo.com/news/",
    "https://www.cnbc.com/markets/",
];

/// A headline only counts as market-relevant when it mentions one of these.
const MARKET_KEYWORDS: &[&str] = &[
    "stock", "market", "earnings", "price", "shares", "trading", "nasdaq", "dow", "sp500",
    "revenue", "profit",
];

const FEED_MAX_AGE_HOURS: i64 = 8;
const FEED_MAX_ITEMS: usize = 15;
const SCRAPE_CONTENT_LIMIT: usize = 3000;
const HEADLINES_PER_SOURCE: usize = 5;
const SUMMARY_LIMIT: usize = 400;
const TITLE_KEY_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum ArticleKind {
    Rss,
    Web,
}

#[derive(Debug, Clone)]
pub struct CollectedArticle {
    pub title: String,
    pub link: String,
    pub published: DateTime<Utc>,
    pub source: String,
    pub summary: String,
    pub kind: ArticleKind,
}

pub struct Collector {
    http: reqwest::Client,
    firecrawl: FirecrawlClient,
}

impl Collector {
    pub fn new(firecrawl: FirecrawlClient) -> Self {
        Self {
            http: reqwest::Client::new(),
            firecrawl,
        }
    }

    /// Gather recent articles from every source. A failing source is logged
    /// and skipped; only the total absence of sources is an error upstream.
    pub async fn collect(&self) -> Result<Vec<CollectedArticle>> {
        let now = Utc::now();
        let mut articles = Vec::new();

        info!("Collecting from RSS sources");
        for source in RSS_SOURCES {
            match self.fetch_feed(source, now).await {
                Ok(mut items) => articles.append(&mut items),
                Err(e) => warn!(source, error = %e, "Failed to fetch RSS feed"),
            }
        }

        info!("Collecting from web sources");
        for source in WEB_SOURCES {
            match self.firecrawl.scrape_markdown(source).await {
                Ok(markdown) => {
                    let truncated: String = markdown.chars().take(SCRAPE_CONTENT_LIMIT).collect();
                    for headline in extract_headlines(&truncated) {
                        articles.push(CollectedArticle {
                            summary: headline.chars().take(200).collect(),
                            title: headline,
                            link: source.to_string(),
                            published: now,
                            source: source.to_string(),
                            kind: ArticleKind::Web,
                        });
                    }
                }
                Err(e) => warn!(source, error = %e, "Failed to scrape web source"),
            }
        }

        let unique = dedupe_relevant(articles);
        info!(articles = unique.len(), "Collected unique relevant articles");
        Ok(unique)
    }

    async fn fetch_feed(&self, feed_url: &str, now: DateTime<Utc>) -> Result<Vec<CollectedArticle>> {
        let resp = self
            .http
            .get(feed_url)
            .header("User-Agent", "smart-notify-backend/0.1")
            .send()
            .await
            .context("RSS feed fetch failed")?;

        let bytes = resp.bytes().await.context("Failed to read RSS feed body")?;
        parse_feed(&bytes, feed_url, now)
    }
}

/// Parse an RSS/Atom payload into articles: entries from the last
/// `FEED_MAX_AGE_HOURS`, newest first, capped at `FEED_MAX_ITEMS`.
fn parse_feed(bytes: &[u8], source: &str, now: DateTime<Utc>) -> Result<Vec<CollectedArticle>> {
    let feed = feed_rs::parser::parse(bytes).context("Failed to parse RSS/Atom feed")?;
    let cutoff = now - Duration::hours(FEED_MAX_AGE_HOURS);

    let mut articles: Vec<CollectedArticle> = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))?;

            let published = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or(now);

            if published < cutoff {
                return None;
            }

            let summary = entry
                .summary
                .map(|s| s.content.chars().take(SUMMARY_LIMIT).collect())
                .unwrap_or_default();

            Some(CollectedArticle {
                title: entry
                    .title
                    .map(|t| t.content)
                    .unwrap_or_else(|| "No title".to_string()),
                link,
                published,
                source: source.to_string(),
                summary,
                kind: ArticleKind::Rss,
            })
        })
        .collect();

    articles.sort_by(|a, b| b.published.cmp(&a.published));
    articles.truncate(FEED_MAX_ITEMS);
    Ok(articles)
}

/// Pull plausible headlines out of scraped markdown: single lines of
/// headline length that mention a market keyword.
fn extract_headlines(markdown: &str) -> Vec<String> {
    markdown
        .lines()
        .map(str::trim)
        .filter(|line| line.len() > 20 && line.len() < 200)
        .filter(|line| {
            let lower = line.to_lowercase();
            MARKET_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .take(HEADLINES_PER_SOURCE)
        .map(str::to_string)
        .collect()
}

/// Drop articles without a market keyword in the title, and collapse
/// near-duplicates sharing the same normalized title prefix.
fn dedupe_relevant(articles: Vec<CollectedArticle>) -> Vec<CollectedArticle> {
    let mut seen = std::collections::HashSet::new();
    articles
        .into_iter()
        .filter(|article| {
            let key: String = article
                .title
                .to_lowercase()
                .chars()
                .take(TITLE_KEY_LEN)
                .collect();
            if !MARKET_KEYWORDS.iter().any(|kw| key.contains(kw)) {
                return false;
            }
            seen.insert(key)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn article(title: &str) -> CollectedArticle {
        CollectedArticle {
            title: title.to_string(),
            link: "https://example.com/a".to_string(),
            published: Utc::now(),
            source: "test".to_string(),
            summary: String::new(),
            kind: ArticleKind::Rss,
        }
    }

    #[test]
    fn headlines_need_keyword_and_headline_length() {
        let markdown = "\
# Markets\n\
Apple shares surge after record earnings beat expectations\n\
short stock line\n\
Nothing relevant in this perfectly sized sentence here\n\
Dow futures climb as traders weigh new tariff announcements\n";

        let headlines = extract_headlines(markdown);
        assert_eq!(
            headlines,
            vec![
                "Apple shares surge after record earnings beat expectations".to_string(),
                "Dow futures climb as traders weigh new tariff announcements".to_string(),
            ]
        );
    }

    #[test]
    fn headlines_are_capped_per_source() {
        let line = "Stock market update number N with enough length\n";
        let markdown = line.repeat(10);
        // Identical lines all pass the filter; the cap applies before dedup.
        assert_eq!(extract_headlines(&markdown).len(), HEADLINES_PER_SOURCE);
    }

    #[test]
    fn dedup_drops_irrelevant_and_duplicate_titles() {
        let articles = vec![
            article("Fed decision moves markets sharply higher today"),
            article("FED DECISION MOVES MARKETS SHARPLY higher today"),
            article("Local weather forecast sunny all week"),
            article("Tesla earnings preview: what to expect"),
        ];

        let unique = dedupe_relevant(articles);
        let titles: Vec<&str> = unique.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Fed decision moves markets sharply higher today",
                "Tesla earnings preview: what to expect",
            ]
        );
    }

    #[test]
    fn parse_feed_filters_stale_entries() {
        let now = Utc::now();
        let fresh = now - Duration::hours(1);
        let stale = now - Duration::hours(20);
        let xml = format!(
            r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Test Feed</title>
<item><title>Fresh market story</title><link>https://example.com/fresh</link>
<pubDate>{}</pubDate><description>Stocks up</description></item>
<item><title>Stale market story</title><link>https://example.com/stale</link>
<pubDate>{}</pubDate><description>Old news</description></item>
</channel></rss>"#,
            fresh.to_rfc2822(),
            stale.to_rfc2822()
        );

        let articles = parse_feed(xml.as_bytes(), "https://example.com/rss", now).unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Fresh market story");
        assert_eq!(articles[0].link, "https://example.com/fresh");
        assert_eq!(articles[0].kind, ArticleKind::Rss);
    }

    #[test]
    fn parse_feed_rejects_garbage() {
        assert!(parse_feed(b"not a feed", "https://example.com/rss", Utc::now()).is_err());
    }
}
