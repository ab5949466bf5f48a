pub mod collector;
pub mod prompts;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::clients::{FirecrawlClient, OpenAiClient};
use crate::config::NewsConfig;
use crate::models::NewsEntity;
use collector::{ArticleKind, CollectedArticle, Collector};

/// How many collected articles get handed to the LLM stages.
const DIGEST_LIMIT: usize = 25;

/// Sequential analysis pipeline: collect → score → filter → format.
/// Every LLM stage consumes the previous stage's raw text, mirroring a
/// hand-off between analysts.
pub struct NewsPipeline {
    collector: Collector,
    llm: OpenAiClient,
}

impl NewsPipeline {
    pub fn new(config: &NewsConfig) -> Self {
        Self {
            collector: Collector::new(FirecrawlClient::new(&config.firecrawl_api_key)),
            llm: OpenAiClient::new(&config.openai_api_key, &config.openai_model),
        }
    }

    /// Run one full cycle. Returns the structured entities ready for
    /// persistence; an empty collection short-circuits before any LLM call.
    pub async fn run(&self) -> Result<Vec<NewsEntity>> {
        info!("Phase 1: news collection");
        let articles = self.collector.collect().await?;
        if articles.is_empty() {
            info!("No articles collected, skipping analysis");
            return Ok(Vec::new());
        }

        let digest = build_digest(&articles);

        info!("Phase 2: impact scoring");
        let scored = self
            .llm
            .complete(prompts::SCORING_PROMPT, &digest)
            .await
            .context("Impact scoring stage failed")?;

        info!("Phase 3: high-impact filtering");
        let filtered = self
            .llm
            .complete(prompts::FILTER_PROMPT, &scored)
            .await
            .context("Filtering stage failed")?;

        info!("Phase 4: structured formatting");
        let formatted = self
            .llm
            .complete(prompts::FORMAT_PROMPT, &filtered)
            .await
            .context("Formatting stage failed")?;

        let entities = parse_entities(&formatted)?;
        info!(entities = entities.len(), "Pipeline produced entities");
        Ok(entities)
    }
}

/// Render collected articles into the text block the scoring stage reads.
fn build_digest(articles: &[CollectedArticle]) -> String {
    let blocks: Vec<String> = articles
        .iter()
        .take(DIGEST_LIMIT)
        .enumerate()
        .map(|(i, article)| {
            format!(
                "ARTICLE {}:\nTitle: {}\nLink: {}\nPublished: {}\nSummary: {}\nSource: {}\nType: {}",
                i + 1,
                article.title,
                article.link,
                article.published.to_rfc3339(),
                article.summary,
                article.source,
                match article.kind {
                    ArticleKind::Rss => "rss",
                    ArticleKind::Web => "web",
                },
            )
        })
        .collect();

    format!(
        "COLLECTED {} RECENT US STOCK NEWS ARTICLES FROM MULTIPLE SOURCES:\n\n{}",
        articles.len(),
        blocks.join("\n\n")
    )
}

/// Parse the format stage's output into entities. Models occasionally wrap
/// the array in a markdown fence despite instructions, so both shapes are
/// accepted.
fn parse_entities(raw: &str) -> Result<Vec<NewsEntity>> {
    let json = extract_json(raw);
    serde_json::from_str(json)
        .map_err(|e| anyhow!("Failed to parse pipeline output as entity array: {e}"))
}

/// Strip an optional ```json fence and surrounding prose, keeping the
/// bracketed array.
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        if let Some(end) = rest.find("```") {
            return rest[..end].trim();
        }
    }

    match (trimmed.find('['), trimmed.rfind(']')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    const ENTITY_ARRAY: &str = r#"[
        {
            "title": "Fed cuts rates",
            "summary": "Surprise 50bp cut",
            "url": "https://example.com/fed",
            "published_date": "2025-06-02",
            "score": 9,
            "tickers": ["SPY", "QQQ"]
        }
    ]"#;

    #[test]
    fn parses_bare_array() {
        let entities = parse_entities(ENTITY_ARRAY).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].title, "Fed cuts rates");
        assert_eq!(entities[0].score, 9);
        assert_eq!(
            entities[0].published_date,
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
        );
    }

    #[test]
    fn parses_fenced_array() {
        let raw = format!("Here is the data:\n```json\n{ENTITY_ARRAY}\n```\nDone.");
        let entities = parse_entities(&raw).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].tickers, vec!["SPY", "QQQ"]);
    }

    #[test]
    fn parses_array_with_surrounding_prose() {
        let raw = format!("The final answer is {ENTITY_ARRAY} as requested.");
        let entities = parse_entities(&raw).unwrap();
        assert_eq!(entities.len(), 1);
    }

    #[test]
    fn missing_tickers_default_to_empty() {
        let raw = r#"[{"title":"t","summary":"s","url":"https://e.com","published_date":"2025-01-05","score":7}]"#;
        let entities = parse_entities(raw).unwrap();
        assert!(entities[0].tickers.is_empty());
    }

    #[test]
    fn rejects_non_array_output() {
        assert!(parse_entities("I could not find any impactful news today.").is_err());
    }

    #[test]
    fn digest_caps_articles_and_numbers_blocks() {
        let published = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        let articles: Vec<CollectedArticle> = (0..30)
            .map(|i| CollectedArticle {
                title: format!("Market story {i}"),
                link: format!("https://example.com/{i}"),
                published,
                source: "test".to_string(),
                summary: "summary".to_string(),
                kind: ArticleKind::Rss,
            })
            .collect();

        let digest = build_digest(&articles);
        assert!(digest.starts_with("COLLECTED 30 RECENT"));
        assert!(digest.contains("ARTICLE 25:"));
        assert!(!digest.contains("ARTICLE 26:"));
    }
}
