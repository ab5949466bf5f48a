use serde::Serialize;
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{NewsAnalysis, NewsEntity},
};

const MAX_PAGE_SIZE: i64 = 100;

pub struct NewsService {
    db: PgPool,
}

/// Outcome of persisting one pipeline run.
#[derive(Debug, Default, Serialize, PartialEq)]
pub struct SaveReport {
    pub total_processed: usize,
    pub saved: usize,
    pub skipped_duplicates: usize,
    pub failed: usize,
}

/// One page of the news feed, cursor-paginated for infinite scroll.
#[derive(Debug, Serialize)]
pub struct NewsFeedPage {
    pub items: Vec<NewsAnalysis>,
    pub next_cursor: Option<i64>,
    pub has_more: bool,
    pub limit: i64,
}

impl NewsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Persist pipeline output, skipping rows whose URL is already stored.
    /// A failure on one row is logged and counted, not propagated, so a
    /// single bad entity cannot discard the rest of the batch.
    pub async fn save_batch(&self, entities: &[NewsEntity]) -> SaveReport {
        let mut report = SaveReport {
            total_processed: entities.len(),
            ..Default::default()
        };

        for entity in entities {
            let result = sqlx::query(
                r#"
                INSERT INTO news_analysis (title, summary, url, published_date, score, tickers)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (url) DO NOTHING
                "#,
            )
            .bind(&entity.title)
            .bind(&entity.summary)
            .bind(&entity.url)
            .bind(entity.published_date)
            .bind(entity.score)
            .bind(&entity.tickers)
            .execute(&self.db)
            .await;

            match result {
                Ok(r) if r.rows_affected() > 0 => report.saved += 1,
                Ok(_) => {
                    tracing::info!(url = %entity.url, "Skipping duplicate news item");
                    report.skipped_duplicates += 1;
                }
                Err(e) => {
                    tracing::error!(url = %entity.url, error = %e, "Failed to save news item");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            total = report.total_processed,
            saved = report.saved,
            skipped = report.skipped_duplicates,
            failed = report.failed,
            "News save completed"
        );
        report
    }

    /// Cursor-paginated feed, newest first. `cursor` is the id of the last
    /// item from the previous page.
    pub async fn get_feed(
        &self,
        cursor: Option<i64>,
        limit: i64,
        min_score: Option<i32>,
        max_score: Option<i32>,
    ) -> AppResult<NewsFeedPage> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);

        // Fetch one extra row to learn whether another page exists.
        let rows: Vec<NewsAnalysis> = sqlx::query_as(
            r#"
            SELECT id, title, summary, url, published_date, score, tickers, created_at
            FROM news_analysis
            WHERE ($1::bigint IS NULL OR id < $1)
              AND ($2::int IS NULL OR score >= $2)
              AND ($3::int IS NULL OR score <= $3)
            ORDER BY id DESC
            LIMIT $4
            "#,
        )
        .bind(cursor)
        .bind(min_score)
        .bind(max_score)
        .bind(limit + 1)
        .fetch_all(&self.db)
        .await?;

        Ok(page_from(rows, limit))
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<NewsAnalysis> {
        let item: Option<NewsAnalysis> = sqlx::query_as(
            r#"
            SELECT id, title, summary, url, published_date, score, tickers, created_at
            FROM news_analysis WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        item.ok_or(AppError::NewsNotFound)
    }
}

/// Turn a limit+1 query result into a page. The extra row, if present, only
/// signals that more data exists and is dropped from the response.
fn page_from(mut rows: Vec<NewsAnalysis>, limit: i64) -> NewsFeedPage {
    let has_more = rows.len() as i64 > limit;
    if has_more {
        rows.truncate(limit as usize);
    }
    let next_cursor = if has_more {
        rows.last().map(|item| item.id)
    } else {
        None
    };

    NewsFeedPage {
        items: rows,
        next_cursor,
        has_more,
        limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;

    fn item(id: i64) -> NewsAnalysis {
        NewsAnalysis {
            id,
            title: format!("title {id}"),
            summary: "summary".to_string(),
            url: format!("https://example.com/{id}"),
            published_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            score: 7,
            tickers: vec!["AAPL".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn full_page_reports_more_and_cursor() {
        let rows = vec![item(10), item(9), item(8)];
        let page = page_from(rows, 2);

        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
        assert_eq!(page.next_cursor, Some(9));
        assert_eq!(page.limit, 2);
    }

    #[test]
    fn short_page_is_final() {
        let rows = vec![item(3), item(2)];
        let page = page_from(rows, 20);

        assert_eq!(page.items.len(), 2);
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn exact_page_is_final() {
        let rows = vec![item(2), item(1)];
        let page = page_from(rows, 2);

        assert_eq!(page.items.len(), 2);
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn empty_page() {
        let page = page_from(vec![], 20);
        assert!(page.items.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }
}
