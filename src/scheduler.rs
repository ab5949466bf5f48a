use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveTime, TimeZone, Utc};
use tracing::{error, info};

use crate::clients::FcmClient;
use crate::pipeline::NewsPipeline;
use crate::services::{devices::DeviceService, news::NewsService};

/// Daily run slots, Korea Standard Time.
const RUN_HOURS_KST: &[u32] = &[17, 22];

/// KST has no daylight saving, so a fixed offset is exact.
fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("valid KST offset")
}

/// The next scheduled slot strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>) -> DateTime<Utc> {
    let local_now = now.with_timezone(&kst());
    let today = local_now.date_naive();

    for day_offset in 0..=1 {
        let date = today + ChronoDuration::days(day_offset);
        for &hour in RUN_HOURS_KST {
            let slot_time = NaiveTime::from_hms_opt(hour, 0, 0).expect("valid slot time");
            let slot = kst()
                .from_local_datetime(&date.and_time(slot_time))
                .single()
                .expect("fixed offset has no ambiguous times");
            if slot > local_now {
                return slot.with_timezone(&Utc);
            }
        }
    }

    unreachable!("a slot within the next day always exists")
}

/// The complete daily job: run the pipeline, persist the results, and fan
/// the update out to every active device.
pub struct NewsAnalysisJob {
    pipeline: NewsPipeline,
    news: NewsService,
    devices: DeviceService,
    fcm: FcmClient,
}

impl NewsAnalysisJob {
    pub fn new(
        pipeline: NewsPipeline,
        news: NewsService,
        devices: DeviceService,
        fcm: FcmClient,
    ) -> Self {
        Self {
            pipeline,
            news,
            devices,
            fcm,
        }
    }

    pub async fn run_once(&self) -> Result<()> {
        info!("Starting news analysis task");

        let entities = self.pipeline.run().await?;
        if entities.is_empty() {
            info!("No entities produced, nothing to save");
            return Ok(());
        }

        let report = self.news.save_batch(&entities).await;
        if report.saved == 0 {
            info!("No new news items saved, skipping notifications");
            return Ok(());
        }

        self.notify_devices(report.saved).await
    }

    async fn notify_devices(&self, saved: usize) -> Result<()> {
        let tokens = self.devices.get_active_tokens().await?;
        if tokens.is_empty() {
            info!("No active device tokens found for notifications");
            return Ok(());
        }

        info!(devices = tokens.len(), "Sending notifications");

        let title = "Financial News Update";
        let body = if saved == 1 {
            "1 new market-moving news analysis is available!".to_string()
        } else {
            format!("{saved} new market-moving news analyses are available!")
        };

        let mut data = HashMap::new();
        data.insert("type".to_string(), "news_update".to_string());
        data.insert("saved_count".to_string(), saved.to_string());
        data.insert("timestamp".to_string(), Utc::now().to_rfc3339());

        let report = self.fcm.send_multicast(&tokens, title, &body, &data).await;

        if !report.unregistered_tokens.is_empty() {
            let deactivated = self
                .devices
                .deactivate_tokens(&report.unregistered_tokens)
                .await?;
            info!(deactivated, "Deactivated devices with dead tokens");
        }

        Ok(())
    }

    /// Run forever: sleep until the next slot, run, repeat. A failing run is
    /// logged and the loop keeps going.
    pub async fn run_scheduled(&self) -> Result<()> {
        loop {
            let now = Utc::now();
            let next = next_run_after(now);
            let wait = (next - now)
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            info!(next_run = %next, "Scheduler sleeping until next slot");

            tokio::time::sleep(wait).await;

            if let Err(e) = self.run_once().await {
                error!(error = ?e, "Daily news analysis task failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kst_dt(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        kst()
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn morning_rolls_to_afternoon_slot() {
        let now = kst_dt(2025, 6, 2, 9, 30);
        assert_eq!(next_run_after(now), kst_dt(2025, 6, 2, 17, 0));
    }

    #[test]
    fn between_slots_picks_evening() {
        let now = kst_dt(2025, 6, 2, 18, 0);
        assert_eq!(next_run_after(now), kst_dt(2025, 6, 2, 22, 0));
    }

    #[test]
    fn after_last_slot_rolls_to_next_day() {
        let now = kst_dt(2025, 6, 2, 23, 15);
        assert_eq!(next_run_after(now), kst_dt(2025, 6, 3, 17, 0));
    }

    #[test]
    fn exact_slot_time_schedules_the_following_slot() {
        let now = kst_dt(2025, 6, 2, 17, 0);
        assert_eq!(next_run_after(now), kst_dt(2025, 6, 2, 22, 0));
    }
}
