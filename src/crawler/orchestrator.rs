//! Sequential crawl orchestration
//!
//! One entry at a time: drain the oldest unprocessed frontier entry,
//! extract it with the scrape path (the API quota is too small for bulk
//! work), persist what came back, queue the related profiles it exposed,
//! and sleep a randomized interval before the next one. Page crashes
//! retry the same entry a bounded number of times; every other error
//! stops the crawl.

use crate::extract::{ExtractOptions, Pipeline};
use crate::record::Record;
use crate::storage::{CrawlStats, Store};
use crate::url::EntityKind;
use crate::Result;
use crate::config::PacingConfig;
use rand::Rng;
use std::time::Duration;

pub struct Orchestrator<'a, S: Store> {
    pipeline: Pipeline<'a>,
    store: S,
    pacing: PacingConfig,
}

impl<'a, S: Store> Orchestrator<'a, S> {
    pub fn new(pipeline: Pipeline<'a>, store: S, pacing: PacingConfig) -> Self {
        Self {
            pipeline,
            store,
            pacing,
        }
    }

    /// Adds a starting URL to the frontier
    pub fn seed(&mut self, url: &str) -> Result<bool> {
        let canonical = crate::url::canonicalize(url)?;
        Ok(self.store.enqueue(&canonical)?)
    }

    /// Drains the frontier until it is empty, returning final counts
    pub async fn run(&mut self) -> Result<CrawlStats> {
        let options = ExtractOptions {
            force_scrape: true,
            skip_organization: false,
        };
        let mut crash_streak: u32 = 0;

        while let Some(entry) = self.store.next_unprocessed()? {
            tracing::info!("Processing {}", entry.url);

            match self.pipeline.fetch(&entry.url, &options).await {
                Ok(Some(record)) => {
                    self.persist(&record)?;
                    crash_streak = 0;
                }
                Ok(None) => {
                    tracing::info!("Nothing found at {}, skipping", entry.url);
                    crash_streak = 0;
                }
                Err(e) if e.is_page_crash() => {
                    crash_streak += 1;
                    if crash_streak > self.pacing.max_crash_retries {
                        tracing::error!(
                            "Giving up on {} after {} consecutive crashes",
                            entry.url,
                            crash_streak
                        );
                        return Err(e);
                    }
                    tracing::warn!(
                        "Page crashed on {} (attempt {}), retrying",
                        entry.url,
                        crash_streak
                    );
                    self.pace().await;
                    continue;
                }
                Err(e) => return Err(e),
            }

            self.store.mark_processed(&entry.url)?;
            self.pace().await;
        }

        let stats = self.store.stats()?;
        tracing::info!(
            "Frontier drained: {} processed, {} profiles, {} organizations",
            stats.processed,
            stats.profiles,
            stats.organizations
        );
        Ok(stats)
    }

    /// Writes a record (and its nested organization) and queues the
    /// related profiles it surfaced
    fn persist(&mut self, record: &Record) -> Result<()> {
        match record {
            Record::Profile(profile) => {
                self.store.upsert_profile(profile)?;
                if let Some(company) = &profile.company {
                    if company.canonical_url.is_some() {
                        self.store.upsert_organization(company)?;
                    }
                }
                for related in &profile.related_profiles {
                    self.discover(&related.url)?;
                }
            }
            Record::Organization(org) => {
                self.store.upsert_organization(org)?;
            }
        }
        Ok(())
    }

    /// Queues a discovered URL when it canonicalizes to a person profile;
    /// anything else is silently dropped
    fn discover(&mut self, url: &str) -> Result<()> {
        let Ok(canonical) = crate::url::canonicalize(url) else {
            return Ok(());
        };
        if !matches!(crate::url::classify(&canonical), Ok(Some(EntityKind::Person))) {
            return Ok(());
        }
        if self.store.enqueue(&canonical)? {
            tracing::debug!("Discovered {}", canonical);
        }
        Ok(())
    }

    /// Randomized inter-entry delay to keep the traffic pattern irregular
    async fn pace(&self) {
        let delay = if self.pacing.max_delay_ms > self.pacing.min_delay_ms {
            rand::thread_rng().gen_range(self.pacing.min_delay_ms..=self.pacing.max_delay_ms)
        } else {
            self.pacing.min_delay_ms
        };
        tracing::debug!("Waiting {} ms before next entry", delay);
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}
