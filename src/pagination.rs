// src/pagination.rs

use crate::domain::{SearchQuery, Source};
use crate::errors::{Exhaustion, PipelineError};
use crate::sources::{ListingSource, PageOutcome, RawRecord};
use rand::Rng;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// No query is ever paged past this, whatever was asked for.
pub const MAX_PAGES: u32 = 20;

const JITTER_MAX_MS: u64 = 1000;

/// Whether one source running dry stops the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagingMode {
    /// The first exhausted source ends the session for both.
    #[default]
    Lockstep,
    /// Each source pages until its own data runs out.
    Independent,
}

/// Blocks the calling thread for a while.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Blocking pause around upstream requests.
#[derive(Clone)]
pub struct RateLimiter {
    delay: Duration,
    sleeper: Rc<dyn Sleeper>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self::with_sleeper(delay, Rc::new(ThreadSleeper))
    }

    pub fn with_sleeper(delay: Duration, sleeper: Rc<dyn Sleeper>) -> Self {
        Self { delay, sleeper }
    }

    /// Sleeps the configured delay plus up to a second of jitter. A zero delay never sleeps.
    pub fn pause(&self) {
        if self.delay.is_zero() {
            return;
        }

        let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_MS);
        self.sleeper.sleep(self.delay + Duration::from_millis(jitter));
    }
}

/// Where one source's pagination stands.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorState {
    Fetching(u32),
    Exhausted(Exhaustion),
    /// Ran to the last page or to the page cap.
    Done,
}

/// Pages collected from one source.
#[derive(Debug, Clone)]
pub struct SourceHarvest {
    pub source: Source,
    pub records: Vec<RawRecord>,
    pub pages_fetched: u32,
    pub state: CursorState,
}

impl SourceHarvest {
    fn new(source: Source) -> Self {
        Self {
            source,
            records: Vec::new(),
            pages_fetched: 0,
            state: CursorState::Fetching(1),
        }
    }

    fn is_active(&self) -> bool {
        matches!(self.state, CursorState::Fetching(_))
    }
}

#[derive(Debug, Clone)]
pub struct Harvest {
    pub primary: SourceHarvest,
    pub secondary: SourceHarvest,
    /// School entries from the first page that carried any.
    pub schools: Option<Vec<RawRecord>>,
}

pub struct PaginationDriver {
    mode: PagingMode,
    page_cap: u32,
    limiter: RateLimiter,
}

impl PaginationDriver {
    pub fn new(mode: PagingMode, requested_pages: u32, limiter: RateLimiter) -> Self {
        Self {
            mode,
            page_cap: requested_pages.clamp(1, MAX_PAGES),
            limiter,
        }
    }

    #[cfg(test)]
    pub fn page_cap(&self) -> u32 {
        self.page_cap
    }

    /// Pages both sources for one query, `primary` before `secondary` on every page.
    ///
    /// Only an invalid query is an error. Everything already fetched is kept
    /// when a source runs out.
    pub fn run(
        &self,
        primary: &dyn ListingSource,
        secondary: &dyn ListingSource,
        query: &SearchQuery,
    ) -> Result<Harvest, PipelineError> {
        let mut harvest = Harvest {
            primary: SourceHarvest::new(primary.source()),
            secondary: SourceHarvest::new(secondary.source()),
            schools: None,
        };

        let mut page = 1;
        while harvest.primary.is_active() || harvest.secondary.is_active() {
            if page > self.page_cap {
                info!(page_cap = self.page_cap, "📄 page cap reached");
                for cursor in [&mut harvest.primary, &mut harvest.secondary] {
                    if cursor.is_active() {
                        cursor.state = CursorState::Done;
                    }
                }
                break;
            }

            for (client, cursor) in [
                (primary, &mut harvest.primary),
                (secondary, &mut harvest.secondary),
            ] {
                if !cursor.is_active() {
                    continue;
                }
                self.step(client, cursor, query, page, &mut harvest.schools)?;

                if self.mode == PagingMode::Lockstep
                    && matches!(cursor.state, CursorState::Exhausted(_))
                {
                    info!(source = %cursor.source, "🏁 lockstep paging: ending the session");
                    break;
                }
            }

            if self.mode == PagingMode::Lockstep {
                let exhausted = [&harvest.primary, &harvest.secondary]
                    .iter()
                    .any(|c| matches!(c.state, CursorState::Exhausted(_)));

                if exhausted {
                    for cursor in [&mut harvest.primary, &mut harvest.secondary] {
                        if cursor.is_active() {
                            cursor.state = CursorState::Done;
                        }
                    }
                }
            }

            page += 1;
        }

        info!(
            primary = %harvest.primary.source,
            primary_pages = harvest.primary.pages_fetched,
            primary_records = harvest.primary.records.len(),
            secondary = %harvest.secondary.source,
            secondary_pages = harvest.secondary.pages_fetched,
            secondary_records = harvest.secondary.records.len(),
            "paging finished"
        );

        Ok(harvest)
    }

    fn step(
        &self,
        client: &dyn ListingSource,
        cursor: &mut SourceHarvest,
        query: &SearchQuery,
        page: u32,
        schools: &mut Option<Vec<RawRecord>>,
    ) -> Result<(), PipelineError> {
        debug!(source = %cursor.source, page, "📄 fetching page");

        self.limiter.pause();
        let outcome = client.fetch(query, page);
        self.limiter.pause();

        match outcome? {
            PageOutcome::Page(raw) => {
                cursor.pages_fetched += 1;
                info!(
                    source = %cursor.source,
                    page,
                    listings = raw.records.len(),
                    "✅ page fetched"
                );

                cursor.records.extend(raw.records);

                if schools.is_none() {
                    if let Some(entries) = raw.schools.filter(|s| !s.is_empty()) {
                        *schools = Some(entries);
                    }
                }

                let last_page = raw.total_pages.is_some_and(|total| page >= total);
                cursor.state = if last_page {
                    CursorState::Done
                } else {
                    CursorState::Fetching(page + 1)
                };
            }
            PageOutcome::Exhausted(reason) => {
                if reason.is_transport() {
                    warn!(source = %cursor.source, page, %reason, "⚠️ source exhausted");
                } else {
                    info!(source = %cursor.source, page, %reason, "🏁 source exhausted");
                }
                cursor.state = CursorState::Exhausted(reason);
            }
        }

        Ok(())
    }
}
