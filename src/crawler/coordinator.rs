//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator is the single owner of the frontier, the scheduler and the
//! result list. Page tasks run concurrently in a `JoinSet` and report back to
//! it; every admission decision and chunk commit happens on the coordinator,
//! so the no-revisit and depth rules hold without locks.
//!
//! Run lifecycle: `Idle -> Running -> Draining -> Done`, or straight to
//! `Done` (partial) when the cancellation token fires or the frontier
//! stalls.

use crate::chunker::{Chunk, Chunker, KeywordClassifier};
use crate::config::Config;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::frontier::{Admission, Frontier};
use crate::crawler::page_task::{process_page, PageOutcome, PageResult};
use crate::crawler::scheduler::Scheduler;
use crate::output::CrawlReport;
use crate::sink::{run_delivery, ChunkSink, DeliveryReport, HttpSink};
use crate::state::{CrawlPhase, PageState, RunState};
use crate::url::ScopePolicy;
use crate::CrawlerError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// Delivery pause used when a sink is injected without a `[sink]` section
const DEFAULT_DELIVERY_DELAY: Duration = Duration::from_millis(100);

/// Chunk queue size used when a sink is injected without a `[sink]` section
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Everything a finished run produced
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Committed chunks in position order
    pub chunks: Vec<Chunk>,

    pub report: CrawlReport,

    /// Always `Done` for a returned outcome
    pub phase: CrawlPhase,
}

impl CrawlOutcome {
    pub fn is_partial(&self) -> bool {
        self.report.partial
    }
}

enum LoopEvent {
    Cancelled,
    Joined(Result<(Id, PageOutcome), JoinError>),
    Tick,
}

/// Why the crawl loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopExit {
    /// Frontier empty and nothing in flight
    Exhausted,

    /// URLs remain but no scope can ever become ready
    Stalled,

    Cancelled,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    seeds: Vec<String>,
    fetcher: Arc<dyn PageFetcher>,
    sink: Option<Arc<dyn ChunkSink>>,
    delivery_delay: Duration,
    queue_capacity: usize,
    chunker: Chunker,
    classifier: Option<KeywordClassifier>,
    frontier: Frontier,
    scheduler: Scheduler,
    state: RunState,
    report: CrawlReport,
    chunks: Vec<Chunk>,
    next_position: u64,
}

impl Coordinator {
    /// Creates a coordinator from explicit collaborators
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    /// * `fetcher` - Fetch capability used by every page task
    /// * `sink` - Delivery target; None persists chunks without delivering them
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CrawlerError::Config)` - Chunking or scope settings are invalid
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        sink: Option<Arc<dyn ChunkSink>>,
    ) -> Result<Self, CrawlerError> {
        let chunker = Chunker::from_config(&config.chunking)?;
        let scope = ScopePolicy::from_config(&config.scope)?;
        let classifier = config.classifier.as_ref().map(KeywordClassifier::from_config);

        let (delivery_delay, queue_capacity) = config
            .sink
            .as_ref()
            .map(|s| (s.delivery_delay(), s.queue_capacity.max(1)))
            .unwrap_or((DEFAULT_DELIVERY_DELAY, DEFAULT_QUEUE_CAPACITY));

        Ok(Self {
            seeds: config.scope.seeds.clone(),
            fetcher,
            sink,
            delivery_delay,
            queue_capacity,
            chunker,
            classifier,
            scheduler: Scheduler::new(config.crawler.clone(), scope.clone()),
            frontier: Frontier::new(scope, config.crawler.max_depth),
            state: RunState::new(),
            report: CrawlReport::default(),
            chunks: Vec::new(),
            next_position: 0,
        })
    }

    /// Creates a coordinator with the HTTP fetcher and, if `deliver` is set
    /// and a `[sink]` section exists, the HTTP sink
    pub fn from_config(config: &Config, deliver: bool) -> Result<Self, CrawlerError> {
        let fetcher = HttpFetcher::from_config(&config.user_agent, config.crawler.request_timeout())?;

        let sink = match (&config.sink, deliver) {
            (Some(sink_config), true) => {
                let sink = HttpSink::from_config(sink_config, &config.user_agent)?;
                tracing::info!(endpoint = %sink.endpoint(), "Delivering chunks to sink");
                Some(Arc::new(sink) as Arc<dyn ChunkSink>)
            }
            _ => None,
        };

        Self::new(config, Arc::new(fetcher), sink)
    }

    pub fn phase(&self) -> CrawlPhase {
        self.state.phase()
    }

    /// Runs the crawl to completion or cancellation
    ///
    /// Page-level and chunk-level failures are counted in the report and never
    /// end the run. Cancelling `cancel` aborts in-flight fetches, stops
    /// delivery and returns the chunks committed so far with the partial flag
    /// set.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<CrawlOutcome, CrawlerError> {
        let started = Instant::now();

        self.state.transition(CrawlPhase::Running)?;
        self.submit_seeds();
        tracing::info!(
            seeds = self.scheduler.frontier_size(),
            "Starting crawl"
        );

        let (tx, delivery) = match &self.sink {
            Some(sink) => {
                let (tx, rx) = mpsc::channel(self.queue_capacity);
                let handle = tokio::spawn(run_delivery(
                    Arc::clone(sink),
                    rx,
                    self.delivery_delay,
                    cancel.clone(),
                ));
                (Some(tx), Some(handle))
            }
            None => (None, None),
        };

        let mut tasks = JoinSet::new();
        match self.crawl_loop(&mut tasks, tx.as_ref(), &cancel).await {
            LoopExit::Exhausted => self.state.transition(CrawlPhase::Draining)?,
            LoopExit::Stalled | LoopExit::Cancelled => {
                for _ in 0..tasks.len() {
                    self.report.record_page(PageState::Abandoned);
                }
                tasks.abort_all();
                while tasks.join_next().await.is_some() {}
                self.report.frontier_remaining = self.scheduler.frontier_size() as u64;
                self.state.cancel();
            }
        }

        // Closing the channel lets the worker finish once the queue is empty
        drop(tx);
        if let Some(handle) = delivery {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(error = %e, "Delivery worker failed");
                    DeliveryReport::default()
                }
            };
            self.report.delivery = Some(report);
        }

        if cancel.is_cancelled() {
            self.state.cancel();
        } else if self.state.phase() == CrawlPhase::Draining {
            self.state.transition(CrawlPhase::Done)?;
        }

        self.report.urls_visited = self.scheduler.requests_started();
        self.report.partial = self.state.is_partial();
        self.report.elapsed = started.elapsed();

        tracing::info!(
            urls_visited = self.report.urls_visited,
            urls_admitted = self.frontier.visited_count(),
            chunks = self.report.chunks_created,
            partial = self.report.partial,
            "Crawl finished in {:?}",
            self.report.elapsed
        );

        Ok(CrawlOutcome {
            chunks: self.chunks,
            report: self.report,
            phase: self.state.phase(),
        })
    }

    fn submit_seeds(&mut self) {
        for seed in std::mem::take(&mut self.seeds) {
            match self.frontier.admit(&seed, 0) {
                Admission::Admitted(url) => self.scheduler.push(url, 0),
                rejected => tracing::warn!(seed = %seed, reason = ?rejected, "Seed not admitted"),
            }
        }
    }

    /// Dispatches and collects page tasks until the frontier is exhausted
    async fn crawl_loop(
        &mut self,
        tasks: &mut JoinSet<PageOutcome>,
        tx: Option<&mpsc::Sender<Chunk>>,
        cancel: &CancellationToken,
    ) -> LoopExit {
        let mut pages_completed: u64 = 0;
        // Rate scope held by each running task, released even if it panics
        let mut task_scopes: HashMap<Id, String> = HashMap::new();

        loop {
            if cancel.is_cancelled() {
                return LoopExit::Cancelled;
            }

            let now = Instant::now();
            while let Some(queued) = self.scheduler.next_ready(now) {
                let scope = queued.scope.clone();
                let handle = tasks.spawn(process_page(Arc::clone(&self.fetcher), queued));
                task_scopes.insert(handle.id(), scope);
            }

            if tasks.is_empty() && self.scheduler.is_empty() {
                tracing::info!("Frontier is empty, crawl complete");
                return LoopExit::Exhausted;
            }

            let wait = self.scheduler.time_until_ready(now);
            if tasks.is_empty() && wait.is_none() {
                tracing::error!(
                    remaining = self.scheduler.frontier_size(),
                    "Frontier stalled with no fetch in flight"
                );
                return LoopExit::Stalled;
            }

            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => LoopEvent::Cancelled,
                Some(joined) = tasks.join_next_with_id() => LoopEvent::Joined(joined),
                _ = tokio::time::sleep(wait.unwrap_or_default()), if wait.is_some() => LoopEvent::Tick,
            };

            match event {
                LoopEvent::Cancelled => return LoopExit::Cancelled,
                LoopEvent::Tick => {}
                LoopEvent::Joined(Err(e)) => {
                    tracing::error!(error = %e, "Page task failed");
                    if let Some(scope) = task_scopes.remove(&e.id()) {
                        self.scheduler.record_finished(&scope);
                    }
                    self.report.record_page(PageState::Failed);
                }
                LoopEvent::Joined(Ok((id, outcome))) => {
                    task_scopes.remove(&id);
                    if !self.handle_outcome(outcome, tx, cancel).await {
                        return LoopExit::Cancelled;
                    }

                    pages_completed += 1;
                    if pages_completed % 10 == 0 {
                        tracing::info!(
                            "Progress: {} pages done, {} in frontier, {} chunks",
                            pages_completed,
                            self.scheduler.frontier_size(),
                            self.report.chunks_created
                        );
                    }
                }
            }
        }
    }

    /// Applies one page's results: links first, then chunk emission
    ///
    /// The page is committed before its chunks are queued, so a chunk that
    /// reaches the sink is always part of the result. Returns false if
    /// cancellation interrupted the queuing.
    async fn handle_outcome(
        &mut self,
        outcome: PageOutcome,
        tx: Option<&mpsc::Sender<Chunk>>,
        cancel: &CancellationToken,
    ) -> bool {
        self.scheduler.record_finished(&outcome.scope);

        let (final_url, page) = match outcome.result {
            PageResult::Parsed { final_url, page } => (final_url, page),
            PageResult::Redirected { location } => {
                tracing::debug!(url = %outcome.url, location = %location, "Offering redirect target");
                self.report.record_page(PageState::Redirected);
                // Same depth: a redirect is not a hop
                self.discover_links(&[location.to_string()], outcome.depth);
                return true;
            }
            PageResult::Failed { state, reason } => {
                tracing::warn!(
                    url = %outcome.url,
                    depth = outcome.depth,
                    state = %state,
                    "Abandoning URL: {}",
                    reason
                );
                self.report.record_page(state);
                return true;
            }
        };

        self.discover_links(&page.links, outcome.depth + 1);

        if let Some(classifier) = &self.classifier {
            if !classifier.is_relevant(page.title.as_deref(), page.text.as_str()) {
                tracing::debug!(url = %final_url, "Page filtered by classifier");
                self.report.record_page(PageState::Filtered);
                return true;
            }
        }

        let chunks = self.chunker.chunk_page(
            &page.text,
            final_url.as_str(),
            page.title.as_deref(),
            self.next_position,
        );

        tracing::debug!(url = %final_url, chunks = chunks.len(), "Page committed");
        let committed_from = self.chunks.len();
        self.next_position += chunks.len() as u64;
        self.report.chunks_created += chunks.len() as u64;
        self.report.record_page(PageState::Processed);
        self.chunks.extend(chunks);

        if let Some(tx) = tx {
            for chunk in &self.chunks[committed_from..] {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return false,
                    sent = tx.send(chunk.clone()) => {
                        if sent.is_err() {
                            tracing::warn!(
                                url = %chunk.source_url,
                                position = chunk.position,
                                "Delivery worker stopped, chunk not queued"
                            );
                        }
                    }
                }
            }
        }

        true
    }

    fn discover_links(&mut self, links: &[String], depth: u32) {
        for link in links {
            match self.frontier.admit(link, depth) {
                Admission::Admitted(url) => {
                    tracing::trace!(url = %url, depth, "Enqueued");
                    self.scheduler.push(url, depth);
                }
                Admission::DepthExceeded => self.report.links_too_deep += 1,
                Admission::OutOfScope => self.report.links_out_of_scope += 1,
                Admission::AlreadyVisited => self.report.links_already_visited += 1,
                Admission::Invalid => {}
            }
        }
    }
}
