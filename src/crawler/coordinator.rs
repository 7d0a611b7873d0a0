//! Crawl orchestration
//!
//! The main loop: pop a target, fetch it (retried), persist the artifact,
//! extract and enqueue in-scope links, pause, repeat. Execution is strictly
//! sequential; one target is fully handled before the next is popped.

use crate::config::{ContentPolicy, CrawlConfig};
use crate::crawler::fetcher::{FetchKind, FetchResult, Fetcher, HttpTransport, Transport};
use crate::crawler::frontier::{CrawlReport, Frontier};
use crate::html::{extract_hrefs, scope_elements};
use crate::storage::{artifact_exists, attachment_path, map_to_path, read_artifact, save_bytes, save_text};
use crate::url::{is_attachment_url, normalize, resolve, ScopeRoot};
use crate::Result;
use scraper::Html;
use url::Url;

/// Recursive site crawler with BFS traversal
///
/// Generic over the transport capability so tests can substitute scripted
/// transports; production uses [`HttpTransport`].
pub struct Crawler<T: Transport> {
    config: CrawlConfig,
    scope: ScopeRoot,
    seed: String,
    fetcher: Fetcher<T>,
    frontier: Frontier,
}

impl Crawler<HttpTransport> {
    /// Creates a crawler backed by the plain HTTP transport
    ///
    /// Fails when the configuration is invalid or the HTTP client cannot
    /// be built; the latter is the only whole-run-fatal condition.
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let transport = HttpTransport::new()?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Crawler<T> {
    /// Creates a crawler over an arbitrary transport capability
    pub fn with_transport(config: CrawlConfig, transport: T) -> Result<Self> {
        config.validate()?;

        let seed_url = normalize(Url::parse(config.start_url.trim_end_matches('/'))?);
        let scope = ScopeRoot::new(&seed_url)?;
        let fetcher = Fetcher::new(transport, config.timeout);

        Ok(Self {
            config,
            scope,
            seed: seed_url.into(),
            fetcher,
            frontier: Frontier::new(),
        })
    }

    /// Current counters; readable at any point, including mid-run
    pub fn report(&self) -> CrawlReport {
        self.frontier.report()
    }

    /// Runs the crawl to completion
    ///
    /// Terminates when the queue empties or the save-count budget is
    /// reached. The budget is checked before each pop, so an in-flight
    /// target always finishes.
    pub async fn run(&mut self) -> Result<CrawlReport> {
        let seed = self.seed.clone();
        self.frontier.enqueue(&seed);
        tracing::info!("Starting crawl from {}", seed);

        loop {
            if self.config.max_pages > 0 && self.frontier.saved_count() >= self.config.max_pages {
                println!(
                    "\n[LIMIT] Reached max pages limit ({}). Stopping.",
                    self.config.max_pages
                );
                break;
            }

            let url = match self.frontier.pop() {
                Some(u) => u,
                None => break,
            };

            if !self.frontier.begin(&url) {
                continue;
            }

            self.process_target(&url).await;

            if !self.frontier.is_exhausted() && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }
        }

        Ok(self.frontier.report())
    }

    /// Downloads, saves, and link-extracts a single target
    async fn process_target(&mut self, url_str: &str) {
        let url = match Url::parse(url_str) {
            Ok(u) => u,
            Err(e) => {
                tracing::debug!("Dropping unparseable frontier entry {}: {}", url_str, e);
                return;
            }
        };

        let attachment = is_attachment_url(&url);
        println!(
            "[{}] Downloading {} (queue: {}, visited: {})",
            self.frontier.saved_count() + 1,
            if attachment { "attachment" } else { "page" },
            self.frontier.queue_len(),
            self.frontier.visited_count(),
        );
        println!("  {}", url_str);

        if attachment {
            self.process_attachment(&url).await;
        } else {
            self.process_page(&url).await;
        }
    }

    /// Downloads and saves a binary attachment; no link extraction
    async fn process_attachment(&mut self, url: &Url) {
        let path = attachment_path(url, &self.config.output_root);

        if self.config.resume && artifact_exists(&path) {
            println!("  [SKIP] Already exists: {}", path.display());
            self.frontier.record_saved();
            return;
        }

        match self.fetcher.fetch(url.as_str(), FetchKind::Attachment).await {
            FetchResult::Binary { bytes, .. } => {
                if let Err(e) = save_bytes(&path, &bytes) {
                    tracing::error!("{}", e);
                    return;
                }
                self.frontier.record_saved();
                let size_mb = bytes.len() as f64 / (1024.0 * 1024.0);
                println!("  [SAVED] {} ({:.1} MB)", path.display(), size_mb);
            }
            FetchResult::Failure { reason } => {
                println!("  [FAIL] {}", reason);
                self.frontier.record_failure(url.as_str(), &reason);
            }
            // Attachment fetches never produce markup results
            FetchResult::Markup { .. } | FetchResult::NotMarkup { .. } => {}
        }
    }

    /// Downloads, saves, and link-extracts a markup page
    async fn process_page(&mut self, url: &Url) {
        let path = map_to_path(url, &self.scope, &self.config.output_root);

        // Resume: an existing artifact counts as saved without fetching,
        // but still feeds link discovery in recursive mode
        if self.config.resume && artifact_exists(&path) {
            println!("  [SKIP] Already exists: {}", path.display());
            self.frontier.record_saved();
            if self.config.recursive {
                match read_artifact(&path) {
                    Ok(body) => self.enqueue_links(&body, url),
                    Err(e) => {
                        tracing::warn!("Could not re-read {} for link extraction: {}", path.display(), e)
                    }
                }
            }
            return;
        }

        match self.fetcher.fetch(url.as_str(), FetchKind::Page).await {
            FetchResult::Markup { body, .. } => {
                if let Err(e) = save_text(&path, &body) {
                    // Not saved; no link extraction for a page we failed
                    // to persist
                    tracing::error!("{}", e);
                    return;
                }
                self.frontier.record_saved();
                println!("  [SAVED] {}", path.display());

                if self.config.recursive || self.config.content.wants_attachments() {
                    self.enqueue_links(&body, url);
                }
            }
            FetchResult::NotMarkup { content_type } => {
                if self.config.verbose {
                    println!("  [SKIP] Non-markup content: {}", content_type);
                }
                tracing::debug!("Skipping non-markup content at {}: {}", url, content_type);
            }
            FetchResult::Failure { reason } => {
                println!("  [FAIL] {}", reason);
                self.frontier.record_failure(url.as_str(), &reason);
            }
            // Page fetches never produce binary results
            FetchResult::Binary { .. } => {}
        }
    }

    /// Parses a page, applies the container filter, and enqueues new
    /// in-scope targets
    ///
    /// The attribute filter scopes seed-page navigation only; every other
    /// page uses the full document. In single-page mode extraction still
    /// runs when the content policy asks for attachments, narrowed so no
    /// further pages are queued.
    fn enqueue_links(&mut self, body: &str, page_url: &Url) {
        let policy = if self.config.recursive {
            self.config.content
        } else {
            ContentPolicy::Attachments
        };

        let document = Html::parse_document(body);
        // A host-root seed renders with a trailing slash, so both sides
        // are trimmed before comparing
        let is_seed_page =
            page_url.as_str().trim_end_matches('/') == self.seed.trim_end_matches('/');
        let (attr_name, attr_text) = if is_seed_page {
            (
                self.config.filter_attr.as_deref(),
                self.config.filter_text.as_deref(),
            )
        } else {
            (None, None)
        };

        let scoped = scope_elements(&document, attr_name, attr_text);
        let hrefs = extract_hrefs(&scoped, policy);
        let found = hrefs.len();

        let mut queued = 0;
        for href in hrefs {
            let resolved = match resolve(page_url, &href) {
                Some(u) => u,
                None => continue,
            };

            // Attachments may live on a foreign host (e.g. a CDN); only
            // pages are held to the crawl scope
            if !is_attachment_url(&resolved) && !self.scope.contains(&resolved) {
                if self.config.verbose {
                    println!("  [OUT-OF-SCOPE] {}", resolved);
                }
                tracing::debug!("Out of scope: {}", resolved);
                continue;
            }

            if self.frontier.enqueue(resolved.as_str()) {
                queued += 1;
                println!("    + {}", resolved);
            }
        }

        if queued > 0 {
            println!("  [LINKS] Found {} links, queued {} new in-scope URLs", found, queued);
        } else if self.config.verbose {
            println!("  [LINKS] Found {} links, none new in-scope", found);
        }
    }
}
