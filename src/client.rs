// src/client.rs
//
// Ties the pieces together: validate → quota check → GET → parse → flatten.
// One request at a time, blocking, never retried. Errors abort the call and
// no partial table is handed back.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;

use crate::config::consts::MAX_PER_PAGE;
use crate::config::{Credential, FetchOptions};
use crate::error::{Result, ScorecardError};
use crate::flatten::{flatten_str, PageMeta};
use crate::net;
use crate::progress::Progress;
use crate::query::{Filter, RequestDescriptor};
use crate::table::ResultTable;

/// Requests sent per api key inside the rolling window.
/// Purely local bookkeeping so we refuse before the server answers 429.
#[derive(Debug)]
struct QuotaLedger {
    limit: u32,
    window: Duration,
    sent: HashMap<String, VecDeque<Instant>>,
}

impl QuotaLedger {
    fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window, sent: HashMap::new() }
    }

    fn prune(&mut self, key: &str, now: Instant) -> &mut VecDeque<Instant> {
        let window = self.window;
        let q = self.sent.entry(s!(key)).or_default();
        while q.front().is_some_and(|t| now.duration_since(*t) >= window) {
            q.pop_front();
        }
        q
    }

    fn try_acquire(&mut self, key: &str, now: Instant) -> Result<()> {
        let limit = self.limit;
        let q = self.prune(key, now);
        if q.len() as u32 >= limit {
            return Err(ScorecardError::QuotaExhausted { limit });
        }
        q.push_back(now);
        Ok(())
    }

    fn remaining(&mut self, key: &str, now: Instant) -> u32 {
        let limit = self.limit;
        limit.saturating_sub(self.prune(key, now).len() as u32)
    }
}

pub struct ScorecardClient {
    http: Client,
    options: FetchOptions,
    ledger: Option<QuotaLedger>,
}

impl ScorecardClient {
    pub fn new(options: FetchOptions) -> Result<Self> {
        let http = net::build_client(options.timeout)?;
        let ledger = options.quota.map(|limit| QuotaLedger::new(limit, options.quota_window));
        Ok(Self { http, options, ledger })
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Descriptor pointed at this client's endpoint with its default page size.
    pub fn request(&self, filter: Filter, credential: Credential) -> RequestDescriptor {
        RequestDescriptor::new(filter, credential)
            .endpoint(&self.options.base_url, &self.options.dataset)
            .per_page(self.options.per_page)
    }

    /// Requests left in the current window for this key, if tracking is on.
    pub fn remaining_quota(&mut self, credential: &Credential) -> Option<u32> {
        let now = Instant::now();
        self.ledger.as_mut().map(|l| l.remaining(credential.expose(), now))
    }

    /// One page, with the paging metadata when the server sent it.
    pub fn fetch_page(&mut self, desc: &RequestDescriptor) -> Result<(Option<PageMeta>, ResultTable)> {
        desc.validate()?;
        if let Some(ledger) = self.ledger.as_mut() {
            ledger.try_acquire(desc.credential.expose(), Instant::now())?;
        }

        let url = desc.url();
        let resp = net::http_get(&self.http, &url)?;
        let body = net::ensure_ok(resp, &url)?;
        let (meta, table) = flatten_str(&body)?;

        tracing::info!(page = desc.page, rows = table.len(), columns = table.columns().len(), "page fetched");
        if self.options.warn_unresolved && !table.is_empty() {
            let missing = table.unresolved(&desc.fields);
            if !missing.is_empty() {
                tracing::warn!(fields = %missing.join(","), "requested fields returned no column");
            }
        }
        Ok((meta, table))
    }

    /// One page as a table.
    pub fn fetch(&mut self, desc: &RequestDescriptor) -> Result<ResultTable> {
        self.fetch_page(desc).map(|(_, t)| t)
    }

    /// Lazy page sequence starting at page 0. See [`Pages`].
    pub fn pages(&mut self, desc: &RequestDescriptor) -> Pages<'_> {
        Pages {
            client: self,
            desc: desc.with_page(0),
            next: 0,
            last: None,
            widest: 0,
            done: false,
        }
    }

    /// Drain `pages` into one table (columns unioned), at most `max_pages` pages.
    pub fn collect_pages(
        &mut self,
        desc: &RequestDescriptor,
        max_pages: Option<u32>,
        mut progress: Option<&mut dyn Progress>,
    ) -> Result<ResultTable> {
        let result = self.collect_inner(
            desc,
            max_pages,
            progress.as_mut().map(|p| &mut **p as &mut dyn Progress),
        );
        if let Some(p) = progress.as_deref_mut() {
            p.finish();
        }
        result
    }

    fn collect_inner(
        &mut self,
        desc: &RequestDescriptor,
        max_pages: Option<u32>,
        mut progress: Option<&mut dyn Progress>,
    ) -> Result<ResultTable> {
        let mut pages = self.pages(desc);
        let mut out = ResultTable::default();
        let mut fetched = 0u32;

        while max_pages.is_none_or(|m| fetched < m) {
            let Some(page) = pages.next() else { break };
            let table = page?;

            if let Some(p) = progress.as_deref_mut() {
                if fetched == 0 {
                    let total = pages.page_count().unwrap_or(0);
                    p.begin(max_pages.map_or(total, |m| total.min(m)));
                }
                p.page_done(fetched, table.len());
            }
            out.append(table)?;
            fetched += 1;
        }

        tracing::info!(pages = fetched, rows = out.len(), "collected");
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("{} rows from {} pages", out.len(), fetched));
        }
        Ok(out)
    }
}

/// Finite, fused sequence of pages fetched on demand.
///
/// Stops after the last page the metadata announces, on the first empty page,
/// or (without metadata) after a short page. After yielding an error it yields
/// nothing more. It cannot be rewound; call `ScorecardClient::pages` again to
/// start over from page 0.
pub struct Pages<'a> {
    client: &'a mut ScorecardClient,
    desc: RequestDescriptor,
    next: u32,
    last: Option<u32>,
    /// Most rows any page has carried so far.
    widest: usize,
    done: bool,
}

impl Pages<'_> {
    /// Total pages, once the first response told us.
    pub fn page_count(&self) -> Option<u32> {
        self.last
    }

    /// Index of the page the next call to `next` would request.
    pub fn next_page(&self) -> u32 {
        self.next
    }

    /// Without metadata, a page shorter than the page size means the data ran
    /// out. Above `MAX_PER_PAGE` the server clamps to a size we cannot know up
    /// front, so only a page shorter than an earlier one counts.
    fn is_short(&self, rows: usize) -> bool {
        if self.desc.per_page <= MAX_PER_PAGE {
            rows < self.desc.per_page as usize
        } else {
            self.widest > 0 && rows < self.widest
        }
    }
}

impl Iterator for Pages<'_> {
    type Item = Result<ResultTable>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.last.is_some_and(|last| self.next >= last) {
            self.done = true;
            return None;
        }

        let desc = self.desc.with_page(self.next);
        match self.client.fetch_page(&desc) {
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
            Ok((meta, table)) => {
                if table.is_empty() {
                    self.done = true;
                    return None;
                }
                self.next += 1;
                let rows = table.len();
                match meta {
                    Some(m) => self.last = Some(m.page_count()),
                    None if self.is_short(rows) => self.last = Some(self.next),
                    None => {}
                }
                self.widest = self.widest.max(rows);
                Some(Ok(table))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_refuses_past_limit_then_recovers() {
        let mut l = QuotaLedger::new(2, Duration::from_secs(60));
        let t0 = Instant::now();
        l.try_acquire("k", t0).unwrap();
        l.try_acquire("k", t0).unwrap();
        assert!(matches!(l.try_acquire("k", t0), Err(ScorecardError::QuotaExhausted { limit: 2 })));
        // other keys have their own budget
        l.try_acquire("other", t0).unwrap();
        assert_eq!(l.remaining("k", t0), 0);
        let later = t0 + Duration::from_secs(61);
        assert_eq!(l.remaining("k", later), 2);
        l.try_acquire("k", later).unwrap();
    }
}
