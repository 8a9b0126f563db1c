// src/progress.rs
/// Progress hooks for `ScorecardClient::collect_pages`.
/// The CLI prints them to stderr; library callers may ignore them.
pub trait Progress {
    /// Page count, once the first response carried metadata (0 if unknown).
    fn begin(&mut self, _total_pages: u32) {}

    /// One-line status message.
    fn log(&mut self, _msg: &str) {}

    /// A page came back and was flattened into `rows` records.
    fn page_done(&mut self, _page: u32, _rows: usize) {}

    /// Always called last, on success and on error.
    fn finish(&mut self) {}
}
