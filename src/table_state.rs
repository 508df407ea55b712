use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::filter::{FilterMap, filter_indices};
use crate::record::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageSize {
    Ten,
    TwentyFive,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [
        PageSize::Ten,
        PageSize::TwentyFive,
        PageSize::Fifty,
        PageSize::Hundred,
    ];

    pub fn value(&self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = usize;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|s| s.value() == n)
            .ok_or(n)
    }
}

/// Filter edits coming from the column popovers and the group filter panel.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCommand {
    Set { name: String, value: String },
    Apply,
    ResetAll,
    ResetField(String),
}

/// Requests coming from the pagination control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    SetPageIndex(usize),
    SetPageSize(PageSize),
}

#[derive(Debug, Clone)]
pub enum TableEvent<T> {
    SetFilterField { name: String, value: String },
    ApplyFilters,
    ResetFilters,
    ResetSingleFilter(String),
    SetPageIndex(usize),
    SetPageSize(PageSize),
    SourceRecordsChanged(Arc<Vec<T>>),
    CommitSlice(u64),
}

impl<T> From<FilterCommand> for TableEvent<T> {
    fn from(cmd: FilterCommand) -> Self {
        match cmd {
            FilterCommand::Set { name, value } => TableEvent::SetFilterField { name, value },
            FilterCommand::Apply => TableEvent::ApplyFilters,
            FilterCommand::ResetAll => TableEvent::ResetFilters,
            FilterCommand::ResetField(name) => TableEvent::ResetSingleFilter(name),
        }
    }
}

impl<T> From<PageRequest> for TableEvent<T> {
    fn from(req: PageRequest) -> Self {
        match req {
            PageRequest::SetPageIndex(idx) => TableEvent::SetPageIndex(idx),
            PageRequest::SetPageSize(size) => TableEvent::SetPageSize(size),
        }
    }
}

pub fn page_count(total: usize, page_size: PageSize) -> usize {
    total.div_ceil(page_size.value())
}

/// Filter and pagination state of one table.
///
/// `rows` maps the filtered view onto indices of `source`. Every event that changes
/// the visible slice puts the table into `loading` and issues a new commit sequence
/// number; only `CommitSlice` with the latest number ends the loading phase.
#[derive(Debug, Clone)]
pub struct TableViewState<T> {
    source: Arc<Vec<T>>,
    filters: FilterMap,
    applied: FilterMap,
    rows: Arc<Vec<usize>>,
    page_index: usize,
    page_size: PageSize,
    loading: bool,
    latest_seq: u64,
}

impl<T: Record> Default for TableViewState<T> {
    fn default() -> Self {
        TableViewState::new(Arc::new(Vec::new()), FilterMap::new(), PageSize::Ten)
    }
}

impl<T: Record> TableViewState<T> {
    pub fn new(source: Arc<Vec<T>>, filters: FilterMap, page_size: PageSize) -> Self {
        let rows = Arc::new((0..source.len()).collect());
        TableViewState {
            source,
            applied: filters.clone(),
            filters,
            rows,
            page_index: 0,
            page_size,
            loading: false,
            latest_seq: 0,
        }
    }

    pub fn update(mut self, event: TableEvent<T>) -> Self {
        let before = (self.page_index, self.page_size, Arc::as_ptr(&self.rows));
        match event {
            TableEvent::SetFilterField { name, value } => {
                if !self.filters.set(&name, &value) {
                    trace!("Ignoring value for unknown filter field {name}");
                }
            }
            TableEvent::ApplyFilters => self.apply_filters(),
            TableEvent::ResetFilters => {
                self.filters.clear_all();
                self.applied = self.filters.clone();
                self.rows = Arc::new((0..self.source.len()).collect());
                self.page_index = 0;
            }
            TableEvent::ResetSingleFilter(name) => {
                self.filters.clear(&name);
                self.apply_filters();
            }
            TableEvent::SetPageIndex(idx) => self.page_index = idx,
            TableEvent::SetPageSize(size) => {
                self.page_size = size;
                self.page_index = 0;
            }
            TableEvent::SourceRecordsChanged(records) => {
                self.source = records;
                self.rows = if self.applied.is_active() {
                    Arc::new(filter_indices(&self.source, &self.applied))
                } else {
                    Arc::new((0..self.source.len()).collect())
                };
            }
            TableEvent::CommitSlice(seq) => {
                if seq == self.latest_seq {
                    self.loading = false;
                } else {
                    trace!("Dropping stale commit {seq}, latest is {}", self.latest_seq);
                }
            }
        }
        self.page_index = self.clamp_page(self.page_index);

        let after = (self.page_index, self.page_size, Arc::as_ptr(&self.rows));
        if before != after {
            self.latest_seq += 1;
            self.loading = true;
        }
        self
    }

    fn apply_filters(&mut self) {
        self.rows = Arc::new(filter_indices(&self.source, &self.filters));
        self.applied = self.filters.clone();
        self.page_index = 0;
        trace!("Filter matched {} of {} records", self.rows.len(), self.source.len());
    }

    fn clamp_page(&self, idx: usize) -> usize {
        std::cmp::min(idx, self.page_count().saturating_sub(1))
    }

    pub fn page_count(&self) -> usize {
        page_count(self.rows.len(), self.page_size)
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.rows.len()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Sequence number a deferred commit has to carry while loading.
    pub fn pending_commit(&self) -> Option<u64> {
        self.loading.then_some(self.latest_seq)
    }

    pub fn filters(&self) -> &FilterMap {
        &self.filters
    }

    pub fn source(&self) -> &Arc<Vec<T>> {
        &self.source
    }

    #[cfg(test)]
    pub fn filtered_records(&self) -> Vec<&T> {
        self.rows.iter().map(|&idx| &self.source[idx]).collect()
    }

    pub fn visible_records(&self) -> Vec<&T> {
        let size = self.page_size.value();
        let begin = std::cmp::min(self.page_index * size, self.rows.len());
        let end = std::cmp::min(begin + size, self.rows.len());
        self.rows[begin..end]
            .iter()
            .map(|&idx| &self.source[idx])
            .collect()
    }
}

/// The single outstanding slice commit. Scheduling replaces whatever was pending.
#[derive(Debug, Default)]
pub struct DeferredCommit {
    pending: Option<(u64, Instant)>,
}

impl DeferredCommit {
    /// Rescheduling the already pending sequence number keeps its deadline.
    pub fn schedule(&mut self, seq: u64, now: Instant, delay: Duration) {
        if !matches!(self.pending, Some((pending, _)) if pending == seq) {
            self.pending = Some((seq, now + delay));
        }
    }

    /// Takes the pending sequence number once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        match self.pending {
            Some((seq, due)) if now >= due => {
                self.pending = None;
                Some(seq)
            }
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
