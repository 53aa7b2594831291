//! Connection monitor aggregated over the polled queries

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    DatabaseStats,
    JobStatus,
}

impl QueryKind {
    pub fn all() -> [QueryKind; 2] {
        [QueryKind::DatabaseStats, QueryKind::JobStatus]
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            QueryKind::DatabaseStats => "GET database-stats",
            QueryKind::JobStatus => "GET job/{id}",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Checking,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Checking => "Checking connection...",
            ConnectionState::Connected => "Connected",
            ConnectionState::Disconnected => "Disconnected from server",
        }
    }
}

/// Request bookkeeping for one query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    pub in_flight: bool,
    /// Set once the first request finished, successfully or not
    pub settled: bool,
    pub last_error: Option<String>,
}

impl QueryState {
    /// Loading means waiting for a first answer; background refetches don't count
    pub fn is_loading(&self) -> bool {
        self.in_flight && !self.settled
    }
}

#[derive(Debug, Default)]
pub struct ConnectionMonitor {
    stats: QueryState,
    job: QueryState,
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self, kind: QueryKind) -> &QueryState {
        match kind {
            QueryKind::DatabaseStats => &self.stats,
            QueryKind::JobStatus => &self.job,
        }
    }

    fn query_mut(&mut self, kind: QueryKind) -> &mut QueryState {
        match kind {
            QueryKind::DatabaseStats => &mut self.stats,
            QueryKind::JobStatus => &mut self.job,
        }
    }

    pub fn request_started(&mut self, kind: QueryKind) {
        self.query_mut(kind).in_flight = true;
    }

    pub fn request_succeeded(&mut self, kind: QueryKind) {
        let q = self.query_mut(kind);
        q.in_flight = false;
        q.settled = true;
        q.last_error = None;
    }

    pub fn request_failed(&mut self, kind: QueryKind, error: impl Into<String>) {
        let q = self.query_mut(kind);
        q.in_flight = false;
        q.settled = true;
        q.last_error = Some(error.into());
    }

    /// Forget a query's history, e.g. when the selected job changes
    pub fn reset(&mut self, kind: QueryKind) {
        *self.query_mut(kind) = QueryState::default();
    }

    pub fn state(&self) -> ConnectionState {
        let queries = QueryKind::all().map(|k| self.query(k));
        if queries.iter().any(|q| q.is_loading()) {
            ConnectionState::Checking
        } else if queries.iter().any(|q| q.last_error.is_some()) {
            ConnectionState::Disconnected
        } else {
            ConnectionState::Connected
        }
    }

    /// Errors of the failing queries, for the details overlay
    pub fn errors(&self) -> Vec<(QueryKind, &str)> {
        QueryKind::all()
            .into_iter()
            .filter_map(|k| self.query(k).last_error.as_deref().map(|e| (k, e)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checking_while_any_query_loads() {
        let mut monitor = ConnectionMonitor::new();
        monitor.request_failed(QueryKind::JobStatus, "timeout");
        monitor.request_started(QueryKind::DatabaseStats);
        assert_eq!(monitor.state(), ConnectionState::Checking);
    }

    #[test]
    fn test_disconnected_until_success() {
        let mut monitor = ConnectionMonitor::new();
        monitor.request_started(QueryKind::DatabaseStats);
        monitor.request_failed(QueryKind::DatabaseStats, "connection refused");
        monitor.request_started(QueryKind::DatabaseStats);
        monitor.request_failed(QueryKind::DatabaseStats, "connection refused");
        assert_eq!(monitor.state(), ConnectionState::Disconnected);

        // a settled query refetching in the background is not "loading"
        monitor.request_started(QueryKind::DatabaseStats);
        assert_eq!(monitor.state(), ConnectionState::Disconnected);

        monitor.request_succeeded(QueryKind::DatabaseStats);
        assert_eq!(monitor.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_idle_monitor_is_connected() {
        assert_eq!(ConnectionMonitor::new().state(), ConnectionState::Connected);
    }

    #[test]
    fn test_reset_clears_errors() {
        let mut monitor = ConnectionMonitor::new();
        monitor.request_failed(QueryKind::JobStatus, "boom");
        assert_eq!(monitor.errors(), vec![(QueryKind::JobStatus, "boom")]);
        monitor.reset(QueryKind::JobStatus);
        assert!(monitor.errors().is_empty());
        assert_eq!(monitor.state(), ConnectionState::Connected);
    }
}
