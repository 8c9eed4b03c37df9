use super::monitors::NoopMonitor;
use super::types::{QueryContext, QueryMonitor, QueryResult};
use crate::client::GenericClient;
use crate::error::OrmResult;
use crate::record::Record;
use crate::statement::Placeholders;
use crate::value::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A [`GenericClient`] that times every call and reports it to a monitor.
///
/// Without a monitor it behaves exactly like the wrapped client.
pub struct InstrumentedClient<C> {
    client: C,
    monitor: Arc<dyn QueryMonitor>,
    slow_query_threshold: Option<Duration>,
    tag: Option<String>,
}

impl<C: GenericClient> InstrumentedClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            monitor: Arc::new(NoopMonitor),
            slow_query_threshold: None,
            tag: None,
        }
    }

    pub fn with_monitor<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitor = Arc::new(monitor);
        self
    }

    /// Share one monitor between several clients.
    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Calls slower than `threshold` also trigger [`QueryMonitor::on_slow_query`].
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    /// Label attached to every reported [`QueryContext`].
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn slow_query_threshold(&self) -> Option<Duration> {
        self.slow_query_threshold
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    fn start(&self, sql: &str, params: &[Value]) -> QueryContext {
        let mut ctx = QueryContext::new(sql, params.len());
        ctx.tag = self.tag.clone();
        self.monitor.on_query_start(&ctx);
        ctx
    }

    pub(super) fn report(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        self.monitor.on_query_complete(ctx, duration, result);
        if let Some(threshold) = self.slow_query_threshold {
            if duration > threshold {
                self.monitor.on_slow_query(ctx, duration);
            }
        }
    }
}

impl<C: GenericClient> GenericClient for InstrumentedClient<C> {
    fn placeholders(&self) -> Placeholders {
        self.client.placeholders()
    }

    async fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Record>> {
        let ctx = self.start(sql, params);
        let start = Instant::now();
        let result = self.client.query(sql, params).await;
        let duration = start.elapsed();

        let outcome = match &result {
            Ok(rows) => QueryResult::Rows(rows.len()),
            Err(e) => QueryResult::error(e.to_string()),
        };
        self.report(&ctx, duration, &outcome);
        result
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        let ctx = self.start(sql, params);
        let start = Instant::now();
        let result = self.client.execute(sql, params).await;
        let duration = start.elapsed();

        let outcome = match &result {
            Ok(n) => QueryResult::Affected(*n),
            Err(e) => QueryResult::error(e.to_string()),
        };
        self.report(&ctx, duration, &outcome);
        result
    }
}
