use crate::cli::ReadArgs;
use crate::config::resolve_db_config;
use crate::render::{parse_columns, parse_conditions};
use boardsql::{
    CompositeMonitor, InstrumentedClient, LoggingMonitor, StatsMonitor, create_pool_with_config,
    crud,
};
use std::sync::Arc;
use std::time::Duration;

const SLOW_QUERY: Duration = Duration::from_millis(500);

pub async fn run(args: ReadArgs) -> anyhow::Result<()> {
    // Fail on a bad condition map before touching the database.
    let conditions = parse_conditions(args.conditions.as_deref())?;
    let columns = parse_columns(args.columns.as_deref());

    let db = resolve_db_config(args.config.as_deref(), args.database.as_deref())?;
    let pool = create_pool_with_config(&db)?;
    let stats = Arc::new(StatsMonitor::new());
    let monitor = CompositeMonitor::new()
        .add(LoggingMonitor::new())
        .add(Arc::clone(&stats));
    let client = InstrumentedClient::new(pool.get().await?)
        .with_monitor(monitor)
        .with_slow_query_threshold(SLOW_QUERY)
        .with_tag("cli.read");

    let rows = crud::read(
        &client,
        &args.table,
        &columns,
        &conditions,
        args.order_by.as_deref(),
    )
    .await?;

    let summary = stats.stats();
    tracing::info!(
        table = %args.table,
        rows = rows.len(),
        queries = summary.total_queries,
        slow = summary.slow_queries,
        elapsed_ms = summary.total_duration.as_millis() as u64,
        "read complete"
    );
    for row in &rows {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}
