//! Query command: render (and optionally run) the feature query

use anyhow::Result;
use chrono::NaiveDate;

use crate::config::PipelineConfig;
use crate::sql::{LoanQuery, RowFilter};
use crate::transform::DateWindow;

pub struct QueryArgs {
    pub baseline: bool,
    pub after: Option<NaiveDate>,
    pub before: Option<NaiveDate>,
    pub table: Option<String>,
    pub execute: bool,
}

pub fn build_query(args: &QueryArgs, config: &PipelineConfig) -> LoanQuery {
    let table = args
        .table
        .clone()
        .unwrap_or_else(|| config.database.table.clone());
    let plan = &config.model;

    let filter = match (args.baseline, args.after, args.before) {
        (true, _, _) => RowFilter::AfterPolicyBaseline {
            days_available: plan.baseline_days,
            before: plan.train_before,
        },
        (false, Some(after), Some(before)) => {
            RowFilter::PostedBetween(DateWindow::new(after, before))
        }
        _ => RowFilter::All,
    };

    LoanQuery::new(table)
        .with_columns(plan.columns.clone())
        .with_filter(filter)
}

pub async fn execute(args: QueryArgs, config: &PipelineConfig) -> Result<()> {
    let query = build_query(&args, config);
    let sql = query.to_sql()?;

    if !args.execute {
        println!("{sql}");
        return Ok(());
    }

    run(&query, config).await
}

#[cfg(feature = "postgres")]
async fn run(query: &LoanQuery, config: &PipelineConfig) -> Result<()> {
    let store = crate::sql::PostgresStore::connect(&config.database).await?;
    let rows = store.fetch(query).await?;
    store.close().await;

    for row in rows {
        println!("{}", serde_json::Value::Object(row));
    }
    Ok(())
}

#[cfg(not(feature = "postgres"))]
async fn run(_query: &LoanQuery, _config: &PipelineConfig) -> Result<()> {
    Err(anyhow::anyhow!(
        "kiva was built without PostgreSQL support; rebuild with --features postgres"
    ))
}
