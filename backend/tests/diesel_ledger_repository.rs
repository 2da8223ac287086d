//! Integration tests for the Diesel ledger and channel repositories.
//!
//! Each test runs against its own database cloned from a migrated template on
//! an embedded PostgreSQL cluster provided by `pg-embedded-setup-unpriv`.

use moneysaver::domain::ports::{
    ChannelRepository, ChannelRepositoryError, LedgerRepository, LedgerRepositoryError,
};
use moneysaver::domain::{Channel, ChannelId, Expenditure, LedgerPartition, MessageTs};
use moneysaver::outbound::persistence::{
    DbPool, DieselChannelRepository, DieselLedgerRepository, PoolConfig,
};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::error::SqlState;
use postgres::{Client, NoTls};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::shared_cluster::shared_cluster_handle;
use support::{format_postgres_error, handle_cluster_setup_failure, provision_template_database};

// 2024-01-02T00:00:00Z and 2024-02-02T00:00:00Z.
const JANUARY_TS: &str = "1704153600.000100";
const JANUARY_LATER_TS: &str = "1704240000.000200";
const FEBRUARY_TS: &str = "1706832000.000300";

struct TestContext {
    runtime: Runtime,
    ledger: DieselLedgerRepository,
    channels: DieselChannelRepository,
    database_url: String,
    _database: TemporaryDatabase,
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle().map_err(|err| err.to_string())?;
    let temp_db = provision_template_database(cluster).map_err(|err| err.to_string())?;
    let database_url = temp_db.url().to_string();

    let config = PoolConfig::new(database_url.as_str()).with_max_size(2);
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        ledger: DieselLedgerRepository::new(pool.clone()),
        channels: DieselChannelRepository::new(pool),
        database_url,
        _database: temp_db,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn channel(id: &str) -> ChannelId {
    ChannelId::new(id).expect("valid channel id")
}

fn expenditure(channel_id: &str, ts: &str, amount: i64) -> Expenditure {
    Expenditure::new(channel(channel_id), MessageTs::new(ts).expect("valid ts"), amount)
}

fn partition_of(channel_id: &str, ts: &str) -> LedgerPartition {
    let key = MessageTs::new(ts).expect("valid ts");
    LedgerPartition::new(channel(channel_id), key.occurred_at())
}

fn execute_sql(url: &str, sql: &str) -> Result<u64, postgres::Error> {
    let mut client = Client::connect(url, NoTls)?;
    client.execute(sql, &[])
}

#[rstest]
fn repeated_add_counts_a_message_once(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: repeated_add_counts_a_message_once skipped");
        return;
    };
    let ledger = context.ledger.clone();
    let record = expenditure("C1", JANUARY_TS, 500);

    let total = context.runtime.block_on(async {
        ledger.add(&record).await.expect("first add");
        ledger.add(&record).await.expect("redelivered add");
        ledger.sum(&record.partition()).await.expect("sum")
    });

    assert_eq!(total, 500);
}

#[rstest]
fn edited_message_overwrites_its_amount(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: edited_message_overwrites_its_amount skipped");
        return;
    };
    let ledger = context.ledger.clone();

    let total = context.runtime.block_on(async {
        ledger
            .add(&expenditure("C1", JANUARY_TS, 500))
            .await
            .expect("original");
        ledger
            .add(&expenditure("C1", JANUARY_TS, 1_200))
            .await
            .expect("edit");
        ledger
            .sum(&partition_of("C1", JANUARY_TS))
            .await
            .expect("sum")
    });

    assert_eq!(total, 1_200);
}

#[rstest]
fn removing_an_unknown_message_is_a_no_op(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: removing_an_unknown_message_is_a_no_op skipped");
        return;
    };
    let ledger = context.ledger.clone();
    let kept = expenditure("C1", JANUARY_TS, 300);
    let missing = MessageTs::new(JANUARY_LATER_TS).expect("valid ts");

    let total = context.runtime.block_on(async {
        ledger.add(&kept).await.expect("add");
        ledger
            .remove(&channel("C1"), &missing, missing.occurred_at())
            .await
            .expect("absent record removes cleanly");
        ledger.sum(&kept.partition()).await.expect("sum")
    });

    assert_eq!(total, 300);
}

#[rstest]
fn removal_is_idempotent(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: removal_is_idempotent skipped");
        return;
    };
    let ledger = context.ledger.clone();
    let record = expenditure("C1", JANUARY_TS, 800);

    let total = context.runtime.block_on(async {
        ledger.add(&record).await.expect("add");
        for _ in 0..2 {
            ledger
                .remove(
                    record.channel(),
                    record.idempotency_key(),
                    record.occurred_at(),
                )
                .await
                .expect("remove");
        }
        ledger.sum(&record.partition()).await.expect("sum")
    });

    assert_eq!(total, 0);
}

#[rstest]
fn partitions_do_not_share_totals(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: partitions_do_not_share_totals skipped");
        return;
    };
    let ledger = context.ledger.clone();

    let (january, february, other_channel, empty) = context.runtime.block_on(async {
        for record in [
            expenditure("C1", JANUARY_TS, 500),
            expenditure("C1", JANUARY_LATER_TS, 250),
            expenditure("C1", FEBRUARY_TS, 700),
            expenditure("C2", JANUARY_TS, 900),
        ] {
            ledger.add(&record).await.expect("add");
        }
        (
            ledger.sum(&partition_of("C1", JANUARY_TS)).await.expect("sum"),
            ledger.sum(&partition_of("C1", FEBRUARY_TS)).await.expect("sum"),
            ledger.sum(&partition_of("C2", JANUARY_TS)).await.expect("sum"),
            ledger.sum(&partition_of("C3", JANUARY_TS)).await.expect("sum"),
        )
    });

    assert_eq!(january, 750);
    assert_eq!(february, 700);
    assert_eq!(other_channel, 900);
    assert_eq!(empty, 0);
}

#[rstest]
fn overflowing_total_is_reported(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: overflowing_total_is_reported skipped");
        return;
    };
    let ledger = context.ledger.clone();

    let result = context.runtime.block_on(async {
        ledger
            .add(&expenditure("C1", JANUARY_TS, i64::MAX))
            .await
            .expect("add max");
        ledger
            .add(&expenditure("C1", JANUARY_LATER_TS, 1))
            .await
            .expect("add one");
        ledger.sum(&partition_of("C1", JANUARY_TS)).await
    });

    let error = result.expect_err("total exceeds i64");
    assert!(
        matches!(&error, LedgerRepositoryError::Overflow { partition } if partition.contains("C1")),
        "unexpected error: {error:?}"
    );
}

#[rstest]
fn unconfigured_channel_is_not_found(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: unconfigured_channel_is_not_found skipped");
        return;
    };
    let channels = context.channels.clone();

    let error = context
        .runtime
        .block_on(async { channels.find(&channel("C404")).await })
        .expect_err("no budget stored");

    assert_eq!(error, ChannelRepositoryError::not_found("C404"));
}

#[rstest]
fn saving_a_budget_overwrites_the_previous_one(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: saving_a_budget_overwrites_the_previous_one skipped");
        return;
    };
    let channels = context.channels.clone();

    let (first, second) = context.runtime.block_on(async {
        channels
            .save(&Channel::new(channel("C1"), 1_000).expect("budget"))
            .await
            .expect("save");
        let first = channels.find(&channel("C1")).await.expect("find");
        channels
            .save(&Channel::new(channel("C1"), 2_500).expect("budget"))
            .await
            .expect("overwrite");
        let second = channels.find(&channel("C1")).await.expect("find");
        (first, second)
    });

    assert_eq!(first.budget(), 1_000);
    assert_eq!(second.budget(), 2_500);
    assert_eq!(second.id().as_str(), "C1");
}

#[rstest]
#[case::negative_budget("INSERT INTO channels (id, budget) VALUES ('C1', -1)")]
#[case::malformed_month(concat!(
    "INSERT INTO expenditures (channel_id, month, message_ts, amount, occurred_at) ",
    "VALUES ('C1', '2024-1', '1704153600.000100', 500, now())"
))]
fn schema_rejects_invalid_rows(repo_context: Option<TestContext>, #[case] sql: &str) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: schema_rejects_invalid_rows skipped");
        return;
    };

    let error = execute_sql(&context.database_url, sql).expect_err("check constraint applies");

    assert_eq!(
        error.code(),
        Some(&SqlState::CHECK_VIOLATION),
        "unexpected error: {}",
        format_postgres_error(&error)
    );
}
