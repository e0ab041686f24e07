use primed::{
    Arguments, Catalog, Entity, PrepareError, PreparedSession, QueryDescription, RawSql, Record,
    Result, RowLabeled, Session, StatementSource, TableRef, TerminalOp, Value, args, col, param,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use time::{OffsetDateTime, macros::datetime};

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub id: i64,
    pub symbol: String,
    pub venue: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub executed_at: OffsetDateTime,
}

impl Entity for Trade {
    fn from_row(row: RowLabeled) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            symbol: row.get("symbol")?,
            venue: row.get("venue")?,
            price: row.get("price")?,
            quantity: row.get("quantity")?,
            executed_at: row.get("executed_at")?,
        })
    }
}

const SETUP: &str = r#"
DROP TABLE IF EXISTS primed_trade;
CREATE TABLE primed_trade (
    id BIGINT PRIMARY KEY,
    symbol TEXT NOT NULL,
    venue TEXT,
    price NUMERIC(12, 2) NOT NULL,
    quantity INTEGER NOT NULL,
    executed_at TIMESTAMP WITH TIME ZONE NOT NULL
);
INSERT INTO primed_trade VALUES
    (1, 'AAPL', 'NASDAQ', 192.55, 50, '2025-06-07 14:32:00+00'),
    (2, 'MSFT', 'NASDAQ', 415.10, 10, '2025-06-07 14:33:00+00'),
    (3, 'IBM', 'NYSE', 170.00, 25, '2025-06-07 14:34:00+00'),
    (4, 'AAPL', 'NYSE', 192.60, 5, '2025-06-07 14:35:00+00'),
    (5, 'KO', 'NYSE', 61.20, 100, '2025-06-07 14:36:00+00'),
    (6, 'AAPL', NULL, 192.50, 7, '2025-06-07 14:37:00+00');
"#;

fn table() -> TableRef {
    TableRef::new("primed_trade").with_primary_key(["id"])
}

fn register<D: primed::Driver>(catalog: &Catalog<D>) {
    let statements: Vec<(&str, StatementSource)> = vec![
        (
            "trade.by_venue",
            QueryDescription::select(table())
                .filter(col("venue").eq(param("venue")))
                .order_by([col("id").asc()])
                .all()
                .into(),
        ),
        (
            "trade.by_id",
            QueryDescription::select(table())
                .filter(col("id").eq(param("id")))
                .one()
                .into(),
        ),
        (
            "trade.one_by_symbol",
            QueryDescription::select(table())
                .filter(col("symbol").eq(param("symbol")))
                .one()
                .into(),
        ),
        (
            "trade.first_by_symbol",
            QueryDescription::select(table())
                .filter(col("symbol").eq(param("symbol")))
                .first()
                .into(),
        ),
        (
            "trade.last_by_symbol",
            QueryDescription::select(table())
                .filter(col("symbol").eq(param("symbol")))
                .order_by([col("executed_at").asc()])
                .last()
                .into(),
        ),
        (
            "trade.by_symbol_desc",
            QueryDescription::select(table())
                .filter(col("symbol").eq(param("symbol")))
                .order_by([col("executed_at").desc()])
                .all()
                .into(),
        ),
        (
            "trade.count_by_venue",
            QueryDescription::select(table())
                .filter(col("venue").eq(param("venue")))
                .count()
                .into(),
        ),
        (
            "trade.count_page",
            QueryDescription::select(table())
                .filter(col("venue").eq(param("venue")))
                .order_by([col("id").asc()])
                .limit(2)
                .count()
                .into(),
        ),
        (
            "trade.since",
            QueryDescription::select(table())
                .columns(["id", "symbol"])
                .filter(col("executed_at").ge(param("since")))
                .order_by([col("id").asc()])
                .all()
                .into(),
        ),
        (
            "trade.raw_by_symbol",
            RawSql::new(
                "SELECT id, symbol FROM primed_trade WHERE quantity >= %(min)s AND symbol = %(symbol)s ORDER BY id;",
            )
            .into(),
        ),
        (
            "trade.raw_count_above",
            RawSql::new("SELECT * FROM primed_trade WHERE price > %s")
                .terminal(TerminalOp::Count)
                .into(),
        ),
    ];
    for (name, source) in statements {
        catalog
            .register(name, source)
            .unwrap_or_else(|e| panic!("Could not register `{name}`: {e:#}"));
    }
}

pub async fn trades<S: Session>(session: S) -> S {
    session
        .batch_execute(SETUP)
        .await
        .expect("Could not create the primed_trade table");
    let catalog = Arc::new(Catalog::new(session.driver()));
    register(&catalog);
    let session = PreparedSession::new(session, catalog.clone());

    // Fetch all
    let nasdaq = session
        .fetch_all::<Trade>("trade.by_venue", &args! { "venue" => "NASDAQ" })
        .await
        .expect("Could not fetch the NASDAQ trades");
    assert_eq!(nasdaq.iter().map(|t| t.id).collect::<Vec<_>>(), [1, 2]);
    assert_eq!(nasdaq[0].symbol, "AAPL");
    assert_eq!(nasdaq[0].price, Decimal::new(19255, 2));
    assert_eq!(nasdaq[0].quantity, 50);
    assert_eq!(nasdaq[0].executed_at, datetime!(2025-06-07 14:32:00 UTC));
    let nyse = session
        .fetch_all::<Record>("trade.by_venue", &args! { "venue" => "NYSE" })
        .await
        .expect("Could not fetch the NYSE trades");
    assert_eq!(nyse.len(), 3);
    assert!(
        nyse.iter()
            .all(|r| r.get("venue") == Some(&Value::Varchar(Some("NYSE".into()))))
    );

    // Both executions reused the same prepared statement
    let key = catalog
        .key("trade.by_venue", &args! { "venue" => "NYSE" }, session.config())
        .expect("Could not compute the key");
    assert!(session.registry().is_prepared(&key));
    assert_eq!(
        session
            .registry()
            .prepared_keys()
            .iter()
            .filter(|k| k.name.as_ref() == "trade.by_venue")
            .count(),
        1
    );

    // Fetch one
    let trade = session
        .fetch_one::<Trade>("trade.by_id", &args! { "id" => 3i64 })
        .await
        .expect("Could not fetch the trade 3");
    assert_eq!(trade.symbol, "IBM");
    assert_eq!(trade.venue.as_deref(), Some("NYSE"));
    let error = session
        .fetch_one::<Trade>("trade.by_id", &args! { "id" => 42i64 })
        .await
        .expect_err("The trade 42 does not exist");
    assert!(matches!(
        PrepareError::find(&error),
        Some(PrepareError::DoesNotExist(..))
    ));
    let error = session
        .fetch_one::<Trade>("trade.one_by_symbol", &args! { "symbol" => "AAPL" })
        .await
        .expect_err("There are multiple AAPL trades");
    assert!(matches!(
        PrepareError::find(&error),
        Some(PrepareError::MultipleObjectsReturned { count: 3, .. })
    ));
    let error = session
        .fetch_one::<Trade>("trade.by_id", &Arguments::new())
        .await
        .expect_err("The id argument is missing");
    assert!(matches!(
        PrepareError::find(&error),
        Some(PrepareError::UnresolvedPlaceholder(name)) if name == "id"
    ));

    // First and last
    let first = session
        .fetch_optional::<Trade>("trade.first_by_symbol", &args! { "symbol" => "AAPL" })
        .await
        .expect("Could not fetch the first AAPL trade")
        .expect("There is an AAPL trade");
    assert_eq!(first.id, 1);
    let last = session
        .fetch_optional::<Trade>("trade.last_by_symbol", &args! { "symbol" => "AAPL" })
        .await
        .expect("Could not fetch the last AAPL trade")
        .expect("There is an AAPL trade");
    assert_eq!(last.id, 6);
    let reversed = session
        .fetch_all::<Trade>("trade.by_symbol_desc", &args! { "symbol" => "AAPL" })
        .await
        .expect("Could not fetch the AAPL trades");
    assert_eq!(reversed.first(), Some(&last));
    let none = session
        .fetch_optional::<Trade>("trade.last_by_symbol", &args! { "symbol" => "TSLA" })
        .await
        .expect("Could not fetch the last TSLA trade");
    assert_eq!(none, None);

    // Count
    let count = session
        .count("trade.count_by_venue", &args! { "venue" => "NYSE" })
        .await
        .expect("Could not count the NYSE trades");
    assert_eq!(count, 3);
    let count = session
        .count("trade.count_page", &args! { "venue" => "NYSE" })
        .await
        .expect("Could not count the NYSE page");
    assert_eq!(count, 2);

    // Timestamps
    let since = session
        .fetch_all::<Record>(
            "trade.since",
            &args! { "since" => datetime!(2025-06-07 16:35:00 +02:00) },
        )
        .await
        .expect("Could not fetch the trades since 14:35");
    assert_eq!(
        since
            .iter()
            .map(|r| r.get("id").cloned())
            .collect::<Vec<_>>(),
        [
            Some(Value::Int64(Some(4))),
            Some(Value::Int64(Some(5))),
            Some(Value::Int64(Some(6))),
        ]
    );
    assert!(since.iter().all(|r| r.len() == 2));

    // Raw SQL
    let raw = session
        .fetch_all::<Record>(
            "trade.raw_by_symbol",
            &args! { "min" => 6, "symbol" => "AAPL" },
        )
        .await
        .expect("Could not run the raw statement");
    assert_eq!(
        raw.iter().map(|r| r.get("id").cloned()).collect::<Vec<_>>(),
        [Some(Value::Int64(Some(1))), Some(Value::Int64(Some(6)))]
    );
    let count = session
        .count(
            "trade.raw_count_above",
            &Arguments::positional([Decimal::new(100, 0)]),
        )
        .await
        .expect("Could not count the trades above 100");
    assert_eq!(count, 5);

    session.deallocate_all().await;
    assert!(session.registry().prepared_keys().is_empty());
    session.into_session()
}
