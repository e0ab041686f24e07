use primed::{
    Catalog, PrepareError, PreparedSession, QueryDescription, RawSql, Session, TableRef, Value,
    args, col, lit, param,
};
use std::sync::Arc;

const SETUP: &str = r#"
DROP TABLE IF EXISTS primed_late;
DROP TABLE IF EXISTS primed_book;
CREATE TABLE primed_book (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    year INTEGER NOT NULL
);
INSERT INTO primed_book VALUES (1, 'Dune', 1965), (2, 'Neuromancer', 1984), (3, 'Hyperion', 1989);
"#;

pub async fn eager<S: Session>(session: S) -> S {
    session
        .batch_execute(SETUP)
        .await
        .expect("Could not create the primed_book table");
    let catalog = Arc::new(Catalog::new(session.driver()));
    let book = || TableRef::new("primed_book").with_primary_key(["id"]);
    catalog
        .register(
            "book.all",
            QueryDescription::select(book()).order_by([col("id").asc()]),
        )
        .expect("Could not register book.all");
    catalog
        .register(
            "book.by_id",
            QueryDescription::select(book())
                .filter(col("id").eq(param("id")))
                .one(),
        )
        .expect("Could not register book.by_id");
    catalog
        .register(
            "book.after",
            QueryDescription::select(book())
                .filter(col("year").gt(param("year")))
                .count(),
        )
        .expect("Could not register book.after");
    catalog
        .register(
            "book.newest",
            QueryDescription::select(book())
                .order_by([col("year").asc()])
                .last(),
        )
        .expect("Could not register book.newest");
    catalog
        .register(
            "late.all",
            QueryDescription::select(TableRef::new("primed_late")).filter(col("id").gt(param("id"))),
        )
        .expect("Could not register late.all");
    let session = PreparedSession::new(session, catalog.clone());

    // One of five statements targets a missing table
    let report = session
        .ready()
        .await
        .expect("Preparing on start is enabled by default");
    assert_eq!(report.prepared.len(), 4);
    assert_eq!(report.deferred.len(), 1);
    let (key, error) = &report.deferred[0];
    assert_eq!(key.name.as_ref(), "late.all");
    assert!(matches!(
        PrepareError::find(error),
        Some(PrepareError::SchemaNotReady { .. })
    ));
    assert!(!session.registry().is_prepared(key));

    // The deferred statement works once the table exists
    session
        .session()
        .batch_execute("CREATE TABLE primed_late (id INTEGER PRIMARY KEY)")
        .await
        .expect("Could not create the primed_late table");
    let rows = session
        .execute("late.all", &args! { "id" => 0 })
        .await
        .expect("The deferred statement is prepared on first use")
        .into_rows()
        .expect("A fetch all returns rows");
    assert!(rows.is_empty());
    assert!(session.registry().is_prepared(key));

    let newest = session
        .fetch_optional::<primed::Record>("book.newest", &args! {})
        .await
        .expect("Could not fetch the newest book")
        .expect("There are books");
    assert_eq!(
        newest.get("title"),
        Some(&Value::Varchar(Some("Hyperion".into())))
    );
    let count = session
        .count("book.after", &args! { "year" => 1980 })
        .await
        .expect("Could not count the books");
    assert_eq!(count, 2);

    // Invalid statements fail and are not retried
    catalog
        .register("book.broken", RawSql::new("SELEC title FROM primed_book"))
        .expect("Could not register book.broken");
    catalog
        .register(
            "book.mismatched",
            QueryDescription::select(book()).filter(col("title").eq(lit(5))),
        )
        .expect("Could not register book.mismatched");
    let report = session.prepare_eagerly().await;
    assert_eq!(report.deferred.len(), 2);
    for name in ["book.broken", "book.mismatched", "book.mismatched"] {
        let error = session
            .execute(name, &args! {})
            .await
            .expect_err("The statement is invalid");
        assert!(
            matches!(
                PrepareError::find(&error),
                Some(PrepareError::StatementInvalid { .. })
            ),
            "{name}: {error:#}"
        );
    }

    session.deallocate_all().await;
    session.into_session()
}
