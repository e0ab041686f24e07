use primed::{Catalog, PreparedSession, QueryDescription, Session, TableRef, args, col, param};
use std::sync::Arc;

const SETUP: &str = r#"
DROP TABLE IF EXISTS primed_counter;
CREATE TABLE primed_counter (
    name TEXT PRIMARY KEY,
    value BIGINT NOT NULL
);
INSERT INTO primed_counter VALUES ('alpha', 1), ('beta', 2), ('gamma', 3);
"#;

pub async fn session_loss<S: Session>(session: S) -> S {
    session
        .batch_execute(SETUP)
        .await
        .expect("Could not create the primed_counter table");
    let catalog = Arc::new(Catalog::new(session.driver()));
    catalog
        .register(
            "counter.value",
            QueryDescription::select(TableRef::new("primed_counter"))
                .columns(["value"])
                .filter(col("name").eq(param("name")))
                .one(),
        )
        .expect("Could not register counter.value");
    let session = PreparedSession::new(session, catalog.clone());
    let value = |row: primed::RowLabeled| row.get::<i64>("value");

    let row = session
        .fetch_one("counter.value", &args! { "name" => "alpha" })
        .await
        .expect("Could not read alpha");
    assert_eq!(value(row).expect("alpha has a value"), 1);

    // The statements vanish underneath, as a pooling layer resetting the connection does
    session
        .session()
        .batch_execute("DEALLOCATE ALL")
        .await
        .expect("Could not deallocate the statements");
    let row = session
        .fetch_one("counter.value", &args! { "name" => "beta" })
        .await
        .expect("The statement is prepared again transparently");
    assert_eq!(value(row).expect("beta has a value"), 2);

    // Explicit deallocation forgets the statement, the next execution prepares it again
    session.deallocate_all().await;
    let row = session
        .fetch_one("counter.value", &args! { "name" => "gamma" })
        .await
        .expect("Could not read gamma");
    assert_eq!(value(row).expect("gamma has a value"), 3);
    assert_eq!(session.registry().prepared_keys().len(), 1);

    session.deallocate_all().await;
    session.into_session()
}
