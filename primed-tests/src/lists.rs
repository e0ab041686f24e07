use primed::{
    Cardinality, CardinalitySignature, Catalog, PreparedSession, QueryDescription, Record,
    Session, TableRef, Value, args, col, param, param_list,
};
use std::sync::Arc;

const SETUP: &str = r#"
DROP TABLE IF EXISTS primed_item;
CREATE TABLE primed_item (
    id INTEGER PRIMARY KEY,
    tag TEXT NOT NULL
);
INSERT INTO primed_item SELECT i, 'tag' || (i % 3) FROM generate_series(1, 40) AS i;
"#;

fn ids(values: impl IntoIterator<Item = i32>) -> Vec<i32> {
    values.into_iter().collect()
}

pub async fn lists<S: Session>(session: S) -> S {
    session
        .batch_execute(SETUP)
        .await
        .expect("Could not create the primed_item table");
    let catalog = Arc::new(Catalog::new(session.driver()));
    catalog
        .register(
            "item.by_ids",
            QueryDescription::select(TableRef::new("primed_item"))
                .filter(col("id").in_list(param_list("ids")))
                .order_by([col("id").asc()]),
        )
        .expect("Could not register item.by_ids");
    catalog
        .register(
            "item.count_excluding",
            QueryDescription::select(TableRef::new("primed_item"))
                .filter(
                    col("id")
                        .not_in_list(param_list("ids"))
                        .and(col("tag").ne(param("tag"))),
                )
                .count(),
        )
        .expect("Could not register item.count_excluding");
    let session = PreparedSession::new(session, catalog.clone());
    let limit = session.config().list_expansion_limit as usize;

    // Three and five elements are two distinct variants
    let three = session
        .fetch_all::<Record>("item.by_ids", &args! { "ids" => ids([7, 3, 5]) })
        .await
        .expect("Could not fetch three items");
    assert_eq!(
        three.iter().map(|r| r.get("id").cloned()).collect::<Vec<_>>(),
        [3, 5, 7].map(|v| Some(Value::Int32(Some(v))))
    );
    let five = session
        .fetch_all::<Record>("item.by_ids", &args! { "ids" => ids([1, 2, 3, 4, 5]) })
        .await
        .expect("Could not fetch five items");
    assert_eq!(five.len(), 5);
    let key_three = catalog
        .key("item.by_ids", &args! { "ids" => ids([1, 2, 3]) }, session.config())
        .expect("Could not compute the key of three items");
    let key_five = catalog
        .key(
            "item.by_ids",
            &args! { "ids" => ids([1, 2, 3, 4, 5]) },
            session.config(),
        )
        .expect("Could not compute the key of five items");
    assert_ne!(key_three, key_five);
    assert_eq!(
        key_three.signature,
        CardinalitySignature(vec![Cardinality::Expanded(3)])
    );
    assert!(session.registry().is_prepared(&key_three));
    assert!(session.registry().is_prepared(&key_five));
    let name_three = catalog
        .compiled(&key_three)
        .expect("Could not compile three items")
        .prepared_name
        .clone();
    let name_five = catalog
        .compiled(&key_five)
        .expect("Could not compile five items")
        .prepared_name
        .clone();
    assert_ne!(name_three, name_five);

    // Empty list
    let empty = session
        .fetch_all::<Record>("item.by_ids", &args! { "ids" => Vec::<i32>::new() })
        .await
        .expect("Could not fetch no items");
    assert!(empty.is_empty());
    let count = session
        .count(
            "item.count_excluding",
            &args! { "ids" => Vec::<i32>::new(), "tag" => "none" },
        )
        .await
        .expect("Could not count excluding nothing");
    assert_eq!(count, 40);
    let count = session
        .count(
            "item.count_excluding",
            &args! { "ids" => ids(1..=10), "tag" => "none" },
        )
        .await
        .expect("Could not count excluding ten items");
    assert_eq!(count, 30);

    // Longer lists share one array variant
    let long = session
        .fetch_all::<Record>("item.by_ids", &args! { "ids" => ids(1..=(limit as i32 + 3)) })
        .await
        .expect("Could not fetch the long list");
    assert_eq!(long.len(), (limit + 3).min(40));
    let longer = session
        .fetch_all::<Record>("item.by_ids", &args! { "ids" => ids(1..=(limit as i32 + 5)) })
        .await
        .expect("Could not fetch the longer list");
    assert_eq!(longer.len(), (limit + 5).min(40));
    let key_long = catalog
        .key(
            "item.by_ids",
            &args! { "ids" => ids(1..=(limit as i32 + 1)) },
            session.config(),
        )
        .expect("Could not compute the key of the long list");
    assert_eq!(
        key_long.signature,
        CardinalitySignature(vec![Cardinality::Array])
    );
    assert!(session.registry().is_prepared(&key_long));
    let count = session
        .count(
            "item.count_excluding",
            &args! { "ids" => ids(1..=(limit as i32 + 1)), "tag" => "none" },
        )
        .await
        .expect("Could not count excluding the long list");
    assert_eq!(count, 40 - (limit as i64 + 1).min(40));

    session.deallocate_all().await;
    session.into_session()
}
