#[cfg(test)]
mod tests {
    use primed::{
        Arguments, Cardinality, CardinalitySignature, Catalog, Context, Driver, PrepareConfig,
        PrepareError, QueryDescription, RawSql, SqlWriter, StatementKey, TableRef, args, col,
        param, param_list,
    };
    use std::sync::Arc;

    /// Writes bare identifiers.
    #[derive(Default)]
    struct PlainWriter;
    impl SqlWriter for PlainWriter {
        fn as_dyn(&self) -> &dyn SqlWriter {
            self
        }
        fn write_identifier_quoted(&self, _context: &mut Context, out: &mut String, value: &str) {
            out.push_str(value);
        }
    }

    struct PlainDriver;
    impl Driver for PlainDriver {
        type SqlWriter = PlainWriter;
        const NAME: &'static str = "plain";
        fn sql_writer(&self) -> PlainWriter {
            PlainWriter
        }
    }

    fn catalog() -> Catalog<PlainDriver> {
        let catalog = Catalog::new(&PlainDriver);
        catalog
            .register(
                "book.by_author",
                QueryDescription::select(TableRef::new("book"))
                    .columns(["title", "year"])
                    .filter(col("author").eq(param("author")))
                    .order_by([col("year").desc()]),
            )
            .unwrap();
        catalog
            .register(
                "book.by_ids",
                QueryDescription::select(TableRef::new("book").with_primary_key(["id"]))
                    .filter(col("id").in_list(param_list("ids")))
                    .first(),
            )
            .unwrap();
        catalog
            .register("book.recent", RawSql::new("SELECT * FROM book WHERE year > %s"))
            .unwrap();
        catalog
    }

    #[test]
    fn driver_writer() {
        let catalog = catalog();
        let config = PrepareConfig::default();
        let compiled = catalog
            .resolve("book.by_author", &args! { "author" => "Le Guin" }, &config)
            .unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT title, year\nFROM book\nWHERE author = $1\nORDER BY year DESC"
        );
        let compiled = catalog
            .resolve("book.by_ids", &args! { "ids" => vec![9, 8] }, &config)
            .unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT *\nFROM book\nWHERE id IN ($1, $2)\nORDER BY id ASC\nLIMIT 1"
        );
        assert_eq!(compiled.bind(&args! { "ids" => vec![9, 8] }).unwrap().len(), 2);
    }

    #[test]
    fn compiled_once() {
        let catalog = catalog();
        let config = PrepareConfig::default();
        let a = catalog
            .resolve("book.by_ids", &args! { "ids" => vec![1, 2] }, &config)
            .unwrap();
        let b = catalog
            .resolve("book.by_ids", &args! { "ids" => vec![3, 4] }, &config)
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let c = catalog
            .resolve("book.by_ids", &args! { "ids" => vec![3] }, &config)
            .unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(catalog.compiled_count(), 2);
    }

    #[test]
    fn registration() {
        let catalog = catalog();
        assert_eq!(
            catalog
                .names()
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>(),
            ["book.by_author", "book.by_ids", "book.recent"]
        );
        assert_eq!(catalog.definition("book.by_ids").unwrap().markers.len(), 1);
        let error = catalog
            .register("book.broken", RawSql::new("SELECT %s, %(name)s"))
            .expect_err("Mixed markers");
        assert!(matches!(
            PrepareError::find(&error),
            Some(PrepareError::MixedPlaceholders(..))
        ));
        assert!(catalog.definition("book.broken").is_err());
    }

    #[test]
    fn startup_keys() {
        let catalog = catalog();
        assert_eq!(
            catalog.startup_keys(),
            [
                StatementKey::new("book.by_author", CardinalitySignature::default()),
                StatementKey::new("book.recent", CardinalitySignature::default()),
            ]
        );
        catalog
            .resolve(
                "book.by_ids",
                &args! { "ids" => vec![1, 2, 3] },
                &PrepareConfig::default(),
            )
            .unwrap();
        let keys = catalog.startup_keys();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&StatementKey::new(
            "book.by_ids",
            CardinalitySignature(vec![Cardinality::Expanded(3)])
        )));
    }

    #[test]
    fn limit_from_config() {
        let catalog = catalog();
        let config = PrepareConfig {
            list_expansion_limit: 2,
            ..Default::default()
        };
        let key = catalog
            .key("book.by_ids", &args! { "ids" => vec![1, 2, 3] }, &config)
            .unwrap();
        assert_eq!(key.signature, CardinalitySignature(vec![Cardinality::Array]));
        let compiled = catalog.compiled(&key).unwrap();
        assert!(compiled.sql.contains("id = ANY($1)"));
        let key = catalog
            .key("book.recent", &Arguments::positional([2000]), &config)
            .unwrap();
        assert!(key.signature.is_empty());
    }
}
