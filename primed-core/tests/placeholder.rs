#[cfg(test)]
mod tests {
    use primed_core::{
        Arguments, Cardinality, CardinalitySignature, MarkerName, MarkerSet, PrepareConfig,
        PrepareError, QueryDescription, SlotSource, TableRef, Value, args, bind_slots, col, param,
        param_list,
    };
    use std::sync::Arc;

    fn named(name: &str) -> MarkerName {
        MarkerName::Named(Arc::from(name))
    }

    fn query() -> QueryDescription {
        QueryDescription::select(TableRef::new("trade"))
            .filter(col("venue").eq(param("venue")))
            .filter(col("id").in_list(param_list("ids")))
            .filter(col("quantity").gt(param("min_quantity")))
    }

    #[test]
    fn slots_are_sorted_by_name() {
        let markers = query().markers().expect("Valid markers");
        assert_eq!(markers.len(), 3);
        let slots = markers
            .resolve(&CardinalitySignature(vec![Cardinality::Expanded(2)]))
            .expect("Could not resolve the slots");
        assert_eq!(
            slots
                .iter()
                .map(|s| (s.position, s.marker.clone(), s.source))
                .collect::<Vec<_>>(),
            [
                (1, named("ids"), SlotSource::ListItem(0)),
                (2, named("ids"), SlotSource::ListItem(1)),
                (3, named("min_quantity"), SlotSource::Scalar),
                (4, named("venue"), SlotSource::Scalar),
            ]
        );
    }

    #[test]
    fn reordered_clauses_resolve_identically() {
        let reordered = QueryDescription::select(TableRef::new("trade"))
            .filter(col("quantity").gt(param("min_quantity")))
            .filter(col("venue").eq(param("venue")))
            .filter(col("id").in_list(param_list("ids")));
        let signature = CardinalitySignature(vec![Cardinality::Expanded(4)]);
        let a = query().markers().unwrap().resolve(&signature).unwrap();
        let b = reordered.markers().unwrap().resolve(&signature).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2 + 4);
    }

    #[test]
    fn duplicate_placeholder() {
        let query = QueryDescription::select(TableRef::new("trade"))
            .filter(col("low").lt(param("price")))
            .filter(col("high").gt(param("price")));
        let error = query.markers().expect_err("The name price is used twice");
        assert!(matches!(
            PrepareError::find(&error),
            Some(PrepareError::DuplicatePlaceholder(name)) if name == "price"
        ));
        let query = QueryDescription::select(TableRef::new("trade"))
            .filter(col("id").eq(param("id")))
            .filter(col("id").in_list(param_list("id")));
        assert!(matches!(
            PrepareError::find(&query.markers().unwrap_err()),
            Some(PrepareError::DuplicatePlaceholder(..))
        ));
    }

    #[test]
    fn invalid_placeholder_names() {
        for name in ["", "price%", "a b", "x;DROP"] {
            let query =
                QueryDescription::select(TableRef::new("trade")).filter(col("a").eq(param(name)));
            assert!(
                matches!(
                    PrepareError::find(&query.markers().unwrap_err()),
                    Some(PrepareError::InvalidPlaceholder(..))
                ),
                "`{name}` should be rejected"
            );
        }
        let query = QueryDescription::select(TableRef::new("trade"))
            .filter(col("a").eq(param("trade-id_2")));
        assert!(query.markers().is_ok());
    }

    #[test]
    fn signature_follows_list_lengths() {
        let markers = query().markers().unwrap();
        let config = PrepareConfig::default();
        let signature = |ids: Vec<i32>| {
            markers
                .signature(
                    &args! { "ids" => ids, "venue" => "NYSE", "min_quantity" => 1 },
                    &config,
                )
                .unwrap()
        };
        assert_eq!(
            signature(vec![1, 2, 3]),
            CardinalitySignature(vec![Cardinality::Expanded(3)])
        );
        assert_eq!(
            signature(vec![]),
            CardinalitySignature(vec![Cardinality::Expanded(0)])
        );
        assert_eq!(
            signature((0..32).collect()),
            CardinalitySignature(vec![Cardinality::Expanded(32)])
        );
        assert_eq!(
            signature((0..33).collect()),
            CardinalitySignature(vec![Cardinality::Array])
        );
        assert_ne!(signature(vec![1, 2, 3]), signature(vec![1, 2, 3, 4, 5]));
        assert_eq!(signature(vec![1, 2, 3]).to_string(), "[3]");
        assert_eq!(signature((0..40).collect()).to_string(), "[*]");
    }

    #[test]
    fn signature_errors() {
        let markers = query().markers().unwrap();
        let config = PrepareConfig::default();
        let error = markers
            .signature(&args! { "venue" => "NYSE" }, &config)
            .expect_err("The ids are missing");
        assert!(matches!(
            PrepareError::find(&error),
            Some(PrepareError::UnresolvedPlaceholder(name)) if name == "ids"
        ));
        let error = markers
            .signature(&args! { "ids" => 5 }, &config)
            .expect_err("The ids must be a list");
        assert!(matches!(
            PrepareError::find(&error),
            Some(PrepareError::MismatchedArgument { name, .. }) if name == "ids"
        ));
    }

    #[test]
    fn bind_in_slot_order() {
        let markers = query().markers().unwrap();
        let arguments = args! {
            "venue" => "NYSE",
            "ids" => vec![10i64, 20],
            "min_quantity" => 5,
        };
        let signature = markers
            .signature(&arguments, &PrepareConfig::default())
            .unwrap();
        let slots = markers.resolve(&signature).unwrap();
        let values = bind_slots(&slots, &arguments).unwrap();
        assert_eq!(
            values,
            [
                Value::Int64(Some(10)),
                Value::Int64(Some(20)),
                Value::Int32(Some(5)),
                Value::Varchar(Some("NYSE".into())),
            ]
        );
        let error = bind_slots(&slots, &args! { "ids" => vec![1i64, 2], "venue" => "NYSE" })
            .expect_err("min_quantity is missing");
        assert!(matches!(
            PrepareError::find(&error),
            Some(PrepareError::UnresolvedPlaceholder(name)) if name == "min_quantity"
        ));
    }

    #[test]
    fn array_slot_binds_whole_list() {
        let markers = MarkerSet::from_expressions([&col("id").in_list(param_list("ids"))]).unwrap();
        let slots = markers
            .resolve(&CardinalitySignature(vec![Cardinality::Array]))
            .unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].source, SlotSource::ListArray);
        let values = bind_slots(&slots, &args! { "ids" => vec![1, 2, 3] }).unwrap();
        assert_eq!(values, [Value::from(vec![1, 2, 3])]);
    }

    #[test]
    fn positional_arguments() {
        let arguments = Arguments::positional([1, 2]).with("name", "x");
        assert_eq!(
            arguments.get(&MarkerName::Positional(1)),
            Some(&Value::Int32(Some(2)))
        );
        assert_eq!(
            arguments.get(&named("name")),
            Some(&Value::Varchar(Some("x".into())))
        );
        assert_eq!(arguments.get(&MarkerName::Positional(2)), None);
        assert!(!arguments.is_empty());
        assert!(args! {}.is_empty());
    }
}
