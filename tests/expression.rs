#[cfg(test)]
mod tests {
    use primed::{
        Context, Expression, Fragment, Operand, ParameterSlot, SlotSource, SqlWriter, MarkerName,
        col, lit, param, param_list,
    };
    use std::sync::Arc;

    struct Writer;
    impl SqlWriter for Writer {
        fn as_dyn(&self) -> &dyn SqlWriter {
            self
        }
    }

    const WRITER: Writer = Writer {};

    fn slot(position: u32, name: &str, source: SlotSource) -> ParameterSlot {
        ParameterSlot {
            position,
            marker: MarkerName::Named(Arc::from(name)),
            source,
        }
    }

    fn render(expression: &Expression, slots: &[ParameterSlot]) -> String {
        let mut out = String::new();
        let mut context = Context::new(Fragment::SqlSelectWhere, slots);
        expression.write_query(&WRITER, &mut context, &mut out);
        out
    }

    #[test]
    fn literals() {
        assert_eq!(render(&lit(1), &[]), "1");
        assert_eq!(render(&Operand::Null.into(), &[]), "NULL");
        assert_eq!(render(&Expression::from(1).add(2).mul(3), &[]), "(1 + 2) * 3");
        assert_eq!(render(&Expression::from(1).add(Expression::from(2).mul(3)), &[]), "1 + 2 * 3");
        assert_eq!(render(&Expression::from(5).sub(Expression::from(2).sub(1)), &[]), "5 - (2 - 1)");
        assert_eq!(render(&col("a").neg().lt(lit(-1.5)), &[]), "-\"a\" < -1.5");
        assert_eq!(render(&Expression::from(true).and(false).not(), &[]), "NOT (true AND false)");
    }

    #[test]
    fn columns() {
        assert_eq!(render(&col("price"), &[]), "\"price\"");
        assert_eq!(
            render(&primed::ColumnRef::of("trade", "price").into(), &[]),
            "\"trade\".\"price\""
        );
        assert_eq!(render(&col("we\"ird"), &[]), "\"we\"\"ird\"");
    }

    #[test]
    fn placeholders() {
        let slots = [
            slot(1, "ids", SlotSource::ListItem(0)),
            slot(2, "ids", SlotSource::ListItem(1)),
            slot(3, "venue", SlotSource::Scalar),
        ];
        let expression = col("venue")
            .eq(param("venue"))
            .or(col("id").in_list(param_list("ids")));
        assert_eq!(
            render(&expression, &slots),
            "\"venue\" = $3 OR \"id\" IN ($1, $2)"
        );
        let expression = col("id").not_in_list(param_list("ids"));
        assert_eq!(render(&expression, &slots), "\"id\" NOT IN ($1, $2)");
        assert_eq!(
            render(&expression, &[slot(1, "ids", SlotSource::ListArray)]),
            "\"id\" <> ALL($1)"
        );
        assert_eq!(render(&expression, &[]), "\"id\" <> ALL('{}')");
        assert_eq!(
            render(&col("id").in_list(lit(Vec::<i32>::new())), &[]),
            "\"id\" = ANY('{}')"
        );
        assert_eq!(
            render(&col("id").in_list(lit(vec![3, 4])), &[]),
            "\"id\" IN (3, 4)"
        );
    }

    #[test]
    fn counter() {
        let slots = [
            slot(1, "a", SlotSource::Scalar),
            slot(2, "b", SlotSource::Scalar),
        ];
        let mut out = String::new();
        let mut context = Context::new(Fragment::SqlSelectWhere, &slots);
        col("x")
            .eq(param("b"))
            .and(col("y").eq(param("a")))
            .write_query(&WRITER, &mut context, &mut out);
        assert_eq!(out, "\"x\" = $2 AND \"y\" = $1");
        assert_eq!(context.counter, 2);
    }
}
