/// Arrow schema and batch conversion for case summaries.
pub mod cases {
    use std::sync::Arc;

    use arrow::array::{
        ArrayRef, BooleanArray, Date32Array, Decimal128Array, StringArray, UInt32Array,
    };
    use arrow::datatypes::{DataType, Date32Type, Field, Schema};
    use arrow::error::ArrowError;
    use arrow::record_batch::RecordBatch;

    use crate::case::{Case, token};

    /// Decimal precision/scale for amounts: whole cents.
    pub const AMOUNT_PRECISION: u8 = 12;
    pub const AMOUNT_SCALE: i8 = 2;

    /// Schema for one row per case, as shown in case lists.
    pub fn case_summary_schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("status", DataType::Utf8, false),
            Field::new("lane", DataType::Utf8, false),
            Field::new("carrier", DataType::Utf8, false),
            Field::new(
                "amount",
                DataType::Decimal128(AMOUNT_PRECISION, AMOUNT_SCALE),
                false,
            ),
            Field::new("deadline", DataType::Date32, false),
            Field::new("confidence", DataType::Utf8, false),
            Field::new("customer", DataType::Utf8, false),
            Field::new("evidence", DataType::UInt32, false),
            Field::new("held", DataType::Boolean, false),
        ])
    }

    /// Build a single RecordBatch from a slice of cases, in slice order.
    pub fn to_record_batch(cases: &[Case]) -> Result<RecordBatch, ArrowError> {
        let ids: StringArray = cases.iter().map(|c| Some(c.id.as_str())).collect();
        let statuses: StringArray = cases.iter().map(|c| Some(token(&c.status))).collect();
        let lanes: StringArray = cases.iter().map(|c| Some(token(&c.lane))).collect();
        let carriers: StringArray = cases.iter().map(|c| Some(c.carrier.label())).collect();
        let amounts = Decimal128Array::from_iter_values(
            cases.iter().map(|c| c.amount.cents() as i128),
        )
        .with_precision_and_scale(AMOUNT_PRECISION, AMOUNT_SCALE)?;
        let deadlines = Date32Array::from_iter_values(
            cases
                .iter()
                .map(|c| Date32Type::from_naive_date(c.deadline)),
        );
        let confidence: StringArray = cases
            .iter()
            .map(|c| Some(token(&c.confidence_label)))
            .collect();
        let customers: StringArray = cases
            .iter()
            .map(|c| Some(c.shopify_order.customer_name.as_str()))
            .collect();
        let evidence =
            UInt32Array::from_iter_values(cases.iter().map(|c| c.evidence.len() as u32));
        let held: BooleanArray = cases.iter().map(|c| Some(c.held)).collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(ids),
            Arc::new(statuses),
            Arc::new(lanes),
            Arc::new(carriers),
            Arc::new(amounts),
            Arc::new(deadlines),
            Arc::new(confidence),
            Arc::new(customers),
            Arc::new(evidence),
            Arc::new(held),
        ];
        RecordBatch::try_new(Arc::new(case_summary_schema()), columns)
    }
}
