//! Field classification shared by the documentation renderers.

use serde::Serialize;

use crate::schema::{ApiSchema, Endpoint, SchemaField, SchemaItem};

/// Description text that marks a read-only field as an include-on-demand collection
pub const COLLECTION_MARKER: &str = "To retrieve this collection, specify";

/// The five exclusive groups a field is documented under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldBucket {
    ReadOnly,
    Required,
    Optional,
    Collection,
    Deprecated,
}

impl FieldBucket {
    /// Render order of the sections
    pub const ORDER: [FieldBucket; 5] = [
        FieldBucket::ReadOnly,
        FieldBucket::Required,
        FieldBucket::Optional,
        FieldBucket::Collection,
        FieldBucket::Deprecated,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::ReadOnly => "Read-Only Fields",
            Self::Required => "Required Fields",
            Self::Optional => "Optional Fields",
            Self::Collection => "Included Collections",
            Self::Deprecated => "Deprecated Fields",
        }
    }

    pub fn intro(&self) -> Option<&'static str> {
        match self {
            Self::ReadOnly => {
                Some("These fields are assigned by the API server and cannot be changed.")
            }
            Self::Required | Self::Optional => None,
            Self::Collection => Some(
                "These fields are available when using Retrieve or Query API calls if you specify \
                 the associated `Include` parameter.",
            ),
            Self::Deprecated => Some(
                "Deprecated fields are maintained for backwards compatibility with previous \
                 versions of the API.  Deprecated fields may be removed in a future release of \
                 the API.",
            ),
        }
    }
}

/// Bucket of one field; earlier rules win
pub fn classify(field: &SchemaField) -> FieldBucket {
    if field.deprecated {
        FieldBucket::Deprecated
    } else if field.read_only && field.description.contains(COLLECTION_MARKER) {
        FieldBucket::Collection
    } else if field.read_only {
        FieldBucket::ReadOnly
    } else if !field.nullable {
        FieldBucket::Required
    } else {
        FieldBucket::Optional
    }
}

/// Fields grouped per bucket, in render order, omitting empty buckets.
/// Within a bucket fields keep their declared order.
pub fn partition(item: &SchemaItem) -> Vec<(FieldBucket, Vec<&SchemaField>)> {
    FieldBucket::ORDER
        .iter()
        .map(|bucket| {
            let fields: Vec<_> = item.fields.iter().filter(|f| classify(f) == *bucket).collect();
            (*bucket, fields)
        })
        .filter(|(_, fields)| !fields.is_empty())
        .collect()
}

/// Endpoints that return `item` once envelopes are unwrapped, each operation once
pub fn used_by<'a>(schema: &'a ApiSchema, item: &SchemaItem) -> Vec<&'a Endpoint> {
    let mut seen = std::collections::HashSet::new();
    schema
        .endpoints_returning(&item.name)
        .filter(|e| seen.insert(e.operation_id.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DataTypeRef, PrimitiveKind};

    fn field(name: &str) -> SchemaField {
        SchemaField::new(name, DataTypeRef::primitive(PrimitiveKind::String))
    }

    #[test]
    fn test_classification_is_exclusive_and_prioritized() {
        let cases = [
            (field("a").deprecated().read_only(), FieldBucket::Deprecated),
            (field("b").deprecated().nullable(), FieldBucket::Deprecated),
            (
                field("c")
                    .read_only()
                    .describe("Lines. To retrieve this collection, specify Lines."),
                FieldBucket::Collection,
            ),
            (field("d").read_only().nullable(), FieldBucket::ReadOnly),
            (field("e"), FieldBucket::Required),
            (field("f").nullable(), FieldBucket::Optional),
            (
                field("g").describe("To retrieve this collection, specify X"),
                FieldBucket::Required,
            ),
        ];
        for (f, expected) in cases {
            assert_eq!(classify(&f), expected, "field {}", f.name);
        }
    }

    #[test]
    fn test_partition_orders_sections() {
        let item = SchemaItem::new("Invoice")
            .field(field("memo").nullable())
            .field(field("old").deprecated())
            .field(field("amount"))
            .field(field("id").read_only());
        let buckets: Vec<_> = partition(&item).into_iter().map(|(b, _)| b).collect();
        assert_eq!(
            buckets,
            vec![
                FieldBucket::ReadOnly,
                FieldBucket::Required,
                FieldBucket::Optional,
                FieldBucket::Deprecated
            ]
        );
    }

    #[test]
    fn test_used_by_is_declared_order_without_duplicates() {
        let schema = ApiSchema {
            title: None,
            version: "1.0.0".into(),
            schemas: vec![SchemaItem::new("Invoice").field(field("id"))],
            endpoints: vec![
                Endpoint::new("b", "get", "/invoices").returning(DataTypeRef::named("Invoice")),
                Endpoint::new("a", "post", "/invoices").returning(DataTypeRef::named("Invoice")),
                Endpoint::new("b2", "get", "/invoices").returning(DataTypeRef::named("Invoice")),
                Endpoint::new("c", "delete", "/invoices/{id}"),
                Endpoint::new("a", "post", "/invoices").returning(DataTypeRef::named("Invoice")),
            ],
        };
        let item = SchemaItem::new("Invoice");
        let ids: Vec<_> = used_by(&schema, &item)
            .into_iter()
            .map(|e| e.operation_id.as_str())
            .collect();
        // Distinct operations sharing a route are both listed; a repeated id is not
        assert_eq!(ids, vec!["b", "a", "b2"]);
    }
}
