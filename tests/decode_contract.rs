use partinfo_core::{DecodeError, PartitionInfo, ResponseMapper};

fn decode(body: &str) -> Result<PartitionInfo, DecodeError> {
    ResponseMapper::decode(body.as_bytes())
}

#[test]
fn sized_partition_renders_diagnostic_line() {
    let info = decode(
        r#"{"doc_count":42,"doc_del_count":1,"partition":"p1","sizes":{"active":100,"external":200}}"#,
    )
    .expect("valid body");
    assert_eq!(
        info.to_string(),
        "PartitionInfo [docCount=42, docDelCount=1, partition=p1, sizes=Sizes [external=200, active=100]]"
    );
}

#[test]
fn unsized_partition_renders_placeholder() {
    let info = decode(r#"{"doc_count":5,"doc_del_count":0,"partition":"p2"}"#).expect("valid body");
    assert_eq!(info.sizes(), None);
    assert_eq!(
        info.to_string(),
        "PartitionInfo [docCount=5, docDelCount=0, partition=p2, sizes=Sizes [external=unavailable, active=unavailable]]"
    );
}

#[test]
fn rejected_bodies_never_yield_values() {
    assert_eq!(
        decode(r#"{"doc_count":-3,"partition":"p"}"#),
        Err(DecodeError::InvalidField("doc_count".into()))
    );
    assert!(matches!(
        decode(r#"{"doc_count":42,"sizes":{"act"#),
        Err(DecodeError::Malformed(_))
    ));
}

#[test]
fn index_breakdown_is_reachable_through_accessors() {
    let info = decode(
        r#"{"partition":"p","partitioned_indexes":{"count":5,"limit":10,"indexes":{"search":2,"view":3}},"extra":true}"#,
    )
    .expect("valid body");
    let indexes = info.partitioned_indexes().expect("indexes present");
    let breakdown = indexes.indexes().expect("breakdown present");
    assert_eq!((indexes.count(), indexes.limit()), (5, 10));
    assert_eq!((breakdown.search(), breakdown.view()), (2, 3));
}
