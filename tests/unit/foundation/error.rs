use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PimgError::invalid_container("x")
            .to_string()
            .contains("invalid container:")
    );
    assert!(
        PimgError::decompile("x")
            .to_string()
            .contains("decompile error:")
    );
    assert!(
        PimgError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PimgError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn structured_variants_name_the_layer() {
    let err = PimgError::DuplicateBase {
        group: 'a',
        existing: "aa".to_string(),
        candidate: "ab".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("group 'a'"));
    assert!(msg.contains("'aa'"));
    assert!(msg.contains("'ab'"));

    let err = PimgError::DanglingDiffReference {
        layer: "bc".to_string(),
        diff_id: 42,
    };
    assert!(err.to_string().contains("42"));

    let err = PimgError::decode_failure(7, "bad png");
    assert!(err.to_string().contains("layer 7"));
    assert!(err.to_string().contains("bad png"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PimgError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
