use super::*;

const MANIFEST: &str = r#"
{
  "width": 640,
  "height": 480,
  "layers": [
    { "layer_id": 10, "layer_type": 0, "name": "AA", "type": 0,
      "width": 640, "height": 480, "left": 0, "top": 0, "opacity": 255, "visible": 1 },
    { "layer_id": 11, "layer_type": 0, "diff_id": 10, "name": "AB", "type": 0,
      "width": 32, "height": 16, "left": -4, "top": 100, "opacity": 128, "visible": 0 }
  ]
}
"#;

#[test]
fn parses_decompiler_manifest() {
    let m = Manifest::from_json_str(MANIFEST).unwrap();
    assert_eq!((m.width, m.height), (640, 480));
    assert_eq!(m.layers.len(), 2);

    let base = &m.layers[0];
    assert_eq!(base.id, 10);
    assert_eq!(base.diff_id, None);
    assert!(base.fills(640, 480));

    let diff = m.layer(11).unwrap();
    assert_eq!(diff.diff_id, Some(10));
    assert_eq!((diff.left, diff.top), (-4, 100));
    assert_eq!((diff.opacity, diff.visible), (128, 0));
    assert!(!diff.fills(640, 480));
}

#[test]
fn accepts_camel_case_ids_and_missing_optionals() {
    let m = Manifest::from_json_str(
        r#"{ "width": 2, "height": 2, "layers": [
            { "layerId": 1, "diffId": 3, "name": "ab", "width": 1, "height": 1, "left": 0, "top": 0 }
        ] }"#,
    )
    .unwrap();
    let l = &m.layers[0];
    assert_eq!(l.id, 1);
    assert_eq!(l.diff_id, Some(3));
    assert_eq!(l.layer_type, None);
    assert_eq!(l.kind, None);
    assert_eq!((l.opacity, l.visible), (255, 1));
}

#[test]
fn malformed_manifest_is_a_serde_error() {
    let err = Manifest::from_json_str(r#"{ "width": 2 }"#).unwrap_err();
    assert!(matches!(err, PimgError::Serde(_)));
}

#[test]
fn resx_metadata_container_check() {
    let ok = ResxMetadata::from_json_str(r#"{ "PsbType": "Pimg", "Platform": "none" }"#).unwrap();
    ok.ensure_pimg().unwrap();

    let wrong = ResxMetadata::from_json_str(r#"{ "PsbType": "Motion" }"#).unwrap();
    assert!(matches!(
        wrong.ensure_pimg(),
        Err(PimgError::InvalidContainer(msg)) if msg.contains("Motion")
    ));

    let missing = ResxMetadata::from_json_str("{}").unwrap();
    assert!(matches!(
        missing.ensure_pimg(),
        Err(PimgError::InvalidContainer(_))
    ));
}
