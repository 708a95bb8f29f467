use super::*;

#[test]
fn beside_names_the_three_artifacts() {
    let paths = DecompiledPaths::beside(Path::new("work"), "ev01");
    assert_eq!(paths.manifest, Path::new("work/ev01.json"));
    assert_eq!(paths.resx, Path::new("work/ev01.resx.json"));
    assert_eq!(paths.tiles, Path::new("work/ev01"));
}

#[test]
fn from_manifest_uses_sibling_paths() {
    let paths = DecompiledPaths::from_manifest(Path::new("a/b/ev01.json")).unwrap();
    assert_eq!(paths, DecompiledPaths::beside(Path::new("a/b"), "ev01"));

    let bare = DecompiledPaths::from_manifest(Path::new("ev01.json")).unwrap();
    assert_eq!(bare.tiles, Path::new("./ev01"));
}

#[test]
fn from_manifest_rejects_resx_file() {
    let err = DecompiledPaths::from_manifest(Path::new("ev01.resx.json")).unwrap_err();
    assert!(matches!(err, PimgError::Validation(_)));
}

#[test]
fn missing_executable_is_a_decompile_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ev01.pimg");
    std::fs::write(&input, b"PSB").unwrap();

    let decompiler = PsbDecompiler::new(dir.path().join("no-such-tool.exe"));
    assert!(!decompiler.is_available());
    let err = decompiler.run(&input).unwrap_err();
    assert!(matches!(err, PimgError::Decompile(_)));
    assert!(err.to_string().starts_with("decompile error:"));
}

#[test]
fn missing_input_is_a_decompile_error() {
    let dir = tempfile::tempdir().unwrap();
    let exe = dir.path().join("tool");
    std::fs::write(&exe, b"").unwrap();

    let err = PsbDecompiler::new(&exe)
        .run(&dir.path().join("absent.pimg"))
        .unwrap_err();
    assert!(matches!(err, PimgError::Decompile(_)));
}

#[test]
fn default_points_at_bundled_location() {
    assert_eq!(PsbDecompiler::default().exe(), Path::new(DEFAULT_DECOMPILER));
}

// `/bin/sh` stands in for the decompiler; the input file is the script it runs.
#[cfg(unix)]
#[test]
fn run_collects_outputs_written_by_the_tool() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ev01.pimg");
    std::fs::write(
        &input,
        "base=\"${0%.*}\"\nmkdir -p \"$base\"\necho '{}' > \"$base.json\"\necho '{}' > \"$base.resx.json\"\necho done\n",
    )
    .unwrap();

    let paths = PsbDecompiler::new("/bin/sh").run(&input).unwrap();
    assert_eq!(paths, DecompiledPaths::beside(dir.path(), "ev01"));
    assert!(paths.tiles.is_dir());
    assert!(paths.manifest.is_file());
    assert!(paths.resx.is_file());
}

#[cfg(unix)]
#[test]
fn run_fails_when_the_tool_produces_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ev02.pimg");
    std::fs::write(&input, "echo broken >&2\nexit 3\n").unwrap();

    let err = PsbDecompiler::new("/bin/sh").run(&input).unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, PimgError::Decompile(_)));
    assert!(msg.contains("ev02.json"), "{msg}");
    assert!(msg.contains("broken"), "{msg}");
}
