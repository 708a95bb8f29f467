use super::*;

#[test]
fn dir_store_reads_tile_by_id() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("7.png"), b"tile-seven").unwrap();

    let store = DirTileStore::new(dir.path());
    assert_eq!(store.root(), dir.path());
    assert_eq!(store.tile_path(7), dir.path().join("7.png"));
    assert_eq!(store.read(7).unwrap(), b"tile-seven");
}

#[test]
fn dir_store_missing_tile() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirTileStore::new(dir.path());
    assert!(matches!(
        store.read(3),
        Err(PimgError::MissingTile { layer_id: 3 })
    ));
}

#[test]
fn memory_store_round_trip_and_missing() {
    let store = MemoryTileStore::new().with(1, vec![1, 2, 3]);
    assert_eq!(store.read(1).unwrap(), vec![1, 2, 3]);
    assert!(matches!(
        store.read(2),
        Err(PimgError::MissingTile { layer_id: 2 })
    ));
}
