use super::*;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("spendy-storage-{}-{name}.json", std::process::id()))
}

#[test]
fn memory_storage_set_get_remove() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get("k"), None);
    storage.set("k", "v");
    assert_eq!(storage.get("k").as_deref(), Some("v"));
    storage.remove("k");
    assert_eq!(storage.get("k"), None);
}

#[test]
fn file_storage_persists_across_instances() {
    let path = temp_path("persist");
    let _ = std::fs::remove_file(&path);

    FileStorage::new(&path).set("authToken", "abc");
    FileStorage::new(&path).set("user", "{}");

    let reopened = FileStorage::new(&path);
    assert_eq!(reopened.get("authToken").as_deref(), Some("abc"));
    assert_eq!(reopened.get("user").as_deref(), Some("{}"));

    reopened.remove("authToken");
    assert_eq!(FileStorage::new(&path).get("authToken"), None);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn file_storage_missing_file_reads_empty() {
    let storage = FileStorage::new(temp_path("missing-never-written"));
    assert_eq!(storage.get("user"), None);
}

#[test]
fn file_storage_garbage_file_reads_empty() {
    let path = temp_path("garbage");
    std::fs::write(&path, "not json").unwrap();

    let storage = FileStorage::new(&path);
    assert_eq!(storage.get("user"), None);

    storage.set("user", "x");
    assert_eq!(storage.get("user").as_deref(), Some("x"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn file_storage_creates_parent_directories() {
    let dir = std::env::temp_dir().join(format!("spendy-storage-{}-nested", std::process::id()));
    let path = dir.join("inner").join("session.json");
    let _ = std::fs::remove_dir_all(&dir);

    FileStorage::new(&path).set("k", "v");

    assert!(path.exists());
    let _ = std::fs::remove_dir_all(&dir);
}
