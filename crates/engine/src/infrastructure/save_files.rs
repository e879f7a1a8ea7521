//! Save records as JSON files on disk.
//!
//! Layout: `<root>/players/<uuid>.json` and `<root>/actors/<uuid>.json`, each
//! holding one JSON object of key to blob.

use std::fs;
use std::path::{Path, PathBuf};

use minefriend_domain::{ActorId, PlayerId};
use serde_json::{Map, Value};

use crate::infrastructure::ports::{RepoError, SaveRecordPort};

pub struct JsonFileSaveRecords {
    root: PathBuf,
}

impl JsonFileSaveRecords {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn player_path(&self, player: PlayerId) -> PathBuf {
        self.root.join("players").join(format!("{player}.json"))
    }

    fn actor_path(&self, actor: ActorId) -> PathBuf {
        self.root.join("actors").join(format!("{actor}.json"))
    }
}

fn read_record(path: &Path, operation: &'static str) -> Result<Map<String, Value>, RepoError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(RepoError::storage(operation, e)),
    };
    match serde_json::from_str::<Value>(&text).map_err(RepoError::serialization)? {
        Value::Object(map) => Ok(map),
        _ => Err(RepoError::serialization(format!(
            "{} is not a JSON object",
            path.display()
        ))),
    }
}

fn write_record(
    path: &Path,
    record: &Map<String, Value>,
    operation: &'static str,
) -> Result<(), RepoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| RepoError::storage(operation, e))?;
    }
    let text = serde_json::to_string_pretty(record).map_err(RepoError::serialization)?;
    // Write-then-rename so a crash never leaves half a record.
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, text).map_err(|e| RepoError::storage(operation, e))?;
    fs::rename(&staging, path).map_err(|e| RepoError::storage(operation, e))
}

fn load_blob(path: &Path, key: &str, operation: &'static str) -> Result<Option<Value>, RepoError> {
    Ok(read_record(path, operation)?.remove(key))
}

fn store_blob(path: &Path, key: &str, blob: Value, operation: &'static str) -> Result<(), RepoError> {
    let mut record = read_record(path, operation)?;
    record.insert(key.to_string(), blob);
    write_record(path, &record, operation)
}

impl SaveRecordPort for JsonFileSaveRecords {
    fn load_player_blob(&self, player: PlayerId, key: &str) -> Result<Option<Value>, RepoError> {
        load_blob(&self.player_path(player), key, "load_player_blob")
    }

    fn store_player_blob(&self, player: PlayerId, key: &str, blob: Value) -> Result<(), RepoError> {
        store_blob(&self.player_path(player), key, blob, "store_player_blob")
    }

    fn load_actor_blob(&self, actor: ActorId, key: &str) -> Result<Option<Value>, RepoError> {
        load_blob(&self.actor_path(actor), key, "load_actor_blob")
    }

    fn store_actor_blob(&self, actor: ActorId, key: &str, blob: Value) -> Result<(), RepoError> {
        store_blob(&self.actor_path(actor), key, blob, "store_actor_blob")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_record_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = JsonFileSaveRecords::new(dir.path());
        let loaded = records
            .load_player_blob(PlayerId::new(), "MineFriend")
            .expect("load");
        assert_eq!(loaded, None);
    }

    #[test]
    fn keys_share_one_record_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = JsonFileSaveRecords::new(dir.path());
        let player = PlayerId::new();

        records
            .store_player_blob(player, "MineFriend", json!({"Phase": 2}))
            .expect("store");
        records
            .store_player_blob(player, "Other", json!("kept"))
            .expect("store");

        assert_eq!(
            records.load_player_blob(player, "MineFriend").expect("load"),
            Some(json!({"Phase": 2}))
        );
        assert_eq!(
            records.load_player_blob(player, "Other").expect("load"),
            Some(json!("kept"))
        );
        assert!(dir
            .path()
            .join("players")
            .join(format!("{player}.json"))
            .exists());
    }

    #[test]
    fn actor_records_are_separate() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = JsonFileSaveRecords::new(dir.path());
        let actor = ActorId::new();

        records
            .store_actor_blob(actor, "MineFriendCompanion", json!({"FriendName": "Ivy"}))
            .expect("store");
        let loaded = records
            .load_actor_blob(actor, "MineFriendCompanion")
            .expect("load");
        assert_eq!(loaded, Some(json!({"FriendName": "Ivy"})));
    }

    #[test]
    fn corrupt_record_is_a_serialization_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = JsonFileSaveRecords::new(dir.path());
        let player = PlayerId::new();
        let path = dir.path().join("players").join(format!("{player}.json"));
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, "[1, 2").expect("write");

        let err = records
            .load_player_blob(player, "MineFriend")
            .expect_err("corrupt");
        assert!(matches!(err, RepoError::Serialization(_)));
    }
}
