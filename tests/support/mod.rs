use std::fs;
use std::path::{Path, PathBuf};

use plsync::cache::CacheStore;
use plsync::snapshot::Snapshot;
use tempfile::TempDir;

pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn cache_path(&self) -> PathBuf {
        self.dir.path().join(".claude").join("plane-sync.json")
    }

    pub fn store(&self) -> CacheStore {
        CacheStore::with_defaults(self.cache_path())
    }

    pub fn tasks_dir(&self) -> PathBuf {
        self.dir.path().join("sessions").join("tasks")
    }

    pub fn write_task(&self, name: &str, frontmatter: &[(&str, &str)], body: &str) -> PathBuf {
        let mut content = String::from("---\n");
        for (key, value) in frontmatter {
            content.push_str(&format!("{key}: {value}\n"));
        }
        content.push_str("---\n\n");
        content.push_str(body);
        self.write_task_raw(name, &content)
    }

    pub fn write_task_raw(&self, name: &str, content: &str) -> PathBuf {
        let dir = self.tasks_dir();
        fs::create_dir_all(&dir).expect("create tasks dir");
        let path = dir.join(name);
        fs::write(&path, content).expect("write task file");
        path
    }

    pub fn read_cache_bytes(&self) -> Vec<u8> {
        fs::read(self.cache_path()).expect("read cache file")
    }
}

pub fn snapshot(data: &str) -> Snapshot {
    Snapshot::from_json_str(data).expect("snapshot")
}

/// A snapshot with one project, three states, and a couple of issues
pub fn sample_snapshot() -> Snapshot {
    snapshot(
        r#"{
            "project": {"id": "p1", "identifier": "CCPRISM", "name": "Prism",
                        "workspace": "acme"},
            "states": [
                {"id": "s1", "name": "Todo", "group": "unstarted"},
                {"id": "s2", "name": "In Progress", "group": "started"},
                {"id": "s3", "name": "In Review", "group": "started"}
            ],
            "issues": [
                {"id": "u25", "sequence_id": 25, "name": "Wire the codec",
                 "state": {"id": "s2"}, "priority": {"id": "high"},
                 "updated_at": "2025-12-10T09:00:00Z"},
                {"id": "u27", "sequence_id": 27, "name": "Implement feature",
                 "state": "s1", "updated_at": "2025-12-11T10:00:00Z"}
            ]
        }"#,
    )
}
