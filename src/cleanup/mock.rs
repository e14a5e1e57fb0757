// src/cleanup/mock.rs

//! Simulated cloud account backed by a JSON state file
//!
//! The state file maps each resource kind to a list of `{id, name}`
//! objects. Deletions are written back to the file immediately.
//!
//! ```json
//! {"vm": [{"id": "1", "name": "rift-vm"}], "network": []}
//! ```

use super::{CloudAccount, CloudResource, ResourceKind};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    id: String,
    name: String,
}

type State = BTreeMap<ResourceKind, Vec<Entry>>;

pub struct MockAccount {
    name: String,
    path: PathBuf,
    state: Mutex<State>,
}

impl MockAccount {
    pub fn open(name: &str, path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::IoError(format!("Failed to read mock cloud state {}: {}", path.display(), e)))?;
        let state: State = serde_json::from_str(&content)
            .map_err(|e| Error::ParseError(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            state: Mutex::new(state),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::Cloud(format!("{}: state lock poisoned", self.name)))
    }
}

impl CloudAccount for MockAccount {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, kind: ResourceKind) -> Result<Vec<CloudResource>> {
        let state = self.lock()?;
        Ok(state
            .get(&kind)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| CloudResource {
                        kind,
                        id: e.id.clone(),
                        name: e.name.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn delete(&self, resource: &CloudResource) -> Result<()> {
        let mut state = self.lock()?;
        let entries = state.entry(resource.kind).or_default();
        let before = entries.len();
        entries.retain(|e| e.id != resource.id);
        if entries.len() == before {
            return Err(Error::Cloud(format!("no {} with id {}", resource.kind, resource.id)));
        }

        let content = serde_json::to_string_pretty(&*state)?;
        fs::write(&self.path, content)
            .map_err(|e| Error::IoError(format!("Failed to write {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_and_delete_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.json");
        fs::write(
            &path,
            r#"{"vm": [{"id": "1", "name": "a"}, {"id": "2", "name": "b"}], "image": []}"#,
        )
        .unwrap();

        let account = MockAccount::open("sim", &path).unwrap();
        let vms = account.list(ResourceKind::Vm).unwrap();
        assert_eq!(vms.len(), 2);
        assert!(account.list(ResourceKind::Flavor).unwrap().is_empty());

        account.delete(&vms[0]).unwrap();
        assert!(account.delete(&vms[0]).is_err());

        let reopened = MockAccount::open("sim", &path).unwrap();
        let names: Vec<_> = reopened
            .list(ResourceKind::Vm)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_missing_state_file() {
        assert!(matches!(
            MockAccount::open("sim", Path::new("/nonexistent/cloud.json")),
            Err(Error::IoError(_))
        ));
    }
}
