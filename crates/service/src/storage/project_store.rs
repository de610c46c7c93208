use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use tokio::{
    fs,
    sync::{OwnedRwLockWriteGuard, RwLock},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::issues::domain::{Issue, IssuePatch};
use crate::issues::filter::IssueFilter;
use crate::issues::repository::IssueRepository;

type IssueList = Arc<RwLock<Vec<Issue>>>;

/// Bytes escaped in project file names: everything except lowercase ASCII
/// letters, digits, `-` and `_`. Uppercase letters are escaped so names that
/// differ only in case stay distinct on case-insensitive filesystems.
const FILE_STEM: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .add(b'A').add(b'B').add(b'C').add(b'D').add(b'E').add(b'F').add(b'G')
    .add(b'H').add(b'I').add(b'J').add(b'K').add(b'L').add(b'M').add(b'N')
    .add(b'O').add(b'P').add(b'Q').add(b'R').add(b'S').add(b'T').add(b'U')
    .add(b'V').add(b'W').add(b'X').add(b'Y').add(b'Z');

/// On-disk shape of one project.
#[derive(Serialize, Deserialize)]
struct ProjectDocument {
    name: String,
    issues: Vec<Issue>,
}

/// Project store keeping each project's issues behind its own lock.
///
/// With a data directory every project is persisted as its own JSON file, so
/// writes to different projects never contend. Mutations are built on a copy
/// of the list and only swapped in after the file write succeeded. A project
/// created by a failed first write is unregistered again before its lock is
/// released, so readers never observe it.
pub struct ProjectFileStore {
    projects: DashMap<String, IssueList>,
    dir: Option<PathBuf>,
}

/// Write access to one project's issues.
struct Locked {
    list: IssueList,
    guard: OwnedRwLockWriteGuard<Vec<Issue>>,
    /// Registered by this writer and not yet persisted.
    fresh: bool,
}

impl ProjectFileStore {
    /// Store without persistence; state lives as long as the process.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self { projects: DashMap::new(), dir: None })
    }

    /// Open (or create) a data directory and load every project file in it.
    pub async fn open<P: Into<PathBuf>>(dir: P) -> Result<Arc<Self>, ServiceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(ServiceError::db)?;

        let projects = DashMap::new();
        let mut entries = fs::read_dir(&dir).await.map_err(ServiceError::db)?;
        while let Some(entry) = entries.next_entry().await.map_err(ServiceError::db)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await.map_err(ServiceError::db)?;
            match serde_json::from_slice::<ProjectDocument>(&bytes) {
                Ok(doc) => {
                    projects.insert(doc.name, Arc::new(RwLock::new(doc.issues)));
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable project file"),
            }
        }
        debug!(dir = %dir.display(), projects = projects.len(), "project store loaded");
        Ok(Arc::new(Self { projects, dir: Some(dir) }))
    }

    /// Names of all known projects, in no particular order.
    pub fn project_names(&self) -> Vec<String> {
        self.projects.iter().map(|e| e.key().clone()).collect()
    }

    // The map guard is released before returning so no shard lock is held across awaits.
    fn project(&self, name: &str) -> Option<IssueList> {
        self.projects.get(name).map(|e| Arc::clone(e.value()))
    }

    /// Whether `list` is still the registered list for `name`.
    fn is_current(&self, name: &str, list: &IssueList) -> bool {
        self.projects.get(name).is_some_and(|e| Arc::ptr_eq(e.value(), list))
    }

    /// Lock an existing project for writing.
    async fn lock_existing(&self, name: &str) -> Option<Locked> {
        let list = self.project(name)?;
        let guard = Arc::clone(&list).write_owned().await;
        // unregistered while we waited: a first write failed
        self.is_current(name, &list).then_some(Locked { list, guard, fresh: false })
    }

    /// Lock a project for writing, registering it if unknown. A new project is
    /// locked before it becomes visible, so readers wait for its first save.
    async fn lock_or_register(&self, name: &str) -> Locked {
        loop {
            let list = match self.projects.entry(name.to_string()) {
                Entry::Occupied(e) => Arc::clone(e.get()),
                Entry::Vacant(v) => {
                    let list: IssueList = Arc::default();
                    if let Ok(guard) = Arc::clone(&list).try_write_owned() {
                        v.insert(Arc::clone(&list));
                        return Locked { list, guard, fresh: true };
                    }
                    continue;
                }
            };
            let guard = Arc::clone(&list).write_owned().await;
            if self.is_current(name, &list) {
                return Locked { list, guard, fresh: false };
            }
        }
    }

    fn file_for(&self, name: &str) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(format!("{}.json", encode_file_stem(name))))
    }

    async fn save(&self, name: &str, issues: &[Issue]) -> Result<(), ServiceError> {
        let Some(path) = self.file_for(name) else { return Ok(()) };
        let doc = ProjectDocument { name: name.to_string(), issues: issues.to_vec() };
        let data = serde_json::to_vec(&doc).map_err(ServiceError::db)?;
        // write-then-rename so a crash never leaves a truncated project file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).await.map_err(ServiceError::db)?;
        fs::rename(&tmp, &path).await.map_err(ServiceError::db)?;
        Ok(())
    }

    /// Run `f` on a copy of the locked list; persist and publish the copy only
    /// if `f` reports a change. Nothing is published when the write fails.
    async fn commit<T, F>(&self, name: &str, locked: Locked, f: F) -> Result<Option<T>, ServiceError>
    where
        F: FnOnce(&mut Vec<Issue>) -> Option<T>,
    {
        let Locked { list, mut guard, fresh } = locked;
        let mut next = guard.clone();
        let Some(out) = f(&mut next) else { return Ok(None) };
        if let Err(e) = self.save(name, &next).await {
            if fresh {
                self.projects.remove_if(name, |_, v| Arc::ptr_eq(v, &list));
            }
            drop(guard);
            return Err(e);
        }
        *guard = next;
        Ok(Some(out))
    }
}

/// File-name-safe encoding of a project name, see [`FILE_STEM`].
fn encode_file_stem(name: &str) -> String {
    utf8_percent_encode(name, FILE_STEM).to_string()
}

#[async_trait]
impl IssueRepository for ProjectFileStore {
    async fn list(&self, project: &str, filter: &IssueFilter) -> Result<Vec<Issue>, ServiceError> {
        let not_found = || ServiceError::ProjectNotFound(project.to_string());
        let list = self.project(project).ok_or_else(not_found)?;
        let issues = list.read().await;
        if !self.is_current(project, &list) {
            return Err(not_found());
        }
        Ok(filter.apply(issues.iter()))
    }

    async fn create(&self, project: &str, issue: Issue) -> Result<Issue, ServiceError> {
        let locked = self.lock_or_register(project).await;
        let created = issue.clone();
        self.commit(project, locked, move |issues| {
            issues.push(issue);
            Some(())
        })
        .await?;
        Ok(created)
    }

    async fn update(&self, project: &str, id: Uuid, patch: &IssuePatch) -> Result<bool, ServiceError> {
        let Some(locked) = self.lock_existing(project).await else { return Ok(false) };
        let applied = self
            .commit(project, locked, |issues| {
                let issue = issues.iter_mut().find(|i| i.id == id)?;
                patch.apply(issue);
                Some(())
            })
            .await?;
        Ok(applied.is_some())
    }

    async fn delete(&self, project: &str, id: Uuid) -> Result<bool, ServiceError> {
        let Some(locked) = self.lock_existing(project).await else { return Ok(false) };
        let removed = self
            .commit(project, locked, |issues| {
                let pos = issues.iter().position(|i| i.id == id)?;
                Some(issues.remove(pos))
            })
            .await?;
        Ok(removed.is_some())
    }
}
