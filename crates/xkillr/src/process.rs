use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use nix::unistd::{Uid, User};
use thiserror::Error;

pub const UNKNOWN_USER: &str = "unknown";
pub const UNKNOWN_COMMAND: &str = "N/A";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot open {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One process as it looked when the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub user: String,
    pub pid: String,
    pub command: String,
}

impl ProcessRecord {
    pub fn new(user: impl Into<String>, pid: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pid: pid.into(),
            command: command.into(),
        }
    }
}

/// The process table captured once at startup, in directory enumeration order.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    records: Vec<ProcessRecord>,
}

impl Snapshot {
    #[cfg(test)]
    pub fn from_records(records: Vec<ProcessRecord>) -> Self {
        Self { records }
    }

    pub fn capture(proc_root: &Path) -> Result<Self, SnapshotError> {
        let entries = fs::read_dir(proc_root).map_err(|source| SnapshotError::Open {
            path: proc_root.to_path_buf(),
            source,
        })?;

        let mut users = UserNames::default();
        let mut records = Vec::new();
        let mut dropped = 0usize;

        for entry in entries {
            let Ok(entry) = entry else {
                continue;
            };
            let name = entry.file_name();
            let Some(pid) = name.to_str().filter(|name| is_pid(name)) else {
                continue;
            };
            if !entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false) {
                continue;
            }

            match read_record(&entry.path(), pid, &mut users) {
                Ok(record) => records.push(record),
                Err(err) => {
                    // exited between readdir and open, or not ours to read
                    log::trace!("dropping pid {pid}: {err}");
                    dropped += 1;
                }
            }
        }

        log::debug!(
            "captured {} processes from {} ({} dropped)",
            records.len(),
            proc_root.display(),
            dropped
        );
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&ProcessRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct StatusFields {
    name: Option<String>,
    uid: Option<u32>,
}

fn read_record(dir: &Path, pid: &str, users: &mut UserNames) -> io::Result<ProcessRecord> {
    let status = fs::read_to_string(dir.join("status"))?;
    let fields = parse_status(&status);
    let user = fields
        .uid
        .map(|uid| users.resolve(uid))
        .unwrap_or_else(|| UNKNOWN_USER.to_string());
    let command = fields.name.unwrap_or_else(|| UNKNOWN_COMMAND.to_string());
    Ok(ProcessRecord::new(user, pid, command))
}

fn parse_status(text: &str) -> StatusFields {
    let mut fields = StatusFields::default();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("Name:") {
            if let Some(token) = rest.split_whitespace().next() {
                fields.name = Some(token.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("Uid:") {
            // real, effective, saved, fs; the first one owns the process
            fields.uid = rest
                .split_whitespace()
                .next()
                .and_then(|token| token.parse().ok());
        }
    }
    fields
}

fn is_pid(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Default)]
struct UserNames {
    cache: HashMap<u32, String>,
}

impl UserNames {
    fn resolve(&mut self, uid: u32) -> String {
        if let Some(name) = self.cache.get(&uid) {
            return name.clone();
        }

        let name = User::from_uid(Uid::from_raw(uid))
            .ok()
            .flatten()
            .map(|user| user.name)
            .unwrap_or_else(|| UNKNOWN_USER.to_string());

        self.cache.insert(uid, name.clone());
        name
    }
}
