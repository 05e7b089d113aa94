//! File-backed topology and load source.
//!
//! Reads a JSON [`TopologyDocument`] and re-reads it whenever the file's
//! modification time advances.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use linkwatch_overlay::{LoadSource, SourceError, TopologySource};
use linkwatch_types::{ConnectPoint, DirectionalLink, Host, Load};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::document::TopologyDocument;

#[derive(Debug, Default)]
struct FileState {
    document: TopologyDocument,
    loaded: bool,
    last_modified: Option<SystemTime>,
    last_error: Option<String>,
}

/// A topology and load source backed by a JSON file.
///
/// Queries are answered from the last document that parsed successfully.
/// Call [`refresh`](Self::refresh) periodically to pick up changes; a file
/// that disappears or fails to parse leaves the previous document in place
/// and records the error.
///
/// Loads are only reported for connect points that appear as a link
/// endpoint or host location. Any other connect point is an unknown
/// endpoint.
#[derive(Debug)]
pub struct FileTopology {
    path: PathBuf,
    state: RwLock<FileState>,
}

impl FileTopology {
    /// Create a source for the given path. Nothing is read until the first
    /// refresh.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: RwLock::new(FileState::default()),
        }
    }

    /// Create a source and read the file once.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let source = Self::new(path);
        source.refresh();
        source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The error from the most recent read, if it failed.
    pub fn error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    /// True once a document has been read successfully.
    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&self) -> Result<TopologyDocument, String> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| format!("Read error: {}", e))?;
        TopologyDocument::parse(&content).map_err(|e| format!("Parse error: {}", e))
    }

    /// Re-read the file if it changed since the last successful read.
    ///
    /// Returns true if a new document was loaded.
    pub fn refresh(&self) -> bool {
        let current_modified = self.modified_time();

        let file_changed = {
            let state = self.state.read();
            match (&state.last_modified, &current_modified) {
                (None, _) => true,
                (Some(_), None) => false,
                (Some(last), Some(current)) => current > last,
            }
        };
        if !file_changed {
            return false;
        }

        match self.read_file() {
            Ok(document) => {
                info!(
                    "Loaded topology from {}: {} links, {} hosts, {} loads",
                    self.path.display(),
                    document.links.len(),
                    document.hosts.len(),
                    document.loads.len()
                );
                let mut state = self.state.write();
                state.document = document;
                state.loaded = true;
                state.last_modified = current_modified;
                state.last_error = None;
                true
            }
            Err(e) => {
                let mut state = self.state.write();
                if state.last_error.as_ref() != Some(&e) {
                    warn!("Keeping previous topology for {}: {}", self.path.display(), e);
                }
                state.last_error = Some(e);
                false
            }
        }
    }

    fn is_known_endpoint(document: &TopologyDocument, point: &ConnectPoint) -> bool {
        document.loads.contains_key(point)
            || document
                .links
                .iter()
                .any(|entry| &entry.src == point || &entry.dst == point)
            || document
                .hosts
                .iter()
                .any(|host| &host.location == point || host.connect_point() == *point)
    }
}

impl TopologySource for FileTopology {
    fn active_links(&self) -> Vec<DirectionalLink> {
        self.state
            .read()
            .document
            .links
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.link())
            .collect()
    }

    fn links(&self) -> Vec<DirectionalLink> {
        self.state
            .read()
            .document
            .links
            .iter()
            .map(|entry| entry.link())
            .collect()
    }

    fn hosts(&self) -> Vec<Host> {
        self.state.read().document.hosts.clone()
    }
}

impl LoadSource for FileTopology {
    fn load_at(&self, point: &ConnectPoint) -> Result<Option<Load>, SourceError> {
        let state = self.state.read();
        if let Some(load) = state.document.loads.get(point) {
            return Ok(Some(*load));
        }
        if Self::is_known_endpoint(&state.document, point) {
            Ok(None)
        } else {
            debug!("No such endpoint {}", point);
            Err(SourceError::UnknownEndpoint(point.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, Write};
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "links": [
                { "src": "of:0001/1", "dst": "of:0002/1" },
                { "src": "of:0002/1", "dst": "of:0001/1", "active": false }
            ],
            "hosts": [ { "id": "h1", "location": "of:0001/3" } ],
            "loads": { "of:0001/1": { "rate": 20480 } }
        }"#
    }

    fn write_sample() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();
        file
    }

    #[test]
    fn new_reads_nothing() {
        let source = FileTopology::new("/tmp/topology.json");
        assert_eq!(source.path(), Path::new("/tmp/topology.json"));
        assert!(!source.is_loaded());
        assert!(source.links().is_empty());
        assert!(source.error().is_none());
    }

    #[test]
    fn open_reads_document() {
        let file = write_sample();
        let source = FileTopology::open(file.path());

        assert!(source.is_loaded());
        assert_eq!(source.links().len(), 2);
        assert_eq!(source.active_links().len(), 1);
        assert_eq!(source.hosts().len(), 1);
    }

    #[test]
    fn refresh_without_change_is_noop() {
        let file = write_sample();
        let source = FileTopology::open(file.path());
        assert!(!source.refresh());
    }

    #[test]
    fn loads_for_known_and_unknown_endpoints() {
        let file = write_sample();
        let source = FileTopology::open(file.path());

        let a = ConnectPoint::device("of:0001", 1);
        assert_eq!(source.load_at(&a).unwrap(), Some(Load::new(20480)));

        // known link endpoint without statistics
        let b = ConnectPoint::device("of:0002", 1);
        assert_eq!(source.load_at(&b).unwrap(), None);

        // host attachment and host side of the edge link
        assert_eq!(source.load_at(&ConnectPoint::device("of:0001", 3)).unwrap(), None);
        assert_eq!(source.load_at(&ConnectPoint::host("h1")).unwrap(), None);

        let unknown = ConnectPoint::device("of:0009", 9);
        assert!(matches!(
            source.load_at(&unknown),
            Err(SourceError::UnknownEndpoint(_))
        ));
    }

    #[test]
    fn missing_file_records_error() {
        let source = FileTopology::open("/nonexistent/path/topology.json");
        assert!(!source.is_loaded());
        assert!(source.error().unwrap().contains("Read error"));
    }

    #[test]
    fn invalid_json_records_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let source = FileTopology::open(file.path());
        assert!(!source.is_loaded());
        assert!(source.error().unwrap().contains("Parse error"));
    }

    #[test]
    fn bad_reload_keeps_previous_document() {
        let mut file = write_sample();
        let source = FileTopology::open(file.path());
        assert_eq!(source.links().len(), 2);

        std::thread::sleep(Duration::from_millis(20));
        file.as_file().set_len(0).unwrap();
        file.rewind().unwrap();
        writeln!(file, "{{ broken").unwrap();
        file.flush().unwrap();

        // Low mtime resolution may hide the change; either way the
        // previous document must survive.
        assert!(!source.refresh());
        assert_eq!(source.links().len(), 2);
    }

    #[test]
    fn detects_changes() {
        let mut file = write_sample();
        let source = FileTopology::open(file.path());

        std::thread::sleep(Duration::from_millis(20));
        file.as_file().set_len(0).unwrap();
        file.rewind().unwrap();
        writeln!(file, r#"{{ "links": [] }}"#).unwrap();
        file.flush().unwrap();

        // Note: may not observe the change on filesystems with coarse mtime
        if source.refresh() {
            assert!(source.links().is_empty());
        }
    }
}
