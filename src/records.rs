use std::collections::HashMap;
use std::path::PathBuf;

/// A single downloadable benchmark document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Document id, also sent as the `documentId` cookie
    pub document_id: String,

    /// Destination path under the technology directory
    pub file_path: PathBuf,

    /// Source URL of the PDF
    pub pdf_url: String,
}

/// A technology from the catalog and the documents discovered for it
#[derive(Debug, Clone)]
pub struct TechnologyRecord {
    pub id: String,
    pub directory_path: PathBuf,
    /// Discovered documents, in the order they were observed
    pub resources: Vec<ResourceRecord>,
}

impl TechnologyRecord {
    pub fn new(id: String, directory_path: PathBuf) -> Self {
        Self {
            id,
            directory_path,
            resources: Vec::new(),
        }
    }
}

/// Ordered store of technologies keyed by id.
///
/// Iteration follows catalog order. Owned by the pipeline and lent to the
/// discovery session for mutation.
#[derive(Debug, Default)]
pub struct TechnologyStore {
    records: Vec<TechnologyRecord>,
    index: HashMap<String, usize>,
}

impl TechnologyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a technology with an empty resource list.
    ///
    /// A repeated id keeps its original position and takes the new path.
    pub fn insert(&mut self, id: String, directory_path: PathBuf) {
        match self.index.get(&id) {
            Some(&pos) => self.records[pos].directory_path = directory_path,
            None => {
                self.index.insert(id.clone(), self.records.len());
                self.records.push(TechnologyRecord::new(id, directory_path));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&TechnologyRecord> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TechnologyRecord> {
        self.index.get(id).map(|&pos| &mut self.records[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TechnologyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of resources across all technologies
    pub fn total_resources(&self) -> usize {
        self.records.iter().map(|t| t.resources.len()).sum()
    }

    /// Resources in download order: catalog order, then append order
    pub fn resources(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter().flat_map(|t| t.resources.iter())
    }
}
