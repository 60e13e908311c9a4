use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::aggregate::{self, FilterSpec, GroupDimension, GroupTotal};
use crate::error::Result;
use crate::ingest;
use crate::records::NormalizedRecord;
use crate::schema::ColumnRoles;

/// The mutable state of one analysis session: the current records, the
/// schema they were expanded under, and the active filters.
///
/// The triple is replaced atomically on each successful ingestion or reset,
/// so readers never observe an old record set paired with a new schema. On a
/// failed ingestion the previous state is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    records: Vec<NormalizedRecord>,
    roles: ColumnRoles,
    filters: FilterSpec,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests a text buffer, replacing the whole session state on success.
    /// Filters reset to defaults so constraints from the previous file never
    /// leak into the new one.
    pub fn ingest_text(&mut self, text: &str) -> Result<()> {
        let ingestion = ingest(text)?;

        self.records = ingestion.records;
        self.roles = ingestion.roles;
        self.filters = FilterSpec::default();
        Ok(())
    }

    /// Reads a file as one whole buffer and ingests it.
    pub fn ingest_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let text = std::fs::read_to_string(path)?;
        self.ingest_text(&text)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn roles(&self) -> &ColumnRoles {
        &self.roles
    }

    pub fn filters(&self) -> &FilterSpec {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterSpec) {
        self.filters = filters;
    }

    /// Group totals for the current records under the current filters. An
    /// empty result means no record survived the filters.
    pub fn aggregate(&self) -> Vec<GroupTotal> {
        aggregate::aggregate(&self.records, &self.roles, &self.filters)
    }

    /// Selectable values for a dimension, scoped by the current filters on
    /// the other dimensions: with an area selected, branch options shrink to
    /// the branches seen in that area.
    pub fn options(&self, dimension: GroupDimension) -> Vec<String> {
        let mut scoped = self.filters.clone();
        match dimension {
            GroupDimension::Product => scoped.product = None,
            GroupDimension::Branch => scoped.branch = None,
            GroupDimension::Area => scoped.area = None,
        }

        let filtered: Vec<NormalizedRecord> = self
            .records
            .iter()
            .filter(|record| aggregate::passes_filters(record, &self.roles, &scoped))
            .cloned()
            .collect();

        aggregate::distinct_values(&filtered, dimension)
    }

    /// Serializes the whole session for the persistence collaborator.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restores a session previously produced by [`Session::to_json`]. A
    /// restored session aggregates identically to the one that was saved.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
