use chrono::NaiveDate;
use serde::Serialize;

// column schema shared by every row handed to downstream consumers.
pub const COLUMNS: [&str; 6] = ["title", "abstract", "categories", "created", "id", "doi"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperRecord {
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub categories: Vec<String>,
    pub created: NaiveDate,
    #[serde(rename = "id")]
    pub arxiv_id: String,
    pub doi: Option<String>,
}

impl PaperRecord {
    pub fn new(
        title: String,
        abstract_text: String,
        categories: Vec<String>,
        created: NaiveDate,
        arxiv_id: String,
        doi: Option<String>
    ) -> Self {
        PaperRecord {
            title,
            abstract_text,
            categories,
            created,
            arxiv_id,
            doi
        }
    }
}

/// Append-only, insertion ordered rows produced by one harvest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultTable {
    rows: Vec<PaperRecord>
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: PaperRecord) {
        self.rows.push(record);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[PaperRecord] {
        &self.rows
    }

    /// The first `n` rows, or all of them when there are fewer.
    pub fn head(&self, n: usize) -> &[PaperRecord] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaperRecord> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<PaperRecord> {
        self.rows
    }
}

impl Extend<PaperRecord> for ResultTable {
    fn extend<I: IntoIterator<Item = PaperRecord>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

impl IntoIterator for ResultTable {
    type Item = PaperRecord;
    type IntoIter = std::vec::IntoIter<PaperRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a PaperRecord;
    type IntoIter = std::slice::Iter<'a, PaperRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
