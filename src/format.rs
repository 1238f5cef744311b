use crate::model::{PaperRecord, ResultTable, COLUMNS};

// Renderers for handing harvested rows to whatever consumes them next.
pub struct Formatter;

impl Formatter {
    pub fn to_jsonl(data: &PaperRecord) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(data)?;
        line.push('\n');
        Ok(line)
    }

    /// Tab separated header plus the first `n` rows.
    pub fn to_preview(table: &ResultTable, n: usize) -> String {
        let mut out = COLUMNS.join("\t");
        out.push('\n');
        for data in table.head(n) {
            out.push_str(&format!("{}\t{}\t{}\t{}\t{}\t{}\n",
                one_line(&data.title),
                one_line(&data.abstract_text),
                data.categories.join(" "),
                data.created.format("%Y-%m-%d"),
                data.arxiv_id,
                data.doi.as_deref().unwrap_or("-")
            ));
        }
        out
    }
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
