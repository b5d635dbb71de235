//! Header-relative column slicing for aligned tabular output
//!
//! Tools like `snap list` pad columns to the widest value, so offsets change
//! from one run to the next. The header line is the only reliable reference:
//! each column starts where its header word starts and ends where the next
//! header word starts.

/// A named column spanning character positions `start..end`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
    name: String,
    start: usize,
    /// `None` for the last column, which runs to end of line
    end: Option<usize>,
}

/// Column boundaries detected from a header line
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    columns: Vec<Column>,
}

impl ColumnLayout {
    /// Detect columns from whitespace-separated header words
    #[must_use]
    pub fn from_header(header: &str) -> Self {
        let mut starts = Vec::new();
        let mut word_start = None;
        let mut word = String::new();

        for (pos, ch) in header.chars().enumerate() {
            if ch.is_whitespace() {
                if let Some(start) = word_start.take() {
                    starts.push((std::mem::take(&mut word), start));
                }
            } else {
                word_start.get_or_insert(pos);
                word.push(ch);
            }
        }
        if let Some(start) = word_start {
            starts.push((word, start));
        }

        let ends: Vec<Option<usize>> = starts
            .iter()
            .skip(1)
            .map(|(_, start)| Some(*start))
            .chain(std::iter::once(None))
            .collect();

        let columns = starts
            .into_iter()
            .zip(ends)
            .map(|((name, start), end)| Column { name, start, end })
            .collect();

        Self { columns }
    }

    /// Whether a column with this header exists
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Trimmed text of column `name` in `line`
    ///
    /// Returns `None` only if the header has no such column; a row too short
    /// to reach the column yields an empty string.
    #[must_use]
    pub fn field(&self, line: &str, name: &str) -> Option<String> {
        let column = self.column(name)?;
        let chars = line.chars().skip(column.start);
        let text: String = match column.end {
            Some(end) => chars.take(end.saturating_sub(column.start)).collect(),
            None => chars.collect(),
        };
        Some(text.trim().to_string())
    }

    fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}
