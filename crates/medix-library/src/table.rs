use medix_probe::SummaryRow;

/// Rows of successfully analyzed files, in scan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: SummaryRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[SummaryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of every row's field names, in first-seen order.
    pub fn headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = Vec::new();
        for row in &self.rows {
            for name in row.field_names() {
                if !headers.iter().any(|h| h == name) {
                    headers.push(name.to_string());
                }
            }
        }
        headers
    }

    /// Stable sort by the `name` column; rows without a name go last.
    pub fn sort_by_name(&mut self) {
        self.rows.sort_by(|a, b| match (a.get_str("name"), b.get_str("name")) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    /// Rows whose `type` column equals `kind`.
    pub fn of_type<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a SummaryRow> + 'a {
        self.rows.iter().filter(move |row| row.get_str("type") == Some(kind))
    }
}

impl FromIterator<SummaryRow> for SummaryTable {
    fn from_iter<I: IntoIterator<Item = SummaryRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a SummaryTable {
    type Item = &'a SummaryRow;
    type IntoIter = std::slice::Iter<'a, SummaryRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
