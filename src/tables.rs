//! HTML table extraction
//!
//! Turns every `table` element matching a [`SelectionConfig`] into an ordered
//! list of rows keyed by that table's `thead` header labels. Extraction is
//! best-effort: it never fails, odd markup just produces empty structures.

use std::fmt;

use scraper::{ElementRef, Html, Selector};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, trace};

/// One table's rows, in document order
pub type TabularDataset = Vec<Row>;

/// Every matched table, in document order
pub type TablesResult = Vec<TabularDataset>;

/// Criteria narrowing which tables get extracted
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionConfig {
    /// Class names a table must carry, all of them.
    /// Accepts a single string or an array of strings.
    #[serde(default, deserialize_with = "one_or_many")]
    pub contain_classes: Vec<String>,
}

impl SelectionConfig {
    /// Require every class in `classes`
    pub fn with_classes<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            contain_classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    /// Class names to match, split the way a `class` attribute would be
    pub fn required_classes(&self) -> Vec<&str> {
        self.contain_classes
            .iter()
            .flat_map(|c| c.split_whitespace())
            .collect()
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(class)) => vec![class],
        Some(OneOrMany::Many(classes)) => classes,
        None => vec![],
    })
}

/// A table row: header label -> cell text, in header order.
///
/// Inserting an existing label replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `label` to `value`, returning the previous value if any
    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let label = label.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.fields.push((label, value));
                None
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = Row::new();
        for (label, value) in iter {
            row.insert(label, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (label, value) in &self.fields {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Row {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowVisitor;

        impl<'de> Visitor<'de> for RowVisitor {
            type Value = Row;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of header labels to cell text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Row, A::Error> {
                let mut row = Row::new();
                while let Some((label, value)) = access.next_entry::<String, String>()? {
                    row.insert(label, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RowVisitor)
    }
}

struct TableSelectors {
    table: Selector,
    header_cells: Selector,
    body_rows: Selector,
    cells: Selector,
}

impl TableSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            table: Selector::parse("table").ok()?,
            header_cells: Selector::parse("thead tr th").ok()?,
            body_rows: Selector::parse("tbody tr").ok()?,
            cells: Selector::parse("td").ok()?,
        })
    }
}

/// Extract every table matching `config` from an HTML document
pub fn extract_tables(html: &str, config: &SelectionConfig) -> TablesResult {
    let document = Html::parse_document(html);

    let selectors = match TableSelectors::new() {
        Some(s) => s,
        None => return vec![],
    };

    let classes = config.required_classes();
    trace!(?classes, "selecting tables");

    let tables: TablesResult = document
        .select(&selectors.table)
        .filter(|table| has_all_classes(table, &classes))
        .map(|table| extract_table(table, &selectors))
        .collect();

    debug!(count = tables.len(), "extracted tables");
    tables
}

fn has_all_classes(table: &ElementRef<'_>, classes: &[&str]) -> bool {
    classes
        .iter()
        .all(|wanted| table.value().classes().any(|c| c == *wanted))
}

fn extract_table(table: ElementRef<'_>, selectors: &TableSelectors) -> TabularDataset {
    let headers: Vec<String> = table
        .select(&selectors.header_cells)
        .map(|th| th.text().collect::<String>().trim().to_string())
        .collect();

    let rows: TabularDataset = table
        .select(&selectors.body_rows)
        .map(|tr| {
            let mut row = Row::new();
            for (index, cell) in tr.select(&selectors.cells).enumerate() {
                let text = cell.text().collect::<String>();
                // Empty cells in some markup carry a lone newline text node
                if text == "\n" {
                    continue;
                }
                if let Some(label) = headers.get(index) {
                    row.insert(label.as_str(), text.trim());
                }
            }
            row
        })
        .collect();

    debug!(headers = headers.len(), rows = rows.len(), "extracted table");
    rows
}
