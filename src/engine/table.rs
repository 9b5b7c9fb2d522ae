use serde_json::{Map, Value};

/// Flat tabular view of a record list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Nested objects become dotted columns (`source.name`). List fields named
    /// in `sublists` are expanded by 1-based position (`scores.2.points scored`);
    /// other lists stay as single cells. Columns are in first-seen order and
    /// missing cells are null.
    pub fn from_records(records: &[Value], sublists: &[&str]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut flat_rows: Vec<Map<String, Value>> = Vec::with_capacity(records.len());

        for record in records {
            let mut flat = Map::new();
            flatten_into(&mut flat, "", record, sublists);
            for key in flat.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
            flat_rows.push(flat);
        }

        let rows = flat_rows
            .into_iter()
            .map(|mut flat| {
                columns
                    .iter()
                    .map(|c| flat.remove(c).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn cell(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

fn flatten_into(out: &mut Map<String, Value>, prefix: &str, value: &Value, sublists: &[&str]) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                let path = join(prefix, key);
                match v {
                    Value::Object(_) => flatten_into(out, &path, v, sublists),
                    Value::Array(items) if sublists.contains(&key.as_str()) => {
                        for (i, item) in items.iter().enumerate() {
                            let indexed = format!("{}.{}", path, i + 1);
                            match item {
                                Value::Object(_) => flatten_into(out, &indexed, item, sublists),
                                scalar => {
                                    out.insert(indexed, scalar.clone());
                                }
                            }
                        }
                    }
                    other => {
                        out.insert(path, other.clone());
                    }
                }
            }
        }
        scalar => {
            out.insert(join(prefix, "value"), scalar.clone());
        }
    }
}
