use tabled::{settings::Style, Table, Tabled};
use crate::mapping::PlatformMappings;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, name: &str, value: &str) {
        self.rows.push(TableRow {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// One row per field, selectors stacked in the order they are tried
pub fn mappings_table(resolved: &PlatformMappings) -> String {
    let mut builder = TableBuilder::new();
    for (field_name, selectors) in &resolved.mappings {
        builder.add_row(field_name, &selectors.join("\n"));
    }
    builder.build()
}
