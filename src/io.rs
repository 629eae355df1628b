//! Reading and writing tables as CSV
use std::fs::File;
use std::path::Path;

use labtab_variables::infer::read_csv_as_strings;
use labtab_variables::Variables;
use log::info;
use polars::prelude::{CsvWriter, SerWriter};

use crate::array::ArrayTable;
use crate::error::TableError;
use crate::flat::FlatTable;

impl FlatTable {
    /// Read a CSV with a header row. Every column is read as labels and
    /// normalized through its variable, if it has one.
    pub fn from_csv<S, P>(name: S, path: P, variables: &Variables) -> Result<Self, TableError>
    where
        S: Into<String>,
        P: AsRef<Path>,
    {
        let df = read_csv_as_strings(path.as_ref())?;
        info!(
            "read {} rows and {} columns from {}",
            df.height(),
            df.width(),
            path.as_ref().display()
        );
        FlatTable::new(name, &df, variables)
    }

    /// Write the table as CSV with a header row
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        let mut file = File::create(path)?;
        let mut df = self.dataframe().clone();
        CsvWriter::new(&mut file).finish(&mut df)?;
        Ok(())
    }
}

impl ArrayTable {
    /// Flatten the table and write it as CSV
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        self.flatten()?.to_csv(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use labtab_variables::Variable;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn csv_labels_are_normalized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(
            &path,
            indoc!(
                "
                year,value
                2020,1.50
                2021,
                "
            ),
        )
        .unwrap();
        let variables = Variables::new(vec![Variable::number("value")]).unwrap();
        let table = FlatTable::from_csv("values", &path, &variables).unwrap();
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.labels("value").unwrap(), vec!["1.5", ""]);
        assert_eq!(table.labels("year").unwrap(), vec!["2020", "2021"]);
    }

    #[test]
    fn write_then_read_flat_table() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.csv");
        fs::write(
            &input,
            indoc!(
                "
                sex,year,deaths
                f,2020,3
                m,2020,4
                "
            ),
        )
        .unwrap();
        let variables = Variables::new(vec![Variable::integer("deaths")]).unwrap();
        let table = FlatTable::from_csv("deaths", &input, &variables).unwrap();
        let output = dir.path().join("out.csv");
        table.to_csv(&output).unwrap();
        let text = fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().next(), Some("sex,year,deaths"));
        let reread = FlatTable::from_csv("deaths", &output, &variables).unwrap();
        assert_eq!(reread, table);
    }
}
