//! Fetch flat data from a source and turn it into tables
use std::path::PathBuf;

use indexmap::IndexMap;
use labtab_variables::infer::{read_csv_as_strings, series_to_opt_strings};
use labtab_variables::Variables;
use log::info;
use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray, Series};
use serde::{Deserialize, Serialize};

use crate::array::ArrayTable;
use crate::error::{ProcessError, TableError};
use crate::flat::FlatTable;

/// What to fetch from a source.
///
/// The `universe` column holds the data, `index`, `header`, and `axes` are
/// header axes, and `scope` selects the rows whose columns equal the given
/// labels.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Query {
    pub universe: String,
    pub index: String,
    pub header: String,
    #[serde(default)]
    pub axes: Vec<String>,
    #[serde(default)]
    pub scope: IndexMap<String, String>,
    /// Name of the resulting table. Defaults to the source name.
    #[serde(default)]
    pub name: Option<String>,
}

impl Query {
    pub fn new<S: Into<String>>(universe: S, index: S, header: S) -> Self {
        Query {
            universe: universe.into(),
            index: index.into(),
            header: header.into(),
            axes: Vec::new(),
            scope: IndexMap::new(),
            name: None,
        }
    }

    pub fn axes<I, S>(mut self, axes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.axes.extend(axes.into_iter().map(Into::into));
        self
    }

    pub fn scope<K: Into<String>, V: Into<String>>(mut self, key: K, label: V) -> Self {
        self.scope.insert(key.into(), label.into());
        self
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn datakeys(&self) -> Vec<&str> {
        vec![self.universe.as_str()]
    }

    pub fn headerkeys(&self) -> Vec<&str> {
        let mut keys = vec![self.index.as_str(), self.header.as_str()];
        keys.extend(self.axes.iter().map(String::as_str));
        keys
    }

    pub fn scopekeys(&self) -> Vec<&str> {
        self.scope.keys().map(String::as_str).collect()
    }

    /// Every column the query needs
    pub fn columns(&self) -> Vec<&str> {
        let mut keys = self.datakeys();
        keys.extend(self.headerkeys());
        keys.extend(self.scopekeys());
        keys
    }
}

/// Something that can produce flat data for a query
pub trait TableSource {
    /// A name used for logging and as the default table name
    fn name(&self) -> &str;

    /// The rows and columns of the query
    fn fetch(&self, query: &Query) -> Result<DataFrame, ProcessError>;
}

/// Keep the rows matching the scope of `query` and the columns it needs
pub fn filter_query(df: &DataFrame, query: &Query) -> Result<DataFrame, ProcessError> {
    let names = df.get_column_names();
    if let Some(key) = query.columns().into_iter().find(|key| !names.contains(key)) {
        return Err(ProcessError::MissingColumn(String::from(key)));
    }

    let mut keep = vec![true; df.height()];
    for (key, label) in query.scope.iter() {
        let labels = series_to_opt_strings(df.column(key)?).map_err(TableError::from)?;
        keep.iter_mut().zip(labels).for_each(|(k, x)| {
            *k &= x.as_deref().map(str::trim) == Some(label.trim());
        });
    }
    let mask = BooleanChunked::from_slice("mask", &keep);
    let filtered = df.filter(&mask)?;

    let columns = query
        .columns()
        .into_iter()
        .map(|key| filtered.column(key).cloned())
        .collect::<Result<Vec<Series>, _>>()?;
    Ok(DataFrame::new(columns)?)
}

/// A CSV file read with every column as strings
#[derive(Debug, Clone)]
pub struct CsvSource {
    name: String,
    path: PathBuf,
}

impl CsvSource {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(name: S, path: P) -> Self {
        CsvSource {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl TableSource for CsvSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, query: &Query) -> Result<DataFrame, ProcessError> {
        let df = read_csv_as_strings(&self.path)?;
        filter_query(&df, query)
    }
}

/// A dataframe already in memory
#[derive(Debug, Clone)]
pub struct FrameSource {
    name: String,
    data: DataFrame,
}

impl FrameSource {
    pub fn new<S: Into<String>>(name: S, data: DataFrame) -> Self {
        FrameSource {
            name: name.into(),
            data,
        }
    }
}

impl TableSource for FrameSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, query: &Query) -> Result<DataFrame, ProcessError> {
        filter_query(&self.data, query)
    }
}

/// Queries registered by table key against one source
pub struct Feed {
    source: Box<dyn TableSource>,
    variables: Variables,
    queries: IndexMap<String, Query>,
}

impl Feed {
    pub fn new<T: TableSource + 'static>(source: T, variables: Variables) -> Self {
        Feed {
            source: Box::new(source),
            variables,
            queries: IndexMap::new(),
        }
    }

    /// Register `query` under `tablekey`, returning the query it replaces
    pub fn register<S: Into<String>>(&mut self, tablekey: S, query: Query) -> Option<Query> {
        self.queries.insert(tablekey.into(), query)
    }

    pub fn queries(&self) -> &IndexMap<String, Query> {
        &self.queries
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Fetch the table registered under `tablekey`, sorted along every
    /// header axis
    pub fn call(&self, tablekey: &str) -> Result<ArrayTable, ProcessError> {
        let query = self
            .queries
            .get(tablekey)
            .ok_or_else(|| ProcessError::UnknownTable(String::from(tablekey)))?;
        info!(
            "fetching `{tablekey}` from {}: {} by {:?} where {:?}",
            self.source.name(),
            query.universe,
            query.headerkeys(),
            query.scope
        );
        let df = self.source.fetch(query)?;
        let name = query
            .name
            .clone()
            .unwrap_or_else(|| String::from(self.source.name()));
        let flat = FlatTable::new(name, &df, &self.variables)?;
        let table = flat.unflatten(
            &query.datakeys(),
            &query.headerkeys(),
            &query.scopekeys(),
        )?;
        Ok(table.sortall(true)?)
    }
}

/// Free parameters passed to the functions of pipelines and calculations
pub type Params = IndexMap<String, String>;

type TableFn = Box<dyn Fn(ArrayTable, &Params) -> Result<ArrayTable, TableError>>;
type CombineFn = Box<dyn Fn(&[ArrayTable], &Params) -> Result<ArrayTable, TableError>>;

/// A feed followed by a function applied to every fetched table
pub struct Pipeline {
    feed: Feed,
    function: TableFn,
    params: IndexMap<String, Params>,
}

impl Pipeline {
    pub fn new<F>(feed: Feed, function: F) -> Self
    where
        F: Fn(ArrayTable, &Params) -> Result<ArrayTable, TableError> + 'static,
    {
        Pipeline {
            feed,
            function: Box::new(function),
            params: IndexMap::new(),
        }
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    /// Register the parameters the function receives for `tablekey`
    pub fn register<S: Into<String>>(&mut self, tablekey: S, params: Params) {
        self.params.insert(tablekey.into(), params);
    }

    pub fn call(&self, tablekey: &str) -> Result<ArrayTable, ProcessError> {
        let params = self
            .params
            .get(tablekey)
            .ok_or_else(|| ProcessError::UnknownTable(String::from(tablekey)))?;
        let table = self.feed.call(tablekey)?;
        Ok((self.function)(table, params)?)
    }
}

/// Several pipeline tables combined into one
pub struct Calculation {
    pipeline: Pipeline,
    function: CombineFn,
    calculations: IndexMap<String, (Vec<String>, Params)>,
}

impl Calculation {
    pub fn new<F>(pipeline: Pipeline, function: F) -> Self
    where
        F: Fn(&[ArrayTable], &Params) -> Result<ArrayTable, TableError> + 'static,
    {
        Calculation {
            pipeline,
            function: Box::new(function),
            calculations: IndexMap::new(),
        }
    }

    /// Register the table keys, in argument order, and the parameters of a
    /// calculation
    pub fn register<S, T>(&mut self, key: S, tablekeys: &[T], params: Params)
    where
        S: Into<String>,
        T: AsRef<str>,
    {
        let tablekeys = tablekeys.iter().map(|k| String::from(k.as_ref())).collect();
        self.calculations.insert(key.into(), (tablekeys, params));
    }

    /// Run the pipeline for every table key. The tables come back in key
    /// order, one per key, repeats included.
    pub fn run_pipeline<T: AsRef<str>>(
        &self,
        tablekeys: &[T],
    ) -> Result<Vec<ArrayTable>, ProcessError> {
        tablekeys
            .iter()
            .map(|key| self.pipeline.call(key.as_ref()))
            .collect()
    }

    pub fn call(&self, key: &str) -> Result<ArrayTable, ProcessError> {
        let (tablekeys, params) = self
            .calculations
            .get(key)
            .ok_or_else(|| ProcessError::UnknownCalculation(String::from(key)))?;
        info!("calculating `{key}` from {tablekeys:?}");
        let tables = self.run_pipeline(tablekeys)?;
        Ok((self.function)(&tables, params)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::{divide, OperationConfig};
    use approx::assert_relative_eq;
    use labtab_variables::Variable;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CSV: &str = indoc::indoc!(
        "
        geography,year,sex,age,population,deaths
        ny,2021,m,0-49,50,1
        ny,2020,m,0-49,40,2
        ny,2020,f,0-49,45,1
        ny,2021,f,0-49,55,3
        nj,2020,m,0-49,10,0
        ny,2020,m,50+,20,5
        ny,2020,f,50+,25,4
        ny,2021,m,50+,22,6
        ny,2021,f,50+,27,7
        "
    );

    fn csv_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        file
    }

    fn variables() -> Variables {
        Variables::new(vec![
            Variable::text("geography"),
            Variable::integer("year"),
            Variable::text("sex"),
            Variable::range("age"),
            Variable::integer("population"),
            Variable::integer("deaths"),
        ])
        .unwrap()
    }

    fn population_query() -> Query {
        Query::new("population", "year", "sex")
            .axes(["age"])
            .scope("geography", "ny")
            .name("Population")
    }

    #[test]
    fn query_keys() {
        let query = population_query();
        assert_eq!(query.datakeys(), vec!["population"]);
        assert_eq!(query.headerkeys(), vec!["year", "sex", "age"]);
        assert_eq!(query.scopekeys(), vec!["geography"]);
    }

    #[test]
    fn csv_feed_builds_sorted_table() {
        let file = csv_file();
        let mut feed = Feed::new(CsvSource::new("census", file.path()), variables());
        feed.register("population", population_query());
        let table = feed.call("population").unwrap();
        assert_eq!(table.name(), "Population");
        assert_eq!(table.headerkeys(), vec!["year", "sex", "age"]);
        assert_eq!(table.header("year").unwrap(), ["2020", "2021"]);
        assert_eq!(table.header("sex").unwrap(), ["f", "m"]);
        assert_eq!(table.scope()["geography"], "ny");
        assert_relative_eq!(table.arrays()["population"][[0, 1, 0]], 40.0);
        assert_relative_eq!(table.arrays()["population"][[1, 0, 1]], 27.0);
    }

    #[test]
    fn unknown_table_key_fails() {
        let file = csv_file();
        let feed = Feed::new(CsvSource::new("census", file.path()), variables());
        assert!(matches!(
            feed.call("income"),
            Err(ProcessError::UnknownTable(_))
        ));
    }

    #[test]
    fn missing_column_fails() {
        let file = csv_file();
        let mut feed = Feed::new(CsvSource::new("census", file.path()), variables());
        feed.register("income", Query::new("income", "year", "sex"));
        assert!(matches!(
            feed.call("income"),
            Err(ProcessError::MissingColumn(col)) if col == "income"
        ));
    }

    #[test]
    fn frame_source_filters_scope() {
        let df = read_csv_as_strings(csv_file().path()).unwrap();
        let source = FrameSource::new("census", df);
        let query = Query::new("population", "year", "sex").scope("geography", "nj");
        let rows = source.fetch(&query).unwrap();
        assert_eq!(rows.height(), 1);
        assert_eq!(
            rows.get_column_names(),
            vec!["population", "year", "sex", "geography"]
        );
    }

    #[test]
    fn pipeline_applies_function_with_params() {
        let file = csv_file();
        let mut feed = Feed::new(CsvSource::new("census", file.path()), variables());
        feed.register("population", population_query());
        let mut pipeline = Pipeline::new(feed, |table, params| {
            let factor: f64 = params["factor"].parse().unwrap_or(1.0);
            table.divide(factor)
        });
        let mut params = Params::new();
        params.insert(String::from("factor"), String::from("10"));
        pipeline.register("population", params);
        let table = pipeline.call("population").unwrap();
        assert_relative_eq!(table.arrays()["population"][[0, 1, 0]], 4.0);
        assert!(matches!(
            pipeline.call("deaths"),
            Err(ProcessError::UnknownTable(_))
        ));
    }

    #[test]
    fn calculation_combines_pipeline_tables() {
        let file = csv_file();
        let mut feed = Feed::new(CsvSource::new("census", file.path()), variables());
        feed.register("population", population_query());
        feed.register(
            "deaths",
            Query::new("deaths", "year", "sex")
                .axes(["age"])
                .scope("geography", "ny")
                .name("Deaths"),
        );
        let mut pipeline = Pipeline::new(feed, |table, _| Ok(table));
        pipeline.register("population", Params::new());
        pipeline.register("deaths", Params::new());

        let mut calculation = Calculation::new(pipeline, |tables, params| {
            let config = OperationConfig::new().retag(params["tag"].as_str());
            divide(&tables[0], &tables[1], &config)
        });
        let mut params = Params::new();
        params.insert(String::from("tag"), String::from("mortality"));
        calculation.register("mortality", &["deaths", "population"], params);

        let rate = calculation.call("mortality").unwrap();
        assert_eq!(rate.datakeys(), vec!["mortality"]);
        assert_eq!(rate.name(), "Deaths");
        // 2020, m, 50+
        assert_relative_eq!(rate.arrays()["mortality"][[0, 1, 1]], 0.25);
        assert!(matches!(
            calculation.call("births"),
            Err(ProcessError::UnknownCalculation(_))
        ));
    }

    #[test]
    fn calculation_passes_repeated_keys() {
        let file = csv_file();
        let mut feed = Feed::new(CsvSource::new("census", file.path()), variables());
        feed.register("population", population_query());
        let mut pipeline = Pipeline::new(feed, |table, _| Ok(table));
        pipeline.register("population", Params::new());

        let mut calculation = Calculation::new(pipeline, |tables, _| {
            assert_eq!(tables.len(), 2);
            divide(&tables[0], &tables[1], &OperationConfig::new().retag("ratio"))
        });
        calculation.register("ratio", &["population", "population"], Params::new());

        let ratio = calculation.call("ratio").unwrap();
        assert_relative_eq!(ratio.arrays()["ratio"][[0, 1, 0]], 1.0);
    }
}
