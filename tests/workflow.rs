use std::fs;

use approx::assert_relative_eq;
use indoc::indoc;
use labtab::combinations::{concat, layer};
use labtab::{
    divide, serialize_obj, CsvSource, Concept, Feed, FlatTable, OperationConfig, Query,
    Reduction, TableConfig, Transformation,
};
use labtab_variables::Variables;
use tempfile::TempDir;

const CENSUS: &str = indoc!(
    "
    state,year,age,population,deaths
    ny,2020,0-39,100,1
    ny,2020,40-79,80,4
    ny,2020,80+,20,6
    ny,2021,0-39,110,2
    ny,2021,40-79,90,5
    ny,2021,80+,25,5
    nj,2020,0-39,50,1
    nj,2020,40-79,40,2
    nj,2020,80+,10,3
    "
);

const VARIABLES: &str = indoc!(
    "
    - name: state
      vartype: text
    - name: year
      vartype: !integer
        unit: years
    - name: age
      vartype: !range
        unit: years
    - name: population
      vartype: !integer
        unit: people
    - name: deaths
      vartype: !integer
        unit: people
    "
);

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("census.csv"), CENSUS).unwrap();
        fs::write(dir.path().join("variables.yaml"), VARIABLES).unwrap();
        Fixture { dir }
    }

    fn variables(&self) -> Variables {
        Variables::from_yaml(self.dir.path().join("variables.yaml")).unwrap()
    }

    fn feed(&self) -> Feed {
        let source = CsvSource::new("census", self.dir.path().join("census.csv"));
        let mut feed = Feed::new(source, self.variables());
        for (key, state) in [("ny", "ny"), ("nj", "nj")] {
            feed.register(
                format!("population_{key}"),
                Query::new("population", "year", "age")
                    .scope("state", state)
                    .name("population"),
            );
            feed.register(
                format!("deaths_{key}"),
                Query::new("deaths", "year", "age")
                    .scope("state", state)
                    .name("deaths"),
            );
        }
        feed
    }
}

#[test]
fn mortality_rate_by_age() {
    let fixture = Fixture::new();
    let feed = fixture.feed();
    let deaths = feed.call("deaths_ny").unwrap();
    let population = feed.call("population_ny").unwrap();

    let config = OperationConfig::new().retag("mortality").name("Mortality");
    let rate = divide(&deaths, &population, &config).unwrap();
    assert_eq!(rate.name(), "Mortality");
    assert_eq!(rate.headerkeys(), vec!["year", "age"]);
    assert_eq!(rate.scope()["state"], "ny");
    assert_eq!(rate.variables()["mortality"].vartype.unit(), Some("people/people"));
    assert_relative_eq!(rate.arrays()["mortality"][[0, 2]], 0.3);
    assert_relative_eq!(rate.arrays()["mortality"][[1, 2]], 0.2);
}

#[test]
fn states_concatenate_and_reduce() {
    let fixture = Fixture::new();
    let feed = fixture.feed();
    let ny = feed.call("population_ny").unwrap();
    let nj = feed.call("population_nj").unwrap();

    let both = concat(&[ny, nj], "state", &[] as &[&str]).unwrap();
    assert_eq!(both.headerkeys(), vec!["state", "year", "age"]);
    assert_eq!(both.header("state").unwrap(), ["ny", "nj"]);
    // nj has no 2021 data
    assert!(both.arrays()["population"][[1, 1, 0]].is_nan());

    let total = both
        .transform("age", &Transformation::Reduce { reduction: Reduction::Sum }, Some("total"))
        .unwrap();
    assert_eq!(total.datakeys(), vec!["total"]);
    assert_relative_eq!(total.arrays()["total"][[0, 0]], 200.0);
    assert_relative_eq!(total.arrays()["total"][[0, 1]], 225.0);
    assert_relative_eq!(total.arrays()["total"][[1, 0]], 100.0);
}

#[test]
fn layered_table_flattens_both_layers() {
    let fixture = Fixture::new();
    let feed = fixture.feed();
    let deaths = feed.call("deaths_nj").unwrap();
    let population = feed.call("population_nj").unwrap();
    let both = layer(&[population, deaths], &[] as &[&str]).unwrap();
    let flat = both.flatten().unwrap();
    assert_eq!(flat.keys(), vec!["year", "age", "state", "population", "deaths"]);
    assert_eq!(flat.labels("deaths").unwrap(), vec!["1", "2", "3"]);
}

#[test]
fn age_distribution_concept() {
    let fixture = Fixture::new();
    let feed = fixture.feed();
    let population = feed
        .call("population_nj")
        .unwrap()
        .squeeze(&["year"])
        .unwrap();
    let share = population
        .transform("age", &Transformation::Normalize, Some("share"))
        .unwrap();
    let concept = Concept::new("demographics")
        .with_histogram("ages", &population)
        .unwrap()
        .with_curve("share", &share)
        .unwrap();
    let ages = concept.histogram("ages").unwrap();
    assert_eq!(ages.axis, vec!["0-39", "40-79", "80+"]);
    // midpoints 19.5 and 59.5, and the lower bound 80
    assert_relative_eq!(
        ages.mean(),
        (50.0 * 19.5 + 40.0 * 59.5 + 10.0 * 80.0) / 100.0,
        epsilon = 1e-12
    );
    assert_relative_eq!(concept.curve("share").unwrap().at(39.5), 0.45, epsilon = 1e-12);
    assert!(concept.variables().contains_key("year"));
}

#[test]
fn table_config_builds_from_files() {
    let fixture = Fixture::new();
    let dir = fixture.dir.path();
    let config = TableConfig::new("deaths")
        .datakeys(["deaths"])
        .headerkeys(["year", "age", "state"])
        .variables(dir.join("variables.yaml"))
        .transform(
            "age",
            Transformation::Reduce {
                reduction: Reduction::Sum,
            },
            None,
        );
    let path = dir.join("config.yaml");
    serialize_obj(&config, &path).unwrap();
    let config: TableConfig = labtab::deserialize_file(&path).unwrap();

    let variables = config.load_variables().unwrap();
    let flat = FlatTable::from_csv("census", dir.join("census.csv"), &variables).unwrap();
    let table = config.build(&flat).unwrap();
    assert_eq!(table.name(), "deaths");
    assert_eq!(table.headerkeys(), vec!["year", "state"]);
    // states sort as text
    assert_eq!(table.header("state").unwrap(), ["nj", "ny"]);
    assert_relative_eq!(table.arrays()["deaths"][[0, 1]], 11.0);
    assert_relative_eq!(table.arrays()["deaths"][[0, 0]], 6.0);
    assert!(table.arrays()["deaths"][[1, 0]].is_nan());
}

#[test]
fn inferred_variables_parse_every_column() {
    let fixture = Fixture::new();
    let path = fixture.dir.path().join("census.csv");
    let inferred = labtab_variables::infer::variables_from_csv(&path, None).unwrap();
    let flat = FlatTable::from_csv("census", &path, &inferred).unwrap();
    assert_eq!(flat.shape(), (9, 5));
    assert!(matches!(
        inferred["population"].vartype,
        labtab_variables::VarType::Integer { .. }
    ));
    let table = flat
        .unflatten(&["population"], &["state", "year", "age"], &[] as &[&str])
        .unwrap();
    assert_eq!(table.shape(), vec![2, 2, 3]);
}
