use labtab::{deserialize_file, serialize_obj, FlatTable, TableConfig, Variables};
use labtab_variables::infer::variables_from_csv;
use log::info;

use crate::opt;

fn load_config(path: &std::path::Path) -> Result<(TableConfig, Variables), i32> {
    let config: TableConfig = match deserialize_file(path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Could not read config: {err}");
            return Err(1);
        }
    };
    match config.load_variables() {
        Ok(variables) => Ok((config, variables)),
        Err(err) => {
            eprintln!("Could not read variables: {err}");
            Err(1)
        }
    }
}

pub fn variables(cmd: opt::VariablesArgs) -> i32 {
    let variables = match variables_from_csv(&cmd.csv_src, Some(cmd.category_cutoff)) {
        Ok(variables) => variables,
        Err(err) => {
            eprintln!("Could not infer variables: {err}");
            return 1;
        }
    };

    if let Err(err) = serialize_obj(&variables, cmd.output.as_path()) {
        eprintln!("Error: {err}");
        return 1;
    }

    println!("Wrote file {:?}", cmd.output);
    println!("Always be sure to verify the variables");

    0
}

pub fn summarize(cmd: opt::SummarizeArgs) -> i32 {
    let (config, variables) = match (&cmd.config, &cmd.variables) {
        (Some(path), _) => match load_config(path) {
            Ok((config, variables)) => (Some(config), variables),
            Err(code) => return code,
        },
        (None, Some(path)) => match Variables::from_yaml(path) {
            Ok(variables) => (None, variables),
            Err(err) => {
                eprintln!("Could not read variables: {err}");
                return 1;
            }
        },
        (None, None) => (None, Variables::default()),
    };

    let name = cmd
        .csv_src
        .file_stem()
        .map_or_else(|| String::from("table"), |s| s.to_string_lossy().into_owned());
    let flat = match FlatTable::from_csv(name, &cmd.csv_src, &variables) {
        Ok(flat) => flat,
        Err(err) => {
            eprintln!("Could not read table: {err}");
            return 1;
        }
    };

    match config {
        Some(config) => match config.build(&flat) {
            Ok(table) if cmd.brief => println!("{}", table.structure()),
            Ok(table) => print!("{table}"),
            Err(err) => {
                eprintln!("Could not build table: {err}");
                return 1;
            }
        },
        None if cmd.brief => println!("{}", flat.structure()),
        None => print!("{flat}"),
    }

    0
}

pub fn reshape(cmd: opt::ReshapeArgs) -> i32 {
    let (config, variables) = match load_config(&cmd.config) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let table = FlatTable::from_csv(config.name.clone(), &cmd.csv_src, &variables)
        .and_then(|flat| config.build(&flat));
    let table = match table {
        Ok(table) => table,
        Err(err) => {
            eprintln!("Could not build table: {err}");
            return 1;
        }
    };
    info!("built {}", table.structure());

    if let Err(err) = table.to_csv(&cmd.output) {
        eprintln!("Failed to write: {err}");
        return 1;
    }

    println!("Wrote file {:?}", cmd.output);
    0
}
