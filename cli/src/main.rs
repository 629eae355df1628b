mod opt;
mod routes;

use clap::Parser;
use opt::Opt;

fn route_cmd(opt: Opt) -> i32 {
    match opt {
        Opt::Variables(cmd) => routes::variables(cmd),
        Opt::Summarize(cmd) => routes::summarize(cmd),
        Opt::Reshape(cmd) => routes::reshape(cmd),
    }
}

fn main() {
    env_logger::init();

    let opt = Opt::parse();

    let exit_code = route_cmd(opt);

    std::process::exit(exit_code);
}
