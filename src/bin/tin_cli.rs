//! Command-line front end for the mesh engine: reads a mesh document,
//! builds and optionally refines the mesh, and writes the triangulated
//! result back out as JSON. No interactive rendering: that stays an
//! out-of-scope collaborator (see DESIGN.md for the dropped dependency).

use std::path::PathBuf;
use std::process::ExitCode;

use structopt::StructOpt;

use delaunay_tin::io;
use delaunay_tin::{TinError, TinResult};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "tin_cli",
    author = "nelson kenzo tamashiro <nelsonkenzotamashiro@gmail.com>",
    about = "Incremental constrained Delaunay triangulation and Ruppert refinement"
)]
struct CliOptions {
    #[structopt(short, long, parse(from_os_str), help = "input mesh document (JSON)")]
    input: PathBuf,

    #[structopt(
        short,
        long,
        parse(from_os_str),
        help = "output triangulation document (JSON); printed to stdout if omitted"
    )]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let options = CliOptions::from_args();

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("tin_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &CliOptions) -> TinResult<()> {
    let doc = io::read::read(&options.input)?;
    let name = doc.name.clone();
    let mesh = io::build_mesh(&doc)?;
    let data = io::to_triangulation_data(&name, &mesh);

    match &options.output {
        Some(path) => io::write::write(path, &data)?,
        None => {
            let json = serde_json::to_string_pretty(&data)
                .map_err(|e| TinError::InvalidState(format!("failed to serialize output: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}
