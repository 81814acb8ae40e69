mod detect;
mod drape;
mod io;
mod options;
mod plot;
mod sections;
mod store;

use anyhow::Result;
use clap::Parser;
use options::Cli;
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::init();
    match cli {
        Cli::Sections(sections) => sections.run(),
        Cli::Drape(drape) => drape.run(),
        Cli::Detect(detect) => detect.run(),
        Cli::Plot(plot) => plot.run(),
    }
}
