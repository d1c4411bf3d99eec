mod backend;
mod command;
mod model;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
