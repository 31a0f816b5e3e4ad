mod command;
mod play;
mod ui;

fn main() -> anyhow::Result<()> {
    command::run()
}
