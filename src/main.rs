mod app;
mod goals;
mod model;
mod theme;
mod ui;
mod widgets;

use anyhow::Result;

fn main() -> Result<()> {
    ui::run()
}
