use anyhow::Result;
use textpad::app::run;

fn main() -> Result<()> {
    run()
}
