// [[file:../../jdftx-tools.note::*main][main:1]]
use gut::prelude::*;

fn main() -> Result<()> {
    jdftx_tools::setup_jdftx_enter_main()?;

    Ok(())
}
// main:1 ends here
