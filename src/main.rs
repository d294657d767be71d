use anyhow::Result;

fn main() -> Result<()> {
    webatoms::cli::runtime::block_on(webatoms::cli::app::run())?
}
