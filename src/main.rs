use rag_assistant::{util::log, App, Config};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let config = Config::load_default()?;
    log::init(&config.log_dir, config.debug)?;

    let app = App::new(&config)?;
    let terminal = ratatui::init();
    let result = app.run(terminal).await;
    ratatui::restore();
    result
}
