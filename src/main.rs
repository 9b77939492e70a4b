#[tokio::main]
async fn main() -> plant_care_bot::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("plant_care_bot=info,teloxide=warn"),
    )
    .init();
    log::info!("Starting Plant Care Telegram bot");

    match plant_care_bot::run().await {
        Ok(()) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {e}");
            Err(e)
        }
    }
}
