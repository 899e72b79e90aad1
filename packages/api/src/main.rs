use lambda_http::{run, tracing, Error};
use std::env::set_var;
use std::sync::Arc;

use api::state::AppState;
use shared::config::GameTableConfig;
use shared::repositories::game_repository::DynamoDbGameRepository;
use shared::services::game_service::GameService;

#[tokio::main]
async fn main() -> Result<(), Error> {
    set_var("AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH", "true");

    // required to enable CloudWatch error logging by the runtime
    tracing::init_default_subscriber();

    let config = GameTableConfig::from_env()?;
    tracing::info!(
        "Serving games from table {} (list limit {})",
        config.table_name,
        config.list_limit
    );

    let aws_config = aws_config::load_from_env().await;
    let client = aws_sdk_dynamodb::Client::new(&aws_config);

    let game_repository = Arc::new(DynamoDbGameRepository::new(client, &config));
    let game_service = Arc::new(GameService::new(game_repository));

    let app_state = AppState {
        game_service,
        list_limit: config.list_limit,
    };

    run(api::app(app_state)).await
}
