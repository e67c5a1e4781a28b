use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::Client;

/// Load AWS configuration for `region` from the default credential chain.
pub async fn load_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await
}

pub async fn build_client_with_region(region: &str) -> Client {
    let config = load_config(region).await;
    Client::new(&config)
}
