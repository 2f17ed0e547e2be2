pub mod qa_client;
pub mod snowflake_client;

pub use qa_client::InferenceQaClient;
pub use snowflake_client::SnowflakeClient;
