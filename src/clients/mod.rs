pub mod fcm;
pub mod firecrawl;
pub mod openai;

pub use fcm::FcmClient;
pub use firecrawl::FirecrawlClient;
pub use openai::OpenAiClient;
