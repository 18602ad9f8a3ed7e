//! Web search tool, registered only with a search API key

use agent_core::Result as AgentResult;
use agent_tools::Tool;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::parse_params;
use crate::api::SerperClient;

/// Organic results handed to the agent
const MAX_HITS: usize = 8;

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
}

/// Fallback when no other tool can answer
pub struct WebSearchTool {
    client: SerperClient,
}

impl WebSearchTool {
    pub fn new(client: SerperClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SearchParams = parse_params(params)?;
        let query = params.query.trim();
        if query.is_empty() {
            return Err(agent_core::Error::InvalidParameters(
                "query must not be empty".to_string(),
            ));
        }

        let mut results = self.client.search(query).await?;
        results.hits.truncate(MAX_HITS);

        Ok(json!({
            "query": query,
            "answer": results.answer,
            "results": results.hits,
        }))
    }

    fn name(&self) -> &'static str {
        "web_search"
    }

    fn description(&self) -> &'static str {
        "Search the web. Useful when the other tools cannot provide an answer, \
         e.g. for recent news or events."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                }
            },
            "required": ["query"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_search_output() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/search")
            .with_body(
                json!({
                    "answerBox": { "answer": "42" },
                    "organic": [{ "title": "Answer", "link": "https://example.test" }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = SerperClient::new("key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.url());
        let output = WebSearchTool::new(client)
            .execute(json!({ "query": "  meaning of life " }))
            .await
            .unwrap();

        assert_eq!(output["query"], "meaning of life");
        assert_eq!(output["answer"], "42");
        assert_eq!(output["results"][0]["link"], "https://example.test");
    }

    #[tokio::test]
    async fn test_empty_query() {
        let client = SerperClient::new("key", Duration::from_secs(5)).unwrap();
        let err = WebSearchTool::new(client)
            .execute(json!({ "query": " " }))
            .await
            .unwrap_err();
        assert!(matches!(err, agent_core::Error::InvalidParameters(_)));
    }
}
