//! HTTP clients for the two external collaborators.
//!
//! [`FirecrawlFetcher`] implements [`runstory_core::upstream::Fetcher`] by
//! scraping pages to markdown through the Firecrawl API;
//! [`GeminiGenerator`] implements [`runstory_core::upstream::Generator`] on
//! top of Google's Gemini `generateContent` endpoint.
//!
//! Both are cheap to clone since the inner [`reqwest::Client`] is `Arc`-based.
//! Request failures never carry the request URL, and a client-side deadline
//! is reported as a timeout rather than a transport error.

pub mod error;
pub mod firecrawl;
pub mod gemini;

pub use error::{Error, Result};
pub use firecrawl::{FirecrawlConfig, FirecrawlFetcher};
pub use gemini::{GeminiConfig, GeminiGenerator};

#[cfg(test)]
mod testing {
  use tokio::net::TcpListener;

  /// Base URL of a listener that accepts connections and never answers.
  pub async fn silent_listener() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let mut held = Vec::new();
      while let Ok((socket, _)) = listener.accept().await {
        held.push(socket);
      }
    });
    format!("http://{addr}")
  }
}
