//! Ollama-backed natural-language layer over archived spending data.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use spendscope_core::{CategoryList, RuleSet};

use crate::archive::TransactionArchive;

pub struct OllamaClient {
    host: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(host: &str, model: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Quick liveness probe against /api/tags.
    pub async fn is_running(&self) -> bool {
        let url = format!("{}/api/tags", self.host);
        matches!(
            self.client
                .get(&url)
                .timeout(Duration::from_secs(2))
                .send()
                .await,
            Ok(resp) if resp.status().is_success()
        )
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        #[derive(Deserialize)]
        struct Tags {
            models: Vec<Model>,
        }

        #[derive(Deserialize)]
        struct Model {
            name: String,
        }

        let url = format!("{}/api/tags", self.host);
        let resp = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .context("ollama tags request")?;

        let status = resp.status();
        if !status.is_success() {
            bail!("ollama error: {status}");
        }

        let tags: Tags = resp.json().await.context("parse ollama tags")?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
            options: Options,
        }

        #[derive(Serialize)]
        struct Options {
            temperature: f64,
        }

        #[derive(Deserialize)]
        struct Resp {
            response: String,
        }

        let body = Req {
            model: &self.model,
            prompt,
            stream: false,
            options: Options { temperature: 0.7 },
        };

        let url = format!("{}/api/generate", self.host);
        let resp = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(30))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!("the model took too long to answer; try a smaller model")
                } else {
                    anyhow::Error::new(e).context("ollama generate request")
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("ollama error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse ollama response")?;
        Ok(out.response.trim().to_string())
    }
}

/// Assemble the system context for a question: categorization rules,
/// category definitions, and the most recent archived month.
pub fn build_context(
    rules: &RuleSet,
    categories: &CategoryList,
    archive: &TransactionArchive,
) -> Result<String> {
    let mut out = String::new();

    out.push_str("You are a personal finance assistant. Answer briefly and\n");
    out.push_str("only from the data below. Amounts are in USD.\n\n");

    out.push_str("CATEGORIES:\n");
    for name in categories.display_order() {
        out.push_str(&format!("  - {name}\n"));
    }

    out.push_str("\nCATEGORIZATION RULES (highest priority first):\n");
    for rule in rules.rules() {
        out.push_str(&format!(
            "  [{}] p{} \"{}\" -> {}\n",
            rule.rule_id, rule.priority, rule.vendor_pattern, rule.category
        ));
    }

    let months = archive.available_months()?;
    if let Some(latest) = months.last() {
        out.push_str(&format!("\nTRANSACTIONS ({latest}):\n"));
        for r in archive.load_month(latest)? {
            out.push_str(&format!(
                "  {} | {} | {} | ${:.2}\n",
                r.date,
                r.vendor,
                r.category,
                r.amount.abs()
            ));
        }
    } else {
        out.push_str("\nTRANSACTIONS: none archived yet.\n");
    }

    Ok(out)
}

/// Interactive question loop. `quit`/`exit` leaves, `compare` swaps the
/// archive context for a two-month comparison.
pub async fn run_ask_loop(
    client: &OllamaClient,
    rules: &RuleSet,
    categories: &CategoryList,
    archive: &TransactionArchive,
    metrics: &mut crate::metrics::RunMetrics,
) -> Result<()> {
    if !client.is_running().await {
        bail!(
            "Ollama is not reachable. Start it with `ollama serve` and pull a model\n\
             (e.g. `ollama pull {}`), then try again.",
            client.model()
        );
    }

    let models = client.list_models().await.unwrap_or_default();
    if !models.is_empty() && !models.iter().any(|m| m.starts_with(client.model())) {
        eprintln!(
            "Warning: model '{}' not found locally (available: {})",
            client.model(),
            models.join(", ")
        );
    }

    let context = build_context(rules, categories, archive)?;
    println!("Ask about your spending (quit to exit, compare for month-over-month):");

    loop {
        let question = crate::prompts::prompt("> ")?;
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("quit") || question.eq_ignore_ascii_case("exit") {
            break;
        }

        let prompt_text = if question.eq_ignore_ascii_case("compare") {
            let comparison = match archive.comparison_context(None, None) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("{e}");
                    continue;
                }
            };
            format!("{comparison}\nSummarize how spending changed month over month.")
        } else {
            format!("{context}\nQUESTION: {question}")
        };

        let started = std::time::Instant::now();
        match client.generate(&prompt_text).await {
            Ok(answer) => {
                println!("\n{answer}\n");
                metrics.record_llm(&question, started.elapsed().as_secs_f64(), &answer);
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    Ok(())
}
