//! Gmail delivery for the monthly report: OAuth refresh-token flow against
//! Google's token endpoint, then a hand-assembled MIME message through the
//! Gmail REST API. Credentials and the cached refresh token live under
//! `~/.spendscope`.

use anyhow::{bail, Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::home::ensure_spendscope_home;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailOAuthClient {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCache {
    pub refresh_token: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

fn oauth_client_path() -> Result<PathBuf> {
    Ok(ensure_spendscope_home()?.join("gmail_oauth.json"))
}

fn token_cache_path() -> Result<PathBuf> {
    Ok(ensure_spendscope_home()?.join("gmail_token.json"))
}

pub fn load_oauth_client() -> Result<GmailOAuthClient> {
    let p = oauth_client_path()?;
    if !p.exists() {
        bail!(
            "Missing Gmail OAuth credentials at {}.\n\
             Create a Desktop-app OAuth client at\n\
             https://console.cloud.google.com/apis/credentials, enable the\n\
             Gmail API, then save {{\"client_id\": ..., \"client_secret\": ...}}\n\
             to that path along with a refresh token in {}.",
            p.display(),
            token_cache_path()?.display()
        );
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

fn load_token_cache() -> Result<TokenCache> {
    let p = token_cache_path()?;
    if !p.exists() {
        bail!(
            "Missing Gmail token cache at {}. Complete the OAuth consent flow\n\
             once and store the refresh token there as\n\
             {{\"refresh_token\": \"...\"}}.",
            p.display()
        );
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

/// Exchange the cached refresh token for a fresh access token.
async fn refresh_access_token(client: &GmailOAuthClient, cache: &TokenCache) -> Result<String> {
    #[derive(Deserialize)]
    struct TokenResponse {
        access_token: String,
    }

    let params = [
        ("client_id", client.client_id.as_str()),
        ("client_secret", client.client_secret.as_str()),
        ("refresh_token", cache.refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];

    let resp = reqwest::Client::new()
        .post("https://oauth2.googleapis.com/token")
        .form(&params)
        .send()
        .await
        .context("token refresh request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("token refresh failed: {status} {txt}");
    }

    let token: TokenResponse = resp.json().await.context("parse token response")?;
    Ok(token.access_token)
}

/// Build a multipart/mixed MIME message with an HTML body and one xlsx
/// attachment, ready for base64url wrapping.
pub fn build_mime(
    from: &str,
    to: &str,
    subject: &str,
    html_body: &str,
    attachment_name: &str,
    attachment: &[u8],
) -> String {
    let boundary = "spendscope_report_boundary";
    let encoded = base64::engine::general_purpose::STANDARD.encode(attachment);

    // RFC 2045 wants encoded lines under 76 chars
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / 76 + 2);
    for chunk in encoded.as_bytes().chunks(76) {
        wrapped.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        wrapped.push_str("\r\n");
    }

    format!(
        "From: {from}\r\n\
         To: {to}\r\n\
         Subject: {subject}\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\
         \r\n\
         --{boundary}\r\n\
         Content-Type: text/html; charset=\"utf-8\"\r\n\
         \r\n\
         {html_body}\r\n\
         --{boundary}\r\n\
         Content-Type: application/vnd.openxmlformats-officedocument.spreadsheetml.sheet\r\n\
         Content-Disposition: attachment; filename=\"{attachment_name}\"\r\n\
         Content-Transfer-Encoding: base64\r\n\
         \r\n\
         {wrapped}\
         --{boundary}--\r\n"
    )
}

/// Send the report workbook by email. The caller treats failure as
/// non-fatal; the workbook is already on disk either way.
pub async fn send_report(
    from: &str,
    to: &str,
    subject: &str,
    html_body: &str,
    workbook_path: &Path,
) -> Result<()> {
    if from.is_empty() || to.is_empty() {
        bail!(
            "Email addresses not configured. Set [email] from/to in {}.",
            crate::config::config_path()?.display()
        );
    }

    let client = load_oauth_client()?;
    let cache = load_token_cache()?;
    let access_token = refresh_access_token(&client, &cache).await?;

    let attachment = fs::read(workbook_path)
        .with_context(|| format!("read {}", workbook_path.display()))?;
    let name = workbook_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Spending_Report.xlsx".to_string());

    let mime = build_mime(from, to, subject, html_body, &name, &attachment);
    let raw = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(mime.as_bytes());

    #[derive(Serialize)]
    struct SendRequest {
        raw: String,
    }

    let resp = reqwest::Client::new()
        .post("https://gmail.googleapis.com/gmail/v1/users/me/messages/send")
        .bearer_auth(&access_token)
        .json(&SendRequest { raw })
        .send()
        .await
        .context("gmail send request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("gmail send failed: {status} {txt}");
    }

    println!("Report emailed to {to}");
    Ok(())
}
