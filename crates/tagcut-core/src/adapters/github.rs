use super::ReleaseHost;
use crate::errors::{Result, TagcutError};
use crate::types::ArtifactSet;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

const API_VERSION: &str = "2022-11-28";

#[derive(Serialize)]
struct CreateRelease<'a> {
    tag_name: &'a str,
    name: &'a str,
    body: &'a str,
    draft: bool,
    prerelease: bool,
}

#[derive(Deserialize)]
struct ReleaseResponse {
    html_url: String,
    upload_url: String,
}

/// Publishes releases through the GitHub REST API.
pub struct GitHubReleases {
    api_url: String,
    slug: String,
    token: String,
    dry_run: bool,
}

impl GitHubReleases {
    pub fn new(api_url: &str, slug: &str, token: &str, dry_run: bool) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            slug: slug.to_string(),
            token: token.to_string(),
            dry_run,
        }
    }

    fn releases_url(&self) -> String {
        format!("{}/repos/{}/releases", self.api_url, self.slug)
    }

    fn client(&self) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(crate::USER_AGENT)
            .build()
            .map_err(|e| TagcutError::Upload(format!("failed to build HTTP client for GitHub: {e}")))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn create_release(&self, client: &Client, tag: &str, body: &str) -> Result<ReleaseResponse> {
        let payload = CreateRelease {
            tag_name: tag,
            name: tag,
            body,
            draft: false,
            prerelease: false,
        };
        let response = self
            .authorized(client.post(self.releases_url()))
            .json(&payload)
            .send()?;
        let response = ensure_success(response, &format!("create release {tag} in {}", self.slug))?;
        Ok(response.json()?)
    }

    fn upload_asset(&self, client: &Client, upload_url: &str, path: &Path) -> Result<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TagcutError::Upload(format!("{} has no file name", path.display())))?;
        let content = std::fs::read(path)
            .map_err(|e| crate::errors::io_error_with_path(e, path))?;

        debug!(asset = %name, bytes = content.len(), "uploading release asset");
        let response = self
            .authorized(client.post(upload_url))
            .query(&[("name", name.as_str())])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(content)
            .send()?;
        ensure_success(response, &format!("upload {name}"))?;
        Ok(())
    }
}

impl ReleaseHost for GitHubReleases {
    fn publish_release(&self, tag: &str, body: &str, artifacts: &ArtifactSet) -> Result<()> {
        if self.dry_run {
            println!("{}", dry_run_message(&self.slug, tag, artifacts));
            return Ok(());
        }

        let client = self.client()?;
        let release = self.create_release(&client, tag, body)?;
        let upload_url = asset_upload_url(&release.upload_url);
        for path in artifacts.iter() {
            self.upload_asset(&client, upload_url, path)?;
        }

        info!(url = %release.html_url, assets = artifacts.len(), "GitHub release published");
        println!("Created GitHub release {}", release.html_url);
        Ok(())
    }
}

/// `upload_url` comes back as a URI template (`.../assets{?name,label}`).
fn asset_upload_url(template: &str) -> &str {
    template
        .split_once('{')
        .map_or(template, |(base, _)| base)
}

fn dry_run_message(slug: &str, tag: &str, artifacts: &ArtifactSet) -> String {
    let names = artifacts
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Dry run. Would have created GitHub release {tag} in {slug} with assets: {names}")
}

fn ensure_success(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let snippet: String = body.trim().chars().take(300).collect();
    let snippet = snippet.split_whitespace().collect::<Vec<_>>().join(" ");
    let body_part = if snippet.is_empty() {
        String::new()
    } else {
        format!(" body=\"{snippet}\"")
    };
    Err(TagcutError::Upload(format!(
        "GitHub returned {status} when trying to {action}{body_part}"
    )))
}
