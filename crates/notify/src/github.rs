//! GitHub repository-dispatch trigger.

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    tracing::info,
    ytrelay_config::GithubConfig,
};

use crate::{
    Error, Result,
    entry::Entry,
    error::Context,
    trigger::{DispatchRequest, WorkflowTrigger},
};

const USER_AGENT: &str = concat!("ytrelay/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// Fires `repository_dispatch` on the configured repository.
pub struct GithubDispatcher {
    client: reqwest::Client,
    token: Secret<String>,
    api_base_url: String,
    repo_owner: String,
    repo_name: String,
    event_type: String,
    environment: String,
}

impl GithubDispatcher {
    pub fn from_config(config: &GithubConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .context("building GitHub client")?;
        Ok(Self {
            client,
            token: config.token.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            repo_owner: config.repo_owner.clone(),
            repo_name: config.repo_name.clone(),
            event_type: config.event_type.clone(),
            environment: config.environment.clone(),
        })
    }

    fn dispatch_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/dispatches",
            self.api_base_url, self.repo_owner, self.repo_name
        )
    }
}

#[async_trait]
impl WorkflowTrigger for GithubDispatcher {
    fn is_configured(&self) -> bool {
        !self.token.expose_secret().is_empty()
            && !self.repo_owner.is_empty()
            && !self.repo_name.is_empty()
    }

    async fn trigger(&self, entry: &Entry) -> Result<()> {
        let body = DispatchRequest::new(&self.event_type, &self.environment, entry);
        let resp = self
            .client
            .post(self.dispatch_url())
            .bearer_auth(self.token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&body)
            .send()
            .await
            .context("sending repository dispatch")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::downstream(format!(
                "repository dispatch returned {status}: {}",
                text.trim()
            )));
        }

        info!(
            video_id = %entry.video_id,
            repo = %format!("{}/{}", self.repo_owner, self.repo_name),
            event_type = %self.event_type,
            "workflow triggered"
        );
        Ok(())
    }
}
