//! `POST /webhook`: authenticate a forge push event and launch a pipeline.
//!
//! The response is written as soon as the clone finishes and the pipeline
//! task is spawned; stage progress is only observable through `/status` and
//! the logs.

use crate::http::router::Handler;
use crate::http::{status_text, HttpContext};
use crate::responses::respond_json;
use async_trait::async_trait;
use goflow_core::config::{PipelineConfig, RepositoryConfig};
use goflow_core::git;
use goflow_core::pipeline::Pipeline;
use goflow_core::status::{pipeline_id, PipelineState, StatusRegistry};
use goflow_core::webhook::{
    github, gitlab, Forge, PushEvent, X_GITHUB_EVENT, X_GITLAB_EVENT, X_GITLAB_TOKEN,
    X_HUB_SIGNATURE,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Handler for forge push webhooks.
pub struct WebhookHandler {
    config: Arc<PipelineConfig>,
    registry: Arc<StatusRegistry>,
}

impl WebhookHandler {
    pub fn new(config: Arc<PipelineConfig>, registry: Arc<StatusRegistry>) -> Self {
        Self { config, registry }
    }

    async fn handle_github(&self, ctx: &mut HttpContext) {
        if ctx.request.header(X_GITHUB_EVENT) != Some(github::PUSH_EVENT) {
            respond_json(
                ctx,
                400,
                json!({
                    "error": "Only push events supported",
                    "message": status_text(400),
                }),
            );
            return;
        }

        let Some(signature) = ctx.request.header(X_HUB_SIGNATURE).map(String::from) else {
            unauthorized(ctx, "Invalid signature");
            return;
        };
        let Some(repo) =
            github::match_repository(&self.config, &signature, &ctx.request.body).cloned()
        else {
            debug!("webhook signature matched no configured repository");
            unauthorized(ctx, "Invalid signature");
            return;
        };

        let event = match github::parse_push(&ctx.request.body) {
            Ok(event) => event,
            Err(err) => {
                invalid_payload(ctx, err);
                return;
            }
        };

        self.launch(ctx, &repo, event).await;
    }

    async fn handle_gitlab(&self, ctx: &mut HttpContext) {
        if ctx.request.header(X_GITLAB_EVENT) != Some(gitlab::PUSH_HOOK) {
            respond_json(
                ctx,
                400,
                json!({
                    "error": "Only push events supported",
                    "message": status_text(400),
                }),
            );
            return;
        }

        let Some(token) = ctx.request.header(X_GITLAB_TOKEN).map(String::from) else {
            unauthorized(ctx, "Invalid token");
            return;
        };
        let Some(repo) = gitlab::match_repository(&self.config, &token).cloned() else {
            debug!("webhook token matched no configured repository");
            unauthorized(ctx, "Invalid token");
            return;
        };

        let event = match gitlab::parse_push(&ctx.request.body) {
            Ok(event) => event,
            Err(err) => {
                invalid_payload(ctx, err);
                return;
            }
        };

        self.launch(ctx, &repo, event).await;
    }

    /// Branch-filter, clone, register, spawn. Common tail of both forges.
    async fn launch(&self, ctx: &mut HttpContext, repo: &RepositoryConfig, event: PushEvent) {
        if !event.targets_branch(&repo.branch) {
            info!(
                git_ref = %event.git_ref,
                branch = %repo.branch,
                "push to non-configured branch ignored"
            );
            respond_json(
                ctx,
                200,
                json!({
                    "error": "Ignored (wrong branch)",
                    "message": status_text(200),
                }),
            );
            return;
        }

        let id = pipeline_id(&repo.url, &event.git_ref);
        let workspace = match git::clone_repository(&repo.url, &repo.branch).await {
            Ok(workspace) => workspace,
            Err(err) => {
                error!(%err, url = %repo.url, "clone failed");
                respond_json(
                    ctx,
                    500,
                    json!({
                        "error": format!("Clone failed: {}", err),
                        "message": status_text(500),
                    }),
                );
                return;
            }
        };

        self.registry.record(&id, PipelineState::Running, "");
        let config = self.config.clone();
        let registry = self.registry.clone();
        let task_id = id.clone();
        tokio::spawn(async move {
            match Pipeline::new(config, workspace).run().await {
                Ok(()) => registry.record(&task_id, PipelineState::Success, ""),
                Err(err) => {
                    error!(pipeline = %task_id, %err, "pipeline failed");
                    registry.record(&task_id, PipelineState::Failed, &err.to_string());
                }
            }
        });

        info!(pipeline = %id, "pipeline started");
        respond_json(
            ctx,
            200,
            json!({
                "message": format!("Pipeline {} started", id),
            }),
        );
    }
}

#[async_trait]
impl Handler for WebhookHandler {
    async fn handle(&self, ctx: &mut HttpContext) {
        let forge = Forge::detect(
            ctx.request.header(X_GITHUB_EVENT),
            ctx.request.header(X_GITLAB_EVENT),
        );
        match forge {
            Some(Forge::Github) => self.handle_github(ctx).await,
            Some(Forge::Gitlab) => self.handle_gitlab(ctx).await,
            None => {
                respond_json(
                    ctx,
                    400,
                    json!({
                        "error": "unsupported git provider",
                        "message": status_text(400),
                    }),
                );
            }
        }
    }
}

fn unauthorized(ctx: &mut HttpContext, message: &str) {
    respond_json(
        ctx,
        401,
        json!({
            "error": message,
            "message": "Unauthorized",
        }),
    );
}

fn invalid_payload(ctx: &mut HttpContext, err: goflow_core::webhook::WebhookError) {
    debug!(%err, "webhook payload rejected");
    respond_json(
        ctx,
        400,
        json!({
            "error": "Invalid payload",
            "message": status_text(400),
        }),
    );
}

#[cfg(test)]
#[path = "webhook_handler_tests.rs"]
mod tests;
