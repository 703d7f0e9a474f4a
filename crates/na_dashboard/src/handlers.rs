use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use thiserror::Error;
use tower_sessions::Session;
use tracing::{error, info, warn};

use crate::render::{self, Banner};
use crate::session::{load_feed, save_feed, FeedState};
use crate::DashboardState;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeForm {
    #[serde(default)]
    pub text: String,
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Session storage failed: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        error!("❌ {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

type PageResult = Result<Html<String>, DashboardError>;

fn feed_page(feed: &FeedState, banners: &[Banner]) -> PageResult {
    Ok(Html(render::feed_page(feed, banners)))
}

pub async fn index() -> Html<String> {
    Html(render::analyze_page("", None, &[]))
}

pub async fn analyze(
    State(state): State<Arc<DashboardState>>,
    Form(form): Form<AnalyzeForm>,
) -> Html<String> {
    if form.text.trim().is_empty() {
        let banner = Banner::Warning("Please paste some text".to_string());
        return Html(render::analyze_page(&form.text, None, &[banner]));
    }

    let page = match state.api.analyze(&form.text).await {
        Ok(result) => render::analyze_page(&form.text, Some(&result), &[]),
        Err(e) => {
            warn!("⚠️ Analysis request failed: {}", e);
            render::analyze_page(&form.text, None, &[Banner::from(e)])
        }
    };
    Html(page)
}

pub async fn feed(session: Session) -> PageResult {
    feed_page(&load_feed(&session).await?, &[])
}

pub async fn fetch_feed(State(state): State<Arc<DashboardState>>, session: Session) -> PageResult {
    let fetched = state.api.fetch_sample().await;
    // Build on what is stored now, not on what this request saw first.
    let mut feed = state.sessions.current_feed(session.id());
    let banner = match fetched {
        Ok(articles) => {
            info!("📥 Fetched {} articles", articles.len());
            let count = articles.len();
            feed.replace_articles(articles);
            save_feed(&session, &feed).await?;
            Banner::Success(format!("Fetched {} articles", count))
        }
        Err(e) => {
            warn!("⚠️ Feed fetch failed: {}", e);
            Banner::from(e)
        }
    };
    feed_page(&feed, &[banner])
}

pub async fn analyze_article(
    State(state): State<Arc<DashboardState>>,
    session: Session,
    Path(index): Path<usize>,
) -> PageResult {
    let feed = load_feed(&session).await?;
    let Some(article) = feed.article(index).cloned() else {
        let banner = Banner::Warning(format!("Article #{} is not loaded", index + 1));
        return feed_page(&feed, &[banner]);
    };
    let generation = feed.generation;

    let outcome = state.api.analyze(article.body()).await;

    // The list may have been refetched or cleared while the API was busy.
    let mut feed = state.sessions.current_feed(session.id());
    let banners = if feed.generation != generation {
        info!("🧹 Dropping analysis of article #{}: the feed changed meanwhile", index + 1);
        vec![Banner::Warning(format!(
            "The feed changed while article #{} was being analyzed; the result was discarded",
            index + 1
        ))]
    } else {
        feed.forget_result(generation, index);
        match outcome {
            Ok(result) => {
                feed.store_result(generation, index, result);
                Vec::new()
            }
            Err(e) => {
                warn!("⚠️ Analysis of article #{} failed: {}", index + 1, e);
                vec![Banner::from(e)]
            }
        }
    };
    save_feed(&session, &feed).await?;
    feed_page(&feed, &banners)
}

pub async fn clear_feed(session: Session) -> PageResult {
    let mut feed = load_feed(&session).await?;
    feed.clear();
    save_feed(&session, &feed).await?;
    feed_page(&feed, &[])
}
