//! Server-side HTML for the dashboard pages. Every string that comes from the
//! user or the API goes through [`escape`].

use na_core::{AnalysisResult, Article, Category, Entity};
use url::Url;

use crate::client::ClientError;
use crate::session::FeedState;

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; background: #fafafa; color: #2d3436; }
nav { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); padding: 1rem 2rem; }
nav a { color: white; font-weight: 600; margin-right: 1.5rem; text-decoration: none; }
main { max-width: 960px; margin: 0 auto; padding: 2rem 1rem; }
h1 { color: #667eea; font-weight: 800; }
textarea { width: 100%; height: 240px; border-radius: 8px; border: 2px solid #e0e0e0; padding: 0.5rem; }
button { border-radius: 8px; padding: 0.6rem 1.2rem; background-color: #4CAF50; color: white; font-weight: 600; border: none; cursor: pointer; }
button:hover { background-color: #45a049; }
.banner { padding: 0.8rem 1rem; border-radius: 8px; margin: 1rem 0; }
.banner-success { background: #d4edda; color: #155724; }
.banner-warning { background: #fff3cd; color: #856404; }
.banner-error { background: #f8d7da; color: #721c24; }
.banner pre { white-space: pre-wrap; background: white; padding: 0.5rem; border-radius: 4px; }
.stats { display: flex; gap: 1rem; }
.stats-box { flex: 1; background: linear-gradient(135deg, #ffeaa7 0%, #fdcb6e 100%); padding: 1rem; border-radius: 10px; text-align: center; }
.stats-box h2 { margin: 0; }
.stats-box p { margin: 0.3rem 0 0 0; color: #636e72; font-size: 0.9em; }
.metric-card { background: linear-gradient(135deg, #4facfe 0%, #00f2fe 100%); padding: 1.5rem; border-radius: 10px; text-align: center; color: white; margin: 1rem 0; }
.confidence-bar { background: #e0e0e0; border-radius: 10px; overflow: hidden; height: 25px; margin: 0.5rem 0; }
.confidence-fill { background: linear-gradient(90deg, #667eea, #764ba2); height: 100%; color: white; font-weight: 600; font-size: 0.9em; white-space: nowrap; padding-left: 0.5rem; }
.prob-row { display: flex; align-items: center; gap: 0.5rem; }
.prob-row span { width: 6rem; }
.prob-row .confidence-bar { flex: 1; }
.summary { background-color: #f8f9fa; padding: 1.5rem; border-radius: 10px; border-left: 4px solid #667eea; line-height: 1.6; }
.entity-badge { color: white; padding: 0.3rem 0.8rem; border-radius: 20px; display: inline-block; margin: 0.2rem; font-size: 0.9em; }
.per-badge { background-color: #ee5a6f; }
.org-badge { background-color: #4ecdc4; }
.loc-badge { background-color: #95e1d3; }
.misc-badge { background-color: #f38181; }
.article-card { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); padding: 1.5rem; border-radius: 12px; margin: 1rem 0; color: white; }
.article-card h3 { margin: 0; }
.article-card a { color: white; }
.analysis { background: linear-gradient(135deg, #a8edea 0%, #fed6e3 100%); padding: 1.5rem; border-radius: 12px; margin: 1rem 0; }
.empty { text-align: center; padding: 3rem; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); border-radius: 15px; color: white; }
.toolbar form { display: inline-block; margin-right: 0.5rem; }
"#;

/// Message shown above the page content.
#[derive(Debug, Clone, PartialEq)]
pub enum Banner {
    Success(String),
    Warning(String),
    Error { message: String, raw: Option<String> },
}

impl From<&ClientError> for Banner {
    fn from(error: &ClientError) -> Self {
        Banner::Error {
            message: error.to_string(),
            raw: error.raw_body().map(str::to_string),
        }
    }
}

impl From<ClientError> for Banner {
    fn from(error: ClientError) -> Self {
        Banner::from(&error)
    }
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn badge_class(group: &str) -> &'static str {
    match group {
        "PER" => "per-badge",
        "ORG" => "org-badge",
        "LOC" => "loc-badge",
        _ => "misc-badge",
    }
}

/// Entity words bucketed by group, groups in order of first appearance.
pub fn group_entities(entities: &[Entity]) -> Vec<(&str, Vec<&str>)> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for entity in entities {
        let group = entity.entity_group.as_str();
        match groups.iter_mut().find(|(name, _)| *name == group) {
            Some((_, words)) => words.push(&entity.word),
            None => groups.push((group, vec![&entity.word])),
        }
    }
    groups
}

/// Whether `link` may become an anchor: absolute http(s) urls only.
pub fn is_safe_link(link: &str) -> bool {
    Url::parse(link.trim())
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn page(title: &str, banners: &[Banner], body: &str) -> String {
    let mut html = String::new();
    html.push_str(&format!("<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{} · News Analysis Dashboard</title><style>{}</style></head><body>\
         <nav><a href=\"/\">📝 Analyze Article</a><a href=\"/feed\">📡 Live Feed</a></nav><main>\
         <h1>🧠 News Analysis Dashboard</h1>",
        escape(title),
        STYLE
    ));
    for banner in banners {
        render_banner(&mut html, banner);
    }
    html.push_str(body);
    html.push_str("</main></body></html>");
    html
}

fn render_banner(html: &mut String, banner: &Banner) {
    match banner {
        Banner::Success(message) => {
            html.push_str(&format!("<div class=\"banner banner-success\">✅ {}</div>", escape(message)));
        }
        Banner::Warning(message) => {
            html.push_str(&format!("<div class=\"banner banner-warning\">⚠️ {}</div>", escape(message)));
        }
        Banner::Error { message, raw } => {
            html.push_str(&format!("<div class=\"banner banner-error\">❌ {}", escape(message)));
            if let Some(raw) = raw {
                html.push_str(&format!("<pre>{}</pre>", escape(raw)));
            }
            html.push_str("</div>");
        }
    }
}

fn render_probabilities(html: &mut String, probs: &[f64; Category::COUNT]) {
    html.push_str("<h4>📊 Probability Distribution</h4>");
    for (category, prob) in Category::ALL.iter().zip(probs) {
        let pct = (prob * 100.0).clamp(0.0, 100.0);
        html.push_str(&format!("<div class=\"prob-row\"><span>{}</span><div class=\"confidence-bar\">\
             <div class=\"confidence-fill\" style=\"width: {:.1}%\">{:.1}%</div></div></div>",
            escape(category.label()),
            pct,
            pct
        ));
    }
}

fn render_entities(html: &mut String, entities: &[Entity]) {
    if entities.is_empty() {
        html.push_str("<p>ℹ️ No entities found.</p>");
        return;
    }
    for (group, words) in group_entities(entities) {
        let class = badge_class(group);
        html.push_str(&format!("<div class=\"entity-group\"><strong>{}:</strong> ", escape(group)));
        for word in words {
            html.push_str(&format!("<span class=\"entity-badge {}\">{}</span> ", class, escape(word)));
        }
        html.push_str("</div>");
    }
}

fn render_prediction(html: &mut String, result: &AnalysisResult) {
    let confidence = result.prediction.confidence() * 100.0;
    html.push_str(&format!("<div class=\"metric-card\"><h2>{}</h2><p>Primary Category</p>\
         <div class=\"confidence-bar\"><div class=\"confidence-fill\" style=\"width: {:.1}%\">\
         {:.1}% Confidence</div></div></div>",
        escape(&result.prediction.label),
        confidence.clamp(0.0, 100.0),
        confidence
    ));
    render_probabilities(html, &result.prediction.probs);
}

/// Full analysis block: stats, category, distribution, summary and entities.
pub fn analysis(text: &str, result: &AnalysisResult) -> String {
    let mut html = String::new();
    let stats = [
        (text.split_whitespace().count(), "Words Analyzed"),
        (result.entities.len(), "Entities Found"),
        (result.summary.split_whitespace().count(), "Summary Words"),
    ];
    html.push_str("<div class=\"stats\">");
    for (value, label) in stats {
        html.push_str(&format!("<div class=\"stats-box\"><h2>{}</h2><p>{}</p></div>", value, label));
    }
    html.push_str("</div><h3>🎯 Category Prediction</h3>");
    render_prediction(&mut html, result);
    html.push_str(&format!("<h3>📋 AI-Generated Summary</h3><div class=\"summary\">{}</div>",
        escape(&result.summary)
    ));
    html.push_str("<h3>🏷️ Named Entity Recognition</h3>");
    render_entities(&mut html, &result.entities);
    html
}

pub fn analyze_page(text: &str, result: Option<&AnalysisResult>, banners: &[Banner]) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h3>📄 Paste article text for analysis</h3>\
         <form method=\"post\" action=\"/analyze\">\
         <textarea name=\"text\" placeholder=\"Paste your article text here...\">{}</textarea>\
         <p><button type=\"submit\">🔍 Analyze Article</button></p></form>",
        escape(text)
    ));
    if let Some(result) = result {
        body.push_str("<hr>");
        body.push_str(&analysis(text, result));
    }
    page("Analyze", banners, &body)
}

fn render_article(html: &mut String, index: usize, article: &Article, result: Option<&AnalysisResult>) {
    let title = if article.title.trim().is_empty() {
        format!("Article {}", index + 1)
    } else {
        article.title.clone()
    };
    html.push_str(&format!("<div class=\"article-card\" id=\"article-{}\"><h3>📄 {}</h3><p>📰 <strong>{}</strong> • {} words</p>",
        index,
        escape(&title),
        escape(&article.source),
        article.word_count()
    ));
    if is_safe_link(&article.link) {
        html.push_str(&format!("<p><a href=\"{}\" target=\"_blank\" rel=\"noopener\">🔗 Read full article</a></p>",
            escape(article.link.trim())
        ));
    }
    html.push_str("</div>");
    if !article.summary.is_empty() {
        html.push_str(&format!("<div class=\"summary\">{}</div>", escape(&article.summary)));
    }
    html.push_str(&format!("<form method=\"post\" action=\"/feed/{}/analyze\"><p><button type=\"submit\">🔍 Analyze Article #{}</button></p></form>",
        index,
        index + 1
    ));
    if let Some(result) = result {
        html.push_str("<div class=\"analysis\">");
        render_prediction(html, result);
        html.push_str(&format!("<h3>📋 Summary</h3><div class=\"summary\">{}</div>", escape(&result.summary)));
        html.push_str("<h3>🏷️ Entities</h3>");
        render_entities(html, &result.entities);
        html.push_str("</div>");
    }
    html.push_str("<hr>");
}

pub fn feed_page(feed: &FeedState, banners: &[Banner]) -> String {
    let mut body = String::from(
        "<h3>📡 Live News Feed</h3><div class=\"toolbar\">\
         <form method=\"post\" action=\"/feed/fetch\"><button type=\"submit\">🔄 Fetch Articles</button></form>\
         <form method=\"post\" action=\"/feed/clear\"><button type=\"submit\">🧹 Clear</button></form></div><hr>",
    );

    if feed.articles.is_empty() {
        body.push_str(
            "<div class=\"empty\"><h2>📰 No Articles Loaded</h2>\
             <p>Click 'Fetch Articles' above to load the latest news</p></div>",
        );
    } else {
        body.push_str(&format!("<p><strong>📊 {} Articles Ready for Analysis</strong></p>",
            feed.articles.len()
        ));
        for (index, article) in feed.articles.iter().enumerate() {
            render_article(&mut body, index, article, feed.results.get(&index));
        }
    }
    page("Live Feed", banners, &body)
}
