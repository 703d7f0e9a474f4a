use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};
use na_core::SummaryBounds;
use na_dashboard::DEFAULT_API_URL;
use na_feeds::{FeedConfig, FeedSource};
use na_inference::{
    Backend, InferenceConfig, DEFAULT_CLASSIFIER_MODEL, DEFAULT_MODEL_URL, DEFAULT_NER_MODEL,
    DEFAULT_SUMMARIZER_MODEL,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "News classification, summarization and entity extraction", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub inference: InferenceArgs,
    #[command(subcommand)]
    pub command: Commands,
}

/// Model selection, shared by every subcommand that runs inference.
#[derive(Args, Debug, Clone)]
pub struct InferenceArgs {
    #[arg(long, global = true, value_enum, env = "NA_BACKEND", default_value = "hub")]
    pub backend: Backend,
    #[arg(long, global = true, env = "NA_MODEL_URL", default_value = DEFAULT_MODEL_URL)]
    pub model_url: String,
    #[arg(long, global = true, env = "HF_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,
    #[arg(long, global = true, env = "NA_CLASSIFIER_MODEL", default_value = DEFAULT_CLASSIFIER_MODEL)]
    pub classifier_model: String,
    #[arg(long, global = true, default_value = DEFAULT_SUMMARIZER_MODEL)]
    pub summarizer_model: String,
    #[arg(long, global = true, default_value = DEFAULT_NER_MODEL)]
    pub ner_model: String,
    /// Minimum summary length in model tokens
    #[arg(long, global = true, default_value_t = 20)]
    pub summary_min: usize,
    /// Maximum summary length in model tokens; the summary is also capped at this many words
    #[arg(long, global = true, default_value_t = 60)]
    pub summary_max: usize,
    /// Characters of input handed to the summarizer
    #[arg(long, global = true, default_value_t = 4000)]
    pub summary_char_budget: usize,
    /// Tokens of input handed to the classifier
    #[arg(long, global = true, default_value_t = 512)]
    pub max_tokens: usize,
}

impl From<InferenceArgs> for InferenceConfig {
    fn from(args: InferenceArgs) -> Self {
        InferenceConfig {
            backend: args.backend,
            model_url: args.model_url,
            api_token: args.api_token.filter(|t| !t.trim().is_empty()),
            classifier_model: args.classifier_model,
            summarizer_model: args.summarizer_model,
            ner_model: args.ner_model,
            max_tokens: args.max_tokens,
            summary: SummaryBounds {
                min_length: args.summary_min,
                max_length: args.summary_max,
            },
            summary_char_budget: args.summary_char_budget,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FeedArgs {
    /// Feed to sample, as Name=url or a bare url. Repeatable; replaces the default sources.
    #[arg(long = "source")]
    pub sources: Vec<FeedSource>,
    /// Entries taken from the top of each feed
    #[arg(long, default_value_t = 3)]
    pub per_source: usize,
}

impl From<FeedArgs> for FeedConfig {
    fn from(args: FeedArgs) -> Self {
        let defaults = FeedConfig::default();
        FeedConfig {
            sources: if args.sources.is_empty() {
                defaults.sources.clone()
            } else {
                args.sources
            },
            per_source: args.per_source,
            ..defaults
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the JSON analysis API
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
        #[command(flatten)]
        feeds: FeedArgs,
    },
    /// Run the HTML dashboard against a running API
    Dashboard {
        #[arg(long, default_value = "0.0.0.0:8501")]
        bind: SocketAddr,
        #[arg(long, env = "API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,
    },
    /// Classify text and print the prediction as JSON
    Predict {
        /// Text to classify. Read from stdin when omitted.
        text: Option<String>,
    },
    /// Classify, summarize and extract entities, printing the result as JSON
    Analyze {
        /// Text to analyze. Read from stdin when omitted.
        text: Option<String>,
    },
    /// Sample the configured feeds and print the articles as JSON
    Feeds {
        #[command(flatten)]
        feeds: FeedArgs,
        /// Replace each article's text with the paragraphs of its linked page
        #[arg(long)]
        full_text: bool,
    },
}
