use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use commupath_models::{Category, Difficulty};

#[derive(Parser, Debug)]
#[command(name = "commupath", version, about = "CommuPath: community impact quests from the terminal")]
pub struct Cli {
    /// Base URL of the CommuPath API.
    #[arg(long, global = true, env = "COMMUPATH_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Credentials file (defaults to the user data directory).
    #[arg(long, global = true, env = "COMMUPATH_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, global = true, default_value_t = 60)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and sign in.
    Register {
        username: String,
        email: String,
        #[arg(long, env = "COMMUPATH_PASSWORD")]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },

    Login {
        username: String,
        #[arg(long, env = "COMMUPATH_PASSWORD")]
        password: String,
    },

    Logout,

    /// Show the signed-in profile.
    Whoami,

    /// List quests.
    Quests {
        #[command(subcommand)]
        view: QuestView,
    },

    /// Ask the quest architect for a new quest near a location.
    Generate {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(long)]
        category: Category,
        #[arg(long)]
        preferences: Option<String>,
        /// Post the quest to the community board instead of keeping it.
        #[arg(long)]
        public: bool,
    },

    /// Mark an assigned quest as in progress.
    Start { quest_id: String },

    /// Claim a quest from the community board.
    Claim { quest_id: String },

    /// Publish a quest you created, or take it back with `--private`.
    Publish {
        quest_id: String,
        #[arg(long)]
        private: bool,
    },

    /// Submit a photo as proof of completion.
    Submit {
        quest_id: String,
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },

    /// Proof submissions for a quest.
    Submissions { quest_id: String },

    Leaderboard {
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Check the API is reachable.
    Health,

    Version,
}

#[derive(Subcommand, Debug)]
pub enum QuestView {
    /// Quests assigned to you.
    My,
    /// Every quest, as shown on the map.
    All(FilterArgs),
    /// Unclaimed public quests.
    Community(FilterArgs),
    /// Quests you generated.
    Created,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct FilterArgs {
    #[arg(long)]
    pub category: Option<Category>,
    #[arg(long)]
    pub difficulty: Option<Difficulty>,
}
