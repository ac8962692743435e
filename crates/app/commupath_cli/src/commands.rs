use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use commupath_client::generation::GenerationOutcome;
use commupath_client::notify::{Notification, NotificationKind};
use commupath_client::pages::PageState;
use commupath_client::proof::ProofOutcome;
use commupath_client::{
    AppContext, ClientConfig, CredentialStore, FileStorage, MemoryStorage, ProofImage,
};
use commupath_models::{Coordinates, Quest, QuestFilter, QuestRequest};

use crate::cli::{Cli, Commands, FilterArgs, QuestView};
use crate::{Error, Result};

pub async fn execute(args: Cli) -> Result<()> {
    let ctx = context(&args)?;
    let result = dispatch(&ctx, args.command).await;
    report(ctx.notifier.drain());
    result
}

fn context(args: &Cli) -> Result<AppContext> {
    let store: Arc<dyn CredentialStore> = match &args.credentials {
        Some(path) => Arc::new(FileStorage::new(path)),
        None => match FileStorage::default_location() {
            Some(store) => Arc::new(store),
            None => {
                log::warn!("no data directory found, credentials will not be saved");
                Arc::new(MemoryStorage::new())
            }
        },
    };
    let config = ClientConfig {
        api_url: args.api_url.clone(),
        timeout: Duration::from_secs(args.timeout),
    };
    Ok(AppContext::new(config, store)?)
}

/// Errors are returned to `main`; everything else is logged.
fn report(notifications: Vec<Notification>) {
    for n in notifications {
        match n.kind {
            NotificationKind::Success | NotificationKind::Info => log::info!("{}", n.message),
            NotificationKind::Warning => log::warn!("{}", n.message),
            NotificationKind::Error => {}
        }
    }
}

async fn dispatch(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Register {
            username,
            email,
            password,
            full_name,
        } => {
            let user = ctx
                .session
                .register(&username, &email, &password, full_name.as_deref())
                .await?;
            println!("Registered and signed in as {}", user.username);
        }
        Commands::Login { username, password } => {
            let user = ctx.session.login(&username, &password).await?;
            println!("Signed in as {} ({})", user.display_name(), user.impact_level);
        }
        Commands::Logout => {
            ctx.session.logout();
            println!("Signed out");
        }
        Commands::Whoami => match ctx.session.refresh_user().await? {
            Some(user) => {
                println!("{} <{}>", user.display_name(), user.email);
                println!("  level:     {}", user.impact_level);
                println!("  points:    {}", user.points);
                println!("  completed: {}", user.completed_quests);
            }
            None => return Err(Error::Custom("Not signed in".into())),
        },
        Commands::Quests { view } => list_quests(ctx, view).await?,
        Commands::Generate {
            lat,
            lng,
            category,
            preferences,
            public,
        } => {
            let req = QuestRequest {
                coordinates: Coordinates::new(lat, lng),
                resolution_category: category,
                user_preferences: preferences,
                make_public: public,
            };
            match ctx.generation.generate(req).await {
                GenerationOutcome::Generated(quest) => print_quest(&quest, true),
                GenerationOutcome::Failed(e) => return Err(e.into()),
                GenerationOutcome::Ignored => {
                    return Err(Error::Custom("A quest is already being generated".into()));
                }
            }
        }
        Commands::Start { quest_id } => {
            let quest = ctx.quest_hub().start(&quest_id).await?;
            print_quest(&quest, false);
        }
        Commands::Claim { quest_id } => {
            let quest = ctx.community_board().claim(&quest_id).await?;
            print_quest(&quest, false);
        }
        Commands::Publish { quest_id, private } => {
            let quest = ctx
                .creator_dashboard()
                .toggle_public(&quest_id, !private)
                .await?;
            print_quest(&quest, false);
        }
        Commands::Submit {
            quest_id,
            image,
            description,
        } => submit(ctx, &quest_id, &image, description.as_deref()).await?,
        Commands::Submissions { quest_id } => {
            let submissions = ctx.api.quest_submissions(&quest_id).await?;
            if submissions.is_empty() {
                println!("No submissions yet");
            }
            for s in submissions {
                println!(
                    "{}  {:<8}  {:>3} pts  {:.0}%  {}",
                    s.submitted_at.format("%Y-%m-%d %H:%M"),
                    s.verification_result,
                    s.points_awarded,
                    s.confidence_score * 100.0,
                    s.ai_reasoning.unwrap_or_default()
                );
            }
        }
        Commands::Leaderboard { limit } => {
            let mut page = ctx.leaderboard_page();
            page.limit = limit;
            for entry in ready(page.load().await)? {
                println!(
                    "{:>3}. {:<20} {:>6} pts  {:>3} quests  {}",
                    entry.rank,
                    entry.username,
                    entry.points,
                    entry.completed_quests,
                    entry.impact_level
                );
            }
        }
        Commands::Health => {
            let health = ctx.api.health().await?;
            println!(
                "{}: {} (gemini configured: {})",
                health.service, health.status, health.gemini_configured
            );
        }
        Commands::Version => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        }
    }
    Ok(())
}

async fn list_quests(ctx: &AppContext, view: QuestView) -> Result<()> {
    let quests = match view {
        QuestView::My => ready(ctx.quest_hub().load().await)?,
        QuestView::All(filter) => {
            let mut page = ctx.map_page();
            page.filter = to_filter(filter);
            ready(page.load().await)?
        }
        QuestView::Community(filter) => {
            let mut page = ctx.community_board();
            page.filter = to_filter(filter);
            ready(page.load().await)?
        }
        QuestView::Created => ready(ctx.creator_dashboard().load().await)?,
    };
    if quests.is_empty() {
        println!("No quests found");
    }
    for quest in &quests {
        print_quest(quest, false);
    }
    Ok(())
}

async fn submit(
    ctx: &AppContext,
    quest_id: &str,
    image: &Path,
    description: Option<&str>,
) -> Result<()> {
    let bytes = std::fs::read(image)?;
    let file_name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "proof".into());
    let image = ProofImage::from_file_name(file_name, bytes);

    match ctx
        .quest_hub()
        .submit_proof(quest_id, Some(&image), description)
        .await
    {
        ProofOutcome::Verified(resp) | ProofOutcome::Inconclusive(resp) => {
            println!(
                "{} ({:.0}% confidence, {} points)",
                resp.verification_result,
                resp.confidence_score * 100.0,
                resp.suggested_points
            );
            for observation in resp.key_observations {
                println!("  - {observation}");
            }
            Ok(())
        }
        ProofOutcome::Failed(e) => Err(e.into()),
        ProofOutcome::Ignored => Err(Error::Custom("A proof is already being verified".into())),
    }
}

fn ready<T: Clone>(state: &PageState<T>) -> Result<T> {
    match state {
        PageState::Ready(value) => Ok(value.clone()),
        PageState::Failed(message) => Err(Error::Custom(message.clone())),
        PageState::Loading => Err(Error::Custom("Request was superseded".into())),
    }
}

fn to_filter(args: FilterArgs) -> QuestFilter {
    QuestFilter {
        category: args.category,
        difficulty: args.difficulty,
    }
}

fn print_quest(quest: &Quest, detailed: bool) {
    let place = quest
        .location
        .name
        .clone()
        .unwrap_or_else(|| format!("{:.4}, {:.4}", quest.location.lat, quest.location.lng));
    println!(
        "{}  [{}] {} ({}, {})  @ {}",
        quest.quest_id, quest.status, quest.title, quest.category, quest.difficulty, place
    );
    if detailed {
        println!("  {}", quest.description);
        println!("  impact: {}", quest.impact_metric);
        if let Some(time) = &quest.estimated_time {
            println!("  time:   {time}");
        }
        if let Some(benefit) = &quest.community_benefit {
            println!("  why:    {benefit}");
        }
    }
}
