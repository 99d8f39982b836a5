use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tweaknow::api::ApiClient;
use tweaknow::config::{ConfigManager, Workspace};
use tweaknow::logging::{self, LogConfig};
use tweaknow::render;
use tweaknow::server_config::{ServerConfigManager, SERVER_URL_ENV};
use tweaknow::session::TokenStore;
use tweaknow::source::Snapshot;
use tweaknow::{log_api_call, log_debug};
use tweaknow_types::{CreateTweakRequest, ProfileTab};

/// TweakNow - read threads, notifications and profiles from a TweakNow universe
#[derive(Parser)]
#[command(name = "tweaknow")]
#[command(about = "Command-line client for TweakNow universes")]
#[command(version)]
struct Cli {
    /// Server URL to connect to
    #[arg(long, short, global = true, env = SERVER_URL_ENV)]
    server: Option<String>,

    /// Access token; overrides the stored one
    #[arg(long, global = true, env = "TWEAKNOW_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a tweak and its replies
    Thread {
        universe: i64,
        tweak: i64,
        /// List only direct replies
        #[arg(long)]
        collapsed: bool,
        /// Print the thread as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show replies, quotes and retweets of a character's tweaks
    Notifications {
        universe: i64,
        character: i64,
        /// Only replies and quotes
        #[arg(long)]
        mentions: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show a character's profile
    Profile {
        universe: i64,
        character: i64,
        #[arg(long, default_value = "tweets", value_parser = parse_tab)]
        tab: ProfileTab,
        /// Show whether this character follows the profile
        #[arg(long = "as", value_name = "CHARACTER")]
        viewer: Option<i64>,
    },
    /// List your universes
    Universes,
    /// Reply to a tweak, then show its thread
    Reply {
        universe: i64,
        tweak: i64,
        content: String,
        #[arg(long = "as", value_name = "CHARACTER")]
        author: i64,
    },
    /// Quote a tweak, then show the new quote
    Quote {
        universe: i64,
        tweak: i64,
        content: String,
        #[arg(long = "as", value_name = "CHARACTER")]
        author: i64,
    },
    /// Retweet a tweak, then show its thread
    Retweet {
        universe: i64,
        tweak: i64,
        #[arg(long = "as", value_name = "CHARACTER")]
        author: i64,
    },
    /// Delete a tweak and the replies below it
    Delete { universe: i64, tweak: i64 },
    /// Follow a character, then show its profile
    Follow {
        universe: i64,
        character: i64,
        #[arg(long = "as", value_name = "CHARACTER")]
        follower: i64,
    },
    /// Unfollow a character, then show its profile
    Unfollow {
        universe: i64,
        character: i64,
        #[arg(long = "as", value_name = "CHARACTER")]
        follower: i64,
    },
    /// Save the server URL for later runs
    SetServer { url: String },
    /// Save an access token for later runs
    LoginToken { token: String },
    /// Forget the saved access token
    Logout,
    /// Show server, login and last-used universe
    Status,
}

fn parse_tab(s: &str) -> Result<ProfileTab, String> {
    ProfileTab::parse(s).ok_or_else(|| format!("unknown tab '{}' (tweets, replies, media, likes)", s))
}

async fn load(client: &ApiClient, universe: i64) -> Result<Snapshot> {
    Snapshot::fetch(client, universe)
        .await
        .with_context(|| format!("Failed to load universe {}", universe))
}

/// Reload the universe and print the thread containing `tweak`
async fn show_thread(client: &ApiClient, universe: i64, tweak: i64) -> Result<()> {
    let snapshot = load(client, universe).await?;
    let view = snapshot.thread(snapshot.thread_root(tweak))?;
    print!(
        "{}",
        render::render_thread(&view, &snapshot.characters, true, chrono::Utc::now())
    );
    Ok(())
}

async fn show_profile(
    client: &ApiClient,
    universe: i64,
    character: i64,
    tab: ProfileTab,
    viewer: Option<i64>,
) -> Result<()> {
    let snapshot = load(client, universe).await?;
    let (profile, tweaks) = snapshot.profile(character, tab)?;
    let now = chrono::Utc::now();

    print!(
        "{}",
        render::render_profile(&profile, tab, &tweaks, &snapshot.characters, now)
    );
    if let Some(viewer) = viewer {
        let status = client.follow_status(universe, viewer, character).await?;
        println!(
            "{}",
            render::render_follow_status(status.is_following, status.followers_count)
        );
    }
    Ok(())
}

fn load_env() {
    let _ = dotenv::dotenv();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_env();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    logging::init_logging(&log_config)?;

    let config_manager = ConfigManager::new()?;
    let token_store = TokenStore::new(config_manager.config_dir());
    let mut workspace = config_manager.load_workspace()?;
    let server_config_manager = ServerConfigManager::new(config_manager);

    match &cli.command {
        Command::SetServer { url } => {
            server_config_manager.save_server_url(url.clone())?;
            println!("Server set to {} ({})", url, server_config_manager.get_server_description(url));
            return Ok(());
        }
        Command::LoginToken { token } => {
            token_store.save(token)?;
            println!("Token saved to {}", token_store.path().display());
            return Ok(());
        }
        Command::Logout => {
            token_store.delete()?;
            println!("Logged out");
            return Ok(());
        }
        _ => {}
    }

    let server_url = server_config_manager.determine_server_url(cli.server)?;
    let token = match cli.token {
        Some(token) => Some(token),
        None => token_store.load()?,
    };
    log_debug!(log_config, "server={} token={}", server_url, token.is_some());

    let mut client = ApiClient::new(server_url.clone());
    client.set_access_token(token.clone());
    let now = chrono::Utc::now();

    match cli.command {
        Command::Thread { universe, tweak, collapsed, json } => {
            log_api_call!(log_config, "loading thread {} in universe {}", tweak, universe);
            let snapshot = load(&client, universe).await?;
            let view = snapshot.thread(tweak)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", render::render_thread(&view, &snapshot.characters, !collapsed, now));
            }
            workspace.universe_id = Some(universe);
        }
        Command::Notifications { universe, character, mentions, json } => {
            log_api_call!(log_config, "loading notifications for {} in universe {}", character, universe);
            let snapshot = load(&client, universe).await?;
            let all = snapshot.notifications(character);
            let shown = if mentions {
                tweaknow_core::mentions(&all)
            } else {
                all.iter().collect()
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                print!("{}", render::render_notifications(shown, now));
            }
            workspace = Workspace { universe_id: Some(universe), character_id: Some(character) };
        }
        Command::Profile { universe, character, tab, viewer } => {
            log_api_call!(log_config, "loading profile {} in universe {}", character, universe);
            show_profile(&client, universe, character, tab, viewer).await?;
            workspace = Workspace { universe_id: Some(universe), character_id: Some(character) };
        }
        Command::Universes => {
            let universes = client.get_universes().await?;
            print!("{}", render::render_universes(&universes));
            return Ok(());
        }
        Command::Reply { universe, tweak, content, author } => {
            log_api_call!(log_config, "replying to {} as {}", tweak, author);
            let request = CreateTweakRequest {
                universe_id: universe,
                character_id: author,
                content,
                reply_to_tweak_id: Some(tweak),
                ..Default::default()
            };
            let created = client.create_tweak(request).await?;
            show_thread(&client, universe, created.id).await?;
            workspace = Workspace { universe_id: Some(universe), character_id: Some(author) };
        }
        Command::Quote { universe, tweak, content, author } => {
            log_api_call!(log_config, "quoting {} as {}", tweak, author);
            let request = CreateTweakRequest {
                universe_id: universe,
                character_id: author,
                content,
                quoted_tweak_id: Some(tweak),
                ..Default::default()
            };
            let created = client.create_tweak(request).await?;
            show_thread(&client, universe, created.id).await?;
            workspace = Workspace { universe_id: Some(universe), character_id: Some(author) };
        }
        Command::Retweet { universe, tweak, author } => {
            log_api_call!(log_config, "retweeting {} as {}", tweak, author);
            client.retweet(universe, tweak, author).await?;
            show_thread(&client, universe, tweak).await?;
            workspace = Workspace { universe_id: Some(universe), character_id: Some(author) };
        }
        Command::Delete { universe, tweak } => {
            log_api_call!(log_config, "deleting {} in universe {}", tweak, universe);
            let root = load(&client, universe).await?.thread_root(tweak);
            client.delete_tweak(universe, tweak).await?;

            if root == tweak {
                println!("Deleted tweak {}", tweak);
            } else {
                show_thread(&client, universe, root).await?;
            }
            workspace.universe_id = Some(universe);
        }
        Command::Follow { universe, character, follower } => {
            log_api_call!(log_config, "{} follows {}", follower, character);
            client.follow(universe, follower, character).await?;
            show_profile(&client, universe, character, ProfileTab::Tweets, Some(follower)).await?;
            workspace = Workspace { universe_id: Some(universe), character_id: Some(follower) };
        }
        Command::Unfollow { universe, character, follower } => {
            log_api_call!(log_config, "{} unfollows {}", follower, character);
            client.unfollow(universe, follower, character).await?;
            show_profile(&client, universe, character, ProfileTab::Tweets, Some(follower)).await?;
            workspace = Workspace { universe_id: Some(universe), character_id: Some(follower) };
        }
        Command::Status => {
            println!(
                "Server:   {} ({})",
                server_url,
                server_config_manager.get_server_description(&server_url)
            );
            if token.is_none() {
                println!("Account:  not logged in");
            } else {
                match client.current_user().await {
                    Ok(user) => println!("Account:  {} <{}>", user.username, user.email),
                    Err(e) => println!("Account:  token rejected ({})", e),
                }
            }
            match (workspace.universe_id, workspace.character_id) {
                (Some(universe), Some(character)) => {
                    println!("Last:     universe {}, character {}", universe, character)
                }
                (Some(universe), None) => println!("Last:     universe {}", universe),
                _ => println!("Last:     none"),
            }
            return Ok(());
        }
        Command::SetServer { .. } | Command::LoginToken { .. } | Command::Logout => return Ok(()),
    }

    server_config_manager.config_manager().save_workspace(&workspace)?;
    Ok(())
}
