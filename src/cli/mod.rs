pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::{print_activities, print_stats};
use tracing::level_filters::LevelFilter;

use crate::{
    storage::{
        list_storage::{ListStorage, ListStorageImpl},
        local_save::LocalSaver,
    },
    store::{entities::ActivityId, list_store::ActivityStore},
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::{CLI_PREFIX, enable_logging},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Whatnext", version, long_about = None)]
#[command(about = "Cli for tracking your daily activities", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start a new activity")]
    Start,
    #[command(about = "Finish an activity that is in progress")]
    Finish { id: ActivityId },
    #[command(about = "Set the location of an activity")]
    Location { id: ActivityId, text: String },
    #[command(about = "Set the description of an activity")]
    Describe { id: ActivityId, text: String },
    #[command(about = "Show all tracked activities")]
    Show,
    #[command(about = "Show totals for tracked activities")]
    Stats,
    #[command(about = "Remove every tracked activity. This can't be undone")]
    Clear {
        #[arg(long, help = "Confirm that the whole list should be removed")]
        yes: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let dir = args.dir.map_or_else(create_application_default_path, Ok)?;
    enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;

    let storage = ListStorageImpl::new(dir, Box::new(DefaultClock))?;
    let list = storage.load().await?;
    let mut store = ActivityStore::new(list, Box::new(DefaultClock), LocalSaver::new(storage));

    match args.commands {
        Commands::Start => {
            let id = store.create().await;
            println!("Started activity {id}");
        }
        Commands::Finish { id } => {
            if store.finish(id).await {
                println!("Finished activity {id}");
            } else {
                println!("No activity with id {id}");
            }
        }
        Commands::Location { id, text } => {
            if store.set_location(id, &text).await {
                println!("Updated location of activity {id}");
            } else {
                println!("No activity with id {id}");
            }
        }
        Commands::Describe { id, text } => {
            if store.set_description(id, &text).await {
                println!("Updated description of activity {id}");
            } else {
                println!("No activity with id {id}");
            }
        }
        Commands::Show => print_activities(store.list()),
        Commands::Stats => print_stats(store.stats()),
        Commands::Clear { yes } => {
            if yes {
                store.clear().await;
                println!("Cleared all activities");
            } else {
                println!(
                    "This would remove {} activities. Pass --yes to confirm",
                    store.list().len()
                );
            }
        }
    }
    Ok(())
}
