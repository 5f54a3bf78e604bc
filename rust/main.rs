mod cli;
mod config;
mod content;
mod dashboard;
mod db;
mod defaults;
mod forms;
mod logger;
mod media;
mod models;
mod prompt;
mod settings;
mod store;
mod supabase;
mod view;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::{
    slide_index, Cli, Command, ContentAction, EventArgs, FacilityArgs, FormArgs, HeroCommand,
    MediaCommand, NewsArgs, ResultArgs, SettingsArgs, SettingsCommand, StaffArgs,
};
use crate::config::Config;
use crate::content::{Content, Tables};
use crate::dashboard::{Dashboard, HasSection, Tab};
use crate::db::Database;
use crate::models::{EventItem, Facility, Lang, NewsItem, StaffMember, YearResult};
use crate::prompt::{Prompt, Terminal};
use crate::store::{ContentStore, MediaStore};
use crate::supabase::SupabaseClient;
use crate::view::Render;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logger::init_logging(cli.verbose);

    let config = Config::from_env();
    let tables = Tables::new(config.table_prefix.as_str());
    let prompt = Terminal::new(cli.yes);

    match &config.supabase {
        Some(remote) => {
            tracing::info!(url = %remote.url, bucket = %config.bucket, "Using Supabase");
            let client = SupabaseClient::new(&remote.url, &remote.api_key, &config.bucket)?;
            run(Dashboard::new(client, prompt, tables), cli).await
        }
        None => {
            tracing::info!(
                path = %config.db_path,
                "Supabase is not configured, using the local database"
            );
            let db = Database::new(&config.db_path, &config.bucket)
                .context("Failed to initialize database")?;
            if !matches!(cli.command, Command::Seed) && db.is_empty()? {
                tracing::warn!("Local database has no content yet, run `punwarka-cms seed` first");
            }
            run(Dashboard::new(db, prompt, tables), cli).await
        }
    }
}

async fn run<S, P>(mut dash: Dashboard<S, P>, cli: Cli) -> Result<()>
where
    S: ContentStore + MediaStore,
    P: Prompt,
{
    let lang = cli.lang;
    match cli.command {
        Command::Events(command) => {
            run_content::<EventItem, _, _, EventArgs>(&mut dash, command.into(), lang).await
        }
        Command::Results(command) => {
            run_content::<YearResult, _, _, ResultArgs>(&mut dash, command.into(), lang).await
        }
        Command::Staff(command) => {
            run_content::<StaffMember, _, _, StaffArgs>(&mut dash, command.into(), lang).await
        }
        Command::News(command) => {
            run_content::<NewsItem, _, _, NewsArgs>(&mut dash, command.into(), lang).await
        }
        Command::Facilities(command) => {
            run_content::<Facility, _, _, FacilityArgs>(&mut dash, command.into(), lang).await
        }
        Command::Settings(command) => run_settings(&mut dash, command, lang).await,
        Command::Media(command) => run_media(&mut dash, command).await,
        Command::Seed => {
            let written = dash.seed().await?;
            println!("Seeded {} records", written);
            Ok(())
        }
    }
}

async fn run_content<T, S, P, A>(
    dash: &mut Dashboard<S, P>,
    action: ContentAction<T::Key, A>,
    lang: Option<Lang>,
) -> Result<()>
where
    T: Content + Render,
    S: ContentStore + MediaStore,
    P: Prompt,
    A: FormArgs<T::Form>,
    Dashboard<S, P>: HasSection<T, S, P>,
{
    dash.open_tab(Tab::from(T::KIND)).await?;
    let label = T::KIND.label();

    match action {
        ContentAction::List => {
            let items = dash.section::<T>().items();
            if items.is_empty() {
                println!("No {} yet", label);
            }
            for item in items {
                print!("{}", item.render(lang));
            }
        }
        ContentAction::Add(fields) => {
            dash.cancel_edit::<T>();
            fill_form::<T, _, _, _>(dash, &fields).await?;
            let saved = dash.save::<T>().await?;
            println!("Added {} {}", label, saved.key());
        }
        ContentAction::Edit(key, fields) => {
            dash.begin_edit::<T>(&key)?;
            tracing::debug!(kind = label, key = ?dash.section::<T>().editing(), "Editing record");
            fill_form::<T, _, _, _>(dash, &fields).await?;
            let saved = dash.save::<T>().await?;
            println!("Updated {} {}", label, saved.key());
        }
        ContentAction::Delete(key) => {
            if dash.delete::<T>(&key).await? {
                println!("Deleted {} {}", label, key);
            } else {
                println!("Kept {} {}", label, key);
            }
        }
    }
    Ok(())
}

async fn fill_form<T, S, P, A>(dash: &mut Dashboard<S, P>, fields: &A) -> Result<()>
where
    T: Content,
    S: ContentStore + MediaStore,
    P: Prompt,
    A: FormArgs<T::Form>,
    Dashboard<S, P>: HasSection<T, S, P>,
{
    if let Some(path) = fields.image_file() {
        let url = dash.upload_image(path).await?;
        A::set_image(dash.form_mut::<T>(), url);
    }
    fields.apply(dash.form_mut::<T>())
}

async fn run_settings<S, P>(
    dash: &mut Dashboard<S, P>,
    command: SettingsCommand,
    lang: Option<Lang>,
) -> Result<()>
where
    S: ContentStore + MediaStore,
    P: Prompt,
{
    dash.open_tab(Tab::Settings).await?;

    match command {
        SettingsCommand::Show => {
            print!("{}", dash.site_config.render(lang));
            return Ok(());
        }
        SettingsCommand::Set(fields) => apply_settings(dash, fields).await?,
        SettingsCommand::Hero(HeroCommand::Add { url, file }) => {
            let url = match file {
                Some(path) => Some(dash.upload_image(&path).await?),
                None => url,
            };
            let index = dash.site_config.add_hero_image();
            if let Some(url) = url {
                dash.site_config.set_hero_image(index, &url)?;
            }
        }
        SettingsCommand::Hero(HeroCommand::Set { position, url, file }) => {
            let index = slide_index(position)?;
            let url = match file {
                Some(path) => dash.upload_image(&path).await?,
                None => url.unwrap_or_default(),
            };
            dash.site_config.set_hero_image(index, &url)?;
        }
        SettingsCommand::Hero(HeroCommand::Remove { position }) => {
            let removed = dash.site_config.remove_hero_image(slide_index(position)?)?;
            tracing::info!(url = %removed, "Removed hero slide");
        }
        SettingsCommand::Hero(HeroCommand::Move { from, to }) => {
            dash.site_config
                .move_hero_image(slide_index(from)?, slide_index(to)?)?;
        }
    }

    dash.save_settings().await
}

async fn apply_settings<S, P>(dash: &mut Dashboard<S, P>, fields: SettingsArgs) -> Result<()>
where
    S: ContentStore + MediaStore,
    P: Prompt,
{
    fields.apply(&mut dash.site_config);
    if let Some(path) = &fields.logo_file {
        dash.site_config.logo = dash.upload_image(path).await?;
    }
    if let Some(path) = &fields.about_image_file {
        dash.site_config.about_image = dash.upload_image(path).await?;
    }
    Ok(())
}

async fn run_media<S, P>(dash: &mut Dashboard<S, P>, command: MediaCommand) -> Result<()>
where
    S: ContentStore + MediaStore,
    P: Prompt,
{
    dash.open_tab(Tab::Media).await?;

    match command {
        MediaCommand::List => {
            let images = dash.gallery().images();
            if images.is_empty() {
                println!("No images uploaded yet.");
            }
            for image in images {
                print!("{}", image.render(None));
            }
        }
        MediaCommand::Upload { path } => {
            let url = dash.upload_image(&path).await?;
            println!("{}", url);
        }
        MediaCommand::Rename { old, new } => {
            if dash.rename_image(&old, new.as_deref()).await? {
                println!("Renamed {}", old);
            }
        }
        MediaCommand::Delete { name } => {
            if dash.delete_image(&name).await? {
                println!("Deleted {}", name);
            } else {
                println!("Kept {}", name);
            }
        }
    }
    Ok(())
}
