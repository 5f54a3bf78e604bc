use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};

use crate::forms::{
    ClassForm, EventForm, FacilityForm, NewsForm, ResultForm, StaffForm, TopperEntry,
};
use crate::models::{Lang, SiteConfig};

/// Manage the Punwarka school website content
///
/// Content is stored in Supabase when SUPABASE_URL and SUPABASE_KEY are set,
/// otherwise in the local database at DB_PATH.
#[derive(Debug, Parser)]
#[command(name = "punwarka-cms", version, verbatim_doc_comment)]
pub struct Cli {
    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Log more; repeat for more detail
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Show listings in one language instead of both
    #[arg(long, global = true, value_enum)]
    pub lang: Option<Lang>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// School events
    #[command(subcommand)]
    Events(EventsCommand),

    /// Board exam results by academic year
    #[command(subcommand)]
    Results(ResultsCommand),

    /// Teaching and office staff
    #[command(subcommand)]
    Staff(StaffCommand),

    /// News ticker items
    #[command(subcommand)]
    News(NewsCommand),

    /// Campus facilities
    #[command(subcommand)]
    Facilities(FacilitiesCommand),

    /// Website-wide settings and hero slides
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Images in the storage bucket
    #[command(subcommand)]
    Media(MediaCommand),

    /// Fill empty tables with the website's starting content
    Seed,
}

/// What to do with one content tab.
#[derive(Debug)]
pub enum ContentAction<K, A> {
    List,
    Add(A),
    Edit(K, A),
    Delete(K),
}

macro_rules! content_command {
    ($name:ident, $args:ty) => {
        #[derive(Debug, Subcommand)]
        pub enum $name {
            /// List every record
            List,

            /// Add a record
            Add($args),

            /// Change fields of a record; fields not given keep their value
            Edit {
                id: i64,
                #[command(flatten)]
                fields: $args,
            },

            /// Delete a record
            Delete { id: i64 },
        }

        impl From<$name> for ContentAction<i64, $args> {
            fn from(command: $name) -> Self {
                match command {
                    $name::List => ContentAction::List,
                    $name::Add(fields) => ContentAction::Add(fields),
                    $name::Edit { id, fields } => ContentAction::Edit(id, fields),
                    $name::Delete { id } => ContentAction::Delete(id),
                }
            }
        }
    };
}

content_command!(EventsCommand, EventArgs);
content_command!(StaffCommand, StaffArgs);
content_command!(NewsCommand, NewsArgs);
content_command!(FacilitiesCommand, FacilityArgs);

#[derive(Debug, Subcommand)]
pub enum ResultsCommand {
    /// List every academic year
    List,

    /// Add the results of an academic year
    Add {
        /// Academic year, e.g. 2024-25
        #[arg(long)]
        year: String,
        #[command(flatten)]
        fields: ResultArgs,
    },

    /// Change the results of an academic year
    Edit {
        year: String,
        #[command(flatten)]
        fields: ResultArgs,
    },

    /// Delete the results of an academic year
    Delete { year: String },
}

impl From<ResultsCommand> for ContentAction<String, ResultArgs> {
    fn from(command: ResultsCommand) -> Self {
        match command {
            ResultsCommand::List => ContentAction::List,
            ResultsCommand::Add { year, mut fields } => {
                fields.year = Some(year);
                ContentAction::Add(fields)
            }
            ResultsCommand::Edit { year, fields } => ContentAction::Edit(year, fields),
            ResultsCommand::Delete { year } => ContentAction::Delete(year),
        }
    }
}

/// Command-line flags that fill in an edit form. Flags that are not given
/// leave the form's current value alone.
pub trait FormArgs<F> {
    fn apply(&self, form: &mut F) -> Result<()>;

    /// A local image to upload before the form is applied.
    fn image_file(&self) -> Option<&Path> {
        None
    }

    /// Puts the uploaded image's URL into the form.
    fn set_image(_form: &mut F, _url: String) {}
}

fn set(field: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *field = value.clone();
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct EventArgs {
    #[arg(long)]
    pub title_en: Option<String>,
    #[arg(long)]
    pub title_hi: Option<String>,
    #[arg(long)]
    pub desc_en: Option<String>,
    #[arg(long)]
    pub desc_hi: Option<String>,
    /// Image URL; a placeholder is used when left empty
    #[arg(long)]
    pub img: Option<String>,
    /// Upload this file and use it as the image
    #[arg(long, conflicts_with = "img")]
    pub img_file: Option<PathBuf>,
}

impl FormArgs<EventForm> for EventArgs {
    fn apply(&self, form: &mut EventForm) -> Result<()> {
        set(&mut form.title_en, &self.title_en);
        set(&mut form.title_hi, &self.title_hi);
        set(&mut form.desc_en, &self.desc_en);
        set(&mut form.desc_hi, &self.desc_hi);
        set(&mut form.img, &self.img);
        Ok(())
    }

    fn image_file(&self) -> Option<&Path> {
        self.img_file.as_deref()
    }

    fn set_image(form: &mut EventForm, url: String) {
        form.img = url;
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct StaffArgs {
    #[arg(long)]
    pub name_en: Option<String>,
    #[arg(long)]
    pub name_hi: Option<String>,
    #[arg(long)]
    pub designation_en: Option<String>,
    #[arg(long)]
    pub designation_hi: Option<String>,
    #[arg(long)]
    pub subject_en: Option<String>,
    #[arg(long)]
    pub subject_hi: Option<String>,
    /// Photo URL
    #[arg(long)]
    pub photo: Option<String>,
    /// Upload this file and use it as the photo
    #[arg(long, conflicts_with = "photo")]
    pub photo_file: Option<PathBuf>,
}

impl FormArgs<StaffForm> for StaffArgs {
    fn apply(&self, form: &mut StaffForm) -> Result<()> {
        set(&mut form.name_en, &self.name_en);
        set(&mut form.name_hi, &self.name_hi);
        set(&mut form.designation_en, &self.designation_en);
        set(&mut form.designation_hi, &self.designation_hi);
        set(&mut form.subject_en, &self.subject_en);
        set(&mut form.subject_hi, &self.subject_hi);
        set(&mut form.photo, &self.photo);
        Ok(())
    }

    fn image_file(&self) -> Option<&Path> {
        self.photo_file.as_deref()
    }

    fn set_image(form: &mut StaffForm, url: String) {
        form.photo = url;
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct NewsArgs {
    /// Headline shown in the ticker
    #[arg(long)]
    pub text_en: Option<String>,
    #[arg(long)]
    pub text_hi: Option<String>,
    #[arg(long)]
    pub content_en: Option<String>,
    #[arg(long)]
    pub content_hi: Option<String>,
    /// Publication date, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
    /// Upload this file and use it as the image
    #[arg(long, conflicts_with = "image")]
    pub image_file: Option<PathBuf>,
}

impl FormArgs<NewsForm> for NewsArgs {
    fn apply(&self, form: &mut NewsForm) -> Result<()> {
        set(&mut form.text_en, &self.text_en);
        set(&mut form.text_hi, &self.text_hi);
        set(&mut form.content_en, &self.content_en);
        set(&mut form.content_hi, &self.content_hi);
        set(&mut form.date, &self.date);
        set(&mut form.image, &self.image);
        Ok(())
    }

    fn image_file(&self) -> Option<&Path> {
        self.image_file.as_deref()
    }

    fn set_image(form: &mut NewsForm, url: String) {
        form.image = url;
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct FacilityArgs {
    #[arg(long)]
    pub title_en: Option<String>,
    #[arg(long)]
    pub title_hi: Option<String>,
    #[arg(long)]
    pub desc_en: Option<String>,
    #[arg(long)]
    pub desc_hi: Option<String>,
    #[arg(long)]
    pub image: Option<String>,
    /// Upload this file and use it as the image
    #[arg(long, conflicts_with = "image")]
    pub image_file: Option<PathBuf>,
}

impl FormArgs<FacilityForm> for FacilityArgs {
    fn apply(&self, form: &mut FacilityForm) -> Result<()> {
        set(&mut form.title_en, &self.title_en);
        set(&mut form.title_hi, &self.title_hi);
        set(&mut form.desc_en, &self.desc_en);
        set(&mut form.desc_hi, &self.desc_hi);
        set(&mut form.image, &self.image);
        Ok(())
    }

    fn image_file(&self) -> Option<&Path> {
        self.image_file.as_deref()
    }

    fn set_image(form: &mut FacilityForm, url: String) {
        form.image = url;
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ResultArgs {
    #[arg(skip)]
    pub year: Option<String>,

    #[arg(long)]
    pub class10_total: Option<String>,
    #[arg(long)]
    pub class10_passed: Option<String>,
    /// Pass percentage; computed from the counts when left empty
    #[arg(long)]
    pub class10_percent: Option<String>,
    /// Replaces the class 10 toppers, ranked in the order given
    #[arg(long = "class10-topper", value_name = "NAME=PERCENT")]
    pub class10_toppers: Vec<String>,

    #[arg(long)]
    pub class12_total: Option<String>,
    #[arg(long)]
    pub class12_passed: Option<String>,
    /// Pass percentage; computed from the counts when left empty
    #[arg(long)]
    pub class12_percent: Option<String>,
    /// Replaces the class 12 toppers, ranked in the order given
    #[arg(long = "class12-topper", value_name = "NAME=PERCENT")]
    pub class12_toppers: Vec<String>,
}

fn apply_class(
    form: &mut ClassForm,
    total: &Option<String>,
    passed: &Option<String>,
    percent: &Option<String>,
    toppers: &[String],
) -> Result<()> {
    set(&mut form.total, total);
    set(&mut form.passed, passed);
    set(&mut form.percent, percent);
    // Changed counts make a stored percentage stale.
    if percent.is_none() && (total.is_some() || passed.is_some()) {
        form.percent.clear();
    }
    if !toppers.is_empty() {
        form.toppers = toppers
            .iter()
            .map(|entry| TopperEntry::parse(entry))
            .collect::<Result<_>>()?;
    }
    Ok(())
}

impl FormArgs<ResultForm> for ResultArgs {
    fn apply(&self, form: &mut ResultForm) -> Result<()> {
        set(&mut form.year, &self.year);
        apply_class(
            &mut form.class10,
            &self.class10_total,
            &self.class10_passed,
            &self.class10_percent,
            &self.class10_toppers,
        )?;
        apply_class(
            &mut form.class12,
            &self.class12_total,
            &self.class12_passed,
            &self.class12_percent,
            &self.class12_toppers,
        )
    }
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the current settings
    Show,

    /// Change settings; fields not given keep their value
    Set(SettingsArgs),

    /// Manage the home page slideshow
    #[command(subcommand)]
    Hero(HeroCommand),
}

#[derive(Debug, Clone, Default, Args)]
pub struct SettingsArgs {
    #[arg(long)]
    pub school_name_en: Option<String>,
    #[arg(long)]
    pub school_name_hi: Option<String>,
    #[arg(long)]
    pub sub_title_en: Option<String>,
    #[arg(long)]
    pub sub_title_hi: Option<String>,
    #[arg(long)]
    pub address_en: Option<String>,
    #[arg(long)]
    pub address_hi: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub about_image: Option<String>,
    /// Upload this file and use it as the about section image
    #[arg(long, conflicts_with = "about_image")]
    pub about_image_file: Option<PathBuf>,
    #[arg(long)]
    pub logo: Option<String>,
    /// Upload this file and use it as the logo
    #[arg(long, conflicts_with = "logo")]
    pub logo_file: Option<PathBuf>,
}

impl SettingsArgs {
    pub fn apply(&self, config: &mut SiteConfig) {
        set(&mut config.school_name.en, &self.school_name_en);
        set(&mut config.school_name.hi, &self.school_name_hi);
        set(&mut config.sub_title.en, &self.sub_title_en);
        set(&mut config.sub_title.hi, &self.sub_title_hi);
        set(&mut config.address.en, &self.address_en);
        set(&mut config.address.hi, &self.address_hi);
        set(&mut config.phone, &self.phone);
        set(&mut config.email, &self.email);
        set(&mut config.about_image, &self.about_image);
        set(&mut config.logo, &self.logo);
    }
}

/// Slide positions start at 1, as listed by `settings show`.
#[derive(Debug, Subcommand)]
pub enum HeroCommand {
    /// Append a slide
    Add {
        url: Option<String>,
        /// Upload this file and use it as the slide
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,
    },

    /// Replace the image of a slide
    Set {
        position: usize,
        #[arg(required_unless_present = "file")]
        url: Option<String>,
        /// Upload this file and use it as the slide
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,
    },

    /// Remove a slide
    Remove { position: usize },

    /// Move a slide to another position
    Move { from: usize, to: usize },
}

/// Converts a position as typed into a list index.
pub fn slide_index(position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| anyhow!("Slide positions start at 1"))
}

#[derive(Debug, Subcommand)]
pub enum MediaCommand {
    /// List the images in the bucket with their public URLs
    List,

    /// Upload an image under a random name
    Upload { path: PathBuf },

    /// Rename an image; asks for the new name when not given
    Rename { old: String, new: Option<String> },

    /// Delete an image
    Delete { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("punwarka-cms").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_definitions_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn edit_flags_only_touch_given_fields() {
        let cli = parse(&["events", "edit", "3", "--title-en", "Sports Day"]);
        let Command::Events(EventsCommand::Edit { id, fields }) = cli.command else {
            panic!("not an events edit");
        };
        assert_eq!(id, 3);

        let mut form = EventForm {
            title_en: "Annual Day".to_string(),
            title_hi: "वार्षिकोत्सव".to_string(),
            ..EventForm::default()
        };
        fields.apply(&mut form).unwrap();
        assert_eq!(form.title_en, "Sports Day");
        assert_eq!(form.title_hi, "वार्षिकोत्सव");
    }

    #[test]
    fn image_url_and_file_are_exclusive() {
        let args = ["staff", "add", "--photo", "a.jpg", "--photo-file", "a.jpg"];
        assert!(Cli::try_parse_from(std::iter::once("punwarka-cms").chain(args)).is_err());
    }

    #[test]
    fn result_flags_fill_the_form() {
        let cli = parse(&[
            "--yes",
            "results",
            "add",
            "--year",
            "2024-25",
            "--class10-total",
            "30",
            "--class10-passed",
            "29",
            "--class10-topper",
            "Neha=91.2",
            "--class10-topper",
            "Ravi=88",
        ]);
        assert!(cli.yes);
        let Command::Results(command) = cli.command else {
            panic!("not a results command");
        };
        let ContentAction::Add(fields) = ContentAction::<String, ResultArgs>::from(command) else {
            panic!("not an add");
        };

        let mut form = ResultForm::default();
        form.class10.percent = "50".to_string();
        fields.apply(&mut form).unwrap();
        assert_eq!(form.year, "2024-25");
        assert_eq!(form.class10.total, "30");
        assert!(form.class10.percent.is_empty());
        assert_eq!(form.class10.toppers[1].name, "Ravi");
        assert!(form.class12.total.is_empty());
    }

    #[test]
    fn slide_positions_start_at_one() {
        assert_eq!(slide_index(1).unwrap(), 0);
        assert!(slide_index(0).is_err());
    }

    #[test]
    fn settings_flags_update_the_config() {
        let cli = parse(&["settings", "set", "--phone", "0548 000000", "--lang", "hi"]);
        assert_eq!(cli.lang, Some(Lang::Hi));
        let Command::Settings(SettingsCommand::Set(args)) = cli.command else {
            panic!("not a settings set");
        };
        let mut config = SiteConfig::default();
        args.apply(&mut config);
        assert_eq!(config.phone, "0548 000000");
        assert_eq!(config.email, SiteConfig::default().email);
    }
}
