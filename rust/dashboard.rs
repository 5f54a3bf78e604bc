use std::path::Path;

use anyhow::Result;

use crate::content::{Content, ContentKind, Section, Tables};
use crate::defaults;
use crate::media::Gallery;
use crate::models::{EventItem, Facility, NewsItem, SiteConfig, StaffMember, YearResult};
use crate::prompt::Prompt;
use crate::settings::{load_site_config, save_site_config};
use crate::store::{ContentStore, MediaStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Events,
    Results,
    Staff,
    News,
    Facilities,
    Settings,
    Media,
}

impl From<ContentKind> for Tab {
    fn from(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Events => Tab::Events,
            ContentKind::Results => Tab::Results,
            ContentKind::Staff => Tab::Staff,
            ContentKind::News => Tab::News,
            ContentKind::Facilities => Tab::Facilities,
        }
    }
}

/// One administrator session over a store.
pub struct Dashboard<S, P> {
    store: S,
    prompt: P,
    tables: Tables,
    active_tab: Tab,
    events: Section<EventItem>,
    results: Section<YearResult>,
    staff: Section<StaffMember>,
    news: Section<NewsItem>,
    facilities: Section<Facility>,
    pub site_config: SiteConfig,
    gallery: Gallery,
}

/// Borrows one content section together with the parts of the session it
/// needs to reach the store.
pub trait HasSection<T: Content, S, P> {
    fn section_parts(&mut self) -> (&mut Section<T>, &S, &Tables, &P);
    fn section_ref(&self) -> &Section<T>;
}

macro_rules! has_section {
    ($ty:ty, $field:ident) => {
        impl<S, P> HasSection<$ty, S, P> for Dashboard<S, P> {
            fn section_parts(&mut self) -> (&mut Section<$ty>, &S, &Tables, &P) {
                (&mut self.$field, &self.store, &self.tables, &self.prompt)
            }

            fn section_ref(&self) -> &Section<$ty> {
                &self.$field
            }
        }
    };
}

has_section!(EventItem, events);
has_section!(YearResult, results);
has_section!(StaffMember, staff);
has_section!(NewsItem, news);
has_section!(Facility, facilities);

impl<S, P> Dashboard<S, P>
where
    S: ContentStore + MediaStore,
    P: Prompt,
{
    pub fn new(store: S, prompt: P, tables: Tables) -> Self {
        Self {
            store,
            prompt,
            tables,
            active_tab: Tab::default(),
            events: Section::default(),
            results: Section::default(),
            staff: Section::default(),
            news: Section::default(),
            facilities: Section::default(),
            site_config: SiteConfig::default(),
            gallery: Gallery::default(),
        }
    }

    /// Switches tabs and loads what the tab shows.
    pub async fn open_tab(&mut self, tab: Tab) -> Result<()> {
        self.active_tab = tab;
        tracing::debug!(tab = ?self.active_tab, "Opening tab");
        match tab {
            Tab::Events => self.load::<EventItem>().await,
            Tab::Results => self.load::<YearResult>().await,
            Tab::Staff => self.load::<StaffMember>().await,
            Tab::News => self.load::<NewsItem>().await,
            Tab::Facilities => self.load::<Facility>().await,
            Tab::Settings => {
                self.site_config = load_site_config(&self.store, &self.tables).await?;
                Ok(())
            }
            Tab::Media => self.gallery.refresh(&self.store).await,
        }
    }

    pub fn section<T: Content>(&self) -> &Section<T>
    where
        Self: HasSection<T, S, P>,
    {
        <Self as HasSection<T, S, P>>::section_ref(self)
    }

    pub fn form_mut<'a, T: Content + 'a>(&'a mut self) -> &'a mut T::Form
    where
        Self: HasSection<T, S, P>,
    {
        let (section, ..) = <Self as HasSection<T, S, P>>::section_parts(self);
        &mut section.form
    }

    pub async fn load<T: Content>(&mut self) -> Result<()>
    where
        Self: HasSection<T, S, P>,
    {
        let (section, store, tables, _) = <Self as HasSection<T, S, P>>::section_parts(self);
        section.load(store, tables).await
    }

    pub fn begin_edit<T: Content>(&mut self, key: &T::Key) -> Result<()>
    where
        Self: HasSection<T, S, P>,
    {
        let (section, ..) = <Self as HasSection<T, S, P>>::section_parts(self);
        section.begin_edit(key)
    }

    pub fn cancel_edit<T: Content>(&mut self)
    where
        Self: HasSection<T, S, P>,
    {
        let (section, ..) = <Self as HasSection<T, S, P>>::section_parts(self);
        section.cancel_edit();
    }

    pub async fn save<T: Content>(&mut self) -> Result<T>
    where
        Self: HasSection<T, S, P>,
    {
        let (section, store, tables, prompt) = <Self as HasSection<T, S, P>>::section_parts(self);
        section.save(store, tables, prompt).await
    }

    pub async fn delete<T: Content>(&mut self, key: &T::Key) -> Result<bool>
    where
        Self: HasSection<T, S, P>,
    {
        let (section, store, tables, prompt) = <Self as HasSection<T, S, P>>::section_parts(self);
        section.delete(store, tables, prompt, key).await
    }

    pub async fn save_settings(&self) -> Result<()> {
        save_site_config(&self.store, &self.tables, &self.prompt, &self.site_config).await
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub async fn upload_image(&mut self, path: &Path) -> Result<String> {
        self.gallery.upload(&self.store, &self.prompt, path).await
    }

    /// Renames an image, asking for the new name when none is given.
    pub async fn rename_image(&mut self, old_name: &str, new_name: Option<&str>) -> Result<bool> {
        let new_name = match new_name {
            Some(name) => name.to_string(),
            None => match self.prompt.ask(
                "Enter new filename (keep the extension, e.g., image.jpg):",
                old_name,
            ) {
                Some(name) => name,
                None => return Ok(false),
            },
        };
        self.gallery
            .rename(&self.store, &self.prompt, old_name, &new_name)
            .await
    }

    pub async fn delete_image(&mut self, name: &str) -> Result<bool> {
        self.gallery.delete(&self.store, &self.prompt, name).await
    }

    /// Writes the site's original content into tables that are still empty.
    /// Returns the number of records written.
    pub async fn seed(&mut self) -> Result<usize> {
        let mut written = 0;
        written += self.seed_section(defaults::events()).await?;
        written += self.seed_section(defaults::results()).await?;
        written += self.seed_section(defaults::staff()).await?;
        written += self.seed_section(defaults::news()).await?;
        written += self.seed_section(defaults::facilities()).await?;

        let settings = self.store.select(&self.tables.settings(), "key").await?;
        if settings.is_empty() {
            self.site_config = SiteConfig::default();
            self.save_settings().await?;
            written += 1;
        }
        Ok(written)
    }

    async fn seed_section<T: Content>(&mut self, records: Vec<T>) -> Result<usize>
    where
        Self: HasSection<T, S, P>,
    {
        self.load::<T>().await?;
        if !self.section::<T>().items().is_empty() {
            tracing::info!(kind = T::KIND.label(), "Table already has content, not seeding");
            return Ok(0);
        }
        let count = records.len();
        for record in records {
            let form = record.to_form();
            *self.form_mut::<T>() = form;
            self.save::<T>().await?;
        }
        tracing::info!(kind = T::KIND.label(), count, "Seeded default content");
        Ok(count)
    }
}
