use std::fmt;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use crate::prompt::Prompt;
use crate::store::ContentStore;

/// The five list-shaped content types the dashboard manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Events,
    Results,
    Staff,
    News,
    Facilities,
}

impl ContentKind {
    fn table_suffix(self) -> &'static str {
        match self {
            ContentKind::Events => "events",
            ContentKind::Results => "results",
            ContentKind::Staff => "staff",
            ContentKind::News => "news",
            ContentKind::Facilities => "facilities",
        }
    }

    pub fn key_column(self) -> &'static str {
        match self {
            ContentKind::Results => "year",
            _ => "id",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Events => "event",
            ContentKind::Results => "result",
            ContentKind::Staff => "staff member",
            ContentKind::News => "news item",
            ContentKind::Facilities => "facility",
        }
    }

    pub fn delete_prompt(self) -> &'static str {
        match self {
            ContentKind::Events => "Delete this event?",
            ContentKind::Results => "Are you sure?",
            ContentKind::Staff => "Delete this staff member?",
            ContentKind::News => "Delete this news item?",
            ContentKind::Facilities => "Delete this facility?",
        }
    }
}

/// Table names of one deployment. Every table shares a prefix.
#[derive(Debug, Clone)]
pub struct Tables {
    prefix: String,
}

impl Tables {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn content(&self, kind: ContentKind) -> String {
        format!("{}{}", self.prefix, kind.table_suffix())
    }

    pub fn settings(&self) -> String {
        format!("{}settings", self.prefix)
    }
}

/// A record type that lives in one content table and is edited through a form.
pub trait Content: Clone + Sized {
    type Key: Clone + PartialEq + fmt::Display + fmt::Debug;
    type Form: Default + Clone;

    const KIND: ContentKind;

    fn key(&self) -> Self::Key;

    /// Outgoing payload in the table's column layout, without a generated key.
    fn to_row(&self) -> Result<Value>;

    fn from_row(row: Value) -> Result<Self>;

    fn to_form(&self) -> Self::Form;

    /// Validates `form` and builds the record. `current` is the record being
    /// edited, if any; its key is kept.
    fn from_form(form: &Self::Form, current: Option<&Self>) -> Result<Self>;

    fn sort(_items: &mut [Self]) {}
}

/// One dashboard tab's list, form and edit target.
///
/// At most one record is being edited at a time: `begin_edit` replaces the
/// target, `cancel_edit` and a successful `save` clear it.
pub struct Section<T: Content> {
    items: Vec<T>,
    editing: Option<T::Key>,
    pub form: T::Form,
}

impl<T: Content> Default for Section<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            editing: None,
            form: T::Form::default(),
        }
    }
}

impl<T: Content> Section<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn editing(&self) -> Option<&T::Key> {
        self.editing.as_ref()
    }

    pub fn find(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| &item.key() == key)
    }

    pub fn begin_edit(&mut self, key: &T::Key) -> Result<()> {
        let record = self
            .find(key)
            .ok_or_else(|| anyhow!("No {} with {} {}", T::KIND.label(), T::KIND.key_column(), key))?;
        self.form = record.to_form();
        self.editing = Some(key.clone());
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.form = T::Form::default();
    }

    pub async fn load<S: ContentStore>(&mut self, store: &S, tables: &Tables) -> Result<()> {
        let table = tables.content(T::KIND);
        let rows = store.select(&table, T::KIND.key_column()).await?;
        let mut items = rows
            .into_iter()
            .map(T::from_row)
            .collect::<Result<Vec<_>>>()?;
        T::sort(&mut items);
        tracing::debug!(table = %table, count = items.len(), "Loaded content");
        self.items = items;
        Ok(())
    }

    /// Submits the form: updates the record being edited, or inserts a new one.
    pub async fn save<S: ContentStore, P: Prompt>(
        &mut self,
        store: &S,
        tables: &Tables,
        prompt: &P,
    ) -> Result<T> {
        let current = match &self.editing {
            Some(key) => Some(
                self.find(key)
                    .cloned()
                    .ok_or_else(|| anyhow!("{} {} is no longer listed", T::KIND.label(), key))?,
            ),
            None => None,
        };
        let record = T::from_form(&self.form, current.as_ref())?;

        match self.write(store, tables, record, current.is_some()).await {
            Ok(saved) => {
                self.cancel_edit();
                Ok(saved)
            }
            Err(err) => {
                tracing::error!(error = %err, kind = T::KIND.label(), "Saving content failed");
                prompt.alert(&format!("Error saving {}", T::KIND.label()));
                Err(err)
            }
        }
    }

    async fn write<S: ContentStore>(
        &mut self,
        store: &S,
        tables: &Tables,
        record: T,
        editing: bool,
    ) -> Result<T> {
        let table = tables.content(T::KIND);
        let key_column = T::KIND.key_column();
        let row = record.to_row()?;

        if editing {
            let key = record.key();
            store.update(&table, key_column, &key.to_string(), row).await?;
            if let Some(slot) = self.items.iter_mut().find(|item| item.key() == key) {
                *slot = record.clone();
            }
            tracing::info!(table = %table, key = %key, "Updated record");
            Ok(record)
        } else {
            let stored = store.insert(&table, key_column, row).await?;
            let saved = T::from_row(stored).with_context(|| {
                format!(
                    "The {} was saved to {} but the stored row could not be read",
                    T::KIND.label(),
                    table
                )
            })?;
            self.items.push(saved.clone());
            T::sort(&mut self.items);
            tracing::info!(table = %table, key = %saved.key(), "Inserted record");
            Ok(saved)
        }
    }

    /// Deletes after confirmation. Returns whether anything was deleted.
    pub async fn delete<S: ContentStore, P: Prompt>(
        &mut self,
        store: &S,
        tables: &Tables,
        prompt: &P,
        key: &T::Key,
    ) -> Result<bool> {
        if self.find(key).is_none() {
            return Err(anyhow!(
                "No {} with {} {}",
                T::KIND.label(),
                T::KIND.key_column(),
                key
            ));
        }
        if !prompt.confirm(T::KIND.delete_prompt()) {
            return Ok(false);
        }

        let table = tables.content(T::KIND);
        if let Err(err) = store
            .delete(&table, T::KIND.key_column(), &key.to_string())
            .await
        {
            tracing::error!(error = %err, table = %table, key = %key, "Delete failed");
            prompt.alert(&format!("Error deleting {}", T::KIND.label()));
            return Err(err);
        }

        self.items.retain(|item| &item.key() != key);
        if self.editing.as_ref() == Some(key) {
            self.cancel_edit();
        }
        tracing::info!(table = %table, key = %key, "Deleted record");
        Ok(true)
    }
}
