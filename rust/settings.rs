use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::content::Tables;
use crate::models::{SettingRow, SiteConfig};
use crate::prompt::Prompt;
use crate::store::ContentStore;

const KEY_COLUMN: &str = "key";

impl SiteConfig {
    /// Builds the configuration from key/value rows. Keys that are missing
    /// keep their default.
    pub fn from_settings(rows: &[SettingRow]) -> Self {
        let mut config = SiteConfig::default();
        for row in rows {
            let value = row.value.clone();
            match row.key.as_str() {
                "school_name_en" => config.school_name.en = value,
                "school_name_hi" => config.school_name.hi = value,
                "school_sub_en" => config.sub_title.en = value,
                "school_sub_hi" => config.sub_title.hi = value,
                "address_en" => config.address.en = value,
                "address_hi" => config.address.hi = value,
                "phone" => config.phone = value,
                "email" => config.email = value,
                "about_image" => config.about_image = value,
                "logo" => config.logo = value,
                "hero_images" => match serde_json::from_str::<Vec<String>>(&value) {
                    Ok(images) => config.hero_images = images,
                    Err(err) => {
                        tracing::warn!(error = %err, "Ignoring malformed hero_images setting")
                    }
                },
                other => tracing::debug!(key = other, "Ignoring unknown setting"),
            }
        }
        config
    }

    pub fn to_settings(&self) -> Result<Vec<SettingRow>> {
        let pairs = [
            ("school_name_en", self.school_name.en.clone()),
            ("school_name_hi", self.school_name.hi.clone()),
            ("school_sub_en", self.sub_title.en.clone()),
            ("school_sub_hi", self.sub_title.hi.clone()),
            ("address_en", self.address.en.clone()),
            ("address_hi", self.address.hi.clone()),
            ("phone", self.phone.clone()),
            ("email", self.email.clone()),
            ("hero_images", serde_json::to_string(&self.hero_images)?),
            ("about_image", self.about_image.clone()),
            ("logo", self.logo.clone()),
        ];
        Ok(pairs
            .into_iter()
            .map(|(key, value)| SettingRow {
                key: key.to_string(),
                value,
            })
            .collect())
    }

    /// Appends an empty slide for the administrator to fill in.
    pub fn add_hero_image(&mut self) -> usize {
        self.hero_images.push(String::new());
        self.hero_images.len() - 1
    }

    pub fn set_hero_image(&mut self, index: usize, url: &str) -> Result<()> {
        let count = self.hero_images.len();
        let Some(slot) = self.hero_images.get_mut(index) else {
            bail!("No hero slide at position {} ({} slides)", index + 1, count);
        };
        *slot = url.trim().to_string();
        Ok(())
    }

    pub fn remove_hero_image(&mut self, index: usize) -> Result<String> {
        if index >= self.hero_images.len() {
            bail!(
                "No hero slide at position {} ({} slides)",
                index + 1,
                self.hero_images.len()
            );
        }
        Ok(self.hero_images.remove(index))
    }

    pub fn move_hero_image(&mut self, from: usize, to: usize) -> Result<()> {
        let count = self.hero_images.len();
        if from >= count || to >= count {
            bail!("Hero slide positions must be between 1 and {}", count);
        }
        let image = self.hero_images.remove(from);
        self.hero_images.insert(to, image);
        Ok(())
    }
}

pub async fn load_site_config<S: ContentStore>(store: &S, tables: &Tables) -> Result<SiteConfig> {
    let rows = store.select(&tables.settings(), KEY_COLUMN).await?;
    let rows = rows
        .into_iter()
        .map(serde_json::from_value::<SettingRow>)
        .collect::<Result<Vec<_>, _>>()
        .context("Malformed settings row")?;
    Ok(SiteConfig::from_settings(&rows))
}

/// Writes every setting in one upsert.
pub async fn save_site_config<S: ContentStore, P: Prompt>(
    store: &S,
    tables: &Tables,
    prompt: &P,
    config: &SiteConfig,
) -> Result<()> {
    let rows = config
        .to_settings()?
        .into_iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()?;

    match store.upsert(&tables.settings(), KEY_COLUMN, rows).await {
        Ok(()) => {
            tracing::info!("Website settings saved");
            prompt.alert("Website settings updated successfully!");
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "Settings save error");
            prompt.alert("Error saving settings");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::prompt::tests::Scripted;

    fn row(key: &str, value: &str) -> SettingRow {
        SettingRow {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let config = SiteConfig::from_settings(&[
            row("phone", "+91 98765 43210"),
            row("hero_images", r#"["a.jpg"]"#),
        ]);
        assert_eq!(config.phone, "+91 98765 43210");
        assert_eq!(config.hero_images, ["a.jpg"]);
        assert_eq!(config.school_name, SiteConfig::default().school_name);
    }

    #[test]
    fn malformed_hero_images_are_ignored() {
        let config = SiteConfig::from_settings(&[row("hero_images", "not json")]);
        assert_eq!(config.hero_images, SiteConfig::default().hero_images);
    }

    #[test]
    fn hero_slides_keep_their_order() {
        let mut config = SiteConfig::default();
        config.hero_images = vec!["a".into(), "b".into(), "c".into()];

        let added = config.add_hero_image();
        config.set_hero_image(added, " d ").unwrap();
        config.move_hero_image(3, 0).unwrap();
        assert_eq!(config.hero_images, ["d", "a", "b", "c"]);

        assert_eq!(config.remove_hero_image(1).unwrap(), "a");
        assert_eq!(config.hero_images, ["d", "b", "c"]);

        assert!(config.set_hero_image(3, "x").is_err());
        assert!(config.move_hero_image(0, 3).is_err());
        assert!(config.remove_hero_image(5).is_err());
    }

    #[test]
    fn hero_slide_errors_count_from_one() {
        let mut config = SiteConfig::default();
        config.hero_images = vec!["a".into(), "b".into(), "c".into()];

        let err = config.remove_hero_image(3).unwrap_err();
        assert_eq!(err.to_string(), "No hero slide at position 4 (3 slides)");
        let err = config.set_hero_image(5, "x").unwrap_err();
        assert_eq!(err.to_string(), "No hero slide at position 6 (3 slides)");
        let err = config.move_hero_image(0, 3).unwrap_err();
        assert_eq!(err.to_string(), "Hero slide positions must be between 1 and 3");
    }

    #[tokio::test]
    async fn settings_save_and_reload() {
        let db = Database::in_memory("b").unwrap();
        let tables = Tables::new("punwarka_");
        let prompt = Scripted::answering(true);

        let mut config = load_site_config(&db, &tables).await.unwrap();
        assert_eq!(config, SiteConfig::default());

        config.email = "office@example.org".to_string();
        config.hero_images.truncate(1);
        save_site_config(&db, &tables, &prompt, &config).await.unwrap();
        save_site_config(&db, &tables, &prompt, &config).await.unwrap();

        assert_eq!(load_site_config(&db, &tables).await.unwrap(), config);
        assert_eq!(db.select("punwarka_settings", "key").await.unwrap().len(), 11);
        assert_eq!(prompt.alerts()[0], "Website settings updated successfully!");
    }
}
