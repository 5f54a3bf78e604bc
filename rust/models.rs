use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_EVENT_IMAGE: &str = "https://picsum.photos/400/300";
pub const DEFAULT_FACILITY_ICON: &str = "building-2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Lang {
    En,
    Hi,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BilingualText {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hi: String,
}

impl BilingualText {
    pub fn new(en: impl Into<String>, hi: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            hi: hi.into(),
        }
    }

    pub fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::En => &self.en,
            Lang::Hi => &self.hi,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.en.trim().is_empty() && self.hi.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventItem {
    pub id: i64,
    pub title: BilingualText,
    pub desc: BilingualText,
    pub img: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topper {
    pub rank: u32,
    #[serde(deserialize_with = "string_from_any")]
    pub name: String,
    #[serde(deserialize_with = "string_from_any")]
    pub percentage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassResult {
    #[serde(default, deserialize_with = "u32_from_any")]
    pub total_students: u32,
    #[serde(default, deserialize_with = "u32_from_any")]
    pub passed: u32,
    #[serde(default, deserialize_with = "u32_from_any")]
    pub failed: u32,
    #[serde(default, deserialize_with = "f64_from_any")]
    pub pass_percentage: f64,
    #[serde(default)]
    pub toppers: Vec<Topper>,
}

/// One academic year of board results. Stored as-is: the row is the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearResult {
    pub year: String,
    #[serde(default)]
    pub class10: ClassResult,
    #[serde(default)]
    pub class12: ClassResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaffMember {
    pub id: i64,
    pub name: BilingualText,
    pub designation: BilingualText,
    pub subject: BilingualText,
    pub photo: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub id: i64,
    pub text: BilingualText,
    pub content: BilingualText,
    pub date: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub id: i64,
    pub title: BilingualText,
    pub description: BilingualText,
    pub image: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    pub school_name: BilingualText,
    pub sub_title: BilingualText,
    pub address: BilingualText,
    pub phone: String,
    pub email: String,
    pub hero_images: Vec<String>,
    pub about_image: String,
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryImage {
    pub name: String,
    pub url: String,
}

// Flat column layouts of the remote tables.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title_hi: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub desc_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub desc_hi: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub img: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name_hi: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub designation_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub designation_hi: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject_hi: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub photo: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text_hi: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content_hi: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title_hi: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description_en: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description_hi: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image: String,
    // The facilities table has no icon column; read one if a deployment added it.
    #[serde(default, skip_serializing)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingRow {
    pub key: String,
    #[serde(default, deserialize_with = "string_from_any")]
    pub value: String,
}

/// Identifier for records the store did not number.
pub fn provisional_id() -> i64 {
    Utc::now().timestamp_millis()
}

impl From<EventRow> for EventItem {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id.unwrap_or_else(provisional_id),
            title: BilingualText::new(row.title_en, row.title_hi),
            desc: BilingualText::new(row.desc_en, row.desc_hi),
            img: row.img,
        }
    }
}

impl From<&EventItem> for EventRow {
    fn from(item: &EventItem) -> Self {
        Self {
            id: None,
            title_en: item.title.en.clone(),
            title_hi: item.title.hi.clone(),
            desc_en: item.desc.en.clone(),
            desc_hi: item.desc.hi.clone(),
            img: item.img.clone(),
        }
    }
}

impl From<StaffRow> for StaffMember {
    fn from(row: StaffRow) -> Self {
        Self {
            id: row.id.unwrap_or_else(provisional_id),
            name: BilingualText::new(row.name_en, row.name_hi),
            designation: BilingualText::new(row.designation_en, row.designation_hi),
            subject: BilingualText::new(row.subject_en, row.subject_hi),
            photo: row.photo,
        }
    }
}

impl From<&StaffMember> for StaffRow {
    fn from(member: &StaffMember) -> Self {
        Self {
            id: None,
            name_en: member.name.en.clone(),
            name_hi: member.name.hi.clone(),
            designation_en: member.designation.en.clone(),
            designation_hi: member.designation.hi.clone(),
            subject_en: member.subject.en.clone(),
            subject_hi: member.subject.hi.clone(),
            photo: member.photo.clone(),
        }
    }
}

impl From<NewsRow> for NewsItem {
    fn from(row: NewsRow) -> Self {
        Self {
            id: row.id.unwrap_or_else(provisional_id),
            text: BilingualText::new(row.text_en, row.text_hi),
            content: BilingualText::new(row.content_en, row.content_hi),
            date: row.date,
            image: row.image,
        }
    }
}

impl From<&NewsItem> for NewsRow {
    fn from(item: &NewsItem) -> Self {
        Self {
            id: None,
            text_en: item.text.en.clone(),
            text_hi: item.text.hi.clone(),
            content_en: item.content.en.clone(),
            content_hi: item.content.hi.clone(),
            image: item.image.clone(),
            date: item.date.clone(),
        }
    }
}

impl From<FacilityRow> for Facility {
    fn from(row: FacilityRow) -> Self {
        Self {
            id: row.id.unwrap_or_else(provisional_id),
            title: BilingualText::new(row.title_en, row.title_hi),
            description: BilingualText::new(row.description_en, row.description_hi),
            image: row.image,
            icon: row
                .icon
                .filter(|icon| !icon.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FACILITY_ICON.to_string()),
        }
    }
}

impl From<&Facility> for FacilityRow {
    fn from(facility: &Facility) -> Self {
        Self {
            id: None,
            title_en: facility.title.en.clone(),
            title_hi: facility.title.hi.clone(),
            description_en: facility.description.en.clone(),
            description_hi: facility.description.hi.clone(),
            image: facility.image.clone(),
            icon: None,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// Result rows may hold numbers as strings and strings as numbers.

fn string_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn f64_from_any<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(0.0),
        serde_json::Value::Number(n) => Ok(n.as_f64().unwrap_or_default()),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(0.0),
        serde_json::Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .parse()
            .map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected a number, got {}",
            other
        ))),
    }
}

fn u32_from_any<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64_from_any(deserializer)?;
    if value < 0.0 {
        return Err(serde::de::Error::custom("expected a non-negative count"));
    }
    Ok(value.round() as u32)
}
