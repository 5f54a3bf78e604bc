//! Edit forms for each content type, and the `Content` mapping between forms,
//! records and table rows.
//!
//! Forms hold exactly what the administrator typed. Validation happens when a
//! form is turned into a record, before anything is sent to the store.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::content::{Content, ContentKind};
use crate::models::{
    provisional_id, BilingualText, ClassResult, EventItem, EventRow, Facility, FacilityRow,
    NewsItem, NewsRow, StaffMember, StaffRow, Topper, YearResult, DEFAULT_EVENT_IMAGE,
    DEFAULT_FACILITY_ICON,
};

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}$").unwrap());

fn required(label: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        bail!("{} is required", label);
    }
    Ok(value.to_string())
}

fn bilingual(label: &str, en: &str, hi: &str) -> Result<BilingualText> {
    Ok(BilingualText::new(
        required(&format!("{} (English)", label), en)?,
        required(&format!("{} (Hindi)", label), hi)?,
    ))
}

fn optional_bilingual(en: &str, hi: &str) -> BilingualText {
    BilingualText::new(en.trim(), hi.trim())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventForm {
    pub title_en: String,
    pub title_hi: String,
    pub desc_en: String,
    pub desc_hi: String,
    pub img: String,
}

impl Content for EventItem {
    type Key = i64;
    type Form = EventForm;

    const KIND: ContentKind = ContentKind::Events;

    fn key(&self) -> i64 {
        self.id
    }

    fn to_row(&self) -> Result<Value> {
        Ok(serde_json::to_value(EventRow::from(self))?)
    }

    fn from_row(row: Value) -> Result<Self> {
        let row: EventRow = serde_json::from_value(row).context("Malformed event row")?;
        Ok(row.into())
    }

    fn to_form(&self) -> EventForm {
        EventForm {
            title_en: self.title.en.clone(),
            title_hi: self.title.hi.clone(),
            desc_en: self.desc.en.clone(),
            desc_hi: self.desc.hi.clone(),
            img: self.img.clone(),
        }
    }

    fn from_form(form: &EventForm, current: Option<&Self>) -> Result<Self> {
        let img = form.img.trim();
        Ok(Self {
            id: current.map(|event| event.id).unwrap_or_else(provisional_id),
            title: bilingual("Title", &form.title_en, &form.title_hi)?,
            desc: bilingual("Description", &form.desc_en, &form.desc_hi)?,
            img: if img.is_empty() {
                DEFAULT_EVENT_IMAGE.to_string()
            } else {
                img.to_string()
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopperEntry {
    pub name: String,
    pub percentage: String,
}

impl TopperEntry {
    /// Parses `Name=77.0`.
    pub fn parse(entry: &str) -> Result<Self> {
        let (name, percentage) = entry
            .rsplit_once('=')
            .ok_or_else(|| anyhow!("Topper must look like NAME=PERCENT, got {:?}", entry))?;
        Ok(Self {
            name: name.trim().to_string(),
            percentage: percentage.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassForm {
    pub total: String,
    pub passed: String,
    pub percent: String,
    pub toppers: Vec<TopperEntry>,
}

impl ClassForm {
    fn from_result(result: &ClassResult) -> Self {
        Self {
            total: result.total_students.to_string(),
            passed: result.passed.to_string(),
            percent: result.pass_percentage.to_string(),
            toppers: result
                .toppers
                .iter()
                .map(|topper| TopperEntry {
                    name: topper.name.clone(),
                    percentage: topper.percentage.clone(),
                })
                .collect(),
        }
    }

    fn to_result(&self, class: &str) -> Result<ClassResult> {
        let total = parse_count(&format!("Class {} total students", class), &self.total)?;
        let passed = parse_count(&format!("Class {} passed", class), &self.passed)?;
        if passed > total {
            bail!(
                "Class {}: passed ({}) cannot exceed total students ({})",
                class,
                passed,
                total
            );
        }

        let percent = self.percent.trim().trim_end_matches('%').trim();
        let pass_percentage = if percent.is_empty() {
            pass_rate(passed, total)
        } else {
            let value: f64 = percent
                .parse()
                .with_context(|| format!("Class {} pass percentage must be a number", class))?;
            if !(0.0..=100.0).contains(&value) {
                bail!("Class {} pass percentage must be between 0 and 100", class);
            }
            value
        };

        let mut toppers = Vec::new();
        for (entry, rank) in self.toppers.iter().zip(1..) {
            toppers.push(Topper {
                rank,
                name: required(&format!("Class {} topper name", class), &entry.name)?,
                percentage: required(&format!("Class {} topper percentage", class), &entry.percentage)?,
            });
        }

        Ok(ClassResult {
            total_students: total,
            passed,
            failed: total - passed,
            pass_percentage,
            toppers,
        })
    }
}

fn parse_count(label: &str, value: &str) -> Result<u32> {
    required(label, value)?
        .parse()
        .with_context(|| format!("{} must be a whole number", label))
}

/// Percentage of `passed` out of `total`, to two decimals.
pub fn pass_rate(passed: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(passed) / f64::from(total) * 10_000.0).round() / 100.0
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultForm {
    pub year: String,
    pub class10: ClassForm,
    pub class12: ClassForm,
}

impl Content for YearResult {
    type Key = String;
    type Form = ResultForm;

    const KIND: ContentKind = ContentKind::Results;

    fn key(&self) -> String {
        self.year.clone()
    }

    fn to_row(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn from_row(row: Value) -> Result<Self> {
        let mut result: YearResult = serde_json::from_value(row).context("Malformed result row")?;
        for class in [&mut result.class10, &mut result.class12] {
            class.toppers.sort_by_key(|topper| topper.rank);
        }
        Ok(result)
    }

    fn to_form(&self) -> ResultForm {
        ResultForm {
            year: self.year.clone(),
            class10: ClassForm::from_result(&self.class10),
            class12: ClassForm::from_result(&self.class12),
        }
    }

    fn from_form(form: &ResultForm, current: Option<&Self>) -> Result<Self> {
        // The academic year is the row key and stays fixed while editing.
        let year = match current {
            Some(result) => result.year.clone(),
            None => {
                let year = required("Academic year", &form.year)?;
                if !YEAR_RE.is_match(&year) {
                    bail!("Academic year must look like 2023-24, got {:?}", year);
                }
                year
            }
        };
        Ok(Self {
            year,
            class10: form.class10.to_result("10")?,
            class12: form.class12.to_result("12")?,
        })
    }

    fn sort(items: &mut [Self]) {
        items.sort_by(|a, b| a.year.cmp(&b.year));
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaffForm {
    pub name_en: String,
    pub name_hi: String,
    pub designation_en: String,
    pub designation_hi: String,
    pub subject_en: String,
    pub subject_hi: String,
    pub photo: String,
}

impl Content for StaffMember {
    type Key = i64;
    type Form = StaffForm;

    const KIND: ContentKind = ContentKind::Staff;

    fn key(&self) -> i64 {
        self.id
    }

    fn to_row(&self) -> Result<Value> {
        Ok(serde_json::to_value(StaffRow::from(self))?)
    }

    fn from_row(row: Value) -> Result<Self> {
        let row: StaffRow = serde_json::from_value(row).context("Malformed staff row")?;
        Ok(row.into())
    }

    fn to_form(&self) -> StaffForm {
        StaffForm {
            name_en: self.name.en.clone(),
            name_hi: self.name.hi.clone(),
            designation_en: self.designation.en.clone(),
            designation_hi: self.designation.hi.clone(),
            subject_en: self.subject.en.clone(),
            subject_hi: self.subject.hi.clone(),
            photo: self.photo.clone(),
        }
    }

    fn from_form(form: &StaffForm, current: Option<&Self>) -> Result<Self> {
        Ok(Self {
            id: current.map(|member| member.id).unwrap_or_else(provisional_id),
            name: bilingual("Name", &form.name_en, &form.name_hi)?,
            designation: bilingual("Designation", &form.designation_en, &form.designation_hi)?,
            subject: optional_bilingual(&form.subject_en, &form.subject_hi),
            photo: form.photo.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsForm {
    pub text_en: String,
    pub text_hi: String,
    pub content_en: String,
    pub content_hi: String,
    pub image: String,
    pub date: String,
}

impl Content for NewsItem {
    type Key = i64;
    type Form = NewsForm;

    const KIND: ContentKind = ContentKind::News;

    fn key(&self) -> i64 {
        self.id
    }

    fn to_row(&self) -> Result<Value> {
        Ok(serde_json::to_value(NewsRow::from(self))?)
    }

    fn from_row(row: Value) -> Result<Self> {
        let row: NewsRow = serde_json::from_value(row).context("Malformed news row")?;
        Ok(row.into())
    }

    fn to_form(&self) -> NewsForm {
        NewsForm {
            text_en: self.text.en.clone(),
            text_hi: self.text.hi.clone(),
            content_en: self.content.en.clone(),
            content_hi: self.content.hi.clone(),
            image: self.image.clone(),
            date: self.date.clone(),
        }
    }

    fn from_form(form: &NewsForm, current: Option<&Self>) -> Result<Self> {
        let date = required("Date", &form.date)?;
        NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .with_context(|| format!("Date must be YYYY-MM-DD, got {:?}", date))?;
        Ok(Self {
            id: current.map(|item| item.id).unwrap_or_else(provisional_id),
            text: bilingual("Headline", &form.text_en, &form.text_hi)?,
            content: optional_bilingual(&form.content_en, &form.content_hi),
            date,
            image: form.image.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityForm {
    pub title_en: String,
    pub title_hi: String,
    pub desc_en: String,
    pub desc_hi: String,
    pub image: String,
}

impl Content for Facility {
    type Key = i64;
    type Form = FacilityForm;

    const KIND: ContentKind = ContentKind::Facilities;

    fn key(&self) -> i64 {
        self.id
    }

    fn to_row(&self) -> Result<Value> {
        Ok(serde_json::to_value(FacilityRow::from(self))?)
    }

    fn from_row(row: Value) -> Result<Self> {
        let row: FacilityRow = serde_json::from_value(row).context("Malformed facility row")?;
        Ok(row.into())
    }

    fn to_form(&self) -> FacilityForm {
        FacilityForm {
            title_en: self.title.en.clone(),
            title_hi: self.title.hi.clone(),
            desc_en: self.description.en.clone(),
            desc_hi: self.description.hi.clone(),
            image: self.image.clone(),
        }
    }

    fn from_form(form: &FacilityForm, current: Option<&Self>) -> Result<Self> {
        Ok(Self {
            id: current.map(|facility| facility.id).unwrap_or_else(provisional_id),
            title: bilingual("Title", &form.title_en, &form.title_hi)?,
            description: bilingual("Description", &form.desc_en, &form.desc_hi)?,
            image: form.image.trim().to_string(),
            icon: current
                .map(|facility| facility.icon.clone())
                .unwrap_or_else(|| DEFAULT_FACILITY_ICON.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(total: &str, passed: &str, percent: &str) -> ClassForm {
        ClassForm {
            total: total.to_string(),
            passed: passed.to_string(),
            percent: percent.to_string(),
            toppers: Vec::new(),
        }
    }

    #[test]
    fn result_derives_failed_and_percentage() {
        let form = ResultForm {
            year: "2024-25".to_string(),
            class10: class("40", "30", ""),
            class12: class("27", "27", "99.5"),
        };
        let result = YearResult::from_form(&form, None).unwrap();
        assert_eq!(result.class10.failed, 10);
        assert_eq!(result.class10.pass_percentage, 75.0);
        assert_eq!(result.class12.failed, 0);
        assert_eq!(result.class12.pass_percentage, 99.5);
    }

    #[test]
    fn result_rejects_more_passed_than_total() {
        let form = ResultForm {
            year: "2024-25".to_string(),
            class10: class("10", "11", ""),
            class12: class("0", "0", ""),
        };
        let err = YearResult::from_form(&form, None).unwrap_err();
        assert!(err.to_string().contains("cannot exceed"));
    }

    #[test]
    fn result_year_is_validated_and_fixed_while_editing() {
        let mut form = ResultForm {
            year: "2024".to_string(),
            class10: class("1", "1", ""),
            class12: class("1", "1", ""),
        };
        assert!(YearResult::from_form(&form, None).is_err());

        let existing = crate::defaults::results().remove(0);
        form.year = "2030-31".to_string();
        let edited = YearResult::from_form(&form, Some(&existing)).unwrap();
        assert_eq!(edited.year, "2023-24");
    }

    #[test]
    fn toppers_are_ranked_in_entry_order() {
        let mut form = class("3", "3", "");
        form.toppers = vec![
            TopperEntry::parse("Preeti=82.8").unwrap(),
            TopperEntry::parse("Anchal Singh = 81.1").unwrap(),
        ];
        let result = form.to_result("12").unwrap();
        assert_eq!(result.toppers[1].rank, 2);
        assert_eq!(result.toppers[1].name, "Anchal Singh");
        assert!(TopperEntry::parse("no percentage").is_err());
    }

    #[test]
    fn editing_a_result_keeps_its_toppers() {
        let existing = crate::defaults::results().remove(0);
        let form = existing.to_form();
        let edited = YearResult::from_form(&form, Some(&existing)).unwrap();
        assert_eq!(edited.class10.toppers, existing.class10.toppers);
    }

    #[test]
    fn pass_rate_rounds_to_two_decimals() {
        assert_eq!(pass_rate(30, 40), 75.0);
        assert_eq!(pass_rate(25, 28), 89.29);
        assert_eq!(pass_rate(0, 0), 0.0);
    }

    #[test]
    fn staff_subject_is_optional_but_name_is_not() {
        let mut form = StaffForm {
            name_en: "Mr. Arvind Rai".to_string(),
            name_hi: "श्री अरविन्द राय".to_string(),
            designation_en: "Lecturer".to_string(),
            designation_hi: "प्रवक्ता".to_string(),
            ..StaffForm::default()
        };
        let member = StaffMember::from_form(&form, None).unwrap();
        assert!(member.subject.is_empty());

        form.name_hi.clear();
        let err = StaffMember::from_form(&form, None).unwrap_err();
        assert_eq!(err.to_string(), "Name (Hindi) is required");
    }

    #[test]
    fn news_requires_a_calendar_date() {
        let mut form = NewsForm {
            text_en: "Results declared".to_string(),
            text_hi: "परिणाम घोषित".to_string(),
            date: "2024-02-30".to_string(),
            ..NewsForm::default()
        };
        assert!(NewsItem::from_form(&form, None).is_err());
        form.date = "2024-02-29".to_string();
        assert_eq!(NewsItem::from_form(&form, None).unwrap().date, "2024-02-29");
    }

    #[test]
    fn editing_a_facility_keeps_its_icon_and_id() {
        let library = crate::defaults::facilities().remove(3);
        let mut form = library.to_form();
        form.desc_en = "Open all day".to_string();
        let edited = Facility::from_form(&form, Some(&library)).unwrap();
        assert_eq!(edited.id, library.id);
        assert_eq!(edited.icon, "book-open");

        let fresh = Facility::from_form(&form, None).unwrap();
        assert_eq!(fresh.icon, DEFAULT_FACILITY_ICON);
    }

    #[test]
    fn rows_round_trip_through_records() {
        let event = crate::defaults::events().remove(0);
        let mut row = event.to_row().unwrap();
        row["id"] = Value::from(event.id);
        assert_eq!(EventItem::from_row(row).unwrap(), event);
    }
}
