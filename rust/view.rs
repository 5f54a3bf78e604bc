use std::fmt::Write;

use crate::models::{
    BilingualText, ClassResult, EventItem, Facility, GalleryImage, Lang, NewsItem, SiteConfig,
    StaffMember, YearResult,
};

/// Plain-text listing of a record for the terminal.
pub trait Render {
    fn render(&self, lang: Option<Lang>) -> String;
}

fn text(value: &BilingualText, lang: Option<Lang>) -> String {
    match lang {
        Some(lang) => value.get(lang).to_string(),
        None if value.hi.is_empty() => value.en.clone(),
        None if value.en.is_empty() => value.hi.clone(),
        None => format!("{} / {}", value.en, value.hi),
    }
}

fn line(out: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        let _ = writeln!(out, "    {}: {}", label, value);
    }
}

impl Render for EventItem {
    fn render(&self, lang: Option<Lang>) -> String {
        let mut out = format!("[{}] {}\n", self.id, text(&self.title, lang));
        line(&mut out, "About", &text(&self.desc, lang));
        line(&mut out, "Image", &self.img);
        out
    }
}

fn class_summary(out: &mut String, class: &str, result: &ClassResult) {
    let _ = writeln!(
        out,
        "    Class {}: {} students, {} passed, {} failed ({}%)",
        class, result.total_students, result.passed, result.failed, result.pass_percentage
    );
    for topper in &result.toppers {
        let _ = writeln!(out, "      {}. {} {}%", topper.rank, topper.name, topper.percentage);
    }
}

impl Render for YearResult {
    fn render(&self, _lang: Option<Lang>) -> String {
        let mut out = format!("[{}]\n", self.year);
        class_summary(&mut out, "10", &self.class10);
        class_summary(&mut out, "12", &self.class12);
        out
    }
}

impl Render for StaffMember {
    fn render(&self, lang: Option<Lang>) -> String {
        let mut out = format!(
            "[{}] {}, {}\n",
            self.id,
            text(&self.name, lang),
            text(&self.designation, lang)
        );
        if !self.subject.is_empty() {
            line(&mut out, "Subject", &text(&self.subject, lang));
        }
        line(&mut out, "Photo", &self.photo);
        out
    }
}

impl Render for NewsItem {
    fn render(&self, lang: Option<Lang>) -> String {
        let mut out = format!("[{}] {} {}\n", self.id, self.date, text(&self.text, lang));
        if !self.content.is_empty() {
            line(&mut out, "Content", &text(&self.content, lang));
        }
        line(&mut out, "Image", &self.image);
        out
    }
}

impl Render for Facility {
    fn render(&self, lang: Option<Lang>) -> String {
        let mut out = format!("[{}] {} ({})\n", self.id, text(&self.title, lang), self.icon);
        line(&mut out, "About", &text(&self.description, lang));
        line(&mut out, "Image", &self.image);
        out
    }
}

impl Render for SiteConfig {
    fn render(&self, lang: Option<Lang>) -> String {
        let mut out = String::new();
        line(&mut out, "School name", &text(&self.school_name, lang));
        line(&mut out, "Subtitle", &text(&self.sub_title, lang));
        line(&mut out, "Address", &text(&self.address, lang));
        line(&mut out, "Phone", &self.phone);
        line(&mut out, "Email", &self.email);
        line(&mut out, "Logo", &self.logo);
        line(&mut out, "About image", &self.about_image);
        let _ = writeln!(out, "    Hero slides:");
        for (position, url) in self.hero_images.iter().enumerate() {
            let url = if url.is_empty() { "(empty)" } else { url.as_str() };
            let _ = writeln!(out, "      {}. {}", position + 1, url);
        }
        out
    }
}

impl Render for GalleryImage {
    fn render(&self, _lang: Option<Lang>) -> String {
        format!("{}\t{}\n", self.name, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;

    #[test]
    fn both_languages_unless_one_is_chosen() {
        let title = BilingualText::new("Library", "पुस्तकालय");
        assert_eq!(text(&title, None), "Library / पुस्तकालय");
        assert_eq!(text(&title, Some(Lang::Hi)), "पुस्तकालय");
        assert_eq!(text(&BilingualText::new("Only", ""), None), "Only");
    }

    #[test]
    fn results_list_toppers_by_rank() {
        let result = defaults::results().remove(0);
        let out = result.render(None);
        assert!(out.starts_with("[2023-24]\n"));
        assert!(out.contains("Class 10: 40 students"));
        assert!(out.contains("      1. Priyanshi 77.0%"));
    }

    #[test]
    fn empty_fields_are_left_out() {
        let mut member = defaults::staff().remove(0);
        member.subject = BilingualText::default();
        member.photo.clear();
        let out = member.render(Some(Lang::En));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn settings_number_the_slides() {
        let mut config = SiteConfig::default();
        config.hero_images = vec!["a.jpg".to_string(), String::new()];
        let out = config.render(Some(Lang::En));
        assert!(out.contains("      1. a.jpg\n      2. (empty)\n"));
    }
}
