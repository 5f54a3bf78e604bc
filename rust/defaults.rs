//! Content the public site shipped with before the dashboard existed. Used as
//! the fallback site configuration and by the `seed` command.

use crate::models::{
    BilingualText, ClassResult, EventItem, Facility, NewsItem, SiteConfig, StaffMember, Topper,
    YearResult,
};

fn text(en: &str, hi: &str) -> BilingualText {
    BilingualText::new(en, hi)
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            school_name: text(
                "Rajkiya Ashram Paddhati Vidyalaya (Girls)",
                "राजकीय आश्रम पद्धति विद्यालय (बालिका)",
            ),
            sub_title: text("Punwarka, Saharanpur", "पुनवारका, सहारनपुर"),
            address: text(
                "Punwarka, Saharanpur, Uttar Pradesh",
                "पुनवारका, सहारनपुर, उत्तर प्रदेश",
            ),
            phone: "+91 123 456 7890".to_string(),
            email: "contact@rapv-punwarka.in".to_string(),
            hero_images: vec![
                "https://picsum.photos/id/20/1920/1080".to_string(),
                "https://picsum.photos/id/175/1920/1080".to_string(),
                "https://picsum.photos/id/1060/1920/1080".to_string(),
            ],
            about_image: "https://picsum.photos/id/237/600/800".to_string(),
            logo: String::new(),
        }
    }
}

pub fn events() -> Vec<EventItem> {
    vec![EventItem {
        id: 1,
        title: text("Minister Visit", "मंत्री का दौरा"),
        desc: text(
            "Shri Asim Arun visited the school",
            "श्री असीम अरुण ने विद्यालय का दौरा किया",
        ),
        img: "https://picsum.photos/id/1060/400/300".to_string(),
    }]
}

fn topper(rank: u32, name: &str, percentage: &str) -> Topper {
    Topper {
        rank,
        name: name.to_string(),
        percentage: percentage.to_string(),
    }
}

pub fn results() -> Vec<YearResult> {
    vec![YearResult {
        year: "2023-24".to_string(),
        class10: ClassResult {
            total_students: 40,
            passed: 30,
            failed: 9,
            pass_percentage: 89.29,
            toppers: vec![
                topper(1, "Priyanshi", "77.0"),
                topper(2, "Neetu", "70.8"),
                topper(3, "Angel", "68.8"),
            ],
        },
        class12: ClassResult {
            total_students: 27,
            passed: 27,
            failed: 0,
            pass_percentage: 100.0,
            toppers: vec![
                topper(1, "Preeti", "82.8"),
                topper(2, "Anchal Singh", "81.1"),
                topper(3, "Priyanka", "77.3"),
            ],
        },
    }]
}

pub fn staff() -> Vec<StaffMember> {
    let rows = [
        ("Dr. Madhu Rani", "डॉ मधु रानी", "In-charge Principal", "प्र० प्रधानाचार्य", "Sociology", "समाजशास्त्र"),
        ("Mrs. Bhavna Madan", "श्रीमती भावना मदान", "Lecturer", "प्रवक्ता", "Economics", "अर्थशास्त्र"),
        ("Mr. Arvind Rai", "श्री अरविन्द राय", "Lecturer", "प्रवक्ता", "Hindi", "हिंदी"),
        ("Mrs. Nidhi Rana", "श्रीमती निधि राणा", "Lecturer", "प्रवक्ता", "History", "इतिहास"),
        ("Ms. Anju", "कु० अंजू", "Lecturer", "प्रवक्ता", "Biology", "जीव विज्ञान"),
        ("Mrs. Manu", "श्रीमती मनु", "Assistant Teacher", "सहायक अध्या०", "Hindi", "हिंदी"),
        ("Mrs. Kavita", "श्रीमती कविता", "Assistant Teacher", "सहायक अध्या०", "Social Science", "सामा० विज्ञान"),
        ("Mrs. Aarti Mahajan", "श्रीमती आरती महाजन", "Assistant Teacher", "सहायक अध्या०", "English", "अंग्रेजी"),
        ("Mrs. Neha Devi", "श्रीमती नेहा देवी", "Assistant Teacher", "सहायक अध्या०", "Art", "कला"),
    ];
    rows.iter()
        .zip(1..)
        .map(|(&(name_en, name_hi, des_en, des_hi, sub_en, sub_hi), id)| StaffMember {
            id,
            name: text(name_en, name_hi),
            designation: text(des_en, des_hi),
            subject: text(sub_en, sub_hi),
            photo: String::new(),
        })
        .collect()
}

pub fn news() -> Vec<NewsItem> {
    vec![NewsItem {
        id: 1,
        text: text(
            "Pariksha Pe Charcha: Student Dikshita won first place",
            "परीक्षा पे चर्चा: छात्रा दीक्षिता ने प्रथम स्थान प्राप्त किया",
        ),
        content: text(
            "Student Dikshita won first place in a poster competition at PM Shri Kendriya Vidyalaya Air Force Sarsawa.",
            "पीएम श्री केंद्रीय विद्यालय वायु सेना सरसावा में पोस्टर प्रतियोगिता में छात्रा दीक्षिता ने प्रथम स्थान प्राप्त किया।",
        ),
        date: "2024-03-01".to_string(),
        image: "https://picsum.photos/id/20/600/400".to_string(),
    }]
}

pub fn facilities() -> Vec<Facility> {
    let rows = [
        (
            "Morning Yoga & Prayer",
            "प्रात: कालीन योगा एवं प्रार्थना स्थल",
            "Daily activities include different prayers, poems, stories, news, and physical training at the morning yoga and prayer venue.",
            "विद्यालय के प्रात: कालीन योगा एवं प्रार्थना स्थल पर प्रतिदिन अलग-2 प्रार्थना, कविता, कहानी, समाचार एवं पी०टी० कराई जाती है",
            "activity",
            "https://picsum.photos/id/73/800/600",
        ),
        (
            "Smart Class (Digital Education)",
            "डिजिटल शिक्षा (स्मार्ट क्लास)",
            "Modern education via projectors, tablet labs, and computer labs. Khan Academy, Embibe, and Phoolwari Project included.",
            "डिजिटल शिक्षा के अंतर्गत छात्राओं को प्रोजेक्टर, टैब लैब एवं कंप्यूटर लैब में आधुनिक शिक्षा प्रदान की जाती है। खान एकेडमी, एमबाइब, इंग्लिश लिट्रेसी प्रोग्राम संचालित।",
            "monitor",
            "https://picsum.photos/id/1/800/600",
        ),
        (
            "Classrooms",
            "कक्षाएँ",
            "Classrooms are well-ventilated, equipped with electricity, fans, and lights.",
            "कक्षाएं हवादार, विद्युत्, पंखे, बत्ती युक्त हैं।",
            "home",
            "https://picsum.photos/id/201/800/600",
        ),
        (
            "Library",
            "पुस्तकालय",
            "A library is available to develop reading habits and enhance knowledge among students.",
            "छात्राओं में किताबे पढने की आदत को विकसित करने एवं ज्ञानवर्धन के लिए पुस्तकालय की व्यवस्था है",
            "book-open",
            "https://picsum.photos/id/24/800/600",
        ),
        (
            "Laboratories",
            "प्रयोगशाला",
            "The school has biology, physics, and chemistry laboratories.",
            "विद्यालय में जीव विज्ञान, भौतिक विज्ञान, रसायन विज्ञान प्रयोगशाला की व्यवस्था है।",
            "flask-conical",
            "https://picsum.photos/id/20/800/600",
        ),
        (
            "Hostel Facilities",
            "आवासीय व्यवस्था",
            "Residential school with separate hostels for girls with a total capacity of 490.",
            "विद्यालय का स्वरूप आवासीय होने के कारण विद्यालय में निर्मित छात्रावास पृथक रूप से बालिकाओं के लिए उपलब्ध है। छात्रावास की कुल क्षमता 490 हैं।",
            "home",
            "https://picsum.photos/id/129/800/600",
        ),
        (
            "Mess Arrangements",
            "मेस व्यवस्था",
            "Well-organized mess with fixed menu and mess committee to ensure quality.",
            "विद्यालय में निर्धारित मेन्यू के अनुसार सुव्यवस्थित मेस व्यवस्था सुनिश्चित है। मेस कमेटी द्वारा शुद्ध एवं पौष्टिक भोजन की व्यवस्था।",
            "utensils",
            "https://picsum.photos/id/429/800/600",
        ),
        (
            "Health Checkup",
            "स्वास्थ्य परीक्षण",
            "Periodic health checkup camps organized by the Community Health Center.",
            "विद्यालय में सामुदायिक स्वास्थ्य केंद्र पुंवारका द्वारा छात्राओं के स्वास्थ्य परीक्षण हेतु समय समय पर शिविर लगाया जाता है",
            "heart-pulse",
            "https://picsum.photos/id/338/800/600",
        ),
    ];
    rows.iter()
        .zip(1..)
        .map(
            |(&(title_en, title_hi, desc_en, desc_hi, icon, image), id)| Facility {
                id,
                title: text(title_en, title_hi),
                description: text(desc_en, desc_hi),
                image: image.to_string(),
                icon: icon.to_string(),
            },
        )
        .collect()
}
