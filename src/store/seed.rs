//! Demo records shown to every signed-in user.

use crate::models::{
    Award, AwardCategory, Certificate, CertificateCategory, CertificateStatus,
};

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn certificate(
    id: i64,
    name: &str,
    issuer: &str,
    issue_date: &str,
    expiration_date: &str,
    serial_number: &str,
    category: CertificateCategory,
    tag_values: &[&str],
    status: CertificateStatus,
    description: &str,
) -> Certificate {
    Certificate {
        id,
        name: name.to_string(),
        issuer: issuer.to_string(),
        issue_date: issue_date.to_string(),
        expiration_date: Some(expiration_date.to_string()),
        serial_number: Some(serial_number.to_string()),
        category,
        tags: tags(tag_values),
        status,
        description: description.to_string(),
        thumbnail: Some(format!(
            "https://via.placeholder.com/300x200?text={}",
            name.replace(' ', "+")
        )),
        pdf_url: Some("#".to_string()),
    }
}

pub fn seed_certificates() -> Vec<Certificate> {
    vec![
        certificate(
            1,
            "Web Development Bootcamp",
            "Udemy",
            "2023-05-15",
            "2025-05-15",
            "WD-12345-BOOT",
            CertificateCategory::Development,
            &["web", "javascript", "html", "css"],
            CertificateStatus::Active,
            "A comprehensive bootcamp covering HTML, CSS, JavaScript, and more.",
        ),
        certificate(
            2,
            "React Advanced",
            "Frontend Masters",
            "2023-07-22",
            "2025-07-22",
            "FM-REACT-ADV-789",
            CertificateCategory::Development,
            &["react", "javascript", "frontend"],
            CertificateStatus::Active,
            "Advanced React patterns, hooks, and performance optimization techniques.",
        ),
        certificate(
            3,
            "UI/UX Design Fundamentals",
            "Coursera",
            "2023-09-10",
            "2025-09-10",
            "COUR-UIUX-456",
            CertificateCategory::Design,
            &["ui", "ux", "design", "figma"],
            CertificateStatus::Active,
            "Learn the fundamentals of UI/UX design, including user research and prototyping.",
        ),
        certificate(
            4,
            "Project Management Professional",
            "PMI",
            "2023-03-05",
            "2024-03-05",
            "PMI-PMP-98765",
            CertificateCategory::Business,
            &["project management", "agile", "scrum"],
            CertificateStatus::Expired,
            "Professional certification for project managers covering all aspects of project management.",
        ),
        certificate(
            5,
            "Data Science Specialization",
            "DataCamp",
            "2023-08-18",
            "2025-08-18",
            "DC-DATA-SCI-321",
            CertificateCategory::Data,
            &["data science", "python", "machine learning", "statistics"],
            CertificateStatus::Active,
            "Comprehensive data science program covering statistics, machine learning, and data visualization.",
        ),
    ]
}

fn award(
    id: i64,
    name: &str,
    issuer: &str,
    date_received: &str,
    category: AwardCategory,
    tag_values: &[&str],
    description: &str,
) -> Award {
    Award {
        id,
        name: name.to_string(),
        issuer: issuer.to_string(),
        date_received: date_received.to_string(),
        category,
        tags: tags(tag_values),
        description: description.to_string(),
        thumbnail: Some(format!(
            "https://via.placeholder.com/300x200?text={}",
            name.replace(' ', "+")
        )),
    }
}

pub fn seed_awards() -> Vec<Award> {
    vec![
        award(
            1,
            "Employee of the Month",
            "ABC Corporation",
            "2023-10-15",
            AwardCategory::Professional,
            &["achievement", "leadership", "excellence"],
            "Awarded for exceptional performance and leadership in the development team.",
        ),
        award(
            2,
            "Best Speaker",
            "Tech Conference 2023",
            "2023-08-22",
            AwardCategory::Speaking,
            &["public speaking", "technology", "conference"],
            "Recognized as the best speaker at the annual technology conference for the presentation on AI innovations.",
        ),
        award(
            3,
            "Innovation Award",
            "Industry Association",
            "2023-06-10",
            AwardCategory::Innovation,
            &["innovation", "technology", "research"],
            "Awarded for developing an innovative solution that significantly improved process efficiency.",
        ),
        award(
            4,
            "Community Service Recognition",
            "Local Community Foundation",
            "2023-04-05",
            AwardCategory::Community,
            &["volunteer", "community", "service"],
            "Recognized for outstanding contribution to community development and volunteer work.",
        ),
        award(
            5,
            "Academic Excellence",
            "University of Technology",
            "2023-05-18",
            AwardCategory::Academic,
            &["education", "research", "scholarship"],
            "Awarded for maintaining exceptional academic standards and research contributions.",
        ),
    ]
}
