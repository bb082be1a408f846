use serde::{Deserialize, Serialize};
use strum::Display as StrumDisplay;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 3] = [SkillLevel::Beginner, SkillLevel::Intermediate, SkillLevel::Advanced];
}

pub const TOPICS: [&str; 10] = [
    "Network Security",
    "Web Application Security",
    "Cryptography",
    "Malware Analysis",
    "Incident Response",
    "Digital Forensics",
    "Penetration Testing",
    "Security Architecture",
    "Cloud Security",
    "IoT Security",
];

pub fn learning_path(topic: &str, level: SkillLevel) -> &'static [&'static str] {
    match (topic, level) {
        ("Network Security", SkillLevel::Beginner) => &["Network fundamentals", "Basic protocols", "Firewall basics"],
        ("Network Security", SkillLevel::Intermediate) => &["Network scanning", "Protocol analysis", "Advanced firewalls"],
        ("Network Security", SkillLevel::Advanced) => &["Network forensics", "Advanced attacks", "Defense strategies"],
        ("Web Application Security", SkillLevel::Beginner) => &["OWASP Top 10 basics", "Common vulnerabilities", "Basic testing"],
        ("Web Application Security", SkillLevel::Intermediate) => &["Advanced OWASP", "Custom payloads", "Automated testing"],
        ("Web Application Security", SkillLevel::Advanced) => &["Zero-day research", "Advanced exploitation", "Secure development"],
        _ => &[],
    }
}

pub fn topic_resources(topic: &str) -> &'static [&'static str] {
    match topic {
        "Network Security" => &["Wireshark tutorials", "Nmap documentation", "Network security books"],
        "Web Application Security" => &["OWASP documentation", "Burp Suite tutorials", "Web security courses"],
        _ => &[],
    }
}
