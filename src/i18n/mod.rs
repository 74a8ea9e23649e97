//! Localized strings and relative-time formatting
//!
//! Only the strings the approval and audit views need live here. Templates use
//! `{time}`, `{name}` and `{timestamp}` placeholders.

use serde::{Deserialize, Serialize};

/// Supported display languages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Tr,
    De,
}

/// Unit chosen for a relative time string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

/// Message table for one language
pub struct Messages {
    pub sla_remaining: &'static str,
    pub sla_overdue: &'static str,
    pub sla_none: &'static str,
    pub decision_failed: &'static str,
    pub no_permission: &'static str,
    pub no_assignees: &'static str,
    pub escalation: &'static str,
    pub actor: &'static str,
    pub status_pending: &'static str,
    pub status_waiting: &'static str,
    pub status_approved: &'static str,
    pub status_rejected: &'static str,
    pub status_skipped: &'static str,
    pub audit_empty: &'static str,
    pub audit_total: &'static str,
}

const EN: Messages = Messages {
    sla_remaining: "Due {time}",
    sla_overdue: "Overdue, was due {time}",
    sla_none: "No SLA defined",
    decision_failed: "The decision could not be recorded. Please try again.",
    no_permission: "You do not have permission to act on this step.",
    no_assignees: "No eligible approvers",
    escalation: "Escalates to",
    actor: "Decided by {name} at {timestamp}",
    status_pending: "Pending",
    status_waiting: "Waiting",
    status_approved: "Approved",
    status_rejected: "Rejected",
    status_skipped: "Skipped",
    audit_empty: "No records match the filter criteria.",
    audit_total: "{count} records found",
};

const TR: Messages = Messages {
    sla_remaining: "Son tarih {time}",
    sla_overdue: "Süre aşıldı, son tarih {time}",
    sla_none: "SLA tanımlı değil",
    decision_failed: "Karar kaydedilemedi. Lütfen tekrar deneyin.",
    no_permission: "Bu adım için yetkiniz bulunmuyor.",
    no_assignees: "Uygun onaylayıcı yok",
    escalation: "Eskalasyon",
    actor: "{name} tarafından {timestamp} tarihinde karar verildi",
    status_pending: "Beklemede",
    status_waiting: "Sırada",
    status_approved: "Onaylandı",
    status_rejected: "Reddedildi",
    status_skipped: "Atlandı",
    audit_empty: "Filtre kriterlerine uygun kayıt bulunamadı.",
    audit_total: "Toplam {count} kayıt bulundu",
};

const DE: Messages = Messages {
    sla_remaining: "Fällig {time}",
    sla_overdue: "Überfällig, war fällig {time}",
    sla_none: "Kein SLA definiert",
    decision_failed: "Die Entscheidung konnte nicht gespeichert werden. Bitte erneut versuchen.",
    no_permission: "Sie sind für diesen Schritt nicht berechtigt.",
    no_assignees: "Keine berechtigten Genehmiger",
    escalation: "Eskaliert an",
    actor: "Entschieden von {name} am {timestamp}",
    status_pending: "Offen",
    status_waiting: "Wartend",
    status_approved: "Genehmigt",
    status_rejected: "Abgelehnt",
    status_skipped: "Übersprungen",
    audit_empty: "Keine Einträge entsprechen den Filterkriterien.",
    audit_total: "{count} Einträge gefunden",
};

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Tr => "tr",
            Language::De => "de",
        }
    }

    /// Message table for this language
    pub fn messages(self) -> &'static Messages {
        match self {
            Language::En => &EN,
            Language::Tr => &TR,
            Language::De => &DE,
        }
    }

    /// Format a signed amount of a unit as relative time ("in 5 minutes",
    /// "5 minutes ago"), using words like "now" or "tomorrow" where a language
    /// has them.
    pub fn relative(self, value: i64, unit: TimeUnit) -> String {
        match (self, unit, value) {
            (Language::En, TimeUnit::Seconds, 0) => return "now".to_string(),
            (Language::En, TimeUnit::Days, 1) => return "tomorrow".to_string(),
            (Language::En, TimeUnit::Days, -1) => return "yesterday".to_string(),
            (Language::Tr, TimeUnit::Seconds, 0) => return "şimdi".to_string(),
            (Language::Tr, TimeUnit::Days, 1) => return "yarın".to_string(),
            (Language::Tr, TimeUnit::Days, -1) => return "dün".to_string(),
            (Language::De, TimeUnit::Seconds, 0) => return "jetzt".to_string(),
            (Language::De, TimeUnit::Days, 1) => return "morgen".to_string(),
            (Language::De, TimeUnit::Days, -1) => return "gestern".to_string(),
            _ => {}
        }

        let amount = value.unsigned_abs();
        let future = value >= 0;
        match self {
            Language::En => {
                let word = match unit {
                    TimeUnit::Seconds => "second",
                    TimeUnit::Minutes => "minute",
                    TimeUnit::Hours => "hour",
                    TimeUnit::Days => "day",
                };
                let plural = if amount == 1 { "" } else { "s" };
                if future {
                    format!("in {} {}{}", amount, word, plural)
                } else {
                    format!("{} {}{} ago", amount, word, plural)
                }
            }
            Language::Tr => {
                let word = match unit {
                    TimeUnit::Seconds => "saniye",
                    TimeUnit::Minutes => "dakika",
                    TimeUnit::Hours => "saat",
                    TimeUnit::Days => "gün",
                };
                if future {
                    format!("{} {} sonra", amount, word)
                } else {
                    format!("{} {} önce", amount, word)
                }
            }
            Language::De => {
                let word = match (unit, amount == 1) {
                    (TimeUnit::Seconds, true) => "Sekunde",
                    (TimeUnit::Seconds, false) => "Sekunden",
                    (TimeUnit::Minutes, true) => "Minute",
                    (TimeUnit::Minutes, false) => "Minuten",
                    (TimeUnit::Hours, true) => "Stunde",
                    (TimeUnit::Hours, false) => "Stunden",
                    (TimeUnit::Days, true) => "Tag",
                    (TimeUnit::Days, false) => "Tagen",
                };
                if future {
                    format!("in {} {}", amount, word)
                } else {
                    format!("vor {} {}", amount, word)
                }
            }
        }
    }
}

/// Substitute a `{key}` placeholder in a message template
pub fn fill(template: &str, key: &str, value: &str) -> String {
    template.replace(&format!("{{{}}}", key), value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_english() {
        assert_eq!(Language::En.relative(5, TimeUnit::Minutes), "in 5 minutes");
        assert_eq!(Language::En.relative(-1, TimeUnit::Hours), "1 hour ago");
        assert_eq!(Language::En.relative(0, TimeUnit::Seconds), "now");
        assert_eq!(Language::En.relative(1, TimeUnit::Days), "tomorrow");
        assert_eq!(Language::En.relative(-3, TimeUnit::Days), "3 days ago");
    }

    #[test]
    fn test_relative_turkish() {
        assert_eq!(Language::Tr.relative(5, TimeUnit::Minutes), "5 dakika sonra");
        assert_eq!(Language::Tr.relative(-2, TimeUnit::Hours), "2 saat önce");
        assert_eq!(Language::Tr.relative(-1, TimeUnit::Days), "dün");
    }

    #[test]
    fn test_relative_german() {
        assert_eq!(Language::De.relative(1, TimeUnit::Minutes), "in 1 Minute");
        assert_eq!(Language::De.relative(-4, TimeUnit::Days), "vor 4 Tagen");
    }

    #[test]
    fn test_fill_placeholder() {
        let msg = fill(Language::En.messages().sla_remaining, "time", "in 5 minutes");
        assert_eq!(msg, "Due in 5 minutes");
    }

    #[test]
    fn test_language_serde_lowercase() {
        let lang: Language = serde_yaml::from_str("tr").unwrap();
        assert_eq!(lang, Language::Tr);
        assert_eq!(serde_yaml::to_string(&Language::De).unwrap().trim(), "de");
    }
}
