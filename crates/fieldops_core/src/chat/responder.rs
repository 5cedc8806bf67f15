use crate::model::Job;
use serde::Serialize;

pub const FALLBACK_REPLY: &str = "Saya akan bantu cek informasinya. Silakan tanyakan tentang alamat, nomor telepon, paket, atau jadwal pelanggan.";
pub const CONFIRMATION_REPLY: &str =
    "Baik, semoga instalasi lancar! Jika ada kendala, langsung hubungi CS ya. Semangat! 💪";
pub const PROBLEM_REPLY: &str = "Untuk kendala teknis, silakan hubungi hotline: 0800-123-4567. Saya akan catat keluhan Anda juga.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyTopic {
    Address,
    Phone,
    Package,
    Schedule,
    Confirmation,
    Problem,
    Fallback,
}

/// One `(predicate, template)` pair of the responder. The predicate is a
/// substring match of any keyword against the lowercased message.
#[derive(Debug, Clone, Copy)]
pub struct ReplyRule {
    pub topic: ReplyTopic,
    pub keywords: &'static [&'static str],
    render: fn(&Job) -> String,
}

impl ReplyRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }

    pub fn render(&self, job: &Job) -> String {
        (self.render)(job)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoReply {
    pub topic: ReplyTopic,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct AutoResponder {
    rules: Vec<ReplyRule>,
}

impl Default for AutoResponder {
    fn default() -> Self {
        Self::standard()
    }
}

impl AutoResponder {
    /// Support desk script. Rule order is significant: the first match wins.
    pub fn standard() -> Self {
        Self {
            rules: vec![
                ReplyRule {
                    topic: ReplyTopic::Address,
                    keywords: &["alamat", "lokasi"],
                    render: |job| {
                        format!(
                            "Alamat pelanggan yang terdaftar: {}. Sudah benar ya?",
                            job.address
                        )
                    },
                },
                ReplyRule {
                    topic: ReplyTopic::Phone,
                    keywords: &["nomor", "telepon", "kontak"],
                    render: |job| {
                        format!(
                            "Nomor telepon pelanggan: {}. Silakan hubungi 30 menit sebelum tiba.",
                            job.phone
                        )
                    },
                },
                ReplyRule {
                    topic: ReplyTopic::Package,
                    keywords: &["paket", "langganan"],
                    render: |job| {
                        format!(
                            "Pelanggan berlangganan {}. Pastikan perangkat yang dibawa sesuai spesifikasi ya!",
                            job.package_type
                        )
                    },
                },
                ReplyRule {
                    topic: ReplyTopic::Schedule,
                    keywords: &["jadwal", "waktu"],
                    render: |job| {
                        format!(
                            "Jadwal instalasi: {}. Jangan lupa konfirmasi ke pelanggan sebelum berangkat.",
                            job.scheduled_time
                        )
                    },
                },
                ReplyRule {
                    topic: ReplyTopic::Confirmation,
                    keywords: &["benar", "oke", "ok", "siap"],
                    render: |_| CONFIRMATION_REPLY.to_string(),
                },
                ReplyRule {
                    topic: ReplyTopic::Problem,
                    keywords: &["kendala", "masalah"],
                    render: |_| PROBLEM_REPLY.to_string(),
                },
            ],
        }
    }

    pub fn rules(&self) -> &[ReplyRule] {
        &self.rules
    }

    pub fn reply(&self, job: &Job, message: &str) -> AutoReply {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(|rule| AutoReply {
                topic: rule.topic,
                text: rule.render(job),
            })
            .unwrap_or_else(|| AutoReply {
                topic: ReplyTopic::Fallback,
                text: FALLBACK_REPLY.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{AutoResponder, CONFIRMATION_REPLY, FALLBACK_REPLY, PROBLEM_REPLY, ReplyTopic};
    use crate::model::{Job, JobStatus, Priority};

    fn job() -> Job {
        Job {
            id: "JOB-002".to_string(),
            customer_name: "Siti Nurhaliza".to_string(),
            address: "Komplek Permata Hijau Blok C5, Jakarta Selatan".to_string(),
            phone: "+62 813-2468-1357".to_string(),
            package_type: "Paket 100 Mbps".to_string(),
            scheduled_time: "13:00 - 15:00 WIB".to_string(),
            status: JobStatus::Pending,
            priority: Priority::Medium,
            notes: None,
        }
    }

    #[test]
    fn address_question_quotes_exact_address() {
        let reply = AutoResponder::standard().reply(&job(), "Alamat pelanggan di mana?");
        assert_eq!(reply.topic, ReplyTopic::Address);
        assert!(reply.text.contains("Komplek Permata Hijau Blok C5, Jakarta Selatan"));
    }

    #[test]
    fn phone_question_quotes_exact_phone() {
        let reply = AutoResponder::standard().reply(&job(), "nomor telepon");
        assert_eq!(reply.topic, ReplyTopic::Phone);
        assert_eq!(
            reply.text,
            "Nomor telepon pelanggan: +62 813-2468-1357. Silakan hubungi 30 menit sebelum tiba."
        );
    }

    #[test]
    fn package_and_schedule_templates_interpolate_job() {
        let responder = AutoResponder::standard();
        assert!(
            responder
                .reply(&job(), "detail LANGGANAN")
                .text
                .contains("Paket 100 Mbps")
        );
        assert!(
            responder
                .reply(&job(), "jam berapa waktu kunjungan")
                .text
                .contains("13:00 - 15:00 WIB")
        );
    }

    #[test]
    fn unmatched_message_gets_fallback() {
        let reply = AutoResponder::standard().reply(&job(), "halo");
        assert_eq!(reply.topic, ReplyTopic::Fallback);
        assert_eq!(reply.text, FALLBACK_REPLY);
    }

    #[test]
    fn first_listed_rule_wins_on_overlap() {
        let responder = AutoResponder::standard();

        let reply = responder.reply(&job(), "alamat dan paket sudah sesuai?");
        assert_eq!(reply.topic, ReplyTopic::Address);

        let reply = responder.reply(&job(), "ada masalah dengan jadwal");
        assert_eq!(reply.topic, ReplyTopic::Schedule);

        let reply = responder.reply(&job(), "siap, tapi ada kendala");
        assert_eq!(reply.topic, ReplyTopic::Confirmation);
        assert_eq!(reply.text, CONFIRMATION_REPLY);
    }

    #[test]
    fn problem_rule_answers_with_hotline() {
        let reply = AutoResponder::standard().reply(&job(), "Ada kendala di lapangan");
        assert_eq!(reply.topic, ReplyTopic::Problem);
        assert_eq!(reply.text, PROBLEM_REPLY);
    }

    #[test]
    fn rules_are_listed_in_priority_order() {
        let topics: Vec<ReplyTopic> = AutoResponder::standard()
            .rules()
            .iter()
            .map(|rule| rule.topic)
            .collect();

        assert_eq!(
            topics,
            vec![
                ReplyTopic::Address,
                ReplyTopic::Phone,
                ReplyTopic::Package,
                ReplyTopic::Schedule,
                ReplyTopic::Confirmation,
                ReplyTopic::Problem,
            ]
        );
    }
}
