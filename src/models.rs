use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw /contact fields as submitted, before validation. Deserialized from
/// either the query string or a urlencoded form body.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ContactFields {
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl ContactFields {
    // Query values win over form values, matching a combined lookup
    pub fn merge(query: ContactFields, form: ContactFields) -> ContactFields {
        ContactFields {
            email: query.email.or(form.email),
            subject: query.subject.or(form.subject),
            message: query.message.or(form.message),
        }
    }

    /// Require all three fields present and non-empty (raw, untrimmed).
    pub fn validate(self) -> Option<ContactSubmission> {
        match (self.email, self.subject, self.message) {
            (Some(email), Some(subject), Some(message))
                if !email.is_empty() && !subject.is_empty() && !message.is_empty() =>
            {
                Some(ContactSubmission {
                    email,
                    subject,
                    message,
                })
            }
            _ => None,
        }
    }
}

/// A validated contact-form submission, handed to the notify sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub email: String,
    pub subject: String,
    pub message: String,
}

// Webhook wire format: {"embeds": [{title, description, author: {name}, timestamp}]}
#[derive(Serialize, Debug)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Serialize, Debug)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub author: EmbedAuthor,
    pub timestamp: String,
}

#[derive(Serialize, Debug)]
pub struct EmbedAuthor {
    pub name: String,
}

impl WebhookPayload {
    pub fn from_submission(submission: &ContactSubmission, sent_at: DateTime<Utc>) -> Self {
        Self {
            embeds: vec![Embed {
                title: submission.subject.clone(),
                description: submission.message.clone(),
                author: EmbedAuthor {
                    name: submission.email.clone(),
                },
                timestamp: sent_at.to_rfc3339(),
            }],
        }
    }
}
