use serde::{Deserialize, Serialize};

/// Structured reason tags the committee can tick before rejecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    ProductOverlap,
    NoSpaceLeft,
    IncompleteApplication,
    OffTheme,
}

impl RejectionReason {
    fn sentence(self) -> &'static str {
        match self {
            RejectionReason::ProductOverlap => {
                "several confirmed stands already offer very similar products"
            }
            RejectionReason::NoSpaceLeft => {
                "all available stand locations for this edition are taken"
            }
            RejectionReason::IncompleteApplication => {
                "the application is missing required information"
            }
            RejectionReason::OffTheme => {
                "the proposed products do not fit the theme of the market"
            }
        }
    }
}

/// Pure text generation consulted to prefill the reject input; the committee
/// is free to edit or discard the draft, and the state machine never
/// interprets its content.
pub trait JustificationWriter: Send + Sync {
    fn generate(&self, applicant_name: &str, summary: &str, reasons: &[RejectionReason]) -> String;
}

/// Default writer assembling a short, polite draft from the ticked reasons.
#[derive(Debug, Default, Clone)]
pub struct TemplateJustificationWriter;

impl JustificationWriter for TemplateJustificationWriter {
    fn generate(&self, applicant_name: &str, summary: &str, reasons: &[RejectionReason]) -> String {
        let mut text = format!(
            "Dear {applicant_name}, thank you for proposing \"{summary}\". \
             We are sorry to inform you that your application was not retained"
        );

        let mut sentences = reasons.iter().map(|reason| reason.sentence());
        if let Some(first) = sentences.next() {
            text.push_str(": ");
            text.push_str(first);
            for sentence in sentences {
                text.push_str("; ");
                text.push_str(sentence);
            }
        }
        text.push('.');
        text
    }
}
